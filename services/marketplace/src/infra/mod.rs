pub mod cache;
pub mod db;
pub mod mailer;
pub mod oauth;
pub mod outbox;
pub mod password;
pub mod translator;
