pub mod auth;
pub mod booking;
pub mod dashboard;
pub mod email_verification;
pub mod favorite;
pub mod feedback;
pub mod property;
pub mod transaction;
pub mod user;
