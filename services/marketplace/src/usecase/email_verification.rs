use chrono::{Duration, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::domain::repository::{Mailer, UserRepository};
use crate::domain::types::{USER_TOKEN_TTL_SECS, UserTokenKind};
use crate::error::MarketplaceError;
use crate::usecase::auth::random_token;
use crate::usecase::mail;

// ── SendVerificationEmail ────────────────────────────────────────────────────

pub struct SendVerificationEmailUseCase<U: UserRepository, M: Mailer> {
    pub users: U,
    pub mailer: M,
    pub client_url: String,
}

impl<U: UserRepository, M: Mailer> SendVerificationEmailUseCase<U, M> {
    pub async fn execute(&self, user_id: Uuid) -> Result<(), MarketplaceError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(MarketplaceError::UserNotFound)?;

        let token = random_token();
        let expires_at = Utc::now() + Duration::seconds(USER_TOKEN_TTL_SECS);
        self.users
            .set_token(user.id, UserTokenKind::VerifyEmail, &token, expires_at)
            .await?;

        let message = mail::verify_email(&user.email, &self.client_url, &token);
        if let Err(e) = self.mailer.send(&message).await {
            warn!(user_id = %user.id, error = ?e, "failed to send verification email");
            return Err(MarketplaceError::VerificationEmailFailed);
        }
        Ok(())
    }
}

// ── VerifyEmail ──────────────────────────────────────────────────────────────

pub struct VerifyEmailUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> VerifyEmailUseCase<U> {
    pub async fn execute(&self, token: &str) -> Result<(), MarketplaceError> {
        if token.is_empty() || !self.users.consume_verify_token(token).await? {
            return Err(MarketplaceError::InvalidVerifyToken);
        }
        Ok(())
    }
}
