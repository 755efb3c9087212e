use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use croscout_auth_types::identity::Identity;
use croscout_core::response;

use crate::error::MarketplaceError;
use crate::state::AppState;
use crate::usecase::email_verification::{SendVerificationEmailUseCase, VerifyEmailUseCase};

// ── POST /api/email-verification/send-verification-email ─────────────────────

pub async fn send_verification_email(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, MarketplaceError> {
    let usecase = SendVerificationEmailUseCase {
        users: state.user_repo(),
        mailer: state.mailer.clone(),
        client_url: state.config.client_url.clone(),
    };
    usecase.execute(identity.user_id).await?;
    Ok(response::message("Verification email sent"))
}

// ── GET /api/email-verification/verify-email?token= ──────────────────────────

#[derive(Deserialize)]
pub struct VerifyEmailQuery {
    #[serde(default)]
    pub token: String,
}

pub async fn verify_email(
    State(state): State<AppState>,
    Query(query): Query<VerifyEmailQuery>,
) -> Result<impl IntoResponse, MarketplaceError> {
    let usecase = VerifyEmailUseCase {
        users: state.user_repo(),
    };
    usecase.execute(&query.token).await?;
    Ok(response::message("Email verified successfully"))
}
