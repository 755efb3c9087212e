use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use serde_json::json;

use croscout_auth_types::token::BEARER_PREFIX;
use croscout_core::response;
use croscout_domain::user::UserRole;

use crate::error::MarketplaceError;
use crate::handlers::user::UserResponse;
use crate::state::AppState;
use crate::usecase::auth::{
    ForgotPasswordUseCase, GoogleAuthorizeUseCase, GoogleCallbackUseCase, LoginOutput,
    LoginUseCase, RegisterInput, RegisterUseCase, ResetPasswordUseCase,
};

fn login_response(out: LoginOutput) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "Login in successfully",
        "token": format!("{BEARER_PREFIX}{}", out.token),
        "user": UserResponse::from(out.user),
    }))
}

// ── POST /api/auth/register ──────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: Option<UserRole>,
    pub tax_number: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, MarketplaceError> {
    let usecase = RegisterUseCase {
        users: state.user_repo(),
    };
    usecase
        .execute(RegisterInput {
            name: body.name,
            email: body.email,
            password: body.password,
            role: body.role,
            tax_number: body.tax_number,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        response::message("User registered successfully."),
    ))
}

// ── POST /api/auth/login ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, MarketplaceError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        jwt_secret: state.secret(),
    };
    let out = usecase.execute(&body.email, &body.password).await?;
    Ok(login_response(out))
}

// ── GET /api/auth/logout ─────────────────────────────────────────────────────

/// Tokens are stateless; the client drops its copy.
pub async fn logout() -> impl IntoResponse {
    Json(json!({ "success": true, "isLogout": true }))
}

// ── POST /api/auth/forgot-password ───────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
    pub client_url: Option<String>,
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<impl IntoResponse, MarketplaceError> {
    let client_url = body
        .client_url
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| state.config.client_url.clone());
    let usecase = ForgotPasswordUseCase {
        users: state.user_repo(),
        mailer: state.mailer.clone(),
    };
    usecase.execute(&body.email, &client_url).await?;
    Ok(response::message("Password reset link sent to your email."))
}

// ── POST /api/auth/reset-password ────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub new_password: String,
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, MarketplaceError> {
    let usecase = ResetPasswordUseCase {
        users: state.user_repo(),
    };
    usecase.execute(&body.token, &body.new_password).await?;
    Ok(response::message("Password reset successful"))
}

// ── GET /api/auth/google ─────────────────────────────────────────────────────

pub async fn google_login(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, MarketplaceError> {
    let provider = state.google.clone().ok_or(MarketplaceError::OAuthDisabled)?;
    let usecase = GoogleAuthorizeUseCase {
        provider,
        states: state.oauth_state_cache(),
    };
    let url = usecase.execute().await?;
    Ok(Redirect::to(&url))
}

// ── GET /api/auth/google/callback ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct GoogleCallbackQuery {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub state: String,
}

pub async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<GoogleCallbackQuery>,
) -> Result<impl IntoResponse, MarketplaceError> {
    let provider = state.google.clone().ok_or(MarketplaceError::OAuthDisabled)?;
    let usecase = GoogleCallbackUseCase {
        users: state.user_repo(),
        provider,
        states: state.oauth_state_cache(),
        jwt_secret: state.secret(),
    };
    let out = usecase.execute(&query.code, &query.state).await?;
    Ok(login_response(out))
}
