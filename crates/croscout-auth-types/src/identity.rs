//! Bearer-token identity extractor.

use std::sync::Arc;

use axum::Json;
use axum::extract::{FromRef, FromRequestParts};
use axum::response::{IntoResponse, Response};
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};
use http::StatusCode;
use http::request::Parts;
use uuid::Uuid;

use croscout_domain::user::UserRole;

use crate::token::{AuthError, validate_access_token};

/// HMAC secret handle. Router state must expose it through `FromRef`.
#[derive(Clone)]
pub struct JwtSecret(pub Arc<str>);

impl JwtSecret {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self(secret.into())
    }
}

/// Caller identity taken from `Authorization: Bearer <jwt>`.
///
/// Stateless: only signature and expiry are checked. Role enforcement (403) is done by
/// handlers and use cases after extraction.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// True when the caller is `user_id` or an admin.
    pub fn can_act_for(&self, user_id: Uuid) -> bool {
        self.user_id == user_id || self.is_admin()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthRejection {
    #[error("missing bearer token")]
    Missing,
    #[error(transparent)]
    Invalid(#[from] AuthError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        tracing::debug!(reason = %self, "rejected request without valid bearer token");
        let body = serde_json::json!({
            "success": false,
            "message": "Unauthorized Access",
        });
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
    JwtSecret: FromRef<S>,
{
    type Rejection = AuthRejection;

    // Values are extracted synchronously so the returned future does not borrow `parts`.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = parts
            .headers
            .typed_get::<Authorization<Bearer>>()
            .map(|auth| auth.token().to_owned());
        let secret = JwtSecret::from_ref(state);

        async move {
            let token = token.ok_or(AuthRejection::Missing)?;
            let info = validate_access_token(&token, &secret.0)?;
            Ok(Self {
                user_id: info.user_id,
                email: info.email,
                role: info.role,
            })
        }
    }
}
