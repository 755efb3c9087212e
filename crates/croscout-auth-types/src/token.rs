//! Bearer-token (JWT) validation.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
#[cfg(any(feature = "TOKEN_ISSUER", test))]
use serde::Serialize;
use uuid::Uuid;

use croscout_domain::user::UserRole;

/// Bearer token lifetime in seconds (1 day).
pub const ACCESS_TOKEN_EXP: u64 = 86_400;

/// Scheme prefix returned to clients alongside the raw token.
pub const BEARER_PREFIX: &str = "Bearer ";

/// User identity extracted from a validated token.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub exp: u64,
}

/// Errors returned by [`validate_access_token`].
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
}

/// JWT claims payload.
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `id` | custom | user ID (UUID string) |
/// | `email` | custom | account email at issue time |
/// | `role` | custom | `"user"`, `"agent"` or `"admin"` |
/// | `exp` | `exp` | seconds since epoch |
///
/// [`Serialize`] requires the **`TOKEN_ISSUER`** feature. Only the marketplace service
/// (and test helpers) mint tokens.
#[derive(Debug, Deserialize)]
#[cfg_attr(any(feature = "TOKEN_ISSUER", test), derive(Serialize))]
pub struct JwtClaims {
    pub id: String,
    pub email: String,
    pub role: UserRole,
    pub exp: u64,
}

/// Decode and validate a JWT. HS256, `exp` required and checked with the default 60s leeway.
fn decode_jwt(token: &str, secret: &str) -> Result<JwtClaims, AuthError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp"]);

    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::Malformed,
    })?;

    Ok(data.claims)
}

/// Validate a bearer token, returning the parsed identity.
///
/// Accepts the raw token or the `"Bearer <token>"` form handed out at login.
pub fn validate_access_token(token: &str, secret: &str) -> Result<TokenInfo, AuthError> {
    let token = token.strip_prefix(BEARER_PREFIX).unwrap_or(token).trim();
    let claims = decode_jwt(token, secret)?;
    let user_id = claims.id.parse::<Uuid>().map_err(|_| AuthError::Malformed)?;
    Ok(TokenInfo {
        user_id,
        email: claims.email,
        role: claims.role,
        exp: claims.exp,
    })
}
