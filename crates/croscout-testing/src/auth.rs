//! Mock auth helpers for router tests.
//!
//! Protected routes expect `Authorization: Bearer <jwt>`. `MockAuth` signs a real token
//! with the test secret so requests pass through the same `Identity` extractor as production.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::{HeaderMap, HeaderValue, header};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use croscout_auth_types::token::JwtClaims;
use croscout_domain::user::UserRole;

/// Secret shared by test routers and `MockAuth`.
pub const TEST_JWT_SECRET: &str = "croscout-test-secret";

/// Configurable identity injected into test requests.
pub struct MockAuth {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl MockAuth {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self {
            user_id,
            email: format!("{user_id}@example.com"),
            role,
        }
    }

    /// Signed token valid for one hour.
    pub fn token(&self) -> String {
        let exp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
            + 3600;
        let claims = JwtClaims {
            id: self.user_id.to_string(),
            email: self.email.clone(),
            role: self.role,
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
        )
        .expect("sign test token")
    }

    /// `Authorization` header value.
    pub fn bearer(&self) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {}", self.token())).expect("valid header value")
    }

    /// Return headers as a logged-in browser client would send them.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(header::AUTHORIZATION, self.bearer());
        map
    }
}
