use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{info, warn};
use uuid::Uuid;

use croscout_auth_types::token::{ACCESS_TOKEN_EXP, JwtClaims};
use croscout_domain::user::UserRole;

use crate::domain::repository::{Mailer, OAuthProvider, OAuthStateCache, UserRepository};
use crate::domain::types::{
    USER_TOKEN_BYTES, USER_TOKEN_TTL_SECS, User, UserProfile, UserTokenKind,
};
use crate::error::MarketplaceError;
use crate::infra::password::{hash_password, verify_password};
use crate::usecase::mail;

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Sign a bearer token for `user`, valid for one day.
pub fn issue_token(user: &User, secret: &str) -> Result<String, MarketplaceError> {
    let claims = JwtClaims {
        id: user.id.to_string(),
        email: user.email.clone(),
        role: user.role,
        exp: now_secs() + ACCESS_TOKEN_EXP,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| MarketplaceError::Internal(e.into()))
}

/// Random single-use token, hex encoded.
pub fn random_token() -> String {
    let bytes: [u8; USER_TOKEN_BYTES] = rand::random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug)]
pub struct LoginOutput {
    pub token: String,
    pub user: User,
}

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<UserRole>,
    pub tax_number: Option<String>,
}

pub struct RegisterUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> RegisterUseCase<U> {
    pub async fn execute(&self, input: RegisterInput) -> Result<User, MarketplaceError> {
        let email = normalize_email(&input.email);
        if email.is_empty() || input.password.is_empty() {
            return Err(MarketplaceError::MissingCredentials);
        }

        let role = input.role.unwrap_or(UserRole::User);
        let tax_number = input.tax_number.filter(|t| !t.trim().is_empty());
        match role {
            UserRole::Admin => return Err(MarketplaceError::InvalidRole),
            UserRole::Agent if tax_number.is_none() => {
                return Err(MarketplaceError::TaxNumberRequired);
            }
            _ => {}
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(MarketplaceError::EmailTaken);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            google_id: None,
            name: input.name.trim().to_owned(),
            email,
            password_hash: Some(hash_password(&input.password)?),
            role,
            tax_number,
            is_completed_profile: false,
            is_email_verified: false,
            profile: UserProfile::default(),
            created_at: now,
            updated_at: now,
        };
        self.users.create(&user).await?;
        info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(user)
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginUseCase<U: UserRepository> {
    pub users: U,
    pub jwt_secret: String,
}

impl<U: UserRepository> LoginUseCase<U> {
    pub async fn execute(&self, email: &str, password: &str) -> Result<LoginOutput, MarketplaceError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(MarketplaceError::MissingCredentials);
        }

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(MarketplaceError::UserNotFound)?;

        let Some(hash) = user.password_hash.as_deref() else {
            return Err(MarketplaceError::OAuthOnlyAccount);
        };
        if !verify_password(password, hash) {
            return Err(MarketplaceError::WrongPassword);
        }

        let token = issue_token(&user, &self.jwt_secret)?;
        Ok(LoginOutput { token, user })
    }
}

// ── ForgotPassword ───────────────────────────────────────────────────────────

pub struct ForgotPasswordUseCase<U: UserRepository, M: Mailer> {
    pub users: U,
    pub mailer: M,
}

impl<U: UserRepository, M: Mailer> ForgotPasswordUseCase<U, M> {
    pub async fn execute(&self, email: &str, client_url: &str) -> Result<(), MarketplaceError> {
        let user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(MarketplaceError::UserNotFound)?;

        let token = random_token();
        let expires_at = Utc::now() + Duration::seconds(USER_TOKEN_TTL_SECS);
        self.users
            .set_token(user.id, UserTokenKind::ResetPassword, &token, expires_at)
            .await?;

        let message = mail::reset_password(&user.email, client_url, &token);
        if let Err(e) = self.mailer.send(&message).await {
            warn!(user_id = %user.id, error = ?e, "failed to send reset email");
            return Err(MarketplaceError::ResetEmailFailed);
        }
        Ok(())
    }
}

// ── ResetPassword ────────────────────────────────────────────────────────────

pub struct ResetPasswordUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ResetPasswordUseCase<U> {
    pub async fn execute(&self, token: &str, new_password: &str) -> Result<(), MarketplaceError> {
        if token.is_empty() {
            return Err(MarketplaceError::InvalidResetToken);
        }
        if new_password.is_empty() {
            return Err(MarketplaceError::MissingCredentials);
        }
        let hash = hash_password(new_password)?;
        if !self.users.consume_reset_token(token, &hash).await? {
            return Err(MarketplaceError::InvalidResetToken);
        }
        Ok(())
    }
}

// ── Google sign-in ───────────────────────────────────────────────────────────

pub struct GoogleAuthorizeUseCase<P: OAuthProvider, C: OAuthStateCache> {
    pub provider: P,
    pub states: C,
}

impl<P: OAuthProvider, C: OAuthStateCache> GoogleAuthorizeUseCase<P, C> {
    /// Consent page URL. Its CSRF state is remembered for the callback.
    pub async fn execute(&self) -> Result<String, MarketplaceError> {
        let (url, state) = self.provider.authorize_url();
        self.states.store_state(&state).await?;
        Ok(url)
    }
}

pub struct GoogleCallbackUseCase<U: UserRepository, P: OAuthProvider, C: OAuthStateCache> {
    pub users: U,
    pub provider: P,
    pub states: C,
    pub jwt_secret: String,
}

impl<U: UserRepository, P: OAuthProvider, C: OAuthStateCache> GoogleCallbackUseCase<U, P, C> {
    pub async fn execute(&self, code: &str, state: &str) -> Result<LoginOutput, MarketplaceError> {
        if !self.states.take_state(state).await? {
            return Err(MarketplaceError::InvalidOAuthState);
        }
        let profile = self.provider.fetch_profile(code).await?;
        let email = normalize_email(&profile.email);

        let user = if let Some(user) = self.users.find_by_google_id(&profile.sub).await? {
            user
        } else if let Some(mut user) = self.users.find_by_email(&email).await? {
            self.users
                .link_google(user.id, &profile.sub, profile.email_verified)
                .await?;
            user.google_id = Some(profile.sub.clone());
            user.is_email_verified |= profile.email_verified;
            info!(user_id = %user.id, "linked google account");
            user
        } else {
            let now = Utc::now();
            let user = User {
                id: Uuid::now_v7(),
                google_id: Some(profile.sub.clone()),
                name: profile.name.clone(),
                email,
                password_hash: None,
                role: UserRole::User,
                tax_number: None,
                is_completed_profile: false,
                is_email_verified: profile.email_verified,
                profile: UserProfile {
                    image: profile.picture.clone(),
                    ..Default::default()
                },
                created_at: now,
                updated_at: now,
            };
            self.users.create(&user).await?;
            info!(user_id = %user.id, "provisioned user from google sign-in");
            user
        };

        let token = issue_token(&user, &self.jwt_secret)?;
        Ok(LoginOutput { token, user })
    }
}
