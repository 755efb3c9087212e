use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use croscout_auth_types::token::validate_access_token;
use croscout_domain::user::UserRole;

use croscout_marketplace::domain::repository::{OAuthProvider, OAuthStateCache, UserRepository};
use croscout_marketplace::domain::types::{OAuthProfile, UserTokenKind};
use croscout_marketplace::error::MarketplaceError;
use croscout_marketplace::usecase::auth::{
    ForgotPasswordUseCase, GoogleAuthorizeUseCase, GoogleCallbackUseCase, LoginUseCase,
    RegisterInput, RegisterUseCase, ResetPasswordUseCase,
};
use croscout_marketplace::usecase::email_verification::{
    SendVerificationEmailUseCase, VerifyEmailUseCase,
};

use crate::helpers::{MemStore, MockMailer, TEST_PASSWORD};

const SECRET: &str = "integration-secret";

fn register_input(email: &str, role: Option<UserRole>, tax: Option<&str>) -> RegisterInput {
    RegisterInput {
        name: "Mina".to_owned(),
        email: email.to_owned(),
        password: "s3cret-pass".to_owned(),
        role,
        tax_number: tax.map(str::to_owned),
    }
}

// ── RegisterUseCase / LoginUseCase ───────────────────────────────────────────

#[tokio::test]
async fn should_register_then_login_with_normalized_email() {
    let store = MemStore::new();
    let user = RegisterUseCase {
        users: store.clone(),
    }
    .execute(register_input("  Mina@Example.com ", None, None))
    .await
    .unwrap();
    assert_eq!(user.email, "mina@example.com");
    assert_eq!(user.role, UserRole::User);

    let out = LoginUseCase {
        users: store.clone(),
        jwt_secret: SECRET.to_owned(),
    }
    .execute("MINA@example.com", "s3cret-pass")
    .await
    .unwrap();
    let info = validate_access_token(&out.token, SECRET).unwrap();
    assert_eq!(info.user_id, user.id);
    assert_eq!(info.role, UserRole::User);
}

#[tokio::test]
async fn should_reject_duplicate_email_and_admin_self_registration() {
    let store = MemStore::new();
    let usecase = RegisterUseCase {
        users: store.clone(),
    };
    usecase
        .execute(register_input("mina@example.com", None, None))
        .await
        .unwrap();

    let dup = usecase
        .execute(register_input("mina@example.com", None, None))
        .await;
    assert!(
        matches!(dup, Err(MarketplaceError::EmailTaken)),
        "expected EmailTaken, got {dup:?}"
    );

    let admin = usecase
        .execute(register_input("root@example.com", Some(UserRole::Admin), None))
        .await;
    assert!(
        matches!(admin, Err(MarketplaceError::InvalidRole)),
        "expected InvalidRole, got {admin:?}"
    );
}

#[tokio::test]
async fn should_require_tax_number_for_agents() {
    let store = MemStore::new();
    let usecase = RegisterUseCase {
        users: store.clone(),
    };
    let missing = usecase
        .execute(register_input("agent@example.com", Some(UserRole::Agent), Some("  ")))
        .await;
    assert!(
        matches!(missing, Err(MarketplaceError::TaxNumberRequired)),
        "expected TaxNumberRequired, got {missing:?}"
    );

    let agent = usecase
        .execute(register_input("agent@example.com", Some(UserRole::Agent), Some("DE123")))
        .await
        .unwrap();
    assert_eq!(agent.tax_number.as_deref(), Some("DE123"));
}

#[tokio::test]
async fn should_reject_wrong_password_and_unknown_email() {
    let store = MemStore::new();
    store.add_user("Guest", "guest@example.com", UserRole::User);
    let usecase = LoginUseCase {
        users: store.clone(),
        jwt_secret: SECRET.to_owned(),
    };

    let wrong = usecase.execute("guest@example.com", "nope").await;
    assert!(
        matches!(wrong, Err(MarketplaceError::WrongPassword)),
        "expected WrongPassword, got {wrong:?}"
    );
    let unknown = usecase.execute("ghost@example.com", TEST_PASSWORD).await;
    assert!(
        matches!(unknown, Err(MarketplaceError::UserNotFound)),
        "expected UserNotFound, got {unknown:?}"
    );
    let empty = usecase.execute("guest@example.com", "").await;
    assert!(
        matches!(empty, Err(MarketplaceError::MissingCredentials)),
        "expected MissingCredentials, got {empty:?}"
    );
}

// ── ForgotPasswordUseCase / ResetPasswordUseCase ─────────────────────────────

#[tokio::test]
async fn should_reset_password_once_with_mailed_token() {
    let store = MemStore::new();
    let user = store.add_user("Guest", "guest@example.com", UserRole::User);
    let mailer = MockMailer::default();

    ForgotPasswordUseCase {
        users: store.clone(),
        mailer: mailer.clone(),
    }
    .execute("guest@example.com", "https://app.example.com/")
    .await
    .unwrap();

    let token = store.token_of(user.id, UserTokenKind::ResetPassword).unwrap();
    let sent = mailer.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Password Reset");
    assert!(
        sent[0]
            .html
            .contains(&format!("https://app.example.com/reset-password/{token}"))
    );

    let reset = ResetPasswordUseCase {
        users: store.clone(),
    };
    reset.execute(&token, "brand-new-pass").await.unwrap();
    let reused = reset.execute(&token, "another-pass").await;
    assert!(
        matches!(reused, Err(MarketplaceError::InvalidResetToken)),
        "expected InvalidResetToken, got {reused:?}"
    );

    LoginUseCase {
        users: store.clone(),
        jwt_secret: SECRET.to_owned(),
    }
    .execute("guest@example.com", "brand-new-pass")
    .await
    .unwrap();
}

#[tokio::test]
async fn should_fail_forgot_password_when_mail_cannot_be_sent() {
    let store = MemStore::new();
    store.add_user("Guest", "guest@example.com", UserRole::User);

    let result = ForgotPasswordUseCase {
        users: store.clone(),
        mailer: MockMailer::failing(),
    }
    .execute("guest@example.com", "https://app.example.com")
    .await;
    assert!(
        matches!(result, Err(MarketplaceError::ResetEmailFailed)),
        "expected ResetEmailFailed, got {result:?}"
    );
}

// ── email verification ───────────────────────────────────────────────────────

#[tokio::test]
async fn should_verify_email_with_mailed_token() {
    let store = MemStore::new();
    let user = store.add_user("Guest", "guest@example.com", UserRole::User);
    let mailer = MockMailer::default();

    SendVerificationEmailUseCase {
        users: store.clone(),
        mailer: mailer.clone(),
        client_url: "https://app.example.com".to_owned(),
    }
    .execute(user.id)
    .await
    .unwrap();
    let token = store.token_of(user.id, UserTokenKind::VerifyEmail).unwrap();
    assert_eq!(mailer.sent.lock().unwrap()[0].subject, "Email Verification");

    let verify = VerifyEmailUseCase {
        users: store.clone(),
    };
    verify.execute(&token).await.unwrap();
    assert!(store.find_by_id(user.id).await.unwrap().unwrap().is_email_verified);

    let again = verify.execute(&token).await;
    assert!(
        matches!(again, Err(MarketplaceError::InvalidVerifyToken)),
        "expected InvalidVerifyToken, got {again:?}"
    );
}

// ── Google sign-in ───────────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct MemStates {
    states: Arc<Mutex<HashSet<String>>>,
}

impl OAuthStateCache for MemStates {
    async fn store_state(&self, state: &str) -> Result<(), MarketplaceError> {
        self.states.lock().unwrap().insert(state.to_owned());
        Ok(())
    }

    async fn take_state(&self, state: &str) -> Result<bool, MarketplaceError> {
        Ok(self.states.lock().unwrap().remove(state))
    }
}

struct FakeGoogle {
    email: String,
}

impl OAuthProvider for FakeGoogle {
    fn authorize_url(&self) -> (String, String) {
        (
            "https://accounts.example.com/auth?state=csrf-1".to_owned(),
            "csrf-1".to_owned(),
        )
    }

    async fn fetch_profile(&self, _code: &str) -> Result<OAuthProfile, MarketplaceError> {
        Ok(OAuthProfile {
            sub: "google-sub-1".to_owned(),
            email: self.email.clone(),
            name: "Google User".to_owned(),
            picture: Some("https://img.example.com/a.png".to_owned()),
            email_verified: true,
        })
    }
}

#[tokio::test]
async fn should_provision_oauth_user_who_cannot_use_password_login() {
    let store = MemStore::new();
    let states = MemStates::default();
    let provider = || FakeGoogle {
        email: "new@example.com".to_owned(),
    };

    let url = GoogleAuthorizeUseCase {
        provider: provider(),
        states: states.clone(),
    }
    .execute()
    .await
    .unwrap();
    assert!(url.contains("state=csrf-1"));

    let callback = GoogleCallbackUseCase {
        users: store.clone(),
        provider: provider(),
        states: states.clone(),
        jwt_secret: SECRET.to_owned(),
    };
    let out = callback.execute("code", "csrf-1").await.unwrap();
    assert_eq!(out.user.role, UserRole::User);
    assert!(out.user.password_hash.is_none());
    assert!(out.user.is_email_verified);

    let replay = callback.execute("code", "csrf-1").await;
    assert!(
        matches!(replay, Err(MarketplaceError::InvalidOAuthState)),
        "expected InvalidOAuthState, got {replay:?}"
    );

    let login = LoginUseCase {
        users: store.clone(),
        jwt_secret: SECRET.to_owned(),
    }
    .execute("new@example.com", "anything")
    .await;
    assert!(
        matches!(login, Err(MarketplaceError::OAuthOnlyAccount)),
        "expected OAuthOnlyAccount, got {login:?}"
    );
}

#[tokio::test]
async fn should_link_google_to_existing_account_by_email() {
    let store = MemStore::new();
    let existing = store.add_user("Guest", "guest@example.com", UserRole::User);
    let states = MemStates::default();
    states.store_state("csrf-1").await.unwrap();

    let out = GoogleCallbackUseCase {
        users: store.clone(),
        provider: FakeGoogle {
            email: "Guest@Example.com".to_owned(),
        },
        states,
        jwt_secret: SECRET.to_owned(),
    }
    .execute("code", "csrf-1")
    .await
    .unwrap();
    assert_eq!(out.user.id, existing.id);
    let stored = store.find_by_google_id("google-sub-1").await.unwrap().unwrap();
    assert_eq!(stored.id, existing.id);
}
