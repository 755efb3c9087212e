use std::sync::Arc;

use axum::http::{HeaderValue, StatusCode, header};
use axum_test::TestServer;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use uuid::Uuid;

use croscout_auth_types::identity::JwtSecret;
use croscout_core::config::Config;
use croscout_domain::user::UserRole;
use croscout_testing::auth::{MockAuth, TEST_JWT_SECRET};

use croscout_marketplace::config::MarketplaceConfig;
use croscout_marketplace::infra::mailer::HttpMailer;
use croscout_marketplace::infra::translator::HttpTranslator;
use croscout_marketplace::router::build_router;
use croscout_marketplace::state::AppState;

/// Router over a disconnected database. Only paths that answer before touching
/// storage are exercised here.
fn server() -> TestServer {
    let config = MarketplaceConfig::from_pairs(
        [
            ("DATABASE_URL", "postgres://localhost/unused"),
            ("REDIS_URL", "redis://127.0.0.1:6399"),
            ("JWT_SECRET", TEST_JWT_SECRET),
            ("MAIL_FROM", "noreply@example.com"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned())),
    )
    .unwrap();
    let redis = deadpool_redis::Config::from_url(&config.redis_url)
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .unwrap();
    let http = reqwest::Client::new();

    let state = AppState {
        db: DatabaseConnection::Disconnected,
        redis,
        jwt_secret: JwtSecret::new(TEST_JWT_SECRET),
        mailer: HttpMailer::from_config(http.clone(), &config),
        translator: HttpTranslator::from_config(http, &config),
        config: Arc::new(config),
        google: None,
    };
    TestServer::new(build_router(state)).unwrap()
}

#[tokio::test]
async fn should_answer_health_probes() {
    let server = server();
    server.get("/healthz").await.assert_status_ok();
    server.get("/readyz").await.assert_status_ok();
}

#[tokio::test]
async fn should_return_not_found_envelope_for_unknown_route() {
    let res = server().get("/api/nowhere").await;
    res.assert_status(StatusCode::NOT_FOUND);
    res.assert_json(&json!({ "message": "route not found" }));
}

#[tokio::test]
async fn should_reject_protected_route_without_token() {
    let res = server().get("/api/user/current-user").await;
    res.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(res.json::<Value>()["message"], "Unauthorized Access");
}

#[tokio::test]
async fn should_reject_malformed_token() {
    let res = server()
        .get("/api/bookings")
        .add_header(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer not.a.jwt"),
        )
        .await;
    res.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_log_out_statelessly() {
    let res = server().get("/api/auth/logout").await;
    res.assert_status_ok();
    res.assert_json(&json!({ "success": true, "isLogout": true }));
}

#[tokio::test]
async fn should_require_credentials_on_login() {
    let res = server()
        .post("/api/auth/login")
        .json(&json!({ "email": "someone@example.com" }))
        .await;
    res.assert_status(StatusCode::BAD_REQUEST);
    let body = res.json::<Value>();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Email or Password is required");
}

#[tokio::test]
async fn should_refuse_admin_self_registration() {
    let res = server()
        .post("/api/auth/register")
        .json(&json!({
            "name": "Root",
            "email": "root@example.com",
            "password": "pw",
            "role": "admin",
        }))
        .await;
    res.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_report_disabled_google_sign_in() {
    let res = server().get("/api/auth/google").await;
    res.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>()["kind"], "OAUTH_DISABLED");
}

#[tokio::test]
async fn should_reject_empty_verify_token() {
    let res = server().get("/api/email-verification/verify-email").await;
    res.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_limit_admin_listings_to_admins() {
    let server = server();
    let guest = MockAuth::new(Uuid::now_v7(), UserRole::User);
    for path in ["/api/bookings", "/api/user/all-users", "/api/transactions"] {
        let res = server
            .get(path)
            .add_header(header::AUTHORIZATION, guest.bearer())
            .await;
        res.assert_status(StatusCode::FORBIDDEN);
    }
}

#[tokio::test]
async fn should_forbid_acting_for_another_user() {
    let server = server();
    let guest = MockAuth::new(Uuid::now_v7(), UserRole::User);
    let other = Uuid::now_v7();

    for path in [
        format!("/api/favorites/{other}"),
        format!("/api/bookings/user/{other}"),
        format!("/api/transactions/{other}"),
        format!("/api/dashboard/stats/{other}"),
    ] {
        let res = server
            .get(&path)
            .add_header(header::AUTHORIZATION, guest.bearer())
            .await;
        res.assert_status(StatusCode::FORBIDDEN);
        assert_eq!(res.json::<Value>()["error"], "Forbidden access");
    }
}

#[tokio::test]
async fn should_refuse_user_deletion_by_non_admin() {
    let agent = MockAuth::new(Uuid::now_v7(), UserRole::Agent);
    let res = server()
        .delete(&format!("/api/user/{}", Uuid::now_v7()))
        .add_header(header::AUTHORIZATION, agent.bearer())
        .await;
    res.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(res.json::<Value>()["error"], "You are not able to delete.");
}

#[tokio::test]
async fn should_refuse_property_creation_by_plain_user() {
    let guest = MockAuth::new(Uuid::now_v7(), UserRole::User);
    let res = server()
        .post("/api/properties")
        .add_header(header::AUTHORIZATION, guest.bearer())
        .json(&json!({
            "name": "Flat",
            "description": "Nice",
            "pricePerNight": 50.0,
            "location": "Berlin",
            "state": "Berlin",
            "propertyType": "Apartment",
            "guests": 2,
        }))
        .await;
    res.assert_status(StatusCode::FORBIDDEN);
}
