use std::sync::Arc;
use std::time::Duration;

use sea_orm::Database;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tracing::{info, warn};

use croscout_auth_types::identity::JwtSecret;
use croscout_core::config::Config;
use croscout_core::tracing::init_tracing;

use croscout_marketplace::config::MarketplaceConfig;
use croscout_marketplace::infra::db::DbOutboxRepository;
use croscout_marketplace::infra::mailer::HttpMailer;
use croscout_marketplace::infra::oauth::GoogleOAuth;
use croscout_marketplace::infra::outbox::OutboxWorker;
use croscout_marketplace::infra::translator::HttpTranslator;
use croscout_marketplace::router::build_router;
use croscout_marketplace::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = MarketplaceConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let redis_cfg = deadpool_redis::Config::from_url(&config.redis_url);
    let redis = redis_cfg
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .expect("failed to create Redis pool");

    let http = reqwest::Client::new();
    let mailer = HttpMailer::from_config(http.clone(), &config);
    let translator = HttpTranslator::from_config(http.clone(), &config);

    let google = match config.google_oauth() {
        Some((id, secret, redirect)) => Some(
            GoogleOAuth::new(id, secret, redirect, http.clone())
                .expect("invalid Google OAuth configuration"),
        ),
        None => {
            warn!("Google sign-in disabled: GOOGLE_CLIENT_ID/SECRET/REDIRECT_URL not set");
            None
        }
    };

    // Outbox delivery
    let worker = OutboxWorker {
        repo: DbOutboxRepository { db: db.clone() },
        mailer: mailer.clone(),
        poll_interval: Duration::from_millis(config.outbox_poll_ms),
        max_attempts: config.outbox_max_attempts,
    };
    tokio::spawn(worker.run());

    let addr = format!("0.0.0.0:{}", config.port);
    let state = AppState {
        db,
        redis,
        jwt_secret: JwtSecret::new(config.jwt_secret.clone()),
        config: Arc::new(config),
        mailer,
        translator,
        google,
    };

    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("marketplace service listening on {addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("failed to install Ctrl+C handler");
        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
        info!("received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
