use std::sync::Arc;

use axum::extract::FromRef;
use deadpool_redis::Pool as RedisPool;
use sea_orm::DatabaseConnection;

use croscout_auth_types::identity::JwtSecret;

use crate::config::MarketplaceConfig;
use crate::infra::cache::RedisOAuthStateCache;
use crate::infra::db::{
    DbBookingRepository, DbFavoriteRepository, DbFeedbackRepository, DbPropertyRepository,
    DbTransactionRepository, DbUserRepository,
};
use crate::infra::mailer::HttpMailer;
use crate::infra::oauth::GoogleOAuth;
use crate::infra::translator::HttpTranslator;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub redis: RedisPool,
    pub jwt_secret: JwtSecret,
    pub config: Arc<MarketplaceConfig>,
    pub mailer: HttpMailer,
    pub translator: HttpTranslator,
    /// `None` when Google sign-in is not configured.
    pub google: Option<GoogleOAuth>,
}

impl FromRef<AppState> for JwtSecret {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_secret.clone()
    }
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn property_repo(&self) -> DbPropertyRepository {
        DbPropertyRepository {
            db: self.db.clone(),
        }
    }

    pub fn booking_repo(&self) -> DbBookingRepository {
        DbBookingRepository {
            db: self.db.clone(),
        }
    }

    pub fn transaction_repo(&self) -> DbTransactionRepository {
        DbTransactionRepository {
            db: self.db.clone(),
        }
    }

    pub fn favorite_repo(&self) -> DbFavoriteRepository {
        DbFavoriteRepository {
            db: self.db.clone(),
        }
    }

    pub fn feedback_repo(&self) -> DbFeedbackRepository {
        DbFeedbackRepository {
            db: self.db.clone(),
        }
    }

    pub fn oauth_state_cache(&self) -> RedisOAuthStateCache {
        RedisOAuthStateCache {
            pool: self.redis.clone(),
        }
    }

    pub fn secret(&self) -> String {
        self.jwt_secret.0.to_string()
    }
}
