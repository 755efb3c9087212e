use deadpool_redis::Pool;
use deadpool_redis::redis::AsyncCommands;

use crate::domain::repository::OAuthStateCache;
use crate::domain::types::OAUTH_STATE_TTL_SECS;
use crate::error::MarketplaceError;

#[derive(Clone)]
pub struct RedisOAuthStateCache {
    pub pool: Pool,
}

fn oauth_state_key(state: &str) -> String {
    format!("oauth_state:{}", state)
}

impl OAuthStateCache for RedisOAuthStateCache {
    async fn store_state(&self, state: &str) -> Result<(), MarketplaceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| MarketplaceError::Internal(e.into()))?;
        let (): () = conn
            .set_ex(oauth_state_key(state), 1u8, OAUTH_STATE_TTL_SECS)
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| MarketplaceError::Internal(e.into()))?;
        Ok(())
    }

    async fn take_state(&self, state: &str) -> Result<bool, MarketplaceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| MarketplaceError::Internal(e.into()))?;
        let value: Option<u8> = conn
            .get_del(oauth_state_key(state))
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| MarketplaceError::Internal(e.into()))?;
        Ok(value.is_some())
    }
}
