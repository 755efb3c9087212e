use uuid::Uuid;

use crate::domain::repository::{FavoriteRepository, PropertyRepository, UserRepository};
use crate::domain::types::Property;
use crate::error::MarketplaceError;

// ── ToggleFavorite ───────────────────────────────────────────────────────────

pub struct ToggleFavoriteUseCase<F: FavoriteRepository, P: PropertyRepository, U: UserRepository> {
    pub favorites: F,
    pub properties: P,
    pub users: U,
}

impl<F: FavoriteRepository, P: PropertyRepository, U: UserRepository>
    ToggleFavoriteUseCase<F, P, U>
{
    /// Returns `true` when the property was added, `false` when it was removed.
    pub async fn execute(&self, user_id: Uuid, property_id: Uuid) -> Result<bool, MarketplaceError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(MarketplaceError::UserIdNotFound)?;
        if user.role.is_staff() {
            return Err(MarketplaceError::Forbidden);
        }
        if self.properties.find_by_id(property_id).await?.is_none() {
            return Err(MarketplaceError::PropertyNotFound);
        }
        self.favorites.toggle(user_id, property_id).await
    }
}

// ── ListFavorites ────────────────────────────────────────────────────────────

pub struct ListFavoritesUseCase<F: FavoriteRepository> {
    pub favorites: F,
}

impl<F: FavoriteRepository> ListFavoritesUseCase<F> {
    pub async fn execute(&self, user_id: Uuid) -> Result<Vec<Property>, MarketplaceError> {
        self.favorites.list(user_id).await
    }
}

// ── RemoveFavorite ───────────────────────────────────────────────────────────

pub struct RemoveFavoriteUseCase<F: FavoriteRepository> {
    pub favorites: F,
}

impl<F: FavoriteRepository> RemoveFavoriteUseCase<F> {
    pub async fn execute(&self, user_id: Uuid, property_id: Uuid) -> Result<(), MarketplaceError> {
        if !self.favorites.remove(user_id, property_id).await? {
            return Err(MarketplaceError::FavoriteNotFound);
        }
        Ok(())
    }
}

// ── CheckFavorite ────────────────────────────────────────────────────────────

pub struct CheckFavoriteUseCase<F: FavoriteRepository> {
    pub favorites: F,
}

impl<F: FavoriteRepository> CheckFavoriteUseCase<F> {
    pub async fn execute(&self, user_id: Uuid, property_id: Uuid) -> Result<bool, MarketplaceError> {
        self.favorites.contains(user_id, property_id).await
    }
}
