use croscout_domain::user::UserRole;

use croscout_marketplace::error::MarketplaceError;
use croscout_marketplace::usecase::favorite::{
    CheckFavoriteUseCase, ListFavoritesUseCase, RemoveFavoriteUseCase, ToggleFavoriteUseCase,
};
use croscout_marketplace::usecase::property::DeletePropertyUseCase;

use crate::helpers::{MemStore, identity};

fn toggle(store: &MemStore) -> ToggleFavoriteUseCase<MemStore, MemStore, MemStore> {
    ToggleFavoriteUseCase {
        favorites: store.clone(),
        properties: store.clone(),
        users: store.clone(),
    }
}

#[tokio::test]
async fn should_add_then_remove_on_second_toggle() {
    let store = MemStore::new();
    let agent = store.add_user("Agent", "agent@example.com", UserRole::Agent);
    let guest = store.add_user("Guest", "guest@example.com", UserRole::User);
    let property = store.add_property(&agent, "River flat");
    let check = CheckFavoriteUseCase {
        favorites: store.clone(),
    };

    assert!(toggle(&store).execute(guest.id, property.id).await.unwrap());
    assert!(check.execute(guest.id, property.id).await.unwrap());
    let listed = ListFavoritesUseCase {
        favorites: store.clone(),
    }
    .execute(guest.id)
    .await
    .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, property.id);

    assert!(!toggle(&store).execute(guest.id, property.id).await.unwrap());
    assert!(!check.execute(guest.id, property.id).await.unwrap());
}

#[tokio::test]
async fn should_forbid_staff_from_keeping_favorites() {
    let store = MemStore::new();
    let agent = store.add_user("Agent", "agent@example.com", UserRole::Agent);
    let property = store.add_property(&agent, "River flat");

    let result = toggle(&store).execute(agent.id, property.id).await;
    assert!(
        matches!(result, Err(MarketplaceError::Forbidden)),
        "expected Forbidden, got {result:?}"
    );
}

#[tokio::test]
async fn should_report_missing_favorite_on_remove() {
    let store = MemStore::new();
    let agent = store.add_user("Agent", "agent@example.com", UserRole::Agent);
    let guest = store.add_user("Guest", "guest@example.com", UserRole::User);
    let property = store.add_property(&agent, "River flat");

    let result = RemoveFavoriteUseCase {
        favorites: store.clone(),
    }
    .execute(guest.id, property.id)
    .await;
    assert!(
        matches!(result, Err(MarketplaceError::FavoriteNotFound)),
        "expected FavoriteNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_drop_favorites_with_deleted_property() {
    let store = MemStore::new();
    let agent = store.add_user("Agent", "agent@example.com", UserRole::Agent);
    let guest = store.add_user("Guest", "guest@example.com", UserRole::User);
    let property = store.add_property(&agent, "River flat");
    toggle(&store).execute(guest.id, property.id).await.unwrap();

    DeletePropertyUseCase {
        properties: store.clone(),
    }
    .execute(&identity(&agent), property.id)
    .await
    .unwrap();

    let listed = ListFavoritesUseCase {
        favorites: store.clone(),
    }
    .execute(guest.id)
    .await
    .unwrap();
    assert!(listed.is_empty());
}
