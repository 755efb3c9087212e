use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use croscout_auth_types::identity::Identity;
use croscout_core::response;

use crate::error::MarketplaceError;
use crate::state::AppState;
use crate::usecase::favorite::{
    CheckFavoriteUseCase, ListFavoritesUseCase, RemoveFavoriteUseCase, ToggleFavoriteUseCase,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    pub property_id: Uuid,
}

fn guard(identity: &Identity, user_id: Uuid) -> Result<(), MarketplaceError> {
    if identity.can_act_for(user_id) {
        Ok(())
    } else {
        Err(MarketplaceError::Forbidden)
    }
}

// ── POST /api/favorites/{userId} ─────────────────────────────────────────────

pub async fn toggle_favorite(
    identity: Identity,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<FavoriteRequest>,
) -> Result<impl IntoResponse, MarketplaceError> {
    guard(&identity, user_id)?;
    let usecase = ToggleFavoriteUseCase {
        favorites: state.favorite_repo(),
        properties: state.property_repo(),
        users: state.user_repo(),
    };
    let is_add = usecase.execute(user_id, body.property_id).await?;
    let message = if is_add {
        "Added the property to the favorite list"
    } else {
        "Removed the property from the favorite list"
    };
    Ok(Json(json!({
        "success": true,
        "isAdd": is_add,
        "message": message,
    })))
}

// ── GET /api/favorites/{userId} ──────────────────────────────────────────────

pub async fn list_favorites(
    identity: Identity,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, MarketplaceError> {
    guard(&identity, user_id)?;
    let usecase = ListFavoritesUseCase {
        favorites: state.favorite_repo(),
    };
    let properties = usecase.execute(user_id).await?;
    Ok(response::with_payload("favoritList", json!(properties), None))
}

// ── DELETE /api/favorites/{userId} ───────────────────────────────────────────

pub async fn remove_favorite(
    identity: Identity,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<FavoriteRequest>,
) -> Result<impl IntoResponse, MarketplaceError> {
    guard(&identity, user_id)?;
    let usecase = RemoveFavoriteUseCase {
        favorites: state.favorite_repo(),
    };
    usecase.execute(user_id, body.property_id).await?;
    Ok(response::message("Favorite deleted successfully"))
}

// ── GET /api/favorites/{userId}/check-favorite?property_id= ──────────────────

#[derive(Deserialize)]
pub struct CheckFavoriteQuery {
    pub property_id: Uuid,
}

pub async fn check_favorite(
    identity: Identity,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<CheckFavoriteQuery>,
) -> Result<impl IntoResponse, MarketplaceError> {
    guard(&identity, user_id)?;
    let usecase = CheckFavoriteUseCase {
        favorites: state.favorite_repo(),
    };
    let is_in_favorites = usecase.execute(user_id, query.property_id).await?;
    Ok(Json(json!({ "isInFavorites": is_in_favorites })))
}
