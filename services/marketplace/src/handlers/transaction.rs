use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;

use croscout_auth_types::identity::Identity;
use croscout_core::response;

use crate::error::MarketplaceError;
use crate::state::AppState;
use crate::usecase::transaction::{ListTransactionsUseCase, ListUserTransactionsUseCase};

// ── GET /api/transactions ────────────────────────────────────────────────────

pub async fn list_transactions(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, MarketplaceError> {
    if !identity.is_admin() {
        return Err(MarketplaceError::Forbidden);
    }
    let usecase = ListTransactionsUseCase {
        transactions: state.transaction_repo(),
    };
    let transactions = usecase.execute().await?;
    Ok(response::with_payload("transactions", json!(transactions), None))
}

// ── GET /api/transactions/{userId} ───────────────────────────────────────────

pub async fn list_user_transactions(
    identity: Identity,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, MarketplaceError> {
    if !identity.can_act_for(user_id) {
        return Err(MarketplaceError::Forbidden);
    }
    let usecase = ListUserTransactionsUseCase {
        transactions: state.transaction_repo(),
        users: state.user_repo(),
    };
    let transactions = usecase.execute(user_id).await?;
    Ok(response::with_payload("transactions", json!(transactions), None))
}
