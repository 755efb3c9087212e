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
use crate::usecase::dashboard::DashboardStatsUseCase;

// ── GET /api/dashboard/stats/{userId} ────────────────────────────────────────

pub async fn stats(
    identity: Identity,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, MarketplaceError> {
    if !identity.can_act_for(user_id) {
        return Err(MarketplaceError::Forbidden);
    }
    let usecase = DashboardStatsUseCase {
        users: state.user_repo(),
        properties: state.property_repo(),
        bookings: state.booking_repo(),
        transactions: state.transaction_repo(),
    };
    let stats = usecase.execute(user_id).await?;
    Ok(response::with_payload("stats", json!(stats), None))
}
