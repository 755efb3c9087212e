use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use croscout_auth_types::identity::Identity;
use croscout_core::response;

use crate::error::MarketplaceError;
use crate::handlers::property::LangQuery;
use crate::state::AppState;
use crate::usecase::feedback::{CreateFeedbackInput, CreateFeedbackUseCase, ListFeedbackUseCase};
use crate::usecase::translation::{target_lang, translate_all};

// ── POST /api/properties/feedback ────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeedbackRequest {
    pub rating: u8,
    pub comment: Option<String>,
    pub booking_id: Uuid,
    pub property_id: Uuid,
}

pub async fn create_feedback(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<CreateFeedbackRequest>,
) -> Result<impl IntoResponse, MarketplaceError> {
    let usecase = CreateFeedbackUseCase {
        feedbacks: state.feedback_repo(),
        bookings: state.booking_repo(),
    };
    let feedback = usecase
        .execute(
            identity.user_id,
            CreateFeedbackInput {
                property_id: body.property_id,
                booking_id: body.booking_id,
                rating: body.rating,
                comment: body.comment,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        response::with_payload(
            "feedback",
            json!(feedback),
            Some("Feedback created successfully"),
        ),
    ))
}

// ── GET /api/properties/{propertyId}/feedbacks ───────────────────────────────

pub async fn list_feedbacks(
    State(state): State<AppState>,
    Path(property_id): Path<Uuid>,
    Query(query): Query<LangQuery>,
) -> Result<impl IntoResponse, MarketplaceError> {
    let usecase = ListFeedbackUseCase {
        feedbacks: state.feedback_repo(),
    };
    let mut feedbacks = usecase.execute(property_id).await?;
    if let Some(lang) = target_lang(query.lang.as_deref()) {
        feedbacks = translate_all(&state.translator, feedbacks, lang).await;
    }
    Ok(response::with_payload("feedbacks", json!(feedbacks), None))
}
