use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use croscout_auth_types::identity::Identity;
use croscout_core::response;

use crate::error::MarketplaceError;
use crate::handlers::property::LangQuery;
use crate::state::AppState;
use crate::usecase::booking::{
    CreateBookingInput, CreateBookingUseCase, DeleteBookingUseCase, GetBookingUseCase,
    ListBookingsUseCase, ListUserBookingsUseCase, ManageBookingUseCase,
    SubmitTransactionIdUseCase, UpdatePaymentDetailsUseCase,
};
use crate::usecase::translation::{target_lang, translate_all, translate_item};

// ── POST /api/bookings ───────────────────────────────────────────────────────

/// Price and guest count stay strings, clients send them as typed.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub property_id: Uuid,
    pub price: String,
    pub total_guests: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

pub async fn create_booking(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, MarketplaceError> {
    let usecase = CreateBookingUseCase {
        bookings: state.booking_repo(),
        properties: state.property_repo(),
        users: state.user_repo(),
    };
    let booking = usecase
        .execute(
            identity.user_id,
            CreateBookingInput {
                property_id: body.property_id,
                price: body.price,
                total_guests: body.total_guests,
                start_date: body.start_date,
                end_date: body.end_date,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        response::with_payload("booking", json!(booking), Some("Booking successfully created")),
    ))
}

// ── GET /api/bookings ────────────────────────────────────────────────────────

pub async fn list_bookings(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, MarketplaceError> {
    if !identity.is_admin() {
        return Err(MarketplaceError::Forbidden);
    }
    let usecase = ListBookingsUseCase {
        bookings: state.booking_repo(),
        users: state.user_repo(),
    };
    let bookings = usecase.execute().await?;
    Ok(response::with_payload("bookings", json!(bookings), None))
}

// ── GET /api/bookings/{bookingId} ────────────────────────────────────────────

pub async fn get_booking(
    _identity: Identity,
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Query(query): Query<LangQuery>,
) -> Result<impl IntoResponse, MarketplaceError> {
    let usecase = GetBookingUseCase {
        bookings: state.booking_repo(),
        properties: state.property_repo(),
        users: state.user_repo(),
    };
    let mut booking = usecase.execute(booking_id).await?;
    if let Some(lang) = target_lang(query.lang.as_deref()) {
        booking = translate_item(&state.translator, booking, lang).await;
    }
    Ok(response::with_payload("booking", json!(booking), None))
}

// ── GET /api/bookings/user/{userId} ──────────────────────────────────────────

pub async fn list_user_bookings(
    identity: Identity,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<LangQuery>,
) -> Result<impl IntoResponse, MarketplaceError> {
    if !identity.can_act_for(user_id) {
        return Err(MarketplaceError::Forbidden);
    }
    let usecase = ListUserBookingsUseCase {
        bookings: state.booking_repo(),
        users: state.user_repo(),
    };
    let mut bookings = usecase.execute(user_id).await?;
    if let Some(lang) = target_lang(query.lang.as_deref()) {
        bookings = translate_all(&state.translator, bookings, lang).await;
    }
    Ok(response::with_payload("bookings", json!(bookings), None))
}

// ── PUT /api/bookings/{bookingId} ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ManageBookingRequest {
    #[serde(default)]
    pub action: String,
}

pub async fn manage_booking(
    identity: Identity,
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(body): Json<ManageBookingRequest>,
) -> Result<impl IntoResponse, MarketplaceError> {
    let usecase = ManageBookingUseCase {
        bookings: state.booking_repo(),
        users: state.user_repo(),
    };
    let booking = usecase.execute(&identity, booking_id, &body.action).await?;
    let message = format!("Your booking has been {}.", booking.status.as_str());
    Ok(response::with_payload(
        "booking",
        json!(booking),
        Some(message.as_str()),
    ))
}

// ── DELETE /api/bookings/{bookingId} ─────────────────────────────────────────

pub async fn delete_booking(
    identity: Identity,
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, MarketplaceError> {
    let usecase = DeleteBookingUseCase {
        bookings: state.booking_repo(),
    };
    usecase.execute(&identity, booking_id).await?;
    Ok(response::message("Booking deleted successfully."))
}

// ── PUT /api/bookings/{bookingId}/payment-details ────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetailsRequest {
    #[serde(default)]
    pub agent_paypal_email: String,
    #[serde(default)]
    pub payment_instruction: String,
}

pub async fn update_payment_details(
    identity: Identity,
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(body): Json<PaymentDetailsRequest>,
) -> Result<impl IntoResponse, MarketplaceError> {
    let usecase = UpdatePaymentDetailsUseCase {
        bookings: state.booking_repo(),
        users: state.user_repo(),
    };
    let booking = usecase
        .execute(
            &identity,
            booking_id,
            body.agent_paypal_email.trim(),
            &body.payment_instruction,
        )
        .await?;
    Ok(response::with_payload(
        "booking",
        json!(booking),
        Some("Payment details updated"),
    ))
}

// ── POST /api/bookings/{bookingId}/transaction-id ────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionIdRequest {
    #[serde(default)]
    pub user_transaction_id: String,
}

pub async fn submit_transaction_id(
    identity: Identity,
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(body): Json<TransactionIdRequest>,
) -> Result<impl IntoResponse, MarketplaceError> {
    let usecase = SubmitTransactionIdUseCase {
        bookings: state.booking_repo(),
        users: state.user_repo(),
    };
    let booking = usecase
        .execute(&identity, booking_id, body.user_transaction_id.trim())
        .await?;
    Ok(response::with_payload(
        "booking",
        json!(booking),
        Some("Transaction ID updated successfully"),
    ))
}
