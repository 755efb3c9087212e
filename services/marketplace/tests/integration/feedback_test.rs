use croscout_domain::user::UserRole;

use croscout_marketplace::domain::types::Booking;
use croscout_marketplace::error::MarketplaceError;
use croscout_marketplace::usecase::booking::{
    CreateBookingInput, CreateBookingUseCase, ManageBookingUseCase, SubmitTransactionIdUseCase,
    UpdatePaymentDetailsUseCase,
};
use croscout_marketplace::usecase::feedback::{
    CreateFeedbackInput, CreateFeedbackUseCase, ListFeedbackUseCase,
};
use croscout_marketplace::usecase::property::GetPropertyUseCase;

use crate::helpers::{MemStore, identity, june};

struct World {
    store: MemStore,
    agent: croscout_marketplace::domain::types::User,
    guest: croscout_marketplace::domain::types::User,
    booking: Booking,
}

async fn world() -> World {
    let store = MemStore::new();
    let agent = store.add_user("Agent", "agent@example.com", UserRole::Agent);
    let guest = store.add_user("Guest", "guest@example.com", UserRole::User);
    let property = store.add_property(&agent, "River flat");
    let booking = CreateBookingUseCase {
        bookings: store.clone(),
        properties: store.clone(),
        users: store.clone(),
    }
    .execute(
        guest.id,
        CreateBookingInput {
            property_id: property.id,
            price: "320".to_owned(),
            total_guests: "2".to_owned(),
            start_date: june(10),
            end_date: june(14),
        },
    )
    .await
    .unwrap();
    World {
        store,
        agent,
        guest,
        booking,
    }
}

async fn confirm(w: &World) {
    UpdatePaymentDetailsUseCase {
        bookings: w.store.clone(),
        users: w.store.clone(),
    }
    .execute(&identity(&w.agent), w.booking.id, "agent@paypal.example", "Pay now")
    .await
    .unwrap();
    SubmitTransactionIdUseCase {
        bookings: w.store.clone(),
        users: w.store.clone(),
    }
    .execute(&identity(&w.guest), w.booking.id, "PAY-9")
    .await
    .unwrap();
    ManageBookingUseCase {
        bookings: w.store.clone(),
        users: w.store.clone(),
    }
    .execute(&identity(&w.agent), w.booking.id, "confirm")
    .await
    .unwrap();
}

fn review(w: &World, rating: u8) -> CreateFeedbackInput {
    CreateFeedbackInput {
        property_id: w.booking.property_id,
        booking_id: w.booking.id,
        rating,
        comment: Some("Lovely stay".to_owned()),
    }
}

fn create(w: &World) -> CreateFeedbackUseCase<MemStore, MemStore> {
    CreateFeedbackUseCase {
        feedbacks: w.store.clone(),
        bookings: w.store.clone(),
    }
}

#[tokio::test]
async fn should_reject_feedback_while_booking_pending() {
    let w = world().await;
    let result = create(&w).execute(w.guest.id, review(&w, 5)).await;
    assert!(
        matches!(result, Err(MarketplaceError::BookingPending)),
        "expected BookingPending, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_feedback_from_someone_else() {
    let w = world().await;
    confirm(&w).await;
    let result = create(&w).execute(w.agent.id, review(&w, 4)).await;
    assert!(
        matches!(result, Err(MarketplaceError::BookingRequired)),
        "expected BookingRequired, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_out_of_range_rating() {
    let w = world().await;
    confirm(&w).await;
    let result = create(&w).execute(w.guest.id, review(&w, 6)).await;
    assert!(
        matches!(result, Err(MarketplaceError::InvalidRating)),
        "expected InvalidRating, got {result:?}"
    );
}

#[tokio::test]
async fn should_accept_feedback_after_confirmation_and_update_average() {
    let w = world().await;
    let list = ListFeedbackUseCase {
        feedbacks: w.store.clone(),
    };
    let empty = list.execute(w.booking.property_id).await;
    assert!(
        matches!(empty, Err(MarketplaceError::FeedbackNotFound)),
        "expected FeedbackNotFound, got {empty:?}"
    );

    confirm(&w).await;
    create(&w).execute(w.guest.id, review(&w, 4)).await.unwrap();

    let feedbacks = list.execute(w.booking.property_id).await.unwrap();
    assert_eq!(feedbacks.len(), 1);
    assert_eq!(feedbacks[0].user.as_ref().map(|a| a.name.as_str()), Some("Guest"));

    let detail = GetPropertyUseCase {
        properties: w.store.clone(),
        users: w.store.clone(),
    }
    .execute(w.booking.property_id)
    .await
    .unwrap();
    assert_eq!(detail.listing.average_rating, Some(4.0));
}
