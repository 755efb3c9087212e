use croscout_domain::booking::BookingStatus;
use croscout_domain::user::UserRole;

use croscout_marketplace::domain::types::{EVENT_BOOKING_CREATED, EVENT_BOOKING_STATUS};
use croscout_marketplace::error::MarketplaceError;
use croscout_marketplace::usecase::booking::{
    CreateBookingInput, CreateBookingUseCase, ManageBookingUseCase, SubmitTransactionIdUseCase,
    UpdatePaymentDetailsUseCase,
};
use croscout_marketplace::usecase::dashboard::DashboardStatsUseCase;
use croscout_marketplace::usecase::property::GetPropertyUseCase;
use croscout_marketplace::usecase::transaction::ListUserTransactionsUseCase;

use crate::helpers::{MemStore, identity, june};

fn create_usecase(store: &MemStore) -> CreateBookingUseCase<MemStore, MemStore, MemStore> {
    CreateBookingUseCase {
        bookings: store.clone(),
        properties: store.clone(),
        users: store.clone(),
    }
}

fn input(property_id: uuid::Uuid, start: u32, end: u32) -> CreateBookingInput {
    CreateBookingInput {
        property_id,
        price: "€400".to_owned(),
        total_guests: "2".to_owned(),
        start_date: june(start),
        end_date: june(end),
    }
}

// ── CreateBookingUseCase ─────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_overlapping_ranges_and_accept_adjacent_ones() {
    let store = MemStore::new();
    let agent = store.add_user("Agent", "agent@example.com", UserRole::Agent);
    let guest = store.add_user("Guest", "guest@example.com", UserRole::User);
    let property = store.add_property(&agent, "River flat");
    let usecase = create_usecase(&store);

    let first = usecase.execute(guest.id, input(property.id, 1, 5)).await.unwrap();
    assert_eq!(first.status, BookingStatus::Pending);
    assert_eq!(first.owner_id, agent.id);

    let overlap = usecase.execute(guest.id, input(property.id, 4, 8)).await;
    assert!(
        matches!(overlap, Err(MarketplaceError::PropertyAlreadyBooked)),
        "expected PropertyAlreadyBooked, got {overlap:?}"
    );

    usecase.execute(guest.id, input(property.id, 6, 10)).await.unwrap();

    let detail = GetPropertyUseCase {
        properties: store.clone(),
        users: store.clone(),
    }
    .execute(property.id)
    .await
    .unwrap();
    assert_eq!(detail.listing.booked_dates.len(), 2);
    assert_eq!(
        store.outbox_kinds(),
        vec![EVENT_BOOKING_CREATED, EVENT_BOOKING_CREATED]
    );
}

#[tokio::test]
async fn should_reject_inverted_date_range() {
    let store = MemStore::new();
    let agent = store.add_user("Agent", "agent@example.com", UserRole::Agent);
    let guest = store.add_user("Guest", "guest@example.com", UserRole::User);
    let property = store.add_property(&agent, "River flat");

    let result = create_usecase(&store)
        .execute(guest.id, input(property.id, 9, 2))
        .await;
    assert!(
        matches!(result, Err(MarketplaceError::InvalidDateRange)),
        "expected InvalidDateRange, got {result:?}"
    );
}

#[tokio::test]
async fn should_return_not_found_for_missing_property() {
    let store = MemStore::new();
    let guest = store.add_user("Guest", "guest@example.com", UserRole::User);

    let result = create_usecase(&store)
        .execute(guest.id, input(uuid::Uuid::now_v7(), 1, 2))
        .await;
    assert!(
        matches!(result, Err(MarketplaceError::BookedPropertyNotFound)),
        "expected BookedPropertyNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_booking_without_readable_price_or_guests() {
    let store = MemStore::new();
    let agent = store.add_user("Agent", "agent@example.com", UserRole::Agent);
    let guest = store.add_user("Guest", "guest@example.com", UserRole::User);
    let property = store.add_property(&agent, "River flat");
    let usecase = create_usecase(&store);

    let blank = usecase
        .execute(
            guest.id,
            CreateBookingInput {
                price: "  ".to_owned(),
                total_guests: String::new(),
                ..input(property.id, 1, 5)
            },
        )
        .await;
    assert!(
        matches!(blank, Err(MarketplaceError::MissingBookingDetails)),
        "expected MissingBookingDetails, got {blank:?}"
    );

    let unreadable = usecase
        .execute(
            guest.id,
            CreateBookingInput {
                price: "ask the host".to_owned(),
                ..input(property.id, 1, 5)
            },
        )
        .await;
    assert!(
        matches!(unreadable, Err(MarketplaceError::InvalidPrice)),
        "expected InvalidPrice, got {unreadable:?}"
    );
    assert!(store.outbox_kinds().is_empty());

    // Rejected attempts hold no dates.
    let booking = usecase
        .execute(
            guest.id,
            CreateBookingInput {
                price: "100 for 2 nights".to_owned(),
                ..input(property.id, 1, 5)
            },
        )
        .await
        .unwrap();
    assert_eq!(booking.price, "100 for 2 nights");
}

// ── payment exchange and confirmation ────────────────────────────────────────

#[tokio::test]
async fn should_confirm_after_payment_exchange_and_record_transaction() {
    let store = MemStore::new();
    let agent = store.add_user("Agent", "agent@example.com", UserRole::Agent);
    let guest = store.add_user("Guest", "guest@example.com", UserRole::User);
    let property = store.add_property(&agent, "River flat");
    let booking = create_usecase(&store)
        .execute(guest.id, input(property.id, 1, 5))
        .await
        .unwrap();

    let manage = ManageBookingUseCase {
        bookings: store.clone(),
        users: store.clone(),
    };
    let early = manage.execute(&identity(&agent), booking.id, "confirm").await;
    assert!(
        matches!(early, Err(MarketplaceError::PaymentRequestNotSent)),
        "expected PaymentRequestNotSent, got {early:?}"
    );

    let with_details = UpdatePaymentDetailsUseCase {
        bookings: store.clone(),
        users: store.clone(),
    }
    .execute(&identity(&agent), booking.id, "agent@paypal.example", "Pay within 24h")
    .await
    .unwrap();
    assert_eq!(
        with_details.agent_paypal_email.as_deref(),
        Some("agent@paypal.example")
    );

    let waiting = manage.execute(&identity(&agent), booking.id, "confirm").await;
    assert!(
        matches!(waiting, Err(MarketplaceError::TransactionIdNotReceived)),
        "expected TransactionIdNotReceived, got {waiting:?}"
    );

    SubmitTransactionIdUseCase {
        bookings: store.clone(),
        users: store.clone(),
    }
    .execute(&identity(&guest), booking.id, "PAY-123")
    .await
    .unwrap();

    let confirmed = manage
        .execute(&identity(&agent), booking.id, "confirm")
        .await
        .unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);
    assert_eq!(
        store.booking(booking.id).unwrap().status,
        BookingStatus::Confirmed
    );

    let transactions = ListUserTransactionsUseCase {
        transactions: store.clone(),
        users: store.clone(),
    }
    .execute(guest.id)
    .await
    .unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].amount, 400.0);
    assert_eq!(transactions[0].transaction_id, "PAY-123");
    assert_eq!(transactions[0].agent_id, agent.id);

    let again = manage.execute(&identity(&agent), booking.id, "confirm").await;
    assert!(
        matches!(again, Err(MarketplaceError::AlreadyConfirmed)),
        "expected AlreadyConfirmed, got {again:?}"
    );
    let cancel = manage.execute(&identity(&guest), booking.id, "cancel").await;
    assert!(
        matches!(cancel, Err(MarketplaceError::CancelAfterConfirm)),
        "expected CancelAfterConfirm, got {cancel:?}"
    );
    assert_eq!(
        store.outbox_kinds().last().map(String::as_str),
        Some(EVENT_BOOKING_STATUS)
    );
}

#[tokio::test]
async fn should_free_dates_when_pending_booking_is_cancelled() {
    let store = MemStore::new();
    let agent = store.add_user("Agent", "agent@example.com", UserRole::Agent);
    let guest = store.add_user("Guest", "guest@example.com", UserRole::User);
    let property = store.add_property(&agent, "River flat");
    let usecase = create_usecase(&store);
    let booking = usecase.execute(guest.id, input(property.id, 1, 5)).await.unwrap();

    let cancelled = ManageBookingUseCase {
        bookings: store.clone(),
        users: store.clone(),
    }
    .execute(&identity(&guest), booking.id, "cancel")
    .await
    .unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert!(store.booking(booking.id).is_none());

    usecase.execute(guest.id, input(property.id, 2, 4)).await.unwrap();
}

// ── DashboardStatsUseCase ────────────────────────────────────────────────────

#[tokio::test]
async fn should_report_agent_rollups_and_forbid_plain_users() {
    let store = MemStore::new();
    let agent = store.add_user("Agent", "agent@example.com", UserRole::Agent);
    let guest = store.add_user("Guest", "guest@example.com", UserRole::User);
    let property = store.add_property(&agent, "River flat");
    create_usecase(&store)
        .execute(guest.id, input(property.id, 1, 5))
        .await
        .unwrap();

    let usecase = DashboardStatsUseCase {
        users: store.clone(),
        properties: store.clone(),
        bookings: store.clone(),
        transactions: store.clone(),
    };
    let stats = serde_json::to_value(usecase.execute(agent.id).await.unwrap()).unwrap();
    assert_eq!(stats["agentProperties"], 1);
    assert_eq!(stats["agentBookings"], 1);
    assert_eq!(stats["agentRevenue"], 0.0);
    assert_eq!(stats["latestAgentBookings"][0]["guestName"], "Guest");

    let denied = usecase.execute(guest.id).await;
    assert!(
        matches!(denied, Err(MarketplaceError::DashboardForbidden)),
        "expected DashboardForbidden, got {denied:?}"
    );
}

#[tokio::test]
async fn should_report_admin_rollups_with_latest_four_bookings() {
    let store = MemStore::new();
    let agent = store.add_user("Agent", "agent@example.com", UserRole::Agent);
    let guest = store.add_user("Guest", "guest@example.com", UserRole::User);
    let admin = store.add_user("Admin", "admin@example.com", UserRole::Admin);
    let flat = store.add_property(&agent, "River flat");
    store.add_property(&agent, "Hill cabin");

    let create = create_usecase(&store);
    let mut created = Vec::new();
    for day in [1, 4, 7, 10, 13] {
        let booking = create
            .execute(guest.id, input(flat.id, day, day + 1))
            .await
            .unwrap();
        created.push(booking.id);
    }

    UpdatePaymentDetailsUseCase {
        bookings: store.clone(),
        users: store.clone(),
    }
    .execute(&identity(&agent), created[0], "agent@paypal.example", "Pay within 24h")
    .await
    .unwrap();
    SubmitTransactionIdUseCase {
        bookings: store.clone(),
        users: store.clone(),
    }
    .execute(&identity(&guest), created[0], "PAY-1")
    .await
    .unwrap();
    ManageBookingUseCase {
        bookings: store.clone(),
        users: store.clone(),
    }
    .execute(&identity(&admin), created[0], "confirm")
    .await
    .unwrap();

    let stats = DashboardStatsUseCase {
        users: store.clone(),
        properties: store.clone(),
        bookings: store.clone(),
        transactions: store.clone(),
    }
    .execute(admin.id)
    .await
    .unwrap();
    let stats = serde_json::to_value(stats).unwrap();
    assert_eq!(stats["userCount"], 3);
    assert_eq!(stats["propertyCount"], 2);
    assert_eq!(stats["totalRevenue"], 400.0);

    let latest: Vec<String> = stats["latestBookings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_str().unwrap().to_owned())
        .collect();
    let expected: Vec<String> = created.iter().rev().take(4).map(|id| id.to_string()).collect();
    assert_eq!(latest, expected);
    assert_eq!(stats["latestBookings"][0]["guestName"], "Guest");
}
