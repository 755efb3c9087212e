use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use croscout_domain::booking::{BookingStatus, DateRange};
use croscout_domain::pagination::Sort;
use croscout_domain::user::UserRole;

/// Account record without credential secrets.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub google_id: Option<String>,
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub role: UserRole,
    pub tax_number: Option<String>,
    pub is_completed_profile: bool,
    pub is_email_verified: bool,
    pub profile: UserProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Free-form contact and address fields, all optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub telephone_or_phone: Option<String>,
    pub street: Option<String>,
    pub house_or_building_num: Option<String>,
    pub postcode: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub image: Option<String>,
}

/// What other parties may see of a user: no email, password or role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
}

impl From<&User> for PublicProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            image: user.profile.image.clone(),
        }
    }
}

/// Partial profile update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub is_completed_profile: Option<bool>,
    pub role: Option<UserRole>,
    pub tax_number: Option<String>,
    pub profile: UserProfile,
}

/// Single-use token kinds stored on the user row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserTokenKind {
    ResetPassword,
    VerifyEmail,
}

/// Profile returned by the OAuth provider after a successful code exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthProfile {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
}

// ── Properties ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    pub amenities: Vec<String>,
    pub price_per_night: f64,
    pub location: String,
    pub state: String,
    pub property_type: String,
    pub guests: i32,
    pub property_images: Vec<String>,
    #[serde(serialize_with = "croscout_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "croscout_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

/// Property plus the values derived from its bookings and feedback.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyListing {
    #[serde(flatten)]
    pub property: Property,
    pub booked_dates: Vec<DateRange>,
    pub average_rating: Option<f64>,
}

/// Property detail with its owner's public profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDetail {
    #[serde(flatten)]
    pub listing: PropertyListing,
    pub owner: Option<PublicProfile>,
}

#[derive(Debug, Clone, Default)]
pub struct PropertyUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub amenities: Option<Vec<String>>,
    pub price_per_night: Option<f64>,
    pub location: Option<String>,
    pub state: Option<String>,
    pub property_type: Option<String>,
    pub guests: Option<i32>,
    pub property_images: Option<Vec<String>>,
}

impl PropertyUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.amenities.is_none()
            && self.price_per_night.is_none()
            && self.location.is_none()
            && self.state.is_none()
            && self.property_type.is_none()
            && self.guests.is_none()
            && self.property_images.is_none()
    }
}

/// Catalog query. Sort keys apply in the order region, price, newest.
#[derive(Debug, Clone, Default)]
pub struct PropertyFilter {
    pub location: Option<String>,
    pub category: Option<String>,
    pub min_guests: Option<i32>,
    pub region_sort: Option<Sort>,
    pub price_sort: Option<Sort>,
    pub newest: bool,
    pub limit: u64,
}

// ── Bookings ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub guest_id: Uuid,
    pub owner_id: Uuid,
    pub property_id: Uuid,
    pub price: String,
    pub total_guests: String,
    #[serde(flatten)]
    pub dates: DateRange,
    pub status: BookingStatus,
    pub agent_paypal_email: Option<String>,
    pub payment_instruction: Option<String>,
    pub user_transaction_id: Option<String>,
    #[serde(serialize_with = "croscout_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "croscout_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

/// Booking with the names of both parties, for list views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSummary {
    #[serde(flatten)]
    pub booking: Booking,
    pub guest_name: Option<String>,
    pub owner_name: Option<String>,
}

/// Booking with public profiles of both parties and the property (without booked dates).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetail {
    #[serde(flatten)]
    pub booking: Booking,
    pub guest: Option<PublicProfile>,
    pub owner: Option<PublicProfile>,
    pub property: Option<Property>,
}

/// Result of the locked overlap check + insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingInsert {
    Created,
    Overlap,
    PropertyMissing,
}

/// Result of a conditional confirm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Confirmed,
    /// Status or payment fields changed concurrently; nothing was written.
    Stale,
}

// ── Transactions ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub agent_id: Uuid,
    pub amount: f64,
    pub transaction_id: String,
    pub payment_method: String,
    #[serde(serialize_with = "croscout_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "croscout_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

// ── Feedback ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: Uuid,
    pub property_id: Uuid,
    pub user_id: Uuid,
    pub booking_id: Uuid,
    pub rating: u8,
    pub comment: Option<String>,
    #[serde(serialize_with = "croscout_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "croscout_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackWithAuthor {
    #[serde(flatten)]
    pub feedback: Feedback,
    pub user: Option<FeedbackAuthor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackAuthor {
    pub name: String,
    pub image: Option<String>,
}

// ── Dashboard ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DashboardStats {
    #[serde(rename_all = "camelCase")]
    Admin {
        user_count: u64,
        property_count: u64,
        total_revenue: f64,
        latest_bookings: Vec<BookingSummary>,
    },
    #[serde(rename_all = "camelCase")]
    Agent {
        agent_properties: u64,
        agent_revenue: f64,
        agent_bookings: u64,
        latest_agent_bookings: Vec<BookingSummary>,
    },
}

// ── Outbox / mail ────────────────────────────────────────────────────────────

/// Outbox event for async delivery (booking notifications).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEvent {
    pub id: Uuid,
    pub kind: String,
    pub payload: serde_json::Value,
    pub idempotency_key: String,
}

/// Outbox row claimed by the worker.
#[derive(Debug, Clone)]
pub struct PendingOutboxEvent {
    pub id: Uuid,
    pub kind: String,
    pub payload: serde_json::Value,
    pub attempts: i32,
}

/// Rendered email. Stored as the outbox payload and handed to the `Mailer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

impl OutboxEvent {
    /// Wrap a mail message. `key` must be unique per logical notification.
    pub fn mail(kind: &str, key: String, message: &MailMessage) -> Self {
        Self {
            id: Uuid::now_v7(),
            kind: kind.to_owned(),
            // MailMessage holds only strings; serialization cannot fail.
            payload: serde_json::to_value(message).unwrap_or_default(),
            idempotency_key: key,
        }
    }
}

/// Outbox event kinds.
pub const EVENT_BOOKING_CREATED: &str = "booking_created";
pub const EVENT_BOOKING_STATUS: &str = "booking_status_changed";
pub const EVENT_PAYMENT_DETAILS: &str = "payment_details_sent";
pub const EVENT_TRANSACTION_ID: &str = "transaction_id_submitted";

/// Reset-password and verify-email token lifetime in seconds.
pub const USER_TOKEN_TTL_SECS: i64 = 3600;

/// Random user token length in bytes (hex encoded to twice this).
pub const USER_TOKEN_BYTES: usize = 32;

/// OAuth CSRF state lifetime in seconds.
pub const OAUTH_STATE_TTL_SECS: u64 = 600;

/// Number of bookings in dashboard "latest" lists.
pub const LATEST_BOOKINGS_LIMIT: u64 = 4;

/// The only payment method recorded on transactions.
pub const PAYMENT_METHOD: &str = "Paypal";

/// Rating bounds for feedback.
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Mean of `ratings`, `None` when there are none.
pub fn average_rating(ratings: &[u8]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let sum: u32 = ratings.iter().map(|&r| u32::from(r)).sum();
    Some(f64::from(sum) / ratings.len() as f64)
}

/// Read the leading number of a client-supplied booking price such as `"120"`, `"$1,200.50"`
/// or `"100 for 2 nights"`. Currency symbols before the number are skipped and thousands
/// separators inside it are dropped. Anything after the number is ignored.
pub fn parse_price(raw: &str) -> Option<f64> {
    let rest = raw.trim_start_matches(|c: char| {
        !c.is_alphanumeric() && !matches!(c, '-' | '+' | '.')
    });
    let mut number = String::new();
    let mut has_digit = false;
    let mut has_dot = false;
    for (i, c) in rest.char_indices() {
        match c {
            '-' | '+' if i == 0 => number.push(c),
            '0'..='9' => {
                has_digit = true;
                number.push(c);
            }
            ',' if has_digit && !has_dot => {}
            '.' if !has_dot => {
                has_dot = true;
                number.push(c);
            }
            _ => break,
        }
    }
    number.parse::<f64>().ok().filter(|v| v.is_finite())
}
