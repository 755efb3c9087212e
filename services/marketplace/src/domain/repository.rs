#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use croscout_domain::booking::DateRange;
use croscout_domain::user::UserRole;

use crate::domain::types::{
    Booking, BookingInsert, ConfirmOutcome, Feedback, FeedbackWithAuthor, MailMessage,
    OAuthProfile, OutboxEvent, PendingOutboxEvent, Property, PropertyFilter, PropertyUpdate,
    Transaction, User, UserTokenKind, UserUpdate,
};
use crate::error::MarketplaceError;

/// Repository for accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, MarketplaceError>;
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, MarketplaceError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, MarketplaceError>;
    async fn find_by_google_id(&self, sub: &str) -> Result<Option<User>, MarketplaceError>;

    /// All users, or only those with `role`.
    async fn list(&self, role: Option<UserRole>) -> Result<Vec<User>, MarketplaceError>;
    async fn count(&self) -> Result<u64, MarketplaceError>;

    async fn create(&self, user: &User) -> Result<(), MarketplaceError>;

    /// Attach an OAuth subject to an existing account.
    async fn link_google(
        &self,
        id: Uuid,
        sub: &str,
        email_verified: bool,
    ) -> Result<(), MarketplaceError>;

    /// Apply a partial update. Returns `false` if the user does not exist.
    async fn update(&self, id: Uuid, update: &UserUpdate) -> Result<bool, MarketplaceError>;

    async fn set_password(&self, id: Uuid, password_hash: &str) -> Result<(), MarketplaceError>;

    /// Delete a user. Returns `true` if a row was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError>;

    /// Store a single-use token, replacing any previous token of the same kind.
    async fn set_token(
        &self,
        id: Uuid,
        kind: UserTokenKind,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), MarketplaceError>;

    /// Set a new password for the holder of an unexpired reset token and clear the token.
    /// Returns `false` when no user holds it.
    async fn consume_reset_token(
        &self,
        token: &str,
        password_hash: &str,
    ) -> Result<bool, MarketplaceError>;

    /// Mark the holder of an unexpired verify token as verified and clear the token.
    /// Returns `false` when no user holds it.
    async fn consume_verify_token(&self, token: &str) -> Result<bool, MarketplaceError>;
}

/// Repository for property listings.
pub trait PropertyRepository: Send + Sync {
    async fn create(&self, property: &Property) -> Result<(), MarketplaceError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Property>, MarketplaceError>;
    async fn list(&self, filter: &PropertyFilter) -> Result<Vec<Property>, MarketplaceError>;
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Property>, MarketplaceError>;

    /// Count all properties, or those of one owner.
    async fn count(&self, owner_id: Option<Uuid>) -> Result<u64, MarketplaceError>;

    /// Apply a partial update. Returns `None` if the property does not exist.
    async fn update(
        &self,
        id: Uuid,
        update: &PropertyUpdate,
    ) -> Result<Option<Property>, MarketplaceError>;

    /// Delete a property with its bookings, favorites and feedback.
    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError>;

    /// Date ranges of existing bookings, keyed by property.
    async fn booked_dates(
        &self,
        property_ids: &[Uuid],
    ) -> Result<Vec<(Uuid, DateRange)>, MarketplaceError>;

    /// Feedback ratings, keyed by property.
    async fn ratings(&self, property_ids: &[Uuid]) -> Result<Vec<(Uuid, u8)>, MarketplaceError>;
}

/// Repository for bookings. Every write that notifies someone takes its outbox event and
/// commits both in one transaction.
pub trait BookingRepository: Send + Sync {
    /// Lock the property, reject overlapping ranges, insert the booking and the event.
    async fn create_if_available(
        &self,
        booking: &Booking,
        event: &OutboxEvent,
    ) -> Result<BookingInsert, MarketplaceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, MarketplaceError>;
    async fn list_all(&self) -> Result<Vec<Booking>, MarketplaceError>;
    async fn list_by_guest(&self, guest_id: Uuid) -> Result<Vec<Booking>, MarketplaceError>;
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Booking>, MarketplaceError>;

    /// Newest bookings first, optionally only those of one owner.
    async fn latest(
        &self,
        owner_id: Option<Uuid>,
        limit: u64,
    ) -> Result<Vec<Booking>, MarketplaceError>;

    async fn count_by_owner(&self, owner_id: Uuid) -> Result<u64, MarketplaceError>;

    /// Write both payment fields if neither is set. Returns `false` if already set.
    async fn set_payment_details(
        &self,
        id: Uuid,
        agent_paypal_email: &str,
        payment_instruction: &str,
        event: &OutboxEvent,
    ) -> Result<bool, MarketplaceError>;

    /// Write the guest's transaction id if unset. Returns `false` if already set.
    async fn set_transaction_id(
        &self,
        id: Uuid,
        user_transaction_id: &str,
        event: &OutboxEvent,
    ) -> Result<bool, MarketplaceError>;

    /// Flip a pending booking with both payment fields to confirmed and record the transaction.
    async fn confirm(
        &self,
        id: Uuid,
        transaction: &Transaction,
        event: &OutboxEvent,
    ) -> Result<ConfirmOutcome, MarketplaceError>;

    /// Delete a booking that is not confirmed. Returns `false` if nothing was deleted.
    async fn cancel(&self, id: Uuid, event: &OutboxEvent) -> Result<bool, MarketplaceError>;

    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError>;
}

/// Read-only payment ledger.
pub trait TransactionRepository: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Transaction>, MarketplaceError>;
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Transaction>, MarketplaceError>;
    async fn list_by_agent(&self, agent_id: Uuid) -> Result<Vec<Transaction>, MarketplaceError>;

    /// Sum of amounts, globally or for one agent.
    async fn revenue(&self, agent_id: Option<Uuid>) -> Result<f64, MarketplaceError>;
}

pub trait FavoriteRepository: Send + Sync {
    /// Add the property if absent, remove it if present. Returns `true` when added.
    async fn toggle(&self, user_id: Uuid, property_id: Uuid) -> Result<bool, MarketplaceError>;

    /// Returns `true` if the property was in the set.
    async fn remove(&self, user_id: Uuid, property_id: Uuid) -> Result<bool, MarketplaceError>;

    async fn contains(&self, user_id: Uuid, property_id: Uuid) -> Result<bool, MarketplaceError>;
    async fn list(&self, user_id: Uuid) -> Result<Vec<Property>, MarketplaceError>;
}

pub trait FeedbackRepository: Send + Sync {
    async fn create(&self, feedback: &Feedback) -> Result<(), MarketplaceError>;
    async fn list_by_property(
        &self,
        property_id: Uuid,
    ) -> Result<Vec<FeedbackWithAuthor>, MarketplaceError>;
}

/// Outbox rows as seen by the delivery worker.
pub trait OutboxRepository: Send + Sync {
    /// Unprocessed, unfailed events whose `next_attempt_at` has passed, oldest first.
    async fn fetch_due(&self, limit: u64) -> Result<Vec<PendingOutboxEvent>, MarketplaceError>;
    async fn mark_processed(&self, id: Uuid) -> Result<(), MarketplaceError>;

    /// Record a failed attempt. `retry_at = None` gives up and sets `failed_at`.
    async fn record_failure(
        &self,
        id: Uuid,
        attempts: i32,
        error: &str,
        retry_at: Option<DateTime<Utc>>,
    ) -> Result<(), MarketplaceError>;
}

/// Short-lived OAuth CSRF states (Redis).
pub trait OAuthStateCache: Send + Sync {
    async fn store_state(&self, state: &str) -> Result<(), MarketplaceError>;

    /// Remove the state. Returns `true` if it existed.
    async fn take_state(&self, state: &str) -> Result<bool, MarketplaceError>;
}

/// Third-party sign-in provider.
pub trait OAuthProvider: Send + Sync {
    /// Consent page URL and the CSRF state embedded in it.
    fn authorize_url(&self) -> (String, String);

    async fn fetch_profile(&self, code: &str) -> Result<OAuthProfile, MarketplaceError>;
}

/// Outbound email transport.
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &MailMessage) -> anyhow::Result<()>;
}

/// External text translation.
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_lang: &str) -> anyhow::Result<String>;
}
