use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use croscout_auth_types::identity::Identity;
use croscout_domain::booking::{BookingStatus, DateRange};
use croscout_domain::user::UserRole;

use croscout_marketplace::domain::repository::{
    BookingRepository, FavoriteRepository, FeedbackRepository, Mailer, PropertyRepository,
    TransactionRepository, UserRepository,
};
use croscout_marketplace::domain::types::{
    Booking, BookingInsert, ConfirmOutcome, Feedback, FeedbackAuthor, FeedbackWithAuthor,
    MailMessage, OutboxEvent, Property, PropertyFilter, PropertyUpdate, Transaction, User,
    UserProfile, UserTokenKind, UserUpdate,
};
use croscout_marketplace::error::MarketplaceError;
use croscout_marketplace::infra::password::hash_password;

pub const TEST_PASSWORD: &str = "hunter22";

// ── MemStore ─────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct Tables {
    pub users: Vec<User>,
    pub tokens: HashMap<(Uuid, &'static str), (String, DateTime<Utc>)>,
    pub properties: Vec<Property>,
    pub bookings: Vec<Booking>,
    pub transactions: Vec<Transaction>,
    pub favorites: Vec<(Uuid, Uuid)>,
    pub feedbacks: Vec<Feedback>,
    pub outbox: Vec<OutboxEvent>,
}

/// One shared in-memory database implementing every repository trait.
#[derive(Clone, Default)]
pub struct MemStore {
    pub tables: Arc<Mutex<Tables>>,
}

fn token_slot(kind: UserTokenKind) -> &'static str {
    match kind {
        UserTokenKind::ResetPassword => "reset",
        UserTokenKind::VerifyEmail => "verify",
    }
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, name: &str, email: &str, role: UserRole) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            google_id: None,
            name: name.to_owned(),
            email: email.to_owned(),
            password_hash: Some(hash_password(TEST_PASSWORD).unwrap()),
            role,
            tax_number: (role == UserRole::Agent).then(|| "TAX-1".to_owned()),
            is_completed_profile: false,
            is_email_verified: false,
            profile: UserProfile::default(),
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().unwrap().users.push(user.clone());
        user
    }

    pub fn add_property(&self, owner: &User, name: &str) -> Property {
        let now = Utc::now();
        let property = Property {
            id: Uuid::now_v7(),
            owner_id: owner.id,
            name: name.to_owned(),
            description: "Quiet flat near the river".to_owned(),
            amenities: vec!["wifi".to_owned()],
            price_per_night: 80.0,
            location: "Berlin".to_owned(),
            state: "Berlin".to_owned(),
            property_type: "Apartment".to_owned(),
            guests: 4,
            property_images: vec![],
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().unwrap().properties.push(property.clone());
        property
    }

    pub fn token_of(&self, user_id: Uuid, kind: UserTokenKind) -> Option<String> {
        self.tables
            .lock()
            .unwrap()
            .tokens
            .get(&(user_id, token_slot(kind)))
            .map(|(t, _)| t.clone())
    }

    pub fn booking(&self, id: Uuid) -> Option<Booking> {
        self.tables
            .lock()
            .unwrap()
            .bookings
            .iter()
            .find(|b| b.id == id)
            .cloned()
    }

    pub fn outbox_kinds(&self) -> Vec<String> {
        self.tables
            .lock()
            .unwrap()
            .outbox
            .iter()
            .map(|e| e.kind.clone())
            .collect()
    }
}

impl UserRepository for MemStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, MarketplaceError> {
        let t = self.tables.lock().unwrap();
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, MarketplaceError> {
        let t = self.tables.lock().unwrap();
        Ok(t.users.iter().filter(|u| ids.contains(&u.id)).cloned().collect())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, MarketplaceError> {
        let t = self.tables.lock().unwrap();
        Ok(t.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_google_id(&self, sub: &str) -> Result<Option<User>, MarketplaceError> {
        let t = self.tables.lock().unwrap();
        Ok(t.users
            .iter()
            .find(|u| u.google_id.as_deref() == Some(sub))
            .cloned())
    }

    async fn list(&self, role: Option<UserRole>) -> Result<Vec<User>, MarketplaceError> {
        let t = self.tables.lock().unwrap();
        Ok(t.users
            .iter()
            .filter(|u| role.is_none_or(|r| u.role == r))
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64, MarketplaceError> {
        Ok(self.tables.lock().unwrap().users.len() as u64)
    }

    async fn create(&self, user: &User) -> Result<(), MarketplaceError> {
        self.tables.lock().unwrap().users.push(user.clone());
        Ok(())
    }

    async fn link_google(
        &self,
        id: Uuid,
        sub: &str,
        email_verified: bool,
    ) -> Result<(), MarketplaceError> {
        let mut t = self.tables.lock().unwrap();
        if let Some(u) = t.users.iter_mut().find(|u| u.id == id) {
            u.google_id = Some(sub.to_owned());
            u.is_email_verified |= email_verified;
        }
        Ok(())
    }

    async fn update(&self, id: Uuid, update: &UserUpdate) -> Result<bool, MarketplaceError> {
        let mut t = self.tables.lock().unwrap();
        let Some(u) = t.users.iter_mut().find(|u| u.id == id) else {
            return Ok(false);
        };
        if let Some(name) = &update.name {
            u.name = name.clone();
        }
        if let Some(done) = update.is_completed_profile {
            u.is_completed_profile = done;
        }
        if let Some(role) = update.role {
            u.role = role;
        }
        if let Some(tax) = &update.tax_number {
            u.tax_number = Some(tax.clone());
        }
        if let Some(city) = &update.profile.city {
            u.profile.city = Some(city.clone());
        }
        if let Some(image) = &update.profile.image {
            u.profile.image = Some(image.clone());
        }
        Ok(true)
    }

    async fn set_password(&self, id: Uuid, password_hash: &str) -> Result<(), MarketplaceError> {
        let mut t = self.tables.lock().unwrap();
        if let Some(u) = t.users.iter_mut().find(|u| u.id == id) {
            u.password_hash = Some(password_hash.to_owned());
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        let mut t = self.tables.lock().unwrap();
        let before = t.users.len();
        t.users.retain(|u| u.id != id);
        Ok(t.users.len() != before)
    }

    async fn set_token(
        &self,
        id: Uuid,
        kind: UserTokenKind,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), MarketplaceError> {
        self.tables
            .lock()
            .unwrap()
            .tokens
            .insert((id, token_slot(kind)), (token.to_owned(), expires_at));
        Ok(())
    }

    async fn consume_reset_token(
        &self,
        token: &str,
        password_hash: &str,
    ) -> Result<bool, MarketplaceError> {
        let mut t = self.tables.lock().unwrap();
        let now = Utc::now();
        let holder = t
            .tokens
            .iter()
            .find(|((_, slot), (tok, exp))| *slot == "reset" && tok == token && *exp > now)
            .map(|((id, _), _)| *id);
        let Some(id) = holder else {
            return Ok(false);
        };
        t.tokens.remove(&(id, "reset"));
        if let Some(u) = t.users.iter_mut().find(|u| u.id == id) {
            u.password_hash = Some(password_hash.to_owned());
        }
        Ok(true)
    }

    async fn consume_verify_token(&self, token: &str) -> Result<bool, MarketplaceError> {
        let mut t = self.tables.lock().unwrap();
        let now = Utc::now();
        let holder = t
            .tokens
            .iter()
            .find(|((_, slot), (tok, exp))| *slot == "verify" && tok == token && *exp > now)
            .map(|((id, _), _)| *id);
        let Some(id) = holder else {
            return Ok(false);
        };
        t.tokens.remove(&(id, "verify"));
        if let Some(u) = t.users.iter_mut().find(|u| u.id == id) {
            u.is_email_verified = true;
        }
        Ok(true)
    }
}

impl PropertyRepository for MemStore {
    async fn create(&self, property: &Property) -> Result<(), MarketplaceError> {
        self.tables.lock().unwrap().properties.push(property.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Property>, MarketplaceError> {
        let t = self.tables.lock().unwrap();
        Ok(t.properties.iter().find(|p| p.id == id).cloned())
    }

    async fn list(&self, filter: &PropertyFilter) -> Result<Vec<Property>, MarketplaceError> {
        let t = self.tables.lock().unwrap();
        let contains = |hay: &str, needle: &Option<String>| {
            needle
                .as_deref()
                .is_none_or(|n| hay.to_lowercase().contains(&n.to_lowercase()))
        };
        Ok(t.properties
            .iter()
            .filter(|p| contains(&p.state, &filter.location))
            .filter(|p| contains(&p.property_type, &filter.category))
            .filter(|p| filter.min_guests.is_none_or(|g| p.guests >= g))
            .take(filter.limit as usize)
            .cloned()
            .collect())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Property>, MarketplaceError> {
        let t = self.tables.lock().unwrap();
        Ok(t.properties
            .iter()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn count(&self, owner_id: Option<Uuid>) -> Result<u64, MarketplaceError> {
        let t = self.tables.lock().unwrap();
        Ok(t.properties
            .iter()
            .filter(|p| owner_id.is_none_or(|o| p.owner_id == o))
            .count() as u64)
    }

    async fn update(
        &self,
        id: Uuid,
        update: &PropertyUpdate,
    ) -> Result<Option<Property>, MarketplaceError> {
        let mut t = self.tables.lock().unwrap();
        let Some(p) = t.properties.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &update.name {
            p.name = name.clone();
        }
        if let Some(price) = update.price_per_night {
            p.price_per_night = price;
        }
        if let Some(guests) = update.guests {
            p.guests = guests;
        }
        p.updated_at = Utc::now();
        Ok(Some(p.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        let mut t = self.tables.lock().unwrap();
        let before = t.properties.len();
        t.properties.retain(|p| p.id != id);
        t.bookings.retain(|b| b.property_id != id);
        t.favorites.retain(|(_, p)| *p != id);
        t.feedbacks.retain(|f| f.property_id != id);
        Ok(t.properties.len() != before)
    }

    async fn booked_dates(
        &self,
        property_ids: &[Uuid],
    ) -> Result<Vec<(Uuid, DateRange)>, MarketplaceError> {
        let t = self.tables.lock().unwrap();
        Ok(t.bookings
            .iter()
            .filter(|b| property_ids.contains(&b.property_id))
            .map(|b| (b.property_id, b.dates))
            .collect())
    }

    async fn ratings(&self, property_ids: &[Uuid]) -> Result<Vec<(Uuid, u8)>, MarketplaceError> {
        let t = self.tables.lock().unwrap();
        Ok(t.feedbacks
            .iter()
            .filter(|f| property_ids.contains(&f.property_id))
            .map(|f| (f.property_id, f.rating))
            .collect())
    }
}

impl BookingRepository for MemStore {
    async fn create_if_available(
        &self,
        booking: &Booking,
        event: &OutboxEvent,
    ) -> Result<BookingInsert, MarketplaceError> {
        let mut t = self.tables.lock().unwrap();
        if !t.properties.iter().any(|p| p.id == booking.property_id) {
            return Ok(BookingInsert::PropertyMissing);
        }
        if t.bookings
            .iter()
            .any(|b| b.property_id == booking.property_id && b.dates.overlaps(&booking.dates))
        {
            return Ok(BookingInsert::Overlap);
        }
        t.bookings.push(booking.clone());
        t.outbox.push(event.clone());
        Ok(BookingInsert::Created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, MarketplaceError> {
        Ok(self.booking(id))
    }

    async fn list_all(&self) -> Result<Vec<Booking>, MarketplaceError> {
        Ok(self.tables.lock().unwrap().bookings.clone())
    }

    async fn list_by_guest(&self, guest_id: Uuid) -> Result<Vec<Booking>, MarketplaceError> {
        let t = self.tables.lock().unwrap();
        Ok(t.bookings
            .iter()
            .filter(|b| b.guest_id == guest_id)
            .cloned()
            .collect())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Booking>, MarketplaceError> {
        let t = self.tables.lock().unwrap();
        Ok(t.bookings
            .iter()
            .filter(|b| b.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn latest(
        &self,
        owner_id: Option<Uuid>,
        limit: u64,
    ) -> Result<Vec<Booking>, MarketplaceError> {
        let t = self.tables.lock().unwrap();
        let mut rows: Vec<Booking> = t
            .bookings
            .iter()
            .filter(|b| owner_id.is_none_or(|o| b.owner_id == o))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn count_by_owner(&self, owner_id: Uuid) -> Result<u64, MarketplaceError> {
        let t = self.tables.lock().unwrap();
        Ok(t.bookings.iter().filter(|b| b.owner_id == owner_id).count() as u64)
    }

    async fn set_payment_details(
        &self,
        id: Uuid,
        agent_paypal_email: &str,
        payment_instruction: &str,
        event: &OutboxEvent,
    ) -> Result<bool, MarketplaceError> {
        let mut t = self.tables.lock().unwrap();
        let Some(b) = t.bookings.iter_mut().find(|b| b.id == id) else {
            return Ok(false);
        };
        if b.agent_paypal_email.is_some() || b.payment_instruction.is_some() {
            return Ok(false);
        }
        b.agent_paypal_email = Some(agent_paypal_email.to_owned());
        b.payment_instruction = Some(payment_instruction.to_owned());
        t.outbox.push(event.clone());
        Ok(true)
    }

    async fn set_transaction_id(
        &self,
        id: Uuid,
        user_transaction_id: &str,
        event: &OutboxEvent,
    ) -> Result<bool, MarketplaceError> {
        let mut t = self.tables.lock().unwrap();
        let Some(b) = t.bookings.iter_mut().find(|b| b.id == id) else {
            return Ok(false);
        };
        if b.user_transaction_id.is_some() {
            return Ok(false);
        }
        b.user_transaction_id = Some(user_transaction_id.to_owned());
        t.outbox.push(event.clone());
        Ok(true)
    }

    async fn confirm(
        &self,
        id: Uuid,
        transaction: &Transaction,
        event: &OutboxEvent,
    ) -> Result<ConfirmOutcome, MarketplaceError> {
        let mut t = self.tables.lock().unwrap();
        let Some(b) = t.bookings.iter_mut().find(|b| {
            b.id == id
                && b.status == BookingStatus::Pending
                && b.agent_paypal_email.is_some()
                && b.user_transaction_id.is_some()
        }) else {
            return Ok(ConfirmOutcome::Stale);
        };
        b.status = BookingStatus::Confirmed;
        t.transactions.push(transaction.clone());
        t.outbox.push(event.clone());
        Ok(ConfirmOutcome::Confirmed)
    }

    async fn cancel(&self, id: Uuid, event: &OutboxEvent) -> Result<bool, MarketplaceError> {
        let mut t = self.tables.lock().unwrap();
        let before = t.bookings.len();
        t.bookings
            .retain(|b| !(b.id == id && b.status != BookingStatus::Confirmed));
        if t.bookings.len() == before {
            return Ok(false);
        }
        t.outbox.push(event.clone());
        Ok(true)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MarketplaceError> {
        let mut t = self.tables.lock().unwrap();
        let before = t.bookings.len();
        t.bookings.retain(|b| b.id != id);
        Ok(t.bookings.len() != before)
    }
}

impl TransactionRepository for MemStore {
    async fn list_all(&self) -> Result<Vec<Transaction>, MarketplaceError> {
        Ok(self.tables.lock().unwrap().transactions.clone())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Transaction>, MarketplaceError> {
        let t = self.tables.lock().unwrap();
        Ok(t.transactions
            .iter()
            .filter(|x| x.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_by_agent(&self, agent_id: Uuid) -> Result<Vec<Transaction>, MarketplaceError> {
        let t = self.tables.lock().unwrap();
        Ok(t.transactions
            .iter()
            .filter(|x| x.agent_id == agent_id)
            .cloned()
            .collect())
    }

    async fn revenue(&self, agent_id: Option<Uuid>) -> Result<f64, MarketplaceError> {
        let t = self.tables.lock().unwrap();
        Ok(t.transactions
            .iter()
            .filter(|x| agent_id.is_none_or(|a| x.agent_id == a))
            .map(|x| x.amount)
            .sum())
    }
}

impl FavoriteRepository for MemStore {
    async fn toggle(&self, user_id: Uuid, property_id: Uuid) -> Result<bool, MarketplaceError> {
        let mut t = self.tables.lock().unwrap();
        let key = (user_id, property_id);
        if t.favorites.contains(&key) {
            t.favorites.retain(|f| *f != key);
            Ok(false)
        } else {
            t.favorites.push(key);
            Ok(true)
        }
    }

    async fn remove(&self, user_id: Uuid, property_id: Uuid) -> Result<bool, MarketplaceError> {
        let mut t = self.tables.lock().unwrap();
        let before = t.favorites.len();
        t.favorites.retain(|f| *f != (user_id, property_id));
        Ok(t.favorites.len() != before)
    }

    async fn contains(&self, user_id: Uuid, property_id: Uuid) -> Result<bool, MarketplaceError> {
        let t = self.tables.lock().unwrap();
        Ok(t.favorites.contains(&(user_id, property_id)))
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<Property>, MarketplaceError> {
        let t = self.tables.lock().unwrap();
        Ok(t.favorites
            .iter()
            .filter(|(u, _)| *u == user_id)
            .filter_map(|(_, p)| t.properties.iter().find(|x| x.id == *p).cloned())
            .collect())
    }
}

impl FeedbackRepository for MemStore {
    async fn create(&self, feedback: &Feedback) -> Result<(), MarketplaceError> {
        self.tables.lock().unwrap().feedbacks.push(feedback.clone());
        Ok(())
    }

    async fn list_by_property(
        &self,
        property_id: Uuid,
    ) -> Result<Vec<FeedbackWithAuthor>, MarketplaceError> {
        let t = self.tables.lock().unwrap();
        Ok(t.feedbacks
            .iter()
            .filter(|f| f.property_id == property_id)
            .map(|f| FeedbackWithAuthor {
                feedback: f.clone(),
                user: t
                    .users
                    .iter()
                    .find(|u| u.id == f.user_id)
                    .map(|u| FeedbackAuthor {
                        name: u.name.clone(),
                        image: u.profile.image.clone(),
                    }),
            })
            .collect())
    }
}

// ── MockMailer ───────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockMailer {
    pub sent: Arc<Mutex<Vec<MailMessage>>>,
    pub fail: bool,
}

impl MockMailer {
    pub fn failing() -> Self {
        Self {
            sent: Arc::default(),
            fail: true,
        }
    }
}

impl Mailer for MockMailer {
    async fn send(&self, message: &MailMessage) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("smtp unavailable");
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

// ── fixtures ─────────────────────────────────────────────────────────────────

pub fn identity(user: &User) -> Identity {
    Identity {
        user_id: user.id,
        email: user.email.clone(),
        role: user.role,
    }
}

/// Midnight UTC on the given day of June 2026.
pub fn june(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, day, 0, 0, 0).unwrap()
}
