use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use croscout_auth_types::identity::Identity;
use croscout_domain::booking::{BookingAction, BookingStatus, DateRange};
use croscout_domain::user::UserRole;

use crate::domain::repository::{BookingRepository, PropertyRepository, UserRepository};
use crate::domain::types::{
    Booking, BookingDetail, BookingInsert, BookingSummary, ConfirmOutcome, EVENT_BOOKING_CREATED,
    EVENT_BOOKING_STATUS, EVENT_PAYMENT_DETAILS, EVENT_TRANSACTION_ID, OutboxEvent,
    PAYMENT_METHOD, PublicProfile, Transaction, User, parse_price,
};
use crate::error::MarketplaceError;
use crate::usecase::mail;

/// Load a party the booking references. Foreign keys guarantee it exists.
async fn party<U: UserRepository>(users: &U, id: Uuid) -> Result<User, MarketplaceError> {
    users
        .find_by_id(id)
        .await?
        .ok_or_else(|| MarketplaceError::Internal(anyhow::anyhow!("booking party {id} missing")))
}

async fn load_booking<B: BookingRepository>(
    bookings: &B,
    id: Uuid,
) -> Result<Booking, MarketplaceError> {
    bookings
        .find_by_id(id)
        .await?
        .ok_or(MarketplaceError::BookingNotFound)
}

/// Attach guest and owner names.
pub(crate) async fn summarize<U: UserRepository>(
    users: &U,
    bookings: Vec<Booking>,
) -> Result<Vec<BookingSummary>, MarketplaceError> {
    let mut ids: Vec<Uuid> = bookings
        .iter()
        .flat_map(|b| [b.guest_id, b.owner_id])
        .collect();
    ids.sort_unstable();
    ids.dedup();
    let names: HashMap<Uuid, String> = users
        .find_by_ids(&ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u.name))
        .collect();

    Ok(bookings
        .into_iter()
        .map(|booking| BookingSummary {
            guest_name: names.get(&booking.guest_id).cloned(),
            owner_name: names.get(&booking.owner_id).cloned(),
            booking,
        })
        .collect())
}

// ── CreateBooking ────────────────────────────────────────────────────────────

pub struct CreateBookingInput {
    pub property_id: Uuid,
    pub price: String,
    pub total_guests: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

pub struct CreateBookingUseCase<B: BookingRepository, P: PropertyRepository, U: UserRepository> {
    pub bookings: B,
    pub properties: P,
    pub users: U,
}

impl<B: BookingRepository, P: PropertyRepository, U: UserRepository> CreateBookingUseCase<B, P, U> {
    pub async fn execute(
        &self,
        guest_id: Uuid,
        input: CreateBookingInput,
    ) -> Result<Booking, MarketplaceError> {
        let price = input.price.trim();
        let total_guests = input.total_guests.trim();
        if price.is_empty() || total_guests.is_empty() {
            return Err(MarketplaceError::MissingBookingDetails);
        }
        // Confirmation records this amount, so it must be readable now.
        if parse_price(price).is_none() {
            return Err(MarketplaceError::InvalidPrice);
        }
        let dates = DateRange::new(input.start_date, input.end_date)
            .ok_or(MarketplaceError::InvalidDateRange)?;
        let property = self
            .properties
            .find_by_id(input.property_id)
            .await?
            .ok_or(MarketplaceError::BookedPropertyNotFound)?;
        let owner = party(&self.users, property.owner_id).await?;

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::now_v7(),
            guest_id,
            owner_id: property.owner_id,
            property_id: property.id,
            price: price.to_owned(),
            total_guests: total_guests.to_owned(),
            dates,
            status: BookingStatus::Pending,
            agent_paypal_email: None,
            payment_instruction: None,
            user_transaction_id: None,
            created_at: now,
            updated_at: now,
        };
        let event = OutboxEvent::mail(
            EVENT_BOOKING_CREATED,
            format!("{EVENT_BOOKING_CREATED}:{}", booking.id),
            &mail::booking_created(&owner.email, &owner.name, &property.name),
        );

        match self.bookings.create_if_available(&booking, &event).await? {
            BookingInsert::Created => {
                info!(booking_id = %booking.id, property_id = %booking.property_id, "booking created");
                Ok(booking)
            }
            BookingInsert::Overlap => Err(MarketplaceError::PropertyAlreadyBooked),
            BookingInsert::PropertyMissing => Err(MarketplaceError::BookedPropertyNotFound),
        }
    }
}

// ── ListBookings ─────────────────────────────────────────────────────────────

pub struct ListBookingsUseCase<B: BookingRepository, U: UserRepository> {
    pub bookings: B,
    pub users: U,
}

impl<B: BookingRepository, U: UserRepository> ListBookingsUseCase<B, U> {
    pub async fn execute(&self) -> Result<Vec<BookingSummary>, MarketplaceError> {
        let bookings = self.bookings.list_all().await?;
        summarize(&self.users, bookings).await
    }
}

// ── GetBooking ───────────────────────────────────────────────────────────────

pub struct GetBookingUseCase<B: BookingRepository, P: PropertyRepository, U: UserRepository> {
    pub bookings: B,
    pub properties: P,
    pub users: U,
}

impl<B: BookingRepository, P: PropertyRepository, U: UserRepository> GetBookingUseCase<B, P, U> {
    pub async fn execute(&self, id: Uuid) -> Result<BookingDetail, MarketplaceError> {
        let booking = load_booking(&self.bookings, id).await?;
        let parties = self
            .users
            .find_by_ids(&[booking.guest_id, booking.owner_id])
            .await?;
        let profile = |id: Uuid| {
            parties
                .iter()
                .find(|u| u.id == id)
                .map(PublicProfile::from)
        };
        let property = self.properties.find_by_id(booking.property_id).await?;
        Ok(BookingDetail {
            guest: profile(booking.guest_id),
            owner: profile(booking.owner_id),
            property,
            booking,
        })
    }
}

// ── ListUserBookings ─────────────────────────────────────────────────────────

pub struct ListUserBookingsUseCase<B: BookingRepository, U: UserRepository> {
    pub bookings: B,
    pub users: U,
}

impl<B: BookingRepository, U: UserRepository> ListUserBookingsUseCase<B, U> {
    /// Guests see the bookings they made, agents the bookings on their properties.
    pub async fn execute(&self, user_id: Uuid) -> Result<Vec<BookingSummary>, MarketplaceError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(MarketplaceError::NoBookingsFound)?;
        let bookings = match user.role {
            UserRole::User => self.bookings.list_by_guest(user.id).await?,
            UserRole::Agent => self.bookings.list_by_owner(user.id).await?,
            UserRole::Admin => vec![],
        };
        if bookings.is_empty() {
            return Err(MarketplaceError::NoBookingsFound);
        }
        summarize(&self.users, bookings).await
    }
}

/// Status notification for both parties, keyed by booking and new status.
fn status_event(booking: &Booking, guest: &User, owner: &User) -> OutboxEvent {
    let status = booking.status.as_str();
    OutboxEvent::mail(
        EVENT_BOOKING_STATUS,
        format!("{EVENT_BOOKING_STATUS}:{}:{status}", booking.id),
        &mail::booking_status(
            vec![guest.email.clone(), owner.email.clone()],
            booking.id,
            booking.status,
        ),
    )
}

// ── ManageBooking (confirm / cancel) ─────────────────────────────────────────

pub struct ManageBookingUseCase<B: BookingRepository, U: UserRepository> {
    pub bookings: B,
    pub users: U,
}

impl<B: BookingRepository, U: UserRepository> ManageBookingUseCase<B, U> {
    pub async fn execute(
        &self,
        actor: &Identity,
        id: Uuid,
        action: &str,
    ) -> Result<Booking, MarketplaceError> {
        let action = BookingAction::parse(action).ok_or(MarketplaceError::InvalidAction)?;
        let booking = load_booking(&self.bookings, id).await?;
        match action {
            BookingAction::Confirm => self.confirm(actor, booking).await,
            BookingAction::Cancel => self.cancel(actor, booking).await,
        }
    }

    async fn confirm(
        &self,
        actor: &Identity,
        mut booking: Booking,
    ) -> Result<Booking, MarketplaceError> {
        if !actor.can_act_for(booking.owner_id) {
            return Err(MarketplaceError::Forbidden);
        }
        if booking.status == BookingStatus::Confirmed {
            return Err(MarketplaceError::AlreadyConfirmed);
        }
        if booking.agent_paypal_email.is_none() {
            return Err(MarketplaceError::PaymentRequestNotSent);
        }
        let Some(transaction_id) = booking.user_transaction_id.clone() else {
            return Err(MarketplaceError::TransactionIdNotReceived);
        };
        let amount = parse_price(&booking.price).ok_or(MarketplaceError::InvalidPrice)?;

        let now = Utc::now();
        let transaction = Transaction {
            id: Uuid::now_v7(),
            booking_id: booking.id,
            user_id: booking.guest_id,
            agent_id: booking.owner_id,
            amount,
            transaction_id,
            payment_method: PAYMENT_METHOD.to_owned(),
            created_at: now,
            updated_at: now,
        };

        let guest = party(&self.users, booking.guest_id).await?;
        let owner = party(&self.users, booking.owner_id).await?;
        booking.status = BookingStatus::Confirmed;
        booking.updated_at = now;
        let event = status_event(&booking, &guest, &owner);

        match self.bookings.confirm(booking.id, &transaction, &event).await? {
            ConfirmOutcome::Confirmed => {
                info!(booking_id = %booking.id, transaction_id = %transaction.id, "booking confirmed");
                Ok(booking)
            }
            ConfirmOutcome::Stale => match self.bookings.find_by_id(booking.id).await? {
                None => Err(MarketplaceError::BookingNotFound),
                Some(_) => Err(MarketplaceError::AlreadyConfirmed),
            },
        }
    }

    async fn cancel(
        &self,
        actor: &Identity,
        mut booking: Booking,
    ) -> Result<Booking, MarketplaceError> {
        if !actor.can_act_for(booking.owner_id) && actor.user_id != booking.guest_id {
            return Err(MarketplaceError::Forbidden);
        }
        if booking.status == BookingStatus::Confirmed {
            return Err(MarketplaceError::CancelAfterConfirm);
        }

        let guest = party(&self.users, booking.guest_id).await?;
        let owner = party(&self.users, booking.owner_id).await?;
        booking.status = BookingStatus::Cancelled;
        booking.updated_at = Utc::now();
        let event = status_event(&booking, &guest, &owner);

        if !self.bookings.cancel(booking.id, &event).await? {
            return match self.bookings.find_by_id(booking.id).await? {
                None => Err(MarketplaceError::BookingNotFound),
                Some(_) => Err(MarketplaceError::CancelAfterConfirm),
            };
        }
        info!(booking_id = %booking.id, "booking cancelled");
        Ok(booking)
    }
}

// ── DeleteBooking ────────────────────────────────────────────────────────────

pub struct DeleteBookingUseCase<B: BookingRepository> {
    pub bookings: B,
}

impl<B: BookingRepository> DeleteBookingUseCase<B> {
    pub async fn execute(&self, actor: &Identity, id: Uuid) -> Result<(), MarketplaceError> {
        let booking = load_booking(&self.bookings, id).await?;
        if !actor.can_act_for(booking.owner_id) {
            return Err(MarketplaceError::Forbidden);
        }
        if !self.bookings.delete(id).await? {
            return Err(MarketplaceError::BookingNotFound);
        }
        Ok(())
    }
}

// ── UpdatePaymentDetails ─────────────────────────────────────────────────────

pub struct UpdatePaymentDetailsUseCase<B: BookingRepository, U: UserRepository> {
    pub bookings: B,
    pub users: U,
}

impl<B: BookingRepository, U: UserRepository> UpdatePaymentDetailsUseCase<B, U> {
    pub async fn execute(
        &self,
        actor: &Identity,
        id: Uuid,
        agent_paypal_email: &str,
        payment_instruction: &str,
    ) -> Result<Booking, MarketplaceError> {
        let mut booking = load_booking(&self.bookings, id).await?;
        if !actor.can_act_for(booking.owner_id) {
            return Err(MarketplaceError::Forbidden);
        }
        if booking.agent_paypal_email.is_some() || booking.payment_instruction.is_some() {
            return Err(MarketplaceError::PaymentDetailsExist);
        }

        let guest = party(&self.users, booking.guest_id).await?;
        let event = OutboxEvent::mail(
            EVENT_PAYMENT_DETAILS,
            format!("{EVENT_PAYMENT_DETAILS}:{id}"),
            &mail::payment_details(
                &guest.email,
                &guest.name,
                id,
                agent_paypal_email,
                payment_instruction,
            ),
        );
        if !self
            .bookings
            .set_payment_details(id, agent_paypal_email, payment_instruction, &event)
            .await?
        {
            return Err(MarketplaceError::PaymentDetailsExist);
        }
        booking.agent_paypal_email = Some(agent_paypal_email.to_owned());
        booking.payment_instruction = Some(payment_instruction.to_owned());
        booking.updated_at = Utc::now();
        Ok(booking)
    }
}

// ── SubmitTransactionId ──────────────────────────────────────────────────────

pub struct SubmitTransactionIdUseCase<B: BookingRepository, U: UserRepository> {
    pub bookings: B,
    pub users: U,
}

impl<B: BookingRepository, U: UserRepository> SubmitTransactionIdUseCase<B, U> {
    pub async fn execute(
        &self,
        actor: &Identity,
        id: Uuid,
        user_transaction_id: &str,
    ) -> Result<Booking, MarketplaceError> {
        let mut booking = load_booking(&self.bookings, id).await?;
        if !actor.can_act_for(booking.guest_id) {
            return Err(MarketplaceError::Forbidden);
        }
        if booking.user_transaction_id.is_some() {
            return Err(MarketplaceError::TransactionIdExists);
        }

        let owner = party(&self.users, booking.owner_id).await?;
        let event = OutboxEvent::mail(
            EVENT_TRANSACTION_ID,
            format!("{EVENT_TRANSACTION_ID}:{id}"),
            &mail::transaction_id_submitted(&owner.email, &owner.name, id, user_transaction_id),
        );
        if !self
            .bookings
            .set_transaction_id(id, user_transaction_id, &event)
            .await?
        {
            return Err(MarketplaceError::TransactionIdExists);
        }
        booking.user_transaction_id = Some(user_transaction_id.to_owned());
        booking.updated_at = Utc::now();
        Ok(booking)
    }
}
