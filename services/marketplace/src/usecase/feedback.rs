use chrono::Utc;
use uuid::Uuid;

use croscout_domain::booking::BookingStatus;

use crate::domain::repository::{BookingRepository, FeedbackRepository};
use crate::domain::types::{Feedback, FeedbackWithAuthor, MAX_RATING, MIN_RATING};
use crate::error::MarketplaceError;

// ── CreateFeedback ───────────────────────────────────────────────────────────

pub struct CreateFeedbackInput {
    pub property_id: Uuid,
    pub booking_id: Uuid,
    pub rating: u8,
    pub comment: Option<String>,
}

pub struct CreateFeedbackUseCase<F: FeedbackRepository, B: BookingRepository> {
    pub feedbacks: F,
    pub bookings: B,
}

impl<F: FeedbackRepository, B: BookingRepository> CreateFeedbackUseCase<F, B> {
    /// Only a guest holding a confirmed booking on the property may review it.
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: CreateFeedbackInput,
    ) -> Result<Feedback, MarketplaceError> {
        if !(MIN_RATING..=MAX_RATING).contains(&input.rating) {
            return Err(MarketplaceError::InvalidRating);
        }

        let booking = self
            .bookings
            .find_by_id(input.booking_id)
            .await?
            .filter(|b| b.guest_id == user_id && b.property_id == input.property_id)
            .ok_or(MarketplaceError::BookingRequired)?;
        if booking.status != BookingStatus::Confirmed {
            return Err(MarketplaceError::BookingPending);
        }

        let now = Utc::now();
        let feedback = Feedback {
            id: Uuid::now_v7(),
            property_id: input.property_id,
            user_id,
            booking_id: booking.id,
            rating: input.rating,
            comment: input.comment.filter(|c| !c.trim().is_empty()),
            created_at: now,
            updated_at: now,
        };
        self.feedbacks.create(&feedback).await?;
        Ok(feedback)
    }
}

// ── ListFeedback ─────────────────────────────────────────────────────────────

pub struct ListFeedbackUseCase<F: FeedbackRepository> {
    pub feedbacks: F,
}

impl<F: FeedbackRepository> ListFeedbackUseCase<F> {
    pub async fn execute(
        &self,
        property_id: Uuid,
    ) -> Result<Vec<FeedbackWithAuthor>, MarketplaceError> {
        let feedbacks = self.feedbacks.list_by_property(property_id).await?;
        if feedbacks.is_empty() {
            return Err(MarketplaceError::FeedbackNotFound);
        }
        Ok(feedbacks)
    }
}
