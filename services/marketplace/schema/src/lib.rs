//! sea-orm entities for the marketplace database.

pub mod bookings;
pub mod favorites;
pub mod feedbacks;
pub mod outbox_events;
pub mod properties;
pub mod transactions;
pub mod users;
