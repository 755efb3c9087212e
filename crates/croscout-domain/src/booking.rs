//! Booking lifecycle types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Booking state. `Cancelled` is only ever observed transiently: cancelled rows are deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse the stored column value. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Transition requested through `PUT /api/bookings/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingAction {
    Confirm,
    Cancel,
}

impl BookingAction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "confirm" => Some(Self::Confirm),
            "cancel" => Some(Self::Cancel),
            _ => None,
        }
    }
}

/// Closed interval `[start, end]` of a stay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl DateRange {
    /// Returns `None` when `start > end`.
    pub fn new(start_date: DateTime<Utc>, end_date: DateTime<Utc>) -> Option<Self> {
        (start_date <= end_date).then_some(Self {
            start_date,
            end_date,
        })
    }

    /// Inclusive intersection: ranges sharing a single instant overlap.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start_date <= other.end_date && self.end_date >= other.start_date
    }
}
