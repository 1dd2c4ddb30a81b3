//! Per-user totals shown on profiles.
//!
//! Computed from the booking ledger on every request; nothing is stored.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{Booking, BookingStatus};

/// Donation and session totals for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserStats {
    /// Sum of paid session costs (VND)
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_donated: u64,
    /// Sessions that are scheduled or held (not cancelled)
    pub total_sessions: u32,
}

impl UserStats {
    /// Fold the bookings a user takes part in into totals.
    ///
    /// Bookings not involving `user_id` are ignored, so callers may pass a
    /// wider slice than strictly needed.
    pub fn from_bookings<'a>(user_id: &str, bookings: impl IntoIterator<Item = &'a Booking>) -> Self {
        let mut stats = Self::default();

        for booking in bookings {
            if !booking.involves(user_id) || booking.is_cancelled() {
                continue;
            }
            if booking.is_paid() {
                stats.total_donated += booking.cost;
            }
            if matches!(
                booking.status,
                BookingStatus::Confirmed | BookingStatus::Completed
            ) {
                stats.total_sessions += 1;
            }
        }

        stats
    }
}
