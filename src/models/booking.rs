// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Booking model.
//!
//! Scheduling state and payment state are separate axes: a session can be
//! confirmed and scheduled while still unpaid.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Scheduling state of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Confirmed,
    Completed,
    /// Terminal
    Cancelled,
}

/// Payment state of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
}

/// A mentee-mentor session derived from one availability slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Booking {
    pub id: String,
    /// Originating slot, captured at creation. `None` for imported records,
    /// which are matched back to their slot by (mentor_id, start_time).
    #[serde(default)]
    pub slot_id: Option<String>,
    pub mentor_id: String,
    pub mentee_id: String,
    /// Copied from the slot at creation
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub start_time: DateTime<Utc>,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub end_time: DateTime<Utc>,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    /// Donation owed for the session (VND)
    pub cost: u64,
    /// Text the payer must include in the transfer narrative
    pub payment_code: String,
    pub meet_link: Option<String>,
    pub created_at: String,
}

impl Booking {
    pub fn is_cancelled(&self) -> bool {
        self.status == BookingStatus::Cancelled
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        now >= self.start_time
    }

    pub fn is_finished(&self, now: DateTime<Utc>) -> bool {
        self.end_time < now
    }

    /// A finished session nobody has paid for yet.
    pub fn is_debt(&self, now: DateTime<Utc>) -> bool {
        !self.is_cancelled() && self.is_finished(now) && !self.is_paid()
    }

    /// Counts towards leaderboards and profile totals.
    pub fn is_paid_session(&self) -> bool {
        matches!(
            self.status,
            BookingStatus::Confirmed | BookingStatus::Completed
        ) && self.is_paid()
    }

    pub fn involves(&self, user_id: &str) -> bool {
        self.mentor_id == user_id || self.mentee_id == user_id
    }
}
