// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Debt and cancellation rules.
//!
//! Pure classification over bookings and a point in time. Nothing here
//! touches the ledger; the booking lifecycle consults these before it
//! allows the matching transition.

use crate::error::{AppError, Result};
use crate::models::Booking;
use chrono::{DateTime, Utc};

/// Bookings where `mentee_id` is the mentee and the session ended unpaid.
pub fn debt_of(bookings: &[Booking], mentee_id: &str, now: DateTime<Utc>) -> Vec<Booking> {
    bookings
        .iter()
        .filter(|b| b.mentee_id == mentee_id && b.is_debt(now))
        .cloned()
        .collect()
}

/// Whether `requester` may cancel `booking` at `now`.
pub fn is_cancellable(booking: &Booking, now: DateTime<Utc>, requester: &str) -> bool {
    check_cancellation(booking, now, requester).is_ok()
}

/// Like [`is_cancellable`], but says why not.
pub fn check_cancellation(booking: &Booking, now: DateTime<Utc>, requester: &str) -> Result<()> {
    if booking.mentee_id != requester {
        return Err(AppError::Forbidden(
            "only the mentee can cancel a booking".to_string(),
        ));
    }
    if booking.is_cancelled() {
        return Err(AppError::AlreadyCancelled);
    }
    if booking.is_paid() {
        return Err(AppError::CannotCancelPaid);
    }
    if booking.has_started(now) {
        return Err(AppError::SessionStarted);
    }
    Ok(())
}
