// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Booking lifecycle service.
//!
//! Handles:
//! - Creating bookings from free slots (cost, payment code, meet link)
//! - Payment status transitions
//! - Cancellation with slot release
//! - Session completion

use crate::db::LedgerStore;
use crate::error::{AppError, Result};
use crate::models::{AvailabilitySlot, Booking, BookingStatus, PaymentStatus, User, UserRole};
use crate::services::policy;
use crate::services::slots::SlotAllocator;
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Prefix of every session payment code.
pub const BOOKING_CODE_PREFIX: &str = "HOCTUTHIEN HOCPHI";

/// Service owning booking state transitions.
#[derive(Clone)]
pub struct BookingService {
    db: Arc<dyn LedgerStore>,
    slots: SlotAllocator,
    meet_base_url: String,
}

impl BookingService {
    pub fn new(db: Arc<dyn LedgerStore>, slots: SlotAllocator, meet_base_url: &str) -> Self {
        Self {
            db,
            slots,
            meet_base_url: meet_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Book `slot_id` of `mentor_id` for `mentee_id`.
    ///
    /// Checks run in order: both users exist with the right roles, the
    /// mentee has no debt, the mentee is activated, then the slot is
    /// claimed. Nothing is written unless every check passes.
    pub fn create_booking(
        &self,
        mentor_id: &str,
        slot_id: &str,
        mentee_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Booking> {
        let mentor = self.require_user(mentor_id, UserRole::Mentor)?;
        let mentee = self.require_user(mentee_id, UserRole::Mentee)?;

        let history = self.db.list_bookings_by_user(mentee_id)?;
        let debt = policy::debt_of(&history, mentee_id, now);
        if !debt.is_empty() {
            tracing::info!(mentee_id, debt = debt.len(), "Booking refused: debt");
            return Err(AppError::DebtBlocked(debt.len()));
        }

        if !mentee.is_activated {
            return Err(AppError::ActivationRequired);
        }

        let slot = self.slots.claim_slot(slot_id, mentor_id, now)?;

        let id = new_booking_id();
        let booking = Booking {
            payment_code: booking_payment_code(&id),
            meet_link: Some(self.meet_link()),
            slot_id: Some(slot.id.clone()),
            mentor_id: mentor.id.clone(),
            mentee_id: mentee.id.clone(),
            start_time: slot.start_time,
            end_time: slot.end_time,
            status: BookingStatus::Confirmed,
            payment_status: PaymentStatus::Unpaid,
            cost: session_cost(mentor.hourly_rate.unwrap_or(0), &slot),
            created_at: format_utc_rfc3339(now),
            id,
        };

        if let Err(e) = self.db.insert_booking(&booking) {
            // Hand the slot back before reporting the failure.
            if let Err(release_err) = self.slots.release_slot_by_id(&slot.id) {
                tracing::error!(
                    slot_id = %slot.id,
                    error = %release_err,
                    "Failed to roll back slot claim"
                );
            }
            return Err(e);
        }

        tracing::info!(
            booking_id = %booking.id,
            mentor_id,
            mentee_id,
            slot_id,
            cost = booking.cost,
            "Booking created"
        );
        Ok(booking)
    }

    /// Record a confirmed payment. Repeated calls are no-ops.
    pub fn mark_paid(&self, booking_id: &str) -> Result<Booking> {
        let mut changed = false;
        let booking = self.db.update_booking(booking_id, &mut |b| {
            if b.is_cancelled() {
                return Err(AppError::AlreadyCancelled);
            }
            changed = !b.is_paid();
            b.payment_status = PaymentStatus::Paid;
            Ok(())
        })?;

        if changed {
            tracing::info!(booking_id, cost = booking.cost, "Booking paid");
        }
        Ok(booking)
    }

    /// Cancel an unpaid, not-yet-started booking and free its slot.
    pub fn cancel_booking(
        &self,
        booking_id: &str,
        requested_by: &str,
        now: DateTime<Utc>,
    ) -> Result<Booking> {
        let mut previous = BookingStatus::Confirmed;
        let booking = self.db.update_booking(booking_id, &mut |b| {
            policy::check_cancellation(b, now, requested_by)?;
            previous = b.status;
            b.status = BookingStatus::Cancelled;
            Ok(())
        })?;

        if let Err(e) = self.release_for(&booking) {
            // Put the booking back so it still owns the slot it holds.
            tracing::warn!(booking_id, error = %e, "Slot release failed, reverting cancellation");
            if let Err(revert) = self.db.update_booking(booking_id, &mut |b| {
                b.status = previous;
                Ok(())
            }) {
                tracing::error!(booking_id, error = %revert, "Failed to revert cancellation");
            }
            return Err(e);
        }

        tracing::info!(booking_id, requested_by, "Booking cancelled");
        Ok(booking)
    }

    /// Mark a finished session as held. Only the mentor may do so.
    pub fn complete_booking(
        &self,
        booking_id: &str,
        requested_by: &str,
        now: DateTime<Utc>,
    ) -> Result<Booking> {
        let mut changed = false;
        let booking = self.db.update_booking(booking_id, &mut |b| {
            if b.mentor_id != requested_by {
                return Err(AppError::Forbidden(
                    "only the mentor can complete a session".to_string(),
                ));
            }
            if b.is_cancelled() {
                return Err(AppError::AlreadyCancelled);
            }
            if now < b.end_time {
                return Err(AppError::BadRequest(
                    "session has not ended yet".to_string(),
                ));
            }
            changed = b.status != BookingStatus::Completed;
            b.status = BookingStatus::Completed;
            Ok(())
        })?;

        if changed {
            tracing::info!(booking_id, "Booking completed");
        }
        Ok(booking)
    }

    pub fn get_booking(&self, booking_id: &str) -> Result<Booking> {
        self.db
            .get_booking(booking_id)?
            .ok_or_else(|| AppError::NotFound(format!("Booking {}", booking_id)))
    }

    /// Bookings where the user is mentor or mentee, earliest first.
    pub fn list_for_user(&self, user_id: &str) -> Result<Vec<Booking>> {
        self.db.list_bookings_by_user(user_id)
    }

    /// Release the slot a cancelled booking was holding.
    fn release_for(&self, booking: &Booking) -> Result<()> {
        match &booking.slot_id {
            Some(slot_id) => match self.slots.release_slot_by_id(slot_id) {
                Ok(_) => Ok(()),
                Err(AppError::NotFound(_)) => {
                    tracing::warn!(booking_id = %booking.id, slot_id, "Slot already gone");
                    Ok(())
                }
                Err(e) => Err(e),
            },
            None => {
                if !self
                    .slots
                    .release_slot(&booking.mentor_id, booking.start_time)?
                {
                    tracing::warn!(
                        booking_id = %booking.id,
                        mentor_id = %booking.mentor_id,
                        start = %booking.start_time,
                        "No slot matches legacy booking"
                    );
                }
                Ok(())
            }
        }
    }

    fn require_user(&self, user_id: &str, role: UserRole) -> Result<User> {
        let user = self
            .db
            .get_user(user_id)?
            .ok_or_else(|| AppError::NotFound(format!("User {}", user_id)))?;
        if user.role != role {
            return Err(AppError::BadRequest(format!(
                "user {} is not a {:?}",
                user_id, role
            )));
        }
        Ok(user)
    }

    /// `{base}/abc-defg-hij`, ten random lower-case letters.
    fn meet_link(&self) -> String {
        let letters: Vec<char> = Uuid::new_v4()
            .as_bytes()
            .iter()
            .take(10)
            .map(|b| char::from(b'a' + b % 26))
            .collect();
        let code: String = letters[..3]
            .iter()
            .chain(std::iter::once(&'-'))
            .chain(letters[3..7].iter())
            .chain(std::iter::once(&'-'))
            .chain(letters[7..].iter())
            .collect();
        format!("{}/{}", self.meet_base_url, code)
    }
}

/// UUID v4 as 32 upper-case hex digits.
fn new_booking_id() -> String {
    Uuid::new_v4().simple().to_string().to_uppercase()
}

pub fn booking_payment_code(booking_id: &str) -> String {
    format!("{} {}", BOOKING_CODE_PREFIX, booking_id)
}

/// Donation owed for a slot: hourly rate times length, rounded up to whole VND.
pub fn session_cost(hourly_rate: u64, slot: &AvailabilitySlot) -> u64 {
    let seconds = u128::try_from(slot.duration().num_seconds()).unwrap_or(0);
    let cost = (u128::from(hourly_rate) * seconds).div_ceil(3600);
    u64::try_from(cost).unwrap_or(u64::MAX)
}
