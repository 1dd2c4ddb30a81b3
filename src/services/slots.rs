// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Slot allocation service.
//!
//! Handles:
//! - Listing bookable slots (free, outside the lead-time buffer)
//! - Creating single and recurring slots
//! - Guarded deletion
//! - Claiming and releasing slots for the booking lifecycle

use crate::db::LedgerStore;
use crate::error::{AppError, Result};
use crate::models::{AvailabilitySlot, User};
use crate::time_utils::{local_date, local_to_utc, platform_offset};
use chrono::{DateTime, Datelike, Days, Duration, FixedOffset, NaiveTime, Utc, Weekday};
use std::collections::HashMap;
use std::sync::Arc;

/// Default horizon for recurring expansion.
pub const DEFAULT_HORIZON_WEEKS: u32 = 4;

/// Day of week -> local start times.
pub type WeeklyPattern = HashMap<Weekday, Vec<NaiveTime>>;

/// Service owning availability slot state.
#[derive(Clone)]
pub struct SlotAllocator {
    db: Arc<dyn LedgerStore>,
    lead_time: Duration,
    offset: FixedOffset,
}

impl SlotAllocator {
    pub fn new(db: Arc<dyn LedgerStore>, lead_time_minutes: i64, timezone_offset_hours: i32) -> Self {
        Self {
            db,
            lead_time: Duration::minutes(lead_time_minutes),
            offset: platform_offset(timezone_offset_hours),
        }
    }

    /// Minimum gap between now and a bookable slot's start.
    pub fn lead_time(&self) -> Duration {
        self.lead_time
    }

    /// Whether a free slot starting at `start` may still be booked at `now`.
    pub fn is_within_booking_window(&self, start: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        start > now + self.lead_time
    }

    /// Free slots of a mentor that start after the lead-time buffer, earliest first.
    pub fn list_bookable_slots(
        &self,
        mentor_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<AvailabilitySlot>> {
        Ok(self
            .db
            .list_slots_by_mentor(mentor_id)?
            .into_iter()
            .filter(|s| !s.is_booked && self.is_within_booking_window(s.start_time, now))
            .collect())
    }

    /// Every slot of a mentor, booked or not, earliest first.
    pub fn list_slots(&self, mentor_id: &str) -> Result<Vec<AvailabilitySlot>> {
        self.db.list_slots_by_mentor(mentor_id)
    }

    /// Create one slot of `duration_minutes` starting at `start`.
    ///
    /// Fails with `SlotUnavailable` if the mentor already has a slot
    /// starting at that instant.
    pub fn create_slot(
        &self,
        mentor_id: &str,
        start: DateTime<Utc>,
        duration_minutes: i64,
    ) -> Result<AvailabilitySlot> {
        let duration = positive_duration(duration_minutes)?;
        self.require_mentor(mentor_id)?;

        let slot = new_slot(mentor_id, start, duration)?;
        self.db.insert_slot(&slot)?;

        tracing::info!(
            slot_id = %slot.id,
            mentor_id,
            start = %slot.start_time,
            "Slot created"
        );
        Ok(slot)
    }

    /// Expand a weekly pattern into slots over the next `horizon_weeks` weeks,
    /// starting today in platform-local time.
    ///
    /// Instants that already have a slot for this mentor are skipped, so the
    /// result may be shorter than the pattern suggests and a repeated call
    /// creates nothing.
    pub fn create_recurring_slots(
        &self,
        mentor_id: &str,
        pattern: &WeeklyPattern,
        duration_minutes: i64,
        horizon_weeks: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<AvailabilitySlot>> {
        let duration = positive_duration(duration_minutes)?;
        self.require_mentor(mentor_id)?;

        let today = local_date(now, self.offset);
        let mut candidates = Vec::new();

        for day in 0..u64::from(horizon_weeks) * 7 {
            let Some(date) = today.checked_add_days(Days::new(day)) else {
                break;
            };
            let Some(times) = pattern.get(&date.weekday()) else {
                continue;
            };

            for time in times {
                let start = local_to_utc(date.and_time(*time), self.offset);
                candidates.push(new_slot(mentor_id, start, duration)?);
            }
        }

        let mut created = Vec::new();
        for slot in candidates {
            // The store refuses a second slot at the same instant.
            match self.db.insert_slot(&slot) {
                Ok(()) => created.push(slot),
                Err(AppError::SlotUnavailable) => continue,
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            mentor_id,
            horizon_weeks,
            created = created.len(),
            "Recurring slots expanded"
        );
        Ok(created)
    }

    /// Delete a free slot. Only its mentor may do so.
    pub fn delete_slot(&self, slot_id: &str, requested_by: &str) -> Result<AvailabilitySlot> {
        let removed = self.db.delete_slot(slot_id, &mut |slot| {
            if slot.mentor_id != requested_by {
                return Err(AppError::Forbidden(
                    "slot belongs to another mentor".to_string(),
                ));
            }
            if slot.is_booked {
                return Err(AppError::SlotInUse);
            }
            Ok(())
        })?;

        tracing::info!(slot_id, mentor_id = %removed.mentor_id, "Slot deleted");
        Ok(removed)
    }

    /// Atomically flip a free slot of `mentor_id` to booked.
    ///
    /// Fails with `SlotUnavailable` if the slot is gone, held, owned by
    /// another mentor, or starts inside the lead-time buffer.
    pub fn claim_slot(
        &self,
        slot_id: &str,
        mentor_id: &str,
        now: DateTime<Utc>,
    ) -> Result<AvailabilitySlot> {
        let result = self.db.update_slot(slot_id, &mut |slot| {
            if slot.mentor_id != mentor_id
                || slot.is_booked
                || !self.is_within_booking_window(slot.start_time, now)
            {
                return Err(AppError::SlotUnavailable);
            }
            slot.is_booked = true;
            Ok(())
        });

        match result {
            Err(AppError::NotFound(_)) => Err(AppError::SlotUnavailable),
            other => other,
        }
    }

    /// Free a slot by id.
    pub fn release_slot_by_id(&self, slot_id: &str) -> Result<AvailabilitySlot> {
        let slot = self.db.update_slot(slot_id, &mut |slot| {
            slot.is_booked = false;
            Ok(())
        })?;
        tracing::debug!(slot_id, "Slot released");
        Ok(slot)
    }

    /// Free the slot of `mentor_id` that starts exactly at `start`.
    ///
    /// Returns `false` if no slot matches. Used for bookings that predate
    /// slot references.
    pub fn release_slot(&self, mentor_id: &str, start: DateTime<Utc>) -> Result<bool> {
        let slot = self
            .db
            .list_slots_by_mentor(mentor_id)?
            .into_iter()
            .find(|s| s.start_time == start);

        match slot {
            Some(slot) => {
                self.release_slot_by_id(&slot.id)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn require_mentor(&self, mentor_id: &str) -> Result<User> {
        let user = self
            .db
            .get_user(mentor_id)?
            .ok_or_else(|| AppError::NotFound(format!("User {}", mentor_id)))?;
        if !user.is_mentor() {
            return Err(AppError::Forbidden(
                "only mentors can publish availability".to_string(),
            ));
        }
        Ok(user)
    }
}

fn positive_duration(minutes: i64) -> Result<Duration> {
    if minutes <= 0 {
        return Err(AppError::InvalidRange(format!(
            "duration must be positive, got {} minutes",
            minutes
        )));
    }
    Duration::try_minutes(minutes).ok_or_else(|| {
        AppError::InvalidRange(format!("duration of {} minutes is too long", minutes))
    })
}

fn new_slot(
    mentor_id: &str,
    start: DateTime<Utc>,
    duration: Duration,
) -> Result<AvailabilitySlot> {
    let end_time = start
        .checked_add_signed(duration)
        .ok_or_else(|| AppError::InvalidRange("slot ends out of range".to_string()))?;

    Ok(AvailabilitySlot {
        id: uuid::Uuid::new_v4().to_string(),
        mentor_id: mentor_id.to_string(),
        start_time: start,
        end_time,
        is_booked: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_duration() {
        assert!(matches!(
            positive_duration(0),
            Err(AppError::InvalidRange(_))
        ));
        assert!(matches!(
            positive_duration(-30),
            Err(AppError::InvalidRange(_))
        ));
        assert_eq!(positive_duration(90).unwrap(), Duration::minutes(90));
        assert!(matches!(
            positive_duration(i64::MAX),
            Err(AppError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_new_slot_end_out_of_range() {
        let start = DateTime::<Utc>::MAX_UTC - Duration::minutes(30);

        assert!(matches!(
            new_slot("m1", start, Duration::hours(1)),
            Err(AppError::InvalidRange(_))
        ));
        assert!(new_slot("m1", start, Duration::minutes(10)).is_ok());
    }
}
