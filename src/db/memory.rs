// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory ledger backed by concurrent hash maps.
//!
//! Each record lives in a `DashMap` entry; holding the entry's write guard
//! for the whole read-modify-write is what makes `update_*` atomic. Payment
//! codes are indexed in normalized form so two bookings can never carry
//! codes that a bank narrative could confuse. Users' activation codes are
//! indexed the same way, so one activation transfer binds to one user. Slots
//! are indexed by (mentor, start) so one instant maps to at most one slot.

use crate::db::{DeleteGuard, LedgerStore, Mutator};
use crate::error::{AppError, Result};
use crate::models::{normalize_payment_text, AvailabilitySlot, Booking, User, UserRole};
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Ledger kept entirely in process memory.
#[derive(Default)]
pub struct MemoryLedger {
    users: DashMap<String, User>,
    slots: DashMap<String, AvailabilitySlot>,
    bookings: DashMap<String, Booking>,
    /// Normalized payment code -> booking id
    payment_codes: DashMap<String, String>,
    /// Normalized activation code -> user id
    activation_codes: DashMap<String, String>,
    /// (mentor id, start time) -> slot id
    slot_starts: DashMap<(String, DateTime<Utc>), String>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Insert `value` under `id` unless the key is already present.
fn insert_new<T: Clone>(map: &DashMap<String, T>, kind: &str, id: &str, value: &T) -> Result<()> {
    match map.entry(id.to_string()) {
        Entry::Occupied(_) => Err(AppError::Database(format!("Duplicate {} id: {}", kind, id))),
        Entry::Vacant(vacant) => {
            vacant.insert(value.clone());
            Ok(())
        }
    }
}

/// Apply `mutate` to a copy of the record and commit it while the entry is locked.
fn update_record<T: Clone>(
    map: &DashMap<String, T>,
    kind: &str,
    id: &str,
    mutate: Mutator<'_, T>,
    check: impl Fn(&T, &T) -> Result<()>,
) -> Result<T> {
    let mut entry = map
        .get_mut(id)
        .ok_or_else(|| AppError::NotFound(format!("{} {}", kind, id)))?;

    let mut draft = entry.value().clone();
    mutate(&mut draft)?;
    check(entry.value(), &draft)?;

    *entry.value_mut() = draft.clone();
    Ok(draft)
}

fn sort_by_start<T>(items: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, &str)) {
    items.sort_by(|a, b| key(a).cmp(&key(b)));
}

impl LedgerStore for MemoryLedger {
    // ─── Users ───────────────────────────────────────────────────

    fn get_user(&self, id: &str) -> Result<Option<User>> {
        Ok(self.users.get(id).map(|u| u.value().clone()))
    }

    fn list_users_by_role(&self, role: UserRole) -> Result<Vec<User>> {
        let mut users: Vec<User> = self
            .users
            .iter()
            .filter(|u| u.role == role)
            .map(|u| u.value().clone())
            .collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(users)
    }

    fn insert_user(&self, user: &User) -> Result<()> {
        let code = normalize_payment_text(&user.activation_code());

        match self.activation_codes.entry(code.clone()) {
            Entry::Occupied(_) => {
                return Err(AppError::Database(format!(
                    "Duplicate activation code: {}",
                    user.activation_code()
                )))
            }
            Entry::Vacant(vacant) => {
                vacant.insert(user.id.clone());
            }
        }

        if let Err(e) = insert_new(&self.users, "user", &user.id, user) {
            self.activation_codes.remove(&code);
            return Err(e);
        }
        Ok(())
    }

    fn update_user(&self, id: &str, mutate: Mutator<'_, User>) -> Result<User> {
        update_record(&self.users, "User", id, mutate, |old, new| {
            if old.id != new.id {
                return Err(AppError::Database("User id is immutable".to_string()));
            }
            Ok(())
        })
    }

    // ─── Slots ───────────────────────────────────────────────────

    fn get_slot(&self, id: &str) -> Result<Option<AvailabilitySlot>> {
        Ok(self.slots.get(id).map(|s| s.value().clone()))
    }

    fn list_slots_by_mentor(&self, mentor_id: &str) -> Result<Vec<AvailabilitySlot>> {
        let mut slots: Vec<AvailabilitySlot> = self
            .slots
            .iter()
            .filter(|s| s.mentor_id == mentor_id)
            .map(|s| s.value().clone())
            .collect();
        sort_by_start(&mut slots, |s| (s.start_time, s.id.as_str()));
        Ok(slots)
    }

    fn insert_slot(&self, slot: &AvailabilitySlot) -> Result<()> {
        let key = (slot.mentor_id.clone(), slot.start_time);

        match self.slot_starts.entry(key.clone()) {
            Entry::Occupied(_) => return Err(AppError::SlotUnavailable),
            Entry::Vacant(vacant) => {
                vacant.insert(slot.id.clone());
            }
        }

        if let Err(e) = insert_new(&self.slots, "slot", &slot.id, slot) {
            self.slot_starts.remove(&key);
            return Err(e);
        }
        Ok(())
    }

    fn update_slot(
        &self,
        id: &str,
        mutate: Mutator<'_, AvailabilitySlot>,
    ) -> Result<AvailabilitySlot> {
        update_record(&self.slots, "Slot", id, mutate, |old, new| {
            if old.id != new.id
                || old.mentor_id != new.mentor_id
                || old.start_time != new.start_time
            {
                return Err(AppError::Database(
                    "Slot id, owner and start are immutable".to_string(),
                ));
            }
            Ok(())
        })
    }

    fn delete_slot(
        &self,
        id: &str,
        guard: DeleteGuard<'_, AvailabilitySlot>,
    ) -> Result<AvailabilitySlot> {
        let mut refusal = None;
        let removed = self.slots.remove_if(id, |_, slot| match guard(slot) {
            Ok(()) => true,
            Err(e) => {
                refusal = Some(e);
                false
            }
        });

        match (removed, refusal) {
            (Some((_, slot)), _) => {
                self.slot_starts
                    .remove(&(slot.mentor_id.clone(), slot.start_time));
                Ok(slot)
            }
            (None, Some(e)) => Err(e),
            (None, None) => Err(AppError::NotFound(format!("Slot {}", id))),
        }
    }

    // ─── Bookings ────────────────────────────────────────────────

    fn get_booking(&self, id: &str) -> Result<Option<Booking>> {
        Ok(self.bookings.get(id).map(|b| b.value().clone()))
    }

    fn list_bookings_by_user(&self, user_id: &str) -> Result<Vec<Booking>> {
        let mut bookings: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|b| b.involves(user_id))
            .map(|b| b.value().clone())
            .collect();
        sort_by_start(&mut bookings, |b| (b.start_time, b.id.as_str()));
        Ok(bookings)
    }

    fn list_bookings(&self) -> Result<Vec<Booking>> {
        let mut bookings: Vec<Booking> = self.bookings.iter().map(|b| b.value().clone()).collect();
        sort_by_start(&mut bookings, |b| (b.start_time, b.id.as_str()));
        Ok(bookings)
    }

    fn insert_booking(&self, booking: &Booking) -> Result<()> {
        let code = normalize_payment_text(&booking.payment_code);

        // Reserve the payment code first; release it again if the id is taken.
        match self.payment_codes.entry(code.clone()) {
            Entry::Occupied(_) => {
                return Err(AppError::Database(format!(
                    "Duplicate payment code: {}",
                    booking.payment_code
                )))
            }
            Entry::Vacant(vacant) => {
                vacant.insert(booking.id.clone());
            }
        }

        if let Err(e) = insert_new(&self.bookings, "booking", &booking.id, booking) {
            self.payment_codes.remove(&code);
            return Err(e);
        }
        Ok(())
    }

    fn update_booking(&self, id: &str, mutate: Mutator<'_, Booking>) -> Result<Booking> {
        update_record(&self.bookings, "Booking", id, mutate, |old, new| {
            if old.id != new.id || old.payment_code != new.payment_code {
                return Err(AppError::Database(
                    "Booking id and payment code are immutable".to_string(),
                ));
            }
            Ok(())
        })
    }

    fn delete_booking(&self, id: &str) -> Result<Option<Booking>> {
        let removed = self.bookings.remove(id).map(|(_, b)| b);
        if let Some(booking) = &removed {
            self.payment_codes
                .remove(&normalize_payment_text(&booking.payment_code));
        }
        Ok(removed)
    }
}
