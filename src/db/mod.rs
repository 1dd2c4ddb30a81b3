//! Ledger storage layer.
//!
//! The engine talks to storage only through [`LedgerStore`], so the booking
//! rules do not depend on the persistence technology. [`MemoryLedger`] is the
//! in-process implementation used by the server and the tests.

pub mod memory;
pub mod seed;

pub use memory::MemoryLedger;

use crate::error::Result;
use crate::models::{AvailabilitySlot, Booking, User, UserRole};

/// Read-modify-write callback applied to a single record.
///
/// Runs while the record is locked: it must not call back into the store.
/// Returning an error aborts the update and leaves the record unchanged.
pub type Mutator<'a, T> = &'a mut dyn FnMut(&mut T) -> Result<()>;

/// Guard evaluated against a record, under its lock, before it is deleted.
pub type DeleteGuard<'a, T> = &'a mut dyn FnMut(&T) -> Result<()>;

/// Keyed store for users, slots and bookings.
///
/// Every method is atomic on its own. `update_*` and `delete_slot` evaluate
/// their callback and write the result as one step, which is what the
/// booking lifecycle composes its guarded transitions from: claiming a slot
/// is a compare-and-swap of `is_booked` through [`LedgerStore::update_slot`].
///
/// Query methods return empty collections, never `NotFound`.
pub trait LedgerStore: Send + Sync {
    // ─── Users ───────────────────────────────────────────────────

    fn get_user(&self, id: &str) -> Result<Option<User>>;

    /// Users with the given role, ordered by id.
    fn list_users_by_role(&self, role: UserRole) -> Result<Vec<User>>;

    /// Insert a new user. Fails if the id is taken.
    fn insert_user(&self, user: &User) -> Result<()>;

    fn update_user(&self, id: &str, mutate: Mutator<'_, User>) -> Result<User>;

    // ─── Slots ───────────────────────────────────────────────────

    fn get_slot(&self, id: &str) -> Result<Option<AvailabilitySlot>>;

    /// A mentor's slots, ordered by start time.
    fn list_slots_by_mentor(&self, mentor_id: &str) -> Result<Vec<AvailabilitySlot>>;

    /// Insert a new slot. Fails if the id is taken, and with
    /// `SlotUnavailable` if the mentor already has a slot starting then.
    fn insert_slot(&self, slot: &AvailabilitySlot) -> Result<()>;

    fn update_slot(&self, id: &str, mutate: Mutator<'_, AvailabilitySlot>)
        -> Result<AvailabilitySlot>;

    /// Remove a slot if `guard` accepts it, returning the removed record.
    fn delete_slot(&self, id: &str, guard: DeleteGuard<'_, AvailabilitySlot>)
        -> Result<AvailabilitySlot>;

    // ─── Bookings ────────────────────────────────────────────────

    fn get_booking(&self, id: &str) -> Result<Option<Booking>>;

    /// Bookings where the user is mentor or mentee, ordered by start time.
    fn list_bookings_by_user(&self, user_id: &str) -> Result<Vec<Booking>>;

    /// Every booking in the ledger, ordered by start time.
    fn list_bookings(&self) -> Result<Vec<Booking>>;

    /// Insert a new booking. Fails if the id or the payment code is taken.
    fn insert_booking(&self, booking: &Booking) -> Result<()>;

    fn update_booking(&self, id: &str, mutate: Mutator<'_, Booking>) -> Result<Booking>;

    /// Remove a booking outright, returning it if it existed.
    fn delete_booking(&self, id: &str) -> Result<Option<Booking>>;
}
