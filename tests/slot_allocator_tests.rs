// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Slot allocator tests: listing, creation, recurring expansion, deletion.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc, Weekday};
use hoctuthien::config::Config;
use hoctuthien::error::AppError;
use hoctuthien::services::slots::WeeklyPattern;
use hoctuthien::AppState;

mod common;

/// Monday 2025-12-01 09:00 in UTC+7.
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 12, 1, 2, 0, 0).unwrap()
}

fn setup() -> AppState {
    let state = AppState::new(Config::test_default()).unwrap();
    common::add_mentor(state.db.as_ref(), "m1", 100_000, "2000");
    common::add_mentee(state.db.as_ref(), "u1", true);
    state
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[test]
fn test_bookable_slots_respect_lead_time_and_order() {
    let state = setup();
    let db = state.db.as_ref();
    common::add_slot(db, "later", "m1", now() + Duration::days(2), 60);
    common::add_slot(db, "sooner", "m1", now() + Duration::hours(3), 60);
    common::add_slot(db, "too-soon", "m1", now() + Duration::minutes(30), 60);
    common::add_slot(db, "past", "m1", now() - Duration::hours(3), 60);
    common::add_slot(db, "taken", "m1", now() + Duration::days(1), 60);
    state.slots.claim_slot("taken", "m1", now()).unwrap();

    let ids: Vec<String> = state
        .slots
        .list_bookable_slots("m1", now())
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(ids, vec!["sooner", "later"]);

    // The mentor's own calendar shows everything.
    assert_eq!(state.slots.list_slots("m1").unwrap().len(), 5);
    assert!(state.slots.list_bookable_slots("m2", now()).unwrap().is_empty());
}

#[test]
fn test_booking_window_excludes_lead_time_boundary() {
    let state = setup();
    let lead = state.slots.lead_time();
    assert_eq!(lead, Duration::minutes(30));

    assert!(state
        .slots
        .is_within_booking_window(now() + lead + Duration::seconds(1), now()));
    assert!(!state.slots.is_within_booking_window(now() + lead, now()));
    assert!(!state.slots.is_within_booking_window(now() - Duration::hours(1), now()));
}

#[test]
fn test_create_slot() {
    let state = setup();
    let start = now() + Duration::days(1);

    let slot = state.slots.create_slot("m1", start, 90).unwrap();
    assert_eq!(slot.mentor_id, "m1");
    assert_eq!(slot.end_time, start + Duration::minutes(90));
    assert!(!slot.is_booked);
    assert_eq!(state.db.get_slot(&slot.id).unwrap().unwrap(), slot);

    assert!(matches!(
        state.slots.create_slot("m1", start, 0),
        Err(AppError::InvalidRange(_))
    ));
    assert!(matches!(
        state.slots.create_slot("u1", start, 60),
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        state.slots.create_slot("ghost", start, 60),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn test_one_slot_per_mentor_and_instant() {
    let state = setup();
    common::add_mentee(state.db.as_ref(), "u2", true);
    let start = now() + Duration::days(1);

    let slot = state.slots.create_slot("m1", start, 60).unwrap();
    assert!(matches!(
        state.slots.create_slot("m1", start, 90),
        Err(AppError::SlotUnavailable)
    ));
    assert_eq!(state.slots.list_slots("m1").unwrap().len(), 1);

    // Only one mentee can hold the mentor at that instant.
    state.bookings.create_booking("m1", &slot.id, "u1", now()).unwrap();
    assert!(matches!(
        state.bookings.create_booking("m1", &slot.id, "u2", now()),
        Err(AppError::SlotUnavailable)
    ));

    // Another mentor is free to publish the same instant.
    common::add_mentor(state.db.as_ref(), "m2", 50_000, "1111");
    state.slots.create_slot("m2", start, 60).unwrap();
}

#[test]
fn test_deleted_slot_frees_its_instant() {
    let state = setup();
    let start = now() + Duration::days(1);

    let slot = state.slots.create_slot("m1", start, 60).unwrap();
    state.slots.delete_slot(&slot.id, "m1").unwrap();

    let again = state.slots.create_slot("m1", start, 60).unwrap();
    assert_ne!(again.id, slot.id);
}

#[test]
fn test_oversized_duration_is_invalid_range() {
    let state = setup();
    let start = now() + Duration::days(1);

    assert!(matches!(
        state.slots.create_slot("m1", start, 1_000_000_000_000),
        Err(AppError::InvalidRange(_))
    ));
    assert!(matches!(
        state.slots.create_slot("m1", start, i64::MAX),
        Err(AppError::InvalidRange(_))
    ));

    let mut pattern = WeeklyPattern::new();
    pattern.insert(Weekday::Mon, vec![time(9, 0)]);
    assert!(matches!(
        state
            .slots
            .create_recurring_slots("m1", &pattern, 1_000_000_000_000, 4, now()),
        Err(AppError::InvalidRange(_))
    ));
    assert!(state.slots.list_slots("m1").unwrap().is_empty());
}

#[test]
fn test_recurring_expansion_in_local_time() {
    let state = setup();
    let mut pattern = WeeklyPattern::new();
    pattern.insert(Weekday::Mon, vec![time(19, 0)]);
    pattern.insert(Weekday::Wed, vec![time(8, 0), time(20, 30)]);

    let created = state
        .slots
        .create_recurring_slots("m1", &pattern, 60, 2, now())
        .unwrap();

    // Two weeks starting Monday: 2 Mondays + 2 Wednesdays x 2 times.
    assert_eq!(created.len(), 6);

    // Monday 19:00 local is 12:00 UTC.
    let first = &created[0];
    assert_eq!(first.start_time, Utc.with_ymd_and_hms(2025, 12, 1, 12, 0, 0).unwrap());
    assert_eq!(first.duration(), Duration::minutes(60));

    // Wednesday 08:00 local is 01:00 UTC the same day.
    assert!(created
        .iter()
        .any(|s| s.start_time == Utc.with_ymd_and_hms(2025, 12, 3, 1, 0, 0).unwrap()));
    assert!(created.iter().all(|s| s.mentor_id == "m1" && !s.is_booked));
}

#[test]
fn test_recurring_expansion_is_idempotent() {
    let state = setup();
    let mut pattern = WeeklyPattern::new();
    pattern.insert(Weekday::Tue, vec![time(9, 0), time(9, 0)]);
    pattern.insert(Weekday::Fri, vec![time(18, 0)]);

    let first = state
        .slots
        .create_recurring_slots("m1", &pattern, 60, 4, now())
        .unwrap();
    // Duplicate times in the pattern collapse.
    assert_eq!(first.len(), 8);

    let second = state
        .slots
        .create_recurring_slots("m1", &pattern, 60, 4, now())
        .unwrap();
    assert!(second.is_empty());
    assert_eq!(state.slots.list_slots("m1").unwrap().len(), 8);

    // A longer horizon only adds the new weeks.
    let third = state
        .slots
        .create_recurring_slots("m1", &pattern, 60, 5, now())
        .unwrap();
    assert_eq!(third.len(), 2);
}

#[test]
fn test_recurring_expansion_skips_existing_single_slot() {
    let state = setup();
    // Tuesday 2025-12-02 09:00 local
    let existing = Utc.with_ymd_and_hms(2025, 12, 2, 2, 0, 0).unwrap();
    state.slots.create_slot("m1", existing, 60).unwrap();

    let mut pattern = WeeklyPattern::new();
    pattern.insert(Weekday::Tue, vec![time(9, 0)]);

    let created = state
        .slots
        .create_recurring_slots("m1", &pattern, 60, 1, now())
        .unwrap();
    assert!(created.is_empty());
}

#[test]
fn test_recurring_expansion_validates_inputs() {
    let state = setup();
    let mut pattern = WeeklyPattern::new();
    pattern.insert(Weekday::Mon, vec![time(9, 0)]);

    assert!(matches!(
        state.slots.create_recurring_slots("m1", &pattern, -15, 4, now()),
        Err(AppError::InvalidRange(_))
    ));
    assert!(matches!(
        state.slots.create_recurring_slots("u1", &pattern, 60, 4, now()),
        Err(AppError::Forbidden(_))
    ));
    assert!(state
        .slots
        .create_recurring_slots("m1", &WeeklyPattern::new(), 60, 4, now())
        .unwrap()
        .is_empty());
}

#[test]
fn test_delete_slot_guards() {
    let state = setup();
    common::add_mentor(state.db.as_ref(), "m2", 50_000, "1111");
    let free = state.slots.create_slot("m1", now() + Duration::days(1), 60).unwrap();
    let held = state.slots.create_slot("m1", now() + Duration::days(2), 60).unwrap();
    state.bookings.create_booking("m1", &held.id, "u1", now()).unwrap();

    assert!(matches!(
        state.slots.delete_slot(&free.id, "m2"),
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        state.slots.delete_slot(&held.id, "m1"),
        Err(AppError::SlotInUse)
    ));
    assert!(matches!(
        state.slots.delete_slot("missing", "m1"),
        Err(AppError::NotFound(_))
    ));

    state.slots.delete_slot(&free.id, "m1").unwrap();
    assert!(state.db.get_slot(&free.id).unwrap().is_none());
    assert!(state.db.get_slot(&held.id).unwrap().is_some());
}

#[test]
fn test_release_slot_by_time() {
    let state = setup();
    let start = now() + Duration::days(1);
    common::add_slot(state.db.as_ref(), "s1", "m1", start, 60);
    state.slots.claim_slot("s1", "m1", now()).unwrap();

    assert!(!state
        .slots
        .release_slot("m1", start + Duration::seconds(1))
        .unwrap());
    assert!(state.db.get_slot("s1").unwrap().unwrap().is_booked);

    assert!(state.slots.release_slot("m1", start).unwrap());
    assert!(!state.db.get_slot("s1").unwrap().unwrap().is_booked);
}
