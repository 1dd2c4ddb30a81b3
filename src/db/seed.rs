// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Demo data for local development (`SEED_DEMO_DATA=true`).

use crate::db::LedgerStore;
use crate::error::Result;
use crate::models::{AvailabilitySlot, Booking, BookingStatus, PaymentStatus, User, UserRole};
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Duration, TimeZone, Utc};

/// (id, name, hourly rate, charity account)
const DEMO_MENTORS: &[(&str, &str, u64, &str)] = &[
    ("m1", "Nguyễn Văn A", 100_000, "2000"),
    ("m2", "Trần Thị B", 50_000, "1111"),
    ("m3", "Lê C", 200_000, "2000"),
    ("m11", "Võ Tấn Phát", 300_000, "2000"),
];

const DEMO_MENTEES: &[(&str, &str)] = &[
    ("u1", "Phạm Văn Học"),
    ("u2", "Hoàng Thị Chăm"),
    ("u3", "Lê Tuấn Tú"),
];

/// Populate an empty ledger with a few activated users, open slots and paid
/// historical sessions. Returns the number of records written.
pub fn seed_demo_data(db: &dyn LedgerStore, now: DateTime<Utc>) -> Result<usize> {
    let created_at = format_utc_rfc3339(now);
    let mut written = 0;

    for (id, name, rate, account) in DEMO_MENTORS {
        db.insert_user(&User {
            id: id.to_string(),
            name: name.to_string(),
            role: UserRole::Mentor,
            is_activated: true,
            hourly_rate: Some(*rate),
            charity_account_number: Some(account.to_string()),
            created_at: created_at.clone(),
        })?;
        written += 1;
    }

    for (id, name) in DEMO_MENTEES {
        db.insert_user(&User {
            id: id.to_string(),
            name: name.to_string(),
            role: UserRole::Mentee,
            is_activated: true,
            hourly_rate: None,
            charity_account_number: None,
            created_at: created_at.clone(),
        })?;
        written += 1;
    }

    // Open slots one and two days out.
    let open_slots = [
        ("s1", "m1", Duration::days(1), Duration::minutes(60)),
        ("s2", "m1", Duration::days(2), Duration::minutes(90)),
        ("s3", "m11", Duration::hours(25), Duration::minutes(60)),
    ];
    for (id, mentor, offset, length) in open_slots {
        let start = now + offset;
        db.insert_slot(&AvailabilitySlot {
            id: id.to_string(),
            mentor_id: mentor.to_string(),
            start_time: start,
            end_time: start + length,
            is_booked: false,
        })?;
        written += 1;
    }

    // Paid historical sessions so leaderboards and profiles are not empty.
    let history = [
        ("b1", "m1", "u1", (2025, 10, 1, 9), 60, 100_000, "PAY1"),
        ("b2", "m2", "u1", (2025, 10, 5, 14), 60, 50_000, "PAY2"),
        ("b3", "m1", "u2", (2025, 10, 2, 9), 60, 100_000, "PAY3"),
        ("b4", "m3", "u3", (2025, 10, 10, 20), 90, 300_000, "PAY4"),
    ];
    for (id, mentor, mentee, (y, mo, d, h), minutes, cost, code) in history {
        let Some(start) = Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).single() else {
            continue;
        };
        db.insert_booking(&Booking {
            id: id.to_string(),
            slot_id: None,
            mentor_id: mentor.to_string(),
            mentee_id: mentee.to_string(),
            start_time: start,
            end_time: start + Duration::minutes(minutes),
            status: BookingStatus::Completed,
            payment_status: PaymentStatus::Paid,
            cost,
            payment_code: code.to_string(),
            meet_link: None,
            created_at: created_at.clone(),
        })?;
        written += 1;
    }

    tracing::info!(records = written, "Demo data seeded");
    Ok(written)
}
