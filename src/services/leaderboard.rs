// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Donation and session leaderboards.
//!
//! Rankings are folded from the booking ledger on every query. Only paid,
//! non-cancelled sessions that started inside the current calendar period
//! (platform-local) count.

use crate::db::LedgerStore;
use crate::error::Result;
use crate::models::{
    Booking, LeaderboardEntry, RankingMetric, TimePeriod, User, UserRole,
};
use crate::time_utils::{local_date, local_to_utc, platform_offset};
use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, NaiveTime, Utc};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

/// Entries returned per leaderboard.
pub const LEADERBOARD_SIZE: usize = 10;

#[derive(Clone)]
pub struct LeaderboardService {
    db: Arc<dyn LedgerStore>,
    offset: FixedOffset,
}

impl LeaderboardService {
    pub fn new(db: Arc<dyn LedgerStore>, timezone_offset_hours: i32) -> Self {
        Self {
            db,
            offset: platform_offset(timezone_offset_hours),
        }
    }

    pub fn rank(
        &self,
        role: UserRole,
        period: TimePeriod,
        metric: RankingMetric,
        now: DateTime<Utc>,
    ) -> Result<Vec<LeaderboardEntry>> {
        let users = self.db.list_users_by_role(role)?;
        let bookings = self.db.list_bookings()?;
        let start = window_start(period, now, self.offset);

        Ok(aggregate(&users, &bookings, role, metric, start, now))
    }
}

/// Start of the calendar `period` containing `now`, in platform-local time.
pub fn window_start(period: TimePeriod, now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    let today = local_date(now, offset);

    let first_day = match period {
        TimePeriod::Day => Some(today),
        TimePeriod::Week => {
            let back = u64::from(today.weekday().num_days_from_monday());
            today.checked_sub_days(Days::new(back))
        }
        TimePeriod::Month => today.with_day(1),
        TimePeriod::Quarter => {
            let month = (today.month0() / 3) * 3 + 1;
            NaiveDate::from_ymd_opt(today.year(), month, 1)
        }
        TimePeriod::Year => NaiveDate::from_ymd_opt(today.year(), 1, 1),
    }
    .unwrap_or(today);

    local_to_utc(first_day.and_time(NaiveTime::MIN), offset)
}

/// Rank `users` by `metric` over bookings that started in `[start, end]`.
///
/// Every user of the role appears in the candidate set, so users with a
/// zero value fill the board when fewer have activity. Ties go to the
/// smaller id.
pub fn aggregate(
    users: &[User],
    bookings: &[Booking],
    role: UserRole,
    metric: RankingMetric,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<LeaderboardEntry> {
    let mut totals: HashMap<&str, u64> = HashMap::new();

    for booking in bookings {
        if !booking.is_paid_session() || booking.start_time < start || booking.start_time > end {
            continue;
        }
        let participant = match role {
            UserRole::Mentor => booking.mentor_id.as_str(),
            UserRole::Mentee => booking.mentee_id.as_str(),
        };
        let value = match metric {
            RankingMetric::Donation => booking.cost,
            RankingMetric::Sessions => 1,
        };
        *totals.entry(participant).or_default() += value;
    }

    let mut ranked: Vec<(&User, u64)> = users
        .iter()
        .filter(|u| u.role == role)
        .map(|u| (u, totals.get(u.id.as_str()).copied().unwrap_or(0)))
        .collect();
    ranked.sort_by(|(a, av), (b, bv)| Reverse(av).cmp(&Reverse(bv)).then_with(|| a.id.cmp(&b.id)));

    ranked
        .into_iter()
        .take(LEADERBOARD_SIZE)
        .zip(1u32..)
        .map(|((user, value), rank)| LeaderboardEntry {
            rank,
            user: user.summary(),
            value,
        })
        .collect()
}
