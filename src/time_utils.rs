// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting and platform-local calendars.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, Offset, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Format a calendar date the way the transaction feed expects (`yyyy-mm-dd`).
pub fn format_feed_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Fixed offset for the platform's local time. Out-of-range offsets fall back to UTC.
pub fn platform_offset(hours: i32) -> FixedOffset {
    FixedOffset::east_opt(hours.saturating_mul(3600)).unwrap_or(Utc.fix())
}

/// Calendar date of `instant` in the platform's local time.
pub fn local_date(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&offset).date_naive()
}

/// Convert a platform-local wall-clock time to UTC.
pub fn local_to_utc(naive: NaiveDateTime, offset: FixedOffset) -> DateTime<Utc> {
    (naive - Duration::seconds(i64::from(offset.local_minus_utc()))).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone};

    #[test]
    fn test_local_to_utc_applies_offset() {
        let offset = platform_offset(7);
        let naive = NaiveDate::from_ymd_opt(2025, 11, 27)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(9, 0, 0).unwrap());

        assert_eq!(
            local_to_utc(naive, offset),
            Utc.with_ymd_and_hms(2025, 11, 27, 2, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_local_date_crosses_midnight() {
        let offset = platform_offset(7);
        let late_utc = Utc.with_ymd_and_hms(2025, 11, 27, 18, 30, 0).unwrap();
        assert_eq!(
            local_date(late_utc, offset),
            NaiveDate::from_ymd_opt(2025, 11, 28).unwrap()
        );
    }

    #[test]
    fn test_format_helpers() {
        let date = Utc.with_ymd_and_hms(2025, 1, 5, 10, 30, 0).unwrap();
        assert_eq!(format_utc_rfc3339(date), "2025-01-05T10:30:00Z");
        assert_eq!(format_feed_date(date.date_naive()), "2025-01-05");
    }

    #[test]
    fn test_platform_offset_out_of_range_is_utc() {
        assert_eq!(platform_offset(99).local_minus_utc(), 0);
    }
}
