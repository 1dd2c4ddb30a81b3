// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Every setting has a default, so the service starts with an empty
//! environment and talks to the public Thien Nguyen feed.

use std::env;
use std::str::FromStr;

/// Public Thien Nguyen API (bank account transaction feed).
pub const DEFAULT_FEED_BASE_URL: &str = "https://apiv2.thiennguyen.app/api/v2";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,

    // --- Transaction feed ---
    /// Base URL of the bank transaction feed
    pub feed_base_url: String,
    /// Upper bound on a single feed request
    pub feed_timeout_secs: u64,
    /// How many days back the feed is searched for a payment
    pub feed_lookback_days: i64,
    /// Serve the canned demo transactions when the feed is down and nothing is cached
    pub feed_demo_fallback: bool,

    // --- Booking policy ---
    /// Minimum gap between now and a slot's start for it to be bookable
    pub lead_time_minutes: i64,
    /// Offset of the platform's local time from UTC (Vietnam is +7)
    pub timezone_offset_hours: i32,

    // --- Activation ---
    /// Donation required to activate an account (VND)
    pub activation_amount: u64,
    /// Charity account receiving activation donations
    pub activation_account: String,

    // --- Payment presentation ---
    /// VietQR bank identifier (all Thien Nguyen accounts are MBBank)
    pub qr_bank_id: String,
    /// VietQR image template
    pub qr_template: String,
    /// Base URL for generated meeting links
    pub meet_base_url: String,

    // --- Payment watcher ---
    /// Delay before the first background re-check
    pub watch_initial_delay_secs: u64,
    /// Cap on the backoff delay
    pub watch_max_delay_secs: u64,
    /// Number of feed checks before the watcher gives up
    pub watch_max_attempts: u32,

    /// Populate the ledger with demo users, slots and bookings at startup
    pub seed_demo_data: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:5173".to_string(),
            feed_base_url: DEFAULT_FEED_BASE_URL.to_string(),
            feed_timeout_secs: 10,
            feed_lookback_days: 3,
            feed_demo_fallback: false,
            lead_time_minutes: 30,
            timezone_offset_hours: 7,
            activation_amount: 10_000,
            activation_account: "2000".to_string(),
            qr_bank_id: "MB".to_string(),
            qr_template: "compact2".to_string(),
            meet_base_url: "https://meet.google.com".to_string(),
            watch_initial_delay_secs: 15,
            watch_max_delay_secs: 300,
            watch_max_attempts: 12,
            seed_demo_data: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();

        Ok(Self {
            port: parse_or("PORT", defaults.port)?,
            frontend_url: env::var("FRONTEND_URL").unwrap_or(defaults.frontend_url),
            feed_base_url: env::var("FEED_BASE_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or(defaults.feed_base_url),
            feed_timeout_secs: parse_or("FEED_TIMEOUT_SECS", defaults.feed_timeout_secs)?,
            feed_lookback_days: parse_or("FEED_LOOKBACK_DAYS", defaults.feed_lookback_days)?,
            feed_demo_fallback: parse_or("FEED_DEMO_FALLBACK", defaults.feed_demo_fallback)?,
            lead_time_minutes: parse_or("BOOKING_LEAD_TIME_MINUTES", defaults.lead_time_minutes)?,
            timezone_offset_hours: parse_or(
                "TIMEZONE_OFFSET_HOURS",
                defaults.timezone_offset_hours,
            )?,
            activation_amount: parse_or("ACTIVATION_AMOUNT", defaults.activation_amount)?,
            activation_account: env::var("ACTIVATION_ACCOUNT")
                .unwrap_or(defaults.activation_account),
            qr_bank_id: env::var("QR_BANK_ID").unwrap_or(defaults.qr_bank_id),
            qr_template: env::var("QR_TEMPLATE").unwrap_or(defaults.qr_template),
            meet_base_url: env::var("MEET_BASE_URL").unwrap_or(defaults.meet_base_url),
            watch_initial_delay_secs: parse_or(
                "WATCH_INITIAL_DELAY_SECS",
                defaults.watch_initial_delay_secs,
            )?,
            watch_max_delay_secs: parse_or("WATCH_MAX_DELAY_SECS", defaults.watch_max_delay_secs)?,
            watch_max_attempts: parse_or("WATCH_MAX_ATTEMPTS", defaults.watch_max_attempts)?,
            seed_demo_data: parse_or("SEED_DEMO_DATA", defaults.seed_demo_data)?,
        })
    }

    /// Config for tests: feed pointed at a closed local port, zero watcher delays.
    pub fn test_default() -> Self {
        Self {
            feed_base_url: "http://127.0.0.1:9".to_string(),
            feed_timeout_secs: 2,
            watch_initial_delay_secs: 0,
            watch_max_delay_secs: 0,
            watch_max_attempts: 3,
            ..Self::default()
        }
    }
}

/// Parse an optional environment variable, falling back to `default` when unset.
fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(key, raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1:?}")]
    Invalid(&'static str, String),
}
