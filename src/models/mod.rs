// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod booking;
pub mod leaderboard;
pub mod payment;
pub mod slot;
pub mod stats;
pub mod transaction;
pub mod user;

pub use booking::{Booking, BookingStatus, PaymentStatus};
pub use leaderboard::{LeaderboardEntry, RankingMetric, TimePeriod};
pub use payment::{normalize_payment_text, PaymentInstructions};
pub use slot::AvailabilitySlot;
pub use stats::UserStats;
pub use transaction::Transaction;
pub use user::{User, UserRole, UserSummary};
