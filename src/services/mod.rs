// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod bookings;
pub mod leaderboard;
pub mod policy;
pub mod qr;
pub mod reconciler;
pub mod slots;
pub mod thien_nguyen;
pub mod users;
pub mod watcher;

pub use bookings::BookingService;
pub use leaderboard::LeaderboardService;
pub use reconciler::PaymentReconciler;
pub use slots::SlotAllocator;
pub use thien_nguyen::{FeedError, ThienNguyenClient};
pub use users::UserService;
pub use watcher::{PaymentWatcher, WatchOutcome};
