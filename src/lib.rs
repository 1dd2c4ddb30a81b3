// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Hoc Tu Thien: mentoring sessions paid for as charity donations.
//!
//! This crate provides the booking and payment reconciliation engine behind
//! the Hoc Tu Thien API. Mentees book mentors' availability slots and pay
//! by bank transfer to a charity account; payments are confirmed by
//! matching the Thien Nguyen public transaction feed against each booking's
//! payment code.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::{LedgerStore, MemoryLedger};
use services::{
    BookingService, FeedError, LeaderboardService, PaymentReconciler, PaymentWatcher,
    SlotAllocator, UserService,
};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Arc<dyn LedgerStore>,
    pub users: UserService,
    pub slots: SlotAllocator,
    pub bookings: BookingService,
    pub reconciler: PaymentReconciler,
    pub leaderboard: LeaderboardService,
    pub watcher: PaymentWatcher,
}

impl AppState {
    /// Wire every service to a fresh in-memory ledger.
    pub fn new(config: Config) -> Result<Self, FeedError> {
        Self::with_store(config, Arc::new(MemoryLedger::new()))
    }

    /// Wire every service to an existing ledger.
    pub fn with_store(config: Config, db: Arc<dyn LedgerStore>) -> Result<Self, FeedError> {
        let users = UserService::new(db.clone());
        let slots = SlotAllocator::new(
            db.clone(),
            config.lead_time_minutes,
            config.timezone_offset_hours,
        );
        let bookings = BookingService::new(db.clone(), slots.clone(), &config.meet_base_url);
        let reconciler = PaymentReconciler::new(&config, bookings.clone(), users.clone())?;
        let leaderboard = LeaderboardService::new(db.clone(), config.timezone_offset_hours);
        let watcher = PaymentWatcher::new(reconciler.clone(), bookings.clone(), &config);

        Ok(Self {
            config,
            db,
            users,
            slots,
            bookings,
            reconciler,
            leaderboard,
            watcher,
        })
    }
}
