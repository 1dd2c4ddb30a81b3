// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Background payment watcher.
//!
//! After a mentee is shown the QR code, the UI can ask the server to keep
//! checking the feed instead of polling itself. Each watched booking gets one
//! tokio task that re-verifies with exponential backoff and publishes the
//! final outcome on a `watch` channel. Watching a booking that is already
//! being watched joins the existing task. Only running watches are tracked;
//! a finished watch drops out of the map and its outcome stays with the
//! receivers and the booking itself.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::services::bookings::BookingService;
use crate::services::reconciler::PaymentReconciler;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// State of a payment watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchOutcome {
    Pending,
    Paid,
    Cancelled,
    /// Gave up after the configured number of checks
    Exhausted,
    /// The booking disappeared while being watched
    NotFound,
}

impl WatchOutcome {
    pub fn is_final(self) -> bool {
        self != WatchOutcome::Pending
    }
}

#[derive(Clone)]
pub struct PaymentWatcher {
    reconciler: PaymentReconciler,
    bookings: BookingService,
    watches: Arc<DashMap<String, watch::Receiver<WatchOutcome>>>,
    initial_delay: Duration,
    max_delay: Duration,
    max_attempts: u32,
}

impl PaymentWatcher {
    pub fn new(reconciler: PaymentReconciler, bookings: BookingService, config: &Config) -> Self {
        Self {
            reconciler,
            bookings,
            watches: Arc::new(DashMap::new()),
            initial_delay: Duration::from_secs(config.watch_initial_delay_secs),
            max_delay: Duration::from_secs(config.watch_max_delay_secs),
            max_attempts: config.watch_max_attempts,
        }
    }

    /// Start watching a booking's payment, or join the watch already running.
    pub fn watch_booking(&self, booking_id: &str) -> Result<watch::Receiver<WatchOutcome>> {
        let booking = self.bookings.get_booking(booking_id)?;
        if booking.is_cancelled() {
            return Err(AppError::AlreadyCancelled);
        }

        let (tx, rx) = watch::channel(WatchOutcome::Pending);
        match self.watches.entry(booking_id.to_string()) {
            Entry::Occupied(mut existing) => {
                if !existing.get().borrow().is_final() {
                    return Ok(existing.get().clone());
                }
                existing.insert(rx.clone());
            }
            Entry::Vacant(vacant) => {
                vacant.insert(rx.clone());
            }
        }

        tracing::info!(booking_id, "Payment watch started");
        tokio::spawn(self.clone().run(booking_id.to_string(), tx, rx.clone()));
        Ok(rx)
    }

    /// `Pending` while a watch runs, otherwise what the booking itself says.
    ///
    /// `None` for unknown bookings and for unpaid ones nobody is watching.
    pub fn status(&self, booking_id: &str) -> Option<WatchOutcome> {
        if self.watches.contains_key(booking_id) {
            return Some(WatchOutcome::Pending);
        }
        let booking = self.bookings.get_booking(booking_id).ok()?;
        if booking.is_cancelled() {
            Some(WatchOutcome::Cancelled)
        } else if booking.is_paid() {
            Some(WatchOutcome::Paid)
        } else {
            None
        }
    }

    /// Number of watches still polling.
    pub fn active_watches(&self) -> usize {
        self.watches.len()
    }

    async fn run(
        self,
        booking_id: String,
        tx: watch::Sender<WatchOutcome>,
        rx: watch::Receiver<WatchOutcome>,
    ) {
        let outcome = self.poll(&booking_id).await;

        // Only drop the entry if it still belongs to this task.
        self.watches
            .remove_if(&booking_id, |_, current| current.same_channel(&rx));

        tracing::info!(booking_id = %booking_id, outcome = ?outcome, "Payment watch finished");
        tx.send_replace(outcome);
    }

    async fn poll(&self, booking_id: &str) -> WatchOutcome {
        let mut delay = self.initial_delay;

        for attempt in 1..=self.max_attempts {
            tokio::time::sleep(delay).await;

            match self.reconciler.verify_booking(booking_id, Utc::now()).await {
                Ok((true, _)) => return WatchOutcome::Paid,
                Ok((false, _)) => {
                    tracing::debug!(booking_id, attempt, "Payment not seen yet");
                }
                Err(AppError::AlreadyCancelled) => return WatchOutcome::Cancelled,
                Err(AppError::NotFound(_)) => return WatchOutcome::NotFound,
                Err(e) => {
                    tracing::warn!(booking_id, attempt, error = %e, "Payment check failed");
                }
            }

            delay = delay.saturating_mul(2).min(self.max_delay);
        }

        WatchOutcome::Exhausted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serialization() {
        assert_eq!(
            serde_json::to_string(&WatchOutcome::NotFound).unwrap(),
            "\"not_found\""
        );
        assert!(!WatchOutcome::Pending.is_final());
        assert!(WatchOutcome::Exhausted.is_final());
    }
}
