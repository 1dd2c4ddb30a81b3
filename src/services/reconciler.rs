// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Payment reconciliation against the Thien Nguyen transaction feed.
//!
//! A payment is confirmed when some transaction into the expected charity
//! account carries at least the expected amount and its narrative contains
//! the payment code. Both sides are compared in normalized form (upper-case,
//! whitespace removed), because payers type narratives by hand.
//!
//! The feed is outside our control. When it fails the reconciler answers
//! from the last good page for that account, then from a canned demo set if
//! configured, and otherwise from nothing. It never returns a feed error to
//! its callers.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{normalize_payment_text, Booking, PaymentInstructions, Transaction, User};
use crate::services::bookings::BookingService;
use crate::services::qr::vietqr_url;
use crate::services::thien_nguyen::{FeedError, ThienNguyenClient};
use crate::services::users::UserService;
use crate::time_utils::{local_date, platform_offset};
use chrono::{DateTime, Days, FixedOffset, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct PaymentReconciler {
    client: ThienNguyenClient,
    /// Account number -> last successfully fetched transactions
    cache: Arc<DashMap<String, Vec<Transaction>>>,
    demo_fallback: bool,
    lookback_days: u64,
    offset: FixedOffset,
    activation_amount: u64,
    activation_account: String,
    qr_bank_id: String,
    qr_template: String,
    bookings: BookingService,
    users: UserService,
}

impl PaymentReconciler {
    pub fn new(
        config: &Config,
        bookings: BookingService,
        users: UserService,
    ) -> std::result::Result<Self, FeedError> {
        let client = ThienNguyenClient::new(
            &config.feed_base_url,
            Duration::from_secs(config.feed_timeout_secs),
        )?;

        Ok(Self {
            client,
            cache: Arc::new(DashMap::new()),
            demo_fallback: config.feed_demo_fallback,
            lookback_days: u64::try_from(config.feed_lookback_days).unwrap_or(0),
            offset: platform_offset(config.timezone_offset_hours),
            activation_amount: config.activation_amount,
            activation_account: config.activation_account.clone(),
            qr_bank_id: config.qr_bank_id.clone(),
            qr_template: config.qr_template.clone(),
            bookings,
            users,
        })
    }

    /// Recent transactions into `account_number`, degrading on feed failure.
    pub async fn fetch_transactions(
        &self,
        account_number: &str,
        now: DateTime<Utc>,
    ) -> Vec<Transaction> {
        let to = local_date(now, self.offset);
        let from = to.checked_sub_days(Days::new(self.lookback_days)).unwrap_or(to);

        match self.client.list_transactions(account_number, from, to, 1).await {
            Ok(transactions) => {
                tracing::debug!(
                    account = account_number,
                    count = transactions.len(),
                    "Fetched transactions"
                );
                self.cache
                    .insert(account_number.to_string(), transactions.clone());
                transactions
            }
            Err(e) => {
                tracing::warn!(
                    account = account_number,
                    error = %e,
                    "FeedUnavailable: using fallback transactions"
                );
                if let Some(cached) = self.cache.get(account_number) {
                    return cached.value().clone();
                }
                if self.demo_fallback {
                    return demo_transactions(account_number, now, self.offset);
                }
                Vec::new()
            }
        }
    }

    /// Whether a transfer of at least `expected_amount` carrying `payment_code`
    /// reached `account_number` recently.
    pub async fn verify_payment(
        &self,
        account_number: &str,
        expected_amount: u64,
        payment_code: &str,
        now: DateTime<Utc>,
    ) -> bool {
        let transactions = self.fetch_transactions(account_number, now).await;
        match find_match(&transactions, expected_amount, payment_code) {
            Some(tx) => {
                tracing::info!(
                    account = account_number,
                    transaction_id = %tx.id,
                    amount = tx.amount,
                    "Payment matched"
                );
                true
            }
            None => false,
        }
    }

    /// Check the feed for a booking's payment and mark it paid on a match.
    ///
    /// Returns whether the booking is now paid, with its current state.
    pub async fn verify_booking(
        &self,
        booking_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(bool, Booking)> {
        let booking = self.bookings.get_booking(booking_id)?;
        if booking.is_cancelled() {
            return Err(AppError::AlreadyCancelled);
        }
        if booking.is_paid() {
            return Ok((true, booking));
        }

        let account = self.mentor_account(&booking)?;
        if !self
            .verify_payment(&account, booking.cost, &booking.payment_code, now)
            .await
        {
            return Ok((false, booking));
        }

        let booking = self.bookings.mark_paid(booking_id)?;
        Ok((true, booking))
    }

    /// Check the feed for a user's activation donation and activate on a match.
    pub async fn verify_activation(&self, user_id: &str, now: DateTime<Utc>) -> Result<User> {
        let user = self.users.get_user(user_id)?;
        if user.is_activated {
            return Ok(user);
        }

        let code = user.activation_code();
        if !self
            .verify_payment(&self.activation_account, self.activation_amount, &code, now)
            .await
        {
            return Ok(user);
        }

        self.users.activate(user_id)
    }

    pub fn booking_instructions(&self, booking_id: &str) -> Result<PaymentInstructions> {
        let booking = self.bookings.get_booking(booking_id)?;
        let account = self.mentor_account(&booking)?;
        Ok(self.instructions(account, booking.cost, booking.payment_code))
    }

    pub fn activation_instructions(&self, user_id: &str) -> Result<PaymentInstructions> {
        let user = self.users.get_user(user_id)?;
        Ok(self.instructions(
            self.activation_account.clone(),
            self.activation_amount,
            user.activation_code(),
        ))
    }

    fn instructions(&self, account: String, amount: u64, code: String) -> PaymentInstructions {
        PaymentInstructions {
            qr_url: vietqr_url(&self.qr_bank_id, &self.qr_template, &account, amount, &code),
            account_number: account,
            amount,
            payment_code: code,
        }
    }

    fn mentor_account(&self, booking: &Booking) -> Result<String> {
        let mentor = self.users.get_user(&booking.mentor_id)?;
        mentor.charity_account_number.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "mentor {} has no charity account",
                mentor.id
            ))
        })
    }
}

/// First transaction that pays at least `expected_amount` with `payment_code`
/// somewhere in its narrative.
pub fn find_match<'a>(
    transactions: &'a [Transaction],
    expected_amount: u64,
    payment_code: &str,
) -> Option<&'a Transaction> {
    let code = normalize_payment_text(payment_code);
    if code.is_empty() {
        return None;
    }
    transactions
        .iter()
        .find(|tx| payment_matches(tx, expected_amount, &code))
}

/// `normalized_code` must already be normalized.
pub fn payment_matches(tx: &Transaction, expected_amount: u64, normalized_code: &str) -> bool {
    tx.amount >= expected_amount && normalize_payment_text(&tx.description).contains(normalized_code)
}

/// Canned transactions served when the feed is down and nothing is cached.
fn demo_transactions(
    account_number: &str,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Vec<Transaction> {
    let time = now
        .with_timezone(&offset)
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string();

    [
        ("mock-1", 10_000, "HOCTUTHIEN KICHHOAT DEMOUSER"),
        ("mock-2", 50_000, "HOCTUTHIEN HOCPHI BOOK123"),
    ]
    .into_iter()
    .map(|(id, amount, description)| Transaction {
        id: id.to_string(),
        transaction_time: time.clone(),
        amount,
        description: description.to_string(),
        account_number: account_number.to_string(),
    })
    .collect()
}
