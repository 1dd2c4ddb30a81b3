// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Thien Nguyen API client for reading charity account transactions.
//!
//! The feed is public and unauthenticated. Every failure mode (transport,
//! timeout, HTTP status, malformed body) surfaces as a [`FeedError`] so the
//! reconciler can decide how to degrade.

use crate::models::Transaction;
use crate::time_utils::format_feed_date;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::time::Duration;

/// Transactions requested per page. One page covers a few days of donations.
pub const FEED_PAGE_SIZE: u32 = 50;

/// Errors talking to the transaction feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Transaction feed unavailable: {0}")]
    Unavailable(String),

    #[error("Transaction feed returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Transaction feed returned malformed data: {0}")]
    Malformed(String),
}

/// Thien Nguyen transaction feed client.
#[derive(Clone)]
pub struct ThienNguyenClient {
    http: reqwest::Client,
    base_url: String,
}

impl ThienNguyenClient {
    /// Create a client whose requests give up after `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::Unavailable(format!("HTTP client init failed: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// List transactions into `account_number` between two dates (inclusive).
    ///
    /// GET {base}/bank-account-transaction/{account}/transactionsV2
    ///     ?fromDate=yyyy-mm-dd&toDate=yyyy-mm-dd&pageNumber=1&pageSize=50
    pub async fn list_transactions(
        &self,
        account_number: &str,
        from: NaiveDate,
        to: NaiveDate,
        page: u32,
    ) -> Result<Vec<Transaction>, FeedError> {
        let url = format!(
            "{}/bank-account-transaction/{}/transactionsV2",
            self.base_url,
            urlencoding::encode(account_number)
        );

        let response = self
            .http
            .get(&url)
            .query(&[
                ("fromDate", format_feed_date(from)),
                ("toDate", format_feed_date(to)),
                ("pageNumber", page.to_string()),
                ("pageSize", FEED_PAGE_SIZE.to_string()),
            ])
            .send()
            .await
            .map_err(|e| FeedError::Unavailable(e.to_string()))?;

        let body: FeedResponse = self.check_response_json(response).await?;

        let transactions = body
            .data
            .map(|d| d.transactions)
            .unwrap_or_default()
            .into_iter()
            .map(|t| t.into_transaction(account_number))
            .collect();

        Ok(transactions)
    }

    /// Check response status and parse the JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, FeedError> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Status { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| FeedError::Malformed(e.to_string()))
    }
}

// ─── Wire format ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct FeedResponse {
    #[serde(default)]
    data: Option<FeedData>,
}

#[derive(Debug, Deserialize)]
struct FeedData {
    #[serde(default)]
    transactions: Vec<FeedTransaction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedTransaction {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
    /// "2025-11-27T18:59:00", no timezone (GMT+7)
    #[serde(default)]
    transaction_time: String,
    transaction_amount: f64,
    #[serde(default)]
    narrative: Option<String>,
}

impl FeedTransaction {
    fn into_transaction(self, account_number: &str) -> Transaction {
        // Amounts are whole VND; round fractions down so a short payment never
        // rounds up to the expected amount. Refunds (negative) count as zero.
        let amount = if self.transaction_amount.is_finite() && self.transaction_amount > 0.0 {
            self.transaction_amount.floor() as u64
        } else {
            0
        };

        Transaction {
            id: self.id,
            transaction_time: self.transaction_time,
            amount,
            description: self.narrative.unwrap_or_default(),
            account_number: account_number.to_string(),
        }
    }
}

/// Transaction ids arrive as either JSON strings or numbers.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feed_response() {
        let json = r#"{
            "data": {
                "transactions": [
                    { "id": 42, "transactionTime": "2025-11-27T18:59:00",
                      "transactionAmount": 10000, "narrative": "HOCTUTHIEN KICHHOAT AB12CD" },
                    { "id": "abc", "transactionTime": "2025-11-27T19:00:00",
                      "transactionAmount": 9999.9, "narrative": null }
                ]
            }
        }"#;

        let parsed: FeedResponse = serde_json::from_str(json).unwrap();
        let txs: Vec<Transaction> = parsed
            .data
            .unwrap()
            .transactions
            .into_iter()
            .map(|t| t.into_transaction("2000"))
            .collect();

        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].id, "42");
        assert_eq!(txs[0].amount, 10_000);
        assert_eq!(txs[0].account_number, "2000");
        assert_eq!(txs[1].id, "abc");
        assert_eq!(txs[1].amount, 9_999, "fractions round down");
        assert_eq!(txs[1].description, "");
    }

    #[test]
    fn test_parse_empty_data() {
        let parsed: FeedResponse = serde_json::from_str(r#"{"data": null}"#).unwrap();
        assert!(parsed.data.is_none());

        let parsed: FeedResponse = serde_json::from_str(r#"{"data": {}}"#).unwrap();
        assert!(parsed.data.unwrap().transactions.is_empty());
    }

    #[test]
    fn test_negative_amount_counts_as_zero() {
        let t = FeedTransaction {
            id: "r1".to_string(),
            transaction_time: String::new(),
            transaction_amount: -50_000.0,
            narrative: Some("refund".to_string()),
        };
        assert_eq!(t.into_transaction("1111").amount, 0);
    }
}
