// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Duration, Utc};
use hoctuthien::config::Config;
use hoctuthien::db::LedgerStore;
use hoctuthien::models::{AvailabilitySlot, User, UserRole};
use hoctuthien::routes::create_router;
use hoctuthien::AppState;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Create a test app whose feed points at a closed port.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    create_test_app_with_config(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config).expect("Failed to build test state"));
    (create_router(state.clone()), state)
}

/// Config whose feed is the given fake.
#[allow(dead_code)]
pub fn config_for_feed(feed: &FakeFeed) -> Config {
    Config {
        feed_base_url: feed.base_url.clone(),
        ..Config::test_default()
    }
}

// ─── Ledger fixtures ─────────────────────────────────────────

#[allow(dead_code)]
pub fn add_mentor(db: &dyn LedgerStore, id: &str, hourly_rate: u64, account: &str) -> User {
    let user = User {
        id: id.to_string(),
        name: format!("Mentor {}", id),
        role: UserRole::Mentor,
        is_activated: true,
        hourly_rate: Some(hourly_rate),
        charity_account_number: Some(account.to_string()),
        created_at: "2025-01-01T00:00:00Z".to_string(),
    };
    db.insert_user(&user).expect("Failed to insert mentor");
    user
}

#[allow(dead_code)]
pub fn add_mentee(db: &dyn LedgerStore, id: &str, activated: bool) -> User {
    let user = User {
        id: id.to_string(),
        name: format!("Mentee {}", id),
        role: UserRole::Mentee,
        is_activated: activated,
        hourly_rate: None,
        charity_account_number: None,
        created_at: "2025-01-01T00:00:00Z".to_string(),
    };
    db.insert_user(&user).expect("Failed to insert mentee");
    user
}

#[allow(dead_code)]
pub fn add_slot(
    db: &dyn LedgerStore,
    id: &str,
    mentor_id: &str,
    start: DateTime<Utc>,
    minutes: i64,
) -> AvailabilitySlot {
    let slot = AvailabilitySlot {
        id: id.to_string(),
        mentor_id: mentor_id.to_string(),
        start_time: start,
        end_time: start + Duration::minutes(minutes),
        is_booked: false,
    };
    db.insert_slot(&slot).expect("Failed to insert slot");
    slot
}

// ─── Fake transaction feed ───────────────────────────────────

#[allow(dead_code)]
#[derive(Default)]
struct FeedState {
    accounts: Mutex<HashMap<String, Vec<serde_json::Value>>>,
    failing: AtomicBool,
    hits: AtomicUsize,
}

/// Local stand-in for the Thien Nguyen transaction feed.
#[allow(dead_code)]
pub struct FakeFeed {
    pub base_url: String,
    state: Arc<FeedState>,
}

#[allow(dead_code)]
impl FakeFeed {
    /// Serve the feed on an ephemeral local port.
    pub async fn start() -> Self {
        let state = Arc::new(FeedState::default());
        let app = Router::new()
            .route(
                "/bank-account-transaction/{account}/transactionsV2",
                get(list_transactions),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake feed");
        let addr = listener.local_addr().expect("Fake feed has no address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Fake feed crashed");
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    /// Add a transfer into `account`.
    pub fn push(&self, account: &str, amount: u64, narrative: &str) {
        let mut accounts = self.state.accounts.lock().unwrap();
        let txs = accounts.entry(account.to_string()).or_default();
        let id = txs.len() + 1;
        txs.push(serde_json::json!({
            "id": id,
            "transactionTime": "2025-11-27T18:59:00",
            "transactionAmount": amount,
            "narrative": narrative,
        }));
    }

    /// Make every request fail with HTTP 503.
    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    /// Requests served so far, failed ones included.
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }
}

#[allow(dead_code)]
async fn list_transactions(
    State(state): State<Arc<FeedState>>,
    Path(account): Path<String>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if state.failing.load(Ordering::SeqCst) {
        return (StatusCode::SERVICE_UNAVAILABLE, "maintenance").into_response();
    }

    let transactions = state
        .accounts
        .lock()
        .unwrap()
        .get(&account)
        .cloned()
        .unwrap_or_default();

    Json(serde_json::json!({ "data": { "transactions": transactions } })).into_response()
}
