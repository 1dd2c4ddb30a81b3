// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard route.

use crate::error::Result;
use crate::models::{LeaderboardEntry, RankingMetric, TimePeriod, UserRole};
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/leaderboard", get(get_leaderboard))
}

/// `?role=MENTOR&period=month&metric=donation`
#[derive(Deserialize)]
struct LeaderboardQuery {
    role: UserRole,
    #[serde(default = "default_period")]
    period: TimePeriod,
    #[serde(default = "default_metric")]
    metric: RankingMetric,
}

fn default_period() -> TimePeriod {
    TimePeriod::Month
}
fn default_metric() -> RankingMetric {
    RankingMetric::Donation
}

async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>> {
    tracing::debug!(
        role = ?params.role,
        period = ?params.period,
        metric = ?params.metric,
        "Ranking leaderboard"
    );

    let entries = state
        .leaderboard
        .rank(params.role, params.period, params.metric, Utc::now())?;
    Ok(Json(entries))
}
