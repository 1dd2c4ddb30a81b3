// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Availability slot routes.

use crate::error::Result;
use crate::middleware::Requester;
use crate::models::AvailabilitySlot;
use crate::services::slots::{WeeklyPattern, DEFAULT_HORIZON_WEEKS};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/slots", get(list_slots))
}

pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/slots", post(create_slot))
        .route("/api/slots/recurring", post(create_recurring_slots))
        .route("/api/slots/{id}", delete(delete_slot))
}

#[derive(Deserialize)]
struct SlotsQuery {
    mentor_id: String,
}

/// Every slot of a mentor, booked or free.
async fn list_slots(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SlotsQuery>,
) -> Result<Json<Vec<AvailabilitySlot>>> {
    Ok(Json(state.slots.list_slots(&params.mentor_id)?))
}

#[derive(Deserialize)]
struct CreateSlotRequest {
    start_time: DateTime<Utc>,
    duration_minutes: i64,
}

async fn create_slot(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Json(request): Json<CreateSlotRequest>,
) -> Result<(StatusCode, Json<AvailabilitySlot>)> {
    let slot = state.slots.create_slot(
        &requester.user_id,
        request.start_time,
        request.duration_minutes,
    )?;
    Ok((StatusCode::CREATED, Json(slot)))
}

/// `{"pattern": {"Mon": ["09:00:00"]}, "duration_minutes": 60}`
#[derive(Deserialize, Validate)]
struct RecurringSlotsRequest {
    /// Weekday -> local start times
    pattern: WeeklyPattern,
    duration_minutes: i64,
    #[validate(range(min = 1, max = 52))]
    horizon_weeks: Option<u32>,
}

async fn create_recurring_slots(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Json(request): Json<RecurringSlotsRequest>,
) -> Result<(StatusCode, Json<Vec<AvailabilitySlot>>)> {
    request.validate()?;

    let created = state.slots.create_recurring_slots(
        &requester.user_id,
        &request.pattern,
        request.duration_minutes,
        request.horizon_weeks.unwrap_or(DEFAULT_HORIZON_WEEKS),
        Utc::now(),
    )?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn delete_slot(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Path(slot_id): Path<String>,
) -> Result<StatusCode> {
    state.slots.delete_slot(&slot_id, &requester.user_id)?;
    Ok(StatusCode::NO_CONTENT)
}
