// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Booking lifecycle and payment routes.

use crate::error::{AppError, Result};
use crate::middleware::Requester;
use crate::models::{Booking, PaymentInstructions};
use crate::services::WatchOutcome;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/bookings", get(list_bookings))
        .route("/api/bookings/{id}", get(get_booking))
        .route("/api/bookings/{id}/payment", get(get_payment_instructions))
}

pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/bookings", post(create_booking))
        .route("/api/bookings/{id}", axum::routing::delete(cancel_booking))
        .route("/api/bookings/{id}/complete", post(complete_booking))
        .route("/api/bookings/{id}/verify", post(verify_booking))
        .route("/api/bookings/{id}/watch", post(watch_booking))
}

// ─── Queries ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct BookingsQuery {
    user_id: String,
}

async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BookingsQuery>,
) -> Result<Json<Vec<Booking>>> {
    Ok(Json(state.bookings.list_for_user(&params.user_id)?))
}

async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> Result<Json<Booking>> {
    Ok(Json(state.bookings.get_booking(&booking_id)?))
}

async fn get_payment_instructions(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> Result<Json<PaymentInstructions>> {
    Ok(Json(state.reconciler.booking_instructions(&booking_id)?))
}

// ─── Lifecycle ───────────────────────────────────────────────

#[derive(Deserialize)]
struct CreateBookingRequest {
    mentor_id: String,
    slot_id: String,
}

/// Book a slot for the requesting mentee.
async fn create_booking(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>)> {
    let booking = state.bookings.create_booking(
        &request.mentor_id,
        &request.slot_id,
        &requester.user_id,
        Utc::now(),
    )?;
    Ok((StatusCode::CREATED, Json(booking)))
}

async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Path(booking_id): Path<String>,
) -> Result<Json<Booking>> {
    let booking = state
        .bookings
        .cancel_booking(&booking_id, &requester.user_id, Utc::now())?;
    Ok(Json(booking))
}

async fn complete_booking(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Path(booking_id): Path<String>,
) -> Result<Json<Booking>> {
    let booking = state
        .bookings
        .complete_booking(&booking_id, &requester.user_id, Utc::now())?;
    Ok(Json(booking))
}

// ─── Payment ─────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct VerifyResponse {
    pub paid: bool,
    pub booking: Booking,
}

/// Check the transaction feed for this booking's payment right now.
async fn verify_booking(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Path(booking_id): Path<String>,
) -> Result<Json<VerifyResponse>> {
    require_participant(&state, &booking_id, &requester)?;

    let (paid, booking) = state
        .reconciler
        .verify_booking(&booking_id, Utc::now())
        .await?;
    Ok(Json(VerifyResponse { paid, booking }))
}

#[derive(Serialize)]
pub struct WatchResponse {
    pub booking_id: String,
    pub status: WatchOutcome,
}

/// Keep checking for this booking's payment in the background.
async fn watch_booking(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Path(booking_id): Path<String>,
) -> Result<(StatusCode, Json<WatchResponse>)> {
    require_participant(&state, &booking_id, &requester)?;

    let rx = state.watcher.watch_booking(&booking_id)?;
    let status = *rx.borrow();
    Ok((StatusCode::ACCEPTED, Json(WatchResponse { booking_id, status })))
}

fn require_participant(state: &AppState, booking_id: &str, requester: &Requester) -> Result<()> {
    let booking = state.bookings.get_booking(booking_id)?;
    if !booking.involves(&requester.user_id) {
        return Err(AppError::Forbidden(
            "not a participant of this booking".to_string(),
        ));
    }
    Ok(())
}
