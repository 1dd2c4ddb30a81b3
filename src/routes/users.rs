// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User, mentor and activation routes.

use crate::error::{AppError, Result};
use crate::middleware::Requester;
use crate::models::{AvailabilitySlot, Booking, PaymentInstructions, User, UserStats};
use crate::services::users::NewUser;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Routes readable without an `X-User-Id` header.
///
/// Registration is here too: it is how a client obtains an id.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users", post(register_user))
        .route("/api/users/{id}", get(get_profile))
        .route("/api/users/{id}/debt", get(get_debt))
        .route("/api/users/{id}/activation", get(get_activation))
        .route("/api/mentors", get(list_mentors))
        .route("/api/mentors/{id}/slots", get(list_bookable_slots))
}

/// Routes acting on behalf of the requester.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/users/{id}/activation/verify", post(verify_activation))
}

// ─── Registration & Profile ──────────────────────────────────

async fn register_user(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewUser>,
) -> Result<(StatusCode, Json<User>)> {
    let user = state.users.register(request, Utc::now())?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// User profile with derived totals.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProfileResponse {
    pub user: User,
    pub stats: UserStats,
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileResponse>> {
    let (user, stats) = state.users.profile(&user_id)?;
    Ok(Json(ProfileResponse { user, stats }))
}

/// Finished sessions a mentee still owes.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DebtResponse {
    pub count: u32,
    pub bookings: Vec<Booking>,
}

async fn get_debt(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<DebtResponse>> {
    // Unknown users owe nothing, but say so with a 404.
    state.users.get_user(&user_id)?;
    let bookings = state.users.debt(&user_id, Utc::now())?;

    Ok(Json(DebtResponse {
        count: u32::try_from(bookings.len()).unwrap_or(u32::MAX),
        bookings,
    }))
}

// ─── Activation ──────────────────────────────────────────────

async fn get_activation(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<PaymentInstructions>> {
    Ok(Json(state.reconciler.activation_instructions(&user_id)?))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivationResponse {
    pub activated: bool,
    pub user: User,
}

async fn verify_activation(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Path(user_id): Path<String>,
) -> Result<Json<ActivationResponse>> {
    if requester.user_id != user_id {
        return Err(AppError::Forbidden(
            "users can only activate their own account".to_string(),
        ));
    }

    let user = state
        .reconciler
        .verify_activation(&user_id, Utc::now())
        .await?;

    Ok(Json(ActivationResponse {
        activated: user.is_activated,
        user,
    }))
}

// ─── Mentors ─────────────────────────────────────────────────

async fn list_mentors(State(state): State<Arc<AppState>>) -> Result<Json<Vec<User>>> {
    Ok(Json(state.users.list_mentors()?))
}

async fn list_bookable_slots(
    State(state): State<Arc<AppState>>,
    Path(mentor_id): Path<String>,
) -> Result<Json<Vec<AvailabilitySlot>>> {
    Ok(Json(
        state.slots.list_bookable_slots(&mentor_id, Utc::now())?,
    ))
}
