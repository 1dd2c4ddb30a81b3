// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
///
/// Every variant is per-call and recoverable: mutating operations that
/// return one of these leave the ledger unchanged.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Account activation required")]
    ActivationRequired,

    #[error("Outstanding unpaid finished bookings: {0}")]
    DebtBlocked(usize),

    #[error("Slot is not available for booking")]
    SlotUnavailable,

    #[error("Slot is booked and cannot be deleted")]
    SlotInUse,

    #[error("Invalid time range: {0}")]
    InvalidRange(String),

    #[error("Paid bookings cannot be cancelled")]
    CannotCancelPaid,

    #[error("Session has already started")]
    SessionStarted,

    #[error("Booking is cancelled")]
    AlreadyCancelled,

    #[error("Identity header required")]
    Unauthorized,

    #[error("Not allowed: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable code, also used as the `error` field in responses.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ActivationRequired => "activation_required",
            AppError::DebtBlocked(_) => "debt_blocked",
            AppError::SlotUnavailable => "slot_unavailable",
            AppError::SlotInUse => "slot_in_use",
            AppError::InvalidRange(_) => "invalid_range",
            AppError::CannotCancelPaid => "cannot_cancel_paid",
            AppError::SessionStarted => "session_started",
            AppError::AlreadyCancelled => "already_cancelled",
            AppError::Unauthorized => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::BadRequest(_) => "bad_request",
            AppError::Database(_) => "database_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::ActivationRequired | AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::DebtBlocked(_)
            | AppError::SlotUnavailable
            | AppError::SlotInUse
            | AppError::CannotCancelPaid
            | AppError::SessionStarted
            | AppError::AlreadyCancelled => StatusCode::CONFLICT,
            AppError::InvalidRange(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let details = match &self {
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                None
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                None
            }
            AppError::Unauthorized => None,
            other => Some(other.to_string()),
        };

        let body = ErrorResponse {
            error: self.code().to_string(),
            details,
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::BadRequest(errors.to_string())
    }
}

/// Result type alias for handlers and services
pub type Result<T> = std::result::Result<T, AppError>;
