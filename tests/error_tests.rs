// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use hoctuthien::error::AppError;

async fn respond(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_error_status_codes() {
    let cases = [
        (AppError::ActivationRequired, StatusCode::FORBIDDEN),
        (AppError::DebtBlocked(2), StatusCode::CONFLICT),
        (AppError::SlotUnavailable, StatusCode::CONFLICT),
        (AppError::SlotInUse, StatusCode::CONFLICT),
        (AppError::InvalidRange("x".to_string()), StatusCode::BAD_REQUEST),
        (AppError::CannotCancelPaid, StatusCode::CONFLICT),
        (AppError::SessionStarted, StatusCode::CONFLICT),
        (AppError::AlreadyCancelled, StatusCode::CONFLICT),
        (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
        (AppError::Forbidden("x".to_string()), StatusCode::FORBIDDEN),
        (AppError::NotFound("x".to_string()), StatusCode::NOT_FOUND),
        (AppError::BadRequest("x".to_string()), StatusCode::BAD_REQUEST),
        (AppError::Database("x".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
    ];

    for (err, expected) in cases {
        let code = err.code();
        let (status, body) = respond(err).await;
        assert_eq!(status, expected, "{}", code);
        assert_eq!(body["error"], code);
    }
}

#[tokio::test]
async fn test_debt_blocked_reports_count() {
    let (_, body) = respond(AppError::DebtBlocked(3)).await;
    assert_eq!(body["error"], "debt_blocked");
    assert!(body["details"].as_str().unwrap().contains('3'));
}

#[tokio::test]
async fn test_internal_errors_hide_details() {
    let (status, body) = respond(AppError::Database("connection string leaked".to_string())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.get("details").is_none());

    let (status, body) = respond(AppError::from(anyhow::anyhow!("secret"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal_error");
    assert!(body.get("details").is_none());
}

#[derive(validator::Validate)]
struct Named {
    #[validate(length(min = 1))]
    name: String,
}

#[test]
fn test_validation_errors_are_bad_requests() {
    use validator::Validate;

    let errors = Named {
        name: String::new(),
    }
    .validate()
    .unwrap_err();

    let err = AppError::from(errors);
    assert!(matches!(err, AppError::BadRequest(_)));
    assert_eq!(err.code(), "bad_request");
}
