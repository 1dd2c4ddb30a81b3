// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Requester identification middleware.
//!
//! Identity is taken from the `X-User-Id` header without verification.
//! Handlers use it to decide who is acting (mentor or mentee), not to
//! authenticate anyone.

use crate::error::AppError;
use axum::{extract::Request, middleware::Next, response::Response};

/// Header carrying the acting user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// User on whose behalf a request acts.
#[derive(Debug, Clone)]
pub struct Requester {
    pub user_id: String,
}

/// Middleware that requires an `X-User-Id` header on mutating routes.
pub async fn require_requester(mut request: Request, next: Next) -> Result<Response, AppError> {
    let user_id = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(AppError::Unauthorized)?
        .to_string();

    request.extensions_mut().insert(Requester { user_id });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::{routing::post, Extension, Router};
    use tower::ServiceExt; // for oneshot

    fn app() -> Router {
        Router::new()
            .route(
                "/",
                post(|Extension(who): Extension<Requester>| async move { who.user_id }),
            )
            .layer(axum::middleware::from_fn(require_requester))
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_blank_header_is_unauthorized() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("X-User-Id", "   ")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_header_becomes_requester() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("X-User-Id", "u1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"u1");
    }
}
