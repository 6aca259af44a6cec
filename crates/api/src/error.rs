use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bookings_core::error::CoreError;
use bookings_db::RepoError;
use serde_json::json;

use crate::render::RenderError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`RepoError`] for storage
/// errors, and adds HTTP-specific variants. Implements [`IntoResponse`] to
/// produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `bookings_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A storage error from `bookings_db`.
    #[error(transparent)]
    Storage(#[from] RepoError),

    /// The session store could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// A page could not be rendered.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::SessionMissing => (
                    StatusCode::BAD_REQUEST,
                    "SESSION_MISSING",
                    core.to_string(),
                ),
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            },

            // --- Storage errors ---
            AppError::Storage(err) => classify_repo_error(err),

            AppError::Session(err) => {
                tracing::error!(error = %err, "Session store error");
                internal()
            }

            AppError::Render(err) => {
                tracing::error!(error = %err, "Render error");
                internal()
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a storage error into an HTTP status, error code, and message.
///
/// - `NotFound` maps to 404.
/// - Constraint violations and overlap conflicts map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_repo_error(err: &RepoError) -> (StatusCode, &'static str, String) {
    match err {
        RepoError::NotFound { entity, .. } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} not found"),
        ),
        RepoError::Constraint(constraint) => (
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("Request violates constraint: {constraint}"),
        ),
        RepoError::Unavailable => (StatusCode::CONFLICT, "CONFLICT", err.to_string()),
        other => {
            tracing::error!(error = %other, "Storage error");
            internal()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn repo_not_found_is_404() {
        let response = AppError::from(RepoError::not_found("Reservation", 7)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn timeout_is_sanitized_500() {
        let response =
            AppError::from(RepoError::Timeout(Duration::from_secs(3))).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unavailable_is_conflict() {
        let response = AppError::from(RepoError::Unavailable).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn validation_is_400() {
        let response =
            AppError::from(CoreError::Validation("bad".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
