use api_client::error::ApiError;
use auth::AuthError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use core_types::CoreError;
use database::DbError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] CoreError),
    #[error("Database error: {0}")]
    Database(#[from] DbError),
    #[error("Sign-up failed: {0}")]
    SignUp(ApiError),
    #[error("Sign-in failed: {0}")]
    SignIn(ApiError),
    #[error("Token error: {0}")]
    Token(AuthError),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Identity responses we could not make sense of are our problem, not the caller's.
fn identity_error(err: ApiError, status: StatusCode, message: String) -> (StatusCode, String) {
    match err {
        ApiError::InvalidData(detail) | ApiError::Deserialization(detail) => {
            tracing::error!(error = %detail, "Unreadable identity response.");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Invalid auth response".to_string(),
            )
        }
        _ => (status, message),
    }
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Validation failed", "details": err.field_errors() }),
            ),
            AppError::Database(DbError::NotFound) => (
                StatusCode::NOT_FOUND,
                json!({ "error": "Workout not found" }),
            ),
            AppError::Database(DbError::PartialWrite {
                session_id,
                committed,
                source,
            }) => {
                tracing::error!(%session_id, ?committed, error = %source, "Workout create stopped partway.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": format!("Failed to create workout: {}", source.message()),
                        "id": session_id,
                        "committed": committed,
                    }),
                )
            }
            AppError::Database(DbError::Store(err)) => {
                tracing::error!(error = ?err, "Store error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": err.message() }),
                )
            }
            AppError::Database(DbError::JsonError(err)) => {
                tracing::error!(error = ?err, "Stored row could not be decoded.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Failed to parse workouts" }),
                )
            }
            AppError::SignUp(err) => {
                tracing::warn!(error = %err, "Sign-up rejected.");
                let message = format!("Failed to create account: {}", err.message());
                let (status, message) = identity_error(err, StatusCode::BAD_REQUEST, message);
                (status, json!({ "error": message }))
            }
            AppError::SignIn(err) => {
                tracing::warn!(error = %err, "Sign-in rejected.");
                let (status, message) = identity_error(
                    err,
                    StatusCode::UNAUTHORIZED,
                    "Invalid email or password".to_string(),
                );
                (status, json!({ "error": message }))
            }
            AppError::Token(err) => {
                tracing::error!(error = ?err, "Token error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Failed to generate token" }),
                )
            }
            AppError::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, json!({ "error": message }))
            }
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
        };

        (status, Json(body)).into_response()
    }
}
