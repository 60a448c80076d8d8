// SPDX-License-Identifier: MIT

//! Application error types with consistent API responses.
//!
//! Every failure surfaces to the client as the uniform envelope
//! `{ "success": false, "error": "<message>" }` with a matching HTTP status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// OpenWeather rejected the API key (upstream 401).
    #[error("invalid credentials")]
    UpstreamAuth,

    /// OpenWeather does not know the requested city (upstream 404).
    #[error("city not found")]
    UpstreamNotFound,

    /// OpenWeather rate limit hit (upstream 429).
    #[error("rate limit exceeded, try again later")]
    UpstreamRateLimited,

    /// Any other upstream failure; the status and message pass through.
    #[error("upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::UpstreamAuth => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::UpstreamNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::UpstreamRateLimited => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            AppError::Upstream { status, message } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                message.clone(),
            ),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };

        let body = ErrorResponse {
            success: false,
            error,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
