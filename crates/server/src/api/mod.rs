pub mod browse;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod watched;

pub use routes::create_router;

use axum::{http::StatusCode, Json};
use popcorn_core::{AppError, AppSnapshot, DetailError};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Result of a command plus the state it left behind.
#[derive(Debug, Serialize)]
pub struct CommandResponse<T> {
    pub result: T,
    pub state: AppSnapshot,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a controller error onto an HTTP status.
pub fn app_error(err: AppError) -> ApiError {
    let status = match &err {
        AppError::Detail(DetailError::InvalidRating(_)) => StatusCode::BAD_REQUEST,
        AppError::Detail(_) | AppError::AlreadyWatched(_) | AppError::NotRated => {
            StatusCode::CONFLICT
        }
        AppError::RuntimeStopped => StatusCode::SERVICE_UNAVAILABLE,
    };

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

pub fn not_found(message: impl Into<String>) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}
