//! Watched list API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use popcorn_core::{WatchedEntry, WatchedView};

use super::{app_error, not_found, ApiError, CommandResponse};
use crate::state::AppState;

/// GET /api/v1/watched
///
/// Watched entries with aggregate statistics.
pub async fn list_watched(State(state): State<Arc<AppState>>) -> Json<WatchedView> {
    Json(state.app().snapshot().watched)
}

/// POST /api/v1/watched
///
/// Add the selected movie with its provisional rating.
pub async fn add_watched(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<CommandResponse<WatchedEntry>>), ApiError> {
    let app = state.app();
    let entry = app.watch_selected().await.map_err(app_error)?;
    Ok((
        StatusCode::CREATED,
        Json(CommandResponse {
            result: entry,
            state: app.snapshot(),
        }),
    ))
}

/// DELETE /api/v1/watched/{id}
pub async fn delete_watched(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CommandResponse<bool>>, ApiError> {
    let app = state.app();
    let removed = app.delete_watched(id.clone()).await.map_err(app_error)?;
    if !removed {
        return Err(not_found(format!("Movie {} is not in the watched list", id)));
    }
    Ok(Json(CommandResponse {
        result: true,
        state: app.snapshot(),
    }))
}
