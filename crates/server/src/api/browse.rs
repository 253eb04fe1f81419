//! Browsing API handlers: search query, selection, rating and keys.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use popcorn_core::{AppSnapshot, Key, KeyOutcome, Selection};
use serde::Deserialize;

use super::{app_error, ApiError, CommandResponse};
use crate::state::AppState;

// ============================================================================
// Request types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    pub rating: u8,
}

#[derive(Debug, Deserialize)]
pub struct KeyRequest {
    pub key: Key,
    #[serde(default)]
    pub query_focused: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/state
///
/// Latest published snapshot.
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<AppSnapshot> {
    Json(state.app().snapshot())
}

/// PUT /api/v1/query
///
/// Change the search query. `result` tells whether it changed.
pub async fn set_query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<CommandResponse<bool>>, ApiError> {
    let app = state.app();
    let changed = app.set_query(request.query).await.map_err(app_error)?;
    Ok(Json(CommandResponse {
        result: changed,
        state: app.snapshot(),
    }))
}

/// POST /api/v1/select/{id}
///
/// Select a movie, or deselect it if it is already selected.
pub async fn select(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CommandResponse<Selection>>, ApiError> {
    let app = state.app();
    let selection = app.select(id).await.map_err(app_error)?;
    Ok(Json(CommandResponse {
        result: selection,
        state: app.snapshot(),
    }))
}

/// POST /api/v1/close
pub async fn close(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CommandResponse<bool>>, ApiError> {
    let app = state.app();
    let closed = app.close().await.map_err(app_error)?;
    Ok(Json(CommandResponse {
        result: closed,
        state: app.snapshot(),
    }))
}

/// PUT /api/v1/rating
///
/// Record the provisional rating. `result` is the revision count.
pub async fn set_rating(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RatingRequest>,
) -> Result<Json<CommandResponse<u32>>, ApiError> {
    let app = state.app();
    let revisions = app
        .set_user_rating(request.rating)
        .await
        .map_err(app_error)?;
    Ok(Json(CommandResponse {
        result: revisions,
        state: app.snapshot(),
    }))
}

/// POST /api/v1/keys
pub async fn key(
    State(state): State<Arc<AppState>>,
    Json(request): Json<KeyRequest>,
) -> Result<Json<CommandResponse<KeyOutcome>>, ApiError> {
    let app = state.app();
    let outcome = app
        .handle_key(request.key, request.query_focused)
        .await
        .map_err(app_error)?;
    Ok(Json(CommandResponse {
        result: outcome,
        state: app.snapshot(),
    }))
}
