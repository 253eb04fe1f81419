//! Per-selection movie detail fetching.
//!
//! Selecting a movie opens a detail session: `Idle -> Loading -> Ready |
//! Failed`. Each session owns its outstanding fetch, its title override and
//! the provisional user rating; closing or replacing the session tears all
//! of that down.

mod fetcher;

pub use fetcher::{DetailCompletion, DetailFetcher};

use serde::Serialize;
use thiserror::Error;

use crate::catalog::MovieDetail;

/// Lowest rating a user can give.
pub const MIN_USER_RATING: u8 = 1;
/// Highest rating a user can give.
pub const MAX_USER_RATING: u8 = 10;

/// Lifecycle of a detail session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum DetailPhase {
    /// Nothing selected.
    Idle,
    /// Fetch outstanding.
    Loading,
    /// Detail available.
    Ready(MovieDetail),
    /// Fetch failed; carries the error text.
    Failed(String),
}

impl DetailPhase {
    pub fn is_loading(&self) -> bool {
        matches!(self, DetailPhase::Loading)
    }

    pub fn detail(&self) -> Option<&MovieDetail> {
        match self {
            DetailPhase::Ready(detail) => Some(detail),
            _ => None,
        }
    }
}

/// Read-only view of the active session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailSnapshot {
    pub id: String,
    pub phase: DetailPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_rating: Option<u8>,
    pub rating_revisions: u32,
}

/// Errors from detail session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetailError {
    #[error("No movie is selected")]
    NoSelection,

    #[error("Movie details are not loaded yet")]
    NotReady,

    #[error("Rating must be between 1 and 10, got {0}")]
    InvalidRating(u8),
}
