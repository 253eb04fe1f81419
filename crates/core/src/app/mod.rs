//! Application controller.
//!
//! [`AppController`] composes the search pipeline, the detail fetcher and
//! the watched list, owns the selection and decides what to render.
//! [`AppRuntime`] runs a controller as an actor: one task that interleaves
//! user commands with network completions and publishes an [`AppSnapshot`]
//! after every change.

mod controller;
mod runtime;

pub use controller::{AppController, Completion};
pub use runtime::{create_app, AppHandle, AppRuntime, AppSnapshot, WatchedView};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::SearchResult;
use crate::detail::{DetailError, DetailSnapshot};
use crate::summary::WatchlistSummary;
use crate::watched::WatchedEntry;

/// Which movie, if any, the user has selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Selection {
    #[default]
    None,
    Selected(String),
}

impl Selection {
    pub fn id(&self) -> Option<&str> {
        match self {
            Selection::None => None,
            Selection::Selected(id) => Some(id),
        }
    }

    pub fn is_selected(&self) -> bool {
        matches!(self, Selection::Selected(_))
    }

    /// Selecting the currently selected id deselects it.
    pub fn toggle(&self, id: &str) -> Selection {
        match self {
            Selection::Selected(current) if current == id => Selection::None,
            _ => Selection::Selected(id.to_string()),
        }
    }
}

/// Errors from controller operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error(transparent)]
    Detail(#[from] DetailError),

    #[error("Movie {0} is already in the watched list")]
    AlreadyWatched(String),

    #[error("Rate the movie before adding it to the watched list")]
    NotRated,

    #[error("Application runtime has stopped")]
    RuntimeStopped,
}

/// Keys the controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Key {
    Escape,
    Enter,
    #[serde(other)]
    Other,
}

/// What the front-end should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyOutcome {
    /// The detail view was closed.
    Closed,
    /// The query was cleared; move focus to the query input.
    FocusQuery,
    /// Nothing happened.
    Ignored,
}

/// Render decision for the whole page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub query: String,
    /// Number of results found for the current query.
    pub result_count: usize,
    pub results: ResultsPane,
    pub side: SidePane,
}

/// Left pane: search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultsPane {
    Loading,
    Error { message: String },
    Results { items: Vec<SearchResult> },
}

/// Right pane: the selected movie, or the watched list with its summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SidePane {
    Detail {
        detail: DetailSnapshot,
        /// Rating given when the movie was added, if it already is watched.
        watched_rating: Option<u8>,
    },
    Watched {
        summary: WatchlistSummary,
        entries: Vec<WatchedEntry>,
    },
}
