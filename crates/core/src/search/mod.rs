//! Query-driven catalog search.
//!
//! The pipeline turns a mutable query string into a result list, a loading
//! flag and an error message. Each query change supersedes the previous
//! request; a superseded request is cancelled and its response is never
//! applied.

mod pipeline;

pub use pipeline::{SearchCompletion, SearchPipeline};

use serde::{Deserialize, Serialize};

use crate::catalog::SearchResult;

/// Observable state of the search pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    /// Query as last entered.
    pub query: String,
    /// Results of the most recent settled request for `query`.
    pub results: Vec<SearchResult>,
    /// Whether a request for `query` is outstanding.
    pub is_loading: bool,
    /// Message to show in place of the results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchState {
    /// Idle state for `query`: no results, not loading, no error.
    pub fn idle(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}
