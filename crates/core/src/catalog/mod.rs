//! Remote movie catalog integration.
//!
//! The catalog is a third-party HTTP JSON service (OMDb). Everything that
//! fetches movie data goes through the [`Catalog`] trait so the search
//! pipeline and the detail fetcher can be driven by a mock in tests.

mod omdb;
mod types;

pub use omdb::{CatalogConfig, OmdbClient};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Message shown in place of the result list when a search fails.
pub const SEARCH_FAILED_MESSAGE: &str = "Failed fetching movies";

/// Errors that can occur when talking to the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Transport-level failure.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The catalog answered with a non-success status.
    #[error("Catalog returned HTTP {status}")]
    ApiError { status: u16 },

    /// The catalog explicitly reported that nothing matched.
    #[error("{0}")]
    NotFound(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Client not configured (missing API key, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),

    /// The request was superseded and abandoned before it settled.
    #[error("Request cancelled")]
    Cancelled,
}

impl CatalogError {
    /// Whether this error came from abandoning a superseded request.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CatalogError::Cancelled)
    }

    /// Whether the catalog reported an explicit "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound(_))
    }

    /// Transport failures, bad statuses and unusable responses.
    pub fn is_network_failure(&self) -> bool {
        !self.is_cancelled() && !self.is_not_found()
    }

    /// Text to surface in place of the search results.
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::NotFound(message) => message.clone(),
            _ => SEARCH_FAILED_MESSAGE.to_string(),
        }
    }

    /// Short label used for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            CatalogError::NotFound(_) => "not_found",
            CatalogError::Cancelled => "cancelled",
            _ => "failed",
        }
    }
}

/// Read access to a movie catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Search titles matching `query`.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, CatalogError>;

    /// Fetch the full record for a catalog id.
    async fn movie(&self, id: &str) -> Result<MovieDetail, CatalogError>;
}
