//! Testing utilities and mock implementations.
//!
//! Test doubles for every external collaborator, so the search pipeline,
//! detail fetcher and controller can be exercised without a network, a
//! browser or a database.
//!
//! # Example
//!
//! ```rust,ignore
//! use popcorn_core::testing::{fixtures, MockCatalog, RecordingTitle};
//!
//! let catalog = MockCatalog::new();
//! catalog.add_movie(fixtures::movie_detail("tt1375666", "Inception", "2010")).await;
//!
//! // Hold a request open to observe loading states and cancellation.
//! let gate = catalog.hold_search("incep").await;
//! // ...
//! gate.release();
//! ```

mod mock_catalog;
mod recording_title;
mod unavailable_store;

pub use mock_catalog::{Gate, MockCatalog};
pub use recording_title::RecordingTitle;
pub use unavailable_store::UnavailableStore;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::catalog::{MovieDetail, SearchResult};
    use crate::watched::WatchedEntry;

    /// Create a search hit.
    pub fn search_result(id: &str, title: &str, year: &str) -> SearchResult {
        SearchResult {
            id: id.to_string(),
            title: title.to_string(),
            year: year.to_string(),
            poster_url: Some(format!("https://img.example/{}.jpg", id)),
        }
    }

    /// Create a full movie record with reasonable defaults.
    pub fn movie_detail(id: &str, title: &str, year: &str) -> MovieDetail {
        MovieDetail {
            id: id.to_string(),
            title: title.to_string(),
            year: year.to_string(),
            poster_url: Some(format!("https://img.example/{}.jpg", id)),
            runtime_minutes: Some(120),
            catalog_rating: Some(7.5),
            plot: format!("A movie about {}.", title.to_lowercase()),
            release_date: format!("01 Jan {}", year),
            cast: "Jane Doe, John Roe".to_string(),
            director: "Some Director".to_string(),
            genre: "Drama, Thriller".to_string(),
        }
    }

    /// Create a watched entry rated `user_rating`.
    pub fn watched_entry(id: &str, user_rating: u8) -> WatchedEntry {
        WatchedEntry {
            id: id.to_string(),
            title: format!("Movie {}", id),
            year: "2000".to_string(),
            poster_url: None,
            catalog_rating: 7.5,
            runtime_minutes: 120,
            user_rating,
            rating_revision_count: 1,
        }
    }
}
