//! Types returned by the remote movie catalog.

use serde::{Deserialize, Serialize};

/// A single hit from a catalog title search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    /// Catalog identifier (e.g. "tt0372784").
    pub id: String,
    /// Movie title.
    pub title: String,
    /// Release year as reported by the catalog ("2005", "2011–2019").
    pub year: String,
    /// Poster image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
}

/// Full record for a single movie.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetail {
    /// Catalog identifier.
    pub id: String,
    /// Movie title.
    pub title: String,
    /// Release year.
    pub year: String,
    /// Poster image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    /// Runtime in minutes, when the catalog knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_minutes: Option<u32>,
    /// Catalog rating (0-10), when the catalog knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_rating: Option<f32>,
    /// Plot synopsis.
    #[serde(default)]
    pub plot: String,
    /// Release date as reported by the catalog ("15 Jun 2005").
    #[serde(default)]
    pub release_date: String,
    /// Comma separated cast list.
    #[serde(default)]
    pub cast: String,
    /// Director(s).
    #[serde(default)]
    pub director: String,
    /// Comma separated genres.
    #[serde(default)]
    pub genre: String,
}

impl MovieDetail {
    /// Genre names split out of the comma separated list.
    pub fn genres(&self) -> Vec<&str> {
        self.genre
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .collect()
    }
}
