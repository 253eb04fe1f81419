//! OMDb (Open Movie Database) API client.
//!
//! OMDb requires an API key for access. Search and detail lookups share one
//! endpoint and are told apart by the `s` / `i` query parameters.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{MovieDetail, SearchResult};
use super::{Catalog, CatalogError};

/// Placeholder OMDb uses for missing fields.
const NOT_AVAILABLE: &str = "N/A";

fn default_base_url() -> String {
    "https://www.omdbapi.com/".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// OMDb API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// OMDb API key (required).
    pub api_key: String,
    /// Endpoint URL (default: https://www.omdbapi.com/).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl CatalogConfig {
    /// Config with the given key and default endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// OMDb API client.
pub struct OmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    /// Create a new OMDb client.
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        if config.api_key.trim().is_empty() {
            return Err(CatalogError::NotConfigured(
                "OMDb API key is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url,
            api_key: config.api_key,
        })
    }

    async fn get(&self, param: &str, value: &str) -> Result<Response, CatalogError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("apikey", self.api_key.as_str()), (param, value)])
            .send()
            .await?;

        let status = response.status();
        if status == 401 {
            return Err(CatalogError::NotConfigured(
                "Invalid OMDb API key".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(CatalogError::ApiError {
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    /// Search for movies by title.
    pub async fn search_titles(&self, query: &str) -> Result<Vec<SearchResult>, CatalogError> {
        debug!("OMDb search: query='{}'", query);

        let response = self.get("s", query).await?;
        let body: OmdbSearchResponse = response.json().await.map_err(|e| {
            CatalogError::ParseError(format!("Failed to parse search response: {}", e))
        })?;

        body.into_results()
    }

    /// Get a specific movie by catalog id.
    pub async fn get_movie(&self, id: &str) -> Result<MovieDetail, CatalogError> {
        debug!("OMDb get movie: id={}", id);

        let response = self.get("i", id).await?;
        let body: OmdbMovieDetails = response.json().await.map_err(|e| {
            CatalogError::ParseError(format!("Failed to parse movie response: {}", e))
        })?;

        body.into_detail(id)
    }
}

#[async_trait]
impl Catalog for OmdbClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, CatalogError> {
        self.search_titles(query).await
    }

    async fn movie(&self, id: &str) -> Result<MovieDetail, CatalogError> {
        self.get_movie(id).await
    }
}

// ============================================================================
// OMDb API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct OmdbSearchResponse {
    #[serde(rename = "Search", default)]
    search: Vec<OmdbSearchItem>,
    #[serde(rename = "Response", default)]
    response: Option<String>,
    #[serde(rename = "Error", default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbSearchItem {
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Poster", default)]
    poster: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbMovieDetails {
    #[serde(rename = "imdbID", default)]
    imdb_id: Option<String>,
    #[serde(rename = "Title", default)]
    title: Option<String>,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Poster", default)]
    poster: Option<String>,
    #[serde(rename = "Runtime", default)]
    runtime: Option<String>,
    #[serde(rename = "imdbRating", default)]
    imdb_rating: Option<String>,
    #[serde(rename = "Plot", default)]
    plot: String,
    #[serde(rename = "Released", default)]
    released: String,
    #[serde(rename = "Actors", default)]
    actors: String,
    #[serde(rename = "Director", default)]
    director: String,
    #[serde(rename = "Genre", default)]
    genre: String,
    #[serde(rename = "Response", default)]
    response: Option<String>,
    #[serde(rename = "Error", default)]
    error: Option<String>,
}

/// `Response: "False"` is how OMDb reports a miss, with a 200 status.
fn reported_failure(response: &Option<String>, error: &Option<String>) -> Option<CatalogError> {
    match response.as_deref() {
        Some(r) if r.eq_ignore_ascii_case("false") => Some(CatalogError::NotFound(
            error.clone().unwrap_or_else(|| "Movie not found".to_string()),
        )),
        _ => None,
    }
}

fn available(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && v != NOT_AVAILABLE)
}

/// "148 min" -> 148
fn parse_runtime(runtime: &str) -> Option<u32> {
    runtime.split_whitespace().next()?.parse().ok()
}

fn parse_rating(rating: &str) -> Option<f32> {
    rating.trim().parse::<f32>().ok().filter(|r| r.is_finite())
}

impl OmdbSearchResponse {
    fn into_results(self) -> Result<Vec<SearchResult>, CatalogError> {
        if let Some(err) = reported_failure(&self.response, &self.error) {
            return Err(err);
        }

        Ok(self.search.into_iter().map(SearchResult::from).collect())
    }
}

impl OmdbMovieDetails {
    fn into_detail(self, requested_id: &str) -> Result<MovieDetail, CatalogError> {
        if let Some(err) = reported_failure(&self.response, &self.error) {
            return Err(err);
        }

        let title = self
            .title
            .ok_or_else(|| CatalogError::ParseError("Movie response has no Title".to_string()))?;

        Ok(MovieDetail {
            id: self.imdb_id.unwrap_or_else(|| requested_id.to_string()),
            title,
            year: self.year,
            poster_url: available(self.poster),
            runtime_minutes: self.runtime.as_deref().and_then(parse_runtime),
            catalog_rating: self.imdb_rating.as_deref().and_then(parse_rating),
            plot: self.plot,
            release_date: self.released,
            cast: self.actors,
            director: self.director,
            genre: self.genre,
        })
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<OmdbSearchItem> for SearchResult {
    fn from(item: OmdbSearchItem) -> Self {
        Self {
            id: item.imdb_id,
            title: item.title,
            year: item.year,
            poster_url: available(item.poster),
        }
    }
}
