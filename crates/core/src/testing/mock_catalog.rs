//! Mock catalog for testing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{watch, RwLock};

use crate::catalog::{Catalog, CatalogError, MovieDetail, SearchResult};

/// How long the `wait_for_*` helpers wait before failing the test.
const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Holds a request open until released.
#[derive(Debug)]
pub struct Gate {
    tx: watch::Sender<bool>,
}

impl Gate {
    /// Let the held request (and any later one with the same key) finish.
    pub fn release(&self) {
        self.tx.send_replace(true);
    }
}

/// Records a request that was dropped before it finished.
struct DropTracker {
    label: String,
    finished: bool,
    log: Arc<Mutex<Vec<String>>>,
    cancelled: Arc<watch::Sender<usize>>,
}

impl DropTracker {
    fn finish(mut self) {
        self.finished = true;
    }
}

impl Drop for DropTracker {
    fn drop(&mut self) {
        if !self.finished {
            self.log.lock().unwrap().push(self.label.clone());
            self.cancelled.send_modify(|count| *count += 1);
        }
    }
}

/// Mock implementation of the [`Catalog`] trait.
///
/// Provides controllable behavior for testing:
/// - Serve a configurable set of movies (search is a case-insensitive
///   substring match on the title)
/// - Record queries and detail lookups for assertions
/// - Inject a failure for the next request
/// - Hold individual requests open with a [`Gate`] and observe whether they
///   were cancelled before finishing
///
/// # Example
///
/// ```rust,ignore
/// let catalog = Arc::new(MockCatalog::new());
/// catalog.add_movie(fixtures::movie_detail("tt0372784", "Batman Begins", "2005")).await;
///
/// let gate = catalog.hold_search("bat").await;
/// pipeline.set_query("bat");
/// catalog.wait_for_started(1).await;
///
/// pipeline.set_query("batman");
/// catalog.wait_for_cancelled(1).await;
/// assert_eq!(catalog.cancelled_queries(), vec!["bat"]);
/// ```
pub struct MockCatalog {
    movies: RwLock<Vec<MovieDetail>>,
    queries: RwLock<Vec<String>>,
    movie_requests: RwLock<Vec<String>>,
    next_error: RwLock<Option<CatalogError>>,
    held: RwLock<HashMap<String, watch::Receiver<bool>>>,
    started: watch::Sender<usize>,
    cancelled: Arc<watch::Sender<usize>>,
    cancelled_queries: Arc<Mutex<Vec<String>>>,
    cancelled_movies: Arc<Mutex<Vec<String>>>,
}

impl std::fmt::Debug for MockCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockCatalog")
            .field("movies", &"<movies>")
            .field("queries", &"<queries>")
            .field("held", &"<gates>")
            .finish()
    }
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCatalog {
    /// Create an empty mock catalog.
    pub fn new() -> Self {
        Self {
            movies: RwLock::new(Vec::new()),
            queries: RwLock::new(Vec::new()),
            movie_requests: RwLock::new(Vec::new()),
            next_error: RwLock::new(None),
            held: RwLock::new(HashMap::new()),
            started: watch::Sender::new(0),
            cancelled: Arc::new(watch::Sender::new(0)),
            cancelled_queries: Arc::new(Mutex::new(Vec::new())),
            cancelled_movies: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a movie to the catalog.
    pub async fn add_movie(&self, movie: MovieDetail) {
        self.movies.write().await.push(movie);
    }

    /// Make the next request (search or detail) fail with `error`.
    pub async fn set_next_error(&self, error: CatalogError) {
        *self.next_error.write().await = Some(error);
    }

    /// Hold searches for exactly `query` open until the gate is released.
    pub async fn hold_search(&self, query: &str) -> Gate {
        self.hold(search_key(query)).await
    }

    /// Hold detail lookups for `id` open until the gate is released.
    pub async fn hold_movie(&self, id: &str) -> Gate {
        self.hold(movie_key(id)).await
    }

    async fn hold(&self, key: String) -> Gate {
        let (tx, rx) = watch::channel(false);
        self.held.write().await.insert(key, rx);
        Gate { tx }
    }

    /// Queries searched so far, in order.
    pub async fn recorded_queries(&self) -> Vec<String> {
        self.queries.read().await.clone()
    }

    /// Number of searches issued so far.
    pub async fn query_count(&self) -> usize {
        self.queries.read().await.len()
    }

    /// Ids looked up so far, in order.
    pub async fn recorded_movie_requests(&self) -> Vec<String> {
        self.movie_requests.read().await.clone()
    }

    /// Searches dropped before they finished.
    pub fn cancelled_queries(&self) -> Vec<String> {
        self.cancelled_queries.lock().unwrap().clone()
    }

    /// Detail lookups dropped before they finished.
    pub fn cancelled_movies(&self) -> Vec<String> {
        self.cancelled_movies.lock().unwrap().clone()
    }

    /// Wait until at least `count` requests have started.
    pub async fn wait_for_started(&self, count: usize) {
        let mut rx = self.started.subscribe();
        wait_for_count(&mut rx, count, "started").await;
    }

    /// Wait until at least `count` requests have been cancelled.
    pub async fn wait_for_cancelled(&self, count: usize) {
        let mut rx = self.cancelled.subscribe();
        wait_for_count(&mut rx, count, "cancelled").await;
    }

    fn track(&self, label: &str, log: &Arc<Mutex<Vec<String>>>) -> DropTracker {
        self.started.send_modify(|count| *count += 1);
        DropTracker {
            label: label.to_string(),
            finished: false,
            log: Arc::clone(log),
            cancelled: Arc::clone(&self.cancelled),
        }
    }

    async fn pass_gate(&self, key: &str) {
        let gate = self.held.read().await.get(key).cloned();
        if let Some(mut rx) = gate {
            // A dropped gate counts as released.
            let _ = rx.wait_for(|released| *released).await;
        }
    }
}

async fn wait_for_count(rx: &mut watch::Receiver<usize>, count: usize, what: &str) {
    let reached = tokio::time::timeout(WAIT_TIMEOUT, rx.wait_for(|n| *n >= count)).await;
    if !matches!(reached, Ok(Ok(_))) {
        panic!("timed out waiting for {} {} requests", count, what);
    }
}

fn search_key(query: &str) -> String {
    format!("search:{}", query)
}

fn movie_key(id: &str) -> String {
    format!("movie:{}", id)
}

#[async_trait]
impl Catalog for MockCatalog {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, CatalogError> {
        self.queries.write().await.push(query.to_string());
        let tracker = self.track(query, &self.cancelled_queries);

        self.pass_gate(&search_key(query)).await;

        let injected = self.next_error.write().await.take();
        let outcome = match injected {
            Some(error) => Err(error),
            None => {
                let needle = query.to_lowercase();
                let results: Vec<SearchResult> = self
                    .movies
                    .read()
                    .await
                    .iter()
                    .filter(|movie| movie.title.to_lowercase().contains(&needle))
                    .map(|movie| SearchResult {
                        id: movie.id.clone(),
                        title: movie.title.clone(),
                        year: movie.year.clone(),
                        poster_url: movie.poster_url.clone(),
                    })
                    .collect();

                if results.is_empty() {
                    Err(CatalogError::NotFound("Movie not found!".to_string()))
                } else {
                    Ok(results)
                }
            }
        };

        tracker.finish();
        outcome
    }

    async fn movie(&self, id: &str) -> Result<MovieDetail, CatalogError> {
        self.movie_requests.write().await.push(id.to_string());
        let tracker = self.track(id, &self.cancelled_movies);

        self.pass_gate(&movie_key(id)).await;

        let injected = self.next_error.write().await.take();
        let outcome = match injected {
            Some(error) => Err(error),
            None => self
                .movies
                .read()
                .await
                .iter()
                .find(|movie| movie.id == id)
                .cloned()
                .ok_or_else(|| CatalogError::NotFound("Incorrect IMDb ID.".to_string())),
        };

        tracker.finish();
        outcome
    }
}
