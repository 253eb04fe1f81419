//! Search pipeline implementation.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::SearchState;
use crate::catalog::{Catalog, CatalogError, SearchResult};
use crate::config::SearchConfig;
use crate::fetch::{spawn_cancellable, InFlight};
use crate::metrics::{SEARCH_REQUESTS, SEARCH_RESULTS, STALE_RESPONSES};

const COMPONENT: &str = "search";

/// Outcome of one search request, tagged with the generation it was issued for.
#[derive(Debug)]
pub struct SearchCompletion {
    /// Generation of the query that issued the request.
    pub generation: u64,
    /// Query the request was issued for.
    pub query: String,
    /// Catalog outcome.
    pub outcome: Result<Vec<SearchResult>, CatalogError>,
}

/// Query-driven search with stale-request cancellation.
///
/// Every query change bumps a generation counter. Requests are spawned on the
/// Tokio runtime and report back through a channel; [`SearchPipeline::apply`]
/// only accepts completions for the current generation. The outstanding
/// request is cancelled when it is superseded and when the pipeline is
/// dropped.
pub struct SearchPipeline {
    catalog: Arc<dyn Catalog>,
    min_query_len: usize,
    state: SearchState,
    generation: u64,
    in_flight: Option<InFlight>,
    completions_tx: mpsc::UnboundedSender<SearchCompletion>,
    completions_rx: mpsc::UnboundedReceiver<SearchCompletion>,
}

impl SearchPipeline {
    /// Create an idle pipeline with an empty query.
    pub fn new(catalog: Arc<dyn Catalog>, config: &SearchConfig) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        Self {
            catalog,
            min_query_len: config.min_query_len,
            state: SearchState::default(),
            generation: 0,
            in_flight: None,
            completions_tx,
            completions_rx,
        }
    }

    /// Current state.
    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Whether a request for the current query is outstanding.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether `query` is long enough to be sent to the catalog.
    pub fn is_searchable(&self, query: &str) -> bool {
        query.trim().chars().count() >= self.min_query_len
    }

    /// React to a query change.
    ///
    /// Returns `false` when `query` equals the current query. Otherwise the
    /// outstanding request (if any) is cancelled, and either the state is
    /// reset (query too short) or exactly one new request is issued.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn set_query(&mut self, query: impl Into<String>) -> bool {
        let query = query.into();
        if query == self.state.query {
            return false;
        }

        // Dropping the guard cancels the superseded request.
        self.in_flight = None;
        self.generation += 1;

        if !self.is_searchable(&query) {
            self.state = SearchState::idle(query);
            return true;
        }

        self.state.query = query.clone();
        self.state.is_loading = true;
        self.state.error = None;
        self.issue(query);
        true
    }

    fn issue(&mut self, query: String) {
        let generation = self.generation;
        let catalog = Arc::clone(&self.catalog);
        let tx = self.completions_tx.clone();
        let term = query.trim().to_string();

        debug!(generation, "Issuing search for '{}'", term);
        SEARCH_REQUESTS.inc();

        let in_flight = spawn_cancellable(
            COMPONENT,
            async move { catalog.search(&term).await },
            move |outcome| {
                // The receiver only goes away together with the pipeline.
                let _ = tx.send(SearchCompletion {
                    generation,
                    query,
                    outcome,
                });
            },
        );
        self.in_flight = Some(in_flight);
    }

    /// Wait for the next request to report back.
    ///
    /// Cancel-safe; pends forever while nothing is outstanding.
    pub async fn next_completion(&mut self) -> SearchCompletion {
        match self.completions_rx.recv().await {
            Some(completion) => completion,
            // The pipeline holds a sender, so the channel never closes.
            None => std::future::pending().await,
        }
    }

    /// Apply a completion. Returns whether the state changed.
    pub fn apply(&mut self, completion: SearchCompletion) -> bool {
        if completion.generation != self.generation {
            debug!(
                generation = completion.generation,
                current = self.generation,
                "Discarding stale search response for '{}'",
                completion.query
            );
            if !matches!(completion.outcome, Err(CatalogError::Cancelled)) {
                STALE_RESPONSES.with_label_values(&[COMPONENT]).inc();
            }
            return false;
        }

        match completion.outcome {
            Err(CatalogError::Cancelled) => {
                debug!("Search for '{}' was cancelled", completion.query);
                false
            }
            Ok(results) => {
                SEARCH_RESULTS.with_label_values(&["ok"]).inc();
                self.in_flight = None;
                self.state.results = results;
                self.state.error = None;
                self.state.is_loading = false;
                true
            }
            Err(err) => {
                warn!("Search for '{}' failed: {}", completion.query, err);
                SEARCH_RESULTS.with_label_values(&[err.label()]).inc();
                self.in_flight = None;
                self.state.results.clear();
                self.state.error = Some(err.user_message());
                self.state.is_loading = false;
                true
            }
        }
    }

    /// Wait for the next completion and apply it.
    pub async fn settle(&mut self) -> bool {
        let completion = self.next_completion().await;
        self.apply(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SEARCH_FAILED_MESSAGE;
    use crate::testing::{fixtures, MockCatalog};

    async fn catalog_with_batman() -> Arc<MockCatalog> {
        let catalog = Arc::new(MockCatalog::new());
        catalog
            .add_movie(fixtures::movie_detail("tt0372784", "Batman Begins", "2005"))
            .await;
        catalog
            .add_movie(fixtures::movie_detail("tt0096895", "Batman", "1989"))
            .await;
        catalog
            .add_movie(fixtures::movie_detail("tt1375666", "Inception", "2010"))
            .await;
        catalog
    }

    fn pipeline(catalog: &Arc<MockCatalog>) -> SearchPipeline {
        SearchPipeline::new(catalog.clone(), &SearchConfig::default())
    }

    /// Settle until the pipeline applies a completion for the current query.
    async fn settle_current(pipeline: &mut SearchPipeline) {
        while pipeline.state().is_loading {
            pipeline.settle().await;
        }
    }

    #[tokio::test]
    async fn test_short_queries_issue_no_request() {
        let catalog = catalog_with_batman().await;
        let mut pipeline = pipeline(&catalog);

        for query in ["b", "ba", "  ba  "] {
            pipeline.set_query(query);
            assert_eq!(pipeline.state(), &SearchState::idle(query));
            assert!(!pipeline.is_in_flight());
        }

        tokio::task::yield_now().await;
        assert_eq!(catalog.query_count().await, 0);
    }

    #[tokio::test]
    async fn test_catalog_receives_trimmed_term() {
        let catalog = catalog_with_batman().await;
        let mut pipeline = pipeline(&catalog);

        pipeline.set_query("  batman ");
        settle_current(&mut pipeline).await;

        assert_eq!(pipeline.state().query, "  batman ");
        assert_eq!(pipeline.state().results.len(), 2);
        assert_eq!(catalog.recorded_queries().await, vec!["batman"]);
    }

    #[tokio::test]
    async fn test_empty_query_is_idle() {
        let catalog = catalog_with_batman().await;
        let mut pipeline = pipeline(&catalog);

        pipeline.set_query("batman");
        settle_current(&mut pipeline).await;
        assert!(!pipeline.state().results.is_empty());

        pipeline.set_query("");
        assert_eq!(pipeline.state(), &SearchState::idle(""));
        assert_eq!(catalog.query_count().await, 1);
    }

    #[tokio::test]
    async fn test_search_success() {
        let catalog = catalog_with_batman().await;
        let mut pipeline = pipeline(&catalog);

        assert!(pipeline.set_query("batman"));
        assert!(pipeline.state().is_loading);
        assert!(pipeline.state().error.is_none());

        assert!(pipeline.settle().await);

        let state = pipeline.state();
        assert!(!state.is_loading);
        assert!(state.error.is_none());
        assert_eq!(state.results.len(), 2);
        assert!(!pipeline.is_in_flight());
    }

    #[tokio::test]
    async fn test_unchanged_query_is_noop() {
        let catalog = catalog_with_batman().await;
        let mut pipeline = pipeline(&catalog);

        pipeline.set_query("batman");
        settle_current(&mut pipeline).await;

        assert!(!pipeline.set_query("batman"));
        assert!(!pipeline.is_in_flight());
        assert_eq!(catalog.query_count().await, 1);
    }

    #[tokio::test]
    async fn test_not_found_surfaces_service_message() {
        let catalog = catalog_with_batman().await;
        let mut pipeline = pipeline(&catalog);

        pipeline.set_query("batman");
        settle_current(&mut pipeline).await;

        pipeline.set_query("zzzzzz");
        settle_current(&mut pipeline).await;

        let state = pipeline.state();
        assert!(state.results.is_empty());
        assert_eq!(state.error.as_deref(), Some("Movie not found!"));
    }

    #[tokio::test]
    async fn test_network_failure_surfaces_generic_message() {
        let catalog = catalog_with_batman().await;
        let mut pipeline = pipeline(&catalog);

        catalog
            .set_next_error(CatalogError::ApiError { status: 500 })
            .await;
        pipeline.set_query("batman");
        settle_current(&mut pipeline).await;

        let state = pipeline.state();
        assert!(state.results.is_empty());
        assert_eq!(state.error.as_deref(), Some(SEARCH_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn test_superseded_request_is_cancelled_and_never_applied() {
        let catalog = catalog_with_batman().await;
        let gate = catalog.hold_search("bat").await;
        let mut pipeline = pipeline(&catalog);

        pipeline.set_query("bat");
        catalog.wait_for_started(1).await;

        pipeline.set_query("batman");
        assert!(pipeline.state().is_loading);

        settle_current(&mut pipeline).await;
        gate.release();

        let state = pipeline.state();
        assert_eq!(state.query, "batman");
        assert_eq!(state.results.len(), 2);
        assert!(state.error.is_none());

        catalog.wait_for_cancelled(1).await;
        assert_eq!(catalog.cancelled_queries(), vec!["bat".to_string()]);
    }

    #[tokio::test]
    async fn test_stale_completion_is_discarded() {
        let catalog = catalog_with_batman().await;
        let mut pipeline = pipeline(&catalog);

        pipeline.set_query("batman");
        settle_current(&mut pipeline).await;
        let before = pipeline.state().clone();

        // A late success and a late failure for an older generation.
        let stale_ok = SearchCompletion {
            generation: 0,
            query: "bat".to_string(),
            outcome: Ok(vec![fixtures::search_result("tt9", "Stale", "1999")]),
        };
        let stale_err = SearchCompletion {
            generation: 0,
            query: "bat".to_string(),
            outcome: Err(CatalogError::ApiError { status: 500 }),
        };

        assert!(!pipeline.apply(stale_ok));
        assert!(!pipeline.apply(stale_err));
        assert_eq!(pipeline.state(), &before);
    }

    #[tokio::test]
    async fn test_shortening_query_cancels_outstanding_request() {
        let catalog = catalog_with_batman().await;
        let _gate = catalog.hold_search("batman").await;
        let mut pipeline = pipeline(&catalog);

        pipeline.set_query("batman");
        catalog.wait_for_started(1).await;

        pipeline.set_query("ba");
        assert_eq!(pipeline.state(), &SearchState::idle("ba"));
        assert!(!pipeline.is_in_flight());

        catalog.wait_for_cancelled(1).await;
    }

    #[tokio::test]
    async fn test_drop_cancels_outstanding_request() {
        let catalog = catalog_with_batman().await;
        let _gate = catalog.hold_search("batman").await;
        let mut pipeline = pipeline(&catalog);

        pipeline.set_query("batman");
        catalog.wait_for_started(1).await;

        drop(pipeline);

        catalog.wait_for_cancelled(1).await;
        assert_eq!(catalog.cancelled_queries(), vec!["batman".to_string()]);
    }
}
