//! Browse lifecycle integration tests.
//!
//! These tests drive the controller the way the front-end does:
//! - Search, select, rate and add to the watched list
//! - Out-of-order responses and cancellation of superseded requests
//! - Persistence of the watched list across restarts
//! - Title override lifetime

use std::sync::Arc;

use tempfile::TempDir;

use popcorn_core::{
    AppController, Config, DetailPhase, KeyValueStore, PersistentStore, ResultsPane, Selection,
    SidePane, SqliteKvStore, WatchedEntry,
    testing::{fixtures, MockCatalog, RecordingTitle, UnavailableStore},
};

/// Test helper wiring a controller to mocks.
struct TestHarness {
    catalog: Arc<MockCatalog>,
    title: Arc<RecordingTitle>,
    store: PersistentStore,
    app: AppController,
}

impl TestHarness {
    async fn new() -> Self {
        Self::with_store(PersistentStore::in_memory()).await
    }

    async fn with_store(store: PersistentStore) -> Self {
        let catalog = Arc::new(MockCatalog::new());
        for (id, title, year) in [
            ("tt0372784", "Batman Begins", "2005"),
            ("tt0096895", "Batman", "1989"),
            ("tt0468569", "The Dark Knight", "2008"),
            ("tt1375666", "Inception", "2010"),
        ] {
            catalog
                .add_movie(fixtures::movie_detail(id, title, year))
                .await;
        }

        let title = Arc::new(RecordingTitle::new());
        let app = AppController::new(
            catalog.clone(),
            title.clone(),
            store.clone(),
            &Config::with_api_key("test"),
        );

        Self {
            catalog,
            title,
            store,
            app,
        }
    }

    async fn settle(&mut self) {
        while self.app.is_busy() {
            self.app.settle().await;
        }
    }
}

#[tokio::test]
async fn test_search_select_rate_and_watch() {
    let mut h = TestHarness::new().await;

    h.app.set_query("batman");
    assert!(h.app.search_state().is_loading);
    h.settle().await;

    let state = h.app.search_state();
    assert!(!state.is_loading);
    assert!(state.error.is_none());
    assert!(!state.results.is_empty());

    let first = state.results[0].id.clone();
    h.app.select(&first);
    h.settle().await;
    assert!(matches!(h.app.detail_phase(), DetailPhase::Ready(_)));

    h.app.set_user_rating(8).unwrap();
    let entry = h.app.watch_selected().unwrap();

    assert_eq!(entry.user_rating, 8);
    assert!(entry.rating_revision_count >= 1);
    assert_eq!(h.app.selection(), &Selection::None);

    let watched = h.app.watched().entries();
    assert_eq!(watched.len(), 1);
    assert_eq!(watched[0].id, first);

    let summary = h.app.summary();
    assert_eq!(summary.count, 1);
    assert_eq!(summary.mean_user_rating, 8.0);
}

#[tokio::test]
async fn test_fast_typing_applies_only_latest_query() {
    let mut h = TestHarness::new().await;
    let bat = h.catalog.hold_search("bat").await;
    let batm = h.catalog.hold_search("batm").await;

    h.app.set_query("bat");
    h.catalog.wait_for_started(1).await;
    h.app.set_query("batm");
    h.catalog.wait_for_started(2).await;
    h.app.set_query("batman");
    h.settle().await;

    // Late responses for the superseded queries.
    bat.release();
    batm.release();

    let view = h.app.view();
    assert_eq!(view.query, "batman");
    match view.results {
        ResultsPane::Results { items } => {
            assert_eq!(items.len(), 2);
            assert!(items.iter().all(|r| r.title.contains("Batman")));
        }
        other => panic!("Expected results, got {:?}", other),
    }

    h.catalog.wait_for_cancelled(2).await;
    let mut cancelled = h.catalog.cancelled_queries();
    cancelled.sort();
    assert_eq!(cancelled, vec!["bat".to_string(), "batm".to_string()]);
}

#[tokio::test]
async fn test_reopening_same_movie_ignores_earlier_session() {
    let mut h = TestHarness::new().await;
    let gate = h.catalog.hold_movie("tt1375666").await;

    h.app.select("tt1375666");
    h.catalog.wait_for_started(1).await;
    h.app.close();

    gate.release();
    h.app.select("tt1375666");
    h.settle().await;

    assert_eq!(h.app.detail_phase().detail().unwrap().title, "Inception");
    assert_eq!(h.title.history(), vec!["Movie | Inception"]);

    // Each session issued its own fetch.
    assert_eq!(
        h.catalog.recorded_movie_requests().await,
        vec!["tt1375666", "tt1375666"]
    );
}

#[tokio::test]
async fn test_title_restored_on_every_exit() {
    let mut h = TestHarness::new().await;

    // Close.
    h.app.select("tt1375666");
    h.settle().await;
    h.app.close();

    // Re-selection.
    h.app.select("tt0468569");
    h.settle().await;
    h.app.select("tt0096895");
    h.settle().await;

    // Controller teardown.
    drop(h.app);

    assert_eq!(
        h.title.history(),
        vec![
            "Movie | Inception",
            "usePopcorn",
            "Movie | The Dark Knight",
            "usePopcorn",
            "Movie | Batman",
            "usePopcorn",
        ]
    );
}

#[tokio::test]
async fn test_failed_detail_is_shown_in_side_pane() {
    let mut h = TestHarness::new().await;

    h.app.select("tt9999999");
    h.settle().await;

    match h.app.view().side {
        SidePane::Detail { detail, .. } => {
            assert!(matches!(detail.phase, DetailPhase::Failed(_)));
        }
        other => panic!("Expected detail pane, got {:?}", other),
    }
    assert!(h.title.history().is_empty());
}

#[tokio::test]
async fn test_watched_list_survives_restart() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("popcorn.db");

    {
        let backend = Arc::new(SqliteKvStore::new(&db_path).expect("Failed to open store"));
        let mut h = TestHarness::with_store(PersistentStore::new(backend)).await;
        h.app.select("tt1375666");
        h.settle().await;
        h.app.set_user_rating(10).unwrap();
        h.app.watch_selected().unwrap();
    }

    let backend = Arc::new(SqliteKvStore::new(&db_path).expect("Failed to reopen store"));
    let raw = backend.get("watched").unwrap().expect("slot should be written");
    assert!(raw.contains("\"userRating\":10"));

    let h = TestHarness::with_store(PersistentStore::new(backend)).await;
    let entries = h.app.watched().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, "tt1375666");
    assert_eq!(entries[0].user_rating, 10);
}

#[tokio::test]
async fn test_add_then_delete_restores_previous_list() {
    let mut h = TestHarness::new().await;
    h.app
        .add_watched(fixtures::watched_entry("tt0096895", 6))
        .unwrap();
    let before: Vec<WatchedEntry> = h.store.load("watched");

    h.app
        .add_watched(fixtures::watched_entry("tt0468569", 9))
        .unwrap();
    assert!(h.app.delete_watched("tt0468569"));

    let after: Vec<WatchedEntry> = h.store.load("watched");
    assert_eq!(before, after);
    assert_eq!(h.app.watched().entries().to_vec(), after);
}

#[tokio::test]
async fn test_unavailable_storage_degrades_gracefully() {
    let mut h = TestHarness::with_store(PersistentStore::new(Arc::new(UnavailableStore))).await;
    assert!(h.app.watched().is_empty());

    h.app
        .add_watched(fixtures::watched_entry("tt1375666", 7))
        .unwrap();
    assert_eq!(h.app.watched().len(), 1);
    assert_eq!(h.app.summary().count, 1);
}
