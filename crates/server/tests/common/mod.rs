//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with a mock catalog injected, enabling E2E testing without network
//! access.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use popcorn_core::{
    create_app, AppHandle, AppSnapshot, Config, PersistentStore, SqliteKvStore,
    testing::MockCatalog,
};

/// Re-export fixtures for test convenience
pub use popcorn_core::testing::fixtures;

/// Test fixture for E2E testing with mock dependencies.
///
/// Provides an in-process server backed by a [`MockCatalog`] and a SQLite
/// store in a temporary directory.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_search() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.put("/api/v1/query", json!({ "query": "batman" })).await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock catalog - configure movies, hold requests, inject errors
    pub catalog: Arc<MockCatalog>,
    /// Handle on the controller runtime
    pub app: AppHandle,
    /// Temporary directory for the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with a small movie catalog.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self::with_dir(temp_dir).await
    }

    /// Create a test fixture storing its database in `temp_dir`.
    ///
    /// Reusing a directory simulates a restart.
    pub async fn with_dir(temp_dir: TempDir) -> Self {
        let db_path = temp_dir.path().join("test.db");

        // Create mock catalog
        let catalog = Arc::new(MockCatalog::new());
        for (id, title, year) in [
            ("tt0372784", "Batman Begins", "2005"),
            ("tt0096895", "Batman", "1989"),
            ("tt1375666", "Inception", "2010"),
        ] {
            catalog
                .add_movie(fixtures::movie_detail(id, title, year))
                .await;
        }

        // Create config
        let mut config = Config::with_api_key("test-key");
        config.storage.path = db_path.clone();

        // Create store
        let backend = Arc::new(SqliteKvStore::new(&db_path).expect("Failed to create store"));
        let store = PersistentStore::new(backend);

        // Create and spawn the controller runtime
        let (app, runtime) = create_app(
            Arc::clone(&catalog) as Arc<dyn popcorn_core::Catalog>,
            store,
            &config,
        );
        tokio::spawn(runtime.run());

        // Create app state and router
        let state = Arc::new(popcorn_server::state::AppState::new(config, app.clone()));
        let router = popcorn_server::api::create_router(state);

        Self {
            router,
            catalog,
            app,
            temp_dir,
        }
    }

    /// Wait until the published state satisfies `predicate`.
    pub async fn wait_for_state(
        &self,
        predicate: impl FnMut(&AppSnapshot) -> bool,
    ) -> AppSnapshot {
        tokio::time::timeout(std::time::Duration::from_secs(5), self.app.wait_for(predicate))
            .await
            .expect("Timed out waiting for state")
            .expect("Runtime stopped")
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a request and return the raw body as text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, String::from_utf8_lossy(&body_bytes).to_string())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder()
            .method(method)
            .uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
