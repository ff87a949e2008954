//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! over a temporary SQLite catalog and a mock prober, so recompute passes run
//! without media files or external tools.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use hsorter_core::{
    testing::MockProber, Config, DatabaseConfig, FeatureExtractor, NewTitle, ProbeAdapter,
    RecomputeConfig, SqliteLibrary, SqliteSettings, SqliteStatsCache, StatsCache, StatsQuery,
    StatsRecomputer, Track,
};
use hsorter_server::api::{create_router, WsBroadcaster};
use hsorter_server::recompute::RecomputeController;
use hsorter_server::state::AppState;

/// Re-export fixtures for test convenience
pub use hsorter_core::testing::fixtures;

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_recompute() {
///     let fixture = TestFixture::new();
///     let title = fixture.add_title("Show");
///     fixture.add_video(title, "/lib/show/01.mkv", tracks).await;
///
///     let response = fixture.post("/api/v1/stats/recompute").await;
///     assert_eq!(response.status, 202);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Shared application state
    pub state: Arc<AppState>,
    /// Catalog writer over the fixture database
    pub library: Arc<SqliteLibrary>,
    /// Mock prober - configure tracks per path
    pub prober: MockProber,
    /// Temporary directory holding the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default settings.
    pub fn new() -> Self {
        Self::with_recompute_config(RecomputeConfig::default())
    }

    /// Create a test fixture with a custom recompute configuration.
    pub fn with_recompute_config(recompute: RecomputeConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let config = Config {
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            recompute: recompute.clone(),
            ..Config::default()
        };

        let library = Arc::new(SqliteLibrary::new(&db_path).expect("Failed to open library"));
        let cache: Arc<dyn StatsCache> =
            Arc::new(SqliteStatsCache::new(&db_path).expect("Failed to create cache"));
        let settings =
            Arc::new(SqliteSettings::new(&db_path).expect("Failed to create settings"));

        let prober = MockProber::new();
        let adapter = ProbeAdapter::new(vec![Box::new(prober.clone())]);

        let recomputer = Arc::new(StatsRecomputer::new(
            recompute,
            library.clone(),
            Arc::clone(&cache),
            settings.clone(),
            Arc::new(FeatureExtractor::new(adapter)),
        ));

        let ws_broadcaster = WsBroadcaster::default();
        let controller = RecomputeController::new(recomputer, ws_broadcaster.clone());
        let query = StatsQuery::new(Arc::clone(&cache), settings);

        let state = Arc::new(AppState::new(
            config,
            query,
            cache,
            controller,
            ws_broadcaster,
        ));

        let router = create_router(Arc::clone(&state));

        Self {
            router,
            state,
            library,
            prober,
            temp_dir,
        }
    }

    /// Insert a title into the catalog.
    pub fn add_title(&self, title: NewTitle) -> i64 {
        self.library
            .insert_title(&title)
            .expect("Failed to insert title")
    }

    /// Insert a video file and register its probe result.
    pub async fn add_video(&self, title_id: i64, path: &str, sort_order: i64, tracks: Vec<Track>) {
        self.library
            .insert_video(title_id, path, sort_order)
            .expect("Failed to insert video");
        self.prober.set_tracks(path, tracks).await;
    }

    /// Poll the recompute status until the pass leaves the running state.
    pub async fn wait_for_recompute(&self) -> TestResponse {
        for _ in 0..500 {
            let response = self.get("/api/v1/stats/recompute").await;
            if response.body["state"] != "running" {
                return response;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("recompute did not finish in time");
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path).await
    }

    /// Send a POST request without a body.
    pub async fn post(&self, path: &str) -> TestResponse {
        self.request("POST", path).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path).await
    }

    /// Send a GET request and return the raw body as text.
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

        (status, String::from_utf8_lossy(&body_bytes).into_owned())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
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
