//! API tests for the statistics and recompute endpoints.
//!
//! The router is driven in-process over a temporary SQLite catalog and a
//! mock prober.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use hsorter_core::{NewTitle, RecomputeConfig};
use serde_json::{json, Value};

use common::{fixtures, TestFixture};

fn buckets(response: &Value) -> Vec<(String, u64)> {
    response["buckets"]
        .as_array()
        .expect("buckets array")
        .iter()
        .map(|b| {
            (
                b["bucket"].as_str().unwrap().to_string(),
                b["count"].as_u64().unwrap(),
            )
        })
        .collect()
}

/// Two titles, three files: a 1080p/720p tie in the first title.
async fn seed_library(fixture: &TestFixture) {
    let first = fixture.add_title(
        NewTitle::new("First")
            .created_at("2019-05-01 10:00:00")
            .tags("drama, comedy")
            .status("watched", true),
    );
    let second = fixture.add_title(
        NewTitle::new("Second")
            .created_at("2021-01-12 08:00:00")
            .tags("drama")
            .status("watched", false),
    );

    fixture
        .add_video(
            first,
            "/lib/first/01.mkv",
            0,
            fixtures::video_tracks("Matroska", "AVC", 1920, 1080, &["AAC", "FLAC"]),
        )
        .await;
    fixture
        .add_video(
            first,
            "/lib/first/02.mkv",
            1,
            fixtures::video_tracks("Matroska", "AVC", 1280, 720, &["AAC"]),
        )
        .await;
    fixture
        .add_video(
            second,
            "/lib/second/01.mp4",
            0,
            fixtures::video_tracks("MPEG-4", "HEVC", 1280, 720, &["AAC"]),
        )
        .await;
}

// =============================================================================
// Health & metrics
// =============================================================================

#[tokio::test]
async fn test_health() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/health").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert!(response.body["probe_backends"].is_array());
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_prometheus_text() {
    let fixture = TestFixture::new();
    fixture.get("/api/v1/health").await;

    let (status, body) = fixture.get_text("/api/v1/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("hsorter_http_requests_total"));
    assert!(body.contains("hsorter_recompute_running"));
}

// =============================================================================
// Queries
// =============================================================================

#[tokio::test]
async fn test_list_stats_before_any_recompute() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/stats").await;

    assert_status!(response, StatusCode::OK);
    let partitions = response.body["partitions"].as_array().unwrap();
    assert_eq!(partitions.len(), 13);
    assert!(partitions.iter().all(|p| p["computed"] == false));
    assert!(response.body["last_recompute"].is_null());
}

#[tokio::test]
async fn test_query_empty_cache_returns_no_buckets() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/stats/video/resolution").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["scope"], "per_title");
    assert_eq!(response.body["buckets"], json!([]));
    assert_eq!(response.body["total"], 0);
}

#[tokio::test]
async fn test_invalid_keys_are_rejected() {
    let fixture = TestFixture::new();

    for path in [
        "/api/v1/stats/video/bogus",
        "/api/v1/stats/nothing/resolution",
        "/api/v1/stats/titles/resolution",
        "/api/v1/stats/video/codec?scope=everything",
    ] {
        let response = fixture.get(path).await;
        assert_status!(response, StatusCode::BAD_REQUEST);
        assert!(response.body["error"].is_string(), "no error for {}", path);
    }
}

// =============================================================================
// Recompute
// =============================================================================

#[tokio::test]
async fn test_recompute_populates_every_partition() {
    let fixture = TestFixture::new();
    seed_library(&fixture).await;

    let response = fixture.post("/api/v1/stats/recompute").await;
    assert_status!(response, StatusCode::ACCEPTED);
    assert_eq!(response.body["state"], "running");

    let status = fixture.wait_for_recompute().await;
    assert_eq!(status.body["state"], "completed");
    assert_eq!(status.body["total"], 9);
    assert_eq!(status.body["done"], 9);
    assert!(status.body["error"].is_null());

    let all_files = fixture
        .get("/api/v1/stats/video/resolution?scope=all_files")
        .await;
    assert_status!(all_files, StatusCode::OK);
    assert_eq!(
        buckets(&all_files.body),
        vec![("1280x720".to_string(), 2), ("1920x1080".to_string(), 1)]
    );
    assert_eq!(all_files.body["total"], 3);
    assert!(all_files.body["last_recompute"].is_string());

    let per_title = fixture.get("/api/v1/stats/video/resolution").await;
    assert_eq!(
        buckets(&per_title.body),
        vec![("1280x720".to_string(), 1), ("1920x1080".to_string(), 1)]
    );

    let track_count = fixture
        .get("/api/v1/stats/audio/track_count?scope=all_files")
        .await;
    assert_eq!(
        buckets(&track_count.body),
        vec![("1".to_string(), 2), ("2".to_string(), 1)]
    );

    let tags = fixture.get("/api/v1/stats/tags/all").await;
    assert_eq!(
        buckets(&tags.body),
        vec![("drama".to_string(), 2), ("comedy".to_string(), 1)]
    );

    let statuses = fixture.get("/api/v1/stats/statuses/all").await;
    assert_eq!(buckets(&statuses.body), vec![("watched".to_string(), 1)]);

    // Catalog partitions answer either scope
    let years = fixture
        .get("/api/v1/stats/titles/by_year?scope=all_files")
        .await;
    assert_status!(years, StatusCode::OK);
    assert_eq!(years.body["scope"], "per_title");
    assert_eq!(
        buckets(&years.body),
        vec![("2019".to_string(), 1), ("2021".to_string(), 1)]
    );

    let list = fixture.get("/api/v1/stats").await;
    assert!(list.body["last_recompute"].is_string());
    let computed = list.body["partitions"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|p| p["computed"] == true)
        .count();
    assert_eq!(computed, 13);
}

#[tokio::test]
async fn test_recompute_conflict_while_running() {
    let fixture = TestFixture::new();
    seed_library(&fixture).await;
    fixture.prober.set_probe_delay(Duration::from_millis(200)).await;

    let first = fixture.post("/api/v1/stats/recompute").await;
    assert_status!(first, StatusCode::ACCEPTED);

    let second = fixture.post("/api/v1/stats/recompute").await;
    assert_status!(second, StatusCode::CONFLICT);

    let status = fixture.wait_for_recompute().await;
    assert_eq!(status.body["state"], "completed");

    // Idle again, so a new pass may start
    let third = fixture.post("/api/v1/stats/recompute").await;
    assert_status!(third, StatusCode::ACCEPTED);
    fixture.wait_for_recompute().await;
}

#[tokio::test]
async fn test_cancel_running_recompute() {
    let fixture = TestFixture::with_recompute_config(RecomputeConfig {
        progress_buffer: 1,
        ..RecomputeConfig::default()
    });
    let title = fixture.add_title(NewTitle::new("Long").created_at("2020-01-01"));
    for i in 0..20 {
        fixture
            .add_video(
                title,
                &format!("/lib/long/{:02}.mkv", i),
                i,
                fixtures::video_tracks("Matroska", "AVC", 1920, 1080, &["AAC"]),
            )
            .await;
    }
    fixture.prober.set_probe_delay(Duration::from_millis(50)).await;

    let start = fixture.post("/api/v1/stats/recompute").await;
    assert_status!(start, StatusCode::ACCEPTED);

    // Let the pass reach the probe stage
    tokio::time::sleep(Duration::from_millis(150)).await;

    let cancel = fixture.post("/api/v1/stats/recompute/cancel").await;
    assert_status!(cancel, StatusCode::OK);

    let status = fixture.wait_for_recompute().await;
    assert_eq!(status.body["state"], "failed");
    assert_eq!(status.body["error"], "recompute cancelled");
    assert_eq!(status.body["stage"], "probe_files");
    assert_eq!(status.body["total"], 26);
    let done = status.body["done"].as_u64().unwrap();
    assert!((3..26).contains(&done), "done = {}", done);

    // Catalog partitions committed before the cancel stay
    let years = fixture.get("/api/v1/stats/titles/by_year").await;
    assert_eq!(buckets(&years.body), vec![("2020".to_string(), 1)]);

    // Video partitions were never written
    let video = fixture
        .get("/api/v1/stats/video/codec?scope=all_files")
        .await;
    assert_eq!(video.body["buckets"], json!([]));
    let list = fixture.get("/api/v1/stats").await;
    assert!(list.body["last_recompute"].is_null());
}

#[tokio::test]
async fn test_cancel_without_running_pass() {
    let fixture = TestFixture::new();

    let response = fixture.post("/api/v1/stats/recompute/cancel").await;

    assert_status!(response, StatusCode::CONFLICT);
    let status = fixture.get("/api/v1/stats/recompute").await;
    assert_eq!(status.body["state"], "idle");
}

#[tokio::test]
async fn test_clear_stats() {
    let fixture = TestFixture::new();
    seed_library(&fixture).await;

    fixture.post("/api/v1/stats/recompute").await;
    fixture.wait_for_recompute().await;

    let response = fixture.delete("/api/v1/stats").await;
    assert_status!(response, StatusCode::OK);

    let codec = fixture
        .get("/api/v1/stats/video/codec?scope=all_files")
        .await;
    assert_eq!(codec.body["buckets"], json!([]));

    let list = fixture.get("/api/v1/stats").await;
    assert!(list.body["partitions"]
        .as_array()
        .unwrap()
        .iter()
        .all(|p| p["computed"] == false));
}

#[tokio::test]
async fn test_probe_failures_surface_as_unknown() {
    let fixture = TestFixture::new();
    let title = fixture.add_title(NewTitle::new("Broken").created_at("2022-03-03"));
    fixture
        .library
        .insert_video(title, "/lib/broken/01.mkv", 0)
        .unwrap();
    fixture.prober.fail_path("/lib/broken/01.mkv").await;

    fixture.post("/api/v1/stats/recompute").await;
    let status = fixture.wait_for_recompute().await;
    assert_eq!(status.body["state"], "completed");

    let container = fixture
        .get("/api/v1/stats/video/container?scope=all_files")
        .await;
    assert_eq!(buckets(&container.body), vec![("Unknown".to_string(), 1)]);
}
