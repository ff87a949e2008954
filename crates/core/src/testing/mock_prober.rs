//! Mock probe backend for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::probe::{ProbeError, Track, TrackProber};

/// Mock implementation of the TrackProber trait.
///
/// Provides controllable behavior for testing:
/// - Per-path track lists
/// - A default track list for unconfigured paths
/// - Paths that fail to probe
/// - Recorded probe calls
/// - An artificial per-probe delay
///
/// Clones share state, so a test can keep a handle after boxing one into a
/// `ProbeAdapter`.
#[derive(Debug, Clone, Default)]
pub struct MockProber {
    tracks: Arc<RwLock<HashMap<PathBuf, Vec<Track>>>>,
    default_tracks: Arc<RwLock<Option<Vec<Track>>>>,
    failing: Arc<RwLock<HashSet<PathBuf>>>,
    calls: Arc<RwLock<Vec<PathBuf>>>,
    delay: Arc<RwLock<Option<Duration>>>,
}

impl MockProber {
    /// Create a new mock prober. Unconfigured paths yield no tracks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tracks returned for a specific path.
    pub async fn set_tracks(&self, path: impl AsRef<Path>, tracks: Vec<Track>) {
        self.tracks
            .write()
            .await
            .insert(path.as_ref().to_path_buf(), tracks);
    }

    /// Set the tracks returned for paths without their own entry.
    pub async fn set_default_tracks(&self, tracks: Vec<Track>) {
        *self.default_tracks.write().await = Some(tracks);
    }

    /// Make probing a path fail.
    pub async fn fail_path(&self, path: impl AsRef<Path>) {
        self.failing
            .write()
            .await
            .insert(path.as_ref().to_path_buf());
    }

    /// Make every probe take at least `delay`.
    pub async fn set_probe_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Paths probed so far, in call order.
    pub async fn recorded_calls(&self) -> Vec<PathBuf> {
        self.calls.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }
}

#[async_trait]
impl TrackProber for MockProber {
    fn name(&self) -> &str {
        "mock"
    }

    async fn probe(&self, path: &Path) -> Result<Vec<Track>, ProbeError> {
        self.calls.write().await.push(path.to_path_buf());

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.read().await.contains(path) {
            return Err(ProbeError::ToolFailed {
                tool: "mock".to_string(),
                code: Some(1),
                stderr: format!("cannot open {}", path.display()),
            });
        }

        if let Some(tracks) = self.tracks.read().await.get(path) {
            return Ok(tracks.clone());
        }

        Ok(self.default_tracks.read().await.clone().unwrap_or_default())
    }
}
