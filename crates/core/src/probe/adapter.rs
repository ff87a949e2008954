//! Fallback chain over probe backends.

use std::path::Path;
use tracing::{debug, warn};

use super::config::{ProbeBackendKind, ProbeConfig};
use super::ffprobe::FfprobeCli;
use super::mediainfo::MediainfoCli;
use super::traits::TrackProber;
use super::types::TrackList;
use crate::metrics::PROBE_FAILURES;

/// Tries each backend in order until one returns tracks.
pub struct ProbeAdapter {
    backends: Vec<Box<dyn TrackProber>>,
}

impl ProbeAdapter {
    /// Creates an adapter over explicit backends.
    pub fn new(backends: Vec<Box<dyn TrackProber>>) -> Self {
        Self { backends }
    }

    /// Creates an adapter from configuration.
    ///
    /// `libav` is skipped with a warning when the crate was built without it.
    pub fn from_config(config: &ProbeConfig) -> Self {
        let mut backends: Vec<Box<dyn TrackProber>> = Vec::new();
        for kind in &config.backends {
            match kind {
                ProbeBackendKind::Libav => {
                    #[cfg(feature = "libav")]
                    backends.push(Box::new(super::libav::LibavProber::new()));
                    #[cfg(not(feature = "libav"))]
                    warn!("libav probe backend requested but not compiled in, skipping");
                }
                ProbeBackendKind::Mediainfo => backends.push(Box::new(MediainfoCli::new(
                    config.mediainfo_path.clone(),
                    config.timeout_secs,
                ))),
                ProbeBackendKind::Ffprobe => backends.push(Box::new(FfprobeCli::new(
                    config.ffprobe_path.clone(),
                    config.timeout_secs,
                ))),
            }
        }
        Self::new(backends)
    }

    /// Names of the configured backends, in order.
    pub fn backend_names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Probes a file, returning an empty list when no backend can read it.
    pub async fn probe(&self, path: &Path) -> TrackList {
        if tokio::fs::metadata(path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            debug!("Skipping probe of directory {:?}", path);
            return Vec::new();
        }

        for backend in &self.backends {
            match backend.probe(path).await {
                Ok(tracks) if !tracks.is_empty() => return tracks,
                Ok(_) => {
                    debug!("{} returned no tracks for {:?}", backend.name(), path);
                    PROBE_FAILURES.with_label_values(&[backend.name()]).inc();
                }
                Err(e) if e.is_backend_unavailable() => {
                    debug!("{} unavailable: {}", backend.name(), e);
                    PROBE_FAILURES.with_label_values(&[backend.name()]).inc();
                }
                Err(e) => {
                    warn!("{} failed for {:?}: {}", backend.name(), path, e);
                    PROBE_FAILURES.with_label_values(&[backend.name()]).inc();
                }
            }
        }

        Vec::new()
    }
}
