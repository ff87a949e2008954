//! Trait definitions for the probe module.

use async_trait::async_trait;
use std::path::Path;

use super::error::ProbeError;
use super::types::Track;

/// A backend that can read the track layout of a media file.
#[async_trait]
pub trait TrackProber: Send + Sync {
    /// Returns the name of this backend (used in logs and metrics).
    fn name(&self) -> &str;

    /// Probes a file and returns its tracks in container order.
    async fn probe(&self, path: &Path) -> Result<Vec<Track>, ProbeError>;
}
