use std::path::Path;
use tracing::debug;

use super::types::FeatureRecord;
use crate::probe::ProbeAdapter;

/// Produces a [`FeatureRecord`] for a file path by probing it.
pub struct FeatureExtractor {
    adapter: ProbeAdapter,
}

impl FeatureExtractor {
    pub fn new(adapter: ProbeAdapter) -> Self {
        Self { adapter }
    }

    pub fn adapter(&self) -> &ProbeAdapter {
        &self.adapter
    }

    /// Extract features. Never fails; unreadable files are all unknown.
    pub async fn extract(&self, path: &Path) -> FeatureRecord {
        let tracks = self.adapter.probe(path).await;
        if tracks.is_empty() {
            debug!("No tracks for {:?}, recording unknown features", path);
        }
        FeatureRecord::from_tracks(&tracks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::UNKNOWN;
    use crate::testing::{fixtures, MockProber};

    #[tokio::test]
    async fn test_extract_uses_probe_results() {
        let prober = MockProber::new();
        prober
            .set_tracks(
                "/lib/a.mkv",
                fixtures::video_tracks("Matroska", "AVC", 1920, 1080, &["AAC"]),
            )
            .await;
        let extractor = FeatureExtractor::new(ProbeAdapter::new(vec![Box::new(prober)]));

        let record = extractor.extract(Path::new("/lib/a.mkv")).await;
        assert_eq!(record.resolution, "1920x1080");
        assert_eq!(record.container, "Matroska");
        assert_eq!(record.audio_track_count, "1");
    }

    #[tokio::test]
    async fn test_extract_failed_probe_is_unknown() {
        let prober = MockProber::new();
        prober.fail_path("/lib/broken.mkv").await;
        let extractor = FeatureExtractor::new(ProbeAdapter::new(vec![Box::new(prober)]));

        let record = extractor.extract(Path::new("/lib/broken.mkv")).await;
        assert_eq!(record, FeatureRecord::unknown());
        assert_eq!(record.audio_track_count, UNKNOWN);
    }
}
