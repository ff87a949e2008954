//! Testing utilities and mock implementations.
//!
//! This module provides mocks for the probe backend and the catalog, allowing
//! recompute passes to be tested without media files or external tools.
//!
//! # Example
//!
//! ```rust,ignore
//! use hsorter_core::testing::{fixtures, MockLibrary, MockProber};
//!
//! let library = MockLibrary::new();
//! let title = library.add_title(fixtures::title(1, "2020-01-01", "drama"));
//! library.add_video(title, "/library/show/01.mkv");
//!
//! let prober = MockProber::new();
//! prober
//!     .set_tracks("/library/show/01.mkv", fixtures::video_tracks("Matroska", "AVC", 1920, 1080, &["AAC"]))
//!     .await;
//! ```

mod mock_library;
mod mock_prober;

pub use mock_library::MockLibrary;
pub use mock_prober::MockProber;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::collections::BTreeMap;

    use crate::library::TitleRecord;
    use crate::probe::{Track, TrackType};

    /// Create a track with a format.
    pub fn track(index: usize, track_type: TrackType, format: &str) -> Track {
        Track::new(index, track_type).with_format(format)
    }

    /// Create the track list of a typical video file.
    ///
    /// One general track, one video track, and one audio track per codec.
    pub fn video_tracks(
        container: &str,
        video_codec: &str,
        width: u32,
        height: u32,
        audio_codecs: &[&str],
    ) -> Vec<Track> {
        let mut tracks = vec![
            track(0, TrackType::General, container),
            track(1, TrackType::Video, video_codec).with_size(width, height),
        ];
        for codec in audio_codecs {
            let index = tracks.len();
            tracks.push(track(index, TrackType::Audio, codec).with_language("jpn"));
        }
        tracks
    }

    /// Create a title with no status flags.
    pub fn title(id: i64, created_at: &str, tags: &str) -> TitleRecord {
        TitleRecord {
            id,
            created_at: created_at.to_string(),
            year_start: None,
            tags: tags.to_string(),
            statuses: BTreeMap::new(),
        }
    }

    /// Create a title with the given status flags set to true.
    pub fn title_with_statuses(id: i64, statuses: &[&str]) -> TitleRecord {
        let mut record = title(id, "", "");
        for status in statuses {
            record.statuses.insert(status.to_string(), true);
        }
        record
    }
}
