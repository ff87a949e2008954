use serde::{Deserialize, Serialize};

use crate::probe::{Track, TrackType};

/// Bucket value for any feature with no source track.
pub const UNKNOWN: &str = "Unknown";

/// One of the five features derived per video file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureField {
    Resolution,
    VideoCodec,
    Container,
    AudioCodec,
    AudioTrackCount,
}

impl FeatureField {
    pub const ALL: [FeatureField; 5] = [
        FeatureField::Resolution,
        FeatureField::VideoCodec,
        FeatureField::Container,
        FeatureField::AudioCodec,
        FeatureField::AudioTrackCount,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureField::Resolution => "resolution",
            FeatureField::VideoCodec => "video_codec",
            FeatureField::Container => "container",
            FeatureField::AudioCodec => "audio_codec",
            FeatureField::AudioTrackCount => "audio_track_count",
        }
    }
}

impl std::fmt::Display for FeatureField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized technical summary of one video file.
///
/// Every field is a display string; missing data is [`UNKNOWN`], never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub resolution: String,
    pub video_codec: String,
    pub container: String,
    pub audio_codec: String,
    pub audio_track_count: String,
}

impl FeatureRecord {
    /// Record for a file that could not be probed at all.
    pub fn unknown() -> Self {
        Self {
            resolution: UNKNOWN.to_string(),
            video_codec: UNKNOWN.to_string(),
            container: UNKNOWN.to_string(),
            audio_codec: UNKNOWN.to_string(),
            audio_track_count: UNKNOWN.to_string(),
        }
    }

    /// Reduce a track list to a feature record.
    ///
    /// Uses the first video track for resolution and video codec, the first
    /// general track for container, and the first audio track for audio codec.
    /// An empty list means the probe failed, so all fields are unknown; a
    /// probed file without audio has an audio track count of `"0"`.
    pub fn from_tracks(tracks: &[Track]) -> Self {
        if tracks.is_empty() {
            return Self::unknown();
        }

        let first = |kind: TrackType| tracks.iter().find(|t| t.track_type == kind);
        let video = first(TrackType::Video);
        let general = first(TrackType::General);
        let audio = first(TrackType::Audio);
        let audio_count = tracks
            .iter()
            .filter(|t| t.track_type == TrackType::Audio)
            .count();

        let resolution = video
            .and_then(|v| match (v.width.as_deref(), v.height.as_deref()) {
                (Some(w), Some(h)) => Some(format!("{}x{}", w, h)),
                _ => None,
            })
            .unwrap_or_else(|| UNKNOWN.to_string());

        Self {
            resolution,
            video_codec: format_or_unknown(video),
            container: format_or_unknown(general),
            audio_codec: format_or_unknown(audio),
            audio_track_count: audio_count.to_string(),
        }
    }

    pub fn value(&self, field: FeatureField) -> &str {
        match field {
            FeatureField::Resolution => &self.resolution,
            FeatureField::VideoCodec => &self.video_codec,
            FeatureField::Container => &self.container,
            FeatureField::AudioCodec => &self.audio_codec,
            FeatureField::AudioTrackCount => &self.audio_track_count,
        }
    }
}

fn format_or_unknown(track: Option<&Track>) -> String {
    track
        .and_then(|t| t.format.clone())
        .unwrap_or_else(|| UNKNOWN.to_string())
}
