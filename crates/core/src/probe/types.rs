//! Types for the probe module.

use serde::{Deserialize, Serialize};

/// Tracks of one file, in container order.
pub type TrackList = Vec<Track>;

/// Kind of a track as reported by the probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackType {
    /// Container-level pseudo track.
    General,
    Video,
    Audio,
    /// Subtitles.
    Text,
    /// Anything else (menus, images, data streams).
    Other,
}

impl TrackType {
    /// Parses a mediainfo `@type` value.
    pub fn from_mediainfo(value: &str) -> Self {
        match value {
            "General" => Self::General,
            "Video" => Self::Video,
            "Audio" => Self::Audio,
            "Text" => Self::Text,
            _ => Self::Other,
        }
    }

    /// Parses an ffprobe `codec_type` value.
    pub fn from_ffprobe(value: &str) -> Self {
        match value {
            "video" => Self::Video,
            "audio" => Self::Audio,
            "subtitle" => Self::Text,
            _ => Self::Other,
        }
    }
}

/// One track of a probed media file.
///
/// All text fields are `None` rather than empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Position of the track in the probe output.
    pub index: usize,
    pub track_type: TrackType,
    /// Format or codec name (e.g. "AVC", "HEVC", "Matroska", "AAC").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bit_rate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Track {
    /// Creates a track with no attributes set.
    pub fn new(index: usize, track_type: TrackType) -> Self {
        Self {
            index,
            track_type,
            format: None,
            width: None,
            height: None,
            bit_rate: None,
            language: None,
            codec_id: None,
            title: None,
        }
    }

    /// Sets the format.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = non_empty(Some(format.into()));
        self
    }

    /// Sets width and height.
    pub fn with_size(mut self, width: impl ToString, height: impl ToString) -> Self {
        self.width = non_empty(Some(width.to_string()));
        self.height = non_empty(Some(height.to_string()));
        self
    }

    /// Sets the language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = non_empty(Some(language.into()));
        self
    }
}

/// Trims a value and maps blank strings to `None`.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == v.len() {
            Some(v)
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_type_parsing() {
        assert_eq!(TrackType::from_mediainfo("General"), TrackType::General);
        assert_eq!(TrackType::from_mediainfo("Video"), TrackType::Video);
        assert_eq!(TrackType::from_mediainfo("Menu"), TrackType::Other);
        assert_eq!(TrackType::from_ffprobe("subtitle"), TrackType::Text);
        assert_eq!(TrackType::from_ffprobe("attachment"), TrackType::Other);
    }

    #[test]
    fn test_builder_normalizes_blank_values() {
        let track = Track::new(0, TrackType::Video)
            .with_format("  ")
            .with_size(1920, "");
        assert_eq!(track.format, None);
        assert_eq!(track.width, Some("1920".to_string()));
        assert_eq!(track.height, None);
    }

    #[test]
    fn test_non_empty_trims() {
        assert_eq!(non_empty(Some(" AVC ".to_string())), Some("AVC".to_string()));
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn test_track_serialization_skips_missing() {
        let track = Track::new(1, TrackType::Audio).with_format("AAC");
        let json = serde_json::to_string(&track).unwrap();
        assert!(json.contains("\"track_type\":\"audio\""));
        assert!(!json.contains("width"));
    }
}
