//! mediainfo command-line backend.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::error::ProbeError;
use super::process::run_tool;
use super::traits::TrackProber;
use super::types::{non_empty, Track, TrackType};

/// Probes files with `mediainfo --Output=JSON`.
pub struct MediainfoCli {
    program: PathBuf,
    timeout_secs: u64,
}

impl MediainfoCli {
    /// Creates a backend running the given binary.
    pub fn new(program: PathBuf, timeout_secs: u64) -> Self {
        Self {
            program,
            timeout_secs,
        }
    }

    /// Parses mediainfo JSON output into tracks.
    pub(crate) fn parse_output(output: &str) -> Result<Vec<Track>, ProbeError> {
        #[derive(Deserialize)]
        struct Output {
            media: Option<Media>,
        }

        #[derive(Deserialize)]
        struct Media {
            #[serde(default)]
            track: Vec<RawTrack>,
        }

        #[derive(Deserialize)]
        struct RawTrack {
            #[serde(rename = "@type")]
            track_type: String,
            #[serde(rename = "Format", default, deserialize_with = "lenient_string")]
            format: Option<String>,
            #[serde(rename = "Width", default, deserialize_with = "lenient_string")]
            width: Option<String>,
            #[serde(rename = "Height", default, deserialize_with = "lenient_string")]
            height: Option<String>,
            #[serde(rename = "BitRate", default, deserialize_with = "lenient_string")]
            bit_rate: Option<String>,
            #[serde(rename = "Language", default, deserialize_with = "lenient_string")]
            language: Option<String>,
            #[serde(rename = "CodecID", default, deserialize_with = "lenient_string")]
            codec_id: Option<String>,
            #[serde(rename = "Title", default, deserialize_with = "lenient_string")]
            title: Option<String>,
        }

        let parsed: Output = serde_json::from_str(output)
            .map_err(|e| ProbeError::parse(format!("Failed to parse mediainfo output: {}", e)))?;

        let tracks = parsed
            .media
            .map(|m| m.track)
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, raw)| Track {
                index,
                track_type: TrackType::from_mediainfo(&raw.track_type),
                format: raw.format,
                width: raw.width,
                height: raw.height,
                bit_rate: raw.bit_rate,
                language: raw.language,
                codec_id: raw.codec_id,
                title: raw.title,
            })
            .collect();

        Ok(tracks)
    }
}

/// mediainfo emits strings, but some builds emit bare numbers.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let text = match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    Ok(non_empty(text))
}

#[async_trait]
impl TrackProber for MediainfoCli {
    fn name(&self) -> &str {
        "mediainfo"
    }

    async fn probe(&self, path: &Path) -> Result<Vec<Track>, ProbeError> {
        debug!("Probing {:?} with mediainfo", path);
        let stdout = run_tool(
            "mediainfo",
            &self.program,
            &["--Output=JSON"],
            path,
            self.timeout_secs,
        )
        .await?;
        Self::parse_output(&String::from_utf8_lossy(&stdout))
    }
}
