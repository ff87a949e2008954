//! ffprobe command-line backend.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::error::ProbeError;
use super::process::run_tool;
use super::traits::TrackProber;
use super::types::{non_empty, Track, TrackType};

/// Probes files with `ffprobe -print_format json`.
pub struct FfprobeCli {
    program: PathBuf,
    timeout_secs: u64,
}

impl FfprobeCli {
    /// Creates a backend running the given binary.
    pub fn new(program: PathBuf, timeout_secs: u64) -> Self {
        Self {
            program,
            timeout_secs,
        }
    }

    /// Parses ffprobe JSON output into tracks.
    ///
    /// The `format` section becomes a leading General track, streams follow in
    /// stream order.
    pub(crate) fn parse_output(output: &str) -> Result<Vec<Track>, ProbeError> {
        #[derive(Deserialize)]
        struct ProbeOutput {
            format: Option<ProbeFormat>,
            #[serde(default)]
            streams: Vec<ProbeStream>,
        }

        #[derive(Deserialize)]
        struct ProbeFormat {
            format_name: Option<String>,
            bit_rate: Option<String>,
            #[serde(default)]
            tags: HashMap<String, String>,
        }

        #[derive(Deserialize)]
        struct ProbeStream {
            codec_type: Option<String>,
            codec_name: Option<String>,
            codec_tag_string: Option<String>,
            width: Option<u32>,
            height: Option<u32>,
            bit_rate: Option<String>,
            #[serde(default)]
            tags: HashMap<String, String>,
        }

        let probe: ProbeOutput = serde_json::from_str(output)
            .map_err(|e| ProbeError::parse(format!("Failed to parse ffprobe output: {}", e)))?;

        let mut tracks = Vec::with_capacity(probe.streams.len() + 1);

        if let Some(format) = probe.format {
            let mut general = Track::new(0, TrackType::General);
            // "matroska,webm" -> "matroska"
            general.format = non_empty(
                format
                    .format_name
                    .and_then(|f| f.split(',').next().map(str::to_string)),
            );
            general.bit_rate = non_empty(format.bit_rate);
            general.title = non_empty(format.tags.get("title").cloned());
            tracks.push(general);
        }

        for stream in probe.streams {
            let track_type = stream
                .codec_type
                .as_deref()
                .map(TrackType::from_ffprobe)
                .unwrap_or(TrackType::Other);

            let mut track = Track::new(tracks.len(), track_type);
            track.format = non_empty(stream.codec_name);
            track.width = stream.width.map(|w| w.to_string());
            track.height = stream.height.map(|h| h.to_string());
            track.bit_rate = non_empty(stream.bit_rate);
            track.language = non_empty(stream.tags.get("language").cloned());
            track.title = non_empty(stream.tags.get("title").cloned());
            // Untagged streams report "[0][0][0][0]".
            track.codec_id = non_empty(stream.codec_tag_string).filter(|c| !c.starts_with('['));
            tracks.push(track);
        }

        Ok(tracks)
    }
}

#[async_trait]
impl TrackProber for FfprobeCli {
    fn name(&self) -> &str {
        "ffprobe"
    }

    async fn probe(&self, path: &Path) -> Result<Vec<Track>, ProbeError> {
        debug!("Probing {:?} with ffprobe", path);
        let stdout = run_tool(
            "ffprobe",
            &self.program,
            &[
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ],
            path,
            self.timeout_secs,
        )
        .await?;
        Self::parse_output(&String::from_utf8_lossy(&stdout))
    }
}
