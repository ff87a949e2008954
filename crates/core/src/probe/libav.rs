//! In-process libav backend (cargo feature `libav`).

use async_trait::async_trait;
use ffmpeg_next as ffmpeg;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::error::ProbeError;
use super::traits::TrackProber;
use super::types::{non_empty, Track, TrackType};

/// Reads container and stream parameters through FFmpeg's libraries.
#[derive(Debug, Default)]
pub struct LibavProber;

impl LibavProber {
    pub fn new() -> Self {
        Self
    }

    fn probe_blocking(path: PathBuf) -> Result<Vec<Track>, ProbeError> {
        ffmpeg::init().map_err(|e| ProbeError::Libav(e.to_string()))?;

        let input = ffmpeg::format::input(&path).map_err(|e| ProbeError::Libav(e.to_string()))?;

        let mut tracks = Vec::new();

        let mut general = Track::new(0, TrackType::General);
        general.format = non_empty(input.format().name().split(',').next().map(str::to_string));
        if input.bit_rate() > 0 {
            general.bit_rate = Some(input.bit_rate().to_string());
        }
        tracks.push(general);

        for stream in input.streams() {
            let parameters = stream.parameters();
            let track_type = match parameters.medium() {
                ffmpeg::media::Type::Video => TrackType::Video,
                ffmpeg::media::Type::Audio => TrackType::Audio,
                ffmpeg::media::Type::Subtitle => TrackType::Text,
                _ => TrackType::Other,
            };

            let mut track = Track::new(tracks.len(), track_type);
            track.format = non_empty(Some(parameters.id().name().to_string()));
            track.language = non_empty(stream.metadata().get("language").map(str::to_string));
            track.title = non_empty(stream.metadata().get("title").map(str::to_string));

            if track_type == TrackType::Video {
                let video = ffmpeg::codec::context::Context::from_parameters(parameters)
                    .and_then(|ctx| ctx.decoder().video());
                if let Ok(video) = video {
                    if video.width() > 0 && video.height() > 0 {
                        track.width = Some(video.width().to_string());
                        track.height = Some(video.height().to_string());
                    }
                }
            }

            tracks.push(track);
        }

        Ok(tracks)
    }
}

#[async_trait]
impl TrackProber for LibavProber {
    fn name(&self) -> &str {
        "libav"
    }

    async fn probe(&self, path: &Path) -> Result<Vec<Track>, ProbeError> {
        debug!("Probing {:?} with libav", path);
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::probe_blocking(path))
            .await
            .map_err(|e| ProbeError::Libav(format!("probe task failed: {}", e)))?
    }
}
