//! Probe adapter for technical media metadata.
//!
//! This module provides the `TrackProber` trait, a set of backends that read the
//! track layout of a media file, and the `ProbeAdapter` that chains them.
//!
//! # Backends
//!
//! - `libav` (cargo feature `libav`): in-process probing through FFmpeg's libraries
//! - `mediainfo`: the `mediainfo --Output=JSON` command-line tool
//! - `ffprobe`: the `ffprobe` command-line tool, JSON output
//!
//! The adapter never fails. Missing tools and unreadable output degrade to an
//! empty track list.
//!
//! # Example
//!
//! ```ignore
//! use hsorter_core::probe::{ProbeAdapter, ProbeConfig};
//!
//! let adapter = ProbeAdapter::from_config(&ProbeConfig::default());
//! let tracks = adapter.probe(Path::new("/library/show/episode01.mkv")).await;
//! for track in &tracks {
//!     println!("{:?}: {:?}", track.track_type, track.format);
//! }
//! ```

mod adapter;
mod config;
mod error;
mod ffprobe;
#[cfg(feature = "libav")]
mod libav;
mod mediainfo;
mod process;
mod traits;
mod types;

pub use adapter::ProbeAdapter;
pub use config::{ProbeBackendKind, ProbeConfig};
pub use error::ProbeError;
pub use ffprobe::FfprobeCli;
#[cfg(feature = "libav")]
pub use libav::LibavProber;
pub use mediainfo::MediainfoCli;
pub use traits::TrackProber;
pub use types::{Track, TrackList, TrackType};
