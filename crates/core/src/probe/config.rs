//! Configuration for the probe module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A probe backend that can be listed in `probe.backends`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeBackendKind {
    /// In-process libav (needs the `libav` cargo feature).
    Libav,
    Mediainfo,
    Ffprobe,
}

/// Configuration for technical metadata probing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Backends in the order they are tried.
    #[serde(default = "default_backends")]
    pub backends: Vec<ProbeBackendKind>,

    /// Path to the mediainfo binary.
    #[serde(default = "default_mediainfo_path")]
    pub mediainfo_path: PathBuf,

    /// Path to the ffprobe binary.
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,

    /// Timeout for a single external probe in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_backends() -> Vec<ProbeBackendKind> {
    if cfg!(feature = "libav") {
        vec![
            ProbeBackendKind::Libav,
            ProbeBackendKind::Mediainfo,
            ProbeBackendKind::Ffprobe,
        ]
    } else {
        vec![ProbeBackendKind::Mediainfo, ProbeBackendKind::Ffprobe]
    }
}

fn default_mediainfo_path() -> PathBuf {
    PathBuf::from("mediainfo")
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_timeout() -> u64 {
    60
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            backends: default_backends(),
            mediainfo_path: default_mediainfo_path(),
            ffprobe_path: default_ffprobe_path(),
            timeout_secs: default_timeout(),
        }
    }
}

impl ProbeConfig {
    /// Sets the backend order.
    pub fn with_backends(mut self, backends: Vec<ProbeBackendKind>) -> Self {
        self.backends = backends;
        self
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProbeConfig::default();
        assert_eq!(config.mediainfo_path, PathBuf::from("mediainfo"));
        assert_eq!(config.ffprobe_path, PathBuf::from("ffprobe"));
        assert_eq!(config.timeout_secs, 60);
        assert!(config.backends.contains(&ProbeBackendKind::Mediainfo));
        assert_eq!(config.backends.last(), Some(&ProbeBackendKind::Ffprobe));
    }

    #[test]
    fn test_deserialize_backend_order() {
        let toml = r#"
            backends = ["ffprobe", "mediainfo"]
            timeout_secs = 5
        "#;
        let config: ProbeConfig = toml::from_str(toml).unwrap();
        assert_eq!(
            config.backends,
            vec![ProbeBackendKind::Ffprobe, ProbeBackendKind::Mediainfo]
        );
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.ffprobe_path, PathBuf::from("ffprobe"));
    }
}
