use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::probe::ProbeConfig;
use crate::recompute::RecomputeConfig;

/// Root configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub recompute: RecomputeConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
///
/// One SQLite file holds the catalog tables, settings and the stats cache.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("hsorter.db")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeBackendKind;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.path, PathBuf::from("hsorter.db"));
        assert_eq!(config.probe.timeout_secs, 60);
        assert_eq!(config.recompute.progress_buffer, 64);
    }

    #[test]
    fn test_deserialize_sections() {
        let toml = r#"
[database]
path = "/var/lib/hsorter/library.db"

[probe]
backends = ["ffprobe"]
ffprobe_path = "/usr/local/bin/ffprobe"
timeout_secs = 15

[recompute]
run_on_startup = true
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.database.path, PathBuf::from("/var/lib/hsorter/library.db"));
        assert_eq!(config.probe.backends, vec![ProbeBackendKind::Ffprobe]);
        assert_eq!(config.probe.ffprobe_path, PathBuf::from("/usr/local/bin/ffprobe"));
        assert_eq!(config.probe.timeout_secs, 15);
        assert!(config.recompute.run_on_startup);
        assert_eq!(config.server.port, 8080);
    }
}
