pub mod aggregate;
pub mod config;
pub mod features;
pub mod library;
pub mod metrics;
pub mod probe;
pub mod query;
pub mod recompute;
pub mod settings;
pub mod stats;
pub mod testing;

pub use aggregate::{aggregate, sorted_buckets};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    ServerConfig, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH,
};
pub use features::{FeatureExtractor, FeatureField, FeatureRecord, UNKNOWN};
pub use library::{LibraryError, LibrarySource, NewTitle, SqliteLibrary, TitleRecord, VideoMedia};
pub use probe::{ProbeAdapter, ProbeConfig, ProbeError, Track, TrackProber, TrackType};
pub use query::{QueryError, StatsQuery};
pub use recompute::{
    CancelToken, RecomputeConfig, RecomputeError, RecomputeEvent, RecomputeFailure,
    RecomputeProgress, RecomputeStage, RecomputeSummary, StatsRecomputer,
};
pub use settings::{SettingsError, SettingsStore, SqliteSettings, LAST_RECOMPUTE_KEY};
pub use stats::{
    BucketTally, Scope, SqliteStatsCache, StatBucket, StatCategory, StatKey, StatMetric,
    StatsCache, StatsCacheError,
};
