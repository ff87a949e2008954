//! Read-only access to cached statistics.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::warn;

use crate::aggregate::sorted_buckets;
use crate::settings::{SettingsError, SettingsStore, LAST_RECOMPUTE_KEY};
use crate::stats::{StatBucket, StatKey, StatsCache, StatsCacheError};

#[derive(Debug, Error)]
pub enum QueryError {
    /// Unknown category, metric or scope, or a metric outside its category.
    #[error("invalid statistics key: {0}")]
    InvalidKey(String),

    #[error("stats cache error: {0}")]
    Cache(StatsCacheError),

    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
}

impl From<StatsCacheError> for QueryError {
    fn from(err: StatsCacheError) -> Self {
        match err {
            StatsCacheError::Database(_) => QueryError::Cache(err),
            other => QueryError::InvalidKey(other.to_string()),
        }
    }
}

/// Query façade over the statistics cache. Never triggers a recompute.
#[derive(Clone)]
pub struct StatsQuery {
    cache: Arc<dyn StatsCache>,
    settings: Arc<dyn SettingsStore>,
}

impl StatsQuery {
    pub fn new(cache: Arc<dyn StatsCache>, settings: Arc<dyn SettingsStore>) -> Self {
        Self { cache, settings }
    }

    /// Ordered buckets for a partition named by strings.
    pub fn query(
        &self,
        category: &str,
        metric: &str,
        scope: &str,
    ) -> Result<Vec<StatBucket>, QueryError> {
        let key = StatKey::parse(category, metric, scope)?;
        self.query_key(&key)
    }

    /// Ordered buckets for a partition: count descending, then name.
    pub fn query_key(&self, key: &StatKey) -> Result<Vec<StatBucket>, QueryError> {
        let tally = self.cache.get(key)?;
        Ok(sorted_buckets(&tally))
    }

    /// Completion time of the last successful recompute, if any.
    pub fn last_recompute(&self) -> Result<Option<DateTime<Utc>>, QueryError> {
        let Some(raw) = self.settings.get_setting(LAST_RECOMPUTE_KEY)? else {
            return Ok(None);
        };
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(dt) => Ok(Some(dt.with_timezone(&Utc))),
            Err(e) => {
                warn!("Ignoring malformed {} value {:?}: {}", LAST_RECOMPUTE_KEY, raw, e);
                Ok(None)
            }
        }
    }

    /// Every partition that can be queried.
    pub fn available(&self) -> Vec<StatKey> {
        StatKey::all()
    }

    /// Partitions that currently hold data.
    pub fn computed(&self) -> Result<Vec<StatKey>, QueryError> {
        Ok(self.cache.partitions()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SqliteSettings;
    use crate::stats::{BucketTally, Scope, SqliteStatsCache, StatCategory, StatMetric};

    fn query() -> (StatsQuery, Arc<SqliteStatsCache>, Arc<SqliteSettings>) {
        let cache = Arc::new(SqliteStatsCache::in_memory().unwrap());
        let settings = Arc::new(SqliteSettings::in_memory().unwrap());
        (
            StatsQuery::new(cache.clone(), settings.clone()),
            cache,
            settings,
        )
    }

    #[test]
    fn test_query_orders_buckets() {
        let (query, cache, _) = query();
        let key = StatKey::new(StatCategory::Video, StatMetric::Codec, Scope::AllFiles).unwrap();
        let data: BucketTally = [("HEVC", 1), ("AVC", 3), ("av1", 1)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        cache.replace(&key, &data).unwrap();

        let buckets = query.query("video", "codec", "all_files").unwrap();
        let names: Vec<&str> = buckets.iter().map(|b| b.bucket.as_str()).collect();
        assert_eq!(names, vec!["AVC", "av1", "HEVC"]);
    }

    #[test]
    fn test_query_never_computed_is_empty() {
        let (query, _, _) = query();
        assert!(query.query("audio", "track_count", "per_title").unwrap().is_empty());
    }

    #[test]
    fn test_query_invalid_key() {
        let (query, _, _) = query();
        assert!(matches!(
            query.query("video", "by_year", "per_title"),
            Err(QueryError::InvalidKey(_))
        ));
        assert!(matches!(
            query.query("video", "codec", "sideways"),
            Err(QueryError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_last_recompute() {
        let (query, _, settings) = query();
        assert_eq!(query.last_recompute().unwrap(), None);

        settings
            .set_setting(LAST_RECOMPUTE_KEY, "2026-03-01T10:00:00Z")
            .unwrap();
        let at = query.last_recompute().unwrap().unwrap();
        assert_eq!(at.to_rfc3339(), "2026-03-01T10:00:00+00:00");

        settings.set_setting(LAST_RECOMPUTE_KEY, "yesterday").unwrap();
        assert_eq!(query.last_recompute().unwrap(), None);
    }
}
