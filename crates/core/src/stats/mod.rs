//! Statistics cache - persisted bucket counts per (category, metric, scope).
//!
//! Partitions are only ever replaced whole. Readers see either the old or the
//! new contents of a partition, but different partitions may come from
//! different recompute passes.

mod sqlite;
mod types;

pub use sqlite::SqliteStatsCache;
pub use types::*;

/// Trait for statistics cache storage.
pub trait StatsCache: Send + Sync {
    /// Replace a partition with `data`.
    ///
    /// Deletes every row of the partition and inserts one row per bucket with
    /// a non-zero count, atomically for this partition only.
    fn replace(&self, key: &StatKey, data: &BucketTally) -> Result<(), StatsCacheError>;

    /// Get the contents of a partition. Empty if never computed.
    fn get(&self, key: &StatKey) -> Result<BucketTally, StatsCacheError>;

    /// Drop every row of every partition.
    fn clear_all(&self) -> Result<(), StatsCacheError>;

    /// Keys of the partitions that currently hold rows.
    fn partitions(&self) -> Result<Vec<StatKey>, StatsCacheError>;
}
