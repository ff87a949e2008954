//! SQLite-backed statistics cache.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{params, Connection};

use super::{BucketTally, Scope, StatKey, StatsCache, StatsCacheError};

/// SQLite-backed statistics cache over the `stats_cache` table.
pub struct SqliteStatsCache {
    conn: Mutex<Connection>,
}

impl SqliteStatsCache {
    /// Open (or create) the cache in a database file.
    pub fn new(path: &Path) -> Result<Self, StatsCacheError> {
        let conn = Connection::open(path).map_err(|e| StatsCacheError::Database(e.to_string()))?;
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(|e| StatsCacheError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory cache (useful for testing).
    pub fn in_memory() -> Result<Self, StatsCacheError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StatsCacheError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StatsCacheError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS stats_cache (
                category TEXT NOT NULL,
                metric TEXT NOT NULL,
                all_files INTEGER NOT NULL,
                bucket TEXT NOT NULL,
                value INTEGER NOT NULL,
                PRIMARY KEY (category, metric, all_files, bucket)
            );
            "#,
        )
        .map_err(|e| StatsCacheError::Database(e.to_string()))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StatsCacheError> {
        self.conn
            .lock()
            .map_err(|_| StatsCacheError::Database("connection lock poisoned".to_string()))
    }
}

impl StatsCache for SqliteStatsCache {
    fn replace(&self, key: &StatKey, data: &BucketTally) -> Result<(), StatsCacheError> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| StatsCacheError::Database(e.to_string()))?;

        let category = key.category().as_str();
        let metric = key.metric().as_str();
        let all_files = key.scope().is_all_files();

        tx.execute(
            "DELETE FROM stats_cache WHERE category = ? AND metric = ? AND all_files = ?",
            params![category, metric, all_files],
        )
        .map_err(|e| StatsCacheError::Database(e.to_string()))?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO stats_cache (category, metric, all_files, bucket, value)
                     VALUES (?, ?, ?, ?, ?)",
                )
                .map_err(|e| StatsCacheError::Database(e.to_string()))?;

            for (bucket, &count) in data {
                if count == 0 {
                    continue;
                }
                let value = i64::try_from(count)
                    .map_err(|_| StatsCacheError::Database(format!("count overflow: {}", count)))?;
                stmt.execute(params![category, metric, all_files, bucket, value])
                    .map_err(|e| StatsCacheError::Database(e.to_string()))?;
            }
        }

        tx.commit()
            .map_err(|e| StatsCacheError::Database(e.to_string()))?;

        Ok(())
    }

    fn get(&self, key: &StatKey) -> Result<BucketTally, StatsCacheError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT bucket, value FROM stats_cache
                 WHERE category = ? AND metric = ? AND all_files = ?",
            )
            .map_err(|e| StatsCacheError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(
                params![
                    key.category().as_str(),
                    key.metric().as_str(),
                    key.scope().is_all_files()
                ],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )
            .map_err(|e| StatsCacheError::Database(e.to_string()))?;

        let mut tally = BucketTally::new();
        for row in rows {
            let (bucket, value) = row.map_err(|e| StatsCacheError::Database(e.to_string()))?;
            if value > 0 {
                tally.insert(bucket, value as u64);
            }
        }
        Ok(tally)
    }

    fn clear_all(&self) -> Result<(), StatsCacheError> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM stats_cache", [])
            .map_err(|e| StatsCacheError::Database(e.to_string()))?;
        Ok(())
    }

    fn partitions(&self) -> Result<Vec<StatKey>, StatsCacheError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT DISTINCT category, metric, all_files FROM stats_cache
                 ORDER BY category, metric, all_files",
            )
            .map_err(|e| StatsCacheError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, bool>(2)?,
                ))
            })
            .map_err(|e| StatsCacheError::Database(e.to_string()))?;

        let mut keys = Vec::new();
        for row in rows {
            let (category, metric, all_files) =
                row.map_err(|e| StatsCacheError::Database(e.to_string()))?;
            let key = StatKey::new(
                category.parse()?,
                metric.parse()?,
                Scope::from_all_files(all_files),
            )?;
            keys.push(key);
        }
        Ok(keys)
    }
}
