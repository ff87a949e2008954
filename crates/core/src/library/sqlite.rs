//! SQLite reader over the `titles` and `media` tables.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{params, Connection};
use tracing::warn;

use super::{LibraryError, LibrarySource, NewTitle, TitleRecord, VideoMedia};

const VIDEO_MEDIA_TYPE: &str = "video";

/// SQLite-backed catalog.
pub struct SqliteLibrary {
    conn: Mutex<Connection>,
}

impl SqliteLibrary {
    /// Open a catalog database, creating the tables if they don't exist.
    pub fn new(path: &Path) -> Result<Self, LibraryError> {
        let conn = Connection::open(path).map_err(|e| LibraryError::Database(e.to_string()))?;
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(|e| LibraryError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory catalog (useful for testing).
    pub fn in_memory() -> Result<Self, LibraryError> {
        let conn =
            Connection::open_in_memory().map_err(|e| LibraryError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), LibraryError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS titles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                main_title TEXT NOT NULL,
                year_start INTEGER,
                created_at TEXT DEFAULT '',
                status_json TEXT DEFAULT '{}',
                tags TEXT DEFAULT ''
            );

            CREATE TABLE IF NOT EXISTS media (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title_id INTEGER NOT NULL,
                media_type TEXT NOT NULL,
                path TEXT NOT NULL,
                sort_order INTEGER DEFAULT 0,
                FOREIGN KEY(title_id) REFERENCES titles(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_media_title ON media(title_id);
            "#,
        )
        .map_err(|e| LibraryError::Database(e.to_string()))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, LibraryError> {
        self.conn
            .lock()
            .map_err(|_| LibraryError::Database("connection lock poisoned".to_string()))
    }

    /// Insert a title, returning its id.
    pub fn insert_title(&self, title: &NewTitle) -> Result<i64, LibraryError> {
        let conn = self.lock()?;
        let status_json = serde_json::to_string(&title.statuses)
            .map_err(|e| LibraryError::Database(e.to_string()))?;
        conn.execute(
            "INSERT INTO titles (main_title, year_start, created_at, status_json, tags)
             VALUES (?, ?, ?, ?, ?)",
            params![
                title.main_title,
                title.year_start,
                title.created_at,
                status_json,
                title.tags
            ],
        )
        .map_err(|e| LibraryError::Database(e.to_string()))?;
        Ok(conn.last_insert_rowid())
    }

    /// Attach a video file to a title, returning the media id.
    pub fn insert_video(
        &self,
        title_id: i64,
        path: impl AsRef<Path>,
        sort_order: i64,
    ) -> Result<i64, LibraryError> {
        let conn = self.lock()?;
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM titles WHERE id = ?)",
                params![title_id],
                |row| row.get(0),
            )
            .map_err(|e| LibraryError::Database(e.to_string()))?;
        if !exists {
            return Err(LibraryError::NotFound(format!("title {}", title_id)));
        }

        conn.execute(
            "INSERT INTO media (title_id, media_type, path, sort_order) VALUES (?, ?, ?, ?)",
            params![
                title_id,
                VIDEO_MEDIA_TYPE,
                path.as_ref().to_string_lossy().into_owned(),
                sort_order
            ],
        )
        .map_err(|e| LibraryError::Database(e.to_string()))?;
        Ok(conn.last_insert_rowid())
    }
}

/// Parse a stored status map. Non-boolean values count as false.
fn parse_statuses(title_id: i64, raw: &str) -> BTreeMap<String, bool> {
    if raw.trim().is_empty() {
        return BTreeMap::new();
    }
    match serde_json::from_str::<BTreeMap<String, serde_json::Value>>(raw) {
        Ok(map) => map
            .into_iter()
            .map(|(name, value)| {
                let flag = value.as_bool().unwrap_or(false);
                (name, flag)
            })
            .collect(),
        Err(e) => {
            warn!("Malformed status_json for title {}: {}", title_id, e);
            BTreeMap::new()
        }
    }
}

impl LibrarySource for SqliteLibrary {
    fn list_titles(&self) -> Result<Vec<TitleRecord>, LibraryError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, created_at, year_start, tags, status_json FROM titles ORDER BY id",
            )
            .map_err(|e| LibraryError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                ))
            })
            .map_err(|e| LibraryError::Database(e.to_string()))?;

        let mut titles = Vec::new();
        for row in rows {
            let (id, created_at, year_start, tags, status_json) =
                row.map_err(|e| LibraryError::Database(e.to_string()))?;
            titles.push(TitleRecord {
                id,
                created_at: created_at.unwrap_or_default(),
                year_start,
                tags: tags.unwrap_or_default(),
                statuses: parse_statuses(id, status_json.as_deref().unwrap_or("")),
            });
        }
        Ok(titles)
    }

    fn list_videos(&self) -> Result<Vec<VideoMedia>, LibraryError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, title_id, path, COALESCE(sort_order, 0) FROM media
                 WHERE media_type = ?
                 ORDER BY title_id, sort_order, id",
            )
            .map_err(|e| LibraryError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![VIDEO_MEDIA_TYPE], |row| {
                Ok(VideoMedia {
                    id: row.get(0)?,
                    title_id: row.get(1)?,
                    path: PathBuf::from(row.get::<_, String>(2)?),
                    sort_order: row.get(3)?,
                })
            })
            .map_err(|e| LibraryError::Database(e.to_string()))?;

        let mut videos = Vec::new();
        for row in rows {
            videos.push(row.map_err(|e| LibraryError::Database(e.to_string()))?);
        }
        Ok(videos)
    }
}
