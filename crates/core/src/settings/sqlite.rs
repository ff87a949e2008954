use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension};

use super::{SettingsError, SettingsStore};

/// SQLite-backed settings over the `settings(key, value)` table.
pub struct SqliteSettings {
    conn: Mutex<Connection>,
}

impl SqliteSettings {
    pub fn new(path: &Path) -> Result<Self, SettingsError> {
        let conn = Connection::open(path).map_err(|e| SettingsError::Database(e.to_string()))?;
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(|e| SettingsError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self, SettingsError> {
        let conn =
            Connection::open_in_memory().map_err(|e| SettingsError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), SettingsError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| SettingsError::Database(e.to_string()))?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SettingsError> {
        self.conn
            .lock()
            .map_err(|_| SettingsError::Database("connection lock poisoned".to_string()))
    }
}

impl SettingsStore for SqliteSettings {
    fn get_setting(&self, key: &str) -> Result<Option<String>, SettingsError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT value FROM settings WHERE key = ?",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| SettingsError::Database(e.to_string()))
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)",
            params![key, value],
        )
        .map_err(|e| SettingsError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_setting() {
        let settings = SqliteSettings::in_memory().unwrap();
        assert_eq!(settings.get_setting("nope").unwrap(), None);
    }

    #[test]
    fn test_set_overwrites() {
        let settings = SqliteSettings::in_memory().unwrap();
        settings.set_setting("theme", "dark").unwrap();
        settings.set_setting("theme", "light").unwrap();
        assert_eq!(
            settings.get_setting("theme").unwrap().as_deref(),
            Some("light")
        );
    }
}
