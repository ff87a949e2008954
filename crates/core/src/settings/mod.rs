//! Process-wide key/value settings.

mod sqlite;

pub use sqlite::SqliteSettings;

/// Settings key holding the completion time of the last successful recompute.
pub const LAST_RECOMPUTE_KEY: &str = "stats_last_recompute";

/// Key/value settings storage.
pub trait SettingsStore: Send + Sync {
    fn get_setting(&self, key: &str) -> Result<Option<String>, SettingsError>;

    /// Insert or overwrite a setting.
    fn set_setting(&self, key: &str, value: &str) -> Result<(), SettingsError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Database error: {0}")]
    Database(String),
}
