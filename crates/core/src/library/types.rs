use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A catalog title, reduced to the fields statistics need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleRecord {
    pub id: i64,
    /// Creation timestamp as stored, usually `YYYY-MM-DD HH:MM:SS`.
    pub created_at: String,
    /// Declared start year, if any.
    pub year_start: Option<i64>,
    /// Raw tag string, separated by `,` or `;`.
    pub tags: String,
    /// Status name to flag.
    pub statuses: BTreeMap<String, bool>,
}

/// A video file attached to a title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMedia {
    pub id: i64,
    pub title_id: i64,
    pub path: PathBuf,
    pub sort_order: i64,
}

/// A title to insert into the catalog.
#[derive(Debug, Clone, Default)]
pub struct NewTitle {
    pub main_title: String,
    pub created_at: String,
    pub year_start: Option<i64>,
    pub tags: String,
    pub statuses: BTreeMap<String, bool>,
}

impl NewTitle {
    pub fn new(main_title: impl Into<String>) -> Self {
        Self {
            main_title: main_title.into(),
            ..Default::default()
        }
    }

    pub fn created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = created_at.into();
        self
    }

    pub fn year_start(mut self, year: i64) -> Self {
        self.year_start = Some(year);
        self
    }

    pub fn tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }

    pub fn status(mut self, name: impl Into<String>, value: bool) -> Self {
        self.statuses.insert(name.into(), value);
        self
    }
}

/// Errors from catalog reads.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),
}
