//! Catalog data source - titles and their video files.

mod sqlite;
mod types;

pub use sqlite::SqliteLibrary;
pub use types::*;

/// Read access to the title catalog.
pub trait LibrarySource: Send + Sync {
    /// Every title in the catalog, ordered by id.
    fn list_titles(&self) -> Result<Vec<TitleRecord>, LibraryError>;

    /// Every video media item, ordered by title id, then display order, then id.
    fn list_videos(&self) -> Result<Vec<VideoMedia>, LibraryError>;
}
