//! Mock catalog for testing.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::library::{LibraryError, LibrarySource, TitleRecord, VideoMedia};

/// In-memory implementation of the LibrarySource trait.
///
/// Videos get sequential ids and a display order following insertion order
/// within their title. Reads can be made to fail for error-path tests.
#[derive(Debug, Clone, Default)]
pub struct MockLibrary {
    titles: Arc<RwLock<Vec<TitleRecord>>>,
    videos: Arc<RwLock<Vec<VideoMedia>>>,
    fail_reads: Arc<AtomicBool>,
}

impl MockLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a title, returning its id.
    pub fn add_title(&self, title: TitleRecord) -> i64 {
        let id = title.id;
        self.titles
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(title);
        id
    }

    /// Attach a video to a title, returning the media id.
    pub fn add_video(&self, title_id: i64, path: impl AsRef<Path>) -> i64 {
        let mut videos = self.videos.write().unwrap_or_else(|e| e.into_inner());
        let id = videos.len() as i64 + 1;
        let sort_order = videos.iter().filter(|v| v.title_id == title_id).count() as i64;
        videos.push(VideoMedia {
            id,
            title_id,
            path: path.as_ref().to_path_buf(),
            sort_order,
        });
        id
    }

    /// Make every subsequent read fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn check_reads(&self) -> Result<(), LibraryError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(LibraryError::Database("mock read failure".to_string()));
        }
        Ok(())
    }
}

impl LibrarySource for MockLibrary {
    fn list_titles(&self) -> Result<Vec<TitleRecord>, LibraryError> {
        self.check_reads()?;
        let mut titles = self
            .titles
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        titles.sort_by_key(|t| t.id);
        Ok(titles)
    }

    fn list_videos(&self) -> Result<Vec<VideoMedia>, LibraryError> {
        self.check_reads()?;
        let mut videos = self
            .videos
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        videos.sort_by_key(|v| (v.title_id, v.sort_order, v.id));
        Ok(videos)
    }
}
