//! Types for recompute passes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Progress units contributed by every stage except file probing.
pub const FIXED_STAGE_UNITS: u64 = 6;

/// Stages of a recompute pass, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecomputeStage {
    TitlesByYear,
    Tags,
    Statuses,
    ProbeFiles,
    VideoAggregates,
    AudioAggregates,
    Finalize,
}

impl RecomputeStage {
    /// Human-readable label for progress displays.
    pub fn label(&self) -> &'static str {
        match self {
            RecomputeStage::TitlesByYear => "Counting titles by year",
            RecomputeStage::Tags => "Counting tags",
            RecomputeStage::Statuses => "Counting statuses",
            RecomputeStage::ProbeFiles => "Probing video files",
            RecomputeStage::VideoAggregates => "Aggregating video features",
            RecomputeStage::AudioAggregates => "Aggregating audio features",
            RecomputeStage::Finalize => "Finalizing",
        }
    }
}

/// Snapshot of a running pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecomputeProgress {
    pub run_id: Uuid,
    pub stage: RecomputeStage,
    /// Units finished so far. Never decreases within a pass.
    pub done: u64,
    /// `FIXED_STAGE_UNITS` plus the number of video files.
    pub total: u64,
    /// Extra context, e.g. the file just probed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl RecomputeProgress {
    /// Completed fraction in `0.0..=1.0`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.done as f64 / self.total as f64
        }
    }
}

/// Result of a successful pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecomputeSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub titles: usize,
    pub titles_with_video: usize,
    pub files: usize,
    pub partitions_written: usize,
}

/// Events emitted by a pass: any number of `Progress`, then one terminal event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecomputeEvent {
    Progress(RecomputeProgress),
    Completed(RecomputeSummary),
    Failed {
        run_id: Uuid,
        /// `None` when the catalog could not be read.
        stage: Option<RecomputeStage>,
        done: u64,
        total: u64,
        error: String,
    },
}

impl RecomputeEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RecomputeEvent::Progress(_))
    }
}

/// Errors that stop a pass.
#[derive(Debug, Error)]
pub enum RecomputeError {
    #[error("catalog error: {0}")]
    Library(#[from] crate::library::LibraryError),

    #[error("stats cache error: {0}")]
    Cache(#[from] crate::stats::StatsCacheError),

    #[error("settings error: {0}")]
    Settings(#[from] crate::settings::SettingsError),

    #[error("recompute cancelled")]
    Cancelled,
}

/// A failed pass, with progress frozen where it stopped.
#[derive(Debug, Error)]
#[error("recompute {run_id} failed at {done}/{total}: {error}")]
pub struct RecomputeFailure {
    pub run_id: Uuid,
    pub stage: Option<RecomputeStage>,
    pub done: u64,
    pub total: u64,
    #[source]
    pub error: RecomputeError,
}

impl RecomputeFailure {
    pub fn is_cancelled(&self) -> bool {
        matches!(self.error, RecomputeError::Cancelled)
    }

    pub fn to_event(&self) -> RecomputeEvent {
        RecomputeEvent::Failed {
            run_id: self.run_id,
            stage: self.stage,
            done: self.done,
            total: self.total,
            error: self.error.to_string(),
        }
    }
}

/// Cooperative cancellation flag shared between a pass and its controller.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. The pass stops before its next unit.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
