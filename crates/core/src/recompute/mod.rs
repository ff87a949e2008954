//! Statistics recompute pass.
//!
//! Rebuilds every cache partition from the catalog in seven stages:
//! - **Catalog**: titles by year, tags, statuses (one unit each)
//! - **Probe**: feature extraction for every video file (one unit per file)
//! - **Aggregates**: video and audio partitions in both scopes (one unit each)
//! - **Finalize**: record the completion time (one unit)
//!
//! Partitions are committed stage by stage. A failed or cancelled pass keeps
//! whatever it already wrote.

mod catalog;
mod config;
mod runner;
mod types;

pub use catalog::{by_year, split_tags, status_counts, tag_counts, title_year};
pub use config::RecomputeConfig;
pub use runner::StatsRecomputer;
pub use types::{
    CancelToken, RecomputeError, RecomputeEvent, RecomputeFailure, RecomputeProgress,
    RecomputeStage, RecomputeSummary, FIXED_STAGE_UNITS,
};
