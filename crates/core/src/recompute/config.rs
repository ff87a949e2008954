//! Recompute configuration.

use serde::{Deserialize, Serialize};

/// Configuration for recompute passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecomputeConfig {
    /// Capacity of the progress event channel.
    /// A full channel pauses the pass until the receiver catches up.
    #[serde(default = "default_progress_buffer")]
    pub progress_buffer: usize,

    /// Start a pass when the server boots.
    #[serde(default)]
    pub run_on_startup: bool,
}

fn default_progress_buffer() -> usize {
    64
}

impl Default for RecomputeConfig {
    fn default() -> Self {
        Self {
            progress_buffer: default_progress_buffer(),
            run_on_startup: false,
        }
    }
}
