//! Error types for the probe module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors a single probe backend can produce.
///
/// These never leave the `ProbeAdapter`; they are logged and turned into an
/// empty track list.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The external tool could not be started because it is not installed.
    #[error("{tool} not found at path: {path}")]
    ToolNotFound { tool: String, path: PathBuf },

    /// The external tool ran but reported failure.
    #[error("{tool} exited with code {code:?}: {stderr}")]
    ToolFailed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The external tool did not finish in time.
    #[error("{tool} timed out after {timeout_secs} seconds")]
    Timeout { tool: String, timeout_secs: u64 },

    /// The tool output could not be parsed.
    #[error("Failed to parse probe output: {reason}")]
    ParseError { reason: String },

    /// The path cannot be probed (directory, unsupported backend, ...).
    #[error("Unsupported probe target: {reason}")]
    Unsupported { reason: String },

    /// In-process library failure.
    #[error("libav error: {0}")]
    Libav(String),

    /// I/O error while running a probe.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProbeError {
    /// Creates a new parse error.
    pub fn parse(reason: impl Into<String>) -> Self {
        Self::ParseError {
            reason: reason.into(),
        }
    }

    /// Whether the error means the backend itself is unusable (as opposed to this file).
    pub fn is_backend_unavailable(&self) -> bool {
        matches!(self, Self::ToolNotFound { .. })
    }
}
