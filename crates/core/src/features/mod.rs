//! Feature extraction: reduce a file's tracks to a fixed technical summary.

mod extractor;
mod types;

pub use extractor::FeatureExtractor;
pub use types::{FeatureField, FeatureRecord, UNKNOWN};
