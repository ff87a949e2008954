use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::features::FeatureField;

/// Bucket name to count, as produced by the aggregator and stored in the cache.
pub type BucketTally = HashMap<String, u64>;

/// Top-level statistics category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatCategory {
    Titles,
    Tags,
    Statuses,
    Video,
    Audio,
}

impl StatCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatCategory::Titles => "titles",
            StatCategory::Tags => "tags",
            StatCategory::Statuses => "statuses",
            StatCategory::Video => "video",
            StatCategory::Audio => "audio",
        }
    }

    /// Whether this category counts titles rather than files.
    pub fn is_catalog(&self) -> bool {
        matches!(
            self,
            StatCategory::Titles | StatCategory::Tags | StatCategory::Statuses
        )
    }
}

impl FromStr for StatCategory {
    type Err = StatsCacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "titles" => Ok(StatCategory::Titles),
            "tags" => Ok(StatCategory::Tags),
            "statuses" => Ok(StatCategory::Statuses),
            "video" => Ok(StatCategory::Video),
            "audio" => Ok(StatCategory::Audio),
            other => Err(StatsCacheError::UnknownCategory(other.to_string())),
        }
    }
}

/// Metric within a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatMetric {
    ByYear,
    All,
    Resolution,
    Codec,
    Container,
    TrackCount,
}

impl StatMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatMetric::ByYear => "by_year",
            StatMetric::All => "all",
            StatMetric::Resolution => "resolution",
            StatMetric::Codec => "codec",
            StatMetric::Container => "container",
            StatMetric::TrackCount => "track_count",
        }
    }
}

impl FromStr for StatMetric {
    type Err = StatsCacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "by_year" => Ok(StatMetric::ByYear),
            "all" => Ok(StatMetric::All),
            "resolution" => Ok(StatMetric::Resolution),
            "codec" => Ok(StatMetric::Codec),
            "container" => Ok(StatMetric::Container),
            "track_count" => Ok(StatMetric::TrackCount),
            other => Err(StatsCacheError::UnknownMetric(other.to_string())),
        }
    }
}

/// Aggregation scope: one vote per file, or one vote per title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    AllFiles,
    PerTitle,
}

impl Scope {
    pub const BOTH: [Scope; 2] = [Scope::AllFiles, Scope::PerTitle];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::AllFiles => "all_files",
            Scope::PerTitle => "per_title",
        }
    }

    /// Value of the `all_files` column.
    pub fn is_all_files(&self) -> bool {
        matches!(self, Scope::AllFiles)
    }

    pub fn from_all_files(all_files: bool) -> Self {
        if all_files {
            Scope::AllFiles
        } else {
            Scope::PerTitle
        }
    }
}

impl FromStr for Scope {
    type Err = StatsCacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all_files" => Ok(Scope::AllFiles),
            "per_title" => Ok(Scope::PerTitle),
            other => Err(StatsCacheError::UnknownScope(other.to_string())),
        }
    }
}

/// Identifies one cache partition.
///
/// Only valid category/metric combinations can be built. Catalog categories
/// always carry [`Scope::PerTitle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StatKey {
    category: StatCategory,
    metric: StatMetric,
    scope: Scope,
}

impl StatKey {
    pub fn new(
        category: StatCategory,
        metric: StatMetric,
        scope: Scope,
    ) -> Result<Self, StatsCacheError> {
        use StatCategory::*;
        use StatMetric::*;

        let valid = matches!(
            (category, metric),
            (Titles, ByYear)
                | (Tags, All)
                | (Statuses, All)
                | (Video, Resolution)
                | (Video, Codec)
                | (Video, Container)
                | (Audio, Codec)
                | (Audio, TrackCount)
        );
        if !valid {
            return Err(StatsCacheError::InvalidKey {
                category: category.as_str().to_string(),
                metric: metric.as_str().to_string(),
            });
        }

        let scope = if category.is_catalog() {
            Scope::PerTitle
        } else {
            scope
        };

        Ok(Self {
            category,
            metric,
            scope,
        })
    }

    /// Parse a key from its string parts.
    pub fn parse(category: &str, metric: &str, scope: &str) -> Result<Self, StatsCacheError> {
        Self::new(category.parse()?, metric.parse()?, scope.parse()?)
    }

    /// Partition for a catalog-derived category.
    pub(crate) fn catalog(category: StatCategory, metric: StatMetric) -> Self {
        Self {
            category,
            metric,
            scope: Scope::PerTitle,
        }
    }

    /// Partition for a file feature in a given scope.
    pub fn for_feature(field: FeatureField, scope: Scope) -> Self {
        let (category, metric) = match field {
            FeatureField::Resolution => (StatCategory::Video, StatMetric::Resolution),
            FeatureField::VideoCodec => (StatCategory::Video, StatMetric::Codec),
            FeatureField::Container => (StatCategory::Video, StatMetric::Container),
            FeatureField::AudioCodec => (StatCategory::Audio, StatMetric::Codec),
            FeatureField::AudioTrackCount => (StatCategory::Audio, StatMetric::TrackCount),
        };
        Self {
            category,
            metric,
            scope,
        }
    }

    /// Every valid partition key.
    pub fn all() -> Vec<StatKey> {
        let mut keys = vec![
            Self::catalog(StatCategory::Titles, StatMetric::ByYear),
            Self::catalog(StatCategory::Tags, StatMetric::All),
            Self::catalog(StatCategory::Statuses, StatMetric::All),
        ];
        for field in FeatureField::ALL {
            for scope in Scope::BOTH {
                keys.push(Self::for_feature(field, scope));
            }
        }
        keys
    }

    pub fn category(&self) -> StatCategory {
        self.category
    }

    pub fn metric(&self) -> StatMetric {
        self.metric
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }
}

impl std::fmt::Display for StatKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.category.as_str(),
            self.metric.as_str(),
            self.scope.as_str()
        )
    }
}

/// One bucket of a partition, as returned to readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBucket {
    pub bucket: String,
    pub count: u64,
}

/// Errors from statistics cache operations.
#[derive(Debug, thiserror::Error)]
pub enum StatsCacheError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Unknown scope: {0}")]
    UnknownScope(String),

    #[error("Metric {metric} does not exist in category {category}")]
    InvalidKey { category: String, metric: String },
}
