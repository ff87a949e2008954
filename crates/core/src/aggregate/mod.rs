//! Aggregation of feature records into bucket counts.
//!
//! Two scopes are supported:
//! - [`Scope::AllFiles`]: every file votes once for its value.
//! - [`Scope::PerTitle`]: each title votes once, for the value most common
//!   among its own files. Ties are settled by the field's [`TieBreak`].
//!
//! Titles without files do not vote.

mod tie_break;

pub use tie_break::{first_seen, largest_pixel_area, pixel_area, tie_break_for, TieBreak};

use std::collections::HashMap;

use crate::features::{FeatureField, FeatureRecord};
use crate::stats::{BucketTally, Scope, StatBucket};

/// Count occurrences of each value.
pub fn count_values<'a>(values: impl IntoIterator<Item = &'a str>) -> BucketTally {
    let mut tally = BucketTally::new();
    for value in values {
        *tally.entry(value.to_string()).or_insert(0) += 1;
    }
    tally
}

/// Aggregate in the given scope.
pub fn aggregate(scope: Scope, field: FeatureField, records: &[(i64, FeatureRecord)]) -> BucketTally {
    match scope {
        Scope::AllFiles => aggregate_all_files(field, records),
        Scope::PerTitle => aggregate_per_title(field, records),
    }
}

/// One vote per file.
pub fn aggregate_all_files(field: FeatureField, records: &[(i64, FeatureRecord)]) -> BucketTally {
    count_values(records.iter().map(|(_, record)| record.value(field)))
}

/// One vote per title, for its representative value.
///
/// `records` must be in file order within each title; that order decides
/// first-seen tie-breaks.
pub fn aggregate_per_title(field: FeatureField, records: &[(i64, FeatureRecord)]) -> BucketTally {
    // title id -> (value, tally) in first-seen order
    let mut groups: HashMap<i64, Vec<(&str, u64)>> = HashMap::new();
    for (title_id, record) in records {
        let values = groups.entry(*title_id).or_default();
        let value = record.value(field);
        match values.iter_mut().find(|(v, _)| *v == value) {
            Some((_, count)) => *count += 1,
            None => values.push((value, 1)),
        }
    }

    let tie_break = tie_break_for(field);
    count_values(
        groups
            .values()
            .filter_map(|values| representative(values, tie_break)),
    )
}

fn representative<'a>(values: &[(&'a str, u64)], tie_break: TieBreak) -> Option<&'a str> {
    let max = values.iter().map(|(_, count)| *count).max()?;
    let tied: Vec<&'a str> = values
        .iter()
        .filter(|(_, count)| *count == max)
        .map(|(value, _)| *value)
        .collect();
    tie_break(&tied)
}

/// Order buckets by count descending, then by name case-insensitively.
pub fn sorted_buckets(tally: &BucketTally) -> Vec<StatBucket> {
    let mut buckets: Vec<StatBucket> = tally
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(bucket, &count)| StatBucket {
            bucket: bucket.clone(),
            count,
        })
        .collect();

    buckets.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.bucket.to_lowercase().cmp(&b.bucket.to_lowercase()))
            .then_with(|| a.bucket.cmp(&b.bucket))
    });
    buckets
}
