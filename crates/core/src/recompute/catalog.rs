//! Catalog-derived statistics: years, tags, statuses.

use crate::aggregate::count_values;
use crate::features::UNKNOWN;
use crate::library::TitleRecord;
use crate::stats::BucketTally;

/// Year bucket for a title.
///
/// The leading four digits of the creation timestamp, else the declared
/// start year, else [`UNKNOWN`].
pub fn title_year(title: &TitleRecord) -> String {
    let prefix = title.created_at.trim().get(..4);
    if let Some(year) = prefix.filter(|p| p.bytes().all(|b| b.is_ascii_digit())) {
        return year.to_string();
    }
    match title.year_start {
        Some(year) if year > 0 => year.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

pub fn by_year(titles: &[TitleRecord]) -> BucketTally {
    let years: Vec<String> = titles.iter().map(title_year).collect();
    count_values(years.iter().map(String::as_str))
}

/// Split a tag string on `,` and `;`, trimmed, without empties or repeats.
pub fn split_tags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.split([',', ';']).map(str::trim) {
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// Number of titles carrying each tag.
pub fn tag_counts(titles: &[TitleRecord]) -> BucketTally {
    let tags: Vec<String> = titles.iter().flat_map(|t| split_tags(&t.tags)).collect();
    count_values(tags.iter().map(String::as_str))
}

/// Number of titles with each status flag set.
pub fn status_counts(titles: &[TitleRecord]) -> BucketTally {
    count_values(titles.iter().flat_map(|t| {
        t.statuses
            .iter()
            .filter(|(_, set)| **set)
            .map(|(name, _)| name.as_str())
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn title(id: i64, created_at: &str, year_start: Option<i64>, tags: &str) -> TitleRecord {
        TitleRecord {
            id,
            created_at: created_at.to_string(),
            year_start,
            tags: tags.to_string(),
            statuses: BTreeMap::new(),
        }
    }

    #[test]
    fn test_title_year_fallbacks() {
        assert_eq!(title_year(&title(1, "2019-05-01 12:00:00", Some(1998), "")), "2019");
        assert_eq!(title_year(&title(2, "", Some(1998), "")), "1998");
        assert_eq!(title_year(&title(3, "n/a", Some(0), "")), UNKNOWN);
        assert_eq!(title_year(&title(4, "", None, "")), UNKNOWN);
        assert_eq!(title_year(&title(5, "20", None, "")), UNKNOWN);
    }

    #[test]
    fn test_by_year() {
        let titles = vec![
            title(1, "2020-01-01", None, ""),
            title(2, "2020-06-01", None, ""),
            title(3, "", Some(2001), ""),
        ];
        let tally = by_year(&titles);
        assert_eq!(tally["2020"], 2);
        assert_eq!(tally["2001"], 1);
    }

    #[test]
    fn test_split_tags() {
        assert_eq!(
            split_tags(" mecha, space ;; drama ,mecha"),
            vec!["mecha", "space", "drama"]
        );
        assert!(split_tags(" ,; ").is_empty());
    }

    #[test]
    fn test_tag_counts_once_per_title() {
        let titles = vec![
            title(1, "", None, "mecha, mecha; space"),
            title(2, "", None, "space"),
        ];
        let tally = tag_counts(&titles);
        assert_eq!(tally["mecha"], 1);
        assert_eq!(tally["space"], 2);
    }

    #[test]
    fn test_status_counts_only_true_flags() {
        let mut a = title(1, "", None, "");
        a.statuses.insert("полный".to_string(), true);
        a.statuses.insert("хардсаб".to_string(), false);
        let mut b = title(2, "", None, "");
        b.statuses.insert("полный".to_string(), true);

        let tally = status_counts(&[a, b]);
        assert_eq!(tally["полный"], 2);
        assert!(!tally.contains_key("хардсаб"));
    }
}
