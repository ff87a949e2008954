use crate::features::FeatureField;

/// Chooses one value among candidates with an equal tally.
///
/// Candidates arrive in first-seen order.
pub type TieBreak = for<'a> fn(&[&'a str]) -> Option<&'a str>;

/// Tie-break strategy per field.
pub fn tie_break_for(field: FeatureField) -> TieBreak {
    match field {
        FeatureField::Resolution => largest_pixel_area,
        FeatureField::VideoCodec
        | FeatureField::Container
        | FeatureField::AudioCodec
        | FeatureField::AudioTrackCount => first_seen,
    }
}

/// The earliest candidate.
pub fn first_seen<'a>(candidates: &[&'a str]) -> Option<&'a str> {
    candidates.first().copied()
}

/// The candidate with the largest `width * height`; first seen on equal area.
pub fn largest_pixel_area<'a>(candidates: &[&'a str]) -> Option<&'a str> {
    let mut best: Option<(&'a str, i64)> = None;
    for &candidate in candidates {
        let score = pixel_area(candidate);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((candidate, score)),
        }
    }
    best.map(|(candidate, _)| candidate)
}

/// Pixel count of a `"WxH"` string, or -1 if it doesn't parse.
pub fn pixel_area(resolution: &str) -> i64 {
    resolution
        .split_once('x')
        .and_then(|(w, h)| {
            let w: i64 = w.trim().parse().ok()?;
            let h: i64 = h.trim().parse().ok()?;
            w.checked_mul(h)
        })
        .unwrap_or(-1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_area() {
        assert_eq!(pixel_area("1920x1080"), 2_073_600);
        assert_eq!(pixel_area("Unknown"), -1);
        assert_eq!(pixel_area("1920x"), -1);
        assert_eq!(pixel_area("axb"), -1);
    }

    #[test]
    fn test_largest_pixel_area() {
        assert_eq!(
            largest_pixel_area(&["1280x720", "1920x1080"]),
            Some("1920x1080")
        );
        assert_eq!(largest_pixel_area(&["Unknown", "720x576"]), Some("720x576"));
        assert_eq!(largest_pixel_area(&["Unknown", "garbage"]), Some("Unknown"));
        assert_eq!(largest_pixel_area(&[]), None);
    }

    #[test]
    fn test_equal_area_keeps_first() {
        assert_eq!(
            largest_pixel_area(&["1080x1920", "1920x1080"]),
            Some("1080x1920")
        );
    }

    #[test]
    fn test_strategy_table() {
        let tie = tie_break_for(FeatureField::Resolution);
        assert_eq!(tie(&["640x480", "1280x720"]), Some("1280x720"));
        let tie = tie_break_for(FeatureField::AudioCodec);
        assert_eq!(tie(&["AAC", "DTS"]), Some("AAC"));
    }
}
