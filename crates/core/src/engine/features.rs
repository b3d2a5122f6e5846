use crate::domain::model::{Category, ContentItem};

/// Engagement at which the popularity dimension saturates.
pub const POPULARITY_CAP: f64 = 1000.0;

/// One-hot category dimensions plus a trailing popularity dimension.
pub const FEATURE_DIM: usize = Category::ALL.len() + 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_DIM]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn popularity(&self) -> f64 {
        self.0[FEATURE_DIM - 1]
    }
}

/// `popularity_cap` must be finite and > 0; the engine checks this when its
/// config is built.
pub fn extract(item: &ContentItem, popularity_cap: f64) -> FeatureVector {
    let mut v = [0.0; FEATURE_DIM];
    v[item.category.index()] = 1.0;
    v[FEATURE_DIM - 1] = (item.engagement() / popularity_cap).min(1.0);
    FeatureVector(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeSet;

    fn item(category: Category, views: u64, likes: u64) -> ContentItem {
        ContentItem {
            id: "p1".to_string(),
            category,
            tags: BTreeSet::new(),
            view_count: views,
            like_count: likes,
            created_at: Utc.with_ymd_and_hms(2026, 1, 27, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn stock_item_vector_matches_expected_layout() {
        let v = extract(&item(Category::Stock, 100, 50), POPULARITY_CAP);
        assert_eq!(v.as_slice(), &[0.0, 1.0, 0.0, 0.2]);
    }

    #[test]
    fn popularity_saturates_at_one() {
        let v = extract(&item(Category::Free, 5_000, 5_000), POPULARITY_CAP);
        assert_eq!(v.popularity(), 1.0);
        assert_eq!(v.as_slice()[0], 1.0);
    }

    #[test]
    fn cap_is_configurable() {
        let v = extract(&item(Category::Notice, 10, 0), 100.0);
        assert!((v.popularity() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn extraction_is_deterministic() {
        let it = item(Category::Stock, 7, 3);
        assert_eq!(extract(&it, POPULARITY_CAP), extract(&it, POPULARITY_CAP));
    }
}
