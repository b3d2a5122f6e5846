use crate::domain::model::ContentItem;
use crate::domain::recommendation::RecommendationScore;
use crate::engine::rank::rank;
use chrono::{DateTime, Utc};

pub const REASON: &str = "trending item";

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

pub fn age_hours(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - created_at).num_milliseconds() as f64 / MILLIS_PER_HOUR
}

pub fn decay(age_hours: f64, window_hours: f64) -> f64 {
    (-age_hours / window_hours).exp()
}

/// Ranks items created strictly within the last `window_hours` by
/// time-decayed engagement. `window_hours` must be finite and > 0.
pub fn trending(
    items: &[ContentItem],
    window_hours: f64,
    limit: usize,
    now: DateTime<Utc>,
) -> Vec<RecommendationScore> {
    let scored = items
        .iter()
        .filter_map(|item| {
            let age = age_hours(item.created_at, now);
            if age >= window_hours {
                return None;
            }
            // Future-dated items are treated as brand new.
            let age = age.max(0.0);
            Some(RecommendationScore::new(
                item.id.clone(),
                item.engagement() * decay(age, window_hours),
                REASON,
            ))
        })
        .collect();

    rank(scored, limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Category;
    use chrono::{Duration, TimeZone};
    use std::collections::BTreeSet;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 27, 12, 0, 0).unwrap()
    }

    fn item(id: &str, age: Duration, views: u64, likes: u64) -> ContentItem {
        ContentItem {
            id: id.to_string(),
            category: Category::Stock,
            tags: BTreeSet::new(),
            view_count: views,
            like_count: likes,
            created_at: now() - age,
        }
    }

    #[test]
    fn fresh_item_scores_raw_engagement() {
        let out = trending(&[item("p1", Duration::zero(), 10, 5)], 24.0, 10, now());
        assert_eq!(out.len(), 1);
        assert!((out[0].score - 20.0).abs() < 1e-12);
        assert_eq!(out[0].reason, REASON);
    }

    #[test]
    fn window_is_strict() {
        let items = vec![
            item("old", Duration::hours(25), 1_000, 0),
            item("edge", Duration::hours(24), 1_000, 0),
            item("new", Duration::hours(1), 1, 0),
        ];
        let out = trending(&items, 24.0, 10, now());
        let ids: Vec<&str> = out.iter().map(|s| s.item_id.as_str()).collect();
        assert_eq!(ids, vec!["new"]);
    }

    #[test]
    fn decays_exponentially_with_age() {
        let out = trending(&[item("p1", Duration::hours(12), 100, 0)], 24.0, 10, now());
        assert!((out[0].score - 100.0 * (-0.5f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn newer_item_outranks_older_with_same_engagement() {
        let items = vec![
            item("older", Duration::hours(10), 50, 10),
            item("newer", Duration::hours(2), 50, 10),
        ];
        let out = trending(&items, 24.0, 10, now());
        assert_eq!(out[0].item_id, "newer");
    }

    #[test]
    fn future_items_do_not_get_boosted() {
        let out = trending(&[item("p1", Duration::hours(-3), 10, 0)], 24.0, 10, now());
        assert!((out[0].score - 10.0).abs() < 1e-12);
    }

    #[test]
    fn empty_inputs_yield_empty_output() {
        assert!(trending(&[], 24.0, 10, now()).is_empty());
        let stale = vec![item("p1", Duration::days(3), 10, 0)];
        assert!(trending(&stale, 24.0, 10, now()).is_empty());
    }

    #[test]
    fn repeated_runs_are_identical() {
        let items = vec![
            item("p3", Duration::hours(5), 20, 2),
            item("p1", Duration::hours(5), 20, 2),
            item("p2", Duration::hours(1), 8, 1),
            item("p4", Duration::hours(30), 90, 9),
        ];
        let first = trending(&items, 24.0, 10, now());
        let second = trending(&items, 24.0, 10, now());
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        let ids: Vec<&str> = first.iter().map(|s| s.item_id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p3", "p2"]);
    }
}
