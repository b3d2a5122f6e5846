use crate::domain::recommendation::RecommendationScore;

/// Score descending, then item id ascending, so equal scores always come
/// out in the same order.
pub fn sort_scores(scores: &mut [RecommendationScore]) {
    scores.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
}

pub fn rank(mut scores: Vec<RecommendationScore>, limit: usize) -> Vec<RecommendationScore> {
    sort_scores(&mut scores);
    scores.truncate(limit);
    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_break_on_item_id() {
        let out = rank(
            vec![
                RecommendationScore::new("p3", 1.0, "x"),
                RecommendationScore::new("p1", 1.0, "x"),
                RecommendationScore::new("p2", 2.0, "x"),
            ],
            10,
        );
        let ids: Vec<&str> = out.iter().map(|s| s.item_id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p1", "p3"]);
    }

    #[test]
    fn nan_scores_do_not_break_ordering() {
        let scores: Vec<RecommendationScore> = (0..64)
            .map(|i| {
                let score = if i % 3 == 0 { f64::NAN } else { i as f64 };
                RecommendationScore::new(format!("p{i:02}"), score, "x")
            })
            .collect();
        let mut reversed = scores.clone();
        reversed.reverse();

        let out = rank(scores, 64);
        let ids: Vec<&str> = out.iter().map(|s| s.item_id.as_str()).collect();
        let out_rev = rank(reversed, 64);
        let ids_rev: Vec<&str> = out_rev.iter().map(|s| s.item_id.as_str()).collect();
        assert_eq!(out.len(), 64);
        assert_eq!(ids, ids_rev);

        let finite: Vec<f64> = out.iter().map(|s| s.score).filter(|s| s.is_finite()).collect();
        assert_eq!(finite.len(), 42);
        assert!(finite.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn truncates_to_limit() {
        let scores = (0..5)
            .map(|i| RecommendationScore::new(format!("p{i}"), i as f64, "x"))
            .collect();
        let out = rank(scores, 2);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].item_id, "p4");
        assert!(rank(Vec::new(), 3).is_empty());
    }
}
