use crate::domain::model::UserProfile;
use crate::domain::recommendation::RecommendationScore;
use crate::engine::peers::scored_peers;
use crate::engine::rank::rank;
use std::collections::BTreeMap;

pub const REASON: &str = "liked by similar users";

/// Sums peer similarity over every item a peer liked that the target has not.
pub fn from_peers(
    target: &UserProfile,
    all_users: &[UserProfile],
    limit: usize,
) -> Vec<RecommendationScore> {
    let mut scores: BTreeMap<&str, f64> = BTreeMap::new();

    for (peer, similarity) in scored_peers(target, all_users) {
        for item_id in &peer.liked_items {
            if target.liked_items.contains(item_id) {
                continue;
            }
            *scores.entry(item_id.as_str()).or_insert(0.0) += similarity;
        }
    }

    let scored = scores
        .into_iter()
        .map(|(item_id, score)| RecommendationScore::new(item_id, score, REASON))
        .collect();

    rank(scored, limit)
}
