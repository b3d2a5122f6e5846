use crate::domain::model::UserProfile;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerSimilarity {
    pub user_id: String,
    pub similarity: f64,
}

/// `|A ∩ B| / |A ∪ B|`, with two empty sets scoring 0.
pub fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

/// Every other user in `all_users` with their similarity to `target`, best
/// first. The target is matched by id, so it need not be in `all_users`.
pub(crate) fn scored_peers<'a>(
    target: &UserProfile,
    all_users: &'a [UserProfile],
) -> Vec<(&'a UserProfile, f64)> {
    let mut peers: Vec<_> = all_users
        .iter()
        .filter(|u| u.user_id != target.user_id)
        .map(|u| (u, jaccard(&target.liked_items, &u.liked_items)))
        .collect();

    peers.sort_by(|a, b| {
        b.1.total_cmp(&a.1)
            .then_with(|| a.0.user_id.cmp(&b.0.user_id))
    });
    peers
}

pub fn nearest_peers(
    target: &UserProfile,
    all_users: &[UserProfile],
    k: usize,
) -> Vec<PeerSimilarity> {
    scored_peers(target, all_users)
        .into_iter()
        .take(k)
        .map(|(u, similarity)| PeerSimilarity {
            user_id: u.user_id.clone(),
            similarity,
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn user(id: &str, liked: &[&str]) -> UserProfile {
        UserProfile {
            user_id: id.to_string(),
            viewed_items: Vec::new(),
            liked_items: liked.iter().map(|s| s.to_string()).collect(),
            viewed_instruments: BTreeSet::new(),
            search_history: Vec::new(),
            last_active: None,
        }
    }

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn jaccard_of_overlapping_sets() {
        let sim = jaccard(&set(&["p1", "p2"]), &set(&["p2", "p3"]));
        assert!((sim - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn jaccard_edge_cases() {
        let empty = BTreeSet::<String>::new();
        assert_eq!(jaccard(&empty, &empty), 0.0);
        assert_eq!(jaccard(&set(&["p1"]), &empty), 0.0);
        assert_eq!(jaccard(&set(&["p1", "p2"]), &set(&["p1", "p2"])), 1.0);
    }

    #[test]
    fn jaccard_stays_in_unit_interval() {
        let universe = ["a", "b", "c", "d", "e"];
        for mask_a in 0u32..32 {
            for mask_b in 0u32..32 {
                let pick = |mask: u32| -> BTreeSet<String> {
                    universe
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| mask & (1 << *i) != 0)
                        .map(|(_, s)| s.to_string())
                        .collect()
                };
                let sim = jaccard(&pick(mask_a), &pick(mask_b));
                assert!((0.0..=1.0).contains(&sim));
            }
        }
    }

    #[test]
    fn nearest_peers_excludes_target_and_orders() {
        let target = user("u1", &["p1", "p2"]);
        let all = vec![
            target.clone(),
            user("u3", &["p2", "p3"]),
            user("u2", &["p2", "p3"]),
            user("u4", &["p1", "p2"]),
            user("u5", &["p9"]),
        ];

        let peers = nearest_peers(&target, &all, 3);
        let ids: Vec<&str> = peers.iter().map(|p| p.user_id.as_str()).collect();
        assert_eq!(ids, vec!["u4", "u2", "u3"]);
        assert_eq!(peers[0].similarity, 1.0);
    }

    #[test]
    fn target_absent_from_universe_is_fine() {
        let target = user("ghost", &["p1"]);
        let all = vec![user("u1", &["p1"])];
        let peers = nearest_peers(&target, &all, 5);
        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0].similarity, 1.0);
    }
}
