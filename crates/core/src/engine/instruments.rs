use crate::domain::model::{Instrument, UserProfile};
use crate::domain::recommendation::RecommendationScore;
use crate::engine::rank::rank;
use std::collections::BTreeMap;

pub const SECTOR_WEIGHT: f64 = 0.6;
pub const CHANGE_WEIGHT: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffinityWeights {
    pub sector: f64,
    pub change: f64,
}

impl Default for AffinityWeights {
    fn default() -> Self {
        Self {
            sector: SECTOR_WEIGHT,
            change: CHANGE_WEIGHT,
        }
    }
}

/// How many of the user's viewed instruments fall in each sector. Viewed ids
/// missing from `instruments` and instruments without a sector are skipped.
pub fn sector_affinity<'a>(
    user: &UserProfile,
    instruments: &'a [Instrument],
) -> BTreeMap<&'a str, usize> {
    let mut counts = BTreeMap::new();
    for inst in instruments {
        if inst.sector.is_empty() || !user.viewed_instruments.contains(&inst.id) {
            continue;
        }
        *counts.entry(inst.sector.as_str()).or_insert(0) += 1;
    }
    counts
}

pub fn recommend_instruments(
    user: &UserProfile,
    instruments: &[Instrument],
    limit: usize,
    weights: AffinityWeights,
) -> Vec<RecommendationScore> {
    let affinity = sector_affinity(user, instruments);

    let scored = instruments
        .iter()
        .filter(|inst| !user.viewed_instruments.contains(&inst.id))
        .map(|inst| {
            let count = affinity.get(inst.sector.as_str()).copied().unwrap_or(0);
            let score = weights.sector * count as f64 + weights.change * inst.change_percent;
            RecommendationScore::new(
                inst.id.clone(),
                if score.is_finite() { score } else { 0.0 },
                format!("{} sector affinity", inst.sector),
            )
        })
        .collect();

    rank(scored, limit)
}
