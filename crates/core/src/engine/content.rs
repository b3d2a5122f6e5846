use crate::domain::model::ContentItem;
use crate::domain::recommendation::RecommendationScore;
use crate::engine::features;
use crate::engine::rank::rank;

/// Cosine similarity of two vectors. Zero-norm input yields 0.0, never NaN.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = norm(a);
    let norm_b = norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let sim = dot / (norm_a * norm_b);
    if sim.is_finite() {
        sim
    } else {
        0.0
    }
}

fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

pub fn similar_posts(
    target: &ContentItem,
    candidates: &[ContentItem],
    limit: usize,
    popularity_cap: f64,
) -> Vec<RecommendationScore> {
    let target_vec = features::extract(target, popularity_cap);

    let scored = candidates
        .iter()
        .filter(|c| c.id != target.id)
        .map(|c| {
            let v = features::extract(c, popularity_cap);
            RecommendationScore::new(
                c.id.clone(),
                cosine_similarity(target_vec.as_slice(), v.as_slice()),
                format!("{} category — similar item", c.category),
            )
        })
        .collect();

    rank(scored, limit)
}
