use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationScore {
    pub item_id: String,
    pub score: f64,
    pub reason: String,
}

impl RecommendationScore {
    pub fn new(item_id: impl Into<String>, score: f64, reason: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            score,
            reason: reason.into(),
        }
    }
}
