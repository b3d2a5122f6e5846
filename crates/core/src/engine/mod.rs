//! Personalized ranking for posts and instruments.
//!
//! Every scorer is a plain function over borrowed snapshots; the
//! [`RecommendationEngine`] only carries the tuning constants and fuses the
//! scorers' outputs. It holds no mutable state, so one instance can be shared
//! across request handlers behind an `Arc`.

pub mod collaborative;
pub mod content;
pub mod features;
pub mod instruments;
pub mod peers;
pub mod rank;
pub mod trending;

use crate::config::EngineConfig;
use crate::domain::model::{ContentItem, Instrument, UserProfile};
use crate::domain::recommendation::RecommendationScore;
use crate::error::{check_weight, EngineError};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendOptions {
    pub content_weight: f64,
    pub collaborative_weight: f64,
    pub limit: usize,
    /// Divide each fused score by the weight of the sources that actually
    /// scored the item. Off by default: a single-source item keeps only that
    /// source's weighted score.
    pub normalize_by_present_weight: bool,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            content_weight: 0.4,
            collaborative_weight: 0.6,
            limit: 10,
            normalize_by_present_weight: false,
        }
    }
}

impl RecommendOptions {
    pub fn validate(&self) -> Result<(), EngineError> {
        check_weight("content_weight", self.content_weight)?;
        check_weight("collaborative_weight", self.collaborative_weight)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendingOptions {
    pub time_window_hours: f64,
    pub limit: usize,
}

impl Default for TrendingOptions {
    fn default() -> Self {
        Self {
            time_window_hours: 24.0,
            limit: 10,
        }
    }
}

impl TrendingOptions {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.time_window_hours.is_finite() && self.time_window_hours > 0.0 {
            Ok(())
        } else {
            Err(EngineError::InvalidWindow(self.time_window_hours))
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    config: EngineConfig,
}

impl RecommendationEngine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Options seeded from this engine's configured defaults.
    pub fn recommend_options(&self) -> RecommendOptions {
        RecommendOptions {
            content_weight: self.config.content_weight,
            collaborative_weight: self.config.collaborative_weight,
            limit: self.config.default_limit,
            normalize_by_present_weight: self.config.normalize_by_present_weight,
        }
    }

    pub fn trending_options(&self) -> TrendingOptions {
        TrendingOptions {
            time_window_hours: self.config.trending_window_hours,
            limit: self.config.default_limit,
        }
    }

    pub fn recommend_similar_items(
        &self,
        target: &ContentItem,
        candidates: &[ContentItem],
        limit: usize,
    ) -> Vec<RecommendationScore> {
        content::similar_posts(target, candidates, limit, self.config.popularity_cap)
    }

    /// Hybrid ranking: content similarity to the user's latest view fused with
    /// peer-based collaborative scores.
    pub fn recommend(
        &self,
        user: &UserProfile,
        all_users: &[UserProfile],
        all_items: &[ContentItem],
        opts: &RecommendOptions,
    ) -> Result<Vec<RecommendationScore>, EngineError> {
        opts.validate()?;
        let fetch = opts.limit.saturating_mul(2);

        let recent = user
            .most_recent_view()
            .and_then(|id| all_items.iter().find(|item| item.id == id));
        let content_recs = match recent {
            Some(item) => self.recommend_similar_items(item, all_items, fetch),
            None => Vec::new(),
        };
        let collab_recs = collaborative::from_peers(user, all_users, fetch);

        tracing::debug!(
            user_id = %user.user_id,
            has_recent_view = recent.is_some(),
            content = content_recs.len(),
            collaborative = collab_recs.len(),
            "fusing recommendation sources"
        );

        Ok(fuse(content_recs, collab_recs, opts))
    }

    pub fn recommend_trending(
        &self,
        items: &[ContentItem],
        opts: &TrendingOptions,
    ) -> Result<Vec<RecommendationScore>, EngineError> {
        self.recommend_trending_at(items, opts, Utc::now())
    }

    pub fn recommend_trending_at(
        &self,
        items: &[ContentItem],
        opts: &TrendingOptions,
        now: DateTime<Utc>,
    ) -> Result<Vec<RecommendationScore>, EngineError> {
        opts.validate()?;
        let out = trending::trending(items, opts.time_window_hours, opts.limit, now);
        tracing::debug!(
            candidates = items.len(),
            returned = out.len(),
            window_hours = opts.time_window_hours,
            "trending ranked"
        );
        Ok(out)
    }

    pub fn recommend_instruments(
        &self,
        user: &UserProfile,
        instruments: &[Instrument],
        limit: usize,
    ) -> Vec<RecommendationScore> {
        instruments::recommend_instruments(user, instruments, limit, self.config.affinity_weights())
    }
}

#[derive(Default)]
struct Contributions {
    content: Option<RecommendationScore>,
    collaborative: Option<RecommendationScore>,
}

fn fuse(
    content_recs: Vec<RecommendationScore>,
    collab_recs: Vec<RecommendationScore>,
    opts: &RecommendOptions,
) -> Vec<RecommendationScore> {
    let mut by_item: BTreeMap<String, Contributions> = BTreeMap::new();
    for rec in content_recs {
        let id = rec.item_id.clone();
        by_item.entry(id).or_default().content = Some(rec);
    }
    for rec in collab_recs {
        let id = rec.item_id.clone();
        by_item.entry(id).or_default().collaborative = Some(rec);
    }

    let fused = by_item
        .into_iter()
        .map(|(item_id, c)| {
            let mut score = 0.0;
            let mut present_weight = 0.0;
            let mut reasons = Vec::with_capacity(2);

            if let Some(rec) = c.content {
                score += rec.score * opts.content_weight;
                present_weight += opts.content_weight;
                reasons.push(rec.reason);
            }
            if let Some(rec) = c.collaborative {
                score += rec.score * opts.collaborative_weight;
                present_weight += opts.collaborative_weight;
                reasons.push(rec.reason);
            }
            if opts.normalize_by_present_weight && present_weight > 0.0 {
                score /= present_weight;
            }

            RecommendationScore::new(item_id, score, reasons.join(" & "))
        })
        .collect();

    rank::rank(fused, opts.limit)
}
