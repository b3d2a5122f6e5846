use crate::domain::model::{Category, ContentItem, Instrument, Snapshot, UserProfile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Snapshot payload as delivered by the content store, behavior tracker and
/// market-data feeds. Looser than [`Snapshot`]: categories are free text,
/// counts may be negative, sectors may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSnapshot {
    #[serde(default)]
    pub users: Vec<RawUser>,
    #[serde(default)]
    pub items: Vec<RawItem>,
    #[serde(default)]
    pub instruments: Vec<RawInstrument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUser {
    pub user_id: String,
    #[serde(default)]
    pub viewed_items: Vec<String>,
    #[serde(default)]
    pub liked_items: Vec<String>,
    #[serde(default)]
    pub viewed_instruments: Vec<String>,
    #[serde(default)]
    pub search_history: Vec<String>,
    #[serde(default)]
    pub last_active: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawItem {
    pub id: String,
    pub category: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub view_count: i64,
    #[serde(default)]
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInstrument {
    pub id: String,
    #[serde(default)]
    pub sector: Option<String>,
    pub change_percent: f64,
}

/// What was dropped or repaired while converting a [`RawSnapshot`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotReport {
    pub dropped_users: usize,
    pub dropped_items: usize,
    pub dropped_instruments: usize,
    pub clamped_counts: usize,
}

impl RawSnapshot {
    /// Converts the wire payload into an engine snapshot. Malformed records
    /// are dropped (and logged) rather than failing the whole load.
    pub fn into_snapshot(self) -> (Snapshot, SnapshotReport) {
        let mut report = SnapshotReport::default();

        let mut seen = HashSet::new();
        let mut users = Vec::with_capacity(self.users.len());
        for raw in self.users {
            match raw.into_user() {
                Some(user) if seen.insert(user.user_id.clone()) => users.push(user),
                Some(user) => {
                    tracing::warn!(user_id = %user.user_id, "duplicate user id; keeping first");
                    report.dropped_users += 1;
                }
                None => {
                    tracing::warn!("user with empty id dropped");
                    report.dropped_users += 1;
                }
            }
        }

        let mut seen = HashSet::new();
        let mut items = Vec::with_capacity(self.items.len());
        for raw in self.items {
            let raw_id = raw.id.clone();
            match raw.into_item(&mut report.clamped_counts) {
                Some(item) if seen.insert(item.id.clone()) => items.push(item),
                Some(item) => {
                    tracing::warn!(item_id = %item.id, "duplicate item id; keeping first");
                    report.dropped_items += 1;
                }
                None => {
                    tracing::warn!(item_id = %raw_id, "item with empty id or unknown category dropped");
                    report.dropped_items += 1;
                }
            }
        }

        let mut seen = HashSet::new();
        let mut instruments = Vec::with_capacity(self.instruments.len());
        for raw in self.instruments {
            let raw_id = raw.id.clone();
            match raw.into_instrument() {
                Some(inst) if seen.insert(inst.id.clone()) => instruments.push(inst),
                Some(inst) => {
                    tracing::warn!(instrument_id = %inst.id, "duplicate instrument id; keeping first");
                    report.dropped_instruments += 1;
                }
                None => {
                    tracing::warn!(instrument_id = %raw_id, "instrument with empty id or non-finite change dropped");
                    report.dropped_instruments += 1;
                }
            }
        }

        (
            Snapshot {
                users,
                items,
                instruments,
            },
            report,
        )
    }
}

fn clean_id(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn clean_ids<I: IntoIterator<Item = String>>(ids: I) -> impl Iterator<Item = String> {
    ids.into_iter().filter_map(|s| clean_id(&s))
}

fn clamp_count(v: i64, clamped: &mut usize) -> u64 {
    if v < 0 {
        *clamped += 1;
        0
    } else {
        v as u64
    }
}

impl RawUser {
    fn into_user(self) -> Option<UserProfile> {
        let user_id = clean_id(&self.user_id)?;
        Some(UserProfile {
            user_id,
            viewed_items: clean_ids(self.viewed_items).collect(),
            liked_items: clean_ids(self.liked_items).collect::<BTreeSet<_>>(),
            viewed_instruments: clean_ids(self.viewed_instruments).collect::<BTreeSet<_>>(),
            search_history: self.search_history,
            last_active: self.last_active,
        })
    }
}

impl RawItem {
    fn into_item(self, clamped: &mut usize) -> Option<ContentItem> {
        let id = clean_id(&self.id)?;
        let category = Category::parse(&self.category)?;
        Some(ContentItem {
            id,
            category,
            tags: clean_ids(self.tags.unwrap_or_default()).collect(),
            view_count: clamp_count(self.view_count, clamped),
            like_count: clamp_count(self.like_count, clamped),
            created_at: self.created_at,
        })
    }
}

impl RawInstrument {
    fn into_instrument(self) -> Option<Instrument> {
        let id = clean_id(&self.id)?;
        if !self.change_percent.is_finite() {
            return None;
        }
        Some(Instrument {
            id,
            sector: self
                .sector
                .map(|s| s.trim().to_string())
                .unwrap_or_default(),
            change_percent: self.change_percent,
        })
    }
}
