use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Post board a content item belongs to.
///
/// The declaration order is the one-hot order used by feature extraction, so
/// it must never be reshuffled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Free,
    Stock,
    Notice,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Free, Category::Stock, Category::Notice];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Free => "free",
            Category::Stock => "stock",
            Category::Notice => "notice",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    /// Most recent view last.
    pub viewed_items: Vec<String>,
    pub liked_items: BTreeSet<String>,
    pub viewed_instruments: BTreeSet<String>,
    pub search_history: Vec<String>,
    pub last_active: Option<DateTime<Utc>>,
}

impl UserProfile {
    pub fn most_recent_view(&self) -> Option<&str> {
        self.viewed_items.last().map(String::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    pub category: Category,
    pub tags: BTreeSet<String>,
    pub view_count: u64,
    pub like_count: u64,
    pub created_at: DateTime<Utc>,
}

impl ContentItem {
    /// Views plus double-weighted likes. Shared by feature extraction and
    /// trending so both agree on what "popular" means.
    pub fn engagement(&self) -> f64 {
        self.view_count as f64 + 2.0 * self.like_count as f64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub id: String,
    /// Empty when the market-data feed has no sector for the instrument.
    pub sector: String,
    pub change_percent: f64,
}

/// Immutable bundle of everything one recommendation call may look at.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub users: Vec<UserProfile>,
    pub items: Vec<ContentItem>,
    pub instruments: Vec<Instrument>,
}

impl Snapshot {
    pub fn user(&self, user_id: &str) -> Option<&UserProfile> {
        self.users.iter().find(|u| u.user_id == user_id)
    }

    pub fn item(&self, item_id: &str) -> Option<&ContentItem> {
        self.items.iter().find(|i| i.id == item_id)
    }
}
