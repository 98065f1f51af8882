// News artifact models

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bias scores run from -20 (left) to +20 (right).
pub const BIAS_SCORE_MIN: i8 = -20;
pub const BIAS_SCORE_MAX: i8 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    World,
    National,
    Local,
    Politics,
    Technology,
    Business,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub source: String,
    pub title: String,
    pub url: String,
    pub bias_score: i8,
    pub bias_label: String,
    pub category: Category,
    /// RFC 3339 time the item was aggregated.
    pub timestamp: String,
}

/// Sibling artifact of the news array; `updated` is what readers poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsMeta {
    pub updated: String,
    #[serde(default)]
    pub count: usize,
    /// Items per source that succeeded this run.
    #[serde(default)]
    pub sources: BTreeMap<String, usize>,
}
