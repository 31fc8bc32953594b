use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::null_as_empty;

/// A raw item refers to its source either by numeric id or by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceRef {
    Id(u64),
    Name(String),
}

/// An individual ingested news item, before clustering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawItem {
    pub id: u64,
    #[serde(default)]
    pub source: Option<SourceRef>,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "text", alias = "content")]
    pub body: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<u64>,
    #[serde(default, alias = "image_url")]
    pub image: Option<String>,
    /// Owning cluster, once the item has been clustered.
    #[serde(default, alias = "article_id")]
    pub cluster: Option<u64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub guid: Option<String>,
    #[serde(default, alias = "objective")]
    pub fixed_objective: bool,
}

/// An aggregated story: a group of raw items about the same topic.
///
/// Items are referenced by id only; see `NewsStore::cluster_items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "summary")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub articles: Vec<u64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<u64>,
}
