use serde::de::DeserializeOwned;

use super::BatchCache;
use crate::models::{Cluster, RawItem, Table};

/// An entity stored in batch files.
pub trait Batched: DeserializeOwned + Clone + Send + Sync + 'static {
    /// Resource prefix of the batch files.
    const RESOURCE: &'static str;
    /// Table whose `latest_id` bounds this entity.
    const TABLE: Table;

    fn id(&self) -> u64;

    /// Case-insensitive substring match over the searchable text.
    /// `needle` must already be lowercase.
    fn matches(&self, needle: &str) -> bool;

    /// This entity's namespace inside a session's caches.
    fn cache(caches: &Caches) -> &BatchCache<Self>;
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

impl Batched for RawItem {
    const RESOURCE: &'static str = "news_raw";
    const TABLE: Table = Table::NewsRaw;

    fn id(&self) -> u64 {
        self.id
    }

    fn matches(&self, needle: &str) -> bool {
        contains_folded(&self.title, needle) || contains_folded(&self.body, needle)
    }

    fn cache(caches: &Caches) -> &BatchCache<Self> {
        &caches.raw
    }
}

impl Batched for Cluster {
    const RESOURCE: &'static str = "news_articles";
    const TABLE: Table = Table::NewsArticles;

    fn id(&self) -> u64 {
        self.id
    }

    fn matches(&self, needle: &str) -> bool {
        contains_folded(&self.title, needle) || contains_folded(&self.description, needle)
    }

    fn cache(caches: &Caches) -> &BatchCache<Self> {
        &caches.clusters
    }
}

/// Batch caches for one session: the whole process at build time, or a
/// single page load.
#[derive(Default)]
pub struct Caches {
    raw: BatchCache<RawItem>,
    clusters: BatchCache<Cluster>,
}

impl Caches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self) -> &BatchCache<RawItem> {
        &self.raw
    }

    pub fn clusters(&self) -> &BatchCache<Cluster> {
        &self.clusters
    }
}
