//! The news data-access engine.
//!
//! [`NewsStore`] is the one entry point the rendering layer talks to. It
//! combines a [`FileFetcher`] (network + resource memo) with a set of batch
//! [`Caches`]. A build keeps one store for the whole process; a page-scoped
//! consumer calls [`NewsStore::session`] to get the same engine over fresh
//! caches.

mod accessors;
pub mod window;

use std::sync::Arc;

use crate::cache::{Batched, Caches};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::fetch::{FileFetcher, HttpTransport, Transport};
use crate::models::{Meta, RawItem, Source, SourceRef, Tag, TagArticles, TagTree};

const META: &str = "meta";
const SOURCES: &str = "news_sources";
const TAGS: &str = "tags";
const TAG_ARTICLES: &str = "tag_articles";

pub struct NewsStore {
    fetcher: FileFetcher,
    caches: Arc<Caches>,
    static_retention_limit: u64,
    max_concurrent_fetches: usize,
}

impl NewsStore {
    /// A store over HTTP, configured from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(Arc::new(transport), config))
    }

    pub fn new(transport: Arc<dyn Transport>, config: &Config) -> Self {
        Self::with_caches(FileFetcher::new(transport), Arc::new(Caches::new()), config)
    }

    /// A store over caller-supplied caches, e.g. to share them between
    /// several stores or to inspect them in tests.
    pub fn with_caches(fetcher: FileFetcher, caches: Arc<Caches>, config: &Config) -> Self {
        Self {
            fetcher,
            caches,
            static_retention_limit: config.static_retention_limit,
            max_concurrent_fetches: config.max_concurrent_fetches.max(1),
        }
    }

    /// Same transport and settings, fresh memo table and batch caches.
    pub fn session(&self) -> Self {
        Self {
            fetcher: FileFetcher::new(self.fetcher.transport()),
            caches: Arc::new(Caches::new()),
            static_retention_limit: self.static_retention_limit,
            max_concurrent_fetches: self.max_concurrent_fetches,
        }
    }

    pub fn fetcher(&self) -> &FileFetcher {
        &self.fetcher
    }

    pub fn caches(&self) -> &Caches {
        &self.caches
    }

    pub fn static_retention_limit(&self) -> u64 {
        self.static_retention_limit
    }

    // Metadata gate

    /// The memoized `meta` snapshot. Failure to obtain it is fatal for any
    /// operation bounded by a latest id.
    pub async fn fetch_meta(&self) -> Result<Meta> {
        self.fetcher
            .fetch_memoized_as::<Meta>(META)
            .await
            .map_err(|e| AppError::MetadataMissing(Box::new(e)))
    }

    pub async fn latest_id<T: Batched>(&self) -> Result<u64> {
        Ok(self.fetch_meta().await?.latest_id(T::TABLE))
    }

    // Unbatched lists

    pub async fn sources(&self) -> Result<Vec<Source>> {
        self.fetcher.fetch_memoized_as(SOURCES).await
    }

    pub async fn source_by_id(&self, id: u64) -> Result<Option<Source>> {
        Ok(self.sources().await?.into_iter().find(|s| s.id == id))
    }

    /// The source an item came from, whether it names it by id or by title.
    pub async fn resolve_source(&self, item: &RawItem) -> Result<Option<Source>> {
        let Some(source) = &item.source else {
            return Ok(None);
        };
        let sources = self.sources().await?;
        Ok(sources.into_iter().find(|s| match source {
            SourceRef::Id(id) => s.id == *id,
            SourceRef::Name(name) => s.title.eq_ignore_ascii_case(name.trim()),
        }))
    }

    pub async fn tags(&self) -> Result<Vec<Tag>> {
        self.fetcher.fetch_memoized_as(TAGS).await
    }

    pub async fn tag_by_id(&self, id: u64) -> Result<Option<Tag>> {
        Ok(self.tags().await?.into_iter().find(|t| t.id == id))
    }

    pub async fn tag_tree(&self) -> Result<TagTree> {
        Ok(TagTree::new(self.tags().await?))
    }

    pub async fn tag_articles(&self) -> Result<Vec<TagArticles>> {
        self.fetcher.fetch_memoized_as(TAG_ARTICLES).await
    }
}
