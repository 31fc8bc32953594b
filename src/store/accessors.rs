use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use super::window::{self, IdWindow};
use super::NewsStore;
use crate::cache::{batch_of, Batched};
use crate::error::Result;
use crate::models::{Cluster, RawItem};

impl NewsStore {
    /// Fetches the given batches concurrently through the session cache.
    /// Results come back in completion order.
    async fn fetch_batches<T: Batched>(&self, batch_ids: Vec<u64>) -> Vec<(u64, Arc<[T]>)> {
        let cache = T::cache(&self.caches);
        let fetcher = &self.fetcher;

        stream::iter(batch_ids)
            .map(|batch| async move { (batch, cache.get_batch(batch, fetcher).await) })
            .buffer_unordered(self.max_concurrent_fetches)
            .collect::<Vec<_>>()
            .await
    }

    pub async fn fetch_by_id<T: Batched>(&self, id: u64) -> Option<T> {
        let batch = T::cache(&self.caches)
            .get_batch(batch_of(id), &self.fetcher)
            .await;
        batch.iter().find(|item| item.id() == id).cloned()
    }

    /// Items for `ids`, in the order of `ids`. Each distinct batch is fetched
    /// at most once; ids with no item are skipped.
    pub async fn fetch_many_by_ids<T: Batched>(&self, ids: &[u64]) -> Vec<T> {
        if ids.is_empty() {
            return Vec::new();
        }

        let batches: BTreeSet<u64> = ids.iter().map(|id| batch_of(*id)).collect();
        tracing::debug!(
            "resolving {} {} ids across {} batches",
            ids.len(),
            T::RESOURCE,
            batches.len()
        );
        let fetched = self.fetch_batches::<T>(batches.into_iter().collect()).await;

        let by_id: HashMap<u64, &T> = fetched
            .iter()
            .flat_map(|(_, items)| items.iter())
            .map(|item| (item.id(), item))
            .collect();

        ids.iter()
            .filter_map(|id| by_id.get(id).map(|item| (*item).clone()))
            .collect()
    }

    /// The first `limit` items listed under `tag_id`, in the tag's own order.
    /// An unknown tag yields nothing.
    pub async fn fetch_by_tag(&self, tag_id: u64, limit: usize) -> Result<Vec<RawItem>> {
        let rows = self.tag_articles().await?;
        let Some(row) = rows.into_iter().find(|r| r.tag_id == tag_id) else {
            tracing::debug!("no tag_articles row for tag {}", tag_id);
            return Ok(Vec::new());
        };

        let ids: Vec<u64> = row.articles.into_iter().take(limit).collect();
        Ok(self.fetch_many_by_ids(&ids).await)
    }

    /// Case-insensitive substring search over the most recent batches only.
    ///
    /// Matches come back in ascending id order of the scanned batches, with
    /// no ranking.
    pub async fn search<T: Batched>(&self, query: &str, limit: usize) -> Result<Vec<T>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let latest = self.latest_id::<T>().await?;
        if latest == 0 {
            return Ok(Vec::new());
        }

        let batches = window::search_batches(latest, self.static_retention_limit);
        let mut fetched = self.fetch_batches::<T>(batches).await;
        fetched.sort_by_key(|(batch, _)| *batch);

        let mut matches = Vec::new();
        for (_, items) in &fetched {
            let mut ordered: Vec<&T> = items.iter().filter(|i| i.id() <= latest).collect();
            ordered.sort_by_key(|i| i.id());
            for item in ordered {
                if item.matches(&needle) {
                    matches.push(item.clone());
                    if matches.len() == limit {
                        return Ok(matches);
                    }
                }
            }
        }
        Ok(matches)
    }

    /// The `limit` highest-id items at or below the latest id, newest first.
    pub async fn fetch_recent<T: Batched>(&self, limit: usize) -> Result<Vec<T>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let latest = self.latest_id::<T>().await?;
        let Some(window) = IdWindow::new(latest, self.static_retention_limit) else {
            return Ok(Vec::new());
        };

        let mut first = window.batches_desc();
        let rest = first.split_off(window.batches_to_cover(limit).min(first.len()));
        let mut items = self.collect_window::<T>(first, &window).await;

        // Gaps in the id sequence can leave us short; keep walking back one
        // fan-out round at a time.
        for round in rest.chunks(self.max_concurrent_fetches) {
            if items.len() >= limit {
                break;
            }
            tracing::debug!(
                "{} recent short by {}, fetching {} more batches",
                T::RESOURCE,
                limit - items.len(),
                round.len()
            );
            items.extend(self.collect_window::<T>(round.to_vec(), &window).await);
        }

        items.sort_by(|a, b| b.id().cmp(&a.id()));
        items.dedup_by_key(|i| i.id());
        items.truncate(limit);
        Ok(items)
    }

    async fn collect_window<T: Batched>(&self, batch_ids: Vec<u64>, window: &IdWindow) -> Vec<T> {
        self.fetch_batches::<T>(batch_ids)
            .await
            .iter()
            .flat_map(|(_, items)| items.iter())
            .filter(|item| window.contains(item.id()))
            .cloned()
            .collect()
    }

    pub async fn fetch_cluster(&self, id: u64) -> Option<Cluster> {
        self.fetch_by_id(id).await
    }

    /// The raw items a cluster groups, in the cluster's order.
    pub async fn cluster_items(&self, cluster: &Cluster) -> Vec<RawItem> {
        self.fetch_many_by_ids(&cluster.articles).await
    }

    /// Ids a build renders static pages for: the retention window below the
    /// latest id, newest first.
    pub async fn static_page_ids<T: Batched>(&self) -> Result<Vec<u64>> {
        let latest = self.latest_id::<T>().await?;
        Ok(IdWindow::new(latest, self.static_retention_limit)
            .map(|w| w.ids_desc().collect())
            .unwrap_or_default())
    }

    /// Warms the cache with the two newest batches. Returns how many items
    /// they hold.
    pub async fn prefetch_recent<T: Batched>(&self) -> Result<usize> {
        let latest = self.latest_id::<T>().await?;
        let Some(window) = IdWindow::new(latest, self.static_retention_limit) else {
            return Ok(0);
        };

        let batches: Vec<u64> = window.batches_desc().into_iter().take(2).collect();
        let fetched = self.fetch_batches::<T>(batches).await;
        Ok(fetched.iter().map(|(_, items)| items.len()).sum())
    }
}
