use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{batch_of, batch_resource, Batched, BATCH_SIZE};
use crate::error::AppError;
use crate::fetch::FileFetcher;

/// Decoded batches of one entity type, keyed by batch start id.
///
/// Entries are never invalidated: batches are append-only upstream.
pub struct BatchCache<T> {
    batches: RwLock<HashMap<u64, Arc<[T]>>>,
}

impl<T> Default for BatchCache<T> {
    fn default() -> Self {
        Self {
            batches: RwLock::new(HashMap::new()),
        }
    }
}

impl<T: Batched> BatchCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn cached(&self, batch_id: u64) -> Option<Arc<[T]>> {
        self.batches.read().await.get(&batch_of(batch_id)).cloned()
    }

    pub async fn len(&self) -> usize {
        self.batches.read().await.len()
    }

    /// Items of the batch holding `batch_id`.
    ///
    /// A missing or unreadable batch yields an empty list and never an
    /// error. Missing and undecodable batches are cached as empty; transport
    /// failures are not, so a later call may still succeed.
    pub async fn get_batch(&self, batch_id: u64, fetcher: &FileFetcher) -> Arc<[T]> {
        let batch_id = batch_of(batch_id);
        if let Some(hit) = self.cached(batch_id).await {
            tracing::debug!("batch cache hit for {}.{}", T::RESOURCE, batch_id);
            return hit;
        }

        let resource = batch_resource(T::RESOURCE, batch_id);
        let items: Vec<T> = match fetcher.fetch_as::<Vec<T>>(&resource).await {
            Ok(items) => items,
            Err(e) if e.is_not_found() => {
                tracing::debug!("{} not found, treating as empty", resource);
                Vec::new()
            }
            Err(e @ AppError::Decode { .. }) => {
                tracing::warn!("{}", e);
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", resource, e);
                return Arc::from(Vec::new());
            }
        };

        let total = items.len();
        let items: Vec<T> = items
            .into_iter()
            .filter(|item| item.id() >= batch_id && item.id() - batch_id < BATCH_SIZE)
            .collect();
        if items.len() != total {
            tracing::warn!(
                "{} held {} items outside its id range, dropped",
                resource,
                total - items.len()
            );
        }

        self.insert(batch_id, items).await
    }

    async fn insert(&self, batch_id: u64, items: Vec<T>) -> Arc<[T]> {
        let mut batches = self.batches.write().await;
        batches
            .entry(batch_id)
            .or_insert_with(|| Arc::from(items))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Unavailable;
    use crate::fetch::mock::MockTransport;
    use crate::models::RawItem;
    use serde_json::json;

    fn fetcher(mock: &Arc<MockTransport>) -> FileFetcher {
        FileFetcher::new(mock.clone())
    }

    #[tokio::test]
    async fn second_lookup_is_served_from_cache() {
        let mock = Arc::new(
            MockTransport::new().with_resource("news_raw.100", json!([{"id": 101}, {"id": 150}])),
        );
        let cache: BatchCache<RawItem> = BatchCache::new();
        let f = fetcher(&mock);

        let first = cache.get_batch(100, &f).await;
        let second = cache.get_batch(150, &f).await;

        assert_eq!(first.len(), 2);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(mock.calls("news_raw.100"), 1);
    }

    #[tokio::test]
    async fn missing_batch_is_empty_and_cached() {
        let mock = Arc::new(MockTransport::new());
        let cache: BatchCache<RawItem> = BatchCache::new();
        let f = fetcher(&mock);

        assert!(cache.get_batch(300, &f).await.is_empty());
        assert!(cache.get_batch(300, &f).await.is_empty());
        assert_eq!(mock.calls("news_raw.300"), 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn transport_failure_is_empty_but_not_cached() {
        let mock = Arc::new(MockTransport::new().with_failure("news_raw.0", Unavailable::Timeout));
        let cache: BatchCache<RawItem> = BatchCache::new();
        let f = fetcher(&mock);

        assert!(cache.get_batch(0, &f).await.is_empty());
        assert!(cache.get_batch(0, &f).await.is_empty());
        assert_eq!(mock.calls("news_raw.0"), 2);
        assert!(cache.cached(0).await.is_none());
    }

    #[tokio::test]
    async fn out_of_range_items_are_dropped() {
        let mock = Arc::new(
            MockTransport::new().with_resource("news_raw.200", json!([{"id": 199}, {"id": 200}, {"id": 300}])),
        );
        let cache: BatchCache<RawItem> = BatchCache::new();

        let items = cache.get_batch(200, &fetcher(&mock)).await;
        let ids: Vec<u64> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![200]);
    }

    #[tokio::test]
    async fn last_batch_of_id_space_keeps_its_items() {
        let top = batch_of(u64::MAX);
        let mock = Arc::new(MockTransport::new().with_resource(
            &batch_resource("news_raw", top),
            json!([{"id": top + 1}, {"id": u64::MAX}, {"id": top - 1}]),
        ));
        let cache: BatchCache<RawItem> = BatchCache::new();

        let items = cache.get_batch(top + 1, &fetcher(&mock)).await;
        let ids: Vec<u64> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![top + 1, u64::MAX]);
    }

    #[tokio::test]
    async fn concurrent_misses_converge_to_one_entry() {
        let mock = Arc::new(
            MockTransport::new()
                .with_resource("news_raw.0", json!([{"id": 5}]))
                .with_delay(std::time::Duration::from_millis(20)),
        );
        let cache: BatchCache<RawItem> = BatchCache::new();
        let f = fetcher(&mock);

        let (a, b) = tokio::join!(cache.get_batch(0, &f), cache.get_batch(42, &f));

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len().await, 1);
        // the race may cost one redundant fetch, never more
        assert!(mock.calls("news_raw.0") <= 2);
    }
}
