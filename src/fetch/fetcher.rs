use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;

use super::Transport;
use crate::error::{AppError, Result};

/// Decoded resources keyed by resource name, for one session.
#[derive(Default)]
pub struct ResourceMemo {
    entries: RwLock<HashMap<String, Arc<Value>>>,
}

impl ResourceMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, resource: &str) -> Option<Arc<Value>> {
        self.entries.read().await.get(resource).cloned()
    }

    /// Stores `value` unless a concurrent fetch got there first; either way
    /// the stored value is returned so every caller sees the same one.
    pub async fn insert(&self, resource: &str, value: Value) -> Arc<Value> {
        let mut entries = self.entries.write().await;
        entries
            .entry(resource.to_string())
            .or_insert_with(|| Arc::new(value))
            .clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

/// Fetches named JSON resources through a [`Transport`], with optional
/// memoization by resource name.
///
/// Cheap to clone; clones share the transport and the memo table.
#[derive(Clone)]
pub struct FileFetcher {
    transport: Arc<dyn Transport>,
    memo: Arc<ResourceMemo>,
}

impl FileFetcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_memo(transport, Arc::new(ResourceMemo::new()))
    }

    pub fn with_memo(transport: Arc<dyn Transport>, memo: Arc<ResourceMemo>) -> Self {
        Self { transport, memo }
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    /// Always issues a fresh request.
    pub async fn fetch(&self, resource: &str) -> Result<Value> {
        self.transport.get_json(resource).await
    }

    /// Returns the memoized value for `resource`, fetching it on first use.
    /// Failures are not memoized.
    pub async fn fetch_memoized(&self, resource: &str) -> Result<Arc<Value>> {
        if let Some(hit) = self.memo.get(resource).await {
            tracing::debug!("memo hit for {}", resource);
            return Ok(hit);
        }

        let value = self.transport.get_json(resource).await?;
        Ok(self.memo.insert(resource, value).await)
    }

    pub async fn fetch_as<T: DeserializeOwned>(&self, resource: &str) -> Result<T> {
        let value = self.fetch(resource).await?;
        decode(resource, &value)
    }

    pub async fn fetch_memoized_as<T: DeserializeOwned>(&self, resource: &str) -> Result<T> {
        let value = self.fetch_memoized(resource).await?;
        decode(resource, &value)
    }
}

pub(crate) fn decode<T: DeserializeOwned>(resource: &str, value: &Value) -> Result<T> {
    T::deserialize(value).map_err(|source| AppError::Decode {
        resource: resource.to_string(),
        source,
    })
}
