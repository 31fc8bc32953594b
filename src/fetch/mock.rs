//! In-memory transport for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::Transport;
use crate::error::{AppError, Result, Unavailable};

/// Serves canned resources, answers 404 for anything else, and records
/// every call.
#[derive(Default)]
pub struct MockTransport {
    resources: HashMap<String, Value>,
    failures: HashMap<String, Unavailable>,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource(mut self, name: impl Into<String>, value: Value) -> Self {
        self.resources.insert(name.into(), value);
        self
    }

    pub fn with_failure(mut self, name: impl Into<String>, reason: Unavailable) -> Self {
        self.failures.insert(name.into(), reason);
        self
    }

    /// Every call sleeps this long, so overlapping calls can be observed.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == name).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn call_log(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get_json(&self, resource: &str) -> Result<Value> {
        self.calls.lock().unwrap().push(resource.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(reason) = self.failures.get(resource) {
            return Err(AppError::unavailable(resource, reason.clone()));
        }
        self.resources
            .get(resource)
            .cloned()
            .ok_or_else(|| AppError::unavailable(resource, Unavailable::Status(404)))
    }
}
