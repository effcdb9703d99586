//! In-memory OrderStore
//!
//! Keeps the last persisted position per node. Used by tests and the replay
//! tool; supports injecting failures for specific ids and an artificial
//! latency so rollback and overlapping mutations can be exercised.

use crate::db::{OrderStore, PersistenceError};
use crate::models::NodeKind;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

/// Last value written for one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedOrder {
    pub kind: NodeKind,
    pub order_index: i64,
    pub parent_key: Option<String>,
}

#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    rows: RwLock<HashMap<String, PersistedOrder>>,
    failing_ids: RwLock<HashSet<String>>,
    offline: AtomicBool,
    latency: Option<Duration>,
    calls: AtomicUsize,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every write by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Reject every future write for `id`
    pub async fn fail_on(&self, id: impl Into<String>) {
        self.failing_ids.write().await.insert(id.into());
    }

    /// Stop rejecting writes for `id`
    pub async fn clear_failure(&self, id: &str) {
        self.failing_ids.write().await.remove(id);
    }

    /// Simulate losing the connection; every write fails while offline
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub async fn get(&self, id: &str) -> Option<PersistedOrder> {
        self.rows.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    /// Number of `update_order` calls received, including failed ones
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn update_order(
        &self,
        kind: NodeKind,
        id: &str,
        order_index: i64,
        parent_key: Option<&str>,
    ) -> Result<(), PersistenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.offline.load(Ordering::SeqCst) {
            return Err(PersistenceError::unavailable(id, "store offline"));
        }
        if self.failing_ids.read().await.contains(id) {
            return Err(PersistenceError::rejected(id, "injected failure"));
        }

        self.rows.write().await.insert(
            id.to_string(),
            PersistedOrder {
                kind,
                order_index,
                parent_key: parent_key.map(str::to_string),
            },
        );
        Ok(())
    }
}
