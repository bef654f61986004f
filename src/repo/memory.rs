use async_trait::async_trait;
use chrono::Local;
use std::collections::VecDeque;
use tokio::sync::RwLock;

use super::{StoreError, WaveStore};
use crate::domain::Visit;

#[derive(Debug, Default)]
struct Inner {
    count: u64,
    next_id: u64,
    visits: VecDeque<Visit>,
}

/// Process-local store. The visit log is bounded; the counter is not.
#[derive(Debug)]
pub struct InMemoryWaveStore {
    inner: RwLock<Inner>,
    history_capacity: usize,
}

impl InMemoryWaveStore {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            history_capacity: history_capacity.max(1),
        }
    }
}

#[async_trait]
impl WaveStore for InMemoryWaveStore {
    async fn record_wave(&self, visitor_name: &str) -> Result<(u64, Visit), StoreError> {
        let mut inner = self.inner.write().await;
        inner.count += 1;
        inner.next_id += 1;
        let visit = Visit {
            id: inner.next_id,
            visitor_name: visitor_name.to_string(),
            visit_time: Local::now(),
        };
        if inner.visits.len() == self.history_capacity {
            inner.visits.pop_front();
        }
        inner.visits.push_back(visit.clone());
        Ok((inner.count, visit))
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.inner.read().await.count)
    }

    async fn recent_visits(&self, limit: usize) -> Result<Vec<Visit>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.visits.iter().rev().take(limit).cloned().collect())
    }
}
