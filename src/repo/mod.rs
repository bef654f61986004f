pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Visit;

pub use memory::InMemoryWaveStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence for the wave counter and the visit log.
#[async_trait]
pub trait WaveStore: Send + Sync {
    /// Bumps the counter and logs the visit atomically; returns the new count.
    async fn record_wave(&self, visitor_name: &str) -> Result<(u64, Visit), StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    /// Most recent visits, newest first.
    async fn recent_visits(&self, limit: usize) -> Result<Vec<Visit>, StoreError>;
}
