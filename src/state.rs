use std::sync::Arc;

use crate::{
    config::Config,
    repo::{InMemoryWaveStore, WaveStore},
};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub store: Arc<dyn WaveStore>,
}

impl AppState {
    pub fn new(cfg: Config) -> Self {
        let store = Arc::new(InMemoryWaveStore::new(cfg.server.visit_history));
        Self::with_store(cfg, store)
    }

    pub fn with_store(cfg: Config, store: Arc<dyn WaveStore>) -> Self {
        Self {
            cfg: Arc::new(cfg),
            store,
        }
    }
}
