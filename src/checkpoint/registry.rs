use std::sync::{Arc, OnceLock, RwLock};

use rustc_hash::FxHashMap;
use thiserror::Error;

use super::{CheckpointStore, InMemoryCheckpointStore};

#[derive(Debug, Error)]
pub enum CheckpointStoreRegistryError {
    #[error("unknown checkpoint store: {0}")]
    Unknown(String),
}

pub type SharedCheckpointStore = Arc<dyn CheckpointStore>;

/// Process-wide named registry of [`CheckpointStore`] implementations,
/// with `"memory"` preregistered (spec.md §4.5).
#[derive(Clone)]
pub struct CheckpointStoreRegistry {
    inner: Arc<RwLock<FxHashMap<String, SharedCheckpointStore>>>,
}

impl Default for CheckpointStoreRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register("memory", Arc::new(InMemoryCheckpointStore::new()));
        registry
    }
}

impl CheckpointStoreRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(FxHashMap::default())),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, store: SharedCheckpointStore) -> &mut Self {
        self.inner.write().unwrap().insert(name.into(), store);
        self
    }

    pub fn with_store(mut self, name: impl Into<String>, store: SharedCheckpointStore) -> Self {
        self.register(name, store);
        self
    }

    pub fn get(&self, name: &str) -> Result<SharedCheckpointStore, CheckpointStoreRegistryError> {
        self.inner
            .read()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| CheckpointStoreRegistryError::Unknown(name.to_string()))
    }
}

fn global() -> &'static RwLock<CheckpointStoreRegistry> {
    static GLOBAL: OnceLock<RwLock<CheckpointStoreRegistry>> = OnceLock::new();
    GLOBAL.get_or_init(|| RwLock::new(CheckpointStoreRegistry::default()))
}

pub fn get_checkpoint_store(
    name: &str,
) -> Result<SharedCheckpointStore, CheckpointStoreRegistryError> {
    global().read().unwrap().get(name)
}

pub fn register_checkpoint_store(name: impl Into<String>, store: SharedCheckpointStore) {
    global().write().unwrap().register(name, store);
}
