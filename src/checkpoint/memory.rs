use std::sync::RwLock;

use rustc_hash::FxHashMap;
use uuid::Uuid;

use super::{CheckpointError, CheckpointStore};
use crate::state::{State, StateSnapshot};

/// Reference in-memory [`CheckpointStore`]. A single map guarded by a
/// reader/writer lock; `save`/`delete` take the writer lock, `load`/`list`
/// take a reader lock (spec.md §4.5).
#[derive(Debug, Default)]
pub struct InMemoryCheckpointStore {
    snapshots: RwLock<FxHashMap<Uuid, StateSnapshot>>,
}

impl InMemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CheckpointStore for InMemoryCheckpointStore {
    fn save(&self, state: &State) -> Result<(), CheckpointError> {
        self.snapshots
            .write()
            .unwrap()
            .insert(state.run_id(), state.to_snapshot());
        Ok(())
    }

    fn load(&self, run_id: Uuid) -> Result<State, CheckpointError> {
        self.snapshots
            .read()
            .unwrap()
            .get(&run_id)
            .cloned()
            .map(|snapshot| State::from_snapshot(snapshot, None))
            .ok_or(CheckpointError::NotFound { run_id })
    }

    fn delete(&self, run_id: Uuid) -> Result<(), CheckpointError> {
        self.snapshots.write().unwrap().remove(&run_id);
        Ok(())
    }

    fn list(&self) -> Result<Vec<Uuid>, CheckpointError> {
        Ok(self.snapshots.read().unwrap().keys().copied().collect())
    }
}
