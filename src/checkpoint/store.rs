use uuid::Uuid;

use super::CheckpointError;
use crate::state::State;

/// Capability for persisting and retrieving [`State`] snapshots keyed by
/// run id. One checkpoint per run id (overwrite model). Implementations
/// MUST be safe for concurrent use (spec.md §3, "Checkpoint store").
pub trait CheckpointStore: Send + Sync {
    fn save(&self, state: &State) -> Result<(), CheckpointError>;
    fn load(&self, run_id: Uuid) -> Result<State, CheckpointError>;
    fn delete(&self, run_id: Uuid) -> Result<(), CheckpointError>;
    fn list(&self) -> Result<Vec<Uuid>, CheckpointError>;
}
