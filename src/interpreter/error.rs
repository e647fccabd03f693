use thiserror::Error;

use crate::graph::ValidationError;
use crate::state::State;

/// Underlying cause of an [`ExecutionError`] (spec.md §7).
#[derive(Debug, Error)]
pub enum ExecutionCause {
    #[error("graph failed validation: {0}")]
    Validation(#[source] ValidationError),

    #[error("execution was cancelled")]
    Cancelled,

    #[error("iteration cap ({max}) exceeded")]
    IterationCap { max: u64 },

    #[error("node '{0}' is not registered")]
    MissingNode(String),

    #[error("node '{0}' failed: {1}")]
    NodeFailed(String, #[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("node '{0}' has no outgoing edges and is not an exit point")]
    NoOutgoingEdges(String),

    #[error("no predicate matched an outgoing edge of '{0}'")]
    NoValidTransition(String),

    #[error("checkpoint save failed: {0}")]
    CheckpointSave(#[source] crate::checkpoint::CheckpointError),

    #[error("checkpoint load failed: {0}")]
    CheckpointLoad(#[source] crate::checkpoint::CheckpointError),

    #[error("checkpointing is not configured for this graph")]
    CheckpointNotConfigured,

    #[error("checkpoint node '{0}' is itself an exit point; execution already completed")]
    AlreadyComplete(String),
}

/// Rich failure from the graph interpreter: the failing node name, the
/// State at failure, the full visited path, and the underlying cause
/// (spec.md §3, "Execution error").
#[derive(Debug, Error)]
#[error("graph execution failed at node '{node}': {cause}")]
pub struct ExecutionError {
    pub node: String,
    pub state: State,
    pub path: Vec<String>,
    #[source]
    pub cause: ExecutionCause,
}

impl ExecutionError {
    pub fn new(node: impl Into<String>, state: State, path: Vec<String>, cause: ExecutionCause) -> Self {
        Self {
            node: node.into(),
            state,
            path,
            cause,
        }
    }
}
