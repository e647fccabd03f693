use serde::{Deserialize, Serialize};

/// Checkpointing configuration nested inside [`GraphConfig`] (spec.md §6.1).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckpointConfig {
    /// Named checkpoint store to resolve via the registry.
    pub store: String,
    /// Save a checkpoint every `interval` completed node executions.
    /// `0` disables checkpointing.
    pub interval: u64,
    /// When `false`, a successful run deletes its checkpoint on completion.
    pub preserve: bool,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            store: "memory".to_string(),
            interval: 0,
            preserve: false,
        }
    }
}

/// Configuration recognized at graph construction (spec.md §6.1).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphConfig {
    pub name: String,
    pub observer: String,
    pub max_iterations: u64,
    pub checkpoint: Option<CheckpointConfig>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            name: "graph".to_string(),
            observer: "slog".to_string(),
            max_iterations: 1_000,
            checkpoint: None,
        }
    }
}

impl GraphConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_observer(mut self, observer: impl Into<String>) -> Self {
        self.observer = observer.into();
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_checkpoint(mut self, checkpoint: CheckpointConfig) -> Self {
        self.checkpoint = Some(checkpoint);
        self
    }
}
