use thiserror::Error;

/// Errors raised during graph construction/validation. Unrecoverable for
/// that graph instance (spec.md §7, "ValidationError").
#[derive(Debug, Error)]
#[cfg_attr(feature = "diagnostics", derive(miette::Diagnostic))]
pub enum ValidationError {
    #[error("node name must not be empty")]
    EmptyNodeName,

    #[error("node '{0}' is already registered")]
    DuplicateNode(String),

    #[error("edge endpoint must not be empty")]
    EmptyEdgeEndpoint,

    #[error("edge references unknown node '{0}'")]
    UnknownEdgeNode(String),

    #[error("entry point is already set to '{0}'")]
    EntryPointAlreadySet(String),

    #[error("entry point references unknown node '{0}'")]
    UnknownEntryPoint(String),

    #[error("exit point references unknown node '{0}'")]
    UnknownExitPoint(String),

    #[error("graph has no nodes")]
    NoNodes,

    #[error("graph has no entry point")]
    NoEntryPoint,

    #[error("entry point '{0}' is not a registered node")]
    EntryPointMissing(String),

    #[error("graph has no exit points")]
    NoExitPoints,

    #[error("observer registry lookup failed: {0}")]
    Observer(#[from] crate::observer::ObserverRegistryError),

    #[error("checkpoint store registry lookup failed: {0}")]
    CheckpointStore(#[from] crate::checkpoint::CheckpointStoreRegistryError),
}
