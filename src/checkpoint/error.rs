use thiserror::Error;
use uuid::Uuid;

/// Errors raised by a [`super::CheckpointStore`] (spec.md §7).
///
/// Save failures are fatal to the graph run that produced them; load
/// failures surface from `Resume`; delete failures on successful cleanup
/// are swallowed by the interpreter (never constructed there as fatal).
#[derive(Debug, Error)]
#[cfg_attr(feature = "diagnostics", derive(miette::Diagnostic))]
pub enum CheckpointError {
    #[error("no checkpoint found for run {run_id}")]
    #[cfg_attr(
        feature = "diagnostics",
        diagnostic(
            code(conductor::checkpoint::not_found),
            help("Verify the run id came from a run that saved at least one checkpoint.")
        )
    )]
    NotFound { run_id: Uuid },

    #[error("checkpoint backend error: {message}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(conductor::checkpoint::backend)))]
    Backend {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl CheckpointError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            source: None,
        }
    }
}
