use tokio_util::sync::CancellationToken;

/// Cancellation-bearing context threaded through node execution, pattern
/// invocations, and predicate/handler calls (spec.md §5, "Cancellation").
///
/// Conductor has no notion of deadlines of its own; callers that want a
/// timeout build it from [`CancellationToken`] the same way a Go caller
/// would derive a `context.WithTimeout`, by cancelling the token from a
/// `tokio::time::sleep` race.
#[derive(Clone, Debug, Default)]
pub struct NodeContext {
    token: CancellationToken,
}

impl NodeContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_token(token: CancellationToken) -> Self {
        Self { token }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// A child context that is cancelled when either this context or the
    /// child itself is cancelled. Used by the bounded-parallel pattern's
    /// fail-fast mode (spec.md §4.7).
    pub fn child(&self) -> NodeContext {
        NodeContext {
            token: self.token.child_token(),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}
