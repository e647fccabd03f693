use async_trait::async_trait;

use crate::state::State;

/// Polymorphic workflow computation step. Nodes are registered under
/// unique string names within a [`crate::graph::Graph`] (spec.md §3).
#[async_trait]
pub trait Node: Send + Sync {
    async fn execute(
        &self,
        ctx: &crate::interpreter::NodeContext,
        state: State,
    ) -> Result<State, Box<dyn std::error::Error + Send + Sync>>;
}

/// Wraps a plain async closure as a [`Node`], for inline step definitions.
pub struct FnNode<F> {
    func: F,
}

impl<F> FnNode<F> {
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<F, Fut> Node for FnNode<F>
where
    F: Fn(State) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<State, Box<dyn std::error::Error + Send + Sync>>>
        + Send,
{
    async fn execute(
        &self,
        _ctx: &crate::interpreter::NodeContext,
        state: State,
    ) -> Result<State, Box<dyn std::error::Error + Send + Sync>> {
        (self.func)(state).await
    }
}
