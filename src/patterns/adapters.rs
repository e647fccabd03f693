//! Graph integration adapters: thin [`Node`] wrappers around the three
//! workflow patterns (spec.md §4.9).

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::graph::Node;
use crate::interpreter::NodeContext;
use crate::state::State;

use super::chain::{process_chain, ChainConfig, ChainProcessor};
use super::conditional::{process_conditional, ConditionalConfig, RoutePredicate, Routes};
use super::parallel::{process_parallel, ParallelConfig, ParallelProcessor};

/// Wraps a boxed pattern error with a descriptive prefix while preserving
/// the underlying structured error via `source` (spec.md §4.9: "Adapter
/// errors must be wrapped with a descriptive prefix ... and preserve the
/// underlying structured error via unwrap").
#[derive(Debug)]
struct AdapterError {
    prefix: &'static str,
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.prefix, self.source)
    }
}

impl std::error::Error for AdapterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

impl AdapterError {
    fn boxed(prefix: &'static str, source: impl std::error::Error + Send + Sync + 'static) -> Box<dyn std::error::Error + Send + Sync> {
        Box::new(AdapterError { prefix, source: Box::new(source) })
    }
}

/// Presents a sequential fold as a graph [`Node`].
///
/// `extractor` pulls the chain's initial accumulator out of the incoming
/// State; `reinjector` writes the chain's final accumulator back into a
/// State to produce the node's output. When `Acc = State`, use
/// [`ChainNode::threading`] instead of hand-writing identity functions.
pub struct ChainNode<I, Acc> {
    items: Vec<I>,
    config: ChainConfig,
    processor: Arc<dyn ChainProcessor<I, Acc>>,
    extractor: Box<dyn Fn(&State) -> Acc + Send + Sync>,
    reinjector: Box<dyn Fn(Acc, &State) -> State + Send + Sync>,
}

impl<I, Acc> ChainNode<I, Acc>
where
    I: Clone + Send + Sync + 'static,
    Acc: Clone + Send + Sync + 'static,
{
    pub fn new(
        items: Vec<I>,
        config: ChainConfig,
        processor: impl ChainProcessor<I, Acc> + 'static,
        extractor: impl Fn(&State) -> Acc + Send + Sync + 'static,
        reinjector: impl Fn(Acc, &State) -> State + Send + Sync + 'static,
    ) -> Self {
        Self {
            items,
            config,
            processor: Arc::new(processor),
            extractor: Box::new(extractor),
            reinjector: Box::new(reinjector),
        }
    }
}

impl<I> ChainNode<I, State>
where
    I: Clone + Send + Sync + 'static,
{
    /// Threads `State` directly through the chain as its own accumulator;
    /// no extraction/reinjection step needed (spec.md §4.9: "when `C =
    /// State`, the adapter simply threads State directly").
    pub fn threading(items: Vec<I>, config: ChainConfig, processor: impl ChainProcessor<I, State> + 'static) -> Self {
        Self::new(items, config, processor, |state| state.clone_state(), |acc, _state| acc)
    }
}

#[async_trait]
impl<I, Acc> Node for ChainNode<I, Acc>
where
    I: Clone + fmt::Debug + Send + Sync + 'static,
    Acc: Clone + fmt::Debug + Send + Sync + 'static,
{
    async fn execute(&self, ctx: &NodeContext, state: State) -> Result<State, Box<dyn std::error::Error + Send + Sync>> {
        let initial = (self.extractor)(&state);
        let result = process_chain(ctx, &self.config, &self.items, initial, self.processor.as_ref(), None)
            .await
            .map_err(|e| AdapterError::boxed("chain node failed", e))?;
        Ok((self.reinjector)(result.final_state, &state))
    }
}

/// Presents a bounded-parallel fan-out as a graph [`Node`].
///
/// `aggregator` bridges the parallel output shape (`Vec<R>`, in
/// original-index order) back into the graph's `State` shape (spec.md
/// §4.9: "the aggregator bridges the parallel output shape to the graph
/// state shape").
pub struct ParallelNode<I, R> {
    items: Vec<I>,
    config: ParallelConfig,
    processor: Arc<dyn ParallelProcessor<I, R>>,
    aggregator: Box<dyn Fn(Vec<R>, &State) -> State + Send + Sync>,
}

impl<I, R> ParallelNode<I, R>
where
    I: Clone + Send + Sync + 'static,
    R: Send + Sync + 'static,
{
    pub fn new(
        items: Vec<I>,
        config: ParallelConfig,
        processor: impl ParallelProcessor<I, R> + 'static,
        aggregator: impl Fn(Vec<R>, &State) -> State + Send + Sync + 'static,
    ) -> Self {
        Self {
            items,
            config,
            processor: Arc::new(processor),
            aggregator: Box::new(aggregator),
        }
    }
}

#[async_trait]
impl<I, R> Node for ParallelNode<I, R>
where
    I: Clone + fmt::Debug + Send + Sync + 'static,
    R: Send + Sync + 'static,
{
    async fn execute(&self, ctx: &NodeContext, state: State) -> Result<State, Box<dyn std::error::Error + Send + Sync>> {
        let result = process_parallel(ctx, &self.config, &self.items, &self.processor, None)
            .await
            .map_err(|e| AdapterError::boxed("parallel node failed", e))?;
        Ok((self.aggregator)(result.results, &state))
    }
}

/// Presents a conditional route as a graph [`Node`].
pub struct ConditionalNode {
    config: ConditionalConfig,
    predicate: Arc<RoutePredicate<State>>,
    routes: Routes<State>,
}

impl ConditionalNode {
    pub fn new(config: ConditionalConfig, predicate: Arc<RoutePredicate<State>>, routes: Routes<State>) -> Self {
        Self { config, predicate, routes }
    }
}

#[async_trait]
impl Node for ConditionalNode {
    async fn execute(&self, ctx: &NodeContext, state: State) -> Result<State, Box<dyn std::error::Error + Send + Sync>> {
        process_conditional(ctx, &self.config, state, self.predicate.as_ref(), &self.routes)
            .await
            .map_err(|e| AdapterError::boxed("conditional node failed", e))
    }
}
