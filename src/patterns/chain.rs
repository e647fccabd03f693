//! Sequential fold: a state-accumulating chain over a sequence of items
//! (spec.md §4.6).

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Cancelled;
use crate::interpreter::NodeContext;
use crate::observer::{self, Event, EventData, EventType, ObserverRegistryError};

/// Configuration recognized by [`process_chain`] (spec.md §6.1).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainConfig {
    pub capture_intermediate_states: bool,
    pub observer: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            capture_intermediate_states: false,
            observer: "slog".to_string(),
        }
    }
}

/// One step of a chain: folds `item` into the running accumulator `Acc`.
/// Blanket-implemented for async closures so inline steps need no explicit
/// impl, matching the teacher's `FnNode`-style ergonomics
/// (`crate::graph::node::FnNode`).
#[async_trait]
pub trait ChainProcessor<I, Acc>: Send + Sync
where
    I: Send + Sync,
    Acc: Send + Sync,
{
    async fn process(&self, ctx: &NodeContext, item: &I, acc: Acc) -> Result<Acc, Box<dyn std::error::Error + Send + Sync>>;
}

#[async_trait]
impl<I, Acc, F, Fut> ChainProcessor<I, Acc> for F
where
    I: Send + Sync,
    Acc: Send + Sync,
    F: Fn(&NodeContext, &I, Acc) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<Acc, Box<dyn std::error::Error + Send + Sync>>> + Send,
{
    async fn process(&self, ctx: &NodeContext, item: &I, acc: Acc) -> Result<Acc, Box<dyn std::error::Error + Send + Sync>> {
        (self)(ctx, item, acc).await
    }
}

/// Result of a completed chain fold (spec.md §4.6).
#[derive(Debug, Clone)]
pub struct ChainResult<Acc> {
    pub final_state: Acc,
    pub intermediate: Option<Vec<Acc>>,
    pub steps: usize,
}

/// Failure from [`process_chain`] (spec.md §7, "ChainError").
#[derive(Debug)]
pub enum ChainError<I, Acc> {
    /// The configured observer name could not be resolved.
    Observer(ObserverRegistryError),
    /// Item `step_index` failed; `state` is the accumulator as of the start
    /// of that step (spec.md §4.6: "return. Do not invoke progress.").
    Step {
        step_index: usize,
        item: I,
        state: Acc,
        cause: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl<I, Acc> fmt::Display for ChainError<I, Acc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::Observer(e) => write!(f, "chain observer resolution failed: {e}"),
            ChainError::Step { step_index, cause, .. } => write!(f, "chain step {step_index} failed: {cause}"),
        }
    }
}

impl<I: fmt::Debug, Acc: fmt::Debug> std::error::Error for ChainError<I, Acc> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChainError::Observer(e) => Some(e),
            ChainError::Step { cause, .. } => Some(cause.as_ref()),
        }
    }
}

impl<I, Acc> From<ObserverRegistryError> for ChainError<I, Acc> {
    fn from(e: ObserverRegistryError) -> Self {
        ChainError::Observer(e)
    }
}

/// Folds `processor` over `items`, threading an accumulator from `initial`
/// through each step in order (spec.md §4.6).
///
/// `progress`, when present, is invoked with `(completed, total, &state)`
/// after every successful step, never after a failing one.
pub async fn process_chain<I, Acc, P>(
    ctx: &NodeContext,
    config: &ChainConfig,
    items: &[I],
    initial: Acc,
    processor: &P,
    progress: Option<&(dyn Fn(usize, usize, &Acc) + Send + Sync)>,
) -> Result<ChainResult<Acc>, ChainError<I, Acc>>
where
    I: Clone + Send + Sync,
    Acc: Clone + Send + Sync,
    P: ChainProcessor<I, Acc> + ?Sized,
{
    let observer = observer::get_observer(&config.observer)?;
    observer.on_event(ctx, Event::new(
        EventType::ChainStart,
        "chain",
        EventData::new()
            .insert("items", items.len() as i64)
            .insert("capture", config.capture_intermediate_states),
    ));

    if items.is_empty() {
        observer.on_event(ctx, Event::new(EventType::ChainComplete, "chain", EventData::new().insert("steps", 0i64)));
        return Ok(ChainResult {
            final_state: initial,
            intermediate: None,
            steps: 0,
        });
    }

    let mut intermediate = config.capture_intermediate_states.then(|| vec![initial.clone()]);
    let mut state = initial;

    for (index, item) in items.iter().enumerate() {
        if ctx.is_cancelled() {
            return Err(ChainError::Step {
                step_index: index,
                item: item.clone(),
                state,
                cause: Box::new(Cancelled),
            });
        }

        observer.on_event(ctx, Event::new(EventType::StepStart, "chain", EventData::new().insert("index", index as i64)));
        let outcome = processor.process(ctx, item, state.clone()).await;
        observer.on_event(ctx, Event::new(
            EventType::StepComplete,
            "chain",
            EventData::new().insert("index", index as i64).insert("error", outcome.is_err()),
        ));

        match outcome {
            Ok(new_state) => {
                state = new_state;
                if let Some(buffer) = intermediate.as_mut() {
                    buffer.push(state.clone());
                }
                if let Some(callback) = progress {
                    callback(index + 1, items.len(), &state);
                }
            }
            Err(cause) => {
                return Err(ChainError::Step {
                    step_index: index,
                    item: item.clone(),
                    state,
                    cause,
                })
            }
        }
    }

    observer.on_event(ctx, Event::new(
        EventType::ChainComplete,
        "chain",
        EventData::new().insert("steps", items.len() as i64),
    ));

    Ok(ChainResult {
        final_state: state,
        intermediate,
        steps: items.len(),
    })
}
