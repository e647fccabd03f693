//! Bounded-parallel fan-out with order-preserving aggregation (spec.md §4.7).
//!
//! Coordination is deadlock-free by construction: the work queue and result
//! queue are both buffered to `items.len()`, so no worker ever blocks on
//! submission, and a dedicated collector task drains the result queue
//! concurrently with the workers rather than after them.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::Cancelled;
use crate::interpreter::NodeContext;
use crate::observer::{self, Event, EventData, EventType, ObserverRegistryError};

/// Configuration recognized by [`process_parallel`] (spec.md §6.1).
///
/// `fail_fast` is modeled as `Option<bool>` rather than `bool` so that
/// merging two configs (e.g. a graph-wide default overridden per node) can
/// distinguish "caller never set it" (default `true`) from "caller
/// explicitly turned it off", a plain `bool` can't represent that, and a
/// merge would always silently prefer one side.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// `0` means auto: twice the reported CPU count.
    pub max_workers: usize,
    /// Hard ceiling on worker count regardless of `max_workers`/item count.
    pub worker_cap: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_fast: Option<bool>,
    pub observer: String,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            max_workers: 0,
            worker_cap: 16,
            fail_fast: None,
            observer: "slog".to_string(),
        }
    }
}

impl ParallelConfig {
    /// Resolved fail-fast mode; unset defaults to `true` (spec.md §6.1).
    pub fn fail_fast(&self) -> bool {
        self.fail_fast.unwrap_or(true)
    }

    /// Composes `self` with `override_cfg`, preferring `override_cfg`'s
    /// explicitly-set `fail_fast` but otherwise taking `override_cfg`'s
    /// values wholesale. Preserves "unset" when neither side set it.
    pub fn merge(&self, override_cfg: &ParallelConfig) -> ParallelConfig {
        ParallelConfig {
            fail_fast: override_cfg.fail_fast.or(self.fail_fast),
            ..override_cfg.clone()
        }
    }

    fn resolved_worker_count(&self, items: usize) -> usize {
        let cpu = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        let max_workers = if self.max_workers == 0 { 2 * cpu } else { self.max_workers };
        let worker_cap = if self.worker_cap == 0 { 16 } else { self.worker_cap };
        max_workers.min(worker_cap).min(items).max(1)
    }
}

/// One unit of parallel work: processes `item` at its original `index`.
/// Blanket-implemented for async closures, matching [`crate::patterns::ChainProcessor`]'s
/// ergonomics.
#[async_trait]
pub trait ParallelProcessor<I, R>: Send + Sync
where
    I: Send + Sync,
    R: Send + Sync,
{
    async fn process(&self, ctx: &NodeContext, index: usize, item: &I) -> Result<R, Box<dyn std::error::Error + Send + Sync>>;
}

#[async_trait]
impl<I, R, F, Fut> ParallelProcessor<I, R> for F
where
    I: Send + Sync,
    R: Send + Sync,
    F: Fn(&NodeContext, usize, &I) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<R, Box<dyn std::error::Error + Send + Sync>>> + Send,
{
    async fn process(&self, ctx: &NodeContext, index: usize, item: &I) -> Result<R, Box<dyn std::error::Error + Send + Sync>> {
        (self)(ctx, index, item).await
    }
}

/// A single item's failure, carrying its original index (spec.md §3,
/// "Pattern errors own captured references to the failing item").
#[derive(Debug)]
pub struct TaskError<I> {
    pub index: usize,
    pub item: I,
    pub cause: Box<dyn std::error::Error + Send + Sync>,
}

impl<I> fmt::Display for TaskError<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item {} failed: {}", self.index, self.cause)
    }
}

impl<I: fmt::Debug> std::error::Error for TaskError<I> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.cause.as_ref())
    }
}

/// Result of a completed [`process_parallel`] call. `results` is a compact,
/// successes-only sequence in original-index order (spec.md §4.7,
/// "reference behavior").
#[derive(Debug)]
pub struct ParallelResult<R, I> {
    pub results: Vec<R>,
    pub errors: Vec<TaskError<I>>,
}

/// Failure from [`process_parallel`] (spec.md §7, "ParallelError"): either
/// the configured observer could not be resolved, or a task aggregate,
/// returned in fail-fast mode on any error, or in collect-all mode when
/// every item failed.
#[derive(Debug)]
pub enum ParallelError<I> {
    Observer(ObserverRegistryError),
    Tasks(Vec<TaskError<I>>),
}

impl<I> ParallelError<I> {
    /// The collected per-item failures, or an empty slice for
    /// [`ParallelError::Observer`].
    pub fn errors(&self) -> &[TaskError<I>] {
        match self {
            ParallelError::Observer(_) => &[],
            ParallelError::Tasks(errors) => errors,
        }
    }
}

impl<I> fmt::Display for ParallelError<I> {
    /// Categorizes task errors by `cause` message, sorts categories by
    /// descending frequency (ties broken by message for determinism), and
    /// renders e.g. `"parallel execution failed: 3 items failed with 2
    /// error types: 'timeout' (2 items), 'connection refused' (1 items)"`
    /// (spec.md §4.7, `ParallelError.Error()`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let errors = match self {
            ParallelError::Observer(e) => return write!(f, "parallel observer resolution failed: {e}"),
            ParallelError::Tasks(errors) => errors,
        };

        let mut counts: Vec<(String, usize)> = Vec::new();
        for err in errors {
            let message = err.cause.to_string();
            match counts.iter_mut().find(|(m, _)| *m == message) {
                Some((_, count)) => *count += 1,
                None => counts.push((message, 1)),
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        write!(
            f,
            "parallel execution failed: {} items failed with {} error types: ",
            errors.len(),
            counts.len()
        )?;
        for (i, (message, count)) in counts.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "'{message}' ({count} items)")?;
        }
        Ok(())
    }
}

impl<I: fmt::Debug> std::error::Error for ParallelError<I> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParallelError::Observer(e) => Some(e),
            ParallelError::Tasks(_) => None,
        }
    }
}

impl<I> From<ObserverRegistryError> for ParallelError<I> {
    fn from(e: ObserverRegistryError) -> Self {
        ParallelError::Observer(e)
    }
}

/// Runs `processor` over `items` with a bounded worker pool, preserving
/// original-index order in `results` (spec.md §4.7).
///
/// `progress`, when present, is invoked as `(completed, total)` after every
/// successful item; invocation order across workers is not guaranteed.
pub async fn process_parallel<I, R, P>(
    ctx: &NodeContext,
    config: &ParallelConfig,
    items: &[I],
    processor: &Arc<P>,
    progress: Option<Arc<dyn Fn(usize, usize) + Send + Sync>>,
) -> Result<ParallelResult<R, I>, ParallelError<I>>
where
    I: Clone + Send + Sync + 'static,
    R: Send + Sync + 'static,
    P: ParallelProcessor<I, R> + 'static + ?Sized,
{
    let observer = observer::get_observer(&config.observer)?;

    if items.is_empty() {
        observer.on_event(ctx, Event::new(
            EventType::ParallelStart,
            "parallel",
            EventData::new().insert("workers", 0i64).insert("items", 0i64),
        ));
        observer.on_event(ctx, Event::new(
            EventType::ParallelComplete,
            "parallel",
            EventData::new().insert("succeeded", 0i64).insert("failed", 0i64),
        ));
        return Ok(ParallelResult { results: Vec::new(), errors: Vec::new() });
    }

    let fail_fast = config.fail_fast();
    let workers = config.resolved_worker_count(items.len());

    observer.on_event(ctx, Event::new(
        EventType::ParallelStart,
        "parallel",
        EventData::new().insert("workers", workers as i64).insert("items", items.len() as i64),
    ));

    let worker_ctx = if fail_fast { ctx.child() } else { ctx.clone() };

    let (work_tx, work_rx) = flume::bounded::<(usize, I)>(items.len());
    for (index, item) in items.iter().cloned().enumerate() {
        work_tx.send((index, item)).expect("work channel sized to items.len()");
    }
    drop(work_tx);

    let (result_tx, result_rx) = flume::bounded::<(usize, Result<R, TaskError<I>>)>(items.len());

    let completed = Arc::new(AtomicU64::new(0));
    let total = items.len();

    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        let work_rx = work_rx.clone();
        let result_tx = result_tx.clone();
        let processor = Arc::clone(processor);
        let observer = observer.clone();
        let completed = Arc::clone(&completed);
        let progress = progress.clone();
        let worker_ctx = worker_ctx.clone();
        let fail_fast_flag = fail_fast;

        handles.push(tokio::spawn(async move {
            while let Ok((index, item)) = work_rx.recv_async().await {
                if worker_ctx.is_cancelled() {
                    let _ = result_tx
                        .send_async((
                            index,
                            Err(TaskError { index, item, cause: Box::new(Cancelled) }),
                        ))
                        .await;
                    continue;
                }

                observer.on_event(&worker_ctx, Event::new(EventType::WorkerStart, "parallel", EventData::new().insert("index", index as i64)));
                let outcome = processor.process(&worker_ctx, index, &item).await;
                observer.on_event(&worker_ctx, Event::new(
                    EventType::WorkerComplete,
                    "parallel",
                    EventData::new().insert("index", index as i64).insert("error", outcome.is_err()),
                ));

                match outcome {
                    Ok(value) => {
                        let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                        if let Some(callback) = &progress {
                            callback(done as usize, total);
                        }
                        let _ = result_tx.send_async((index, Ok(value))).await;
                    }
                    Err(cause) => {
                        if fail_fast_flag {
                            worker_ctx.cancel();
                        }
                        let _ = result_tx.send_async((index, Err(TaskError { index, item, cause }))).await;
                    }
                }
            }
        }));
    }
    drop(result_tx);
    drop(work_rx);

    let collector = tokio::spawn(async move {
        let mut collected: FxHashMap<usize, Result<R, TaskError<I>>> = FxHashMap::default();
        while let Ok((index, outcome)) = result_rx.recv_async().await {
            collected.insert(index, outcome);
        }
        collected
    });

    for handle in handles {
        let _ = handle.await;
    }
    let mut collected = collector.await.expect("collector task never panics");

    let mut results = Vec::new();
    let mut errors = Vec::new();
    for index in 0..items.len() {
        match collected.remove(&index) {
            Some(Ok(value)) => results.push(value),
            Some(Err(task_error)) => errors.push(task_error),
            None => {}
        }
    }

    observer.on_event(ctx, Event::new(
        EventType::ParallelComplete,
        "parallel",
        EventData::new().insert("succeeded", results.len() as i64).insert("failed", errors.len() as i64),
    ));

    if fail_fast {
        if !errors.is_empty() {
            return Err(ParallelError::Tasks(errors));
        }
        return Ok(ParallelResult { results, errors: Vec::new() });
    }

    if results.is_empty() && !errors.is_empty() {
        return Err(ParallelError::Tasks(errors));
    }
    Ok(ParallelResult { results, errors })
}
