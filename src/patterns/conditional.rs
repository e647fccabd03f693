//! Predicate-based conditional routing: a single-shot `State -> handler`
//! selection with a default fallback (spec.md §4.8).

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::Cancelled;
use crate::interpreter::NodeContext;
use crate::observer::{self, Event, EventData, EventType, ObserverRegistryError};

/// Configuration recognized by [`process_conditional`] (spec.md §6.1).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConditionalConfig {
    pub observer: String,
}

impl Default for ConditionalConfig {
    fn default() -> Self {
        Self { observer: "slog".to_string() }
    }
}

/// A route handler transforming `S` (spec.md §4.8, "Handler"). Blanket
/// implemented for async closures, matching the other two patterns'
/// ergonomics.
#[async_trait]
pub trait ConditionalHandler<S>: Send + Sync
where
    S: Send + Sync,
{
    async fn handle(&self, ctx: &NodeContext, state: S) -> Result<S, Box<dyn std::error::Error + Send + Sync>>;
}

#[async_trait]
impl<S, F, Fut> ConditionalHandler<S> for F
where
    S: Send + Sync,
    F: Fn(&NodeContext, S) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<S, Box<dyn std::error::Error + Send + Sync>>> + Send,
{
    async fn handle(&self, ctx: &NodeContext, state: S) -> Result<S, Box<dyn std::error::Error + Send + Sync>> {
        (self)(ctx, state).await
    }
}

/// A predicate deciding which named route to take, given `&S` (spec.md
/// §4.8: `predicate(state) -> (name, err)`).
pub type RoutePredicate<S> = dyn Fn(&S) -> Result<String, Box<dyn std::error::Error + Send + Sync>> + Send + Sync;

/// The named handlers and optional default a [`process_conditional`] call
/// selects among (spec.md §4.8, `routes`).
pub struct Routes<S: Send + Sync + 'static> {
    handlers: FxHashMap<String, Arc<dyn ConditionalHandler<S>>>,
    default: Option<Arc<dyn ConditionalHandler<S>>>,
}

impl<S: Send + Sync + 'static> Default for Routes<S> {
    fn default() -> Self {
        Self { handlers: FxHashMap::default(), default: None }
    }
}

impl<S: Send + Sync + 'static> Routes<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(mut self, name: impl Into<String>, handler: impl ConditionalHandler<S> + 'static) -> Self {
        self.handlers.insert(name.into(), Arc::new(handler));
        self
    }

    pub fn with_default(mut self, handler: impl ConditionalHandler<S> + 'static) -> Self {
        self.default = Some(Arc::new(handler));
        self
    }

    pub fn route_count(&self) -> usize {
        self.handlers.len()
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    fn resolve(&self, name: &str) -> Option<Arc<dyn ConditionalHandler<S>>> {
        self.handlers.get(name).cloned().or_else(|| self.default.clone())
    }
}

/// Failure from [`process_conditional`] (spec.md §7, "ConditionalError").
/// `route` is empty when the predicate itself failed, before any route
/// name was known.
#[derive(Debug)]
pub struct ConditionalError<S> {
    pub route: String,
    pub state: S,
    pub cause: Box<dyn std::error::Error + Send + Sync>,
}

impl<S> fmt::Display for ConditionalError<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.route.is_empty() {
            write!(f, "conditional routing failed: {}", self.cause)
        } else {
            write!(f, "conditional route '{}' failed: {}", self.route, self.cause)
        }
    }
}

impl<S: fmt::Debug> std::error::Error for ConditionalError<S> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.cause.as_ref())
    }
}

#[derive(Debug)]
struct NoHandler(String);

impl fmt::Display for NoHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no handler registered for route '{}' and no default route configured", self.0)
    }
}

impl std::error::Error for NoHandler {}

/// Evaluates `predicate(&state)` to select a handler from `routes` and
/// runs it (spec.md §4.8).
pub async fn process_conditional<S>(
    ctx: &NodeContext,
    config: &ConditionalConfig,
    state: S,
    predicate: &RoutePredicate<S>,
    routes: &Routes<S>,
) -> Result<S, ConditionalError<S>>
where
    S: Clone + Send + Sync + 'static,
{
    let observer = observer::get_observer(&config.observer).map_err(|e: ObserverRegistryError| ConditionalError {
        route: String::new(),
        state: state.clone(),
        cause: Box::new(e),
    })?;

    if ctx.is_cancelled() {
        return Err(ConditionalError { route: String::new(), state, cause: Box::new(Cancelled) });
    }

    observer.on_event(ctx, Event::new(
        EventType::RouteEvaluate,
        "conditional",
        EventData::new()
            .insert("route_count", routes.route_count() as i64)
            .insert("has_default", routes.has_default()),
    ));

    let route = match predicate(&state) {
        Ok(name) => name,
        Err(cause) => return Err(ConditionalError { route: String::new(), state, cause }),
    };

    let handler = match routes.resolve(&route) {
        Some(handler) => handler,
        None => return Err(ConditionalError { route: route.clone(), state, cause: Box::new(NoHandler(route)) }),
    };

    observer.on_event(ctx, Event::new(EventType::RouteSelect, "conditional", EventData::new().insert("route", route.clone())));

    if ctx.is_cancelled() {
        return Err(ConditionalError { route, state, cause: Box::new(Cancelled) });
    }

    let pre_state = state.clone();
    let outcome = handler.handle(ctx, state).await;
    observer.on_event(ctx, Event::new(
        EventType::RouteExecute,
        "conditional",
        EventData::new().insert("route", route.clone()).insert("error", outcome.is_err()),
    ));

    match outcome {
        Ok(new_state) => Ok(new_state),
        Err(cause) => Err(ConditionalError { route, state: pre_state, cause }),
    }
}
