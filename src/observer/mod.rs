//! Observer contract and the built-in Observer implementations.
//!
//! An [`Observer`] is a capability, not an owner: State, the graph
//! interpreter, the checkpoint store, and the three workflow patterns all
//! hold one and call [`Observer::on_event`] at the points spec.md §4.1
//! enumerates. Observers MUST be side-effect-bounded (logging, metrics) and
//! must never mutate workflow state.

mod event;
mod multiplex;
mod noop;
pub mod registry;
mod structured;

pub use event::{Event, EventData, EventType};
pub use multiplex::MultiplexObserver;
pub use noop::NoopObserver;
pub use registry::{ObserverRegistry, ObserverRegistryError};
pub use structured::StructuredLogObserver;

use std::fmt;
use std::sync::Arc;

use crate::interpreter::NodeContext;

/// Capability receiving workflow observability [`Event`]s.
///
/// Implementations MUST be callable concurrently: graph execution,
/// checkpoint I/O, and parallel pattern workers may all emit through the
/// same observer instance at once. `ctx` is threaded through to match
/// spec.md §4.1/§6.2's `OnEvent(ctx, Event)` surface; bundled observers
/// ignore it since logging/metrics sinks have no use for cancellation
/// state, but a custom observer MAY read it (e.g. to tag emitted spans
/// with a request id carried on the context).
pub trait Observer: Send + Sync + fmt::Debug {
    fn on_event(&self, ctx: &NodeContext, event: Event);
}

/// Convenience alias used throughout the crate for a shared observer handle.
pub type SharedObserver = Arc<dyn Observer>;

/// Returns a [`NoopObserver`] wrapped for use as a default capability.
pub fn noop() -> SharedObserver {
    Arc::new(NoopObserver)
}
