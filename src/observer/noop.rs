use super::{Event, Observer};
use crate::interpreter::NodeContext;

/// Discards every event. The default substitute whenever a `None` observer
/// is supplied (spec.md §4.2, `State::new`).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn on_event(&self, _ctx: &NodeContext, _event: Event) {}
}
