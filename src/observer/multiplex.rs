use super::{Event, Observer, SharedObserver};
use crate::interpreter::NodeContext;

/// Fans an event out to every child observer. Child entries are plain
/// `SharedObserver`s, so there is nothing "nil" to filter at the type
/// level; [`MultiplexObserver::new`] simply forwards to whatever was
/// registered. Callers that want to skip a child conditionally should not
/// register it.
#[derive(Debug, Clone)]
pub struct MultiplexObserver {
    children: Vec<SharedObserver>,
}

impl MultiplexObserver {
    pub fn new(children: Vec<SharedObserver>) -> Self {
        Self { children }
    }
}

impl Observer for MultiplexObserver {
    fn on_event(&self, ctx: &NodeContext, event: Event) {
        for child in &self.children {
            child.on_event(ctx, event.clone());
        }
    }
}
