use super::{Event, Observer};
use crate::interpreter::NodeContext;

/// Emits every event through `tracing`, at `DEBUG` unless the event's
/// metadata marks `error: true`, in which case it is emitted at `WARN`.
///
/// This is the observer registered under the name `"slog"` and is the
/// default observer for graphs/patterns that do not name one explicitly
/// (spec.md §6.1).
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredLogObserver;

impl Observer for StructuredLogObserver {
    fn on_event(&self, _ctx: &NodeContext, event: Event) {
        let target = event.event_type.target();
        let fields = serde_json::to_string(&event.data.0).unwrap_or_default();
        if event.data.is_error() {
            tracing::warn!(target: "conductor", event = target, source = %event.source, data = %fields);
        } else {
            tracing::debug!(target: "conductor", event = target, source = %event.source, data = %fields);
        }
    }
}
