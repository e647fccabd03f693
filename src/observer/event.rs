//! Event taxonomy for the orchestration core.
//!
//! Events are the only channel through which a graph run, a checkpoint
//! operation, or a pattern invocation becomes visible to the outside world.
//! They carry identifiers, indices, counts, and booleans, never
//! application data (spec.md §3, "Observer").

use std::fmt;

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The kind of event emitted by a component of the orchestration core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    StateCreate,
    StateClone,
    StateSet,
    StateMerge,

    GraphStart,
    GraphComplete,
    NodeStart,
    NodeComplete,
    EdgeEvaluate,
    EdgeTransition,
    CycleDetected,

    CheckpointSave,
    CheckpointLoad,
    CheckpointResume,

    ChainStart,
    ChainComplete,
    StepStart,
    StepComplete,

    ParallelStart,
    ParallelComplete,
    WorkerStart,
    WorkerComplete,

    RouteEvaluate,
    RouteSelect,
    RouteExecute,
}

impl EventType {
    /// A short tracing-friendly target name, e.g. `"graph.node_start"`.
    pub fn target(self) -> &'static str {
        match self {
            EventType::StateCreate => "state.create",
            EventType::StateClone => "state.clone",
            EventType::StateSet => "state.set",
            EventType::StateMerge => "state.merge",
            EventType::GraphStart => "graph.start",
            EventType::GraphComplete => "graph.complete",
            EventType::NodeStart => "graph.node_start",
            EventType::NodeComplete => "graph.node_complete",
            EventType::EdgeEvaluate => "graph.edge_evaluate",
            EventType::EdgeTransition => "graph.edge_transition",
            EventType::CycleDetected => "graph.cycle_detected",
            EventType::CheckpointSave => "checkpoint.save",
            EventType::CheckpointLoad => "checkpoint.load",
            EventType::CheckpointResume => "checkpoint.resume",
            EventType::ChainStart => "chain.start",
            EventType::ChainComplete => "chain.complete",
            EventType::StepStart => "chain.step_start",
            EventType::StepComplete => "chain.step_complete",
            EventType::ParallelStart => "parallel.start",
            EventType::ParallelComplete => "parallel.complete",
            EventType::WorkerStart => "parallel.worker_start",
            EventType::WorkerComplete => "parallel.worker_complete",
            EventType::RouteEvaluate => "conditional.route_evaluate",
            EventType::RouteSelect => "conditional.route_select",
            EventType::RouteExecute => "conditional.route_execute",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.target())
    }
}

/// Metadata attached to an [`Event`]. Only identifiers, indices, counts,
/// and booleans are permitted. This is a closed `serde_json::Value` map
/// by convention, not by type enforcement, matching spec.md's wording
/// ("MUST NOT" is a contract on callers of [`EventData::insert`]).
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct EventData(pub FxHashMap<String, Value>);

impl EventData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// True when the event's metadata marks its source operation as failed.
    pub fn is_error(&self) -> bool {
        self.0.get("error").and_then(Value::as_bool).unwrap_or(false)
    }
}

/// A single observability event emitted by State, the graph interpreter,
/// the checkpoint store, or one of the three workflow patterns.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    /// Name of the graph, pattern, or component that emitted this event.
    pub source: String,
    pub data: EventData,
}

impl Event {
    pub fn new(event_type: EventType, source: impl Into<String>, data: EventData) -> Self {
        Self {
            event_type,
            timestamp: Utc::now(),
            source: source.into(),
            data,
        }
    }

    /// Stable JSON projection of this event for machine-readable sinks.
    pub fn to_json_value(&self) -> Value {
        serde_json::json!({
            "type": self.event_type.target(),
            "source": self.source,
            "timestamp": self.timestamp.to_rfc3339(),
            "data": self.data.0,
        })
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} {:?}", self.source, self.event_type, self.data.0)
    }
}
