//! Immutable state carrier with self-describing execution provenance.
//!
//! `State` is the value that flows through a graph run. Every mutating
//! operation returns a new `State`; the receiver is never mutated
//! (spec.md §3, "State" invariants).

use rustc_hash::FxHashMap;
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use chrono::{DateTime, Utc};

use crate::interpreter::NodeContext;
use crate::observer::{self, Event, EventData, EventType, SharedObserver};

/// Immutable state carrier. See module docs and spec.md §3.
#[derive(Clone)]
pub struct State {
    data: FxHashMap<String, Value>,
    run_id: Uuid,
    checkpoint_node: String,
    timestamp: DateTime<Utc>,
    observer: SharedObserver,
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("data", &self.data)
            .field("run_id", &self.run_id)
            .field("checkpoint_node", &self.checkpoint_node)
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
            && self.run_id == other.run_id
            && self.checkpoint_node == other.checkpoint_node
            && self.timestamp == other.timestamp
    }
}

/// Serializable, store-facing projection of a [`State`] snapshot, the
/// checkpoint shape from spec.md §6.3. The observer capability is never
/// part of this shape.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StateSnapshot {
    pub data: FxHashMap<String, Value>,
    pub run_id: Uuid,
    pub checkpoint_node: String,
    pub timestamp: DateTime<Utc>,
}

impl State {
    /// Creates a fresh state with a new run id and the current timestamp.
    /// A `None` observer is substituted with [`observer::noop`].
    pub fn new(observer: Option<SharedObserver>) -> Self {
        let observer = observer.unwrap_or_else(observer::noop);
        let run_id = Uuid::new_v4();
        let state = Self {
            data: FxHashMap::default(),
            run_id,
            checkpoint_node: String::new(),
            timestamp: Utc::now(),
            observer,
        };
        // `State::new` takes no ambient context (spec.md §4.2); a fresh,
        // never-cancelled one satisfies the Observer contract's shape.
        state.observer.on_event(&NodeContext::new(), Event::new(
            EventType::StateCreate,
            "state",
            EventData::new().insert("run_id", run_id.to_string()),
        ));
        state
    }

    /// Reconstructs a State from a persisted snapshot, re-attaching a
    /// (non-persisted) observer capability.
    pub fn from_snapshot(snapshot: StateSnapshot, observer: Option<SharedObserver>) -> Self {
        Self {
            data: snapshot.data,
            run_id: snapshot.run_id,
            checkpoint_node: snapshot.checkpoint_node,
            timestamp: snapshot.timestamp,
            observer: observer.unwrap_or_else(observer::noop),
        }
    }

    pub fn to_snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            data: self.data.clone(),
            run_id: self.run_id,
            checkpoint_node: self.checkpoint_node.clone(),
            timestamp: self.timestamp,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn checkpoint_node(&self) -> &str {
        &self.checkpoint_node
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn observer(&self) -> SharedObserver {
        self.observer.clone()
    }

    /// Returns a copy of this state with the observer capability swapped.
    /// Used after loading a checkpoint, since the observer is never
    /// persisted and the resuming run supplies its own.
    pub fn with_observer(&self, observer: SharedObserver) -> Self {
        let mut clone = self.clone();
        clone.observer = observer;
        clone
    }

    /// O(1) lookup returning the value and a presence flag.
    pub fn get(&self, key: &str) -> (Option<&Value>, bool) {
        match self.data.get(key) {
            Some(v) => (Some(v), true),
            None => (None, false),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Shallow-copies the data map; `run_id`, `checkpoint_node`, `timestamp`,
    /// and `observer` all propagate unchanged.
    pub fn clone_state(&self) -> Self {
        let clone = self.clone();
        self.observer.on_event(&NodeContext::new(), Event::new(
            EventType::StateClone,
            "state",
            EventData::new()
                .insert("run_id", self.run_id.to_string())
                .insert("keys", self.data.len() as i64),
        ));
        clone
    }

    /// Returns a new State with `key` set to `value`.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut clone = self.clone();
        let key = key.into();
        clone.data.insert(key.clone(), value.into());
        self.observer.on_event(&NodeContext::new(), Event::new(
            EventType::StateSet,
            "state",
            EventData::new()
                .insert("run_id", self.run_id.to_string())
                .insert("key", key),
        ));
        clone
    }

    /// Returns a new State with every key of `other` assigned into it
    /// (`other` wins on conflict). Only `data` is combined; `other`'s
    /// `run_id`/`checkpoint_node`/`timestamp`/`observer` are never touched.
    pub fn merge(&self, other: &State) -> Self {
        let mut clone = self.clone();
        for (key, value) in other.data.iter() {
            clone.data.insert(key.clone(), value.clone());
        }
        self.observer.on_event(&NodeContext::new(), Event::new(
            EventType::StateMerge,
            "state",
            EventData::new()
                .insert("run_id", self.run_id.to_string())
                .insert("keys", other.data.len() as i64),
        ));
        clone
    }

    /// Returns a new State with `checkpoint_node` set to `name` and
    /// `timestamp` refreshed to now.
    pub fn set_checkpoint_node(&self, name: impl Into<String>) -> Self {
        let mut clone = self.clone();
        clone.checkpoint_node = name.into();
        clone.timestamp = Utc::now();
        clone
    }

    /// Persists this state via `store.save`.
    pub fn checkpoint<S: crate::checkpoint::CheckpointStore + ?Sized>(
        &self,
        store: &S,
    ) -> Result<(), crate::checkpoint::CheckpointError> {
        store.save(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_is_immutable_and_readable() {
        let s0 = State::new(None);
        let s1 = s0.set("x", json!(1));
        assert_eq!(s1.get("x"), (Some(&json!(1)), true));
        assert_eq!(s0.get("x"), (None, false));
    }

    #[test]
    fn clone_preserves_run_id_and_data() {
        let s0 = State::new(None).set("a", json!(true));
        let s1 = s0.clone_state();
        assert_eq!(s1.run_id(), s0.run_id());
        assert_eq!(s1.get("a"), s0.get("a"));
    }

    #[test]
    fn merge_prefers_other_and_only_touches_data() {
        let s1 = State::new(None).set("a", json!(1)).set("b", json!(2));
        let s2 = State::new(None).set("b", json!(99));
        let merged = s1.merge(&s2);
        assert_eq!(merged.get("a"), (Some(&json!(1)), true));
        assert_eq!(merged.get("b"), (Some(&json!(99)), true));
        assert_eq!(merged.run_id(), s1.run_id());
    }

    #[test]
    fn self_merge_is_idempotent() {
        let s = State::new(None).set("a", json!(1));
        let merged = s.merge(&s);
        assert_eq!(merged.get("a"), s.get("a"));
        assert_eq!(merged.len(), s.len());
    }

    #[test]
    fn set_checkpoint_node_updates_timestamp() {
        let s0 = State::new(None);
        let s1 = s0.set_checkpoint_node("n1");
        assert_eq!(s1.checkpoint_node(), "n1");
        assert_eq!(s0.checkpoint_node(), "");
    }

    #[test]
    fn snapshot_round_trips() {
        let s0 = State::new(None).set("a", json!(1)).set_checkpoint_node("n1");
        let snapshot = s0.to_snapshot();
        let s1 = State::from_snapshot(snapshot, None);
        assert_eq!(s1.get("a"), s0.get("a"));
        assert_eq!(s1.run_id(), s0.run_id());
        assert_eq!(s1.checkpoint_node(), s0.checkpoint_node());
        assert_eq!(s1.timestamp(), s0.timestamp());
    }
}
