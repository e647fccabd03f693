use std::collections::HashSet;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::{Edge, Node, ValidationError};
use crate::checkpoint::{self, CheckpointStoreRegistry, SharedCheckpointStore};
use crate::graph::config::GraphConfig;
use crate::observer::{self, ObserverRegistry, SharedObserver};

/// A directed graph of named nodes and edges (spec.md §3, "Graph").
///
/// Built once via [`AddNode`](Graph::add_node)/[`AddEdge`](Graph::add_edge)/
/// [`SetEntryPoint`](Graph::set_entry_point)/[`SetExitPoint`](Graph::set_exit_point),
/// then treated as immutable for the lifetime of its executions.
pub struct Graph {
    name: String,
    nodes: FxHashMap<String, Arc<dyn Node>>,
    /// from-name -> ordered edges, insertion order preserved.
    adjacency: FxHashMap<String, Vec<Edge>>,
    entry_point: Option<String>,
    exit_points: HashSet<String>,
    max_iterations: u64,
    checkpoint_interval: u64,
    checkpoint_preserve: bool,
    observer: SharedObserver,
    checkpoint_store: Option<SharedCheckpointStore>,
}

impl Graph {
    /// Resolves the configured observer (and checkpoint store, if
    /// checkpointing is enabled) via the process-wide registries; lookup
    /// errors fail construction (spec.md §4.3).
    pub fn new(config: GraphConfig) -> Result<Self, ValidationError> {
        Self::with_registries(config, &ObserverRegistry::default(), None)
    }

    /// As [`Graph::new`], but resolving names against explicit registries
    /// rather than the process-wide ones. Useful for tests that want
    /// isolation from global registration.
    pub fn with_registries(
        config: GraphConfig,
        observer_registry: &ObserverRegistry,
        checkpoint_registry: Option<&CheckpointStoreRegistry>,
    ) -> Result<Self, ValidationError> {
        let observer = observer_registry.get(&config.observer)?;
        let checkpoint_store = match &config.checkpoint {
            Some(cp) if cp.interval > 0 => {
                let store = match checkpoint_registry {
                    Some(registry) => registry.get(&cp.store)?,
                    None => checkpoint::get_checkpoint_store(&cp.store)?,
                };
                Some(store)
            }
            _ => None,
        };

        let (interval, preserve) = config
            .checkpoint
            .as_ref()
            .map(|cp| (cp.interval, cp.preserve))
            .unwrap_or((0, false));

        Ok(Self {
            name: config.name,
            nodes: FxHashMap::default(),
            adjacency: FxHashMap::default(),
            entry_point: None,
            exit_points: HashSet::new(),
            max_iterations: config.max_iterations,
            checkpoint_interval: interval,
            checkpoint_preserve: preserve,
            observer,
            checkpoint_store,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_node(&mut self, name: impl Into<String>, node: impl Node + 'static) -> Result<&mut Self, ValidationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValidationError::EmptyNodeName);
        }
        if self.nodes.contains_key(&name) {
            return Err(ValidationError::DuplicateNode(name));
        }
        self.nodes.insert(name, Arc::new(node));
        Ok(self)
    }

    /// Multiple edges from the same `from` are permitted; insertion order
    /// is the evaluation order (spec.md §4.3).
    pub fn add_edge(&mut self, edge: Edge) -> Result<&mut Self, ValidationError> {
        if edge.from.is_empty() || edge.to.is_empty() {
            return Err(ValidationError::EmptyEdgeEndpoint);
        }
        if !self.nodes.contains_key(&edge.from) {
            return Err(ValidationError::UnknownEdgeNode(edge.from.clone()));
        }
        if !self.nodes.contains_key(&edge.to) {
            return Err(ValidationError::UnknownEdgeNode(edge.to.clone()));
        }
        self.adjacency.entry(edge.from.clone()).or_default().push(edge);
        Ok(self)
    }

    pub fn set_entry_point(&mut self, name: impl Into<String>) -> Result<&mut Self, ValidationError> {
        let name = name.into();
        if let Some(existing) = &self.entry_point {
            return Err(ValidationError::EntryPointAlreadySet(existing.clone()));
        }
        if !self.nodes.contains_key(&name) {
            return Err(ValidationError::UnknownEntryPoint(name));
        }
        self.entry_point = Some(name);
        Ok(self)
    }

    pub fn set_exit_point(&mut self, name: impl Into<String>) -> Result<&mut Self, ValidationError> {
        let name = name.into();
        if !self.nodes.contains_key(&name) {
            return Err(ValidationError::UnknownExitPoint(name));
        }
        self.exit_points.insert(name);
        Ok(self)
    }

    /// Succeeds iff at least one node exists, the entry point is set and
    /// present, and at least one exit point is set with all names
    /// referencing registered nodes (spec.md §4.3).
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.nodes.is_empty() {
            return Err(ValidationError::NoNodes);
        }
        let entry = self.entry_point.as_ref().ok_or(ValidationError::NoEntryPoint)?;
        if !self.nodes.contains_key(entry) {
            return Err(ValidationError::EntryPointMissing(entry.clone()));
        }
        if self.exit_points.is_empty() {
            return Err(ValidationError::NoExitPoints);
        }
        for exit in &self.exit_points {
            if !self.nodes.contains_key(exit) {
                return Err(ValidationError::UnknownExitPoint(exit.clone()));
            }
        }
        Ok(())
    }

    pub fn entry_point(&self) -> Option<&str> {
        self.entry_point.as_deref()
    }

    pub fn is_exit_point(&self, name: &str) -> bool {
        self.exit_points.contains(name)
    }

    pub fn exit_point_count(&self) -> usize {
        self.exit_points.len()
    }

    pub fn node(&self, name: &str) -> Option<&Arc<dyn Node>> {
        self.nodes.get(name)
    }

    pub fn node_names(&self) -> impl Iterator<Item = &String> {
        self.nodes.keys()
    }

    pub fn edges_from(&self, name: &str) -> &[Edge] {
        self.adjacency.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn max_iterations(&self) -> u64 {
        self.max_iterations
    }

    pub fn checkpoint_interval(&self) -> u64 {
        self.checkpoint_interval
    }

    pub fn checkpoint_preserve(&self) -> bool {
        self.checkpoint_preserve
    }

    pub fn checkpoint_store(&self) -> Option<&SharedCheckpointStore> {
        self.checkpoint_store.as_ref()
    }

    pub fn observer(&self) -> SharedObserver {
        self.observer.clone()
    }
}

/// Convenience constructor using [`observer::noop`] and no checkpointing,
/// for tests and small examples that do not need named registries.
pub fn simple_graph(name: impl Into<String>) -> Graph {
    Graph {
        name: name.into(),
        nodes: FxHashMap::default(),
        adjacency: FxHashMap::default(),
        entry_point: None,
        exit_points: HashSet::new(),
        max_iterations: 1_000,
        checkpoint_interval: 0,
        checkpoint_preserve: false,
        observer: observer::noop(),
        checkpoint_store: None,
    }
}
