//! Graph interpreter: the traversal loop shared by `Execute` and `Resume`
//! (spec.md §4.4).
//!
//! The loop itself lives as inherent methods on [`crate::graph::Graph`]
//! rather than a separate "interpreter" type. The graph owns everything
//! the loop needs (nodes, edges, observer, checkpoint store) and is
//! immutable for the lifetime of its executions, so there is nothing a
//! wrapper type would add. This mirrors the teacher's split between `App`
//! (topology) and `AppRunner` (execution) only insofar as construction and
//! traversal are separate files; unlike the teacher, Conductor has no
//! session/runner layer to own, since a run's only mutable artifact is the
//! State thread itself.

mod context;
mod error;

pub use context::NodeContext;
pub use error::{ExecutionCause, ExecutionError};

use rustc_hash::FxHashMap;
use tracing::instrument;
use uuid::Uuid;

use crate::graph::Graph;
use crate::observer::{Event, EventData, EventType};
use crate::state::State;

impl Graph {
    /// Runs this graph to completion from `initial`, starting at the
    /// configured entry point (spec.md §4.4).
    #[instrument(skip(self, ctx, initial), fields(graph = %self.name()), err)]
    pub async fn execute(&self, ctx: &NodeContext, initial: State) -> Result<State, ExecutionError> {
        let entry = self.entry_point().unwrap_or_default().to_string();
        self.traverse(ctx, initial, entry).await
    }

    /// Resumes a previously checkpointed run, continuing from the node
    /// immediately after the loaded checkpoint (spec.md §4.4 "Resume
    /// specifics").
    #[instrument(skip(self, ctx), fields(graph = %self.name(), run_id = %run_id), err)]
    pub async fn resume(&self, ctx: &NodeContext, run_id: Uuid) -> Result<State, ExecutionError> {
        self.validate()
            .map_err(|e| ExecutionError::new("", State::new(Some(self.observer())), vec![], ExecutionCause::Validation(e)))?;

        let store = self.checkpoint_store().ok_or_else(|| {
            ExecutionError::new("", State::new(Some(self.observer())), vec![], ExecutionCause::CheckpointNotConfigured)
        })?;

        let loaded = store
            .load(run_id)
            .map_err(|e| ExecutionError::new("", State::new(Some(self.observer())), vec![], ExecutionCause::CheckpointLoad(e)))?;
        let state = loaded.with_observer(self.observer());

        let checkpoint_node = state.checkpoint_node().to_string();
        self.observer().on_event(ctx, Event::new(
            EventType::CheckpointLoad,
            self.name(),
            EventData::new()
                .insert("run_id", run_id.to_string())
                .insert("checkpoint_node", checkpoint_node.clone()),
        ));

        if self.is_exit_point(&checkpoint_node) {
            return Err(ExecutionError::new(
                checkpoint_node.clone(),
                state,
                vec![],
                ExecutionCause::AlreadyComplete(checkpoint_node),
            ));
        }

        let resume_node = self
            .edges_from(&checkpoint_node)
            .iter()
            .find(|edge| edge.matches(&state))
            .map(|edge| edge.to.clone());

        let resume_node = match resume_node {
            Some(node) => node,
            None => {
                return Err(ExecutionError::new(
                    checkpoint_node.clone(),
                    state,
                    vec![],
                    ExecutionCause::NoValidTransition(checkpoint_node),
                ))
            }
        };

        self.observer().on_event(ctx, Event::new(
            EventType::CheckpointResume,
            self.name(),
            EventData::new()
                .insert("checkpoint_node", checkpoint_node)
                .insert("resume_node", resume_node.clone())
                .insert("run_id", run_id.to_string()),
        ));

        self.traverse(ctx, state, resume_node).await
    }

    /// The shared traversal loop (spec.md §4.4, steps 1-3m). `start_node`
    /// is the entry point for `execute` or the resume node for `resume`;
    /// `visited`/`path`/`iterations` always start fresh here, per spec.md
    /// "`visited` is per-execution, not persisted across resume".
    async fn traverse(&self, ctx: &NodeContext, mut state: State, start_node: String) -> Result<State, ExecutionError> {
        self.validate()
            .map_err(|e| ExecutionError::new(start_node.clone(), state.clone_state(), vec![], ExecutionCause::Validation(e)))?;

        let observer = self.observer();
        observer.on_event(ctx, Event::new(
            EventType::GraphStart,
            self.name(),
            EventData::new()
                .insert("entry_point", start_node.clone())
                .insert("run_id", state.run_id().to_string())
                .insert("exit_point_count", self.exit_point_count() as i64),
        ));

        let mut iterations: u64 = 0;
        let mut visited: FxHashMap<String, u64> = FxHashMap::default();
        let mut path: Vec<String> = Vec::new();
        let mut current = start_node;

        loop {
            if ctx.is_cancelled() {
                return Err(ExecutionError::new(current, state, path, ExecutionCause::Cancelled));
            }

            iterations += 1;
            if iterations > self.max_iterations() {
                return Err(ExecutionError::new(
                    current,
                    state,
                    path,
                    ExecutionCause::IterationCap { max: self.max_iterations() },
                ));
            }

            path.push(current.clone());
            let visit_count = {
                let count = visited.entry(current.clone()).or_insert(0);
                *count += 1;
                *count
            };
            if visit_count > 1 {
                observer.on_event(ctx, Event::new(
                    EventType::CycleDetected,
                    self.name(),
                    EventData::new()
                        .insert("node", current.clone())
                        .insert("visit_count", visit_count as i64)
                        .insert("iteration", iterations as i64)
                        .insert("path_length", path.len() as i64),
                ));
            }

            let node = match self.node(&current) {
                Some(node) => node.clone(),
                None => return Err(ExecutionError::new(current.clone(), state, path, ExecutionCause::MissingNode(current))),
            };

            observer.on_event(ctx, Event::new(
                EventType::NodeStart,
                self.name(),
                EventData::new().insert("node", current.clone()).insert("iteration", iterations as i64),
            ));

            let pre_state = state.clone_state();
            let outcome = node.execute(ctx, state.clone_state()).await;

            observer.on_event(ctx, Event::new(
                EventType::NodeComplete,
                self.name(),
                EventData::new()
                    .insert("node", current.clone())
                    .insert("iteration", iterations as i64)
                    .insert("error", outcome.is_err()),
            ));

            state = match outcome {
                Ok(new_state) => new_state.set_checkpoint_node(current.clone()),
                Err(cause) => {
                    return Err(ExecutionError::new(
                        current.clone(),
                        pre_state,
                        path,
                        ExecutionCause::NodeFailed(current, cause),
                    ))
                }
            };

            if self.checkpoint_interval() > 0 && iterations % self.checkpoint_interval() == 0 {
                if let Some(store) = self.checkpoint_store() {
                    match state.checkpoint(store.as_ref()) {
                        Ok(()) => observer.on_event(ctx, Event::new(
                            EventType::CheckpointSave,
                            self.name(),
                            EventData::new()
                                .insert("node", current.clone())
                                .insert("iteration", iterations as i64)
                                .insert("run_id", state.run_id().to_string()),
                        )),
                        Err(cause) => {
                            return Err(ExecutionError::new(current.clone(), state, path, ExecutionCause::CheckpointSave(cause)))
                        }
                    }
                }
            }

            if self.is_exit_point(&current) {
                observer.on_event(ctx, Event::new(
                    EventType::GraphComplete,
                    self.name(),
                    EventData::new()
                        .insert("node", current.clone())
                        .insert("run_id", state.run_id().to_string())
                        .insert("path_length", path.len() as i64),
                ));
                if self.checkpoint_interval() > 0 && !self.checkpoint_preserve() {
                    if let Some(store) = self.checkpoint_store() {
                        let _ = store.delete(state.run_id());
                    }
                }
                return Ok(state);
            }

            let edges = self.edges_from(&current);
            if edges.is_empty() {
                return Err(ExecutionError::new(current.clone(), state, path, ExecutionCause::NoOutgoingEdges(current)));
            }

            let mut transition = None;
            for (index, edge) in edges.iter().enumerate() {
                observer.on_event(ctx, Event::new(
                    EventType::EdgeEvaluate,
                    self.name(),
                    EventData::new()
                        .insert("from", edge.from.clone())
                        .insert("to", edge.to.clone())
                        .insert("edge_index", index as i64)
                        .insert("has_predicate", edge.has_predicate()),
                ));
                if edge.matches(&state) {
                    observer.on_event(ctx, Event::new(
                        EventType::EdgeTransition,
                        self.name(),
                        EventData::new()
                            .insert("from", edge.from.clone())
                            .insert("to", edge.to.clone())
                            .insert("edge_index", index as i64),
                    ));
                    transition = Some(edge.to.clone());
                    break;
                }
            }

            current = match transition {
                Some(next) => next,
                None => return Err(ExecutionError::new(current.clone(), state, path, ExecutionCause::NoValidTransition(current))),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::*;
    use crate::graph::{simple_graph, Edge, GraphConfig, Node, Predicate};
    use crate::state::State;

    struct SetKey(&'static str, Value);

    #[async_trait]
    impl Node for SetKey {
        async fn execute(&self, _ctx: &NodeContext, state: State) -> Result<State, Box<dyn std::error::Error + Send + Sync>> {
            Ok(state.set(self.0, self.1.clone()))
        }
    }

    struct Failing;

    #[async_trait]
    impl Node for Failing {
        async fn execute(&self, _ctx: &NodeContext, _state: State) -> Result<State, Box<dyn std::error::Error + Send + Sync>> {
            Err("boom".into())
        }
    }

    #[tokio::test]
    async fn linear_three_node_graph() {
        let mut graph = simple_graph("linear");
        graph.add_node("A", SetKey("x", json!(1))).unwrap();
        graph.add_node("B", SetKey("y", json!(2))).unwrap();
        graph.add_node("C", SetKey("z", json!(3))).unwrap();
        graph.add_edge(Edge::new("A", "B", None)).unwrap();
        graph.add_edge(Edge::new("B", "C", None)).unwrap();
        graph.set_entry_point("A").unwrap();
        graph.set_exit_point("C").unwrap();

        let ctx = NodeContext::new();
        let final_state = graph.execute(&ctx, State::new(None)).await.unwrap();
        assert_eq!(final_state.get("x"), (Some(&json!(1)), true));
        assert_eq!(final_state.get("y"), (Some(&json!(2)), true));
        assert_eq!(final_state.get("z"), (Some(&json!(3)), true));
        assert_eq!(final_state.checkpoint_node(), "C");
    }

    #[tokio::test]
    async fn conditional_two_way_routes_on_predicate() {
        for (ok, expect_key) in [(true, "via_b"), (false, "via_c")] {
            let mut graph = simple_graph("cond");
            graph.add_node("A", SetKey("touched", json!(true))).unwrap();
            graph.add_node("B", SetKey("via_b", json!(true))).unwrap();
            graph.add_node("C", SetKey("via_c", json!(true))).unwrap();
            graph
                .add_edge(Edge::new("A", "B", Some(Predicate::key_equals("ok", json!(true)))))
                .unwrap();
            graph.add_edge(Edge::new("A", "C", None)).unwrap();
            graph.set_entry_point("A").unwrap();
            graph.set_exit_point("B").unwrap();
            graph.set_exit_point("C").unwrap();

            let ctx = NodeContext::new();
            let initial = State::new(None).set("ok", json!(ok));
            let final_state = graph.execute(&ctx, initial).await.unwrap();
            assert!(final_state.contains_key(expect_key));
        }
    }

    #[tokio::test]
    async fn node_failure_preserves_pre_execution_state_and_path() {
        let mut graph = simple_graph("fail");
        graph.add_node("A", SetKey("x", json!(1))).unwrap();
        graph.add_node("B", Failing).unwrap();
        graph.add_edge(Edge::new("A", "B", None)).unwrap();
        graph.set_entry_point("A").unwrap();
        graph.set_exit_point("B").unwrap();

        let ctx = NodeContext::new();
        let err = graph.execute(&ctx, State::new(None)).await.unwrap_err();
        assert_eq!(err.node, "B");
        assert_eq!(err.path, vec!["A".to_string(), "B".to_string()]);
        assert!(matches!(err.cause, ExecutionCause::NodeFailed(ref n, _) if n == "B"));
    }

    #[tokio::test]
    async fn dead_end_without_outgoing_edges_fails() {
        let mut graph = simple_graph("deadend");
        graph.add_node("A", SetKey("x", json!(1))).unwrap();
        graph.add_node("B", SetKey("y", json!(1))).unwrap();
        graph.add_edge(Edge::new("A", "B", None)).unwrap();
        graph.set_entry_point("A").unwrap();
        graph.set_exit_point("A").unwrap();

        let ctx = NodeContext::new();
        let err = graph.execute(&ctx, State::new(None)).await.unwrap_err();
        assert!(matches!(err.cause, ExecutionCause::NoValidTransition(_)) || matches!(err.cause, ExecutionCause::NoOutgoingEdges(_)));
    }

    #[tokio::test]
    async fn iteration_cap_exceeded_on_runaway_cycle() {
        let ctx = NodeContext::new();
        let mut graph = Graph::new(GraphConfig::new("cycle").with_max_iterations(3)).unwrap();
        graph.add_node("A", SetKey("touched", json!(true))).unwrap();
        graph.add_node("exit", SetKey("done", json!(true))).unwrap();
        graph.add_edge(Edge::new("A", "A", Some(Predicate::key_equals("go", json!(true))))).unwrap();
        graph.set_entry_point("A").unwrap();
        graph.set_exit_point("exit").unwrap();

        let err = graph.execute(&ctx, State::new(None).set("go", json!(true))).await.unwrap_err();
        assert!(matches!(err.cause, ExecutionCause::IterationCap { max: 3 }));
    }

    #[tokio::test]
    async fn cancellation_is_observed_at_loop_boundary() {
        let mut graph = simple_graph("cancel");
        graph.add_node("A", SetKey("x", json!(1))).unwrap();
        graph.set_entry_point("A").unwrap();
        graph.set_exit_point("A").unwrap();

        let ctx = NodeContext::new();
        ctx.cancel();
        let err = graph.execute(&ctx, State::new(None)).await.unwrap_err();
        assert!(matches!(err.cause, ExecutionCause::Cancelled));
    }
}
