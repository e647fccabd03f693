use async_trait::async_trait;
use conductor::checkpoint::{CheckpointStoreRegistry, InMemoryCheckpointStore};
use conductor::graph::{CheckpointConfig, Edge, Graph, GraphConfig, Node};
use conductor::interpreter::{ExecutionCause, NodeContext};
use conductor::observer::ObserverRegistry;
use conductor::state::State;
use serde_json::json;
use std::sync::Arc;

struct SetThenContinue(&'static str);

#[async_trait]
impl Node for SetThenContinue {
    async fn execute(&self, _ctx: &NodeContext, state: State) -> Result<State, Box<dyn std::error::Error + Send + Sync>> {
        Ok(state.set(self.0, json!(true)))
    }
}

/// Simulates an interrupted run: executes its step, then cancels the
/// shared token, so the interpreter's next loop-boundary check stops the
/// run immediately after this node's checkpoint is saved.
struct SetThenCancel(&'static str);

#[async_trait]
impl Node for SetThenCancel {
    async fn execute(&self, ctx: &NodeContext, state: State) -> Result<State, Box<dyn std::error::Error + Send + Sync>> {
        let next = state.set(self.0, json!(true));
        ctx.cancel();
        Ok(next)
    }
}

fn build_graph(store: Arc<InMemoryCheckpointStore>) -> Graph {
    let checkpoint_registry = CheckpointStoreRegistry::new().with_store("memory", store);
    let config = GraphConfig::new("resumable")
        .with_checkpoint(CheckpointConfig {
            store: "memory".to_string(),
            interval: 1,
            preserve: true,
        });
    let mut graph = Graph::with_registries(config, &ObserverRegistry::default(), Some(&checkpoint_registry)).unwrap();
    graph.add_node("a", SetThenCancel("a_ran")).unwrap();
    graph.add_node("b", SetThenContinue("b_ran")).unwrap();
    graph.add_node("c", SetThenContinue("c_ran")).unwrap();
    graph.add_edge(Edge::new("a", "b", None)).unwrap();
    graph.add_edge(Edge::new("b", "c", None)).unwrap();
    graph.set_entry_point("a").unwrap();
    graph.set_exit_point("c").unwrap();
    graph
}

#[tokio::test]
async fn interrupted_run_resumes_from_its_last_checkpoint() {
    let store = Arc::new(InMemoryCheckpointStore::new());
    let graph = build_graph(store.clone());

    let ctx = NodeContext::new();
    let err = graph.execute(&ctx, State::new(None)).await.unwrap_err();
    assert!(matches!(err.cause, ExecutionCause::Cancelled));
    assert_eq!(err.state.checkpoint_node(), "a");
    let run_id = err.state.run_id();

    assert!(store.load(run_id).is_ok());

    let resume_ctx = NodeContext::new();
    let final_state = graph.resume(&resume_ctx, run_id).await.unwrap();
    assert_eq!(final_state.get("a_ran").0, Some(&json!(true)));
    assert_eq!(final_state.get("b_ran").0, Some(&json!(true)));
    assert_eq!(final_state.get("c_ran").0, Some(&json!(true)));
    assert_eq!(final_state.checkpoint_node(), "c");
}

#[tokio::test]
async fn resuming_an_already_completed_run_errors() {
    let store = Arc::new(InMemoryCheckpointStore::new());
    let graph = build_graph(store.clone());

    let ctx = NodeContext::new();
    let err = graph.execute(&ctx, State::new(None)).await.unwrap_err();
    let run_id = err.state.run_id();

    let resume_ctx = NodeContext::new();
    graph.resume(&resume_ctx, run_id).await.unwrap();

    // After completing via resume, checkpoint.preserve == true keeps the
    // snapshot around, so a second resume attempt loads a checkpoint whose
    // node is now the exit point.
    let second_resume_ctx = NodeContext::new();
    let err = graph.resume(&second_resume_ctx, run_id).await.unwrap_err();
    assert!(matches!(err.cause, ExecutionCause::AlreadyComplete(ref n) if n == "c"));
}
