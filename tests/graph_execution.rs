use async_trait::async_trait;
use conductor::graph::{simple_graph, Edge, Node, Predicate};
use conductor::interpreter::{ExecutionCause, NodeContext};
use conductor::state::State;
use serde_json::json;

struct Increment(&'static str);

#[async_trait]
impl Node for Increment {
    async fn execute(&self, _ctx: &NodeContext, state: State) -> Result<State, Box<dyn std::error::Error + Send + Sync>> {
        let current = state.get(self.0).0.and_then(|v| v.as_i64()).unwrap_or(0);
        Ok(state.set(self.0, json!(current + 1)))
    }
}

#[tokio::test]
async fn diamond_shaped_graph_converges_on_either_branch() {
    let mut graph = simple_graph("diamond");
    graph.add_node("start", Increment("visits")).unwrap();
    graph.add_node("left", Increment("visits")).unwrap();
    graph.add_node("right", Increment("visits")).unwrap();
    graph.add_node("end", Increment("visits")).unwrap();
    graph
        .add_edge(Edge::new("start", "left", Some(Predicate::key_equals("go_left", json!(true)))))
        .unwrap();
    graph.add_edge(Edge::new("start", "right", None)).unwrap();
    graph.add_edge(Edge::new("left", "end", None)).unwrap();
    graph.add_edge(Edge::new("right", "end", None)).unwrap();
    graph.set_entry_point("start").unwrap();
    graph.set_exit_point("end").unwrap();

    let ctx = NodeContext::new();
    let final_state = graph
        .execute(&ctx, State::new(None).set("go_left", json!(true)))
        .await
        .unwrap();
    assert_eq!(final_state.get("visits").0, Some(&json!(3)));
}

#[tokio::test]
async fn set_entry_point_rejects_unregistered_node_name() {
    let mut graph = simple_graph("broken");
    graph.add_node("a", Increment("x")).unwrap();
    assert!(graph.set_entry_point("missing").is_err());
}

#[tokio::test]
async fn self_loop_runs_until_predicate_flips_then_exits() {
    let mut graph = simple_graph("countdown");
    graph.add_node("loop", Increment("count")).unwrap();
    graph.add_node("done", Increment("finished")).unwrap();
    graph
        .add_edge(Edge::new("loop", "loop", Some(Predicate::not(Predicate::key_equals("count", json!(3))))))
        .unwrap();
    graph.add_edge(Edge::new("loop", "done", None)).unwrap();
    graph.set_entry_point("loop").unwrap();
    graph.set_exit_point("done").unwrap();

    let ctx = NodeContext::new();
    let final_state = graph.execute(&ctx, State::new(None)).await.unwrap();
    assert_eq!(final_state.get("count").0, Some(&json!(3)));
    assert_eq!(final_state.get("finished").0, Some(&json!(1)));
}

#[tokio::test]
async fn iteration_cap_stops_a_true_infinite_loop() {
    let mut graph = simple_graph("runaway");
    graph.add_node("loop", Increment("count")).unwrap();
    graph.add_node("exit", Increment("done")).unwrap();
    graph.add_edge(Edge::new("loop", "loop", None)).unwrap();
    graph.set_entry_point("loop").unwrap();
    graph.set_exit_point("exit").unwrap();

    let ctx = NodeContext::new();
    let err = graph.execute(&ctx, State::new(None)).await.unwrap_err();
    assert!(matches!(err.cause, ExecutionCause::IterationCap { .. }));
}
