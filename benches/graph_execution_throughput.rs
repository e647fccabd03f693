//! Benchmarks for graph execution.
//!
//! These measure the per-iteration cost of running `Graph::execute`
//! through linear and fan-out topologies of varying size, with
//! checkpointing disabled so the numbers reflect traversal overhead
//! rather than store I/O.

use async_trait::async_trait;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use tokio::runtime::Runtime;

use conductor::graph::{simple_graph, Edge, Graph, Node};
use conductor::interpreter::NodeContext;
use conductor::state::State;

struct BenchNode;

#[async_trait]
impl Node for BenchNode {
    async fn execute(&self, _ctx: &NodeContext, state: State) -> Result<State, Box<dyn std::error::Error + Send + Sync>> {
        Ok(state.set("touched", json!(true)))
    }
}

fn build_linear_graph(node_count: usize) -> Graph {
    let mut graph = simple_graph("bench-linear");
    for i in 0..node_count {
        graph.add_node(format!("n{i}"), BenchNode).expect("add_node");
    }
    for i in 0..node_count.saturating_sub(1) {
        graph.add_edge(Edge::new(format!("n{i}"), format!("n{}", i + 1), None)).expect("add_edge");
    }
    graph.set_entry_point("n0").expect("entry");
    graph.set_exit_point(format!("n{}", node_count - 1)).expect("exit");
    graph
}

fn bench_linear_execution(c: &mut Criterion) {
    let runtime = Runtime::new().expect("runtime");
    let mut group = c.benchmark_group("graph_execute_linear");

    for size in [10, 50, 100, 200] {
        let graph = build_linear_graph(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &graph, |b, graph| {
            b.to_async(&runtime).iter(|| async {
                let ctx = NodeContext::new();
                graph.execute(&ctx, State::new(None)).await.expect("execute should succeed")
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_linear_execution);
criterion_main!(benches);
