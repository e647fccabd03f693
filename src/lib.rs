//! # Conductor: the orchestration core of a multi-agent workflow library
//!
//! Conductor runs graphs of async [`Node`](graph::Node)s over an
//! immutable [`State`](state::State) value, with checkpoint/resume,
//! structured observability events, and three composable workflow
//! patterns (sequential fold, bounded-parallel fan-out, conditional
//! routing) that can run standalone or be embedded as graph nodes.
//!
//! ## Core Concepts
//!
//! - **State**: an immutable, provenance-carrying data carrier. Every
//!   mutation returns a new value; nothing is ever mutated in place.
//! - **Graph**: a validated, immutable topology of named nodes and
//!   directed, optionally-predicated edges.
//! - **Interpreter**: the traversal loop behind [`Graph::execute`] and
//!   [`Graph::resume`] - validation, cycle detection, iteration caps,
//!   and periodic checkpointing.
//! - **Checkpoint store**: a pluggable persistence boundary for
//!   [`StateSnapshot`](state::StateSnapshot)s, resolved by name through
//!   a process-wide registry.
//! - **Observer**: a side-effect-bounded sink for structured workflow
//!   events, also resolved by name through a process-wide registry.
//! - **Patterns**: `process_chain`, `process_parallel`, and
//!   `process_conditional`, each with a `Node`-implementing adapter in
//!   [`patterns`] for embedding inside a graph.
//!
//! ## Quick Start
//!
//! ### A two-node graph
//!
//! ```
//! use async_trait::async_trait;
//! use conductor::graph::{simple_graph, Node};
//! use conductor::interpreter::NodeContext;
//! use conductor::state::State;
//! use serde_json::json;
//!
//! struct SetGreeting;
//!
//! #[async_trait]
//! impl Node for SetGreeting {
//!     async fn execute(
//!         &self,
//!         _ctx: &NodeContext,
//!         state: State,
//!     ) -> Result<State, Box<dyn std::error::Error + Send + Sync>> {
//!         Ok(state.set("greeting", json!("hello")))
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut graph = simple_graph("greet");
//! graph.add_node("greet", SetGreeting)?;
//! graph.set_entry_point("greet")?;
//! graph.set_exit_point("greet")?;
//!
//! let ctx = NodeContext::new();
//! let final_state = graph.execute(&ctx, State::new(None)).await?;
//! assert_eq!(final_state.get("greeting"), (Some(&json!("hello")), true));
//! # Ok(())
//! # }
//! ```
//!
//! ### State carries its own provenance
//!
//! ```
//! use conductor::state::State;
//! use serde_json::json;
//!
//! let state = State::new(None).set("step", json!(1));
//! let next = state.set("step", json!(2));
//! assert_eq!(state.get("step"), (Some(&json!(1)), true));
//! assert_eq!(next.get("step"), (Some(&json!(2)), true));
//! assert_eq!(state.run_id(), next.run_id());
//! ```
//!
//! ### Error handling
//!
//! Execution failures carry the node name, the path taken so far, and
//! the state as it stood immediately before the failing node ran:
//!
//! ```no_run
//! use conductor::interpreter::{ExecutionCause, ExecutionError};
//!
//! fn report(err: &ExecutionError) {
//!     match &err.cause {
//!         ExecutionCause::NodeFailed(node, source) => {
//!             eprintln!("node {node} failed: {source}");
//!         }
//!         other => eprintln!("execution stopped: {other}"),
//!     }
//! }
//! ```
//!
//! ## Module Guide
//!
//! - [`state`] - the immutable [`State`](state::State) carrier and its
//!   checkpoint-facing [`StateSnapshot`](state::StateSnapshot) shape
//! - [`graph`] - [`Node`](graph::Node), [`Edge`](graph::Edge),
//!   [`Predicate`](graph::Predicate), and the [`Graph`](graph::Graph)
//!   container
//! - [`interpreter`] - the traversal loop (`Graph::execute`/`resume`),
//!   [`NodeContext`](interpreter::NodeContext), and execution errors
//! - [`checkpoint`] - [`CheckpointStore`](checkpoint::CheckpointStore)
//!   and the in-memory reference implementation, plus the named registry
//! - [`observer`] - the [`Observer`](observer::Observer) contract, event
//!   taxonomy, and the named registry
//! - [`patterns`] - sequential fold, bounded-parallel fan-out,
//!   conditional routing, and their graph-node adapters
//! - [`messaging`] - the out-of-scope inter-agent messaging collaborator
//!   trait
//! - [`error`] - shared cross-cutting error types
//! - [`config`] - ambient environment loading

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod graph;
pub mod interpreter;
pub mod messaging;
pub mod observer;
pub mod patterns;
pub mod state;
