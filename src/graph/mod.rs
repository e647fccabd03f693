//! Graph model: nodes, edges, predicates, and the [`Graph`] container
//! itself (spec.md §3, §4.3).

mod builder;
mod config;
mod edge;
mod error;
mod node;
mod predicate;

pub use builder::{simple_graph, Graph};
pub use config::{CheckpointConfig, GraphConfig};
pub use edge::Edge;
pub use error::ValidationError;
pub use node::{FnNode, Node};
pub use predicate::Predicate;
