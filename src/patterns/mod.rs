//! The three composable workflow patterns (spec.md §1, §4.6-§4.9): a
//! state-accumulating sequential fold, a bounded-parallel fan-out with
//! order-preserving aggregation, and predicate-based conditional routing.
//! Each may run standalone via its `process_*` function or be embedded as
//! a graph node via the adapters in this module.

mod adapters;
mod chain;
mod conditional;
mod parallel;

pub use adapters::{ChainNode, ConditionalNode, ParallelNode};
pub use chain::{process_chain, ChainConfig, ChainError, ChainProcessor, ChainResult};
pub use conditional::{
    process_conditional, ConditionalConfig, ConditionalError, ConditionalHandler, RoutePredicate, Routes,
};
pub use parallel::{process_parallel, ParallelConfig, ParallelError, ParallelProcessor, ParallelResult, TaskError};
