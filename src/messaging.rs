//! The inter-agent messaging fabric: an out-of-scope collaborator
//! (spec.md §1, §6.4). Nodes MAY invoke it; the orchestration core is
//! agnostic to it and imposes no ordering or delivery guarantees.
//!
//! Conductor ships only the trait signature: no transport, no wire
//! format, no implementation. A node author accepts `Arc<dyn
//! MessageFabric>` as a plain dependency the same way they would accept a
//! database handle; wiring a concrete fabric (in-process channels,
//! something richer) is entirely up to the caller.

use async_trait::async_trait;
use serde_json::Value;

/// Point-to-point, request/response, broadcast, and pub/sub coordination,
/// consumed only by this crate (spec.md §6.4). No implementation is
/// bundled.
#[async_trait]
pub trait MessageFabric: Send + Sync {
    async fn send(&self, to: &str, payload: Value) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn request(&self, to: &str, payload: Value) -> Result<Value, Box<dyn std::error::Error + Send + Sync>>;

    async fn broadcast(&self, payload: Value) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn subscribe(&self, topic: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn publish(&self, topic: &str, payload: Value) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
