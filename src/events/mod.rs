//! # Domain Events
//!
//! Commit-point events published by the orchestrator. Delivery is in-process
//! fan-out over a broadcast channel; subscribers that fall behind lose the
//! oldest events rather than blocking publishers.

pub mod publisher;

pub use publisher::{DomainEvent, EventPublisher};
