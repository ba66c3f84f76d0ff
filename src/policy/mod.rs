//! # Cancellation Policy
//!
//! Pure time-based rules deciding what a cancellation request turns into.
//! The orchestrator applies the outcome; nothing here touches storage.

pub mod cancellation;

pub use cancellation::{ActorRole, CancellationOutcome, CancellationPolicy};
