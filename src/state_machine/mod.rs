//! # Status State Machine
//!
//! Booking status definitions and the admin-driven transition engine. The
//! engine dispatches on the job's *current* status; each handler decides
//! which requested statuses it honors, which fields they require and which
//! notifications they trigger.

pub mod engine;
pub mod states;

pub use engine::{StatusChangeContext, StatusChangeEngine, TransitionOutcome};
pub use states::JobStatus;
