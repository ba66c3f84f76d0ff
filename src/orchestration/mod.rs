//! # Booking Lifecycle Orchestration
//!
//! The composition root and entry point: creation, the accept race,
//! updates, cancellation, session end and reopening. Every operation loads
//! through the store port, applies business rules and fans notifications
//! out through the dispatcher.

pub mod orchestrator;

pub use orchestrator::{
    BookingLifecycleOrchestrator, CreateJobRequest, CustomerRef, UpdateJobRequest, UpdateReport,
};
