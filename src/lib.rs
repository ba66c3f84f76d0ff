//! # Booking Core
//!
//! Lifecycle engine for on-demand interpretation bookings: creation and
//! broadcast, the first-accept-wins race, admin status transitions, the
//! cancellation policy and session close-out, with notification fan-out over
//! pluggable push, SMS and mail transports.
//!
//! The crate is storage-agnostic behind the [`store::JobStore`] port; a
//! Postgres adapter and an in-memory adapter ship in [`store`].
//!
//! ## Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use booking_core::config::BookingConfig;
//! use booking_core::notifications::SystemClock;
//! use booking_core::orchestration::BookingLifecycleOrchestrator;
//! use booking_core::store::memory::InMemoryJobStore;
//! # use booking_core::test_support::{RecordingMailGateway, RecordingPushGateway, RecordingSmsGateway};
//!
//! let store = Arc::new(InMemoryJobStore::new());
//! # let (push, sms, mail) = (
//! #     Arc::new(RecordingPushGateway::new()),
//! #     Arc::new(RecordingSmsGateway::new()),
//! #     Arc::new(RecordingMailGateway::new()),
//! # );
//! let orchestrator = BookingLifecycleOrchestrator::new(
//!     store,
//!     push,
//!     sms,
//!     mail,
//!     Arc::new(SystemClock),
//!     BookingConfig::default(),
//! );
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod logging;
pub mod matching;
pub mod models;
pub mod notifications;
pub mod orchestration;
pub mod policy;
pub mod state_machine;
pub mod store;
pub mod test_support;

pub use config::BookingConfig;
pub use error::{BookingError, Result};
pub use events::{DomainEvent, EventPublisher};
pub use matching::TranslatorMatcher;
pub use models::{Job, TranslatorAssignment, TranslatorProfile};
pub use notifications::NotificationDispatcher;
pub use orchestration::{
    BookingLifecycleOrchestrator, CreateJobRequest, CustomerRef, UpdateJobRequest, UpdateReport,
};
pub use policy::{ActorRole, CancellationOutcome, CancellationPolicy};
pub use state_machine::{JobStatus, StatusChangeContext, StatusChangeEngine, TransitionOutcome};
