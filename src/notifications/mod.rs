//! # Notification Dispatch
//!
//! Fan-out of booking notifications over the push, SMS and mail ports.
//! Delivery is best effort: a transport failure is logged with full context
//! and never aborts the lifecycle operation that triggered it.

pub mod clock;
pub mod dispatcher;
pub mod gateway;
pub mod messages;

pub use clock::{Clock, ManualClock, NightWindow, SystemClock};
pub use dispatcher::NotificationDispatcher;
pub use gateway::{MailGateway, MailTemplate, PushGateway, PushPayload, PushRecipient, SmsGateway};
