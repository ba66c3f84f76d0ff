//! # Structured Logging Module
//!
//! Environment-aware structured logging for lifecycle operations and
//! notification fan-out. Initialized once per process; the orchestrator and
//! dispatcher log through the global subscriber instead of constructing
//! per-call handlers.

use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use uuid::Uuid;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);

        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_filter(EnvFilter::new(log_level)),
        );

        // A global subscriber may already be set by an embedding application.
        if subscriber.try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized");
        }
    });
}

/// Get current environment from environment variables.
fn get_environment() -> String {
    std::env::var("BOOKING_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment.
fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log structured data for job lifecycle operations.
pub fn log_job_operation(operation: &str, job_id: Uuid, status: &str, details: Option<&str>) {
    tracing::info!(
        operation = %operation,
        job_id = %job_id,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "JOB_OPERATION"
    );
}

/// Log structured data for notification deliveries.
pub fn log_notification(job_id: Uuid, channel: &str, recipient: &str, delayed: bool) {
    tracing::info!(
        job_id = %job_id,
        channel = %channel,
        recipient = %recipient,
        delayed = delayed,
        timestamp = %Utc::now().to_rfc3339(),
        "NOTIFICATION"
    );
}

/// Log a non-fatal transport failure with full context.
pub fn log_transport_error(job_id: Uuid, channel: &str, recipient: &str, error: &str) {
    tracing::error!(
        job_id = %job_id,
        channel = %channel,
        recipient = %recipient,
        error = %error,
        timestamp = %Utc::now().to_rfc3339(),
        "TRANSPORT_ERROR"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(get_log_level("production"), "info");
        assert_eq!(get_log_level("development"), "debug");
        assert_eq!(get_log_level("test"), "debug");
    }
}
