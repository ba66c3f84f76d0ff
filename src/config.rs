use crate::error::{BookingError, Result};

/// Operational settings for the lifecycle engine.
///
/// Defaults mirror production behavior; every field can be overridden from
/// the environment with `from_env`.
#[derive(Debug, Clone)]
pub struct BookingConfig {
    /// Minutes added to "now" for the due time of an immediate booking.
    pub immediate_due_minutes: i64,
    /// Boundary used by the cancellation policy, in hours.
    pub cancellation_boundary_hours: i64,
    /// Hour of day (0-23) at which the night-time window opens.
    pub night_start_hour: u32,
    /// Hour of day (0-23) at which the night-time window closes.
    pub night_end_hour: u32,
    /// Hour of day at which delayed notifications are released.
    pub business_start_hour: u32,
    /// Sender number for outbound SMS.
    pub sms_number: String,
    /// Capacity of the domain event broadcast channel.
    pub event_channel_capacity: usize,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            immediate_due_minutes: 5,
            cancellation_boundary_hours: 24,
            night_start_hour: 22,
            night_end_hour: 6,
            business_start_hour: 9,
            sms_number: "+4670000000".to_string(),
            event_channel_capacity: 1000,
        }
    }
}

impl BookingConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(minutes) = std::env::var("BOOKING_IMMEDIATE_DUE_MINUTES") {
            config.immediate_due_minutes = minutes.parse().map_err(|e| {
                BookingError::ConfigurationError(format!("Invalid immediate_due_minutes: {e}"))
            })?;
        }

        if let Ok(hours) = std::env::var("BOOKING_CANCELLATION_BOUNDARY_HOURS") {
            config.cancellation_boundary_hours = hours.parse().map_err(|e| {
                BookingError::ConfigurationError(format!("Invalid cancellation_boundary_hours: {e}"))
            })?;
        }

        if let Ok(hour) = std::env::var("BOOKING_NIGHT_START_HOUR") {
            config.night_start_hour = parse_hour(&hour, "night_start_hour")?;
        }

        if let Ok(hour) = std::env::var("BOOKING_NIGHT_END_HOUR") {
            config.night_end_hour = parse_hour(&hour, "night_end_hour")?;
        }

        if let Ok(hour) = std::env::var("BOOKING_BUSINESS_START_HOUR") {
            config.business_start_hour = parse_hour(&hour, "business_start_hour")?;
        }

        if let Ok(number) = std::env::var("BOOKING_SMS_NUMBER") {
            config.sms_number = number;
        }

        Ok(config)
    }
}

fn parse_hour(value: &str, name: &str) -> Result<u32> {
    let hour: u32 = value
        .parse()
        .map_err(|e| BookingError::ConfigurationError(format!("Invalid {name}: {e}")))?;
    if hour > 23 {
        return Err(BookingError::ConfigurationError(format!(
            "Invalid {name}: {hour} is not an hour of day"
        )));
    }
    Ok(hour)
}
