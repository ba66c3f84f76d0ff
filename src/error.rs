use thiserror::Error;

/// Error taxonomy for lifecycle operations.
///
/// `Validation` and `Conflict` are ordinary business outcomes surfaced to the
/// caller; `DatabaseError` and `ConfigurationError` are infrastructure faults.
/// Transport failures never abort the state change that triggered them and are
/// only carried here so gateways can report them to the dispatcher's logging.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    /// A required field for the requested transition is missing or malformed.
    /// Carries the offending field name and a message key for client-side
    /// localization.
    #[error("Validation error on field {field:?}: {message_key}")]
    Validation {
        field: Option<&'static str>,
        message_key: &'static str,
    },
    /// Lost the accept race or attempted an illegal mutation.
    #[error("Conflict: {0}")]
    Conflict(String),
    /// Unknown job, translator or assignment id.
    #[error("Not found: {0}")]
    NotFound(String),
    /// Push/SMS/mail delivery failure. Always non-fatal.
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl BookingError {
    pub fn validation(field: &'static str, message_key: &'static str) -> Self {
        BookingError::Validation {
            field: Some(field),
            message_key,
        }
    }

    pub fn message_key(&self) -> Option<&'static str> {
        match self {
            BookingError::Validation { message_key, .. } => Some(message_key),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for BookingError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => BookingError::NotFound("row not found".to_string()),
            other => BookingError::DatabaseError(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, BookingError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::message_keys;

    #[test]
    fn test_validation_carries_field_and_key() {
        let err = BookingError::validation("admin_comments", message_keys::FILL_ALL_FIELDS);
        assert_eq!(err.message_key(), Some(message_keys::FILL_ALL_FIELDS));
        assert!(err.to_string().contains("admin_comments"));
    }

    #[test]
    fn test_conflict_display() {
        let err = BookingError::Conflict("slot already taken".to_string());
        assert_eq!(err.to_string(), "Conflict: slot already taken");
    }
}
