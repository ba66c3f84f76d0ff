use crate::constants::message_keys;
use crate::error::{BookingError, Result};
use chrono::{DateTime, Duration, Utc};

/// Who is asking to cancel. The same request means different things for the
/// two sides of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRole {
    Customer,
    Translator,
}

/// What a permitted cancellation turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancellationOutcome {
    /// Customer cancelled with at least the boundary of notice. No charge.
    WithdrawBefore24,
    /// Customer cancelled inside the boundary. The session is charged as if
    /// it had been carried out.
    WithdrawAfter24,
    /// Translator stepped off with enough notice. The job returns to the
    /// open pool and is broadcast again.
    ReleaseAndRebroadcast,
}

impl CancellationOutcome {
    pub fn is_charged(&self) -> bool {
        matches!(self, CancellationOutcome::WithdrawAfter24)
    }
}

/// Time-based cancellation rules, parameterized on the notice boundary.
#[derive(Debug, Clone, Copy)]
pub struct CancellationPolicy {
    boundary_hours: i64,
}

impl CancellationPolicy {
    pub fn new(boundary_hours: i64) -> Self {
        Self { boundary_hours }
    }

    /// Classify a cancellation request against the notice boundary.
    ///
    /// A customer may always cancel; the boundary only decides whether the
    /// session is charged, with exactly the boundary counting as enough
    /// notice. A translator inside the boundary is refused outright and has
    /// to go through the phone desk.
    pub fn classify(
        &self,
        role: ActorRole,
        due: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<CancellationOutcome> {
        let boundary = Duration::hours(self.boundary_hours);
        let notice = due - now;

        match role {
            ActorRole::Customer => {
                if notice >= boundary {
                    Ok(CancellationOutcome::WithdrawBefore24)
                } else {
                    Ok(CancellationOutcome::WithdrawAfter24)
                }
            }
            ActorRole::Translator => {
                if notice > boundary {
                    Ok(CancellationOutcome::ReleaseAndRebroadcast)
                } else {
                    Err(BookingError::Conflict(
                        message_keys::CANCEL_BY_PHONE.to_string(),
                    ))
                }
            }
        }
    }
}

impl Default for CancellationPolicy {
    fn default() -> Self {
        Self::new(24)
    }
}
