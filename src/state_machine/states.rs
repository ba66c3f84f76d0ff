use serde::{Deserialize, Serialize};
use std::fmt;

/// Booking status definitions for the job lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Broadcast, waiting for a translator to accept
    Pending,
    /// A translator holds the active assignment
    Assigned,
    /// The interpretation session is underway
    Started,
    /// Session finished and time-accounted
    Completed,
    /// Acceptance window closed with no translator
    Timedout,
    /// Customer withdrew 24 hours or more before the due time
    Withdrawbefore24,
    /// Customer withdrew inside the 24-hour window
    Withdrawafter24,
    /// Translator showed up but the customer never did
    NotCarriedOutCustomer,
}

impl JobStatus {
    /// Check if this is a terminal state (no further transitions allowed).
    /// `timedout` is not terminal: it can be reopened back to pending.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed
                | Self::Withdrawbefore24
                | Self::Withdrawafter24
                | Self::NotCarriedOutCustomer
        )
    }

    /// Check if the job is still open for translator acceptance.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Check if a session is active or imminent.
    pub fn is_engaged(&self) -> bool {
        matches!(self, Self::Assigned | Self::Started)
    }
}

impl Default for JobStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Assigned => write!(f, "assigned"),
            Self::Started => write!(f, "started"),
            Self::Completed => write!(f, "completed"),
            Self::Timedout => write!(f, "timedout"),
            Self::Withdrawbefore24 => write!(f, "withdrawbefore24"),
            Self::Withdrawafter24 => write!(f, "withdrawafter24"),
            Self::NotCarriedOutCustomer => write!(f, "not_carried_out_customer"),
        }
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "assigned" => Ok(Self::Assigned),
            "started" => Ok(Self::Started),
            "completed" => Ok(Self::Completed),
            "timedout" => Ok(Self::Timedout),
            "withdrawbefore24" => Ok(Self::Withdrawbefore24),
            "withdrawafter24" => Ok(Self::Withdrawafter24),
            "not_carried_out_customer" => Ok(Self::NotCarriedOutCustomer),
            _ => Err(format!("Invalid job status: {s}")),
        }
    }
}
