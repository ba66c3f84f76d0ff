use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Link between a job and the translator who took it.
///
/// Invariant: at most one assignment per job has both `completed_at` and
/// `cancel_at` null; that row is "the active assignment". Superseded
/// assignments get `cancel_at` set and are retained as history, never
/// deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatorAssignment {
    pub id: Uuid,
    pub job_id: Uuid,
    pub translator_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Set when the assignment is superseded or the booking is withdrawn.
    pub cancel_at: Option<DateTime<Utc>>,
    /// Who closed the session out (customer or translator id).
    pub completed_by: Option<Uuid>,
}

impl TranslatorAssignment {
    pub fn new(job_id: Uuid, translator_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_id,
            translator_id,
            created_at: now,
            completed_at: None,
            cancel_at: None,
            completed_by: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.completed_at.is_none() && self.cancel_at.is_none()
    }
}
