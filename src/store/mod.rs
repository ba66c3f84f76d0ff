//! # Job Store
//!
//! Durable storage port for jobs, translator assignments, profiles and the
//! customer blacklist. The contract every adapter must honor: mutations are
//! atomic per call, and `atomic_status_update` is a compare-and-swap that
//! affects zero or one jobs. That call is the single serialization point
//! for the accept race.

pub mod memory;
pub mod postgres;

use crate::error::Result;
use crate::models::{Job, TranslatorAssignment, TranslatorProfile};
use crate::state_machine::states::JobStatus;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use uuid::Uuid;

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Load a job by id. `NotFound` when the id is unknown.
    async fn load_job(&self, id: Uuid) -> Result<Job>;

    /// Persist the full job record (insert or update).
    async fn save_job(&self, job: &Job) -> Result<()>;

    /// Transition the job's status from `expected` to `new` only if its
    /// current status is still `expected`. Returns whether a row was
    /// affected. Concurrent callers for the same job serialize here.
    async fn atomic_status_update(
        &self,
        id: Uuid,
        expected: JobStatus,
        new: JobStatus,
    ) -> Result<bool>;

    async fn insert_assignment(&self, assignment: &TranslatorAssignment) -> Result<()>;

    async fn save_assignment(&self, assignment: &TranslatorAssignment) -> Result<()>;

    /// The one assignment with neither completion nor cancellation
    /// timestamp, if any.
    async fn active_assignment(&self, job_id: Uuid) -> Result<Option<TranslatorAssignment>>;

    async fn assignments_for_job(&self, job_id: Uuid) -> Result<Vec<TranslatorAssignment>>;

    async fn active_assignments_for_translator(
        &self,
        translator_id: Uuid,
    ) -> Result<Vec<TranslatorAssignment>>;

    /// Mark every active assignment on the job as cancelled at `at`.
    /// History rows are kept, never deleted.
    async fn cancel_active_assignments(&self, job_id: Uuid, at: DateTime<Utc>) -> Result<()>;

    async fn translator_profile(&self, translator_id: Uuid) -> Result<Option<TranslatorProfile>>;

    /// Every active translator profile, for broadcast fan-out.
    async fn active_translators(&self) -> Result<Vec<TranslatorProfile>>;

    /// Translator ids the customer has blacklisted.
    async fn blacklisted_translators(&self, customer_id: Uuid) -> Result<HashSet<Uuid>>;

    /// Display name for a language id, used in notification texts.
    async fn language_name(&self, language_id: i32) -> Result<Option<String>>;
}
