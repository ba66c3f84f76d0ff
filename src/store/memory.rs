//! In-memory `JobStore` adapter.
//!
//! Backs the test suite and lightweight embeddings. The compare-and-swap
//! relies on `DashMap`'s per-entry exclusive lock, so concurrent accepts for
//! the same job serialize exactly like the SQL `UPDATE ... WHERE status`
//! does.

use crate::error::{BookingError, Result};
use crate::models::{Job, TranslatorAssignment, TranslatorProfile};
use crate::state_machine::states::JobStatus;
use crate::store::JobStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    jobs: DashMap<Uuid, Job>,
    assignments: DashMap<Uuid, TranslatorAssignment>,
    profiles: DashMap<Uuid, TranslatorProfile>,
    blacklist: RwLock<HashSet<(Uuid, Uuid)>>,
    languages: DashMap<i32, String>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_profile(&self, profile: TranslatorProfile) {
        self.profiles.insert(profile.translator_id, profile);
    }

    pub fn insert_language(&self, language_id: i32, name: impl Into<String>) {
        self.languages.insert(language_id, name.into());
    }

    pub fn blacklist(&self, customer_id: Uuid, translator_id: Uuid) {
        self.blacklist.write().insert((customer_id, translator_id));
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn load_job(&self, id: Uuid) -> Result<Job> {
        self.jobs
            .get(&id)
            .map(|entry| entry.clone())
            .ok_or_else(|| BookingError::NotFound(format!("job {id}")))
    }

    async fn save_job(&self, job: &Job) -> Result<()> {
        self.jobs.insert(job.id, job.clone());
        Ok(())
    }

    async fn atomic_status_update(
        &self,
        id: Uuid,
        expected: JobStatus,
        new: JobStatus,
    ) -> Result<bool> {
        match self.jobs.get_mut(&id) {
            Some(mut entry) => {
                if entry.status == expected {
                    entry.status = new;
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            None => Err(BookingError::NotFound(format!("job {id}"))),
        }
    }

    async fn insert_assignment(&self, assignment: &TranslatorAssignment) -> Result<()> {
        self.assignments.insert(assignment.id, assignment.clone());
        Ok(())
    }

    async fn save_assignment(&self, assignment: &TranslatorAssignment) -> Result<()> {
        self.assignments.insert(assignment.id, assignment.clone());
        Ok(())
    }

    async fn active_assignment(&self, job_id: Uuid) -> Result<Option<TranslatorAssignment>> {
        Ok(self
            .assignments
            .iter()
            .find(|entry| entry.job_id == job_id && entry.is_active())
            .map(|entry| entry.clone()))
    }

    async fn assignments_for_job(&self, job_id: Uuid) -> Result<Vec<TranslatorAssignment>> {
        Ok(self
            .assignments
            .iter()
            .filter(|entry| entry.job_id == job_id)
            .map(|entry| entry.clone())
            .collect())
    }

    async fn active_assignments_for_translator(
        &self,
        translator_id: Uuid,
    ) -> Result<Vec<TranslatorAssignment>> {
        Ok(self
            .assignments
            .iter()
            .filter(|entry| entry.translator_id == translator_id && entry.is_active())
            .map(|entry| entry.clone())
            .collect())
    }

    async fn cancel_active_assignments(&self, job_id: Uuid, at: DateTime<Utc>) -> Result<()> {
        for mut entry in self.assignments.iter_mut() {
            if entry.job_id == job_id && entry.is_active() {
                entry.cancel_at = Some(at);
            }
        }
        Ok(())
    }

    async fn translator_profile(&self, translator_id: Uuid) -> Result<Option<TranslatorProfile>> {
        Ok(self
            .profiles
            .get(&translator_id)
            .map(|entry| entry.clone()))
    }

    async fn active_translators(&self) -> Result<Vec<TranslatorProfile>> {
        Ok(self
            .profiles
            .iter()
            .filter(|entry| entry.is_active)
            .map(|entry| entry.clone())
            .collect())
    }

    async fn blacklisted_translators(&self, customer_id: Uuid) -> Result<HashSet<Uuid>> {
        Ok(self
            .blacklist
            .read()
            .iter()
            .filter(|(customer, _)| *customer == customer_id)
            .map(|(_, translator)| *translator)
            .collect())
    }

    async fn language_name(&self, language_id: i32) -> Result<Option<String>> {
        Ok(self.languages.get(&language_id).map(|entry| entry.clone()))
    }
}
