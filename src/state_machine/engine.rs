//! Admin-driven status transitions.
//!
//! Dispatch is keyed on the job's current status, not the requested one:
//! what a request means, and whether it is legal at all, depends on where
//! the job stands. Illegal combinations are a quiet no-op, not an error;
//! missing required fields are a validation failure.

use crate::constants::message_keys;
use crate::error::{BookingError, Result};
use crate::logging::log_job_operation;
use crate::models::{expiry_for, Job, SessionTime};
use crate::notifications::clock::Clock;
use crate::notifications::NotificationDispatcher;
use crate::state_machine::states::JobStatus;
use crate::store::JobStore;
use std::sync::Arc;
use uuid::Uuid;

/// A requested status change with its accompanying fields.
#[derive(Debug, Clone, Default)]
pub struct StatusChangeContext {
    pub requested_status: Option<JobStatus>,
    pub admin_comments: Option<String>,
    /// Elapsed session time as `H:MM` or `H:MM:SS`, required when closing a
    /// started job as completed.
    pub session_time: Option<String>,
    /// Whether this request also substituted the assigned translator.
    pub translator_changed: bool,
}

/// What a status change request resulted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The status moved.
    Applied { from: JobStatus, to: JobStatus },
    /// The status stayed put but notifications went out, e.g. a translator
    /// substitution on a timed-out job.
    SideEffectOnly,
    /// The combination is not recognized from the current status. Nothing
    /// happened.
    NotApplied,
}

pub struct StatusChangeEngine {
    store: Arc<dyn JobStore>,
    dispatcher: Arc<NotificationDispatcher>,
    clock: Arc<dyn Clock>,
}

impl StatusChangeEngine {
    pub fn new(
        store: Arc<dyn JobStore>,
        dispatcher: Arc<NotificationDispatcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            dispatcher,
            clock,
        }
    }

    /// Apply a status change request to a job.
    pub async fn change_status(
        &self,
        job_id: Uuid,
        ctx: &StatusChangeContext,
    ) -> Result<TransitionOutcome> {
        let mut job = self.store.load_job(job_id).await?;
        let from = job.status;

        let outcome = match from {
            JobStatus::Pending => self.from_pending(&mut job, ctx).await?,
            JobStatus::Assigned => self.from_assigned(&mut job, ctx).await?,
            JobStatus::Started => self.from_started(&mut job, ctx).await?,
            JobStatus::Completed => self.from_completed(&mut job, ctx).await?,
            JobStatus::Timedout => self.from_timedout(&mut job, ctx).await?,
            JobStatus::Withdrawafter24 => self.from_withdrawafter24(&mut job, ctx).await?,
            JobStatus::Withdrawbefore24 | JobStatus::NotCarriedOutCustomer => {
                TransitionOutcome::NotApplied
            }
        };

        if let TransitionOutcome::Applied { from, to } = outcome {
            let previous = from.to_string();
            log_job_operation("change_status", job.id, &to.to_string(), Some(&previous));
        }

        Ok(outcome)
    }

    async fn from_pending(
        &self,
        job: &mut Job,
        ctx: &StatusChangeContext,
    ) -> Result<TransitionOutcome> {
        let from = job.status;
        match ctx.requested_status {
            Some(JobStatus::Assigned) if ctx.translator_changed => {
                job.status = JobStatus::Assigned;
                self.store.save_job(job).await?;

                self.dispatcher.notify_job_accepted(job).await?;
                if let Some(translator) = self.active_translator(job.id).await? {
                    self.dispatcher
                        .session_start_reminders(job, &translator)
                        .await?;
                }
                Ok(applied(from, JobStatus::Assigned))
            }
            Some(to @ (JobStatus::Withdrawbefore24 | JobStatus::Withdrawafter24)) => {
                job.status = to;
                job.withdraw_at = Some(self.clock.now());
                self.store.save_job(job).await?;
                self.dispatcher.mail_status_changed(job).await?;
                Ok(applied(from, to))
            }
            Some(JobStatus::Timedout) => {
                job.admin_comments = Some(required_comments(ctx)?.to_string());
                job.status = JobStatus::Timedout;
                self.store.save_job(job).await?;
                self.dispatcher.mail_status_changed(job).await?;
                Ok(applied(from, JobStatus::Timedout))
            }
            // Any other status applies from pending; the customer gets the
            // status-change notice.
            Some(to) => {
                job.status = to;
                self.store.save_job(job).await?;
                self.dispatcher.mail_status_changed(job).await?;
                Ok(applied(from, to))
            }
            None => Ok(TransitionOutcome::NotApplied),
        }
    }

    async fn from_assigned(
        &self,
        job: &mut Job,
        ctx: &StatusChangeContext,
    ) -> Result<TransitionOutcome> {
        let from = job.status;
        let Some(
            to @ (JobStatus::Withdrawbefore24 | JobStatus::Withdrawafter24 | JobStatus::Timedout),
        ) = ctx.requested_status
        else {
            return Ok(TransitionOutcome::NotApplied);
        };

        job.admin_comments = Some(required_comments(ctx)?.to_string());
        job.status = to;

        let now = self.clock.now();
        if matches!(to, JobStatus::Withdrawbefore24 | JobStatus::Withdrawafter24) {
            job.withdraw_at = Some(now);
        }
        self.store.save_job(job).await?;

        if matches!(to, JobStatus::Withdrawbefore24 | JobStatus::Withdrawafter24) {
            self.dispatcher.mail_status_changed(job).await?;
            if let Some(translator) = self.active_translator(job.id).await? {
                self.dispatcher
                    .mail_cancel_to_translator(job, &translator)
                    .await?;
            }
            self.store.cancel_active_assignments(job.id, now).await?;
        }

        Ok(applied(from, to))
    }

    async fn from_started(
        &self,
        job: &mut Job,
        ctx: &StatusChangeContext,
    ) -> Result<TransitionOutcome> {
        let from = job.status;
        if ctx.requested_status != Some(JobStatus::Completed) {
            return Ok(TransitionOutcome::NotApplied);
        }

        job.admin_comments = Some(required_comments(ctx)?.to_string());

        let raw = ctx.session_time.as_deref().ok_or_else(|| {
            BookingError::validation("session_time", message_keys::FILL_ALL_FIELDS)
        })?;
        let session_time: SessionTime = raw.parse().map_err(|_| {
            BookingError::validation("session_time", message_keys::FILL_ALL_FIELDS)
        })?;

        let now = self.clock.now();
        job.status = JobStatus::Completed;
        job.session_time = Some(session_time);
        job.end_at = Some(now);
        self.store.save_job(job).await?;

        if let Some(mut assignment) = self.store.active_assignment(job.id).await? {
            assignment.completed_at = Some(now);
            self.store.save_assignment(&assignment).await?;
            if let Some(translator) = self
                .store
                .translator_profile(assignment.translator_id)
                .await?
            {
                self.dispatcher
                    .session_ended_mails(job, &translator, &session_time.label())
                    .await?;
            }
        }

        Ok(applied(from, JobStatus::Completed))
    }

    async fn from_completed(
        &self,
        job: &mut Job,
        ctx: &StatusChangeContext,
    ) -> Result<TransitionOutcome> {
        let from = job.status;
        match ctx.requested_status {
            Some(to @ (JobStatus::Withdrawbefore24 | JobStatus::Withdrawafter24)) => {
                job.status = to;
                self.store.save_job(job).await?;
                Ok(applied(from, to))
            }
            Some(JobStatus::Timedout) => {
                job.admin_comments = Some(required_comments(ctx)?.to_string());
                job.status = JobStatus::Timedout;
                self.store.save_job(job).await?;
                Ok(applied(from, JobStatus::Timedout))
            }
            _ => Ok(TransitionOutcome::NotApplied),
        }
    }

    async fn from_timedout(
        &self,
        job: &mut Job,
        ctx: &StatusChangeContext,
    ) -> Result<TransitionOutcome> {
        let from = job.status;
        match ctx.requested_status {
            Some(JobStatus::Pending) => {
                let now = self.clock.now();
                job.status = JobStatus::Pending;
                job.created_at = now;
                job.will_expire_at = Some(expiry_for(job.due, now));
                self.store.save_job(job).await?;

                self.dispatcher.mail_job_reopened(job, None).await?;
                self.dispatcher.broadcast(job, None).await?;
                Ok(applied(from, JobStatus::Pending))
            }
            _ if ctx.translator_changed => {
                // A substitution on a timed-out job only confirms the new
                // translator; the status stays timedout.
                self.dispatcher.notify_job_accepted(job).await?;
                Ok(TransitionOutcome::SideEffectOnly)
            }
            _ => Ok(TransitionOutcome::NotApplied),
        }
    }

    async fn from_withdrawafter24(
        &self,
        job: &mut Job,
        ctx: &StatusChangeContext,
    ) -> Result<TransitionOutcome> {
        let from = job.status;
        if ctx.requested_status != Some(JobStatus::Timedout) {
            return Ok(TransitionOutcome::NotApplied);
        }
        job.admin_comments = Some(required_comments(ctx)?.to_string());
        job.status = JobStatus::Timedout;
        self.store.save_job(job).await?;
        Ok(applied(from, JobStatus::Timedout))
    }

    async fn active_translator(
        &self,
        job_id: Uuid,
    ) -> Result<Option<crate::models::TranslatorProfile>> {
        match self.store.active_assignment(job_id).await? {
            Some(assignment) => {
                self.store
                    .translator_profile(assignment.translator_id)
                    .await
            }
            None => Ok(None),
        }
    }
}

fn applied(from: JobStatus, to: JobStatus) -> TransitionOutcome {
    TransitionOutcome::Applied { from, to }
}

fn required_comments(ctx: &StatusChangeContext) -> Result<&str> {
    match ctx.admin_comments.as_deref().map(str::trim) {
        Some(comments) if !comments.is_empty() => Ok(comments),
        _ => Err(BookingError::validation(
            "admin_comments",
            message_keys::FILL_ALL_FIELDS,
        )),
    }
}
