//! Lifecycle operations over the store, dispatcher and event ports.

use crate::config::BookingConfig;
use crate::constants::{events, message_keys};
use crate::error::{BookingError, Result};
use crate::events::{DomainEvent, EventPublisher};
use crate::logging::{init_structured_logging, log_job_operation};
use crate::models::{
    expiry_for, CertifiedRequirement, ConsumerType, Gender, Job, SessionTime,
    TranslatorAssignment, TranslatorProfile,
};
use crate::notifications::clock::Clock;
use crate::notifications::gateway::{MailGateway, PushGateway, SmsGateway};
use crate::notifications::NotificationDispatcher;
use crate::policy::{ActorRole, CancellationOutcome, CancellationPolicy};
use crate::state_machine::engine::{StatusChangeContext, StatusChangeEngine, TransitionOutcome};
use crate::state_machine::states::JobStatus;
use crate::store::JobStore;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// The customer on whose behalf a booking operation runs.
#[derive(Debug, Clone)]
pub struct CustomerRef {
    pub id: Uuid,
    pub consumer_type: ConsumerType,
    pub email: String,
    pub name: String,
    /// Translator accounts may browse but never create bookings.
    pub is_translator: bool,
}

/// A new booking request as submitted by the customer.
#[derive(Debug, Clone, Default)]
pub struct CreateJobRequest {
    pub immediate: bool,
    /// Required unless `immediate`; immediate bookings get a due time a few
    /// minutes from now.
    pub due: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
    pub from_language_id: Option<i32>,
    pub gender: Option<Gender>,
    pub certified: Option<CertifiedRequirement>,
    pub customer_phone_type: bool,
    pub customer_physical_type: bool,
    pub town: Option<String>,
    /// Overrides the account address for booking mail when given.
    pub email_override: Option<String>,
}

/// What an update resulted in, beyond the new job record.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateReport {
    /// Fields changed quietly: nothing notification-worthy, or the due time
    /// has already passed.
    Updated(Job),
    /// Fields changed and change mail went out to the affected parties.
    NotificationSent(Job),
}

impl UpdateReport {
    pub fn job(&self) -> &Job {
        match self {
            UpdateReport::Updated(job) | UpdateReport::NotificationSent(job) => job,
        }
    }
}

/// Field changes applied to an existing booking.
#[derive(Debug, Clone, Default)]
pub struct UpdateJobRequest {
    pub due: Option<DateTime<Utc>>,
    pub from_language_id: Option<i32>,
    /// Substitute the assigned translator.
    pub new_translator_id: Option<Uuid>,
    pub admin_comments: Option<String>,
    pub town: Option<String>,
}

pub struct BookingLifecycleOrchestrator {
    store: Arc<dyn JobStore>,
    dispatcher: Arc<NotificationDispatcher>,
    engine: StatusChangeEngine,
    events: EventPublisher,
    clock: Arc<dyn Clock>,
    policy: CancellationPolicy,
    config: BookingConfig,
}

impl BookingLifecycleOrchestrator {
    pub fn new(
        store: Arc<dyn JobStore>,
        push: Arc<dyn PushGateway>,
        sms: Arc<dyn SmsGateway>,
        mail: Arc<dyn MailGateway>,
        clock: Arc<dyn Clock>,
        config: BookingConfig,
    ) -> Self {
        init_structured_logging();

        let dispatcher = Arc::new(NotificationDispatcher::new(
            Arc::clone(&store),
            push,
            sms,
            mail,
            Arc::clone(&clock),
            &config,
        ));
        let engine = StatusChangeEngine::new(
            Arc::clone(&store),
            Arc::clone(&dispatcher),
            Arc::clone(&clock),
        );
        let events = EventPublisher::new(config.event_channel_capacity);

        Self {
            store,
            dispatcher,
            engine,
            events,
            clock,
            policy: CancellationPolicy::new(config.cancellation_boundary_hours),
            config,
        }
    }

    /// Subscribe to lifecycle events published at commit points.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<DomainEvent> {
        self.events.subscribe()
    }

    /// Create a booking, broadcast it to eligible translators and mail the
    /// customer a receipt.
    pub async fn create(&self, customer: &CustomerRef, request: CreateJobRequest) -> Result<Job> {
        if customer.is_translator {
            return Err(BookingError::Validation {
                field: None,
                message_key: message_keys::TRANSLATOR_CANNOT_CREATE,
            });
        }

        let from_language_id = request.from_language_id.ok_or_else(|| {
            BookingError::validation("from_language_id", message_keys::FILL_ALL_FIELDS)
        })?;
        let duration_minutes = request.duration_minutes.ok_or_else(|| {
            BookingError::validation("duration", message_keys::FILL_ALL_FIELDS)
        })?;
        if !request.customer_phone_type && !request.customer_physical_type {
            return Err(BookingError::validation(
                "customer_phone_type",
                message_keys::CHOICE_REQUIRED,
            ));
        }

        let now = self.clock.now();
        let (due, immediate, customer_phone_type) = if request.immediate {
            (
                now + Duration::minutes(self.config.immediate_due_minutes),
                true,
                true,
            )
        } else {
            let due = request
                .due
                .ok_or_else(|| BookingError::validation("due_date", message_keys::FILL_ALL_FIELDS))?;
            if due < now {
                return Err(BookingError::validation("due_date", message_keys::DUE_IN_PAST));
            }
            (due, false, request.customer_phone_type)
        };

        let job = Job {
            id: Uuid::new_v4(),
            customer_id: customer.id,
            status: JobStatus::Pending,
            due,
            immediate,
            job_type: customer.consumer_type.job_type(),
            from_language_id,
            gender: request.gender,
            certified: request.certified,
            customer_phone_type,
            customer_physical_type: request.customer_physical_type,
            town: request.town,
            duration_minutes,
            session_time: None,
            admin_comments: None,
            will_expire_at: Some(expiry_for(due, now)),
            end_at: None,
            withdraw_at: None,
            created_at: now,
            customer_email: request
                .email_override
                .unwrap_or_else(|| customer.email.clone()),
            customer_name: customer.name.clone(),
        };

        self.store.save_job(&job).await?;
        log_job_operation("create", job.id, &job.status.to_string(), None);

        self.dispatcher.mail_booking_received(&job).await?;
        self.dispatcher.broadcast(&job, None).await?;
        self.dispatcher.sms_broadcast(&job, None).await?;

        self.events.publish(DomainEvent::new(
            events::JOB_CREATED,
            job.id,
            Some(customer.id),
            json!({ "immediate": job.immediate, "due": job.due }),
        ));

        Ok(job)
    }

    /// A translator's attempt to take a pending job. At most one caller wins;
    /// everyone else gets a conflict.
    pub async fn accept(&self, job_id: Uuid, translator_id: Uuid) -> Result<Job> {
        let translator = self
            .store
            .translator_profile(translator_id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("translator {translator_id}")))?;

        let job = self.store.load_job(job_id).await?;
        if !job.status.is_open() {
            return Err(BookingError::Conflict(
                message_keys::SLOT_ALREADY_TAKEN.to_string(),
            ));
        }

        // One booking per translator per due time.
        for existing in self
            .store
            .active_assignments_for_translator(translator_id)
            .await?
        {
            let other = self.store.load_job(existing.job_id).await?;
            if other.due == job.due {
                return Err(BookingError::Conflict(
                    message_keys::ALREADY_BOOKED.to_string(),
                ));
            }
        }

        let won = self
            .store
            .atomic_status_update(job_id, JobStatus::Pending, JobStatus::Assigned)
            .await?;
        if !won {
            return Err(BookingError::Conflict(
                message_keys::SLOT_ALREADY_TAKEN.to_string(),
            ));
        }

        let now = self.clock.now();
        self.store
            .insert_assignment(&TranslatorAssignment::new(job_id, translator_id, now))
            .await?;

        let job = self.store.load_job(job_id).await?;
        log_job_operation("accept", job.id, &job.status.to_string(), None);

        self.dispatcher.notify_job_accepted(&job).await?;
        self.dispatcher
            .session_start_reminders(&job, &translator)
            .await?;

        Ok(job)
    }

    /// Cancel a booking on behalf of either side. What the cancellation
    /// turns into is decided by [`CancellationPolicy`].
    pub async fn cancel(&self, job_id: Uuid, role: ActorRole, actor_id: Uuid) -> Result<Job> {
        let mut job = self.store.load_job(job_id).await?;
        if job.status.is_terminal() {
            return Err(BookingError::Conflict(format!(
                "job {job_id} is already concluded"
            )));
        }

        let now = self.clock.now();
        let outcome = self.policy.classify(role, job.due, now)?;
        let translator = self.active_translator(job_id).await?;

        match outcome {
            CancellationOutcome::WithdrawBefore24 | CancellationOutcome::WithdrawAfter24 => {
                job.status = if outcome.is_charged() {
                    JobStatus::Withdrawafter24
                } else {
                    JobStatus::Withdrawbefore24
                };
                job.withdraw_at = Some(now);
                self.store.save_job(&job).await?;
                self.store.cancel_active_assignments(job_id, now).await?;

                if let Some(translator) = &translator {
                    self.dispatcher
                        .notify_cancellation_to_translator(&job, translator)
                        .await?;
                }
            }
            CancellationOutcome::ReleaseAndRebroadcast => {
                self.store.cancel_active_assignments(job_id, now).await?;

                job.status = JobStatus::Pending;
                job.created_at = now;
                job.will_expire_at = Some(expiry_for(job.due, now));
                self.store.save_job(&job).await?;

                self.dispatcher.notify_cancellation_to_customer(&job).await?;
                self.dispatcher.broadcast(&job, Some(actor_id)).await?;
            }
        }

        log_job_operation("cancel", job.id, &job.status.to_string(), None);
        self.events.publish(DomainEvent::new(
            events::JOB_CANCELED,
            job.id,
            Some(actor_id),
            json!({ "status": job.status, "charged": outcome.is_charged() }),
        ));

        Ok(job)
    }

    /// Close out a running session. Session time is wall-clock elapsed from
    /// the due time. On any status other than started this is a quiet no-op.
    pub async fn end(&self, job_id: Uuid, completed_by: Uuid) -> Result<Job> {
        let mut job = self.store.load_job(job_id).await?;
        if job.status != JobStatus::Started {
            return Ok(job);
        }

        let now = self.clock.now();
        let session_time = SessionTime::from_interval(now - job.due);
        job.status = JobStatus::Completed;
        job.end_at = Some(now);
        job.session_time = Some(session_time);
        self.store.save_job(&job).await?;

        let mut counterpart = None;
        if let Some(mut assignment) = self.store.active_assignment(job_id).await? {
            assignment.completed_at = Some(now);
            assignment.completed_by = Some(completed_by);
            self.store.save_assignment(&assignment).await?;

            counterpart = if assignment.translator_id == completed_by {
                Some(job.customer_id)
            } else {
                Some(assignment.translator_id)
            };

            if let Some(translator) = self
                .store
                .translator_profile(assignment.translator_id)
                .await?
            {
                self.dispatcher
                    .session_ended_mails(&job, &translator, &session_time.label())
                    .await?;
            }
        }

        log_job_operation("end", job.id, &job.status.to_string(), None);
        self.events.publish(DomainEvent::new(
            events::SESSION_ENDED,
            job.id,
            Some(completed_by),
            json!({
                "session_time": session_time.to_string(),
                "counterpart": counterpart,
            }),
        ));

        Ok(job)
    }

    /// Record that the customer never showed up. The translator is credited:
    /// the assignment completes even though no session ran.
    pub async fn not_carried_out(&self, job_id: Uuid) -> Result<Job> {
        let mut job = self.store.load_job(job_id).await?;
        let now = self.clock.now();

        job.status = JobStatus::NotCarriedOutCustomer;
        job.end_at = Some(now);
        self.store.save_job(&job).await?;

        if let Some(mut assignment) = self.store.active_assignment(job_id).await? {
            assignment.completed_at = Some(now);
            assignment.completed_by = Some(assignment.translator_id);
            self.store.save_assignment(&assignment).await?;
        }

        log_job_operation("not_carried_out", job.id, &job.status.to_string(), None);
        Ok(job)
    }

    /// Put a booking back on the market. A timed-out booking is reopened as
    /// a brand new job referencing the old one; anything else goes back to
    /// pending in place.
    pub async fn reopen(&self, job_id: Uuid) -> Result<Job> {
        let job = self.store.load_job(job_id).await?;
        let now = self.clock.now();
        let previous_translator = self.active_translator(job_id).await?;
        self.store.cancel_active_assignments(job_id, now).await?;

        let reopened = if job.status == JobStatus::Timedout {
            let mut fresh = job.clone();
            fresh.id = Uuid::new_v4();
            fresh.status = JobStatus::Pending;
            fresh.created_at = now;
            fresh.will_expire_at = Some(expiry_for(fresh.due, now));
            fresh.admin_comments = Some(format!(
                "This booking is a reopening of booking #{}",
                job.id
            ));
            fresh.session_time = None;
            fresh.end_at = None;
            fresh.withdraw_at = None;
            self.store.save_job(&fresh).await?;
            fresh
        } else {
            let mut same = job;
            same.status = JobStatus::Pending;
            same.created_at = now;
            same.will_expire_at = Some(expiry_for(same.due, now));
            same.session_time = None;
            same.end_at = None;
            same.withdraw_at = None;
            self.store.save_job(&same).await?;
            same
        };

        log_job_operation("reopen", reopened.id, &reopened.status.to_string(), None);
        self.dispatcher
            .mail_job_reopened(&reopened, previous_translator.as_ref())
            .await?;
        self.dispatcher.broadcast(&reopened, None).await?;

        Ok(reopened)
    }

    /// Apply field changes to an existing booking and notify the affected
    /// parties. Change mail is suppressed once the due time has passed.
    pub async fn update(&self, job_id: Uuid, request: UpdateJobRequest) -> Result<UpdateReport> {
        let mut job = self.store.load_job(job_id).await?;
        let now = self.clock.now();

        let old_due = job.due;
        let old_language_id = job.from_language_id;

        let old_translator = self.active_translator(job_id).await?;
        let mut new_translator = None;
        if let Some(new_translator_id) = request.new_translator_id {
            let changing = old_translator
                .as_ref()
                .map(|t| t.translator_id != new_translator_id)
                .unwrap_or(true);
            if changing {
                let profile = self
                    .store
                    .translator_profile(new_translator_id)
                    .await?
                    .ok_or_else(|| {
                        BookingError::NotFound(format!("translator {new_translator_id}"))
                    })?;
                self.store.cancel_active_assignments(job_id, now).await?;
                self.store
                    .insert_assignment(&TranslatorAssignment::new(job_id, new_translator_id, now))
                    .await?;
                new_translator = Some(profile);
            }
        }

        if let Some(due) = request.due {
            job.due = due;
            job.will_expire_at = Some(expiry_for(due, job.created_at));
        }
        if let Some(language_id) = request.from_language_id {
            job.from_language_id = language_id;
        }
        if let Some(comments) = request.admin_comments {
            job.admin_comments = Some(comments);
        }
        if let Some(town) = request.town {
            job.town = Some(town);
        }
        self.store.save_job(&job).await?;
        log_job_operation("update", job.id, &job.status.to_string(), None);

        let mut notified = false;
        if job.due > now {
            let current = new_translator.as_ref().or(old_translator.as_ref());
            if job.due != old_due {
                self.dispatcher
                    .mail_changed_date(&job, old_due, current)
                    .await?;
                notified = true;
            }
            if job.from_language_id != old_language_id {
                self.dispatcher
                    .mail_changed_lang(&job, old_language_id, current)
                    .await?;
                notified = true;
            }
            if let Some(new_translator) = &new_translator {
                self.dispatcher
                    .mail_changed_translator(&job, old_translator.as_ref(), new_translator)
                    .await?;
                notified = true;
            }
        }

        Ok(if notified {
            UpdateReport::NotificationSent(job)
        } else {
            UpdateReport::Updated(job)
        })
    }

    /// Close the acceptance window of an overdue pending job and tell the
    /// customer nobody took it. A no-op unless the job is still pending and
    /// its expiry instant has passed.
    pub async fn expire(&self, job_id: Uuid) -> Result<Job> {
        let mut job = self.store.load_job(job_id).await?;
        let now = self.clock.now();
        let overdue = job.status.is_open()
            && job
                .will_expire_at
                .map(|at| at <= now)
                .unwrap_or(false);
        if !overdue {
            return Ok(job);
        }

        job.status = JobStatus::Timedout;
        self.store.save_job(&job).await?;
        log_job_operation("expire", job.id, &job.status.to_string(), None);

        self.dispatcher.notify_expired(&job).await?;
        Ok(job)
    }

    /// Admin status change, delegated to the transition engine.
    pub async fn change_status(
        &self,
        job_id: Uuid,
        ctx: &StatusChangeContext,
    ) -> Result<TransitionOutcome> {
        self.engine.change_status(job_id, ctx).await
    }

    /// Mark an assigned session as underway.
    pub async fn start(&self, job_id: Uuid) -> Result<Job> {
        let started = self
            .store
            .atomic_status_update(job_id, JobStatus::Assigned, JobStatus::Started)
            .await?;
        if !started {
            return Err(BookingError::Conflict(format!(
                "job {job_id} is not assigned"
            )));
        }
        let job = self.store.load_job(job_id).await?;
        log_job_operation("start", job.id, &job.status.to_string(), None);
        Ok(job)
    }

    async fn active_translator(&self, job_id: Uuid) -> Result<Option<TranslatorProfile>> {
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
