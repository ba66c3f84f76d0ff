//! Notification fan-out for lifecycle operations.
//!
//! The dispatcher resolves recipients itself: broadcast targets come from
//! the matcher over the active translator pool, targeted sends address the
//! customer on the job record or a given translator profile. Every delivery
//! is best effort; failures are logged and swallowed so a slow or broken
//! transport can never roll back a status change.

use crate::config::BookingConfig;
use crate::constants::{notification_types, sounds};
use crate::error::Result;
use crate::logging::{log_notification, log_transport_error};
use crate::matching::TranslatorMatcher;
use crate::models::{Job, TranslatorProfile};
use crate::notifications::clock::{Clock, NightWindow};
use crate::notifications::gateway::{
    MailGateway, MailTemplate, PushGateway, PushPayload, PushRecipient, SmsGateway,
};
use crate::notifications::messages;
use crate::store::JobStore;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

pub struct NotificationDispatcher {
    store: Arc<dyn JobStore>,
    push: Arc<dyn PushGateway>,
    sms: Arc<dyn SmsGateway>,
    mail: Arc<dyn MailGateway>,
    clock: Arc<dyn Clock>,
    matcher: TranslatorMatcher,
    night: NightWindow,
    sms_number: String,
}

impl NotificationDispatcher {
    pub fn new(
        store: Arc<dyn JobStore>,
        push: Arc<dyn PushGateway>,
        sms: Arc<dyn SmsGateway>,
        mail: Arc<dyn MailGateway>,
        clock: Arc<dyn Clock>,
        config: &BookingConfig,
    ) -> Self {
        Self {
            store,
            push,
            sms,
            mail,
            clock,
            matcher: TranslatorMatcher::new(),
            night: NightWindow::new(
                config.night_start_hour,
                config.night_end_hour,
                config.business_start_hour,
            ),
            sms_number: config.sms_number.clone(),
        }
    }

    async fn language(&self, job: &Job) -> Result<String> {
        Ok(self
            .store
            .language_name(job.from_language_id)
            .await?
            .unwrap_or_else(|| format!("språk {}", job.from_language_id)))
    }

    async fn eligible_profiles(
        &self,
        job: &Job,
        exclude: Option<Uuid>,
    ) -> Result<Vec<TranslatorProfile>> {
        let profiles = self.store.active_translators().await?;
        let blacklisted = self.store.blacklisted_translators(job.customer_id).await?;
        Ok(self
            .matcher
            .find_eligible(job, &profiles, &blacklisted)
            .into_iter()
            .filter(|profile| Some(profile.translator_id) != exclude)
            .cloned()
            .collect())
    }

    /// Broadcast a pending job to every eligible translator.
    ///
    /// Recipients split into two batches: translators who accept night-time
    /// interruptions get the push immediately even at night, the rest have
    /// theirs held until the next business-hours boundary. Returns the number
    /// of translators targeted.
    pub async fn broadcast(&self, job: &Job, exclude: Option<Uuid>) -> Result<usize> {
        let language = self.language(job).await?;
        let now = self.clock.now();
        let is_night = self.night.is_night_time(now);

        let mut send_now: Vec<PushRecipient> = Vec::new();
        let mut send_later: Vec<PushRecipient> = Vec::new();

        for profile in self.eligible_profiles(job, exclude).await? {
            if profile.not_get_notification {
                continue;
            }
            if job.immediate && profile.not_get_emergency {
                continue;
            }
            let recipient = PushRecipient {
                email: profile.email.clone(),
                name: profile.name.clone(),
            };
            if is_night && !profile.not_get_nighttime {
                send_later.push(recipient);
            } else {
                send_now.push(recipient);
            }
        }

        let payload = PushPayload {
            notification_type: notification_types::SUITABLE_JOB.to_string(),
            contents: messages::broadcast_contents(job, &language),
            android_sound: self.broadcast_sound(job).to_string(),
            ios_sound: format!("{}.mp3", self.broadcast_sound(job)),
            data: messages::job_payload_data(job, &language),
        };

        let total = send_now.len() + send_later.len();
        self.push_batch(job.id, &send_now, payload.clone(), None)
            .await;
        self.push_batch(
            job.id,
            &send_later,
            payload,
            Some(self.night.next_business_time(now)),
        )
        .await;

        Ok(total)
    }

    fn broadcast_sound(&self, job: &Job) -> &'static str {
        if job.immediate {
            sounds::EMERGENCY_BOOKING
        } else {
            sounds::NORMAL_BOOKING
        }
    }

    /// SMS broadcast companion to [`broadcast`](Self::broadcast). Targets the
    /// same eligible pool, restricted to translators with a mobile number.
    /// Returns the number of messages handed to the gateway.
    pub async fn sms_broadcast(&self, job: &Job, exclude: Option<Uuid>) -> Result<usize> {
        let body = messages::broadcast_sms_body(job, job.town.as_deref().unwrap_or_default());
        let targets: Vec<String> = self
            .eligible_profiles(job, exclude)
            .await?
            .into_iter()
            .filter_map(|profile| profile.mobile)
            .collect();

        let body = &body;
        let results = futures::future::join_all(targets.iter().map(|mobile| async move {
            (mobile, self.sms.send_sms(&self.sms_number, mobile, body).await)
        }))
        .await;

        let mut sent = 0;
        for (mobile, result) in results {
            match result {
                Ok(()) => {
                    log_notification(job.id, "sms", mobile, false);
                    sent += 1;
                }
                Err(err) => log_transport_error(job.id, "sms", mobile, &err.to_string()),
            }
        }

        Ok(sent)
    }

    /// Confirmation to the customer once a translator has taken the job:
    /// a mail plus a push with the acceptance wording.
    pub async fn notify_job_accepted(&self, job: &Job) -> Result<()> {
        let language = self.language(job).await?;

        self.send_mail(
            job.id,
            &job.customer_email,
            &job.customer_name,
            &messages::subjects::job_accepted(job.id),
            MailTemplate::JobAccepted,
            json!({ "user_name": job.customer_name, "job_id": job.id }),
        )
        .await;

        self.push_to_customer(
            job,
            notification_types::JOB_ACCEPTED,
            messages::accepted_contents(job, &language),
            &language,
        )
        .await;

        Ok(())
    }

    /// Session start reminder pushed to both sides of the booking.
    pub async fn session_start_reminders(
        &self,
        job: &Job,
        translator: &TranslatorProfile,
    ) -> Result<()> {
        let language = self.language(job).await?;
        let contents = messages::session_reminder_contents(job, &language);

        let payload = PushPayload {
            notification_type: notification_types::SESSION_START_REMIND.to_string(),
            contents,
            android_sound: sounds::DEFAULT.to_string(),
            ios_sound: format!("{}.mp3", sounds::DEFAULT),
            data: messages::job_payload_data(job, &language),
        };

        let recipients = [
            PushRecipient {
                email: job.customer_email.clone(),
                name: job.customer_name.clone(),
            },
            PushRecipient {
                email: translator.email.clone(),
                name: translator.name.clone(),
            },
        ];
        self.push_batch(job.id, &recipients, payload, None).await;
        Ok(())
    }

    /// Tell the assigned translator the customer has cancelled.
    pub async fn notify_cancellation_to_translator(
        &self,
        job: &Job,
        translator: &TranslatorProfile,
    ) -> Result<()> {
        let language = self.language(job).await?;
        let payload = PushPayload {
            notification_type: notification_types::JOB_CANCELLED.to_string(),
            contents: messages::customer_cancelled_contents(job, &language),
            android_sound: sounds::NORMAL_BOOKING.to_string(),
            ios_sound: format!("{}.mp3", sounds::NORMAL_BOOKING),
            data: messages::job_payload_data(job, &language),
        };
        let recipients = [PushRecipient {
            email: translator.email.clone(),
            name: translator.name.clone(),
        }];
        self.push_batch(job.id, &recipients, payload, None).await;
        Ok(())
    }

    /// Tell the customer their translator stepped off and the search is
    /// running again.
    pub async fn notify_cancellation_to_customer(&self, job: &Job) -> Result<()> {
        let language = self.language(job).await?;
        self.push_to_customer(
            job,
            notification_types::JOB_CANCELLED,
            messages::translator_cancelled_contents(job, &language),
            &language,
        )
        .await;
        Ok(())
    }

    /// Tell the customer nobody accepted before the expiry window closed.
    pub async fn notify_expired(&self, job: &Job) -> Result<()> {
        let language = self.language(job).await?;
        self.push_to_customer(
            job,
            notification_types::JOB_EXPIRED,
            messages::expired_contents(job, &language),
            &language,
        )
        .await;
        Ok(())
    }

    /// Booking receipt mail sent right after creation.
    pub async fn mail_booking_received(&self, job: &Job) -> Result<()> {
        self.send_mail(
            job.id,
            &job.customer_email,
            &job.customer_name,
            &messages::subjects::booking_received(job.id),
            MailTemplate::JobCreated,
            json!({ "user_name": job.customer_name, "job_id": job.id }),
        )
        .await;
        Ok(())
    }

    /// Status-change notice mail to the customer, used when an open job is
    /// withdrawn or times out.
    pub async fn mail_status_changed(&self, job: &Job) -> Result<()> {
        self.send_mail(
            job.id,
            &job.customer_email,
            &job.customer_name,
            &messages::subjects::cancellation(job.id),
            MailTemplate::StatusChangedToCustomer,
            json!({
                "user_name": job.customer_name,
                "job_id": job.id,
                "status": job.status,
            }),
        )
        .await;
        Ok(())
    }

    /// Cancellation notice mail to a translator losing the job.
    pub async fn mail_cancel_to_translator(
        &self,
        job: &Job,
        translator: &TranslatorProfile,
    ) -> Result<()> {
        self.send_mail(
            job.id,
            &translator.email,
            &translator.name,
            &messages::subjects::cancellation(job.id),
            MailTemplate::JobCancelToTranslator,
            json!({ "user_name": translator.name, "job_id": job.id }),
        )
        .await;
        Ok(())
    }

    /// Reopening mails: the customer learns the search restarted, the
    /// previous translator gets a cancellation notice.
    pub async fn mail_job_reopened(
        &self,
        job: &Job,
        previous_translator: Option<&TranslatorProfile>,
    ) -> Result<()> {
        let language = self.language(job).await?;

        self.send_mail(
            job.id,
            &job.customer_email,
            &job.customer_name,
            &messages::subjects::reopened(&language, job.id),
            MailTemplate::JobReopenedToCustomer,
            json!({ "user_name": job.customer_name, "job_id": job.id }),
        )
        .await;

        if let Some(translator) = previous_translator {
            self.mail_cancel_to_translator(job, translator).await?;
        }

        Ok(())
    }

    /// Session summary mails to both sides, each with its own billing word.
    pub async fn session_ended_mails(
        &self,
        job: &Job,
        translator: &TranslatorProfile,
        session_label: &str,
    ) -> Result<()> {
        let subject = messages::subjects::session_ended(job.id);

        self.send_mail(
            job.id,
            &job.customer_email,
            &job.customer_name,
            &subject,
            MailTemplate::SessionEnded,
            json!({
                "user_name": job.customer_name,
                "job_id": job.id,
                "session_time": session_label,
                "for_text": "faktura",
            }),
        )
        .await;

        self.send_mail(
            job.id,
            &translator.email,
            &translator.name,
            &subject,
            MailTemplate::SessionEnded,
            json!({
                "user_name": translator.name,
                "job_id": job.id,
                "session_time": session_label,
                "for_text": "lön",
            }),
        )
        .await;

        Ok(())
    }

    /// Due-time change notice to the customer and, when one is assigned, the
    /// translator.
    pub async fn mail_changed_date(
        &self,
        job: &Job,
        old_due: DateTime<Utc>,
        translator: Option<&TranslatorProfile>,
    ) -> Result<()> {
        let subject = messages::subjects::booking_changed(job.id);
        let data = json!({
            "user_name": job.customer_name,
            "job_id": job.id,
            "old_time": messages::due_date(old_due),
        });

        self.send_mail(
            job.id,
            &job.customer_email,
            &job.customer_name,
            &subject,
            MailTemplate::JobChangedDate,
            data.clone(),
        )
        .await;

        if let Some(translator) = translator {
            self.send_mail(
                job.id,
                &translator.email,
                &translator.name,
                &subject,
                MailTemplate::JobChangedDate,
                data,
            )
            .await;
        }

        Ok(())
    }

    /// Language change notice, same recipients as a date change.
    pub async fn mail_changed_lang(
        &self,
        job: &Job,
        old_language_id: i32,
        translator: Option<&TranslatorProfile>,
    ) -> Result<()> {
        let old_language = self
            .store
            .language_name(old_language_id)
            .await?
            .unwrap_or_else(|| format!("språk {old_language_id}"));
        let subject = messages::subjects::booking_changed(job.id);
        let data = json!({
            "user_name": job.customer_name,
            "job_id": job.id,
            "old_lang": old_language,
        });

        self.send_mail(
            job.id,
            &job.customer_email,
            &job.customer_name,
            &subject,
            MailTemplate::JobChangedLang,
            data.clone(),
        )
        .await;

        if let Some(translator) = translator {
            self.send_mail(
                job.id,
                &translator.email,
                &translator.name,
                &subject,
                MailTemplate::JobChangedLang,
                data,
            )
            .await;
        }

        Ok(())
    }

    /// Translator substitution mails: customer confirmation, a goodbye to
    /// the outgoing translator and an assignment notice to the incoming one.
    pub async fn mail_changed_translator(
        &self,
        job: &Job,
        old_translator: Option<&TranslatorProfile>,
        new_translator: &TranslatorProfile,
    ) -> Result<()> {
        self.send_mail(
            job.id,
            &job.customer_email,
            &job.customer_name,
            &messages::subjects::translator_changed(job.id),
            MailTemplate::JobChangedTranslatorCustomer,
            json!({ "user_name": job.customer_name, "job_id": job.id }),
        )
        .await;

        if let Some(old) = old_translator {
            self.send_mail(
                job.id,
                &old.email,
                &old.name,
                &messages::subjects::translator_changed(job.id),
                MailTemplate::JobChangedTranslatorOldTranslator,
                json!({ "user_name": old.name, "job_id": job.id }),
            )
            .await;
        }

        self.send_mail(
            job.id,
            &new_translator.email,
            &new_translator.name,
            &messages::subjects::translator_changed(job.id),
            MailTemplate::JobChangedTranslatorNewTranslator,
            json!({ "user_name": new_translator.name, "job_id": job.id }),
        )
        .await;

        Ok(())
    }

    async fn push_to_customer(
        &self,
        job: &Job,
        notification_type: &str,
        contents: String,
        language: &str,
    ) {
        let payload = PushPayload {
            notification_type: notification_type.to_string(),
            contents,
            android_sound: sounds::DEFAULT.to_string(),
            ios_sound: format!("{}.mp3", sounds::DEFAULT),
            data: messages::job_payload_data(job, language),
        };
        let recipients = [PushRecipient {
            email: job.customer_email.clone(),
            name: job.customer_name.clone(),
        }];
        self.push_batch(job.id, &recipients, payload, None).await;
    }

    async fn push_batch(
        &self,
        job_id: Uuid,
        recipients: &[PushRecipient],
        payload: PushPayload,
        scheduled_at: Option<DateTime<Utc>>,
    ) {
        if recipients.is_empty() {
            return;
        }
        let tags: Value = messages::user_tags(recipients);
        match self
            .push
            .send_push(recipients, tags, payload, scheduled_at)
            .await
        {
            Ok(()) => {
                for recipient in recipients {
                    log_notification(job_id, "push", &recipient.email, scheduled_at.is_some());
                }
            }
            Err(err) => {
                for recipient in recipients {
                    log_transport_error(job_id, "push", &recipient.email, &err.to_string());
                }
            }
        }
    }

    async fn send_mail(
        &self,
        job_id: Uuid,
        to_email: &str,
        to_name: &str,
        subject: &str,
        template: MailTemplate,
        template_data: Value,
    ) {
        match self
            .mail
            .send(to_email, to_name, subject, template, template_data)
            .await
        {
            Ok(()) => log_notification(job_id, "mail", to_email, false),
            Err(err) => log_transport_error(job_id, "mail", to_email, &err.to_string()),
        }
    }
}
