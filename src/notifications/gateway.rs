use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Push payload submitted to the push gateway. `data` carries the job fields
/// the mobile clients need to render the booking card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushPayload {
    pub notification_type: String,
    pub contents: String,
    pub android_sound: String,
    pub ios_sound: String,
    pub data: Value,
}

/// A push recipient, addressed by email identity tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushRecipient {
    pub email: String,
    pub name: String,
}

/// Mail template ids rendered by the mail service. Rendering itself is out of
/// scope; this core only selects the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MailTemplate {
    JobCreated,
    JobAccepted,
    SessionEnded,
    StatusChangedToCustomer,
    JobReopenedToCustomer,
    JobCancelToTranslator,
    JobChangedDate,
    JobChangedTranslatorCustomer,
    JobChangedTranslatorOldTranslator,
    JobChangedTranslatorNewTranslator,
    JobChangedLang,
}

impl MailTemplate {
    pub fn template_id(&self) -> &'static str {
        match self {
            MailTemplate::JobCreated => "emails.job-created",
            MailTemplate::JobAccepted => "emails.job-accepted",
            MailTemplate::SessionEnded => "emails.session-ended",
            MailTemplate::StatusChangedToCustomer => {
                "emails.status-changed-from-pending-or-assigned-customer"
            }
            MailTemplate::JobReopenedToCustomer => "emails.job-change-status-to-customer",
            MailTemplate::JobCancelToTranslator => "emails.job-cancel-translator",
            MailTemplate::JobChangedDate => "emails.job-changed-date",
            MailTemplate::JobChangedTranslatorCustomer => "emails.job-changed-translator-customer",
            MailTemplate::JobChangedTranslatorOldTranslator => {
                "emails.job-changed-translator-old-translator"
            }
            MailTemplate::JobChangedTranslatorNewTranslator => {
                "emails.job-changed-translator-new-translator"
            }
            MailTemplate::JobChangedLang => "emails.job-changed-lang",
        }
    }
}

/// Push delivery port. Implementations wrap the wire transport; a delivery
/// failure is reported as `BookingError::Transport` and never escalated past
/// the dispatcher.
#[async_trait]
pub trait PushGateway: Send + Sync {
    /// Submit a push to the tagged recipients. `scheduled_at` defers
    /// delivery to the given instant; `None` sends immediately.
    async fn send_push(
        &self,
        recipients: &[PushRecipient],
        tags: Value,
        payload: PushPayload,
        scheduled_at: Option<DateTime<Utc>>,
    ) -> Result<()>;
}

/// SMS delivery port.
#[async_trait]
pub trait SmsGateway: Send + Sync {
    async fn send_sms(&self, from_number: &str, to_number: &str, body: &str) -> Result<()>;
}

/// Mail delivery port.
#[async_trait]
pub trait MailGateway: Send + Sync {
    async fn send(
        &self,
        to_email: &str,
        to_name: &str,
        subject: &str,
        template: MailTemplate,
        template_data: Value,
    ) -> Result<()>;
}
