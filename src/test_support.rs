//! Recording gateway doubles for tests.
//!
//! Each double captures the calls it receives so assertions can inspect
//! recipients, payloads and scheduling. `FailingMailGateway` simulates a
//! broken transport for delivery-isolation tests.

use crate::error::{BookingError, Result};
use crate::notifications::gateway::{
    MailGateway, MailTemplate, PushGateway, PushPayload, PushRecipient, SmsGateway,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct RecordedPush {
    pub recipients: Vec<PushRecipient>,
    pub tags: Value,
    pub payload: PushPayload,
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct RecordingPushGateway {
    pushes: Mutex<Vec<RecordedPush>>,
}

impl RecordingPushGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pushes(&self) -> Vec<RecordedPush> {
        self.pushes.lock().clone()
    }

    pub fn push_count(&self) -> usize {
        self.pushes.lock().len()
    }
}

#[async_trait]
impl PushGateway for RecordingPushGateway {
    async fn send_push(
        &self,
        recipients: &[PushRecipient],
        tags: Value,
        payload: PushPayload,
        scheduled_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        self.pushes.lock().push(RecordedPush {
            recipients: recipients.to_vec(),
            tags,
            payload,
            scheduled_at,
        });
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RecordedSms {
    pub from_number: String,
    pub to_number: String,
    pub body: String,
}

#[derive(Debug, Default)]
pub struct RecordingSmsGateway {
    messages: Mutex<Vec<RecordedSms>>,
}

impl RecordingSmsGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<RecordedSms> {
        self.messages.lock().clone()
    }
}

#[async_trait]
impl SmsGateway for RecordingSmsGateway {
    async fn send_sms(&self, from_number: &str, to_number: &str, body: &str) -> Result<()> {
        self.messages.lock().push(RecordedSms {
            from_number: from_number.to_string(),
            to_number: to_number.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RecordedMail {
    pub to_email: String,
    pub to_name: String,
    pub subject: String,
    pub template: MailTemplate,
    pub template_data: Value,
}

#[derive(Debug, Default)]
pub struct RecordingMailGateway {
    mails: Mutex<Vec<RecordedMail>>,
}

impl RecordingMailGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mails(&self) -> Vec<RecordedMail> {
        self.mails.lock().clone()
    }

    pub fn mails_to(&self, email: &str) -> Vec<RecordedMail> {
        self.mails
            .lock()
            .iter()
            .filter(|mail| mail.to_email == email)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl MailGateway for RecordingMailGateway {
    async fn send(
        &self,
        to_email: &str,
        to_name: &str,
        subject: &str,
        template: MailTemplate,
        template_data: Value,
    ) -> Result<()> {
        self.mails.lock().push(RecordedMail {
            to_email: to_email.to_string(),
            to_name: to_name.to_string(),
            subject: subject.to_string(),
            template,
            template_data,
        });
        Ok(())
    }
}

/// A mail transport that always fails, for verifying delivery failures stay
/// contained.
#[derive(Debug, Default)]
pub struct FailingMailGateway;

#[async_trait]
impl MailGateway for FailingMailGateway {
    async fn send(
        &self,
        _to_email: &str,
        _to_name: &str,
        _subject: &str,
        _template: MailTemplate,
        _template_data: Value,
    ) -> Result<()> {
        Err(BookingError::Transport("mail service unavailable".to_string()))
    }
}
