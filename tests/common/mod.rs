#![allow(dead_code)]

//! Shared harness for the integration tests: an orchestrator wired to the
//! in-memory store, recording gateways and a manual clock.

use booking_core::config::BookingConfig;
use booking_core::models::{
    ConsumerType, Gender, Job, QualificationTag, TranslatorProfile, TranslatorType,
};
use booking_core::notifications::clock::{Clock, ManualClock};
use booking_core::notifications::gateway::{MailGateway, PushGateway, SmsGateway};
use booking_core::orchestration::{BookingLifecycleOrchestrator, CreateJobRequest, CustomerRef};
use booking_core::store::memory::InMemoryJobStore;
use booking_core::store::JobStore;
use booking_core::test_support::{RecordingMailGateway, RecordingPushGateway, RecordingSmsGateway};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;
use uuid::Uuid;

pub const LANGUAGE_ID: i32 = 1;

/// Friday noon, well clear of the night-time window.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

pub struct Harness {
    pub store: Arc<InMemoryJobStore>,
    pub push: Arc<RecordingPushGateway>,
    pub sms: Arc<RecordingSmsGateway>,
    pub mail: Arc<RecordingMailGateway>,
    pub clock: Arc<ManualClock>,
    pub customer: CustomerRef,
    pub orchestrator: Arc<BookingLifecycleOrchestrator>,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryJobStore::new());
        store.insert_language(LANGUAGE_ID, "engelska");

        let push = Arc::new(RecordingPushGateway::new());
        let sms = Arc::new(RecordingSmsGateway::new());
        let mail = Arc::new(RecordingMailGateway::new());
        let clock = Arc::new(ManualClock::new(base_time()));

        let orchestrator = Arc::new(BookingLifecycleOrchestrator::new(
            Arc::clone(&store) as Arc<dyn JobStore>,
            Arc::clone(&push) as Arc<dyn PushGateway>,
            Arc::clone(&sms) as Arc<dyn SmsGateway>,
            Arc::clone(&mail) as Arc<dyn MailGateway>,
            Arc::clone(&clock) as Arc<dyn Clock>,
            BookingConfig::default(),
        ));

        Self {
            store,
            push,
            sms,
            mail,
            clock,
            customer: customer(),
            orchestrator,
        }
    }

    /// Seed an active professional translator speaking the harness language.
    pub fn add_translator(&self, name: &str) -> TranslatorProfile {
        let profile = professional(name);
        self.store.insert_profile(profile.clone());
        profile
    }

    /// Create a phone booking due the given number of hours from now.
    pub async fn pending_job(&self, hours_ahead: i64) -> Job {
        self.orchestrator
            .create(
                &self.customer,
                scheduled_request(self.clock.now() + Duration::hours(hours_ahead)),
            )
            .await
            .expect("job creation failed")
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

pub fn customer() -> CustomerRef {
    CustomerRef {
        id: Uuid::new_v4(),
        consumer_type: ConsumerType::Paid,
        email: "kund@example.com".to_string(),
        name: "Kund Kundsson".to_string(),
        is_translator: false,
    }
}

pub fn scheduled_request(due: DateTime<Utc>) -> CreateJobRequest {
    CreateJobRequest {
        immediate: false,
        due: Some(due),
        duration_minutes: Some(30),
        from_language_id: Some(LANGUAGE_ID),
        customer_phone_type: true,
        ..Default::default()
    }
}

pub fn professional(name: &str) -> TranslatorProfile {
    TranslatorProfile {
        translator_id: Uuid::new_v4(),
        email: format!("{}@example.com", name.to_lowercase()),
        name: name.to_string(),
        mobile: Some("+46700000001".to_string()),
        translator_type: TranslatorType::Professional,
        languages: vec![LANGUAGE_ID],
        gender: Some(Gender::Female),
        city: None,
        qualifications: vec![QualificationTag::Certified, QualificationTag::Layman],
        not_get_emergency: false,
        not_get_nighttime: false,
        not_get_notification: false,
        is_active: true,
    }
}
