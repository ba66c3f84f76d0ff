//! Dispatcher behavior: night-time batching, opt-outs, SMS fan-out, sounds
//! and transport failure isolation.

mod common;

use booking_core::config::BookingConfig;
use chrono::{Duration, TimeZone, Utc};
use common::{professional, Harness};

#[tokio::test]
async fn test_night_broadcast_is_deferred_to_business_hours() -> anyhow::Result<()> {
    let harness = Harness::new();
    harness.add_translator("Anna");
    // 23:00, inside the night window.
    let night = Utc.with_ymd_and_hms(2024, 3, 1, 23, 0, 0).unwrap();
    harness.clock.set(night);

    harness.pending_job(48).await;

    let broadcast = harness
        .push
        .pushes()
        .into_iter()
        .find(|push| push.payload.notification_type == "suitable_job")
        .expect("no broadcast push");
    assert_eq!(
        broadcast.scheduled_at,
        Some(Utc.with_ymd_and_hms(2024, 3, 2, 9, 0, 0).unwrap())
    );
    Ok(())
}

#[tokio::test]
async fn test_nighttime_opt_out_still_gets_the_push_immediately() -> anyhow::Result<()> {
    let harness = Harness::new();
    let mut opted_out = professional("Anna");
    opted_out.not_get_nighttime = true;
    harness.store.insert_profile(opted_out.clone());

    harness
        .clock
        .set(Utc.with_ymd_and_hms(2024, 3, 1, 23, 0, 0).unwrap());
    harness.pending_job(48).await;

    let broadcast = harness
        .push
        .pushes()
        .into_iter()
        .find(|push| {
            push.payload.notification_type == "suitable_job"
                && push.recipients.iter().any(|r| r.email == opted_out.email)
        })
        .expect("no broadcast push");
    assert_eq!(broadcast.scheduled_at, None);
    Ok(())
}

#[tokio::test]
async fn test_emergency_opt_out_skips_immediate_jobs() -> anyhow::Result<()> {
    let harness = Harness::new();
    let mut no_emergency = professional("Anna");
    no_emergency.not_get_emergency = true;
    harness.store.insert_profile(no_emergency.clone());
    let regular = harness.add_translator("Berit");

    let request = booking_core::orchestration::CreateJobRequest {
        immediate: true,
        duration_minutes: Some(30),
        from_language_id: Some(common::LANGUAGE_ID),
        customer_phone_type: true,
        ..Default::default()
    };
    harness.orchestrator.create(&harness.customer, request).await?;

    let broadcast = harness
        .push
        .pushes()
        .into_iter()
        .find(|push| push.payload.notification_type == "suitable_job")
        .expect("no broadcast push");
    let emails: Vec<_> = broadcast
        .recipients
        .iter()
        .map(|r| r.email.as_str())
        .collect();
    assert_eq!(emails, vec![regular.email.as_str()]);
    // Emergency bookings ring loud.
    assert_eq!(broadcast.payload.android_sound, "emergency_booking");
    Ok(())
}

#[tokio::test]
async fn test_notification_opt_out_is_respected() -> anyhow::Result<()> {
    let harness = Harness::new();
    let mut silent = professional("Anna");
    silent.not_get_notification = true;
    harness.store.insert_profile(silent.clone());

    harness.pending_job(48).await;

    assert!(harness
        .push
        .pushes()
        .iter()
        .all(|push| push.recipients.iter().all(|r| r.email != silent.email)));
    Ok(())
}

#[tokio::test]
async fn test_scheduled_broadcast_uses_the_normal_sound() -> anyhow::Result<()> {
    let harness = Harness::new();
    harness.add_translator("Anna");

    harness.pending_job(48).await;

    let broadcast = harness
        .push
        .pushes()
        .into_iter()
        .find(|push| push.payload.notification_type == "suitable_job")
        .expect("no broadcast push");
    assert_eq!(broadcast.payload.android_sound, "normal_booking");
    assert_eq!(broadcast.payload.ios_sound, "normal_booking.mp3");
    assert!(broadcast.payload.contents.starts_with("Ny bokning"));
    Ok(())
}

#[tokio::test]
async fn test_sms_broadcast_targets_mobiles_only() -> anyhow::Result<()> {
    let harness = Harness::new();
    let with_mobile = harness.add_translator("Anna");
    let mut without_mobile = professional("Berit");
    without_mobile.mobile = None;
    harness.store.insert_profile(without_mobile);

    harness.pending_job(48).await;

    let messages = harness.sms.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(
        messages[0].to_number,
        with_mobile.mobile.as_deref().unwrap()
    );
    assert!(messages[0].body.contains("telefonbokning"));
    assert_eq!(
        messages[0].from_number,
        BookingConfig::default().sms_number
    );
    Ok(())
}

#[tokio::test]
async fn test_broken_mail_transport_never_aborts_the_operation() -> anyhow::Result<()> {
    use booking_core::notifications::clock::Clock;
    use booking_core::notifications::gateway::{MailGateway, PushGateway, SmsGateway};
    use booking_core::orchestration::BookingLifecycleOrchestrator;
    use booking_core::store::memory::InMemoryJobStore;
    use booking_core::store::JobStore;
    use booking_core::test_support::{
        FailingMailGateway, RecordingPushGateway, RecordingSmsGateway,
    };
    use std::sync::Arc;

    let store = Arc::new(InMemoryJobStore::new());
    store.insert_language(common::LANGUAGE_ID, "engelska");
    let translator = professional("Anna");
    store.insert_profile(translator.clone());

    let clock = Arc::new(booking_core::notifications::ManualClock::new(
        common::base_time(),
    ));
    let orchestrator = BookingLifecycleOrchestrator::new(
        Arc::clone(&store) as Arc<dyn JobStore>,
        Arc::new(RecordingPushGateway::new()) as Arc<dyn PushGateway>,
        Arc::new(RecordingSmsGateway::new()) as Arc<dyn SmsGateway>,
        Arc::new(FailingMailGateway) as Arc<dyn MailGateway>,
        Arc::clone(&clock) as Arc<dyn Clock>,
        BookingConfig::default(),
    );

    let job = orchestrator
        .create(
            &common::customer(),
            common::scheduled_request(clock.now() + Duration::hours(48)),
        )
        .await?;

    // Accept succeeds and the status moves even though every mail failed.
    let accepted = orchestrator.accept(job.id, translator.translator_id).await?;
    assert_eq!(
        accepted.status,
        booking_core::state_machine::JobStatus::Assigned
    );
    Ok(())
}
