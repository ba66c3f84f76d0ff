//! End-to-end lifecycle coverage: creation rules, the happy path through
//! session end, and the admin transition engine.

mod common;

use booking_core::constants::{events, message_keys};
use booking_core::error::BookingError;
use booking_core::models::SessionTime;
use booking_core::orchestration::CreateJobRequest;
use booking_core::state_machine::{JobStatus, StatusChangeContext, TransitionOutcome};
use booking_core::store::JobStore;
use chrono::Duration;
use common::{customer, scheduled_request, Harness, LANGUAGE_ID};

#[tokio::test]
async fn test_translator_account_cannot_create() {
    let harness = Harness::new();
    let mut translator_account = customer();
    translator_account.is_translator = true;

    let err = harness
        .orchestrator
        .create(
            &translator_account,
            scheduled_request(harness.now() + Duration::hours(48)),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err.message_key(),
        Some(message_keys::TRANSLATOR_CANNOT_CREATE)
    );
}

#[tokio::test]
async fn test_create_requires_language_due_and_duration() {
    let harness = Harness::new();

    let mut no_language = scheduled_request(harness.now() + Duration::hours(4));
    no_language.from_language_id = None;
    let err = harness
        .orchestrator
        .create(&harness.customer, no_language)
        .await
        .unwrap_err();
    assert_eq!(err.message_key(), Some(message_keys::FILL_ALL_FIELDS));

    let mut no_due = scheduled_request(harness.now());
    no_due.due = None;
    let err = harness
        .orchestrator
        .create(&harness.customer, no_due)
        .await
        .unwrap_err();
    assert_eq!(err.message_key(), Some(message_keys::FILL_ALL_FIELDS));

    let past = scheduled_request(harness.now() - Duration::hours(1));
    let err = harness
        .orchestrator
        .create(&harness.customer, past)
        .await
        .unwrap_err();
    assert_eq!(err.message_key(), Some(message_keys::DUE_IN_PAST));
}

#[tokio::test]
async fn test_create_requires_a_session_form_choice() {
    let harness = Harness::new();
    let mut neither = scheduled_request(harness.now() + Duration::hours(4));
    neither.customer_phone_type = false;
    neither.customer_physical_type = false;

    let err = harness
        .orchestrator
        .create(&harness.customer, neither)
        .await
        .unwrap_err();
    assert_eq!(err.message_key(), Some(message_keys::CHOICE_REQUIRED));
}

#[tokio::test]
async fn test_immediate_booking_gets_short_due_and_phone_session() -> anyhow::Result<()> {
    let harness = Harness::new();
    let request = CreateJobRequest {
        immediate: true,
        duration_minutes: Some(30),
        from_language_id: Some(LANGUAGE_ID),
        customer_physical_type: true,
        ..Default::default()
    };

    let job = harness.orchestrator.create(&harness.customer, request).await?;
    assert!(job.immediate);
    assert_eq!(job.due, harness.now() + Duration::minutes(5));
    assert!(job.customer_phone_type);
    // Short-notice bookings expire at their due time.
    assert_eq!(job.will_expire_at, Some(job.due));
    Ok(())
}

#[tokio::test]
async fn test_create_publishes_event_and_mails_receipt() -> anyhow::Result<()> {
    let harness = Harness::new();
    let mut events = harness.orchestrator.subscribe();

    let job = harness.pending_job(48).await;

    let event = events.recv().await?;
    assert_eq!(event.name, events::JOB_CREATED);
    assert_eq!(event.job_id, job.id);
    assert_eq!(event.actor_id, Some(harness.customer.id));

    let receipts = harness.mail.mails_to("kund@example.com");
    assert!(receipts
        .iter()
        .any(|mail| mail.subject.contains("mottagit")));
    Ok(())
}

#[tokio::test]
async fn test_full_happy_path_to_completed() -> anyhow::Result<()> {
    let harness = Harness::new();
    let translator = harness.add_translator("Anna");
    let job = harness.pending_job(2).await;
    let mut events = harness.orchestrator.subscribe();

    harness
        .orchestrator
        .accept(job.id, translator.translator_id)
        .await?;
    let started = harness.orchestrator.start(job.id).await?;
    assert_eq!(started.status, JobStatus::Started);

    // Session runs 90 minutes past the due time.
    harness.clock.set(job.due + Duration::minutes(90));
    let ended = harness
        .orchestrator
        .end(job.id, translator.translator_id)
        .await?;

    assert_eq!(ended.status, JobStatus::Completed);
    assert_eq!(
        ended.session_time,
        Some(SessionTime::from_interval(Duration::minutes(90)))
    );
    assert_eq!(ended.end_at, Some(harness.now()));

    let assignment = &harness.store.assignments_for_job(job.id).await?[0];
    assert_eq!(assignment.completed_by, Some(translator.translator_id));
    assert!(assignment.completed_at.is_some());

    // Both sides get a session summary, each with its own billing word.
    let customer_mail = harness
        .mail
        .mails_to("kund@example.com")
        .into_iter()
        .find(|mail| mail.subject.contains("avslutad"))
        .expect("no customer session mail");
    assert_eq!(customer_mail.template_data["for_text"], "faktura");
    let translator_mail = harness
        .mail
        .mails_to(&translator.email)
        .into_iter()
        .find(|mail| mail.subject.contains("avslutad"))
        .expect("no translator session mail");
    assert_eq!(translator_mail.template_data["for_text"], "lön");
    assert_eq!(translator_mail.template_data["session_time"], "1 tim 30 min");

    loop {
        let event = events.recv().await?;
        if event.name == events::SESSION_ENDED {
            assert_eq!(event.payload["session_time"], "1:30:00");
            assert_eq!(
                event.payload["counterpart"],
                serde_json::json!(harness.customer.id)
            );
            break;
        }
    }
    Ok(())
}

#[tokio::test]
async fn test_end_is_a_no_op_unless_started() -> anyhow::Result<()> {
    let harness = Harness::new();
    let translator = harness.add_translator("Anna");
    let job = harness.pending_job(48).await;
    harness
        .orchestrator
        .accept(job.id, translator.translator_id)
        .await?;

    let unchanged = harness
        .orchestrator
        .end(job.id, translator.translator_id)
        .await?;
    assert_eq!(unchanged.status, JobStatus::Assigned);
    assert!(unchanged.session_time.is_none());
    Ok(())
}

#[tokio::test]
async fn test_start_requires_an_assigned_job() {
    let harness = Harness::new();
    let job = harness.pending_job(48).await;

    let err = harness.orchestrator.start(job.id).await.unwrap_err();
    assert!(matches!(err, BookingError::Conflict(_)));
}

#[tokio::test]
async fn test_pending_to_timedout_requires_admin_comments() -> anyhow::Result<()> {
    let harness = Harness::new();
    let job = harness.pending_job(48).await;

    let err = harness
        .orchestrator
        .change_status(
            job.id,
            &StatusChangeContext {
                requested_status: Some(JobStatus::Timedout),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.message_key(), Some(message_keys::FILL_ALL_FIELDS));

    let outcome = harness
        .orchestrator
        .change_status(
            job.id,
            &StatusChangeContext {
                requested_status: Some(JobStatus::Timedout),
                admin_comments: Some("Ingen tolk hittades".to_string()),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(
        outcome,
        TransitionOutcome::Applied {
            from: JobStatus::Pending,
            to: JobStatus::Timedout
        }
    );
    let stored = harness.store.load_job(job.id).await?;
    assert_eq!(stored.admin_comments.as_deref(), Some("Ingen tolk hittades"));
    Ok(())
}

#[tokio::test]
async fn test_any_status_applies_from_pending_with_a_customer_notice() -> anyhow::Result<()> {
    let harness = Harness::new();
    let job = harness.pending_job(48).await;
    let mails_before = harness.mail.mails_to("kund@example.com").len();

    let outcome = harness
        .orchestrator
        .change_status(
            job.id,
            &StatusChangeContext {
                requested_status: Some(JobStatus::Started),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(
        outcome,
        TransitionOutcome::Applied {
            from: JobStatus::Pending,
            to: JobStatus::Started
        }
    );

    let stored = harness.store.load_job(job.id).await?;
    assert_eq!(stored.status, JobStatus::Started);

    // The customer is mailed the status-change notice.
    let notices = harness.mail.mails_to("kund@example.com");
    assert_eq!(notices.len(), mails_before + 1);
    assert!(notices
        .last()
        .unwrap()
        .subject
        .contains("Avbokning"));
    Ok(())
}

#[tokio::test]
async fn test_started_to_completed_requires_session_time() -> anyhow::Result<()> {
    let harness = Harness::new();
    let translator = harness.add_translator("Anna");
    let job = harness.pending_job(2).await;
    harness
        .orchestrator
        .accept(job.id, translator.translator_id)
        .await?;
    harness.orchestrator.start(job.id).await?;

    let missing = harness
        .orchestrator
        .change_status(
            job.id,
            &StatusChangeContext {
                requested_status: Some(JobStatus::Completed),
                admin_comments: Some("klart".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(missing.message_key(), Some(message_keys::FILL_ALL_FIELDS));

    let outcome = harness
        .orchestrator
        .change_status(
            job.id,
            &StatusChangeContext {
                requested_status: Some(JobStatus::Completed),
                admin_comments: Some("klart".to_string()),
                session_time: Some("1:15".to_string()),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(
        outcome,
        TransitionOutcome::Applied {
            from: JobStatus::Started,
            to: JobStatus::Completed
        }
    );

    let stored = harness.store.load_job(job.id).await?;
    assert_eq!(stored.session_time.unwrap().to_string(), "1:15:00");
    Ok(())
}

#[tokio::test]
async fn test_timedout_back_to_pending_rebroadcasts() -> anyhow::Result<()> {
    let harness = Harness::new();
    harness.add_translator("Anna");
    let job = harness.pending_job(48).await;
    harness
        .orchestrator
        .change_status(
            job.id,
            &StatusChangeContext {
                requested_status: Some(JobStatus::Timedout),
                admin_comments: Some("utgått".to_string()),
                ..Default::default()
            },
        )
        .await?;

    harness.clock.advance(Duration::hours(1));
    let pushes_before = harness.push.push_count();

    let outcome = harness
        .orchestrator
        .change_status(
            job.id,
            &StatusChangeContext {
                requested_status: Some(JobStatus::Pending),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(
        outcome,
        TransitionOutcome::Applied {
            from: JobStatus::Timedout,
            to: JobStatus::Pending
        }
    );

    let stored = harness.store.load_job(job.id).await?;
    assert_eq!(stored.status, JobStatus::Pending);
    // The acceptance window restarts from the reopening instant.
    assert_eq!(stored.created_at, harness.now());
    assert!(harness.push.push_count() > pushes_before);
    Ok(())
}

#[tokio::test]
async fn test_unrecognized_combination_is_not_applied() -> anyhow::Result<()> {
    let harness = Harness::new();
    let translator = harness.add_translator("Anna");
    let job = harness.pending_job(48).await;
    harness
        .orchestrator
        .accept(job.id, translator.translator_id)
        .await?;

    let outcome = harness
        .orchestrator
        .change_status(
            job.id,
            &StatusChangeContext {
                requested_status: Some(JobStatus::Completed),
                admin_comments: Some("x".to_string()),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(outcome, TransitionOutcome::NotApplied);

    let stored = harness.store.load_job(job.id).await?;
    assert_eq!(stored.status, JobStatus::Assigned);
    Ok(())
}

#[tokio::test]
async fn test_not_carried_out_credits_the_translator() -> anyhow::Result<()> {
    let harness = Harness::new();
    let translator = harness.add_translator("Anna");
    let job = harness.pending_job(2).await;
    harness
        .orchestrator
        .accept(job.id, translator.translator_id)
        .await?;

    harness.clock.set(job.due + Duration::minutes(15));
    let closed = harness.orchestrator.not_carried_out(job.id).await?;
    assert_eq!(closed.status, JobStatus::NotCarriedOutCustomer);
    assert_eq!(closed.end_at, Some(harness.now()));

    let assignment = &harness.store.assignments_for_job(job.id).await?[0];
    assert_eq!(assignment.completed_by, Some(translator.translator_id));
    Ok(())
}

#[tokio::test]
async fn test_update_due_notifies_until_the_job_is_past() -> anyhow::Result<()> {
    let harness = Harness::new();
    let translator = harness.add_translator("Anna");
    let job = harness.pending_job(48).await;
    harness
        .orchestrator
        .accept(job.id, translator.translator_id)
        .await?;

    let new_due = harness.now() + Duration::hours(72);
    let report = harness
        .orchestrator
        .update(
            job.id,
            booking_core::orchestration::UpdateJobRequest {
                due: Some(new_due),
                ..Default::default()
            },
        )
        .await?;
    assert!(matches!(
        report,
        booking_core::orchestration::UpdateReport::NotificationSent(_)
    ));

    let changed: Vec<_> = harness
        .mail
        .mails()
        .into_iter()
        .filter(|mail| mail.subject.contains("ändring"))
        .collect();
    // Customer and assigned translator both hear about the new time.
    assert_eq!(changed.len(), 2);

    // Once the due time has passed, further edits go out silently.
    harness.clock.set(new_due + Duration::hours(1));
    let mails_before = harness.mail.mails().len();
    let report = harness
        .orchestrator
        .update(
            job.id,
            booking_core::orchestration::UpdateJobRequest {
                due: Some(new_due - Duration::hours(2)),
                ..Default::default()
            },
        )
        .await?;
    assert!(matches!(
        report,
        booking_core::orchestration::UpdateReport::Updated(_)
    ));
    assert_eq!(harness.mail.mails().len(), mails_before);
    Ok(())
}

#[tokio::test]
async fn test_expire_closes_overdue_pending_jobs() -> anyhow::Result<()> {
    let harness = Harness::new();
    harness.add_translator("Anna");
    let job = harness.pending_job(48).await;
    // 48 hours out, the acceptance window is 16 hours from creation.
    assert_eq!(
        job.will_expire_at,
        Some(job.created_at + Duration::hours(16))
    );

    // Still inside the window: nothing happens.
    let untouched = harness.orchestrator.expire(job.id).await?;
    assert_eq!(untouched.status, JobStatus::Pending);

    harness.clock.advance(Duration::hours(17));
    let expired = harness.orchestrator.expire(job.id).await?;
    assert_eq!(expired.status, JobStatus::Timedout);

    // The customer hears nobody took the booking.
    assert!(harness.push.pushes().iter().any(|push| {
        push.payload.notification_type == "job_expired"
            && push.recipients[0].email == "kund@example.com"
    }));
    Ok(())
}
