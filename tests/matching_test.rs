//! Eligibility filtering, both directly against the matcher and through the
//! broadcast fan-out.

mod common;

use booking_core::matching::TranslatorMatcher;
use booking_core::models::{CertifiedRequirement, Gender, QualificationTag, TranslatorType};
use common::{professional, Harness};
use std::collections::HashSet;

#[tokio::test]
async fn test_broadcast_skips_wrong_language_and_type() -> anyhow::Result<()> {
    let harness = Harness::new();
    let eligible = harness.add_translator("Anna");

    let mut wrong_language = professional("Berit");
    wrong_language.languages = vec![99];
    harness.store.insert_profile(wrong_language.clone());

    let mut volunteer = professional("Cecilia");
    volunteer.translator_type = TranslatorType::Volunteer;
    harness.store.insert_profile(volunteer.clone());

    harness.pending_job(48).await;

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
    assert_eq!(emails, vec![eligible.email.as_str()]);
    Ok(())
}

#[tokio::test]
async fn test_broadcast_honors_gender_requirement() -> anyhow::Result<()> {
    let harness = Harness::new();
    let woman = harness.add_translator("Anna");
    let mut man = professional("Bertil");
    man.gender = Some(Gender::Male);
    harness.store.insert_profile(man.clone());

    let mut request =
        common::scheduled_request(harness.now() + chrono::Duration::hours(48));
    request.gender = Some(Gender::Female);
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
    assert!(emails.contains(&woman.email.as_str()));
    assert!(!emails.contains(&man.email.as_str()));
    Ok(())
}

#[tokio::test]
async fn test_blacklisted_translator_is_never_contacted() -> anyhow::Result<()> {
    let harness = Harness::new();
    let blocked = harness.add_translator("Anna");
    let allowed = harness.add_translator("Berit");
    harness
        .store
        .blacklist(harness.customer.id, blocked.translator_id);

    harness.pending_job(48).await;

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
    assert_eq!(emails, vec![allowed.email.as_str()]);
    Ok(())
}

#[tokio::test]
async fn test_physical_only_jobs_stay_in_town() -> anyhow::Result<()> {
    let harness = Harness::new();
    let mut local = professional("Anna");
    local.city = Some("Stockholm".to_string());
    harness.store.insert_profile(local.clone());
    let mut remote = professional("Berit");
    remote.city = Some("Göteborg".to_string());
    harness.store.insert_profile(remote.clone());

    let mut request =
        common::scheduled_request(harness.now() + chrono::Duration::hours(48));
    request.customer_phone_type = false;
    request.customer_physical_type = true;
    request.town = Some("Stockholm".to_string());
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
    assert_eq!(emails, vec![local.email.as_str()]);
    Ok(())
}

#[test]
fn test_certified_requirement_excludes_laymen() {
    let matcher = TranslatorMatcher::new();
    let mut job = sample_job();
    job.certified = Some(CertifiedRequirement::Both);

    let mut layman = professional("Anna");
    layman.qualifications = vec![QualificationTag::Layman];
    let mut certified = professional("Berit");
    certified.qualifications = vec![QualificationTag::CertifiedLaw];

    let empty = HashSet::new();
    assert!(!matcher.is_eligible(&job, &layman, &empty));
    assert!(matcher.is_eligible(&job, &certified, &empty));
}

#[test]
fn test_eligibility_order_is_preserved() {
    let matcher = TranslatorMatcher::new();
    let job = sample_job();
    let profiles = vec![professional("Anna"), professional("Berit")];

    let eligible = matcher.find_eligible(&job, &profiles, &HashSet::new());
    let names: Vec<_> = eligible.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Anna", "Berit"]);
}

fn sample_job() -> booking_core::models::Job {
    use booking_core::models::JobType;
    use booking_core::state_machine::JobStatus;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    booking_core::models::Job {
        id: Uuid::new_v4(),
        customer_id: Uuid::new_v4(),
        status: JobStatus::Pending,
        due: Utc::now() + Duration::hours(48),
        immediate: false,
        job_type: JobType::Paid,
        from_language_id: common::LANGUAGE_ID,
        gender: None,
        certified: None,
        customer_phone_type: true,
        customer_physical_type: false,
        town: None,
        duration_minutes: 30,
        session_time: None,
        admin_comments: None,
        will_expire_at: None,
        end_at: None,
        withdraw_at: None,
        created_at: Utc::now(),
        customer_email: "kund@example.com".to_string(),
        customer_name: "Kund".to_string(),
    }
}
