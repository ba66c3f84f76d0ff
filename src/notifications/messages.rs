//! Message variant selection.
//!
//! Two independent axes pick the wording: urgency (immediate vs scheduled)
//! selects the template, and delivery channel (push vs SMS) selects the
//! format. Localized rendering happens downstream; the strings built here
//! match what the gateways expect verbatim.

use crate::models::Job;
use crate::notifications::gateway::PushRecipient;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::collections::HashSet;

pub fn due_date(due: DateTime<Utc>) -> String {
    due.format("%Y-%m-%d").to_string()
}

pub fn due_time(due: DateTime<Utc>) -> String {
    due.format("%H:%M").to_string()
}

fn due_stamp(due: DateTime<Utc>) -> String {
    due.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Render a minute count the way the SMS templates expect: plain minutes
/// below one hour, zero-padded hours and minutes above.
pub fn format_minutes(minutes: i64) -> String {
    if minutes < 60 {
        return format!("{minutes}min");
    }
    format!("{:02}h {:02}min", minutes / 60, minutes % 60)
}

/// Broadcast push wording, selected by urgency.
pub fn broadcast_contents(job: &Job, language: &str) -> String {
    if job.immediate {
        format!(
            "Ny akutbokning för {language}tolk {}min",
            job.duration_minutes
        )
    } else {
        format!(
            "Ny bokning för {language}tolk {}min {}",
            job.duration_minutes,
            due_stamp(job.due)
        )
    }
}

/// Broadcast SMS wording. Physical-only jobs get the physical template with
/// the job's town; everything else defaults to the phone template.
pub fn broadcast_sms_body(job: &Job, fallback_city: &str) -> String {
    let date = job.due.format("%d.%m.%Y").to_string();
    let time = due_time(job.due);
    let duration = format_minutes(job.duration_minutes);
    let job_id = job.id;

    if job.is_physical_only() {
        let city = job.town.as_deref().unwrap_or(fallback_city);
        format!(
            "Ny platsbokning i {city} {date} kl {time}, {duration}. Uppdrag #{job_id}"
        )
    } else {
        format!("Ny telefonbokning {date} kl {time}, {duration}. Uppdrag #{job_id}")
    }
}

/// Session start reminder, selected by the physical/phone axis.
pub fn session_reminder_contents(job: &Job, language: &str) -> String {
    let place = if job.customer_physical_type {
        format!("på plats i {}", job.town.as_deref().unwrap_or(""))
    } else {
        "telefon".to_string()
    };
    format!(
        "Detta är en påminnelse om att du har en {language}tolkning ({place}) kl {} på {} som varar i {} min. Lycka till och kom ihåg att ge feedback efter utförd tolkning!",
        due_time(job.due),
        due_date(job.due),
        job.duration_minutes
    )
}

pub fn accepted_contents(job: &Job, language: &str) -> String {
    format!(
        "Din bokning för {language} translators, {}min, {} har accepterats av en tolk. Vänligen öppna appen för att se detaljer om tolken.",
        job.duration_minutes,
        due_stamp(job.due)
    )
}

pub fn customer_cancelled_contents(job: &Job, language: &str) -> String {
    format!(
        "Kunden har avbokat bokningen för {language} tolk, {} min, {}. Var god och kolla dina tidigare bokningar för detaljer.",
        job.duration_minutes,
        due_stamp(job.due)
    )
}

pub fn translator_cancelled_contents(job: &Job, language: &str) -> String {
    format!(
        "Er {language} tolk, {} min {}, har avbokat tolkningen. Vi letar nu efter en ny tolk som kan ersätta denne. Tack.",
        job.duration_minutes,
        due_stamp(job.due)
    )
}

pub fn expired_contents(job: &Job, language: &str) -> String {
    format!(
        "Tyvärr har ingen tolk accepterat er bokning: ({language}, {}min, {}). Vänligen pröva boka om tiden.",
        job.duration_minutes,
        due_stamp(job.due)
    )
}

pub mod subjects {
    use uuid::Uuid;

    pub fn booking_received(job_id: Uuid) -> String {
        format!("Vi har mottagit er tolkbokning. Bokningsnr: #{job_id}")
    }

    pub fn job_accepted(job_id: Uuid) -> String {
        format!("Bekräftelse - tolk har accepterat er bokning (bokning # {job_id})")
    }

    pub fn cancellation(job_id: Uuid) -> String {
        format!("Avbokning av bokningsnr: #{job_id}")
    }

    pub fn session_ended(job_id: Uuid) -> String {
        format!("Information om avslutad tolkning för bokningsnummer #{job_id}")
    }

    pub fn reopened(language: &str, job_id: Uuid) -> String {
        format!("Vi har nu återöppnat er bokning av {language}tolk för bokning #{job_id}")
    }

    pub fn booking_changed(job_id: Uuid) -> String {
        format!("Meddelande om ändring av tolkbokning för uppdrag #{job_id}")
    }

    pub fn translator_changed(job_id: Uuid) -> String {
        format!("Meddelande om tilldelning av tolkuppdrag för uppdrag #{job_id}")
    }
}

/// Build the OR-joined tag query for the push gateway, deduplicated by
/// lower-cased email identity.
pub fn user_tags(recipients: &[PushRecipient]) -> Value {
    let mut seen: HashSet<String> = HashSet::new();
    let mut tags: Vec<Value> = Vec::new();

    for recipient in recipients {
        let email = recipient.email.to_lowercase();
        if !seen.insert(email.clone()) {
            continue;
        }
        if !tags.is_empty() {
            tags.push(json!({ "operator": "OR" }));
        }
        tags.push(json!({
            "key": "email",
            "relation": "=",
            "value": email,
        }));
    }

    Value::Array(tags)
}

/// Job fields the mobile clients need alongside any booking push.
pub fn job_payload_data(job: &Job, language: &str) -> Value {
    json!({
        "job_id": job.id,
        "from_language_id": job.from_language_id,
        "language": language,
        "immediate": job.immediate,
        "duration": job.duration_minutes,
        "status": job.status,
        "gender": job.gender,
        "certified": job.certified,
        "due": due_stamp(job.due),
        "due_date": due_date(job.due),
        "due_time": due_time(job.due),
        "job_type": job.job_type,
        "customer_phone_type": job.customer_phone_type,
        "customer_physical_type": job.customer_physical_type,
        "customer_town": job.town,
    })
}
