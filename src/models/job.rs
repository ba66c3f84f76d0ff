use crate::state_machine::states::JobStatus;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Billing category of a booking, derived from the customer's consumer type.
/// Controls which translator type may take the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    Paid,
    Rws,
    Unpaid,
}

impl JobType {
    /// The translator type allowed to take jobs of this type.
    pub fn required_translator_type(&self) -> crate::models::TranslatorType {
        use crate::models::TranslatorType;
        match self {
            JobType::Paid => TranslatorType::Professional,
            JobType::Rws => TranslatorType::Rwstranslator,
            JobType::Unpaid => TranslatorType::Volunteer,
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobType::Paid => write!(f, "paid"),
            JobType::Rws => write!(f, "rws"),
            JobType::Unpaid => write!(f, "unpaid"),
        }
    }
}

impl FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paid" => Ok(JobType::Paid),
            "rws" => Ok(JobType::Rws),
            "unpaid" => Ok(JobType::Unpaid),
            _ => Err(format!("Invalid job type: {s}")),
        }
    }
}

/// Customer account category used when deriving a job type at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumerType {
    Paid,
    Rwsconsumer,
    Ngo,
}

impl ConsumerType {
    pub fn job_type(&self) -> JobType {
        match self {
            ConsumerType::Paid => JobType::Paid,
            ConsumerType::Rwsconsumer => JobType::Rws,
            ConsumerType::Ngo => JobType::Unpaid,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            _ => Err(format!("Invalid gender: {s}")),
        }
    }
}

/// Qualification requirement selected by the customer at booking time.
///
/// The `NormalOr*` variants mean the customer accepts both a layman and the
/// named certification. Expansion to acceptable qualification tags lives in
/// [`crate::matching::allowed_qualifications`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CertifiedRequirement {
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "yes")]
    Certified,
    #[serde(rename = "both")]
    Both,
    #[serde(rename = "law")]
    Law,
    #[serde(rename = "n_law")]
    NormalOrLaw,
    #[serde(rename = "health")]
    Health,
    #[serde(rename = "n_health")]
    NormalOrHealth,
}

impl fmt::Display for CertifiedRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CertifiedRequirement::Normal => "normal",
            CertifiedRequirement::Certified => "yes",
            CertifiedRequirement::Both => "both",
            CertifiedRequirement::Law => "law",
            CertifiedRequirement::NormalOrLaw => "n_law",
            CertifiedRequirement::Health => "health",
            CertifiedRequirement::NormalOrHealth => "n_health",
        };
        write!(f, "{s}")
    }
}

impl FromStr for CertifiedRequirement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(CertifiedRequirement::Normal),
            "yes" => Ok(CertifiedRequirement::Certified),
            "both" => Ok(CertifiedRequirement::Both),
            "law" => Ok(CertifiedRequirement::Law),
            "n_law" => Ok(CertifiedRequirement::NormalOrLaw),
            "health" => Ok(CertifiedRequirement::Health),
            "n_health" => Ok(CertifiedRequirement::NormalOrHealth),
            _ => Err(format!("Invalid certified requirement: {s}")),
        }
    }
}

/// Elapsed session time, recorded when a started job completes.
///
/// Stored and rendered as `H:MM:SS`; accepts `H:MM` input from the admin
/// interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTime {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl SessionTime {
    pub fn from_interval(interval: Duration) -> Self {
        let total_seconds = interval.num_seconds().max(0);
        Self {
            hours: total_seconds / 3600,
            minutes: (total_seconds % 3600) / 60,
            seconds: total_seconds % 60,
        }
    }

    /// Human label used in session-ended messages: "1 tim 30 min".
    pub fn label(&self) -> String {
        format!("{} tim {} min", self.hours, self.minutes)
    }
}

impl fmt::Display for SessionTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

impl FromStr for SessionTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 2 && parts.len() != 3 {
            return Err(format!("Invalid session time: {s}"));
        }
        let mut numbers = Vec::with_capacity(3);
        for part in &parts {
            let n: i64 = part
                .trim()
                .parse()
                .map_err(|_| format!("Invalid session time: {s}"))?;
            if n < 0 {
                return Err(format!("Invalid session time: {s}"));
            }
            numbers.push(n);
        }
        Ok(Self {
            hours: numbers[0],
            minutes: numbers[1],
            seconds: if numbers.len() == 3 { numbers[2] } else { 0 },
        })
    }
}

/// A single interpretation booking request.
///
/// Owned exclusively by the customer who created it; mutated by the
/// orchestrator only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub status: JobStatus,
    pub due: DateTime<Utc>,
    pub immediate: bool,
    pub job_type: JobType,
    pub from_language_id: i32,
    pub gender: Option<Gender>,
    pub certified: Option<CertifiedRequirement>,
    pub customer_phone_type: bool,
    pub customer_physical_type: bool,
    pub town: Option<String>,
    pub duration_minutes: i64,
    pub session_time: Option<SessionTime>,
    pub admin_comments: Option<String>,
    pub will_expire_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub withdraw_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Contact email for booking mail, resolved at creation time (booking
    /// override if given, otherwise the customer account address).
    pub customer_email: String,
    pub customer_name: String,
}

impl Job {
    /// A job that must happen on site and cannot fall back to phone. Only
    /// translators in the job's town are eligible for these.
    pub fn is_physical_only(&self) -> bool {
        self.customer_physical_type && !self.customer_phone_type
    }
}

/// Expiry ladder for the acceptance window of a pending job.
///
/// Short-notice bookings expire at their due time; bookings further out get a
/// window proportional to the lead time.
pub fn expiry_for(due: DateTime<Utc>, created_at: DateTime<Utc>) -> DateTime<Utc> {
    let gap = due.signed_duration_since(created_at);
    if gap <= Duration::minutes(90) {
        due
    } else if gap <= Duration::hours(24) {
        created_at + Duration::minutes(90)
    } else if gap <= Duration::hours(72) {
        created_at + Duration::hours(16)
    } else {
        due - Duration::hours(48)
    }
}
