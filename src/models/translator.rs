use crate::models::job::Gender;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Employment category of a translator. Each job type is served by exactly
/// one translator type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslatorType {
    Professional,
    Rwstranslator,
    Volunteer,
}

impl fmt::Display for TranslatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslatorType::Professional => write!(f, "professional"),
            TranslatorType::Rwstranslator => write!(f, "rwstranslator"),
            TranslatorType::Volunteer => write!(f, "volunteer"),
        }
    }
}

impl FromStr for TranslatorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "professional" => Ok(TranslatorType::Professional),
            "rwstranslator" => Ok(TranslatorType::Rwstranslator),
            "volunteer" => Ok(TranslatorType::Volunteer),
            _ => Err(format!("Invalid translator type: {s}")),
        }
    }
}

/// Qualification tag held by a translator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualificationTag {
    Certified,
    CertifiedLaw,
    CertifiedHealth,
    Layman,
    ReadCourses,
}

impl QualificationTag {
    pub const ALL: [QualificationTag; 5] = [
        QualificationTag::Certified,
        QualificationTag::CertifiedLaw,
        QualificationTag::CertifiedHealth,
        QualificationTag::Layman,
        QualificationTag::ReadCourses,
    ];

    /// Qualification label as recorded on translator profiles.
    pub fn as_str(&self) -> &'static str {
        match self {
            QualificationTag::Certified => "Certified",
            QualificationTag::CertifiedLaw => "Certified with specialization in law",
            QualificationTag::CertifiedHealth => "Certified with specialization in health care",
            QualificationTag::Layman => "Layman",
            QualificationTag::ReadCourses => "Read Translation courses",
        }
    }
}

impl fmt::Display for QualificationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for QualificationTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Certified" => Ok(QualificationTag::Certified),
            "Certified with specialization in law" => Ok(QualificationTag::CertifiedLaw),
            "Certified with specialization in health care" => Ok(QualificationTag::CertifiedHealth),
            "Layman" => Ok(QualificationTag::Layman),
            "Read Translation courses" => Ok(QualificationTag::ReadCourses),
            _ => Err(format!("Invalid qualification tag: {s}")),
        }
    }
}

/// Translator profile as seen by the matcher and the notification
/// dispatcher. Read-only to this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatorProfile {
    pub translator_id: Uuid,
    pub email: String,
    pub name: String,
    pub mobile: Option<String>,
    pub translator_type: TranslatorType,
    /// Language ids the translator has declared.
    pub languages: Vec<i32>,
    pub gender: Option<Gender>,
    pub city: Option<String>,
    pub qualifications: Vec<QualificationTag>,
    pub not_get_emergency: bool,
    pub not_get_nighttime: bool,
    pub not_get_notification: bool,
    pub is_active: bool,
}

impl TranslatorProfile {
    pub fn speaks(&self, language_id: i32) -> bool {
        self.languages.contains(&language_id)
    }

    pub fn holds_any(&self, tags: &[QualificationTag]) -> bool {
        self.qualifications.iter().any(|q| tags.contains(q))
    }
}
