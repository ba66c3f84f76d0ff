//! # Translator Matching
//!
//! Pure filtering logic selecting the translators eligible for a job. No
//! ranking is applied; output preserves the input profile order.

use crate::models::{CertifiedRequirement, Job, QualificationTag, TranslatorProfile};
use std::collections::HashSet;
use uuid::Uuid;

/// Expand a customer's qualification requirement into the set of acceptable
/// qualification tags.
///
/// No requirement means any qualification is acceptable.
pub fn allowed_qualifications(requirement: Option<CertifiedRequirement>) -> Vec<QualificationTag> {
    match requirement {
        Some(CertifiedRequirement::Certified) | Some(CertifiedRequirement::Both) => vec![
            QualificationTag::Certified,
            QualificationTag::CertifiedLaw,
            QualificationTag::CertifiedHealth,
        ],
        Some(CertifiedRequirement::Law) | Some(CertifiedRequirement::NormalOrLaw) => {
            vec![QualificationTag::CertifiedLaw]
        }
        Some(CertifiedRequirement::Health) | Some(CertifiedRequirement::NormalOrHealth) => {
            vec![QualificationTag::CertifiedHealth]
        }
        Some(CertifiedRequirement::Normal) => {
            vec![QualificationTag::Layman, QualificationTag::ReadCourses]
        }
        None => QualificationTag::ALL.to_vec(),
    }
}

/// Multi-axis eligibility filter for broadcasting jobs to translators.
#[derive(Debug, Clone, Copy, Default)]
pub struct TranslatorMatcher;

impl TranslatorMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Check a single translator against every eligibility axis:
    /// translator type, language, gender, qualification allow-set,
    /// customer blacklist and the town rule for physical-only jobs.
    pub fn is_eligible(
        &self,
        job: &Job,
        profile: &TranslatorProfile,
        blacklisted: &HashSet<Uuid>,
    ) -> bool {
        if profile.translator_type != job.job_type.required_translator_type() {
            return false;
        }

        if !profile.speaks(job.from_language_id) {
            return false;
        }

        if let Some(required_gender) = job.gender {
            if profile.gender != Some(required_gender) {
                return false;
            }
        }

        let allowed = allowed_qualifications(job.certified);
        if !profile.holds_any(&allowed) {
            return false;
        }

        if blacklisted.contains(&profile.translator_id) {
            return false;
        }

        // Physical-only jobs stay within the job's town.
        if job.is_physical_only() && profile.city.as_deref() != job.town.as_deref() {
            return false;
        }

        true
    }

    /// Filter a profile set down to the translators eligible for `job`.
    /// Ordering beyond the filters is unspecified; input order is kept.
    pub fn find_eligible<'a>(
        &self,
        job: &Job,
        profiles: &'a [TranslatorProfile],
        blacklisted: &HashSet<Uuid>,
    ) -> Vec<&'a TranslatorProfile> {
        profiles
            .iter()
            .filter(|profile| self.is_eligible(job, profile, blacklisted))
            .collect()
    }
}
