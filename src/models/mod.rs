//! # Domain Models
//!
//! Core data types for the booking lifecycle: jobs, translator assignments
//! and translator profiles. Status lives in [`crate::state_machine::states`]
//! and is re-exported here for convenience.

pub mod assignment;
pub mod job;
pub mod translator;

pub use assignment::TranslatorAssignment;
pub use job::{
    expiry_for, CertifiedRequirement, ConsumerType, Gender, Job, JobType, SessionTime,
};
pub use translator::{QualificationTag, TranslatorProfile, TranslatorType};
