//! # System Constants
//!
//! Event names, notification types and message keys that define the
//! operational vocabulary of the booking lifecycle engine.
//!
//! Message bodies live with the localization layer; this core only selects
//! message *keys* and template ids, so every user-facing variant has a
//! constant here.

/// Domain events published at commit points of lifecycle operations.
pub mod events {
    pub const JOB_CREATED: &str = "job.created";
    pub const JOB_CANCELED: &str = "job.canceled";
    pub const SESSION_ENDED: &str = "session.ended";
}

/// Push payload notification types understood by the mobile clients.
pub mod notification_types {
    pub const SUITABLE_JOB: &str = "suitable_job";
    pub const JOB_ACCEPTED: &str = "job_accepted";
    pub const JOB_CANCELLED: &str = "job_cancelled";
    pub const JOB_EXPIRED: &str = "job_expired";
    pub const SESSION_START_REMIND: &str = "session_start_remind";
}

/// Notification sounds, selected by booking urgency.
pub mod sounds {
    pub const DEFAULT: &str = "default";
    pub const NORMAL_BOOKING: &str = "normal_booking";
    pub const EMERGENCY_BOOKING: &str = "emergency_booking";
}

/// Message keys for validation and conflict outcomes. Resolution to localized
/// text happens client-side.
pub mod message_keys {
    /// "Du måste fylla in alla fält"
    pub const FILL_ALL_FIELDS: &str = "booking.fill_all_fields";
    /// "Du måste göra ett val här"
    pub const CHOICE_REQUIRED: &str = "booking.choice_required";
    /// "Can't create booking in past"
    pub const DUE_IN_PAST: &str = "booking.due_in_past";
    /// "Translator can not create booking"
    pub const TRANSLATOR_CANNOT_CREATE: &str = "booking.translator_cannot_create";
    /// "Du har redan en bokning den tiden"
    pub const ALREADY_BOOKED: &str = "booking.already_booked_for_time";
    /// "... har redan accepterats av annan tolk"
    pub const SLOT_ALREADY_TAKEN: &str = "booking.slot_already_taken";
    /// "Du kan inte avboka en bokning som sker inom 24 timmar ... ring och
    /// gör din avbokning över telefon"
    pub const CANCEL_BY_PHONE: &str = "booking.cancel_by_phone";
}
