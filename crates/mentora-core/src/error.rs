//! Error types for the Mentora booking engine.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::slot::SlotLabel;

#[derive(Debug, Error)]
pub enum MentoraError {
    #[error("Invalid time range: {start} to {end}")]
    InvalidRange { start: String, end: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Mentor {mentor_id} has no availability on {date}")]
    NotAvailableThisDay { mentor_id: Uuid, date: NaiveDate },

    #[error("Mentor {mentor_id} is fully booked on {date}")]
    NoAvailability { mentor_id: Uuid, date: NaiveDate },

    #[error("Slot {slot} on {date} is not available")]
    SlotTaken { date: NaiveDate, slot: SlotLabel },

    /// Storage-level uniqueness violation. Services translate this
    /// before it reaches a caller.
    #[error("Uniqueness conflict on key {key}")]
    Conflict { key: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type MentoraResult<T> = Result<T, MentoraError>;

/// Stable classification of [`MentoraError`] for client code.
///
/// The `Display` output of an error carries ids and dates; the kind
/// does not, so callers should branch on this instead of on strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidRange,
    NotFound,
    NotAvailableThisDay,
    NoAvailability,
    SlotTaken,
    Conflict,
    Validation,
    Database,
    Internal,
}

impl ErrorKind {
    /// Machine-readable code.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::InvalidRange => "invalid_range",
            ErrorKind::NotFound => "not_found",
            ErrorKind::NotAvailableThisDay => "not_available_this_day",
            ErrorKind::NoAvailability => "no_availability",
            ErrorKind::SlotTaken => "slot_taken",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Validation => "validation",
            ErrorKind::Database => "database",
            ErrorKind::Internal => "internal",
        }
    }

    /// User-facing message. One fixed sentence per kind.
    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::InvalidRange => "The end time must be later than the start time",
            ErrorKind::NotFound => "The requested record was not found",
            ErrorKind::NotAvailableThisDay => {
                "Sorry, this mentor is not available for the selected date"
            }
            ErrorKind::NoAvailability => "Sorry, this mentor is fully booked for the selected date",
            ErrorKind::SlotTaken => "Sorry, this mentor is not available for the selected time",
            ErrorKind::Conflict => "The record was modified concurrently",
            ErrorKind::Validation => "The request is invalid",
            ErrorKind::Database => "A storage error occurred",
            ErrorKind::Internal => "An internal error occurred",
        }
    }
}

impl MentoraError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MentoraError::InvalidRange { .. } => ErrorKind::InvalidRange,
            MentoraError::NotFound { .. } => ErrorKind::NotFound,
            MentoraError::NotAvailableThisDay { .. } => ErrorKind::NotAvailableThisDay,
            MentoraError::NoAvailability { .. } => ErrorKind::NoAvailability,
            MentoraError::SlotTaken { .. } => ErrorKind::SlotTaken,
            MentoraError::Conflict { .. } => ErrorKind::Conflict,
            MentoraError::Validation { .. } => ErrorKind::Validation,
            MentoraError::Database(_) => ErrorKind::Database,
            MentoraError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        MentoraError::Validation {
            message: message.into(),
        }
    }
}
