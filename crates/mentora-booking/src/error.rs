//! Booking rule violations.

use mentora_core::error::MentoraError;
use mentora_core::models::session::SessionStatus;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("mentor {0} not found")]
    MentorNotFound(Uuid),

    #[error("session {0} not found")]
    SessionNotFound(Uuid),

    #[error("cannot move session from {from} to {to}")]
    IllegalTransition {
        from: SessionStatus,
        to: SessionStatus,
    },

    #[error("session {id} is no longer {expected}")]
    StatusChanged { id: Uuid, expected: SessionStatus },

    #[error("review score must be between {min} and {max}, got {score}")]
    ScoreOutOfRange { score: u8, min: u8, max: u8 },

    #[error("session {0} has already been reviewed")]
    AlreadyReviewed(Uuid),
}

impl From<BookingError> for MentoraError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::MentorNotFound(id) => MentoraError::NotFound {
                entity: "mentor".into(),
                id: id.to_string(),
            },
            BookingError::SessionNotFound(id) => MentoraError::NotFound {
                entity: "session".into(),
                id: id.to_string(),
            },
            BookingError::IllegalTransition { .. }
            | BookingError::StatusChanged { .. }
            | BookingError::ScoreOutOfRange { .. }
            | BookingError::AlreadyReviewed(_) => MentoraError::Validation {
                message: err.to_string(),
            },
        }
    }
}
