//! Session lifecycle: status changes, participant views and reviews.

use mentora_core::error::{MentoraError, MentoraResult};
use mentora_core::models::review::{CreateReview, MAX_SCORE, MIN_SCORE, Review};
use mentora_core::models::session::{Session, SessionStatus};
use mentora_core::models::user::UserRole;
use mentora_core::repository::{ReviewRepository, SessionRepository};
use tracing::info;
use uuid::Uuid;

use crate::config::BookingConfig;
use crate::error::BookingError;

fn is_participant(session: &Session, user_id: Uuid, role: UserRole) -> bool {
    match role {
        UserRole::Mentor => session.mentor_id == user_id,
        UserRole::Mentee => session.mentee_id == user_id,
    }
}

/// Session lifecycle service.
///
/// Status transitions are permissive unless
/// [`BookingConfig::enforce_transitions`] is set.
pub struct SessionService<S: SessionRepository, R: ReviewRepository> {
    sessions: S,
    reviews: R,
    config: BookingConfig,
}

impl<S: SessionRepository, R: ReviewRepository> SessionService<S, R> {
    pub fn new(sessions: S, reviews: R, config: BookingConfig) -> Self {
        Self {
            sessions,
            reviews,
            config,
        }
    }

    pub async fn update_status(
        &self,
        session_id: Uuid,
        status: SessionStatus,
    ) -> MentoraResult<Session> {
        let current = self.sessions.get_by_id(session_id).await?;
        let slot_taken = |e: MentoraError| match e {
            MentoraError::Conflict { .. } => MentoraError::SlotTaken {
                date: current.date,
                slot: current.slot,
            },
            other => other,
        };

        let updated = if self.config.enforce_transitions {
            if !current.status.can_transition_to(status) {
                return Err(BookingError::IllegalTransition {
                    from: current.status,
                    to: status,
                }
                .into());
            }
            // Applies only while the stored status is still `current.status`.
            self.sessions
                .update_status_if(session_id, current.status, status)
                .await
                .map_err(slot_taken)?
                .ok_or(BookingError::StatusChanged {
                    id: session_id,
                    expected: current.status,
                })?
        } else {
            self.sessions
                .update_status(session_id, status)
                .await
                .map_err(slot_taken)?
        };

        info!(
            %session_id,
            from = %current.status,
            to = %updated.status,
            "Session status updated"
        );
        Ok(updated)
    }

    /// Sessions visible to the caller in their role.
    pub async fn list_sessions(&self, caller_id: Uuid, role: UserRole) -> MentoraResult<Vec<Session>> {
        self.sessions.find_by_participant(caller_id, role).await
    }

    /// A single session, only if the caller takes part in it in `role`.
    pub async fn get_session(
        &self,
        caller_id: Uuid,
        role: UserRole,
        session_id: Uuid,
    ) -> MentoraResult<Session> {
        let session = self.sessions.get_by_id(session_id).await?;
        if !is_participant(&session, caller_id, role) {
            return Err(BookingError::SessionNotFound(session_id).into());
        }
        Ok(session)
    }

    /// Record the mentee's review of a session.
    pub async fn review_session(&self, input: CreateReview) -> MentoraResult<Review> {
        if !(MIN_SCORE..=MAX_SCORE).contains(&input.score) {
            return Err(BookingError::ScoreOutOfRange {
                score: input.score,
                min: MIN_SCORE,
                max: MAX_SCORE,
            }
            .into());
        }

        let session = self.sessions.get_by_id(input.session_id).await?;
        if session.mentee_id != input.mentee_id || session.mentor_id != input.mentor_id {
            return Err(BookingError::SessionNotFound(input.session_id).into());
        }

        let session_id = input.session_id;
        let review = self.reviews.create(input).await.map_err(|e| match e {
            MentoraError::Conflict { .. } => BookingError::AlreadyReviewed(session_id).into(),
            other => other,
        })?;

        info!(%session_id, score = review.score, "Session reviewed");
        Ok(review)
    }
}
