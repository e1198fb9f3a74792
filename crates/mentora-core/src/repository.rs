//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Implementations must be
//! cheap to clone and safe to share across concurrent requests.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::calendar::DayOfWeek;
use crate::error::MentoraResult;
use crate::models::{
    availability::{AvailabilityWindow, CreateAvailabilityWindow, UpdateAvailabilityWindow},
    review::{CreateReview, Review},
    session::{CreateSession, Session, SessionStatus},
    user::{UserRole, UserSummary},
};

// ---------------------------------------------------------------------------
// Availability
// ---------------------------------------------------------------------------

pub trait AvailabilityRepository: Send + Sync {
    /// Persist a new window. Slots are derived from the bounds.
    fn create(
        &self,
        input: CreateAvailabilityWindow,
    ) -> impl Future<Output = MentoraResult<AvailabilityWindow>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = MentoraResult<AvailabilityWindow>> + Send;
    /// All windows of a mentor on a weekday, oldest first. Overlaps are
    /// returned as stored.
    fn find_windows(
        &self,
        mentor_id: Uuid,
        day_of_week: DayOfWeek,
    ) -> impl Future<Output = MentoraResult<Vec<AvailabilityWindow>>> + Send;
    fn list_by_mentor(
        &self,
        mentor_id: Uuid,
    ) -> impl Future<Output = MentoraResult<Vec<AvailabilityWindow>>> + Send;
    /// Replace bounds and slots of a window in one write.
    fn update_window(
        &self,
        id: Uuid,
        input: UpdateAvailabilityWindow,
    ) -> impl Future<Output = MentoraResult<AvailabilityWindow>> + Send;
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

pub trait SessionRepository: Send + Sync {
    /// Insert a `Requested` session unless a live session already holds
    /// the same mentor, date and slot, in which case
    /// [`MentoraError::Conflict`](crate::error::MentoraError::Conflict)
    /// is returned.
    fn insert_if_vacant(
        &self,
        input: CreateSession,
    ) -> impl Future<Output = MentoraResult<Session>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = MentoraResult<Session>> + Send;
    /// Sessions of a mentor starting within `[from, to]`, any status.
    fn find_by_mentor_and_range(
        &self,
        mentor_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl Future<Output = MentoraResult<Vec<Session>>> + Send;
    /// Sessions in which `user_id` takes part as `role`.
    fn find_by_participant(
        &self,
        user_id: Uuid,
        role: UserRole,
    ) -> impl Future<Output = MentoraResult<Vec<Session>>> + Send;
    fn update_status(
        &self,
        id: Uuid,
        status: SessionStatus,
    ) -> impl Future<Output = MentoraResult<Session>> + Send;
    /// Like [`update_status`](Self::update_status), but the write only
    /// applies while the session is still in `expected`. Returns
    /// `Ok(None)` when another writer changed the status first.
    fn update_status_if(
        &self,
        id: Uuid,
        expected: SessionStatus,
        status: SessionStatus,
    ) -> impl Future<Output = MentoraResult<Option<Session>>> + Send;
}

// ---------------------------------------------------------------------------
// External collaborators
// ---------------------------------------------------------------------------

/// Read access to user management.
pub trait UserDirectory: Send + Sync {
    fn exists_with_role(
        &self,
        id: Uuid,
        role: UserRole,
    ) -> impl Future<Output = MentoraResult<bool>> + Send;
    fn get(&self, id: Uuid) -> impl Future<Output = MentoraResult<UserSummary>> + Send;
    /// Users holding `role`, newest first.
    fn list_by_role(
        &self,
        role: UserRole,
    ) -> impl Future<Output = MentoraResult<Vec<UserSummary>>> + Send;
}

pub trait ReviewRepository: Send + Sync {
    /// At most one review per session; a second one is a `Conflict`.
    fn create(&self, input: CreateReview) -> impl Future<Output = MentoraResult<Review>> + Send;
    fn get_by_session(
        &self,
        session_id: Uuid,
    ) -> impl Future<Output = MentoraResult<Review>> + Send;
    fn list_by_mentor(
        &self,
        mentor_id: Uuid,
    ) -> impl Future<Output = MentoraResult<Vec<Review>>> + Send;
}
