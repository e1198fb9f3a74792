//! Mentor schedule management.

use mentora_core::error::{MentoraError, MentoraResult};
use mentora_core::models::availability::{
    AvailabilityWindow, CreateAvailabilityWindow, UpdateAvailabilityWindow,
};
use mentora_core::models::user::{UserRole, UserSummary};
use mentora_core::repository::{AvailabilityRepository, UserDirectory};
use mentora_core::slot::format_time_of_day;
use tracing::info;
use uuid::Uuid;

use crate::error::BookingError;

fn ensure_range(start: chrono::NaiveTime, end: chrono::NaiveTime) -> MentoraResult<()> {
    if end <= start {
        return Err(MentoraError::InvalidRange {
            start: format_time_of_day(start),
            end: format_time_of_day(end),
        });
    }
    Ok(())
}

/// Creates, updates and lists weekly availability windows.
pub struct ScheduleService<U: UserDirectory, A: AvailabilityRepository> {
    users: U,
    availability: A,
}

impl<U: UserDirectory, A: AvailabilityRepository> ScheduleService<U, A> {
    pub fn new(users: U, availability: A) -> Self {
        Self {
            users,
            availability,
        }
    }

    async fn ensure_mentor(&self, mentor_id: Uuid) -> MentoraResult<()> {
        if self
            .users
            .exists_with_role(mentor_id, UserRole::Mentor)
            .await?
        {
            Ok(())
        } else {
            Err(BookingError::MentorNotFound(mentor_id).into())
        }
    }

    pub async fn create_schedule(
        &self,
        input: CreateAvailabilityWindow,
    ) -> MentoraResult<AvailabilityWindow> {
        ensure_range(input.start_time, input.end_time)?;
        self.ensure_mentor(input.mentor_id).await?;

        let window = self.availability.create(input).await?;
        info!(
            window_id = %window.id,
            mentor_id = %window.mentor_id,
            "Mentor schedule created"
        );
        Ok(window)
    }

    pub async fn update_schedule(
        &self,
        window_id: Uuid,
        input: UpdateAvailabilityWindow,
    ) -> MentoraResult<AvailabilityWindow> {
        ensure_range(input.start_time, input.end_time)?;
        self.availability.update_window(window_id, input).await
    }

    pub async fn mentor_schedule(&self, mentor_id: Uuid) -> MentoraResult<Vec<AvailabilityWindow>> {
        self.availability.list_by_mentor(mentor_id).await
    }

    pub async fn list_mentors(&self) -> MentoraResult<Vec<UserSummary>> {
        self.users.list_by_role(UserRole::Mentor).await
    }

    /// `NotFound` unless the user exists and is a mentor.
    pub async fn get_mentor(&self, mentor_id: Uuid) -> MentoraResult<UserSummary> {
        let user = self.users.get(mentor_id).await.map_err(|e| match e {
            MentoraError::NotFound { .. } => BookingError::MentorNotFound(mentor_id).into(),
            other => other,
        })?;
        if user.role != UserRole::Mentor {
            return Err(BookingError::MentorNotFound(mentor_id).into());
        }
        Ok(user)
    }
}
