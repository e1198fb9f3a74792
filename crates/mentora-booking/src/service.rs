//! Booking service: validate a requested slot and commit the session.

use chrono::NaiveDate;
use mentora_core::error::{MentoraError, MentoraResult};
use mentora_core::models::session::{CreateSession, Session};
use mentora_core::models::user::UserRole;
use mentora_core::repository::{AvailabilityRepository, SessionRepository, UserDirectory};
use mentora_core::slot::SlotLabel;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::BookingError;
use crate::resolver::{Availability, AvailabilityResolver};

/// Input for a booking request.
#[derive(Debug, Clone, Deserialize)]
pub struct BookSession {
    pub mentor_id: Uuid,
    /// The requesting mentee.
    pub mentee_id: Uuid,
    pub date: NaiveDate,
    pub slot: SlotLabel,
    pub note: Option<String>,
}

/// Booking service.
///
/// The availability read and the insert are separate round trips. The
/// read gives callers a precise error; the session store's unique
/// insert is what actually rules out double-booking.
pub struct BookingService<U, A, S>
where
    U: UserDirectory,
    A: AvailabilityRepository,
    S: SessionRepository,
{
    users: U,
    resolver: AvailabilityResolver<A, S>,
    sessions: S,
}

impl<U, A, S> BookingService<U, A, S>
where
    U: UserDirectory,
    A: AvailabilityRepository,
    S: SessionRepository + Clone,
{
    pub fn new(users: U, availability: A, sessions: S) -> Self {
        Self {
            users,
            resolver: AvailabilityResolver::new(availability, sessions.clone()),
            sessions,
        }
    }

    pub fn resolver(&self) -> &AvailabilityResolver<A, S> {
        &self.resolver
    }

    /// Free slots of a mentor on a date.
    pub async fn available_slots(
        &self,
        mentor_id: Uuid,
        date: NaiveDate,
    ) -> MentoraResult<Vec<SlotLabel>> {
        self.resolver.resolve(mentor_id, date).await
    }

    /// Book `input.slot` for the mentee.
    pub async fn book(&self, input: BookSession) -> MentoraResult<Session> {
        // 1. Mentor must exist and hold the mentor role.
        if !self
            .users
            .exists_with_role(input.mentor_id, UserRole::Mentor)
            .await?
        {
            return Err(BookingError::MentorNotFound(input.mentor_id).into());
        }

        // 2. Weekday must be covered and not fully booked.
        let free = match self.resolver.check(input.mentor_id, input.date).await? {
            Availability::NoWindow => {
                return Err(MentoraError::NotAvailableThisDay {
                    mentor_id: input.mentor_id,
                    date: input.date,
                });
            }
            Availability::Slots(free) if free.is_empty() => {
                return Err(MentoraError::NoAvailability {
                    mentor_id: input.mentor_id,
                    date: input.date,
                });
            }
            Availability::Slots(free) => free,
        };

        // 3. Requested slot must be free.
        if !free.contains(&input.slot) {
            return Err(MentoraError::SlotTaken {
                date: input.date,
                slot: input.slot,
            });
        }

        // 4. Commit. A concurrent booking may have won since step 2.
        let session = self
            .sessions
            .insert_if_vacant(CreateSession {
                mentor_id: input.mentor_id,
                mentee_id: input.mentee_id,
                date: input.date,
                slot: input.slot,
                note: input.note,
            })
            .await
            .map_err(|e| match e {
                MentoraError::Conflict { key } => {
                    warn!(booking_key = %key, "Lost booking race");
                    MentoraError::SlotTaken {
                        date: input.date,
                        slot: input.slot,
                    }
                }
                other => other,
            })?;

        info!(
            session_id = %session.id,
            mentor_id = %session.mentor_id,
            mentee_id = %session.mentee_id,
            date = %session.date,
            slot = %session.slot,
            "Session booked"
        );
        Ok(session)
    }
}
