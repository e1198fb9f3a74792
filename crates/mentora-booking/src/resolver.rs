//! Free-slot resolution: weekly template minus live bookings.

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;
use mentora_core::calendar::{civil_day_of_week, end_of_day, start_of_day};
use mentora_core::error::MentoraResult;
use mentora_core::repository::{AvailabilityRepository, SessionRepository};
use mentora_core::slot::SlotLabel;
use tracing::debug;
use uuid::Uuid;

/// Outcome of resolving a mentor's availability for one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    /// The mentor has no weekly window on that weekday, or none that
    /// holds a whole slot.
    NoWindow,
    /// Free slots in chronological order. Empty means fully booked.
    Slots(Vec<SlotLabel>),
}

impl Availability {
    pub fn into_slots(self) -> Vec<SlotLabel> {
        match self {
            Availability::NoWindow => Vec::new(),
            Availability::Slots(slots) => slots,
        }
    }
}

/// Computes the free slots of a mentor on a date.
///
/// All windows that match the weekday contribute; their slots are
/// merged into one de-duplicated chronological sequence before booked
/// slots are removed.
#[derive(Clone)]
pub struct AvailabilityResolver<A: AvailabilityRepository, S: SessionRepository> {
    availability: A,
    sessions: S,
}

impl<A: AvailabilityRepository, S: SessionRepository> AvailabilityResolver<A, S> {
    pub fn new(availability: A, sessions: S) -> Self {
        Self {
            availability,
            sessions,
        }
    }

    /// Free slots of `mentor_id` on `date`. A mentor without a window
    /// that weekday yields an empty list; use [`check`](Self::check) to
    /// tell that apart from a fully booked day.
    pub async fn resolve(&self, mentor_id: Uuid, date: NaiveDate) -> MentoraResult<Vec<SlotLabel>> {
        Ok(self.check(mentor_id, date).await?.into_slots())
    }

    pub async fn check(&self, mentor_id: Uuid, date: NaiveDate) -> MentoraResult<Availability> {
        let day_of_week = civil_day_of_week(date);
        let windows = self
            .availability
            .find_windows(mentor_id, day_of_week)
            .await?;

        let template: BTreeSet<SlotLabel> = windows
            .iter()
            .flat_map(|window| window.slots.iter().copied())
            .collect();

        // A window too short to hold a slot offers nothing to book.
        if template.is_empty() {
            debug!(%mentor_id, %date, %day_of_week, "No availability window for weekday");
            return Ok(Availability::NoWindow);
        }

        let booked: HashSet<SlotLabel> = self
            .sessions
            .find_by_mentor_and_range(mentor_id, start_of_day(date), end_of_day(date))
            .await?
            .into_iter()
            .filter(|session| session.status.occupies_slot())
            .map(|session| session.slot)
            .collect();

        let free: Vec<SlotLabel> = template
            .into_iter()
            .filter(|slot| !booked.contains(slot))
            .collect();

        debug!(
            %mentor_id,
            %date,
            windows = windows.len(),
            booked = booked.len(),
            free = free.len(),
            "Resolved availability"
        );
        Ok(Availability::Slots(free))
    }
}
