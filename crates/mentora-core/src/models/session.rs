//! Mentorship session domain model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::MentoraError;
use crate::slot::SlotLabel;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Requested,
    Confirmed,
    Cancelled,
    Completed,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Requested => "requested",
            SessionStatus::Confirmed => "confirmed",
            SessionStatus::Cancelled => "cancelled",
            SessionStatus::Completed => "completed",
        }
    }

    /// Whether a session in this status holds its slot.
    pub fn occupies_slot(self) -> bool {
        !matches!(self, SessionStatus::Cancelled)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Cancelled | SessionStatus::Completed)
    }

    /// `requested -> confirmed | cancelled`,
    /// `confirmed -> completed | cancelled`.
    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        matches!(
            (self, next),
            (SessionStatus::Requested, SessionStatus::Confirmed)
                | (SessionStatus::Requested, SessionStatus::Cancelled)
                | (SessionStatus::Confirmed, SessionStatus::Completed)
                | (SessionStatus::Confirmed, SessionStatus::Cancelled)
        )
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = MentoraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "requested" => Ok(SessionStatus::Requested),
            "confirmed" => Ok(SessionStatus::Confirmed),
            "cancelled" => Ok(SessionStatus::Cancelled),
            "completed" => Ok(SessionStatus::Completed),
            other => Err(MentoraError::validation(format!(
                "unknown session status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub mentee_id: Uuid,
    pub date: NaiveDate,
    pub slot: SlotLabel,
    pub status: SessionStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn starts_at(&self) -> DateTime<Utc> {
        self.slot.starts_on(self.date)
    }
}

/// Input for a new booking. Sessions are always stored as
/// [`SessionStatus::Requested`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSession {
    pub mentor_id: Uuid,
    pub mentee_id: Uuid,
    pub date: NaiveDate,
    pub slot: SlotLabel,
    pub note: Option<String>,
}

/// Key under which a live session occupies its slot.
pub fn booking_key(mentor_id: Uuid, date: NaiveDate, slot: SlotLabel) -> String {
    format!("{mentor_id}/{date}/{slot}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [SessionStatus; 4] = [
        SessionStatus::Requested,
        SessionStatus::Confirmed,
        SessionStatus::Cancelled,
        SessionStatus::Completed,
    ];

    #[test]
    fn terminal_states_have_no_successors() {
        for from in ALL.into_iter().filter(|s| s.is_terminal()) {
            assert!(ALL.iter().all(|to| !from.can_transition_to(*to)));
        }
    }

    #[test]
    fn allowed_transitions() {
        use SessionStatus::*;
        assert!(Requested.can_transition_to(Confirmed));
        assert!(Requested.can_transition_to(Cancelled));
        assert!(!Requested.can_transition_to(Completed));
        assert!(Confirmed.can_transition_to(Completed));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(!Confirmed.can_transition_to(Requested));
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in ALL {
            assert_eq!(status.as_str().parse::<SessionStatus>().unwrap(), status);
        }
        assert!("pending".parse::<SessionStatus>().is_err());
    }

    #[test]
    fn only_cancelled_releases_slot() {
        assert!(SessionStatus::Requested.occupies_slot());
        assert!(SessionStatus::Completed.occupies_slot());
        assert!(!SessionStatus::Cancelled.occupies_slot());
    }

    #[test]
    fn booking_key_is_stable() {
        let mentor = Uuid::nil();
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let slot: SlotLabel = "09:00".parse().unwrap();
        assert_eq!(
            booking_key(mentor, date, slot),
            "00000000-0000-0000-0000-000000000000/2024-03-04/09:00"
        );
    }
}
