//! Recurring weekly availability.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::DayOfWeek;
use crate::slot::SlotLabel;

/// A weekly window in which a mentor accepts sessions.
///
/// `slots` is the fixed-width decomposition of
/// `[start_time, end_time)` and is always rewritten together with the
/// bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub slots: Vec<SlotLabel>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAvailabilityWindow {
    pub mentor_id: Uuid,
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAvailabilityWindow {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}
