//! Slot arithmetic: fixed-width decomposition of a time-of-day window.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MentoraError, MentoraResult};

/// Slot width used when nothing else is configured.
pub const DEFAULT_SLOT_WIDTH_MINUTES: i64 = 30;

pub fn default_slot_width() -> Duration {
    Duration::minutes(DEFAULT_SLOT_WIDTH_MINUTES)
}

/// Start of a bookable slot, rendered as `HH:MM` on a 24-hour clock.
///
/// Labels order chronologically. Sessions refer to slots by label
/// value, so two labels for the same minute are the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotLabel(NaiveTime);

impl SlotLabel {
    /// Truncates seconds so that `09:00:30` and `09:00` compare equal.
    pub fn new(time: NaiveTime) -> Self {
        Self(time.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(time))
    }

    pub fn time(self) -> NaiveTime {
        self.0
    }

    /// Instant this slot starts on the given civil date.
    pub fn starts_on(self, date: NaiveDate) -> DateTime<Utc> {
        date.and_time(self.0).and_utc()
    }
}

impl fmt::Display for SlotLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl FromStr for SlotLabel {
    type Err = MentoraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_time_of_day(s).map(SlotLabel::new)
    }
}

impl TryFrom<String> for SlotLabel {
    type Error = MentoraError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SlotLabel> for String {
    fn from(label: SlotLabel) -> Self {
        label.to_string()
    }
}

/// Parse `HH:MM` or `HH:MM:SS` (24-hour clock).
pub fn parse_time_of_day(s: &str) -> MentoraResult<NaiveTime> {
    let trimmed = s.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| MentoraError::validation(format!("invalid time of day '{s}', expected HH:MM")))
}

/// Render a time of day the way slot labels are rendered.
pub fn format_time_of_day(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Decompose `[start, end)` into slots of `width`.
///
/// A trailing interval shorter than `width` is dropped. Fails with
/// `InvalidRange` when `end <= start` or when `width` is not at least
/// one second.
pub fn generate_slots(
    start: NaiveTime,
    end: NaiveTime,
    width: Duration,
) -> MentoraResult<Vec<SlotLabel>> {
    if end <= start || width.num_seconds() <= 0 {
        return Err(MentoraError::InvalidRange {
            start: format_time_of_day(start),
            end: format_time_of_day(end),
        });
    }

    let span = (end - start).num_seconds();
    let step = width.num_seconds();
    let count = span / step;

    Ok((0..count)
        .map(|i| SlotLabel::new(start + Duration::seconds(i * step)))
        .collect())
}
