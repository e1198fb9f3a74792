//! Civil-calendar helpers.
//!
//! Every date-to-weekday and date-to-instant conversion in the engine
//! goes through this module. Dates are interpreted in a single calendar
//! whose instants are stored as UTC.

use std::fmt;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{MentoraError, MentoraResult};

/// Day of the week, `0 = Sunday` through `6 = Saturday`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DayOfWeek(u8);

impl DayOfWeek {
    pub const SUNDAY: DayOfWeek = DayOfWeek(0);
    pub const MONDAY: DayOfWeek = DayOfWeek(1);
    pub const TUESDAY: DayOfWeek = DayOfWeek(2);
    pub const WEDNESDAY: DayOfWeek = DayOfWeek(3);
    pub const THURSDAY: DayOfWeek = DayOfWeek(4);
    pub const FRIDAY: DayOfWeek = DayOfWeek(5);
    pub const SATURDAY: DayOfWeek = DayOfWeek(6);

    pub fn new(value: u8) -> MentoraResult<Self> {
        if value <= 6 {
            Ok(Self(value))
        } else {
            Err(MentoraError::validation(format!(
                "day of week must be between 0 and 6, got {value}"
            )))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        DayOfWeek(day.num_days_from_sunday() as u8)
    }
}

impl TryFrom<u8> for DayOfWeek {
    type Error = MentoraError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        DayOfWeek::new(value)
    }
}

impl From<DayOfWeek> for u8 {
    fn from(day: DayOfWeek) -> Self {
        day.0
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn civil_day_of_week(date: NaiveDate) -> DayOfWeek {
    date.weekday().into()
}

pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Last representable instant of `date` (inclusive upper bound).
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date) + Duration::days(1) - Duration::nanoseconds(1)
}
