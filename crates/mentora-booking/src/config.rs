//! Booking engine configuration.

use chrono::Duration;
use serde::Deserialize;
use thiserror::Error;

use mentora_core::slot::DEFAULT_SLOT_WIDTH_MINUTES;

const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookingConfigError {
    #[error("slot_width_minutes must be greater than zero")]
    ZeroSlotWidth,

    #[error("slot_width_minutes must divide a day evenly, got {0}")]
    UnevenSlotWidth(u32),
}

/// Configuration for the booking services.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    /// Width of every bookable slot in minutes (default: 30).
    pub slot_width_minutes: u32,
    /// Reject status changes outside the session state machine
    /// (default: false, any status may follow any other).
    pub enforce_transitions: bool,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            slot_width_minutes: DEFAULT_SLOT_WIDTH_MINUTES as u32,
            enforce_transitions: false,
        }
    }
}

impl BookingConfig {
    pub fn slot_width(&self) -> Duration {
        Duration::minutes(i64::from(self.slot_width_minutes))
    }

    /// The width must be non-zero and divide a day evenly.
    pub fn validate(&self) -> Result<(), BookingConfigError> {
        match self.slot_width_minutes {
            0 => Err(BookingConfigError::ZeroSlotWidth),
            width if MINUTES_PER_DAY % width != 0 => {
                Err(BookingConfigError::UnevenSlotWidth(width))
            }
            _ => Ok(()),
        }
    }
}
