//! Mentora Core: domain models, repository contracts and the pure
//! slot/calendar arithmetic shared by every other crate.

pub mod calendar;
pub mod error;
pub mod models;
pub mod repository;
pub mod slot;

pub use calendar::{DayOfWeek, civil_day_of_week, end_of_day, start_of_day};
pub use error::{ErrorKind, MentoraError, MentoraResult};
pub use slot::{SlotLabel, generate_slots};
