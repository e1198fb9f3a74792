//! SurrealDB repository implementations.

mod availability;
mod review;
mod session;
mod user;

pub use availability::SurrealAvailabilityRepository;
pub use review::SurrealReviewRepository;
pub use session::SurrealSessionRepository;
pub use user::SurrealUserDirectory;

use mentora_core::slot::{SlotLabel, parse_time_of_day};
use uuid::Uuid;

use crate::error::DbError;

fn parse_uuid(value: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::InvalidRow(format!("invalid {what} UUID: {e}")))
}

fn parse_slot(value: &str) -> Result<SlotLabel, DbError> {
    value
        .parse()
        .map_err(|e| DbError::InvalidRow(format!("invalid slot '{value}': {e}")))
}

fn parse_time(value: &str) -> Result<chrono::NaiveTime, DbError> {
    parse_time_of_day(value)
        .map_err(|e| DbError::InvalidRow(format!("invalid time '{value}': {e}")))
}
