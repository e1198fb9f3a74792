//! Mentora Booking: availability resolution, schedule management and
//! the booking/session lifecycle services.
//!
//! Services are generic over the `mentora-core` repository traits and
//! have no dependency on the database crate.

pub mod config;
pub mod error;
pub mod resolver;
pub mod schedule;
pub mod service;
pub mod sessions;

pub use config::{BookingConfig, BookingConfigError};
pub use error::BookingError;
pub use resolver::{Availability, AvailabilityResolver};
pub use schedule::ScheduleService;
pub use service::{BookSession, BookingService};
pub use sessions::SessionService;
