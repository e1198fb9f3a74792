//! Domain models for Mentora.
//!
//! These are the core types shared across all crates.

pub mod availability;
pub mod review;
pub mod session;
pub mod user;
