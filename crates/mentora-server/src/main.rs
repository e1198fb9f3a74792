//! Mentora server: application entry point.

mod config;

use mentora_booking::{BookingService, ScheduleService, SessionService};
use mentora_db::repository::{
    SurrealAvailabilityRepository, SurrealReviewRepository, SurrealSessionRepository,
    SurrealUserDirectory,
};
use mentora_db::{DbManager, run_migrations};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("mentora=info".parse()?))
        .json()
        .init();

    tracing::info!("Starting Mentora server...");

    let config = AppConfig::load()?;

    let manager = DbManager::connect(&config.db).await?;
    let db = manager.client().clone();
    run_migrations(&db).await?;

    let users = SurrealUserDirectory::new(db.clone());
    let availability =
        SurrealAvailabilityRepository::with_slot_width(db.clone(), config.booking.slot_width());
    let sessions = SurrealSessionRepository::new(db.clone());
    let reviews = SurrealReviewRepository::new(db);

    let schedule = ScheduleService::new(users.clone(), availability.clone());
    let _booking = BookingService::new(users, availability, sessions.clone());
    let _lifecycle = SessionService::new(sessions, reviews, config.booking.clone());

    let mentors = schedule.list_mentors().await?;
    tracing::info!(
        mentors = mentors.len(),
        slot_width_minutes = config.booking.slot_width_minutes,
        enforce_transitions = config.booking.enforce_transitions,
        "Booking engine ready"
    );

    tokio::signal::ctrl_c().await?;

    tracing::info!("Mentora server stopped.");
    Ok(())
}
