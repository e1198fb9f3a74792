//! Integration tests for the availability window repository.

use chrono::{Duration, NaiveTime};
use mentora_core::calendar::DayOfWeek;
use mentora_core::error::MentoraError;
use mentora_core::models::availability::{CreateAvailabilityWindow, UpdateAvailabilityWindow};
use mentora_core::repository::AvailabilityRepository;
use mentora_db::repository::SurrealAvailabilityRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    mentora_db::run_migrations(&db).await.unwrap();
    db
}

fn t(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").unwrap()
}

fn labels(slots: &[mentora_core::SlotLabel]) -> Vec<String> {
    slots.iter().map(ToString::to_string).collect()
}

fn window(mentor_id: Uuid, day: DayOfWeek, start: &str, end: &str) -> CreateAvailabilityWindow {
    CreateAvailabilityWindow {
        mentor_id,
        day_of_week: day,
        start_time: t(start),
        end_time: t(end),
    }
}

#[tokio::test]
async fn create_derives_slots_and_round_trips() {
    let repo = SurrealAvailabilityRepository::new(setup().await);
    let mentor_id = Uuid::new_v4();

    let created = repo
        .create(window(mentor_id, DayOfWeek::MONDAY, "09:00", "10:00"))
        .await
        .unwrap();

    assert_eq!(created.mentor_id, mentor_id);
    assert_eq!(created.day_of_week, DayOfWeek::MONDAY);
    assert_eq!(labels(&created.slots), vec!["09:00", "09:30"]);

    let fetched = repo.get_by_id(created.id).await.unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.start_time, t("09:00"));
    assert_eq!(fetched.end_time, t("10:00"));
    assert_eq!(fetched.slots, created.slots);
}

#[tokio::test]
async fn create_rejects_inverted_range() {
    let repo = SurrealAvailabilityRepository::new(setup().await);

    let err = repo
        .create(window(Uuid::new_v4(), DayOfWeek::MONDAY, "10:00", "09:00"))
        .await
        .unwrap_err();

    assert!(matches!(err, MentoraError::InvalidRange { .. }));
}

#[tokio::test]
async fn window_shorter_than_one_slot_is_rejected() {
    let repo = SurrealAvailabilityRepository::new(setup().await);
    let mentor_id = Uuid::new_v4();

    let err = repo
        .create(window(mentor_id, DayOfWeek::MONDAY, "09:00", "09:20"))
        .await
        .unwrap_err();
    assert!(matches!(err, MentoraError::InvalidRange { .. }), "got {err:?}");
    assert!(repo.list_by_mentor(mentor_id).await.unwrap().is_empty());

    let created = repo
        .create(window(mentor_id, DayOfWeek::MONDAY, "09:00", "10:00"))
        .await
        .unwrap();
    let err = repo
        .update_window(
            created.id,
            UpdateAvailabilityWindow {
                start_time: t("09:00"),
                end_time: t("09:20"),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MentoraError::InvalidRange { .. }));

    let fetched = repo.get_by_id(created.id).await.unwrap();
    assert_eq!(labels(&fetched.slots), vec!["09:00", "09:30"]);
}

#[tokio::test]
async fn custom_slot_width_is_applied() {
    let repo =
        SurrealAvailabilityRepository::with_slot_width(setup().await, Duration::minutes(45));

    let created = repo
        .create(window(Uuid::new_v4(), DayOfWeek::FRIDAY, "08:00", "10:00"))
        .await
        .unwrap();

    assert_eq!(labels(&created.slots), vec!["08:00", "08:45"]);
}

#[tokio::test]
async fn find_windows_filters_by_mentor_and_day() {
    let repo = SurrealAvailabilityRepository::new(setup().await);
    let mentor_id = Uuid::new_v4();
    let other_mentor = Uuid::new_v4();

    let first = repo
        .create(window(mentor_id, DayOfWeek::TUESDAY, "09:00", "10:00"))
        .await
        .unwrap();
    let second = repo
        .create(window(mentor_id, DayOfWeek::TUESDAY, "09:30", "11:00"))
        .await
        .unwrap();
    repo.create(window(mentor_id, DayOfWeek::WEDNESDAY, "09:00", "10:00"))
        .await
        .unwrap();
    repo.create(window(other_mentor, DayOfWeek::TUESDAY, "09:00", "10:00"))
        .await
        .unwrap();

    let found = repo
        .find_windows(mentor_id, DayOfWeek::TUESDAY)
        .await
        .unwrap();
    let ids: Vec<Uuid> = found.iter().map(|w| w.id).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&first.id));
    assert!(ids.contains(&second.id));

    let none = repo
        .find_windows(mentor_id, DayOfWeek::SUNDAY)
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn list_by_mentor_orders_by_day_then_start() {
    let repo = SurrealAvailabilityRepository::new(setup().await);
    let mentor_id = Uuid::new_v4();

    repo.create(window(mentor_id, DayOfWeek::THURSDAY, "14:00", "15:00"))
        .await
        .unwrap();
    repo.create(window(mentor_id, DayOfWeek::MONDAY, "13:00", "14:00"))
        .await
        .unwrap();
    repo.create(window(mentor_id, DayOfWeek::MONDAY, "08:00", "09:00"))
        .await
        .unwrap();

    let schedule = repo.list_by_mentor(mentor_id).await.unwrap();
    let keys: Vec<(u8, NaiveTime)> = schedule
        .iter()
        .map(|w| (w.day_of_week.value(), w.start_time))
        .collect();
    assert_eq!(
        keys,
        vec![(1, t("08:00")), (1, t("13:00")), (4, t("14:00"))]
    );
}

#[tokio::test]
async fn update_window_replaces_bounds_and_slots_together() {
    let repo = SurrealAvailabilityRepository::new(setup().await);
    let created = repo
        .create(window(Uuid::new_v4(), DayOfWeek::MONDAY, "09:00", "10:00"))
        .await
        .unwrap();

    let updated = repo
        .update_window(
            created.id,
            UpdateAvailabilityWindow {
                start_time: t("13:00"),
                end_time: t("14:30"),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.mentor_id, created.mentor_id);
    assert_eq!(updated.start_time, t("13:00"));
    assert_eq!(updated.end_time, t("14:30"));
    assert_eq!(labels(&updated.slots), vec!["13:00", "13:30", "14:00"]);

    let fetched = repo.get_by_id(created.id).await.unwrap();
    assert_eq!(fetched.slots, updated.slots);
}

#[tokio::test]
async fn update_window_rejects_bad_range_without_writing() {
    let repo = SurrealAvailabilityRepository::new(setup().await);
    let created = repo
        .create(window(Uuid::new_v4(), DayOfWeek::MONDAY, "09:00", "10:00"))
        .await
        .unwrap();

    let err = repo
        .update_window(
            created.id,
            UpdateAvailabilityWindow {
                start_time: t("12:00"),
                end_time: t("11:00"),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MentoraError::InvalidRange { .. }));

    let fetched = repo.get_by_id(created.id).await.unwrap();
    assert_eq!(fetched.start_time, t("09:00"));
    assert_eq!(fetched.slots, created.slots);
}

#[tokio::test]
async fn unknown_window_is_not_found() {
    let repo = SurrealAvailabilityRepository::new(setup().await);

    let err = repo.get_by_id(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, MentoraError::NotFound { .. }));

    let err = repo
        .update_window(
            Uuid::new_v4(),
            UpdateAvailabilityWindow {
                start_time: t("09:00"),
                end_time: t("10:00"),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MentoraError::NotFound { .. }));
}
