//! Integration tests for session lifecycle and reviews.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use mentora_booking::config::BookingConfig;
use mentora_booking::service::{BookSession, BookingService};
use mentora_booking::sessions::SessionService;
use mentora_core::calendar::DayOfWeek;
use mentora_core::error::{ErrorKind, MentoraError};
use mentora_core::models::availability::CreateAvailabilityWindow;
use mentora_core::models::review::CreateReview;
use mentora_core::models::session::{Session, SessionStatus};
use mentora_core::models::user::{CreateUser, UserRole};
use mentora_core::repository::{AvailabilityRepository, ReviewRepository};
use mentora_db::repository::{
    SurrealAvailabilityRepository, SurrealReviewRepository, SurrealSessionRepository,
    SurrealUserDirectory,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

struct Fixture {
    booking: BookingService<
        SurrealUserDirectory<Db>,
        SurrealAvailabilityRepository<Db>,
        SurrealSessionRepository<Db>,
    >,
    sessions: SessionService<SurrealSessionRepository<Db>, SurrealReviewRepository<Db>>,
    reviews: SurrealReviewRepository<Db>,
    mentor_id: Uuid,
    mentee_id: Uuid,
    other_mentee_id: Uuid,
}

async fn setup(config: BookingConfig) -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    mentora_db::run_migrations(&db).await.unwrap();

    let users = SurrealUserDirectory::new(db.clone());
    let mut ids = Vec::new();
    for (name, role) in [
        ("ada", UserRole::Mentor),
        ("bob", UserRole::Mentee),
        ("cyd", UserRole::Mentee),
    ] {
        let user = users
            .create(CreateUser {
                name: name.into(),
                email: format!("{name}@example.com"),
                role,
            })
            .await
            .unwrap();
        ids.push(user.id);
    }

    let availability = SurrealAvailabilityRepository::new(db.clone());
    availability
        .create(CreateAvailabilityWindow {
            mentor_id: ids[0],
            day_of_week: DayOfWeek::MONDAY,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
        })
        .await
        .unwrap();

    let session_repo = SurrealSessionRepository::new(db.clone());
    let reviews = SurrealReviewRepository::new(db);

    Fixture {
        booking: BookingService::new(users, availability, session_repo.clone()),
        sessions: SessionService::new(session_repo, reviews.clone(), config),
        reviews,
        mentor_id: ids[0],
        mentee_id: ids[1],
        other_mentee_id: ids[2],
    }
}

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
}

async fn book(fx: &Fixture, mentee_id: Uuid, at: &str) -> Session {
    fx.booking
        .book(BookSession {
            mentor_id: fx.mentor_id,
            mentee_id,
            date: monday(),
            slot: at.parse().unwrap(),
            note: None,
        })
        .await
        .unwrap()
}

fn strict() -> BookingConfig {
    BookingConfig {
        enforce_transitions: true,
        ..BookingConfig::default()
    }
}

fn review(fx: &Fixture, session: &Session, score: u8) -> CreateReview {
    CreateReview {
        session_id: session.id,
        mentor_id: fx.mentor_id,
        mentee_id: fx.mentee_id,
        score,
        remark: Some("very helpful".into()),
    }
}

// -----------------------------------------------------------------------
// Status transitions
// -----------------------------------------------------------------------

#[tokio::test]
async fn confirm_then_complete() {
    let fx = setup(strict()).await;
    let session = book(&fx, fx.mentee_id, "09:00").await;

    let confirmed = fx
        .sessions
        .update_status(session.id, SessionStatus::Confirmed)
        .await
        .unwrap();
    assert_eq!(confirmed.status, SessionStatus::Confirmed);

    let completed = fx
        .sessions
        .update_status(session.id, SessionStatus::Completed)
        .await
        .unwrap();
    assert_eq!(completed.status, SessionStatus::Completed);
}

#[tokio::test]
async fn strict_config_rejects_illegal_transition() {
    let fx = setup(strict()).await;
    let session = book(&fx, fx.mentee_id, "09:00").await;

    let err = fx
        .sessions
        .update_status(session.id, SessionStatus::Completed)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn strict_concurrent_transitions_apply_once() {
    let fx = Arc::new(setup(strict()).await);
    let session = book(&fx, fx.mentee_id, "09:00").await;
    fx.sessions
        .update_status(session.id, SessionStatus::Confirmed)
        .await
        .unwrap();

    let id = session.id;
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let fx = Arc::clone(&fx);
            tokio::spawn(async move {
                fx.sessions
                    .update_status(id, SessionStatus::Completed)
                    .await
            })
        })
        .collect();

    let mut completed = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(updated) => {
                assert_eq!(updated.status, SessionStatus::Completed);
                completed += 1;
            }
            Err(err) => {
                assert_eq!(err.kind(), ErrorKind::Validation, "got {err:?}");
                rejected += 1;
            }
        }
    }

    assert_eq!(completed, 1);
    assert_eq!(rejected, 7);
}

#[tokio::test]
async fn permissive_config_allows_any_transition() {
    let fx = setup(BookingConfig::default()).await;
    let session = book(&fx, fx.mentee_id, "09:00").await;

    let completed = fx
        .sessions
        .update_status(session.id, SessionStatus::Completed)
        .await
        .unwrap();
    assert_eq!(completed.status, SessionStatus::Completed);

    let requested = fx
        .sessions
        .update_status(session.id, SessionStatus::Requested)
        .await
        .unwrap();
    assert_eq!(requested.status, SessionStatus::Requested);
}

#[tokio::test]
async fn cancel_frees_slot_and_revival_can_lose_it() {
    let fx = setup(BookingConfig::default()).await;
    let first = book(&fx, fx.mentee_id, "09:00").await;

    fx.sessions
        .update_status(first.id, SessionStatus::Cancelled)
        .await
        .unwrap();
    let free = fx.booking.available_slots(fx.mentor_id, monday()).await.unwrap();
    assert!(free.contains(&"09:00".parse().unwrap()));

    book(&fx, fx.other_mentee_id, "09:00").await;

    let err = fx
        .sessions
        .update_status(first.id, SessionStatus::Requested)
        .await
        .unwrap_err();
    assert!(matches!(err, MentoraError::SlotTaken { .. }), "got {err:?}");
}

#[tokio::test]
async fn update_unknown_session_is_not_found() {
    let fx = setup(BookingConfig::default()).await;

    let err = fx
        .sessions
        .update_status(Uuid::new_v4(), SessionStatus::Confirmed)
        .await
        .unwrap_err();
    assert!(matches!(err, MentoraError::NotFound { .. }));
}

// -----------------------------------------------------------------------
// Participant views
// -----------------------------------------------------------------------

#[tokio::test]
async fn sessions_are_listed_per_participant_role() {
    let fx = setup(BookingConfig::default()).await;
    book(&fx, fx.mentee_id, "09:00").await;
    book(&fx, fx.mentee_id, "09:30").await;
    book(&fx, fx.other_mentee_id, "10:00").await;

    let as_mentor = fx
        .sessions
        .list_sessions(fx.mentor_id, UserRole::Mentor)
        .await
        .unwrap();
    assert_eq!(as_mentor.len(), 3);

    let as_mentee = fx
        .sessions
        .list_sessions(fx.mentee_id, UserRole::Mentee)
        .await
        .unwrap();
    assert_eq!(as_mentee.len(), 2);
    assert!(as_mentee.iter().all(|s| s.mentee_id == fx.mentee_id));

    let wrong_role = fx
        .sessions
        .list_sessions(fx.mentee_id, UserRole::Mentor)
        .await
        .unwrap();
    assert!(wrong_role.is_empty());
}

#[tokio::test]
async fn get_session_is_limited_to_participants() {
    let fx = setup(BookingConfig::default()).await;
    let session = book(&fx, fx.mentee_id, "09:00").await;

    let seen = fx
        .sessions
        .get_session(fx.mentee_id, UserRole::Mentee, session.id)
        .await
        .unwrap();
    assert_eq!(seen.id, session.id);

    fx.sessions
        .get_session(fx.mentor_id, UserRole::Mentor, session.id)
        .await
        .unwrap();

    let err = fx
        .sessions
        .get_session(fx.other_mentee_id, UserRole::Mentee, session.id)
        .await
        .unwrap_err();
    assert!(matches!(err, MentoraError::NotFound { .. }));
}

// -----------------------------------------------------------------------
// Reviews
// -----------------------------------------------------------------------

#[tokio::test]
async fn mentee_reviews_session_once() {
    let fx = setup(BookingConfig::default()).await;
    let session = book(&fx, fx.mentee_id, "09:00").await;

    let created = fx.sessions.review_session(review(&fx, &session, 5)).await.unwrap();
    assert_eq!(created.score, 5);
    assert_eq!(created.session_id, session.id);

    let stored = fx.reviews.get_by_session(session.id).await.unwrap();
    assert_eq!(stored.id, created.id);

    let err = fx
        .sessions
        .review_session(review(&fx, &session, 4))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn review_score_must_be_in_range() {
    let fx = setup(BookingConfig::default()).await;
    let session = book(&fx, fx.mentee_id, "09:00").await;

    for score in [0, 6] {
        let err = fx
            .sessions
            .review_session(review(&fx, &session, score))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}

#[tokio::test]
async fn review_by_non_participant_is_not_found() {
    let fx = setup(BookingConfig::default()).await;
    let session = book(&fx, fx.mentee_id, "09:00").await;

    let mut input = review(&fx, &session, 3);
    input.mentee_id = fx.other_mentee_id;
    let err = fx.sessions.review_session(input).await.unwrap_err();
    assert!(matches!(err, MentoraError::NotFound { .. }));

    let mut input = review(&fx, &session, 3);
    input.session_id = Uuid::new_v4();
    let err = fx.sessions.review_session(input).await.unwrap_err();
    assert!(matches!(err, MentoraError::NotFound { .. }));
}
