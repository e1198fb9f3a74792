//! SurrealDB implementation of [`SessionRepository`].
//!
//! Double-booking is prevented by the UNIQUE index on `booking_key`:
//! a `CREATE` for an occupied key fails inside the storage engine, so
//! concurrent inserts for one mentor, date and slot cannot both land.

use chrono::{DateTime, NaiveDate, Utc};
use mentora_core::error::MentoraResult;
use mentora_core::models::session::{CreateSession, Session, SessionStatus, booking_key};
use mentora_core::models::user::UserRole;
use mentora_core::repository::SessionRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{parse_slot, parse_uuid};
use crate::error::{DbError, classify_write_error, is_retryable};

/// Attempts for a write that keeps losing optimistic transaction
/// conflicts. Unique violations are never retried.
const MAX_WRITE_ATTEMPTS: u32 = 5;

#[derive(Debug, SurrealValue)]
struct SessionRow {
    mentor_id: String,
    mentee_id: String,
    session_date: String,
    slot: String,
    status: String,
    note: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct SessionRowWithId {
    record_id: String,
    mentor_id: String,
    mentee_id: String,
    session_date: String,
    slot: String,
    status: String,
    note: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_date(value: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| DbError::InvalidRow(format!("invalid session date '{value}': {e}")))
}

fn parse_status(value: &str) -> Result<SessionStatus, DbError> {
    value
        .parse()
        .map_err(|_| DbError::InvalidRow(format!("unknown session status: {value}")))
}

fn released_key(id: Uuid) -> String {
    format!("released/{id}")
}

impl SessionRow {
    fn into_session(self, id: Uuid) -> Result<Session, DbError> {
        Ok(Session {
            id,
            mentor_id: parse_uuid(&self.mentor_id, "mentor")?,
            mentee_id: parse_uuid(&self.mentee_id, "mentee")?,
            date: parse_date(&self.session_date)?,
            slot: parse_slot(&self.slot)?,
            status: parse_status(&self.status)?,
            note: self.note,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl SessionRowWithId {
    fn try_into_session(self) -> Result<Session, DbError> {
        let id = parse_uuid(&self.record_id, "session")?;
        SessionRow {
            mentor_id: self.mentor_id,
            mentee_id: self.mentee_id,
            session_date: self.session_date,
            slot: self.slot,
            status: self.status,
            note: self.note,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_session(id)
    }
}

/// SurrealDB implementation of the session store.
#[derive(Clone)]
pub struct SurrealSessionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSessionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Set the status and the matching booking key in one statement.
    /// With `expected`, the row is only written while it still holds
    /// that status; `None` is returned otherwise.
    async fn write_status(
        &self,
        id: Uuid,
        status: SessionStatus,
        expected: Option<SessionStatus>,
    ) -> MentoraResult<Option<Session>> {
        let current = self.get_by_id(id).await?;
        let key = if status.occupies_slot() {
            booking_key(current.mentor_id, current.date, current.slot)
        } else {
            released_key(id)
        };

        let query = if expected.is_some() {
            "UPDATE type::record('session', $id) SET \
             status = $status, \
             booking_key = $booking_key, \
             updated_at = time::now() \
             WHERE status = $expected"
        } else {
            "UPDATE type::record('session', $id) SET \
             status = $status, \
             booking_key = $booking_key, \
             updated_at = time::now()"
        };

        let mut attempt = 1;
        let mut response = loop {
            let mut builder = self
                .db
                .query(query)
                .bind(("id", id.to_string()))
                .bind(("status", status.as_str().to_string()))
                .bind(("booking_key", key.clone()));
            if let Some(expected) = expected {
                builder = builder.bind(("expected", expected.as_str().to_string()));
            }

            match builder.await.and_then(|response| response.check()) {
                Ok(response) => break response,
                Err(e) if is_retryable(&e) && attempt < MAX_WRITE_ATTEMPTS => {
                    warn!(
                        session_id = %id,
                        attempt,
                        error = %e,
                        "Session status write hit a transaction conflict, retrying"
                    );
                    attempt += 1;
                }
                Err(e) => return Err(classify_write_error(e, &key).into()),
            }
        };

        let rows: Vec<SessionRow> = response.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_session(id)?)),
            None => {
                debug!(session_id = %id, ?expected, "Session status precondition not met");
                Ok(None)
            }
        }
    }
}

fn rows_to_sessions(rows: Vec<SessionRowWithId>) -> Result<Vec<Session>, DbError> {
    rows.into_iter()
        .map(SessionRowWithId::try_into_session)
        .collect()
}

impl<C: Connection> SessionRepository for SurrealSessionRepository<C> {
    async fn insert_if_vacant(&self, input: CreateSession) -> MentoraResult<Session> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let key = booking_key(input.mentor_id, input.date, input.slot);
        let starts_at = input.slot.starts_on(input.date);

        let mut attempt = 1;
        let mut response = loop {
            let outcome = self
                .db
                .query(
                    "CREATE type::record('session', $id) SET \
                     mentor_id = $mentor_id, \
                     mentee_id = $mentee_id, \
                     session_date = $session_date, \
                     slot = $slot, \
                     starts_at = $starts_at, \
                     status = 'requested', \
                     note = $note, \
                     booking_key = $booking_key",
                )
                .bind(("id", id_str.clone()))
                .bind(("mentor_id", input.mentor_id.to_string()))
                .bind(("mentee_id", input.mentee_id.to_string()))
                .bind(("session_date", input.date.to_string()))
                .bind(("slot", input.slot.to_string()))
                .bind(("starts_at", starts_at))
                .bind(("note", input.note.clone()))
                .bind(("booking_key", key.clone()))
                .await
                .and_then(|response| response.check());

            match outcome {
                Ok(response) => break response,
                Err(e) if is_retryable(&e) && attempt < MAX_WRITE_ATTEMPTS => {
                    warn!(
                        booking_key = %key,
                        attempt,
                        error = %e,
                        "Session insert hit a transaction conflict, retrying"
                    );
                    attempt += 1;
                }
                Err(e) => return Err(classify_write_error(e, &key).into()),
            }
        };

        let rows: Vec<SessionRow> = response.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "session".into(),
            id: id_str,
        })?;

        debug!(session_id = %id, booking_key = %key, "Session inserted");
        Ok(row.into_session(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> MentoraResult<Session> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('session', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "session".into(),
            id: id_str,
        })?;

        Ok(row.into_session(id)?)
    }

    async fn find_by_mentor_and_range(
        &self,
        mentor_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> MentoraResult<Vec<Session>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM session \
                 WHERE mentor_id = $mentor_id \
                 AND starts_at >= $from AND starts_at <= $to \
                 ORDER BY starts_at ASC",
            )
            .bind(("mentor_id", mentor_id.to_string()))
            .bind(("from", from))
            .bind(("to", to))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SessionRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows_to_sessions(rows)?)
    }

    async fn find_by_participant(
        &self,
        user_id: Uuid,
        role: UserRole,
    ) -> MentoraResult<Vec<Session>> {
        let query = match role {
            UserRole::Mentor => {
                "SELECT meta::id(id) AS record_id, * FROM session \
                 WHERE mentor_id = $user_id ORDER BY starts_at ASC"
            }
            UserRole::Mentee => {
                "SELECT meta::id(id) AS record_id, * FROM session \
                 WHERE mentee_id = $user_id ORDER BY starts_at ASC"
            }
        };

        let mut result = self
            .db
            .query(query)
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SessionRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows_to_sessions(rows)?)
    }

    async fn update_status(&self, id: Uuid, status: SessionStatus) -> MentoraResult<Session> {
        self.write_status(id, status, None)
            .await?
            .ok_or_else(|| {
                DbError::NotFound {
                    entity: "session".into(),
                    id: id.to_string(),
                }
                .into()
            })
    }

    async fn update_status_if(
        &self,
        id: Uuid,
        expected: SessionStatus,
        status: SessionStatus,
    ) -> MentoraResult<Option<Session>> {
        self.write_status(id, status, Some(expected)).await
    }
}
