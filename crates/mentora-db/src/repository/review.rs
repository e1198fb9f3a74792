//! SurrealDB implementation of [`ReviewRepository`].

use chrono::{DateTime, Utc};
use mentora_core::error::MentoraResult;
use mentora_core::models::review::{CreateReview, Review};
use mentora_core::repository::ReviewRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::{DbError, classify_write_error};

#[derive(Debug, SurrealValue)]
struct ReviewRow {
    session_id: String,
    mentor_id: String,
    mentee_id: String,
    score: u32,
    remark: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ReviewRowWithId {
    record_id: String,
    session_id: String,
    mentor_id: String,
    mentee_id: String,
    score: u32,
    remark: Option<String>,
    created_at: DateTime<Utc>,
}

impl ReviewRow {
    fn into_review(self, id: Uuid) -> Result<Review, DbError> {
        let score = u8::try_from(self.score)
            .map_err(|_| DbError::InvalidRow(format!("invalid review score: {}", self.score)))?;
        Ok(Review {
            id,
            session_id: parse_uuid(&self.session_id, "session")?,
            mentor_id: parse_uuid(&self.mentor_id, "mentor")?,
            mentee_id: parse_uuid(&self.mentee_id, "mentee")?,
            score,
            remark: self.remark,
            created_at: self.created_at,
        })
    }
}

impl ReviewRowWithId {
    fn try_into_review(self) -> Result<Review, DbError> {
        let id = parse_uuid(&self.record_id, "review")?;
        ReviewRow {
            session_id: self.session_id,
            mentor_id: self.mentor_id,
            mentee_id: self.mentee_id,
            score: self.score,
            remark: self.remark,
            created_at: self.created_at,
        }
        .into_review(id)
    }
}

/// SurrealDB implementation of the review store.
#[derive(Clone)]
pub struct SurrealReviewRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealReviewRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ReviewRepository for SurrealReviewRepository<C> {
    async fn create(&self, input: CreateReview) -> MentoraResult<Review> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let session_key = format!("review/{}", input.session_id);

        let mut result = self
            .db
            .query(
                "CREATE type::record('review', $id) SET \
                 session_id = $session_id, \
                 mentor_id = $mentor_id, \
                 mentee_id = $mentee_id, \
                 score = $score, \
                 remark = $remark",
            )
            .bind(("id", id_str.clone()))
            .bind(("session_id", input.session_id.to_string()))
            .bind(("mentor_id", input.mentor_id.to_string()))
            .bind(("mentee_id", input.mentee_id.to_string()))
            .bind(("score", u32::from(input.score)))
            .bind(("remark", input.remark))
            .await
            .and_then(|response| response.check())
            .map_err(|e| classify_write_error(e, &session_key))?;

        let rows: Vec<ReviewRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "review".into(),
            id: id_str,
        })?;

        Ok(row.into_review(id)?)
    }

    async fn get_by_session(&self, session_id: Uuid) -> MentoraResult<Review> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM review \
                 WHERE session_id = $session_id",
            )
            .bind(("session_id", session_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReviewRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "review".into(),
            id: format!("session={session_id}"),
        })?;

        Ok(row.try_into_review()?)
    }

    async fn list_by_mentor(&self, mentor_id: Uuid) -> MentoraResult<Vec<Review>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM review \
                 WHERE mentor_id = $mentor_id ORDER BY created_at DESC",
            )
            .bind(("mentor_id", mentor_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReviewRowWithId> = result.take(0).map_err(DbError::from)?;
        let reviews = rows
            .into_iter()
            .map(ReviewRowWithId::try_into_review)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(reviews)
    }
}
