//! SurrealDB implementation of [`UserDirectory`].
//!
//! Accounts are owned by user management. This table mirrors the
//! fields the booking engine needs for role checks and listings.

use chrono::{DateTime, Utc};
use mentora_core::error::MentoraResult;
use mentora_core::models::user::{CreateUser, UserRole, UserSummary};
use mentora_core::repository::UserDirectory;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::{DbError, classify_write_error};

#[derive(Debug, SurrealValue)]
struct UserRow {
    name: String,
    email: String,
    role: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    name: String,
    email: String,
    role: String,
    created_at: DateTime<Utc>,
}

fn parse_role(value: &str) -> Result<UserRole, DbError> {
    value
        .parse()
        .map_err(|_| DbError::InvalidRow(format!("unknown user role: {value}")))
}

impl UserRow {
    fn into_summary(self, id: Uuid) -> Result<UserSummary, DbError> {
        Ok(UserSummary {
            id,
            name: self.name,
            email: self.email,
            role: parse_role(&self.role)?,
            created_at: self.created_at,
        })
    }
}

impl UserRowWithId {
    fn try_into_summary(self) -> Result<UserSummary, DbError> {
        Ok(UserSummary {
            id: parse_uuid(&self.record_id, "user")?,
            name: self.name,
            email: self.email,
            role: parse_role(&self.role)?,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB-backed user directory.
#[derive(Clone)]
pub struct SurrealUserDirectory<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserDirectory<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Register a user. Emails are unique.
    pub async fn create(&self, input: CreateUser) -> MentoraResult<UserSummary> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let email_key = format!("email={}", input.email);

        let mut result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 name = $name, email = $email, role = $role",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("email", input.email))
            .bind(("role", input.role.as_str().to_string()))
            .await
            .and_then(|response| response.check())
            .map_err(|e| classify_write_error(e, &email_key))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_summary(id)?)
    }
}

impl<C: Connection> UserDirectory for SurrealUserDirectory<C> {
    async fn exists_with_role(&self, id: Uuid, role: UserRole) -> MentoraResult<bool> {
        match self.get(id).await {
            Ok(user) => Ok(user.role == role),
            Err(mentora_core::MentoraError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn get(&self, id: Uuid) -> MentoraResult<UserSummary> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_summary(id)?)
    }

    async fn list_by_role(&self, role: UserRole) -> MentoraResult<Vec<UserSummary>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE role = $role ORDER BY created_at DESC",
            )
            .bind(("role", role.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let users = rows
            .into_iter()
            .map(UserRowWithId::try_into_summary)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(users)
    }
}
