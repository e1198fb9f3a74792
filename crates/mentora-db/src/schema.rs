//! Schema definitions and migration runner for SurrealDB.
//!
//! All tables are SCHEMAFULL. UUIDs, civil dates and times of day are
//! stored as strings; enums are stored as lowercase strings guarded by
//! ASSERT constraints.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users (owned by user management; mirrored here for role checks)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD name ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['mentor', 'mentee'];
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;
DEFINE INDEX idx_user_role ON TABLE user COLUMNS role;

-- =======================================================================
-- Weekly availability windows
-- =======================================================================
DEFINE TABLE availability_window SCHEMAFULL;
DEFINE FIELD mentor_id ON TABLE availability_window TYPE string;
DEFINE FIELD day_of_week ON TABLE availability_window TYPE int \
    ASSERT $value >= 0 AND $value <= 6;
DEFINE FIELD start_time ON TABLE availability_window TYPE string;
DEFINE FIELD end_time ON TABLE availability_window TYPE string;
DEFINE FIELD slots ON TABLE availability_window TYPE array<string>;
DEFINE FIELD created_at ON TABLE availability_window TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE availability_window TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_window_mentor_day ON TABLE availability_window \
    COLUMNS mentor_id, day_of_week;

-- =======================================================================
-- Sessions
--
-- booking_key is `mentor/date/slot` while the session holds its slot
-- and `released/<id>` once cancelled, so the UNIQUE index only
-- constrains live sessions.
-- =======================================================================
DEFINE TABLE session SCHEMAFULL;
DEFINE FIELD mentor_id ON TABLE session TYPE string;
DEFINE FIELD mentee_id ON TABLE session TYPE string;
DEFINE FIELD session_date ON TABLE session TYPE string;
DEFINE FIELD slot ON TABLE session TYPE string;
DEFINE FIELD starts_at ON TABLE session TYPE datetime;
DEFINE FIELD status ON TABLE session TYPE string \
    ASSERT $value IN ['requested', 'confirmed', 'cancelled', \
    'completed'];
DEFINE FIELD note ON TABLE session TYPE option<string>;
DEFINE FIELD booking_key ON TABLE session TYPE string;
DEFINE FIELD created_at ON TABLE session TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE session TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_session_booking_key ON TABLE session \
    COLUMNS booking_key UNIQUE;
DEFINE INDEX idx_session_mentor_start ON TABLE session \
    COLUMNS mentor_id, starts_at;
DEFINE INDEX idx_session_mentee ON TABLE session COLUMNS mentee_id;

-- =======================================================================
-- Reviews
-- =======================================================================
DEFINE TABLE review SCHEMAFULL;
DEFINE FIELD session_id ON TABLE review TYPE string;
DEFINE FIELD mentor_id ON TABLE review TYPE string;
DEFINE FIELD mentee_id ON TABLE review TYPE string;
DEFINE FIELD score ON TABLE review TYPE int \
    ASSERT $value >= 1 AND $value <= 5;
DEFINE FIELD remark ON TABLE review TYPE option<string>;
DEFINE FIELD created_at ON TABLE review TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_review_session ON TABLE review \
    COLUMNS session_id UNIQUE;
DEFINE INDEX idx_review_mentor ON TABLE review COLUMNS mentor_id;
";

/// Run all pending migrations against the given database.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS.iter().filter(|m| m.version > current_version) {
        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "Migration v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

        info!(version = migration.version, "Migration applied");
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
