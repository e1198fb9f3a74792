//! SurrealDB connection management.

use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;

const EMBEDDED_SCHEME: &str = "mem://";

/// Where and as whom to connect.
///
/// `url` carries the engine scheme: `ws://host:port` for a server,
/// `mem://` for an embedded in-memory store (credentials are ignored).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8000".into(),
            namespace: "mentora".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

impl DbConfig {
    pub fn is_embedded(&self) -> bool {
        self.url.starts_with(EMBEDDED_SCHEME)
    }
}

/// Owns the client handle shared by every repository.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Any>,
}

impl DbManager {
    /// Open the engine named by `config.url`, sign in unless embedded,
    /// and select namespace and database.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Connecting to SurrealDB"
        );

        let connection_error = |source: surrealdb::Error| DbError::Connection {
            url: config.url.clone(),
            source,
        };

        let db = any::connect(config.url.as_str())
            .await
            .map_err(connection_error)?;

        if !config.is_embedded() {
            db.signin(Root {
                username: config.username.clone(),
                password: config.password.clone(),
            })
            .await
            .map_err(connection_error)?;
        }

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await
            .map_err(connection_error)?;

        info!(embedded = config.is_embedded(), "Connected to SurrealDB");
        Ok(Self { db })
    }

    pub fn client(&self) -> &Surreal<Any> {
        &self.db
    }
}
