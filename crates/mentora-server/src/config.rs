//! Server configuration loaded from TOML.

use std::path::{Path, PathBuf};

use mentora_booking::{BookingConfig, BookingConfigError};
use mentora_db::DbConfig;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "MENTORA_CONFIG";
/// Environment variable overriding `db.url`.
pub const DB_URL_ENV: &str = "MENTORA_DB_URL";
const DEFAULT_CONFIG_FILE: &str = "mentora.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("invalid [booking] config: {0}")]
    Booking(#[from] BookingConfigError),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub db: DbConfig,
    pub booking: BookingConfig,
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse and validate a TOML document.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `$MENTORA_CONFIG`, then `./mentora.toml`, then defaults.
    /// `$MENTORA_DB_URL` replaces the database URL afterwards.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        let db_url = std::env::var(DB_URL_ENV).ok();
        Self::load_from(explicit, db_url)
    }

    fn load_from(explicit: Option<PathBuf>, db_url: Option<String>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => {
                info!(path = %path.display(), "Loading config");
                Self::from_file(&path)?
            }
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    info!(path = %path.display(), "Loading config");
                    Self::from_file(&path)?
                } else {
                    info!("No config file found, using defaults");
                    Self::default()
                }
            }
        };

        if let Some(url) = db_url {
            config.db.url = url;
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.db.url.is_empty() {
            return Err(ConfigError::Invalid("db.url must not be empty".into()));
        }
        self.booking.validate()?;
        Ok(())
    }
}
