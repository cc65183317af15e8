//! Engine configuration.
//!
//! Values come from environment variables prefixed with `VERDANT`, using
//! `__` as separator (for example `VERDANT__BUSY_TIMEOUT_MS=2000`).
//! Missing values fall back to the defaults below.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Error raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A source could not be read or a value had the wrong type.
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),

    /// A value was read but is not acceptable.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Runtime settings for [`ProfileEngine`](crate::ProfileEngine).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// `SQLite` file holding relationships and the audit log.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    /// Upper bound on how long a store call waits for a competing writer.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// Refuse new friend requests and acceptances across a block edge.
    #[serde(default = "default_block_vetoes_requests")]
    pub block_vetoes_requests: bool,
    /// How many navigations are remembered for audit de-duplication.
    #[serde(default = "default_audit_navigation_capacity")]
    pub audit_navigation_capacity: usize,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("verdant.db")
}

const fn default_busy_timeout_ms() -> u64 {
    5_000
}

const fn default_block_vetoes_requests() -> bool {
    true
}

const fn default_audit_navigation_capacity() -> usize {
    1_024
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            block_vetoes_requests: default_block_vetoes_requests(),
            audit_navigation_capacity: default_audit_navigation_capacity(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from `VERDANT__*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("VERDANT").separator("__"))
            .build()?;
        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Checks that values are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a zero timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.busy_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "busy_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Store call timeout as a [`Duration`].
    #[must_use]
    pub const fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Sets the database path.
    #[must_use]
    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = path.into();
        self
    }

    /// Sets whether blocks veto friend requests.
    #[must_use]
    pub const fn with_block_veto(mut self, enabled: bool) -> Self {
        self.block_vetoes_requests = enabled;
        self
    }
}
