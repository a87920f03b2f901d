//! Layered configuration loading using figment.
//!
//! Sources, highest priority first:
//! 1. Environment variables (`CASEWORK_*` prefix, `__` between sections)
//! 2. A TOML file, `casework.toml` in the working directory by default
//! 3. Built-in defaults
//!
//! `CASEWORK_TRACKING__MINIMUM_SESSION_SECS=120` maps to
//! `tracking.minimum_session_secs`.

mod error;

pub use error::ConfigError;

use crate::tracking::domain::TrackingPolicy;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "casework.toml";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "CASEWORK_";

/// Top-level casework configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseworkConfig {
    /// Duration rules for tracked sessions.
    #[serde(default)]
    pub tracking: TrackingPolicy,
}

impl CaseworkConfig {
    /// Loads configuration from `casework.toml` and the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a source cannot be parsed or a value is
    /// invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Loads configuration from the TOML file at `path` and the environment.
    /// A missing file is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a source cannot be parsed or a value is
    /// invalid.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(path.as_ref()).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Builds the provider chain without extracting it.
    #[must_use]
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the minimum session length
    /// is negative or the long-session threshold does not exceed it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tracking = &self.tracking;
        if tracking.minimum_session_secs < 0 {
            return Err(ConfigError::InvalidValue {
                field: "tracking.minimum_session_secs".to_owned(),
                reason: "must not be negative".to_owned(),
            });
        }
        if tracking.long_session_secs <= tracking.minimum_session_secs {
            return Err(ConfigError::InvalidValue {
                field: "tracking.long_session_secs".to_owned(),
                reason: format!(
                    "must exceed the minimum session length of {}s",
                    tracking.minimum_session_secs
                ),
            });
        }
        Ok(())
    }
}
