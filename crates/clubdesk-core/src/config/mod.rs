//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod auth;
pub mod backend;
pub mod logging;
pub mod session;

use serde::{Deserialize, Serialize};

pub use self::auth::AuthConfig;
pub use self::backend::{BackendConfig, BackendMode};
pub use self::logging::LoggingConfig;
pub use self::session::SessionConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// Deserialization target for the merged `config/default.toml`,
/// the environment overlay, and `CLUBDESK__*` variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Hosted backend connection settings.
    #[serde(default)]
    pub backend: BackendConfig,
    /// Credential and password policy settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Session management settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `CLUBDESK__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config", env)
    }

    /// Load configuration rooted at `dir` instead of `./config`.
    pub fn load_from(dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CLUBDESK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Rejects combinations the application cannot start with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.backend.mode == BackendMode::Rest {
            if self.backend.url.trim().is_empty() {
                return Err(AppError::configuration(
                    "backend.url is required when backend.mode = \"rest\"",
                ));
            }
            if self.backend.anon_key.trim().is_empty() {
                return Err(AppError::configuration(
                    "backend.anon_key is required when backend.mode = \"rest\"",
                ));
            }
        }
        if self.auth.password_min_length == 0 {
            return Err(AppError::configuration(
                "auth.password_min_length must be at least 1",
            ));
        }
        if self.auth.password_min_strength > 4 {
            return Err(AppError::configuration(
                "auth.password_min_strength must be between 0 and 4",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid_in_memory_mode() {
        let config = AppConfig::default();
        assert_eq!(config.backend.mode, BackendMode::Memory);
        assert_eq!(config.auth.password_min_length, 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rest_mode_requires_url_and_key() {
        let mut config = AppConfig::default();
        config.backend.mode = BackendMode::Rest;
        let err = config.validate().unwrap_err();
        assert!(err.is(crate::ErrorKind::Configuration));

        config.backend.url = "https://club.example.org".to_string();
        config.backend.anon_key = "anon".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_strength_out_of_range() {
        let mut config = AppConfig::default();
        config.auth.password_min_strength = 7;
        assert!(config.validate().is_err());
    }
}
