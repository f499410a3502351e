//! Hosted backend connection configuration.

use serde::{Deserialize, Serialize};

/// Which store implementation the application talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendMode {
    /// The hosted auth + REST backend.
    Rest,
    /// A process-local store seeded from configuration (offline demos).
    #[default]
    Memory,
}

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Store implementation to use.
    #[serde(default)]
    pub mode: BackendMode,
    /// Base URL of the hosted project, e.g. `https://xyz.example.co`.
    #[serde(default)]
    pub url: String,
    /// Public (anon) API key sent with every request.
    #[serde(default)]
    pub anon_key: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Accounts seeded into the in-memory backend.
    #[serde(default)]
    pub seed_users: Vec<SeedUser>,
}

/// An account created at startup by the in-memory backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    /// Login email.
    pub email: String,
    /// Login password.
    pub password: String,
    /// Display name.
    #[serde(default)]
    pub full_name: Option<String>,
    /// Role name (`admin`, `staff`, `finance`).
    #[serde(default)]
    pub role: Option<String>,
    /// Whether the account may sign in.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            mode: BackendMode::default(),
            url: String::new(),
            anon_key: String::new(),
            timeout_seconds: default_timeout(),
            seed_users: Vec::new(),
        }
    }
}

fn default_timeout() -> u64 {
    15
}

fn default_true() -> bool {
    true
}
