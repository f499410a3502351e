//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Password policy applied before a password ever reaches the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Minimum zxcvbn score (0–4). `0` disables the strength estimate.
    #[serde(default)]
    pub password_min_strength: u8,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password_min_length: default_password_min(),
            password_min_strength: 0,
        }
    }
}

fn default_password_min() -> usize {
    6
}
