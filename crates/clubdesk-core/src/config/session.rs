//! Session management configuration.

use serde::{Deserialize, Serialize};

/// Session management configuration.
///
/// The idle timeout itself is fixed and lives in the session manager.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Interval in seconds between background profile re-checks while
    /// signed in. `0` disables the periodic re-check; the profile is then
    /// only re-read on provider events and explicit re-checks.
    #[serde(default)]
    pub profile_recheck_seconds: u64,
}
