//! The authenticated principal issued by the credential provider.

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// An externally-issued authenticated principal.
///
/// Immutable from the application's point of view; only explicit
/// provider calls (password change, sign-out) touch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider user id. Equal to the profile row id.
    pub id: UserId,
    /// Login email.
    pub email: String,
    /// `full_name` from the provider's user metadata, if any.
    #[serde(default)]
    pub full_name: Option<String>,
}

impl Identity {
    /// Creates an identity without provider metadata.
    pub fn new(id: UserId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            full_name: None,
        }
    }
}
