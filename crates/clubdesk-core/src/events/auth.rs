//! Auth-state change notifications from the credential provider.

use serde::{Deserialize, Serialize};

use crate::types::Identity;

/// A push notification from the credential provider.
///
/// Fires on sign-in, sign-out, and token refresh, including ones that
/// happened elsewhere (another tab, an admin revoking the token).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthEvent {
    /// A session was established for this identity.
    SignedIn {
        /// The signed-in principal.
        identity: Identity,
    },
    /// There is no longer a session.
    SignedOut,
    /// The session token was refreshed.
    TokenRefreshed {
        /// The principal whose token was refreshed.
        identity: Identity,
    },
    /// The provider's user object changed (email, metadata, password).
    UserUpdated {
        /// The updated principal.
        identity: Identity,
    },
}

impl AuthEvent {
    /// The identity carried by the event, if the event implies a live session.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::SignedIn { identity }
            | Self::TokenRefreshed { identity }
            | Self::UserUpdated { identity } => Some(identity),
            Self::SignedOut => None,
        }
    }

    /// Short event name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SignedIn { .. } => "signed_in",
            Self::SignedOut => "signed_out",
            Self::TokenRefreshed { .. } => "token_refreshed",
            Self::UserUpdated { .. } => "user_updated",
        }
    }
}
