//! Session lifecycle phase and the read-only snapshot handed to views.

use serde::{Deserialize, Serialize};
use std::fmt;

use clubdesk_core::types::Identity;

use crate::user::{Role, UserProfile};

/// Lifecycle phase of the session manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Looking for an existing provider session at startup.
    Initializing,
    /// Loading the profile for a known identity.
    ResolvingProfile,
    /// Signed in with a resolved profile.
    Authenticated,
    /// Signed out. Only sign-in is valid.
    Anonymous,
}

impl SessionPhase {
    /// Whether views should show a loading state.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Initializing | Self::ResolvingProfile)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Initializing => "initializing",
            Self::ResolvingProfile => "resolving_profile",
            Self::Authenticated => "authenticated",
            Self::Anonymous => "anonymous",
        };
        f.write_str(s)
    }
}

/// Read-only view of "who is signed in, with what role".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Current phase.
    pub phase: SessionPhase,
    /// Signed-in principal.
    pub identity: Option<Identity>,
    /// Role from the profile; `None` grants nothing.
    pub role: Option<Role>,
    /// Profile name, falling back to provider metadata.
    pub full_name: Option<String>,
    /// Profile active flag; `None` when no profile has been read.
    pub is_active: Option<bool>,
    /// `true` while initializing or resolving the profile.
    pub loading: bool,
}

impl SessionSnapshot {
    /// Snapshot for the startup phase.
    pub fn initializing() -> Self {
        Self {
            phase: SessionPhase::Initializing,
            identity: None,
            role: None,
            full_name: None,
            is_active: None,
            loading: true,
        }
    }

    /// Snapshot for the signed-out state.
    pub fn anonymous() -> Self {
        Self {
            phase: SessionPhase::Anonymous,
            loading: false,
            ..Self::initializing()
        }
    }

    /// Snapshot while the profile of `identity` is being read.
    pub fn resolving(identity: Identity) -> Self {
        Self {
            phase: SessionPhase::ResolvingProfile,
            identity: Some(identity),
            ..Self::initializing()
        }
    }

    /// Snapshot for a signed-in identity. A missing profile yields no role.
    pub fn authenticated(identity: Identity, profile: Option<&UserProfile>) -> Self {
        let full_name = profile
            .and_then(|p| p.full_name.clone())
            .or_else(|| identity.full_name.clone());
        Self {
            phase: SessionPhase::Authenticated,
            role: profile.and_then(|p| p.role),
            is_active: profile.map(|p| p.is_active),
            full_name,
            identity: Some(identity),
            loading: false,
        }
    }

    /// Whether a session is established.
    pub fn is_authenticated(&self) -> bool {
        self.phase == SessionPhase::Authenticated
    }
}
