//! User profile entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use clubdesk_core::types::UserId;

use super::role::Role;

/// Application-level record extending an identity with role and status.
///
/// Exactly one per identity. `role` is `None` when the row has no role or
/// an unrecognized one; such a profile carries no capabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Same id as the provider identity.
    pub id: UserId,
    /// Login email as recorded on the profile.
    pub email: Option<String>,
    /// Display name.
    pub full_name: Option<String>,
    /// Assigned role.
    pub role: Option<Role>,
    /// Whether the account may hold a session.
    pub is_active: bool,
    /// When the account was blocked.
    pub blocked_at: Option<DateTime<Utc>>,
    /// Reason given when blocking.
    pub blocked_reason: Option<String>,
    /// When the profile was created.
    pub created_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// A minimal active profile.
    pub fn new(id: UserId, role: Option<Role>) -> Self {
        Self {
            id,
            email: None,
            full_name: None,
            role,
            is_active: true,
            blocked_at: None,
            blocked_reason: None,
            created_at: None,
        }
    }

    /// Check if this profile has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_some_and(|r| r.is_admin())
    }
}

/// Data required to provision a new user (identity + profile).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUser {
    /// Login email.
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    /// Initial password.
    pub password: String,
    /// Display name.
    #[validate(length(min = 1, max = 120, message = "Full name is required"))]
    pub full_name: String,
    /// Assigned role.
    pub role: Role,
}

/// Administrative update of an existing user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateUser {
    /// New login email.
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    /// New display name.
    #[validate(length(min = 1, max = 120, message = "Full name is required"))]
    pub full_name: String,
    /// New role.
    pub role: Role,
    /// New active flag.
    pub is_active: bool,
}
