//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles available in the authorization policy.
///
/// An absent role (`Option<Role>::None`) means "no access".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full club administrator.
    Admin,
    /// Operations staff: members, contracts.
    Staff,
    /// Finance officer: payments, expenses, income.
    Finance,
}

impl Role {
    /// Every role, in display order.
    pub const ALL: [Role; 3] = [Role::Admin, Role::Staff, Role::Finance];

    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
            Self::Finance => "finance",
        }
    }

    /// Narrow a role string read from storage.
    ///
    /// Only the exact lowercase names are recognized; anything else,
    /// including other casings or padded values, is "no role".
    pub fn from_stored(raw: &str) -> Option<Role> {
        Self::ALL.into_iter().find(|role| role.as_str() == raw)
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Admin => "Administrator",
            Self::Staff => "Staff",
            Self::Finance => "Finance",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = clubdesk_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "staff" => Ok(Self::Staff),
            "finance" => Ok(Self::Finance),
            _ => Err(clubdesk_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: admin, staff, finance"
            ))),
        }
    }
}
