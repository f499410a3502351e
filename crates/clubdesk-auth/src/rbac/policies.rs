//! Role-to-capability mapping.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use clubdesk_core::error::AppError;
use clubdesk_entity::user::Role;

/// An action class gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    // Operations
    /// View members and contracts.
    ViewOperations,
    /// Create members and contracts.
    ManageOperations,
    /// Edit, delete, activate, or terminate members and contracts.
    AdminOperations,

    // Finance
    /// View payments, expenses, income, and the dashboard totals.
    ViewFinance,
    /// Record new payments, expenses, and income.
    RecordFinance,
    /// Edit or delete recorded finance entries.
    AdminFinance,
    /// Shorthand for [`Capability::RecordFinance`].
    ManageFinance,

    // Administration
    /// Create, update, block, and reset users.
    ManageUsers,
    /// Read the audit log.
    ViewAuditLog,
}

impl Capability {
    /// Every capability, in table order.
    pub const ALL: [Capability; 9] = [
        Self::ViewOperations,
        Self::ManageOperations,
        Self::AdminOperations,
        Self::ViewFinance,
        Self::RecordFinance,
        Self::AdminFinance,
        Self::ManageFinance,
        Self::ManageUsers,
        Self::ViewAuditLog,
    ];

    /// Kebab-case name, e.g. `view-finance`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ViewOperations => "view-operations",
            Self::ManageOperations => "manage-operations",
            Self::AdminOperations => "admin-operations",
            Self::ViewFinance => "view-finance",
            Self::RecordFinance => "record-finance",
            Self::AdminFinance => "admin-finance",
            Self::ManageFinance => "manage-finance",
            Self::ManageUsers => "manage-users",
            Self::ViewAuditLog => "view-audit-log",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| AppError::validation(format!("Unknown capability: '{s}'")))
    }
}

/// The fixed role-to-capability table.
///
/// Stateless: every call re-evaluates, so a role change is visible on the
/// next check.
#[derive(Debug, Clone, Copy, Default)]
pub struct RbacPolicies;

impl RbacPolicies {
    /// Creates the policy table.
    pub fn new() -> Self {
        Self
    }

    /// Whether `role` holds `capability`. No role holds nothing.
    pub fn has_permission(&self, role: Option<Role>, capability: Capability) -> bool {
        role.is_some_and(|r| grants(r, capability))
    }

    /// Capabilities held by a role, in table order.
    pub fn permissions_for_role(&self, role: Option<Role>) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|c| self.has_permission(role, *c))
            .collect()
    }
}

fn grants(role: Role, capability: Capability) -> bool {
    use Capability::*;

    match role {
        Role::Admin => true,
        Role::Staff => match capability {
            ViewOperations | ManageOperations => true,
            AdminOperations | ViewFinance | RecordFinance | AdminFinance | ManageFinance
            | ManageUsers | ViewAuditLog => false,
        },
        Role::Finance => match capability {
            ViewFinance | RecordFinance | ManageFinance => true,
            ViewOperations | ManageOperations | AdminOperations | AdminFinance | ManageUsers
            | ViewAuditLog => false,
        },
    }
}
