//! RBAC enforcement: checks whether a role holds a required capability.

use clubdesk_core::error::AppError;
use clubdesk_entity::user::Role;

use super::policies::{Capability, RbacPolicies};

/// Enforces role-based access control for gated actions.
#[derive(Debug, Clone, Default)]
pub struct RbacEnforcer {
    /// The policy table.
    policies: RbacPolicies,
}

impl RbacEnforcer {
    /// Creates a new enforcer with the fixed policy table.
    pub fn new() -> Self {
        Self {
            policies: RbacPolicies::new(),
        }
    }

    /// Total decision function. Never fails; no role means `false`.
    pub fn decide(&self, role: Option<Role>, capability: Capability) -> bool {
        self.policies.has_permission(role, capability)
    }

    /// Alias of [`decide`](Self::decide) for call sites holding a known role.
    pub fn has_permission(&self, role: Role, capability: Capability) -> bool {
        self.decide(Some(role), capability)
    }

    /// Returns `Ok(())` if allowed, or a `PermissionDenied` error.
    pub fn require(&self, role: Option<Role>, capability: Capability) -> Result<(), AppError> {
        if self.decide(role, capability) {
            return Ok(());
        }
        Err(match role {
            Some(role) => AppError::permission_denied(format!(
                "Role '{role}' does not have capability '{capability}'"
            )),
            None => AppError::permission_denied(format!(
                "No role is assigned to this account; '{capability}' is not allowed"
            )),
        })
    }

    /// Whether the role may record new finance entries (finance and admin).
    pub fn can_record_finance(&self, role: Option<Role>) -> bool {
        self.decide(role, Capability::RecordFinance)
    }

    /// Whether the role may edit or delete finance entries (admin only).
    pub fn can_admin_finance(&self, role: Option<Role>) -> bool {
        self.decide(role, Capability::AdminFinance)
    }

    /// Returns whether the role is an admin.
    pub fn is_admin(&self, role: Option<Role>) -> bool {
        role.is_some_and(|r| r.is_admin())
    }

    /// Capabilities held by a role, in table order.
    pub fn permissions_for_role(&self, role: Option<Role>) -> Vec<Capability> {
        self.policies.permissions_for_role(role)
    }
}
