//! Navigation sections and the capability each one needs.

use serde::{Deserialize, Serialize};
use std::fmt;

use clubdesk_entity::user::Role;

use super::policies::{Capability, RbacPolicies};

/// A top-level area of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    Dashboard,
    Players,
    Staff,
    Contracts,
    Finances,
    Income,
    MatchExpenses,
    OtherExpenses,
    Reports,
    Users,
    AuditLog,
}

impl Section {
    /// Every section, in menu order.
    pub const ALL: [Section; 11] = [
        Self::Dashboard,
        Self::Players,
        Self::Staff,
        Self::Contracts,
        Self::Finances,
        Self::Income,
        Self::MatchExpenses,
        Self::OtherExpenses,
        Self::Reports,
        Self::Users,
        Self::AuditLog,
    ];

    /// Capability needed to see the section. The dashboard only needs a role.
    pub fn required_capability(&self) -> Option<Capability> {
        match self {
            Self::Dashboard => None,
            Self::Players | Self::Staff | Self::Contracts => Some(Capability::ViewOperations),
            Self::Finances
            | Self::Income
            | Self::MatchExpenses
            | Self::OtherExpenses
            | Self::Reports => Some(Capability::ViewFinance),
            Self::Users => Some(Capability::ManageUsers),
            Self::AuditLog => Some(Capability::ViewAuditLog),
        }
    }

    /// Menu label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Players => "Players",
            Self::Staff => "Staff",
            Self::Contracts => "Contracts",
            Self::Finances => "Finances",
            Self::Income => "Income",
            Self::MatchExpenses => "Match Expenses",
            Self::OtherExpenses => "Other Expenses",
            Self::Reports => "Reports",
            Self::Users => "Users",
            Self::AuditLog => "Audit Log",
        }
    }

    /// Sections the role may see, in menu order. No role sees nothing.
    pub fn visible_to(role: Option<Role>) -> Vec<Section> {
        let policies = RbacPolicies::new();
        if role.is_none() {
            return Vec::new();
        }
        Self::ALL
            .into_iter()
            .filter(|s| {
                s.required_capability()
                    .is_none_or(|c| policies.has_permission(role, c))
            })
            .collect()
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_menu() {
        assert_eq!(
            Section::visible_to(Some(Role::Staff)),
            vec![
                Section::Dashboard,
                Section::Players,
                Section::Staff,
                Section::Contracts
            ]
        );
    }

    #[test]
    fn test_finance_menu_has_no_operations() {
        let menu = Section::visible_to(Some(Role::Finance));
        assert!(menu.contains(&Section::Income));
        assert!(!menu.contains(&Section::Players));
        assert!(!menu.contains(&Section::Users));
    }

    #[test]
    fn test_no_role_sees_nothing() {
        assert!(Section::visible_to(None).is_empty());
        assert_eq!(Section::visible_to(Some(Role::Admin)).len(), Section::ALL.len());
    }
}
