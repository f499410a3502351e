//! Payment history shown on a member's profile.

use serde::{Deserialize, Serialize};

use crate::finance::LedgerEntry;

use super::model::Member;

/// A member with the salary and extra payments made to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberPayments {
    /// The member.
    pub member: Member,
    /// Salary payments, newest first.
    pub salary_payments: Vec<LedgerEntry>,
    /// Bonuses and other one-off payments, newest first.
    pub extra_payments: Vec<LedgerEntry>,
}

impl MemberPayments {
    /// Sum of salary payments.
    pub fn total_salaries(&self) -> f64 {
        self.salary_payments.iter().map(|p| p.amount).sum()
    }

    /// Sum of extra payments.
    pub fn total_extras(&self) -> f64 {
        self.extra_payments.iter().map(|p| p.amount).sum()
    }

    /// Everything the club has paid this member.
    pub fn total_cost(&self) -> f64 {
        self.total_salaries() + self.total_extras()
    }
}
