//! Ledger category enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use clubdesk_core::AppError;

/// Which ledger a money movement belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerCategory {
    /// Monthly salary paid to a member.
    SalaryPayment,
    /// Bonus or other one-off payment to a member.
    ExtraPayment,
    /// Cost attached to a fixture.
    MatchExpense,
    /// Any other club expense.
    OtherExpense,
    /// Money received by the club.
    Income,
}

impl LedgerCategory {
    /// Every category, expenses first.
    pub const ALL: [LedgerCategory; 5] = [
        Self::SalaryPayment,
        Self::ExtraPayment,
        Self::MatchExpense,
        Self::OtherExpense,
        Self::Income,
    ];

    /// Backend table holding this category.
    pub fn table(&self) -> &'static str {
        match self {
            Self::SalaryPayment => "salary_payments",
            Self::ExtraPayment => "extra_payments",
            Self::MatchExpense => "match_expenses",
            Self::OtherExpense => "other_expenses",
            Self::Income => "club_income",
        }
    }

    /// Column carrying the entry's date.
    pub fn date_column(&self) -> &'static str {
        match self {
            Self::SalaryPayment | Self::ExtraPayment => "payment_date",
            Self::MatchExpense => "match_date",
            Self::OtherExpense => "expense_date",
            Self::Income => "income_date",
        }
    }

    /// Whether entries of this category reduce the club balance.
    pub fn is_outflow(&self) -> bool {
        !matches!(self, Self::Income)
    }

    /// Return the category as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SalaryPayment => "salary_payment",
            Self::ExtraPayment => "extra_payment",
            Self::MatchExpense => "match_expense",
            Self::OtherExpense => "other_expense",
            Self::Income => "income",
        }
    }
}

impl fmt::Display for LedgerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LedgerCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted || c.table() == wanted)
            .ok_or_else(|| AppError::validation(format!("Unknown ledger category: '{s}'")))
    }
}
