//! Dashboard totals.

use serde::{Deserialize, Serialize};

use super::category::LedgerCategory;
use super::entry::LedgerEntry;

/// Club-wide money totals shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FinanceSummary {
    pub total_salaries: f64,
    pub total_extra_payments: f64,
    pub total_match_expenses: f64,
    pub total_other_expenses: f64,
    pub total_income: f64,
}

impl FinanceSummary {
    /// Adds one entry to the matching total.
    pub fn add(&mut self, entry: &LedgerEntry) {
        let slot = match entry.category {
            LedgerCategory::SalaryPayment => &mut self.total_salaries,
            LedgerCategory::ExtraPayment => &mut self.total_extra_payments,
            LedgerCategory::MatchExpense => &mut self.total_match_expenses,
            LedgerCategory::OtherExpense => &mut self.total_other_expenses,
            LedgerCategory::Income => &mut self.total_income,
        };
        *slot += entry.amount;
    }

    /// Sum of every outflow category.
    pub fn total_expenses(&self) -> f64 {
        self.total_salaries
            + self.total_extra_payments
            + self.total_match_expenses
            + self.total_other_expenses
    }

    /// Income minus all expenses. Negative when the club is in deficit.
    pub fn net_balance(&self) -> f64 {
        self.total_income - self.total_expenses()
    }
}

impl<'a> FromIterator<&'a LedgerEntry> for FinanceSummary {
    fn from_iter<I: IntoIterator<Item = &'a LedgerEntry>>(iter: I) -> Self {
        let mut summary = Self::default();
        for entry in iter {
            summary.add(entry);
        }
        summary
    }
}

/// Formats an amount as whole shillings with thousands separators,
/// e.g. `TZS 1,234` or `TZS -50,000`.
pub fn format_currency(amount: f64) -> String {
    let rounded = amount.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("TZS -{grouped}")
    } else {
        format!("TZS {grouped}")
    }
}
