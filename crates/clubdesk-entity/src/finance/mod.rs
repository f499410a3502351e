//! Ledger entities: payments, expenses, income, and the dashboard summary.

pub mod category;
pub mod entry;
pub mod summary;

pub use category::LedgerCategory;
pub use entry::{LedgerDraft, LedgerEntry};
pub use summary::{FinanceSummary, format_currency};
