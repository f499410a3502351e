//! Ledger entry entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use clubdesk_core::AppError;
use clubdesk_core::types::{LedgerEntryId, MemberId};

use super::category::LedgerCategory;

/// A stored payment, expense, or income row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique entry identifier.
    pub id: LedgerEntryId,
    /// Ledger the row belongs to.
    pub category: LedgerCategory,
    /// Amount in TZS, always positive.
    pub amount: f64,
    /// Payment, match, expense, or income date.
    pub date: NaiveDate,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Category-specific columns (member, opponent, source, ...).
    #[serde(default)]
    pub details: serde_json::Map<String, serde_json::Value>,
    /// When the row was created.
    pub created_at: Option<DateTime<Utc>>,
}

impl LedgerEntry {
    /// The member a salary or extra payment was made to.
    pub fn member_id(&self) -> Option<MemberId> {
        self.details
            .get("member_id")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok())
    }
}

/// Editable ledger fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerDraft {
    /// Amount in TZS.
    pub amount: f64,
    /// Entry date.
    pub date: NaiveDate,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Category-specific columns.
    #[serde(default)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl LedgerDraft {
    /// Creates a draft without notes or extra columns.
    pub fn new(amount: f64, date: NaiveDate) -> Self {
        Self {
            amount,
            date,
            notes: None,
            details: serde_json::Map::new(),
        }
    }

    /// Attaches the member a payment is made to.
    pub fn for_member(mut self, member_id: MemberId) -> Self {
        self.details.insert(
            "member_id".to_string(),
            serde_json::Value::String(member_id.to_string()),
        );
        self
    }

    /// Rejects non-positive or non-finite amounts.
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(AppError::validation("Amount must be greater than zero"));
        }
        Ok(())
    }
}
