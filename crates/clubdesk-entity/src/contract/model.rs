//! Contract entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use clubdesk_core::AppError;
use clubdesk_core::types::{ContractId, MemberId};

/// Which kind of member a contract binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractType {
    /// A registered player.
    Player,
    /// Technical or support staff.
    Staff,
}

impl ContractType {
    /// Three-letter code used in contract numbers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Player => "PLY",
            Self::Staff => "STF",
        }
    }

    /// Return the type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Staff => "staff",
        }
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "player" => Ok(Self::Player),
            "staff" => Ok(Self::Staff),
            _ => Err(AppError::validation(format!(
                "Invalid contract type: '{s}'. Expected one of: player, staff"
            ))),
        }
    }
}

/// Contract lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    /// Not yet in force.
    #[default]
    Draft,
    /// In force.
    Active,
    /// Past its end date.
    Expired,
    /// Ended early by the club.
    Terminated,
}

impl ContractStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    /// Unique contract identifier.
    pub id: ContractId,
    /// The member bound by the contract.
    pub member_id: MemberId,
    /// Human-readable number, e.g. `FFC-PLY-2025-004`.
    pub contract_no: String,
    /// Player or staff.
    pub contract_type: ContractType,
    /// Position or role title.
    pub position_title: Option<String>,
    /// First day in force.
    pub start_date: NaiveDate,
    /// Last day in force.
    pub end_date: NaiveDate,
    /// Monthly allowance in TZS.
    pub monthly_allowance: f64,
    /// One-off registration fee in TZS (players only).
    pub registration_fee: f64,
    /// Lifecycle status.
    pub status: ContractStatus,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Reason given on termination.
    pub termination_reason: Option<String>,
    /// When the contract was terminated.
    pub terminated_at: Option<DateTime<Utc>>,
    /// When the contract was created.
    pub created_at: Option<DateTime<Utc>>,
    /// When the contract was last changed.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Editable contract fields, used for both create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractDraft {
    /// The member bound by the contract.
    pub member_id: MemberId,
    /// Player or staff.
    pub contract_type: ContractType,
    /// Position or role title.
    pub position_title: Option<String>,
    /// First day in force.
    pub start_date: NaiveDate,
    /// Last day in force.
    pub end_date: NaiveDate,
    /// Monthly allowance in TZS.
    pub monthly_allowance: f64,
    /// One-off registration fee in TZS.
    pub registration_fee: f64,
    /// Requested status.
    pub status: ContractStatus,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl ContractDraft {
    /// Checks dates and amounts.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.end_date < self.start_date {
            return Err(AppError::validation(
                "Contract end date must not be before its start date",
            ));
        }
        if self.monthly_allowance < 0.0 || self.registration_fee < 0.0 {
            return Err(AppError::validation("Contract amounts must not be negative"));
        }
        Ok(())
    }
}

/// A status transition applied by activate or terminate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractStatusChange {
    /// New status.
    pub status: ContractStatus,
    /// Termination reason; cleared on activation.
    pub termination_reason: Option<String>,
    /// Termination time; cleared on activation.
    pub terminated_at: Option<DateTime<Utc>>,
}

impl ContractStatusChange {
    /// Puts the contract in force and clears any termination.
    pub fn activate() -> Self {
        Self {
            status: ContractStatus::Active,
            termination_reason: None,
            terminated_at: None,
        }
    }

    /// Ends the contract now.
    pub fn terminate(reason: Option<String>, at: DateTime<Utc>) -> Self {
        Self {
            status: ContractStatus::Terminated,
            termination_reason: reason.filter(|r| !r.trim().is_empty()),
            terminated_at: Some(at),
        }
    }
}
