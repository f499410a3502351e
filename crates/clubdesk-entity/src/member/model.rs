//! Member entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use clubdesk_core::AppError;
use clubdesk_core::types::MemberId;

/// Whether a member plays or works for the club.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberType {
    /// A registered player.
    Player,
    /// Technical or support staff.
    Staff,
}

impl MemberType {
    /// Return the type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Staff => "staff",
        }
    }

    /// Plural heading used for listings.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Player => "Players",
            Self::Staff => "Staff",
        }
    }
}

impl fmt::Display for MemberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "player" | "players" => Ok(Self::Player),
            "staff" => Ok(Self::Staff),
            _ => Err(AppError::validation(format!(
                "Invalid member type: '{s}'. Expected one of: player, staff"
            ))),
        }
    }
}

/// A stored member row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Unique member identifier.
    pub id: MemberId,
    /// Full legal name.
    pub full_name: String,
    /// National ID or passport number.
    #[serde(default)]
    pub id_no: Option<String>,
    /// Date of birth.
    pub date_of_birth: NaiveDate,
    /// Contact phone number.
    pub phone: String,
    /// Playing position or job title, e.g. `Goalkeeper` or `Physio`.
    pub role: String,
    /// Player or staff.
    pub member_type: MemberType,
    /// Agreed monthly salary in TZS.
    pub monthly_salary: f64,
    /// One-off registration fee in TZS.
    #[serde(default)]
    pub registration_fee: f64,
    /// When the row was created.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Editable member fields, used for both create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct MemberDraft {
    /// Full legal name.
    #[validate(length(min = 1, max = 120, message = "Full name is required"))]
    pub full_name: String,
    /// National ID or passport number.
    pub id_no: Option<String>,
    /// Date of birth.
    pub date_of_birth: NaiveDate,
    /// Contact phone number.
    #[validate(length(min = 1, max = 32, message = "Phone is required"))]
    pub phone: String,
    /// Playing position or job title.
    #[validate(length(min = 1, max = 80, message = "Role is required"))]
    pub role: String,
    /// Player or staff.
    pub member_type: MemberType,
    /// Agreed monthly salary in TZS.
    #[validate(range(min = 0.0, message = "Monthly salary must not be negative"))]
    pub monthly_salary: f64,
    /// One-off registration fee in TZS.
    #[validate(range(min = 0.0, message = "Registration fee must not be negative"))]
    pub registration_fee: f64,
}

impl MemberDraft {
    /// Trims text fields and drops an empty ID number.
    pub fn normalized(mut self) -> Self {
        self.full_name = self.full_name.trim().to_string();
        self.phone = self.phone.trim().to_string();
        self.role = self.role.trim().to_string();
        self.id_no = self
            .id_no
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        self
    }
}
