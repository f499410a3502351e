//! Wire rows returned by the backend and their narrowing into domain values.
//!
//! Nothing from the wire reaches the rest of the application without
//! passing through one of these conversions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use clubdesk_core::AppError;
use clubdesk_core::result::AppResult;
use clubdesk_core::types::{AuditLogId, Identity, LedgerEntryId, UserId};
use clubdesk_entity::audit::{AuditAction, AuditActor, AuditLogEntry};
use clubdesk_entity::contract::ContractDraft;
use clubdesk_entity::finance::{LedgerCategory, LedgerDraft, LedgerEntry};
use clubdesk_entity::user::{Role, UserProfile};

/// Columns read from `user_profiles`.
pub const PROFILE_COLUMNS: &str =
    "id,email,full_name,role,is_active,blocked_at,blocked_reason,created_at";

/// Response of the password and refresh-token grants.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: UserRow,
}

/// The provider's user object.
#[derive(Debug, Deserialize)]
pub struct UserRow {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

impl UserRow {
    /// Narrow into an [`Identity`], reading `full_name` from the metadata.
    pub fn into_identity(self) -> Identity {
        let full_name = self
            .user_metadata
            .get("full_name")
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string);
        Identity {
            id: UserId::from_uuid(self.id),
            email: self.email.unwrap_or_default(),
            full_name,
        }
    }
}

/// A `user_profiles` row as stored.
#[derive(Debug, Deserialize)]
pub struct ProfileRow {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub blocked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub blocked_reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ProfileRow {
    /// Narrow into a [`UserProfile`].
    ///
    /// An unrecognized role becomes "no role" and a missing `is_active`
    /// counts as active.
    pub fn narrow(self) -> UserProfile {
        let id = UserId::from_uuid(self.id);
        let role = self.role.as_deref().and_then(|raw| {
            let role = Role::from_stored(raw);
            if role.is_none() {
                warn!(user_id = %id, role = %raw, "Unrecognized role on profile, treating as no role");
            }
            role
        });
        UserProfile {
            id,
            email: self.email,
            full_name: self.full_name,
            role,
            is_active: self.is_active.unwrap_or(true),
            blocked_at: self.blocked_at,
            blocked_reason: self.blocked_reason,
            created_at: self.created_at,
        }
    }
}

/// Columns read from `audit_logs`, with the actor's profile embedded.
pub const AUDIT_COLUMNS: &str = "id,table_name,record_id,action,changed_at,changed_by,old_data,new_data,user_profiles(full_name,email)";

/// An `audit_logs` row as stored.
#[derive(Debug, Deserialize)]
pub struct AuditRow {
    pub id: Uuid,
    pub table_name: String,
    pub record_id: serde_json::Value,
    pub action: AuditAction,
    pub changed_at: DateTime<Utc>,
    #[serde(default)]
    pub changed_by: Option<Uuid>,
    #[serde(default)]
    pub old_data: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub new_data: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub user_profiles: Option<AuditActor>,
}

impl AuditRow {
    /// Narrow into an [`AuditLogEntry`]. Record keys may be text or numbers.
    pub fn narrow(self) -> AuditLogEntry {
        let record_id = match self.record_id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        AuditLogEntry {
            id: AuditLogId::from_uuid(self.id),
            table_name: self.table_name,
            record_id,
            action: self.action,
            changed_at: self.changed_at,
            changed_by: self.changed_by.map(UserId::from_uuid),
            old_data: self.old_data,
            new_data: self.new_data,
            actor: self.user_profiles,
        }
    }
}

/// Body written to `contracts` on insert and update.
#[derive(Debug, Serialize)]
pub struct ContractPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_no: Option<&'a str>,
    #[serde(flatten)]
    pub draft: &'a ContractDraft,
    pub terminated_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Convert a ledger table row into a [`LedgerEntry`].
///
/// `id`, `amount`, the category's date column, `notes`, and `created_at`
/// are lifted out; every other column stays in `details`.
pub fn ledger_entry_from_row(
    category: LedgerCategory,
    mut row: serde_json::Map<String, serde_json::Value>,
) -> AppResult<LedgerEntry> {
    let invalid = |field: &str| {
        AppError::new(
            clubdesk_core::ErrorKind::Serialization,
            format!("{} row has a missing or invalid '{field}'", category.table()),
        )
    };

    let id = row
        .remove("id")
        .and_then(|v| v.as_str().and_then(|s| s.parse::<Uuid>().ok()))
        .map(LedgerEntryId::from_uuid)
        .ok_or_else(|| invalid("id"))?;
    let amount = row
        .remove("amount")
        .and_then(|v| match v {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.parse().ok(),
            _ => None,
        })
        .ok_or_else(|| invalid("amount"))?;
    let date = row
        .remove(category.date_column())
        .and_then(|v| v.as_str().and_then(|s| s.parse::<NaiveDate>().ok()))
        .ok_or_else(|| invalid(category.date_column()))?;
    let notes = row
        .remove("notes")
        .and_then(|v| v.as_str().map(str::to_string))
        .filter(|s| !s.is_empty());
    let created_at = row
        .remove("created_at")
        .and_then(|v| v.as_str().and_then(|s| s.parse::<DateTime<Utc>>().ok()));

    Ok(LedgerEntry {
        id,
        category,
        amount,
        date,
        notes,
        details: row,
        created_at,
    })
}

/// Convert a [`LedgerDraft`] into the column map written to the category's table.
pub fn ledger_row_from_draft(
    category: LedgerCategory,
    draft: &LedgerDraft,
) -> serde_json::Map<String, serde_json::Value> {
    let mut row = draft.details.clone();
    row.insert("amount".to_string(), serde_json::json!(draft.amount));
    row.insert(
        category.date_column().to_string(),
        serde_json::Value::String(draft.date.format("%Y-%m-%d").to_string()),
    );
    row.insert(
        "notes".to_string(),
        draft
            .notes
            .as_ref()
            .map_or(serde_json::Value::Null, |n| serde_json::Value::String(n.clone())),
    );
    row
}

/// Total row count from a `Content-Range` header such as `0-9/42` or `*/0`.
pub fn parse_content_range_total(header: &str) -> Option<u64> {
    header.rsplit_once('/')?.1.trim().parse().ok()
}
