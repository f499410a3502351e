//! Audit log entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use clubdesk_core::types::{AuditLogId, UserId};

/// Changed columns named in an update summary.
const SUMMARY_FIELDS: usize = 6;

/// The kind of change a row records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    /// A row was created.
    Insert,
    /// A row was changed.
    Update,
    /// A row was removed.
    Delete,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert => write!(f, "INSERT"),
            Self::Update => write!(f, "UPDATE"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// Profile of the account that made a change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditActor {
    /// Display name.
    pub full_name: Option<String>,
    /// Login email.
    pub email: Option<String>,
}

/// One recorded change to a club table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// Unique row identifier.
    pub id: AuditLogId,
    /// Table the change was made to.
    pub table_name: String,
    /// Primary key of the changed row.
    pub record_id: String,
    /// Insert, update, or delete.
    pub action: AuditAction,
    /// When the change happened.
    pub changed_at: DateTime<Utc>,
    /// Account that made the change; `None` for system changes.
    pub changed_by: Option<UserId>,
    /// Row before the change.
    pub old_data: Option<serde_json::Map<String, serde_json::Value>>,
    /// Row after the change.
    pub new_data: Option<serde_json::Map<String, serde_json::Value>>,
    /// Joined profile of `changed_by`.
    pub actor: Option<AuditActor>,
}

impl AuditLogEntry {
    /// Columns whose value differs between `old_data` and `new_data`, sorted.
    pub fn changed_fields(&self) -> Vec<&str> {
        let (Some(old), Some(new)) = (&self.old_data, &self.new_data) else {
            return Vec::new();
        };
        if self.action != AuditAction::Update {
            return Vec::new();
        }
        let mut fields: Vec<&str> = new
            .iter()
            .filter(|(key, value)| old.get(key.as_str()) != Some(*value))
            .map(|(key, _)| key.as_str())
            .collect();
        fields.sort_unstable();
        fields
    }

    /// One-line description of the change.
    pub fn summary(&self) -> String {
        match self.action {
            AuditAction::Insert => "Created record".to_string(),
            AuditAction::Delete => "Deleted record".to_string(),
            AuditAction::Update => {
                let fields = self.changed_fields();
                if fields.is_empty() {
                    "Updated record".to_string()
                } else {
                    let shown: Vec<&str> = fields.into_iter().take(SUMMARY_FIELDS).collect();
                    format!("Changed: {}", shown.join(", "))
                }
            }
        }
    }

    /// Who made the change, for display.
    pub fn actor_name(&self) -> &str {
        self.actor
            .as_ref()
            .and_then(|a| a.full_name.as_deref())
            .filter(|n| !n.is_empty())
            .unwrap_or("System")
    }
}
