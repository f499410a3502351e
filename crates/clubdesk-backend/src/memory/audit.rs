//! In-memory audit trail.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use clubdesk_core::result::AppResult;
use clubdesk_core::types::AuditLogId;
use clubdesk_entity::audit::{AuditAction, AuditLogEntry};

use crate::traits::AuditLogStore;

type Row = serde_json::Map<String, serde_json::Value>;

/// In-memory [`AuditLogStore`]. Other memory stores append to it the way
/// the hosted backend's table triggers do.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditLog {
    entries: Arc<RwLock<Vec<AuditLogEntry>>>,
}

impl MemoryAuditLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a change made by the system.
    pub async fn record(
        &self,
        table_name: &str,
        record_id: String,
        action: AuditAction,
        old_data: Option<Row>,
        new_data: Option<Row>,
    ) {
        self.entries.write().await.push(AuditLogEntry {
            id: AuditLogId::new(),
            table_name: table_name.to_string(),
            record_id,
            action,
            changed_at: Utc::now(),
            changed_by: None,
            old_data,
            new_data,
            actor: None,
        });
    }
}

#[async_trait]
impl AuditLogStore for MemoryAuditLog {
    async fn list(&self, limit: usize) -> AppResult<Vec<AuditLogEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.iter().rev().take(limit).cloned().collect())
    }
}

/// Serialize a row for the audit trail.
pub(crate) fn audit_row<T: serde::Serialize>(value: &T) -> Option<Row> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(map)) => Some(map),
        _ => None,
    }
}
