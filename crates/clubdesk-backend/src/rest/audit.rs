//! The read-only `audit_logs` table.

use async_trait::async_trait;
use reqwest::Method;

use clubdesk_core::result::AppResult;
use clubdesk_entity::audit::AuditLogEntry;

use super::client::RestClient;
use super::rows::{AUDIT_COLUMNS, AuditRow};
use crate::traits::AuditLogStore;

#[async_trait]
impl AuditLogStore for RestClient {
    async fn list(&self, limit: usize) -> AppResult<Vec<AuditLogEntry>> {
        let path =
            format!("/rest/v1/audit_logs?select={AUDIT_COLUMNS}&order=changed_at.desc&limit={limit}");
        let rows: Vec<AuditRow> = self.call_json(Method::GET, &path, |b| b).await?;
        Ok(rows.into_iter().map(AuditRow::narrow).collect())
    }
}
