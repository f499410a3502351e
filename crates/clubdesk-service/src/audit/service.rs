//! Read access to the audit trail.

use std::sync::Arc;

use tracing::debug;

use clubdesk_auth::rbac::{Capability, RbacEnforcer};
use clubdesk_backend::traits::AuditLogStore;
use clubdesk_core::result::AppResult;
use clubdesk_entity::audit::AuditLogEntry;

use crate::context::ActorContext;

/// How many entries the audit view loads.
pub const DEFAULT_LIMIT: usize = 200;

/// Audit log reads, gated on `ViewAuditLog`.
#[derive(Debug, Clone)]
pub struct AuditService {
    store: Arc<dyn AuditLogStore>,
    rbac: RbacEnforcer,
}

impl AuditService {
    /// Creates a new audit service.
    pub fn new(store: Arc<dyn AuditLogStore>) -> Self {
        Self {
            store,
            rbac: RbacEnforcer::new(),
        }
    }

    /// The most recent `limit` changes, newest first.
    pub async fn list(&self, ctx: &ActorContext, limit: usize) -> AppResult<Vec<AuditLogEntry>> {
        self.rbac.require(ctx.role, Capability::ViewAuditLog)?;
        let entries = self.store.list(limit).await?;
        debug!(actor_id = %ctx.user_id, count = entries.len(), "Audit log read");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use clubdesk_backend::memory::MemoryAuditLog;
    use clubdesk_core::ErrorKind;
    use clubdesk_core::types::UserId;
    use clubdesk_entity::audit::AuditAction;
    use clubdesk_entity::user::Role;

    fn actor(role: Option<Role>) -> ActorContext {
        ActorContext {
            user_id: UserId::new(),
            email: "actor@fahari.fc".into(),
            full_name: None,
            role,
            acted_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_only_admin_reads_log() {
        let log = MemoryAuditLog::new();
        log.record("members", "m-1".into(), AuditAction::Insert, None, None)
            .await;
        let service = AuditService::new(Arc::new(log));

        let entries = service
            .list(&actor(Some(Role::Admin)), DEFAULT_LIMIT)
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].actor_name(), "System");

        for role in [Some(Role::Staff), Some(Role::Finance), None] {
            let err = service.list(&actor(role), DEFAULT_LIMIT).await.unwrap_err();
            assert!(err.is(ErrorKind::PermissionDenied));
        }
    }
}
