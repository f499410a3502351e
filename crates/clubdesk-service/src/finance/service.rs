//! Finance ledger operations with the two-tier finance permission.

use std::sync::Arc;

use tracing::{debug, info};

use clubdesk_auth::rbac::{Capability, RbacEnforcer};
use clubdesk_backend::traits::LedgerStore;
use clubdesk_core::result::AppResult;
use clubdesk_core::types::LedgerEntryId;
use clubdesk_entity::finance::{FinanceSummary, LedgerCategory, LedgerDraft, LedgerEntry};

use crate::context::ActorContext;

/// Ledger operations. Finance and admin roles record entries; only
/// admins edit or delete them.
#[derive(Debug, Clone)]
pub struct FinanceService {
    /// Ledger tables.
    ledger: Arc<dyn LedgerStore>,
    /// RBAC enforcer.
    rbac: RbacEnforcer,
}

impl FinanceService {
    /// Creates a new finance service.
    pub fn new(ledger: Arc<dyn LedgerStore>) -> Self {
        Self {
            ledger,
            rbac: RbacEnforcer::new(),
        }
    }

    /// Lists one ledger, newest first.
    pub async fn list(
        &self,
        ctx: &ActorContext,
        category: LedgerCategory,
    ) -> AppResult<Vec<LedgerEntry>> {
        self.rbac.require(ctx.role, Capability::ViewFinance)?;
        self.ledger.list(category).await
    }

    /// Records a new entry.
    pub async fn record(
        &self,
        ctx: &ActorContext,
        category: LedgerCategory,
        draft: LedgerDraft,
    ) -> AppResult<LedgerEntry> {
        self.rbac.require(ctx.role, Capability::RecordFinance)?;
        draft.validate()?;

        let entry = self.ledger.insert(category, &draft).await?;
        info!(
            actor_id = %ctx.user_id,
            category = %category,
            entry_id = %entry.id,
            amount = entry.amount,
            "Ledger entry recorded"
        );
        Ok(entry)
    }

    /// Replaces an existing entry (admin).
    pub async fn edit(
        &self,
        ctx: &ActorContext,
        category: LedgerCategory,
        id: LedgerEntryId,
        draft: LedgerDraft,
    ) -> AppResult<LedgerEntry> {
        self.rbac.require(ctx.role, Capability::AdminFinance)?;
        draft.validate()?;

        let entry = self.ledger.update(category, id, &draft).await?;
        info!(actor_id = %ctx.user_id, category = %category, entry_id = %id, "Ledger entry edited");
        Ok(entry)
    }

    /// Removes an entry (admin).
    pub async fn delete(
        &self,
        ctx: &ActorContext,
        category: LedgerCategory,
        id: LedgerEntryId,
    ) -> AppResult<()> {
        self.rbac.require(ctx.role, Capability::AdminFinance)?;

        self.ledger.delete(category, id).await?;
        info!(actor_id = %ctx.user_id, category = %category, entry_id = %id, "Ledger entry deleted");
        Ok(())
    }

    /// Totals every ledger for the dashboard.
    pub async fn summary(&self, ctx: &ActorContext) -> AppResult<FinanceSummary> {
        self.rbac.require(ctx.role, Capability::ViewFinance)?;

        let mut summary = FinanceSummary::default();
        for category in LedgerCategory::ALL {
            for entry in self.ledger.list(category).await? {
                summary.add(&entry);
            }
        }
        debug!(net = summary.net_balance(), "Finance summary computed");
        Ok(summary)
    }
}
