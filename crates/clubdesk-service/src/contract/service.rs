//! Contract listing, numbering, and lifecycle transitions.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use tracing::info;

use clubdesk_auth::rbac::{Capability, RbacEnforcer};
use clubdesk_backend::traits::ContractStore;
use clubdesk_core::result::AppResult;
use clubdesk_core::types::ContractId;
use clubdesk_entity::contract::{
    Contract, ContractDraft, ContractNumber, ContractStatus, ContractStatusChange, ContractType,
};

use crate::context::ActorContext;

/// Contract operations. Creating needs `ManageOperations`; changing an
/// existing contract needs `AdminOperations`.
#[derive(Debug, Clone)]
pub struct ContractService {
    /// Contract table.
    store: Arc<dyn ContractStore>,
    /// RBAC enforcer.
    rbac: RbacEnforcer,
}

impl ContractService {
    /// Creates a new contract service.
    pub fn new(store: Arc<dyn ContractStore>) -> Self {
        Self {
            store,
            rbac: RbacEnforcer::new(),
        }
    }

    /// Lists contracts, newest first, optionally of one type.
    pub async fn list(
        &self,
        ctx: &ActorContext,
        contract_type: Option<ContractType>,
    ) -> AppResult<Vec<Contract>> {
        self.rbac.require(ctx.role, Capability::ViewOperations)?;
        self.store.list(contract_type).await
    }

    /// Creates a contract under the next number for its type and year.
    ///
    /// Two concurrent creates can compute the same number; the store's
    /// unique constraint turns the loser into a `Conflict`.
    pub async fn create(&self, ctx: &ActorContext, draft: ContractDraft) -> AppResult<Contract> {
        self.rbac.require(ctx.role, Capability::ManageOperations)?;
        draft.validate()?;

        let existing = self.store.count_by_type(draft.contract_type).await?;
        let number = ContractNumber::next(draft.contract_type, ctx.acted_at.year(), existing);
        let contract = self
            .store
            .insert(&number.to_string(), &draft, termination_stamp(&draft, ctx.acted_at))
            .await?;

        info!(
            actor_id = %ctx.user_id,
            contract_id = %contract.id,
            contract_no = %contract.contract_no,
            "Contract created"
        );
        Ok(contract)
    }

    /// Replaces the editable fields of a contract.
    pub async fn update(
        &self,
        ctx: &ActorContext,
        id: ContractId,
        draft: ContractDraft,
    ) -> AppResult<Contract> {
        self.rbac.require(ctx.role, Capability::AdminOperations)?;
        draft.validate()?;

        let contract = self
            .store
            .update(id, &draft, termination_stamp(&draft, ctx.acted_at))
            .await?;

        info!(actor_id = %ctx.user_id, contract_id = %id, status = %contract.status, "Contract updated");
        Ok(contract)
    }

    /// Ends a contract now, recording the reason.
    pub async fn terminate(
        &self,
        ctx: &ActorContext,
        id: ContractId,
        reason: Option<String>,
    ) -> AppResult<Contract> {
        self.rbac.require(ctx.role, Capability::AdminOperations)?;

        let change = ContractStatusChange::terminate(reason, ctx.acted_at);
        let contract = self.store.set_status(id, &change).await?;

        info!(actor_id = %ctx.user_id, contract_id = %id, "Contract terminated");
        Ok(contract)
    }

    /// Puts a contract in force and clears any termination.
    pub async fn activate(&self, ctx: &ActorContext, id: ContractId) -> AppResult<Contract> {
        self.rbac.require(ctx.role, Capability::AdminOperations)?;

        let contract = self
            .store
            .set_status(id, &ContractStatusChange::activate())
            .await?;

        info!(actor_id = %ctx.user_id, contract_id = %id, "Contract activated");
        Ok(contract)
    }
}

fn termination_stamp(draft: &ContractDraft, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    (draft.status == ContractStatus::Terminated).then_some(now)
}
