//! In-memory contract table.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use clubdesk_core::AppError;
use clubdesk_core::result::AppResult;
use clubdesk_core::types::ContractId;
use clubdesk_entity::contract::{Contract, ContractDraft, ContractStatusChange, ContractType};

use crate::traits::ContractStore;

/// In-memory [`ContractStore`]. Contract numbers are unique, as the
/// hosted table's constraint makes them.
#[derive(Debug, Clone, Default)]
pub struct MemoryContractStore {
    contracts: Arc<DashMap<ContractId, Contract>>,
}

impl MemoryContractStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn number_taken(&self, contract_no: &str, except: Option<ContractId>) -> bool {
        self.contracts
            .iter()
            .any(|c| c.contract_no == contract_no && Some(c.id) != except)
    }

    fn modify(
        &self,
        id: ContractId,
        apply: impl FnOnce(&mut Contract),
    ) -> AppResult<Contract> {
        let mut contract = self
            .contracts
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Contract {id} not found")))?;
        apply(&mut contract);
        contract.updated_at = Some(Utc::now());
        Ok(contract.clone())
    }
}

#[async_trait]
impl ContractStore for MemoryContractStore {
    async fn list(&self, contract_type: Option<ContractType>) -> AppResult<Vec<Contract>> {
        let mut contracts: Vec<Contract> = self
            .contracts
            .iter()
            .filter(|c| contract_type.is_none_or(|t| c.contract_type == t))
            .map(|c| c.clone())
            .collect();
        contracts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(contracts)
    }

    async fn count_by_type(&self, contract_type: ContractType) -> AppResult<u64> {
        Ok(self
            .contracts
            .iter()
            .filter(|c| c.contract_type == contract_type)
            .count() as u64)
    }

    async fn insert(
        &self,
        contract_no: &str,
        draft: &ContractDraft,
        terminated_at: Option<DateTime<Utc>>,
    ) -> AppResult<Contract> {
        if self.number_taken(contract_no, None) {
            return Err(AppError::conflict(format!(
                "Contract number '{contract_no}' already exists"
            )));
        }

        let now = Utc::now();
        let contract = Contract {
            id: ContractId::new(),
            member_id: draft.member_id,
            contract_no: contract_no.to_string(),
            contract_type: draft.contract_type,
            position_title: draft.position_title.clone(),
            start_date: draft.start_date,
            end_date: draft.end_date,
            monthly_allowance: draft.monthly_allowance,
            registration_fee: draft.registration_fee,
            status: draft.status,
            notes: draft.notes.clone(),
            termination_reason: None,
            terminated_at,
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.contracts.insert(contract.id, contract.clone());
        Ok(contract)
    }

    async fn update(
        &self,
        id: ContractId,
        draft: &ContractDraft,
        terminated_at: Option<DateTime<Utc>>,
    ) -> AppResult<Contract> {
        self.modify(id, |c| {
            c.member_id = draft.member_id;
            c.contract_type = draft.contract_type;
            c.position_title = draft.position_title.clone();
            c.start_date = draft.start_date;
            c.end_date = draft.end_date;
            c.monthly_allowance = draft.monthly_allowance;
            c.registration_fee = draft.registration_fee;
            c.status = draft.status;
            c.notes = draft.notes.clone();
            c.terminated_at = terminated_at;
        })
    }

    async fn set_status(
        &self,
        id: ContractId,
        change: &ContractStatusChange,
    ) -> AppResult<Contract> {
        self.modify(id, |c| {
            c.status = change.status;
            c.termination_reason = change.termination_reason.clone();
            c.terminated_at = change.terminated_at;
        })
    }
}
