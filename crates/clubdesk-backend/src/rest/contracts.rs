//! The `contracts` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;

use clubdesk_core::AppError;
use clubdesk_core::result::AppResult;
use clubdesk_core::types::ContractId;
use clubdesk_entity::contract::{Contract, ContractDraft, ContractStatusChange, ContractType};

use super::client::RestClient;
use super::rows::{ContractPayload, parse_content_range_total};
use crate::traits::ContractStore;

const RETURN_ROWS: (&str, &str) = ("Prefer", "return=representation");

impl RestClient {
    async fn patch_contract<B: serde::Serialize + Sync>(
        &self,
        id: ContractId,
        body: &B,
    ) -> AppResult<Contract> {
        let rows: Vec<Contract> = self
            .call_json(Method::PATCH, &format!("/rest/v1/contracts?id=eq.{id}"), |b| {
                b.header(RETURN_ROWS.0, RETURN_ROWS.1).json(body)
            })
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::not_found(format!("Contract {id} not found")))
    }
}

#[async_trait]
impl ContractStore for RestClient {
    async fn list(&self, contract_type: Option<ContractType>) -> AppResult<Vec<Contract>> {
        let mut path = "/rest/v1/contracts?select=*&order=created_at.desc".to_string();
        if let Some(t) = contract_type {
            path.push_str(&format!("&contract_type=eq.{t}"));
        }
        self.call_json(Method::GET, &path, |b| b).await
    }

    async fn count_by_type(&self, contract_type: ContractType) -> AppResult<u64> {
        let path = format!("/rest/v1/contracts?select=id&contract_type=eq.{contract_type}");
        let response = self
            .call(Method::HEAD, &path, |b| b.header("Prefer", "count=exact"))
            .await?;

        response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total)
            .ok_or_else(|| AppError::internal("Backend did not return a contract count"))
    }

    async fn insert(
        &self,
        contract_no: &str,
        draft: &ContractDraft,
        terminated_at: Option<DateTime<Utc>>,
    ) -> AppResult<Contract> {
        let payload = ContractPayload {
            contract_no: Some(contract_no),
            draft,
            terminated_at,
            updated_at: Utc::now(),
        };
        let rows: Vec<Contract> = self
            .call_json(Method::POST, "/rest/v1/contracts", |b| {
                b.header(RETURN_ROWS.0, RETURN_ROWS.1).json(&payload)
            })
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::internal("Backend returned no row for the new contract"))
    }

    async fn update(
        &self,
        id: ContractId,
        draft: &ContractDraft,
        terminated_at: Option<DateTime<Utc>>,
    ) -> AppResult<Contract> {
        let payload = ContractPayload {
            contract_no: None,
            draft,
            terminated_at,
            updated_at: Utc::now(),
        };
        self.patch_contract(id, &payload).await
    }

    async fn set_status(
        &self,
        id: ContractId,
        change: &ContractStatusChange,
    ) -> AppResult<Contract> {
        let body = serde_json::json!({
            "status": change.status,
            "termination_reason": change.termination_reason.clone().unwrap_or_default(),
            "terminated_at": change.terminated_at,
            "updated_at": Utc::now(),
        });
        self.patch_contract(id, &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use clubdesk_core::ErrorKind;
    use clubdesk_core::types::MemberId;
    use clubdesk_entity::contract::ContractStatus;
    use httpmock::Method::HEAD;
    use httpmock::prelude::*;
    use serde_json::json;

    use crate::rest::client::testing;

    fn draft() -> ContractDraft {
        ContractDraft {
            member_id: MemberId::new(),
            contract_type: ContractType::Player,
            position_title: Some("Striker".into()),
            start_date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
            monthly_allowance: 250_000.0,
            registration_fee: 20_000.0,
            status: ContractStatus::Draft,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_count_reads_content_range() {
        let server = MockServer::start_async().await;
        let head = server
            .mock_async(|when, then| {
                when.method(HEAD)
                    .path("/rest/v1/contracts")
                    .query_param("contract_type", "eq.staff")
                    .header("prefer", "count=exact");
                then.status(200).header("content-range", "*/4");
            })
            .await;

        let client = testing::client(&server.base_url());
        let count = client.count_by_type(ContractType::Staff).await.unwrap();
        head.assert_async().await;
        assert_eq!(count, 4);
    }

    #[tokio::test]
    async fn test_duplicate_number_is_conflict() {
        let server = MockServer::start_async().await;
        let insert = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/rest/v1/contracts")
                    .header("prefer", "return=representation")
                    .body_includes("\"contract_no\":\"FFC-PLY-2025-003\"");
                then.status(409).json_body(json!({
                    "code": "23505",
                    "message": "duplicate key value violates unique constraint \"contracts_contract_no_key\"",
                }));
            })
            .await;

        let client = testing::client(&server.base_url());
        let err = ContractStore::insert(&client, "FFC-PLY-2025-003", &draft(), None)
            .await
            .unwrap_err();
        insert.assert_async().await;
        assert!(err.is(ErrorKind::Conflict));
    }
}
