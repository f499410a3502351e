//! The payment, expense, and income tables.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};

use clubdesk_core::AppError;
use clubdesk_core::result::AppResult;
use clubdesk_core::types::{LedgerEntryId, MemberId};
use clubdesk_entity::finance::{LedgerCategory, LedgerDraft, LedgerEntry};

use super::client::RestClient;
use super::rows::{ledger_entry_from_row, ledger_row_from_draft};
use crate::traits::LedgerStore;

type Row = serde_json::Map<String, serde_json::Value>;

const RETURN_ROWS: (&str, &str) = ("Prefer", "return=representation");

impl RestClient {
    async fn ledger_rows<F>(
        &self,
        category: LedgerCategory,
        method: Method,
        path: &str,
        build: F,
    ) -> AppResult<Vec<LedgerEntry>>
    where
        F: Fn(RequestBuilder) -> RequestBuilder + Send + Sync,
    {
        let rows: Vec<Row> = self.call_json(method, path, build).await?;
        rows.into_iter()
            .map(|row| ledger_entry_from_row(category, row))
            .collect()
    }

    async fn single_ledger_row<F>(
        &self,
        category: LedgerCategory,
        id: Option<LedgerEntryId>,
        method: Method,
        path: &str,
        build: F,
    ) -> AppResult<LedgerEntry>
    where
        F: Fn(RequestBuilder) -> RequestBuilder + Send + Sync,
    {
        self.ledger_rows(category, method, path, build)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| match id {
                Some(id) => AppError::not_found(format!("{category} entry {id} not found")),
                None => AppError::internal(format!("Backend returned no {category} row")),
            })
    }
}

#[async_trait]
impl LedgerStore for RestClient {
    async fn list(&self, category: LedgerCategory) -> AppResult<Vec<LedgerEntry>> {
        let path = format!(
            "/rest/v1/{}?select=*&order={}.desc",
            category.table(),
            category.date_column()
        );
        self.ledger_rows(category, Method::GET, &path, |b| b).await
    }

    async fn list_for_member(
        &self,
        category: LedgerCategory,
        member_id: MemberId,
    ) -> AppResult<Vec<LedgerEntry>> {
        let path = format!(
            "/rest/v1/{}?select=*&member_id=eq.{member_id}&order={}.desc",
            category.table(),
            category.date_column()
        );
        self.ledger_rows(category, Method::GET, &path, |b| b).await
    }

    async fn insert(
        &self,
        category: LedgerCategory,
        draft: &LedgerDraft,
    ) -> AppResult<LedgerEntry> {
        let row = ledger_row_from_draft(category, draft);
        let path = format!("/rest/v1/{}", category.table());
        self.single_ledger_row(category, None, Method::POST, &path, |b| {
            b.header(RETURN_ROWS.0, RETURN_ROWS.1).json(&row)
        })
        .await
    }

    async fn update(
        &self,
        category: LedgerCategory,
        id: LedgerEntryId,
        draft: &LedgerDraft,
    ) -> AppResult<LedgerEntry> {
        let row = ledger_row_from_draft(category, draft);
        let path = format!("/rest/v1/{}?id=eq.{id}", category.table());
        self.single_ledger_row(category, Some(id), Method::PATCH, &path, |b| {
            b.header(RETURN_ROWS.0, RETURN_ROWS.1).json(&row)
        })
        .await
    }

    async fn delete(&self, category: LedgerCategory, id: LedgerEntryId) -> AppResult<()> {
        let path = format!("/rest/v1/{}?id=eq.{id}", category.table());
        self.single_ledger_row(category, Some(id), Method::DELETE, &path, |b| {
            b.header(RETURN_ROWS.0, RETURN_ROWS.1)
        })
        .await
        .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use clubdesk_core::ErrorKind;
    use httpmock::prelude::*;
    use serde_json::json;

    use crate::rest::client::testing;

    #[tokio::test]
    async fn test_member_payments_query() {
        let server = MockServer::start_async().await;
        let member_id = MemberId::new();
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/v1/salary_payments")
                    .query_param("member_id", format!("eq.{member_id}"))
                    .query_param("order", "payment_date.desc");
                then.status(200).json_body(json!([{
                    "id": uuid::Uuid::new_v4().to_string(),
                    "member_id": member_id,
                    "amount": 300000,
                    "payment_date": "2025-05-31",
                    "month": "May 2025",
                }]));
            })
            .await;

        let client = testing::client(&server.base_url());
        let entries = client
            .list_for_member(LedgerCategory::SalaryPayment, member_id)
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(entries[0].member_id(), Some(member_id));
        assert_eq!(entries[0].details["month"], "May 2025");
    }

    #[tokio::test]
    async fn test_insert_writes_date_column() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/rest/v1/club_income")
                    .header("prefer", "return=representation")
                    .json_body(json!({
                        "amount": 500000.0,
                        "income_date": "2025-04-01",
                        "notes": null,
                    }));
                then.status(201).json_body(json!([{
                    "id": uuid::Uuid::new_v4().to_string(),
                    "amount": 500000,
                    "income_date": "2025-04-01",
                }]));
            })
            .await;

        let client = testing::client(&server.base_url());
        let draft = LedgerDraft::new(500_000.0, NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
        let entry = LedgerStore::insert(&client, LedgerCategory::Income, &draft)
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(entry.amount, 500_000.0);
    }

    #[tokio::test]
    async fn test_delete_without_returned_row_is_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/rest/v1/other_expenses");
                then.status(200).json_body(json!([]));
            })
            .await;

        let client = testing::client(&server.base_url());
        let err = LedgerStore::delete(&client, LedgerCategory::OtherExpense, LedgerEntryId::new())
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
    }
}
