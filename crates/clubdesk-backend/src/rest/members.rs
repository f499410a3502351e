//! The `members` table.

use async_trait::async_trait;
use reqwest::Method;

use clubdesk_core::AppError;
use clubdesk_core::result::AppResult;
use clubdesk_core::types::MemberId;
use clubdesk_entity::member::{Member, MemberDraft, MemberType};

use super::client::RestClient;
use crate::traits::MemberStore;

const RETURN_ROWS: (&str, &str) = ("Prefer", "return=representation");

fn first_row(rows: Vec<Member>, id: MemberId) -> AppResult<Member> {
    rows.into_iter()
        .next()
        .ok_or_else(|| AppError::not_found(format!("Member {id} not found")))
}

#[async_trait]
impl MemberStore for RestClient {
    async fn list(&self, member_type: MemberType) -> AppResult<Vec<Member>> {
        let path = format!("/rest/v1/members?select=*&member_type=eq.{member_type}&order=full_name.asc");
        self.call_json(Method::GET, &path, |b| b).await
    }

    async fn get(&self, id: MemberId) -> AppResult<Option<Member>> {
        let path = format!("/rest/v1/members?select=*&id=eq.{id}");
        let rows: Vec<Member> = self.call_json(Method::GET, &path, |b| b).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert(&self, draft: &MemberDraft) -> AppResult<Member> {
        let rows: Vec<Member> = self
            .call_json(Method::POST, "/rest/v1/members", |b| {
                b.header(RETURN_ROWS.0, RETURN_ROWS.1).json(draft)
            })
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::internal("Backend returned no row for the new member"))
    }

    async fn update(&self, id: MemberId, draft: &MemberDraft) -> AppResult<Member> {
        let path = format!("/rest/v1/members?id=eq.{id}");
        let rows = self
            .call_json(Method::PATCH, &path, |b| {
                b.header(RETURN_ROWS.0, RETURN_ROWS.1).json(draft)
            })
            .await?;
        first_row(rows, id)
    }

    async fn delete(&self, id: MemberId) -> AppResult<()> {
        let path = format!("/rest/v1/members?id=eq.{id}");
        let rows = self
            .call_json(Method::DELETE, &path, |b| b.header(RETURN_ROWS.0, RETURN_ROWS.1))
            .await?;
        first_row(rows, id).map(|_| ())
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

    fn member_row(id: MemberId, name: &str) -> serde_json::Value {
        json!({
            "id": id,
            "full_name": name,
            "id_no": null,
            "date_of_birth": "2002-08-19",
            "phone": "+255 700 000 002",
            "role": "Defender",
            "member_type": "player",
            "monthly_salary": 180000,
            "registration_fee": 15000,
            "created_at": "2025-01-10T08:00:00+00:00",
        })
    }

    #[tokio::test]
    async fn test_list_filters_type_and_orders_by_name() {
        let server = MockServer::start_async().await;
        let list = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/v1/members")
                    .query_param("member_type", "eq.player")
                    .query_param("order", "full_name.asc");
                then.status(200).json_body(json!([member_row(MemberId::new(), "Baraka")]));
            })
            .await;

        let client = testing::client(&server.base_url());
        let members = MemberStore::list(&client, MemberType::Player).await.unwrap();
        list.assert_async().await;
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].registration_fee, 15_000.0);
    }

    #[tokio::test]
    async fn test_insert_posts_draft() {
        let server = MockServer::start_async().await;
        let id = MemberId::new();
        let insert = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/rest/v1/members")
                    .header("prefer", "return=representation")
                    .json_body(json!({
                        "full_name": "Baraka",
                        "id_no": null,
                        "date_of_birth": "2002-08-19",
                        "phone": "+255 700 000 002",
                        "role": "Defender",
                        "member_type": "player",
                        "monthly_salary": 180000.0,
                        "registration_fee": 15000.0,
                    }));
                then.status(201).json_body(json!([member_row(id, "Baraka")]));
            })
            .await;

        let client = testing::client(&server.base_url());
        let draft = MemberDraft {
            full_name: "Baraka".into(),
            id_no: None,
            date_of_birth: NaiveDate::from_ymd_opt(2002, 8, 19).unwrap(),
            phone: "+255 700 000 002".into(),
            role: "Defender".into(),
            member_type: MemberType::Player,
            monthly_salary: 180_000.0,
            registration_fee: 15_000.0,
        };
        let member = MemberStore::insert(&client, &draft).await.unwrap();
        insert.assert_async().await;
        assert_eq!(member.id, id);
    }

    #[tokio::test]
    async fn test_delete_of_missing_row_is_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/rest/v1/members");
                then.status(200).json_body(json!([]));
            })
            .await;

        let client = testing::client(&server.base_url());
        let err = MemberStore::delete(&client, MemberId::new()).await.unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
    }
}
