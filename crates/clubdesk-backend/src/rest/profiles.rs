//! Profile rows and the admin RPCs.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;
use uuid::Uuid;

use clubdesk_core::result::AppResult;
use clubdesk_core::types::UserId;
use clubdesk_entity::user::{CreateUser, UpdateUser, UserProfile};

use super::client::RestClient;
use super::rows::{PROFILE_COLUMNS, ProfileRow};
use crate::traits::ProfileStore;

impl RestClient {
    async fn rpc(&self, function: &str, args: serde_json::Value) -> AppResult<reqwest::Response> {
        self.call(Method::POST, &format!("/rest/v1/rpc/{function}"), |b| {
            b.json(&args)
        })
        .await
    }
}

#[async_trait]
impl ProfileStore for RestClient {
    async fn get_profile(&self, user_id: UserId) -> AppResult<Option<UserProfile>> {
        let path = format!("/rest/v1/user_profiles?select={PROFILE_COLUMNS}&id=eq.{user_id}");
        let rows: Vec<ProfileRow> = self.call_json(Method::GET, &path, |b| b).await?;
        Ok(rows.into_iter().next().map(ProfileRow::narrow))
    }

    async fn list_profiles(&self) -> AppResult<Vec<UserProfile>> {
        let path = format!("/rest/v1/user_profiles?select={PROFILE_COLUMNS}&order=created_at.desc");
        let rows: Vec<ProfileRow> = self.call_json(Method::GET, &path, |b| b).await?;
        Ok(rows.into_iter().map(ProfileRow::narrow).collect())
    }

    async fn set_active(
        &self,
        user_id: UserId,
        is_active: bool,
        reason: Option<&str>,
    ) -> AppResult<()> {
        self.rpc(
            "admin_set_user_active",
            json!({
                "p_user_id": user_id,
                "p_is_active": is_active,
                "p_reason": reason,
            }),
        )
        .await?;
        Ok(())
    }

    async fn create_user(&self, user: &CreateUser) -> AppResult<UserId> {
        let response = self
            .rpc(
                "admin_create_user",
                json!({
                    "p_email": user.email.trim(),
                    "p_password": user.password,
                    "p_full_name": user.full_name.trim(),
                    "p_role": user.role,
                }),
            )
            .await?;
        let id: Uuid = response.json().await.map_err(|e| {
            clubdesk_core::AppError::with_source(
                clubdesk_core::ErrorKind::Serialization,
                format!("admin_create_user returned an unexpected body: {e}"),
                e,
            )
        })?;
        Ok(UserId::from_uuid(id))
    }

    async fn update_user(&self, user_id: UserId, update: &UpdateUser) -> AppResult<()> {
        self.rpc(
            "admin_update_user",
            json!({
                "p_user_id": user_id,
                "p_email": update.email.trim(),
                "p_full_name": update.full_name.trim(),
                "p_role": update.role,
                "p_is_active": update.is_active,
            }),
        )
        .await?;
        Ok(())
    }

    async fn reset_password(&self, user_id: UserId, new_password: &str) -> AppResult<()> {
        self.rpc(
            "admin_reset_user_password",
            json!({
                "p_user_id": user_id,
                "p_new_password": new_password,
            }),
        )
        .await?;
        Ok(())
    }
}
