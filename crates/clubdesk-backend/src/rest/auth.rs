//! Credential provider over the hosted auth API.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use clubdesk_core::events::AuthEvent;
use clubdesk_core::result::AppResult;
use clubdesk_core::types::Identity;
use clubdesk_core::{AppError, ErrorKind};

use super::client::{ProviderSession, RestClient};
use super::error::Endpoint;
use super::rows::{TokenResponse, UserRow};
use crate::traits::CredentialStore;

impl RestClient {
    /// Exchange the refresh token for a new access token.
    ///
    /// Emits [`AuthEvent::TokenRefreshed`] on success. Returns `None` when
    /// there is no refreshable session. A rejected refresh token ends the
    /// session and emits [`AuthEvent::SignedOut`].
    pub async fn refresh_session(&self) -> AppResult<Option<Identity>> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    /// Renew the access token after `stale` was rejected.
    ///
    /// When another task already replaced `stale`, its session is reused
    /// instead of spending the refresh token a second time.
    pub(crate) async fn renew_token(&self, stale: &str) -> AppResult<Option<Identity>> {
        let _guard = self.refresh_lock.lock().await;
        match self.access_token().await {
            None => Ok(None),
            Some(current) if current != stale => Ok(self.session_identity().await),
            Some(_) => self.refresh_locked().await,
        }
    }

    async fn refresh_locked(&self) -> AppResult<Option<Identity>> {
        let Some(refresh_token) = self
            .session
            .read()
            .await
            .as_ref()
            .and_then(|s| s.refresh_token.clone())
        else {
            return Ok(None);
        };

        let builder = self
            .request_with_token(
                Method::POST,
                "/auth/v1/token?grant_type=refresh_token",
                self.anon_key(),
            )
            .json(&json!({ "refresh_token": refresh_token }));
        let token: TokenResponse = match self.send_json(Endpoint::Token, builder).await {
            Ok(token) => token,
            Err(e) if e.is(ErrorKind::InvalidCredentials) => {
                warn!(error = %e.message, "Refresh token rejected, ending provider session");
                *self.session.write().await = None;
                self.emit(AuthEvent::SignedOut);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let identity = self.store_session(token).await;
        debug!(user_id = %identity.id, "Access token renewed");
        self.emit(AuthEvent::TokenRefreshed {
            identity: identity.clone(),
        });
        Ok(Some(identity))
    }

    async fn store_session(&self, token: TokenResponse) -> Identity {
        let identity = token.user.into_identity();
        *self.session.write().await = Some(ProviderSession {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            identity: identity.clone(),
        });
        identity
    }
}

#[async_trait]
impl CredentialStore for RestClient {
    async fn current_session(&self) -> AppResult<Option<Identity>> {
        let Some(token) = self.access_token().await else {
            return Ok(None);
        };

        let builder = self.request_with_token(Method::GET, "/auth/v1/user", &token);
        match self.send_json::<UserRow>(Endpoint::Data, builder).await {
            Ok(user) => {
                let identity = user.into_identity();
                if let Some(session) = self.session.write().await.as_mut() {
                    session.identity = identity.clone();
                }
                Ok(Some(identity))
            }
            Err(e) if e.is(ErrorKind::NotAuthenticated) => self.renew_token(&token).await,
            Err(e) => Err(e),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<Identity> {
        let builder = self
            .request_with_token(
                Method::POST,
                "/auth/v1/token?grant_type=password",
                self.anon_key(),
            )
            .json(&json!({ "email": email.trim(), "password": password }));
        let token: TokenResponse = self.send_json(Endpoint::Token, builder).await?;

        let identity = self.store_session(token).await;
        info!(user_id = %identity.id, "Provider session established");
        self.emit(AuthEvent::SignedIn {
            identity: identity.clone(),
        });
        Ok(identity)
    }

    async fn sign_out(&self) -> AppResult<()> {
        let Some(session) = self.session.write().await.take() else {
            return Ok(());
        };

        let builder =
            self.request_with_token(Method::POST, "/auth/v1/logout", &session.access_token);
        match self.send(Endpoint::Data, builder).await {
            Ok(_) => {}
            // An already-expired token is as signed out as it gets.
            Err(e) if e.is(ErrorKind::NotAuthenticated) || e.is(ErrorKind::NotFound) => {
                warn!(user_id = %session.identity.id, "Logout with an expired token");
            }
            Err(e) => return Err(e),
        }
        self.emit(AuthEvent::SignedOut);
        Ok(())
    }

    async fn update_password(&self, new_password: &str) -> AppResult<()> {
        if self.session.read().await.is_none() {
            return Err(AppError::not_authenticated("Auth session missing"));
        }

        let body = json!({ "password": new_password });
        let user: UserRow = self
            .call_json(Method::PUT, "/auth/v1/user", |b| b.json(&body))
            .await?;

        let identity = user.into_identity();
        self.emit(AuthEvent::UserUpdated { identity });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use uuid::Uuid;

    use crate::rest::client::testing;

    fn token_body(access: &str, user_id: Uuid) -> serde_json::Value {
        json!({
            "access_token": access,
            "refresh_token": "refresh-1",
            "token_type": "bearer",
            "user": {
                "id": user_id,
                "email": "staff@fahari.fc",
                "user_metadata": { "full_name": "Asha Mrisho" },
            },
        })
    }

    #[tokio::test]
    async fn test_password_grant_stores_session() {
        let server = MockServer::start_async().await;
        let user_id = Uuid::new_v4();
        let grant = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/auth/v1/token")
                    .query_param("grant_type", "password")
                    .header("apikey", "anon")
                    .json_body(json!({ "email": "staff@fahari.fc", "password": "secret1" }));
                then.status(200).json_body(token_body("access-1", user_id));
            })
            .await;

        let client = testing::client(&server.base_url());
        let mut events = client.subscribe();
        let identity = client
            .sign_in_with_password(" staff@fahari.fc ", "secret1")
            .await
            .unwrap();

        grant.assert_async().await;
        assert_eq!(identity.id.0, user_id);
        assert_eq!(identity.full_name.as_deref(), Some("Asha Mrisho"));
        assert_eq!(client.access_token().await.as_deref(), Some("access-1"));
        assert_eq!(
            events.try_recv().unwrap(),
            AuthEvent::SignedIn { identity }
        );
    }

    #[tokio::test]
    async fn test_password_grant_rejection_keeps_provider_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/v1/token");
                then.status(400).json_body(json!({
                    "error": "invalid_grant",
                    "error_description": "Invalid login credentials",
                }));
            })
            .await;

        let client = testing::client(&server.base_url());
        let err = client
            .sign_in_with_password("staff@fahari.fc", "wrong")
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::InvalidCredentials));
        assert_eq!(err.message, "Invalid login credentials");
        assert!(client.access_token().await.is_none());
    }

    #[tokio::test]
    async fn test_logout_sends_session_token() {
        let server = MockServer::start_async().await;
        let logout = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/auth/v1/logout")
                    .header("authorization", "Bearer access-1");
                then.status(204);
            })
            .await;

        let client = testing::client(&server.base_url());
        testing::signed_in(&client, "access-1", None).await;
        let mut events = client.subscribe();

        client.sign_out().await.unwrap();
        logout.assert_async().await;
        assert!(client.access_token().await.is_none());
        assert_eq!(events.try_recv().unwrap(), AuthEvent::SignedOut);

        // Nothing left to end.
        client.sign_out().await.unwrap();
        logout.assert_calls_async(1).await;
    }

    #[tokio::test]
    async fn test_logout_with_expired_token_still_signs_out() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/v1/logout");
                then.status(401).json_body(json!({ "message": "JWT expired" }));
            })
            .await;

        let client = testing::client(&server.base_url());
        testing::signed_in(&client, "expired", None).await;
        let mut events = client.subscribe();

        client.sign_out().await.unwrap();
        assert!(client.access_token().await.is_none());
        assert_eq!(events.try_recv().unwrap(), AuthEvent::SignedOut);
    }

    #[tokio::test]
    async fn test_logout_server_error_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/v1/logout");
                then.status(503);
            })
            .await;

        let client = testing::client(&server.base_url());
        testing::signed_in(&client, "access-1", None).await;

        let err = client.sign_out().await.unwrap_err();
        assert!(err.is(ErrorKind::BackendUnavailable));
        // The local tokens are dropped either way.
        assert!(client.access_token().await.is_none());
    }

    #[tokio::test]
    async fn test_current_session_refreshes_expired_token() {
        let server = MockServer::start_async().await;
        let user_id = Uuid::new_v4();
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/auth/v1/user")
                    .header("authorization", "Bearer expired");
                then.status(401).json_body(json!({ "message": "JWT expired" }));
            })
            .await;
        let refresh = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/auth/v1/token")
                    .query_param("grant_type", "refresh_token")
                    .json_body(json!({ "refresh_token": "r1" }));
                then.status(200).json_body(token_body("access-2", user_id));
            })
            .await;

        let client = testing::client(&server.base_url());
        testing::signed_in(&client, "expired", Some("r1")).await;

        let identity = client.current_session().await.unwrap().unwrap();
        refresh.assert_async().await;
        assert_eq!(identity.id.0, user_id);
        assert_eq!(client.access_token().await.as_deref(), Some("access-2"));
    }

    #[tokio::test]
    async fn test_update_password_requires_session() {
        let server = MockServer::start_async().await;
        let update = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/auth/v1/user")
                    .header("authorization", "Bearer access-1")
                    .json_body(json!({ "password": "n3w-secret" }));
                then.status(200).json_body(json!({
                    "id": Uuid::new_v4(),
                    "email": "admin@fahari.fc",
                }));
            })
            .await;

        let client = testing::client(&server.base_url());
        let err = client.update_password("n3w-secret").await.unwrap_err();
        assert!(err.is(ErrorKind::NotAuthenticated));
        update.assert_calls_async(0).await;

        testing::signed_in(&client, "access-1", None).await;
        let mut events = client.subscribe();
        client.update_password("n3w-secret").await.unwrap();
        update.assert_async().await;
        assert!(matches!(
            events.try_recv(),
            Ok(AuthEvent::UserUpdated { .. })
        ));
    }
}
