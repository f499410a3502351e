//! HTTP plumbing shared by the store implementations.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, RwLock, broadcast};
use tracing::{debug, info};

use clubdesk_core::config::BackendConfig;
use clubdesk_core::events::AuthEvent;
use clubdesk_core::result::AppResult;
use clubdesk_core::types::Identity;
use clubdesk_core::{AppError, ErrorKind};

use super::error::{self, Endpoint};

const EVENT_CAPACITY: usize = 64;

/// Tokens of the live provider session.
#[derive(Debug, Clone)]
pub(crate) struct ProviderSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub identity: Identity,
}

/// Client for the hosted backend.
///
/// Cheap to clone; clones share the session and the event channel.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    pub(crate) session: Arc<RwLock<Option<ProviderSession>>>,
    /// Held while a refresh-token grant is in flight.
    pub(crate) refresh_lock: Arc<Mutex<()>>,
    pub(crate) events: broadcast::Sender<AuthEvent>,
}

impl RestClient {
    /// Create a client from configuration.
    pub fn new(config: &BackendConfig) -> AppResult<Self> {
        let base_url = config.url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(AppError::configuration("backend.url must not be empty"));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.timeout_seconds.min(10)))
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("clubdesk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Failed to build HTTP client: {e}"),
                    e,
                )
            })?;

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        info!(url = %base_url, "Hosted backend client ready");

        Ok(Self {
            http,
            base_url,
            anon_key: config.anon_key.clone(),
            session: Arc::new(RwLock::new(None)),
            refresh_lock: Arc::new(Mutex::new(())),
            events,
        })
    }

    /// Identity of the stored provider session, without asking the backend.
    pub(crate) async fn session_identity(&self) -> Option<Identity> {
        self.session.read().await.as_ref().map(|s| s.identity.clone())
    }

    /// Access token of the stored provider session.
    pub(crate) async fn access_token(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    pub(crate) fn anon_key(&self) -> &str {
        &self.anon_key
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Start a request with an explicit bearer token.
    pub(crate) fn request_with_token(
        &self,
        method: Method,
        path: &str,
        token: &str,
    ) -> RequestBuilder {
        debug!(%method, path, "Backend request");
        self.http
            .request(method, self.url(path))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
    }

    /// Send a request and turn failures into [`AppError`]s.
    pub(crate) async fn send(
        &self,
        endpoint: Endpoint,
        builder: RequestBuilder,
    ) -> AppResult<Response> {
        let response = builder.send().await.map_err(error::from_transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(error::from_response(endpoint, status, &body))
    }

    /// Send a request and decode a JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        builder: RequestBuilder,
    ) -> AppResult<T> {
        let response = self.send(endpoint, builder).await?;
        decode(response).await
    }

    /// Send a data request carrying the session token (or the anon key
    /// when signed out).
    ///
    /// `build` adds headers and body. A `401` on a signed-in request
    /// renews the access token and replays the request once.
    pub(crate) async fn call<F>(&self, method: Method, path: &str, build: F) -> AppResult<Response>
    where
        F: Fn(RequestBuilder) -> RequestBuilder + Send + Sync,
    {
        let token = self.access_token().await;
        let bearer = token.as_deref().unwrap_or(self.anon_key.as_str());
        let first = build(self.request_with_token(method.clone(), path, bearer));

        match self.send(Endpoint::Data, first).await {
            Err(e) if e.is(ErrorKind::NotAuthenticated) => {
                let Some(stale) = token else {
                    return Err(e);
                };
                if self.renew_token(&stale).await?.is_none() {
                    return Err(e);
                }
                let Some(fresh) = self.access_token().await else {
                    return Err(e);
                };
                debug!(path, "Replaying request with a renewed token");
                let retry = build(self.request_with_token(method, path, &fresh));
                self.send(Endpoint::Data, retry).await
            }
            other => other,
        }
    }

    /// [`call`](Self::call) and decode a JSON body.
    pub(crate) async fn call_json<T, F>(&self, method: Method, path: &str, build: F) -> AppResult<T>
    where
        T: DeserializeOwned,
        F: Fn(RequestBuilder) -> RequestBuilder + Send + Sync,
    {
        let response = self.call(method, path, build).await?;
        decode(response).await
    }

    pub(crate) fn emit(&self, event: AuthEvent) {
        let _ = self.events.send(event);
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> AppResult<T> {
    response.json::<T>().await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Serialization,
            format!("Unexpected backend response: {e}"),
            e,
        )
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_new_requires_url() {
        let config = BackendConfig::default();
        let err = RestClient::new(&config).unwrap_err();
        assert!(err.is(ErrorKind::Configuration));
    }

    #[tokio::test]
    async fn test_url_join_strips_trailing_slash() {
        let client = testing::client("https://club.example.org/");
        assert_eq!(
            client.url("/auth/v1/user"),
            "https://club.example.org/auth/v1/user"
        );
        assert!(client.session_identity().await.is_none());
    }

    #[tokio::test]
    async fn test_signed_out_call_uses_anon_key() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/v1/contracts")
                    .header("apikey", "anon")
                    .header("authorization", "Bearer anon");
                then.status(200).json_body(serde_json::json!([]));
            })
            .await;

        let client = testing::client(&server.base_url());
        let rows: Vec<serde_json::Value> = client
            .call_json(Method::GET, "/rest/v1/contracts", |b| b)
            .await
            .unwrap();
        assert!(rows.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_expired_token_is_renewed_and_request_replayed() {
        let server = MockServer::start_async().await;
        let stale = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/v1/user_profiles")
                    .header("authorization", "Bearer expired");
                then.status(401).json_body(serde_json::json!({ "message": "JWT expired" }));
            })
            .await;
        let refresh = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/auth/v1/token")
                    .query_param("grant_type", "refresh_token")
                    .json_body(serde_json::json!({ "refresh_token": "r1" }));
                then.status(200).json_body(serde_json::json!({
                    "access_token": "fresh",
                    "refresh_token": "r2",
                    "user": { "id": uuid::Uuid::new_v4(), "email": "admin@fahari.fc" },
                }));
            })
            .await;
        let fresh = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/v1/user_profiles")
                    .header("authorization", "Bearer fresh");
                then.status(200).json_body(serde_json::json!([{ "id": 1 }]));
            })
            .await;

        let client = testing::client(&server.base_url());
        testing::signed_in(&client, "expired", Some("r1")).await;
        let mut events = client.events.subscribe();

        let rows: Vec<serde_json::Value> = client
            .call_json(Method::GET, "/rest/v1/user_profiles", |b| b)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        stale.assert_calls_async(1).await;
        refresh.assert_calls_async(1).await;
        fresh.assert_calls_async(1).await;
        assert_eq!(client.access_token().await.as_deref(), Some("fresh"));
        assert!(matches!(
            events.try_recv(),
            Ok(AuthEvent::TokenRefreshed { .. })
        ));
    }

    #[tokio::test]
    async fn test_rejected_refresh_surfaces_not_authenticated() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/rest/v1/user_profiles");
                then.status(401).json_body(serde_json::json!({ "message": "JWT expired" }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/v1/token");
                then.status(400).json_body(serde_json::json!({
                    "error": "invalid_grant",
                    "error_description": "Invalid Refresh Token",
                }));
            })
            .await;

        let client = testing::client(&server.base_url());
        testing::signed_in(&client, "expired", Some("r1")).await;
        let mut events = client.events.subscribe();

        let err = client
            .call(Method::GET, "/rest/v1/user_profiles", |b| b)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotAuthenticated));
        assert!(client.session_identity().await.is_none());
        assert_eq!(events.try_recv().unwrap(), AuthEvent::SignedOut);
    }
}
