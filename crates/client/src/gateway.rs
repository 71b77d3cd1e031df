//! HTTP gateway.
//!
//! Single chokepoint for outbound API calls: attaches the bearer access
//! token, and on a 401 runs the refresh protocol once before resending the
//! original request. A second 401, or a 401 on the login/refresh endpoints
//! themselves, is surfaced as-is.
//!
//! Refresh failure is fatal to the session: both tokens are cleared and a
//! [`SessionEvent::Expired`] is broadcast so the caller's presentation layer
//! can react (the transport layer performs no navigation itself).

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex};

use crate::config::ClientConfig;
use crate::credentials::CredentialStore;
use crate::envelope::{Envelope, Status};
use crate::error::{Error, Result};

pub const LOGIN_PATH: &str = "/api/v1/auth/login";
pub const JOIN_PATH: &str = "/api/v1/auth/join";
pub const LOGOUT_PATH: &str = "/api/v1/auth/logout";
pub const PROFILE_PATH: &str = "/api/v1/auth/profile";
pub const REFRESH_PATH: &str = "/api/v1/auth/refresh";

/// Session lifecycle notifications emitted by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The refresh protocol failed (or no refresh token was available).
    /// Credentials have been cleared; the user must sign in again.
    Expired,
}

/// Token pair returned by the refresh endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenPair {
    access_token: String,
    refresh_token: String,
}

/// Outbound request pipeline shared by all typed clients.
pub struct Gateway {
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
    // Serializes refresh attempts so N concurrent 401s produce one
    // refresh call.
    refresh_gate: Mutex<()>,
    events: broadcast::Sender<SessionEvent>,
}

impl Gateway {
    pub fn new(config: &ClientConfig, credentials: Arc<dyn CredentialStore>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();
        let (events, _) = broadcast::channel(16);

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
            refresh_gate: Mutex::new(()),
            events,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Subscribe to session lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Envelope<T>> {
        self.send(Method::GET, path, query, None).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<Envelope<T>> {
        let body = match body {
            Some(body) => Some(serde_json::to_value(body)?),
            None => None,
        };
        self.send(Method::POST, path, query, body).await
    }

    /// Execute one request under the auth contract.
    ///
    /// The retry is structural rather than a mutable flag on the request:
    /// the 401 branch below performs the single resend and nothing loops
    /// back into it.
    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> Result<Envelope<T>> {
        let token = self.credentials.access();
        let response = self
            .dispatch(&method, path, query, body.as_ref(), token.as_deref())
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::decode(response).await;
        }
        if Self::is_auth_exempt(path) {
            return Err(Error::Unauthorized);
        }

        self.refresh(token.as_deref()).await?;

        tracing::debug!(path, "resending request after token refresh");
        let token = self.credentials.access();
        let response = self
            .dispatch(&method, path, query, body.as_ref(), token.as_deref())
            .await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized);
        }
        Self::decode(response).await
    }

    async fn dispatch(
        &self,
        method: &Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
        token: Option<&str>,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method.clone(), &url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }

    /// Endpoints that must never trigger the refresh flow, even on 401.
    fn is_auth_exempt(path: &str) -> bool {
        path.starts_with(LOGIN_PATH) || path.starts_with(REFRESH_PATH)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<Envelope<T>> {
        let status = response.status();
        let body = response.text().await?;
        match serde_json::from_str::<Envelope<T>>(&body) {
            Ok(envelope) => Ok(envelope),
            Err(_) if !status.is_success() => Err(Error::Api {
                status: Status::Error,
                code: None,
                message: format!("HTTP {}: {}", status, body),
                field_errors: Vec::new(),
            }),
            Err(e) => Err(Error::Json(e)),
        }
    }

    /// Exchange the refresh token for a new token pair.
    ///
    /// Deduplicated across concurrent 401 handlers: `stale_access` is the
    /// token that was rejected. Once the gate is acquired, a stored token
    /// that differs from it means another task already refreshed, and this
    /// call returns without touching the endpoint.
    async fn refresh(&self, stale_access: Option<&str>) -> Result<()> {
        let _gate = self.refresh_gate.lock().await;
        if self.credentials.access().as_deref() != stale_access {
            return Ok(());
        }

        let Some(refresh_token) = self.credentials.refresh() else {
            return Err(self.expire("no refresh token available"));
        };

        // Out-of-band call: built directly on the http client so it cannot
        // re-enter the 401 handling above.
        let url = format!("{}{}", self.base_url, REFRESH_PATH);
        let response = match self
            .http
            .post(&url)
            .query(&[("refreshToken", refresh_token.as_str())])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Err(self.expire(&format!("refresh transport error: {e}"))),
        };

        let envelope: Envelope<TokenPair> = match response.json().await {
            Ok(envelope) => envelope,
            Err(e) => return Err(self.expire(&format!("refresh decode error: {e}"))),
        };
        let pair = match envelope.into_result() {
            Ok(pair) => pair,
            Err(e) => return Err(self.expire(&format!("refresh rejected: {e}"))),
        };

        // Both tokens are stored before the caller resends; the old
        // refresh token is never used again.
        self.credentials.set_access(&pair.access_token);
        self.credentials.set_refresh(&pair.refresh_token);
        tracing::debug!("access token refreshed");
        Ok(())
    }

    /// Tear the session down after an unrecoverable refresh failure.
    fn expire(&self, reason: &str) -> Error {
        tracing::warn!(reason, "session expired, clearing credentials");
        self.credentials.clear_all();
        let _ = self.events.send(SessionEvent::Expired);
        Error::SessionExpired(reason.to_string())
    }
}
