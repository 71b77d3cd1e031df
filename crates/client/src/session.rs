//! Session lifecycle.
//!
//! Owns the authenticated-user identity and keeps it consistent with the
//! credential store. Constructed explicitly over a gateway and a store so
//! tests can run isolated sessions side by side.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::credentials::CredentialStore;
use crate::error::{Error, Result};
use crate::gateway::{Gateway, JOIN_PATH, LOGIN_PATH, LOGOUT_PATH, PROFILE_PATH};

/// Login request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub login_id: String,
    pub login_pw: String,
}

/// Registration request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub login_id: String,
    pub login_pw: String,
    pub name: String,
    pub email: String,
}

/// Token pair and user id issued by login/registration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResult {
    pub user_id: i64,
    pub access_token: String,
    pub refresh_token: String,
}

/// Profile of the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: i64,
    pub user_email: String,
    pub name: String,
    pub role: String,
}

/// Observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Startup profile fetch still in flight.
    Loading,
    Unauthenticated,
    Authenticated,
}

/// Authenticated-user state and the operations that mutate it.
pub struct SessionManager {
    gateway: Arc<Gateway>,
    credentials: Arc<dyn CredentialStore>,
    user: RwLock<Option<UserProfile>>,
    loading: AtomicBool,
}

impl SessionManager {
    pub fn new(gateway: Arc<Gateway>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            gateway,
            credentials,
            user: RwLock::new(None),
            loading: AtomicBool::new(true),
        }
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.user.read().expect("user lock poisoned").clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.read().expect("user lock poisoned").is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> SessionState {
        if self.is_loading() {
            SessionState::Loading
        } else if self.is_authenticated() {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        }
    }

    /// Silent startup fetch: resolve the persisted access token to a user
    /// profile if one is present. The loading flag clears regardless of
    /// the outcome.
    pub async fn initialize(&self) {
        if let Err(e) = self.fetch_profile().await {
            tracing::warn!(error = %e, "startup profile fetch failed");
        }
        self.loading.store(false, Ordering::SeqCst);
    }

    /// Authenticate and populate the user profile.
    pub async fn login(&self, request: &LoginRequest) -> Result<()> {
        let auth: AuthResult = self
            .gateway
            .post(LOGIN_PATH, &[], Some(request))
            .await?
            .into_result()?;

        self.store_tokens(&auth);
        self.populate_profile().await;
        tracing::info!(user_id = auth.user_id, "login successful");
        Ok(())
    }

    /// Create an account; on success behaves exactly like login.
    ///
    /// Malformed input is rejected here and never reaches the network.
    pub async fn register(&self, request: &RegisterRequest) -> Result<()> {
        Self::validate_registration(request)?;

        let auth: AuthResult = self
            .gateway
            .post(JOIN_PATH, &[], Some(request))
            .await?
            .into_result()?;

        self.store_tokens(&auth);
        self.populate_profile().await;
        tracing::info!(user_id = auth.user_id, "registration successful");
        Ok(())
    }

    /// End the session. The server-side call is best-effort; local state
    /// is cleared unconditionally.
    pub async fn logout(&self) {
        let result = self
            .gateway
            .post::<serde_json::Value, ()>(LOGOUT_PATH, &[], None)
            .await;
        if let Err(e) = result {
            tracing::warn!(error = %e, "logout request failed");
        }

        self.credentials.clear_all();
        *self.user.write().expect("user lock poisoned") = None;
    }

    fn store_tokens(&self, auth: &AuthResult) {
        self.credentials.set_access(&auth.access_token);
        self.credentials.set_refresh(&auth.refresh_token);
    }

    /// Profile fetch that only logs on failure. A failed fetch leaves the
    /// user unchanged; it does not by itself force a logout.
    async fn populate_profile(&self) {
        if let Err(e) = self.fetch_profile().await {
            tracing::warn!(error = %e, "profile fetch failed");
        }
    }

    /// No-op without an access token.
    async fn fetch_profile(&self) -> Result<()> {
        if self.credentials.access().is_none() {
            return Ok(());
        }

        let profile: UserProfile = self
            .gateway
            .get(PROFILE_PATH, &[])
            .await?
            .into_result()?;
        *self.user.write().expect("user lock poisoned") = Some(profile);
        Ok(())
    }

    fn validate_registration(request: &RegisterRequest) -> Result<()> {
        if !request.email.contains('@') {
            return Err(Error::InvalidInput("invalid email address".to_string()));
        }
        if request.login_pw.chars().count() < 4 {
            return Err(Error::InvalidInput(
                "password must be at least 4 characters".to_string(),
            ));
        }
        Ok(())
    }
}
