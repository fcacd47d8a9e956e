//! Session management: login, token refresh and proactive refresh
//! scheduling.
//!
//! The session owns the only shared mutable state in the crate: the stored
//! bearer token and the handle of the background refresh timer. The token
//! is replaced wholesale under a lock, never partially updated, so a reader
//! always sees either the previous token or the fully-parsed new one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::client::MetasysClient;
use crate::error::{MetasysError, Result};
use crate::models::AccessToken;

/// Shared session state behind the client's `Arc`.
pub(crate) struct SessionState {
    token: RwLock<Option<AccessToken>>,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
    auto_refresh: AtomicBool,
}

impl SessionState {
    pub(crate) fn new() -> Self {
        Self {
            token: RwLock::new(None),
            refresh_task: Mutex::new(None),
            auto_refresh: AtomicBool::new(false),
        }
    }

    /// Current bearer string, if a token is stored.
    pub(crate) fn bearer(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|t| t.access_token.clone())
    }

    /// Snapshot of the stored token.
    fn token_snapshot(&self) -> Option<AccessToken> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Atomically replace the stored token.
    fn store(&self, token: AccessToken) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    fn clear(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Install a new refresh timer, cancelling any previous one.
    fn replace_refresh_task(&self, handle: JoinHandle<()>) {
        let mut slot = self
            .refresh_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
    }

    fn cancel_refresh_task(&self) {
        let mut slot = self
            .refresh_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = slot.take() {
            previous.abort();
        }
    }
}

impl MetasysClient {
    /// Log in and store the returned access token.
    ///
    /// Sends `POST /login` with the given credentials. On success the token
    /// is installed for all subsequent requests on this client (and its
    /// clones). With `auto_refresh` a background timer is armed to refresh
    /// the token shortly before it expires; a failed background refresh is
    /// logged but never retried or propagated.
    ///
    /// # Errors
    ///
    /// * [`MetasysError::Auth`] if the server rejects the credentials
    /// * [`MetasysError::Timeout`] if the request exceeds its deadline
    /// * [`MetasysError::Parse`] if the body is not valid JSON
    /// * [`MetasysError::TokenExtraction`] if the body lacks a token/expiry
    #[tracing::instrument(skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        auto_refresh: bool,
    ) -> Result<AccessToken> {
        let body = serde_json::json!({
            "username": username,
            "password": password,
        });
        let response = self
            .post_unauthenticated("login", &body)
            .await
            .map_err(auth_rejection)?;

        let token = self.install_token(response).await?;
        self.session.auto_refresh.store(auto_refresh, Ordering::SeqCst);
        if auto_refresh {
            self.schedule_refresh(&token);
        } else {
            // A fresh session without auto-refresh must not keep an older
            // session's timer armed.
            self.session.cancel_refresh_task();
        }
        Ok(token)
    }

    /// Refresh the current access token.
    ///
    /// Sends `GET /refreshToken` with the stored bearer token and replaces
    /// the stored token on success. Shares the error taxonomy of
    /// [`login`](Self::login). When auto-refresh is active, a new proactive
    /// refresh is scheduled from the fresh expiry.
    #[tracing::instrument(skip(self))]
    pub async fn refresh(&self) -> Result<AccessToken> {
        let response = self.get("refreshToken").await.map_err(auth_rejection)?;

        let token = self.install_token(response).await?;
        if self.session.auto_refresh.load(Ordering::SeqCst) {
            self.schedule_refresh(&token);
        }
        Ok(token)
    }

    /// The last successfully stored token, without any network activity.
    pub fn current_token(&self) -> Option<AccessToken> {
        self.session.token_snapshot()
    }

    /// Tear the session down: cancel the refresh timer and drop the token.
    pub fn close(&self) {
        self.session.auto_refresh.store(false, Ordering::SeqCst);
        self.session.cancel_refresh_task();
        self.session.clear();
    }

    /// Parse a login/refresh response and atomically store the token.
    ///
    /// The previously stored token is only discarded once the new one has
    /// been fully parsed; extraction failures leave the session untouched.
    async fn install_token(&self, response: reqwest::Response) -> Result<AccessToken> {
        let text = response.text().await.map_err(MetasysError::from_reqwest)?;
        let value: Value = serde_json::from_str(&text)?;
        let token = extract_token(&value)?;
        self.session.store(token.clone());
        Ok(token)
    }

    /// Arm the proactive refresh timer for `token`, replacing any timer
    /// armed earlier.
    fn schedule_refresh(&self, token: &AccessToken) {
        let Some(delay) = token.refresh_delay(Utc::now()) else {
            tracing::warn!(
                expires = %token.expires,
                "token expiry too far in the future, skipping proactive refresh"
            );
            return;
        };

        tracing::debug!(?delay, "scheduling proactive token refresh");
        let client = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match client.refresh().await {
                Ok(token) => {
                    tracing::debug!(expires = %token.expires, "proactive token refresh succeeded");
                }
                Err(err) => {
                    // Best effort: the failure surfaces the next time a
                    // caller uses the (now stale) token.
                    tracing::warn!(error = %err, "proactive token refresh failed");
                }
            }
        });
        self.session.replace_refresh_task(handle);
    }
}

/// Map a non-2xx login/refresh response to an authentication error.
fn auth_rejection(err: MetasysError) -> MetasysError {
    match err {
        MetasysError::Http { status, body } => MetasysError::Auth {
            status,
            message: extract_error_message(&body, status),
        },
        other => other,
    }
}

fn extract_error_message(body: &str, status: u16) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if let Some(msg) = json.get("message").and_then(|m| m.as_str()) {
            return msg.to_string();
        }
        if let Some(err) = json.get("error").and_then(|m| m.as_str()) {
            return err.to_string();
        }
    }
    if body.is_empty() {
        format!("HTTP {status}")
    } else {
        body.to_string()
    }
}

/// Extract the access token and expiry from a login/refresh body.
fn extract_token(value: &Value) -> Result<AccessToken> {
    let access_token = value
        .get("accessToken")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            MetasysError::TokenExtraction("response is missing 'accessToken'".to_string())
        })?;
    let expires = value
        .get("expires")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            MetasysError::TokenExtraction("response is missing 'expires'".to_string())
        })?;
    let expires: DateTime<Utc> = expires
        .parse::<DateTime<Utc>>()
        .map_err(|e| MetasysError::TokenExtraction(format!("unparsable expiry '{expires}': {e}")))?;

    Ok(AccessToken {
        access_token: access_token.to_string(),
        expires,
    })
}
