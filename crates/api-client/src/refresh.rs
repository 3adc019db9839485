//! Single-flight token refresh coordination
//!
//! At most one refresh network call is ever outstanding per client instance,
//! no matter how many concurrent requests observe the same expired token.
//! Concurrent 401s serialize on a tokio mutex: the first holder performs the
//! refresh, and every later waiter finds the stored token already changed
//! (or cleared) and resumes without a second call. The mutex wakes waiters
//! in FIFO acquisition order, which is the pending-request queue ordering
//! guarantee — there is no separate boolean flag or queue structure to race
//! on.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use token_store::{TokenPair, TokenStore};

use crate::constants::REFRESH_TOKEN_PATH;
use crate::error::ApiError;

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Response from the refresh endpoint. Field names follow the backend wire
/// contract, not Rust convention.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
    refresh_token: String,
}

/// Owns the refresh state machine: idle while the gate is uncontended,
/// refreshing while the first 401'd request holds it.
pub struct RefreshCoordinator {
    client: reqwest::Client,
    store: Arc<dyn TokenStore>,
    refresh_url: String,
    timeout: Duration,
    gate: Mutex<()>,
}

impl RefreshCoordinator {
    pub fn new(
        client: reqwest::Client,
        store: Arc<dyn TokenStore>,
        api_base_url: &str,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            store,
            refresh_url: format!(
                "{}{REFRESH_TOKEN_PATH}",
                api_base_url.trim_end_matches('/')
            ),
            timeout,
            gate: Mutex::new(()),
        }
    }

    /// Obtain an access token that post-dates the one rejected with 401.
    ///
    /// `stale` is the token the failed request was sent with (None if it was
    /// sent before any token existed). Exactly one caller performs the
    /// network refresh; the rest wait on the gate and share its outcome.
    pub async fn fresh_access_token(&self, stale: Option<&str>) -> Result<String, ApiError> {
        let _guard = self.gate.lock().await;

        // A refresh may have settled while this request waited on the gate.
        match self.store.access_token() {
            Some(current) if Some(current.as_str()) != stale => {
                debug!("token already refreshed by an earlier request");
                return Ok(current);
            }
            None if stale.is_some() => {
                // The shared refresh failed and cleared the store
                return Err(ApiError::SessionExpired {
                    reason: "token refresh failed".into(),
                });
            }
            _ => {}
        }

        let Some(refresh) = self.store.refresh_token() else {
            debug!("no refresh token available, session cannot be recovered");
            // A stale access token without a refresh token is unrecoverable;
            // clear it so later requests don't keep resending a dead token
            self.store.clear();
            return Err(ApiError::SessionExpired {
                reason: "no refresh token".into(),
            });
        };

        match self.call_refresh(&refresh).await {
            Ok(pair) => {
                let access = pair.access.clone();
                self.store.set_pair(pair);
                info!("token refresh succeeded");
                Ok(access)
            }
            Err(err) => {
                warn!(error = %err, "token refresh failed, clearing stored credentials");
                self.store.clear();
                Err(err)
            }
        }
    }

    /// One POST to the refresh endpoint with a hard timeout.
    async fn call_refresh(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        let response = self
            .client
            .post(&self.refresh_url)
            .timeout(self.timeout)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() {
                    "token refresh timed out".to_string()
                } else {
                    format!("token refresh request failed: {e}")
                };
                ApiError::SessionExpired { reason }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::SessionExpired {
                reason: format!("refresh token rejected ({status})"),
            });
        }

        let refreshed: RefreshResponse = response.json().await.map_err(|e| {
            ApiError::SessionExpired {
                reason: format!("invalid refresh response: {e}"),
            }
        })?;
        Ok(TokenPair::new(
            refreshed.access_token,
            refreshed.refresh_token,
        ))
    }
}
