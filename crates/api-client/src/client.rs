//! Public client facade
//!
//! Verb-oriented surface over the dispatcher, refresh coordinator, and error
//! normalizer. The token store is injected so each session has an explicit
//! owner; the facade keeps no state beyond the composed pieces.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use token_store::TokenStore;

use crate::config::{Config, ConfigError};
use crate::dispatch::{Dispatcher, RawResponse, RequestDescriptor};
use crate::error::{ApiError, normalize};
use crate::refresh::RefreshCoordinator;

/// Successful response: deserialized data plus the HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: u16,
}

/// HTTP client that attaches the stored bearer credential to requests and
/// recovers from credential expiry with a single-flight refresh.
pub struct ApiClient {
    dispatcher: Dispatcher,
    coordinator: RefreshCoordinator,
    store: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(config: Config, store: Arc<dyn TokenStore>) -> Result<Self, ConfigError> {
        let client = reqwest::Client::new();
        let dispatcher = Dispatcher::new(
            client.clone(),
            config.api_base_url.clone(),
            &config.origin_url,
        )?;
        let coordinator = RefreshCoordinator::new(
            client,
            Arc::clone(&store),
            &config.api_base_url,
            config.refresh_timeout(),
        );
        Ok(Self {
            dispatcher,
            coordinator,
            store,
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, ApiError> {
        self.send(RequestDescriptor::new(Method::GET, path)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, ApiError> {
        let body = to_json(body)?;
        self.send(RequestDescriptor::new(Method::POST, path).json(body))
            .await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, ApiError> {
        let body = to_json(body)?;
        self.send(RequestDescriptor::new(Method::PUT, path).json(body))
            .await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.send(RequestDescriptor::new(Method::DELETE, path))
            .await
    }

    /// Full-control entry point; the verb methods are thin wrappers over
    /// this. Handles the 401 → refresh → resend-once cycle for authorized
    /// descriptors; unauthenticated descriptors never touch the refresh
    /// protocol, even on 401.
    pub async fn send<T: DeserializeOwned>(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<ApiResponse<T>, ApiError> {
        let token = if descriptor.authorize {
            self.store.access_token()
        } else {
            None
        };

        let response = self.dispatcher.send(&descriptor, token.as_deref()).await?;

        if response.status == StatusCode::UNAUTHORIZED && descriptor.authorize {
            // One resend with a post-refresh credential. A 401 on the resend
            // is surfaced like any other error; there is no second cycle.
            let fresh = self.coordinator.fresh_access_token(token.as_deref()).await?;
            debug!(path = %descriptor.path, "retrying request with refreshed credential");
            let retried = self.dispatcher.send(&descriptor, Some(&fresh)).await?;
            return finish(retried);
        }

        finish(response)
    }
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Generic {
        status: 500,
        message: format!("unserializable request body: {e}"),
    })
}

/// Deserialize a 2xx body or normalize everything else.
fn finish<T: DeserializeOwned>(response: RawResponse) -> Result<ApiResponse<T>, ApiError> {
    let status = response.status.as_u16();
    if !response.status.is_success() {
        return Err(normalize(status, &response.body));
    }

    // Empty 2xx bodies (204-style) deserialize as JSON null so unit and
    // Option targets work
    let body: &[u8] = if response.body.is_empty() {
        b"null"
    } else {
        &response.body
    };
    match serde_json::from_slice(body) {
        Ok(data) => Ok(ApiResponse { data, status }),
        Err(e) => Err(ApiError::Generic {
            status,
            message: format!("invalid response body: {e}"),
        }),
    }
}
