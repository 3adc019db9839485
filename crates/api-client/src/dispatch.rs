//! Request construction and dispatch
//!
//! Builds and sends exactly one HTTP request per call. Credential attachment
//! is parameterized by the caller so a retry after refresh is just a second
//! send of the same descriptor with the new token; retry policy itself lives
//! with the facade and the refresh coordinator, never here.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, ORIGIN};
use reqwest::{Method, StatusCode};
use tracing::{debug, warn};

use crate::config::ConfigError;
use crate::error::ApiError;

/// Everything needed to send one request.
///
/// Immutable once dispatched; a retried request is the same descriptor sent
/// again with a fresh credential.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
    /// When false the request is sent without a credential and never
    /// participates in the refresh protocol.
    pub authorize: bool,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
            authorize: true,
        }
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Set an extra header.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Opt out of credential attachment and refresh handling entirely
    /// (public endpoints).
    pub fn unauthenticated(mut self) -> Self {
        self.authorize = false;
        self
    }
}

/// Status and raw body of a completed exchange. The facade decides between
/// deserialization, refresh handling, and error normalization.
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// Sends one network call per invocation.
pub struct Dispatcher {
    client: reqwest::Client,
    api_base_url: String,
    origin: HeaderValue,
}

impl Dispatcher {
    pub fn new(
        client: reqwest::Client,
        api_base_url: String,
        origin_url: &str,
    ) -> Result<Self, ConfigError> {
        let origin = HeaderValue::from_str(origin_url)
            .map_err(|e| ConfigError::Invalid(format!("origin_url is not a valid header: {e}")))?;
        Ok(Self {
            client,
            api_base_url,
            origin,
        })
    }

    /// Send one request, attaching the supplied access token as a bearer
    /// credential. Does not retry; transport failures come back already
    /// normalized.
    pub async fn send(
        &self,
        descriptor: &RequestDescriptor,
        access_token: Option<&str>,
    ) -> Result<RawResponse, ApiError> {
        let url = format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            descriptor.path.trim_start_matches('/')
        );

        let mut request = self
            .client
            .request(descriptor.method.clone(), &url)
            .headers(descriptor.headers.clone())
            .header(ORIGIN, self.origin.clone());

        if !descriptor.query.is_empty() {
            request = request.query(&descriptor.query);
        }
        if let Some(token) = access_token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = &descriptor.body {
            request = request.json(body);
        }

        debug!(
            method = %descriptor.method,
            path = %descriptor.path,
            authorized = access_token.is_some(),
            "dispatching request"
        );

        let response = request.send().await.map_err(|e| {
            warn!(path = %descriptor.path, error = %e, "request failed in transport");
            ApiError::from_transport(&e)
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            warn!(path = %descriptor.path, error = %e, "failed to read response body");
            ApiError::from_transport(&e)
        })?;

        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_authorizes_by_default() {
        let descriptor = RequestDescriptor::new(Method::GET, "/users/me");
        assert!(descriptor.authorize);
        assert!(descriptor.body.is_none());
        assert!(descriptor.query.is_empty());
    }

    #[test]
    fn unauthenticated_clears_flag() {
        let descriptor = RequestDescriptor::new(Method::GET, "/posts").unauthenticated();
        assert!(!descriptor.authorize);
    }

    #[test]
    fn builder_accumulates_query_and_body() {
        let descriptor = RequestDescriptor::new(Method::POST, "/tickets")
            .query("page", "2")
            .query("per_page", "20")
            .json(serde_json::json!({"name": "standard"}));
        assert_eq!(descriptor.query.len(), 2);
        assert!(descriptor.body.is_some());
    }

    #[test]
    fn dispatcher_rejects_unprintable_origin() {
        let result = Dispatcher::new(
            reqwest::Client::new(),
            "https://api.example.com".into(),
            "https://bad\norigin",
        );
        assert!(result.is_err());
    }
}
