//! HTTP transport
//!
//! The job protocol only needs a handful of things from HTTP: base-URL
//! relative requests, default authorization, per-request headers and
//! timeouts, and a timeout condition it can tell apart from other failures.
//! [`Transport`] captures exactly that, so the protocol can be driven by
//! reqwest in production and by scripted transports in tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result, TransportError};

/// One request, relative to the transport's base URL
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    /// Path starting with `/`, e.g. "/poll/j1"
    pub path: String,
    /// Headers added on top of the transport defaults
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Overrides the transport's default timeout
    pub timeout: Option<Duration>,
}

impl TransportRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            headers: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            ..Self::get(path)
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Value of a request header (case-insensitive)
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A fully read response
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Value of a response header, if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Deserialize the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body)
            .map_err(|e| ClientError::Parse(format!("Failed to parse JSON response: {}", e)))
    }
}

/// The HTTP collaborator of the job protocol
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and read its whole response
    ///
    /// A request that exceeds its timeout must fail with
    /// [`TransportError::Timeout`]; the poll loop retries those.
    async fn send(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportError> {
        (**self).send(request).await
    }
}

/// [`Transport`] backed by a reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    /// Base URL without trailing slash
    base_url: String,
    client: Client,
}

impl ReqwestTransport {
    /// Build a reqwest client carrying the API key and default timeout
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Key {}", config.api_key))
            .map_err(|e| ClientError::Config(format!("api_key is not a valid header value: {}", e)))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.default_timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(config.base_url.clone(), client))
    }

    /// Use a preconfigured reqwest client
    ///
    /// The client is used as-is: it must already carry the authorization
    /// header and default timeout.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.client.request(request.method, &url);

        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}
