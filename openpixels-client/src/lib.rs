//! OpenPixels HTTP Client
//!
//! A client for the OpenPixels worker API: submit a job, then long-poll the
//! worker until the job reaches its terminal update.
//!
//! The protocol is written once, as async code over the [`Transport`] seam.
//! [`JobClient`] exposes it to async callers and [`BlockingJobClient`] drives
//! the same futures to completion for synchronous callers.
//!
//! # Example
//!
//! ```no_run
//! use openpixels_client::JobClient;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = JobClient::new("sk-my-key")?;
//!
//!     let outcome = client.run(&json!({
//!         "model": "flux-schnell",
//!         "prompt": "a red circle on white background",
//!         "width": 512,
//!         "height": 512,
//!     })).await?;
//!
//!     match outcome {
//!         Some(outcome) => println!("Job finished: {:?}", outcome),
//!         None => println!("Worker stopped answering before the job finished"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod blocking;
pub mod config;
pub mod error;
mod health;
mod jobs;
pub mod transport;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use blocking::BlockingJobClient;
pub use config::ClientConfig;
pub use error::{ClientError, Result, SubmissionError, TransportError};
pub use jobs::{MACHINE_ID_HEADER, ROUTING_HEADER, SubmittedJob};
pub use openpixels_core::domain::job::{JobOutcome, StatusUpdate, UpdateKind};
pub use openpixels_core::dto::health::HealthStatus;
pub use transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse};

/// Client for the OpenPixels worker API
///
/// Holds no per-job state: the routing affinity learned at submission is
/// returned inside [`SubmittedJob`] and handed back to [`JobClient::subscribe`],
/// so one client can follow any number of jobs.
#[derive(Debug, Clone)]
pub struct JobClient<T = ReqwestTransport> {
    transport: T,
    config: ClientConfig,
}

impl JobClient {
    /// Create a client for the public worker
    ///
    /// # Arguments
    /// * `api_key` - The OpenPixels API key
    ///
    /// # Example
    /// ```
    /// use openpixels_client::JobClient;
    ///
    /// let client = JobClient::new("sk-my-key").unwrap();
    /// assert_eq!(client.base_url(), "https://worker.openpixels.ai");
    /// ```
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::new(api_key))
    }

    /// Create a client from a validated configuration
    ///
    /// # Example
    /// ```
    /// use openpixels_client::{ClientConfig, JobClient};
    /// use std::time::Duration;
    ///
    /// let config = ClientConfig::new("sk-my-key")
    ///     .with_base_url("http://localhost:1729")
    ///     .with_timeouts(Duration::from_secs(5), Duration::from_secs(120));
    ///
    /// let client = JobClient::with_config(config).unwrap();
    /// assert_eq!(client.base_url(), "http://localhost:1729");
    /// ```
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config)?;
        Self::with_transport(transport, config)
    }

    /// Create a client configured from `OPENPIXELS_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::with_config(ClientConfig::from_env()?)
    }
}

impl<T: Transport> JobClient<T> {
    /// Create a client over a custom transport
    ///
    /// Only the polling settings of `config` are used and validated;
    /// connection settings are the transport's business.
    pub fn with_transport(transport: T, config: ClientConfig) -> Result<Self> {
        config.validate_polling()?;
        Ok(Self { transport, config })
    }

    /// Get the configured base URL of the worker
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_client_creation() {
        let client = JobClient::new("sk-test").unwrap();
        assert_eq!(client.base_url(), config::DEFAULT_BASE_URL);
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let config = ClientConfig::new("sk-test").with_base_url("http://localhost:1729/");
        let client = JobClient::with_config(config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:1729");
        assert_eq!(client.transport().base_url(), "http://localhost:1729");
    }

    #[test]
    fn test_client_rejects_invalid_config() {
        let err = JobClient::new("").unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn test_custom_transport_requires_valid_polling() {
        let transport = ReqwestTransport::with_client("http://localhost:1729", reqwest::Client::new());

        let config = ClientConfig::default().with_timeouts(Duration::from_secs(5), Duration::ZERO);
        let err = JobClient::with_transport(transport.clone(), config).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));

        // No API key needed: the transport carries its own credentials.
        assert!(JobClient::with_transport(transport, ClientConfig::default()).is_ok());
    }
}
