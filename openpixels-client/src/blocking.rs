//! Blocking client
//!
//! Runs the async protocol of [`JobClient`] on a private current-thread
//! runtime, so synchronous callers get the exact same submit/poll behavior.
//!
//! Like `reqwest::blocking`, this client must not be created, used or
//! dropped from within an async runtime.

use std::pin::Pin;

use openpixels_core::domain::job::{JobOutcome, StatusUpdate};
use openpixels_core::dto::health::HealthStatus;
use serde::Serialize;
use tokio::runtime::{Builder, Runtime};
use tokio_stream::{Stream, StreamExt};

use crate::JobClient;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::jobs::SubmittedJob;
use crate::transport::{ReqwestTransport, Transport};

/// Blocking counterpart of [`JobClient`]
///
/// # Example
/// ```no_run
/// use openpixels_client::BlockingJobClient;
///
/// let client = BlockingJobClient::new("sk-my-key")?;
/// let outcome = client.run(&serde_json::json!({
///     "model": "flux-schnell",
///     "prompt": "a red circle on white background",
/// }))?;
/// println!("{:?}", outcome);
/// # Ok::<(), openpixels_client::ClientError>(())
/// ```
#[derive(Debug)]
pub struct BlockingJobClient<T = ReqwestTransport> {
    inner: JobClient<T>,
    runtime: Runtime,
}

impl BlockingJobClient {
    /// Create a client for the public worker
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::new(api_key))
    }

    /// Create a client from a validated configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Self::from_async(JobClient::with_config(config)?)
    }

    /// Create a client configured from `OPENPIXELS_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_async(JobClient::from_env()?)
    }
}

impl<T: Transport> BlockingJobClient<T> {
    /// Create a client over a custom transport
    pub fn with_transport(transport: T, config: ClientConfig) -> Result<Self> {
        Self::from_async(JobClient::with_transport(transport, config)?)
    }

    /// Wrap an async client
    pub fn from_async(inner: JobClient<T>) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to start runtime: {}", e)))?;

        Ok(Self { inner, runtime })
    }

    /// The async client this one drives
    pub fn inner(&self) -> &JobClient<T> {
        &self.inner
    }

    pub fn base_url(&self) -> &str {
        self.inner.base_url()
    }

    /// Submit a job, blocking until the worker answers
    ///
    /// See [`JobClient::submit`].
    pub fn submit<P>(&self, payload: &P) -> Result<SubmittedJob>
    where
        P: Serialize + ?Sized,
    {
        self.runtime.block_on(self.inner.submit(payload))
    }

    /// Follow a submitted job; each call to `next` blocks for one poll
    ///
    /// See [`JobClient::subscribe`]. Dropping the iterator stops polling.
    pub fn subscribe<'a>(&'a self, job: &'a SubmittedJob) -> Subscription<'a> {
        Subscription {
            runtime: &self.runtime,
            updates: Box::pin(self.inner.subscribe(job)),
        }
    }

    /// Submit a job and block until its outcome is known
    ///
    /// See [`JobClient::run`].
    pub fn run<P>(&self, payload: &P) -> Result<Option<JobOutcome>>
    where
        P: Serialize + ?Sized,
    {
        self.runtime.block_on(self.inner.run(payload))
    }

    /// Check that the worker is reachable
    pub fn health(&self) -> Result<HealthStatus> {
        self.runtime.block_on(self.inner.health())
    }
}

/// Blocking iterator over the updates of one job
pub struct Subscription<'a> {
    runtime: &'a Runtime,
    updates: Pin<Box<dyn Stream<Item = Result<StatusUpdate>> + Send + 'a>>,
}

impl Iterator for Subscription<'_> {
    type Item = Result<StatusUpdate>;

    fn next(&mut self) -> Option<Self::Item> {
        self.runtime.block_on(self.updates.next())
    }
}
