//! Error types for the OpenPixels client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the OpenPixels client
#[derive(Debug, Error)]
pub enum ClientError {
    /// The worker did not accept the job
    #[error("Failed to submit job: {0}")]
    Submission(#[from] SubmissionError),

    /// A poll answered with an error status (only when poll errors are surfaced)
    #[error("Polling job {job_id} failed (status {status}): {body}")]
    PollFailed {
        job_id: String,
        status: u16,
        body: String,
    },

    /// Too many consecutive poll timeouts (only when a limit is configured)
    #[error("Polling job {job_id} timed out {attempts} times in a row")]
    PollTimedOut { job_id: String, attempts: u32 },

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// The request never produced a response
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The payload could not be encoded as JSON
    #[error("Failed to encode payload: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Reasons a submission fails
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// Non-success status; carries the raw response body
    #[error("status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Success status but no job id in the body
    #[error("no job id received from /submit")]
    MissingJobId,
}

/// Failures of the transport itself
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request exceeded its timeout
    #[error("Request timed out")]
    Timeout,

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(reqwest::Error),

    /// Failure reported by a non-reqwest transport
    #[error("Transport failure: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Check if this error came from `submit`
    pub fn is_submission_error(&self) -> bool {
        matches!(self, Self::Submission(_))
    }

    /// The HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Submission(SubmissionError::Rejected { status, .. })
            | Self::PollFailed { status, .. }
            | Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|status| (400..500).contains(&status))
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|status| status >= 500)
    }
}
