//! Scripted transport for unit tests

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use crate::error::TransportError;
use crate::transport::{Transport, TransportRequest, TransportResponse};

enum Step {
    Reply(TransportResponse),
    Timeout,
    Fail(String),
}

/// Answers requests from a fixed script, in order, and records them
///
/// Once the script runs out every request fails, so a runaway poll loop
/// ends instead of hanging the test.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn push(self, step: Step) -> Self {
        self.script.lock().unwrap().push_back(step);
        self
    }

    fn response(status: u16, headers: &[(&'static str, &str)], body: String) -> TransportResponse {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.insert(
                HeaderName::from_static(*name),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        TransportResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers: map,
            body,
        }
    }

    /// A successful submission of job `id` on `machine_id`
    pub(crate) fn submitted(self, id: &str, machine_id: &str) -> Self {
        let body = serde_json::json!({ "id": id }).to_string();
        self.push(Step::Reply(Self::response(
            201,
            &[("machine-id", machine_id)],
            body,
        )))
    }

    pub(crate) fn reply(self, status: u16, body: Value) -> Self {
        self.push(Step::Reply(Self::response(status, &[], body.to_string())))
    }

    pub(crate) fn reply_text(self, status: u16, body: &str) -> Self {
        self.push(Step::Reply(Self::response(status, &[], body.to_string())))
    }

    pub(crate) fn timeout(self) -> Self {
        self.push(Step::Timeout)
    }

    pub(crate) fn fail(self, message: &str) -> Self {
        self.push(Step::Fail(message.to_string()))
    }

    /// Every request received so far
    pub(crate) fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Poll requests received so far
    pub(crate) fn polls(&self) -> Vec<TransportRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.path.starts_with("/poll/"))
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.requests.lock().unwrap().push(request);

        match self.script.lock().unwrap().pop_front() {
            Some(Step::Reply(response)) => Ok(response),
            Some(Step::Timeout) => Err(TransportError::Timeout),
            Some(Step::Fail(message)) => Err(TransportError::Other(message)),
            None => Err(TransportError::Other("script exhausted".to_string())),
        }
    }
}
