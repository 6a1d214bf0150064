//! Worker health endpoint

use openpixels_core::dto::health::HealthStatus;

use crate::JobClient;
use crate::error::{ClientError, Result};
use crate::transport::{Transport, TransportRequest};

impl<T: Transport> JobClient<T> {
    /// Check that the worker is reachable
    ///
    /// # Returns
    /// The worker's self-reported status (`"ok"` when healthy)
    pub async fn health(&self) -> Result<HealthStatus> {
        let response = self.transport.send(TransportRequest::get("/status")).await?;

        if !response.is_success() {
            return Err(ClientError::api_error(
                response.status.as_u16(),
                response.body,
            ));
        }

        response.json()
    }
}
