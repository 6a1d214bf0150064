//! Health DTOs

use serde::{Deserialize, Serialize};

/// Body returned by `GET /status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    /// Whether the worker reported itself as healthy
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
