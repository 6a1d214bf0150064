//! Job DTOs

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::job::is_truthy;

/// Body returned by `POST /submit`
///
/// The id is kept loose here because a successful response without a usable
/// one is a failure the client has to report, not a parse error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub id: Option<Value>,
}

impl SubmitResponse {
    /// The job id, if it is a non-empty string or a truthy number
    pub fn job_id(self) -> Option<String> {
        match self.id.filter(is_truthy)? {
            Value::String(id) => Some(id),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_id(body: &str) -> Option<String> {
        serde_json::from_str::<SubmitResponse>(body).unwrap().job_id()
    }

    #[test]
    fn test_job_id_present() {
        assert_eq!(job_id(r#"{"id":"j1"}"#).as_deref(), Some("j1"));
    }

    #[test]
    fn test_numeric_job_id() {
        assert_eq!(job_id(r#"{"id":123}"#).as_deref(), Some("123"));
        assert_eq!(job_id(r#"{"id":0}"#), None);
    }

    #[test]
    fn test_job_id_missing_or_unusable() {
        assert_eq!(job_id(r#"{"queued":true}"#), None);
        assert_eq!(job_id(r#"{"id":""}"#), None);
        assert_eq!(job_id(r#"{"id":null}"#), None);
        assert_eq!(job_id(r#"{"id":{"value":"j1"}}"#), None);
    }
}
