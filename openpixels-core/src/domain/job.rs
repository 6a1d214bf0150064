//! Job domain types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Kind of a status update, taken from its `type` field
///
/// Kinds this crate does not know about are kept verbatim so that a newer
/// worker can add them without breaking older clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UpdateKind {
    /// Progress report, more updates follow
    Status,
    /// Terminal update, nothing follows
    Result,
    Other(String),
}

impl UpdateKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Status => "status",
            Self::Result => "result",
            Self::Other(kind) => kind,
        }
    }
}

impl From<String> for UpdateKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "status" => Self::Status,
            "result" => Self::Result,
            _ => Self::Other(kind),
        }
    }
}

impl From<UpdateKind> for String {
    fn from(kind: UpdateKind) -> Self {
        match kind {
            UpdateKind::Other(kind) => kind,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One answer of the poll endpoint
///
/// The worker's response is exposed as-is: fields the client does not
/// interpret are collected in `extra` and serialized back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    #[serde(rename = "type")]
    pub kind: UpdateKind,
    /// Worker-defined progress, usually a string such as "queued"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StatusUpdate {
    /// Whether polling should stop after this update
    pub fn is_terminal(&self) -> bool {
        self.kind == UpdateKind::Result
    }
}

/// Final value of a job, reduced from its terminal update
///
/// `data` and `error` are only set when the terminal update carried a truthy
/// value for them, and are left out of the serialized form otherwise.
/// `status` is always serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobOutcome {
    pub status: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl JobOutcome {
    /// Whether the worker reported an error for the job
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

impl From<StatusUpdate> for JobOutcome {
    fn from(update: StatusUpdate) -> Self {
        Self {
            status: update.status,
            data: update.data.filter(is_truthy),
            error: update.error.filter(is_truthy),
        }
    }
}

/// JSON truthiness: `null`, `false`, zero, and empty strings, arrays and
/// objects are falsy, everything else is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_kind_known_and_unknown() {
        let status: StatusUpdate = serde_json::from_value(json!({"type": "status"})).unwrap();
        assert_eq!(status.kind, UpdateKind::Status);
        assert!(!status.is_terminal());

        let result: StatusUpdate = serde_json::from_value(json!({"type": "result"})).unwrap();
        assert!(result.is_terminal());

        let log: StatusUpdate = serde_json::from_value(json!({"type": "log"})).unwrap();
        assert_eq!(log.kind, UpdateKind::Other("log".to_string()));
        assert!(!log.is_terminal());
    }

    #[test]
    fn test_update_without_type_is_rejected() {
        assert!(serde_json::from_value::<StatusUpdate>(json!({"status": "queued"})).is_err());
    }

    #[test]
    fn test_update_keeps_unknown_fields() {
        let raw = json!({"type": "status", "status": "running", "meta": {"progress": 0.5}});
        let update: StatusUpdate = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(update.status, Some(json!("running")));
        assert_eq!(update.extra["meta"], json!({"progress": 0.5}));
        assert_eq!(serde_json::to_value(&update).unwrap(), raw);
    }

    #[test]
    fn test_structured_status_passes_through() {
        let update: StatusUpdate = serde_json::from_value(json!({
            "type": "result",
            "status": {"stage": "done", "progress": 1.0},
        }))
        .unwrap();

        let outcome = JobOutcome::from(update);
        assert_eq!(outcome.status, Some(json!({"stage": "done", "progress": 1.0})));
    }

    #[test]
    fn test_outcome_copies_truthy_fields() {
        let update: StatusUpdate = serde_json::from_value(json!({
            "type": "result",
            "status": "done",
            "data": {"url": "x"},
        }))
        .unwrap();

        let outcome = JobOutcome::from(update);
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"status": "done", "data": {"url": "x"}})
        );
        assert!(!outcome.is_error());
    }

    #[test]
    fn test_outcome_drops_falsy_fields() {
        let update: StatusUpdate = serde_json::from_value(json!({
            "type": "result",
            "status": "failed",
            "data": null,
            "error": "oom",
        }))
        .unwrap();

        let outcome = JobOutcome::from(update);
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"status": "failed", "error": "oom"})
        );

        let update: StatusUpdate = serde_json::from_value(json!({
            "type": "result",
            "data": {},
            "error": "",
        }))
        .unwrap();
        assert_eq!(
            serde_json::to_value(JobOutcome::from(update)).unwrap(),
            json!({"status": null})
        );
    }

    #[test]
    fn test_truthiness() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!(""), json!([]), json!({})] {
            assert!(!is_truthy(&falsy), "{falsy} should be falsy");
        }
        for truthy in [json!(true), json!(1), json!(-0.5), json!("x"), json!([0]), json!({"a": null})] {
            assert!(is_truthy(&truthy), "{truthy} should be truthy");
        }
    }
}
