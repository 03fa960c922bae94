use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::fmt::Display;

/// Trigger values that mark a scheduled keep-alive run rather than a data delivery
pub const SCHEDULED_TRIGGERS: [&str; 2] = ["cron", "cronjob"];
pub const UNKNOWN_TRIGGER: &str = "unknown";
pub const SHORT_CIRCUIT_MESSAGE: &str = "cronjob is active";
pub const COMPLETED_MESSAGE: &str = "batch processed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    Scheduled,
    Data,
}

/// One handler invocation: an optional trigger label plus the delivered `Records`
///
/// Parsing never fails. Anything that is not an object is an invocation with no trigger
/// and no records, and `Records` is kept raw so a non-array value can be told apart
/// from a missing one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invocation {
    pub trigger: Option<String>,
    pub records: Option<Value>,
}

impl Invocation {
    pub fn from_value(value: Value) -> Self {
        let mut obj = match value {
            Value::Object(obj) => obj,
            _ => return Self::default(),
        };

        let trigger = match obj.remove("trigger") {
            Some(Value::String(trigger)) if !trigger.is_empty() => Some(trigger),
            _ => None,
        };

        Self {
            trigger,
            records: obj.remove("Records"),
        }
    }

    pub fn with_records(trigger: Option<&str>, records: Vec<Value>) -> Self {
        Self {
            trigger: trigger.map(str::to_string),
            records: Some(Value::Array(records)),
        }
    }

    /// Trigger label, `"unknown"` when absent
    pub fn trigger(&self) -> &str {
        self.trigger.as_deref().unwrap_or(UNKNOWN_TRIGGER)
    }

    pub fn trigger_kind(&self) -> TriggerKind {
        if SCHEDULED_TRIGGERS.contains(&self.trigger()) {
            TriggerKind::Scheduled
        } else {
            TriggerKind::Data
        }
    }

    /// Records to process, `None` when missing, not an array, or empty
    pub fn records(&self) -> Option<&[Value]> {
        match &self.records {
            Some(Value::Array(records)) if !records.is_empty() => Some(records.as_slice()),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Invocation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

/// Handler response: `{ "statusCode": ..., "body": {...} }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub status_code: u16,
    pub body: Value,
}

impl InvocationResponse {
    pub fn short_circuit(trigger: &str) -> Self {
        Self {
            status_code: 200,
            body: json!({
                "message": SHORT_CIRCUIT_MESSAGE,
                "trigger": trigger,
            }),
        }
    }

    pub fn completed(events_dispatched: usize, records_skipped: usize) -> Self {
        Self {
            status_code: 200,
            body: json!({
                "message": COMPLETED_MESSAGE,
                "eventsDispatched": events_dispatched,
                "recordsSkipped": records_skipped,
            }),
        }
    }

    pub fn failure(error: &impl Display) -> Self {
        Self {
            status_code: 500,
            body: json!({ "error": error.to_string() }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_defaults_to_unknown() {
        let missing = Invocation::from_value(json!({}));
        let empty = Invocation::from_value(json!({ "trigger": "" }));
        let mistyped = Invocation::from_value(json!({ "trigger": 7 }));

        assert_eq!(missing.trigger(), "unknown");
        assert_eq!(empty.trigger(), "unknown");
        assert_eq!(mistyped.trigger(), "unknown");
    }

    #[test]
    fn test_scheduled_trigger_classification() {
        for trigger in ["cron", "cronjob"] {
            let invocation = Invocation::from_value(json!({ "trigger": trigger }));
            assert_eq!(invocation.trigger_kind(), TriggerKind::Scheduled);
        }

        for trigger in ["CRON", "kinesis", "cron-job"] {
            let invocation = Invocation::from_value(json!({ "trigger": trigger }));
            assert_eq!(invocation.trigger_kind(), TriggerKind::Data);
        }

        assert_eq!(Invocation::default().trigger_kind(), TriggerKind::Data);
    }

    #[test]
    fn test_records_requires_non_empty_array() {
        assert!(Invocation::from_value(json!({})).records().is_none());
        assert!(Invocation::from_value(json!({ "Records": [] })).records().is_none());
        assert!(Invocation::from_value(json!({ "Records": {"a": 1} }))
            .records()
            .is_none());
        assert!(Invocation::from_value(json!({ "Records": null })).records().is_none());

        let invocation = Invocation::from_value(json!({ "Records": [{}, {}] }));
        assert_eq!(invocation.records().map(<[Value]>::len), Some(2));
    }

    #[test]
    fn test_non_object_invocation_is_empty() {
        assert_eq!(Invocation::from_value(json!(null)), Invocation::default());
        assert_eq!(Invocation::from_value(json!("cron")), Invocation::default());
    }

    #[test]
    fn test_deserialize_invocation() {
        let invocation: Invocation =
            serde_json::from_str(r#"{"trigger":"kinesis","Records":[{"kinesis":{"data":"e30="}}]}"#)
                .unwrap();

        assert_eq!(invocation.trigger(), "kinesis");
        assert_eq!(invocation.records().map(<[Value]>::len), Some(1));
    }

    #[test]
    fn test_short_circuit_response_shape() {
        let response = InvocationResponse::short_circuit("cron");

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "statusCode": 200,
                "body": { "message": "cronjob is active", "trigger": "cron" }
            })
        );
        assert!(response.is_success());
    }

    #[test]
    fn test_failure_response_shape() {
        let response = InvocationResponse::failure(&"milestone store unavailable");

        assert_eq!(response.status_code, 500);
        assert_eq!(
            response.body,
            json!({ "error": "milestone store unavailable" })
        );
        assert!(!response.is_success());
    }

    #[test]
    fn test_completed_response_shape() {
        let response = InvocationResponse::completed(3, 1);

        assert_eq!(
            response.body,
            json!({ "message": "batch processed", "eventsDispatched": 3, "recordsSkipped": 1 })
        );
    }
}
