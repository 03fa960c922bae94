use crate::domain::DecodeError;
use serde_json::{Map, Value};

/// Decoded change-capture document as delivered by the stream
///
/// Extraction is lenient: fields with an unexpected JSON type are treated as absent
/// rather than failing the record. Only a non-object document is rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangePayload {
    /// Mutation type as sent ("added", "MODIFIED", ...)
    pub event: Option<String>,
    pub data: Option<Map<String, Value>>,
    pub document_path: Option<String>,
    pub collection: Option<String>,
    pub timestamp: Option<Value>,
}

impl ChangePayload {
    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let mut obj = match value {
            Value::Object(obj) => obj,
            other => return Err(DecodeError::NotAnObject(json_type_name(&other))),
        };

        let document_path = take_string(&mut obj, "document_path")
            .or_else(|| take_string(&mut obj, "documentPath"));

        let data = match obj.remove("data") {
            Some(Value::Object(data)) => Some(data),
            _ => None,
        };

        Ok(Self {
            event: take_string(&mut obj, "event"),
            data,
            document_path,
            collection: take_string(&mut obj, "collection"),
            timestamp: obj.remove("timestamp"),
        })
    }

    pub fn data_field(&self, key: &str) -> Option<&Value> {
        self.data.as_ref().and_then(|data| data.get(key))
    }
}

fn take_string(obj: &mut Map<String, Value>, key: &str) -> Option<String> {
    match obj.remove(key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_extracts_known_fields() {
        let payload = ChangePayload::from_value(json!({
            "event": "Added",
            "data": { "userId": "u1", "screen": "home" },
            "document_path": "app_usage_events/u1/events/doc1",
            "collection": "events",
            "timestamp": 1700000000000i64
        }))
        .unwrap();

        assert_eq!(payload.event.as_deref(), Some("Added"));
        assert_eq!(payload.data_field("screen"), Some(&json!("home")));
        assert_eq!(
            payload.document_path.as_deref(),
            Some("app_usage_events/u1/events/doc1")
        );
        assert_eq!(payload.collection.as_deref(), Some("events"));
        assert_eq!(payload.timestamp, Some(json!(1700000000000i64)));
    }

    #[test]
    fn test_from_value_accepts_camel_case_document_path() {
        let payload = ChangePayload::from_value(json!({
            "documentPath": "users/u9"
        }))
        .unwrap();

        assert_eq!(payload.document_path.as_deref(), Some("users/u9"));
    }

    #[test]
    fn test_from_value_prefers_snake_case_document_path() {
        let payload = ChangePayload::from_value(json!({
            "document_path": "a/first",
            "documentPath": "b/second"
        }))
        .unwrap();

        assert_eq!(payload.document_path.as_deref(), Some("a/first"));
    }

    #[test]
    fn test_from_value_treats_mistyped_fields_as_absent() {
        let payload = ChangePayload::from_value(json!({
            "event": 3,
            "data": "not-an-object",
            "collection": ["x"]
        }))
        .unwrap();

        assert_eq!(payload.event, None);
        assert_eq!(payload.data, None);
        assert_eq!(payload.collection, None);
    }

    #[test]
    fn test_from_value_empty_object() {
        let payload = ChangePayload::from_value(json!({})).unwrap();
        assert_eq!(payload, ChangePayload::default());
    }

    #[test]
    fn test_from_value_rejects_non_object() {
        let err = ChangePayload::from_value(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, DecodeError::NotAnObject("array")));
    }
}
