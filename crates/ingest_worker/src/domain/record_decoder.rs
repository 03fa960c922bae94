use crate::domain::{ChangePayload, DecodeError};
use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

/// Standard alphabet, padding optional on decode
const RECORD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// One Kinesis record as it appears in the invocation `Records` array
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawRecord {
    pub kinesis: KinesisData,
    #[serde(rename = "eventID", default)]
    pub event_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KinesisData {
    /// Base64 of the UTF-8 JSON change document
    pub data: String,
    #[serde(default)]
    pub partition_key: Option<String>,
    #[serde(default)]
    pub sequence_number: Option<String>,
}

impl RawRecord {
    pub fn from_value(value: &Value) -> Result<Self, DecodeError> {
        RawRecord::deserialize(value).map_err(|e| DecodeError::MalformedRecord(e.to_string()))
    }
}

/// Turns transport records into change payloads: base64 → UTF-8 → JSON → ChangePayload
#[derive(Debug, Clone, Default)]
pub struct RecordDecoder;

impl RecordDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode a record still in its raw invocation form
    pub fn decode_value(&self, value: &Value) -> Result<ChangePayload, DecodeError> {
        let record = RawRecord::from_value(value)?;
        self.decode(&record)
    }

    pub fn decode(&self, record: &RawRecord) -> Result<ChangePayload, DecodeError> {
        let bytes = RECORD_ENGINE.decode(record.kinesis.data.as_bytes())?;
        let text = String::from_utf8(bytes)?;
        let value: Value = serde_json::from_str(&text)?;

        info!(
            sequence_number = record.kinesis.sequence_number.as_deref().unwrap_or_default(),
            payload = %value,
            "decoded change payload"
        );

        ChangePayload::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use serde_json::json;

    fn record_for(text: &str) -> Value {
        json!({
            "eventID": "shardId-000000000000:4959",
            "kinesis": {
                "partitionKey": "pk-1",
                "sequenceNumber": "4959",
                "data": STANDARD.encode(text)
            }
        })
    }

    #[test]
    fn test_decode_valid_record() {
        let decoder = RecordDecoder::new();
        let record =
            record_for(r#"{"event":"added","data":{"userId":"u1"},"collection":"events"}"#);

        let payload = decoder.decode_value(&record).unwrap();

        assert_eq!(payload.event.as_deref(), Some("added"));
        assert_eq!(payload.data_field("userId"), Some(&json!("u1")));
        assert_eq!(payload.collection.as_deref(), Some("events"));
    }

    #[test]
    fn test_raw_record_carries_metadata() {
        let record = RawRecord::from_value(&record_for("{}")).unwrap();

        assert_eq!(record.event_id.as_deref(), Some("shardId-000000000000:4959"));
        assert_eq!(record.kinesis.partition_key.as_deref(), Some("pk-1"));
        assert_eq!(record.kinesis.sequence_number.as_deref(), Some("4959"));
    }

    #[test]
    fn test_decode_missing_kinesis_data() {
        let decoder = RecordDecoder::new();
        let err = decoder
            .decode_value(&json!({ "kinesis": { "partitionKey": "pk" } }))
            .unwrap_err();

        assert!(matches!(err, DecodeError::MalformedRecord(_)));
    }

    #[test]
    fn test_decode_unpadded_base64() {
        let decoder = RecordDecoder::new();

        let payload = decoder
            .decode_value(&json!({ "kinesis": { "data": "e30" } }))
            .unwrap();

        assert_eq!(payload, ChangePayload::from_value(json!({})).unwrap());
    }

    #[test]
    fn test_decode_invalid_base64() {
        let decoder = RecordDecoder::new();
        let err = decoder
            .decode_value(&json!({ "kinesis": { "data": "!!not base64!!" } }))
            .unwrap_err();

        assert!(matches!(err, DecodeError::Base64(_)));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let decoder = RecordDecoder::new();
        let data = STANDARD.encode([0xff, 0xfe, 0xfd]);
        let err = decoder
            .decode_value(&json!({ "kinesis": { "data": data } }))
            .unwrap_err();

        assert!(matches!(err, DecodeError::Utf8(_)));
    }

    #[test]
    fn test_decode_invalid_json() {
        let decoder = RecordDecoder::new();
        let err = decoder
            .decode_value(&record_for("{\"event\": \"added\""))
            .unwrap_err();

        assert!(matches!(err, DecodeError::Json(_)));
        assert!(err.to_string().starts_with("payload is not valid JSON"));
    }

    #[test]
    fn test_decode_non_object_json() {
        let decoder = RecordDecoder::new();
        let err = decoder.decode_value(&record_for("\"just a string\"")).unwrap_err();

        assert!(matches!(err, DecodeError::NotAnObject("string")));
    }
}
