use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

pub const USER_ID_FIELD: &str = "userId";
pub const TIMESTAMP_FIELD: &str = "timestamp";
pub const COLLECTION_FIELD: &str = "collection";

const SAMPLE_USER_ID: &str = "sample-user";
const SAMPLE_COLLECTION: &str = "app_usage_events";

/// Timestamp attached to a canonical event
///
/// `Source` carries the first usable timestamp found on the change payload, untouched.
/// `Fallback` is the wall-clock time (epoch millis) taken when the payload had none.
#[derive(Debug, Clone, PartialEq)]
pub enum EventTimestamp {
    Source(Value),
    Fallback(i64),
}

impl EventTimestamp {
    pub fn fallback_at(now: DateTime<Utc>) -> Self {
        Self::Fallback(now.timestamp_millis())
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Source(value) => value.clone(),
            Self::Fallback(millis) => Value::from(*millis),
        }
    }
}

impl Serialize for EventTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Source(value) => value.serialize(serializer),
            Self::Fallback(millis) => serializer.serialize_i64(*millis),
        }
    }
}

/// Normalized change event handed to the signal and milestone stages
///
/// The well-known fields are typed; everything else from the source document is kept
/// in an open passthrough map. The passthrough map never holds `userId`, `timestamp`
/// or `collection`, so the typed fields always win when the event is flattened.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalEvent {
    user_id: Option<String>,
    timestamp: EventTimestamp,
    collection: Option<String>,
    fields: Map<String, Value>,
}

impl CanonicalEvent {
    pub fn new(
        user_id: Option<String>,
        timestamp: EventTimestamp,
        collection: Option<String>,
        mut fields: Map<String, Value>,
    ) -> Self {
        fields.remove(USER_ID_FIELD);
        fields.remove(TIMESTAMP_FIELD);
        fields.remove(COLLECTION_FIELD);

        Self {
            user_id,
            timestamp,
            collection,
            fields,
        }
    }

    /// Built-in event used by non-production environments when a batch carries no records
    pub fn sample(now: DateTime<Utc>) -> Self {
        let mut fields = Map::new();
        fields.insert("eventType".to_string(), Value::from("app_open"));
        fields.insert("platform".to_string(), Value::from("ios"));
        fields.insert("sample".to_string(), Value::Bool(true));

        Self::new(
            Some(SAMPLE_USER_ID.to_string()),
            EventTimestamp::fallback_at(now),
            Some(SAMPLE_COLLECTION.to_string()),
            fields,
        )
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn timestamp(&self) -> &EventTimestamp {
        &self.timestamp
    }

    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Flatten into a single JSON object: passthrough fields overlaid by the typed ones.
    /// Absent optional fields are omitted.
    pub fn to_json(&self) -> Value {
        let mut obj = self.fields.clone();
        if let Some(user_id) = &self.user_id {
            obj.insert(USER_ID_FIELD.to_string(), Value::from(user_id.as_str()));
        }
        obj.insert(TIMESTAMP_FIELD.to_string(), self.timestamp.to_value());
        if let Some(collection) = &self.collection {
            obj.insert(COLLECTION_FIELD.to_string(), Value::from(collection.as_str()));
        }
        Value::Object(obj)
    }
}

impl Serialize for CanonicalEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
