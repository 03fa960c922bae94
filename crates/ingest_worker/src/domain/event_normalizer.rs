use crate::domain::ChangePayload;
use chrono::{DateTime, Utc};
use common::domain::{CanonicalEvent, EventTimestamp};
use serde_json::Value;
use tracing::debug;

/// Mutation types that produce a canonical event. An absent or empty mutation is accepted too.
pub const ACCEPTED_MUTATIONS: [&str; 2] = ["added", "modified"];

const USER_ID_KEY: &str = "userId";
const TIMESTAMP_KEY: &str = "timestamp";
const TIMESTAMP_FORMATTED_KEY: &str = "timestampFormatted";

/// Outcome of normalizing one change payload
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Event(CanonicalEvent),
    /// Payload carried a mutation type other than added/modified
    Skipped { mutation: String },
}

/// Maps change payloads to canonical events
///
/// Rules, in order:
/// 1. Drop mutations outside `added`/`modified` (case-insensitive)
/// 2. `userId` from `data.userId`, else the second segment of the document path
/// 3. `timestamp` from the first truthy of `data.timestamp`, `data.timestampFormatted`,
///    the payload `timestamp`, else the current time
/// 4. Merge `data` with `userId`, `timestamp` and `collection` on top
#[derive(Debug, Clone, Default)]
pub struct EventNormalizer;

impl EventNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, payload: ChangePayload) -> Normalized {
        self.normalize_at(payload, Utc::now())
    }

    /// Normalize using `now` as the fallback clock
    pub fn normalize_at(&self, payload: ChangePayload, now: DateTime<Utc>) -> Normalized {
        if let Some(mutation) = rejected_mutation(payload.event.as_deref()) {
            debug!(mutation = %mutation, "skipping mutation type");
            return Normalized::Skipped { mutation };
        }

        let user_id = extract_user_id(&payload);
        let timestamp = extract_timestamp(&payload, now);

        let ChangePayload {
            data, collection, ..
        } = payload;

        Normalized::Event(CanonicalEvent::new(
            user_id,
            timestamp,
            collection,
            data.unwrap_or_default(),
        ))
    }
}

fn rejected_mutation(event: Option<&str>) -> Option<String> {
    let event = event?;
    let mutation = event.to_lowercase();
    if mutation.is_empty() || ACCEPTED_MUTATIONS.contains(&mutation.as_str()) {
        None
    } else {
        Some(event.to_string())
    }
}

fn extract_user_id(payload: &ChangePayload) -> Option<String> {
    match payload.data_field(USER_ID_KEY) {
        Some(Value::String(user_id)) if !user_id.is_empty() => return Some(user_id.clone()),
        Some(Value::Number(user_id)) if user_id.as_f64() != Some(0.0) => {
            return Some(user_id.to_string())
        }
        _ => {}
    }

    // "<collection>/<userId>/..."
    payload
        .document_path
        .as_deref()
        .and_then(|path| path.split('/').nth(1))
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

fn extract_timestamp(payload: &ChangePayload, now: DateTime<Utc>) -> EventTimestamp {
    [
        payload.data_field(TIMESTAMP_KEY),
        payload.data_field(TIMESTAMP_FORMATTED_KEY),
        payload.timestamp.as_ref(),
    ]
    .into_iter()
    .flatten()
    .find(|value| is_truthy(value))
    .map(|value| EventTimestamp::Source(value.clone()))
    .unwrap_or_else(|| EventTimestamp::fallback_at(now))
}

/// `null`, `false`, `0` and `""` count as missing; objects and arrays never do.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
