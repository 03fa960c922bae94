//! Self-contained signal and milestone stages so the handler can run without external services.

use async_trait::async_trait;
use common::domain::{
    CanonicalEvent, DomainError, DomainResult, MilestoneAggregator, Signal, SignalDeriver,
};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

const KIND_FIELDS: [&str; 2] = ["eventType", "type"];
const DEFAULT_KIND: &str = "event";

/// Emits one signal per event, named after the event's `eventType`/`type` field,
/// falling back to the collection name
#[derive(Debug, Default)]
pub struct FieldSignalDeriver;

impl FieldSignalDeriver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SignalDeriver for FieldSignalDeriver {
    async fn derive_signals(&self, event: &CanonicalEvent) -> DomainResult<Vec<Signal>> {
        let user_id = event.user_id().ok_or_else(|| {
            DomainError::MissingUserId(event.collection().unwrap_or("unknown").to_string())
        })?;

        let kind = KIND_FIELDS
            .iter()
            .find_map(|key| event.field(key).and_then(Value::as_str))
            .or(event.collection())
            .unwrap_or(DEFAULT_KIND);

        let signal = Signal::new(kind, Some(user_id.to_string()))
            .with_attribute("timestamp", event.timestamp().to_value());

        Ok(vec![signal])
    }
}

/// Keeps a running count per (user, signal kind)
#[derive(Debug, Default)]
pub struct InMemoryMilestoneAggregator {
    progress: RwLock<HashMap<(String, String), u64>>,
}

impl InMemoryMilestoneAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn progress(&self, user_id: &str, kind: &str) -> u64 {
        self.progress
            .read()
            .await
            .get(&(user_id.to_string(), kind.to_string()))
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl MilestoneAggregator for InMemoryMilestoneAggregator {
    async fn apply_milestones(
        &self,
        event: &CanonicalEvent,
        signals: Vec<Signal>,
    ) -> DomainResult<()> {
        let mut progress = self.progress.write().await;

        for signal in signals {
            let user_id = signal
                .user_id
                .or_else(|| event.user_id().map(str::to_string))
                .ok_or_else(|| {
                    DomainError::ValidationError(format!(
                        "signal {} has no user id",
                        signal.kind
                    ))
                })?;

            let count = progress.entry((user_id, signal.kind)).or_insert(0);
            *count += 1;
        }

        debug!(tracked = progress.len(), "applied milestones");

        Ok(())
    }
}
