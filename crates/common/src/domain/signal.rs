use crate::domain::canonical_event::CanonicalEvent;
use crate::domain::result::DomainResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Intermediate unit derived from a canonical event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl Signal {
    pub fn new(kind: impl Into<String>, user_id: Option<String>) -> Self {
        Self {
            kind: kind.into(),
            user_id,
            attributes: Map::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}

/// Trait for turning a canonical event into signals
///
/// Implementations should:
/// - Return zero or more signals for the event
/// - Reject events they cannot interpret (e.g. missing user) with a DomainError
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SignalDeriver: Send + Sync {
    /// Derive signals for a single event
    ///
    /// # Arguments
    /// * `event` - Normalized change event
    ///
    /// # Returns
    /// Signals in derivation order, DomainError on failure
    async fn derive_signals(&self, event: &CanonicalEvent) -> DomainResult<Vec<Signal>>;
}
