use crate::domain::canonical_event::CanonicalEvent;
use crate::domain::result::DomainResult;
use crate::domain::signal::Signal;
use async_trait::async_trait;

/// Trait for folding signals into stored milestone progress
///
/// Implementations own their persistence; a failure aborts the batch that produced the event.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MilestoneAggregator: Send + Sync {
    /// Apply the signals derived from `event` to milestone state
    async fn apply_milestones(
        &self,
        event: &CanonicalEvent,
        signals: Vec<Signal>,
    ) -> DomainResult<()>;
}
