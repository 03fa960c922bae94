use crate::domain::{
    ChangePayload, DecodeError, EventNormalizer, IngestError, IngestResult, Invocation,
    InvocationResponse, Normalized, RecordDecoder, TriggerKind,
};
use chrono::Utc;
use common::domain::{CanonicalEvent, MilestoneAggregator, SignalDeriver};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Deployment environment the handler runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeEnvironment {
    #[default]
    Production,
    NonProduction,
}

impl RuntimeEnvironment {
    /// `production` (any case) is Production, every other name is NonProduction
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("production") {
            Self::Production
        } else {
            Self::NonProduction
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChangeBatchConfig {
    /// Outside production an empty batch dispatches `CanonicalEvent::sample` instead of exiting
    pub environment: RuntimeEnvironment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    ShortCircuited {
        trigger: String,
    },
    Completed {
        events_dispatched: usize,
        records_skipped: usize,
    },
}

/// Domain service that runs one invocation's batch of change records
///
/// Flow:
/// 1. Classify the trigger; scheduled triggers and empty batches return immediately
/// 2. Decode every record (first failure aborts the batch)
/// 3. Normalize every payload, dropping mutations other than added/modified
/// 4. For each event in order: derive signals, then apply milestones (first failure aborts)
pub struct ChangeBatchService {
    signal_deriver: Arc<dyn SignalDeriver>,
    milestone_aggregator: Arc<dyn MilestoneAggregator>,
    decoder: RecordDecoder,
    normalizer: EventNormalizer,
    config: ChangeBatchConfig,
}

impl ChangeBatchService {
    pub fn new(
        signal_deriver: Arc<dyn SignalDeriver>,
        milestone_aggregator: Arc<dyn MilestoneAggregator>,
        config: ChangeBatchConfig,
    ) -> Self {
        Self {
            signal_deriver,
            milestone_aggregator,
            decoder: RecordDecoder::new(),
            normalizer: EventNormalizer::new(),
            config,
        }
    }

    /// Process an invocation and map the outcome onto the handler response
    pub async fn handle(&self, invocation: Invocation) -> InvocationResponse {
        match self.process(invocation).await {
            Ok(BatchOutcome::ShortCircuited { trigger }) => {
                InvocationResponse::short_circuit(&trigger)
            }
            Ok(BatchOutcome::Completed {
                events_dispatched,
                records_skipped,
            }) => InvocationResponse::completed(events_dispatched, records_skipped),
            Err(e) => {
                error!(error = %e, "error processing batch");
                InvocationResponse::failure(&e)
            }
        }
    }

    #[instrument(skip(self, invocation), fields(trigger = %invocation.trigger()))]
    pub async fn process(&self, invocation: Invocation) -> IngestResult<BatchOutcome> {
        let trigger = invocation.trigger().to_string();
        let kind = invocation.trigger_kind();

        info!(trigger = %trigger, kind = ?kind, "invocation trigger");

        if kind == TriggerKind::Scheduled {
            info!("scheduled invocation, no records to process; exiting");
            return Ok(BatchOutcome::ShortCircuited { trigger });
        }

        let Some(records) = invocation.records() else {
            if !self.config.environment.is_production() {
                warn!("no records to process; dispatching built-in sample event");
                self.dispatch(&CanonicalEvent::sample(Utc::now())).await?;
                return Ok(BatchOutcome::Completed {
                    events_dispatched: 1,
                    records_skipped: 0,
                });
            }

            info!("no records to process; exiting");
            return Ok(BatchOutcome::ShortCircuited { trigger });
        };

        let payloads = self.decode_all(records)?;
        let payload_count = payloads.len();
        let events = self.normalize_all(payloads);
        let records_skipped = payload_count - events.len();

        debug!(
            record_count = payload_count,
            event_count = events.len(),
            records_skipped,
            "normalized batch"
        );

        for (index, event) in events.iter().enumerate() {
            if let Err(e) = self.dispatch(event).await {
                error!(
                    index,
                    user_id = event.user_id().unwrap_or_default(),
                    error = %e,
                    "failed to dispatch event, aborting batch"
                );
                return Err(e);
            }
        }

        info!(
            events_dispatched = events.len(),
            records_skipped, "batch processed"
        );

        Ok(BatchOutcome::Completed {
            events_dispatched: events.len(),
            records_skipped,
        })
    }

    /// Decode records in order, stopping at the first failure
    pub fn decode_all(&self, records: &[Value]) -> Result<Vec<ChangePayload>, DecodeError> {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                self.decoder.decode_value(record).map_err(|e| {
                    let sequence_number = record
                        .pointer("/kinesis/sequenceNumber")
                        .and_then(|v| v.as_str())
                        .unwrap_or_default();
                    error!(
                        index,
                        sequence_number,
                        error = %e,
                        "failed to decode record"
                    );
                    e
                })
            })
            .collect()
    }

    /// Normalize payloads in order; skipped mutations leave no gap in the output
    pub fn normalize_all(&self, payloads: Vec<ChangePayload>) -> Vec<CanonicalEvent> {
        payloads
            .into_iter()
            .filter_map(|payload| match self.normalizer.normalize(payload) {
                Normalized::Event(event) => Some(event),
                Normalized::Skipped { .. } => None,
            })
            .collect()
    }

    async fn dispatch(&self, event: &CanonicalEvent) -> IngestResult<()> {
        let signals = self
            .signal_deriver
            .derive_signals(event)
            .await
            .map_err(IngestError::SignalDerivation)?;

        debug!(
            user_id = event.user_id().unwrap_or_default(),
            signal_count = signals.len(),
            "derived signals"
        );

        self.milestone_aggregator
            .apply_milestones(event, signals)
            .await
            .map_err(IngestError::MilestoneAggregation)
    }
}
