use common::domain::DomainError;
use thiserror::Error;

/// Failure turning one transport record into a change payload
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Batch-fatal failure. The display text is what ends up in the failure response,
/// so collaborator errors are passed through untouched.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    SignalDerivation(DomainError),

    #[error(transparent)]
    MilestoneAggregation(DomainError),
}

pub type IngestResult<T> = std::result::Result<T, IngestError>;
