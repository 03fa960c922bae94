use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Missing user id for event in collection {0}")]
    MissingUserId(String),

    #[error("Signal derivation error: {0}")]
    SignalDerivationError(String),

    #[error("Milestone aggregation error: {0}")]
    MilestoneAggregationError(String),

    #[error("Repository error: {0}")]
    RepositoryError(#[from] anyhow::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
