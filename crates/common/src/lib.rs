pub mod domain;
pub mod telemetry;

pub use domain::*;
pub use telemetry::*;

// Re-export mocks when testing feature is enabled
#[cfg(any(test, feature = "testing"))]
pub use domain::MockMilestoneAggregator;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockSignalDeriver;
