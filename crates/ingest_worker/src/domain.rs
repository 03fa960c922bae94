mod change_batch_service;
mod change_payload;
mod error;
mod event_normalizer;
mod invocation;
mod record_decoder;

pub use change_batch_service::*;
pub use change_payload::*;
pub use error::*;
pub use event_normalizer::*;
pub use invocation::*;
pub use record_decoder::*;
