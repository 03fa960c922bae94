mod canonical_event;
mod milestone;
mod result;
mod signal;

pub use canonical_event::*;
pub use milestone::*;
pub use result::*;
pub use signal::*;
