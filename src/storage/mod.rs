//! Log storage seam consumed by the truncation queue.
//!
//! The log storage owns the log bounds, the (possibly untrusted) byte
//! accounting and the truncations that were proposed but are not yet durable.

mod mem_log_storage;
mod pending_truncations;
mod raft_log;

pub use mem_log_storage::*;
pub use pending_truncations::*;
#[doc(hidden)]
pub use raft_log::*;
