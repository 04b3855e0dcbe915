//! Capture pipeline: normalized records, bounded buffering, filtering,
//! and event translation.
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`record`] | Normalized record shapes stored per session |
//! | [`buffer`] | Bounded per-session storage with batch eviction |
//! | [`filter`] | Pure query-filter evaluation over snapshots |
//! | [`translate`] | Debugger events → buffer mutations + stream updates |

pub mod buffer;
pub mod filter;
pub mod record;
pub mod translate;

pub use buffer::SessionBuffer;
pub use filter::{ConsoleFilter, NetworkFilter, filter_console, filter_requests};
pub use record::{ConsoleEntry, ConsoleLevel, NetworkRequestRecord};
pub use translate::StreamUpdate;
