//! Session lifecycle: per-tab debug sessions and the registry that
//! indexes them by tab and by token.

pub mod registry;
pub mod session;

pub use registry::SessionRegistry;
pub use session::{DebugSession, SessionState};
