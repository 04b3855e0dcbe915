//! Protocol message types.
//!
//! Two wire surfaces meet in this module:
//!
//! - [`event`]: debugger domain events delivered by the host API,
//!   parsed into a closed tagged union ([`DebuggerEvent`]).
//! - [`message`]: JSON messages exchanged with the relay over the
//!   duplex channel ([`Outbound`], [`Inbound`]).

pub mod event;
pub mod message;

pub use event::{ConsoleArg, DebuggerEvent};
pub use message::{Inbound, NetworkPhase, Outbound};
