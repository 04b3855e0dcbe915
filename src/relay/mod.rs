//! Relay transport: the duplex channel to the signaling endpoint.
//!
//! [`RelayConnection`] owns the connect/reconnect state machine and the
//! fire-and-forget send path; [`RelayDialer`] abstracts the physical
//! channel so tests can substitute in-memory links for the production
//! WebSocket implementation.

pub mod connection;
pub mod dialer;

pub use connection::{RelayConnection, RelayLink, RelayState};
pub use dialer::{RelayDialer, WebSocketDialer};
