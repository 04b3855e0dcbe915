//! Debug Bridge - Per-tab debug session capture and relay library.
//!
//! This library detects debuggable browser tabs, captures their network
//! and console activity through the host's remote debugging interface,
//! and relays that activity to a signaling endpoint over a duplex
//! channel.
//!
//! # Architecture
//!
//! The bridge sits between two collaborators:
//!
//! - **Host End**: Tab lifecycle, debugger attach/detach, raw protocol
//!   events ([`DebuggerHost`] + a [`HostNotification`] channel)
//! - **Relay End**: Session announcements, streamed activity, snapshot
//!   queries over one shared WebSocket ([`RelayDialer`])
//!
//! Key design principles:
//!
//! - A top-level document response carrying the marker header opts a tab
//!   in; the header's value is the session token
//! - One [`BridgeController`] task owns all mutable state, so no locking
//! - Bounded per-session buffers with batch eviction, oldest-first
//! - Fire-and-forget relay delivery: at-most-once for streamed activity,
//!   bounded snapshots on demand
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use debug_bridge::{BridgeConfig, BridgeController, WebSocketDialer};
//! use tokio::sync::mpsc;
//!
//! # struct MyHost;
//! # #[async_trait::async_trait]
//! # impl debug_bridge::DebuggerHost for MyHost {
//! #     async fn attach(&self, _: debug_bridge::TabId) -> debug_bridge::Result<debug_bridge::AttachHandle> { unimplemented!() }
//! #     async fn enable_domains(&self, _: debug_bridge::AttachHandle, _: &[&str]) -> debug_bridge::Result<()> { unimplemented!() }
//! #     async fn fetch_response_body(&self, _: debug_bridge::AttachHandle, _: &str) -> debug_bridge::Result<debug_bridge::ResponseBody> { unimplemented!() }
//! #     async fn detach(&self, _: debug_bridge::AttachHandle, _: &str) {}
//! # }
//! #[tokio::main]
//! async fn main() -> debug_bridge::Result<()> {
//!     let config = BridgeConfig::new("wss://relay.example.com/bridge");
//!     let (host_tx, host_rx) = mpsc::unbounded_channel();
//!
//!     // host_tx feeds tab and debugger notifications into the bridge.
//!     let controller = BridgeController::new(
//!         config,
//!         Arc::new(MyHost),
//!         Arc::new(WebSocketDialer::new()),
//!         host_rx,
//!     )?;
//!     controller.run().await;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`bridge`] | Top-level controller and event loop |
//! | [`capture`] | Records, bounded buffers, filters, event translation |
//! | [`config`] | [`BridgeConfig`] and defaults |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`host`] | Host debugging collaborator boundary |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Debugger event parsing and relay wire messages |
//! | [`relay`] | Duplex channel state machine and dialing |
//! | [`session`] | Per-tab session state machine and registry |

// ============================================================================
// Modules
// ============================================================================

/// Top-level bridge coordination.
///
/// [`BridgeController`] owns the registry and the relay and runs the
/// single event loop.
pub mod bridge;

/// Activity capture: records, buffers, filters, translation.
pub mod capture;

/// Bridge configuration and defaults.
pub mod config;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Host debugging collaborator boundary.
pub mod host;

/// Type-safe identifiers for bridge entities.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// Debugger event parsing and relay wire messages.
pub mod protocol;

/// Relay transport layer.
///
/// Connection state machine, reconnect timer, and WebSocket dialing.
pub mod relay;

/// Per-tab session state and the active session registry.
pub mod session;

// ============================================================================
// Re-exports
// ============================================================================

// Bridge types
pub use bridge::BridgeController;

// Capture types
pub use capture::{
    ConsoleEntry, ConsoleFilter, ConsoleLevel, NetworkFilter, NetworkRequestRecord, SessionBuffer,
};

// Configuration types
pub use config::BridgeConfig;

// Error types
pub use error::{Error, Result};

// Host types
pub use host::{DebuggerHost, HostNotification, PROTOCOL_DOMAINS, ResponseBody};

// Identifier types
pub use identifiers::{AttachHandle, SessionToken, TabId};

// Protocol types
pub use protocol::{Inbound, NetworkPhase, Outbound};

// Relay types
pub use relay::{RelayConnection, RelayDialer, RelayLink, RelayState, WebSocketDialer};

// Session types
pub use session::{DebugSession, SessionRegistry, SessionState};
