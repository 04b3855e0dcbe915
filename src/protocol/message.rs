//! Relay wire message types.
//!
//! JSON messages exchanged with the signaling endpoint over the duplex
//! channel. Outbound messages stream session lifecycle and captured
//! activity; inbound messages carry snapshot queries.
//!
//! # Format
//!
//! All messages are tagged with a `type` field:
//!
//! ```json
//! { "type": "tab_available", "token": "abc", "url": "...", "title": "...", "favicon": "..." }
//! { "type": "get_network", "request_id": "q1", "token": "abc", "filters": { ... } }
//! { "type": "network_data", "request_id": "q1", "requests": [ ... ] }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::capture::filter::{ConsoleFilter, NetworkFilter};
use crate::capture::record::{ConsoleEntry, NetworkRequestRecord};
use crate::identifiers::SessionToken;

// ============================================================================
// Outbound
// ============================================================================

/// A message from the bridge to the relay.
///
/// Delivery is fire-and-forget: messages produced while the connection is
/// down are dropped, never queued (at-most-once delivery).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound {
    /// A debuggable tab became available.
    TabAvailable {
        /// Session token.
        token: SessionToken,
        /// Tab URL.
        url: String,
        /// Tab title.
        title: String,
        /// Tab favicon URL.
        favicon: String,
    },

    /// A session was torn down.
    TabClosed {
        /// Session token.
        token: SessionToken,
    },

    /// Tab display metadata changed.
    TabUpdated {
        /// Session token.
        token: SessionToken,
        /// Tab URL.
        url: String,
        /// Tab title.
        title: String,
    },

    /// A network lifecycle event for one request.
    NetworkEvent {
        /// Session token.
        token: SessionToken,
        /// Request lifecycle phase.
        event: NetworkPhase,
        /// Phase-specific payload.
        data: Value,
    },

    /// A captured console entry.
    ConsoleEvent {
        /// Session token.
        token: SessionToken,
        /// The captured entry.
        entry: ConsoleEntry,
    },

    /// Reply to a `get_network` query.
    NetworkData {
        /// Query correlation id, copied from the request.
        request_id: String,
        /// Filtered request snapshot, insertion order preserved.
        requests: Vec<NetworkRequestRecord>,
    },

    /// Reply to a `get_console` query.
    ConsoleData {
        /// Query correlation id, copied from the request.
        request_id: String,
        /// Filtered console snapshot, insertion order preserved.
        entries: Vec<ConsoleEntry>,
    },
}

// ============================================================================
// NetworkPhase
// ============================================================================

/// Request lifecycle phase carried on streamed network events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkPhase {
    /// Request sent.
    Request,
    /// Response headers received.
    Response,
    /// Loading finished.
    Finished,
    /// Loading failed.
    Failed,
}

// ============================================================================
// Inbound
// ============================================================================

/// A message from the relay to the bridge.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inbound {
    /// Snapshot query over a session's network buffer.
    GetNetwork {
        /// Query correlation id, echoed in the reply.
        request_id: String,
        /// Target session token.
        token: SessionToken,
        /// Optional filter criteria.
        #[serde(default)]
        filters: Option<NetworkFilter>,
    },

    /// Snapshot query over a session's console buffer.
    GetConsole {
        /// Query correlation id, echoed in the reply.
        request_id: String,
        /// Target session token.
        token: SessionToken,
        /// Optional filter criteria.
        #[serde(default)]
        filters: Option<ConsoleFilter>,
    },

    /// Relay-side error notification.
    Error {
        /// Error description.
        message: String,
    },
}

// ============================================================================
// Tests
// ============================================================================
