//! Host debugging collaborator boundary.
//!
//! The bridge does not speak the debugging protocol's wire format itself;
//! the host environment exposes attach/detach, domain enabling, command
//! execution, and a notification stream. [`DebuggerHost`] captures that
//! surface as a trait so the controller can be driven by a real host or
//! an in-memory fake in tests.
//!
//! Notifications are delivered through an `mpsc` channel, one at a time:
//! each handler runs to completion before the next notification is
//! dispatched, so session state needs no locking.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::error::Result;
use crate::identifiers::{AttachHandle, TabId};

// ============================================================================
// Constants
// ============================================================================

/// Protocol domains enabled on every attached session.
pub const PROTOCOL_DOMAINS: &[&str] = &["Network", "Runtime", "Log"];

// ============================================================================
// DebuggerHost
// ============================================================================

/// The host tab/debugging API consumed by the bridge.
///
/// All methods are best-effort from the bridge's perspective: a failure
/// aborts the triggering operation and is logged, never propagated.
#[async_trait]
pub trait DebuggerHost: Send + Sync {
    /// Attaches the debugger to a tab.
    async fn attach(&self, tab_id: TabId) -> Result<AttachHandle>;

    /// Enables protocol domains on an attached session.
    async fn enable_domains(&self, handle: AttachHandle, domains: &[&str]) -> Result<()>;

    /// Fetches the response body for a finished request.
    async fn fetch_response_body(
        &self,
        handle: AttachHandle,
        request_id: &str,
    ) -> Result<ResponseBody>;

    /// Detaches the debugger from a session.
    ///
    /// Infallible by contract: a handle that is already gone detaches
    /// trivially.
    async fn detach(&self, handle: AttachHandle, reason: &str);
}

// ============================================================================
// ResponseBody
// ============================================================================

/// A fetched response body, possibly base64-encoded (binary).
#[derive(Debug, Clone)]
pub struct ResponseBody {
    /// Body content, base64-encoded when `base64_encoded` is set.
    pub body: String,
    /// Whether `body` is base64-encoded binary data.
    pub base64_encoded: bool,
}

// ============================================================================
// HostNotification
// ============================================================================

/// One notification from the host environment.
///
/// Debugger events arrive raw (`method` + `params`) and are parsed by
/// the controller; tab lifecycle notifications are already structured.
#[derive(Debug, Clone)]
pub enum HostNotification {
    /// Response headers for a top-level document load.
    ///
    /// The eligibility extraction point: a marker header here creates or
    /// replaces a session.
    TopLevelResponse {
        /// Tab that loaded the document.
        tab_id: TabId,
        /// Document URL.
        url: String,
        /// Response headers.
        headers: FxHashMap<String, String>,
    },

    /// A protocol domain event for an attached tab.
    DebuggerEvent {
        /// Source tab.
        tab_id: TabId,
        /// Event method (`Domain.eventName`).
        method: String,
        /// Raw event params.
        params: Value,
    },

    /// Tab display metadata changed.
    TabUpdated {
        /// The updated tab.
        tab_id: TabId,
        /// New URL, when changed.
        url: Option<String>,
        /// New title, when changed.
        title: Option<String>,
        /// New favicon URL, when changed.
        favicon: Option<String>,
    },

    /// A tab was closed.
    TabRemoved {
        /// The removed tab.
        tab_id: TabId,
    },

    /// The host detached the debugger (e.g. user cancellation).
    DebuggerDetached {
        /// The affected tab.
        tab_id: TabId,
        /// Host-provided reason.
        reason: String,
    },
}
