//! Normalized capture record shapes.
//!
//! A [`NetworkRequestRecord`] is filled incrementally as a request moves
//! through protocol phases (sent → response received → finished/failed).
//! A [`ConsoleEntry`] is complete at creation. Records are never deleted
//! individually; the buffer evicts them in bulk, oldest first.

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

// ============================================================================
// NetworkRequestRecord
// ============================================================================

/// A captured network request, keyed by the host-assigned request id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRequestRecord {
    /// Host-assigned correlation id, unique within the session's lifetime.
    pub request_id: String,

    /// Time the request was sent, in milliseconds.
    pub timestamp_ms: f64,

    /// HTTP method.
    pub method: String,

    /// Request URL.
    pub url: String,

    /// Request headers.
    pub request_headers: FxHashMap<String, String>,

    /// Request post data, when the host provided it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<String>,

    /// HTTP status code, once a response arrived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// HTTP status text, once a response arrived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,

    /// Response headers, once a response arrived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_headers: Option<FxHashMap<String, String>>,

    /// Response MIME type, once a response arrived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Total load duration in milliseconds, once finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,

    /// Response body, when the best-effort fetch succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_body: Option<String>,

    /// Whether the stored body was truncated or replaced by a placeholder.
    pub response_body_truncated: bool,

    /// Failure description, when loading failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NetworkRequestRecord {
    /// Creates a record from the request-sent phase.
    ///
    /// Later phases merge into the remaining `None` fields.
    #[must_use]
    pub fn sent(
        request_id: impl Into<String>,
        timestamp_ms: f64,
        method: impl Into<String>,
        url: impl Into<String>,
        request_headers: FxHashMap<String, String>,
        request_body: Option<String>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            timestamp_ms,
            method: method.into(),
            url: url.into(),
            request_headers,
            request_body,
            status: None,
            status_text: None,
            response_headers: None,
            mime_type: None,
            duration_ms: None,
            response_body: None,
            response_body_truncated: false,
            error: None,
        }
    }
}

// ============================================================================
// ConsoleLevel
// ============================================================================

/// Normalized console severity.
///
/// Heterogeneous console API call types collapse into this 5-level
/// scheme; unknown types default to [`ConsoleLevel::Log`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleLevel {
    /// Plain `console.log` output and anything unrecognized.
    Log,
    /// Debug/verbose output.
    Debug,
    /// Informational output.
    Info,
    /// Warnings.
    Warn,
    /// Errors, including failed assertions and uncaught exceptions.
    Error,
}

impl ConsoleLevel {
    /// Maps a raw console API call type to a level.
    ///
    /// `dir`, `table`, `trace`, `group` and friends carry no severity of
    /// their own and map to [`ConsoleLevel::Log`].
    #[must_use]
    pub fn from_console_type(call_type: &str) -> Self {
        match call_type {
            "debug" => Self::Debug,
            "info" => Self::Info,
            "warning" | "warn" => Self::Warn,
            "error" | "assert" => Self::Error,
            _ => Self::Log,
        }
    }

    /// Maps a browser log-entry level to a console level.
    #[must_use]
    pub fn from_log_level(level: &str) -> Self {
        match level {
            "verbose" => Self::Debug,
            "info" => Self::Info,
            "warning" => Self::Warn,
            "error" => Self::Error,
            _ => Self::Log,
        }
    }

    /// Returns the lowercase wire name.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

// ============================================================================
// ConsoleEntry
// ============================================================================

/// A captured console entry. Append-only; evicted in bulk, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleEntry {
    /// Entry timestamp in milliseconds.
    pub timestamp_ms: f64,

    /// Normalized severity.
    pub level: ConsoleLevel,

    /// Display message: argument display strings joined with spaces.
    pub message: String,

    /// Argument display strings, order preserved.
    pub args: Vec<String>,

    /// Rendered stack trace, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,

    /// Source category or URL, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// 1-based line number, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,

    /// 1-based column number, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

// ============================================================================
// Tests
// ============================================================================
