//! Error types for the debug bridge.
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`].
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Host API | [`Error::Attach`], [`Error::DomainEnable`], [`Error::Command`] |
//! | Relay | [`Error::Connection`], [`Error::ConnectionClosed`], [`Error::Protocol`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::WebSocket`] |
//!
//! Nothing in this crate treats an error as fatal: host-API failures abort
//! the operation that triggered them and relay failures degrade to dropped
//! messages, per the best-effort delivery contract.

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::identifiers::TabId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when bridge configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Host API Errors
    // ========================================================================
    /// Debugger attach failed.
    ///
    /// Returned when the host refuses to attach to a tab.
    #[error("Attach failed for tab {tab_id}: {message}")]
    Attach {
        /// Tab the attach targeted.
        tab_id: TabId,
        /// Host-provided failure description.
        message: String,
    },

    /// Protocol domain enabling failed.
    ///
    /// Returned when a required domain cannot be enabled after attach.
    #[error("Failed to enable domain {domain} for tab {tab_id}: {message}")]
    DomainEnable {
        /// Tab the enable targeted.
        tab_id: TabId,
        /// Domain that failed to enable.
        domain: String,
        /// Host-provided failure description.
        message: String,
    },

    /// Host protocol command failed.
    ///
    /// Returned when a command (e.g. response body retrieval) fails.
    #[error("Command {method} failed: {message}")]
    Command {
        /// Protocol method that failed.
        method: String,
        /// Host-provided failure description.
        message: String,
    },

    // ========================================================================
    // Relay Errors
    // ========================================================================
    /// Relay connection failed.
    ///
    /// Returned when the duplex channel cannot be established.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Relay connection closed unexpectedly.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Protocol violation or unexpected relay message.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an attach error.
    #[inline]
    pub fn attach(tab_id: TabId, message: impl Into<String>) -> Self {
        Self::Attach {
            tab_id,
            message: message.into(),
        }
    }

    /// Creates a domain enable error.
    #[inline]
    pub fn domain_enable(
        tab_id: TabId,
        domain: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::DomainEnable {
            tab_id,
            domain: domain.into(),
            message: message.into(),
        }
    }

    /// Creates a command error.
    #[inline]
    pub fn command(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Command {
            method: method.into(),
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a host-API error.
    ///
    /// Host-API errors abort the triggering operation but never tear
    /// down the bridge.
    #[inline]
    #[must_use]
    pub fn is_host_error(&self) -> bool {
        matches!(
            self,
            Self::Attach { .. } | Self::DomainEnable { .. } | Self::Command { .. }
        )
    }

    /// Returns `true` if this is a relay connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::ConnectionClosed | Self::WebSocket(_)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;

    #[test]
    fn test_error_display() {
        let err = Error::connection("refused");
        assert_eq!(err.to_string(), "Connection failed: refused");
    }

    #[test]
    fn test_attach_error_display() {
        let err = Error::attach(TabId::new(3), "tab is busy");
        assert_eq!(err.to_string(), "Attach failed for tab 3: tab is busy");
    }

    #[test]
    fn test_is_host_error() {
        let attach = Error::attach(TabId::new(1), "denied");
        let enable = Error::domain_enable(TabId::new(1), "Network", "denied");
        let command = Error::command("Network.getResponseBody", "gone");
        let conn = Error::connection("refused");

        assert!(attach.is_host_error());
        assert!(enable.is_host_error());
        assert!(command.is_host_error());
        assert!(!conn.is_host_error());
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Error::connection("refused").is_connection_error());
        assert!(Error::ConnectionClosed.is_connection_error());
        assert!(!Error::config("bad url").is_connection_error());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(ErrorKind::NotFound, "missing");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
