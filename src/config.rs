//! Bridge configuration.
//!
//! Provides a type-safe interface for configuring buffer capacities,
//! response body truncation, the relay endpoint, and reconnect behavior.
//!
//! # Example
//!
//! ```
//! use debug_bridge::BridgeConfig;
//!
//! let config = BridgeConfig::new("wss://relay.example.com/bridge")
//!     .with_request_cap(500)
//!     .with_reconnect_delay_ms(2000);
//!
//! assert!(config.validate().is_ok());
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Defaults
// ============================================================================

/// Default maximum buffered network requests per session.
pub const DEFAULT_REQUEST_CAP: usize = 1000;

/// Default maximum buffered console entries per session.
pub const DEFAULT_CONSOLE_CAP: usize = 1000;

/// Default number of oldest entries removed per eviction.
pub const DEFAULT_EVICTION_BATCH: usize = 100;

/// Default response body truncation threshold (64 KiB).
pub const DEFAULT_BODY_CAP_BYTES: usize = 64 * 1024;

/// Default delay before a relay reconnect attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Default marker header inspected on top-level document responses.
///
/// The header's value becomes the session token.
pub const DEFAULT_MARKER_HEADER: &str = "x-debug-token";

// ============================================================================
// BridgeConfig
// ============================================================================

/// Bridge configuration options.
///
/// All limits are counts, not byte sizes, except `body_cap_bytes`.
/// Sessions inherit the buffer caps in effect at creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Relay endpoint URL (`ws://` or `wss://`).
    pub relay_url: String,

    /// Maximum buffered network requests per session.
    pub request_cap: usize,

    /// Maximum buffered console entries per session.
    pub console_cap: usize,

    /// Number of oldest entries removed per eviction pass.
    pub eviction_batch: usize,

    /// Response body truncation threshold in bytes.
    pub body_cap_bytes: usize,

    /// Delay before a relay reconnect attempt.
    pub reconnect_delay: Duration,

    /// Marker header whose value becomes the session token.
    pub marker_header: String,
}

// ============================================================================
// Constructors
// ============================================================================

impl BridgeConfig {
    /// Creates a configuration with the given relay endpoint and defaults
    /// for everything else.
    #[must_use]
    pub fn new(relay_url: impl Into<String>) -> Self {
        Self {
            relay_url: relay_url.into(),
            request_cap: DEFAULT_REQUEST_CAP,
            console_cap: DEFAULT_CONSOLE_CAP,
            eviction_batch: DEFAULT_EVICTION_BATCH,
            body_cap_bytes: DEFAULT_BODY_CAP_BYTES,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            marker_header: DEFAULT_MARKER_HEADER.to_string(),
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl BridgeConfig {
    /// Sets the maximum buffered network requests per session.
    #[inline]
    #[must_use]
    pub fn with_request_cap(mut self, cap: usize) -> Self {
        self.request_cap = cap;
        self
    }

    /// Sets the maximum buffered console entries per session.
    #[inline]
    #[must_use]
    pub fn with_console_cap(mut self, cap: usize) -> Self {
        self.console_cap = cap;
        self
    }

    /// Sets the eviction batch size.
    #[inline]
    #[must_use]
    pub fn with_eviction_batch(mut self, batch: usize) -> Self {
        self.eviction_batch = batch;
        self
    }

    /// Sets the response body truncation threshold in bytes.
    #[inline]
    #[must_use]
    pub fn with_body_cap_bytes(mut self, cap: usize) -> Self {
        self.body_cap_bytes = cap;
        self
    }

    /// Sets the reconnect delay in milliseconds.
    #[inline]
    #[must_use]
    pub fn with_reconnect_delay_ms(mut self, delay_ms: u64) -> Self {
        self.reconnect_delay = Duration::from_millis(delay_ms);
        self
    }

    /// Sets the marker header name.
    ///
    /// Matching is case-insensitive, per HTTP header semantics.
    #[inline]
    #[must_use]
    pub fn with_marker_header(mut self, header: impl Into<String>) -> Self {
        self.marker_header = header.into();
        self
    }
}

// ============================================================================
// Validation
// ============================================================================

impl BridgeConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the relay URL is malformed or not a
    /// WebSocket URL, if any cap is zero, or if the eviction batch exceeds
    /// a buffer cap.
    pub fn validate(&self) -> Result<()> {
        let parsed = Url::parse(&self.relay_url)
            .map_err(|e| Error::config(format!("invalid relay URL: {e}")))?;

        match parsed.scheme() {
            "ws" | "wss" => {}
            other => {
                return Err(Error::config(format!(
                    "relay URL must be ws:// or wss://, got {other}://"
                )));
            }
        }

        if self.request_cap == 0 || self.console_cap == 0 {
            return Err(Error::config("buffer caps must be non-zero"));
        }

        if self.eviction_batch == 0 {
            return Err(Error::config("eviction batch must be non-zero"));
        }

        if self.eviction_batch > self.request_cap || self.eviction_batch > self.console_cap {
            return Err(Error::config(
                "eviction batch must not exceed the buffer caps",
            ));
        }

        if self.marker_header.is_empty() {
            return Err(Error::config("marker header must be non-empty"));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::new("ws://127.0.0.1:9000");
        assert_eq!(config.request_cap, DEFAULT_REQUEST_CAP);
        assert_eq!(config.console_cap, DEFAULT_CONSOLE_CAP);
        assert_eq!(config.eviction_batch, DEFAULT_EVICTION_BATCH);
        assert_eq!(config.body_cap_bytes, DEFAULT_BODY_CAP_BYTES);
        assert_eq!(config.reconnect_delay, DEFAULT_RECONNECT_DELAY);
        assert_eq!(config.marker_header, DEFAULT_MARKER_HEADER);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = BridgeConfig::new("wss://relay.example.com")
            .with_request_cap(10)
            .with_console_cap(20)
            .with_eviction_batch(5)
            .with_body_cap_bytes(1024)
            .with_reconnect_delay_ms(250)
            .with_marker_header("x-bridge-session");

        assert_eq!(config.request_cap, 10);
        assert_eq!(config.console_cap, 20);
        assert_eq!(config.eviction_batch, 5);
        assert_eq!(config.body_cap_bytes, 1024);
        assert_eq!(config.reconnect_delay, Duration::from_millis(250));
        assert_eq!(config.marker_header, "x-bridge-session");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = BridgeConfig::new("not a url");
        assert!(config.validate().is_err());

        let config = BridgeConfig::new("https://relay.example.com");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_caps() {
        let config = BridgeConfig::new("ws://localhost:9000").with_request_cap(0);
        assert!(config.validate().is_err());

        let config = BridgeConfig::new("ws://localhost:9000").with_eviction_batch(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_batch() {
        let config = BridgeConfig::new("ws://localhost:9000")
            .with_request_cap(10)
            .with_eviction_batch(11);
        assert!(config.validate().is_err());
    }
}
