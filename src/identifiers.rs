//! Type-safe identifiers for bridge entities.
//!
//! Newtype wrappers prevent mixing incompatible IDs at compile time:
//! a [`TabId`] names a tab to the host API, an [`AttachHandle`] names an
//! attached debugger session to the host API, and a [`SessionToken`]
//! names a session to the relay.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// TabId
// ============================================================================

/// Host-assigned tab identifier.
///
/// Opaque to the bridge; only used to correlate host notifications with
/// registered sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(u32);

impl TabId {
    /// Creates a tab ID from a raw host value.
    #[inline]
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw host value.
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// AttachHandle
// ============================================================================

/// Host-assigned handle for an attached debugger session.
///
/// Returned by a successful attach and required for every subsequent
/// protocol command against that tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttachHandle(u64);

impl AttachHandle {
    /// Creates a handle from a raw host value.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw host value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AttachHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// SessionToken
// ============================================================================

/// Opaque correlation token tying a tab's debug session to relay queries.
///
/// Supplied by the triggering response header; immutable for the lifetime
/// of the session it identifies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Creates a token from a header value.
    #[inline]
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the token as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionToken {
    #[inline]
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_id_roundtrip() {
        let id = TabId::new(42);
        assert_eq!(id.as_u32(), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_attach_handle_display() {
        let handle = AttachHandle::new(7);
        assert_eq!(handle.to_string(), "7");
    }

    #[test]
    fn test_session_token_equality() {
        let a = SessionToken::new("abc");
        let b = SessionToken::from("abc");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "abc");
    }

    #[test]
    fn test_tab_id_serde_transparent() {
        let id = TabId::new(3);
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "3");
    }
}
