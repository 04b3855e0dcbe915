//! Per-tab debug session state machine.
//!
//! A session moves `Attaching -> Active -> Detached`, with `Detached`
//! terminal. `Attaching -> Detached` happens directly when attach or
//! domain enabling fails; such a session is never registered and the
//! caller must not retain it. Only `Active` sessions accept translator
//! writes and serve snapshot queries.

// ============================================================================
// Imports
// ============================================================================

use crate::capture::buffer::SessionBuffer;
use crate::identifiers::{AttachHandle, SessionToken, TabId};
use crate::protocol::message::Outbound;

// ============================================================================
// SessionState
// ============================================================================

/// Lifecycle state of a debug session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Attach requested, domains not yet enabled.
    Attaching,
    /// Attached with domains enabled; capturing.
    Active,
    /// Torn down. Terminal.
    Detached,
}

// ============================================================================
// DebugSession
// ============================================================================

/// One tab's tracked debugging context.
///
/// The token is immutable for the session's lifetime; a header carrying a
/// different token replaces the whole session rather than mutating it.
#[derive(Debug)]
pub struct DebugSession {
    /// Relay correlation token.
    token: SessionToken,
    /// Host tab this session tracks.
    tab_id: TabId,
    /// Host attach handle, present once attached.
    handle: Option<AttachHandle>,
    /// Tab URL, mutated on navigation.
    pub url: String,
    /// Tab title, mutated on navigation.
    pub title: String,
    /// Tab favicon URL, mutated on navigation.
    pub favicon: String,
    /// Captured activity, owned exclusively by this session.
    pub buffer: SessionBuffer,
    /// Lifecycle state.
    state: SessionState,
}

impl DebugSession {
    /// Creates a session in the `Attaching` state.
    #[must_use]
    pub fn new(
        token: SessionToken,
        tab_id: TabId,
        url: impl Into<String>,
        buffer: SessionBuffer,
    ) -> Self {
        Self {
            token,
            tab_id,
            handle: None,
            url: url.into(),
            title: String::new(),
            favicon: String::new(),
            buffer,
            state: SessionState::Attaching,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Returns the session token.
    #[inline]
    #[must_use]
    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    /// Returns the tab this session tracks.
    #[inline]
    #[must_use]
    pub const fn tab_id(&self) -> TabId {
        self.tab_id
    }

    /// Returns the host attach handle, if attached.
    #[inline]
    #[must_use]
    pub const fn handle(&self) -> Option<AttachHandle> {
        self.handle
    }

    /// Returns the lifecycle state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Returns `true` while the session accepts writes and queries.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Transitions `Attaching -> Active` with the host handle.
    ///
    /// Ignored from any other state; `Detached` is terminal.
    pub fn mark_active(&mut self, handle: AttachHandle) {
        if self.state == SessionState::Attaching {
            self.handle = Some(handle);
            self.state = SessionState::Active;
        }
    }

    /// Transitions to `Detached` and gives up the host handle.
    ///
    /// Idempotent: a second detach returns `None`.
    pub fn detach(&mut self) -> Option<AttachHandle> {
        self.state = SessionState::Detached;
        self.handle.take()
    }

    /// Applies navigation metadata changes.
    ///
    /// Returns `true` if anything changed.
    pub fn update_metadata(
        &mut self,
        url: Option<String>,
        title: Option<String>,
        favicon: Option<String>,
    ) -> bool {
        let mut changed = false;

        if let Some(url) = url
            && url != self.url
        {
            self.url = url;
            changed = true;
        }
        if let Some(title) = title
            && title != self.title
        {
            self.title = title;
            changed = true;
        }
        if let Some(favicon) = favicon
            && favicon != self.favicon
        {
            self.favicon = favicon;
            changed = true;
        }

        changed
    }

    // ========================================================================
    // Relay Messages
    // ========================================================================

    /// Builds the `tab_available` announcement for this session.
    #[must_use]
    pub fn available_message(&self) -> Outbound {
        Outbound::TabAvailable {
            token: self.token.clone(),
            url: self.url.clone(),
            title: self.title.clone(),
            favicon: self.favicon.clone(),
        }
    }

    /// Builds the `tab_closed` announcement for this session.
    #[must_use]
    pub fn closed_message(&self) -> Outbound {
        Outbound::TabClosed {
            token: self.token.clone(),
        }
    }

    /// Builds the `tab_updated` announcement for this session.
    #[must_use]
    pub fn updated_message(&self) -> Outbound {
        Outbound::TabUpdated {
            token: self.token.clone(),
            url: self.url.clone(),
            title: self.title.clone(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn session(token: &str) -> DebugSession {
        DebugSession::new(
            SessionToken::new(token),
            TabId::new(1),
            "https://example.com",
            SessionBuffer::new(10, 10, 2),
        )
    }

    #[test]
    fn test_new_session_is_attaching() {
        let s = session("abc");
        assert_eq!(s.state(), SessionState::Attaching);
        assert!(!s.is_active());
        assert!(s.handle().is_none());
    }

    #[test]
    fn test_mark_active_from_attaching() {
        let mut s = session("abc");
        s.mark_active(AttachHandle::new(7));
        assert!(s.is_active());
        assert_eq!(s.handle(), Some(AttachHandle::new(7)));
    }

    #[test]
    fn test_detached_is_terminal() {
        let mut s = session("abc");
        s.mark_active(AttachHandle::new(7));

        assert_eq!(s.detach(), Some(AttachHandle::new(7)));
        assert_eq!(s.state(), SessionState::Detached);

        // Second detach yields nothing; reactivation is ignored.
        assert_eq!(s.detach(), None);
        s.mark_active(AttachHandle::new(8));
        assert_eq!(s.state(), SessionState::Detached);
        assert!(s.handle().is_none());
    }

    #[test]
    fn test_attaching_to_detached_directly() {
        let mut s = session("abc");
        assert_eq!(s.detach(), None);
        assert_eq!(s.state(), SessionState::Detached);
    }

    #[test]
    fn test_update_metadata_reports_changes() {
        let mut s = session("abc");

        assert!(s.update_metadata(None, Some("Example".to_string()), None));
        assert_eq!(s.title, "Example");

        // Re-applying identical values is not a change.
        assert!(!s.update_metadata(None, Some("Example".to_string()), None));
        assert!(!s.update_metadata(None, None, None));
    }

    #[test]
    fn test_relay_messages_carry_token() {
        let mut s = session("abc");
        s.update_metadata(None, Some("Example".to_string()), None);

        let available = serde_json::to_value(s.available_message()).expect("serialize");
        assert_eq!(available["type"], "tab_available");
        assert_eq!(available["token"], "abc");
        assert_eq!(available["title"], "Example");

        let closed = serde_json::to_value(s.closed_message()).expect("serialize");
        assert_eq!(closed["type"], "tab_closed");
        assert_eq!(closed["token"], "abc");
    }
}
