//! Active session registry.
//!
//! Owns the map of live sessions, indexed two ways: by host tab (for
//! lifecycle correlation) and by token (for relay query resolution).
//! Both indices are kept in sync by construction; there is no ambient
//! state, every mutation goes through an explicit method.

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::identifiers::{SessionToken, TabId};
use crate::session::session::DebugSession;

// ============================================================================
// SessionRegistry
// ============================================================================

/// The set of registered debug sessions, at most one per tab.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    /// Tab → session. Owns the sessions.
    by_tab: FxHashMap<TabId, DebugSession>,
    /// Token → tab, for query resolution.
    token_index: FxHashMap<SessionToken, TabId>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the tab already holds an active session with
    /// this exact token.
    ///
    /// The idempotency guard: a re-arrived marker header for the same
    /// `(tab, token)` pair must not duplicate session state.
    #[must_use]
    pub fn is_active_token(&self, tab_id: TabId, token: &SessionToken) -> bool {
        self.by_tab
            .get(&tab_id)
            .is_some_and(|session| session.is_active() && session.token() == token)
    }

    /// Registers a session, replacing any previous session on the tab.
    ///
    /// Returns the replaced session, already removed from both indices;
    /// the caller owns its teardown. Callers replacing by token tear the
    /// old session down before registering the new one, so the returned
    /// value is `None` on that path.
    pub fn register(&mut self, session: DebugSession) -> Option<DebugSession> {
        let tab_id = session.tab_id();
        let token = session.token().clone();
        self.token_index.insert(token.clone(), tab_id);

        let replaced = self.by_tab.insert(tab_id, session);
        if let Some(ref old) = replaced {
            // An identical token just re-mapped to the same tab; removing
            // it would orphan the new session in the token index.
            if old.token() != &token {
                self.token_index.remove(old.token());
            }
            debug!(%tab_id, old_token = %old.token(), "Replaced session on register");
        }

        replaced
    }

    /// Removes and returns the session for a tab.
    pub fn remove_by_tab(&mut self, tab_id: TabId) -> Option<DebugSession> {
        let session = self.by_tab.remove(&tab_id)?;
        self.token_index.remove(session.token());
        debug!(%tab_id, token = %session.token(), "Session removed");
        Some(session)
    }

    /// Resolves a session by token.
    #[must_use]
    pub fn find_by_token(&self, token: &SessionToken) -> Option<&DebugSession> {
        let tab_id = self.token_index.get(token)?;
        self.by_tab.get(tab_id)
    }

    /// Resolves a session by tab.
    #[must_use]
    pub fn find_by_tab(&self, tab_id: TabId) -> Option<&DebugSession> {
        self.by_tab.get(&tab_id)
    }

    /// Resolves a session by tab, mutably.
    pub fn find_by_tab_mut(&mut self, tab_id: TabId) -> Option<&mut DebugSession> {
        self.by_tab.get_mut(&tab_id)
    }

    /// Applies navigation metadata to a tab's session.
    ///
    /// Returns the session when something actually changed, for the
    /// caller to announce.
    pub fn update_metadata(
        &mut self,
        tab_id: TabId,
        url: Option<String>,
        title: Option<String>,
        favicon: Option<String>,
    ) -> Option<&DebugSession> {
        let session = self.by_tab.get_mut(&tab_id)?;
        if !session.is_active() {
            return None;
        }

        if session.update_metadata(url, title, favicon) {
            Some(&*session)
        } else {
            None
        }
    }

    /// Returns `true` if no sessions are registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_tab.is_empty()
    }

    /// Returns the number of registered sessions.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_tab.len()
    }

    /// Iterates over registered sessions, for re-announcement.
    pub fn sessions(&self) -> impl Iterator<Item = &DebugSession> {
        self.by_tab.values()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::capture::buffer::SessionBuffer;
    use crate::identifiers::AttachHandle;

    fn active_session(tab: u32, token: &str) -> DebugSession {
        let mut session = DebugSession::new(
            SessionToken::new(token),
            TabId::new(tab),
            "https://example.com",
            SessionBuffer::new(10, 10, 2),
        );
        session.mark_active(AttachHandle::new(u64::from(tab)));
        session
    }

    #[test]
    fn test_register_and_resolve_both_indices() {
        let mut registry = SessionRegistry::new();
        registry.register(active_session(1, "abc"));

        assert_eq!(registry.len(), 1);
        assert!(registry.find_by_tab(TabId::new(1)).is_some());
        let session = registry
            .find_by_token(&SessionToken::new("abc"))
            .expect("resolved by token");
        assert_eq!(session.tab_id(), TabId::new(1));
    }

    #[test]
    fn test_is_active_token_guard() {
        let mut registry = SessionRegistry::new();
        registry.register(active_session(1, "abc"));

        assert!(registry.is_active_token(TabId::new(1), &SessionToken::new("abc")));
        assert!(!registry.is_active_token(TabId::new(1), &SessionToken::new("other")));
        assert!(!registry.is_active_token(TabId::new(2), &SessionToken::new("abc")));
    }

    #[test]
    fn test_remove_clears_both_indices() {
        let mut registry = SessionRegistry::new();
        registry.register(active_session(1, "abc"));

        let removed = registry.remove_by_tab(TabId::new(1)).expect("removed");
        assert_eq!(removed.token().as_str(), "abc");
        assert!(registry.is_empty());
        assert!(registry.find_by_token(&SessionToken::new("abc")).is_none());
    }

    #[test]
    fn test_register_replacement_evicts_old_token() {
        let mut registry = SessionRegistry::new();
        registry.register(active_session(1, "old"));

        let replaced = registry.register(active_session(1, "new"));
        assert_eq!(replaced.expect("old returned").token().as_str(), "old");

        assert_eq!(registry.len(), 1);
        assert!(registry.find_by_token(&SessionToken::new("old")).is_none());
        assert!(registry.find_by_token(&SessionToken::new("new")).is_some());
    }

    #[test]
    fn test_reregister_same_token_keeps_token_index() {
        let mut registry = SessionRegistry::new();
        registry.register(active_session(1, "abc"));

        // Same (tab, token) registered again: the new session must stay
        // resolvable by token.
        let replaced = registry.register(active_session(1, "abc"));
        assert_eq!(replaced.expect("old returned").token().as_str(), "abc");

        assert_eq!(registry.len(), 1);
        let session = registry
            .find_by_token(&SessionToken::new("abc"))
            .expect("token still resolves");
        assert_eq!(session.tab_id(), TabId::new(1));
    }

    #[test]
    fn test_update_metadata_only_for_active() {
        let mut registry = SessionRegistry::new();
        registry.register(active_session(1, "abc"));

        let updated = registry.update_metadata(
            TabId::new(1),
            None,
            Some("New Title".to_string()),
            None,
        );
        assert!(updated.is_some());

        // Unchanged values do not report an update.
        let updated = registry.update_metadata(
            TabId::new(1),
            None,
            Some("New Title".to_string()),
            None,
        );
        assert!(updated.is_none());

        // Detached sessions reject updates.
        registry
            .find_by_tab_mut(TabId::new(1))
            .expect("session")
            .detach();
        let updated =
            registry.update_metadata(TabId::new(1), None, Some("Other".to_string()), None);
        assert!(updated.is_none());
    }

    #[test]
    fn test_unknown_lookups_return_none() {
        let mut registry = SessionRegistry::new();
        assert!(registry.find_by_token(&SessionToken::new("ghost")).is_none());
        assert!(registry.remove_by_tab(TabId::new(9)).is_none());
    }
}
