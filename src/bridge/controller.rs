//! Bridge controller and event loop.
//!
//! The controller is the single task that owns all mutable bridge state:
//! the session registry and the relay connection. It multiplexes three
//! sources (host notifications, relay inbound messages, and internal
//! completions such as dial results, reconnect ticks, and body fetches)
//! and runs each to completion before the next, so no locking is needed
//! anywhere.
//!
//! # Data Flow
//!
//! 1. A top-level document response carries the marker header.
//! 2. The controller tears down any previous session for the tab,
//!    attaches the debugger, enables the protocol domains, registers the
//!    session, and announces it to the relay.
//! 3. Debugger events stream through the translator into the session's
//!    buffer and out to the relay.
//! 4. Relay queries resolve a session by token and answer with a
//!    filtered snapshot.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::capture::buffer::SessionBuffer;
use crate::capture::filter::{ConsoleFilter, NetworkFilter, filter_console, filter_requests};
use crate::capture::translate::{self, StreamUpdate};
use crate::config::BridgeConfig;
use crate::error::Result;
use crate::host::{DebuggerHost, HostNotification, PROTOCOL_DOMAINS, ResponseBody};
use crate::identifiers::{AttachHandle, SessionToken, TabId};
use crate::protocol::event::DebuggerEvent;
use crate::protocol::message::{Inbound, NetworkPhase, Outbound};
use crate::relay::connection::{RelayConnection, RelayLink};
use crate::relay::dialer::RelayDialer;
use crate::session::registry::SessionRegistry;
use crate::session::session::DebugSession;

// ============================================================================
// BridgeEvent
// ============================================================================

/// Internal completions delivered back into the event loop.
enum BridgeEvent {
    /// A relay dial finished.
    DialDone(Result<RelayLink>),

    /// The reconnect delay elapsed.
    ReconnectTick,

    /// A best-effort response body fetch finished.
    BodyFetched {
        tab_id: TabId,
        token: SessionToken,
        request_id: String,
        result: Result<ResponseBody>,
    },
}

// ============================================================================
// BridgeController
// ============================================================================

/// Top-level coordinator wiring sessions, capture, and the relay.
pub struct BridgeController {
    /// Bridge configuration.
    config: BridgeConfig,
    /// Host debugging collaborator.
    host: Arc<dyn DebuggerHost>,
    /// Relay channel factory.
    dialer: Arc<dyn RelayDialer>,
    /// Active sessions.
    registry: SessionRegistry,
    /// Relay connection state machine.
    relay: RelayConnection,
    /// Host notification source.
    host_rx: mpsc::UnboundedReceiver<HostNotification>,
    /// Internal completion sink, cloned into spawned futures.
    internal_tx: mpsc::UnboundedSender<BridgeEvent>,
    /// Internal completion source.
    internal_rx: mpsc::UnboundedReceiver<BridgeEvent>,
}

impl BridgeController {
    /// Creates a controller over the given collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the
    /// configuration fails validation.
    pub fn new(
        config: BridgeConfig,
        host: Arc<dyn DebuggerHost>,
        dialer: Arc<dyn RelayDialer>,
        host_rx: mpsc::UnboundedReceiver<HostNotification>,
    ) -> Result<Self> {
        config.validate()?;

        let relay = RelayConnection::new(config.relay_url.clone(), config.reconnect_delay);
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();

        Ok(Self {
            config,
            host,
            dialer,
            registry: SessionRegistry::new(),
            relay,
            host_rx,
            internal_tx,
            internal_rx,
        })
    }

    /// Runs the event loop until the host notification stream closes.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                notification = self.host_rx.recv() => {
                    match notification {
                        Some(notification) => self.handle_notification(notification).await,
                        None => {
                            debug!("Host notification stream closed");
                            break;
                        }
                    }
                }

                event = self.internal_rx.recv() => {
                    // The loop holds its own sender; recv never yields None.
                    if let Some(event) = event {
                        self.handle_internal(event);
                    }
                }

                inbound = self.relay.next_inbound() => {
                    match inbound {
                        Some(text) => self.handle_inbound(&text),
                        None => self.handle_relay_closed(),
                    }
                }
            }
        }

        debug!("Bridge controller terminated");
    }

    // ========================================================================
    // Host Notifications
    // ========================================================================

    async fn handle_notification(&mut self, notification: HostNotification) {
        match notification {
            HostNotification::TopLevelResponse {
                tab_id,
                url,
                headers,
            } => {
                let marker = self.config.marker_header.clone();
                let Some(token) = extract_token(&headers, &marker) else {
                    return;
                };
                self.handle_marker(tab_id, url, token).await;
            }

            HostNotification::DebuggerEvent {
                tab_id,
                method,
                params,
            } => self.handle_debugger_event(tab_id, &method, &params),

            HostNotification::TabUpdated {
                tab_id,
                url,
                title,
                favicon,
            } => {
                if let Some(session) = self.registry.update_metadata(tab_id, url, title, favicon) {
                    let message = session.updated_message();
                    self.relay.send(&message);
                }
            }

            HostNotification::TabRemoved { tab_id } => {
                if let Some(session) = self.registry.remove_by_tab(tab_id) {
                    self.teardown(session, true, "tab removed").await;
                }
                self.cancel_reconnect_if_idle();
            }

            HostNotification::DebuggerDetached { tab_id, reason } => {
                if let Some(session) = self.registry.remove_by_tab(tab_id) {
                    debug!(%tab_id, reason, "Host detached debugger");
                    // The host already dropped the attachment.
                    self.teardown(session, false, &reason).await;
                }
                self.cancel_reconnect_if_idle();
            }
        }
    }

    /// Handles a marker-header match: session creation or replacement.
    async fn handle_marker(&mut self, tab_id: TabId, url: String, token: SessionToken) {
        // Idempotent re-arrival of the same header must not duplicate
        // session state or announcements.
        if self.registry.is_active_token(tab_id, &token) {
            trace!(%tab_id, %token, "Marker re-arrival for active session, skipped");
            return;
        }

        // Old session first: its closed message precedes the new
        // session's available message.
        if let Some(old) = self.registry.remove_by_tab(tab_id) {
            self.teardown(old, true, "replaced by new token").await;
        }

        self.ensure_relay_connecting();

        let buffer = SessionBuffer::new(
            self.config.request_cap,
            self.config.console_cap,
            self.config.eviction_batch,
        );
        let mut session = DebugSession::new(token, tab_id, url, buffer);

        let handle = match self.host.attach(tab_id).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!(%tab_id, error = %e, "Attach failed, session not registered");
                return;
            }
        };

        if let Err(e) = self.host.enable_domains(handle, PROTOCOL_DOMAINS).await {
            warn!(%tab_id, error = %e, "Domain enabling failed, session not registered");
            self.host.detach(handle, "domain enabling failed").await;
            return;
        }

        session.mark_active(handle);
        debug!(%tab_id, token = %session.token(), "Session active");

        let message = session.available_message();
        self.registry.register(session);
        self.relay.send(&message);
    }

    /// Routes a raw debugger event into the owning session's buffer.
    fn handle_debugger_event(&mut self, tab_id: TabId, method: &str, params: &Value) {
        let Some(session) = self.registry.find_by_tab_mut(tab_id) else {
            trace!(%tab_id, method, "Event for unknown tab discarded");
            return;
        };
        if !session.is_active() {
            return;
        }

        let token = session.token().clone();
        let handle = session.handle();
        let event = DebuggerEvent::parse(method, params);

        let Some(update) = translate::translate(event, &mut session.buffer) else {
            return;
        };

        let message = match update {
            StreamUpdate::Network { phase, data } => {
                // A finished request gets a best-effort body fetch; the
                // completion is validated against the registry before
                // any write.
                if phase == NetworkPhase::Finished
                    && let Some(request_id) = data.get("requestId").and_then(|v| v.as_str())
                    && let Some(handle) = handle
                {
                    self.spawn_body_fetch(tab_id, token.clone(), handle, request_id.to_string());
                }

                Outbound::NetworkEvent {
                    token,
                    event: phase,
                    data,
                }
            }
            StreamUpdate::Console { entry } => Outbound::ConsoleEvent { token, entry },
        };

        self.relay.send(&message);
    }

    /// Tears a session down: detaches the host side (when still held)
    /// and announces the closure.
    async fn teardown(&mut self, mut session: DebugSession, detach_host: bool, reason: &str) {
        let message = session.closed_message();
        if let Some(handle) = session.detach()
            && detach_host
        {
            self.host.detach(handle, reason).await;
        }
        self.relay.send(&message);
    }

    // ========================================================================
    // Relay Inbound
    // ========================================================================

    fn handle_inbound(&mut self, text: &str) {
        let message = match serde_json::from_str::<Inbound>(text) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Unparseable relay message dropped");
                return;
            }
        };

        match message {
            Inbound::GetNetwork {
                request_id,
                token,
                filters,
            } => {
                let Some(session) = self.active_session(&token) else {
                    // Open question: no not_found reply exists in the
                    // protocol, so the caller must rely on a timeout.
                    warn!(%token, "Network query for unknown token dropped");
                    return;
                };

                let filters = filters.unwrap_or_else(NetworkFilter::default);
                let requests = filter_requests(session.buffer.requests(), &filters);
                self.relay.send(&Outbound::NetworkData {
                    request_id,
                    requests,
                });
            }

            Inbound::GetConsole {
                request_id,
                token,
                filters,
            } => {
                let Some(session) = self.active_session(&token) else {
                    warn!(%token, "Console query for unknown token dropped");
                    return;
                };

                let filters = filters.unwrap_or_else(ConsoleFilter::default);
                let entries = filter_console(session.buffer.console_entries(), &filters);
                self.relay
                    .send(&Outbound::ConsoleData {
                        request_id,
                        entries,
                    });
            }

            Inbound::Error { message } => {
                warn!(message, "Relay reported an error");
            }
        }
    }

    fn active_session(&self, token: &SessionToken) -> Option<&DebugSession> {
        self.registry
            .find_by_token(token)
            .filter(|session| session.is_active())
    }

    // ========================================================================
    // Relay Lifecycle
    // ========================================================================

    /// Starts a dial unless one is already in flight or connected.
    fn ensure_relay_connecting(&mut self) {
        if self.relay.begin_connect() {
            self.spawn_dial();
        }
    }

    fn spawn_dial(&self) {
        let dialer = Arc::clone(&self.dialer);
        let url = self.relay.url().to_string();
        let tx = self.internal_tx.clone();

        tokio::spawn(async move {
            let result = dialer.dial(&url).await;
            let _ = tx.send(BridgeEvent::DialDone(result));
        });
    }

    fn handle_relay_closed(&mut self) {
        self.relay.on_closed();
        if !self.registry.is_empty() {
            self.relay
                .schedule_reconnect(self.internal_tx.clone(), BridgeEvent::ReconnectTick);
        }
    }

    /// Drops the reconnect timer once no sessions remain.
    fn cancel_reconnect_if_idle(&mut self) {
        if self.registry.is_empty() {
            self.relay.cancel_reconnect();
        }
    }

    // ========================================================================
    // Internal Completions
    // ========================================================================

    fn handle_internal(&mut self, event: BridgeEvent) {
        match event {
            BridgeEvent::DialDone(Ok(link)) => {
                self.relay.on_connected(link);

                // The relay keeps no session knowledge across
                // reconnects; every live session is re-announced.
                let announcements: Vec<Outbound> = self
                    .registry
                    .sessions()
                    .filter(|session| session.is_active())
                    .map(DebugSession::available_message)
                    .collect();
                for message in &announcements {
                    self.relay.send(message);
                }
            }

            BridgeEvent::DialDone(Err(e)) => {
                warn!(error = %e, "Relay dial failed");
                self.relay.on_connect_failed();
                if !self.registry.is_empty() {
                    self.relay
                        .schedule_reconnect(self.internal_tx.clone(), BridgeEvent::ReconnectTick);
                }
            }

            BridgeEvent::ReconnectTick => {
                self.relay.on_reconnect_elapsed();
                if !self.registry.is_empty() {
                    self.ensure_relay_connecting();
                }
            }

            BridgeEvent::BodyFetched {
                tab_id,
                token,
                request_id,
                result,
            } => self.handle_body_fetched(tab_id, &token, &request_id, result),
        }
    }

    fn spawn_body_fetch(
        &self,
        tab_id: TabId,
        token: SessionToken,
        handle: AttachHandle,
        request_id: String,
    ) {
        let host = Arc::clone(&self.host);
        let tx = self.internal_tx.clone();

        tokio::spawn(async move {
            let result = host.fetch_response_body(handle, &request_id).await;
            let _ = tx.send(BridgeEvent::BodyFetched {
                tab_id,
                token,
                request_id,
                result,
            });
        });
    }

    /// Merges a fetched body, discarding stale completions for sessions
    /// that were torn down or replaced while the fetch was in flight.
    fn handle_body_fetched(
        &mut self,
        tab_id: TabId,
        token: &SessionToken,
        request_id: &str,
        result: Result<ResponseBody>,
    ) {
        let Some(session) = self.registry.find_by_tab_mut(tab_id) else {
            trace!(%tab_id, "Stale body fetch for removed session discarded");
            return;
        };
        if !session.is_active() || session.token() != token {
            trace!(%tab_id, "Stale body fetch for replaced session discarded");
            return;
        }

        match result {
            Ok(body) => {
                let (stored, truncated) = translate::prepare_body(
                    &body.body,
                    body.base64_encoded,
                    self.config.body_cap_bytes,
                );
                session.buffer.record_body(request_id, Some(stored), truncated);
            }
            Err(e) => {
                // Best-effort only: the record keeps a null body and the
                // failure is never surfaced to the relay.
                debug!(request_id, error = %e, "Response body fetch failed");
            }
        }
    }
}

// ============================================================================
// Eligibility
// ============================================================================

/// Extracts the session token from top-level response headers.
///
/// Header name matching is case-insensitive; empty values never match.
fn extract_token(
    headers: &rustc_hash::FxHashMap<String, String>,
    marker: &str,
) -> Option<SessionToken> {
    headers
        .iter()
        .find(|(name, value)| name.eq_ignore_ascii_case(marker) && !value.is_empty())
        .map(|(_, value)| SessionToken::new(value.clone()))
}

// ============================================================================
// Tests
// ============================================================================
