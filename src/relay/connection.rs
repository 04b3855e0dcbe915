//! Relay connection state machine.
//!
//! `Disconnected -> Connecting -> Connected -> Disconnected`, with at
//! most one physical connection attempt in flight. Reconnection uses a
//! single fixed-delay timer, no exponential backoff; the timer is armed
//! only while sessions remain registered and cancelled when the registry
//! empties.
//!
//! # Delivery Contract
//!
//! [`RelayConnection::send`] is fire-and-forget. While not `Connected`,
//! outbound messages are silently dropped; there is no queue. The bridge
//! provides at-most-once delivery for streamed telemetry, nothing more.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::protocol::message::Outbound;

// ============================================================================
// RelayState
// ============================================================================

/// Connection state toward the signaling endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    /// No channel and no attempt in flight.
    Disconnected,
    /// A dial is in flight. Exclusive: no second dial may start.
    Connecting,
    /// Channel established.
    Connected,
}

// ============================================================================
// RelayLink
// ============================================================================

/// An established duplex channel to the relay.
///
/// Produced by a [`RelayDialer`](crate::relay::dialer::RelayDialer);
/// both halves carry whole JSON text messages.
#[derive(Debug)]
pub struct RelayLink {
    /// Outbound message sink.
    pub outbound: mpsc::UnboundedSender<String>,
    /// Inbound message source. Closes when the channel drops.
    pub inbound: mpsc::UnboundedReceiver<String>,
}

// ============================================================================
// RelayConnection
// ============================================================================

/// Manages the duplex channel to the signaling endpoint.
#[derive(Debug)]
pub struct RelayConnection {
    /// Relay endpoint URL.
    url: String,
    /// Fixed delay before a reconnect attempt.
    reconnect_delay: Duration,
    /// Connection state.
    state: RelayState,
    /// Outbound half of the live link.
    outbound: Option<mpsc::UnboundedSender<String>>,
    /// Inbound half of the live link.
    inbound: Option<mpsc::UnboundedReceiver<String>>,
    /// The armed reconnect timer, if any.
    reconnect: Option<JoinHandle<()>>,
}

impl RelayConnection {
    /// Creates a disconnected relay connection.
    #[must_use]
    pub fn new(url: impl Into<String>, reconnect_delay: Duration) -> Self {
        Self {
            url: url.into(),
            reconnect_delay,
            state: RelayState::Disconnected,
            outbound: None,
            inbound: None,
            reconnect: None,
        }
    }

    /// Returns the relay endpoint URL.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the connection state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> RelayState {
        self.state
    }

    /// Returns `true` while the channel is established.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state == RelayState::Connected
    }

    // ========================================================================
    // State Transitions
    // ========================================================================

    /// Claims the right to dial.
    ///
    /// Returns `true` and transitions to `Connecting` only from
    /// `Disconnected`; the caller then starts exactly one dial.
    pub fn begin_connect(&mut self) -> bool {
        if self.state != RelayState::Disconnected {
            return false;
        }
        self.state = RelayState::Connecting;
        debug!(url = %self.url, "Relay dial starting");
        true
    }

    /// Installs an established link.
    pub fn on_connected(&mut self, link: RelayLink) {
        self.state = RelayState::Connected;
        self.outbound = Some(link.outbound);
        self.inbound = Some(link.inbound);
        debug!(url = %self.url, "Relay connected");
    }

    /// Records a failed dial.
    pub fn on_connect_failed(&mut self) {
        self.state = RelayState::Disconnected;
        self.outbound = None;
        self.inbound = None;
    }

    /// Records an unexpected close of the live channel.
    pub fn on_closed(&mut self) {
        self.state = RelayState::Disconnected;
        self.outbound = None;
        self.inbound = None;
        debug!(url = %self.url, "Relay disconnected");
    }

    // ========================================================================
    // Messaging
    // ========================================================================

    /// Sends a message, fire-and-forget.
    ///
    /// Dropped silently while not connected; there is no outbound queue.
    pub fn send(&mut self, message: &Outbound) {
        if !self.is_connected() {
            trace!("Relay message dropped while disconnected");
            return;
        }

        let json = match serde_json::to_string(message) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize relay message");
                return;
            }
        };

        if let Some(ref outbound) = self.outbound
            && outbound.send(json).is_err()
        {
            // Writer task is gone; the inbound side will report the close.
            trace!("Relay outbound channel closed");
        }
    }

    /// Awaits the next inbound message.
    ///
    /// Pends forever while disconnected (intended for `select!`);
    /// resolves to `None` when the live channel closes.
    pub async fn next_inbound(&mut self) -> Option<String> {
        match self.inbound.as_mut() {
            Some(inbound) => inbound.recv().await,
            None => std::future::pending().await,
        }
    }

    // ========================================================================
    // Reconnect Timer
    // ========================================================================

    /// Arms the reconnect timer, delivering `tick` after the fixed delay.
    ///
    /// At most one timer is armed; repeat calls while armed are no-ops.
    pub fn schedule_reconnect<T: Send + 'static>(&mut self, tx: mpsc::UnboundedSender<T>, tick: T) {
        if self.reconnect.is_some() || self.state != RelayState::Disconnected {
            return;
        }

        let delay = self.reconnect_delay;
        debug!(delay_ms = delay.as_millis() as u64, "Reconnect scheduled");
        self.reconnect = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(tick);
        }));
    }

    /// Cancels the armed reconnect timer, if any.
    ///
    /// Called when the registry empties: with no sessions there is
    /// nothing to relay and no reason to reconnect.
    pub fn cancel_reconnect(&mut self) {
        if let Some(handle) = self.reconnect.take() {
            handle.abort();
            debug!("Reconnect cancelled");
        }
    }

    /// Clears the fired timer so a later disconnect can re-arm it.
    pub fn on_reconnect_elapsed(&mut self) {
        self.reconnect = None;
    }
}

// ============================================================================
// Tests
// ============================================================================
