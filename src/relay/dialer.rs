//! Relay channel dialing.
//!
//! [`RelayDialer`] abstracts establishing the duplex channel so the
//! controller can be tested against in-memory links. [`WebSocketDialer`]
//! is the production implementation: it connects with tokio-tungstenite,
//! splits the stream, and spawns one pump task per direction.
//!
//! The inbound pump signals channel loss by dropping its sender, which
//! closes the [`RelayLink`](crate::relay::connection::RelayLink) inbound
//! receiver on the controller side.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

use crate::error::Result;
use crate::relay::connection::RelayLink;

// ============================================================================
// RelayDialer
// ============================================================================

/// Establishes the duplex channel to the signaling endpoint.
#[async_trait]
pub trait RelayDialer: Send + Sync {
    /// Dials the endpoint, returning both halves of the channel.
    async fn dial(&self, url: &str) -> Result<RelayLink>;
}

// ============================================================================
// WebSocketDialer
// ============================================================================

/// Production dialer over a WebSocket connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketDialer;

impl WebSocketDialer {
    /// Creates a WebSocket dialer.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RelayDialer for WebSocketDialer {
    async fn dial(&self, url: &str) -> Result<RelayLink> {
        let (ws_stream, _response) = connect_async(url).await?;
        let (mut ws_write, mut ws_read) = ws_stream.split();

        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel::<String>();

        // Writer pump: controller -> relay.
        tokio::spawn(async move {
            while let Some(text) = outbound_rx.recv().await {
                if let Err(e) = ws_write.send(Message::Text(text.into())).await {
                    warn!(error = %e, "Relay write failed");
                    break;
                }
            }
            let _ = ws_write.close().await;
            debug!("Relay writer pump terminated");
        });

        // Reader pump: relay -> controller.
        tokio::spawn(async move {
            while let Some(message) = ws_read.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        if inbound_tx.send(text.to_string()).is_err() {
                            break;
                        }
                    }

                    Ok(Message::Close(_)) => {
                        debug!("Relay closed by remote");
                        break;
                    }

                    Err(e) => {
                        warn!(error = %e, "Relay read failed");
                        break;
                    }

                    // Ignore Binary, Ping, Pong, Frame.
                    _ => {}
                }
            }
            debug!("Relay reader pump terminated");
        });

        Ok(RelayLink {
            outbound: outbound_tx,
            inbound: inbound_rx,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
