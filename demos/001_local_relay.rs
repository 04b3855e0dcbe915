//! End-to-end bridge run against a local relay.
//!
//! Demonstrates:
//! - Spinning up an in-process WebSocket relay that prints everything
//! - Driving the bridge with a scripted host (marker header, network
//!   lifecycle, console output, tab close)
//! - Sending a filtered `get_network` query and printing the reply
//!
//! Usage:
//!   cargo run --example 001_local_relay
//!   cargo run --example 001_local_relay -- --debug
//!   cargo run --example 001_local_relay -- --no-wait

mod common;

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use common::Args;
use futures_util::{SinkExt, StreamExt};
use rustc_hash::FxHashMap;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use debug_bridge::{
    AttachHandle, BridgeConfig, BridgeController, DebuggerHost, HostNotification, ResponseBody,
    Result, TabId, WebSocketDialer,
};

// ============================================================================
// Scripted Host
// ============================================================================

/// A host that grants every attach and serves a canned response body.
struct ScriptedHost {
    next_handle: AtomicU64,
}

#[async_trait]
impl DebuggerHost for ScriptedHost {
    async fn attach(&self, tab_id: TabId) -> Result<AttachHandle> {
        println!("[host] attach to tab {tab_id}");
        Ok(AttachHandle::new(
            self.next_handle.fetch_add(1, Ordering::SeqCst),
        ))
    }

    async fn enable_domains(&self, handle: AttachHandle, domains: &[&str]) -> Result<()> {
        println!("[host] enable {domains:?} on handle {handle}");
        Ok(())
    }

    async fn fetch_response_body(
        &self,
        _handle: AttachHandle,
        request_id: &str,
    ) -> Result<ResponseBody> {
        println!("[host] body fetch for {request_id}");
        Ok(ResponseBody {
            body: r#"{"items":[1,2,3]}"#.to_string(),
            base64_encoded: false,
        })
    }

    async fn detach(&self, handle: AttachHandle, reason: &str) {
        println!("[host] detach handle {handle}: {reason}");
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    common::init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    println!("=== 001: Local Relay ===\n");

    // ========================================================================
    // Local Relay Server
    // ========================================================================

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .context("binding relay listener")?;
    let port = listener.local_addr()?.port();
    println!("[relay] listening on 127.0.0.1:{port}");

    tokio::spawn(async move {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };
        let Ok(ws) = accept_async(stream).await else {
            return;
        };
        let (mut write, mut read) = ws.split();

        // Print everything the bridge sends; after the first network
        // finished event, ask for a 2xx-filtered snapshot.
        let mut queried = false;
        while let Some(Ok(Message::Text(text))) = read.next().await {
            println!("[relay] <- {text}");

            if !queried && text.contains("\"finished\"") {
                queried = true;
                let query = json!({
                    "type": "get_network",
                    "request_id": "q1",
                    "token": "demo-token",
                    "filters": { "status_min": 200, "status_max": 299 }
                });
                println!("[relay] -> {query}");
                if write.send(Message::Text(query.to_string().into())).await.is_err() {
                    break;
                }
            }
        }
    });

    // ========================================================================
    // Bridge
    // ========================================================================

    let config = BridgeConfig::new(format!("ws://127.0.0.1:{port}"));
    let (host_tx, host_rx) = mpsc::unbounded_channel();

    let controller = BridgeController::new(
        config,
        Arc::new(ScriptedHost {
            next_handle: AtomicU64::new(1),
        }),
        Arc::new(WebSocketDialer::new()),
        host_rx,
    )?;
    let bridge = tokio::spawn(controller.run());

    // ========================================================================
    // Scripted Tab Activity
    // ========================================================================

    let tab = TabId::new(1);

    let mut headers = FxHashMap::default();
    headers.insert("x-debug-token".to_string(), "demo-token".to_string());
    host_tx.send(HostNotification::TopLevelResponse {
        tab_id: tab,
        url: "https://shop.example.com/checkout".to_string(),
        headers,
    })?;

    host_tx.send(HostNotification::DebuggerEvent {
        tab_id: tab,
        method: "Network.requestWillBeSent".to_string(),
        params: json!({
            "requestId": "r1",
            "timestamp": 0.10,
            "request": {
                "url": "https://shop.example.com/api/cart",
                "method": "GET",
                "headers": { "Accept": "application/json" }
            }
        }),
    })?;

    host_tx.send(HostNotification::DebuggerEvent {
        tab_id: tab,
        method: "Network.responseReceived".to_string(),
        params: json!({
            "requestId": "r1",
            "response": {
                "status": 200,
                "statusText": "OK",
                "headers": { "Content-Type": "application/json" },
                "mimeType": "application/json"
            }
        }),
    })?;

    host_tx.send(HostNotification::DebuggerEvent {
        tab_id: tab,
        method: "Runtime.consoleAPICalled".to_string(),
        params: json!({
            "type": "warning",
            "timestamp": 180.0,
            "args": [
                { "type": "string", "value": "cart total mismatch:" },
                { "type": "number", "value": 3 }
            ]
        }),
    })?;

    host_tx.send(HostNotification::DebuggerEvent {
        tab_id: tab,
        method: "Network.loadingFinished".to_string(),
        params: json!({ "requestId": "r1", "timestamp": 0.25 }),
    })?;

    // Give the relay time to print the stream and the query reply.
    tokio::time::sleep(Duration::from_millis(500)).await;

    host_tx.send(HostNotification::TabRemoved { tab_id: tab })?;
    tokio::time::sleep(Duration::from_millis(100)).await;

    common::wait_for_exit(args.no_wait).await;

    drop(host_tx);
    bridge.await?;
    println!("\n✓ Demo complete");
    Ok(())
}
