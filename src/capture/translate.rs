//! Debugger event translation.
//!
//! Maps each parsed [`DebuggerEvent`] into buffer mutations plus at most
//! one outbound stream update. The mapping is total: malformed or
//! out-of-order events degrade to no-ops, never errors.
//!
//! Response bodies are not part of the event stream; the controller
//! fetches them best-effort after `loadingFinished` and merges the
//! result through [`prepare_body`] + `SessionBuffer::record_body`.

// ============================================================================
// Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64Standard;
use serde_json::{Value, json};
use tracing::trace;

use crate::capture::buffer::SessionBuffer;
use crate::capture::record::{ConsoleEntry, ConsoleLevel, NetworkRequestRecord};
use crate::protocol::event::DebuggerEvent;
use crate::protocol::message::NetworkPhase;

// ============================================================================
// StreamUpdate
// ============================================================================

/// The outbound half of a translated event.
///
/// The controller wraps this with the session token into a relay message.
#[derive(Debug, Clone)]
pub enum StreamUpdate {
    /// A network lifecycle update for one request.
    Network {
        /// Request lifecycle phase.
        phase: NetworkPhase,
        /// Phase-specific payload.
        data: Value,
    },

    /// A captured console entry.
    Console {
        /// The entry just appended to the buffer.
        entry: ConsoleEntry,
    },
}

// ============================================================================
// Translation
// ============================================================================

/// Applies one debugger event to the session buffer.
///
/// Returns the stream update to relay, or `None` when the event merged
/// into nothing (missed request-sent, duplicate sent, unknown method).
pub fn translate(event: DebuggerEvent, buffer: &mut SessionBuffer) -> Option<StreamUpdate> {
    match event {
        DebuggerEvent::RequestWillBeSent {
            request_id,
            url,
            method,
            headers,
            post_data,
            timestamp_ms,
        } => {
            let record = NetworkRequestRecord::sent(
                request_id.clone(),
                timestamp_ms,
                method.clone(),
                url.clone(),
                headers,
                post_data,
            );

            if !buffer.record_request_sent(record) {
                return None;
            }

            Some(StreamUpdate::Network {
                phase: NetworkPhase::Request,
                data: json!({
                    "requestId": request_id,
                    "url": url,
                    "method": method,
                    "timestampMs": timestamp_ms,
                }),
            })
        }

        DebuggerEvent::ResponseReceived {
            request_id,
            status,
            status_text,
            headers,
            mime_type,
        } => {
            if !buffer.record_response_received(
                &request_id,
                status,
                status_text.clone(),
                headers,
                mime_type.clone(),
            ) {
                return None;
            }

            Some(StreamUpdate::Network {
                phase: NetworkPhase::Response,
                data: json!({
                    "requestId": request_id,
                    "status": status,
                    "statusText": status_text,
                    "mimeType": mime_type,
                }),
            })
        }

        DebuggerEvent::LoadingFinished {
            request_id,
            timestamp_ms,
        } => {
            let started = buffer.get(&request_id)?.timestamp_ms;
            let duration_ms = (timestamp_ms - started).max(0.0);
            buffer.record_finished(&request_id, duration_ms);

            Some(StreamUpdate::Network {
                phase: NetworkPhase::Finished,
                data: json!({
                    "requestId": request_id,
                    "durationMs": duration_ms,
                }),
            })
        }

        DebuggerEvent::LoadingFailed { request_id, error } => {
            if !buffer.record_failed(&request_id, error.clone()) {
                return None;
            }

            Some(StreamUpdate::Network {
                phase: NetworkPhase::Failed,
                data: json!({
                    "requestId": request_id,
                    "error": error,
                }),
            })
        }

        DebuggerEvent::ConsoleApiCalled {
            call_type,
            args,
            timestamp_ms,
            stack_trace,
        } => {
            let rendered: Vec<String> = args.iter().map(|a| a.to_display_string()).collect();
            let entry = ConsoleEntry {
                timestamp_ms,
                level: ConsoleLevel::from_console_type(&call_type),
                message: rendered.join(" "),
                args: rendered,
                stack_trace,
                source: None,
                line: None,
                column: None,
            };

            buffer.append_console(entry.clone());
            Some(StreamUpdate::Console { entry })
        }

        DebuggerEvent::ExceptionThrown {
            description,
            stack_trace,
            url,
            line,
            column,
            timestamp_ms,
        } => {
            let entry = ConsoleEntry {
                timestamp_ms,
                level: ConsoleLevel::Error,
                message: description,
                args: Vec::new(),
                stack_trace,
                source: url,
                line,
                column,
            };

            buffer.append_console(entry.clone());
            Some(StreamUpdate::Console { entry })
        }

        DebuggerEvent::LogEntryAdded {
            level,
            text,
            source,
            url,
            line,
            timestamp_ms,
        } => {
            let entry = ConsoleEntry {
                timestamp_ms,
                level: ConsoleLevel::from_log_level(&level),
                message: text,
                args: Vec::new(),
                stack_trace: None,
                source: source.or(url),
                line,
                column: None,
            };

            buffer.append_console(entry.clone());
            Some(StreamUpdate::Console { entry })
        }

        DebuggerEvent::Unknown { method } => {
            trace!(method, "Ignoring unrecognized debugger event");
            None
        }
    }
}

// ============================================================================
// Body Preparation
// ============================================================================

/// Prepares a fetched response body for storage.
///
/// Returns the stored string and whether it was truncated. Text bodies
/// over `cap_bytes` are cut on a char boundary; base64-encoded (binary)
/// bodies become a short placeholder instead of raw bytes, also marked
/// truncated.
#[must_use]
pub fn prepare_body(body: &str, base64_encoded: bool, cap_bytes: usize) -> (String, bool) {
    if base64_encoded {
        let byte_len = Base64Standard
            .decode(body)
            .map_or_else(|_| body.len(), |bytes| bytes.len());
        return (format!("<binary body: {byte_len} bytes>"), true);
    }

    if body.len() <= cap_bytes {
        return (body.to_string(), false);
    }

    let mut end = cap_bytes;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    (body[..end].to_string(), true)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::protocol::event::ConsoleArg;

    fn buffer() -> SessionBuffer {
        SessionBuffer::new(100, 100, 10)
    }

    fn sent_event(id: &str, timestamp_ms: f64) -> DebuggerEvent {
        DebuggerEvent::RequestWillBeSent {
            request_id: id.to_string(),
            url: format!("https://example.com/{id}"),
            method: "GET".to_string(),
            headers: rustc_hash::FxHashMap::default(),
            post_data: None,
            timestamp_ms,
        }
    }

    #[test]
    fn test_request_sent_inserts_and_streams() {
        let mut buffer = buffer();
        let update = translate(sent_event("r1", 10.0), &mut buffer);

        assert_eq!(buffer.request_count(), 1);
        match update {
            Some(StreamUpdate::Network { phase, data }) => {
                assert_eq!(phase, NetworkPhase::Request);
                assert_eq!(data["requestId"], "r1");
            }
            other => panic!("unexpected update: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_sent_emits_nothing() {
        let mut buffer = buffer();
        translate(sent_event("r1", 10.0), &mut buffer);
        let update = translate(sent_event("r1", 20.0), &mut buffer);

        assert!(update.is_none());
        assert_eq!(buffer.request_count(), 1);
    }

    #[test]
    fn test_finished_computes_duration() {
        let mut buffer = buffer();
        translate(sent_event("r1", 1000.0), &mut buffer);

        let update = translate(
            DebuggerEvent::LoadingFinished {
                request_id: "r1".to_string(),
                timestamp_ms: 1250.0,
            },
            &mut buffer,
        );

        match update {
            Some(StreamUpdate::Network { phase, data }) => {
                assert_eq!(phase, NetworkPhase::Finished);
                assert_eq!(data["durationMs"], 250.0);
            }
            other => panic!("unexpected update: {other:?}"),
        }
        assert_eq!(buffer.get("r1").expect("r1").duration_ms, Some(250.0));
    }

    #[test]
    fn test_phase_event_without_sent_is_silent() {
        let mut buffer = buffer();

        let update = translate(
            DebuggerEvent::LoadingFinished {
                request_id: "ghost".to_string(),
                timestamp_ms: 1.0,
            },
            &mut buffer,
        );
        assert!(update.is_none());

        let update = translate(
            DebuggerEvent::LoadingFailed {
                request_id: "ghost".to_string(),
                error: "net::ERR_ABORTED".to_string(),
            },
            &mut buffer,
        );
        assert!(update.is_none());
    }

    #[test]
    fn test_console_message_joins_args_with_spaces() {
        let mut buffer = buffer();

        let update = translate(
            DebuggerEvent::ConsoleApiCalled {
                call_type: "log".to_string(),
                args: vec![
                    ConsoleArg::Value(json!("count:")),
                    ConsoleArg::Value(json!(3)),
                    ConsoleArg::Undefined,
                    ConsoleArg::Null,
                    ConsoleArg::Description("Object".to_string()),
                ],
                timestamp_ms: 5.0,
                stack_trace: None,
            },
            &mut buffer,
        );

        match update {
            Some(StreamUpdate::Console { entry }) => {
                assert_eq!(entry.message, "count: 3 undefined null Object");
                assert_eq!(entry.args.len(), 5);
                assert_eq!(entry.level, ConsoleLevel::Log);
            }
            other => panic!("unexpected update: {other:?}"),
        }
        assert_eq!(buffer.console_count(), 1);
    }

    #[test]
    fn test_console_unknown_type_defaults_to_log() {
        let mut buffer = buffer();

        let update = translate(
            DebuggerEvent::ConsoleApiCalled {
                call_type: "table".to_string(),
                args: vec![ConsoleArg::Description("Array(2)".to_string())],
                timestamp_ms: 5.0,
                stack_trace: None,
            },
            &mut buffer,
        );

        match update {
            Some(StreamUpdate::Console { entry }) => assert_eq!(entry.level, ConsoleLevel::Log),
            other => panic!("unexpected update: {other:?}"),
        }
    }

    #[test]
    fn test_exception_maps_to_error_entry() {
        let mut buffer = buffer();

        let update = translate(
            DebuggerEvent::ExceptionThrown {
                description: "TypeError: boom".to_string(),
                stack_trace: Some("boom (app.js:1:1)".to_string()),
                url: Some("https://example.com/app.js".to_string()),
                line: Some(1),
                column: Some(1),
                timestamp_ms: 9.0,
            },
            &mut buffer,
        );

        match update {
            Some(StreamUpdate::Console { entry }) => {
                assert_eq!(entry.level, ConsoleLevel::Error);
                assert_eq!(entry.message, "TypeError: boom");
                assert!(entry.stack_trace.is_some());
                assert_eq!(entry.source.as_deref(), Some("https://example.com/app.js"));
            }
            other => panic!("unexpected update: {other:?}"),
        }
    }

    #[test]
    fn test_log_entry_maps_levels() {
        let mut buffer = buffer();

        let update = translate(
            DebuggerEvent::LogEntryAdded {
                level: "warning".to_string(),
                text: "deprecated API".to_string(),
                source: Some("deprecation".to_string()),
                url: None,
                line: Some(12),
                timestamp_ms: 3.0,
            },
            &mut buffer,
        );

        match update {
            Some(StreamUpdate::Console { entry }) => {
                assert_eq!(entry.level, ConsoleLevel::Warn);
                assert_eq!(entry.source.as_deref(), Some("deprecation"));
                assert_eq!(entry.line, Some(12));
            }
            other => panic!("unexpected update: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_event_is_ignored() {
        let mut buffer = buffer();
        let update = translate(
            DebuggerEvent::Unknown {
                method: "Page.frameNavigated".to_string(),
            },
            &mut buffer,
        );
        assert!(update.is_none());
        assert_eq!(buffer.request_count(), 0);
        assert_eq!(buffer.console_count(), 0);
    }

    #[test]
    fn test_prepare_body_under_cap() {
        let (body, truncated) = prepare_body("hello", false, 100);
        assert_eq!(body, "hello");
        assert!(!truncated);
    }

    #[test]
    fn test_prepare_body_truncates_on_char_boundary() {
        // Multi-byte snowman chars; a 6-byte cap lands mid-char.
        let body = "snow\u{2603}\u{2603}\u{2603}";
        let (stored, truncated) = prepare_body(body, false, 6);
        assert!(truncated);
        assert!(stored.len() <= 6);
        assert!(body.starts_with(&stored));
    }

    #[test]
    fn test_prepare_body_binary_placeholder() {
        let encoded = Base64Standard.encode([0u8, 159, 146, 150]);
        let (stored, truncated) = prepare_body(&encoded, true, 100);
        assert_eq!(stored, "<binary body: 4 bytes>");
        assert!(truncated);
    }
}
