//! Debugger domain event types.
//!
//! The host API delivers protocol events as `(method, params)` pairs with
//! untyped JSON params. This module parses them into the closed
//! [`DebuggerEvent`] union so the rest of the bridge can pattern-match
//! instead of poking at raw JSON.
//!
//! # Event Types
//!
//! | Domain | Events |
//! |--------|--------|
//! | `Network` | `requestWillBeSent`, `responseReceived`, `loadingFinished`, `loadingFailed` |
//! | `Runtime` | `consoleAPICalled`, `exceptionThrown` |
//! | `Log` | `entryAdded` |
//!
//! Parsing is total: missing or malformed fields fall back to defaults,
//! and unrecognized methods map to [`DebuggerEvent::Unknown`].

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashMap;
use serde_json::Value;

// ============================================================================
// DebuggerEvent
// ============================================================================

/// A parsed debugger domain event.
///
/// Network timestamps arrive in monotonic seconds and are converted to
/// milliseconds here; Runtime/Log timestamps already arrive in
/// milliseconds and pass through unchanged.
#[derive(Debug, Clone)]
pub enum DebuggerEvent {
    /// A network request is about to be sent.
    RequestWillBeSent {
        /// Host-assigned request correlation id.
        request_id: String,
        /// Request URL.
        url: String,
        /// HTTP method.
        method: String,
        /// Request headers.
        headers: FxHashMap<String, String>,
        /// Request post data, when the host provides it.
        post_data: Option<String>,
        /// Event timestamp in milliseconds.
        timestamp_ms: f64,
    },

    /// Response headers received for a request.
    ResponseReceived {
        /// Host-assigned request correlation id.
        request_id: String,
        /// HTTP status code.
        status: u16,
        /// HTTP status text.
        status_text: String,
        /// Response headers.
        headers: FxHashMap<String, String>,
        /// Response MIME type.
        mime_type: String,
    },

    /// A request finished loading.
    LoadingFinished {
        /// Host-assigned request correlation id.
        request_id: String,
        /// Event timestamp in milliseconds.
        timestamp_ms: f64,
    },

    /// A request failed to load.
    LoadingFailed {
        /// Host-assigned request correlation id.
        request_id: String,
        /// Host-provided failure description.
        error: String,
    },

    /// A console API function was called in the page.
    ConsoleApiCalled {
        /// Raw console call type (`log`, `warning`, `assert`, ...).
        call_type: String,
        /// Call arguments in order.
        args: Vec<ConsoleArg>,
        /// Event timestamp in milliseconds.
        timestamp_ms: f64,
        /// Rendered stack trace, when provided.
        stack_trace: Option<String>,
    },

    /// An uncaught exception was thrown in the page.
    ExceptionThrown {
        /// Exception description.
        description: String,
        /// Rendered stack trace, when provided.
        stack_trace: Option<String>,
        /// Source URL, when provided.
        url: Option<String>,
        /// 1-based line number.
        line: Option<u32>,
        /// 1-based column number.
        column: Option<u32>,
        /// Event timestamp in milliseconds.
        timestamp_ms: f64,
    },

    /// A log entry was added (browser-originated, not console API).
    LogEntryAdded {
        /// Raw log level (`verbose`, `info`, `warning`, `error`).
        level: String,
        /// Log text.
        text: String,
        /// Log source category.
        source: Option<String>,
        /// Source URL, when provided.
        url: Option<String>,
        /// 1-based line number.
        line: Option<u32>,
        /// Event timestamp in milliseconds.
        timestamp_ms: f64,
    },

    /// Unrecognized event method, ignored by the bridge.
    Unknown {
        /// The unrecognized method name.
        method: String,
    },
}

impl DebuggerEvent {
    /// Parses a raw `(method, params)` pair into a typed event.
    #[must_use]
    pub fn parse(method: &str, params: &Value) -> Self {
        match method {
            "Network.requestWillBeSent" => {
                let request = params.get("request").cloned().unwrap_or(Value::Null);
                Self::RequestWillBeSent {
                    request_id: get_string(params, "requestId"),
                    url: get_string(&request, "url"),
                    method: get_string_or(&request, "method", "GET"),
                    headers: get_headers(&request, "headers"),
                    post_data: get_optional_string(&request, "postData"),
                    timestamp_ms: get_f64(params, "timestamp") * 1000.0,
                }
            }

            "Network.responseReceived" => {
                let response = params.get("response").cloned().unwrap_or(Value::Null);
                Self::ResponseReceived {
                    request_id: get_string(params, "requestId"),
                    status: get_f64(&response, "status") as u16,
                    status_text: get_string(&response, "statusText"),
                    headers: get_headers(&response, "headers"),
                    mime_type: get_string(&response, "mimeType"),
                }
            }

            "Network.loadingFinished" => Self::LoadingFinished {
                request_id: get_string(params, "requestId"),
                timestamp_ms: get_f64(params, "timestamp") * 1000.0,
            },

            "Network.loadingFailed" => Self::LoadingFailed {
                request_id: get_string(params, "requestId"),
                error: get_string_or(params, "errorText", "loading failed"),
            },

            "Runtime.consoleAPICalled" => Self::ConsoleApiCalled {
                call_type: get_string_or(params, "type", "log"),
                args: params
                    .get("args")
                    .and_then(|v| v.as_array())
                    .map(|args| args.iter().map(ConsoleArg::parse).collect())
                    .unwrap_or_default(),
                timestamp_ms: get_f64(params, "timestamp"),
                stack_trace: params.get("stackTrace").and_then(render_stack_trace),
            },

            "Runtime.exceptionThrown" => {
                let details = params
                    .get("exceptionDetails")
                    .cloned()
                    .unwrap_or(Value::Null);
                let description = details
                    .get("exception")
                    .and_then(|e| e.get("description"))
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| get_string_or(&details, "text", "Uncaught exception"));

                Self::ExceptionThrown {
                    description,
                    stack_trace: details.get("stackTrace").and_then(render_stack_trace),
                    url: get_optional_string(&details, "url"),
                    line: get_optional_u32(&details, "lineNumber"),
                    column: get_optional_u32(&details, "columnNumber"),
                    timestamp_ms: get_f64(params, "timestamp"),
                }
            }

            "Log.entryAdded" => {
                let entry = params.get("entry").cloned().unwrap_or(Value::Null);
                Self::LogEntryAdded {
                    level: get_string_or(&entry, "level", "info"),
                    text: get_string(&entry, "text"),
                    source: get_optional_string(&entry, "source"),
                    url: get_optional_string(&entry, "url"),
                    line: get_optional_u32(&entry, "lineNumber"),
                    timestamp_ms: get_f64(&entry, "timestamp"),
                }
            }

            _ => Self::Unknown {
                method: method.to_string(),
            },
        }
    }
}

// ============================================================================
// ConsoleArg
// ============================================================================

/// A console call argument of unknown runtime type.
///
/// Remote values arrive as heterogeneous JSON shapes; this closed variant
/// captures the cases the bridge can display, with a total
/// [`to_display_string`](Self::to_display_string) that never panics.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleArg {
    /// A serializable primitive value.
    Value(Value),

    /// A host-provided string description (objects, functions, symbols).
    Description(String),

    /// The `undefined` value.
    Undefined,

    /// The `null` value.
    Null,

    /// A value with neither serialization nor description.
    Unknown(String),
}

impl ConsoleArg {
    /// Parses a remote-object JSON shape into a console argument.
    #[must_use]
    pub fn parse(raw: &Value) -> Self {
        let type_name = raw
            .get("type")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");

        if type_name == "undefined" {
            return Self::Undefined;
        }

        let subtype = raw.get("subtype").and_then(|v| v.as_str());
        if subtype == Some("null") {
            return Self::Null;
        }

        match raw.get("value") {
            Some(Value::Null) | None => {}
            Some(value) => return Self::Value(value.clone()),
        }

        if let Some(description) = raw.get("description").and_then(|v| v.as_str()) {
            return Self::Description(description.to_string());
        }

        Self::Unknown(type_name.to_string())
    }

    /// Renders the argument for display.
    ///
    /// Total over all variants; string values render without quotes,
    /// other JSON values render in their compact form.
    #[must_use]
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Value(Value::String(s)) => s.clone(),
            Self::Value(value) => value.to_string(),
            Self::Description(description) => description.clone(),
            Self::Undefined => "undefined".to_string(),
            Self::Null => "null".to_string(),
            Self::Unknown(type_name) => format!("[{type_name}]"),
        }
    }
}

// ============================================================================
// Param Getters
// ============================================================================

/// Gets a string from params, empty when absent.
#[inline]
fn get_string(params: &Value, key: &str) -> String {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

/// Gets a string from params with a fallback.
#[inline]
fn get_string_or(params: &Value, key: &str, default: &str) -> String {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or(default)
        .to_string()
}

/// Gets an optional string from params.
#[inline]
fn get_optional_string(params: &Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

/// Gets an optional u32 from params.
#[inline]
fn get_optional_u32(params: &Value, key: &str) -> Option<u32> {
    params.get(key).and_then(|v| v.as_u64()).map(|n| n as u32)
}

/// Gets an f64 from params, zero when absent.
#[inline]
fn get_f64(params: &Value, key: &str) -> f64 {
    params.get(key).and_then(|v| v.as_f64()).unwrap_or_default()
}

/// Gets a header map from params.
///
/// Non-string header values are stringified rather than dropped.
fn get_headers(params: &Value, key: &str) -> FxHashMap<String, String> {
    let mut headers = FxHashMap::default();

    if let Some(map) = params.get(key).and_then(|v| v.as_object()) {
        for (name, value) in map {
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            headers.insert(name.clone(), rendered);
        }
    }

    headers
}

/// Renders a protocol stack trace into `function (url:line:column)` lines.
fn render_stack_trace(raw: &Value) -> Option<String> {
    let frames = raw.get("callFrames")?.as_array()?;
    if frames.is_empty() {
        return None;
    }

    let lines: Vec<String> = frames
        .iter()
        .map(|frame| {
            let function = frame
                .get("functionName")
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .unwrap_or("<anonymous>");
            let url = frame.get("url").and_then(|v| v.as_str()).unwrap_or("");
            let line = frame
                .get("lineNumber")
                .and_then(|v| v.as_u64())
                .unwrap_or_default();
            let column = frame
                .get("columnNumber")
                .and_then(|v| v.as_u64())
                .unwrap_or_default();
            format!("{function} ({url}:{line}:{column})")
        })
        .collect();

    Some(lines.join("\n"))
}

// ============================================================================
// Tests
// ============================================================================
