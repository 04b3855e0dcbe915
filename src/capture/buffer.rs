//! Bounded per-session capture storage.
//!
//! One [`SessionBuffer`] is owned by each debug session. Network records
//! are kept in insertion order with an id index for phase merges; console
//! entries are an append-only log. Both sides are bounded by count, and
//! overflow removes the oldest `eviction_batch` entries in one pass
//! rather than one entry at a time.
//!
//! Out-of-order protocol delivery is tolerated, not recovered: merge
//! operations for an id that was never inserted are silent no-ops.

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::capture::record::{ConsoleEntry, NetworkRequestRecord};

// ============================================================================
// SessionBuffer
// ============================================================================

/// Bounded storage for one session's captured activity.
#[derive(Debug)]
pub struct SessionBuffer {
    /// Maximum stored network records.
    request_cap: usize,
    /// Maximum stored console entries.
    console_cap: usize,
    /// Entries removed per eviction pass.
    eviction_batch: usize,
    /// Network records in insertion order.
    requests: Vec<NetworkRequestRecord>,
    /// Request id → position in `requests`.
    request_index: FxHashMap<String, usize>,
    /// Console entries in insertion order.
    console_entries: VecDeque<ConsoleEntry>,
}

impl SessionBuffer {
    /// Creates an empty buffer with the given caps.
    #[must_use]
    pub fn new(request_cap: usize, console_cap: usize, eviction_batch: usize) -> Self {
        Self {
            request_cap,
            console_cap,
            eviction_batch,
            requests: Vec::new(),
            request_index: FxHashMap::default(),
            console_entries: VecDeque::new(),
        }
    }

    // ========================================================================
    // Network Records
    // ========================================================================

    /// Inserts a record from the request-sent phase.
    ///
    /// Duplicate ids are a no-op: the first write wins for immutable
    /// fields. Returns `true` if the record was inserted.
    pub fn record_request_sent(&mut self, record: NetworkRequestRecord) -> bool {
        if self.request_index.contains_key(&record.request_id) {
            trace!(request_id = %record.request_id, "Duplicate request-sent event ignored");
            return false;
        }

        self.request_index
            .insert(record.request_id.clone(), self.requests.len());
        self.requests.push(record);
        self.evict_requests_if_over_cap();
        true
    }

    /// Merges response-phase fields into an existing record.
    ///
    /// A missed request-sent event leaves nothing to merge into; the
    /// call is then a silent no-op. Returns `true` if a record merged.
    pub fn record_response_received(
        &mut self,
        request_id: &str,
        status: u16,
        status_text: String,
        headers: FxHashMap<String, String>,
        mime_type: String,
    ) -> bool {
        let Some(record) = self.get_mut(request_id) else {
            return false;
        };

        record.status = Some(status);
        record.status_text = Some(status_text);
        record.response_headers = Some(headers);
        record.mime_type = Some(mime_type);
        true
    }

    /// Merges the load duration into an existing record.
    pub fn record_finished(&mut self, request_id: &str, duration_ms: f64) -> bool {
        let merged = match self.get_mut(request_id) {
            Some(record) => {
                record.duration_ms = Some(duration_ms);
                true
            }
            None => false,
        };
        self.evict_requests_if_over_cap();
        merged
    }

    /// Merges a failure description into an existing record.
    pub fn record_failed(&mut self, request_id: &str, error: String) -> bool {
        match self.get_mut(request_id) {
            Some(record) => {
                record.error = Some(error);
                true
            }
            None => false,
        }
    }

    /// Merges a fetched response body into an existing record.
    ///
    /// Called from an async completion that may arrive well after later
    /// events for the same request; merging stays order-independent.
    pub fn record_body(&mut self, request_id: &str, body: Option<String>, truncated: bool) -> bool {
        match self.get_mut(request_id) {
            Some(record) => {
                record.response_body = body;
                record.response_body_truncated = truncated;
                true
            }
            None => false,
        }
    }

    /// Looks up a record by request id.
    #[must_use]
    pub fn get(&self, request_id: &str) -> Option<&NetworkRequestRecord> {
        self.request_index
            .get(request_id)
            .map(|&slot| &self.requests[slot])
    }

    /// Returns all records in insertion order.
    #[inline]
    #[must_use]
    pub fn requests(&self) -> &[NetworkRequestRecord] {
        &self.requests
    }

    /// Returns the number of stored network records.
    #[inline]
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.len()
    }

    // ========================================================================
    // Console Entries
    // ========================================================================

    /// Appends a console entry.
    pub fn append_console(&mut self, entry: ConsoleEntry) {
        self.console_entries.push_back(entry);

        if self.console_entries.len() > self.console_cap {
            let batch = self.eviction_batch.min(self.console_entries.len());
            self.console_entries.drain(..batch);
            trace!(batch, "Evicted oldest console entries");
        }
    }

    /// Returns console entries in insertion order.
    #[inline]
    pub fn console_entries(&self) -> impl Iterator<Item = &ConsoleEntry> {
        self.console_entries.iter()
    }

    /// Returns the number of stored console entries.
    #[inline]
    #[must_use]
    pub fn console_count(&self) -> usize {
        self.console_entries.len()
    }

    // ========================================================================
    // Eviction
    // ========================================================================

    /// Removes the oldest batch of records when over cap.
    ///
    /// Positions in the id index shift down by the batch size.
    fn evict_requests_if_over_cap(&mut self) {
        if self.requests.len() <= self.request_cap {
            return;
        }

        let batch = self.eviction_batch.min(self.requests.len());
        for record in self.requests.drain(..batch) {
            self.request_index.remove(&record.request_id);
        }
        for slot in self.request_index.values_mut() {
            *slot -= batch;
        }

        trace!(batch, remaining = self.requests.len(), "Evicted oldest network records");
    }

    #[inline]
    fn get_mut(&mut self, request_id: &str) -> Option<&mut NetworkRequestRecord> {
        self.request_index
            .get(request_id)
            .map(|&slot| &mut self.requests[slot])
    }
}

// ============================================================================
// Tests
// ============================================================================
