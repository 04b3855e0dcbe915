//! Query filter evaluation.
//!
//! Pure and stateless: given a snapshot of records and a filter spec,
//! produce the filtered subsequence with relative order preserved.
//! Predicates are optional and AND-combined.
//!
//! An invalid regex never fails the query: the pattern clause degrades to
//! match-all and the remaining predicates still apply.

// ============================================================================
// Imports
// ============================================================================

use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use crate::capture::record::{ConsoleEntry, ConsoleLevel, NetworkRequestRecord};

// ============================================================================
// NetworkFilter
// ============================================================================

/// Filter criteria for network snapshot queries.
///
/// All fields are optional; an empty filter matches every record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkFilter {
    /// Regex matched against the request URL.
    #[serde(default)]
    pub url: Option<String>,

    /// HTTP method allow-list (case-insensitive).
    #[serde(default)]
    pub methods: Option<Vec<String>>,

    /// Inclusive lower status bound. Requests without a known status
    /// never match a status-bounded filter.
    #[serde(default)]
    pub status_min: Option<u16>,

    /// Inclusive upper status bound.
    #[serde(default)]
    pub status_max: Option<u16>,

    /// Inclusive timestamp cutoff in milliseconds.
    #[serde(default)]
    pub since: Option<f64>,

    /// Maximum results, applied after all other predicates.
    #[serde(default)]
    pub limit: Option<usize>,
}

// ============================================================================
// ConsoleFilter
// ============================================================================

/// Filter criteria for console snapshot queries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsoleFilter {
    /// Regex matched against the entry message.
    #[serde(default)]
    pub message: Option<String>,

    /// Level allow-list.
    #[serde(default)]
    pub levels: Option<Vec<ConsoleLevel>>,

    /// Inclusive timestamp cutoff in milliseconds.
    #[serde(default)]
    pub since: Option<f64>,

    /// Maximum results, applied after all other predicates.
    #[serde(default)]
    pub limit: Option<usize>,
}

// ============================================================================
// Evaluation
// ============================================================================

/// Filters a network snapshot, preserving relative order.
#[must_use]
pub fn filter_requests(
    records: &[NetworkRequestRecord],
    filter: &NetworkFilter,
) -> Vec<NetworkRequestRecord> {
    let url_regex = compile_pattern(filter.url.as_deref());

    let matches = records.iter().filter(|record| {
        if let Some(ref regex) = url_regex
            && !regex.is_match(&record.url)
        {
            return false;
        }

        if let Some(ref methods) = filter.methods
            && !methods
                .iter()
                .any(|m| m.eq_ignore_ascii_case(&record.method))
        {
            return false;
        }

        if filter.status_min.is_some() || filter.status_max.is_some() {
            let Some(status) = record.status else {
                return false;
            };
            if let Some(min) = filter.status_min
                && status < min
            {
                return false;
            }
            if let Some(max) = filter.status_max
                && status > max
            {
                return false;
            }
        }

        if let Some(since) = filter.since
            && record.timestamp_ms < since
        {
            return false;
        }

        true
    });

    apply_limit(matches.cloned(), filter.limit)
}

/// Filters a console snapshot, preserving relative order.
#[must_use]
pub fn filter_console<'a>(
    entries: impl Iterator<Item = &'a ConsoleEntry>,
    filter: &ConsoleFilter,
) -> Vec<ConsoleEntry> {
    let message_regex = compile_pattern(filter.message.as_deref());

    let matches = entries.filter(|entry| {
        if let Some(ref regex) = message_regex
            && !regex.is_match(&entry.message)
        {
            return false;
        }

        if let Some(ref levels) = filter.levels
            && !levels.contains(&entry.level)
        {
            return false;
        }

        if let Some(since) = filter.since
            && entry.timestamp_ms < since
        {
            return false;
        }

        true
    });

    apply_limit(matches.cloned(), filter.limit)
}

/// Compiles an optional pattern, degrading invalid patterns to match-all.
fn compile_pattern(pattern: Option<&str>) -> Option<Regex> {
    let pattern = pattern?;
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            warn!(pattern, error = %e, "Invalid filter regex, clause skipped");
            None
        }
    }
}

/// Truncates to the first `limit` matches.
fn apply_limit<T>(matches: impl Iterator<Item = T>, limit: Option<usize>) -> Vec<T> {
    match limit {
        Some(limit) => matches.take(limit).collect(),
        None => matches.collect(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use rustc_hash::FxHashMap;

    fn record(id: &str, url: &str, method: &str, status: Option<u16>) -> NetworkRequestRecord {
        let mut r = NetworkRequestRecord::sent(id, 100.0, method, url, FxHashMap::default(), None);
        r.status = status;
        r
    }

    fn entry(message: &str, level: ConsoleLevel, timestamp_ms: f64) -> ConsoleEntry {
        ConsoleEntry {
            timestamp_ms,
            level,
            message: message.to_string(),
            args: Vec::new(),
            stack_trace: None,
            source: None,
            line: None,
            column: None,
        }
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let records = vec![
            record("r1", "https://a.example.com", "GET", Some(200)),
            record("r2", "https://b.example.com", "POST", None),
        ];

        let result = filter_requests(&records, &NetworkFilter::default());
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_url_regex_filter() {
        let records = vec![
            record("r1", "https://api.example.com/users", "GET", Some(200)),
            record("r2", "https://cdn.example.com/app.js", "GET", Some(200)),
        ];

        let filter = NetworkFilter {
            url: Some(r"api\.".to_string()),
            ..Default::default()
        };

        let result = filter_requests(&records, &filter);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].request_id, "r1");
    }

    #[test]
    fn test_invalid_regex_degrades_to_match_all() {
        let records = vec![
            record("r1", "https://a.example.com", "GET", Some(200)),
            record("r2", "https://b.example.com", "GET", Some(404)),
        ];

        let filter = NetworkFilter {
            url: Some("[unclosed".to_string()),
            status_min: Some(400),
            ..Default::default()
        };

        // The regex clause is skipped; the status clause still applies.
        let result = filter_requests(&records, &filter);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].request_id, "r2");
    }

    #[test]
    fn test_method_allow_list_case_insensitive() {
        let records = vec![
            record("r1", "https://example.com", "GET", None),
            record("r2", "https://example.com", "POST", None),
        ];

        let filter = NetworkFilter {
            methods: Some(vec!["post".to_string()]),
            ..Default::default()
        };

        let result = filter_requests(&records, &filter);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].request_id, "r2");
    }

    #[test]
    fn test_status_range_excludes_unknown_status() {
        // r1 finished 2xx, r2 never got a response, r3 failed (no status).
        let records = vec![
            record("r1", "https://example.com/ok", "GET", Some(204)),
            record("r2", "https://example.com/pending", "GET", None),
            record("r3", "https://example.com/broken", "GET", None),
        ];

        let filter = NetworkFilter {
            status_min: Some(200),
            status_max: Some(299),
            ..Default::default()
        };

        let result = filter_requests(&records, &filter);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].request_id, "r1");
    }

    #[test]
    fn test_status_range_bounds_inclusive() {
        let records = vec![
            record("r1", "https://example.com", "GET", Some(200)),
            record("r2", "https://example.com", "GET", Some(299)),
            record("r3", "https://example.com", "GET", Some(300)),
        ];

        let filter = NetworkFilter {
            status_min: Some(200),
            status_max: Some(299),
            ..Default::default()
        };

        let result = filter_requests(&records, &filter);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_limit_applied_last() {
        let records: Vec<_> = (0..10)
            .map(|i| {
                record(
                    &format!("r{i}"),
                    "https://example.com",
                    "GET",
                    Some(if i % 2 == 0 { 200 } else { 500 }),
                )
            })
            .collect();

        let filter = NetworkFilter {
            status_min: Some(200),
            status_max: Some(299),
            limit: Some(2),
            ..Default::default()
        };

        // First two matches after filtering, not first two records.
        let result = filter_requests(&records, &filter);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].request_id, "r0");
        assert_eq!(result[1].request_id, "r2");
    }

    #[test]
    fn test_since_cutoff_inclusive() {
        let entries = vec![
            entry("old", ConsoleLevel::Log, 99.0),
            entry("boundary", ConsoleLevel::Log, 100.0),
            entry("new", ConsoleLevel::Log, 101.0),
        ];

        let filter = ConsoleFilter {
            since: Some(100.0),
            ..Default::default()
        };

        let result = filter_console(entries.iter(), &filter);
        let messages: Vec<&str> = result.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["boundary", "new"]);
    }

    #[test]
    fn test_console_level_allow_list() {
        let entries = vec![
            entry("a", ConsoleLevel::Log, 0.0),
            entry("b", ConsoleLevel::Error, 0.0),
            entry("c", ConsoleLevel::Warn, 0.0),
        ];

        let filter = ConsoleFilter {
            levels: Some(vec![ConsoleLevel::Warn, ConsoleLevel::Error]),
            ..Default::default()
        };

        let result = filter_console(entries.iter(), &filter);
        let messages: Vec<&str> = result.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["b", "c"]);
    }

    mod properties {
        use super::*;

        use proptest::prelude::*;

        proptest! {
            /// Output is always a subsequence of the input, limit respected.
            #[test]
            fn filtered_output_is_bounded_subsequence(
                statuses in proptest::collection::vec(
                    proptest::option::of(100u16..600),
                    0..50,
                ),
                limit in proptest::option::of(0usize..60),
            ) {
                let records: Vec<_> = statuses
                    .iter()
                    .enumerate()
                    .map(|(i, &status)| {
                        record(&format!("r{i}"), "https://example.com", "GET", status)
                    })
                    .collect();

                let filter = NetworkFilter {
                    status_min: Some(200),
                    status_max: Some(399),
                    limit,
                    ..Default::default()
                };

                let result = filter_requests(&records, &filter);

                if let Some(limit) = limit {
                    prop_assert!(result.len() <= limit);
                }
                for item in &result {
                    let status = item.status.expect("status-bounded match has status");
                    prop_assert!((200..=399).contains(&status));
                }

                // Relative order preserved: ids come out ascending.
                let ids: Vec<usize> = result
                    .iter()
                    .map(|r| r.request_id[1..].parse().expect("numeric id"))
                    .collect();
                prop_assert!(ids.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }

    #[test]
    fn test_filter_is_side_effect_free_and_deterministic() {
        let records = vec![
            record("r1", "https://example.com/a", "GET", Some(200)),
            record("r2", "https://example.com/b", "GET", Some(200)),
        ];

        let filter = NetworkFilter {
            url: Some("example".to_string()),
            ..Default::default()
        };

        let first = filter_requests(&records, &filter);
        let second = filter_requests(&records, &filter);

        assert_eq!(records.len(), 2);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.request_id, b.request_id);
        }
    }
}
