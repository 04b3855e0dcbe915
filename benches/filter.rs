//! Capture hot-path benchmark suite.
//!
//! Benchmarks the per-event ingestion path and snapshot filtering at
//! different buffer sizes:
//! - Buffer sizes: 100, 1000, 5000 records
//! - Filters: empty, url regex, status range, combined
//!
//! Run with: cargo bench --bench filter
//! Results saved to: target/criterion/

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rustc_hash::FxHashMap;

use debug_bridge::capture::buffer::SessionBuffer;
use debug_bridge::capture::filter::{NetworkFilter, filter_requests};
use debug_bridge::capture::record::NetworkRequestRecord;
use debug_bridge::capture::translate::{self, StreamUpdate};
use debug_bridge::protocol::event::DebuggerEvent;

// ============================================================================
// Benchmark Parameters
// ============================================================================

const SNAPSHOT_SIZES: &[usize] = &[100, 1_000, 5_000];

// ============================================================================
// Fixtures
// ============================================================================

fn snapshot(size: usize) -> Vec<NetworkRequestRecord> {
    (0..size)
        .map(|i| {
            let mut record = NetworkRequestRecord::sent(
                format!("r{i}"),
                i as f64 * 10.0,
                if i % 3 == 0 { "POST" } else { "GET" },
                format!("https://api.example.com/v1/items/{i}?page={}", i % 7),
                FxHashMap::default(),
                None,
            );
            record.status = Some(match i % 5 {
                0 => 500,
                1 => 404,
                _ => 200,
            });
            record
        })
        .collect()
}

fn sent_event(i: usize) -> DebuggerEvent {
    DebuggerEvent::RequestWillBeSent {
        request_id: format!("r{i}"),
        url: format!("https://api.example.com/v1/items/{i}"),
        method: "GET".to_string(),
        headers: FxHashMap::default(),
        post_data: None,
        timestamp_ms: i as f64 * 10.0,
    }
}

// ============================================================================
// Benchmark: Snapshot Filtering
// ============================================================================

fn bench_filter_requests(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_requests");

    for &size in SNAPSHOT_SIZES {
        let records = snapshot(size);

        group.bench_with_input(BenchmarkId::new("empty", size), &records, |b, records| {
            let filter = NetworkFilter::default();
            b.iter(|| filter_requests(records, &filter));
        });

        group.bench_with_input(
            BenchmarkId::new("url_regex", size),
            &records,
            |b, records| {
                let filter = NetworkFilter {
                    url: Some(r"/items/\d+\?page=3".to_string()),
                    ..Default::default()
                };
                b.iter(|| filter_requests(records, &filter));
            },
        );

        group.bench_with_input(
            BenchmarkId::new("status_range", size),
            &records,
            |b, records| {
                let filter = NetworkFilter {
                    status_min: Some(400),
                    status_max: Some(599),
                    ..Default::default()
                };
                b.iter(|| filter_requests(records, &filter));
            },
        );

        group.bench_with_input(
            BenchmarkId::new("combined", size),
            &records,
            |b, records| {
                let filter = NetworkFilter {
                    url: Some(r"api\.example\.com".to_string()),
                    methods: Some(vec!["POST".to_string()]),
                    status_min: Some(200),
                    status_max: Some(299),
                    limit: Some(50),
                    ..Default::default()
                };
                b.iter(|| filter_requests(records, &filter));
            },
        );
    }

    group.finish();
}

// ============================================================================
// Benchmark: Event Ingestion
// ============================================================================

fn bench_translate_ingestion(c: &mut Criterion) {
    let mut group = c.benchmark_group("translate");

    // Steady-state ingestion against a full buffer, eviction included.
    group.bench_function("request_sent_at_cap", |b| {
        let mut buffer = SessionBuffer::new(1_000, 1_000, 100);
        for i in 0..1_000 {
            translate::translate(sent_event(i), &mut buffer);
        }

        let mut next = 1_000;
        b.iter(|| {
            let update = translate::translate(sent_event(next), &mut buffer);
            next += 1;
            debug_assert!(matches!(update, Some(StreamUpdate::Network { .. })));
        });
    });

    group.bench_function("finished_lookup", |b| {
        let mut buffer = SessionBuffer::new(10_000, 1_000, 100);
        for i in 0..5_000 {
            translate::translate(sent_event(i), &mut buffer);
        }

        let mut i = 0;
        b.iter(|| {
            let update = translate::translate(
                DebuggerEvent::LoadingFinished {
                    request_id: format!("r{}", i % 5_000),
                    timestamp_ms: 1_000_000.0,
                },
                &mut buffer,
            );
            i += 1;
            debug_assert!(update.is_some());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_filter_requests, bench_translate_ingestion);
criterion_main!(benches);
