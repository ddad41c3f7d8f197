//! Performance benchmarks for operator resolution
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use oplookup::normalize::{match_form, normalize_key};
use oplookup::query::{QueryService, ResolveOptions, Snapshot};
use oplookup::store::{OperatorRecord, RecordStore, SnapshotMeta, Status};
use oplookup::utils::ResolverConfig;

const WORDS: &[&str] = &[
    "acme", "basin", "cedar", "delta", "eagle", "frontier", "granite", "horizon", "iron", "juniper",
    "keystone", "lone", "mesa", "north", "osage", "prairie", "quail", "red", "summit", "timber",
];
const KINDS: &[&str] = &[
    "oil",
    "gas",
    "energy",
    "resources",
    "petroleum",
    "operating",
    "exploration",
];
const SUFFIXES: &[&str] = &["llc", "inc", "company", "corporation", "lp", "co"];

/// Deterministic synthetic snapshot of `count` operators
fn synthetic_store(count: usize) -> RecordStore {
    let entries = (0..count)
        .map(|i| {
            let key = format!(
                "{} {} {} {}",
                WORDS[i % WORDS.len()],
                WORDS[(i / WORDS.len()) % WORDS.len()],
                KINDS[(i / 7) % KINDS.len()],
                SUFFIXES[i % SUFFIXES.len()],
            );
            let key = if i >= WORDS.len() * WORDS.len() {
                format!("{} {}", key, i)
            } else {
                key
            };
            let record = OperatorRecord {
                name: key.to_uppercase(),
                phone: Some(format!("(405) 555-{:04}", i % 10_000)),
                address: None,
                city: Some("OKLAHOMA CITY".to_string()),
                state: Some("OK".to_string()),
                zip: None,
                contact_name: None,
                status: if i % 5 == 0 { Status::Cancelled } else { Status::Open },
            };
            (key, record)
        })
        .collect();
    RecordStore::from_entries(SnapshotMeta::default(), entries).expect("synthetic keys are valid")
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    let input = "  5-Buck's   Oil Company, L.L.C.  d/b/a  Bucks Energy ";

    group.bench_function("normalize_key", |b| {
        b.iter(|| normalize_key(black_box(input)))
    });
    group.bench_function("match_form", |b| {
        b.iter(|| match_form(black_box(input)))
    });

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.sample_size(10);

    for count in [1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter_batched(
                || synthetic_store(count),
                |store| Snapshot::new(black_box(store)),
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let snapshot = Snapshot::new(synthetic_store(10_000));
    let service = QueryService::new(snapshot, ResolverConfig::default());
    let options = ResolveOptions::default();
    let filtered = ResolveOptions::default().with_status(Status::Open);

    let mut group = c.benchmark_group("resolve");

    group.bench_function("exact", |b| {
        b.iter(|| service.resolve(black_box("ACME ACME OIL LLC"), &options))
    });

    group.bench_function("fuzzy_typo", |b| {
        b.iter(|| service.resolve(black_box("acme basn energy company"), &options))
    });

    group.bench_function("fuzzy_truncated", |b| {
        b.iter(|| service.resolve(black_box("frontier mesa petro"), &options))
    });

    group.bench_function("fuzzy_status_filter", |b| {
        b.iter(|| service.resolve(black_box("granite red gas"), &filtered))
    });

    group.bench_function("miss", |b| {
        b.iter(|| service.resolve(black_box("quantum widgets"), &options))
    });

    group.finish();
}

criterion_group!(benches, bench_normalize, bench_build, bench_resolve);
criterion_main!(benches);
