//! Criterion micro-benchmarks for snapshot encode and decode.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use kiln_bench::scene_profile;
use kiln_converters::default_registry;
use kiln_engine::{AssetManager, ManagerConfig};
use kiln_snapshot::SnapshotReader;

/// Encode the cache of a 32-level scene (~1K entries) into memory.
fn snapshot_bytes() -> Vec<u8> {
    let profile = scene_profile(32, 32, 256);
    let mut m = AssetManager::new(
        ManagerConfig::new("bench-no-snapshot.bin"),
        profile.source,
        default_registry(),
    )
    .unwrap();
    let report = m.load_all(&profile.roots);
    assert_eq!(report.failed(), 0);
    let mut bytes = Vec::new();
    m.write_snapshot(&mut bytes).unwrap();
    bytes
}

/// Benchmark: encode the scene's cache.
fn bench_snapshot_encode(c: &mut Criterion) {
    let profile = scene_profile(32, 32, 256);
    let mut m = AssetManager::new(
        ManagerConfig::new("bench-no-snapshot.bin"),
        profile.source,
        default_registry(),
    )
    .unwrap();
    m.load_all(&profile.roots);

    c.bench_function("snapshot_encode_1k", |b| {
        b.iter(|| {
            let mut buf = Vec::with_capacity(512 * 1024);
            m.write_snapshot(&mut buf).unwrap();
            black_box(&buf);
        });
    });
}

/// Benchmark: decode and validate the scene's cache.
fn bench_snapshot_decode(c: &mut Criterion) {
    let bytes = snapshot_bytes();
    c.bench_function("snapshot_decode_1k", |b| {
        b.iter(|| black_box(SnapshotReader::decode(&bytes).unwrap()));
    });
}

criterion_group!(benches, bench_snapshot_encode, bench_snapshot_decode);
criterion_main!(benches);
