//! Criterion micro-benchmarks for bump allocation and record tables.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use kiln_arena::{ByteArena, TableArena};
use kiln_core::{AssetHandle, PathName};
use kiln_snapshot::CacheEntry;

/// Benchmark: 1K copies of a 4 KiB payload into a fresh arena.
fn bench_alloc_copy_1k(c: &mut Criterion) {
    let payload = vec![0xA5u8; 4096];
    c.bench_function("arena_alloc_copy_1k_4k", |b| {
        b.iter(|| {
            let mut arena = ByteArena::with_capacity("asset", 1024 * 4096);
            for _ in 0..1024 {
                black_box(arena.alloc_copy(&payload).unwrap());
            }
        });
    });
}

/// Benchmark: 1K dependency strings.
fn bench_alloc_c_str_1k(c: &mut Criterion) {
    let paths: Vec<String> = (0..1024).map(|i| format!("levels/l{i}/tex{i}.png")).collect();
    c.bench_function("arena_alloc_c_str_1k", |b| {
        b.iter(|| {
            let mut arena = ByteArena::with_capacity("dependency", 64 * 1024);
            for p in &paths {
                black_box(arena.alloc_c_str(p).unwrap());
            }
        });
    });
}

/// Benchmark: first-match scan for the last of 4K cache entries.
fn bench_table_find_4k(c: &mut Criterion) {
    let mut table = TableArena::with_capacity("cache entry", 4096);
    for i in 0..4096u64 {
        let name = PathName::new(&format!("assets/{i}.png")).unwrap();
        table
            .push(CacheEntry {
                name,
                timestamp: i,
                content_length: i,
                asset: AssetHandle::default(),
                dependencies_start: 0,
                dependency_count: 0,
            })
            .unwrap();
    }
    c.bench_function("table_find_last_of_4k", |b| {
        b.iter(|| black_box(table.find(|e| e.name == "assets/4095.png")));
    });
}

criterion_group!(
    benches,
    bench_alloc_copy_1k,
    bench_alloc_c_str_1k,
    bench_table_find_4k
);
criterion_main!(benches);
