//! Key derivation and wrapper hit-path benchmarks.
//!
//! Run with: `cargo bench --bench key_derivation`
//!
//! Measures how argument shape affects key derivation cost and what a cache
//! hit costs end to end for each store.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use memokit::builder::{MemoizeBuilder, StorePolicy};
use memokit::{CallArgs, Hashing, KeyFunction, Value, call_args, infallible};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SEED: u64 = 0x5eed;

fn random_list(rng: &mut StdRng, len: usize) -> Value {
    Value::list((0..len).map(|_| rng.gen_range(0..1_000i64)))
}

fn random_map(rng: &mut StdRng, len: usize) -> Value {
    Value::map((0..len).map(|i| (format!("k{i}"), rng.gen_range(0..1_000i64))))
}

// ============================================================================
// Key Derivation by Argument Shape
// ============================================================================

fn bench_derive_shapes(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(SEED);
    let shapes = [
        ("scalars", call_args!(1, "two", 3.0; flag = true)),
        ("list_16", call_args!(random_list(&mut rng, 16))),
        ("map_16", call_args!(random_map(&mut rng, 16))),
        ("set_16", call_args!(Value::set((0..16).rev()))),
        (
            "nested",
            call_args!(Value::list([
                random_map(&mut rng, 4),
                Value::tuple([Value::Int(1), random_list(&mut rng, 4)]),
                Value::set(["a", "b", "c"]),
            ])),
        ),
    ];

    let mut group = c.benchmark_group("derive_key");
    group.throughput(Throughput::Elements(1));
    for (name, args) in &shapes {
        for (mode, hashing) in [("untyped", Hashing::default()), ("typed", Hashing::new(true, false))] {
            group.bench_with_input(BenchmarkId::new(*name, mode), args, |b, args| {
                b.iter(|| black_box(hashing.derive(black_box(args))))
            });
        }
    }
    group.finish();
}

// ============================================================================
// Strict vs Permissive on Hashable Arguments
// ============================================================================

fn bench_strict_vs_permissive(c: &mut Criterion) {
    let args = call_args!(1, 2, 3, "four"; five = 5.0);
    let mut group = c.benchmark_group("strictness");
    group.bench_function("strict", |b| {
        b.iter(|| black_box(Hashing::strict().derive(black_box(&args))))
    });
    group.bench_function("permissive", |b| {
        b.iter(|| black_box(Hashing::permissive().derive(black_box(&args))))
    });
    group.finish();
}

// ============================================================================
// Hit Path per Store
// ============================================================================

fn bench_hit_path(c: &mut Criterion) {
    let policies = [
        ("unbounded", StorePolicy::Unbounded),
        ("lru", StorePolicy::Lru { capacity: 1_024 }),
        (
            "weighted",
            StorePolicy::Weighted {
                max_weight: 1 << 20,
                max_entries: None,
            },
        ),
    ];

    let mut group = c.benchmark_group("hit_path");
    for (name, policy) in policies {
        let memo = MemoizeBuilder::new()
            .policy(policy)
            .try_build(infallible(|args: &CallArgs| args.len()))
            .expect("valid policy");
        let keys: Vec<CallArgs> = (0..256i64).map(|i| call_args!(Value::list([i, i + 1]))).collect();
        for args in &keys {
            memo.call(args).expect("warm-up call");
        }

        group.throughput(Throughput::Elements(keys.len() as u64));
        group.bench_function(name, |b| {
            b.iter(|| {
                for args in &keys {
                    black_box(memo.call(args).ok());
                }
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_derive_shapes,
    bench_strict_vs_permissive,
    bench_hit_path
);
criterion_main!(benches);
