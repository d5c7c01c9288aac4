//! Attribute Resolution Benchmark (Criterion)
//!
//! Measures resolution through provider chains of increasing depth, cold and
//! from the context cache.

use abac_policy_engine::{EvaluationContextExt, InformationPoint, Key, ResolutionContext};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

/// `key0` depends on `key1`, and so on; the last key is a fixed value.
fn provider_chain(depth: usize) -> (Key<u64>, Vec<InformationPoint>) {
    let keys: Vec<Key<u64>> = (0..=depth)
        .map(|i| Key::new(format!("key{}", i)).unwrap())
        .collect();

    let mut providers: Vec<InformationPoint> = (0..depth)
        .map(|i| {
            let next = keys[i + 1].clone();
            InformationPoint::from_fn(keys[i].clone(), move |ctx| Ok(ctx.get_value(&next)? + 1))
        })
        .collect();
    providers.push(keys[depth].with_value(0).into());

    (keys[0].clone(), providers)
}

fn benchmark_cold_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("cold_resolution");

    for depth in [1, 10, 50].iter() {
        let (root, providers) = provider_chain(*depth);

        group.bench_with_input(BenchmarkId::new("depth", depth), &providers, |b, providers| {
            b.iter(|| {
                let mut ctx = ResolutionContext::new(providers.iter().cloned());
                std::hint::black_box(ctx.get_value(&root))
            });
        });
    }

    group.finish();
}

fn benchmark_cached_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("cached_resolution");

    for depth in [1, 10, 50].iter() {
        let (root, providers) = provider_chain(*depth);

        group.bench_function(BenchmarkId::new("depth", depth), |b| {
            b.iter_batched(
                || {
                    let mut ctx = ResolutionContext::new(providers.iter().cloned());
                    let _ = ctx.get_value(&root);
                    ctx
                },
                |mut ctx| std::hint::black_box(ctx.get_value(&root)),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_cold_resolution, benchmark_cached_resolution);

criterion_main!(benches);
