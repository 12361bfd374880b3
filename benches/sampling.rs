use chusen::{
    weighted_sample_with_replacement_with_rng, weighted_sample_without_replacement_with_rng,
    BufferSize, IdSampler, SamplerConfig, SeedPolicy, WeightedRandomSampler,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn skewed_weights(n: usize) -> Vec<f64> {
    (0..n).map(|i| 1.0 / (1.0 + i as f64).powf(1.3)).collect()
}

fn bench_without_replacement(c: &mut Criterion) {
    let mut group = c.benchmark_group("onepass");

    // Bounded heap: cost should track N log k, not N log N.
    let sizes = [1_000, 10_000, 100_000];
    let k = 100;

    for &size in &sizes {
        let weights = skewed_weights(size);
        group.bench_function(format!("n{}_k{}", size, k), |b| {
            let mut rng = ChaCha8Rng::seed_from_u64(1);
            b.iter(|| {
                let ids = weighted_sample_without_replacement_with_rng(
                    black_box(&weights),
                    black_box(k),
                    &mut rng,
                );
                black_box(ids.ok());
            })
        });
    }
    group.finish();
}

fn bench_with_replacement(c: &mut Criterion) {
    let mut group = c.benchmark_group("replacement");
    let sizes = [10, 1_000, 100_000];
    let k = 10_000;

    for &size in &sizes {
        let weights = skewed_weights(size);
        group.bench_function(format!("n{}_draws{}", size, k), |b| {
            let mut rng = ChaCha8Rng::seed_from_u64(2);
            b.iter(|| {
                let ids =
                    weighted_sample_with_replacement_with_rng(black_box(&weights), k, &mut rng);
                black_box(ids.ok());
            })
        });
    }
    group.finish();
}

fn bench_buffered_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffered_pass");
    let n = 50_000;

    for replacement in [false, true] {
        let config = SamplerConfig::new(5_000)
            .with_replacement(replacement)
            .with_buffer_size(BufferSize::from_len(64))
            .with_seed_policy(SeedPolicy::Continue(3));
        let mut sampler = match WeightedRandomSampler::new(skewed_weights(n), config) {
            Ok(s) => s,
            Err(_) => return,
        };
        if sampler.init(n).is_err() {
            return;
        }

        group.bench_function(format!("replacement_{}", replacement), |b| {
            b.iter(|| {
                if sampler.reset().is_err() {
                    return;
                }
                for buffer in sampler.buffers() {
                    black_box(buffer.ok());
                }
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_without_replacement,
    bench_with_replacement,
    bench_buffered_pass
);
criterion_main!(benches);
