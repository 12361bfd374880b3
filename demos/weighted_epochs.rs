//! Epoch-style draws: without replacement, in fixed-size buffers, with a
//! replayable seed so every epoch reproduces the same order.
//!
//! Run with `RUST_LOG=chusen=debug` to see lifecycle events.

use chusen::{BufferSize, IdSampler, SamplerConfig, SeedPolicy, WeightedRandomSampler};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Many small weights, a few large ones, and a couple of excluded items.
    let mut weights: Vec<f64> = (0..40)
        .map(|i| 1.0 / (1.0 + (i as f64)).powf(1.3))
        .collect();
    weights[5] = 0.0;
    weights[17] = 0.0;

    let config = SamplerConfig::new(12)
        .with_replacement(false)
        .with_buffer_size(BufferSize::from_len(5))
        .with_seed_policy(SeedPolicy::Replay(7));
    let mut sampler = WeightedRandomSampler::new(weights.clone(), config)?;
    sampler.init(weights.len())?;

    for epoch in 0..2 {
        if epoch > 0 {
            sampler.reset()?;
        }
        println!("epoch {epoch}:");
        for buffer in sampler.buffers() {
            let buffer = buffer?;
            println!(
                "  buffer {} final={} ids={:?}",
                buffer.buffer_id, buffer.is_final, buffer.ids
            );
        }
    }

    // Same weights, with replacement: heavy items repeat.
    let mut draws = WeightedRandomSampler::new(
        weights.clone(),
        SamplerConfig::new(20).with_seed_policy(SeedPolicy::Replay(7)),
    )?;
    draws.init(weights.len())?;
    println!("with replacement: {:?}", draws.next_buffer()?.ids);

    Ok(())
}
