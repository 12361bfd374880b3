//! `chusen`: weighted index sampling for dataset pipelines.
//!
//! Draws example ids over `0..N` in proportion to per-item weights and hands
//! them to the next pipeline stage in buffers.
//!
//! Exposed modules:
//! - `replacement`: independent categorical draws (with replacement).
//! - `onepass`: exponential-clock selection without replacement, `O(k)` memory.
//! - `sampler`: [`WeightedRandomSampler`], the buffered pull protocol and its lifecycle.
//! - `prefetch`: a background thread that produces buffers ahead of the consumer.
//!
//! ```
//! use chusen::{BufferSize, IdSampler, SamplerConfig, SeedPolicy, WeightedRandomSampler};
//!
//! let config = SamplerConfig::new(7)
//!     .with_replacement(false)
//!     .with_buffer_size(BufferSize::from_len(3))
//!     .with_seed_policy(SeedPolicy::Replay(42));
//! let mut sampler = WeightedRandomSampler::new(vec![1.0, 0.5, 2.0, 4.0, 1.0, 1.0, 3.0, 0.25], config)?;
//! sampler.init(8)?;
//!
//! let lens: Vec<usize> = sampler.buffers().map(|b| b.map(|b| b.len())).collect::<Result<_, _>>()?;
//! assert_eq!(lens, vec![3, 3, 1]);
//! # Ok::<(), chusen::SamplerError>(())
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod onepass;
pub mod prefetch;
pub mod replacement;
pub mod sampler;
pub mod weights;

pub use config::{BufferSize, SamplerConfig, SeedPolicy, MAX_NUM_SAMPLES};
pub use error::{Result, SamplerError, WeightIssue};
pub use onepass::{weighted_sample_without_replacement_with_rng, NoReplacementSampler};
pub use prefetch::BufferPrefetcher;
pub use replacement::{weighted_sample_with_replacement_with_rng, ReplacementSampler};
pub use sampler::{BufferIter, IdSampler, Phase, SampleBuffer, WeightedRandomSampler};
pub use weights::WeightVector;
