//! Sampler configuration.

use std::num::NonZeroUsize;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, SamplerError};

/// Upper bound on ids reserved up front for a single buffer or draw.
pub(crate) const PREALLOC_LIMIT: usize = 1 << 16;

/// Largest `num_samples` whose ids could ever fit in one `Vec<usize>`.
pub const MAX_NUM_SAMPLES: usize = isize::MAX as usize / std::mem::size_of::<usize>();

/// How many ids each `next_buffer` call hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BufferSize {
    /// Deliver every sample in a single buffer.
    #[default]
    Unbounded,
    /// At most this many ids per buffer; the last buffer may be shorter.
    Fixed(NonZeroUsize),
}

impl BufferSize {
    /// `0` means "everything at once".
    pub fn from_len(len: usize) -> Self {
        NonZeroUsize::new(len).map_or(Self::Unbounded, Self::Fixed)
    }

    /// Ids to emit on the next call given `remaining` undelivered samples.
    pub(crate) fn take(self, remaining: usize) -> usize {
        match self {
            Self::Unbounded => remaining,
            Self::Fixed(n) => remaining.min(n.get()),
        }
    }
}

/// Random engine seeding, and what `reset` does to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SeedPolicy {
    /// Seed from OS entropy once; `reset` keeps drawing from the same stream.
    #[default]
    Entropy,
    /// Seed once with a fixed value; `reset` keeps drawing from the same stream.
    Continue(u64),
    /// Reseed with the same value on every `reset`, replaying the same pass.
    Replay(u64),
}

/// Configuration for [`WeightedRandomSampler`](crate::WeightedRandomSampler).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SamplerConfig {
    /// Total ids drawn per pass.
    pub num_samples: usize,
    /// Draw with replacement (categorical) or without (one-pass).
    pub replacement: bool,
    /// Ids per buffer.
    pub buffer_size: BufferSize,
    /// Engine seeding.
    pub seed: SeedPolicy,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            num_samples: 1,
            replacement: true,
            buffer_size: BufferSize::Unbounded,
            seed: SeedPolicy::Entropy,
        }
    }
}

impl SamplerConfig {
    /// Draw `num_samples` ids with replacement into a single buffer.
    pub fn new(num_samples: usize) -> Self {
        Self {
            num_samples,
            ..Self::default()
        }
    }

    pub fn with_replacement(mut self, replacement: bool) -> Self {
        self.replacement = replacement;
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: BufferSize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_seed_policy(mut self, seed: SeedPolicy) -> Self {
        self.seed = seed;
        self
    }

    /// Checks that do not depend on the weights.
    pub fn validate(&self) -> Result<()> {
        if self.num_samples == 0 {
            return Err(SamplerError::InvalidConfig(
                "num_samples must be > 0".to_string(),
            ));
        }
        if self.num_samples > MAX_NUM_SAMPLES {
            return Err(SamplerError::InvalidConfig(format!(
                "num_samples must be <= {MAX_NUM_SAMPLES} (got {})",
                self.num_samples
            )));
        }
        Ok(())
    }
}
