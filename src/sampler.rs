//! Buffered weighted id sampler.
//!
//! [`WeightedRandomSampler`] draws `num_samples` ids over `0..N` per pass,
//! either independently (with replacement) or as a one-pass weighted
//! selection (without replacement), and hands them out through a pull-based
//! buffer protocol:
//!
//! ```text
//! Uninitialized --init--> Ready --next_buffer--> Emitting --last ids--> Exhausted
//!                           ^                                              |
//!                           +--------------------- reset ------------------+
//! ```
//!
//! Once exhausted, `next_buffer` keeps returning an empty final buffer; that is
//! end-of-stream, not an error.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace, warn};

use crate::config::{SamplerConfig, SeedPolicy, PREALLOC_LIMIT};
use crate::error::{Result, SamplerError};
use crate::onepass::{check_population, NoReplacementSampler};
use crate::replacement::ReplacementSampler;
use crate::weights::WeightVector;

/// Lifecycle of a sampler instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Ready,
    Emitting,
    Exhausted,
}

/// One chunk of ids handed to the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBuffer {
    /// Position of this buffer within the current pass, starting at 0.
    pub buffer_id: u64,
    pub ids: Vec<usize>,
    /// Set on the buffer that completes the pass and on every call after it.
    pub is_final: bool,
}

impl SampleBuffer {
    fn terminal(buffer_id: u64) -> Self {
        Self {
            buffer_id,
            ids: Vec::new(),
            is_final: true,
        }
    }

    /// Empty and final: nothing more will come until `reset`.
    pub fn is_terminal(&self) -> bool {
        self.is_final && self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Mutable per-pass state.
#[derive(Debug, Default)]
struct SamplerState {
    sample_cursor: usize,
    buffer_cursor: u64,
    /// Precomputed ids not yet emitted (without-replacement only).
    pending_ids: VecDeque<usize>,
}

impl SamplerState {
    fn clear(&mut self) {
        self.sample_cursor = 0;
        self.buffer_cursor = 0;
        self.pending_ids.clear();
    }
}

/// Pull-based id source a pipeline stage consumes.
pub trait IdSampler {
    /// Bind to a data source of `population_size` items.
    fn init(&mut self, population_size: usize) -> Result<()>;

    /// Start a fresh pass.
    fn reset(&mut self) -> Result<()>;

    /// Next chunk of ids; see [`SampleBuffer::is_final`].
    fn next_buffer(&mut self) -> Result<SampleBuffer>;

    /// Ids produced per pass.
    fn num_samples(&self) -> usize;

    /// Iterate over the remaining buffers of the current pass.
    fn buffers(&mut self) -> BufferIter<'_, Self>
    where
        Self: Sized,
    {
        BufferIter {
            sampler: self,
            done: false,
        }
    }
}

/// Yields buffers until (and including) the final one of the pass.
///
/// An already exhausted pass yields nothing. The first error is yielded and
/// ends iteration.
pub struct BufferIter<'a, S: IdSampler> {
    sampler: &'a mut S,
    done: bool,
}

impl<S: IdSampler> Iterator for BufferIter<'_, S> {
    type Item = Result<SampleBuffer>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.sampler.next_buffer() {
            Ok(buffer) if buffer.is_terminal() => {
                self.done = true;
                None
            }
            Ok(buffer) => {
                self.done = buffer.is_final;
                Some(Ok(buffer))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// How a strategy produces ids for one pass.
trait DrawIds {
    /// Prepare a new pass.
    fn prime<R: Rng + ?Sized>(
        &mut self,
        weights: &WeightVector,
        rng: &mut R,
        pending: &mut VecDeque<usize>,
    );

    /// Append up to `n` ids to `out`.
    fn draw<R: Rng + ?Sized>(
        &mut self,
        n: usize,
        rng: &mut R,
        pending: &mut VecDeque<usize>,
        out: &mut Vec<usize>,
    );
}

impl DrawIds for ReplacementSampler {
    fn prime<R: Rng + ?Sized>(&mut self, _: &WeightVector, _: &mut R, _: &mut VecDeque<usize>) {}

    fn draw<R: Rng + ?Sized>(
        &mut self,
        n: usize,
        rng: &mut R,
        _: &mut VecDeque<usize>,
        out: &mut Vec<usize>,
    ) {
        self.draw_into(n, rng, out);
    }
}

impl DrawIds for NoReplacementSampler {
    fn prime<R: Rng + ?Sized>(
        &mut self,
        weights: &WeightVector,
        rng: &mut R,
        pending: &mut VecDeque<usize>,
    ) {
        pending.clear();
        pending.reserve(self.num_samples());
        self.select_into(weights, rng, pending);
    }

    fn draw<R: Rng + ?Sized>(
        &mut self,
        n: usize,
        _: &mut R,
        pending: &mut VecDeque<usize>,
        out: &mut Vec<usize>,
    ) {
        let n = n.min(pending.len());
        out.extend(pending.drain(..n));
    }
}

/// Sampling strategy, fixed at construction.
#[derive(Debug)]
enum Strategy {
    Replacement(ReplacementSampler),
    NoReplacement(NoReplacementSampler),
}

impl DrawIds for Strategy {
    fn prime<R: Rng + ?Sized>(
        &mut self,
        weights: &WeightVector,
        rng: &mut R,
        pending: &mut VecDeque<usize>,
    ) {
        match self {
            Self::Replacement(s) => s.prime(weights, rng, pending),
            Self::NoReplacement(s) => s.prime(weights, rng, pending),
        }
    }

    fn draw<R: Rng + ?Sized>(
        &mut self,
        n: usize,
        rng: &mut R,
        pending: &mut VecDeque<usize>,
        out: &mut Vec<usize>,
    ) {
        match self {
            Self::Replacement(s) => s.draw(n, rng, pending, out),
            Self::NoReplacement(s) => s.draw(n, rng, pending, out),
        }
    }
}

fn seeded_rng(policy: SeedPolicy) -> StdRng {
    match policy {
        SeedPolicy::Entropy => StdRng::from_os_rng(),
        SeedPolicy::Continue(seed) | SeedPolicy::Replay(seed) => StdRng::seed_from_u64(seed),
    }
}

/// Weighted id sampler over items `0..weights.len()`.
///
/// Owns its random engine; no state is shared between instances, so each
/// worker holding its own sampler gets an independent stream.
#[derive(Debug)]
pub struct WeightedRandomSampler {
    weights: WeightVector,
    config: SamplerConfig,
    strategy: Strategy,
    rng: StdRng,
    state: SamplerState,
    phase: Phase,
    /// Error from the last failed `init`, reported again by `reset`.
    init_error: Option<SamplerError>,
    /// Completed `reset`s, including the one performed by `init`.
    passes: u64,
}

impl WeightedRandomSampler {
    /// Validate weights and config and pick the strategy.
    ///
    /// Population checks against `num_samples` are deferred to [`init`](Self::init).
    pub fn new(weights: Vec<f64>, config: SamplerConfig) -> Result<Self> {
        config.validate()?;
        let weights = WeightVector::new(weights)?;
        let strategy = if config.replacement {
            Strategy::Replacement(ReplacementSampler::new(&weights)?)
        } else {
            Strategy::NoReplacement(NoReplacementSampler::deferred(
                config.num_samples,
                weights.len(),
            ))
        };

        Ok(Self {
            rng: seeded_rng(config.seed),
            weights,
            config,
            strategy,
            state: SamplerState::default(),
            phase: Phase::Uninitialized,
            init_error: None,
            passes: 0,
        })
    }

    /// With replacement, one unbounded buffer, entropy seed.
    pub fn with_defaults(weights: Vec<f64>, num_samples: usize) -> Result<Self> {
        Self::new(weights, SamplerConfig::new(num_samples))
    }

    /// Bind the sampler to a data source of `population_size` items and prime
    /// the first pass.
    ///
    /// May be called again later; it re-validates and starts a fresh pass.
    pub fn init(&mut self, population_size: usize) -> Result<()> {
        if let Err(e) = self.validate_population(population_size) {
            warn!(
                population_size,
                num_samples = self.config.num_samples,
                error = %e,
                "weighted sampler init failed"
            );
            self.phase = Phase::Uninitialized;
            self.init_error = Some(e.clone());
            return Err(e);
        }

        self.init_error = None;
        debug!(
            population_size,
            num_samples = self.config.num_samples,
            replacement = self.config.replacement,
            buffer_size = ?self.config.buffer_size,
            "weighted sampler initialized"
        );
        self.restart();
        Ok(())
    }

    fn validate_population(&self, population_size: usize) -> Result<()> {
        if population_size != self.weights.len() {
            return Err(SamplerError::Validation {
                expected: self.weights.len(),
                actual: population_size,
            });
        }
        if !self.config.replacement {
            check_population(&self.weights, self.config.num_samples)?;
        }
        Ok(())
    }

    /// Start a new pass: clear cursors, apply the seed policy and, without
    /// replacement, recompute the selection.
    pub fn reset(&mut self) -> Result<()> {
        if self.phase == Phase::Uninitialized {
            return Err(self
                .init_error
                .clone()
                .unwrap_or(SamplerError::UninitializedAccess));
        }
        self.restart();
        Ok(())
    }

    fn restart(&mut self) {
        if let SeedPolicy::Replay(seed) = self.config.seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        self.state.clear();
        self.strategy
            .prime(&self.weights, &mut self.rng, &mut self.state.pending_ids);
        self.passes += 1;
        self.phase = Phase::Ready;
        debug!(
            pass = self.passes,
            seed = ?self.config.seed,
            pending = self.state.pending_ids.len(),
            "weighted sampler reset"
        );
    }

    /// Hand out the next buffer of ids.
    pub fn next_buffer(&mut self) -> Result<SampleBuffer> {
        match self.phase {
            Phase::Uninitialized => return Err(SamplerError::UninitializedAccess),
            Phase::Exhausted => return Ok(SampleBuffer::terminal(self.state.buffer_cursor)),
            Phase::Ready | Phase::Emitting => {}
        }

        let n = self.config.buffer_size.take(self.remaining());
        let mut ids = Vec::with_capacity(n.min(PREALLOC_LIMIT));
        self.strategy
            .draw(n, &mut self.rng, &mut self.state.pending_ids, &mut ids);

        // A short draw can only come from a drained queue; treat it as the end.
        self.state.sample_cursor += ids.len();
        let is_final = ids.len() < n || self.state.sample_cursor >= self.num_samples();
        let buffer_id = self.state.buffer_cursor;
        self.state.buffer_cursor += 1;
        self.phase = if is_final {
            Phase::Exhausted
        } else {
            Phase::Emitting
        };

        trace!(buffer_id, len = ids.len(), is_final, "emitting id buffer");
        Ok(SampleBuffer {
            buffer_id,
            ids,
            is_final,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn num_samples(&self) -> usize {
        self.config.num_samples
    }

    /// Ids handed out so far in the current pass.
    pub fn samples_emitted(&self) -> usize {
        self.state.sample_cursor
    }

    /// Ids still to come in the current pass.
    pub fn remaining(&self) -> usize {
        self.num_samples().saturating_sub(self.state.sample_cursor)
    }

    /// Passes started so far (`init` counts as the first).
    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn weights(&self) -> &WeightVector {
        &self.weights
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    pub fn is_replacement(&self) -> bool {
        matches!(self.strategy, Strategy::Replacement(_))
    }
}

impl IdSampler for WeightedRandomSampler {
    fn init(&mut self, population_size: usize) -> Result<()> {
        WeightedRandomSampler::init(self, population_size)
    }

    fn reset(&mut self) -> Result<()> {
        WeightedRandomSampler::reset(self)
    }

    fn next_buffer(&mut self) -> Result<SampleBuffer> {
        WeightedRandomSampler::next_buffer(self)
    }

    fn num_samples(&self) -> usize {
        WeightedRandomSampler::num_samples(self)
    }
}
