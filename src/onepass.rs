//! Weighted sampling without replacement in one pass.
//!
//! Exponential-clock method: every item gets an arrival time
//!
//! \[
//! t_i = \frac{-\ln U_i}{w_i}, \quad U_i \sim \mathrm{Uniform}(0, 1]
//! \]
//!
//! i.e. an `Exp(w_i)` variate, and the `k` earliest arrivals form the sample.
//! This is the same selection as Efraimidis–Spirakis A-Res (largest
//! `U_i^{1/w_i}`), expressed on the log scale so that zero weights map cleanly
//! to `t_i = +∞` instead of a degenerate key of `0`.
//!
//! Only the `k` best candidates are ever retained (a max-heap keyed on arrival
//! time), so memory is `O(k)` and time `O(N log k)`; there is no global sort.
//!
//! ## References
//!
//! - Efraimidis & Spirakis (2006): *Weighted random sampling with a reservoir*.
//! - Müller (2016): *Accelerating weighted random sampling without replacement*.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rand::Rng;

use crate::error::{Result, SamplerError};
use crate::weights::WeightVector;

/// A retained candidate. Ordered by arrival time, then by index, so equal
/// times resolve to the lower index first.
#[derive(Debug, Clone, Copy)]
struct Arrival {
    time: f64,
    index: usize,
}

impl PartialEq for Arrival {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Arrival {}

impl PartialOrd for Arrival {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Arrival {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then_with(|| self.index.cmp(&other.index))
    }
}

/// Exponential arrival time for an item of weight `weight`.
#[inline]
fn arrival_time<R: Rng + ?Sized>(weight: f64, rng: &mut R) -> f64 {
    if weight <= 0.0 {
        return f64::INFINITY;
    }
    // `random` is in [0, 1); flip it so ln never sees 0.
    let u = 1.0 - rng.random::<f64>();
    -u.ln() / weight
}

/// Check that `num_samples` distinct ids can be drawn from `weights`.
///
/// When fewer than `num_samples` weights are positive, the remaining slots go
/// to zero-weight items in index order. With no positive weight at all there
/// is nothing to order by, so only the full population may be requested.
pub fn check_population(weights: &WeightVector, num_samples: usize) -> Result<()> {
    let n = weights.len();
    if num_samples > n {
        return Err(SamplerError::InsufficientPopulation {
            requested: num_samples,
            available: n,
        });
    }
    if weights.positive_count() == 0 && num_samples < n {
        return Err(SamplerError::InsufficientPopulation {
            requested: num_samples,
            available: 0,
        });
    }
    Ok(())
}

/// One-pass weighted selection of `num_samples` distinct indices.
#[derive(Debug, Clone)]
pub struct NoReplacementSampler {
    num_samples: usize,
    // Reused between passes.
    heap: BinaryHeap<Arrival>,
}

impl NoReplacementSampler {
    pub fn new(weights: &WeightVector, num_samples: usize) -> Result<Self> {
        check_population(weights, num_samples)?;
        Ok(Self {
            num_samples,
            heap: BinaryHeap::with_capacity(num_samples),
        })
    }

    /// Skip the population check; the owner validates before the first pass.
    pub(crate) fn deferred(num_samples: usize, population: usize) -> Self {
        Self {
            num_samples,
            heap: BinaryHeap::with_capacity(num_samples.min(population)),
        }
    }

    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Run one pass over `weights` and append the selection to `out` in
    /// arrival order (earliest first).
    pub fn select_into<R, E>(&mut self, weights: &WeightVector, rng: &mut R, out: &mut E)
    where
        R: Rng + ?Sized,
        E: Extend<usize>,
    {
        let k = self.num_samples;
        self.heap.clear();
        if k == 0 {
            return;
        }

        for (index, &w) in weights.as_slice().iter().enumerate() {
            let candidate = Arrival {
                time: arrival_time(w, rng),
                index,
            };
            if self.heap.len() < k {
                self.heap.push(candidate);
                continue;
            }
            if let Some(mut latest) = self.heap.peek_mut() {
                if candidate < *latest {
                    *latest = candidate;
                }
            }
        }

        let mut selected: Vec<Arrival> = self.heap.drain().collect();
        selected.sort_unstable();
        out.extend(selected.into_iter().map(|a| a.index));
    }
}

/// Draw `num_samples` distinct indices, weighted, using a caller-supplied RNG.
///
/// Returned in arrival order (not index order).
pub fn weighted_sample_without_replacement_with_rng<R: Rng + ?Sized>(
    weights: &[f64],
    num_samples: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    let weights = WeightVector::new(weights.to_vec())?;
    let mut sampler = NoReplacementSampler::new(&weights, num_samples)?;
    let mut out = Vec::with_capacity(num_samples);
    sampler.select_into(&weights, rng, &mut out);
    Ok(out)
}
