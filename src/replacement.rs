//! Weighted sampling with replacement.
//!
//! Every draw is independent: index `i` comes up with probability
//! \( w_i / \sum_j w_j \). The categorical table is built once from the
//! weights and reused for every draw; the only state carried between draws
//! is the caller's RNG.

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;

use crate::config::PREALLOC_LIMIT;
use crate::error::{Result, SamplerError, WeightIssue};
use crate::weights::WeightVector;

/// Categorical sampler over `0..weights.len()`.
#[derive(Debug, Clone)]
pub struct ReplacementSampler {
    dist: WeightedIndex<f64>,
    population: usize,
}

impl ReplacementSampler {
    /// Fails with [`WeightIssue::AllZero`] when no weight is positive.
    pub fn new(weights: &WeightVector) -> Result<Self> {
        if weights.positive_count() == 0 {
            return Err(SamplerError::InvalidWeights {
                index: None,
                reason: WeightIssue::AllZero,
            });
        }
        let dist = WeightedIndex::new(weights.as_slice()).map_err(|e| {
            SamplerError::InvalidWeights {
                index: None,
                reason: WeightIssue::Unusable(e.to_string()),
            }
        })?;
        Ok(Self {
            dist,
            population: weights.len(),
        })
    }

    /// Draw a single index.
    #[inline]
    pub fn draw_one<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        self.dist.sample(rng)
    }

    /// Append `n` independent draws to `out`.
    pub fn draw_into<R: Rng + ?Sized>(&self, n: usize, rng: &mut R, out: &mut Vec<usize>) {
        // Grow with the draws rather than trusting `n` for one big allocation.
        out.reserve(n.min(PREALLOC_LIMIT));
        for _ in 0..n {
            out.push(self.dist.sample(rng));
        }
    }

    pub fn population(&self) -> usize {
        self.population
    }
}

/// Draw `num_samples` indices with replacement, using a caller-supplied RNG.
pub fn weighted_sample_with_replacement_with_rng<R: Rng + ?Sized>(
    weights: &[f64],
    num_samples: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    let weights = WeightVector::new(weights.to_vec())?;
    let sampler = ReplacementSampler::new(&weights)?;
    let mut out = Vec::with_capacity(num_samples.min(PREALLOC_LIMIT));
    sampler.draw_into(num_samples, rng, &mut out);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn zero_weight_never_drawn() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let ids = weighted_sample_with_replacement_with_rng(&[1.0, 0.0, 3.0], 10_000, &mut rng)
            .expect("valid weights");
        assert_eq!(ids.len(), 10_000);
        assert!(ids.iter().all(|&i| i != 1));
    }

    #[test]
    fn frequencies_follow_weights() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let ids = weighted_sample_with_replacement_with_rng(&[1.0, 0.0, 3.0], 10_000, &mut rng)
            .expect("valid weights");

        let mut counts = [0usize; 3];
        for i in ids {
            counts[i] += 1;
        }
        assert_eq!(counts[1], 0);
        // Expected ratio 3.0; binomial noise at n=10k is well under 0.4.
        let ratio = counts[2] as f64 / counts[0] as f64;
        assert!(
            (2.6..3.4).contains(&ratio),
            "ratio={ratio:.3} counts={counts:?}"
        );
    }

    #[test]
    fn chi_squared_against_weights() {
        let weights = [1.0, 2.0, 3.0, 4.0, 10.0];
        let total: f64 = weights.iter().sum();
        let n = 20_000;
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let ids =
            weighted_sample_with_replacement_with_rng(&weights, n, &mut rng).expect("valid");

        let mut counts = [0usize; 5];
        for i in ids {
            counts[i] += 1;
        }
        let chi2: f64 = counts
            .iter()
            .zip(weights.iter())
            .map(|(&c, &w)| {
                let expected = n as f64 * w / total;
                let diff = c as f64 - expected;
                diff * diff / expected
            })
            .sum();

        // df = 4; p=0.001 critical value is ~18.5.
        assert!(chi2 < 25.0, "chi2={chi2:.2} counts={counts:?}");
    }

    #[test]
    fn rejects_invalid_weights() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let err = weighted_sample_with_replacement_with_rng(&[0.0, 0.0], 3, &mut rng)
            .expect_err("all zero");
        assert_eq!(
            err,
            SamplerError::InvalidWeights {
                index: None,
                reason: WeightIssue::AllZero
            }
        );
        assert!(weighted_sample_with_replacement_with_rng(&[1.0, -1.0], 3, &mut rng).is_err());
    }
}
