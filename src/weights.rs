//! Validated per-item weights.

use crate::error::{Result, SamplerError, WeightIssue};

/// Non-negative, finite weights over items `0..len()` with a finite total.
///
/// All-zero vectors are accepted here; only categorical draws need a positive
/// weight, and [`ReplacementSampler`](crate::ReplacementSampler) rejects them.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightVector {
    weights: Vec<f64>,
    total: f64,
    positive: usize,
}

impl WeightVector {
    /// Validate `weights`.
    ///
    /// Rejects empty input, negative or non-finite entries and a sum that
    /// overflows.
    pub fn new(weights: Vec<f64>) -> Result<Self> {
        if weights.is_empty() {
            return Err(invalid(None, WeightIssue::Empty));
        }

        let mut total = 0.0_f64;
        let mut positive = 0usize;
        for (i, &w) in weights.iter().enumerate() {
            if !w.is_finite() {
                return Err(invalid(Some(i), WeightIssue::NonFinite(w)));
            }
            if w < 0.0 {
                return Err(invalid(Some(i), WeightIssue::Negative(w)));
            }
            if w > 0.0 {
                positive += 1;
            }
            total += w;
        }

        if !total.is_finite() {
            return Err(invalid(None, WeightIssue::TotalOverflow));
        }

        Ok(Self {
            weights,
            total,
            positive,
        })
    }

    /// Number of items `N`.
    #[inline]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Always `false`; kept for the `len`/`is_empty` pairing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Sum of all weights.
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Number of strictly positive weights.
    pub fn positive_count(&self) -> usize {
        self.positive
    }

    /// Weight of item `i`, if in range.
    pub fn get(&self, i: usize) -> Option<f64> {
        self.weights.get(i).copied()
    }

    /// Normalized selection probability of item `i` for a single categorical
    /// draw. `None` when out of range or every weight is zero.
    pub fn probability(&self, i: usize) -> Option<f64> {
        if self.positive == 0 {
            return None;
        }
        self.get(i).map(|w| w / self.total)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.weights
    }
}

impl TryFrom<Vec<f64>> for WeightVector {
    type Error = SamplerError;

    fn try_from(weights: Vec<f64>) -> Result<Self> {
        Self::new(weights)
    }
}

fn invalid(index: Option<usize>, reason: WeightIssue) -> SamplerError {
    SamplerError::InvalidWeights { index, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_zeros_alongside_positive_weights() {
        let w = WeightVector::new(vec![1.0, 0.0, 3.0]).expect("valid weights");
        assert_eq!(w.len(), 3);
        assert_eq!(w.total(), 4.0);
        assert_eq!(w.positive_count(), 2);
        assert_eq!(w.probability(2), Some(0.75));
        assert_eq!(w.probability(3), None);
    }

    #[test]
    fn all_zero_is_a_valid_vector() {
        let w = WeightVector::new(vec![0.0, 0.0, 0.0]).expect("zeros are allowed");
        assert_eq!(w.positive_count(), 0);
        assert_eq!(w.total(), 0.0);
        assert_eq!(w.probability(0), None);
    }

    #[test]
    fn rejects_bad_weights() {
        assert_eq!(
            WeightVector::new(vec![]).expect_err("empty"),
            invalid(None, WeightIssue::Empty)
        );
        assert_eq!(
            WeightVector::new(vec![1.0, -2.0]).expect_err("negative"),
            invalid(Some(1), WeightIssue::Negative(-2.0))
        );
        assert_eq!(
            WeightVector::new(vec![f64::MAX, f64::MAX]).expect_err("overflow"),
            invalid(None, WeightIssue::TotalOverflow)
        );

        let err = WeightVector::new(vec![1.0, f64::NAN]).expect_err("nan");
        assert!(matches!(
            err,
            SamplerError::InvalidWeights {
                index: Some(1),
                reason: WeightIssue::NonFinite(w),
            } if w.is_nan()
        ));
    }
}
