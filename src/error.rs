//! Error types shared by every sampler in the crate.

use thiserror::Error;

/// Why a weight vector was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum WeightIssue {
    /// No weights at all.
    Empty,
    /// A weight below zero.
    Negative(f64),
    /// A NaN or infinite weight.
    NonFinite(f64),
    /// Every weight is zero, so there is no distribution to draw from.
    AllZero,
    /// The weights are individually fine but their sum overflows `f64`.
    TotalOverflow,
    /// Rejected by the categorical distribution builder.
    Unusable(String),
}

impl std::fmt::Display for WeightIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "weight vector is empty"),
            Self::Negative(w) => write!(f, "weight must be >= 0 (got {w})"),
            Self::NonFinite(w) => write!(f, "weight must be finite (got {w})"),
            Self::AllZero => write!(f, "at least one weight must be > 0"),
            Self::TotalOverflow => write!(f, "sum of weights is not finite"),
            Self::Unusable(reason) => write!(f, "{reason}"),
        }
    }
}

/// Errors surfaced by sampler construction, `init`, `reset` and `next_buffer`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SamplerError {
    #[error("invalid weights{}: {reason}", at_index(.index))]
    InvalidWeights {
        index: Option<usize>,
        reason: WeightIssue,
    },
    #[error("cannot draw {requested} distinct ids from a population of {available}")]
    InsufficientPopulation { requested: usize, available: usize },
    #[error("population size {actual} does not match weight vector length {expected}")]
    Validation { expected: usize, actual: usize },
    #[error("sampler used before a successful init")]
    UninitializedAccess,
    #[error("configuration error: {0}")]
    InvalidConfig(String),
}

fn at_index(index: &Option<usize>) -> String {
    index.map(|i| format!(" at index {i}")).unwrap_or_default()
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, SamplerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_weight() {
        let err = SamplerError::InvalidWeights {
            index: Some(3),
            reason: WeightIssue::Negative(-0.5),
        };
        assert_eq!(
            err.to_string(),
            "invalid weights at index 3: weight must be >= 0 (got -0.5)"
        );

        let err = SamplerError::InvalidWeights {
            index: None,
            reason: WeightIssue::AllZero,
        };
        assert_eq!(
            err.to_string(),
            "invalid weights: at least one weight must be > 0"
        );
    }
}
