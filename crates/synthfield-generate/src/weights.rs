//! Probability vectors for weighted categorical choices.
//!
//! The generator only relies on the [`WeightSource`] contract: a vector of
//! `n` non-negative numbers that sums to one. [`StandardWeights`] is the
//! implementation used when callers do not supply their own.

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use rand_distr::{Beta, Distribution, Exp1, LogNormal};
use thiserror::Error;

use synthfield_config::WeightAlgorithm;

const EXPONENTIAL_RATE_MIN: f64 = 0.5;
const EXPONENTIAL_RATE_MAX: f64 = 1.5;
const POWER_LAW_ALPHA_MIN: f64 = 1.0;
const POWER_LAW_ALPHA_MAX: f64 = 2.0;
const BETA_ALPHA: f64 = 2.0;
const BETA_BETA: f64 = 5.0;
const LOGNORMAL_MU: f64 = 0.0;
const LOGNORMAL_SIGMA: f64 = 1.0;
const ZIPF_EXPONENT: f64 = 1.1;

/// Errors raised by a weighting algorithm.
#[derive(Debug, Error)]
pub enum WeightError {
    #[error("invalid distribution parameters: {0}")]
    Parameters(String),
    #[error("weights sum to {0}, cannot normalize")]
    Degenerate(f64),
}

/// Produces probability vectors for a named algorithm.
///
/// Implementations must be safe to share between threads; per-call
/// randomness comes from the supplied RNG.
pub trait WeightSource: Send + Sync {
    fn weights(
        &self,
        algorithm: WeightAlgorithm,
        n: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<f64>, WeightError>;
}

/// Default weighting algorithms backed by `rand_distr`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardWeights;

impl WeightSource for StandardWeights {
    fn weights(
        &self,
        algorithm: WeightAlgorithm,
        n: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<f64>, WeightError> {
        if n == 0 {
            return Ok(Vec::new());
        }

        let mut raw = Vec::with_capacity(n);
        match algorithm {
            WeightAlgorithm::Exponential => {
                let rate = rng.random_range(EXPONENTIAL_RATE_MIN..EXPONENTIAL_RATE_MAX);
                for idx in 0..n {
                    raw.push((-rate * idx as f64).exp());
                }
            }
            WeightAlgorithm::PowerLaw => {
                let alpha = rng.random_range(POWER_LAW_ALPHA_MIN..POWER_LAW_ALPHA_MAX);
                for idx in 0..n {
                    raw.push(((idx + 1) as f64).powf(-alpha));
                }
            }
            WeightAlgorithm::Beta => {
                let dist = Beta::new(BETA_ALPHA, BETA_BETA)
                    .map_err(|err| WeightError::Parameters(err.to_string()))?;
                for _ in 0..n {
                    let value: f64 = dist.sample(&mut *rng);
                    raw.push(value);
                }
            }
            WeightAlgorithm::Lognormal => {
                let dist = LogNormal::new(LOGNORMAL_MU, LOGNORMAL_SIGMA)
                    .map_err(|err| WeightError::Parameters(err.to_string()))?;
                for _ in 0..n {
                    let value: f64 = dist.sample(&mut *rng);
                    raw.push(value);
                }
            }
            WeightAlgorithm::Zipf => {
                // Rank order is shuffled so the heaviest weight is not always
                // the first choice.
                let mut ranks: Vec<usize> = (1..=n).collect();
                ranks.shuffle(&mut *rng);
                for rank in ranks {
                    raw.push((rank as f64).powf(-ZIPF_EXPONENT));
                }
            }
            WeightAlgorithm::Dirichlet => {
                // Normalized Exp(1) draws are a Dirichlet(1, ..., 1) sample.
                for _ in 0..n {
                    let value: f64 = Exp1.sample(&mut *rng);
                    raw.push(value);
                }
            }
        }

        normalize(raw)
    }
}

/// Scale non-negative weights so they sum to one.
pub fn normalize(raw: Vec<f64>) -> Result<Vec<f64>, WeightError> {
    let total: f64 = raw.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(WeightError::Degenerate(total));
    }
    Ok(raw.into_iter().map(|weight| weight / total).collect())
}

/// Uniform vector of length `n`.
pub fn balanced(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    vec![1.0 / n as f64; n]
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn every_algorithm_returns_normalized_vector() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for algorithm in WeightAlgorithm::ALL {
            let weights = StandardWeights
                .weights(algorithm, 5, &mut rng)
                .expect("weights");
            assert_eq!(weights.len(), 5, "{}", algorithm.as_str());
            assert!(weights.iter().all(|weight| *weight >= 0.0));
            let total: f64 = weights.iter().sum();
            assert!((total - 1.0).abs() < 1e-9, "{} sums to {total}", algorithm.as_str());
        }
    }

    #[test]
    fn empty_request_yields_empty_vector() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let weights = StandardWeights
            .weights(WeightAlgorithm::Zipf, 0, &mut rng)
            .expect("weights");
        assert!(weights.is_empty());
    }

    #[test]
    fn exponential_and_power_law_decrease() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for algorithm in [WeightAlgorithm::Exponential, WeightAlgorithm::PowerLaw] {
            let weights = StandardWeights
                .weights(algorithm, 4, &mut rng)
                .expect("weights");
            assert!(weights.windows(2).all(|pair| pair[0] > pair[1]));
        }
    }

    #[test]
    fn normalize_rejects_zero_total() {
        assert!(matches!(
            normalize(vec![0.0, 0.0]),
            Err(WeightError::Degenerate(_))
        ));
        assert_eq!(balanced(4), vec![0.25; 4]);
    }
}
