use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::{Rng, RngCore};
use serde_json::Value;

use synthfield_config::Weight;
use synthfield_core::FieldValue;

use crate::errors::GenerationError;
use crate::weights::{WeightSource, balanced};

const NORMALIZATION_TOLERANCE: f64 = 1e-6;

/// Pick one of `choices`, uniformly or by the configured weighting.
pub fn pick(
    field: &str,
    choices: &[Value],
    weight: Option<Weight>,
    source: &dyn WeightSource,
    rng: &mut dyn RngCore,
) -> Result<FieldValue, GenerationError> {
    if choices.is_empty() {
        return Err(GenerationError::ConfigShape {
            field: field.to_string(),
            key: "choices".to_string(),
            value: Value::Array(Vec::new()),
            message: "cannot sample from an empty list".to_string(),
        });
    }
    let Some(weight) = weight else {
        return Ok(FieldValue::from(&choices[rng.random_range(0..choices.len())]));
    };

    let algorithm = if weight.balanced {
        "balanced"
    } else {
        weight.algorithm.as_str()
    };
    let weights = if weight.balanced {
        balanced(choices.len())
    } else {
        source
            .weights(weight.algorithm, choices.len(), &mut *rng)
            .map_err(|err| GenerationError::WeightVector {
                field: field.to_string(),
                algorithm,
                message: err.to_string(),
            })?
    };
    check_vector(&weights, choices.len()).map_err(|message| GenerationError::WeightVector {
        field: field.to_string(),
        algorithm,
        message,
    })?;

    let index = WeightedIndex::new(&weights).map_err(|err| GenerationError::WeightVector {
        field: field.to_string(),
        algorithm,
        message: err.to_string(),
    })?;
    Ok(FieldValue::from(&choices[index.sample(&mut *rng)]))
}

fn check_vector(weights: &[f64], expected_len: usize) -> Result<(), String> {
    if weights.len() != expected_len {
        return Err(format!(
            "expected {expected_len} weights, got {}",
            weights.len()
        ));
    }
    if let Some(weight) = weights
        .iter()
        .find(|weight| !weight.is_finite() || **weight < 0.0)
    {
        return Err(format!("weight {weight} is not a non-negative number"));
    }
    let total: f64 = weights.iter().sum();
    if (total - 1.0).abs() > NORMALIZATION_TOLERANCE {
        return Err(format!("weights sum to {total}, expected 1"));
    }
    Ok(())
}
