use serde_json::Value;
use thiserror::Error;

use synthfield_config::{ConfigError, ShapeError};

/// Errors emitted while generating a field value.
///
/// Every variant names the field being generated so a bad dataset can be
/// traced back to the configuration entry that produced it.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("field '{field}': invalid '{key}' configuration: {message} (got {value})")]
    ConfigShape {
        field: String,
        key: String,
        value: Value,
        message: String,
    },
    #[error("field '{field}': {key} reads '{source_field}' = {value}, which is not {expected}")]
    Coercion {
        field: String,
        key: &'static str,
        source_field: String,
        value: String,
        expected: &'static str,
    },
    #[error("field '{field}': unsupported calculation operation '{operation}'")]
    UnsupportedOperation { field: String, operation: String },
    #[error("field '{field}': division by zero ({key} = {value})")]
    DivisionByZero {
        field: String,
        key: &'static str,
        value: f64,
    },
    #[error("field '{field}': weighting algorithm '{algorithm}' failed: {message}")]
    WeightVector {
        field: String,
        algorithm: &'static str,
        message: String,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("row error: {0}")]
    Row(#[from] synthfield_core::Error),
}

impl GenerationError {
    pub fn shape(field: &str, err: ShapeError) -> Self {
        GenerationError::ConfigShape {
            field: field.to_string(),
            key: err.key,
            value: err.value,
            message: err.message,
        }
    }

    /// Stable identifier used for reporting.
    pub fn code(&self) -> &'static str {
        match self {
            GenerationError::ConfigShape { .. } => "config_shape",
            GenerationError::Coercion { .. } => "coercion",
            GenerationError::UnsupportedOperation { .. } => "unsupported_operation",
            GenerationError::DivisionByZero { .. } => "division_by_zero",
            GenerationError::WeightVector { .. } => "weight_vector",
            GenerationError::Config(_) => "config_parse",
            GenerationError::Row(_) => "invalid_row",
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            GenerationError::ConfigShape { field, .. }
            | GenerationError::Coercion { field, .. }
            | GenerationError::UnsupportedOperation { field, .. }
            | GenerationError::DivisionByZero { field, .. }
            | GenerationError::WeightVector { field, .. } => Some(field),
            GenerationError::Config(err) => Some(err.field()),
            GenerationError::Row(_) => None,
        }
    }
}
