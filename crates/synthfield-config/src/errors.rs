use serde_json::Value;
use thiserror::Error;

/// Errors raised while reading a field configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("field '{field}': invalid configuration {raw}: {source}")]
    Parse {
        field: String,
        raw: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    pub fn field(&self) -> &str {
        match self {
            ConfigError::Parse { field, .. } => field,
        }
    }
}

/// A strategy payload that is missing a required key or has the wrong type.
///
/// `key` is the dotted path of the offending entry (`range.max`,
/// `format[1].count`) and `value` the raw JSON found there (`null` when
/// the key is missing).
#[derive(Debug, Clone, PartialEq, Error)]
#[error("'{key}' {message} (got {value})")]
pub struct ShapeError {
    pub key: String,
    pub value: Value,
    pub message: String,
}

impl ShapeError {
    pub fn missing(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Value::Null,
            message: "is required".to_string(),
        }
    }

    pub fn invalid(key: impl Into<String>, value: &Value, expected: &str) -> Self {
        Self {
            key: key.into(),
            value: value.clone(),
            message: format!("must be {expected}"),
        }
    }
}
