use thiserror::Error;

/// Core error type shared across synthfield crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A row payload could not be interpreted as a field map.
    #[error("invalid row: {0}")]
    InvalidRow(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results returned by synthfield crates.
pub type Result<T> = std::result::Result<T, Error>;
