//! Field value generation for synthfield.
//!
//! Given a field's [`FieldConfig`](synthfield_config::FieldConfig) and the
//! row generated so far, [`FieldGenerator`] resolves exactly one strategy in
//! a fixed precedence order and samples a value with the caller's RNG.

pub mod engine;
pub mod errors;
pub mod generators;
pub mod logging;
pub mod model;
pub mod strategy;
pub mod weights;

pub use engine::FieldGenerator;
pub use errors::GenerationError;
pub use logging::{LogFormat, LoggingError, init_logging};
pub use model::{GenerateOptions, GenerationReport};
pub use strategy::{Fallthrough, Resolution, Strategy, StrategyKind};
pub use weights::{StandardWeights, WeightError, WeightSource};
