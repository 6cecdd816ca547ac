//! Field configuration contracts for synthfield.

pub mod errors;
pub mod model;
mod params;
pub mod schema;

pub use errors::{ConfigError, ShapeError};
pub use model::{
    Calculation, Case, Dependency, FieldConfig, FormatRule, Mapping, Operation, Position, Range,
    Weight, WeightAlgorithm,
};
pub use schema::field_config_json_schema;
