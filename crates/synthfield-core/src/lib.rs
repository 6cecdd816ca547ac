//! Core value contracts for synthfield.
//!
//! This crate defines the generated value model and the in-progress row that
//! field generators read from. Both are shared by the config and generation
//! crates.

pub mod error;
pub mod row;
pub mod value;

pub use error::{Error, Result};
pub use row::Row;
pub use value::{FieldValue, json_equal};
