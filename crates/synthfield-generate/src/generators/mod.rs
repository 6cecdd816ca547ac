//! Samplers for each resolved strategy.
//!
//! `primitives` produce values from configuration alone, `derive` reads
//! other fields of the row, and `choice` handles categorical sampling.

pub mod choice;
pub mod derive;
pub mod primitives;
