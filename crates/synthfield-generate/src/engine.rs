use rand::RngCore;
use serde_json::Value;
use tracing::{debug, warn};

use synthfield_config::FieldConfig;
use synthfield_core::{FieldValue, Row};

use crate::errors::GenerationError;
use crate::generators::{choice, derive, primitives};
use crate::model::{GenerateOptions, GenerationReport};
use crate::strategy::{MatchContext, Resolution, Strategy, StrategyKind, resolve};
use crate::weights::{StandardWeights, WeightSource};

/// Entry point for generating one field value from its configuration.
///
/// The generator holds no per-call state. Randomness is supplied by the
/// caller on every invocation, so a seeded RNG gives replayable output.
#[derive(Debug, Clone, Default)]
pub struct FieldGenerator<W = StandardWeights> {
    options: GenerateOptions,
    weights: W,
}

struct Outcome {
    kind: StrategyKind,
    fallthroughs: usize,
    value: FieldValue,
}

impl FieldGenerator<StandardWeights> {
    pub fn new(options: GenerateOptions) -> Self {
        Self::with_weights(options, StandardWeights)
    }
}

impl<W: WeightSource> FieldGenerator<W> {
    pub fn with_weights(options: GenerateOptions, weights: W) -> Self {
        Self { options, weights }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Resolve the strategy `config` would use for `row` without sampling.
    pub fn resolve<'a>(
        &'a self,
        field: &'a str,
        config: &'a FieldConfig,
        row: &'a Row,
    ) -> Result<Resolution<'a>, GenerationError> {
        resolve(&MatchContext {
            field,
            config,
            row,
            options: &self.options,
        })
    }

    /// Generate the value of `field` for the row built so far.
    ///
    /// Returns [`FieldValue::Absent`] when a dependency gate rejects the row
    /// (or `Int(0)` with `absent_as_zero`).
    pub fn generate(
        &self,
        field: &str,
        config: &FieldConfig,
        row: &Row,
        rng: &mut dyn RngCore,
    ) -> Result<FieldValue, GenerationError> {
        self.evaluate(field, config, row, rng)
            .map(|outcome| outcome.value)
    }

    /// Parse a JSON config and row, then generate.
    pub fn generate_json(
        &self,
        field: &str,
        config: &Value,
        row: &Value,
        rng: &mut dyn RngCore,
    ) -> Result<FieldValue, GenerationError> {
        let config = FieldConfig::from_json(field, config)?;
        let row = Row::from_json(row)?;
        self.generate(field, &config, &row, rng)
    }

    /// Generate and record the outcome in `report`.
    pub fn generate_recorded(
        &self,
        field: &str,
        config: &FieldConfig,
        row: &Row,
        rng: &mut dyn RngCore,
        report: &mut GenerationReport,
    ) -> Result<FieldValue, GenerationError> {
        match self.evaluate(field, config, row, rng) {
            Ok(outcome) => {
                report.record_strategy(outcome.kind);
                report.record_fallthroughs(outcome.fallthroughs as u64);
                if outcome.kind == StrategyKind::Dependency {
                    report.record_absent();
                } else if outcome.value.is_null() {
                    report.record_null();
                }
                Ok(outcome.value)
            }
            Err(err) => {
                warn!(field = %field, code = err.code(), error = %err, "field generation failed");
                report.record_error(err.code());
                Err(err)
            }
        }
    }

    fn evaluate(
        &self,
        field: &str,
        config: &FieldConfig,
        row: &Row,
        rng: &mut dyn RngCore,
    ) -> Result<Outcome, GenerationError> {
        let resolution = self.resolve(field, config, row)?;
        let kind = resolution.strategy.kind();
        debug!(
            field = %field,
            strategy = kind.as_str(),
            fallthroughs = resolution.fallthroughs.len(),
            "strategy resolved"
        );

        let value = match resolution.strategy {
            Strategy::Gated => {
                if self.options.absent_as_zero {
                    FieldValue::Int(0)
                } else {
                    FieldValue::Absent
                }
            }
            Strategy::Calculate { source, divisor } => derive::divide(field, &source, divisor, row)?,
            Strategy::Literal(value) => primitives::literal(value),
            Strategy::Format(spec) => FieldValue::Text(primitives::formatted_string(&spec, rng)),
            Strategy::Range { min, max } => primitives::int_range(min, max, rng),
            Strategy::Choices { choices, weight } => {
                choice::pick(field, choices, weight, &self.weights, rng)?
            }
            Strategy::Mapping(mapping) => derive::map_value(field, &mapping, row)?,
            Strategy::Default => {
                primitives::int_range(primitives::DEFAULT_INT_MIN, primitives::DEFAULT_INT_MAX, rng)
            }
        };

        Ok(Outcome {
            kind,
            fallthroughs: resolution.fallthroughs.len(),
            value,
        })
    }
}
