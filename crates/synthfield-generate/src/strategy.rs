//! Strategy resolution for a field configuration.
//!
//! A configuration is resolved by trying [`PRECEDENCE`] in order. Each
//! matcher inspects one top-level key and either skips (key absent), falls
//! through (key present but declines), or applies a [`Strategy`]. When no
//! matcher applies, [`Strategy::Default`] is used.

use serde_json::Value;
use tracing::debug;

use synthfield_config::{Case, FieldConfig, FormatRule, Mapping, Operation, ShapeError, Weight};
use synthfield_core::{FieldValue, Row};

use crate::errors::GenerationError;
use crate::model::GenerateOptions;

/// Strategy families in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StrategyKind {
    Dependency,
    Calculation,
    Literal,
    Format,
    Range,
    Choices,
    Mapping,
    Default,
}

impl StrategyKind {
    pub const ORDER: [StrategyKind; 8] = [
        StrategyKind::Dependency,
        StrategyKind::Calculation,
        StrategyKind::Literal,
        StrategyKind::Format,
        StrategyKind::Range,
        StrategyKind::Choices,
        StrategyKind::Mapping,
        StrategyKind::Default,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Dependency => "dependency",
            StrategyKind::Calculation => "calculation",
            StrategyKind::Literal => "literal",
            StrategyKind::Format => "format",
            StrategyKind::Range => "range",
            StrategyKind::Choices => "choices",
            StrategyKind::Mapping => "mapping",
            StrategyKind::Default => "default",
        }
    }
}

/// Resolved generation rule for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy<'a> {
    /// A dependency did not hold; no value is produced.
    Gated,
    Calculate { source: String, divisor: f64 },
    Literal(&'a Value),
    Format(FormatSpec),
    Range { min: i64, max: i64 },
    Choices {
        choices: &'a [Value],
        weight: Option<Weight>,
    },
    Mapping(Mapping),
    Default,
}

impl Strategy<'_> {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Gated => StrategyKind::Dependency,
            Strategy::Calculate { .. } => StrategyKind::Calculation,
            Strategy::Literal(_) => StrategyKind::Literal,
            Strategy::Format(_) => StrategyKind::Format,
            Strategy::Range { .. } => StrategyKind::Range,
            Strategy::Choices { .. } => StrategyKind::Choices,
            Strategy::Mapping(_) => StrategyKind::Mapping,
            Strategy::Default => StrategyKind::Default,
        }
    }
}

/// Settings for a formatted random string.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatSpec {
    pub rules: Vec<FormatRule>,
    pub length: usize,
    pub alphanumeric: bool,
    pub case: Case,
}

/// Why a configured matcher declined to apply.
#[derive(Debug, Clone, PartialEq)]
pub enum Fallthrough {
    DependenciesSatisfied,
    /// Calculation with an operation other than `divide`.
    UnsupportedOperation(String),
}

/// Outcome of a single matcher.
#[derive(Debug, Clone, PartialEq)]
pub enum Matched<'a> {
    Skip,
    Fallthrough(Fallthrough),
    Apply(Strategy<'a>),
}

/// Inputs visible to matchers.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    pub field: &'a str,
    pub config: &'a FieldConfig,
    pub row: &'a Row,
    pub options: &'a GenerateOptions,
}

/// Strategy chosen for a configuration plus the matchers that declined.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<'a> {
    pub strategy: Strategy<'a>,
    pub fallthroughs: Vec<Fallthrough>,
}

pub type Matcher = for<'a, 'b> fn(&'b MatchContext<'a>) -> Result<Matched<'a>, GenerationError>;

/// Matchers in evaluation order. `Default` has no matcher.
pub const PRECEDENCE: [(StrategyKind, Matcher); 7] = [
    (StrategyKind::Dependency, match_dependency),
    (StrategyKind::Calculation, match_calculation),
    (StrategyKind::Literal, match_literal),
    (StrategyKind::Format, match_format),
    (StrategyKind::Range, match_range),
    (StrategyKind::Choices, match_choices),
    (StrategyKind::Mapping, match_mapping),
];

pub fn resolve<'a>(ctx: &MatchContext<'a>) -> Result<Resolution<'a>, GenerationError> {
    let mut fallthroughs = Vec::new();
    for (kind, matcher) in PRECEDENCE {
        match matcher(ctx)? {
            Matched::Skip => {}
            Matched::Fallthrough(reason) => {
                debug!(
                    field = %ctx.field,
                    matcher = kind.as_str(),
                    reason = ?reason,
                    "matcher fell through"
                );
                fallthroughs.push(reason);
            }
            Matched::Apply(strategy) => {
                return Ok(Resolution {
                    strategy,
                    fallthroughs,
                });
            }
        }
    }
    Ok(Resolution {
        strategy: Strategy::Default,
        fallthroughs,
    })
}

fn match_dependency<'a>(ctx: &MatchContext<'a>) -> Result<Matched<'a>, GenerationError> {
    let Some(dependencies) = ctx.config.dependencies().map_err(|err| shape(ctx, err))? else {
        return Ok(Matched::Skip);
    };

    for dependency in &dependencies {
        let current = ctx.row.get(&dependency.field);
        let satisfied = match &dependency.value {
            // A missing field reads as null, so it only satisfies an
            // explicit `null` expectation.
            Some(expected) => current.unwrap_or(&FieldValue::Null).matches_json(expected),
            None if ctx.options.dependency_requires_presence => {
                current.is_some_and(|value| !value.is_missing())
            }
            None => true,
        };
        if !satisfied {
            debug!(
                field = %ctx.field,
                dependency = %dependency.field,
                "dependency not satisfied"
            );
            return Ok(Matched::Apply(Strategy::Gated));
        }
    }

    Ok(Matched::Fallthrough(Fallthrough::DependenciesSatisfied))
}

fn match_calculation<'a>(ctx: &MatchContext<'a>) -> Result<Matched<'a>, GenerationError> {
    let Some(calculation) = ctx.config.calculation().map_err(|err| shape(ctx, err))? else {
        return Ok(Matched::Skip);
    };

    match calculation.operation() {
        Some(Operation::Divide) => {
            let divisor = calculation.divisor().map_err(|err| shape(ctx, err))?;
            if divisor == 0.0 {
                return Err(GenerationError::DivisionByZero {
                    field: ctx.field.to_string(),
                    key: "calculation.value",
                    value: divisor,
                });
            }
            Ok(Matched::Apply(Strategy::Calculate {
                source: calculation.field,
                divisor,
            }))
        }
        None if ctx.options.strict_operations => Err(GenerationError::UnsupportedOperation {
            field: ctx.field.to_string(),
            operation: calculation.operation,
        }),
        None => Ok(Matched::Fallthrough(Fallthrough::UnsupportedOperation(
            calculation.operation,
        ))),
    }
}

fn match_literal<'a>(ctx: &MatchContext<'a>) -> Result<Matched<'a>, GenerationError> {
    Ok(match ctx.config.value.as_ref() {
        Some(value) => Matched::Apply(Strategy::Literal(value)),
        None => Matched::Skip,
    })
}

fn match_format<'a>(ctx: &MatchContext<'a>) -> Result<Matched<'a>, GenerationError> {
    let config = ctx.config;
    let Some(rules) = config.format_rules().map_err(|err| shape(ctx, err))? else {
        return Ok(Matched::Skip);
    };
    Ok(Matched::Apply(Strategy::Format(FormatSpec {
        rules,
        length: config.length().map_err(|err| shape(ctx, err))?,
        alphanumeric: config.alphanumeric().map_err(|err| shape(ctx, err))?,
        case: config.case(),
    })))
}

fn match_range<'a>(ctx: &MatchContext<'a>) -> Result<Matched<'a>, GenerationError> {
    let Some(range) = ctx.config.range().map_err(|err| shape(ctx, err))? else {
        return Ok(Matched::Skip);
    };
    Ok(Matched::Apply(Strategy::Range {
        min: range.min,
        max: range.max,
    }))
}

fn match_choices<'a>(ctx: &MatchContext<'a>) -> Result<Matched<'a>, GenerationError> {
    let Some(choices) = ctx.config.choices().map_err(|err| shape(ctx, err))? else {
        return Ok(Matched::Skip);
    };
    Ok(Matched::Apply(Strategy::Choices {
        choices,
        weight: ctx.config.weight().map_err(|err| shape(ctx, err))?,
    }))
}

fn match_mapping<'a>(ctx: &MatchContext<'a>) -> Result<Matched<'a>, GenerationError> {
    Ok(match ctx.config.mapping().map_err(|err| shape(ctx, err))? {
        Some(mapping) => Matched::Apply(Strategy::Mapping(mapping)),
        None => Matched::Skip,
    })
}

fn shape(ctx: &MatchContext<'_>, err: ShapeError) -> GenerationError {
    GenerationError::shape(ctx.field, err)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn config(value: Value) -> FieldConfig {
        FieldConfig::from_json("field", &value).expect("config")
    }

    fn row(value: Value) -> Row {
        Row::from_json(&value).expect("row")
    }

    fn resolve_with<'a>(
        config: &'a FieldConfig,
        row: &'a Row,
        options: &'a GenerateOptions,
    ) -> Resolution<'a> {
        let ctx = MatchContext {
            field: "field",
            config,
            row,
            options,
        };
        resolve(&ctx).expect("resolve")
    }

    #[test]
    fn precedence_matches_declared_order() {
        let kinds: Vec<StrategyKind> = PRECEDENCE.iter().map(|(kind, _)| *kind).collect();
        assert_eq!(kinds, StrategyKind::ORDER[..7].to_vec());
        assert_eq!(StrategyKind::ORDER[7], StrategyKind::Default);
    }

    #[test]
    fn every_key_present_resolves_to_literal_after_gate_passes() {
        let config = config(json!({
            "dependency": [{"field": "status", "value": "active"}],
            "value": 7,
            "format": [{"position": "prefix"}],
            "range": {"min": 1, "max": 2},
            "choices": ["a"],
            "mapping": {"field": "tier", "values": {}}
        }));
        let row = row(json!({"status": "active"}));
        let options = GenerateOptions::default();

        let resolution = resolve_with(&config, &row, &options);
        let expected = json!(7);
        assert_eq!(resolution.strategy, Strategy::Literal(&expected));
        assert_eq!(
            resolution.fallthroughs,
            vec![Fallthrough::DependenciesSatisfied]
        );
    }

    #[test]
    fn later_keys_resolve_in_order() {
        let options = GenerateOptions::default();
        let empty = row(json!({}));
        let cases = [
            (json!({"format": [], "range": {"min": 1, "max": 2}}), StrategyKind::Format),
            (json!({"range": {"min": 1, "max": 2}, "choices": [1]}), StrategyKind::Range),
            (
                json!({"choices": [1], "mapping": {"field": "x", "values": {}}}),
                StrategyKind::Choices,
            ),
            (json!({"mapping": {"field": "x", "values": {}}}), StrategyKind::Mapping),
            (json!({"length": 4}), StrategyKind::Default),
        ];
        for (value, expected) in cases {
            let config = config(value);
            let resolution = resolve_with(&config, &empty, &options);
            assert_eq!(resolution.strategy.kind(), expected);
        }
    }

    #[test]
    fn unsupported_operation_falls_through_to_literal() {
        let config = config(json!({
            "calculation": {"field": "score", "operation": "multiply", "value": 2},
            "value": 3
        }));
        let row = row(json!({"score": 10}));
        let options = GenerateOptions::default();

        let resolution = resolve_with(&config, &row, &options);
        assert_eq!(resolution.strategy.kind(), StrategyKind::Literal);
        assert_eq!(
            resolution.fallthroughs,
            vec![Fallthrough::UnsupportedOperation("multiply".to_string())]
        );
    }

    #[test]
    fn missing_dependency_field_only_matches_null() {
        let options = GenerateOptions::default();
        let empty = row(json!({}));

        let expects_active = config(json!({
            "dependency": [{"field": "status", "value": "active"}],
            "value": 1
        }));
        let resolution = resolve_with(&expects_active, &empty, &options);
        assert_eq!(resolution.strategy, Strategy::Gated);

        let expects_null = config(json!({
            "dependency": [{"field": "status", "value": null}],
            "value": 1
        }));
        let resolution = resolve_with(&expects_null, &empty, &options);
        assert_eq!(resolution.strategy.kind(), StrategyKind::Literal);
    }

    #[test]
    fn valueless_dependency_is_inert_unless_presence_required() {
        let config = config(json!({"dependency": [{"field": "status"}], "value": 1}));
        let empty = row(json!({}));
        let populated = row(json!({"status": "x"}));

        let inert = GenerateOptions::default();
        let resolution = resolve_with(&config, &empty, &inert);
        assert_eq!(resolution.strategy.kind(), StrategyKind::Literal);

        let presence = GenerateOptions {
            dependency_requires_presence: true,
            ..GenerateOptions::default()
        };
        let resolution = resolve_with(&config, &empty, &presence);
        assert_eq!(resolution.strategy, Strategy::Gated);

        let resolution = resolve_with(&config, &populated, &presence);
        assert_eq!(resolution.strategy.kind(), StrategyKind::Literal);
    }

    #[test]
    fn eager_shape_errors() {
        let options = GenerateOptions::default();
        let empty = row(json!({}));
        let cases = [
            (json!({"range": {"min": 5, "max": 1}}), "config_shape", "range"),
            (json!({"choices": []}), "config_shape", "choices"),
            (
                json!({"calculation": {"field": "score", "operation": "divide", "value": 0}}),
                "division_by_zero",
                "calculation.value",
            ),
            (
                json!({"calculation": {"field": "score", "operation": "divide"}}),
                "config_shape",
                "calculation.value",
            ),
            (json!({"format": [{"count": "two"}]}), "config_shape", "format[0].count"),
        ];
        for (value, code, key) in cases {
            let config = config(value);
            let ctx = MatchContext {
                field: "field",
                config: &config,
                row: &empty,
                options: &options,
            };
            let err = resolve(&ctx).expect_err("shape error");
            assert_eq!(err.code(), code);
            assert_eq!(err.field(), Some("field"));
            match err {
                GenerationError::ConfigShape { key: found, .. } => assert_eq!(found, key),
                GenerationError::DivisionByZero { key: found, .. } => assert_eq!(found, key),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn unreached_payloads_are_never_read() {
        let options = GenerateOptions::default();
        let literal = config(json!({
            "value": 5,
            "range": {"min": 1},
            "choices": "abc",
            "mapping": {"field": "tier"}
        }));
        let empty = row(json!({}));
        let resolution = resolve_with(&literal, &empty, &options);
        let expected = json!(5);
        assert_eq!(resolution.strategy, Strategy::Literal(&expected));

        let gated = config(json!({
            "dependency": [{"field": "s", "value": "a"}],
            "mapping": {"field": "t"}
        }));
        let other = row(json!({"s": "b"}));
        let resolution = resolve_with(&gated, &other, &options);
        assert_eq!(resolution.strategy, Strategy::Gated);
    }
}
