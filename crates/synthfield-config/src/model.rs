use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::{ConfigError, ShapeError};
use crate::params::{ParamMap, repeat_count};

pub const DEFAULT_FORMAT_LENGTH: usize = 6;
pub const DEFAULT_FORMAT_CONTAINS: &str = "*";
pub const DEFAULT_FORMAT_COUNT: usize = 1;

/// Declarative configuration for a single field.
///
/// Every key is optional. Which keys are present decides the generation
/// strategy; unknown keys are ignored so configs can carry settings meant
/// for other stages of the pipeline.
///
/// Payloads are kept as raw JSON and only read by the accessor of the
/// strategy that uses them, so a malformed payload under a key that is
/// never reached does not reject the field. An explicit `null` counts as
/// present for every key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldConfig {
    /// Row conditions that must all hold for a value to be produced.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<Vec<Dependency>>")]
    pub dependency: Option<Value>,
    /// Derive the value from another field of the row.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<Calculation>")]
    pub calculation: Option<Value>,
    /// Literal value returned verbatim.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Ordered decoration rules for a random string.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<Vec<FormatRule>>")]
    pub format: Option<Value>,
    /// Length of the random core of a formatted string.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<i64>")]
    pub length: Option<Value>,
    /// Draw the random core from letters and digits instead of digits only.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<bool>")]
    pub alphanumeric: Option<Value>,
    /// Case applied to an alphanumeric core.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<Case>")]
    pub case: Option<Value>,
    /// Inclusive integer bounds.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<Range>")]
    pub range: Option<Value>,
    /// Candidate values for a categorical field.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<Vec<Value>>")]
    pub choices: Option<Value>,
    /// Weighting applied to `choices`.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<Weight>")]
    pub weight: Option<Value>,
    /// Lookup table keyed by another field's integer value.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<Mapping>")]
    pub mapping: Option<Value>,
}

impl FieldConfig {
    /// Parse the configuration of `field` from a JSON value.
    ///
    /// Only the top-level shape is checked here; payloads are read lazily.
    pub fn from_json(field: &str, value: &Value) -> Result<Self, ConfigError> {
        serde_json::from_value(value.clone()).map_err(|source| ConfigError::Parse {
            field: field.to_string(),
            raw: value.to_string(),
            source,
        })
    }

    pub fn from_json_str(field: &str, raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
            field: field.to_string(),
            raw: raw.to_string(),
            source,
        })
    }

    pub fn dependencies(&self) -> Result<Option<Vec<Dependency>>, ShapeError> {
        let Some(raw) = self.dependency.as_ref() else {
            return Ok(None);
        };
        let entries = raw
            .as_array()
            .ok_or_else(|| ShapeError::invalid("dependency", raw, "a list of conditions"))?;
        entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                let params = ParamMap::object(format!("dependency[{idx}]"), entry)?;
                Ok(Dependency {
                    field: params.required_str("field")?.to_string(),
                    value: params.get("value").cloned(),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    pub fn calculation(&self) -> Result<Option<Calculation>, ShapeError> {
        let Some(raw) = self.calculation.as_ref() else {
            return Ok(None);
        };
        let params = ParamMap::object("calculation", raw)?;
        Ok(Some(Calculation {
            field: params.required_str("field")?.to_string(),
            operation: params.required_str("operation")?.to_string(),
            value: params.get("value").cloned(),
        }))
    }

    pub fn format_rules(&self) -> Result<Option<Vec<FormatRule>>, ShapeError> {
        let Some(raw) = self.format.as_ref() else {
            return Ok(None);
        };
        let rules = raw
            .as_array()
            .ok_or_else(|| ShapeError::invalid("format", raw, "a list of rules"))?;
        rules
            .iter()
            .enumerate()
            .map(|(idx, rule)| {
                let params = ParamMap::object(format!("format[{idx}]"), rule)?;
                Ok(FormatRule {
                    position: params
                        .get("position")
                        .and_then(Value::as_str)
                        .map_or(Position::Prefix, Position::from_name),
                    contains: params
                        .optional_str("contains")?
                        .unwrap_or(DEFAULT_FORMAT_CONTAINS)
                        .to_string(),
                    count: params.count("count")?.unwrap_or(DEFAULT_FORMAT_COUNT),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// Core length of a formatted string; negative lengths give an empty core.
    pub fn length(&self) -> Result<usize, ShapeError> {
        self.length
            .as_ref()
            .map_or(Ok(DEFAULT_FORMAT_LENGTH), |value| {
                repeat_count("length".to_string(), value)
            })
    }

    pub fn alphanumeric(&self) -> Result<bool, ShapeError> {
        match self.alphanumeric.as_ref() {
            None | Some(Value::Null) => Ok(false),
            Some(value) => value
                .as_bool()
                .ok_or_else(|| ShapeError::invalid("alphanumeric", value, "a boolean")),
        }
    }

    /// Non-string and unknown names read as [`Case::Mixed`].
    pub fn case(&self) -> Case {
        self.case
            .as_ref()
            .and_then(Value::as_str)
            .map_or(Case::Mixed, Case::from_name)
    }

    pub fn range(&self) -> Result<Option<Range>, ShapeError> {
        let Some(raw) = self.range.as_ref() else {
            return Ok(None);
        };
        let params = ParamMap::object("range", raw)?;
        let range = Range {
            min: params.required_i64("min")?,
            max: params.required_i64("max")?,
        };
        if range.min > range.max {
            return Err(ShapeError {
                key: "range".to_string(),
                value: raw.clone(),
                message: format!("min {} must be <= max {}", range.min, range.max),
            });
        }
        Ok(Some(range))
    }

    pub fn choices(&self) -> Result<Option<&[Value]>, ShapeError> {
        let Some(raw) = self.choices.as_ref() else {
            return Ok(None);
        };
        let choices = raw
            .as_array()
            .ok_or_else(|| ShapeError::invalid("choices", raw, "a list"))?;
        if choices.is_empty() {
            return Err(ShapeError::invalid("choices", raw, "a non-empty list"));
        }
        Ok(Some(choices))
    }

    pub fn weight(&self) -> Result<Option<Weight>, ShapeError> {
        let Some(raw) = self.weight.as_ref() else {
            return Ok(None);
        };
        let params = ParamMap::object("weight", raw)?;
        Ok(Some(Weight {
            balanced: params.flag("balanced")?,
            algorithm: params
                .get("algorithm")
                .and_then(Value::as_str)
                .map_or(WeightAlgorithm::Dirichlet, WeightAlgorithm::from_name),
        }))
    }

    pub fn mapping(&self) -> Result<Option<Mapping>, ShapeError> {
        let Some(raw) = self.mapping.as_ref() else {
            return Ok(None);
        };
        let params = ParamMap::object("mapping", raw)?;
        let field = params.required_str("field")?.to_string();
        let values = params
            .required_object("values")?
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Ok(Some(Mapping { field, values }))
    }
}

/// Condition on a previously generated field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Dependency {
    pub field: String,
    /// Expected value. Entries without one do not constrain the row unless
    /// presence checks are enabled in the generation options.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,
}

/// Arithmetic derivation from another row field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Calculation {
    pub field: String,
    /// Operation name. Only `divide` is evaluated.
    pub operation: String,
    /// Operand; required by `divide`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<f64>")]
    pub value: Option<Value>,
}

impl Calculation {
    pub fn operation(&self) -> Option<Operation> {
        Operation::from_name(&self.operation)
    }

    /// Numeric operand. Booleans count as `0` and `1`.
    pub fn divisor(&self) -> Result<f64, ShapeError> {
        let value = self
            .value
            .as_ref()
            .ok_or_else(|| ShapeError::missing("calculation.value"))?;
        match value {
            Value::Bool(flag) => Ok(f64::from(u8::from(*flag))),
            other => other
                .as_f64()
                .ok_or_else(|| ShapeError::invalid("calculation.value", other, "a number")),
        }
    }
}

/// Calculation operations understood by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Divide,
}

impl Operation {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "divide" => Some(Operation::Divide),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Divide => "divide",
        }
    }
}

/// A single decoration step of a formatted string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormatRule {
    #[serde(default)]
    pub position: Position,
    #[serde(default = "default_contains")]
    pub contains: String,
    #[serde(default = "default_count")]
    pub count: usize,
}

/// Where a format rule places its text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    #[default]
    Prefix,
    Suffix,
    Random,
    /// Unrecognized positions leave the string untouched.
    #[serde(other)]
    Unknown,
}

impl Position {
    pub fn from_name(name: &str) -> Self {
        match name {
            "prefix" => Position::Prefix,
            "suffix" => Position::Suffix,
            "random" => Position::Random,
            _ => Position::Unknown,
        }
    }
}

/// Case transform for alphanumeric cores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Case {
    Uppercase,
    Lowercase,
    #[default]
    #[serde(other)]
    Mixed,
}

impl Case {
    pub fn from_name(name: &str) -> Self {
        match name {
            "uppercase" => Case::Uppercase,
            "lowercase" => Case::Lowercase,
            _ => Case::Mixed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Range {
    pub min: i64,
    pub max: i64,
}

/// Weighting for `choices`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Weight {
    /// Use a uniform vector and ignore `algorithm`.
    #[serde(default)]
    pub balanced: bool,
    #[serde(default)]
    pub algorithm: WeightAlgorithm,
}

/// Named weighting algorithm; unknown names fall back to `dirichlet`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WeightAlgorithm {
    Exponential,
    PowerLaw,
    Beta,
    Lognormal,
    Zipf,
    #[default]
    #[serde(other)]
    Dirichlet,
}

impl WeightAlgorithm {
    pub const ALL: [WeightAlgorithm; 6] = [
        WeightAlgorithm::Exponential,
        WeightAlgorithm::PowerLaw,
        WeightAlgorithm::Beta,
        WeightAlgorithm::Lognormal,
        WeightAlgorithm::Zipf,
        WeightAlgorithm::Dirichlet,
    ];

    pub fn from_name(name: &str) -> Self {
        WeightAlgorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.as_str() == name)
            .unwrap_or(WeightAlgorithm::Dirichlet)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeightAlgorithm::Exponential => "exponential",
            WeightAlgorithm::PowerLaw => "power_law",
            WeightAlgorithm::Beta => "beta",
            WeightAlgorithm::Lognormal => "lognormal",
            WeightAlgorithm::Zipf => "zipf",
            WeightAlgorithm::Dirichlet => "dirichlet",
        }
    }
}

/// Lookup of another field's value in a string-keyed table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Mapping {
    pub field: String,
    /// Keys are decimal integers, e.g. `"1"`.
    pub values: BTreeMap<String, Value>,
}

fn default_contains() -> String {
    DEFAULT_FORMAT_CONTAINS.to_string()
}

fn default_count() -> usize {
    DEFAULT_FORMAT_COUNT
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn config(value: Value) -> FieldConfig {
        FieldConfig::from_json("field", &value).expect("parse")
    }

    #[test]
    fn explicit_null_counts_as_present() {
        let parsed = config(json!({"value": null, "range": null}));
        assert_eq!(parsed.value, Some(Value::Null));
        assert_eq!(parsed.range, Some(Value::Null));

        let err = parsed.range().expect_err("null range");
        assert_eq!(err.key, "range");

        let parsed = config(json!({}));
        assert_eq!(parsed.value, None);
        assert_eq!(parsed.range(), Ok(None));
    }

    #[test]
    fn malformed_payloads_do_not_fail_parsing() {
        let parsed = config(json!({
            "value": 5,
            "range": {"min": 1},
            "mapping": {"field": "tier"},
            "format": "not a list"
        }));
        assert_eq!(parsed.value, Some(json!(5)));
        assert_eq!(parsed.range().expect_err("range").key, "range.max");
        assert_eq!(parsed.mapping().expect_err("mapping").key, "mapping.values");
        assert_eq!(parsed.format_rules().expect_err("format").key, "format");
    }

    #[test]
    fn format_rules_fill_defaults() {
        let parsed = config(json!({"format": [{}]}));
        let rules = parsed.format_rules().expect("rules").expect("format present");
        assert_eq!(rules[0].position, Position::Prefix);
        assert_eq!(rules[0].contains, "*");
        assert_eq!(rules[0].count, 1);
        assert_eq!(parsed.length(), Ok(DEFAULT_FORMAT_LENGTH));
        assert_eq!(parsed.case(), Case::Mixed);
    }

    #[test]
    fn negative_lengths_and_counts_are_empty() {
        let parsed = config(json!({
            "length": -2,
            "format": [{"position": "suffix", "count": -1}]
        }));
        assert_eq!(parsed.length(), Ok(0));
        let rules = parsed.format_rules().expect("rules").expect("format present");
        assert_eq!(rules[0].count, 0);
    }

    #[test]
    fn ill_typed_format_entries_name_their_index() {
        let parsed = config(json!({
            "length": "six",
            "format": [{"contains": "-"}, {"count": 1.5}]
        }));
        let err = parsed.length().expect_err("length");
        assert_eq!(err.key, "length");
        assert_eq!(err.value, json!("six"));

        let err = parsed.format_rules().expect_err("count");
        assert_eq!(err.key, "format[1].count");
        assert_eq!(err.value, json!(1.5));
    }

    #[test]
    fn unknown_names_fall_back() {
        let parsed = config(json!({
            "case": "title",
            "format": [{"position": "middle"}, {"position": 3}],
            "weight": {"algorithm": "pareto"}
        }));
        assert_eq!(parsed.case(), Case::Mixed);
        let rules = parsed.format_rules().expect("rules").expect("format");
        assert_eq!(rules[0].position, Position::Unknown);
        assert_eq!(rules[1].position, Position::Unknown);
        let weight = parsed.weight().expect("weight").expect("weight present");
        assert_eq!(weight.algorithm, WeightAlgorithm::Dirichlet);
        assert!(!weight.balanced);
    }

    #[test]
    fn dependency_value_is_optional() {
        let parsed = config(json!({
            "dependency": [{"field": "status"}, {"field": "tier", "value": 2}]
        }));
        let deps = parsed.dependencies().expect("dependencies").expect("present");
        assert_eq!(deps[0].value, None);
        assert_eq!(deps[1].value, Some(json!(2)));

        let parsed = config(json!({"dependency": [{"value": 2}]}));
        assert_eq!(
            parsed.dependencies().expect_err("field").key,
            "dependency[0].field"
        );
    }

    #[test]
    fn divisor_accepts_numbers_and_booleans() {
        let calculation = |value: Value| Calculation {
            field: "score".to_string(),
            operation: "divide".to_string(),
            value: Some(value),
        };
        assert_eq!(calculation(json!(10)).divisor(), Ok(10.0));
        assert_eq!(calculation(json!(true)).divisor(), Ok(1.0));
        let err = calculation(json!("ten")).divisor().expect_err("string");
        assert_eq!(err.key, "calculation.value");
        assert_eq!(err.value, json!("ten"));

        let missing = Calculation {
            value: None,
            ..calculation(json!(0))
        };
        assert_eq!(missing.divisor().expect_err("missing").key, "calculation.value");
    }

    #[test]
    fn operation_names_resolve() {
        assert_eq!(Operation::from_name("divide"), Some(Operation::Divide));
        assert_eq!(Operation::from_name("multiply"), None);
    }
}
