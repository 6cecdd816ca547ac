use rand::distr::{Alphanumeric, Distribution};
use rand::{Rng, RngCore};
use serde_json::Value;

use synthfield_config::{Case, Position};
use synthfield_core::FieldValue;

use crate::strategy::FormatSpec;

pub const DEFAULT_INT_MIN: i64 = 0;
pub const DEFAULT_INT_MAX: i64 = 100;

pub fn literal(value: &Value) -> FieldValue {
    FieldValue::from(value)
}

/// Uniform integer in `[min, max]`. Callers guarantee `min <= max`.
pub fn int_range(min: i64, max: i64, rng: &mut dyn RngCore) -> FieldValue {
    FieldValue::Int(rng.random_range(min..=max))
}

/// Random core decorated by the format rules, applied in order.
pub fn formatted_string(spec: &FormatSpec, rng: &mut dyn RngCore) -> String {
    let mut value = random_core(spec, rng);

    for rule in &spec.rules {
        match rule.position {
            Position::Prefix => {
                value = format!("{}{value}", rule.contains.repeat(rule.count));
            }
            Position::Suffix => {
                value.push_str(&rule.contains.repeat(rule.count));
            }
            Position::Random => {
                // Tokens inserted by this rule stay whole; later insertions
                // of the same rule land between tokens, never inside one.
                let mut tokens: Vec<String> = value.chars().map(String::from).collect();
                for _ in 0..rule.count {
                    let idx = rng.random_range(0..=tokens.len());
                    tokens.insert(idx, rule.contains.clone());
                }
                value = tokens.concat();
            }
            Position::Unknown => {}
        }
    }

    value
}

fn random_core(spec: &FormatSpec, rng: &mut dyn RngCore) -> String {
    if spec.alphanumeric {
        let core: String = (0..spec.length)
            .map(|_| {
                let byte: u8 = Alphanumeric.sample(&mut *rng);
                char::from(byte)
            })
            .collect();
        match spec.case {
            Case::Uppercase => core.to_ascii_uppercase(),
            Case::Lowercase => core.to_ascii_lowercase(),
            Case::Mixed => core,
        }
    } else {
        (0..spec.length)
            .map(|_| char::from(b'0' + rng.random_range(0..=9_u8)))
            .collect()
    }
}
