use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::strategy::StrategyKind;

/// Options for field generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    /// Emit `0` instead of an explicit absent value when a dependency gate
    /// rejects the row. Matches the legacy numeric sentinel.
    pub absent_as_zero: bool,
    /// Fail on calculation operations other than `divide` instead of
    /// falling through to the next strategy.
    pub strict_operations: bool,
    /// Treat dependency entries without a `value` as "field must be present".
    pub dependency_requires_presence: bool,
}

/// Counters accumulated across field generation calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub strategy_usage: BTreeMap<String, u64>,
    pub absent_count: u64,
    pub null_count: u64,
    pub fallthrough_count: u64,
    pub errors_by_code: BTreeMap<String, u64>,
}

impl GenerationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_strategy(&mut self, kind: StrategyKind) {
        *self
            .strategy_usage
            .entry(kind.as_str().to_string())
            .or_insert(0) += 1;
    }

    pub fn record_absent(&mut self) {
        self.absent_count += 1;
    }

    pub fn record_null(&mut self) {
        self.null_count += 1;
    }

    pub fn record_fallthroughs(&mut self, count: u64) {
        self.fallthrough_count += count;
    }

    pub fn record_error(&mut self, code: &str) {
        *self.errors_by_code.entry(code.to_string()).or_insert(0) += 1;
    }

    /// Successful generations across all strategies.
    pub fn generated_total(&self) -> u64 {
        self.strategy_usage.values().sum()
    }

    pub fn errors_total(&self) -> u64 {
        self.errors_by_code.values().sum()
    }
}
