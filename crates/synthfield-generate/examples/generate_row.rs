use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::json;

use synthfield_config::FieldConfig;
use synthfield_core::Row;
use synthfield_generate::{
    FieldGenerator, GenerateOptions, GenerationReport, LogFormat, init_logging,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LogFormat::Plain, "synthfield_generate=debug")?;

    let fields = json!([
        ["account_id", {"length": 8, "alphanumeric": true, "case": "uppercase",
                        "format": [{"position": "prefix", "contains": "AC-"}]}],
        ["status", {"choices": ["active", "suspended", "closed"],
                    "weight": {"algorithm": "zipf"}}],
        ["score", {"range": {"min": 0, "max": 999}}],
        ["tier", {"calculation": {"field": "score", "operation": "divide", "value": 250}}],
        ["tier_name", {"mapping": {"field": "tier",
                                   "values": {"0": "bronze", "1": "silver", "2": "gold", "3": "platinum"}}}],
        ["closed_reason", {"dependency": [{"field": "status", "value": "closed"}],
                           "choices": ["fraud", "request", "inactivity"]}],
        ["percentile", {}]
    ]);

    let generator = FieldGenerator::new(GenerateOptions::default());
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let mut report = GenerationReport::new();

    for _ in 0..3 {
        let mut row = Row::new();
        for entry in fields.as_array().into_iter().flatten() {
            let name = entry[0].as_str().unwrap_or_default();
            let config = FieldConfig::from_json(name, &entry[1])?;
            let value = generator.generate_recorded(name, &config, &row, &mut rng, &mut report)?;
            row.insert(name, value);
        }
        println!("{}", serde_json::to_string(&row)?);
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
