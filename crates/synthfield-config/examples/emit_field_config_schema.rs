use synthfield_config::field_config_json_schema;

fn main() {
    let schema = field_config_json_schema();
    let json = serde_json::to_string_pretty(&schema).expect("serialize field config json schema");
    println!("{json}");
}
