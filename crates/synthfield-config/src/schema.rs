use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::model::FieldConfig;

/// Emit the JSON Schema for a field configuration object.
pub fn field_config_json_schema() -> RootSchema {
    schema_for!(FieldConfig)
}
