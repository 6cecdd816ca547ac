use serde_json::{Map, Value};

use crate::errors::ShapeError;

/// Typed access to the keys of one strategy payload object.
///
/// Errors name the dotted path of the key they were raised for.
pub(crate) struct ParamMap<'a> {
    key: String,
    map: &'a Map<String, Value>,
}

impl<'a> ParamMap<'a> {
    pub(crate) fn object(key: impl Into<String>, value: &'a Value) -> Result<Self, ShapeError> {
        let key = key.into();
        match value {
            Value::Object(map) => Ok(Self { key, map }),
            other => Err(ShapeError::invalid(key, other, "an object")),
        }
    }

    pub(crate) fn path(&self, name: &str) -> String {
        format!("{}.{name}", self.key)
    }

    pub(crate) fn get(&self, name: &str) -> Option<&'a Value> {
        self.map.get(name)
    }

    pub(crate) fn required(&self, name: &str) -> Result<&'a Value, ShapeError> {
        self.get(name)
            .ok_or_else(|| ShapeError::missing(self.path(name)))
    }

    pub(crate) fn required_str(&self, name: &str) -> Result<&'a str, ShapeError> {
        let value = self.required(name)?;
        value
            .as_str()
            .ok_or_else(|| ShapeError::invalid(self.path(name), value, "a string"))
    }

    pub(crate) fn required_i64(&self, name: &str) -> Result<i64, ShapeError> {
        let value = self.required(name)?;
        value
            .as_i64()
            .ok_or_else(|| ShapeError::invalid(self.path(name), value, "an integer"))
    }

    pub(crate) fn required_object(&self, name: &str) -> Result<&'a Map<String, Value>, ShapeError> {
        let value = self.required(name)?;
        value
            .as_object()
            .ok_or_else(|| ShapeError::invalid(self.path(name), value, "an object"))
    }

    pub(crate) fn optional_str(&self, name: &str) -> Result<Option<&'a str>, ShapeError> {
        match self.get(name) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or_else(|| ShapeError::invalid(self.path(name), value, "a string")),
        }
    }

    /// Missing and `null` both read as `false`.
    pub(crate) fn flag(&self, name: &str) -> Result<bool, ShapeError> {
        match self.get(name) {
            None | Some(Value::Null) => Ok(false),
            Some(value) => value
                .as_bool()
                .ok_or_else(|| ShapeError::invalid(self.path(name), value, "a boolean")),
        }
    }

    pub(crate) fn count(&self, name: &str) -> Result<Option<usize>, ShapeError> {
        self.get(name)
            .map(|value| repeat_count(self.path(name), value))
            .transpose()
    }
}

/// Repetition count. Negative integers repeat nothing.
pub(crate) fn repeat_count(key: String, value: &Value) -> Result<usize, ShapeError> {
    if let Some(count) = value.as_i64() {
        return Ok(usize::try_from(count.max(0)).unwrap_or(usize::MAX));
    }
    value
        .as_u64()
        .map(|count| usize::try_from(count).unwrap_or(usize::MAX))
        .ok_or_else(|| ShapeError::invalid(key, value, "an integer"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_and_ill_typed_keys_carry_dotted_path() {
        let raw = json!({"min": "low"});
        let params = ParamMap::object("range", &raw).expect("object");

        let err = params.required_i64("max").expect_err("missing");
        assert_eq!(err.key, "range.max");
        assert_eq!(err.value, Value::Null);

        let err = params.required_i64("min").expect_err("ill-typed");
        assert_eq!(err.key, "range.min");
        assert_eq!(err.value, json!("low"));
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let raw = json!([1, 2]);
        let err = ParamMap::object("mapping", &raw).err().expect("not an object");
        assert_eq!(err.key, "mapping");
        assert_eq!(err.value, raw);
    }

    #[test]
    fn negative_counts_repeat_nothing() {
        assert_eq!(repeat_count("count".into(), &json!(-3)).expect("count"), 0);
        assert_eq!(repeat_count("count".into(), &json!(4)).expect("count"), 4);
        assert!(repeat_count("count".into(), &json!(2.5)).is_err());
        assert!(repeat_count("count".into(), &json!("2")).is_err());
    }
}
