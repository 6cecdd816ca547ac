use serde_json::json;

use synthfield_core::{Error, FieldValue, Row};

#[test]
fn builds_row_from_json_object() {
    let row = Row::from_json(&json!({"tier": 1, "status": "active", "score": 4.5}))
        .expect("parse row");

    assert_eq!(row.len(), 3);
    assert_eq!(row.get("tier"), Some(&FieldValue::Int(1)));
    assert_eq!(row.get("status"), Some(&FieldValue::Text("active".into())));
    assert_eq!(row.get("score"), Some(&FieldValue::Float(4.5)));
    assert!(row.get("missing").is_none());
}

#[test]
fn rejects_non_object_rows() {
    let result = Row::from_json(&json!([1, 2, 3]));
    assert!(matches!(result, Err(Error::InvalidRow(_))));

    let result = Row::from_json_str("{not json");
    assert!(matches!(result, Err(Error::Json(_))));
}

#[test]
fn absent_fields_serialize_as_null() {
    let mut row = Row::new();
    row.insert("bonus", FieldValue::Absent);
    row.insert("points", FieldValue::Int(4));

    let json = serde_json::to_string(&row).expect("serialize row");
    assert_eq!(json, r#"{"bonus":null,"points":4}"#);
}
