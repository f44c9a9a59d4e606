//! Conversion between plain JSON and the store's typed value encoding.

use crate::store::{Fields, StoreError, StoreResult};
use serde_json::{json, Map, Value};

/// Encode a JSON value as a typed value.
///
pub fn encode(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64().unwrap_or_default() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            json!({ "arrayValue": { "values": items.iter().map(encode).collect::<Vec<_>>() } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// Encode top-level document fields.
///
pub fn encode_fields(fields: &Fields) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(key, value)| (key.clone(), encode(value)))
            .collect(),
    )
}

/// Decode a typed value. Timestamps become RFC 3339 strings and references
/// become their path.
///
pub fn decode(value: &Value) -> StoreResult<Value> {
    let typed = value
        .as_object()
        .and_then(|map| map.iter().next())
        .ok_or_else(|| StoreError::InvalidDocument(format!("untyped value {}", value)))?;
    match (typed.0.as_str(), typed.1) {
        ("nullValue", _) => Ok(Value::Null),
        ("booleanValue", b) => Ok(b.clone()),
        ("integerValue", i) => {
            let parsed = match i {
                Value::String(s) => s.parse::<i64>().ok(),
                other => other.as_i64(),
            };
            parsed
                .map(Value::from)
                .ok_or_else(|| StoreError::InvalidDocument(format!("bad integer {}", i)))
        }
        ("doubleValue", d) => Ok(d.clone()),
        ("stringValue", s) | ("timestampValue", s) | ("referenceValue", s) => Ok(s.clone()),
        ("arrayValue", array) => {
            let values = match array.get("values").and_then(Value::as_array) {
                Some(values) => values.iter().map(decode).collect::<StoreResult<Vec<_>>>()?,
                None => vec![],
            };
            Ok(Value::Array(values))
        }
        ("mapValue", map) => {
            let fields = match map.get("fields") {
                Some(fields) => decode_fields(fields)?,
                None => Map::new(),
            };
            Ok(Value::Object(fields))
        }
        (kind, _) => Err(StoreError::InvalidDocument(format!(
            "unsupported value type '{}'",
            kind
        ))),
    }
}

/// Decode a `fields` object into plain top-level fields.
///
pub fn decode_fields(fields: &Value) -> StoreResult<Fields> {
    let map = fields
        .as_object()
        .ok_or_else(|| StoreError::InvalidDocument("fields is not an object".to_string()))?;
    map.iter()
        .map(|(key, value)| Ok((key.clone(), decode(value)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_nested_board_fields() {
        let fields = json!({
            "columnOrder": ["a", "b"],
            "columns": { "a": { "id": "a", "taskIds": [] } },
            "count": 3,
            "ratio": 0.5,
            "deadline": null,
        });
        let encoded = encode_fields(fields.as_object().unwrap());
        assert_eq!(
            encoded["columnOrder"],
            json!({ "arrayValue": { "values": [{ "stringValue": "a" }, { "stringValue": "b" }] } })
        );
        assert_eq!(encoded["count"], json!({ "integerValue": "3" }));
        assert_eq!(encoded["ratio"], json!({ "doubleValue": 0.5 }));
        assert_eq!(encoded["deadline"], json!({ "nullValue": null }));
        assert_eq!(
            encoded["columns"]["mapValue"]["fields"]["a"]["mapValue"]["fields"]["taskIds"],
            json!({ "arrayValue": { "values": [] } })
        );
    }

    #[test]
    fn decodes_server_values() {
        let fields = json!({
            "title": { "stringValue": "Sprint" },
            "isLocked": { "booleanValue": true },
            "createdAt": { "timestampValue": "2024-05-01T10:00:00.123456Z" },
            "tags": { "arrayValue": {} },
            "boardData": { "mapValue": {} },
            "n": { "integerValue": "42" },
        });
        let decoded = decode_fields(&fields).unwrap();
        assert_eq!(
            Value::Object(decoded),
            json!({
                "title": "Sprint",
                "isLocked": true,
                "createdAt": "2024-05-01T10:00:00.123456Z",
                "tags": [],
                "boardData": {},
                "n": 42,
            })
        );
    }

    #[test]
    fn rejects_unknown_value_types() {
        let result = decode(&json!({ "geoPointValue": { "latitude": 1.0 } }));
        assert!(matches!(result, Err(StoreError::InvalidDocument(_))));
        assert!(decode(&json!("bare")).is_err());
    }
}
