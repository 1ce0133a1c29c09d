use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// A decoded document field.
///
/// The wire format wraps every field in a single-key object naming its type
/// (`{"stringValue": "hi"}`, `{"integerValue": "42"}`, ...). Decoding happens
/// once at the subscription boundary so the rest of the crate never touches
/// raw JSON; anything that does not match a known wrapper decodes to `None`
/// and the field is skipped.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Timestamp(DateTime<Utc>),
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Decode a single wire-encoded field value.
    pub fn decode(raw: &serde_json::Value) -> Option<Value> {
        let obj = raw.as_object()?;
        // Wire values carry exactly one type wrapper.
        let (kind, inner) = obj.iter().next()?;
        match kind.as_str() {
            "nullValue" => Some(Value::Null),
            "booleanValue" => inner.as_bool().map(Value::Bool),
            // integerValue is string-encoded on the wire (64-bit safety in JS)
            "integerValue" => match inner {
                serde_json::Value::String(s) => s.parse().ok().map(Value::Integer),
                serde_json::Value::Number(n) => n.as_i64().map(Value::Integer),
                _ => None,
            },
            "doubleValue" => inner.as_f64().map(Value::Double),
            "stringValue" => inner.as_str().map(|s| Value::String(s.to_string())),
            "timestampValue" => inner
                .as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|t| Value::Timestamp(t.with_timezone(&Utc))),
            "arrayValue" => {
                let values = inner.get("values").and_then(|v| v.as_array());
                match values {
                    Some(items) => Some(Value::Array(
                        items.iter().filter_map(Value::decode).collect(),
                    )),
                    // An empty arrayValue omits "values" entirely.
                    None => Some(Value::Array(Vec::new())),
                }
            }
            "mapValue" => {
                let fields = inner.get("fields").and_then(|v| v.as_object());
                let mut map = BTreeMap::new();
                if let Some(fields) = fields {
                    for (key, value) in fields {
                        if let Some(decoded) = Value::decode(value) {
                            map.insert(key.clone(), decoded);
                        }
                    }
                }
                Some(Value::Map(map))
            }
            _ => None,
        }
    }

    /// Encode back to the wire form, for document creation and patching.
    pub fn encode(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::json!({ "nullValue": null }),
            Value::Bool(b) => serde_json::json!({ "booleanValue": b }),
            Value::Integer(i) => serde_json::json!({ "integerValue": i.to_string() }),
            Value::Double(d) => serde_json::json!({ "doubleValue": d }),
            Value::String(s) => serde_json::json!({ "stringValue": s }),
            Value::Timestamp(t) => {
                serde_json::json!({ "timestampValue": t.to_rfc3339_opts(chrono::SecondsFormat::Secs, true) })
            }
            Value::Array(items) => serde_json::json!({
                "arrayValue": { "values": items.iter().map(Value::encode).collect::<Vec<_>>() }
            }),
            Value::Map(fields) => {
                let encoded: serde_json::Map<String, serde_json::Value> = fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.encode()))
                    .collect();
                serde_json::json!({ "mapValue": { "fields": encoded } })
            }
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

/// A document from the remote store: its id (the final path segment of the
/// resource name) plus decoded fields. Fields that failed to decode are
/// simply absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: BTreeMap<String, Value>,
}

impl Document {
    /// Decode a wire document (`{"name": "projects/.../documents/<collection>/<id>",
    /// "fields": {...}}`). Documents without a resource name are invalid and
    /// skipped.
    pub fn decode(raw: &serde_json::Value) -> Option<Document> {
        let name = raw.get("name")?.as_str()?;
        let id = name.rsplit('/').next()?.to_string();
        if id.is_empty() {
            return None;
        }

        let mut fields = BTreeMap::new();
        if let Some(raw_fields) = raw.get("fields").and_then(|f| f.as_object()) {
            for (key, value) in raw_fields {
                if let Some(decoded) = Value::decode(value) {
                    fields.insert(key.clone(), decoded);
                }
            }
        }

        Some(Document { id, fields })
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    pub fn int_field(&self, name: &str) -> Option<i64> {
        self.field(name).and_then(Value::as_integer)
    }

    pub fn array_field(&self, name: &str) -> Option<&[Value]> {
        match self.field(name) {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_scalar_wrappers() {
        assert_eq!(
            Value::decode(&serde_json::json!({ "stringValue": "joy" })),
            Some(Value::String("joy".to_string()))
        );
        assert_eq!(
            Value::decode(&serde_json::json!({ "integerValue": "42" })),
            Some(Value::Integer(42))
        );
        assert_eq!(
            Value::decode(&serde_json::json!({ "booleanValue": true })),
            Some(Value::Bool(true))
        );
        assert_eq!(
            Value::decode(&serde_json::json!({ "nullValue": null })),
            Some(Value::Null)
        );
    }

    #[test]
    fn decodes_timestamp_to_utc() {
        let decoded = Value::decode(&serde_json::json!({
            "timestampValue": "2024-06-10T08:30:00+07:00"
        }));
        match decoded {
            Some(Value::Timestamp(t)) => {
                assert_eq!(t.to_rfc3339_opts(chrono::SecondsFormat::Secs, true), "2024-06-10T01:30:00Z");
            }
            other => panic!("expected timestamp, got {other:?}"),
        }
    }

    #[test]
    fn malformed_wrappers_decode_to_none() {
        assert_eq!(Value::decode(&serde_json::json!({ "integerValue": "abc" })), None);
        assert_eq!(Value::decode(&serde_json::json!({ "timestampValue": "yesterday" })), None);
        assert_eq!(Value::decode(&serde_json::json!({ "somethingElse": 1 })), None);
        assert_eq!(Value::decode(&serde_json::json!("bare string")), None);
    }

    #[test]
    fn empty_array_value_omits_values_key() {
        assert_eq!(
            Value::decode(&serde_json::json!({ "arrayValue": {} })),
            Some(Value::Array(Vec::new()))
        );
    }

    #[test]
    fn array_skips_undecodable_elements() {
        let decoded = Value::decode(&serde_json::json!({
            "arrayValue": { "values": [
                { "stringValue": "a" },
                { "bogusValue": 1 },
                { "stringValue": "b" }
            ]}
        }));
        assert_eq!(
            decoded,
            Some(Value::Array(vec![
                Value::String("a".to_string()),
                Value::String("b".to_string()),
            ]))
        );
    }

    #[test]
    fn document_decode_extracts_id_from_resource_name() {
        let doc = Document::decode(&serde_json::json!({
            "name": "projects/p/databases/(default)/documents/diaries/abc123",
            "fields": {
                "content": { "stringValue": "dear diary" },
                "mood": { "stringValue": " Joy " }
            }
        }))
        .unwrap();
        assert_eq!(doc.id, "abc123");
        assert_eq!(doc.str_field("content"), Some("dear diary"));
        assert_eq!(doc.str_field("mood"), Some(" Joy "));
        assert_eq!(doc.str_field("missing"), None);
    }

    #[test]
    fn document_without_name_is_invalid() {
        assert_eq!(Document::decode(&serde_json::json!({ "fields": {} })), None);
    }

    #[test]
    fn encode_round_trips_through_decode() {
        let original = Value::Array(vec![
            Value::String("x".to_string()),
            Value::Integer(7),
            Value::Timestamp("2024-06-10T01:30:00Z".parse().unwrap()),
        ]);
        assert_eq!(Value::decode(&original.encode()), Some(original));
    }
}
