//! Narrow typed-payload accessor shared by every collection's payload
//! record, replacing the open-map-with-runtime-casts pattern named in the
//! REDESIGN FLAGS.

use serde_json::Value;

/// A closed set of field shapes a payload can expose. Callers match on this
/// instead of casting a `serde_json::Value` themselves.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Tags(Vec<String>),
    Timestamp(chrono::DateTime<chrono::Utc>),
}

impl FieldValue {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_tags(&self) -> Option<&[String]> {
        match self {
            FieldValue::Tags(t) => Some(t),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Implemented by every per-collection payload record.
pub trait Payload {
    /// Serialize to the wire format the vector engine expects.
    fn to_value(&self) -> Value;

    /// Typed lookup of a known field, for code that needs to branch on a
    /// payload field without an untyped cast. Unknown keys return `None`.
    fn field(&self, key: &str) -> Option<FieldValue>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy;
    impl Payload for Dummy {
        fn to_value(&self) -> Value {
            serde_json::json!({"file": "a.rs"})
        }
        fn field(&self, key: &str) -> Option<FieldValue> {
            match key {
                "file" => Some(FieldValue::Text("a.rs".into())),
                _ => None,
            }
        }
    }

    #[test]
    fn field_lookup_is_typed() {
        let d = Dummy;
        assert_eq!(d.field("file").unwrap().as_text(), Some("a.rs"));
        assert!(d.field("missing").is_none());
    }
}
