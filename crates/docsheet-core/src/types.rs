//! Core types for docsheet

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

/// A 12-byte store-generated document identifier, written as 24 hex digits
pub use bson::oid::ObjectId;

/// Name of the field holding each document's store-generated key
pub const IDENTIFIER_FIELD: &str = "_id";

/// A document field value
///
/// Nested sub-documents and arrays are not flattened into separate fields;
/// they travel as a single `Json` value in relaxed extended JSON form.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean
    Bool(bool),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// 64-bit floating point
    Double(f64),
    /// UTF-8 string
    String(String),
    /// Store-generated identifier
    ObjectId(ObjectId),
    /// UTC instant
    DateTime(DateTime<Utc>),
    /// Sub-document, array or any other structured value
    Json(serde_json::Value),
}

impl Value {
    /// Check if the value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get as an identifier
    pub fn as_object_id(&self) -> Option<&ObjectId> {
        match self {
            Value::ObjectId(oid) => Some(oid),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
            Value::ObjectId(v) => write!(f, "{}", v),
            Value::DateTime(v) => write!(f, "{}", v.to_rfc3339()),
            Value::Json(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int32(i)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int64(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Double(f)
    }
}

impl From<ObjectId> for Value {
    fn from(oid: ObjectId) -> Self {
        Value::ObjectId(oid)
    }
}

/// A schemaless record: field names mapped to values in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    fields: IndexMap<String, Value>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, returning the previous value if the field existed
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    /// Get a field by name
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Field names in their natural order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterate over `(field, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the document has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether at least one field holds a non-NULL value
    pub fn has_values(&self) -> bool {
        self.fields.values().any(|v| !v.is_null())
    }

    /// The identifier, if the document carries an `ObjectId` in `_id`
    pub fn id(&self) -> Option<&ObjectId> {
        self.get(IDENTIFIER_FIELD).and_then(Value::as_object_id)
    }

    /// Put `_id` first, generating one if it is missing
    pub fn ensure_id(&mut self) -> &Value {
        if !self.fields.contains_key(IDENTIFIER_FIELD) {
            self.fields
                .shift_insert(0, IDENTIFIER_FIELD.to_string(), Value::ObjectId(ObjectId::new()));
        }
        &self.fields[IDENTIFIER_FIELD]
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<(&'a str, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (&'a str, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_parse_round_trip() {
        let oid = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
        assert_eq!(oid.to_hex(), "507f1f77bcf86cd799439011");
        assert_eq!(oid.to_string(), "507f1f77bcf86cd799439011");
    }

    #[test]
    fn test_object_id_rejects_bad_input() {
        for bad in ["", "507f1f77", "507f1f77bcf86cd79943901z", "507f1f77bcf86cd7994390111"] {
            assert!(ObjectId::parse_str(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_object_id_uppercase_parses_to_same_value() {
        let lower = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
        let upper = ObjectId::parse_str("507F1F77BCF86CD799439011").unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn test_object_id_new_is_unique() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        assert_ne!(a, b);
        assert_eq!(a.bytes()[4..9], b.bytes()[4..9]);
    }

    #[test]
    fn test_object_id_timestamp() {
        let oid = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
        assert_eq!(oid.timestamp().timestamp_millis(), 0x507f1f77_i64 * 1000);
    }

    #[test]
    fn test_document_preserves_field_order() {
        let mut doc = Document::new();
        doc.insert("b", 1);
        doc.insert("a", "x");
        doc.insert("c", true);
        assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_document_has_values() {
        let doc: Document = [("a", Value::Null), ("b", Value::Null)].into_iter().collect();
        assert!(!doc.has_values());
        assert!(!doc.is_empty());

        let doc: Document = [("a", Value::Null), ("b", Value::Int32(0))].into_iter().collect();
        assert!(doc.has_values());
    }

    #[test]
    fn test_ensure_id_inserts_identifier_first() {
        let mut doc: Document = [("name", Value::from("ada"))].into_iter().collect();
        assert!(doc.id().is_none());
        doc.ensure_id();
        assert_eq!(doc.keys().next(), Some(IDENTIFIER_FIELD));
        assert!(doc.id().is_some());

        let before = *doc.id().unwrap();
        doc.ensure_id();
        assert_eq!(doc.id(), Some(&before));
    }
}
