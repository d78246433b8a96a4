//! BSON <-> `Value` conversion

use bson::{Bson, Document as BsonDocument};
use docsheet_core::{Document, DocsheetError, Result, Value};

/// Convert a BSON value to our Value type
///
/// Scalars map one to one. Sub-documents, arrays and the remaining BSON
/// types (binary, decimal, regex, timestamps, ...) become `Value::Json` in
/// relaxed extended JSON so they survive the trip back into BSON.
pub fn bson_to_value(bson: &Bson) -> Value {
    match bson {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(*b),
        Bson::Int32(i) => Value::Int32(*i),
        Bson::Int64(i) => Value::Int64(*i),
        Bson::Double(d) => Value::Double(*d),
        Bson::String(s) => Value::String(s.clone()),
        Bson::ObjectId(oid) => Value::ObjectId(*oid),
        Bson::DateTime(dt) => match chrono::DateTime::from_timestamp_millis(dt.timestamp_millis()) {
            Some(utc) => Value::DateTime(utc),
            None => Value::Json(bson.clone().into_relaxed_extjson()),
        },
        other => Value::Json(other.clone().into_relaxed_extjson()),
    }
}

/// Convert a Value back to BSON
pub fn value_to_bson(value: &Value) -> Result<Bson> {
    Ok(match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(*b),
        Value::Int32(i) => Bson::Int32(*i),
        Value::Int64(i) => Bson::Int64(*i),
        Value::Double(d) => Bson::Double(*d),
        Value::String(s) => Bson::String(s.clone()),
        Value::ObjectId(oid) => Bson::ObjectId(*oid),
        Value::DateTime(dt) => Bson::DateTime(bson::DateTime::from_millis(dt.timestamp_millis())),
        Value::Json(json) => Bson::try_from(json.clone())
            .map_err(|e| DocsheetError::Driver(format!("Invalid extended JSON value: {}", e)))?,
    })
}

/// Convert a BSON document into a docsheet document, keeping field order
pub fn document_from_bson(document: &BsonDocument) -> Document {
    document
        .iter()
        .map(|(key, value)| (key.clone(), bson_to_value(value)))
        .collect()
}

/// Convert a docsheet document into a BSON document, keeping field order
pub fn document_to_bson(document: &Document) -> Result<BsonDocument> {
    let mut out = BsonDocument::new();
    for (key, value) in document.iter() {
        out.insert(key, value_to_bson(value)?);
    }
    Ok(out)
}
