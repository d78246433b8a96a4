//! Value Encoding/Decoding for worksheet cells
//!
//! This module handles the conversion between `docsheet_core::Value` and the
//! flat `Cell` values a worksheet can hold.
//!
//! Primitives map straight across. Identifiers are written as their 24-digit
//! hex form and recognised again on the way back by the field they sit in,
//! so a reimported `_id` is an `ObjectId` rather than a bare string. Dates
//! and nested values are written as text and come back as strings.

use docsheet_core::{Document, IDENTIFIER_FIELD, ObjectId, Value};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors during cell decoding
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EncodingError {
    #[error("Malformed identifier {value:?} in field {field}: {reason}")]
    MalformedIdentifier {
        field: String,
        value: String,
        reason: String,
    },
}

/// A single worksheet cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// No value
    Empty,
    /// Boolean value
    Bool(bool),
    /// Numeric value; worksheets store every number as a double
    Number(f64),
    /// Text value
    Text(String),
}

impl Cell {
    /// Whether the cell holds nothing, or only the empty string
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Render the cell as text, the way a header cell is read as a field name
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Bool(b) => b.to_string(),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }
}

/// Encode a `Value` into a `Cell`
pub fn encode_value(value: &Value) -> Cell {
    match value {
        Value::Null => Cell::Empty,
        Value::Bool(b) => Cell::Bool(*b),
        Value::Int32(i) => Cell::Number(f64::from(*i)),
        Value::Int64(i) => Cell::Number(*i as f64),
        Value::Double(d) => Cell::Number(*d),
        Value::String(s) if s.is_empty() => Cell::Empty,
        Value::String(s) => Cell::Text(s.clone()),
        Value::ObjectId(oid) => Cell::Text(oid.to_hex()),
        Value::DateTime(dt) => Cell::Text(dt.to_rfc3339()),
        Value::Json(json) => Cell::Text(json.to_string()),
    }
}

/// Encode a document as a row, one cell per header field.
///
/// Fields the document has but the header lacks are not written.
pub fn encode_row(header: &[String], document: &Document) -> Vec<Cell> {
    header
        .iter()
        .map(|field| document.get(field).map(encode_value).unwrap_or(Cell::Empty))
        .collect()
}

/// Decode a cell back into a `Value`, given the field it belongs to
pub fn decode_cell(field: &str, cell: &Cell) -> Result<Value, EncodingError> {
    if field == IDENTIFIER_FIELD && !cell.is_empty() {
        return decode_identifier(field, &cell.to_text());
    }

    Ok(match cell {
        Cell::Empty => Value::Null,
        Cell::Text(s) if s.is_empty() => Value::Null,
        Cell::Text(s) => Value::String(s.clone()),
        Cell::Number(n) => decode_number(*n),
        Cell::Bool(b) => Value::Bool(*b),
    })
}

/// Decode one data row against the header.
///
/// Blank header cells contribute no field, and a blank `_id` is left out so
/// the store assigns one. Returns `None` when every decoded field is NULL, so
/// blank rows never become empty documents.
pub fn decode_row(header: &[String], row: &[Cell]) -> Result<Option<Document>, EncodingError> {
    let mut document = Document::new();
    for (index, field) in header.iter().enumerate() {
        if field.is_empty() {
            continue;
        }
        let cell = row.get(index).unwrap_or(&Cell::Empty);
        let value = decode_cell(field, cell)?;
        if field == IDENTIFIER_FIELD && value.is_null() {
            continue;
        }
        document.insert(field.as_str(), value);
    }

    Ok(document.has_values().then_some(document))
}

fn decode_identifier(field: &str, raw: &str) -> Result<Value, EncodingError> {
    // The spreadsheet layer may have wrapped the value in quotes.
    let unquoted = raw.strip_prefix('"').unwrap_or(raw);
    let unquoted = unquoted.strip_suffix('"').unwrap_or(unquoted);

    ObjectId::parse_str(unquoted)
        .map(Value::ObjectId)
        .map_err(|e| EncodingError::MalformedIdentifier {
            field: field.to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

/// Integral numbers inside the 32-bit range come back as `Int32`, everything
/// else as `Double`.
fn decode_number(n: f64) -> Value {
    if n.fract() == 0.0 && n >= f64::from(i32::MIN) && n <= f64::from(i32::MAX) {
        Value::Int32(n as i32)
    } else {
        Value::Double(n)
    }
}
