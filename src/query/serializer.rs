//! Term serialization to the wire format.
//!
//! Output shapes, depth-first:
//!
//! ```text
//! DATUM leaf        -> the scalar itself: 1, 1.5, "s", true, null
//!                      binary and times as $reql_type$ objects
//! MAKE_OBJ          -> {"field": <serialized>, ...}
//! any other term    -> [tag, [args...]]
//!                      [tag, [args...], {optargs...}]   (only with optargs)
//! ```
//!
//! Optargs and objects are ordered maps, so the same tree always produces the
//! same bytes.

use crate::error::{Error, Result};
use crate::reql::datum::{epoch_seconds, format_offset, REQL_TYPE_KEY};
use crate::reql::{Datum, Term, TermType};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::{Map, Value};
use tracing::debug;

/// Serialize a term tree into its wire value.
pub fn serialize(term: &Term) -> Result<Value> {
    let value = serialize_term(term)?;
    debug!(term_type = %term.term_type(), "Serialized term");
    Ok(value)
}

/// Serialize a term tree straight to JSON bytes.
pub fn to_bytes(term: &Term) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&serialize(term)?)?)
}

fn serialize_term(term: &Term) -> Result<Value> {
    match term.term_type() {
        TermType::Datum => match term.as_datum() {
            Some(datum) => serialize_datum(datum),
            None => Err(Error::SerializationError("DATUM term without a value".into())),
        },
        TermType::MakeObj if !term.args().is_empty() => Err(Error::SerializationError(
            "MAKE_OBJ with positional arguments has no wire form".into(),
        )),
        TermType::MakeObj => serialize_fields(term.optargs().iter()),
        term_type => {
            let args = term
                .args()
                .iter()
                .map(serialize_term)
                .collect::<Result<Vec<_>>>()?;

            let mut record = vec![Value::from(term_type.to_u64()), Value::Array(args)];
            if !term.optargs().is_empty() {
                record.push(serialize_fields(term.optargs().iter())?);
            }
            Ok(Value::Array(record))
        }
    }
}

fn serialize_fields<'a, I>(fields: I) -> Result<Value>
where
    I: Iterator<Item = (&'a String, &'a Term)>,
{
    let mut object = Map::new();
    for (key, value) in fields {
        object.insert(key.clone(), serialize_term(value)?);
    }
    Ok(Value::Object(object))
}

/// Serialize a value held in a leaf. Arrays are written as `MAKE_ARRAY`
/// records since a bare JSON array would read as a term.
pub(crate) fn serialize_datum(datum: &Datum) -> Result<Value> {
    match datum {
        Datum::Null => Ok(Value::Null),
        Datum::Boolean(b) => Ok(Value::Bool(*b)),
        Datum::Integer(i) => Ok(Value::from(*i)),
        Datum::Number(n) => serde_json::Number::from_f64(*n)
            .map(Value::Number)
            .ok_or_else(|| Error::SerializationError(format!("non-finite number {}", n))),
        Datum::String(s) => Ok(Value::String(s.clone())),
        Datum::Binary(bytes) => {
            let mut object = Map::new();
            object.insert(REQL_TYPE_KEY.to_string(), Value::from("BINARY"));
            object.insert("data".to_string(), Value::from(BASE64.encode(bytes)));
            Ok(Value::Object(object))
        }
        Datum::Time(time) => {
            let epoch = epoch_seconds(time);
            let epoch = serde_json::Number::from_f64(epoch).ok_or_else(|| {
                Error::SerializationError(format!("time {} out of range", time))
            })?;
            let mut object = Map::new();
            object.insert(REQL_TYPE_KEY.to_string(), Value::from("TIME"));
            object.insert("epoch_time".to_string(), Value::Number(epoch));
            object.insert("timezone".to_string(), Value::from(format_offset(time.offset())));
            Ok(Value::Object(object))
        }
        Datum::Array(items) => {
            let items = items.iter().map(serialize_datum).collect::<Result<Vec<_>>>()?;
            Ok(Value::Array(vec![
                Value::from(TermType::MakeArray.to_u64()),
                Value::Array(items),
            ]))
        }
        Datum::Object(fields) => {
            let mut object = Map::new();
            for (key, value) in fields {
                object.insert(key.clone(), serialize_datum(value)?);
            }
            Ok(Value::Object(object))
        }
    }
}
