//! Datum - ReQL's JSON-like value type.
//!
//! A `Datum` is any value that can travel inside a query or come back in a
//! response. It is JSON plus two pseudo-types the protocol encodes as tagged
//! objects: binary data and points in time.
//!
//! # Supported Types
//!
//! - **Null**, **Boolean**, **String**
//! - **Integer** / **Number**: kept apart so `1` serializes as `1` and
//!   `1.5` as `1.5`
//! - **Binary**: raw bytes (`{"$reql_type$": "BINARY", ...}` on the wire)
//! - **Time**: a timestamp with a fixed UTC offset (`{"$reql_type$": "TIME", ...}`)
//! - **Array** / **Object**: objects are ordered by key
//!
//! # Example
//!
//! ```rust,ignore
//! use photondb_reql::reql::Datum;
//! use std::collections::BTreeMap;
//!
//! let mut obj = BTreeMap::new();
//! obj.insert("name".to_string(), Datum::from("Alice"));
//! obj.insert("age".to_string(), Datum::from(30));
//! let obj_val = Datum::Object(obj);
//! ```

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, FixedOffset};
use serde_json::Value;
use std::collections::BTreeMap;

/// Key marking a pseudo-type object on the wire.
pub const REQL_TYPE_KEY: &str = "$reql_type$";

/// Datum represents a value in a ReQL query or response.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Null,
    Boolean(bool),
    Integer(i64),
    Number(f64),
    String(String),
    Binary(Vec<u8>),
    Time(DateTime<FixedOffset>),
    Array(Vec<Datum>),
    Object(BTreeMap<String, Datum>),
}

impl Datum {
    /// Check if datum is null
    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null)
    }

    /// True for values that are not arrays or objects.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Datum::Array(_) | Datum::Object(_))
    }

    /// Get as string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Datum::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as number, widening integers
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Datum::Number(n) => Some(*n),
            Datum::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get as integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Datum::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Datum::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Datum::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Datum::Time(time) => Some(time),
            _ => None,
        }
    }

    /// Get as array
    pub fn as_array(&self) -> Option<&Vec<Datum>> {
        match self {
            Datum::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Get as object
    pub fn as_object(&self) -> Option<&BTreeMap<String, Datum>> {
        match self {
            Datum::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// The ReQL type name, as `TYPE_OF` would report it.
    pub fn type_name(&self) -> &'static str {
        match self {
            Datum::Null => "NULL",
            Datum::Boolean(_) => "BOOL",
            Datum::Integer(_) | Datum::Number(_) => "NUMBER",
            Datum::String(_) => "STRING",
            Datum::Binary(_) => "PTYPE<BINARY>",
            Datum::Time(_) => "PTYPE<TIME>",
            Datum::Array(_) => "ARRAY",
            Datum::Object(_) => "OBJECT",
        }
    }
}

/// Formats a UTC offset the way the protocol writes it: `+HH:MM` / `-HH:MM`.
pub(crate) fn format_offset(offset: &FixedOffset) -> String {
    let seconds = offset.local_minus_utc();
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.abs() / 60;
    format!("{}{:02}:{:02}", sign, minutes / 60, minutes % 60)
}

/// Epoch seconds with millisecond precision, the resolution the server keeps.
pub(crate) fn epoch_seconds(time: &DateTime<FixedOffset>) -> f64 {
    time.timestamp_millis() as f64 / 1000.0
}

// Conversions
impl From<bool> for Datum {
    fn from(b: bool) -> Self {
        Datum::Boolean(b)
    }
}

impl From<i32> for Datum {
    fn from(n: i32) -> Self {
        Datum::Integer(n as i64)
    }
}

impl From<i64> for Datum {
    fn from(n: i64) -> Self {
        Datum::Integer(n)
    }
}

impl From<u32> for Datum {
    fn from(n: u32) -> Self {
        Datum::Integer(n as i64)
    }
}

/// Values past `i64::MAX` become floats rather than wrapping negative.
impl From<u64> for Datum {
    fn from(n: u64) -> Self {
        i64::try_from(n)
            .map(Datum::Integer)
            .unwrap_or(Datum::Number(n as f64))
    }
}

impl From<usize> for Datum {
    fn from(n: usize) -> Self {
        Datum::from(n as u64)
    }
}

impl From<f64> for Datum {
    fn from(n: f64) -> Self {
        Datum::Number(n)
    }
}

impl From<String> for Datum {
    fn from(s: String) -> Self {
        Datum::String(s)
    }
}

impl From<&str> for Datum {
    fn from(s: &str) -> Self {
        Datum::String(s.to_string())
    }
}

impl From<&[u8]> for Datum {
    fn from(bytes: &[u8]) -> Self {
        Datum::Binary(bytes.to_vec())
    }
}

impl From<DateTime<FixedOffset>> for Datum {
    fn from(time: DateTime<FixedOffset>) -> Self {
        Datum::Time(time)
    }
}

/// Plain structural conversion; pseudo-type objects stay objects.
/// Response decoding goes through `response::Deserializer` instead.
impl From<Value> for Datum {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Datum::Null,
            Value::Bool(b) => Datum::Boolean(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Datum::Integer(i),
                None => Datum::Number(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Datum::String(s),
            Value::Array(arr) => Datum::Array(arr.into_iter().map(Datum::from).collect()),
            Value::Object(obj) => {
                Datum::Object(obj.into_iter().map(|(k, v)| (k, Datum::from(v))).collect())
            }
        }
    }
}

impl From<Datum> for Value {
    fn from(datum: Datum) -> Self {
        match datum {
            Datum::Null => Value::Null,
            Datum::Boolean(b) => Value::Bool(b),
            Datum::Integer(i) => Value::from(i),
            Datum::Number(n) => serde_json::Number::from_f64(n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Datum::String(s) => Value::String(s),
            Datum::Binary(bytes) => serde_json::json!({
                "$reql_type$": "BINARY",
                "data": BASE64.encode(bytes),
            }),
            Datum::Time(time) => serde_json::json!({
                "$reql_type$": "TIME",
                "epoch_time": epoch_seconds(&time),
                "timezone": format_offset(time.offset()),
            }),
            Datum::Array(arr) => Value::Array(arr.into_iter().map(Value::from).collect()),
            Datum::Object(obj) => {
                Value::Object(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl std::fmt::Display for Datum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Datum::Null => write!(f, "null"),
            Datum::Boolean(b) => write!(f, "{}", b),
            Datum::Integer(i) => write!(f, "{}", i),
            Datum::Number(n) => write!(f, "{}", n),
            Datum::String(s) => write!(f, "\"{}\"", s),
            Datum::Binary(bytes) => write!(f, "<binary, {} bytes>", bytes.len()),
            Datum::Time(time) => write!(f, "{}", time.to_rfc3339()),
            Datum::Array(arr) => {
                write!(f, "[")?;
                for (i, item) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Datum::Object(obj) => {
                write!(f, "{{")?;
                for (i, (key, value)) in obj.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "\"{}\": {}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}
