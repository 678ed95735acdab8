//! Pseudo-type conversion.
//!
//! The server encodes values JSON cannot express as objects tagged with
//! `$reql_type$`. Depending on [`FormatOptions`] they are either turned into
//! native values or handed back untouched.

use crate::error::{Error, Result};
use crate::reql::time::parse_timezone;
use crate::reql::Datum;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

macro_rules! format_option {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            /// Convert into the native representation.
            #[default]
            Native,
            /// Leave the pseudo-type object as it arrived.
            Raw,
        }

        impl std::str::FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    "native" => Ok($name::Native),
                    "raw" => Ok($name::Raw),
                    other => Err(Error::Config(format!(
                        "{} must be \"native\" or \"raw\", got {:?}",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }
    };
}

format_option!(
    /// How `TIME` pseudo-types are returned.
    TimeFormat
);
format_option!(
    /// How `BINARY` pseudo-types are returned.
    BinaryFormat
);
format_option!(
    /// How `GROUPED_DATA` pseudo-types are returned.
    GroupFormat
);

/// Client-side output format choices. These never go to the server.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
    #[serde(default)]
    pub time_format: TimeFormat,
    #[serde(default)]
    pub binary_format: BinaryFormat,
    #[serde(default)]
    pub group_format: GroupFormat,
}

impl FormatOptions {
    /// Everything left as received.
    pub fn raw() -> Self {
        Self {
            time_format: TimeFormat::Raw,
            binary_format: BinaryFormat::Raw,
            group_format: GroupFormat::Raw,
        }
    }
}

/// Turns pseudo-type objects into native values.
///
/// Every method has a default, so an implementation only overrides what it
/// wants to change (for example to build geometry types).
pub trait PseudoTypeConverter: Send + Sync {
    fn convert_time(&self, object: &Map<String, Value>) -> Result<Datum> {
        decode_time(object).map(Datum::Time)
    }

    fn convert_binary(&self, object: &Map<String, Value>) -> Result<Datum> {
        decode_binary(object).map(Datum::Binary)
    }

    /// `groups` holds `(group, reduction)` pairs, already converted.
    fn convert_grouped(&self, groups: Vec<(Datum, Datum)>) -> Result<Datum> {
        Ok(Datum::Array(
            groups
                .into_iter()
                .map(|(group, reduction)| {
                    let mut entry = BTreeMap::new();
                    entry.insert("group".to_string(), group);
                    entry.insert("reduction".to_string(), reduction);
                    Datum::Object(entry)
                })
                .collect(),
        ))
    }

    /// GeoJSON-like object with its fields already converted; kept as is.
    fn convert_geometry(&self, object: BTreeMap<String, Datum>) -> Result<Datum> {
        Ok(Datum::Object(object))
    }
}

/// Default conversions.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeConverter;

impl PseudoTypeConverter for NativeConverter {}

/// Read a `TIME` object. Precision is milliseconds.
pub fn decode_time(object: &Map<String, Value>) -> Result<DateTime<FixedOffset>> {
    let epoch = object
        .get("epoch_time")
        .and_then(Value::as_f64)
        .ok_or_else(|| malformed("TIME pseudo-type without a numeric epoch_time"))?;
    let timezone = object
        .get("timezone")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("TIME pseudo-type without a timezone"))?;

    let offset = parse_timezone(timezone)
        .map_err(|_| malformed(&format!("TIME pseudo-type with bad timezone {:?}", timezone)))?
        .offset();
    let millis = (epoch * 1000.0).round();
    if !millis.is_finite() {
        return Err(malformed("TIME pseudo-type with non-finite epoch_time"));
    }

    Utc.timestamp_millis_opt(millis as i64)
        .single()
        .map(|utc| utc.with_timezone(&offset))
        .ok_or_else(|| malformed(&format!("epoch_time {} out of range", epoch)))
}

/// Read a `BINARY` object.
pub fn decode_binary(object: &Map<String, Value>) -> Result<Vec<u8>> {
    let data = object
        .get("data")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("BINARY pseudo-type without data"))?;
    BASE64
        .decode(data)
        .map_err(|e| malformed(&format!("BINARY data is not base64: {}", e)))
}

fn malformed(message: &str) -> Error {
    Error::MalformedResponse(message.to_string())
}
