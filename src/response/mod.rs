//! Response decoding.
//!
//! Input is a response object already parsed from its transport envelope:
//!
//! ```json
//! {"t": 1, "r": [...], "e": 5000000, "b": [...], "p": {...}, "n": [...]}
//! ```
//!
//! Success responses become a [`Response`] with every value converted;
//! error responses become [`Error::QueryExecution`] with a stable
//! [`ErrorClass`].

pub mod convert;

pub use convert::{
    BinaryFormat, FormatOptions, GroupFormat, NativeConverter, PseudoTypeConverter, TimeFormat,
};

use crate::error::{Error, Result};
use crate::reql::datum::REQL_TYPE_KEY;
use crate::reql::{Datum, ErrorClass, ResponseNote, ResponseType};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

/// A successful server response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub response_type: ResponseType,
    pub results: Vec<Datum>,
    pub notes: Vec<ResponseNote>,
    pub profile: Option<Datum>,
}

impl Response {
    /// More results can be fetched with a CONTINUE query.
    pub fn is_partial(&self) -> bool {
        self.response_type == ResponseType::SuccessPartial
    }

    /// The single value of an atom response, or the results as an array.
    pub fn into_value(self) -> Datum {
        match self.response_type {
            ResponseType::SuccessAtom | ResponseType::ServerInfo if self.results.len() == 1 => {
                self.results.into_iter().next().unwrap_or(Datum::Null)
            }
            _ => Datum::Array(self.results),
        }
    }
}

/// Decode a response with the default formats.
pub fn deserialize(response: &Value) -> Result<Response> {
    Deserializer::new().deserialize(response)
}

/// Response decoder with configurable pseudo-type handling.
pub struct Deserializer {
    formats: FormatOptions,
    converter: Box<dyn PseudoTypeConverter>,
}

impl Default for Deserializer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Deserializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deserializer").field("formats", &self.formats).finish_non_exhaustive()
    }
}

impl Deserializer {
    pub fn new() -> Self {
        Self::with_formats(FormatOptions::default())
    }

    pub fn with_formats(formats: FormatOptions) -> Self {
        Self {
            formats,
            converter: Box::new(NativeConverter),
        }
    }

    /// Replace the pseudo-type converter.
    pub fn with_converter<C: PseudoTypeConverter + 'static>(mut self, converter: C) -> Self {
        self.converter = Box::new(converter);
        self
    }

    pub fn formats(&self) -> &FormatOptions {
        &self.formats
    }

    /// Decode raw response bytes.
    pub fn from_slice(&self, bytes: &[u8]) -> Result<Response> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| Error::MalformedResponse(format!("invalid JSON: {}", e)))?;
        self.deserialize(&value)
    }

    pub fn deserialize(&self, response: &Value) -> Result<Response> {
        let object = response
            .as_object()
            .ok_or_else(|| Error::MalformedResponse("response is not an object".into()))?;

        let code = object
            .get("t")
            .and_then(Value::as_u64)
            .ok_or_else(|| Error::MalformedResponse("missing response type".into()))?;
        let response_type = ResponseType::from_code(code)
            .ok_or_else(|| Error::MalformedResponse(format!("unknown response type {}", code)))?;

        let results = match object.get("r") {
            Some(Value::Array(results)) => results.as_slice(),
            Some(other) => {
                return Err(Error::MalformedResponse(format!(
                    "results must be an array, got {}",
                    other
                )))
            }
            None => &[],
        };

        if response_type.is_error() {
            return Err(self.query_error(response_type, object, results));
        }

        let results = results.iter().map(|v| self.convert(v)).collect::<Result<Vec<_>>>()?;
        let notes = object
            .get("n")
            .and_then(Value::as_array)
            .map(|notes| {
                notes
                    .iter()
                    .filter_map(Value::as_u64)
                    .filter_map(ResponseNote::from_code)
                    .collect()
            })
            .unwrap_or_default();
        let profile = object.get("p").map(|p| self.convert(p)).transpose()?;

        debug!(?response_type, results = results.len(), "Decoded response");
        Ok(Response {
            response_type,
            results,
            notes,
            profile,
        })
    }

    fn query_error(
        &self,
        response_type: ResponseType,
        object: &Map<String, Value>,
        results: &[Value],
    ) -> Error {
        let class = match response_type {
            ResponseType::ClientError => ErrorClass::Client,
            ResponseType::CompileError => ErrorClass::Compile,
            _ => ErrorClass::from_runtime_code(object.get("e").and_then(Value::as_u64)),
        };
        let message = match results.first() {
            Some(Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
            None => "no error message".to_string(),
        };
        let backtrace = object
            .get("b")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        debug!(%class, %message, "Server reported query error");
        Error::QueryExecution {
            class,
            message,
            backtrace,
        }
    }

    /// Convert one response value, resolving pseudo-types per the formats.
    pub fn convert(&self, value: &Value) -> Result<Datum> {
        match value {
            Value::Array(items) => Ok(Datum::Array(
                items.iter().map(|v| self.convert(v)).collect::<Result<Vec<_>>>()?,
            )),
            Value::Object(object) => match object.get(REQL_TYPE_KEY) {
                Some(Value::String(reql_type)) => self.convert_pseudo(reql_type, object),
                Some(other) => Err(Error::MalformedResponse(format!(
                    "{} must be a string, got {}",
                    REQL_TYPE_KEY, other
                ))),
                None => self.convert_fields(object).map(Datum::Object),
            },
            scalar => Ok(Datum::from(scalar.clone())),
        }
    }

    fn convert_fields(&self, object: &Map<String, Value>) -> Result<BTreeMap<String, Datum>> {
        object
            .iter()
            .map(|(key, value)| self.convert(value).map(|datum| (key.clone(), datum)))
            .collect()
    }

    fn convert_pseudo(&self, reql_type: &str, object: &Map<String, Value>) -> Result<Datum> {
        trace!(reql_type, "Converting pseudo-type");
        match reql_type {
            "TIME" => match self.formats.time_format {
                TimeFormat::Native => self.converter.convert_time(object),
                TimeFormat::Raw => Ok(raw(object)),
            },
            "BINARY" => match self.formats.binary_format {
                BinaryFormat::Native => self.converter.convert_binary(object),
                BinaryFormat::Raw => Ok(raw(object)),
            },
            "GROUPED_DATA" => match self.formats.group_format {
                GroupFormat::Native => {
                    let groups = self.grouped_pairs(object)?;
                    self.converter.convert_grouped(groups)
                }
                GroupFormat::Raw => self.convert_fields(object).map(Datum::Object),
            },
            "GEOMETRY" => {
                let fields = self.convert_fields(object)?;
                self.converter.convert_geometry(fields)
            }
            other => {
                warn!(reql_type = other, "Unsupported pseudo-type in response");
                Err(Error::MalformedResponse(format!("unknown pseudo-type {}", other)))
            }
        }
    }

    fn grouped_pairs(&self, object: &Map<String, Value>) -> Result<Vec<(Datum, Datum)>> {
        let data = object
            .get("data")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::MalformedResponse("GROUPED_DATA without data".into()))?;

        data.iter()
            .map(|pair| match pair.as_array().map(Vec::as_slice) {
                Some([group, reduction]) => Ok((self.convert(group)?, self.convert(reduction)?)),
                _ => Err(Error::MalformedResponse(format!(
                    "GROUPED_DATA entry must be a [group, reduction] pair, got {}",
                    pair
                ))),
            })
            .collect()
    }
}

/// Structural copy of a pseudo-type object.
fn raw(object: &Map<String, Value>) -> Datum {
    Datum::from(Value::Object(object.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_atom() {
        let response = deserialize(&json!({"t": 1, "r": [{"id": 1, "name": "Alice"}]})).unwrap();

        assert_eq!(response.response_type, ResponseType::SuccessAtom);
        assert!(!response.is_partial());
        let value = response.into_value();
        let object = value.as_object().unwrap();
        assert_eq!(object.get("name"), Some(&Datum::from("Alice")));
        assert_eq!(object.get("id"), Some(&Datum::Integer(1)));
    }

    #[test]
    fn test_partial_sequence_with_notes() {
        let response = deserialize(&json!({"t": 3, "r": [1, 2], "n": [1, 99]})).unwrap();
        assert!(response.is_partial());
        assert_eq!(response.notes, vec![ResponseNote::SequenceFeed]);
        assert_eq!(response.into_value(), Datum::Array(vec![Datum::from(1), Datum::from(2)]));
    }

    #[test]
    fn test_runtime_error_is_classified() {
        let err = deserialize(&json!({
            "t": 18,
            "e": 5000000,
            "r": ["custom failure"],
            "b": [0, "filter"]
        }))
        .unwrap_err();

        match err {
            Error::QueryExecution { class, message, backtrace } => {
                assert_eq!(class, ErrorClass::User);
                assert_eq!(message, "custom failure");
                assert_eq!(backtrace, vec![json!(0), json!("filter")]);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_compile_and_client_errors() {
        let err = deserialize(&json!({"t": 17, "r": ["bad query"]})).unwrap_err();
        assert_eq!(err.class(), "compile_error");
        let err = deserialize(&json!({"t": 16, "r": ["bad token"]})).unwrap_err();
        assert_eq!(err.class(), "client_error");
    }

    #[test]
    fn test_malformed_responses() {
        for bad in [json!([1]), json!({"r": []}), json!({"t": 42, "r": []}), json!({"t": 1, "r": 5})] {
            assert!(
                matches!(deserialize(&bad), Err(Error::MalformedResponse(_))),
                "accepted {}",
                bad
            );
        }
    }

    #[test]
    fn test_time_native_and_raw() {
        let payload = json!({"t": 1, "r": [{"$reql_type$": "TIME", "epoch_time": 0, "timezone": "+00:00"}]});

        let native = deserialize(&payload).unwrap().into_value();
        assert_eq!(native.as_time().unwrap().timestamp(), 0);

        let raw = Deserializer::with_formats(FormatOptions::raw())
            .deserialize(&payload)
            .unwrap()
            .into_value();
        assert_eq!(
            raw.as_object().unwrap().get(REQL_TYPE_KEY),
            Some(&Datum::from("TIME"))
        );
    }

    #[test]
    fn test_grouped_data() {
        let payload = json!({"t": 1, "r": [{
            "$reql_type$": "GROUPED_DATA",
            "data": [["a", 1], ["b", {"$reql_type$": "BINARY", "data": "aGk="}]]
        }]});
        let value = deserialize(&payload).unwrap().into_value();
        let groups = value.as_array().unwrap();

        assert_eq!(groups.len(), 2);
        let second = groups[1].as_object().unwrap();
        assert_eq!(second.get("group"), Some(&Datum::from("b")));
        assert_eq!(second.get("reduction"), Some(&Datum::Binary(b"hi".to_vec())));
    }

    #[test]
    fn test_unknown_pseudo_type() {
        let err = deserialize(&json!({"t": 1, "r": [{"$reql_type$": "WIDGET"}]})).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    struct CountingGeometry;

    impl PseudoTypeConverter for CountingGeometry {
        fn convert_geometry(&self, object: BTreeMap<String, Datum>) -> Result<Datum> {
            Ok(Datum::Integer(object.len() as i64))
        }
    }

    #[test]
    fn test_custom_converter() {
        let payload = json!({"t": 1, "r": [{
            "$reql_type$": "GEOMETRY",
            "type": "Point",
            "coordinates": [1.5, 2.5]
        }]});

        let default = deserialize(&payload).unwrap().into_value();
        assert!(default.as_object().unwrap().contains_key("coordinates"));

        let custom = Deserializer::new()
            .with_converter(CountingGeometry)
            .deserialize(&payload)
            .unwrap()
            .into_value();
        assert_eq!(custom, Datum::Integer(3));
    }
}
