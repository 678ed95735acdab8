//! ReQL Query Compiler.
//!
//! Compiles the JSON wire format back into a `Term` tree. This is the inverse
//! of `query::serializer` and is used to inspect captured queries.
//!
//! # Wire Protocol Format
//!
//! Terms are transmitted as JSON arrays in the format:
//! ```json
//! [term_type, [arg1, arg2, ...], {"optarg1": value1, ...}]
//! ```
//!
//! Where:
//! - `term_type` is a numeric ID (u64) identifying the operation
//! - Second element is an array of positional arguments
//! - Third element (optional) is an object of named arguments
//!
//! Anything that is not an array is a value: scalars become `DATUM` leaves,
//! `TIME` / `BINARY` pseudo-type objects become time and binary leaves, and
//! other objects become `MAKE_OBJ` terms.
//!
//! # Example
//!
//! JSON query for `r.table("users").filter({active: true})`:
//!
//! ```json
//! [39,  // FILTER
//!   [
//!     [15, ["users"]],  // TABLE("users")
//!     {"active": true}  // MAKE_OBJ({active: true})
//!   ]
//! ]
//! ```

use crate::error::{Error, Result};
use crate::reql::datum::REQL_TYPE_KEY;
use crate::reql::{Datum, Term, TermType};
use crate::response::convert::{decode_binary, decode_time};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::trace;

/// ReQL Query Compiler for parsing JSON queries into AST.
pub struct QueryCompiler;

impl QueryCompiler {
    /// Compile a JSON value into a ReQL Term
    pub fn compile(query: &Value) -> Result<Term> {
        Self::compile_term(query)
    }

    /// Parse and compile raw JSON bytes.
    pub fn compile_slice(bytes: &[u8]) -> Result<Term> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| Error::MalformedTerm(format!("invalid JSON: {}", e)))?;
        Self::compile(&value)
    }

    fn compile_term(json: &Value) -> Result<Term> {
        let arr = match json {
            Value::Array(arr) => arr,
            Value::Object(obj) => return Self::compile_object(obj),
            scalar => return Ok(Term::leaf(Datum::from(scalar.clone()))),
        };

        let (tag, rest) = arr
            .split_first()
            .ok_or_else(|| Error::MalformedTerm("empty term array".into()))?;
        let tag = tag.as_u64().ok_or_else(|| {
            Error::MalformedTerm(format!("term type must be an integer, got {}", tag))
        })?;
        let term_type = TermType::try_from(tag)?;
        trace!(%term_type, "Compiling term");

        if term_type == TermType::Datum {
            return match rest {
                [value] => Ok(Term::leaf(Datum::from(value.clone()))),
                _ => Err(Error::MalformedTerm("DATUM term requires exactly one value".into())),
            };
        }

        let (args, optargs) = match rest {
            [] => (None, None),
            [args] => (Some(args), None),
            [args, optargs] => (Some(args), Some(optargs)),
            _ => {
                return Err(Error::MalformedTerm(format!(
                    "{} has {} elements, expected at most 3",
                    term_type,
                    arr.len()
                )))
            }
        };

        let args = match args {
            Some(Value::Array(args)) => args
                .iter()
                .map(Self::compile_term)
                .collect::<Result<Vec<_>>>()?,
            Some(other) => {
                return Err(Error::MalformedTerm(format!(
                    "{} arguments must be an array, got {}",
                    term_type, other
                )))
            }
            None => Vec::new(),
        };
        if term_type == TermType::MakeObj && !args.is_empty() {
            return Err(Error::MalformedTerm(format!(
                "MAKE_OBJ takes no positional arguments, got {}",
                args.len()
            )));
        }

        let optargs = match optargs {
            Some(Value::Object(optargs)) => Self::compile_fields(optargs)?,
            Some(other) => {
                return Err(Error::MalformedTerm(format!(
                    "{} optional arguments must be an object, got {}",
                    term_type, other
                )))
            }
            None => BTreeMap::new(),
        };

        Ok(Term::new(term_type).with_args(args).with_optargs(optargs))
    }

    fn compile_object(obj: &Map<String, Value>) -> Result<Term> {
        let converted = match obj.get(REQL_TYPE_KEY).and_then(Value::as_str) {
            Some("TIME") => Some(decode_time(obj).map(Datum::Time)),
            Some("BINARY") => Some(decode_binary(obj).map(Datum::Binary)),
            _ => None,
        };

        match converted {
            Some(datum) => datum
                .map(Term::leaf)
                .map_err(|e| Error::MalformedTerm(e.to_string())),
            None => Ok(Term::new(TermType::MakeObj).with_optargs(Self::compile_fields(obj)?)),
        }
    }

    fn compile_fields(obj: &Map<String, Value>) -> Result<BTreeMap<String, Term>> {
        obj.iter()
            .map(|(key, value)| Self::compile_term(value).map(|term| (key.clone(), term)))
            .collect()
    }
}
