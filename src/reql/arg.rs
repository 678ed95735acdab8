//! Arguments accepted wherever the builder expects an expression.
//!
//! `Arg` is the closed set of shapes that can be wrapped into a `Term`:
//! a plain value, a sequence or mapping of further arguments, an existing
//! term, or a function with a declared arity. Wrapping is an explicit match
//! over these variants; see [`Arg::into_term`].

use super::ast::Term;
use super::datum::Datum;
use super::func::{self, Func};
use super::terms::TermType;
use crate::error::{Error, Result};
use chrono::{DateTime, FixedOffset};
use std::collections::{BTreeMap, HashMap};

/// Builds a `Vec<Arg>` from heterogeneous values.
///
/// ```rust,ignore
/// let query = r::eq(reql_args![r::row().bracket("age")?, 30])?;
/// ```
#[macro_export]
macro_rules! reql_args {
    () => {
        ::std::vec::Vec::<$crate::reql::Arg>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::reql::Arg::from($arg)),+]
    };
}

/// Anything that can stand in for an expression.
#[derive(Debug)]
pub enum Arg {
    /// A plain value; containers inside it are expanded on wrapping.
    Datum(Datum),
    /// A sequence whose elements may themselves be terms or functions.
    Array(Vec<Arg>),
    /// A mapping whose values may themselves be terms or functions.
    Object(BTreeMap<String, Arg>),
    /// An already-built node, passed through unchanged.
    Term(Term),
    /// A function, resolved into a `FUNC` node.
    Func(Func),
}

impl Arg {
    /// Wrap this argument into a term.
    pub fn into_term(self) -> Result<Term> {
        match self {
            Arg::Datum(datum) => {
                check_datum(&datum)?;
                Ok(Term::from_datum(datum))
            }
            Arg::Array(items) => {
                let items = items
                    .into_iter()
                    .map(Arg::into_term)
                    .collect::<Result<Vec<_>>>()?;
                Ok(Term::new(TermType::MakeArray).with_args(items))
            }
            Arg::Object(fields) => {
                let fields = fields
                    .into_iter()
                    .map(|(key, value)| value.into_term().map(|term| (key, term)))
                    .collect::<Result<BTreeMap<_, _>>>()?;
                Ok(Term::new(TermType::MakeObj).with_optargs(fields))
            }
            Arg::Term(term) => Ok(term),
            Arg::Func(func) => func.into_term(),
        }
    }

    /// Wrap an argument sitting in a function position (predicates, mappings,
    /// sort keys): an expression that reads the implicit row becomes a
    /// one-parameter lambda.
    pub fn into_func_term(self) -> Result<Term> {
        let term = self.into_term()?;
        if !term.is_func() && term.has_implicit_var() {
            Ok(func::wrap_implicit(term))
        } else {
            Ok(term)
        }
    }

    pub fn is_func(&self) -> bool {
        matches!(self, Arg::Func(_))
    }
}

fn check_datum(datum: &Datum) -> Result<()> {
    match datum {
        Datum::Number(n) if !n.is_finite() => Err(Error::InvalidArgumentType(format!(
            "non-finite number {} cannot be sent to the server",
            n
        ))),
        Datum::Array(items) => items.iter().try_for_each(check_datum),
        Datum::Object(fields) => fields.values().try_for_each(check_datum),
        _ => Ok(()),
    }
}

/// Wrap every argument of a positional list.
pub(crate) fn wrap_all<I, A>(args: I) -> Result<Vec<Term>>
where
    I: IntoIterator<Item = A>,
    A: Into<Arg>,
{
    args.into_iter().map(|arg| arg.into().into_term()).collect()
}

impl From<Datum> for Arg {
    fn from(datum: Datum) -> Self {
        Arg::Datum(datum)
    }
}

impl From<Term> for Arg {
    fn from(term: Term) -> Self {
        Arg::Term(term)
    }
}

impl From<&Term> for Arg {
    fn from(term: &Term) -> Self {
        Arg::Term(term.clone())
    }
}

impl From<Func> for Arg {
    fn from(func: Func) -> Self {
        Arg::Func(func)
    }
}

macro_rules! datum_args {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for Arg {
                fn from(value: $ty) -> Self {
                    Arg::Datum(Datum::from(value))
                }
            }
        )+
    };
}

datum_args!(bool, i32, i64, u32, u64, usize, f64, String, &str, &[u8], DateTime<FixedOffset>);

impl From<&String> for Arg {
    fn from(value: &String) -> Self {
        Arg::Datum(Datum::String(value.clone()))
    }
}

impl<T: Into<Arg>> From<Vec<T>> for Arg {
    fn from(items: Vec<T>) -> Self {
        Arg::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Arg>> From<BTreeMap<String, T>> for Arg {
    fn from(fields: BTreeMap<String, T>) -> Self {
        Arg::Object(fields.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<Arg>> From<HashMap<String, T>> for Arg {
    fn from(fields: HashMap<String, T>) -> Self {
        Arg::Object(fields.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_wraps_as_datum_leaf() {
        let term = Arg::from(42).into_term().unwrap();
        assert!(term.is_datum());
        assert_eq!(term.as_datum(), Some(&Datum::Integer(42)));
    }

    #[test]
    fn test_term_passes_through() {
        let original = Term::implicit_var();
        let term = Arg::from(original.clone()).into_term().unwrap();
        assert_eq!(term, original);
    }

    #[test]
    fn test_sequence_keeps_order() {
        let term = Arg::from(vec![3, 1, 2]).into_term().unwrap();
        assert_eq!(term.term_type(), TermType::MakeArray);
        let values: Vec<_> = term.args().iter().map(|t| t.as_datum().cloned()).collect();
        assert_eq!(
            values,
            vec![Some(Datum::Integer(3)), Some(Datum::Integer(1)), Some(Datum::Integer(2))]
        );
    }

    #[test]
    fn test_mapping_wraps_nested_terms() {
        let mut fields = BTreeMap::new();
        fields.insert("row".to_string(), Arg::from(Term::implicit_var()));
        fields.insert("n".to_string(), Arg::from(1));
        let term = Arg::Object(fields).into_term().unwrap();

        assert_eq!(term.term_type(), TermType::MakeObj);
        assert_eq!(term.optarg("row").unwrap().term_type(), TermType::ImplicitVar);
        assert!(term.optarg("n").unwrap().is_datum());
    }

    #[test]
    fn test_non_finite_numbers_are_rejected() {
        let err = Arg::from(f64::NAN).into_term().unwrap_err();
        assert!(matches!(err, Error::InvalidArgumentType(_)));

        let err = Arg::from(vec![1.0, f64::INFINITY]).into_term().unwrap_err();
        assert!(matches!(err, Error::InvalidArgumentType(_)));
    }

    #[test]
    fn test_implicit_row_in_function_position() {
        let body = Term::new(TermType::Bracket)
            .with_arg(Term::implicit_var())
            .with_arg(Term::from_datum(Datum::from("age")));
        let term = Arg::from(body.clone()).into_func_term().unwrap();

        assert!(term.is_func());
        assert_eq!(term.func_params().unwrap().len(), 1);
        assert_eq!(term.func_body(), Some(&body));
    }

    #[test]
    fn test_reql_args_macro() {
        let args = crate::reql_args![1, "two", Term::implicit_var()];
        assert_eq!(args.len(), 3);
        assert!(matches!(args[2], Arg::Term(_)));
        assert!(crate::reql_args![].is_empty());
    }
}
