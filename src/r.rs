//! Top-level query constructors, the `r.*` namespace of the query language.
//!
//! Each constructor takes its positional arguments as any iterable of values
//! convertible into [`Arg`], checks how many it received, runs them through
//! the resolver and returns exactly one node. Operations with named options
//! have a `*_with` twin taking the operation's options struct; the plain form
//! is the same as passing `Default::default()`.
//!
//! ```rust,ignore
//! use photondb_reql::{r, reql_args};
//!
//! let query = r::branch(reql_args![
//!     r::gt([r::row().bracket("age")?, r::expr(18)?])?,
//!     "adult",
//!     "minor",
//! ])?;
//! ```
//!
//! Heterogeneous argument lists are easiest to write with `reql_args!`.

use crate::error::{Error, Result};
use crate::reql::arg::{wrap_all, Arg};
use crate::reql::options::{
    HttpOptions, Iso8601Options, JsOptions, RandomOptions, TableCreateOptions, TableOptions,
};
use crate::reql::time::{parse_timezone, TimeName, Timezone};
use crate::reql::{Datum, Func, Term, TermType};

pub const MONDAY: TimeName = TimeName::Monday;
pub const TUESDAY: TimeName = TimeName::Tuesday;
pub const WEDNESDAY: TimeName = TimeName::Wednesday;
pub const THURSDAY: TimeName = TimeName::Thursday;
pub const FRIDAY: TimeName = TimeName::Friday;
pub const SATURDAY: TimeName = TimeName::Saturday;
pub const SUNDAY: TimeName = TimeName::Sunday;
pub const JANUARY: TimeName = TimeName::January;
pub const FEBRUARY: TimeName = TimeName::February;
pub const MARCH: TimeName = TimeName::March;
pub const APRIL: TimeName = TimeName::April;
pub const MAY: TimeName = TimeName::May;
pub const JUNE: TimeName = TimeName::June;
pub const JULY: TimeName = TimeName::July;
pub const AUGUST: TimeName = TimeName::August;
pub const SEPTEMBER: TimeName = TimeName::September;
pub const OCTOBER: TimeName = TimeName::October;
pub const NOVEMBER: TimeName = TimeName::November;
pub const DECEMBER: TimeName = TimeName::December;

/// How many positional arguments an operation accepts.
#[derive(Debug, Clone, Copy)]
enum Arity {
    Exactly(usize),
    AtLeast(usize),
    Between(usize, usize),
    OneOf(&'static [usize]),
    /// Odd count, at least the given minimum.
    Odd(usize),
    Even,
}

impl Arity {
    fn accepts(self, n: usize) -> bool {
        match self {
            Arity::Exactly(k) => n == k,
            Arity::AtLeast(k) => n >= k,
            Arity::Between(lo, hi) => (lo..=hi).contains(&n),
            Arity::OneOf(allowed) => allowed.contains(&n),
            Arity::Odd(min) => n >= min && n % 2 == 1,
            Arity::Even => n % 2 == 0,
        }
    }

    fn describe(self) -> String {
        match self {
            Arity::Exactly(1) => "exactly 1 argument".to_string(),
            Arity::Exactly(k) => format!("exactly {} arguments", k),
            Arity::AtLeast(1) => "at least 1 argument".to_string(),
            Arity::AtLeast(k) => format!("at least {} arguments", k),
            Arity::Between(lo, hi) => format!("between {} and {} arguments", lo, hi),
            Arity::OneOf(allowed) => {
                let counts: Vec<String> = allowed.iter().map(ToString::to_string).collect();
                format!("{} arguments", counts.join(" or "))
            }
            Arity::Odd(min) => format!("an odd number of arguments, at least {}", min),
            Arity::Even => "an even number of arguments".to_string(),
        }
    }
}

fn check_arity(term_type: TermType, arity: Arity, n: usize) -> Result<()> {
    if arity.accepts(n) {
        Ok(())
    } else {
        Err(Error::InvalidArgumentType(format!(
            "{} expects {}, got {}",
            term_type.name(),
            arity.describe(),
            n
        )))
    }
}

fn build<I, A>(term_type: TermType, arity: Arity, args: I) -> Result<Term>
where
    I: IntoIterator<Item = A>,
    A: Into<Arg>,
{
    let args = wrap_all(args)?;
    check_arity(term_type, arity, args.len())?;
    Ok(Term::new(term_type).with_args(args))
}

macro_rules! constructors {
    ($($(#[$meta:meta])* $name:ident => $term_type:ident, $arity:expr;)+) => {
        $(
            $(#[$meta])*
            pub fn $name<I, A>(args: I) -> Result<Term>
            where
                I: IntoIterator<Item = A>,
                A: Into<Arg>,
            {
                build(TermType::$term_type, $arity, args)
            }
        )+
    };
}

constructors! {
    db => Db, Arity::Exactly(1);
    db_create => DbCreate, Arity::Exactly(1);
    db_drop => DbDrop, Arity::Exactly(1);
    table_drop => TableDrop, Arity::Exactly(1);

    eq => Eq, Arity::AtLeast(1);
    ne => Ne, Arity::AtLeast(1);
    lt => Lt, Arity::AtLeast(1);
    le => Le, Arity::AtLeast(1);
    gt => Gt, Arity::AtLeast(1);
    ge => Ge, Arity::AtLeast(1);
    /// Logical AND; no arguments is `true`.
    and_ => And, Arity::AtLeast(0);
    /// Logical OR; no arguments is `false`.
    or_ => Or, Arity::AtLeast(0);
    not_ => Not, Arity::Exactly(1);

    add => Add, Arity::AtLeast(1);
    sub => Sub, Arity::AtLeast(1);
    mul => Mul, Arity::AtLeast(1);
    div => Div, Arity::AtLeast(1);
    mod_ => Mod, Arity::Exactly(2);

    /// `branch(test, then, [test, then, ...], else)`.
    branch => Branch, Arity::Odd(3);
    /// Raise a user error, with an optional message.
    error => Error, Arity::Between(0, 1);

    epoch_time => EpochTime, Arity::Exactly(1);

    json => Json, Arity::Exactly(1);
    literal => Literal, Arity::Between(0, 1);
    /// Build an object from alternating keys and values.
    object => Object, Arity::Even;
    /// Splice an array into the argument list of the enclosing call.
    args => Args, Arity::Exactly(1);

    type_of => TypeOf, Arity::Exactly(1);
    info => Info, Arity::Exactly(1);
}

/// Same as [`and_`].
pub fn all<I, A>(args: I) -> Result<Term>
where
    I: IntoIterator<Item = A>,
    A: Into<Arg>,
{
    and_(args)
}

/// Same as [`or_`].
pub fn any<I, A>(args: I) -> Result<Term>
where
    I: IntoIterator<Item = A>,
    A: Into<Arg>,
{
    or_(args)
}

pub fn db_list() -> Term {
    Term::new(TermType::DbList)
}

pub fn table_list() -> Term {
    Term::new(TermType::TableList)
}

pub fn now() -> Term {
    Term::new(TermType::Now)
}

/// The implicit row: reads the current element inside a predicate.
pub fn row() -> Term {
    Term::implicit_var()
}

/// Wrap any value into a term.
pub fn expr<A: Into<Arg>>(value: A) -> Result<Term> {
    value.into().into_term()
}

/// A binary value; sent as a `BINARY` pseudo-type.
pub fn binary(bytes: &[u8]) -> Term {
    Term::leaf(Datum::Binary(bytes.to_vec()))
}

pub fn func0<F, R>(f: F) -> Func
where
    F: FnOnce() -> Result<R> + 'static,
    R: Into<Arg>,
{
    Func::nullary(f)
}

pub fn func<F, R>(f: F) -> Func
where
    F: FnOnce(Term) -> Result<R> + 'static,
    R: Into<Arg>,
{
    Func::unary(f)
}

pub fn func2<F, R>(f: F) -> Func
where
    F: FnOnce(Term, Term) -> Result<R> + 'static,
    R: Into<Arg>,
{
    Func::binary(f)
}

pub fn func3<F, R>(f: F) -> Func
where
    F: FnOnce(Term, Term, Term) -> Result<R> + 'static,
    R: Into<Arg>,
{
    Func::ternary(f)
}

pub fn table<I, A>(args: I) -> Result<Term>
where
    I: IntoIterator<Item = A>,
    A: Into<Arg>,
{
    table_with(args, TableOptions::default())
}

pub fn table_with<I, A>(args: I, options: TableOptions) -> Result<Term>
where
    I: IntoIterator<Item = A>,
    A: Into<Arg>,
{
    build(TermType::Table, Arity::Exactly(1), args)?.with_options(options)
}

pub fn table_create<I, A>(args: I) -> Result<Term>
where
    I: IntoIterator<Item = A>,
    A: Into<Arg>,
{
    table_create_with(args, TableCreateOptions::default())
}

pub fn table_create_with<I, A>(args: I, options: TableCreateOptions) -> Result<Term>
where
    I: IntoIterator<Item = A>,
    A: Into<Arg>,
{
    build(TermType::TableCreate, Arity::Exactly(1), args)?.with_options(options)
}

/// `time(year, month, day, timezone)` or
/// `time(year, month, day, hour, minute, second, timezone)`.
pub fn time<I, A>(args: I) -> Result<Term>
where
    I: IntoIterator<Item = A>,
    A: Into<Arg>,
{
    build(TermType::Time, Arity::OneOf(&[4, 7]), args)
}

pub fn iso8601<I, A>(args: I) -> Result<Term>
where
    I: IntoIterator<Item = A>,
    A: Into<Arg>,
{
    iso8601_with(args, Iso8601Options::default())
}

pub fn iso8601_with<I, A>(args: I, options: Iso8601Options) -> Result<Term>
where
    I: IntoIterator<Item = A>,
    A: Into<Arg>,
{
    build(TermType::Iso8601, Arity::Exactly(1), args)?.with_options(options)
}

/// Parse `"Z"`, `"±HH"`, `"±HHMM"` or `"±HH:MM"` into a time zone value.
pub fn make_timezone(spec: &str) -> Result<Timezone> {
    parse_timezone(spec)
}

/// Server-side JavaScript.
pub fn js<I, A>(args: I) -> Result<Term>
where
    I: IntoIterator<Item = A>,
    A: Into<Arg>,
{
    js_with(args, JsOptions::default())
}

pub fn js_with<I, A>(args: I, options: JsOptions) -> Result<Term>
where
    I: IntoIterator<Item = A>,
    A: Into<Arg>,
{
    build(TermType::Javascript, Arity::Exactly(1), args)?.with_options(options)
}

pub fn http<I, A>(args: I) -> Result<Term>
where
    I: IntoIterator<Item = A>,
    A: Into<Arg>,
{
    http_with(args, HttpOptions::default())
}

pub fn http_with<I, A>(args: I, options: HttpOptions) -> Result<Term>
where
    I: IntoIterator<Item = A>,
    A: Into<Arg>,
{
    let args: Vec<Arg> = args.into_iter().map(Into::into).collect();
    check_arity(TermType::Http, Arity::Exactly(1), args.len())?;
    let url = args
        .into_iter()
        .map(Arg::into_func_term)
        .collect::<Result<Vec<_>>>()?;
    Term::new(TermType::Http).with_args(url).with_options(options)
}

/// `random()`, `random(max)` or `random(min, max)`.
pub fn random<I, A>(args: I) -> Result<Term>
where
    I: IntoIterator<Item = A>,
    A: Into<Arg>,
{
    random_with(args, RandomOptions::default())
}

pub fn random_with<I, A>(args: I, options: RandomOptions) -> Result<Term>
where
    I: IntoIterator<Item = A>,
    A: Into<Arg>,
{
    build(TermType::Random, Arity::Between(0, 2), args)?.with_options(options)
}

/// Ascending sort key. A field name becomes `row => row[field]`.
pub fn asc<I, A>(args: I) -> Result<Term>
where
    I: IntoIterator<Item = A>,
    A: Into<Arg>,
{
    ordering(TermType::Asc, args)
}

/// Descending sort key. A field name becomes `row => row[field]`.
pub fn desc<I, A>(args: I) -> Result<Term>
where
    I: IntoIterator<Item = A>,
    A: Into<Arg>,
{
    ordering(TermType::Desc, args)
}

fn ordering<I, A>(term_type: TermType, args: I) -> Result<Term>
where
    I: IntoIterator<Item = A>,
    A: Into<Arg>,
{
    let args: Vec<Arg> = args.into_iter().map(Into::into).collect();
    check_arity(term_type, Arity::Exactly(1), args.len())?;
    let keys = args.into_iter().map(sort_key).collect::<Result<Vec<_>>>()?;
    Ok(Term::new(term_type).with_args(keys))
}

fn sort_key(key: Arg) -> Result<Term> {
    match key {
        Arg::Datum(Datum::String(field)) => Func::unary(move |row| row.bracket(field)).into_term(),
        other => other.into_func_term(),
    }
}

/// `do_(args..., func)`: call the trailing function with the preceding
/// arguments. On the wire the function comes first.
pub fn do_<I, A>(args: I) -> Result<Term>
where
    I: IntoIterator<Item = A>,
    A: Into<Arg>,
{
    let mut args: Vec<Arg> = args.into_iter().map(Into::into).collect();
    check_arity(TermType::Funcall, Arity::AtLeast(1), args.len())?;

    let func = match args.pop() {
        Some(func) => func,
        None => return Err(Error::InvalidArgumentType("FUNCALL expects a function".into())),
    };
    let func = func.into_func_term()?;
    check_call_arity(&func, args.len())?;

    let rest = args.into_iter().map(Arg::into_term).collect::<Result<Vec<_>>>()?;
    Ok(Term::new(TermType::Funcall).with_arg(func).with_args(rest))
}

/// Arity is checked on the resolved `FUNC`, so a zero-arity lambda that
/// reads the implicit row counts as taking one argument.
pub(crate) fn check_call_arity(func: &Term, given: usize) -> Result<()> {
    match func.func_params() {
        Some(params) if params.len() != given => Err(Error::InvalidArgumentType(format!(
            "FUNCALL function takes {} parameters but {} arguments were given",
            params.len(),
            given
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reql_args;

    fn arity_error(result: Result<Term>) -> bool {
        matches!(result, Err(Error::InvalidArgumentType(_)))
    }

    #[test]
    fn test_constructor_tags() {
        assert_eq!(eq([1, 1]).unwrap().term_type(), TermType::Eq);
        assert_eq!(db_create(["app"]).unwrap().term_type(), TermType::DbCreate);
        assert_eq!(table_list().term_type(), TermType::TableList);
        assert_eq!(mod_([7, 2]).unwrap().term_type(), TermType::Mod);
        assert_eq!(now().term_type(), TermType::Now);
    }

    #[test]
    fn test_arity_validation() {
        assert!(arity_error(eq(Vec::<i32>::new())));
        assert!(arity_error(not_([true, false])));
        assert!(arity_error(mod_([1])));
        assert!(arity_error(branch([true, false])));
        assert!(arity_error(branch([true, false, true, false])));
        assert!(arity_error(error(["a", "b"])));
        assert!(arity_error(time([2024, 1, 1])));
        assert!(arity_error(time([2024, 1, 1, 0, 0])));
        assert!(arity_error(object(["a"])));
        assert!(arity_error(table(Vec::<&str>::new())));
        assert!(arity_error(random([1, 2, 3])));
    }

    #[test]
    fn test_variadic_constructors_accept_their_ranges() {
        assert!(and_(Vec::<bool>::new()).is_ok());
        assert!(or_([true, false, true]).is_ok());
        assert!(error(Vec::<&str>::new()).is_ok());
        assert!(branch([true, false, true, false, true]).is_ok());
        assert!(object(Vec::<&str>::new()).is_ok());
        assert!(time(reql_args![2024, 1, 1, 12, 30, 0.5, "Z"]).is_ok());
    }

    #[test]
    fn test_error_message_names_operation() {
        let err = mod_([1, 2, 3]).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidArgumentType("MOD expects exactly 2 arguments, got 3".into())
        );
    }

    #[test]
    fn test_asc_wraps_field_name() {
        let key = asc(["name"]).unwrap();
        let lambda = key.first_arg().unwrap();
        assert!(lambda.is_func());

        let params = lambda.func_params().unwrap();
        let body = lambda.func_body().unwrap();
        assert_eq!(body.term_type(), TermType::Bracket);
        assert_eq!(body.first_arg().unwrap().var_id(), Some(params[0]));
        assert_eq!(body.arg(1).unwrap().as_datum(), Some(&Datum::from("name")));
    }

    #[test]
    fn test_desc_keeps_existing_terms() {
        let key = desc([row().bracket("age").unwrap()]).unwrap();
        assert_eq!(key.term_type(), TermType::Desc);
        assert!(key.first_arg().unwrap().is_func());

        let lambda = desc([func(|doc| doc.bracket("age"))]).unwrap();
        assert!(lambda.first_arg().unwrap().is_func());
    }

    #[test]
    fn test_do_moves_function_first() {
        let call = do_(reql_args![10, 20, func2(|a, b| a.add(b))]).unwrap();
        assert_eq!(call.term_type(), TermType::Funcall);
        assert!(call.first_arg().unwrap().is_func());
        assert_eq!(call.args().len(), 3);
        assert_eq!(call.arg(1).unwrap().as_datum(), Some(&Datum::Integer(10)));
    }

    #[test]
    fn test_do_checks_function_arity() {
        let err = do_(reql_args![10, func2(|a, b| a.add(b))]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgumentType(_)));
    }

    #[test]
    fn test_do_counts_implicit_row_parameter() {
        let err = do_([func0(|| Ok(row()))]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgumentType(_)));

        let err = do_([row().bracket("a").unwrap()]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgumentType(_)));

        let call = do_(reql_args![5, func0(|| row().add(1))]).unwrap();
        assert_eq!(call.first_arg().unwrap().func_params().unwrap().len(), 1);

        let call = do_([func0(|| Ok(1i64))]).unwrap();
        assert_eq!(call.args().len(), 1);
    }

    #[test]
    fn test_http_url_may_read_the_row() {
        let term = http([row().bracket("url").unwrap()]).unwrap();
        let url = term.first_arg().unwrap();
        assert!(url.is_func());
        assert_eq!(url.func_params().unwrap().len(), 1);

        let term = http(["https://example.com"]).unwrap();
        assert_eq!(term.first_arg().unwrap().as_datum(), Some(&Datum::from("https://example.com")));
        assert!(arity_error(http(Vec::<Arg>::new())));
    }

    #[test]
    fn test_make_timezone() {
        assert_eq!(make_timezone("-08:00").unwrap().to_string(), "-08:00");
        assert!(make_timezone("PST").is_err());

        let t = time(reql_args![2024, 1, 1, make_timezone("+01:00").unwrap()]).unwrap();
        assert_eq!(t.arg(3).unwrap().as_datum(), Some(&Datum::from("+01:00")));
    }

    #[test]
    fn test_time_name_constants() {
        assert_eq!(MONDAY.term_type(), TermType::Monday);
        let check = eq(reql_args![now().day_of_week(), MONDAY]).unwrap();
        assert_eq!(check.arg(1).unwrap().term_type(), TermType::Monday);
    }

    #[test]
    fn test_default_options_match_plain_form() {
        assert_eq!(
            table_create(["t"]).unwrap(),
            table_create_with(["t"], TableCreateOptions::default()).unwrap()
        );
        assert_eq!(
            iso8601(["2024-01-01T00:00:00Z"]).unwrap(),
            iso8601_with(["2024-01-01T00:00:00Z"], Iso8601Options::default()).unwrap()
        );
    }

    #[test]
    fn test_binary_is_datum_leaf() {
        let term = binary(b"\x00\x01");
        assert!(term.is_datum());
        assert_eq!(term.as_datum(), Some(&Datum::Binary(vec![0, 1])));
    }
}
