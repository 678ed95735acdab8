//! ReQL Abstract Syntax Tree (AST) implementation.
//!
//! A query is a tree of `Term` nodes, where each node has:
//!
//! - A `TermType` specifying the operation
//! - Positional arguments (`args`): child terms, order is significant
//! - Optional named arguments (`optargs`): child terms keyed by name
//! - A datum value, only on `DATUM` leaves
//!
//! Terms are immutable once built. Application code builds them through the
//! `r` module and the chainable methods in `reql::methods`; the crate-private
//! `with_*` helpers below are what those constructors use.
//!
//! Containers never live inside a `DATUM` leaf: a sequence is a `MAKE_ARRAY`
//! node and a mapping is a `MAKE_OBJ` node whose fields are its optargs.
//!
//! # Example
//!
//! Building `r.table("users").filter({age: 25})`:
//!
//! ```rust,ignore
//! use photondb_reql::r;
//! use std::collections::BTreeMap;
//!
//! let mut filter_obj = BTreeMap::new();
//! filter_obj.insert("age".to_string(), 25);
//!
//! let query = r::table(["users"])?.filter(filter_obj)?;
//! ```

use super::datum::Datum;
use super::terms::TermType;
use std::collections::{BTreeMap, BTreeSet};

/// A ReQL Term - the fundamental building block of queries.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    term_type: TermType,
    args: Vec<Term>,
    optargs: BTreeMap<String, Term>,
    datum: Option<Datum>,
}

impl Term {
    /// Create a new term with given type
    pub(crate) fn new(term_type: TermType) -> Self {
        Self {
            term_type,
            args: Vec::new(),
            optargs: BTreeMap::new(),
            datum: None,
        }
    }

    /// Create a `DATUM` leaf holding `datum` as-is.
    pub(crate) fn leaf(datum: Datum) -> Self {
        Self {
            term_type: TermType::Datum,
            args: Vec::new(),
            optargs: BTreeMap::new(),
            datum: Some(datum),
        }
    }

    /// Build a term from a value, expanding arrays into `MAKE_ARRAY` and
    /// objects into `MAKE_OBJ` nodes.
    pub fn from_datum(datum: Datum) -> Self {
        match datum {
            Datum::Array(items) => Term::new(TermType::MakeArray)
                .with_args(items.into_iter().map(Term::from_datum).collect()),
            Datum::Object(fields) => Term::new(TermType::MakeObj).with_optargs(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, Term::from_datum(value)))
                    .collect(),
            ),
            scalar => Term::leaf(scalar),
        }
    }

    /// A reference to a bound lambda parameter.
    pub(crate) fn var(id: u64) -> Self {
        Term::new(TermType::Var).with_arg(Term::leaf(Datum::Integer(id as i64)))
    }

    /// The implicit-row placeholder.
    pub(crate) fn implicit_var() -> Self {
        Term::new(TermType::ImplicitVar)
    }

    /// A lambda: `FUNC(MAKE_ARRAY(params...), body)`.
    pub(crate) fn func(params: &[u64], body: Term) -> Self {
        let params = params
            .iter()
            .map(|id| Term::leaf(Datum::Integer(*id as i64)))
            .collect();
        Term::new(TermType::Func)
            .with_arg(Term::new(TermType::MakeArray).with_args(params))
            .with_arg(body)
    }

    /// Add a positional argument
    pub(crate) fn with_arg(mut self, arg: Term) -> Self {
        self.args.push(arg);
        self
    }

    /// Add multiple positional arguments
    pub(crate) fn with_args(mut self, args: Vec<Term>) -> Self {
        self.args.extend(args);
        self
    }

    /// Add multiple optional arguments
    pub(crate) fn with_optargs(mut self, optargs: BTreeMap<String, Term>) -> Self {
        self.optargs.extend(optargs);
        self
    }

    pub fn term_type(&self) -> TermType {
        self.term_type
    }

    pub fn args(&self) -> &[Term] {
        &self.args
    }

    pub fn optargs(&self) -> &BTreeMap<String, Term> {
        &self.optargs
    }

    /// Get the first argument
    pub fn first_arg(&self) -> Option<&Term> {
        self.args.first()
    }

    /// Get argument at index
    pub fn arg(&self, index: usize) -> Option<&Term> {
        self.args.get(index)
    }

    /// Get optional argument by name
    pub fn optarg(&self, name: &str) -> Option<&Term> {
        self.optargs.get(name)
    }

    /// Check if this is a datum term
    pub fn is_datum(&self) -> bool {
        self.term_type == TermType::Datum
    }

    /// Get datum value if this is a datum term
    pub fn as_datum(&self) -> Option<&Datum> {
        self.datum.as_ref()
    }

    pub fn is_func(&self) -> bool {
        self.term_type == TermType::Func
    }

    /// The identifier of a `VAR` node.
    pub fn var_id(&self) -> Option<u64> {
        if self.term_type != TermType::Var {
            return None;
        }
        self.first_arg()
            .and_then(Term::as_datum)
            .and_then(Datum::as_integer)
            .map(|id| id as u64)
    }

    /// The parameter identifiers of a `FUNC` node.
    pub fn func_params(&self) -> Option<Vec<u64>> {
        if !self.is_func() {
            return None;
        }
        let params = self.first_arg()?;
        if params.term_type != TermType::MakeArray {
            return None;
        }
        params
            .args
            .iter()
            .map(|p| p.as_datum().and_then(Datum::as_integer).map(|id| id as u64))
            .collect()
    }

    /// The body of a `FUNC` node.
    pub fn func_body(&self) -> Option<&Term> {
        if self.is_func() {
            self.arg(1)
        } else {
            None
        }
    }

    /// True if `IMPLICIT_VAR` appears in this tree outside any nested lambda.
    pub fn has_implicit_var(&self) -> bool {
        match self.term_type {
            TermType::ImplicitVar => true,
            TermType::Func => false,
            _ => {
                self.args.iter().any(Term::has_implicit_var)
                    || self.optargs.values().any(Term::has_implicit_var)
            }
        }
    }

    /// Variable ids referenced in this tree and not bound by a lambda inside it.
    pub fn free_vars(&self) -> BTreeSet<u64> {
        let mut free = BTreeSet::new();
        self.collect_free_vars(&mut free);
        free
    }

    fn collect_free_vars(&self, free: &mut BTreeSet<u64>) {
        match self.term_type {
            TermType::Var => {
                if let Some(id) = self.var_id() {
                    free.insert(id);
                }
            }
            TermType::Func => {
                let params = self.func_params().unwrap_or_default();
                let mut inner = BTreeSet::new();
                for child in self.args.iter().skip(1).chain(self.optargs.values()) {
                    child.collect_free_vars(&mut inner);
                }
                free.extend(inner.into_iter().filter(|id| !params.contains(id)));
            }
            _ => {
                for child in self.args.iter().chain(self.optargs.values()) {
                    child.collect_free_vars(free);
                }
            }
        }
    }

    /// Pretty print the term tree
    pub fn pretty_print(&self, indent: usize) -> String {
        let indent_str = "  ".repeat(indent);
        let mut result = format!("{}{}(", indent_str, self.term_type.name());

        if let Some(datum) = &self.datum {
            result.push_str(&datum.to_string());
        }

        if !self.args.is_empty() {
            result.push('\n');
            for (i, arg) in self.args.iter().enumerate() {
                result.push_str(&arg.pretty_print(indent + 1));
                if i < self.args.len() - 1 {
                    result.push(',');
                }
                result.push('\n');
            }
            result.push_str(&indent_str);
        }

        if !self.optargs.is_empty() {
            result.push_str(" {");
            for (key, value) in &self.optargs {
                result.push_str(&format!("\n{}  {}: ", indent_str, key));
                result.push_str(value.pretty_print(indent + 2).trim_start());
            }
            result.push_str(&format!("\n{}}}", indent_str));
        }

        result.push(')');
        result
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.pretty_print(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_creation() {
        let term = Term::new(TermType::Db);
        assert_eq!(term.term_type(), TermType::Db);
        assert!(term.args().is_empty());
    }

    #[test]
    fn test_datum_term() {
        let term = Term::from_datum(Datum::from("test"));
        assert!(term.is_datum());
        assert_eq!(term.as_datum().unwrap().as_string(), Some("test"));
    }

    #[test]
    fn test_containers_expand_into_nodes() {
        let mut obj = BTreeMap::new();
        obj.insert("tags".to_string(), Datum::Array(vec![Datum::from("a"), Datum::from(2)]));
        let term = Term::from_datum(Datum::Object(obj));

        assert_eq!(term.term_type(), TermType::MakeObj);
        let tags = term.optarg("tags").unwrap();
        assert_eq!(tags.term_type(), TermType::MakeArray);
        assert_eq!(tags.args().len(), 2);
        assert_eq!(tags.arg(1).unwrap().as_datum(), Some(&Datum::Integer(2)));
    }

    #[test]
    fn test_func_accessors() {
        let body = Term::new(TermType::Eq).with_arg(Term::var(7)).with_arg(Term::var(8));
        let func = Term::func(&[7, 8], body.clone());

        assert_eq!(func.func_params(), Some(vec![7, 8]));
        assert_eq!(func.func_body(), Some(&body));
        assert_eq!(Term::var(7).var_id(), Some(7));
        assert_eq!(body.var_id(), None);
    }

    #[test]
    fn test_free_vars_respect_nested_lambdas() {
        let inner = Term::func(&[2], Term::new(TermType::Add).with_arg(Term::var(1)).with_arg(Term::var(2)));
        let outer_body = Term::new(TermType::Map).with_arg(Term::var(3)).with_arg(inner.clone());

        assert_eq!(inner.free_vars().into_iter().collect::<Vec<_>>(), vec![1]);
        assert_eq!(outer_body.free_vars().into_iter().collect::<Vec<_>>(), vec![1, 3]);
        assert!(Term::func(&[1, 3], outer_body).free_vars().is_empty());
    }

    #[test]
    fn test_implicit_var_scan_stops_at_lambdas() {
        let direct = Term::new(TermType::Bracket)
            .with_arg(Term::implicit_var())
            .with_arg(Term::from_datum(Datum::from("age")));
        assert!(direct.has_implicit_var());

        let nested = Term::func(&[], direct.clone());
        assert!(!nested.has_implicit_var());
        assert!(!Term::from_datum(Datum::from(1)).has_implicit_var());
    }

    #[test]
    fn test_pretty_print_includes_optargs() {
        let term = Term::new(TermType::Table)
            .with_arg(Term::from_datum(Datum::from("users")))
            .with_optargs(BTreeMap::from([(
                "use_outdated".to_string(),
                Term::from_datum(Datum::from(true)),
            )]));
        let printed = term.pretty_print(0);

        assert!(printed.starts_with("TABLE("));
        assert!(printed.contains("\"users\""));
        assert!(printed.contains("use_outdated: DATUM(true)"));
    }
}
