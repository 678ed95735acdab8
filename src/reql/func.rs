//! Lambda construction.
//!
//! A [`Func`] pairs a Rust closure with the number of parameters it takes.
//! Wrapping it allocates that many fresh variable ids, calls the closure with
//! a `VAR` node per id and turns the result into the lambda body:
//!
//! ```text
//! Func::new(2, |v| ...)  =>  FUNC(MAKE_ARRAY(id1, id2), body)
//! ```
//!
//! Variable ids come from one process-wide atomic counter, so lambdas built
//! concurrently on different threads never share an id.
//!
//! While a closure runs, its parameter ids are recorded as open in a
//! thread-local scope stack. Once the body is built, every free variable in
//! it must belong to this lambda or to an enclosing lambda that is still
//! open; anything else was captured from a finished lambda and is rejected
//! with `UnboundVariable`.

use super::arg::Arg;
use super::ast::Term;
use crate::error::{Error, Result};
use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

static NEXT_VAR_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static OPEN_SCOPES: RefCell<Vec<Vec<u64>>> = const { RefCell::new(Vec::new()) };
}

/// Allocate a process-unique variable id.
pub fn next_var_id() -> u64 {
    NEXT_VAR_ID.fetch_add(1, Ordering::Relaxed)
}

type Body = Box<dyn FnOnce(&[Term]) -> Result<Arg>>;

/// A closure with an explicit arity, waiting to become a `FUNC` term.
pub struct Func {
    arity: usize,
    body: Body,
}

impl Func {
    /// Create a function taking `arity` parameters.
    ///
    /// The closure always receives exactly `arity` `VAR` terms.
    pub fn new<F, R>(arity: usize, f: F) -> Self
    where
        F: FnOnce(&[Term]) -> Result<R> + 'static,
        R: Into<Arg>,
    {
        Self {
            arity,
            body: Box::new(move |vars: &[Term]| f(vars).map(Into::into)),
        }
    }

    /// A function of no parameters. If its body reads `r::row()`, the
    /// resulting lambda takes the row as its single parameter.
    pub fn nullary<F, R>(f: F) -> Self
    where
        F: FnOnce() -> Result<R> + 'static,
        R: Into<Arg>,
    {
        Self::new(0, move |_| f())
    }

    pub fn unary<F, R>(f: F) -> Self
    where
        F: FnOnce(Term) -> Result<R> + 'static,
        R: Into<Arg>,
    {
        Self::new(1, move |vars| f(vars[0].clone()))
    }

    pub fn binary<F, R>(f: F) -> Self
    where
        F: FnOnce(Term, Term) -> Result<R> + 'static,
        R: Into<Arg>,
    {
        Self::new(2, move |vars| f(vars[0].clone(), vars[1].clone()))
    }

    pub fn ternary<F, R>(f: F) -> Self
    where
        F: FnOnce(Term, Term, Term) -> Result<R> + 'static,
        R: Into<Arg>,
    {
        Self::new(3, move |vars| f(vars[0].clone(), vars[1].clone(), vars[2].clone()))
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Resolve into a `FUNC` term.
    pub fn into_term(self) -> Result<Term> {
        let mut params: Vec<u64> = (0..self.arity).map(|_| next_var_id()).collect();
        trace!(arity = self.arity, ?params, "Allocated lambda parameters");

        let vars: Vec<Term> = params.iter().map(|id| Term::var(*id)).collect();
        let body = {
            let _scope = ScopeGuard::enter(params.clone());
            (self.body)(&vars)?.into_term()?
        };

        if params.is_empty() && body.has_implicit_var() {
            params.push(next_var_id());
        }

        for id in body.free_vars() {
            if !params.contains(&id) && !is_open(id) {
                return Err(Error::UnboundVariable(id));
            }
        }

        Ok(Term::func(&params, body))
    }
}

impl std::fmt::Debug for Func {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Func").field("arity", &self.arity).finish_non_exhaustive()
    }
}

/// Wrap an expression that reads the implicit row into a one-parameter lambda.
pub(crate) fn wrap_implicit(body: Term) -> Term {
    let id = next_var_id();
    trace!(id, "Wrapping implicit row expression");
    Term::func(&[id], body)
}

/// Marks a lambda's parameters as open for the lifetime of the guard.
struct ScopeGuard;

impl ScopeGuard {
    fn enter(params: Vec<u64>) -> Self {
        OPEN_SCOPES.with(|scopes| scopes.borrow_mut().push(params));
        ScopeGuard
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        OPEN_SCOPES.with(|scopes| {
            scopes.borrow_mut().pop();
        });
    }
}

fn is_open(id: u64) -> bool {
    OPEN_SCOPES.with(|scopes| scopes.borrow().iter().any(|params| params.contains(&id)))
}
