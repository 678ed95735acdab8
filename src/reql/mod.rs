//! ReQL (RethinkDB Query Language) expression model.
//!
//! This module holds everything needed to describe a query in memory:
//!
//! - **Term Types**: the protocol's stable integer tags (`terms.rs`)
//! - **AST**: `Term` nodes with positional and named arguments (`ast.rs`)
//! - **Datum**: native values, including times and binary data (`datum.rs`)
//! - **Arguments**: the closed `Arg` enum and lambda resolution (`arg.rs`, `func.rs`)
//! - **Options**: per-operation optional argument structs (`options.rs`)
//! - **Methods**: the chainable operation surface on `Term` (`methods.rs`)
//! - **Protocol codes**: query, response and error classifications (`types.rs`)
//!
//! # Architecture
//!
//! Construction goes through three layers:
//!
//! 1. **Builder** (`crate::r`, `methods.rs`): validates arguments per operation
//! 2. **Resolver** (`arg.rs`, `func.rs`): wraps values, lambdas and the implicit row
//! 3. **AST** (`ast.rs`): the resulting immutable tree, ready for `query::serializer`
//!
//! # Example
//!
//! ```rust,ignore
//! use photondb_reql::r;
//!
//! // r.db("test").table("users").count()
//! let query = r::db(["test"])?.table("users")?.count();
//! ```

pub mod arg;
pub mod ast;
pub mod datum;
pub mod func;
pub mod methods;
pub mod options;
pub mod terms;
pub mod time;
pub mod types;

pub use arg::Arg;
pub use ast::Term;
pub use datum::Datum;
pub use func::Func;
pub use options::*;
pub use terms::TermType;
pub use time::{parse_timezone, TimeName, Timezone};
pub use types::*;
