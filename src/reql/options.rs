//! Optional arguments.
//!
//! Every operation that takes named options has its own options struct. A
//! field left as `None` is absent: it is never attached to the term and so
//! never reaches the wire. This is different from an explicit null, which
//! is written as `Some(Datum::Null.into())` where a field accepts any `Arg`.
//!
//! All option structs implement `Default` with every field absent, so
//! `r::table_create(["t"])` and
//! `r::table_create_with(["t"], TableCreateOptions::default())` build the
//! same term.

use super::arg::Arg;
use super::ast::Term;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named arguments collected for one term.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct OptArgs(BTreeMap<String, Term>);

impl OptArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `name` if `value` is present; `None` leaves it out entirely.
    pub fn set<T: Into<Arg>>(mut self, name: &str, value: Option<T>) -> Result<Self> {
        if let Some(value) = value {
            self.0.insert(name.to_string(), value.into().into_term()?);
        }
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, name: &str) -> Option<&Term> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Term)> {
        self.0.iter()
    }

    pub(crate) fn into_map(self) -> BTreeMap<String, Term> {
        self.0
    }
}

/// Conversion of an options struct into the optargs it carries.
pub trait IntoOptArgs {
    fn into_optargs(self) -> Result<OptArgs>;
}

impl Term {
    pub(crate) fn with_options<O: IntoOptArgs>(self, options: O) -> Result<Term> {
        Ok(self.with_optargs(options.into_optargs()?.into_map()))
    }
}

impl IntoOptArgs for OptArgs {
    fn into_optargs(self) -> Result<OptArgs> {
        Ok(self)
    }
}

macro_rules! string_option {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl From<$name> for Arg {
            fn from(value: $name) -> Self {
                Arg::from(value.as_str())
            }
        }
    };
}

string_option!(
    /// Write durability.
    Durability { Hard => "hard", Soft => "soft" }
);

string_option!(
    /// Read consistency for table reads.
    ReadMode { Single => "single", Majority => "majority", Outdated => "outdated" }
);

string_option!(
    /// What `insert` does when the primary key already exists.
    Conflict { Error => "error", Replace => "replace", Update => "update" }
);

string_option!(
    /// Whether a range endpoint is included.
    Bound { Open => "open", Closed => "closed" }
);

string_option!(
    /// How `http` interprets the response body.
    ResultFormat { Text => "text", Json => "json", Jsonp => "jsonp", Binary => "binary", Auto => "auto" }
);

string_option!(
    /// HTTP method for `http`.
    HttpMethod { Get => "GET", Post => "POST", Put => "PUT", Patch => "PATCH", Delete => "DELETE", Head => "HEAD" }
);

macro_rules! options {
    ($(#[$meta:meta])* $name:ident { $($field:ident : $ty:ty),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Default, Clone, PartialEq)]
        pub struct $name {
            $(pub $field: Option<$ty>),+
        }

        impl IntoOptArgs for $name {
            fn into_optargs(self) -> Result<OptArgs> {
                let optargs = OptArgs::new();
                $(let optargs = optargs.set(stringify!($field), self.$field)?;)+
                Ok(optargs)
            }
        }
    };
}

options!(
    /// Options for `r.table`.
    TableOptions { use_outdated: bool, read_mode: ReadMode }
);

options!(
    /// Options for `table_create`.
    TableCreateOptions {
        primary_key: String,
        datacenter: String,
        durability: Durability,
        shards: u32,
        replicas: u32,
    }
);

options!(
    /// Options for `r.iso8601`.
    Iso8601Options { default_timezone: String }
);

options!(
    /// Options for `r.js`; `timeout` is in seconds.
    JsOptions { timeout: f64 }
);

options!(
    /// Options for `r.random`.
    RandomOptions { float: bool }
);

options!(
    /// Options for `r.http`.
    HttpOptions {
        timeout: f64,
        attempts: u32,
        redirects: u32,
        verify: bool,
        result_format: ResultFormat,
        method: HttpMethod,
    }
);

options!(
    /// Options for `get_all`.
    GetAllOptions { index: String }
);

options!(
    /// Options for `between`.
    BetweenOptions { index: String, left_bound: Bound, right_bound: Bound }
);

options!(
    /// Options for `during`.
    DuringOptions { left_bound: Bound, right_bound: Bound }
);

options!(
    /// Options for `insert`.
    InsertOptions { durability: Durability, return_changes: bool, conflict: Conflict }
);

options!(
    /// Options for `update` and `replace`.
    WriteOptions { durability: Durability, return_changes: bool, non_atomic: bool }
);

options!(
    /// Options for `delete`.
    DeleteOptions { durability: Durability, return_changes: bool }
);

options!(
    /// Options for `eq_join`.
    EqJoinOptions { index: String }
);

options!(
    /// Options for `group`.
    GroupOptions { index: String, multi: bool }
);

/// Options for `filter`. `default` accepts any value, including an explicit
/// null, or an `r.error()` term.
#[derive(Debug, Default)]
pub struct FilterOptions {
    pub default: Option<Arg>,
}

impl IntoOptArgs for FilterOptions {
    fn into_optargs(self) -> Result<OptArgs> {
        OptArgs::new().set("default", self.default)
    }
}

/// Options for `order_by`.
#[derive(Debug, Default)]
pub struct OrderByOptions {
    /// Index name, optionally wrapped in `r.asc` / `r.desc`.
    pub index: Option<Arg>,
}

impl IntoOptArgs for OrderByOptions {
    fn into_optargs(self) -> Result<OptArgs> {
        OptArgs::new().set("index", self.index)
    }
}
