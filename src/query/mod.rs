//! Query envelopes and wire encoding.
//!
//! A query sent to the server is a JSON array whose first element is the
//! query type:
//!
//! ```text
//! START         [1, <term>, {global optargs}]
//! CONTINUE      [2]
//! STOP          [3]
//! NOREPLY_WAIT  [4]
//! SERVER_INFO   [5]
//! ```
//!
//! Framing (tokens, length prefixes) belongs to the transport.

pub mod compiler;
pub mod serializer;

pub use compiler::QueryCompiler;
pub use serializer::{serialize, to_bytes};

use crate::error::Result;
use crate::r;
use crate::reql::options::{IntoOptArgs, OptArgs};
use crate::reql::{Durability, QueryType, ReadMode, Term};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

/// Global optional arguments of a START query.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Default database; sent as a `DB` term.
    pub db: Option<String>,
    pub durability: Option<Durability>,
    pub read_mode: Option<ReadMode>,
    pub noreply: Option<bool>,
    pub profile: Option<bool>,
    pub array_limit: Option<u64>,
}

impl IntoOptArgs for RunOptions {
    fn into_optargs(self) -> Result<OptArgs> {
        let db = self.db.map(|name| r::db([name])).transpose()?;
        OptArgs::new()
            .set("db", db)?
            .set("durability", self.durability)?
            .set("read_mode", self.read_mode)?
            .set("noreply", self.noreply)?
            .set("profile", self.profile)?
            .set("array_limit", self.array_limit)
    }
}

/// A query ready to be framed and sent.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Start { term: Term, options: RunOptions },
    Continue,
    Stop,
    NoreplyWait,
    ServerInfo,
}

impl Query {
    pub fn start(term: Term) -> Self {
        Query::Start {
            term,
            options: RunOptions::default(),
        }
    }

    pub fn start_with(term: Term, options: RunOptions) -> Self {
        Query::Start { term, options }
    }

    pub fn query_type(&self) -> QueryType {
        match self {
            Query::Start { .. } => QueryType::Start,
            Query::Continue => QueryType::Continue,
            Query::Stop => QueryType::Stop,
            Query::NoreplyWait => QueryType::NoreplyWait,
            Query::ServerInfo => QueryType::ServerInfo,
        }
    }

    /// True if the server will not answer this query.
    pub fn is_noreply(&self) -> bool {
        matches!(self, Query::Start { options, .. } if options.noreply == Some(true))
    }

    /// Encode as the wire value.
    #[instrument(level = "debug", skip(self), fields(query_type = ?self.query_type()))]
    pub fn to_json(&self) -> Result<Value> {
        let code = Value::from(self.query_type().code());
        let Query::Start { term, options } = self else {
            return Ok(Value::Array(vec![code]));
        };

        let mut global = Map::new();
        for (name, value) in options.clone().into_optargs()?.iter() {
            global.insert(name.clone(), serialize(value)?);
        }
        debug!(optargs = global.len(), "Encoded START query");

        Ok(Value::Array(vec![code, serialize(term)?, Value::Object(global)]))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.to_json()?)?)
    }
}
