// PhotonDB ReQL - query construction and term serialization
// Builds ReQL expression trees, encodes them for the wire and decodes responses

#![warn(rust_2018_idioms)]

pub mod config;
pub mod query;
pub mod r;
pub mod reql;
pub mod response;

// Re-exports for convenience
pub use error::{Error, Result};
pub use query::{Query, RunOptions};
pub use reql::{Arg, Datum, Func, Term, TermType};
pub use response::{deserialize, Response};

/// Error types
pub mod error {
    use crate::reql::ErrorClass;
    use thiserror::Error;

    #[derive(Error, Debug, Clone, PartialEq)]
    pub enum Error {
        /// A builder received an argument it cannot accept: wrong count,
        /// non-finite number, malformed time zone, mismatched function arity.
        #[error("Invalid argument: {0}")]
        InvalidArgumentType(String),

        /// A lambda body referenced a variable that is not in scope.
        #[error("Unbound variable: {0}")]
        UnboundVariable(u64),

        #[error("Unknown term type: {0}")]
        UnknownTermType(u64),

        /// The server reported an error for the query.
        #[error("{class}: {message}")]
        QueryExecution {
            class: ErrorClass,
            message: String,
            backtrace: Vec<serde_json::Value>,
        },

        #[error("Malformed response: {0}")]
        MalformedResponse(String),

        #[error("Malformed term: {0}")]
        MalformedTerm(String),

        #[error("Serialization error: {0}")]
        SerializationError(String),

        #[error("Configuration error: {0}")]
        Config(String),
    }

    impl Error {
        /// Stable tag for logs and metrics labels.
        pub fn class(&self) -> &'static str {
            match self {
                Error::InvalidArgumentType(_) => "invalid_argument_type",
                Error::UnboundVariable(_) => "unbound_variable",
                Error::UnknownTermType(_) => "unknown_term_type",
                Error::QueryExecution { class, .. } => class.as_str(),
                Error::MalformedResponse(_) => "malformed_response",
                Error::MalformedTerm(_) => "malformed_term",
                Error::SerializationError(_) => "serialization_error",
                Error::Config(_) => "config_error",
            }
        }

        /// True for errors reported by the server rather than raised locally.
        pub fn is_server_error(&self) -> bool {
            matches!(self, Error::QueryExecution { .. })
        }
    }

    impl From<serde_json::Error> for Error {
        fn from(err: serde_json::Error) -> Self {
            Error::SerializationError(err.to_string())
        }
    }

    impl From<::config::ConfigError> for Error {
        fn from(err: ::config::ConfigError) -> Self {
            Error::Config(err.to_string())
        }
    }

    pub type Result<T> = std::result::Result<T, Error>;
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
