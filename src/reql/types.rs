//! ReQL protocol type definitions: query kinds, response kinds, error classes.

use serde::{Deserialize, Serialize};

/// Query type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryType {
    Start,
    Continue,
    Stop,
    NoreplyWait,
    ServerInfo,
}

impl QueryType {
    pub fn code(self) -> u64 {
        match self {
            QueryType::Start => 1,
            QueryType::Continue => 2,
            QueryType::Stop => 3,
            QueryType::NoreplyWait => 4,
            QueryType::ServerInfo => 5,
        }
    }
}

/// Response type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseType {
    SuccessAtom,
    SuccessSequence,
    SuccessPartial,
    WaitComplete,
    ServerInfo,
    ClientError,
    CompileError,
    RuntimeError,
}

impl ResponseType {
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(ResponseType::SuccessAtom),
            2 => Some(ResponseType::SuccessSequence),
            3 => Some(ResponseType::SuccessPartial),
            4 => Some(ResponseType::WaitComplete),
            5 => Some(ResponseType::ServerInfo),
            16 => Some(ResponseType::ClientError),
            17 => Some(ResponseType::CompileError),
            18 => Some(ResponseType::RuntimeError),
            _ => None,
        }
    }

    pub fn code(self) -> u64 {
        match self {
            ResponseType::SuccessAtom => 1,
            ResponseType::SuccessSequence => 2,
            ResponseType::SuccessPartial => 3,
            ResponseType::WaitComplete => 4,
            ResponseType::ServerInfo => 5,
            ResponseType::ClientError => 16,
            ResponseType::CompileError => 17,
            ResponseType::RuntimeError => 18,
        }
    }

    pub fn is_error(self) -> bool {
        matches!(
            self,
            ResponseType::ClientError | ResponseType::CompileError | ResponseType::RuntimeError
        )
    }
}

/// Notes the server attaches to a response (mostly about changefeeds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseNote {
    SequenceFeed,
    AtomFeed,
    OrderByLimitFeed,
    UnionedFeed,
    IncludesStates,
}

impl ResponseNote {
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(ResponseNote::SequenceFeed),
            2 => Some(ResponseNote::AtomFeed),
            3 => Some(ResponseNote::OrderByLimitFeed),
            4 => Some(ResponseNote::UnionedFeed),
            5 => Some(ResponseNote::IncludesStates),
            _ => None,
        }
    }
}

/// Stable classification of a server-reported query error.
///
/// Client and compile errors come straight from the response type; runtime
/// errors are refined by the response's `e` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorClass {
    Client,
    Compile,
    Internal,
    ResourceLimit,
    QueryLogic,
    NonExistence,
    OpFailed,
    OpIndeterminate,
    /// Raised on purpose by an `ERROR` term in the query.
    User,
    Permission,
    /// Runtime error with a missing or unrecognized `e` field.
    Runtime,
}

impl ErrorClass {
    /// Maps a runtime error's `e` code.
    pub fn from_runtime_code(code: Option<u64>) -> Self {
        match code {
            Some(1_000_000) => ErrorClass::Internal,
            Some(2_000_000) => ErrorClass::ResourceLimit,
            Some(3_000_000) => ErrorClass::QueryLogic,
            Some(3_100_000) => ErrorClass::NonExistence,
            Some(4_100_000) => ErrorClass::OpFailed,
            Some(4_200_000) => ErrorClass::OpIndeterminate,
            Some(5_000_000) => ErrorClass::User,
            Some(6_000_000) => ErrorClass::Permission,
            _ => ErrorClass::Runtime,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::Client => "client_error",
            ErrorClass::Compile => "compile_error",
            ErrorClass::Internal => "internal_error",
            ErrorClass::ResourceLimit => "resource_limit_error",
            ErrorClass::QueryLogic => "query_logic_error",
            ErrorClass::NonExistence => "non_existence_error",
            ErrorClass::OpFailed => "op_failed_error",
            ErrorClass::OpIndeterminate => "op_indeterminate_error",
            ErrorClass::User => "user_error",
            ErrorClass::Permission => "permission_error",
            ErrorClass::Runtime => "runtime_error",
        }
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_type_codes() {
        for code in [1, 2, 3, 4, 5, 16, 17, 18] {
            let response_type = ResponseType::from_code(code).unwrap();
            assert_eq!(response_type.code(), code);
        }
        assert_eq!(ResponseType::from_code(6), None);
        assert!(ResponseType::RuntimeError.is_error());
        assert!(!ResponseType::SuccessPartial.is_error());
    }

    #[test]
    fn test_runtime_error_classes() {
        assert_eq!(ErrorClass::from_runtime_code(Some(5_000_000)), ErrorClass::User);
        assert_eq!(ErrorClass::from_runtime_code(Some(3_100_000)), ErrorClass::NonExistence);
        assert_eq!(ErrorClass::from_runtime_code(Some(42)), ErrorClass::Runtime);
        assert_eq!(ErrorClass::from_runtime_code(None), ErrorClass::Runtime);
        assert_eq!(ErrorClass::User.as_str(), "user_error");
    }
}
