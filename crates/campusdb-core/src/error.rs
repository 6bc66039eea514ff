//! Error types for campusdb.

use crate::query::ParseError;
use std::fmt;

/// The main error type for campusdb operations.
#[derive(Debug)]
pub enum Error {
    /// The statement names a table that was never registered
    UnknownTable(String),

    /// The statement does not start with SELECT, INSERT, UPDATE or DELETE
    UnsupportedOperation(String),

    /// UPDATE or DELETE without a WHERE clause
    MissingWhereClause(&'static str),

    /// Malformed INSERT (no parameters, no column list, literal VALUES)
    InvalidInsertStatement(String),

    /// Malformed UPDATE (no SET clause, malformed assignment)
    InvalidUpdateStatement(String),

    /// Any other grammar violation
    Parse(ParseError),

    /// A user with this email is already registered
    DuplicateEmail(String),

    /// Durable write failed (storage full or unavailable)
    Storage(String),

    /// A durable slot could not be decoded. Never propagated by the loader:
    /// it is logged and the slot is treated as absent.
    StorageDecode {
        /// Durable key of the slot
        key: String,
        /// Why decoding failed
        reason: String,
    },

    /// Input rejected by a validation limit
    InvalidInput(String),

    /// I/O error
    Io(std::io::Error),

    /// Serialization error
    Serialization(String),

    /// A lock was poisoned (internal error)
    LockPoisoned,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownTable(name) => write!(f, "Table '{}' does not exist", name),
            Error::UnsupportedOperation(query) => {
                write!(f, "Unsupported SQL operation in query: {}", query)
            }
            Error::MissingWhereClause(verb) => {
                write!(f, "{} statement must include a WHERE clause", verb)
            }
            Error::InvalidInsertStatement(msg) => write!(f, "Invalid INSERT statement: {}", msg),
            Error::InvalidUpdateStatement(msg) => write!(f, "Invalid UPDATE statement: {}", msg),
            Error::Parse(e) => write!(f, "Parse error: {}", e),
            Error::DuplicateEmail(email) => write!(f, "Email already registered: {}", email),
            Error::Storage(msg) => write!(f, "Storage error: {}", msg),
            Error::StorageDecode { key, reason } => {
                write!(f, "Error decoding stored data for '{}': {}", key, reason)
            }
            Error::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            Error::LockPoisoned => write!(f, "Lock poisoned"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::UnsupportedOperation(query) => Error::UnsupportedOperation(query),
            ParseError::InvalidInsert(msg) => Error::InvalidInsertStatement(msg),
            ParseError::InvalidUpdate(msg) => Error::InvalidUpdateStatement(msg),
            other => Error::Parse(other),
        }
    }
}

/// A specialized `Result` type for campusdb operations.
pub type Result<T> = std::result::Result<T, Error>;
