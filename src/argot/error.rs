//! Error types for the argot engine.
//!
//! Only programmer/registration mistakes surface as [`Error`]: unknown
//! registry names, duplicate registrations, malformed trees, captures queried
//! before a successful validate. Malformed *input lines* are routine
//! interactive outcomes and are reported as `Ok(false)` plus a message
//! accessor on the grammar, never as an error value.

use std::fmt;

/// Result type alias for argot operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by grammar construction, registration and capture queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A registry or tree lookup named something that does not exist
    NotFound(String),
    /// A registration or leaf id collided with an existing one
    DuplicateItem(String),
    /// An operation ran against a grammar in the wrong state
    /// (childless intermediate node, captures queried before a match,
    /// ambiguity on empty input)
    InvalidState(String),
    /// A builder was called with arguments that can never form a valid tree
    InvalidParameters(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound(msg) => write!(f, "not found: {}", msg),
            Error::DuplicateItem(msg) => write!(f, "duplicate item: {}", msg),
            Error::InvalidState(msg) => write!(f, "invalid state: {}", msg),
            Error::InvalidParameters(msg) => write!(f, "invalid parameters: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
