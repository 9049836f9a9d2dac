//! Error types for map database handling.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for database loading, combination, and serialization.
#[derive(Error, Debug)]
pub enum MapError {
    /// Malformed database text.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Two database parts with incompatible shapes were combined.
    #[error("cannot combine {left} with {right}")]
    CombineMismatch {
        left: &'static str,
        right: &'static str,
    },

    /// A type name that is neither a primitive nor a known structure.
    #[error("invalid type: {0}")]
    InvalidType(String),

    /// A record does not have the shape its category requires.
    #[error("schema violation: {0}")]
    Schema(String),

    /// A count expression could not be parsed or evaluated.
    #[error("bad expression `{expr}`: {message}")]
    Expr { expr: String, message: String },

    /// Serialized output did not re-parse to the input tree.
    #[error("round-trip validation failed for {category} database")]
    Validation { category: &'static str },

    /// No database file or directory at the expected location.
    #[error("no database found at {}", .0.display())]
    MissingDatabase(PathBuf),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MapError {
    /// Create a parse error at a 1-based line number.
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        MapError::Parse {
            line,
            message: message.into(),
        }
    }

    /// Create a schema violation error.
    pub fn schema(message: impl Into<String>) -> Self {
        MapError::Schema(message.into())
    }

    /// Create an expression error.
    pub fn expr(expr: impl Into<String>, message: impl Into<String>) -> Self {
        MapError::Expr {
            expr: expr.into(),
            message: message.into(),
        }
    }
}

/// Result type for map database operations.
pub type MapResult<T> = Result<T, MapError>;
