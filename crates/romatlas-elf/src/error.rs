//! Error types for image extraction.

use thiserror::Error;

/// Error type for introspection-tool invocation and listing parsing.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The introspection tool could not be started.
    #[error("failed to run {tool}: {source}")]
    Launch {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The introspection tool ran but reported failure.
    #[error("{tool} failed ({status}): {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    /// The section-header count line is missing or unreadable.
    #[error("cannot find section header count in: {0}")]
    MissingSectionCount(String),

    /// A section listing row does not match the expected shape.
    #[error("malformed section listing at line {line}: {message}")]
    SectionListing { line: usize, message: String },

    /// A symbol listing row does not match the expected shape.
    #[error("malformed symbol listing at line {line}: {message}")]
    SymbolListing { line: usize, message: String },
}

impl ExtractError {
    pub(crate) fn section(line: usize, message: impl Into<String>) -> Self {
        ExtractError::SectionListing {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn symbol(line: usize, message: impl Into<String>) -> Self {
        ExtractError::SymbolListing {
            line,
            message: message.into(),
        }
    }
}

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;
