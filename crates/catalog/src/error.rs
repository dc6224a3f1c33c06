//! Catalog error types.

use thiserror::Error;

/// Argument validation errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// The requested tool is not part of the catalog.
    #[error("tool not found: {0}")]
    UnknownTool(String),

    /// Tool arguments must be a JSON object.
    #[error("arguments for {tool} must be an object, got {found}")]
    NotAnObject { tool: String, found: &'static str },

    /// A required field was absent.
    #[error("{tool}: missing required field '{field}'")]
    MissingField { tool: String, field: String },

    /// The tool forbids fields it does not declare.
    #[error("{tool}: unknown field '{field}'")]
    UnknownField { tool: String, field: String },

    /// A field held a value of the wrong type.
    #[error("{tool}: field '{field}' must be {expected}, got {found}")]
    WrongType {
        tool: String,
        field: String,
        expected: &'static str,
        found: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
