//! Error types for docprint core.

use thiserror::Error;

/// Errors from decoding canonical request bytes.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unsupported canonical version: {0}")]
    UnsupportedVersion(u64),

    #[error("malformed canonical request: {0}")]
    MalformedRequest(String),

    #[error("invalid decimal at {field}: {reason}")]
    InvalidDecimal { field: String, reason: String },

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// Request validation errors.
///
/// Every variant names the offending field path (e.g. `items[0].name`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} contains control character U+{code:04X}")]
    ControlCharacter { field: String, code: u32 },

    #[error("{field} is {len} characters long; at most {max} are allowed")]
    TooLong { field: String, len: usize, max: usize },
}

impl ValidationError {
    /// Path of the field that failed validation.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::ControlCharacter { field, .. }
            | ValidationError::TooLong { field, .. } => field,
        }
    }
}
