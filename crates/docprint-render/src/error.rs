//! Error types for document rendering.

use thiserror::Error;

/// Errors that can occur while rendering a document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    /// A text field contains a character the standard fonts cannot draw.
    #[error("field {field} contains unsupported character {ch:?}")]
    UnsupportedCharacter { field: String, ch: char },

    /// The layout is structurally invalid (cell spans don't match columns,
    /// or the page cannot hold a single line).
    #[error("invalid layout: {0}")]
    InvalidLayout(String),
}

impl RenderError {
    /// The request field responsible for the error, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            RenderError::UnsupportedCharacter { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;
