//! Error types for the generation cache.

use docprint_core::{Fingerprint, ValidationError};
use docprint_render::RenderError;
use docprint_store::StoreError;
use thiserror::Error;

/// Errors that can occur while producing a document.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The request failed validation; nothing was rendered or stored.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The request could not be rendered; nothing was stored.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// An insert reported an existing entry that a follow-up read could not
    /// find. The store violated its no-delete contract.
    #[error("entry for {fingerprint} vanished after an insert conflict")]
    VanishedEntry { fingerprint: Fingerprint },
}

impl CacheError {
    /// True when the caller's request is at fault.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            CacheError::Validation(_)
                | CacheError::Render(RenderError::UnsupportedCharacter { .. })
        )
    }

    /// True when the store could not be reached; a retry may succeed.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, CacheError::Store(err) if err.is_unavailable())
    }
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let validation = CacheError::from(ValidationError::ControlCharacter {
            field: "seller.name".into(),
            code: 0x0A,
        });
        assert!(validation.is_invalid_input());
        assert!(!validation.is_unavailable());

        let unsupported = CacheError::from(RenderError::UnsupportedCharacter {
            field: "buyer.address".into(),
            ch: '\u{20B9}',
        });
        assert!(unsupported.is_invalid_input());

        let layout = CacheError::from(RenderError::InvalidLayout("bad".into()));
        assert!(!layout.is_invalid_input());

        let unavailable = CacheError::from(StoreError::Unavailable("locked".into()));
        assert!(unavailable.is_unavailable());
        assert!(!unavailable.is_invalid_input());

        let corrupt = CacheError::from(StoreError::InvalidData("short".into()));
        assert!(!corrupt.is_unavailable());
    }

    #[test]
    fn test_vanished_entry_message() {
        let err = CacheError::VanishedEntry {
            fingerprint: Fingerprint::from_bytes([0xAB; 32]),
        };
        assert!(err.to_string().contains(&"ab".repeat(32)));
    }
}
