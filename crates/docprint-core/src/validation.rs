//! Request validation: structural checks on free-text fields.
//!
//! Validation runs before fingerprinting so that a rejected request never
//! reaches the store. Font coverage is checked later by the renderer, which
//! is the only component that knows its character repertoire.

use crate::error::ValidationError;
use crate::types::TransactionRequest;

/// Upper bound on any single text field, in characters.
pub const MAX_FIELD_CHARS: usize = 512;

/// Validate a request's text fields.
///
/// This checks, for every text field in document order:
/// - No control characters (including newlines and tabs)
/// - Length within [`MAX_FIELD_CHARS`]
///
/// The first failure is returned. Empty fields are allowed.
pub fn validate_request(request: &TransactionRequest) -> Result<(), ValidationError> {
    for (field, text) in request.text_fields() {
        if let Some(c) = text.chars().find(|c| c.is_control()) {
            return Err(ValidationError::ControlCharacter {
                field,
                code: c as u32,
            });
        }

        let len = text.chars().count();
        if len > MAX_FIELD_CHARS {
            return Err(ValidationError::TooLong {
                field,
                len,
                max: MAX_FIELD_CHARS,
            });
        }
    }

    Ok(())
}
