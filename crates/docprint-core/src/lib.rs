//! # docprint core
//!
//! Pure primitives for docprint: transaction requests, their canonical
//! encoding, and the fingerprints derived from it.
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over request values.
//!
//! ## Key Types
//!
//! - [`TransactionRequest`] - Seller, buyer and ordered line items
//! - [`LineItem`] - One billed line (decimal rate and amount)
//! - [`Fingerprint`] - Content address of a request (SHA-256)
//! - [`Artifact`] - Opaque rendered document bytes
//!
//! ## Canonicalization
//!
//! Requests are encoded using deterministic CBOR before hashing. See the
//! [`canonical`] module.

pub mod artifact;
pub mod canonical;
pub mod error;
pub mod fingerprint;
pub mod types;
pub mod validation;

pub use artifact::Artifact;
pub use canonical::{canonical_request_bytes, decode_request, CANONICAL_VERSION};
pub use error::{CoreError, ValidationError};
pub use fingerprint::{fingerprint_request, Fingerprint, FINGERPRINT_DOMAIN};
pub use types::{LineItem, Party, TransactionRequest};
pub use validation::{validate_request, MAX_FIELD_CHARS};

pub use rust_decimal::Decimal;
