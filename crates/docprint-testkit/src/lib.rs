//! # docprint testkit
//!
//! Testing utilities for docprint.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Requests with known canonical lengths and fingerprints
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Sample requests and instrumented test doubles
//!
//! ## Golden Vectors
//!
//! Golden vectors pin the canonical encoding. Any change to it shows up as a
//! fingerprint mismatch:
//!
//! ```rust
//! use docprint_testkit::vectors::all_vectors;
//!
//! for vector in all_vectors() {
//!     let fingerprint = docprint_core::fingerprint_request(&vector.request());
//!     assert_eq!(fingerprint.to_hex(), vector.fingerprint);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use docprint_testkit::generators::transaction_request;
//!
//! proptest! {
//!     #[test]
//!     fn fingerprint_is_deterministic(request in transaction_request()) {
//!         let a = docprint_core::fingerprint_request(&request);
//!         let b = docprint_core::fingerprint_request(&request.clone());
//!         prop_assert_eq!(a, b);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use docprint_render::Assembler;
//! use docprint_testkit::fixtures::{sample_request, CountingAssembler};
//!
//! let assembler = CountingAssembler::new();
//! assembler.render(&sample_request()).unwrap();
//! assert_eq!(assembler.calls(), 1);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{sample_request, CountingAssembler, UnavailableStore};
pub use generators::transaction_request;
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};
