//! # docprint
//!
//! Content-addressed invoice rendering. Every distinct transaction request is
//! rendered at most once; later requests with the same content get the stored
//! bytes back.
//!
//! ## Overview
//!
//! - **Canonicalization**: requests are encoded to deterministic CBOR, so two
//!   requests with equal content always encode to identical bytes
//! - **Fingerprints**: SHA-256 over the canonical bytes addresses the artifact
//! - **Artifact store**: one immutable entry per fingerprint, enforced by the
//!   storage backend
//! - **Generation cache**: look up, render on miss, insert, and resolve
//!   insert races in favor of the stored entry
//!
//! ## Usage
//!
//! ```rust,no_run
//! use docprint::{CacheConfig, GenerationCache};
//! use docprint::core::{Decimal, LineItem, Party, TransactionRequest};
//! use docprint::render::PdfAssembler;
//! use docprint::store::SqliteStore;
//!
//! async fn example() {
//!     let store = SqliteStore::open("docprint.db").unwrap();
//!     let cache = GenerationCache::new(store, PdfAssembler::new(), CacheConfig::default());
//!
//!     let request = TransactionRequest::new(
//!         Party::new("XYZ Pvt. Ltd.", "New Delhi, India", "29AABBCCDD121ZD"),
//!         Party::new("Vedant Computers", "New Delhi, India", "29AABBCCDD131ZD"),
//!         vec![LineItem::new(
//!             "Product 1",
//!             "12 Nos",
//!             Decimal::new(12300, 2),
//!             Decimal::new(147600, 2),
//!         )],
//!     );
//!
//!     let first = cache.get_or_generate(&request).await.unwrap();
//!     let again = cache.get_or_generate(&request).await.unwrap();
//!     assert_eq!(first.artifact, again.artifact);
//!     assert!(again.outcome.is_hit());
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `docprint::core` - Request types, canonical encoding, fingerprints
//! - `docprint::store` - Artifact store trait, SQLite and in-memory backends
//! - `docprint::render` - Invoice layout and PDF writer

pub mod cache;
pub mod error;

// Re-export component crates
pub use docprint_core as core;
pub use docprint_render as render;
pub use docprint_store as store;

// Re-export main types for convenience
pub use cache::{CacheConfig, GenerationCache, Generated, Outcome};
pub use error::{CacheError, Result};

// Re-export commonly used component types
pub use docprint_core::{Artifact, Fingerprint, TransactionRequest};
pub use docprint_render::{Assembler, PdfAssembler};
pub use docprint_store::{ArtifactStore, InsertResult, MemoryStore, SqliteStore};
