//! # docprint store
//!
//! Storage abstraction for rendered artifacts. Provides a trait-based
//! interface mapping fingerprints to artifacts, with SQLite and in-memory
//! implementations.
//!
//! ## Key Types
//!
//! - [`ArtifactStore`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests and ephemeral runs
//! - [`InsertResult`] - Result of inserting an artifact
//! - [`CacheEntry`] - A stored fingerprint/artifact pair
//!
//! ## Usage
//!
//! ```rust,no_run
//! use docprint_store::{ArtifactStore, InsertResult, SqliteStore};
//! use docprint_core::{Artifact, Fingerprint};
//!
//! async fn example() {
//!     let store = SqliteStore::open("docprint.db").unwrap();
//!
//!     let fp = Fingerprint::from_bytes([0x42; 32]);
//!     let artifact = Artifact::from(b"%PDF-1.4".to_vec());
//!
//!     let result = store.insert(&fp, &artifact).await.unwrap();
//!     assert_eq!(result, InsertResult::Inserted);
//!     assert_eq!(store.lookup(&fp).await.unwrap(), Some(artifact));
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **One entry per fingerprint**: the fingerprint is the primary key
//! - **Idempotent inserts**: inserting an existing fingerprint returns
//!   `AlreadyExists` and leaves the stored artifact untouched
//! - **Misses are not errors**: `lookup` returns `Ok(None)`

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{ArtifactStore, CacheEntry, InsertResult};
