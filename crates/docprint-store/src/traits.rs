//! Store trait: the abstract interface for artifact persistence.
//!
//! This trait allows the generation cache to be storage-agnostic.
//! Implementations include SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use docprint_core::{Artifact, Fingerprint};

use crate::error::Result;

/// Result of inserting an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertResult {
    /// Artifact was stored under a fingerprint that had no entry.
    Inserted,
    /// An entry already exists for the fingerprint (not an error).
    ///
    /// The stored artifact was left untouched, whatever its content. Callers
    /// should re-read it and treat it as the canonical artifact.
    AlreadyExists,
}

/// A stored fingerprint/artifact pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub fingerprint: Fingerprint,
    pub artifact: Artifact,
    /// When the entry was persisted (Unix ms).
    pub created_at: i64,
}

/// The ArtifactStore trait: async interface for artifact persistence.
///
/// All methods are async to support both blocking (SQLite) and async
/// backends. For SQLite, `spawn_blocking` is used internally to avoid
/// blocking the runtime.
///
/// # Design Notes
///
/// - **Uniqueness**: at most one entry per fingerprint, enforced by the
///   backend itself so that concurrent inserts from different tasks or
///   processes cannot both win.
/// - **Immutability**: entries are never updated or deleted through this
///   interface.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Get the artifact stored under a fingerprint.
    ///
    /// A miss is `Ok(None)`, never an error.
    async fn lookup(&self, fingerprint: &Fingerprint) -> Result<Option<Artifact>>;

    /// Store an artifact under a fingerprint.
    ///
    /// # Returns
    /// - `Inserted` if no entry existed.
    /// - `AlreadyExists` if one did; the existing entry wins.
    async fn insert(&self, fingerprint: &Fingerprint, artifact: &Artifact)
        -> Result<InsertResult>;

    /// Get the full entry (with metadata) for a fingerprint.
    async fn entry(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>>;

    /// Check if an entry exists for a fingerprint.
    async fn contains(&self, fingerprint: &Fingerprint) -> Result<bool>;

    /// Number of stored entries.
    async fn count(&self) -> Result<u64>;
}

#[async_trait]
impl<S: ArtifactStore + ?Sized> ArtifactStore for std::sync::Arc<S> {
    async fn lookup(&self, fingerprint: &Fingerprint) -> Result<Option<Artifact>> {
        (**self).lookup(fingerprint).await
    }

    async fn insert(
        &self,
        fingerprint: &Fingerprint,
        artifact: &Artifact,
    ) -> Result<InsertResult> {
        (**self).insert(fingerprint, artifact).await
    }

    async fn entry(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>> {
        (**self).entry(fingerprint).await
    }

    async fn contains(&self, fingerprint: &Fingerprint) -> Result<bool> {
        (**self).contains(fingerprint).await
    }

    async fn count(&self) -> Result<u64> {
        (**self).count().await
    }
}
