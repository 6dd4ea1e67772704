//! In-memory implementation of the ArtifactStore trait.
//!
//! Primarily for testing and for running without a database file. It has
//! the same semantics as SQLite but keeps everything in memory.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use docprint_core::{Artifact, Fingerprint};

use crate::error::{Result, StoreError};
use crate::traits::{ArtifactStore, CacheEntry, InsertResult};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock; the
/// write lock makes check-and-insert atomic per fingerprint.
pub struct MemoryStore {
    entries: RwLock<HashMap<Fingerprint, CacheEntry>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<Fingerprint, CacheEntry>>> {
        self.entries
            .read()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<Fingerprint, CacheEntry>>> {
        self.entries
            .write()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {}", e)))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn lookup(&self, fingerprint: &Fingerprint) -> Result<Option<Artifact>> {
        let entries = self.read()?;
        Ok(entries.get(fingerprint).map(|e| e.artifact.clone()))
    }

    async fn insert(
        &self,
        fingerprint: &Fingerprint,
        artifact: &Artifact,
    ) -> Result<InsertResult> {
        let mut entries = self.write()?;

        match entries.entry(*fingerprint) {
            Entry::Occupied(_) => Ok(InsertResult::AlreadyExists),
            Entry::Vacant(slot) => {
                slot.insert(CacheEntry {
                    fingerprint: *fingerprint,
                    artifact: artifact.clone(),
                    created_at: now_millis(),
                });
                Ok(InsertResult::Inserted)
            }
        }
    }

    async fn entry(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>> {
        let entries = self.read()?;
        Ok(entries.get(fingerprint).cloned())
    }

    async fn contains(&self, fingerprint: &Fingerprint) -> Result<bool> {
        let entries = self.read()?;
        Ok(entries.contains_key(fingerprint))
    }

    async fn count(&self) -> Result<u64> {
        let entries = self.read()?;
        Ok(entries.len() as u64)
    }
}

/// Get current time in milliseconds.
pub(crate) fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn fp(byte: u8) -> Fingerprint {
        Fingerprint::from_bytes([byte; 32])
    }

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryStore::new();
        let artifact = Artifact::from(b"first".to_vec());

        assert_eq!(store.lookup(&fp(1)).await.unwrap(), None);

        let result = store.insert(&fp(1), &artifact).await.unwrap();
        assert_eq!(result, InsertResult::Inserted);

        assert_eq!(store.lookup(&fp(1)).await.unwrap(), Some(artifact));
        assert!(store.contains(&fp(1)).await.unwrap());
        assert!(!store.contains(&fp(2)).await.unwrap());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_first_insert_wins() {
        let store = MemoryStore::new();
        let first = Artifact::from(b"first".to_vec());
        let second = Artifact::from(b"second".to_vec());

        assert_eq!(store.insert(&fp(1), &first).await.unwrap(), InsertResult::Inserted);
        assert_eq!(
            store.insert(&fp(1), &second).await.unwrap(),
            InsertResult::AlreadyExists
        );

        assert_eq!(store.lookup(&fp(1)).await.unwrap(), Some(first));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_entry_metadata() {
        let store = MemoryStore::new();
        let artifact = Artifact::from(b"doc".to_vec());
        store.insert(&fp(7), &artifact).await.unwrap();

        let entry = store.entry(&fp(7)).await.unwrap().unwrap();
        assert_eq!(entry.fingerprint, fp(7));
        assert_eq!(entry.artifact, artifact);
        assert!(entry.created_at > 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_memory_store_concurrent_inserts_single_winner() {
        let store = Arc::new(MemoryStore::new());

        let tasks: Vec<_> = (0..16u8)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let artifact = Artifact::from(vec![i]);
                    store.insert(&fp(9), &artifact).await.unwrap()
                })
            })
            .collect();

        let mut inserted = 0;
        for task in tasks {
            if task.await.unwrap() == InsertResult::Inserted {
                inserted += 1;
            }
        }

        assert_eq!(inserted, 1);
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
