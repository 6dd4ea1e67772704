//! SQLite implementation of the ArtifactStore trait.
//!
//! This is the primary storage backend. It uses rusqlite with bundled
//! SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use docprint_core::{Artifact, Fingerprint};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Result, StoreError};
use crate::memory::now_millis;
use crate::migration;
use crate::traits::{ArtifactStore, CacheEntry, InsertResult};

/// How long a writer waits on another process's lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation on the connection from the blocking pool.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| StoreError::Unavailable(format!("mutex poisoned: {}", e)))?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("spawn_blocking failed: {}", e)))?
    }
}

// Helper to convert a row to CacheEntry
fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<(Vec<u8>, Vec<u8>, i64, i64)> {
    Ok((
        row.get("fingerprint")?,
        row.get("artifact")?,
        row.get("byte_len")?,
        row.get("created_at")?,
    ))
}

fn decode_entry(
    (fingerprint, artifact, byte_len, created_at): (Vec<u8>, Vec<u8>, i64, i64),
) -> Result<CacheEntry> {
    let fingerprint = Fingerprint::try_from(fingerprint.as_slice())
        .map_err(|_| StoreError::InvalidData("fingerprint is not 32 bytes".into()))?;

    if byte_len != artifact.len() as i64 {
        return Err(StoreError::InvalidData(format!(
            "artifact {} is {} bytes, expected {}",
            fingerprint,
            artifact.len(),
            byte_len
        )));
    }

    Ok(CacheEntry {
        fingerprint,
        artifact: Artifact::from(artifact),
        created_at,
    })
}

#[async_trait]
impl ArtifactStore for SqliteStore {
    async fn lookup(&self, fingerprint: &Fingerprint) -> Result<Option<Artifact>> {
        let fingerprint = *fingerprint;

        self.run(move |conn| {
            let artifact: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT artifact FROM artifacts WHERE fingerprint = ?1",
                    params![fingerprint.as_bytes().as_slice()],
                    |row| row.get(0),
                )
                .optional()?;

            Ok(artifact.map(Artifact::from))
        })
        .await
    }

    async fn insert(
        &self,
        fingerprint: &Fingerprint,
        artifact: &Artifact,
    ) -> Result<InsertResult> {
        let fingerprint = *fingerprint;
        let artifact = artifact.clone();

        self.run(move |conn| {
            // The primary key decides the winner; a losing writer changes
            // no rows and the stored artifact is untouched.
            let changed = conn.execute(
                "INSERT INTO artifacts (fingerprint, artifact, byte_len, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(fingerprint) DO NOTHING",
                params![
                    fingerprint.as_bytes().as_slice(),
                    artifact.as_bytes(),
                    artifact.len() as i64,
                    now_millis(),
                ],
            )?;

            if changed == 0 {
                tracing::debug!(%fingerprint, "artifact already stored");
                Ok(InsertResult::AlreadyExists)
            } else {
                Ok(InsertResult::Inserted)
            }
        })
        .await
    }

    async fn entry(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>> {
        let fingerprint = *fingerprint;

        self.run(move |conn| {
            let row = conn
                .query_row(
                    "SELECT fingerprint, artifact, byte_len, created_at
                     FROM artifacts WHERE fingerprint = ?1",
                    params![fingerprint.as_bytes().as_slice()],
                    row_to_entry,
                )
                .optional()?;

            row.map(decode_entry).transpose()
        })
        .await
    }

    async fn contains(&self, fingerprint: &Fingerprint) -> Result<bool> {
        let fingerprint = *fingerprint;

        self.run(move |conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM artifacts WHERE fingerprint = ?1)",
                params![fingerprint.as_bytes().as_slice()],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
        .await
    }

    async fn count(&self) -> Result<u64> {
        self.run(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM artifacts", [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(byte: u8) -> Fingerprint {
        Fingerprint::from_bytes([byte; 32])
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let store = SqliteStore::open_memory().unwrap();
        let artifact = Artifact::from(b"%PDF-1.4 test".to_vec());

        assert_eq!(store.lookup(&fp(1)).await.unwrap(), None);

        let result = store.insert(&fp(1), &artifact).await.unwrap();
        assert_eq!(result, InsertResult::Inserted);

        assert_eq!(store.lookup(&fp(1)).await.unwrap(), Some(artifact));
        assert!(store.contains(&fp(1)).await.unwrap());
        assert!(!store.contains(&fp(2)).await.unwrap());
    }

    #[tokio::test]
    async fn test_idempotent_insert() {
        let store = SqliteStore::open_memory().unwrap();
        let artifact = Artifact::from(b"doc".to_vec());

        let r1 = store.insert(&fp(1), &artifact).await.unwrap();
        assert_eq!(r1, InsertResult::Inserted);

        let r2 = store.insert(&fp(1), &artifact).await.unwrap();
        assert_eq!(r2, InsertResult::AlreadyExists);

        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_existing_entry_never_overwritten() {
        let store = SqliteStore::open_memory().unwrap();
        let first = Artifact::from(b"first".to_vec());
        let second = Artifact::from(b"second, longer".to_vec());

        store.insert(&fp(3), &first).await.unwrap();
        let result = store.insert(&fp(3), &second).await.unwrap();

        assert_eq!(result, InsertResult::AlreadyExists);
        assert_eq!(store.lookup(&fp(3)).await.unwrap(), Some(first));
    }

    #[tokio::test]
    async fn test_entry_metadata() {
        let store = SqliteStore::open_memory().unwrap();
        let artifact = Artifact::from(vec![0u8; 1024]);
        store.insert(&fp(4), &artifact).await.unwrap();

        let entry = store.entry(&fp(4)).await.unwrap().unwrap();
        assert_eq!(entry.fingerprint, fp(4));
        assert_eq!(entry.artifact.len(), 1024);
        assert!(entry.created_at > 0);

        assert!(store.entry(&fp(5)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifacts.db");
        let artifact = Artifact::from(b"durable".to_vec());

        {
            let store = SqliteStore::open(&path).unwrap();
            store.insert(&fp(6), &artifact).await.unwrap();
        }

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.lookup(&fp(6)).await.unwrap(), Some(artifact));
        assert_eq!(reopened.count().await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_two_connections_single_winner() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.db");

        let a = Arc::new(SqliteStore::open(&path).unwrap());
        let b = Arc::new(SqliteStore::open(&path).unwrap());

        let ta = {
            let a = Arc::clone(&a);
            tokio::spawn(async move { a.insert(&fp(8), &Artifact::from(b"a".to_vec())).await })
        };
        let tb = {
            let b = Arc::clone(&b);
            tokio::spawn(async move { b.insert(&fp(8), &Artifact::from(b"b".to_vec())).await })
        };

        let ra = ta.await.unwrap().unwrap();
        let rb = tb.await.unwrap().unwrap();

        let winners = [ra, rb]
            .iter()
            .filter(|r| **r == InsertResult::Inserted)
            .count();
        assert_eq!(winners, 1);
        assert_eq!(a.count().await.unwrap(), 1);
        assert_eq!(a.lookup(&fp(8)).await.unwrap(), b.lookup(&fp(8)).await.unwrap());
    }

    #[tokio::test]
    async fn test_length_mismatch_reported() {
        let store = SqliteStore::open_memory().unwrap();
        store
            .insert(&fp(9), &Artifact::from(b"abc".to_vec()))
            .await
            .unwrap();

        store
            .run(|conn| {
                conn.execute("UPDATE artifacts SET byte_len = 99", [])?;
                Ok(())
            })
            .await
            .unwrap();

        assert!(matches!(
            store.entry(&fp(9)).await,
            Err(StoreError::InvalidData(_))
        ));
    }
}
