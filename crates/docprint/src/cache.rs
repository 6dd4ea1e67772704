//! The generation cache: fingerprint, look up, render on miss, store.
//!
//! Uniqueness of stored artifacts is the store's job. The cache only has to
//! resolve the race it can observe: when its insert reports an existing
//! entry, the stored artifact wins and is what the caller receives.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use docprint_core::{
    fingerprint_request, validate_request, Artifact, Fingerprint, TransactionRequest,
};
use docprint_render::Assembler;
use docprint_store::{ArtifactStore, InsertResult};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::error::{CacheError, Result};

/// Configuration for the generation cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Whether to validate requests before fingerprinting.
    pub validate_requests: bool,
    /// Whether concurrent callers with the same fingerprint wait for a
    /// single render instead of each rendering.
    pub coalesce_in_flight: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            validate_requests: true,
            coalesce_in_flight: true,
        }
    }
}

/// How a [`Generated`] artifact was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Served from the store; nothing was rendered.
    Hit,
    /// Rendered by this call and stored.
    Rendered,
    /// Rendered by this call, but another writer stored first. The stored
    /// artifact was returned.
    RaceLost,
}

impl Outcome {
    pub fn is_hit(self) -> bool {
        matches!(self, Outcome::Hit)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Hit => "hit",
            Outcome::Rendered => "rendered",
            Outcome::RaceLost => "race-lost",
        }
    }
}

/// The result of [`GenerationCache::get_or_generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub fingerprint: Fingerprint,
    /// The artifact as stored under `fingerprint`.
    pub artifact: Artifact,
    pub outcome: Outcome,
}

/// Returns the stored artifact for a request, rendering it at most once per
/// distinct request.
///
/// The store is injected at construction; nothing here is global. Rendering
/// runs on the calling task.
pub struct GenerationCache<S, A> {
    store: S,
    assembler: A,
    config: CacheConfig,
    in_flight: InFlight,
}

impl<S: ArtifactStore, A: Assembler> GenerationCache<S, A> {
    pub fn new(store: S, assembler: A, config: CacheConfig) -> Self {
        Self {
            store,
            assembler,
            config,
            in_flight: InFlight::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn assembler(&self) -> &A {
        &self.assembler
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Number of fingerprints currently being generated or waited on.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Get the artifact for a request, rendering and storing it on a miss.
    ///
    /// On a hit the stored bytes are returned unchanged and the assembler is
    /// not invoked. When another writer stores the same fingerprint first,
    /// the stored artifact is returned, never the locally rendered one.
    /// Nothing is stored when validation or rendering fails.
    pub async fn get_or_generate(&self, request: &TransactionRequest) -> Result<Generated> {
        if self.config.validate_requests {
            validate_request(request).inspect_err(|err| {
                tracing::warn!(field = err.field(), error = %err, "rejected request");
            })?;
        }

        let fingerprint = fingerprint_request(request);

        if let Some(artifact) = self.store.lookup(&fingerprint).await? {
            tracing::debug!(%fingerprint, "cache hit");
            return Ok(Generated {
                fingerprint,
                artifact,
                outcome: Outcome::Hit,
            });
        }

        if !self.config.coalesce_in_flight {
            return self.generate(fingerprint, request).await;
        }

        let _slot = self.in_flight.acquire(fingerprint).await;

        // Whoever held the slot before us has probably stored the artifact.
        if let Some(artifact) = self.store.lookup(&fingerprint).await? {
            tracing::debug!(%fingerprint, "cache hit after waiting on in-flight render");
            return Ok(Generated {
                fingerprint,
                artifact,
                outcome: Outcome::Hit,
            });
        }

        self.generate(fingerprint, request).await
    }

    /// Get a previously stored artifact without rendering.
    pub async fn get(&self, fingerprint: &Fingerprint) -> Result<Option<Artifact>> {
        Ok(self.store.lookup(fingerprint).await?)
    }

    async fn generate(
        &self,
        fingerprint: Fingerprint,
        request: &TransactionRequest,
    ) -> Result<Generated> {
        tracing::debug!(%fingerprint, "cache miss, rendering");

        let rendered = self.assembler.render(request).inspect_err(|err| {
            tracing::warn!(%fingerprint, error = %err, "render failed");
        })?;

        match self.store.insert(&fingerprint, &rendered).await? {
            InsertResult::Inserted => {
                tracing::info!(%fingerprint, bytes = rendered.len(), "stored new artifact");
                Ok(Generated {
                    fingerprint,
                    artifact: rendered,
                    outcome: Outcome::Rendered,
                })
            }
            InsertResult::AlreadyExists => {
                let stored = self
                    .store
                    .lookup(&fingerprint)
                    .await?
                    .ok_or(CacheError::VanishedEntry { fingerprint })?;
                tracing::info!(
                    %fingerprint,
                    "insert lost to a concurrent writer, using stored artifact"
                );
                Ok(Generated {
                    fingerprint,
                    artifact: stored,
                    outcome: Outcome::RaceLost,
                })
            }
        }
    }
}

/// Per-fingerprint single-flight slots.
///
/// Each fingerprint being generated has an async mutex; callers for the same
/// fingerprint queue on it while unrelated fingerprints never contend. A slot
/// counts the callers holding or waiting on it and is removed when the last
/// one leaves, including callers cancelled while still queued.
#[derive(Default)]
struct InFlight {
    slots: Mutex<HashMap<Fingerprint, Slot>>,
}

#[derive(Default)]
struct Slot {
    lock: Arc<AsyncMutex<()>>,
    users: usize,
}

impl InFlight {
    async fn acquire(&self, fingerprint: Fingerprint) -> InFlightGuard<'_> {
        let lock = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            let slot = slots.entry(fingerprint).or_default();
            slot.users += 1;
            Arc::clone(&slot.lock)
        };

        // The guard exists before the wait so that dropping this future
        // while queued still releases the registration.
        let mut guard = InFlightGuard {
            owner: self,
            fingerprint,
            held: None,
        };
        guard.held = Some(lock.lock_owned().await);
        guard
    }

    fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

struct InFlightGuard<'a> {
    owner: &'a InFlight,
    fingerprint: Fingerprint,
    held: Option<OwnedMutexGuard<()>>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        drop(self.held.take());

        let mut slots = self
            .owner
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Entry::Occupied(mut entry) = slots.entry(self.fingerprint) {
            let slot = entry.get_mut();
            slot.users -= 1;
            if slot.users == 0 {
                entry.remove();
            }
        }
    }
}
