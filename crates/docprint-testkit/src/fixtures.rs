//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use docprint_core::{Artifact, Decimal, Fingerprint, LineItem, Party, TransactionRequest};
use docprint_render::{Assembler, PdfAssembler, RenderError};
use docprint_store::{ArtifactStore, CacheEntry, InsertResult, StoreError};

/// The seller used by [`sample_request`].
pub fn sample_seller() -> Party {
    Party::new("XYZ Pvt. Ltd.", "New Delhi, India", "29AABBCCDD121ZD")
}

/// The buyer used by [`sample_request`].
pub fn sample_buyer() -> Party {
    Party::new("Vedant Computers", "New Delhi, India", "29AABBCCDD131ZD")
}

/// A line item with the sample quantity, rate and amount.
pub fn sample_item(name: &str) -> LineItem {
    LineItem::new(name, "12 Nos", Decimal::new(12300, 2), Decimal::new(147600, 2))
}

/// One product billed from XYZ Pvt. Ltd. to Vedant Computers.
pub fn sample_request() -> TransactionRequest {
    TransactionRequest::new(sample_seller(), sample_buyer(), vec![sample_item("Product 1")])
}

/// The sample request with a different buyer.
pub fn request_for_buyer(buyer: &str) -> TransactionRequest {
    let mut request = sample_request();
    request.buyer.name = buyer.to_string();
    request
}

/// A PDF assembler that counts how often it renders.
#[derive(Debug, Default)]
pub struct CountingAssembler {
    inner: PdfAssembler,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl CountingAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep for `delay` inside every render, widening race windows.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Number of completed or failed renders so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Assembler for CountingAssembler {
    fn render(&self, request: &TransactionRequest) -> Result<Artifact, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.inner.render(request)
    }
}

/// A store whose every operation fails as unreachable.
#[derive(Debug, Default)]
pub struct UnavailableStore;

impl UnavailableStore {
    fn error() -> StoreError {
        StoreError::Unavailable("store is offline".into())
    }
}

#[async_trait]
impl ArtifactStore for UnavailableStore {
    async fn lookup(
        &self,
        _fingerprint: &Fingerprint,
    ) -> docprint_store::Result<Option<Artifact>> {
        Err(Self::error())
    }

    async fn insert(
        &self,
        _fingerprint: &Fingerprint,
        _artifact: &Artifact,
    ) -> docprint_store::Result<InsertResult> {
        Err(Self::error())
    }

    async fn entry(
        &self,
        _fingerprint: &Fingerprint,
    ) -> docprint_store::Result<Option<CacheEntry>> {
        Err(Self::error())
    }

    async fn contains(&self, _fingerprint: &Fingerprint) -> docprint_store::Result<bool> {
        Err(Self::error())
    }

    async fn count(&self) -> docprint_store::Result<u64> {
        Err(Self::error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_request_matches_reference_invoice() {
        let request = sample_request();
        assert_eq!(request.seller.name, "XYZ Pvt. Ltd.");
        assert_eq!(request.buyer.name, "Vedant Computers");
        assert_eq!(request.items.len(), 1);
        assert_eq!(request.items[0].rate.to_string(), "123.00");
        assert_eq!(request.items[0].amount.to_string(), "1476.00");
    }

    #[test]
    fn test_counting_assembler_counts() {
        let assembler = CountingAssembler::new();
        assert_eq!(assembler.calls(), 0);

        let a = assembler.render(&sample_request()).unwrap();
        let b = assembler.render(&sample_request()).unwrap();

        assert_eq!(a, b);
        assert_eq!(assembler.calls(), 2);
    }

    #[tokio::test]
    async fn test_unavailable_store() {
        let store = UnavailableStore;
        let err = store
            .lookup(&Fingerprint::from_bytes([0; 32]))
            .await
            .unwrap_err();
        assert!(err.is_unavailable());
    }
}
