//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the canonical request encoding. Each records the length
//! of the canonical bytes and the resulting fingerprint; both were computed
//! with an independent CBOR encoder.

use docprint_core::{
    canonical_request_bytes, fingerprint_request, Decimal, LineItem, Party, TransactionRequest,
};

/// Party fields: name, address, tax id.
pub type PartyFields = (&'static str, &'static str, &'static str);

/// Item fields: name, quantity, rate and amount as `(mantissa, scale)`.
pub type ItemFields = (&'static str, &'static str, (i64, u32), (i64, u32));

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub seller: PartyFields,
    pub buyer: PartyFields,
    pub items: &'static [ItemFields],
    /// Expected length of the canonical encoding.
    pub canonical_len: usize,
    /// Expected fingerprint (hex).
    pub fingerprint: &'static str,
}

impl GoldenVector {
    /// Build the request this vector describes.
    pub fn request(&self) -> TransactionRequest {
        let party = |(name, address, tax_id): PartyFields| Party::new(name, address, tax_id);
        let items = self
            .items
            .iter()
            .map(|(name, quantity, (rate, rate_scale), (amount, amount_scale))| {
                LineItem::new(
                    *name,
                    *quantity,
                    Decimal::new(*rate, *rate_scale),
                    Decimal::new(*amount, *amount_scale),
                )
            })
            .collect();
        TransactionRequest::new(party(self.seller), party(self.buyer), items)
    }
}

const SELLER: PartyFields = ("XYZ Pvt. Ltd.", "New Delhi, India", "29AABBCCDD121ZD");
const BUYER: PartyFields = ("Vedant Computers", "New Delhi, India", "29AABBCCDD131ZD");
const EMPTY: PartyFields = ("", "", "");

const PRODUCT: ItemFields = ("Product 1", "12 Nos", (12300, 2), (147600, 2));
const CABLE: ItemFields = ("Cable (2m)", "3 Nos", (4550, 2), (13650, 2));

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "sample invoice",
            seller: SELLER,
            buyer: BUYER,
            items: &[PRODUCT],
            canonical_len: 222,
            fingerprint: "6b21a76f41c106144720583cd8c09ecaa57380d355a914f12e829e9fc060ac05",
        },
        GoldenVector {
            name: "rate with one fractional digit",
            seller: SELLER,
            buyer: BUYER,
            items: &[("Product 1", "12 Nos", (1230, 1), (147600, 2))],
            canonical_len: 221,
            fingerprint: "6712fcd9c611b06cd452f0ef5363febef8e65897a8fc1e6e0be043a39be46cb1",
        },
        GoldenVector {
            name: "no items",
            seller: SELLER,
            buyer: BUYER,
            items: &[],
            canonical_len: 163,
            fingerprint: "ab5840da258d51aaac90f00bdac3b466dcceda57884a737c2f93b6de23348574",
        },
        GoldenVector {
            name: "two items",
            seller: SELLER,
            buyer: BUYER,
            items: &[PRODUCT, CABLE],
            canonical_len: 279,
            fingerprint: "28910ce7a1d030a813d7d4ec6df37c93d18a12fbf4a05b4a615af233dbcd1b3d",
        },
        GoldenVector {
            name: "two items swapped",
            seller: SELLER,
            buyer: BUYER,
            items: &[CABLE, PRODUCT],
            canonical_len: 279,
            fingerprint: "d7d5fc8f7886f6d29482d8fef106e480730df3c75b7c2cb2f87ca21362babbbe",
        },
        GoldenVector {
            name: "empty strings",
            seller: EMPTY,
            buyer: EMPTY,
            items: &[],
            canonical_len: 72,
            fingerprint: "33ea2e012c1768de4fb4ebcf5576a5fcf844e1f0cf7d245114ef3397b2495e6e",
        },
        GoldenVector {
            name: "latin-1 text and negative rate",
            seller: ("Caf\u{E9} M\u{FC}ller", "Z\u{FC}rich", "CHE-123"),
            buyer: BUYER,
            items: &[("Cr\u{E8}me", "1 kg", (-25, 1), (0, 0))],
            canonical_len: 192,
            fingerprint: "8c50dbcd6dee0ed54d466d81aa8117dcf78ab8480a0f80606c42f23387195c3b",
        },
    ]
}

/// Check every vector against the current implementation.
///
/// Returns `(name, matches, actual fingerprint hex)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let request = v.request();
            let hex = fingerprint_request(&request).to_hex();
            let matches =
                hex == v.fingerprint && canonical_request_bytes(&request).len() == v.canonical_len;
            (v.name.to_string(), matches, hex)
        })
        .collect()
}
