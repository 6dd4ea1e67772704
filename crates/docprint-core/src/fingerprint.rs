//! Request fingerprints: SHA-256 over the canonical encoding.
//!
//! A fingerprint is the content address of a [`TransactionRequest`]. The
//! cache trusts it completely: a stored artifact is served for any request
//! with the same fingerprint, without comparing request contents.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::canonical::canonical_request_bytes;
use crate::types::TransactionRequest;

/// Domain separation prefix for request fingerprints.
pub const FINGERPRINT_DOMAIN: &[u8] = b"docprint/request-fp/v1";

/// A 32-byte request fingerprint, `SHA-256(FINGERPRINT_DOMAIN || canonical)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    /// Compute the fingerprint of canonical request bytes.
    pub fn of_canonical(canonical: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(FINGERPRINT_DOMAIN);
        hasher.update(canonical);
        Self(hasher.finalize().into())
    }

    /// Create a fingerprint from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to a lowercase hex string (64 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut arr = [0u8; 32];
        hex::decode_to_slice(s, &mut arr)?;
        Ok(Self(arr))
    }
}

/// Canonicalize and fingerprint a request in one step.
pub fn fingerprint_request(request: &TransactionRequest) -> Fingerprint {
    Fingerprint::of_canonical(&canonical_request_bytes(request))
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Fingerprint {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl AsRef<[u8]> for Fingerprint {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Fingerprint {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Fingerprint {
    type Error = std::array::TryFromSliceError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; 32] = slice.try_into()?;
        Ok(Self(arr))
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LineItem, Party};
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    fn sample() -> TransactionRequest {
        TransactionRequest::new(
            Party::new("XYZ Pvt. Ltd.", "New Delhi, India", "29AABBCCDD121ZD"),
            Party::new("Vedant Computers", "New Delhi, India", "29AABBCCDD131ZD"),
            vec![LineItem::new(
                "Product 1",
                "12 Nos",
                Decimal::new(12300, 2),
                Decimal::new(147600, 2),
            )],
        )
    }

    #[test]
    fn test_fingerprint_hex_roundtrip() {
        let fp = Fingerprint::from_bytes([0x42; 32]);
        let hex = fp.to_hex();
        assert_eq!(hex.len(), 64);
        assert_eq!(Fingerprint::from_hex(&hex).unwrap(), fp);
        assert_eq!(hex.parse::<Fingerprint>().unwrap(), fp);
    }

    #[test]
    fn test_fingerprint_rejects_bad_hex() {
        assert!(Fingerprint::from_hex("abcd").is_err());
        assert!(Fingerprint::from_hex(&"zz".repeat(32)).is_err());
        assert!(Fingerprint::from_hex(&"ab".repeat(33)).is_err());
    }

    #[test]
    fn test_fingerprint_display_is_full_hex() {
        let fp = Fingerprint::from_bytes([0xab; 32]);
        assert_eq!(format!("{}", fp), "ab".repeat(32));
        assert_eq!(format!("{:?}", fp), "Fingerprint(abababababababab)");
    }

    #[test]
    fn test_fingerprint_serde_as_hex_string() {
        let fp = Fingerprint::from_bytes([0x01; 32]);
        let json = serde_json::to_string(&fp).unwrap();
        assert_eq!(json, format!("\"{}\"", "01".repeat(32)));
        assert_eq!(serde_json::from_str::<Fingerprint>(&json).unwrap(), fp);
    }

    #[test]
    fn test_domain_separated() {
        let canonical = canonical_request_bytes(&sample());
        let plain: [u8; 32] = Sha256::digest(&canonical).into();
        assert_ne!(Fingerprint::of_canonical(&canonical).0, plain);
    }

    #[test]
    fn test_changed_rate_changes_fingerprint() {
        let original = sample();
        let mut changed = sample();
        changed.items[0].rate = Decimal::new(12400, 2);

        assert_ne!(fingerprint_request(&original), fingerprint_request(&changed));
    }

    proptest! {
        #[test]
        fn fingerprint_is_deterministic(
            name in ".*",
            qty in "[0-9]{1,4} Nos",
            cents in any::<i64>(),
        ) {
            let mut request = sample();
            request.items[0].name = name;
            request.items[0].quantity = qty;
            request.items[0].amount = Decimal::new(cents, 2);

            prop_assert_eq!(fingerprint_request(&request), fingerprint_request(&request.clone()));
        }

        #[test]
        fn any_buyer_name_change_changes_fingerprint(a in ".{0,40}", b in ".{0,40}") {
            prop_assume!(a != b);
            let mut left = sample();
            left.buyer.name = a;
            let mut right = sample();
            right.buyer.name = b;

            prop_assert_ne!(fingerprint_request(&left), fingerprint_request(&right));
        }
    }
}
