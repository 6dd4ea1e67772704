//! Proptest generators for property-based testing.
//!
//! Generated text stays within printable ASCII so every request is both
//! valid and renderable.

use proptest::prelude::*;

use docprint_core::{Decimal, Fingerprint, LineItem, Party, TransactionRequest};

/// Printable ASCII text up to `max_len` characters.
pub fn text(max_len: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(0x20u8..=0x7E, 0..=max_len)
        .prop_map(|bytes| bytes.into_iter().map(char::from).collect::<String>())
}

/// A signed decimal with up to four fractional digits.
pub fn decimal() -> impl Strategy<Value = Decimal> {
    (-1_000_000_000i64..=1_000_000_000, 0u32..=4)
        .prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
}

/// Generate a random Fingerprint.
pub fn fingerprint() -> impl Strategy<Value = Fingerprint> {
    any::<[u8; 32]>().prop_map(Fingerprint::from_bytes)
}

pub fn party() -> impl Strategy<Value = Party> {
    (text(40), text(60), text(15)).prop_map(|(name, address, tax_id)| Party {
        name,
        address,
        tax_id,
    })
}

pub fn line_item() -> impl Strategy<Value = LineItem> {
    (text(30), text(12), decimal(), decimal()).prop_map(|(name, quantity, rate, amount)| {
        LineItem {
            name,
            quantity,
            rate,
            amount,
        }
    })
}

/// A request with up to `max_items` line items.
pub fn transaction_request_with(max_items: usize) -> impl Strategy<Value = TransactionRequest> {
    (
        party(),
        party(),
        prop::collection::vec(line_item(), 0..=max_items),
    )
        .prop_map(|(seller, buyer, items)| TransactionRequest::new(seller, buyer, items))
}

/// A request with a handful of line items.
pub fn transaction_request() -> impl Strategy<Value = TransactionRequest> {
    transaction_request_with(5)
}
