//! Transaction request value types.
//!
//! The JSON shape mirrors the invoice DTO that clients already send: party
//! fields are flattened to `seller`, `sellerAddress`, `sellerGstin` and the
//! buyer equivalents. Every field is required; there are no optional fields.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One side of the transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Party {
    pub name: String,
    pub address: String,
    /// Tax registration number (GSTIN).
    pub tax_id: String,
}

impl Party {
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        tax_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            tax_id: tax_id.into(),
        }
    }
}

/// A billed line.
///
/// `amount` is supplied by the caller and is never checked against
/// `rate × quantity`.
///
/// Decimal equality is numeric (`123.00 == 123.0`) but canonical encoding and
/// rendering keep the scale, so two such items yield different fingerprints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    /// Unit-qualified quantity, e.g. `"12 Nos"`.
    pub quantity: String,
    pub rate: Decimal,
    pub amount: Decimal,
}

impl LineItem {
    pub fn new(
        name: impl Into<String>,
        quantity: impl Into<String>,
        rate: Decimal,
        amount: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.into(),
            rate,
            amount,
        }
    }
}

/// A request to render one transaction document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "WireRequest", into = "WireRequest")]
pub struct TransactionRequest {
    pub seller: Party,
    pub buyer: Party,
    /// Line items in display order. Order is significant for fingerprints.
    pub items: Vec<LineItem>,
}

impl TransactionRequest {
    pub fn new(seller: Party, buyer: Party, items: Vec<LineItem>) -> Self {
        Self {
            seller,
            buyer,
            items,
        }
    }

    /// Every free-text field with its path, in document order.
    ///
    /// Paths look like `seller.name` or `items[2].quantity`.
    pub fn text_fields(&self) -> Vec<(String, &str)> {
        let mut fields = Vec::with_capacity(6 + self.items.len() * 2);
        for (label, party) in [("seller", &self.seller), ("buyer", &self.buyer)] {
            fields.push((format!("{label}.name"), party.name.as_str()));
            fields.push((format!("{label}.address"), party.address.as_str()));
            fields.push((format!("{label}.tax_id"), party.tax_id.as_str()));
        }
        for (i, item) in self.items.iter().enumerate() {
            fields.push((format!("items[{i}].name"), item.name.as_str()));
            fields.push((format!("items[{i}].quantity"), item.quantity.as_str()));
        }
        fields
    }
}

/// JSON representation of [`TransactionRequest`].
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct WireRequest {
    seller: String,
    seller_address: String,
    seller_gstin: String,
    buyer: String,
    buyer_address: String,
    buyer_gstin: String,
    items: Vec<LineItem>,
}

impl From<WireRequest> for TransactionRequest {
    fn from(wire: WireRequest) -> Self {
        Self {
            seller: Party::new(wire.seller, wire.seller_address, wire.seller_gstin),
            buyer: Party::new(wire.buyer, wire.buyer_address, wire.buyer_gstin),
            items: wire.items,
        }
    }
}

impl From<TransactionRequest> for WireRequest {
    fn from(request: TransactionRequest) -> Self {
        Self {
            seller: request.seller.name,
            seller_address: request.seller.address,
            seller_gstin: request.seller.tax_id,
            buyer: request.buyer.name,
            buyer_address: request.buyer.address,
            buyer_gstin: request.buyer.tax_id,
            items: request.items,
        }
    }
}
