//! Canonical CBOR encoding of transaction requests.
//!
//! Requests are encoded as CBOR (RFC 8949) with deterministic rules:
//! - Map keys: text keys, sorted by CBOR-encoded bytes
//! - Integers: smallest valid encoding
//! - Lengths: definite only
//! - No floats: decimals are encoded as their exact text form (`123.00`)
//! - Items: array in request order
//!
//! Layout (version 1):
//!
//! ```text
//! { "v": 1,
//!   "seller": { "name": t, "address": t, "tax_id": t },
//!   "buyer":  { "name": t, "address": t, "tax_id": t },
//!   "items":  [ { "name": t, "quantity": t, "rate": t, "amount": t }, ... ] }
//! ```
//!
//! **This encoding is FROZEN for a given version.** Changing it changes every
//! fingerprint and orphans every stored artifact. Bump [`CANONICAL_VERSION`]
//! instead.

use std::str::FromStr;

use ciborium::value::Value;
use rust_decimal::Decimal;

use crate::error::CoreError;
use crate::types::{LineItem, Party, TransactionRequest};

/// Version tag written under key `"v"`.
pub const CANONICAL_VERSION: u64 = 1;

/// CBOR map key names.
mod keys {
    pub const VERSION: &str = "v";
    pub const SELLER: &str = "seller";
    pub const BUYER: &str = "buyer";
    pub const ITEMS: &str = "items";

    pub const NAME: &str = "name";
    pub const ADDRESS: &str = "address";
    pub const TAX_ID: &str = "tax_id";

    pub const QUANTITY: &str = "quantity";
    pub const RATE: &str = "rate";
    pub const AMOUNT: &str = "amount";
}

/// Encode a request to canonical CBOR bytes.
///
/// Structurally identical requests always produce identical bytes, across
/// processes and platforms.
pub fn canonical_request_bytes(request: &TransactionRequest) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_value(&mut buf, &request_to_value(request));
    buf
}

fn request_to_value(request: &TransactionRequest) -> Value {
    let items = request.items.iter().map(item_to_value).collect();

    Value::Map(vec![
        (text(keys::VERSION), Value::Integer(CANONICAL_VERSION.into())),
        (text(keys::SELLER), party_to_value(&request.seller)),
        (text(keys::BUYER), party_to_value(&request.buyer)),
        (text(keys::ITEMS), Value::Array(items)),
    ])
}

fn party_to_value(party: &Party) -> Value {
    Value::Map(vec![
        (text(keys::NAME), text(&party.name)),
        (text(keys::ADDRESS), text(&party.address)),
        (text(keys::TAX_ID), text(&party.tax_id)),
    ])
}

fn item_to_value(item: &LineItem) -> Value {
    Value::Map(vec![
        (text(keys::NAME), text(&item.name)),
        (text(keys::QUANTITY), text(&item.quantity)),
        (text(keys::RATE), Value::Text(item.rate.to_string())),
        (text(keys::AMOUNT), Value::Text(item.amount.to_string())),
    ])
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

/// Recursively encode a CBOR value.
///
/// Only the value kinds produced by [`request_to_value`] are supported.
fn encode_value(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Integer(i) => encode_integer(buf, *i),
        Value::Text(s) => encode_text(buf, s),
        Value::Array(arr) => encode_array(buf, arr),
        Value::Map(entries) => encode_map_canonical(buf, entries),
        other => unreachable!("canonical requests never contain {:?}", other),
    }
}

/// Encode a CBOR integer (major types 0 and 1).
fn encode_integer(buf: &mut Vec<u8>, i: ciborium::value::Integer) {
    let n: i128 = i.into();

    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        encode_uint(buf, 1, (-1 - n) as u64);
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a text string (major type 3).
fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

/// Encode an array (major type 4).
fn encode_array(buf: &mut Vec<u8>, arr: &[Value]) {
    encode_uint(buf, 4, arr.len() as u64);
    for item in arr {
        encode_value(buf, item);
    }
}

/// Encode a map canonically (major type 5).
///
/// Keys are sorted by their encoded byte comparison.
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(Value, Value)]) {
    let mut pairs: Vec<(Vec<u8>, &Value)> = entries
        .iter()
        .map(|(k, v)| {
            let mut key_buf = Vec::new();
            encode_value(&mut key_buf, k);
            (key_buf, v)
        })
        .collect();

    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, pairs.len() as u64);
    for (key_bytes, value) in pairs {
        buf.extend_from_slice(&key_bytes);
        encode_value(buf, value);
    }
}

/// Decode a request from canonical bytes.
///
/// Fails unless `bytes` is exactly the canonical encoding of some request:
/// re-encoding the decoded request must reproduce the input.
pub fn decode_request(bytes: &[u8]) -> Result<TransactionRequest, CoreError> {
    let value: Value =
        ciborium::from_reader(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))?;

    let map = as_map(&value, "request")?;

    let version = match get(map, keys::VERSION) {
        Some(Value::Integer(i)) => {
            let n: i128 = (*i).into();
            u64::try_from(n).map_err(|_| CoreError::MalformedRequest("negative version".into()))?
        }
        _ => return Err(CoreError::MalformedRequest("missing version".into())),
    };
    if version != CANONICAL_VERSION {
        return Err(CoreError::UnsupportedVersion(version));
    }

    let seller = decode_party(get(map, keys::SELLER), keys::SELLER)?;
    let buyer = decode_party(get(map, keys::BUYER), keys::BUYER)?;

    let items = match get(map, keys::ITEMS) {
        Some(Value::Array(arr)) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| decode_item(v, i))
            .collect::<Result<Vec<_>, _>>()?,
        _ => return Err(CoreError::MalformedRequest("missing or invalid items".into())),
    };

    let request = TransactionRequest::new(seller, buyer, items);

    if canonical_request_bytes(&request) != bytes {
        return Err(CoreError::MalformedRequest("non-canonical encoding".into()));
    }

    Ok(request)
}

fn as_map<'a>(value: &'a Value, path: &str) -> Result<&'a [(Value, Value)], CoreError> {
    match value {
        Value::Map(m) => Ok(m),
        _ => Err(CoreError::MalformedRequest(format!("{path}: expected map"))),
    }
}

fn get<'a>(map: &'a [(Value, Value)], key: &str) -> Option<&'a Value> {
    map.iter()
        .find(|(k, _)| matches!(k, Value::Text(s) if s == key))
        .map(|(_, v)| v)
}

fn get_text(map: &[(Value, Value)], key: &str, path: &str) -> Result<String, CoreError> {
    match get(map, key) {
        Some(Value::Text(s)) => Ok(s.clone()),
        _ => Err(CoreError::MalformedRequest(format!(
            "{path}.{key}: missing or not text"
        ))),
    }
}

fn get_decimal(map: &[(Value, Value)], key: &str, path: &str) -> Result<Decimal, CoreError> {
    let raw = get_text(map, key, path)?;
    Decimal::from_str(&raw).map_err(|e| CoreError::InvalidDecimal {
        field: format!("{path}.{key}"),
        reason: e.to_string(),
    })
}

fn decode_party(value: Option<&Value>, path: &str) -> Result<Party, CoreError> {
    let value = value.ok_or_else(|| CoreError::MalformedRequest(format!("missing {path}")))?;
    let map = as_map(value, path)?;

    Ok(Party {
        name: get_text(map, keys::NAME, path)?,
        address: get_text(map, keys::ADDRESS, path)?,
        tax_id: get_text(map, keys::TAX_ID, path)?,
    })
}

fn decode_item(value: &Value, index: usize) -> Result<LineItem, CoreError> {
    let path = format!("items[{index}]");
    let map = as_map(value, &path)?;

    Ok(LineItem {
        name: get_text(map, keys::NAME, &path)?,
        quantity: get_text(map, keys::QUANTITY, &path)?,
        rate: get_decimal(map, keys::RATE, &path)?,
        amount: get_decimal(map, keys::AMOUNT, &path)?,
    })
}
