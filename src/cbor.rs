// SPDX-License-Identifier: MIT
//! CBOR encoding and decoding for the payload section
//!
//! The synth state travels as CBOR inside the container and as JSON in the
//! unpacked document. CBOR has a few shapes JSON lacks, so they get a tagged
//! object form in JSON:
//!
//! - byte strings become `{"$bytes": "<base64>"}`
//! - tagged items become `{"$tag": <n>, "$value": <item>}`
//!
//! Floats always decode to JSON floats and integers to JSON integers, so the
//! CBOR major type survives a trip through JSON text.
//!
//! When packing, an object only takes the byte-string or tag form if that
//! form decodes back to the same JSON. Anything else that merely looks like
//! one (non-canonical base64, the bignum tags) is written as an ordinary map.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use ciborium::value::{Integer, Value as CborValue};
use serde_json::{Map, Number, Value};

use crate::error::PresetError;

/// Object key marking a CBOR byte string
pub const BYTES_KEY: &str = "$bytes";

/// Object key holding a CBOR tag number
pub const TAG_KEY: &str = "$tag";

/// Object key holding the tagged item
pub const TAG_VALUE_KEY: &str = "$value";

/// Bignum tags; the decoder folds these into plain integers
const BIGNUM_TAGS: [u64; 2] = [2, 3];

/// Encode a JSON value tree to CBOR bytes
pub fn encode(value: &Value) -> Result<Vec<u8>, PresetError> {
    let item = to_cbor(value)?;
    let mut buffer = Vec::new();
    ciborium::ser::into_writer(&item, &mut buffer)
        .map_err(|e| PresetError::PayloadEncode(e.to_string()))?;
    Ok(buffer)
}

/// Decode exactly one CBOR item from `bytes` into a JSON value tree
pub fn decode(bytes: &[u8]) -> Result<Value, PresetError> {
    let mut cursor = bytes;
    let item: CborValue = ciborium::de::from_reader(&mut cursor)
        .map_err(|e| PresetError::PayloadDecode(e.to_string()))?;
    if !cursor.is_empty() {
        return Err(PresetError::PayloadDecode(format!(
            "{} trailing bytes after payload item",
            cursor.len()
        )));
    }
    from_cbor(item)
}

/// Convert a JSON value into a CBOR value
pub fn to_cbor(value: &Value) -> Result<CborValue, PresetError> {
    Ok(match value {
        Value::Null => CborValue::Null,
        Value::Bool(b) => CborValue::Bool(*b),
        Value::Number(n) => number_to_cbor(n)?,
        Value::String(s) => CborValue::Text(s.clone()),
        Value::Array(items) => {
            CborValue::Array(items.iter().map(to_cbor).collect::<Result<_, _>>()?)
        }
        Value::Object(map) => {
            if let Some(bytes) = bytes_from_object(map) {
                CborValue::Bytes(bytes)
            } else if let Some((tag, inner)) = tag_from_object(map) {
                CborValue::Tag(tag, Box::new(to_cbor(inner)?))
            } else {
                let mut entries = Vec::with_capacity(map.len());
                for (key, item) in map {
                    entries.push((CborValue::Text(key.clone()), to_cbor(item)?));
                }
                CborValue::Map(entries)
            }
        }
    })
}

/// Convert a decoded CBOR value into a JSON value
pub fn from_cbor(value: CborValue) -> Result<Value, PresetError> {
    Ok(match value {
        CborValue::Null => Value::Null,
        CborValue::Bool(b) => Value::Bool(b),
        CborValue::Integer(i) => Value::Number(integer_to_number(i)?),
        CborValue::Float(f) => Value::Number(Number::from_f64(f).ok_or_else(|| {
            PresetError::PayloadDecode(format!("non-finite float {f} has no JSON form"))
        })?),
        CborValue::Text(s) => Value::String(s),
        CborValue::Bytes(bytes) => {
            let mut map = Map::with_capacity(1);
            map.insert(BYTES_KEY.to_string(), Value::String(STANDARD.encode(bytes)));
            Value::Object(map)
        }
        CborValue::Array(items) => Value::Array(
            items
                .into_iter()
                .map(from_cbor)
                .collect::<Result<_, _>>()?,
        ),
        CborValue::Map(entries) => {
            let mut map = Map::with_capacity(entries.len());
            for (key, item) in entries {
                let key = match key {
                    CborValue::Text(key) => key,
                    other => {
                        return Err(PresetError::PayloadDecode(format!(
                            "map key {other:?} is not a text string"
                        )))
                    }
                };
                map.insert(key, from_cbor(item)?);
            }
            Value::Object(map)
        }
        CborValue::Tag(tag, inner) => {
            let mut map = Map::with_capacity(2);
            map.insert(TAG_KEY.to_string(), Value::Number(Number::from(tag)));
            map.insert(TAG_VALUE_KEY.to_string(), from_cbor(*inner)?);
            Value::Object(map)
        }
        #[allow(unreachable_patterns)]
        other => {
            return Err(PresetError::PayloadDecode(format!(
                "unsupported CBOR item {other:?}"
            )))
        }
    })
}

fn number_to_cbor(n: &Number) -> Result<CborValue, PresetError> {
    if let Some(u) = n.as_u64() {
        Ok(CborValue::Integer(Integer::from(u)))
    } else if let Some(i) = n.as_i64() {
        Ok(CborValue::Integer(Integer::from(i)))
    } else if let Some(f) = n.as_f64() {
        Ok(CborValue::Float(f))
    } else {
        Err(PresetError::PayloadEncode(format!(
            "number {n} is not representable"
        )))
    }
}

fn integer_to_number(i: Integer) -> Result<Number, PresetError> {
    let wide = i128::from(i);
    if let Ok(u) = u64::try_from(wide) {
        Ok(Number::from(u))
    } else if let Ok(s) = i64::try_from(wide) {
        Ok(Number::from(s))
    } else {
        Err(PresetError::PayloadDecode(format!(
            "integer {wide} does not fit a JSON number"
        )))
    }
}

/// `{"$bytes": "<base64>"}` with nothing else in the object
///
/// The string must be canonical padded base64, since decoding always
/// renders bytes that way.
fn bytes_from_object(map: &Map<String, Value>) -> Option<Vec<u8>> {
    if map.len() != 1 {
        return None;
    }
    let encoded = map.get(BYTES_KEY)?.as_str()?;
    let bytes = STANDARD.decode(encoded).ok()?;
    (STANDARD.encode(&bytes) == encoded).then_some(bytes)
}

/// `{"$tag": <u64>, "$value": <item>}` with nothing else in the object
fn tag_from_object(map: &Map<String, Value>) -> Option<(u64, &Value)> {
    if map.len() != 2 {
        return None;
    }
    let tag = map.get(TAG_KEY)?.as_u64()?;
    if BIGNUM_TAGS.contains(&tag) {
        return None;
    }
    let inner = map.get(TAG_VALUE_KEY)?;
    Some((tag, inner))
}
