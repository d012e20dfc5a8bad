//! Property-based tests using proptest
//!
//! Random documents must survive pack/unpack unchanged, and random garbage
//! must never be accepted as a container.

use proptest::prelude::*;
use serde_json::{Map, Number, Value};

use serum_preset::format::MAGIC_LEN;
use serum_preset::{pack, unpack, PresetDocument, PresetError, PRESET_MAGIC};

/// Strategy for JSON leaves (no NaN or infinity, which JSON cannot carry)
fn leaf_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        any::<u64>().prop_map(|n| Value::Number(n.into())),
        any::<f64>()
            .prop_filter_map("finite floats only", Number::from_f64)
            .prop_map(Value::Number),
        ".{0,24}".prop_map(Value::String),
    ]
}

/// Object keys, including the ones the payload codec gives meaning to
fn key_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-zA-Z0-9_]{0,12}",
        1 => prop_oneof![Just("$bytes"), Just("$tag"), Just("$value")].prop_map(String::from),
    ]
}

/// `{"$bytes": ..}` holding any string, base64 or not
fn bytes_lookalike_strategy() -> impl Strategy<Value = Value> {
    prop_oneof!["[A-Za-z0-9+/=]{0,12}", ".{0,12}"].prop_map(|text| {
        let mut map = Map::new();
        map.insert("$bytes".to_string(), Value::String(text));
        Value::Object(map)
    })
}

/// `{"$tag": n, "$value": inner}`, bignum tag numbers included
fn tag_lookalike_strategy(inner: impl Strategy<Value = Value>) -> impl Strategy<Value = Value> {
    let tag = prop_oneof![Just(2u64), Just(3u64), any::<u64>()];
    (tag, inner).prop_map(|(tag, inner)| {
        let mut map = Map::new();
        map.insert("$tag".to_string(), Value::Number(tag.into()));
        map.insert("$value".to_string(), inner);
        Value::Object(map)
    })
}

/// Strategy for arbitrary nested JSON values
fn json_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![4 => leaf_strategy(), 1 => bytes_lookalike_strategy()].prop_recursive(
        4,
        64,
        8,
        |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
                prop::collection::vec((key_strategy(), inner.clone()), 0..8).prop_map(
                    |entries| Value::Object(entries.into_iter().collect::<Map<String, Value>>())
                ),
                tag_lookalike_strategy(inner),
            ]
        },
    )
}

/// Strategy for base64-carried byte strings
fn bytes_strategy() -> impl Strategy<Value = Value> {
    prop::collection::vec(any::<u8>(), 0..64).prop_map(|raw| {
        use base64::Engine as _;
        let mut map = Map::new();
        map.insert(
            "$bytes".to_string(),
            Value::String(base64::engine::general_purpose::STANDARD.encode(raw)),
        );
        Value::Object(map)
    })
}

proptest! {
    /// Reader(Writer(D)) == D
    #[test]
    fn round_trip_identity(metadata in json_strategy(), data in json_strategy()) {
        let doc = PresetDocument::new(metadata, data);
        let bytes = pack(&doc).unwrap();
        prop_assert_eq!(unpack(&bytes).unwrap(), doc);
    }

    /// Byte strings nested in the payload come back as byte strings
    #[test]
    fn byte_strings_round_trip(items in prop::collection::vec(bytes_strategy(), 0..4)) {
        let doc = PresetDocument::new(Value::Null, Value::Array(items));
        let bytes = pack(&doc).unwrap();
        prop_assert_eq!(unpack(&bytes).unwrap(), doc);
    }

    /// Packing is deterministic
    #[test]
    fn pack_is_deterministic(data in json_strategy()) {
        let doc = PresetDocument::new(Value::Object(Map::new()), data);
        prop_assert_eq!(pack(&doc).unwrap(), pack(&doc).unwrap());
    }

    /// Anything not starting with the magic is a format mismatch
    #[test]
    fn wrong_magic_rejected(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        prop_assume!(bytes.len() < MAGIC_LEN || &bytes[..MAGIC_LEN] != PRESET_MAGIC);
        let is_mismatch = matches!(unpack(&bytes), Err(PresetError::FormatMismatch { .. }));
        prop_assert!(is_mismatch);
    }

    /// Garbage after a valid magic never panics and never decodes
    #[test]
    fn garbage_after_magic_rejected(tail in prop::collection::vec(any::<u8>(), 0..64)) {
        let mut bytes = PRESET_MAGIC.to_vec();
        bytes.extend_from_slice(&tail);
        prop_assert!(unpack(&bytes).is_err());
    }

    /// Every truncation of a valid container fails
    #[test]
    fn truncation_rejected(data in json_strategy(), cut in any::<prop::sample::Index>()) {
        let doc = PresetDocument::new(Value::Null, data);
        let bytes = pack(&doc).unwrap();
        let len = cut.index(bytes.len());
        prop_assert!(unpack(&bytes[..len]).is_err());
    }
}
