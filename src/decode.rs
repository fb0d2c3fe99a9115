//! Array decoder: tagged JSON fragments -> typed values.
//!
//! Mappings are inspected innermost first, so a fragment can never
//! contain another fragment: nested structure travels through compound
//! element types, not through mapping-in-mapping nesting.

use std::collections::BTreeMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;

use crate::array::NdArray;
use crate::dtype::ElementType;
use crate::encode::SENTINEL_KEY;
use crate::error::{ArrayJsonError, ArrayJsonResult};
use crate::hooks::{DecodeHooks, default_decode_hooks};
use crate::value::Value;

// ---------------------------------------------------------------------------
// Fragment decoding
// ---------------------------------------------------------------------------

/// Decode the payload of a recognised fragment. Empty shapes collapse
/// to a bare scalar. Each call produces an independent buffer.
pub fn decode_parts(
    payload: &str,
    dtype: ElementType,
    shape: Vec<usize>,
) -> ArrayJsonResult<Value> {
    let raw = BASE64
        .decode(payload)
        .map_err(|e| ArrayJsonError::Decode(format!("invalid base64 payload: {e}")))?;

    let item = dtype.item_size();
    if item == 0 {
        return Err(ArrayJsonError::Descriptor(
            "zero-sized element type".into(),
        ));
    }
    if raw.len() % item != 0 {
        return Err(ArrayJsonError::Decode(format!(
            "payload of {} bytes is not a multiple of item size {item}",
            raw.len()
        )));
    }

    let count = shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| ArrayJsonError::Decode(format!("shape {shape:?} overflows")))?;
    let expected = count.checked_mul(item).ok_or_else(|| {
        ArrayJsonError::Decode(format!("shape {shape:?} overflows"))
    })?;
    if raw.len() != expected {
        return Err(ArrayJsonError::ShapeMismatch {
            expected,
            actual: raw.len(),
        });
    }

    let array = NdArray::from_bytes(dtype, shape, Bytes::from(raw))?;
    if array.is_scalar() {
        Ok(Value::Scalar(array.into_scalar()?))
    } else {
        Ok(Value::Array(array))
    }
}

/// Whether a converted mapping would be treated as a fragment.
pub fn is_fragment(map: &BTreeMap<String, Value>) -> bool {
    map.contains_key(SENTINEL_KEY)
}

/// Decode a sentinel-keyed mapping. Keys beyond the three required ones
/// are ignored. Any inconsistency aborts this value's reconstruction;
/// the surrounding document is unaffected.
fn decode_mapping(map: &BTreeMap<String, Value>) -> ArrayJsonResult<Value> {
    let payload = match map.get(SENTINEL_KEY) {
        Some(Value::String(s)) => s,
        Some(other) => {
            return Err(ArrayJsonError::Decode(format!(
                "array payload must be a base64 string, got {other:?}"
            )));
        }
        None => unreachable!("checked by is_fragment"),
    };

    let dtype_json = map
        .get("dtype")
        .ok_or_else(|| ArrayJsonError::Decode("fragment is missing 'dtype'".into()))?
        .to_plain()
        .ok_or_else(|| ArrayJsonError::Decode("'dtype' must be plain JSON data".into()))?;
    let dtype = ElementType::from_json(&dtype_json)?;

    let shape = match map.get("shape") {
        Some(Value::Sequence(dims)) => dims
            .iter()
            .map(|d| {
                d.as_u64().map(|d| d as usize).ok_or_else(|| {
                    ArrayJsonError::Decode(format!(
                        "shape entries must be non-negative integers, got {d:?}"
                    ))
                })
            })
            .collect::<ArrayJsonResult<Vec<usize>>>()?,
        Some(other) => {
            return Err(ArrayJsonError::Decode(format!(
                "'shape' must be a list of integers, got {other:?}"
            )));
        }
        None => return Err(ArrayJsonError::Decode("fragment is missing 'shape'".into())),
    };

    decode_parts(payload, dtype, shape)
}

// ---------------------------------------------------------------------------
// Tree decoding
// ---------------------------------------------------------------------------

/// Convert parsed JSON to a value tree using the process-wide default
/// hooks, reconstructing every fragment along the way.
pub fn from_value(value: serde_json::Value) -> ArrayJsonResult<Value> {
    from_value_with(value, &default_decode_hooks())
}

/// Convert parsed JSON to a value tree with explicit hooks. The caller
/// hook sees every mapping first; its result is re-examined for the
/// sentinel key, so a hook that produces a fragment-shaped mapping is
/// still decoded.
pub fn from_value_with(value: serde_json::Value, hooks: &DecodeHooks) -> ArrayJsonResult<Value> {
    match value {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
        serde_json::Value::Number(n) => Ok(Value::Number(n)),
        serde_json::Value::String(s) => Ok(Value::String(s)),
        serde_json::Value::Array(items) => Ok(Value::Sequence(
            items
                .into_iter()
                .map(|item| from_value_with(item, hooks))
                .collect::<ArrayJsonResult<_>>()?,
        )),
        serde_json::Value::Object(map) => {
            // Children first, so nested mappings are already decoded by
            // the time this one is inspected.
            let mut mapping = BTreeMap::new();
            for (key, item) in map {
                mapping.insert(key, from_value_with(item, hooks)?);
            }
            let value = match &hooks.object_hook {
                Some(hook) => hook(mapping),
                None => Value::Mapping(mapping),
            };
            match value {
                Value::Mapping(mapping) if is_fragment(&mapping) => decode_mapping(&mapping),
                other => Ok(other),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Parse a JSON string into a value tree (default hooks).
pub fn from_str(text: &str) -> ArrayJsonResult<Value> {
    from_str_with(text, &default_decode_hooks())
}

pub fn from_str_with(text: &str, hooks: &DecodeHooks) -> ArrayJsonResult<Value> {
    from_value_with(serde_json::from_str(text)?, hooks)
}

/// Read a whole stream, then parse it (default hooks).
pub fn from_reader<R: std::io::Read>(mut reader: R) -> ArrayJsonResult<Value> {
    from_reader_with(&mut reader, &default_decode_hooks())
}

pub fn from_reader_with<R: std::io::Read>(
    mut reader: R,
    hooks: &DecodeHooks,
) -> ArrayJsonResult<Value> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    from_str_with(&text, hooks)
}
