//! Array encoder: value tree -> tagged JSON fragments.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::array::NdArray;
use crate::dtype::ElementType;
use crate::error::{ArrayJsonError, ArrayJsonResult};
use crate::hooks::{EncodeHooks, default_encode_hooks};
use crate::types::ScalarValue;
use crate::value::Value;

/// Mapping key identifying an encoded array fragment. A user mapping
/// that legitimately contains this key will be misread as a fragment;
/// that collision is an accepted limitation of the format.
pub const SENTINEL_KEY: &str = "__arr__";

// ---------------------------------------------------------------------------
// Fragment
// ---------------------------------------------------------------------------

/// The wire form of an encoded array or scalar: the sentinel key maps
/// to the base64 of the raw row-major bytes, `dtype` to the descriptor
/// and `shape` to the dimensions (empty for a scalar).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    #[serde(rename = "__arr__")]
    pub payload: String,
    pub dtype: ElementType,
    pub shape: Vec<usize>,
}

impl Fragment {
    pub fn to_json(&self) -> ArrayJsonResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Encode an array as a fragment. Pure; the descriptor records the
/// byte order the buffer actually uses.
pub fn encode_array(array: &NdArray) -> Fragment {
    Fragment {
        payload: BASE64.encode(array.data()),
        dtype: array.dtype().clone(),
        shape: array.shape().to_vec(),
    }
}

/// Encode a typed scalar as a zero-dimensional fragment. Record values
/// carry a compound descriptor rebuilt from their field values; bare
/// sub-array values fail with `UnsupportedType`.
pub fn encode_scalar(value: &ScalarValue) -> ArrayJsonResult<Fragment> {
    let array = NdArray::scalar(value.clone())?;
    Ok(encode_array(&array))
}

// ---------------------------------------------------------------------------
// Tree encoding
// ---------------------------------------------------------------------------

/// Convert a value tree to plain JSON using the process-wide default
/// hooks. Typed nodes become fragments; everything else maps 1:1.
pub fn to_value(value: &Value) -> ArrayJsonResult<serde_json::Value> {
    to_value_with(value, &default_encode_hooks())
}

/// Convert a value tree to plain JSON with explicit hooks.
pub fn to_value_with(value: &Value, hooks: &EncodeHooks) -> ArrayJsonResult<serde_json::Value> {
    match value {
        Value::Null => Ok(serde_json::Value::Null),
        Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
        Value::Number(n) => Ok(serde_json::Value::Number(n.clone())),
        Value::String(s) => Ok(serde_json::Value::String(s.clone())),
        Value::Sequence(items) => Ok(serde_json::Value::Array(
            items
                .iter()
                .map(|item| to_value_with(item, hooks))
                .collect::<ArrayJsonResult<_>>()?,
        )),
        Value::Mapping(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, item) in map {
                out.insert(key.clone(), to_value_with(item, hooks)?);
            }
            Ok(serde_json::Value::Object(out))
        }
        Value::Array(array) => encode_array(array).to_json(),
        Value::Scalar(scalar) => encode_scalar(scalar)?.to_json(),
        Value::Other(custom) => {
            // Array capability first; the fallback only sees values the
            // array encoder does not recognise.
            if let Some(array) = custom.as_array() {
                return encode_array(&array).to_json();
            }
            match &hooks.fallback {
                Some(fallback) => fallback(custom.as_ref()),
                None => Err(ArrayJsonError::UnsupportedType(
                    custom.type_name().to_string(),
                )),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Serialize a value tree to a JSON string (default hooks).
pub fn to_string(value: &Value) -> ArrayJsonResult<String> {
    to_string_with(value, &default_encode_hooks())
}

pub fn to_string_with(value: &Value, hooks: &EncodeHooks) -> ArrayJsonResult<String> {
    Ok(serde_json::to_string(&to_value_with(value, hooks)?)?)
}

/// Serialize a value tree to a pretty-printed JSON string (default hooks).
pub fn to_string_pretty(value: &Value) -> ArrayJsonResult<String> {
    to_string_pretty_with(value, &default_encode_hooks())
}

pub fn to_string_pretty_with(value: &Value, hooks: &EncodeHooks) -> ArrayJsonResult<String> {
    Ok(serde_json::to_string_pretty(&to_value_with(value, hooks)?)?)
}

/// Serialize a value tree to a writer (default hooks).
pub fn to_writer<W: std::io::Write>(writer: W, value: &Value) -> ArrayJsonResult<()> {
    to_writer_with(writer, value, &default_encode_hooks())
}

pub fn to_writer_with<W: std::io::Write>(
    writer: W,
    value: &Value,
    hooks: &EncodeHooks,
) -> ArrayJsonResult<()> {
    Ok(serde_json::to_writer(writer, &to_value_with(value, hooks)?)?)
}
