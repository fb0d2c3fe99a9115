//! Document tree produced by decoding and consumed by encoding.
//!
//! [`Value`] mirrors the JSON data model and adds two typed nodes:
//! [`Value::Array`] for a decoded multi-dimensional array and
//! [`Value::Scalar`] for a decoded typed scalar. [`Value::Other`] is the
//! extension seam: an opaque caller value that the encoder either
//! recognises through the [`CustomValue::as_array`] capability or hands
//! to the caller-supplied fallback hook.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::array::NdArray;
use crate::types::ScalarValue;

// ---------------------------------------------------------------------------
// CustomValue
// ---------------------------------------------------------------------------

/// An opaque application value embedded in a document tree.
///
/// The encoder inspects capabilities rather than concrete types: a value
/// that can expose an element type, a shape and contiguous row-major
/// bytes — i.e. return an [`NdArray`] from [`CustomValue::as_array`] —
/// is encoded as an array fragment. Anything else goes to the caller's
/// fallback hook, or fails with `UnsupportedType` naming
/// [`CustomValue::type_name`].
pub trait CustomValue: fmt::Debug + Send + Sync + 'static {
    /// Concrete type name, used in `UnsupportedType` diagnostics.
    fn type_name(&self) -> &str;

    /// Downcast support for fallback hooks.
    fn as_any(&self) -> &dyn std::any::Any;

    /// Expose this value as an array, if it is one.
    fn as_array(&self) -> Option<NdArray> {
        None
    }
}

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Sequence(Vec<Value>),
    Mapping(BTreeMap<String, Value>),
    /// A decoded typed array (non-empty shape).
    Array(NdArray),
    /// A decoded typed scalar (an array fragment with an empty shape).
    Scalar(ScalarValue),
    /// An opaque caller value, encoded via capability or fallback.
    Other(Arc<dyn CustomValue>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => a == b,
            (Value::Mapping(a), Value::Mapping(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Scalar(a), Value::Scalar(b)) => a == b,
            // Opaque values compare by identity.
            (Value::Other(a), Value::Other(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::Scalar(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&NdArray> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to plain JSON, when the tree contains no typed or opaque
    /// nodes. Used where a sub-tree (e.g. a `dtype` descriptor) must be
    /// ordinary JSON data.
    pub fn to_plain(&self) -> Option<serde_json::Value> {
        match self {
            Value::Null => Some(serde_json::Value::Null),
            Value::Bool(b) => Some(serde_json::Value::Bool(*b)),
            Value::Number(n) => Some(serde_json::Value::Number(n.clone())),
            Value::String(s) => Some(serde_json::Value::String(s.clone())),
            Value::Sequence(items) => items
                .iter()
                .map(Value::to_plain)
                .collect::<Option<Vec<_>>>()
                .map(serde_json::Value::Array),
            Value::Mapping(map) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (k, v) in map {
                    out.insert(k.clone(), v.to_plain()?);
                }
                Some(serde_json::Value::Object(out))
            }
            Value::Array(_) | Value::Scalar(_) | Value::Other(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl From<bool> for Value {
    fn from(v: bool) -> Value {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Value {
        Value::Number(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Value {
        Value::Number(v.into())
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Value {
        Value::Number(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Value {
        serde_json::Number::from_f64(v)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Value {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Value {
        Value::String(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Value {
        Value::Sequence(v)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Value {
        Value::Mapping(v)
    }
}

impl From<NdArray> for Value {
    fn from(v: NdArray) -> Value {
        Value::Array(v)
    }
}

impl From<ScalarValue> for Value {
    fn from(v: ScalarValue) -> Value {
        Value::Scalar(v)
    }
}

/// Plain structural lift: objects become mappings, nothing is decoded.
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Value {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Sequence(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Mapping(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}
