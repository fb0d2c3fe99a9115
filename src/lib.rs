//! Typed multi-dimensional numeric arrays embedded in JSON documents.
//!
//! JSON has no native notion of a fixed-width numeric type or a
//! multi-dimensional array. This crate encodes an array as a small
//! tagged mapping — base64 of the raw row-major bytes, a NumPy-style
//! data-type descriptor and a shape — and recognises such mappings
//! while parsing, reconstructing the array with its exact element type,
//! shape and byte layout:
//!
//! ```json
//! { "__arr__": "AQIDBA==", "dtype": "|u1", "shape": [2, 2] }
//! ```
//!
//! A fragment with an empty shape is a typed scalar and decodes to the
//! bare element. Compound (record) element types, including fields with
//! fixed sub-shapes, are supported through the descriptor notation.
//!
//! ```
//! use arrayjson::{ArrayVector, NdArray, Value};
//!
//! let array = NdArray::from_vector(ArrayVector::VUInt8(vec![1, 2, 3, 4]), vec![2, 2]).unwrap();
//! let text = arrayjson::to_string(&Value::Array(array.clone())).unwrap();
//! assert_eq!(text, r#"{"__arr__":"AQIDBA==","dtype":"|u1","shape":[2,2]}"#);
//!
//! let back = arrayjson::from_str(&text).unwrap();
//! assert_eq!(back, Value::Array(array));
//! ```
//!
//! Caller-supplied hooks compose with the built-in codec: on encode the
//! array path runs first and unrecognised values fall through to the
//! caller's fallback; on decode the caller's object hook runs first and
//! its output is re-checked for the sentinel key. Hooks are passed per
//! call or installed once process-wide with
//! [`install_default_hooks`](hooks::install_default_hooks).

pub mod array;
pub mod decode;
pub mod dtype;
pub mod encode;
pub mod error;
pub mod hooks;
pub mod types;
pub mod value;

// Re-export key types at crate root for convenience.
pub use array::{NdArray, element_count};
pub use decode::{from_reader, from_reader_with, from_str, from_str_with, from_value, from_value_with};
pub use dtype::{ElementType, Field, format_descriptor, parse_descriptor};
pub use encode::{
    Fragment, SENTINEL_KEY, encode_array, encode_scalar, to_string, to_string_pretty,
    to_string_pretty_with, to_string_with, to_value, to_value_with, to_writer, to_writer_with,
};
pub use error::{ArrayJsonError, ArrayJsonResult};
pub use hooks::{DecodeHooks, EncodeHooks, install_default_hooks};
pub use types::{ArrayVector, DataType, Endian, ScalarValue};
pub use value::{CustomValue, Value};
