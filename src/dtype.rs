//! Data-type descriptor codec.
//!
//! Descriptors use the NumPy array-interface notation: a byte-order
//! marker (`<` little-endian, `>` big-endian, `|` not applicable), a
//! one-letter type code (`b` bool, `i` signed int, `u` unsigned int,
//! `f` float, `c` complex float, `S` byte string, `U` Unicode text) and
//! a size. Compound types are described by an ordered list of
//! `[name, descriptor]` or `[name, descriptor, shape]` entries; field
//! offsets are implicit in declaration order with no alignment padding.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ArrayJsonError, ArrayJsonResult};
use crate::types::{DataType, Endian};

// ---------------------------------------------------------------------------
// ElementType
// ---------------------------------------------------------------------------

/// Binary layout of one array element.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementType {
    Scalar { dtype: DataType, endian: Endian },
    Compound { fields: Vec<Field> },
}

/// One field of a compound element type. A non-empty `shape` makes the
/// field a fixed-size sub-array occupying
/// `ty.item_size() * shape.iter().product()` bytes of the element.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: ElementType,
    pub shape: Vec<usize>,
}

impl Field {
    /// Bytes this field occupies within one element.
    pub fn span(&self) -> usize {
        self.ty.item_size() * self.shape.iter().product::<usize>()
    }
}

impl ElementType {
    /// Scalar element type with its natural byte order: `|` for types
    /// insensitive to byte order, little-endian otherwise (the order
    /// this crate writes in).
    pub fn of(dtype: DataType) -> ElementType {
        let endian = if dtype.has_byte_order() {
            Endian::Little
        } else {
            Endian::NotApplicable
        };
        ElementType::Scalar { dtype, endian }
    }

    pub fn compound(fields: Vec<Field>) -> ElementType {
        ElementType::Compound { fields }
    }

    /// Bytes per element. For compound types this is the sum of the
    /// field spans: sequential packing, no alignment padding.
    pub fn item_size(&self) -> usize {
        match self {
            ElementType::Scalar { dtype, .. } => dtype.byte_size(),
            ElementType::Compound { fields } => fields.iter().map(Field::span).sum(),
        }
    }

    /// Byte offset of each compound field; the scalar case has a single
    /// field at offset zero.
    pub fn field_offsets(&self) -> Vec<usize> {
        match self {
            ElementType::Scalar { .. } => vec![0],
            ElementType::Compound { fields } => {
                let mut offsets = Vec::with_capacity(fields.len());
                let mut offset = 0;
                for field in fields {
                    offsets.push(offset);
                    offset += field.span();
                }
                offsets
            }
        }
    }

    // -- JSON descriptor form ------------------------------------------------

    /// Parse a JSON descriptor: a string for scalar types, a list of
    /// field entries for compound types.
    pub fn from_json(value: &serde_json::Value) -> ArrayJsonResult<ElementType> {
        match value {
            serde_json::Value::String(s) => parse_descriptor(s),
            serde_json::Value::Array(entries) => {
                if entries.is_empty() {
                    return Err(ArrayJsonError::Descriptor(
                        "compound descriptor has no fields".into(),
                    ));
                }
                let mut fields: Vec<Field> = Vec::with_capacity(entries.len());
                for entry in entries {
                    let field = parse_field_entry(entry)?;
                    if fields.iter().any(|f| f.name == field.name) {
                        return Err(ArrayJsonError::Descriptor(format!(
                            "duplicate field name: {}",
                            field.name
                        )));
                    }
                    fields.push(field);
                }
                Ok(ElementType::Compound { fields })
            }
            other => Err(ArrayJsonError::Descriptor(format!(
                "descriptor must be a string or a field list, got {other}"
            ))),
        }
    }

    /// Produce the JSON descriptor. Inverse of [`ElementType::from_json`];
    /// field order is preserved exactly.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ElementType::Scalar { dtype, endian } => {
                serde_json::Value::String(format_descriptor(dtype, *endian))
            }
            ElementType::Compound { fields } => serde_json::Value::Array(
                fields
                    .iter()
                    .map(|f| {
                        let mut entry = vec![
                            serde_json::Value::String(f.name.clone()),
                            f.ty.to_json(),
                        ];
                        if !f.shape.is_empty() {
                            entry.push(serde_json::Value::Array(
                                f.shape
                                    .iter()
                                    .map(|d| serde_json::Value::from(*d as u64))
                                    .collect(),
                            ));
                        }
                        serde_json::Value::Array(entry)
                    })
                    .collect(),
            ),
        }
    }
}

fn parse_field_entry(entry: &serde_json::Value) -> ArrayJsonResult<Field> {
    let parts = entry.as_array().ok_or_else(|| {
        ArrayJsonError::Descriptor(format!("compound field entry must be a list, got {entry}"))
    })?;
    if parts.len() != 2 && parts.len() != 3 {
        return Err(ArrayJsonError::Descriptor(format!(
            "compound field entry must have 2 or 3 items, got {}",
            parts.len()
        )));
    }

    let name = parts[0]
        .as_str()
        .ok_or_else(|| {
            ArrayJsonError::Descriptor(format!("field name must be a string, got {}", parts[0]))
        })?
        .to_string();
    let ty = ElementType::from_json(&parts[1])?;

    let shape = match parts.get(2) {
        None => Vec::new(),
        Some(serde_json::Value::Array(dims)) => dims
            .iter()
            .map(|d| {
                d.as_u64()
                    .filter(|d| *d > 0)
                    .map(|d| d as usize)
                    .ok_or_else(|| {
                        ArrayJsonError::Descriptor(format!(
                            "field shape entries must be positive integers, got {d}"
                        ))
                    })
            })
            .collect::<ArrayJsonResult<_>>()?,
        Some(other) => {
            return Err(ArrayJsonError::Descriptor(format!(
                "field shape must be a list, got {other}"
            )));
        }
    };

    Ok(Field { name, ty, shape })
}

// ---------------------------------------------------------------------------
// Textual scalar descriptors
// ---------------------------------------------------------------------------

/// Parse a scalar descriptor string (e.g. `"<f8"`, `">i4"`, `"|b1"`,
/// `"|S3"`, `"<U5"`) into an [`ElementType`].
pub fn parse_descriptor(s: &str) -> ArrayJsonResult<ElementType> {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() < 3 {
        return Err(ArrayJsonError::Descriptor(format!(
            "descriptor too short: {s}"
        )));
    }

    let marker = chars[0];
    let endian = match marker {
        '<' => Endian::Little,
        '>' => Endian::Big,
        '|' => Endian::NotApplicable,
        _ => {
            return Err(ArrayJsonError::Descriptor(format!(
                "invalid byte-order marker: {marker}"
            )));
        }
    };

    let type_code = chars[1];
    let rest: String = chars[2..].iter().collect();
    let size: usize = rest
        .parse()
        .map_err(|_| ArrayJsonError::Descriptor(format!("invalid size: {rest}")))?;
    if size == 0 {
        return Err(ArrayJsonError::Descriptor(format!(
            "size must be > 0, got {rest}"
        )));
    }

    let dtype = match (type_code, size) {
        ('b', 1) => DataType::Bool,
        ('i', 1) => DataType::Int8,
        ('i', 2) => DataType::Int16,
        ('i', 4) => DataType::Int32,
        ('i', 8) => DataType::Int64,
        ('u', 1) => DataType::UInt8,
        ('u', 2) => DataType::UInt16,
        ('u', 4) => DataType::UInt32,
        ('u', 8) => DataType::UInt64,
        ('f', 2) => DataType::Float16,
        ('f', 4) => DataType::Float32,
        ('f', 8) => DataType::Float64,
        ('c', 8) => DataType::Complex64,
        ('c', 16) => DataType::Complex128,
        ('S', n) => DataType::Bytes(n),
        ('U', n) => DataType::Str(n),
        _ => {
            return Err(ArrayJsonError::Descriptor(format!(
                "unsupported type: {type_code}{size}"
            )));
        }
    };

    // Byte-order-insensitive types always carry `|`, whatever the input
    // said, so parse -> format is canonical.
    let endian = if dtype.has_byte_order() {
        match endian {
            Endian::NotApplicable => Endian::Little,
            e => e,
        }
    } else {
        Endian::NotApplicable
    };

    Ok(ElementType::Scalar { dtype, endian })
}

/// Format a scalar descriptor string. Total for any `DataType`.
pub fn format_descriptor(dtype: &DataType, endian: Endian) -> String {
    let marker = if !dtype.has_byte_order() {
        "|"
    } else {
        match endian {
            Endian::Big => ">",
            _ => "<",
        }
    };
    let (code, size) = match dtype {
        DataType::Bool => ('b', 1),
        DataType::Int8 => ('i', 1),
        DataType::Int16 => ('i', 2),
        DataType::Int32 => ('i', 4),
        DataType::Int64 => ('i', 8),
        DataType::UInt8 => ('u', 1),
        DataType::UInt16 => ('u', 2),
        DataType::UInt32 => ('u', 4),
        DataType::UInt64 => ('u', 8),
        DataType::Float16 => ('f', 2),
        DataType::Float32 => ('f', 4),
        DataType::Float64 => ('f', 8),
        DataType::Complex64 => ('c', 8),
        DataType::Complex128 => ('c', 16),
        DataType::Bytes(n) => ('S', *n),
        DataType::Str(n) => ('U', *n),
    };
    format!("{marker}{code}{size}")
}

// Serde: ElementType serialises as its JSON descriptor form.
impl Serialize for ElementType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ElementType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        ElementType::from_json(&value).map_err(serde::de::Error::custom)
    }
}
