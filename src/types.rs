use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use half::f16;
use num_complex::Complex;
use std::io::Cursor;

use crate::array::NdArray;
use crate::error::{ArrayJsonError, ArrayJsonResult};

// ---------------------------------------------------------------------------
// Endian
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endian {
    Little,
    Big,
    NotApplicable,
}

// ---------------------------------------------------------------------------
// DataType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float16,
    Float32,
    Float64,
    Complex64,
    Complex128,
    /// Fixed-length byte string; the size is the byte count.
    Bytes(usize),
    /// Fixed-length Unicode text; the size is the code-point count,
    /// each code point stored as a 4-byte integer.
    Str(usize),
}

impl DataType {
    /// Number of bytes per element.
    pub fn byte_size(&self) -> usize {
        match self {
            DataType::Bool => 1,
            DataType::Int8 => 1,
            DataType::Int16 => 2,
            DataType::Int32 => 4,
            DataType::Int64 => 8,
            DataType::UInt8 => 1,
            DataType::UInt16 => 2,
            DataType::UInt32 => 4,
            DataType::UInt64 => 8,
            DataType::Float16 => 2,
            DataType::Float32 => 4,
            DataType::Float64 => 8,
            DataType::Complex64 => 8,
            DataType::Complex128 => 16,
            DataType::Bytes(n) => *n,
            DataType::Str(n) => 4 * n,
        }
    }

    /// Whether the stored bytes of this type are sensitive to byte order.
    /// Single-byte types and raw byte strings are not.
    pub fn has_byte_order(&self) -> bool {
        !matches!(
            self,
            DataType::Bool | DataType::Int8 | DataType::UInt8 | DataType::Bytes(_)
        )
    }
}

// ---------------------------------------------------------------------------
// ScalarValue  (one decoded element)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float16(f16),
    Float32(f32),
    Float64(f64),
    Complex64(Complex<f32>),
    Complex128(Complex<f64>),
    Bytes(Vec<u8>),
    Str(String),
    /// One element of a compound type: one entry per field, in
    /// declaration order.
    Record(Vec<(String, ScalarValue)>),
    /// A fixed-size array occupying a single compound field slot
    /// (a field declared with a non-empty sub-shape).
    Array(NdArray),
}

impl ScalarValue {
    /// Return the [`DataType`] this value belongs to, when it has one.
    /// `Record` and `Array` values are described by a full element type
    /// instead and return `None`.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            ScalarValue::Bool(_) => Some(DataType::Bool),
            ScalarValue::Int8(_) => Some(DataType::Int8),
            ScalarValue::Int16(_) => Some(DataType::Int16),
            ScalarValue::Int32(_) => Some(DataType::Int32),
            ScalarValue::Int64(_) => Some(DataType::Int64),
            ScalarValue::UInt8(_) => Some(DataType::UInt8),
            ScalarValue::UInt16(_) => Some(DataType::UInt16),
            ScalarValue::UInt32(_) => Some(DataType::UInt32),
            ScalarValue::UInt64(_) => Some(DataType::UInt64),
            ScalarValue::Float16(_) => Some(DataType::Float16),
            ScalarValue::Float32(_) => Some(DataType::Float32),
            ScalarValue::Float64(_) => Some(DataType::Float64),
            ScalarValue::Complex64(_) => Some(DataType::Complex64),
            ScalarValue::Complex128(_) => Some(DataType::Complex128),
            ScalarValue::Bytes(b) => Some(DataType::Bytes(b.len())),
            ScalarValue::Str(s) => Some(DataType::Str(s.chars().count())),
            ScalarValue::Record(_) | ScalarValue::Array(_) => None,
        }
    }

    /// Short name of the value's kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ScalarValue::Bool(_) => "bool",
            ScalarValue::Int8(_) => "int8",
            ScalarValue::Int16(_) => "int16",
            ScalarValue::Int32(_) => "int32",
            ScalarValue::Int64(_) => "int64",
            ScalarValue::UInt8(_) => "uint8",
            ScalarValue::UInt16(_) => "uint16",
            ScalarValue::UInt32(_) => "uint32",
            ScalarValue::UInt64(_) => "uint64",
            ScalarValue::Float16(_) => "float16",
            ScalarValue::Float32(_) => "float32",
            ScalarValue::Float64(_) => "float64",
            ScalarValue::Complex64(_) => "complex64",
            ScalarValue::Complex128(_) => "complex128",
            ScalarValue::Bytes(_) => "bytes",
            ScalarValue::Str(_) => "str",
            ScalarValue::Record(_) => "record",
            ScalarValue::Array(_) => "array",
        }
    }
}

// ---------------------------------------------------------------------------
// ArrayVector  (typed flat element data)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ArrayVector {
    VBool(Vec<bool>),
    VInt8(Vec<i8>),
    VInt16(Vec<i16>),
    VInt32(Vec<i32>),
    VInt64(Vec<i64>),
    VUInt8(Vec<u8>),
    VUInt16(Vec<u16>),
    VUInt32(Vec<u32>),
    VUInt64(Vec<u64>),
    VFloat16(Vec<f16>),
    VFloat32(Vec<f32>),
    VFloat64(Vec<f64>),
    VComplex64(Vec<Complex<f32>>),
    VComplex128(Vec<Complex<f64>>),
    VBytes(Vec<Vec<u8>>),
    VStr(Vec<String>),
    /// Compound elements; every entry must be a [`ScalarValue::Record`].
    VRecord(Vec<ScalarValue>),
}

impl ArrayVector {
    /// Number of elements in the vector.
    pub fn len(&self) -> usize {
        match self {
            ArrayVector::VBool(v) => v.len(),
            ArrayVector::VInt8(v) => v.len(),
            ArrayVector::VInt16(v) => v.len(),
            ArrayVector::VInt32(v) => v.len(),
            ArrayVector::VInt64(v) => v.len(),
            ArrayVector::VUInt8(v) => v.len(),
            ArrayVector::VUInt16(v) => v.len(),
            ArrayVector::VUInt32(v) => v.len(),
            ArrayVector::VUInt64(v) => v.len(),
            ArrayVector::VFloat16(v) => v.len(),
            ArrayVector::VFloat32(v) => v.len(),
            ArrayVector::VFloat64(v) => v.len(),
            ArrayVector::VComplex64(v) => v.len(),
            ArrayVector::VComplex128(v) => v.len(),
            ArrayVector::VBytes(v) => v.len(),
            ArrayVector::VStr(v) => v.len(),
            ArrayVector::VRecord(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Infer the [`DataType`] of the elements. Byte-string and text
    /// vectors size the type to the longest element; empty ones have no
    /// inferable size. `VRecord` needs an explicit element type and
    /// always returns `None`.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            ArrayVector::VBool(_) => Some(DataType::Bool),
            ArrayVector::VInt8(_) => Some(DataType::Int8),
            ArrayVector::VInt16(_) => Some(DataType::Int16),
            ArrayVector::VInt32(_) => Some(DataType::Int32),
            ArrayVector::VInt64(_) => Some(DataType::Int64),
            ArrayVector::VUInt8(_) => Some(DataType::UInt8),
            ArrayVector::VUInt16(_) => Some(DataType::UInt16),
            ArrayVector::VUInt32(_) => Some(DataType::UInt32),
            ArrayVector::VUInt64(_) => Some(DataType::UInt64),
            ArrayVector::VFloat16(_) => Some(DataType::Float16),
            ArrayVector::VFloat32(_) => Some(DataType::Float32),
            ArrayVector::VFloat64(_) => Some(DataType::Float64),
            ArrayVector::VComplex64(_) => Some(DataType::Complex64),
            ArrayVector::VComplex128(_) => Some(DataType::Complex128),
            ArrayVector::VBytes(v) => v.iter().map(|b| b.len()).max().map(DataType::Bytes),
            ArrayVector::VStr(v) => v
                .iter()
                .map(|s| s.chars().count())
                .max()
                .map(DataType::Str),
            ArrayVector::VRecord(_) => None,
        }
    }

    /// Convert to `Vec<ScalarValue>`, wrapping each element.
    pub fn to_values(&self) -> Vec<ScalarValue> {
        match self {
            ArrayVector::VBool(v) => v.iter().map(|x| ScalarValue::Bool(*x)).collect(),
            ArrayVector::VInt8(v) => v.iter().map(|x| ScalarValue::Int8(*x)).collect(),
            ArrayVector::VInt16(v) => v.iter().map(|x| ScalarValue::Int16(*x)).collect(),
            ArrayVector::VInt32(v) => v.iter().map(|x| ScalarValue::Int32(*x)).collect(),
            ArrayVector::VInt64(v) => v.iter().map(|x| ScalarValue::Int64(*x)).collect(),
            ArrayVector::VUInt8(v) => v.iter().map(|x| ScalarValue::UInt8(*x)).collect(),
            ArrayVector::VUInt16(v) => v.iter().map(|x| ScalarValue::UInt16(*x)).collect(),
            ArrayVector::VUInt32(v) => v.iter().map(|x| ScalarValue::UInt32(*x)).collect(),
            ArrayVector::VUInt64(v) => v.iter().map(|x| ScalarValue::UInt64(*x)).collect(),
            ArrayVector::VFloat16(v) => v.iter().map(|x| ScalarValue::Float16(*x)).collect(),
            ArrayVector::VFloat32(v) => v.iter().map(|x| ScalarValue::Float32(*x)).collect(),
            ArrayVector::VFloat64(v) => v.iter().map(|x| ScalarValue::Float64(*x)).collect(),
            ArrayVector::VComplex64(v) => v.iter().map(|x| ScalarValue::Complex64(*x)).collect(),
            ArrayVector::VComplex128(v) => v.iter().map(|x| ScalarValue::Complex128(*x)).collect(),
            ArrayVector::VBytes(v) => v.iter().map(|x| ScalarValue::Bytes(x.clone())).collect(),
            ArrayVector::VStr(v) => v.iter().map(|x| ScalarValue::Str(x.clone())).collect(),
            ArrayVector::VRecord(v) => v.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Raw bytes -> typed vector
// ---------------------------------------------------------------------------

/// Interpret raw bytes as a typed vector according to `endian` and `dtype`.
pub fn bytes_to_vector(
    endian: Endian,
    dtype: &DataType,
    data: &[u8],
) -> ArrayJsonResult<ArrayVector> {
    let elem_size = dtype.byte_size();
    if elem_size == 0 || data.len() % elem_size != 0 {
        return Err(ArrayJsonError::Decode(format!(
            "byte length {} is not a multiple of item size {elem_size}",
            data.len()
        )));
    }

    match dtype {
        DataType::Bool => Ok(ArrayVector::VBool(
            data.iter().map(|b| *b != 0).collect(),
        )),
        DataType::Int8 => Ok(ArrayVector::VInt8(
            data.iter().map(|b| *b as i8).collect(),
        )),
        DataType::UInt8 => Ok(ArrayVector::VUInt8(data.to_vec())),

        DataType::Int16 => read_vec_typed(
            endian,
            data,
            |c| c.read_i16::<LittleEndian>(),
            |c| c.read_i16::<BigEndian>(),
            ArrayVector::VInt16,
        ),
        DataType::Int32 => read_vec_typed(
            endian,
            data,
            |c| c.read_i32::<LittleEndian>(),
            |c| c.read_i32::<BigEndian>(),
            ArrayVector::VInt32,
        ),
        DataType::Int64 => read_vec_typed(
            endian,
            data,
            |c| c.read_i64::<LittleEndian>(),
            |c| c.read_i64::<BigEndian>(),
            ArrayVector::VInt64,
        ),
        DataType::UInt16 => read_vec_typed(
            endian,
            data,
            |c| c.read_u16::<LittleEndian>(),
            |c| c.read_u16::<BigEndian>(),
            ArrayVector::VUInt16,
        ),
        DataType::UInt32 => read_vec_typed(
            endian,
            data,
            |c| c.read_u32::<LittleEndian>(),
            |c| c.read_u32::<BigEndian>(),
            ArrayVector::VUInt32,
        ),
        DataType::UInt64 => read_vec_typed(
            endian,
            data,
            |c| c.read_u64::<LittleEndian>(),
            |c| c.read_u64::<BigEndian>(),
            ArrayVector::VUInt64,
        ),

        DataType::Float16 => {
            let count = data.len() / elem_size;
            let mut out = Vec::with_capacity(count);
            let mut cursor = Cursor::new(data);
            for _ in 0..count {
                let bits = match endian {
                    Endian::Little | Endian::NotApplicable => cursor.read_u16::<LittleEndian>(),
                    Endian::Big => cursor.read_u16::<BigEndian>(),
                }
                .map_err(|e| ArrayJsonError::Decode(format!("failed to read f16: {e}")))?;
                out.push(f16::from_bits(bits));
            }
            Ok(ArrayVector::VFloat16(out))
        }
        DataType::Float32 => read_vec_typed(
            endian,
            data,
            |c| c.read_f32::<LittleEndian>(),
            |c| c.read_f32::<BigEndian>(),
            ArrayVector::VFloat32,
        ),
        DataType::Float64 => read_vec_typed(
            endian,
            data,
            |c| c.read_f64::<LittleEndian>(),
            |c| c.read_f64::<BigEndian>(),
            ArrayVector::VFloat64,
        ),

        DataType::Complex64 => {
            let count = data.len() / elem_size;
            let mut out = Vec::with_capacity(count);
            let mut cursor = Cursor::new(data);
            for _ in 0..count {
                let re = match endian {
                    Endian::Little | Endian::NotApplicable => cursor.read_f32::<LittleEndian>(),
                    Endian::Big => cursor.read_f32::<BigEndian>(),
                }
                .map_err(|e| ArrayJsonError::Decode(format!("failed to read complex64 re: {e}")))?;
                let im = match endian {
                    Endian::Little | Endian::NotApplicable => cursor.read_f32::<LittleEndian>(),
                    Endian::Big => cursor.read_f32::<BigEndian>(),
                }
                .map_err(|e| ArrayJsonError::Decode(format!("failed to read complex64 im: {e}")))?;
                out.push(Complex::new(re, im));
            }
            Ok(ArrayVector::VComplex64(out))
        }
        DataType::Complex128 => {
            let count = data.len() / elem_size;
            let mut out = Vec::with_capacity(count);
            let mut cursor = Cursor::new(data);
            for _ in 0..count {
                let re = match endian {
                    Endian::Little | Endian::NotApplicable => cursor.read_f64::<LittleEndian>(),
                    Endian::Big => cursor.read_f64::<BigEndian>(),
                }
                .map_err(|e| ArrayJsonError::Decode(format!("failed to read complex128 re: {e}")))?;
                let im = match endian {
                    Endian::Little | Endian::NotApplicable => cursor.read_f64::<LittleEndian>(),
                    Endian::Big => cursor.read_f64::<BigEndian>(),
                }
                .map_err(|e| ArrayJsonError::Decode(format!("failed to read complex128 im: {e}")))?;
                out.push(Complex::new(re, im));
            }
            Ok(ArrayVector::VComplex128(out))
        }

        DataType::Bytes(n) => Ok(ArrayVector::VBytes(
            data.chunks_exact(*n)
                .map(|chunk| {
                    let mut bytes = chunk.to_vec();
                    // Trailing NULs are padding, not content.
                    while bytes.last() == Some(&0) {
                        bytes.pop();
                    }
                    bytes
                })
                .collect(),
        )),
        DataType::Str(_) => {
            let count = data.len() / elem_size;
            let mut out = Vec::with_capacity(count);
            for chunk in data.chunks_exact(elem_size) {
                match read_scalar(dtype, endian, chunk)? {
                    ScalarValue::Str(s) => out.push(s),
                    _ => unreachable!("Str dtype decodes to Str"),
                }
            }
            Ok(ArrayVector::VStr(out))
        }
    }
}

/// Helper: read a vector of a fixed-size numeric type.
fn read_vec_typed<T: Clone, F1, F2>(
    endian: Endian,
    data: &[u8],
    read_le: F1,
    read_be: F2,
    wrap: fn(Vec<T>) -> ArrayVector,
) -> ArrayJsonResult<ArrayVector>
where
    F1: Fn(&mut Cursor<&[u8]>) -> std::io::Result<T>,
    F2: Fn(&mut Cursor<&[u8]>) -> std::io::Result<T>,
{
    let elem_size = std::mem::size_of::<T>();
    let count = data.len() / elem_size;
    let mut out = Vec::with_capacity(count);
    let mut cursor = Cursor::new(data);
    for _ in 0..count {
        let val = match endian {
            Endian::Little | Endian::NotApplicable => (read_le)(&mut cursor),
            Endian::Big => (read_be)(&mut cursor),
        }
        .map_err(|e| ArrayJsonError::Decode(format!("failed to read value: {e}")))?;
        out.push(val);
    }
    Ok(wrap(out))
}

// ---------------------------------------------------------------------------
// Single-element codec
// ---------------------------------------------------------------------------

/// Read one element of `dtype` from the front of `data`.
pub fn read_scalar(dtype: &DataType, endian: Endian, data: &[u8]) -> ArrayJsonResult<ScalarValue> {
    let elem_size = dtype.byte_size();
    if data.len() < elem_size {
        return Err(ArrayJsonError::Decode(format!(
            "need {elem_size} bytes for one element, got {}",
            data.len()
        )));
    }
    let mut cursor = Cursor::new(data);

    match dtype {
        DataType::Bool => Ok(ScalarValue::Bool(data[0] != 0)),
        DataType::Int8 => Ok(ScalarValue::Int8(data[0] as i8)),
        DataType::UInt8 => Ok(ScalarValue::UInt8(data[0])),

        DataType::Int16 => Ok(ScalarValue::Int16(
            read_one(endian, &mut cursor, |c| c.read_i16::<LittleEndian>(), |c| {
                c.read_i16::<BigEndian>()
            })?,
        )),
        DataType::Int32 => Ok(ScalarValue::Int32(
            read_one(endian, &mut cursor, |c| c.read_i32::<LittleEndian>(), |c| {
                c.read_i32::<BigEndian>()
            })?,
        )),
        DataType::Int64 => Ok(ScalarValue::Int64(
            read_one(endian, &mut cursor, |c| c.read_i64::<LittleEndian>(), |c| {
                c.read_i64::<BigEndian>()
            })?,
        )),
        DataType::UInt16 => Ok(ScalarValue::UInt16(
            read_one(endian, &mut cursor, |c| c.read_u16::<LittleEndian>(), |c| {
                c.read_u16::<BigEndian>()
            })?,
        )),
        DataType::UInt32 => Ok(ScalarValue::UInt32(
            read_one(endian, &mut cursor, |c| c.read_u32::<LittleEndian>(), |c| {
                c.read_u32::<BigEndian>()
            })?,
        )),
        DataType::UInt64 => Ok(ScalarValue::UInt64(
            read_one(endian, &mut cursor, |c| c.read_u64::<LittleEndian>(), |c| {
                c.read_u64::<BigEndian>()
            })?,
        )),

        DataType::Float16 => {
            let bits = read_one(endian, &mut cursor, |c| c.read_u16::<LittleEndian>(), |c| {
                c.read_u16::<BigEndian>()
            })?;
            Ok(ScalarValue::Float16(f16::from_bits(bits)))
        }
        DataType::Float32 => Ok(ScalarValue::Float32(
            read_one(endian, &mut cursor, |c| c.read_f32::<LittleEndian>(), |c| {
                c.read_f32::<BigEndian>()
            })?,
        )),
        DataType::Float64 => Ok(ScalarValue::Float64(
            read_one(endian, &mut cursor, |c| c.read_f64::<LittleEndian>(), |c| {
                c.read_f64::<BigEndian>()
            })?,
        )),

        DataType::Complex64 => {
            let re = read_one(endian, &mut cursor, |c| c.read_f32::<LittleEndian>(), |c| {
                c.read_f32::<BigEndian>()
            })?;
            let im = read_one(endian, &mut cursor, |c| c.read_f32::<LittleEndian>(), |c| {
                c.read_f32::<BigEndian>()
            })?;
            Ok(ScalarValue::Complex64(Complex::new(re, im)))
        }
        DataType::Complex128 => {
            let re = read_one(endian, &mut cursor, |c| c.read_f64::<LittleEndian>(), |c| {
                c.read_f64::<BigEndian>()
            })?;
            let im = read_one(endian, &mut cursor, |c| c.read_f64::<LittleEndian>(), |c| {
                c.read_f64::<BigEndian>()
            })?;
            Ok(ScalarValue::Complex128(Complex::new(re, im)))
        }

        DataType::Bytes(n) => {
            let mut bytes = data[..*n].to_vec();
            // Trailing NULs are padding, not content.
            while bytes.last() == Some(&0) {
                bytes.pop();
            }
            Ok(ScalarValue::Bytes(bytes))
        }
        DataType::Str(n) => {
            let mut points = Vec::with_capacity(*n);
            for _ in 0..*n {
                let cp = read_one(endian, &mut cursor, |c| c.read_u32::<LittleEndian>(), |c| {
                    c.read_u32::<BigEndian>()
                })?;
                points.push(cp);
            }
            // Trailing NULs are padding, not content.
            while points.last() == Some(&0) {
                points.pop();
            }
            let text: String = points
                .into_iter()
                .map(|cp| {
                    char::from_u32(cp).ok_or_else(|| {
                        ArrayJsonError::Decode(format!("invalid Unicode code point {cp:#x}"))
                    })
                })
                .collect::<ArrayJsonResult<_>>()?;
            Ok(ScalarValue::Str(text))
        }
    }
}

fn read_one<T, F1, F2>(
    endian: Endian,
    cursor: &mut Cursor<&[u8]>,
    read_le: F1,
    read_be: F2,
) -> ArrayJsonResult<T>
where
    F1: Fn(&mut Cursor<&[u8]>) -> std::io::Result<T>,
    F2: Fn(&mut Cursor<&[u8]>) -> std::io::Result<T>,
{
    match endian {
        Endian::Little | Endian::NotApplicable => read_le(cursor),
        Endian::Big => read_be(cursor),
    }
    .map_err(|e| ArrayJsonError::Decode(format!("failed to read value: {e}")))
}

/// Append one element of `dtype` to `out`. The value must match the
/// data type exactly; byte strings shorter than the type width are
/// NUL-padded, longer ones are rejected.
pub fn write_scalar(
    value: &ScalarValue,
    dtype: &DataType,
    endian: Endian,
    out: &mut Vec<u8>,
) -> ArrayJsonResult<()> {
    let write_err =
        |e: std::io::Error| ArrayJsonError::Encode(format!("failed to write value: {e}"));

    match (dtype, value) {
        (DataType::Bool, ScalarValue::Bool(v)) => {
            out.push(u8::from(*v));
            Ok(())
        }
        (DataType::Int8, ScalarValue::Int8(v)) => {
            out.push(*v as u8);
            Ok(())
        }
        (DataType::UInt8, ScalarValue::UInt8(v)) => {
            out.push(*v);
            Ok(())
        }
        (DataType::Int16, ScalarValue::Int16(v)) => match endian {
            Endian::Big => out.write_i16::<BigEndian>(*v),
            _ => out.write_i16::<LittleEndian>(*v),
        }
        .map_err(write_err),
        (DataType::Int32, ScalarValue::Int32(v)) => match endian {
            Endian::Big => out.write_i32::<BigEndian>(*v),
            _ => out.write_i32::<LittleEndian>(*v),
        }
        .map_err(write_err),
        (DataType::Int64, ScalarValue::Int64(v)) => match endian {
            Endian::Big => out.write_i64::<BigEndian>(*v),
            _ => out.write_i64::<LittleEndian>(*v),
        }
        .map_err(write_err),
        (DataType::UInt16, ScalarValue::UInt16(v)) => match endian {
            Endian::Big => out.write_u16::<BigEndian>(*v),
            _ => out.write_u16::<LittleEndian>(*v),
        }
        .map_err(write_err),
        (DataType::UInt32, ScalarValue::UInt32(v)) => match endian {
            Endian::Big => out.write_u32::<BigEndian>(*v),
            _ => out.write_u32::<LittleEndian>(*v),
        }
        .map_err(write_err),
        (DataType::UInt64, ScalarValue::UInt64(v)) => match endian {
            Endian::Big => out.write_u64::<BigEndian>(*v),
            _ => out.write_u64::<LittleEndian>(*v),
        }
        .map_err(write_err),
        (DataType::Float16, ScalarValue::Float16(v)) => match endian {
            Endian::Big => out.write_u16::<BigEndian>(v.to_bits()),
            _ => out.write_u16::<LittleEndian>(v.to_bits()),
        }
        .map_err(write_err),
        (DataType::Float32, ScalarValue::Float32(v)) => match endian {
            Endian::Big => out.write_f32::<BigEndian>(*v),
            _ => out.write_f32::<LittleEndian>(*v),
        }
        .map_err(write_err),
        (DataType::Float64, ScalarValue::Float64(v)) => match endian {
            Endian::Big => out.write_f64::<BigEndian>(*v),
            _ => out.write_f64::<LittleEndian>(*v),
        }
        .map_err(write_err),
        (DataType::Complex64, ScalarValue::Complex64(v)) => {
            match endian {
                Endian::Big => {
                    out.write_f32::<BigEndian>(v.re).map_err(write_err)?;
                    out.write_f32::<BigEndian>(v.im)
                }
                _ => {
                    out.write_f32::<LittleEndian>(v.re).map_err(write_err)?;
                    out.write_f32::<LittleEndian>(v.im)
                }
            }
            .map_err(write_err)
        }
        (DataType::Complex128, ScalarValue::Complex128(v)) => {
            match endian {
                Endian::Big => {
                    out.write_f64::<BigEndian>(v.re).map_err(write_err)?;
                    out.write_f64::<BigEndian>(v.im)
                }
                _ => {
                    out.write_f64::<LittleEndian>(v.re).map_err(write_err)?;
                    out.write_f64::<LittleEndian>(v.im)
                }
            }
            .map_err(write_err)
        }
        (DataType::Bytes(n), ScalarValue::Bytes(b)) => {
            if b.len() > *n {
                return Err(ArrayJsonError::TypeMismatch(format!(
                    "byte string of length {} does not fit in {n} bytes",
                    b.len()
                )));
            }
            out.extend_from_slice(b);
            out.resize(out.len() + (n - b.len()), 0);
            Ok(())
        }
        (DataType::Str(n), ScalarValue::Str(s)) => {
            let count = s.chars().count();
            if count > *n {
                return Err(ArrayJsonError::TypeMismatch(format!(
                    "text of {count} code points does not fit in {n}"
                )));
            }
            for ch in s.chars() {
                match endian {
                    Endian::Big => out.write_u32::<BigEndian>(ch as u32),
                    _ => out.write_u32::<LittleEndian>(ch as u32),
                }
                .map_err(write_err)?;
            }
            for _ in count..*n {
                match endian {
                    Endian::Big => out.write_u32::<BigEndian>(0),
                    _ => out.write_u32::<LittleEndian>(0),
                }
                .map_err(write_err)?;
            }
            Ok(())
        }
        (dtype, value) => Err(ArrayJsonError::TypeMismatch(format!(
            "cannot store a {} value as {dtype:?}",
            value.kind_name()
        ))),
    }
}

/// Pack a typed vector into raw bytes.
pub fn vector_to_bytes(
    vector: &ArrayVector,
    dtype: &DataType,
    endian: Endian,
) -> ArrayJsonResult<Vec<u8>> {
    let mut out = Vec::with_capacity(vector.len() * dtype.byte_size());
    for value in vector.to_values() {
        write_scalar(&value, dtype, endian, &mut out)?;
    }
    Ok(out)
}
