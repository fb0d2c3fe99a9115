use bytes::Bytes;

use crate::dtype::{ElementType, Field};
use crate::error::{ArrayJsonError, ArrayJsonResult};
use crate::types::{
    ArrayVector, Endian, ScalarValue, bytes_to_vector, read_scalar, vector_to_bytes, write_scalar,
};

/// Number of elements a shape addresses: the product of its dimensions,
/// 1 for the empty (scalar) shape.
pub fn element_count(shape: &[usize]) -> usize {
    shape.iter().product()
}

// ---------------------------------------------------------------------------
// NdArray
// ---------------------------------------------------------------------------

/// A typed multi-dimensional array: an element type, a shape and one
/// flat, contiguous, row-major byte buffer. An `NdArray` with an empty
/// shape holds a single element and is surfaced to callers as a bare
/// scalar, never as a zero-dimensional container.
///
/// Invariant: `data.len() == element_count(shape) * dtype.item_size()`,
/// checked by every constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct NdArray {
    dtype: ElementType,
    shape: Vec<usize>,
    data: Bytes,
}

impl NdArray {
    /// Build from row-major contiguous bytes.
    pub fn from_bytes(
        dtype: ElementType,
        shape: Vec<usize>,
        data: impl Into<Bytes>,
    ) -> ArrayJsonResult<NdArray> {
        let data = data.into();
        let item = dtype.item_size();
        if item == 0 {
            return Err(ArrayJsonError::Descriptor(
                "zero-sized element type".into(),
            ));
        }
        let expected = element_count(&shape) * item;
        if data.len() != expected {
            return Err(ArrayJsonError::ShapeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(NdArray { dtype, shape, data })
    }

    /// Build from a strided view over `buf`, gathering a fresh row-major
    /// contiguous copy. `strides` are in bytes, one per dimension, and
    /// may be negative; `offset` is the byte position of the first
    /// element. The result is byte-for-byte identical to building from
    /// an already-contiguous copy of the same logical content.
    pub fn from_strided(
        dtype: ElementType,
        shape: Vec<usize>,
        offset: usize,
        strides: &[isize],
        buf: &[u8],
    ) -> ArrayJsonResult<NdArray> {
        if strides.len() != shape.len() {
            return Err(ArrayJsonError::TypeMismatch(format!(
                "{} strides for {} dimensions",
                strides.len(),
                shape.len()
            )));
        }
        let item = dtype.item_size();
        let count = element_count(&shape);
        let mut out = Vec::with_capacity(count * item);

        if count > 0 {
            let mut index = vec![0usize; shape.len()];
            'gather: loop {
                let mut pos = offset as isize;
                for (i, &idx) in index.iter().enumerate() {
                    pos += idx as isize * strides[i];
                }
                if pos < 0 || (pos as usize) + item > buf.len() {
                    return Err(ArrayJsonError::Decode(format!(
                        "strided read at byte {pos} is out of bounds"
                    )));
                }
                let pos = pos as usize;
                out.extend_from_slice(&buf[pos..pos + item]);

                // Odometer increment, last dimension fastest.
                let mut d = index.len();
                loop {
                    if d == 0 {
                        break 'gather;
                    }
                    d -= 1;
                    index[d] += 1;
                    if index[d] < shape[d] {
                        break;
                    }
                    index[d] = 0;
                }
            }
        }

        NdArray::from_bytes(dtype, shape, out)
    }

    /// Build from a typed vector, packed little-endian. The element type
    /// is inferred from the vector variant; record vectors need
    /// [`NdArray::from_record_vector`] instead.
    pub fn from_vector(vector: ArrayVector, shape: Vec<usize>) -> ArrayJsonResult<NdArray> {
        let dtype = vector.data_type().ok_or_else(|| {
            ArrayJsonError::TypeMismatch(
                "cannot infer an element type for this vector; use from_record_vector".into(),
            )
        })?;
        if dtype.byte_size() == 0 {
            return Err(ArrayJsonError::UnsupportedType(
                "zero-length byte string and text elements have no wire form".into(),
            ));
        }
        let ty = ElementType::of(dtype.clone());
        let bytes = vector_to_bytes(&vector, &dtype, Endian::Little)?;
        NdArray::from_bytes(ty, shape, bytes)
    }

    /// Build a compound-typed array from record elements.
    pub fn from_record_vector(
        ty: ElementType,
        shape: Vec<usize>,
        records: Vec<ScalarValue>,
    ) -> ArrayJsonResult<NdArray> {
        let mut out = Vec::with_capacity(records.len() * ty.item_size());
        for record in &records {
            write_element(record, &ty, &mut out)?;
        }
        NdArray::from_bytes(ty, shape, out)
    }

    /// Wrap a single scalar as a zero-dimensional array. Record values
    /// rebuild their compound element type from the field values, so a
    /// decoded record scalar can be encoded again.
    pub fn scalar(value: ScalarValue) -> ArrayJsonResult<NdArray> {
        let ty = match &value {
            ScalarValue::Record(entries) => record_element_type(entries)?,
            ScalarValue::Array(_) => {
                return Err(ArrayJsonError::UnsupportedType(
                    "a bare sub-array only occurs as a compound field; wrap it in an NdArray"
                        .into(),
                ));
            }
            other => {
                let dtype = other.data_type().ok_or_else(|| {
                    ArrayJsonError::UnsupportedType(format!(
                        "a bare {} value has no element type",
                        other.kind_name()
                    ))
                })?;
                if dtype.byte_size() == 0 {
                    return Err(ArrayJsonError::UnsupportedType(
                        "zero-length byte string and text elements have no wire form".into(),
                    ));
                }
                ElementType::of(dtype)
            }
        };
        let mut out = Vec::with_capacity(ty.item_size());
        write_element(&value, &ty, &mut out)?;
        NdArray::from_bytes(ty, Vec::new(), out)
    }

    // -- accessors -----------------------------------------------------------

    pub fn dtype(&self) -> &ElementType {
        &self.dtype
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// The raw row-major bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        element_count(&self.shape)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this is a zero-dimensional (single-element) array.
    pub fn is_scalar(&self) -> bool {
        self.shape.is_empty()
    }

    // -- element access ------------------------------------------------------

    /// Read the element at a multi-dimensional index.
    pub fn get(&self, index: &[usize]) -> ArrayJsonResult<ScalarValue> {
        if index.len() != self.shape.len() {
            return Err(ArrayJsonError::TypeMismatch(format!(
                "index of rank {} into array of rank {}",
                index.len(),
                self.shape.len()
            )));
        }
        let mut flat = 0usize;
        for (i, (&idx, &dim)) in index.iter().zip(self.shape.iter()).enumerate() {
            if idx >= dim {
                return Err(ArrayJsonError::TypeMismatch(format!(
                    "index {idx} out of bounds for dimension {i} of size {dim}"
                )));
            }
            flat = flat * dim + idx;
        }
        let item = self.dtype.item_size();
        read_element(&self.dtype, &self.data[flat * item..(flat + 1) * item])
    }

    /// Decode every element, row-major.
    pub fn to_values(&self) -> ArrayJsonResult<Vec<ScalarValue>> {
        let item = self.dtype.item_size();
        self.data
            .chunks_exact(item)
            .map(|chunk| read_element(&self.dtype, chunk))
            .collect()
    }

    /// Decode the flat element data as a typed vector.
    pub fn to_vector(&self) -> ArrayJsonResult<ArrayVector> {
        match &self.dtype {
            ElementType::Scalar { dtype, endian } => bytes_to_vector(*endian, dtype, &self.data),
            ElementType::Compound { .. } => Ok(ArrayVector::VRecord(self.to_values()?)),
        }
    }

    /// Unwrap a zero-dimensional array to its single element.
    pub fn into_scalar(self) -> ArrayJsonResult<ScalarValue> {
        if !self.is_scalar() {
            return Err(ArrayJsonError::TypeMismatch(format!(
                "array of shape {:?} is not a scalar",
                self.shape
            )));
        }
        read_element(&self.dtype, &self.data)
    }
}

/// Compound element type described by a record's own values: one field
/// per entry, nested records recursing, shaped fields carrying the
/// layout of their sub-array.
fn record_element_type(entries: &[(String, ScalarValue)]) -> ArrayJsonResult<ElementType> {
    let mut fields = Vec::with_capacity(entries.len());
    for (name, value) in entries {
        let (ty, shape) = match value {
            ScalarValue::Record(inner) => (record_element_type(inner)?, Vec::new()),
            ScalarValue::Array(arr) => (arr.dtype().clone(), arr.shape().to_vec()),
            other => {
                let dtype = other.data_type().ok_or_else(|| {
                    ArrayJsonError::UnsupportedType(format!(
                        "field '{name}' has no element type"
                    ))
                })?;
                (ElementType::of(dtype), Vec::new())
            }
        };
        fields.push(Field {
            name: name.clone(),
            ty,
            shape,
        });
    }
    Ok(ElementType::compound(fields))
}

// ---------------------------------------------------------------------------
// Element codec (compound-aware)
// ---------------------------------------------------------------------------

/// Read one element from exactly `ty.item_size()` bytes.
pub(crate) fn read_element(ty: &ElementType, bytes: &[u8]) -> ArrayJsonResult<ScalarValue> {
    match ty {
        ElementType::Scalar { dtype, endian } => read_scalar(dtype, *endian, bytes),
        ElementType::Compound { fields } => {
            let mut record = Vec::with_capacity(fields.len());
            let mut offset = 0;
            for field in fields {
                let span = field.span();
                let slice = &bytes[offset..offset + span];
                let value = if field.shape.is_empty() {
                    read_element(&field.ty, slice)?
                } else {
                    ScalarValue::Array(NdArray::from_bytes(
                        field.ty.clone(),
                        field.shape.clone(),
                        Bytes::copy_from_slice(slice),
                    )?)
                };
                record.push((field.name.clone(), value));
                offset += span;
            }
            Ok(ScalarValue::Record(record))
        }
    }
}

/// Append one element to `out`. Record values must match the compound
/// type field-for-field, in declaration order.
pub(crate) fn write_element(
    value: &ScalarValue,
    ty: &ElementType,
    out: &mut Vec<u8>,
) -> ArrayJsonResult<()> {
    match ty {
        ElementType::Scalar { dtype, endian } => write_scalar(value, dtype, *endian, out),
        ElementType::Compound { fields } => {
            let ScalarValue::Record(entries) = value else {
                return Err(ArrayJsonError::TypeMismatch(format!(
                    "compound element requires a record, got {}",
                    value.kind_name()
                )));
            };
            if entries.len() != fields.len() {
                return Err(ArrayJsonError::TypeMismatch(format!(
                    "record has {} fields, element type has {}",
                    entries.len(),
                    fields.len()
                )));
            }
            for (field, (name, field_value)) in fields.iter().zip(entries) {
                if *name != field.name {
                    return Err(ArrayJsonError::TypeMismatch(format!(
                        "record field '{name}' does not match '{}'",
                        field.name
                    )));
                }
                if field.shape.is_empty() {
                    write_element(field_value, &field.ty, out)?;
                } else {
                    let ScalarValue::Array(arr) = field_value else {
                        return Err(ArrayJsonError::TypeMismatch(format!(
                            "field '{name}' requires an array of shape {:?}",
                            field.shape
                        )));
                    };
                    if arr.shape() != field.shape || *arr.dtype() != field.ty {
                        return Err(ArrayJsonError::TypeMismatch(format!(
                            "field '{name}' array does not match the declared field layout"
                        )));
                    }
                    out.extend_from_slice(arr.data());
                }
            }
            Ok(())
        }
    }
}
