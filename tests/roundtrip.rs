use std::collections::BTreeMap;

use arrayjson::{
    ArrayJsonError, ArrayVector, DataType, ElementType, NdArray, ScalarValue, Value, from_str,
    to_string,
};
use half::f16;
use num_complex::Complex;

fn roundtrip(value: Value) -> Value {
    let text = to_string(&value).unwrap();
    from_str(&text).unwrap()
}

fn assert_scalar_roundtrip(value: ScalarValue) {
    let back = roundtrip(Value::Scalar(value.clone()));
    assert_eq!(back, Value::Scalar(value));
}

#[test]
fn scalars_round_trip_with_their_runtime_type() {
    assert_scalar_roundtrip(ScalarValue::Bool(true));
    assert_scalar_roundtrip(ScalarValue::Bool(false));
    assert_scalar_roundtrip(ScalarValue::Int8(-5));
    assert_scalar_roundtrip(ScalarValue::Int16(-300));
    assert_scalar_roundtrip(ScalarValue::Int32(123_456));
    assert_scalar_roundtrip(ScalarValue::Int64(i64::MIN));
    assert_scalar_roundtrip(ScalarValue::UInt8(200));
    assert_scalar_roundtrip(ScalarValue::UInt16(65_535));
    assert_scalar_roundtrip(ScalarValue::UInt32(4_000_000_000));
    assert_scalar_roundtrip(ScalarValue::UInt64(u64::MAX));
    assert_scalar_roundtrip(ScalarValue::Float16(f16::from_f32(1.5)));
    assert_scalar_roundtrip(ScalarValue::Float32(3.5));
    assert_scalar_roundtrip(ScalarValue::Float64(-0.25));
    assert_scalar_roundtrip(ScalarValue::Complex64(Complex::new(1.5, -2.0)));
    assert_scalar_roundtrip(ScalarValue::Complex128(Complex::new(-3.25, 4.5)));
    assert_scalar_roundtrip(ScalarValue::Bytes(b"abc".to_vec()));
    assert_scalar_roundtrip(ScalarValue::Str("h\u{e9}llo".to_string()));
}

#[test]
fn scalar_decodes_to_bare_element_not_zero_d_array() {
    let back = roundtrip(Value::Scalar(ScalarValue::Float32(3.5)));
    assert!(back.is_scalar());
    assert_eq!(back.as_scalar(), Some(&ScalarValue::Float32(3.5)));
}

#[test]
fn scalar_float32_wire_format() {
    let text = to_string(&Value::Scalar(ScalarValue::Float32(3.5))).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["__arr__"], "AABgQA==");
    assert_eq!(json["dtype"], "<f4");
    assert_eq!(json["shape"], serde_json::json!([]));
}

#[test]
fn uint8_2x2_wire_format() {
    let array = NdArray::from_vector(ArrayVector::VUInt8(vec![1, 2, 3, 4]), vec![2, 2]).unwrap();
    let text = to_string(&Value::Array(array)).unwrap();
    assert_eq!(text, r#"{"__arr__":"AQIDBA==","dtype":"|u1","shape":[2,2]}"#);
}

#[test]
fn arrays_round_trip_shape_and_elements() {
    let cases = vec![
        NdArray::from_vector(ArrayVector::VInt32(vec![1, -2, 3]), vec![3]).unwrap(),
        NdArray::from_vector(
            ArrayVector::VFloat64(vec![0.5, -1.5, 2.5, 3.0, -4.25, 6.0]),
            vec![2, 3],
        )
        .unwrap(),
        NdArray::from_vector(
            ArrayVector::VUInt16((0..24).collect()),
            vec![2, 3, 4],
        )
        .unwrap(),
        NdArray::from_vector(
            ArrayVector::VComplex64(vec![Complex::new(1.0, 2.0), Complex::new(-3.0, 4.0)]),
            vec![2],
        )
        .unwrap(),
        NdArray::from_vector(ArrayVector::VBool(vec![true, false, true]), vec![3]).unwrap(),
    ];

    for array in cases {
        let back = roundtrip(Value::Array(array.clone()));
        let Value::Array(decoded) = back else {
            panic!("expected an array back, got {back:?}");
        };
        assert_eq!(decoded.shape(), array.shape());
        assert_eq!(decoded.to_values().unwrap(), array.to_values().unwrap());
        assert_eq!(decoded, array);
    }
}

#[test]
fn empty_dimension_round_trips() {
    let array = NdArray::from_vector(ArrayVector::VFloat32(vec![]), vec![0, 3]).unwrap();
    let back = roundtrip(Value::Array(array.clone()));
    let Value::Array(decoded) = back else {
        panic!("expected an array");
    };
    assert_eq!(decoded.shape(), &[0, 3]);
    assert_eq!(decoded.len(), 0);
    assert_eq!(decoded, array);
}

#[test]
fn element_access_after_decode() {
    let array = NdArray::from_vector(ArrayVector::VInt16(vec![10, 20, 30, 40]), vec![2, 2]).unwrap();
    let Value::Array(decoded) = roundtrip(Value::Array(array)) else {
        panic!("expected an array");
    };
    assert_eq!(decoded.get(&[0, 0]).unwrap(), ScalarValue::Int16(10));
    assert_eq!(decoded.get(&[0, 1]).unwrap(), ScalarValue::Int16(20));
    assert_eq!(decoded.get(&[1, 0]).unwrap(), ScalarValue::Int16(30));
    assert_eq!(decoded.get(&[1, 1]).unwrap(), ScalarValue::Int16(40));
    assert!(decoded.get(&[2, 0]).is_err());
    assert!(decoded.get(&[0]).is_err());
}

#[test]
fn strided_view_encodes_like_contiguous_copy() {
    // A 10x10 u8 buffer; take the top-left 5x5 corner.
    let buf: Vec<u8> = (0..100).collect();
    let corner: Vec<u8> = (0..5)
        .flat_map(|row| (0..5).map(move |col| (row * 10 + col) as u8))
        .collect();

    let dtype = ElementType::of(DataType::UInt8);
    let strided =
        NdArray::from_strided(dtype.clone(), vec![5, 5], 0, &[10, 1], &buf).unwrap();
    let contiguous = NdArray::from_bytes(dtype, vec![5, 5], corner).unwrap();

    assert_eq!(strided.data(), contiguous.data());
    assert_eq!(
        to_string(&Value::Array(strided)).unwrap(),
        to_string(&Value::Array(contiguous)).unwrap()
    );
}

#[test]
fn column_major_buffer_is_normalized_to_row_major() {
    // Logical [[1,2,3],[4,5,6]] laid out column-major.
    let buf: Vec<u8> = vec![1, 4, 2, 5, 3, 6];
    let dtype = ElementType::of(DataType::UInt8);
    let array = NdArray::from_strided(dtype, vec![2, 3], 0, &[1, 2], &buf).unwrap();
    assert_eq!(array.data(), &[1, 2, 3, 4, 5, 6]);
}

#[test]
fn negative_stride_reverses() {
    let buf: Vec<u8> = vec![1, 2, 3];
    let dtype = ElementType::of(DataType::UInt8);
    let array = NdArray::from_strided(dtype, vec![3], 2, &[-1], &buf).unwrap();
    assert_eq!(array.data(), &[3, 2, 1]);
}

#[test]
fn strided_out_of_bounds_is_rejected() {
    let buf: Vec<u8> = vec![1, 2, 3];
    let dtype = ElementType::of(DataType::UInt8);
    assert!(NdArray::from_strided(dtype, vec![4], 0, &[1], &buf).is_err());
}

#[test]
fn mixed_sequence_preserves_every_element_type() {
    let array = NdArray::from_vector(ArrayVector::VFloat32(vec![1.0, 2.0]), vec![2]).unwrap();
    let value = Value::Sequence(vec![
        Value::Null,
        Value::Bool(true),
        Value::from(42i64),
        Value::from("plain text"),
        Value::Scalar(ScalarValue::Int16(-7)),
        Value::Array(array),
    ]);
    assert_eq!(roundtrip(value.clone()), value);
}

#[test]
fn mixed_mapping_preserves_every_entry_type() {
    let array = NdArray::from_vector(ArrayVector::VUInt8(vec![9, 8]), vec![2]).unwrap();
    let mut map = BTreeMap::new();
    map.insert("label".to_string(), Value::from("run-1"));
    map.insert("count".to_string(), Value::from(3i64));
    map.insert("weights".to_string(), Value::Array(array));
    map.insert(
        "bias".to_string(),
        Value::Scalar(ScalarValue::Float64(0.125)),
    );
    let value = Value::Mapping(map);
    assert_eq!(roundtrip(value.clone()), value);
}

#[test]
fn big_endian_fragment_decodes() {
    // 0x0102 as big-endian u16.
    let text = r#"{"__arr__":"AQI=","dtype":">u2","shape":[1]}"#;
    let Value::Array(array) = from_str(text).unwrap() else {
        panic!("expected an array");
    };
    assert_eq!(array.get(&[0]).unwrap(), ScalarValue::UInt16(0x0102));
}

#[test]
fn mixed_length_byte_strings_round_trip() {
    // The element type is sized to the longest entry; shorter entries
    // are NUL-padded on the wire and trimmed back on read.
    let vector = ArrayVector::VBytes(vec![b"ab".to_vec(), b"abc".to_vec()]);
    let array = NdArray::from_vector(vector.clone(), vec![2]).unwrap();
    assert_eq!(array.dtype(), &ElementType::of(DataType::Bytes(3)));

    let Value::Array(decoded) = roundtrip(Value::Array(array)) else {
        panic!("expected an array");
    };
    assert_eq!(decoded.get(&[0]).unwrap(), ScalarValue::Bytes(b"ab".to_vec()));
    assert_eq!(decoded.to_vector().unwrap(), vector);
}

#[test]
fn zero_length_string_scalars_are_rejected() {
    let err = to_string(&Value::Scalar(ScalarValue::Str(String::new()))).unwrap_err();
    assert!(matches!(err, ArrayJsonError::UnsupportedType(_)));

    let err = to_string(&Value::Scalar(ScalarValue::Bytes(Vec::new()))).unwrap_err();
    assert!(matches!(err, ArrayJsonError::UnsupportedType(_)));
}

#[test]
fn typed_vector_survives_the_trip() {
    let vector = ArrayVector::VFloat64(vec![1.0, 2.0, 3.0]);
    let array = NdArray::from_vector(vector.clone(), vec![3]).unwrap();
    let Value::Array(decoded) = roundtrip(Value::Array(array)) else {
        panic!("expected an array");
    };
    assert_eq!(decoded.to_vector().unwrap(), vector);
}
