use arrayjson::{
    ArrayJsonError, DataType, ElementType, Endian, Field, format_descriptor, parse_descriptor,
};

fn scalar(dtype: DataType, endian: Endian) -> ElementType {
    ElementType::Scalar { dtype, endian }
}

#[test]
fn scalar_descriptors_parse() {
    assert_eq!(
        parse_descriptor("<f4").unwrap(),
        scalar(DataType::Float32, Endian::Little)
    );
    assert_eq!(
        parse_descriptor(">u8").unwrap(),
        scalar(DataType::UInt64, Endian::Big)
    );
    assert_eq!(
        parse_descriptor("|b1").unwrap(),
        scalar(DataType::Bool, Endian::NotApplicable)
    );
    assert_eq!(
        parse_descriptor("|S3").unwrap(),
        scalar(DataType::Bytes(3), Endian::NotApplicable)
    );
    assert_eq!(
        parse_descriptor("<U5").unwrap(),
        scalar(DataType::Str(5), Endian::Little)
    );
    assert_eq!(
        parse_descriptor("<c16").unwrap(),
        scalar(DataType::Complex128, Endian::Little)
    );
    assert_eq!(
        parse_descriptor("<f2").unwrap(),
        scalar(DataType::Float16, Endian::Little)
    );
}

#[test]
fn parse_format_round_trip_is_canonical() {
    for descr in ["<f4", ">u8", "|b1", "|i1", "|u1", "<i2", ">i4", "<c8", "|S3", "<U5", ">f8"] {
        let ty = parse_descriptor(descr).unwrap();
        let ElementType::Scalar { dtype, endian } = &ty else {
            panic!("expected a scalar descriptor");
        };
        assert_eq!(format_descriptor(dtype, *endian), descr);
    }
}

#[test]
fn byte_order_insensitive_types_format_with_pipe() {
    // The marker is normalized for types it cannot apply to.
    let ty = parse_descriptor("<u1").unwrap();
    let ElementType::Scalar { dtype, endian } = ty else {
        panic!("expected a scalar descriptor");
    };
    assert_eq!(endian, Endian::NotApplicable);
    assert_eq!(format_descriptor(&dtype, endian), "|u1");
}

#[test]
fn malformed_descriptors_are_rejected() {
    for bad in ["", "f", "f4", "=f4", "<q4", "<f3", "<i0", "<ix", "<b2", "<c4"] {
        let err = parse_descriptor(bad).unwrap_err();
        assert!(
            matches!(err, ArrayJsonError::Descriptor(_)),
            "{bad}: {err:?}"
        );
    }
}

#[test]
fn compound_json_descriptor_round_trips_in_order() {
    let json = serde_json::json!([["b", "<i8"], ["a", "<f8"]]);
    let ty = ElementType::from_json(&json).unwrap();
    let ElementType::Compound { fields } = &ty else {
        panic!("expected a compound descriptor");
    };
    assert_eq!(fields[0].name, "b");
    assert_eq!(fields[1].name, "a");
    assert_eq!(ty.to_json(), json);
}

#[test]
fn compound_with_shaped_and_nested_fields() {
    let json = serde_json::json!([
        ["id", "<u4"],
        ["pos", "<f4", [2, 3]],
        ["inner", [["x", "|u1"]]]
    ]);
    let ty = ElementType::from_json(&json).unwrap();
    assert_eq!(ty.item_size(), 4 + 4 * 6 + 1);
    assert_eq!(ty.field_offsets(), vec![0, 4, 28]);
    assert_eq!(ty.to_json(), json);
}

#[test]
fn duplicate_field_names_are_rejected() {
    let json = serde_json::json!([["a", "<i4"], ["a", "<f8"]]);
    assert!(matches!(
        ElementType::from_json(&json).unwrap_err(),
        ArrayJsonError::Descriptor(_)
    ));
}

#[test]
fn empty_compound_is_rejected() {
    let json = serde_json::json!([]);
    assert!(ElementType::from_json(&json).is_err());
}

#[test]
fn field_shape_must_be_positive_integers() {
    let json = serde_json::json!([["a", "<i4", [0]]]);
    assert!(ElementType::from_json(&json).is_err());
    let json = serde_json::json!([["a", "<i4", [-1]]]);
    assert!(ElementType::from_json(&json).is_err());
    let json = serde_json::json!([["a", "<i4", "3"]]);
    assert!(ElementType::from_json(&json).is_err());
}

#[test]
fn item_sizes() {
    assert_eq!(ElementType::of(DataType::Bool).item_size(), 1);
    assert_eq!(ElementType::of(DataType::Complex128).item_size(), 16);
    assert_eq!(ElementType::of(DataType::Bytes(7)).item_size(), 7);
    assert_eq!(ElementType::of(DataType::Str(5)).item_size(), 20);
}

#[test]
fn serde_round_trip_through_json_value() {
    let ty = ElementType::compound(vec![
        Field {
            name: "a".to_string(),
            ty: ElementType::of(DataType::Float64),
            shape: vec![],
        },
        Field {
            name: "b".to_string(),
            ty: ElementType::of(DataType::Bytes(4)),
            shape: vec![2],
        },
    ]);
    let json = serde_json::to_value(&ty).unwrap();
    let back: ElementType = serde_json::from_value(json).unwrap();
    assert_eq!(back, ty);
}
