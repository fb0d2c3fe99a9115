use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use arrayjson::{
    ArrayJsonError, ArrayVector, CustomValue, DecodeHooks, EncodeHooks, NdArray, ScalarValue,
    Value, from_str_with, to_string_pretty_with, to_string_with,
};

// An application type the array encoder knows nothing about.
#[derive(Debug, Clone, PartialEq)]
struct Temperature {
    celsius: f64,
}

impl CustomValue for Temperature {
    fn type_name(&self) -> &str {
        "Temperature"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// An application type that exposes the array capability.
#[derive(Debug)]
struct Matrix {
    rows: usize,
    cols: usize,
    values: Vec<f32>,
}

impl CustomValue for Matrix {
    fn type_name(&self) -> &str {
        "Matrix"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_array(&self) -> Option<NdArray> {
        NdArray::from_vector(
            ArrayVector::VFloat32(self.values.clone()),
            vec![self.rows, self.cols],
        )
        .ok()
    }
}

fn temperature_hooks() -> (EncodeHooks, DecodeHooks) {
    let encode = EncodeHooks::with_fallback(|custom| {
        let temp = custom
            .as_any()
            .downcast_ref::<Temperature>()
            .ok_or_else(|| ArrayJsonError::UnsupportedType(custom.type_name().to_string()))?;
        Ok(serde_json::json!({ "__temp__": temp.celsius }))
    });
    let decode = DecodeHooks::with_object_hook(|map| {
        if let Some(celsius) = map.get("__temp__").and_then(Value::as_f64) {
            return Value::Other(Arc::new(Temperature { celsius }));
        }
        Value::Mapping(map)
    });
    (encode, decode)
}

#[test]
fn unsupported_value_without_fallback_names_the_type() {
    let value = Value::Other(Arc::new(Temperature { celsius: 21.5 }));
    let err = to_string_with(&value, &EncodeHooks::new()).unwrap_err();
    match err {
        ArrayJsonError::UnsupportedType(name) => assert_eq!(name, "Temperature"),
        other => panic!("expected UnsupportedType, got {other:?}"),
    }
}

#[test]
fn caller_fallback_handles_values_the_encoder_does_not() {
    let (encode, decode) = temperature_hooks();
    let value = Value::Other(Arc::new(Temperature { celsius: 21.5 }));

    let text = to_string_with(&value, &encode).unwrap();
    let back = from_str_with(&text, &decode).unwrap();

    let Value::Other(custom) = back else {
        panic!("expected the caller's type back, got {back:?}");
    };
    let temp = custom.as_any().downcast_ref::<Temperature>().unwrap();
    assert_eq!(temp, &Temperature { celsius: 21.5 });
}

#[test]
fn array_capability_wins_over_fallback() {
    // The fallback would happily serialize anything; the array path
    // must still take precedence for array-shaped values.
    let encode = EncodeHooks::with_fallback(|_| Ok(serde_json::json!("fallback")));
    let value = Value::Other(Arc::new(Matrix {
        rows: 2,
        cols: 2,
        values: vec![1.0, 2.0, 3.0, 4.0],
    }));

    let text = to_string_with(&value, &encode).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["dtype"], "<f4");
    assert_eq!(json["shape"], serde_json::json!([2, 2]));

    let Value::Array(decoded) = from_str_with(&text, &DecodeHooks::new()).unwrap() else {
        panic!("expected an array");
    };
    assert_eq!(
        decoded.to_vector().unwrap(),
        ArrayVector::VFloat32(vec![1.0, 2.0, 3.0, 4.0])
    );
}

#[test]
fn caller_fallback_errors_pass_through_unchanged() {
    let encode = EncodeHooks::with_fallback(|custom| {
        Err(ArrayJsonError::UnsupportedType(format!(
            "caller rejects {}",
            custom.type_name()
        )))
    });
    let value = Value::Other(Arc::new(Temperature { celsius: 0.0 }));
    let err = to_string_with(&value, &encode).unwrap_err();
    match err {
        ArrayJsonError::UnsupportedType(msg) => assert_eq!(msg, "caller rejects Temperature"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn object_hook_runs_before_fragment_detection() {
    // A hook that expands a caller-specific shorthand into a fragment:
    // the decoder must re-examine the hook's output.
    let decode = DecodeHooks::with_object_hook(|map| {
        if let Some(payload) = map.get("packed").and_then(Value::as_str) {
            let mut fragment = BTreeMap::new();
            fragment.insert(
                "__arr__".to_string(),
                Value::String(payload.to_string()),
            );
            fragment.insert("dtype".to_string(), Value::from("|u1"));
            fragment.insert(
                "shape".to_string(),
                Value::Sequence(vec![Value::from(4u64)]),
            );
            return Value::Mapping(fragment);
        }
        Value::Mapping(map)
    });

    let text = r#"{"packed":"AQIDBA=="}"#;
    let Value::Array(array) = from_str_with(text, &decode).unwrap() else {
        panic!("expected an array");
    };
    assert_eq!(
        array.to_vector().unwrap(),
        ArrayVector::VUInt8(vec![1, 2, 3, 4])
    );
}

#[test]
fn object_hook_sees_plain_mappings_and_fragments_still_decode() {
    let decode = DecodeHooks::with_object_hook(|mut map| {
        // Tag every plain mapping the hook sees.
        if !map.contains_key("__arr__") {
            map.insert("seen".to_string(), Value::Bool(true));
        }
        Value::Mapping(map)
    });

    let text = r#"{"plain":{"k":1},"arr":{"__arr__":"AQI=","dtype":"|u1","shape":[2]}}"#;
    let Value::Mapping(map) = from_str_with(text, &decode).unwrap() else {
        panic!("expected a mapping");
    };

    let plain = map["plain"].as_mapping().unwrap();
    assert_eq!(plain["seen"], Value::Bool(true));
    assert!(map["arr"].is_array());
}

#[test]
fn pretty_printing_consults_explicit_hooks() {
    let (encode, decode) = temperature_hooks();
    let value = Value::Other(Arc::new(Temperature { celsius: 21.5 }));

    let text = to_string_pretty_with(&value, &encode).unwrap();
    assert!(text.contains("__temp__"));

    let back = from_str_with(&text, &decode).unwrap();
    let Value::Other(custom) = back else {
        panic!("expected the caller's type back, got {back:?}");
    };
    let temp = custom.as_any().downcast_ref::<Temperature>().unwrap();
    assert_eq!(temp, &Temperature { celsius: 21.5 });
}

#[test]
fn scalar_values_do_not_reach_the_fallback() {
    let encode = EncodeHooks::with_fallback(|_| Ok(serde_json::json!("fallback")));
    let text = to_string_with(&Value::Scalar(ScalarValue::UInt8(3)), &encode).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["dtype"], "|u1");
}
