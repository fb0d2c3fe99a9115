use thiserror::Error;

pub type ArrayJsonResult<T> = Result<T, ArrayJsonError>;

#[derive(Error, Debug)]
pub enum ArrayJsonError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    #[error("Descriptor error: {0}")]
    Descriptor(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Shape mismatch: expected {expected} bytes, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),
}
