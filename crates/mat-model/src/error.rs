//! Error types for mat-model

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MaterialError>;

#[derive(Error, Debug)]
pub enum MaterialError {
    #[error("qualifier '{name}' must be '{expected}', got '{actual}'")]
    QualifierMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("qualifier '{name}' value '{actual}' is not one of [{allowed}]")]
    QualifierNotAllowed {
        name: String,
        actual: String,
        allowed: String,
    },

    #[error("{model}: missing value for '{field}'")]
    MissingValue { model: String, field: String },

    #[error("'{name}' has no values")]
    EmptyValue { name: String },

    #[error("'{dependent}' has {dependent_len} values but '{independent}' has {independent_len}")]
    CardinalityMismatch {
        dependent: String,
        dependent_len: usize,
        independent: String,
        independent_len: usize,
    },

    #[error("'{dependent}' has {count} values but no independent parameters were given")]
    MissingIndependentParameters { dependent: String, count: usize },

    #[error("{model} has no field '{field}'")]
    UnknownField { model: String, field: String },

    #[error("unit '{actual}' of '{field}' is not compatible with '{expected}'")]
    IncompatibleUnit {
        field: String,
        actual: String,
        expected: String,
    },

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
