//! Error types for mat-matml

use mat_model::MaterialError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MatmlError>;

#[derive(Error, Debug)]
pub enum MatmlError {
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("missing element: {0}")]
    MissingElement(String),

    #[error("invalid number '{value}' in {context}")]
    InvalidNumber { value: String, context: String },

    #[error(transparent)]
    Model(#[from] MaterialError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
