//! Error types for mat-mapdl

use mat_model::MaterialError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MapdlError>;

#[derive(Error, Debug)]
pub enum MapdlError {
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Model(#[from] MaterialError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("material id: {0}")]
    MaterialId(String),

    #[error("session error: {0}")]
    Session(Box<dyn std::error::Error + Send + Sync>),
}

impl MapdlError {
    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        MapdlError::Model(MaterialError::Unsupported(message.into()))
    }
}
