use std::io;
use thiserror::Error;

/// Errors raised by the library when input data does not have the expected shape.
#[derive(Debug, Error)]
pub enum BookError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Configuration failed validation
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid roman numeral: {0:?}")]
    InvalidRoman(String),

    /// A chapter module could not be read back
    #[error("malformed chapter file: {0}")]
    MalformedChapter(String),

    /// Required part missing from a Word document
    #[error("invalid document structure: {0}")]
    InvalidDocument(String),
}

pub type Result<T> = std::result::Result<T, BookError>;
