//! Error types for ODT operations

use thiserror::Error;

/// Errors that can occur while reading or writing ODT packages
#[derive(Debug, Error)]
pub enum OdtError {
    /// IO error (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML parsing error
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// XML serialization error
    #[error("XML writing error: {0}")]
    XmlWrite(String),

    /// Invalid ODT structure
    #[error("Invalid ODT structure: {0}")]
    InvalidStructure(String),

    /// Missing required part
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// The package holds content that is not an ODF text document
    #[error("Unsupported document section: {0}")]
    UnsupportedSection(String),

    /// Document model error
    #[error("Document model error: {0}")]
    DocModel(#[from] doc_model::DocModelError),

    /// UTF-8 encoding error
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl From<quick_xml::Error> for OdtError {
    fn from(err: quick_xml::Error) -> Self {
        OdtError::XmlParse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for OdtError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        OdtError::XmlParse(format!("Attribute error: {}", err))
    }
}

impl OdtError {
    /// Create an invalid structure error
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure(message.into())
    }

    /// Create a missing part error
    pub fn missing_part(part: impl Into<String>) -> Self {
        Self::MissingPart(part.into())
    }

    /// Create an unsupported section error
    pub fn unsupported_section(section: impl Into<String>) -> Self {
        Self::UnsupportedSection(section.into())
    }
}

/// Result type for ODT operations
pub type OdtResult<T> = std::result::Result<T, OdtError>;
