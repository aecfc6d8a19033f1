//! Error types for merge operations

use store::OdtError;
use thiserror::Error;

/// Errors that can occur during a merge job
#[derive(Debug, Error)]
pub enum MergeError {
    /// A source package could not be parsed
    #[error("Source document {index} ({id}) is malformed: {source}")]
    MalformedSourceDocument {
        index: usize,
        id: String,
        #[source]
        source: OdtError,
    },

    /// A renamed style identifier already names a style in the accumulator
    #[error("Style '{name}' from document {ordinal} collides with an existing style")]
    StyleResolutionConflict { name: String, ordinal: usize },

    /// A source package holds a section the merger cannot merge
    #[error("Source document {index} ({id}) has an unsupported section: {section}")]
    UnsupportedDocumentSection {
        index: usize,
        id: String,
        section: String,
    },

    /// Token set rejected
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Error writing the merged package
    #[error("Package error: {0}")]
    Package(#[from] OdtError),
}

/// Result type for merge operations
pub type Result<T> = std::result::Result<T, MergeError>;
