//! Error types for document model operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocModelError {
    /// A qualified name uses a prefix no enclosing element declares
    #[error("Namespace prefix not bound: {0}")]
    UnboundPrefix(String),
}

pub type Result<T> = std::result::Result<T, DocModelError>;
