//! Document Model - ODF document tree structure and types
//!
//! This crate provides the in-memory representation the merge engine works on:
//! an owned, namespace-resolved XML tree and the section layout of an
//! OpenDocument text package.

mod document;
mod error;
pub mod names;
mod namespace;
mod xml;

pub use document::*;
pub use error::*;
pub use namespace::*;
pub use xml::*;
