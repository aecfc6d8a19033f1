//! ODT Module
//!
//! This module reads and writes OpenDocument Text (ODT) packages.
//! ODT is the native format for LibreOffice Writer and other OpenDocument-compatible
//! applications. It is an open standard defined by OASIS.
//!
//! ## ODT Structure
//!
//! An ODT file is a ZIP archive containing:
//! - `mimetype` - Media type of the package, stored uncompressed as the first entry
//! - `content.xml` - Automatic styles and the document body
//! - `styles.xml` - Common styles, master pages and their automatic styles
//! - `meta.xml` - Metadata (title, author, etc.)
//! - `settings.xml` - Application settings
//! - `Pictures/` - Embedded images
//! - `META-INF/manifest.xml` - Package manifest
//!
//! Parts are parsed into the sections of a [`doc_model::OdfDocument`] without
//! interpreting their content, so anything the merger does not touch is
//! written back unchanged.

mod api;
mod error;
mod reader;
mod writer;

pub use api::{
    export_odt, export_odt_bytes, import_odt, import_odt_bytes, OdtImportResult, OdtWarning,
    OdtWarningKind,
};
pub use error::{OdtError, OdtResult};
pub use reader::OdtReader;
pub use writer::OdtWriter;

/// Media type of an ODF text document
pub const MIMETYPE_TEXT: &str = "application/vnd.oasis.opendocument.text";
/// Media type of an ODF text template
pub const MIMETYPE_TEXT_TEMPLATE: &str = "application/vnd.oasis.opendocument.text-template";

// Package entries
pub const MIMETYPE: &str = "mimetype";
pub const CONTENT_XML: &str = "content.xml";
pub const STYLES_XML: &str = "styles.xml";
pub const META_XML: &str = "meta.xml";
pub const SETTINGS_XML: &str = "settings.xml";
pub const MANIFEST_XML: &str = "META-INF/manifest.xml";
pub const PICTURES_DIR: &str = "Pictures/";
