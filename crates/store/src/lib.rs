//! Store - ODT package file I/O
//!
//! This crate reads OpenDocument Text packages into the section model of
//! `doc_model` and writes merged documents back out as valid packages.

pub mod odt;

pub use odt::{
    export_odt, export_odt_bytes, import_odt, import_odt_bytes, OdtError, OdtImportResult,
    OdtResult, OdtWarning, OdtWarningKind,
};
