//! Public API for ODT import and export
//!
//! This module provides the main entry points for reading and writing ODT files.

use crate::odt::error::{OdtError, OdtResult};
use crate::odt::reader::OdtReader;
use crate::odt::writer::OdtWriter;
use doc_model::OdfDocument;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Write};
use std::path::Path;

/// Warning about package content that was not carried over as-is
#[derive(Debug, Clone)]
pub struct OdtWarning {
    /// Kind of warning
    pub kind: OdtWarningKind,
    /// Description of the issue
    pub message: String,
}

impl OdtWarning {
    pub fn new(kind: OdtWarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Types of import warnings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OdtWarningKind {
    /// A package entry outside the merged parts was dropped
    IgnoredPart,
    /// A namespace prefix was bound to two different URIs
    NamespaceConflict,
}

impl std::fmt::Display for OdtWarningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OdtWarningKind::IgnoredPart => write!(f, "Ignored part"),
            OdtWarningKind::NamespaceConflict => write!(f, "Namespace conflict"),
        }
    }
}

impl std::fmt::Display for OdtWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Result of importing an ODT file
#[derive(Debug)]
pub struct OdtImportResult {
    /// The imported document
    pub document: OdfDocument,
    /// Warnings encountered during import
    pub warnings: Vec<OdtWarning>,
}

impl OdtImportResult {
    /// Check if there were any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Get the number of warnings
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Get warnings of a specific kind
    pub fn warnings_of_kind(&self, kind: OdtWarningKind) -> Vec<&OdtWarning> {
        self.warnings.iter().filter(|w| w.kind == kind).collect()
    }
}

/// Import an ODT file from disk
///
/// # Example
///
/// ```ignore
/// use store::odt::import_odt;
/// use std::path::Path;
///
/// let result = import_odt(Path::new("status.odt"))?;
/// println!("Imported document with {} warnings", result.warning_count());
/// ```
pub fn import_odt(path: &Path) -> OdtResult<OdtImportResult> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            OdtError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {}", path.display()),
            ))
        } else {
            OdtError::Io(e)
        }
    })?;

    let odt_reader = OdtReader::new(BufReader::new(file))?;
    let (document, warnings) = odt_reader.parse()?;

    Ok(OdtImportResult { document, warnings })
}

/// Import ODT from an in-memory byte slice
pub fn import_odt_bytes(bytes: &[u8]) -> OdtResult<OdtImportResult> {
    let odt_reader = OdtReader::new(Cursor::new(bytes))?;
    let (document, warnings) = odt_reader.parse()?;

    Ok(OdtImportResult { document, warnings })
}

/// Export a document to an ODT file on disk
pub fn export_odt(document: &OdfDocument, path: &Path) -> OdtResult<()> {
    let file = File::create(path)?;
    let mut writer = OdtWriter::new(BufWriter::new(file)).write(document)?;
    writer.flush()?;
    Ok(())
}

/// Export a document to ODT bytes in memory
pub fn export_odt_bytes(document: &OdfDocument) -> OdtResult<Vec<u8>> {
    let cursor = OdtWriter::new(Cursor::new(Vec::new())).write(document)?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::names::namespaces::TEXT;
    use doc_model::{Element, XmlNode};
    use proptest::prelude::*;

    #[test]
    fn test_import_result_warnings() {
        let result = OdtImportResult {
            document: OdfDocument::new_text(),
            warnings: vec![
                OdtWarning::new(OdtWarningKind::IgnoredPart, "Thumbnails/thumbnail.png"),
                OdtWarning::new(OdtWarningKind::NamespaceConflict, "prefix 'x'"),
            ],
        };

        assert!(result.has_warnings());
        assert_eq!(result.warning_count(), 2);
        assert_eq!(result.warnings_of_kind(OdtWarningKind::IgnoredPart).len(), 1);
    }

    #[test]
    fn test_import_nonexistent_file() {
        let result = import_odt(Path::new("/nonexistent/path/document.odt"));
        assert!(matches!(result, Err(OdtError::Io(_))));
    }

    #[test]
    fn test_import_invalid_bytes() {
        let invalid_data = b"This is not an ODT file";
        let result = import_odt_bytes(invalid_data);
        assert!(matches!(result, Err(OdtError::Zip(_))));
    }

    #[test]
    fn test_export_then_import_keeps_body() {
        let mut doc = OdfDocument::new_text();
        let p = doc.name(TEXT, "p");
        doc.body.push(XmlNode::Element(
            Element::new(p).with_child(XmlNode::Text("Status: green".to_string())),
        ));

        let bytes = export_odt_bytes(&doc).unwrap();
        let imported = import_odt_bytes(&bytes).unwrap();

        assert!(!imported.has_warnings());
        assert_eq!(imported.document.body, doc.body);
        assert_eq!(imported.document.version, doc.version);
    }

    #[test]
    fn test_export_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.odt");

        export_odt(&OdfDocument::new_text(), &path).unwrap();
        let imported = import_odt(&path).unwrap();
        assert!(imported.document.body.is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn markup_characters_survive_export(
            text in "[a-zA-Z0-9 <>&\"'.,;%-]{1,40}",
            style in "[a-zA-Z0-9 <>&\"'_-]{1,20}",
        ) {
            let mut doc = OdfDocument::new_text();
            let p = doc.name(TEXT, "p");
            let style_name = doc.name(TEXT, "style-name");
            doc.body.push(XmlNode::Element(
                Element::new(p)
                    .with_attribute(style_name, style.clone())
                    .with_child(XmlNode::Text(text.clone())),
            ));

            let bytes = export_odt_bytes(&doc).unwrap();
            let imported = import_odt_bytes(&bytes).unwrap().document;
            let paragraph = imported.body_elements().next().unwrap();

            prop_assert_eq!(paragraph.text_content(), text);
            prop_assert_eq!(
                paragraph.attribute_ns(TEXT, "style-name"),
                Some(style.as_str())
            );
        }
    }
}
