//! ODT Reader - Parses an ODT package into an OdfDocument
//!
//! This module implements an ODT reader that handles:
//! - ZIP archive extraction
//! - Namespace-aware XML parsing of content.xml, styles.xml, meta.xml and settings.xml
//! - Splitting each part into the document's top-level sections
//! - Loading embedded pictures

use crate::odt::api::{OdtWarning, OdtWarningKind};
use crate::odt::error::{OdtError, OdtResult};
use crate::odt::{
    CONTENT_XML, MANIFEST_XML, META_XML, MIMETYPE, MIMETYPE_TEXT, MIMETYPE_TEXT_TEMPLATE,
    PICTURES_DIR, SETTINGS_XML, STYLES_XML,
};
use doc_model::names::attributes::VERSION;
use doc_model::names::elements::*;
use doc_model::names::namespaces::OFFICE;
use doc_model::{
    Attribute, DocModelError, Element, NamespaceMap, OdfDocument, Section, XmlName, XmlNode,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, QName, ResolveResult};
use quick_xml::NsReader;
use std::io::{Read, Seek};
use zip::ZipArchive;

/// Namespace implicitly bound to the `xml` prefix
const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// ODT Reader
pub struct OdtReader<R: Read + Seek> {
    archive: ZipArchive<R>,
    /// Warnings collected during parsing
    warnings: Vec<OdtWarning>,
}

impl<R: Read + Seek> OdtReader<R> {
    /// Create a new ODT reader
    pub fn new(reader: R) -> OdtResult<Self> {
        let archive = ZipArchive::new(reader)?;
        Ok(Self {
            archive,
            warnings: Vec::new(),
        })
    }

    /// Check if this is a valid ODT file
    pub fn is_valid_odt(&self) -> bool {
        // Must have content.xml
        self.archive.file_names().any(|name| name == CONTENT_XML)
    }

    /// Parse the package into its sections
    pub fn parse(mut self) -> OdtResult<(OdfDocument, Vec<OdtWarning>)> {
        if !self.is_valid_odt() {
            return Err(OdtError::missing_part(CONTENT_XML));
        }
        self.check_mimetype()?;

        let mut doc = OdfDocument::with_namespaces(NamespaceMap::new());

        // content.xml first so its font declarations keep precedence
        let content = self.read_file_as_string(CONTENT_XML)?;
        self.parse_content(&content, &mut doc)?;

        if let Some(styles) = self.read_optional(STYLES_XML)? {
            self.parse_styles(&styles, &mut doc)?;
        }
        if let Some(meta) = self.read_optional(META_XML)? {
            let root = self.parse_part(&meta, META_XML, DOCUMENT_META, &mut doc)?;
            doc.meta = single_section(root, META, META_XML)?;
        }
        if let Some(settings) = self.read_optional(SETTINGS_XML)? {
            let root = self.parse_part(&settings, SETTINGS_XML, DOCUMENT_SETTINGS, &mut doc)?;
            doc.settings = single_section(root, SETTINGS, SETTINGS_XML)?;
        }

        self.load_images(&mut doc)?;
        self.note_ignored_parts();

        Ok((doc, self.warnings))
    }

    /// Reject packages that declare a non-text media type
    fn check_mimetype(&mut self) -> OdtResult<()> {
        let Some(mimetype) = self.read_optional(MIMETYPE)? else {
            tracing::debug!("Package has no mimetype entry, assuming text document");
            return Ok(());
        };
        let mimetype = mimetype.trim();
        if mimetype == MIMETYPE_TEXT || mimetype == MIMETYPE_TEXT_TEMPLATE {
            Ok(())
        } else {
            Err(OdtError::unsupported_section(format!("mimetype {}", mimetype)))
        }
    }

    /// Read a file from the archive as string
    fn read_file_as_string(&mut self, path: &str) -> OdtResult<String> {
        let bytes = self.read_file_as_bytes(path)?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Read a file from the archive as bytes
    fn read_file_as_bytes(&mut self, path: &str) -> OdtResult<Vec<u8>> {
        let mut file = self.archive.by_name(path).map_err(|e| {
            if matches!(e, zip::result::ZipError::FileNotFound) {
                OdtError::missing_part(path)
            } else {
                OdtError::from(e)
            }
        })?;

        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        Ok(content)
    }

    /// Read a part that packages may leave out
    fn read_optional(&mut self, path: &str) -> OdtResult<Option<String>> {
        match self.read_file_as_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(OdtError::MissingPart(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Parse one XML part and check its root element
    fn parse_part(
        &mut self,
        xml: &str,
        part: &str,
        root_local: &str,
        doc: &mut OdfDocument,
    ) -> OdtResult<Element> {
        let root = parse_tree(xml, part, &mut doc.namespaces, &mut self.warnings)?;
        if !root.is(OFFICE, root_local) {
            return Err(OdtError::invalid_structure(format!(
                "{}: expected office:{} root, found <{}>",
                part, root_local, root.name
            )));
        }
        Ok(root)
    }

    /// Parse content.xml: scripts, font declarations, automatic styles and the body
    fn parse_content(&mut self, xml: &str, doc: &mut OdfDocument) -> OdtResult<()> {
        let root = self.parse_part(xml, CONTENT_XML, DOCUMENT_CONTENT, doc)?;
        if let Some(version) = root.attribute_ns(OFFICE, VERSION) {
            doc.version = version.to_string();
        }

        let mut has_body = false;
        for child in root.children {
            let XmlNode::Element(child) = child else {
                continue;
            };
            match (child.name.namespace.as_deref(), child.name.local.as_str()) {
                (Some(OFFICE), SCRIPTS) => doc.scripts = section_children(child),
                (Some(OFFICE), FONT_FACE_DECLS) => doc.font_face_decls = section_children(child),
                (Some(OFFICE), AUTOMATIC_STYLES) => doc.automatic_styles = section_children(child),
                (Some(OFFICE), BODY) => {
                    doc.body = body_text(child)?;
                    has_body = true;
                }
                _ => {
                    return Err(OdtError::unsupported_section(format!(
                        "{} in {}",
                        child.name, CONTENT_XML
                    )))
                }
            }
        }

        if !has_body {
            return Err(OdtError::invalid_structure("content.xml has no office:body"));
        }
        Ok(())
    }

    /// Parse styles.xml: font declarations, common, automatic and master styles
    fn parse_styles(&mut self, xml: &str, doc: &mut OdfDocument) -> OdtResult<()> {
        let root = self.parse_part(xml, STYLES_XML, DOCUMENT_STYLES, doc)?;

        for child in root.children {
            let XmlNode::Element(child) = child else {
                continue;
            };
            match (child.name.namespace.as_deref(), child.name.local.as_str()) {
                (Some(OFFICE), FONT_FACE_DECLS) => {
                    doc.add_font_faces(section_children(child));
                }
                (Some(OFFICE), STYLES) => doc.styles = section_children(child),
                (Some(OFFICE), AUTOMATIC_STYLES) => {
                    doc.master_automatic_styles = section_children(child)
                }
                (Some(OFFICE), MASTER_STYLES) => doc.master_styles = section_children(child),
                _ => {
                    return Err(OdtError::unsupported_section(format!(
                        "{} in {}",
                        child.name, STYLES_XML
                    )))
                }
            }
        }
        Ok(())
    }

    /// Load images from the Pictures/ directory
    fn load_images(&mut self, doc: &mut OdfDocument) -> OdtResult<()> {
        let picture_files: Vec<String> = self
            .archive
            .file_names()
            .filter(|name| name.starts_with(PICTURES_DIR) && !name.ends_with('/'))
            .map(|s| s.to_string())
            .collect();

        for path in picture_files {
            let data = self.read_file_as_bytes(&path)?;
            doc.pictures.insert(path, data);
        }

        Ok(())
    }

    fn note_ignored_parts(&mut self) {
        let ignored: Vec<String> = self
            .archive
            .file_names()
            .filter(|name| !name.ends_with('/') && !name.starts_with(PICTURES_DIR))
            .filter(|name| {
                ![MIMETYPE, CONTENT_XML, STYLES_XML, META_XML, SETTINGS_XML, MANIFEST_XML]
                    .contains(name)
            })
            .map(|s| s.to_string())
            .collect();

        for name in ignored {
            tracing::debug!("Ignoring package entry {}", name);
            self.warnings.push(OdtWarning::new(
                OdtWarningKind::IgnoredPart,
                format!("{} is not carried over", name),
            ));
        }
    }
}

/// Children of a section container, minus whitespace-only formatting text
fn section_children(container: Element) -> Section {
    container
        .children
        .into_iter()
        .filter(|node| !node.is_whitespace())
        .collect()
}

/// Content of `office:body`, which must hold an `office:text`
fn body_text(body: Element) -> OdtResult<Section> {
    let kind = body
        .children
        .into_iter()
        .find_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
        .ok_or_else(|| OdtError::invalid_structure("office:body is empty"))?;

    if kind.is(OFFICE, TEXT_ELEM) {
        Ok(section_children(kind))
    } else {
        Err(OdtError::unsupported_section(format!("body kind {}", kind.name)))
    }
}

/// The single container child of meta.xml or settings.xml
fn single_section(root: Element, local: &str, part: &str) -> OdtResult<Section> {
    let mut section = Section::new();
    for child in root.children {
        let XmlNode::Element(child) = child else {
            continue;
        };
        if child.is(OFFICE, local) {
            section.extend(section_children(child));
        } else {
            return Err(OdtError::unsupported_section(format!(
                "{} in {}",
                child.name, part
            )));
        }
    }
    Ok(section)
}

/// Parse an XML part into an owned element tree.
///
/// Namespace declarations are recorded in `namespaces`. A prefix that the
/// part binds to a different URI than an earlier declaration is rewritten to
/// a prefix that is free in `namespaces`.
pub(crate) fn parse_tree(
    xml: &str,
    part: &str,
    namespaces: &mut NamespaceMap,
    warnings: &mut Vec<OdtWarning>,
) -> OdtResult<Element> {
    let mut reader = NsReader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;
    let mut conflicts = false;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                conflicts |= declare_namespaces(&start, part, namespaces, warnings)?;
                stack.push(open_element(&reader, &start)?);
            }
            Event::Empty(start) => {
                conflicts |= declare_namespaces(&start, part, namespaces, warnings)?;
                let element = open_element(&reader, &start)?;
                close_element(&mut stack, &mut root, element, part)?;
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| {
                    OdtError::XmlParse(format!("{}: unbalanced end tag", part))
                })?;
                close_element(&mut stack, &mut root, element, part)?;
            }
            Event::Text(text) => {
                if let Some(parent) = stack.last_mut() {
                    parent.push(XmlNode::Text(text.unescape()?.into_owned()));
                }
            }
            Event::CData(data) => {
                if let Some(parent) = stack.last_mut() {
                    parent.push(XmlNode::Text(String::from_utf8(data.into_inner().into_owned())?));
                }
            }
            Event::Eof => break,
            // Declarations, comments and processing instructions are not kept
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(OdtError::XmlParse(format!("{}: unclosed elements at end of input", part)));
    }
    let mut root = root.ok_or_else(|| OdtError::invalid_structure(format!("{} has no root element", part)))?;
    if conflicts {
        normalize_prefixes(&mut root, namespaces);
    }
    Ok(root)
}

/// Record `xmlns` declarations. Returns true if any of them conflicts with an earlier binding.
fn declare_namespaces(
    start: &BytesStart<'_>,
    part: &str,
    namespaces: &mut NamespaceMap,
    warnings: &mut Vec<OdtWarning>,
) -> OdtResult<bool> {
    let mut conflict = false;
    for attr in start.attributes() {
        let attr = attr?;
        let key = attr.key.as_ref();
        let prefix = if key == b"xmlns" {
            ""
        } else if let Some(prefix) = key.strip_prefix(b"xmlns:") {
            std::str::from_utf8(prefix)
                .map_err(|e| OdtError::XmlParse(format!("{}: {}", part, e)))?
        } else {
            continue;
        };
        let uri = attr.unescape_value()?;
        if !namespaces.bind(prefix, &uri) {
            tracing::warn!("{}: prefix '{}' re-declared as {}", part, prefix, uri);
            warnings.push(OdtWarning::new(
                OdtWarningKind::NamespaceConflict,
                format!("{}: prefix '{}' re-declared as {}", part, prefix, uri),
            ));
            conflict = true;
        }
    }
    Ok(conflict)
}

fn open_element(reader: &NsReader<&[u8]>, start: &BytesStart<'_>) -> OdtResult<Element> {
    let (resolved, local) = reader.resolve_element(start.name());
    let name = resolved_name(resolved, start.name(), local.as_ref())?;
    let mut element = Element::new(name);

    for attr in start.attributes() {
        let attr = attr?;
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        let (resolved, local) = reader.resolve_attribute(attr.key);
        let name = resolved_name(resolved, attr.key, local.as_ref())?;
        element
            .attributes
            .push(Attribute::new(name, attr.unescape_value()?.into_owned()));
    }

    Ok(element)
}

fn resolved_name(resolved: ResolveResult<'_>, qname: QName<'_>, local: &[u8]) -> OdtResult<XmlName> {
    let namespace = match resolved {
        ResolveResult::Bound(Namespace(uri)) => Some(String::from_utf8(uri.to_vec())?),
        ResolveResult::Unbound => None,
        ResolveResult::Unknown(prefix) if prefix == b"xml" => Some(XML_NAMESPACE.to_string()),
        ResolveResult::Unknown(prefix) => {
            let prefix = String::from_utf8_lossy(&prefix).into_owned();
            return Err(DocModelError::UnboundPrefix(prefix).into());
        }
    };
    let prefix = match qname.prefix() {
        Some(prefix) => Some(String::from_utf8(prefix.as_ref().to_vec())?),
        None => None,
    };
    Ok(XmlName {
        namespace,
        prefix,
        local: String::from_utf8(local.to_vec())?,
    })
}

fn close_element(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
    part: &str,
) -> OdtResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.push(XmlNode::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(OdtError::XmlParse(format!("{}: more than one root element", part)))
        }
    }
    Ok(())
}

/// Give every name a prefix that `namespaces` binds to the name's URI
fn normalize_prefixes(root: &mut Element, namespaces: &mut NamespaceMap) {
    root.visit_mut(&mut |element| {
        normalize_name(&mut element.name, namespaces);
        for attr in &mut element.attributes {
            normalize_name(&mut attr.name, namespaces);
        }
    });
}

fn normalize_name(name: &mut XmlName, namespaces: &mut NamespaceMap) {
    let Some(uri) = name.namespace.as_deref() else {
        return;
    };
    if uri == XML_NAMESPACE {
        return;
    }
    if namespaces.uri(name.prefix.as_deref().unwrap_or("")) == Some(uri) {
        return;
    }
    let prefix = namespaces.ensure(uri);
    name.prefix = if prefix.is_empty() { None } else { Some(prefix) };
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::names::namespaces::{STYLE, TEXT};
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const NS: &str = r#"xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:style="urn:oasis:names:tc:opendocument:xmlns:style:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0""#;

    fn parse(xml: &str) -> (Element, NamespaceMap, Vec<OdtWarning>) {
        let mut namespaces = NamespaceMap::new();
        let mut warnings = Vec::new();
        let root = parse_tree(xml, "test.xml", &mut namespaces, &mut warnings).unwrap();
        (root, namespaces, warnings)
    }

    fn package(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    fn content_xml(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><office:document-content {} office:version="1.2"><office:automatic-styles><style:style style:name="P1" style:family="paragraph"/></office:automatic-styles><office:body><office:text>{}</office:text></office:body></office:document-content>"#,
            NS, body
        )
    }

    #[test]
    fn test_parse_tree_resolves_namespaces() {
        let (root, namespaces, warnings) = parse(&format!(
            r#"<office:text {}><text:p text:style-name="P1">a &amp; b</text:p></office:text>"#,
            NS
        ));

        assert!(root.is(OFFICE, "text"));
        let p = root.find_child(TEXT, "p").unwrap();
        assert_eq!(p.attribute_ns(TEXT, "style-name"), Some("P1"));
        assert_eq!(p.text_content(), "a & b");
        assert_eq!(namespaces.uri("style"), Some(STYLE));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_parse_tree_keeps_whitespace_inside_paragraphs() {
        let (root, _, _) = parse(&format!(
            r#"<office:text {}><text:p> two  words </text:p></office:text>"#,
            NS
        ));
        assert_eq!(root.text_content(), " two  words ");
    }

    #[test]
    fn test_parse_tree_rejects_undeclared_prefix() {
        let mut namespaces = NamespaceMap::new();
        let mut warnings = Vec::new();
        let result = parse_tree("<bogus:p/>", "test.xml", &mut namespaces, &mut warnings);
        assert!(matches!(
            result,
            Err(OdtError::DocModel(DocModelError::UnboundPrefix(ref prefix))) if prefix == "bogus"
        ));
    }

    #[test]
    fn test_parse_tree_renames_conflicting_prefix() {
        let (root, namespaces, warnings) = parse(
            r#"<a:root xmlns:a="urn:example:a"><a:child xmlns:a="urn:example:b"/></a:root>"#,
        );

        let child = root.child_elements().next().unwrap();
        assert_eq!(child.name.namespace.as_deref(), Some("urn:example:b"));
        let prefix = child.name.prefix.as_deref().unwrap();
        assert_ne!(prefix, "a");
        assert_eq!(namespaces.uri(prefix), Some("urn:example:b"));
        assert_eq!(warnings[0].kind, OdtWarningKind::NamespaceConflict);
    }

    #[test]
    fn test_parse_package_sections() {
        let styles = format!(
            r#"<office:document-styles {}><office:font-face-decls><style:font-face style:name="Serif"/></office:font-face-decls><office:styles><style:style style:name="Standard" style:family="paragraph"/></office:styles><office:master-styles><style:master-page style:name="Default"/></office:master-styles></office:document-styles>"#,
            NS
        );
        let bytes = package(&[
            ("mimetype", MIMETYPE_TEXT),
            ("content.xml", &content_xml(r#"<text:p text:style-name="P1">Hello</text:p>"#)),
            ("styles.xml", &styles),
            ("Pictures/a.png", "png"),
            ("Thumbnails/thumbnail.png", "png"),
        ]);

        let (doc, warnings) = OdtReader::new(Cursor::new(bytes)).unwrap().parse().unwrap();
        assert_eq!(doc.version, "1.2");
        assert_eq!(doc.body.len(), 1);
        assert_eq!(doc.style_names(), vec!["Standard", "P1"]);
        assert_eq!(doc.font_face_decls.len(), 1);
        assert_eq!(doc.master_styles.len(), 1);
        assert_eq!(doc.pictures.get("Pictures/a.png").map(Vec::len), Some(3));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, OdtWarningKind::IgnoredPart);
    }

    #[test]
    fn test_missing_content_is_rejected() {
        let bytes = package(&[("mimetype", MIMETYPE_TEXT)]);
        let result = OdtReader::new(Cursor::new(bytes)).unwrap().parse();
        assert!(matches!(result, Err(OdtError::MissingPart(_))));
    }

    #[test]
    fn test_spreadsheet_is_unsupported() {
        let bytes = package(&[
            ("mimetype", "application/vnd.oasis.opendocument.spreadsheet"),
            ("content.xml", &content_xml("")),
        ]);
        let result = OdtReader::new(Cursor::new(bytes)).unwrap().parse();
        assert!(matches!(result, Err(OdtError::UnsupportedSection(_))));
    }

    #[test]
    fn test_non_text_body_is_unsupported() {
        let content = format!(
            r#"<office:document-content {}><office:body><office:spreadsheet/></office:body></office:document-content>"#,
            NS
        );
        let bytes = package(&[("content.xml", &content)]);
        let result = OdtReader::new(Cursor::new(bytes)).unwrap().parse();
        assert!(matches!(result, Err(OdtError::UnsupportedSection(_))));
    }

    #[test]
    fn test_unknown_content_section_is_unsupported() {
        let content = format!(
            r#"<office:document-content {}><office:forms/><office:body><office:text/></office:body></office:document-content>"#,
            NS
        );
        let bytes = package(&[("content.xml", &content)]);
        let result = OdtReader::new(Cursor::new(bytes)).unwrap().parse();
        assert!(matches!(result, Err(OdtError::UnsupportedSection(_))));
    }

    #[test]
    fn test_malformed_xml_is_a_parse_error() {
        let bytes = package(&[("content.xml", "<office:document-content")]);
        let result = OdtReader::new(Cursor::new(bytes)).unwrap().parse();
        assert!(matches!(result, Err(OdtError::XmlParse(_))));
    }
}
