//! ODT Writer - Serializes an OdfDocument into an ODT package
//!
//! The package layout is:
//! - `mimetype` (stored, always the first entry)
//! - `content.xml`, `styles.xml`, `meta.xml`, `settings.xml`
//! - `Pictures/*` (stored)
//! - `META-INF/manifest.xml`

use crate::odt::error::{OdtError, OdtResult};
use crate::odt::{
    CONTENT_XML, MANIFEST_XML, META_XML, MIMETYPE, MIMETYPE_TEXT, SETTINGS_XML, STYLES_XML,
};
use doc_model::names::elements::*;
use doc_model::names::namespaces::{MANIFEST, OFFICE};
use doc_model::{Element, NamespaceMap, OdfDocument, Section, SectionKind, XmlNode};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Entry in META-INF/manifest.xml
#[derive(Debug, Clone)]
struct ManifestEntry {
    full_path: String,
    media_type: String,
}

/// ODT Writer
pub struct OdtWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    manifest: Vec<ManifestEntry>,
}

impl<W: Write + Seek> OdtWriter<W> {
    /// Create a new ODT writer
    pub fn new(writer: W) -> Self {
        Self {
            zip: ZipWriter::new(writer),
            manifest: Vec::new(),
        }
    }

    /// Write the document and finish the archive
    pub fn write(mut self, doc: &OdfDocument) -> OdtResult<W> {
        let mut namespaces = doc.namespaces.clone();
        let office = namespaces.ensure(OFFICE);
        let parts = PartWriter {
            namespaces: &namespaces,
            office: &office,
            version: &doc.version,
        };

        // The mimetype must come first and must not be compressed
        self.write_stored(MIMETYPE, MIMETYPE_TEXT.as_bytes())?;
        self.manifest.push(ManifestEntry {
            full_path: "/".to_string(),
            media_type: MIMETYPE_TEXT.to_string(),
        });

        let content = parts.render(
            DOCUMENT_CONTENT,
            doc,
            &[
                SectionKind::Scripts,
                SectionKind::FontFaceDecls,
                SectionKind::AutomaticStyles,
                SectionKind::Body,
            ],
        )?;
        self.write_part(CONTENT_XML, content.as_bytes())?;

        let styles = parts.render(
            DOCUMENT_STYLES,
            doc,
            &[
                SectionKind::FontFaceDecls,
                SectionKind::Styles,
                SectionKind::MasterAutomaticStyles,
                SectionKind::MasterStyles,
            ],
        )?;
        self.write_part(STYLES_XML, styles.as_bytes())?;

        let meta = parts.render(DOCUMENT_META, doc, &[SectionKind::Meta])?;
        self.write_part(META_XML, meta.as_bytes())?;

        let settings = parts.render(DOCUMENT_SETTINGS, doc, &[SectionKind::Settings])?;
        self.write_part(SETTINGS_XML, settings.as_bytes())?;

        for (path, data) in &doc.pictures {
            self.write_stored(path, data)?;
            self.manifest.push(ManifestEntry {
                full_path: path.clone(),
                media_type: guess_media_type(path).to_string(),
            });
        }

        let manifest = render_manifest(&self.manifest, &doc.version)?;
        self.zip
            .start_file(MANIFEST_XML, deflated())?;
        self.zip.write_all(manifest.as_bytes())?;

        tracing::debug!(
            "Wrote ODT package with {} body elements and {} pictures",
            doc.body.len(),
            doc.pictures.len()
        );
        Ok(self.zip.finish()?)
    }

    /// Write a compressed XML part and list it in the manifest
    fn write_part(&mut self, path: &str, content: &[u8]) -> OdtResult<()> {
        self.zip.start_file(path, deflated())?;
        self.zip.write_all(content)?;
        self.manifest.push(ManifestEntry {
            full_path: path.to_string(),
            media_type: "text/xml".to_string(),
        });
        Ok(())
    }

    /// Write an uncompressed entry
    fn write_stored(&mut self, path: &str, content: &[u8]) -> OdtResult<()> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        self.zip.start_file(path, options)?;
        self.zip.write_all(content)?;
        Ok(())
    }
}

fn deflated() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

/// Renders the XML parts of one package with a shared set of namespace declarations
struct PartWriter<'a> {
    namespaces: &'a NamespaceMap,
    office: &'a str,
    version: &'a str,
}

impl PartWriter<'_> {
    /// Render a part root holding the containers of `sections`, in order.
    /// The body is wrapped in `office:body`.
    fn render(
        &self,
        root_local: &str,
        doc: &OdfDocument,
        sections: &[SectionKind],
    ) -> OdtResult<String> {
        let mut writer = Writer::new(Vec::new());
        emit(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        )?;

        let root_name = self.qualify(root_local);
        let mut root = BytesStart::new(root_name.as_str());
        for (prefix, uri) in self.namespaces.iter() {
            let key = if prefix.is_empty() {
                "xmlns".to_string()
            } else {
                format!("xmlns:{}", prefix)
            };
            root.push_attribute((key.as_str(), uri));
        }
        root.push_attribute((self.qualify("version").as_str(), self.version));
        emit(&mut writer, Event::Start(root))?;

        for &kind in sections {
            let section = doc.section(kind);
            if kind == SectionKind::Body {
                let body_name = self.qualify(BODY);
                emit(&mut writer, Event::Start(BytesStart::new(body_name.as_str())))?;
                self.write_container(&mut writer, kind.element_name(), section)?;
                emit(&mut writer, Event::End(BytesEnd::new(body_name.as_str())))?;
            } else {
                self.write_container(&mut writer, kind.element_name(), section)?;
            }
        }

        emit(&mut writer, Event::End(BytesEnd::new(root_name.as_str())))?;
        Ok(String::from_utf8(writer.into_inner())?)
    }

    fn write_container(
        &self,
        writer: &mut Writer<Vec<u8>>,
        local: &str,
        section: &Section,
    ) -> OdtResult<()> {
        let name = self.qualify(local);
        if section.is_empty() {
            return emit(writer, Event::Empty(BytesStart::new(name.as_str())));
        }
        emit(writer, Event::Start(BytesStart::new(name.as_str())))?;
        write_nodes(writer, section)?;
        emit(writer, Event::End(BytesEnd::new(name.as_str())))
    }

    fn qualify(&self, local: &str) -> String {
        if self.office.is_empty() {
            local.to_string()
        } else {
            format!("{}:{}", self.office, local)
        }
    }
}

fn write_nodes(writer: &mut Writer<Vec<u8>>, nodes: &[XmlNode]) -> OdtResult<()> {
    for node in nodes {
        match node {
            XmlNode::Element(element) => write_element(writer, element)?,
            XmlNode::Text(text) => emit(writer, Event::Text(BytesText::new(text)))?,
        }
    }
    Ok(())
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> OdtResult<()> {
    let name = element.name.qualified();
    let mut start = BytesStart::new(name.as_str());
    for attr in &element.attributes {
        start.push_attribute((attr.name.qualified().as_str(), attr.value.as_str()));
    }

    if element.children.is_empty() {
        return emit(writer, Event::Empty(start));
    }
    emit(writer, Event::Start(start))?;
    write_nodes(writer, &element.children)?;
    emit(writer, Event::End(BytesEnd::new(name.as_str())))
}

fn render_manifest(entries: &[ManifestEntry], version: &str) -> OdtResult<String> {
    let mut writer = Writer::new(Vec::new());
    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;

    let mut root = BytesStart::new("manifest:manifest");
    root.push_attribute(("xmlns:manifest", MANIFEST));
    root.push_attribute(("manifest:version", version));
    emit(&mut writer, Event::Start(root))?;

    for entry in entries {
        let mut file = BytesStart::new("manifest:file-entry");
        file.push_attribute(("manifest:full-path", entry.full_path.as_str()));
        if entry.full_path == "/" {
            file.push_attribute(("manifest:version", version));
        }
        file.push_attribute(("manifest:media-type", entry.media_type.as_str()));
        emit(&mut writer, Event::Empty(file))?;
    }

    emit(&mut writer, Event::End(BytesEnd::new("manifest:manifest")))?;
    Ok(String::from_utf8(writer.into_inner())?)
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> OdtResult<()> {
    writer
        .write_event(event)
        .map_err(|e| OdtError::XmlWrite(e.to_string()))
}

/// Guess media type from file path
fn guess_media_type(path: &str) -> &'static str {
    let lower = path.to_ascii_lowercase();
    if lower.ends_with(".png") {
        "image/png"
    } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "image/jpeg"
    } else if lower.ends_with(".gif") {
        "image/gif"
    } else if lower.ends_with(".svg") {
        "image/svg+xml"
    } else if lower.ends_with(".bmp") {
        "image/bmp"
    } else if lower.ends_with(".xml") {
        "text/xml"
    } else {
        "application/octet-stream"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::names::namespaces::TEXT;
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    fn write(doc: &OdfDocument) -> ZipArchive<Cursor<Vec<u8>>> {
        let bytes = OdtWriter::new(Cursor::new(Vec::new()))
            .write(doc)
            .unwrap()
            .into_inner();
        ZipArchive::new(Cursor::new(bytes)).unwrap()
    }

    fn entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
        let mut content = String::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        content
    }

    #[test]
    fn test_mimetype_is_first_and_stored() {
        let mut archive = write(&OdfDocument::new_text());
        let first = archive.by_index(0).unwrap();
        assert_eq!(first.name(), MIMETYPE);
        assert_eq!(first.compression(), CompressionMethod::Stored);
    }

    #[test]
    fn test_content_declares_namespaces_and_escapes_text() {
        let mut doc = OdfDocument::new_text();
        let p = doc.name(TEXT, P);
        let style = doc.name(TEXT, "style-name");
        doc.body.push(XmlNode::Element(
            Element::new(p)
                .with_attribute(style, "A\"B")
                .with_child(XmlNode::Text("1 < 2 & 3".to_string())),
        ));

        let mut archive = write(&doc);
        let content = entry(&mut archive, CONTENT_XML);
        assert!(content.contains(r#"xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0""#));
        assert!(content.contains(r#"office:version="1.3""#));
        assert!(content.contains("<office:body><office:text><text:p"));
        assert!(content.contains("1 &lt; 2 &amp; 3"));
        assert!(content.contains("A&quot;B"));
    }

    #[test]
    fn test_manifest_lists_parts_and_pictures() {
        let mut doc = OdfDocument::new_text();
        doc.pictures
            .insert("Pictures/logo.PNG".to_string(), vec![1, 2, 3]);

        let mut archive = write(&doc);
        let manifest = entry(&mut archive, MANIFEST_XML);
        assert!(manifest.contains(r#"manifest:full-path="/""#));
        assert!(manifest.contains(r#"manifest:full-path="content.xml""#));
        assert!(manifest.contains(r#"manifest:full-path="Pictures/logo.PNG""#));
        assert!(manifest.contains("image/png"));
    }

    #[test]
    fn test_empty_sections_are_self_closing() {
        let mut archive = write(&OdfDocument::new_text());
        let styles = entry(&mut archive, STYLES_XML);
        assert!(styles.contains("<office:styles/>"));
        assert!(styles.contains("<office:master-styles/>"));
    }

    #[test]
    fn test_guess_media_type() {
        assert_eq!(guess_media_type("Pictures/a.jpeg"), "image/jpeg");
        assert_eq!(guess_media_type("Pictures/a.svg"), "image/svg+xml");
        assert_eq!(guess_media_type("Pictures/a.wmf"), "application/octet-stream");
    }
}
