//! Fixture packages built from raw XML

#![allow(dead_code)]

use doc_model::names::namespaces::TEXT;
use doc_model::OdfDocument;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const NAMESPACES: &str = concat!(
    r#"xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" "#,
    r#"xmlns:style="urn:oasis:names:tc:opendocument:xmlns:style:1.0" "#,
    r#"xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" "#,
    r#"xmlns:draw="urn:oasis:names:tc:opendocument:xmlns:drawing:1.0" "#,
    r#"xmlns:fo="urn:oasis:names:tc:opendocument:xmlns:xsl-fo-compatible:1.0" "#,
    r#"xmlns:xlink="http://www.w3.org/1999/xlink" "#,
    r#"xmlns:meta="urn:oasis:names:tc:opendocument:xmlns:meta:1.0""#,
);

/// A package under construction
#[derive(Debug, Default)]
pub struct Fixture {
    automatic_styles: String,
    styles: String,
    fonts: String,
    body: String,
    meta: String,
    master_automatic_styles: String,
    header_style: Option<String>,
    pictures: Vec<(String, Vec<u8>)>,
    body_kind: Option<String>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a paragraph style to content.xml automatic styles
    pub fn automatic_style(mut self, name: &str, parent: Option<&str>) -> Self {
        self.automatic_styles.push_str(&style_xml(name, parent));
        self
    }

    /// Add a paragraph style to styles.xml common styles
    pub fn style(mut self, name: &str, parent: Option<&str>) -> Self {
        self.styles.push_str(&style_xml(name, parent));
        self
    }

    /// Add a paragraph style to styles.xml automatic styles
    pub fn master_automatic_style(mut self, name: &str, parent: Option<&str>) -> Self {
        self.master_automatic_styles.push_str(&style_xml(name, parent));
        self
    }

    /// Give the `Standard` master page a header paragraph in `style`
    pub fn header(mut self, style: &str) -> Self {
        self.header_style = Some(style.to_string());
        self
    }

    pub fn font(mut self, name: &str) -> Self {
        self.fonts
            .push_str(&format!(r#"<style:font-face style:name="{}"/>"#, name));
        self
    }

    pub fn paragraph(mut self, style: &str, text: &str) -> Self {
        self.body.push_str(&format!(
            r#"<text:p text:style-name="{}">{}</text:p>"#,
            style, text
        ));
        self
    }

    /// Raw body markup
    pub fn body(mut self, xml: &str) -> Self {
        self.body.push_str(xml);
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.meta
            .push_str(&format!("<meta:initial-creator>{}</meta:initial-creator>", title));
        self
    }

    pub fn picture(mut self, path: &str, data: &[u8]) -> Self {
        self.pictures.push((path.to_string(), data.to_vec()));
        self
    }

    /// Replace `office:text` with another body kind
    pub fn body_kind(mut self, kind: &str) -> Self {
        self.body_kind = Some(kind.to_string());
        self
    }

    pub fn content_xml(&self) -> String {
        let body = match &self.body_kind {
            Some(kind) => format!("<office:{}/>", kind),
            None => format!("<office:text>{}</office:text>", self.body),
        };
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content {} office:version="1.3">
  <office:font-face-decls>{}</office:font-face-decls>
  <office:automatic-styles>{}</office:automatic-styles>
  <office:body>{}</office:body>
</office:document-content>"#,
            NAMESPACES, self.fonts, self.automatic_styles, body
        )
    }

    pub fn styles_xml(&self) -> String {
        let master_page = match &self.header_style {
            Some(style) => format!(
                r#"<style:master-page style:name="Standard"><style:header><text:p text:style-name="{}">Weekly status</text:p></style:header></style:master-page>"#,
                style
            ),
            None => r#"<style:master-page style:name="Standard"/>"#.to_string(),
        };
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-styles {} office:version="1.3">
  <office:styles>{}</office:styles>
  <office:automatic-styles>{}</office:automatic-styles>
  <office:master-styles>{}</office:master-styles>
</office:document-styles>"#,
            NAMESPACES, self.styles, self.master_automatic_styles, master_page
        )
    }

    pub fn meta_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-meta {} office:version="1.3"><office:meta>{}</office:meta></office:document-meta>"#,
            NAMESPACES, self.meta
        )
    }

    pub fn build(&self) -> Vec<u8> {
        let mut entries = vec![
            ("content.xml".to_string(), self.content_xml().into_bytes()),
            ("styles.xml".to_string(), self.styles_xml().into_bytes()),
            ("meta.xml".to_string(), self.meta_xml().into_bytes()),
        ];
        entries.extend(self.pictures.iter().cloned());
        package(&entries)
    }
}

fn style_xml(name: &str, parent: Option<&str>) -> String {
    match parent {
        Some(parent) => format!(
            r#"<style:style style:name="{}" style:family="paragraph" style:parent-style-name="{}"/>"#,
            name, parent
        ),
        None => format!(
            r#"<style:style style:name="{}" style:family="paragraph"/>"#,
            name
        ),
    }
}

/// Zip entries into a package with a leading stored mimetype
pub fn package(entries: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    zip.start_file("mimetype", stored).unwrap();
    zip.write_all(b"application/vnd.oasis.opendocument.text").unwrap();
    for (name, data) in entries {
        zip.start_file(name.as_str(), SimpleFileOptions::default())
            .unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// `(text:style-name, flat text)` of every top-level paragraph in the body
pub fn body_paragraphs(document: &OdfDocument) -> Vec<(String, String)> {
    document
        .body_elements()
        .map(|p| {
            (
                p.attribute_ns(TEXT, "style-name").unwrap_or_default().to_string(),
                doc_merge::paragraph_text(p),
            )
        })
        .collect()
}

/// Every style reference value found in the master sections of `styles.xml`
pub fn master_style_references(document: &OdfDocument) -> Vec<String> {
    let mut references = Vec::new();
    for node in document
        .master_automatic_styles
        .iter()
        .chain(document.master_styles.iter())
    {
        if let Some(element) = node.as_element() {
            element.visit(&mut |e| {
                for attr in &e.attributes {
                    if doc_merge::STYLE_REFERENCE_ATTRIBUTES.contains(&attr.name.local.as_str()) {
                        references.push(attr.value.clone());
                    }
                }
            });
        }
    }
    references
}

/// Every style reference value found in the body
pub fn body_style_references(document: &OdfDocument) -> Vec<String> {
    let mut references = Vec::new();
    for element in document.body_elements() {
        element.visit(&mut |e| {
            for attr in &e.attributes {
                if doc_merge::STYLE_REFERENCE_ATTRIBUTES.contains(&attr.name.local.as_str()) {
                    references.push(attr.value.clone());
                }
            }
        });
    }
    references
}
