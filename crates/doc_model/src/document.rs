//! Parsed ODF text document

use crate::names::namespaces::STYLE;
use crate::names::{attributes, elements};
use crate::namespace::NamespaceMap;
use crate::xml::{Element, XmlName, XmlNode};
use std::collections::{BTreeMap, BTreeSet};

/// ODF version written for freshly constructed documents
pub const DEFAULT_VERSION: &str = "1.3";

/// Ordered children of one top-level section container
pub type Section = Vec<XmlNode>;

/// The top-level sections of an ODF text document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionKind {
    /// `office:meta` (meta.xml)
    Meta,
    /// `office:font-face-decls` (content.xml and styles.xml)
    FontFaceDecls,
    /// `office:styles` (styles.xml)
    Styles,
    /// `office:automatic-styles` (content.xml)
    AutomaticStyles,
    /// `office:automatic-styles` (styles.xml), used by master pages
    MasterAutomaticStyles,
    /// `office:master-styles` (styles.xml)
    MasterStyles,
    /// `office:scripts` (content.xml)
    Scripts,
    /// `office:settings` (settings.xml)
    Settings,
    /// `office:body/office:text` (content.xml)
    Body,
}

impl SectionKind {
    pub const ALL: [SectionKind; 9] = [
        SectionKind::Meta,
        SectionKind::FontFaceDecls,
        SectionKind::Styles,
        SectionKind::AutomaticStyles,
        SectionKind::MasterAutomaticStyles,
        SectionKind::MasterStyles,
        SectionKind::Scripts,
        SectionKind::Settings,
        SectionKind::Body,
    ];

    /// Local name of the office element that contains this section
    pub fn element_name(&self) -> &'static str {
        match self {
            SectionKind::Meta => elements::META,
            SectionKind::FontFaceDecls => elements::FONT_FACE_DECLS,
            SectionKind::Styles => elements::STYLES,
            SectionKind::AutomaticStyles | SectionKind::MasterAutomaticStyles => {
                elements::AUTOMATIC_STYLES
            }
            SectionKind::MasterStyles => elements::MASTER_STYLES,
            SectionKind::Scripts => elements::SCRIPTS,
            SectionKind::Settings => elements::SETTINGS,
            SectionKind::Body => elements::TEXT_ELEM,
        }
    }
}

/// In-memory representation of one ODF text package
#[derive(Debug, Clone, PartialEq)]
pub struct OdfDocument {
    pub meta: Section,
    pub font_face_decls: Section,
    pub styles: Section,
    pub automatic_styles: Section,
    pub master_automatic_styles: Section,
    pub master_styles: Section,
    pub scripts: Section,
    pub settings: Section,
    pub body: Section,
    /// Embedded media keyed by package path (e.g. `Pictures/abc.png`)
    pub pictures: BTreeMap<String, Vec<u8>>,
    /// Namespace declarations collected from every part
    pub namespaces: NamespaceMap,
    /// `office:version` of the package
    pub version: String,
}

impl OdfDocument {
    /// A freshly constructed empty text document
    pub fn new_text() -> Self {
        Self::with_namespaces(NamespaceMap::odf_defaults())
    }

    /// An empty document carrying the given namespace declarations
    pub fn with_namespaces(namespaces: NamespaceMap) -> Self {
        Self {
            meta: Section::new(),
            font_face_decls: Section::new(),
            styles: Section::new(),
            automatic_styles: Section::new(),
            master_automatic_styles: Section::new(),
            master_styles: Section::new(),
            scripts: Section::new(),
            settings: Section::new(),
            body: Section::new(),
            pictures: BTreeMap::new(),
            namespaces,
            version: DEFAULT_VERSION.to_string(),
        }
    }

    pub fn section(&self, kind: SectionKind) -> &Section {
        match kind {
            SectionKind::Meta => &self.meta,
            SectionKind::FontFaceDecls => &self.font_face_decls,
            SectionKind::Styles => &self.styles,
            SectionKind::AutomaticStyles => &self.automatic_styles,
            SectionKind::MasterAutomaticStyles => &self.master_automatic_styles,
            SectionKind::MasterStyles => &self.master_styles,
            SectionKind::Scripts => &self.scripts,
            SectionKind::Settings => &self.settings,
            SectionKind::Body => &self.body,
        }
    }

    pub fn section_mut(&mut self, kind: SectionKind) -> &mut Section {
        match kind {
            SectionKind::Meta => &mut self.meta,
            SectionKind::FontFaceDecls => &mut self.font_face_decls,
            SectionKind::Styles => &mut self.styles,
            SectionKind::AutomaticStyles => &mut self.automatic_styles,
            SectionKind::MasterAutomaticStyles => &mut self.master_automatic_styles,
            SectionKind::MasterStyles => &mut self.master_styles,
            SectionKind::Scripts => &mut self.scripts,
            SectionKind::Settings => &mut self.settings,
            SectionKind::Body => &mut self.body,
        }
    }

    /// True when no section has content and there are no pictures
    pub fn is_empty(&self) -> bool {
        self.pictures.is_empty()
            && SectionKind::ALL
                .iter()
                .all(|kind| self.section(*kind).is_empty())
    }

    /// Top-level body elements in document order
    pub fn body_elements(&self) -> impl Iterator<Item = &Element> {
        self.body.iter().filter_map(XmlNode::as_element)
    }

    /// `style:name` values of every style defined in `styles` and `automatic_styles`,
    /// in section order, duplicates included
    pub fn style_names(&self) -> Vec<&str> {
        self.styles
            .iter()
            .chain(self.automatic_styles.iter())
            .filter_map(XmlNode::as_element)
            .filter_map(style_name)
            .collect()
    }

    /// Distinct style names defined in `styles` and `automatic_styles`
    pub fn defined_style_names(&self) -> BTreeSet<String> {
        self.style_names().into_iter().map(str::to_string).collect()
    }

    /// Find a style definition in `styles` or `automatic_styles` by name
    pub fn find_style(&self, name: &str) -> Option<&Element> {
        self.styles
            .iter()
            .chain(self.automatic_styles.iter())
            .filter_map(XmlNode::as_element)
            .find(|element| style_name(element) == Some(name))
    }

    /// Append font-face declarations whose `style:name` is not declared yet.
    ///
    /// Returns the number of declarations added.
    pub fn add_font_faces(&mut self, nodes: Section) -> usize {
        let mut known: BTreeSet<String> = self
            .font_face_decls
            .iter()
            .filter_map(XmlNode::as_element)
            .filter_map(style_name)
            .map(str::to_string)
            .collect();
        let mut added = 0;
        for node in nodes {
            let XmlNode::Element(element) = node else {
                continue;
            };
            if let Some(name) = style_name(&element) {
                if !known.insert(name.to_string()) {
                    continue;
                }
            }
            self.font_face_decls.push(XmlNode::Element(element));
            added += 1;
        }
        added
    }

    /// Re-prefix every name in every section, see [`Element::remap_prefixes`]
    pub fn remap_prefixes(&mut self, prefixes: &BTreeMap<String, String>) {
        if prefixes.is_empty() {
            return;
        }
        for kind in SectionKind::ALL {
            for node in self.section_mut(kind) {
                if let XmlNode::Element(element) = node {
                    element.remap_prefixes(prefixes);
                }
            }
        }
    }

    /// Build a name in `uri`, declaring the namespace on this document if needed
    pub fn name(&mut self, uri: &str, local: &str) -> XmlName {
        self.namespaces.name(uri, local)
    }

}

impl Default for OdfDocument {
    fn default() -> Self {
        Self::new_text()
    }
}

/// The `style:name` of a style definition element
pub fn style_name(element: &Element) -> Option<&str> {
    element.attribute_ns(STYLE, attributes::NAME)
}
