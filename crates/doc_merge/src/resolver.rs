//! Style name resolution
//!
//! Every style an incoming document defines is renamed to
//! `<name>_doc<ordinal>`, where the ordinal is the document's position in the
//! merge job. Ordinals are unique per job, so renamed styles from different
//! sources cannot collide with each other.

use doc_model::names::attributes::NAME;
use doc_model::names::namespaces::STYLE;
use doc_model::{style_name, Element, Section, XmlNode};
use std::collections::BTreeMap;

/// Local names of attributes whose value is the name of a style
pub const STYLE_REFERENCE_ATTRIBUTES: &[&str] = &[
    "style-name",
    "parent-style-name",
    "list-style-name",
    "cond-style-name",
    "text-style-name",
    "next-style-name",
    "data-style-name",
    "apply-style-name",
    "default-cell-style-name",
    "visited-style-name",
    "citation-style-name",
    "citation-body-style-name",
    "main-entry-style-name",
    "default-style-name",
];

/// Original style name to renamed style name, for one source document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameMap {
    renames: BTreeMap<String, String>,
}

impl RenameMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, original: impl Into<String>, renamed: impl Into<String>) {
        self.renames.insert(original.into(), renamed.into());
    }

    /// New name for an original style name
    pub fn get(&self, original: &str) -> Option<&str> {
        self.renames.get(original).map(String::as_str)
    }

    pub fn contains(&self, original: &str) -> bool {
        self.renames.contains_key(original)
    }

    pub fn len(&self) -> usize {
        self.renames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }

    /// `(original, renamed)` pairs ordered by original name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.renames
            .iter()
            .map(|(original, renamed)| (original.as_str(), renamed.as_str()))
    }

    /// The renamed identifiers
    pub fn new_names(&self) -> impl Iterator<Item = &str> {
        self.renames.values().map(String::as_str)
    }
}

/// Renamed identifier of `name` for the document at `ordinal`
pub fn renamed_style_name(name: &str, ordinal: usize) -> String {
    format!("{}_doc{}", name, ordinal)
}

/// Style sections of one document after renaming
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyles {
    pub styles: Section,
    pub automatic_styles: Section,
    pub renames: RenameMap,
}

/// Rename every style defined in `styles` and `automatic_styles`.
///
/// All names are collected before anything is rewritten, so references
/// between the two sections stay consistent regardless of definition order.
/// Definitions without a `style:name` pass through unchanged.
pub fn resolve_styles(
    mut styles: Section,
    mut automatic_styles: Section,
    ordinal: usize,
) -> ResolvedStyles {
    let mut renames = RenameMap::new();
    for element in styles
        .iter()
        .chain(automatic_styles.iter())
        .filter_map(XmlNode::as_element)
    {
        if let Some(name) = style_name(element) {
            renames.insert(name, renamed_style_name(name, ordinal));
        }
    }

    for node in styles.iter_mut().chain(automatic_styles.iter_mut()) {
        if let XmlNode::Element(element) = node {
            rename_definition(element, &renames);
            rewrite_references(element, &renames);
        }
    }

    tracing::debug!("Renamed {} styles for document {}", renames.len(), ordinal);
    ResolvedStyles {
        styles,
        automatic_styles,
        renames,
    }
}

/// Rewrite every style reference in `element` and its descendants.
///
/// Returns the number of attribute values changed. Values without an entry
/// in `renames` are left alone.
pub fn rewrite_references(element: &mut Element, renames: &RenameMap) -> usize {
    if renames.is_empty() {
        return 0;
    }
    let mut rewritten = 0;
    element.visit_mut(&mut |element| {
        for attr in &mut element.attributes {
            if !STYLE_REFERENCE_ATTRIBUTES.contains(&attr.name.local.as_str()) {
                continue;
            }
            if let Some(renamed) = renames.get(&attr.value) {
                attr.value = renamed.to_string();
                rewritten += 1;
            }
        }
    });
    rewritten
}

fn rename_definition(element: &mut Element, renames: &RenameMap) {
    if let Some(attr) = element
        .attributes
        .iter_mut()
        .find(|attr| attr.name.is(STYLE, NAME))
    {
        if let Some(renamed) = renames.get(&attr.value) {
            attr.value = renamed.to_string();
        }
    }
}
