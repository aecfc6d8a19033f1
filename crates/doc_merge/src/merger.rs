//! Document merger
//!
//! Appends the sections of one parsed source document to the accumulator
//! document of a merge job.

use crate::error::{MergeError, Result};
use crate::resolver::{resolve_styles, rewrite_references, RenameMap};
use doc_model::names::attributes::{BREAK_BEFORE, FAMILY, NAME, STYLE_NAME};
use doc_model::names::elements::{P, PARAGRAPH_PROPERTIES, STYLE as STYLE_ELEM};
use doc_model::names::namespaces::{FO, STYLE, TEXT};
use doc_model::{style_name, Element, OdfDocument, XmlNode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Name of the automatic paragraph style used by page-break markers
pub const PAGE_BREAK_STYLE: &str = "BookOfStatusPageBreak";

/// How the accumulator of a merge job is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedPolicy {
    /// Start from an empty text document and merge every source, ordinals from 0
    EmptyDocument,
    /// Use the first source as the accumulator and merge the rest
    #[default]
    FirstDocument,
}

/// Options of a merge job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    pub seed_policy: SeedPolicy,
    /// Insert a page break between the bodies of consecutive sources
    pub page_breaks: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            seed_policy: SeedPolicy::FirstDocument,
            page_breaks: true,
        }
    }
}

impl MergeOptions {
    pub fn with_seed_policy(mut self, seed_policy: SeedPolicy) -> Self {
        self.seed_policy = seed_policy;
        self
    }

    pub fn with_page_breaks(mut self, page_breaks: bool) -> Self {
        self.page_breaks = page_breaks;
        self
    }
}

/// What one merge step changed in the accumulator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStep {
    pub ordinal: usize,
    pub renames: RenameMap,
    pub body_nodes: usize,
    pub references_rewritten: usize,
    pub font_faces_added: usize,
    pub pictures: usize,
    pub page_break: bool,
}

/// Merges parsed documents into an accumulator
#[derive(Debug, Clone, Default)]
pub struct DocumentMerger {
    page_breaks: bool,
    /// Name of the page-break style once it exists in the accumulator
    page_break_style: Option<String>,
}

impl DocumentMerger {
    pub fn new(page_breaks: bool) -> Self {
        Self {
            page_breaks,
            page_break_style: None,
        }
    }

    pub fn from_options(options: &MergeOptions) -> Self {
        Self::new(options.page_breaks)
    }

    /// Merge `incoming` into `accumulator` as the document at `ordinal`.
    ///
    /// Nothing is appended when the renamed styles collide with styles the
    /// accumulator already defines.
    pub fn merge_into(
        &mut self,
        accumulator: &mut OdfDocument,
        incoming: OdfDocument,
        ordinal: usize,
    ) -> Result<MergeStep> {
        let mut step = MergeStep {
            ordinal,
            ..Default::default()
        };
        if incoming.is_empty() {
            tracing::debug!("Document {} is empty, nothing to merge", ordinal);
            return Ok(step);
        }

        let mut incoming = incoming;
        let prefixes = accumulator.namespaces.adopt(&incoming.namespaces);
        if !prefixes.is_empty() {
            tracing::warn!(
                "Re-prefixing {} namespaces of document {}",
                prefixes.len(),
                ordinal
            );
            incoming.remap_prefixes(&prefixes);
        }

        let OdfDocument {
            meta,
            font_face_decls,
            styles,
            automatic_styles,
            master_automatic_styles,
            master_styles,
            scripts,
            settings,
            body,
            pictures,
            ..
        } = incoming;

        let resolved = resolve_styles(styles, automatic_styles, ordinal);
        let existing = accumulator.defined_style_names();
        if let Some(name) = resolved.renames.new_names().find(|name| existing.contains(*name)) {
            return Err(MergeError::StyleResolutionConflict {
                name: name.to_string(),
                ordinal,
            });
        }

        accumulator.meta.extend(meta);
        accumulator.styles.extend(resolved.styles);
        accumulator.automatic_styles.extend(resolved.automatic_styles);
        tracing::debug!(
            "Document {}: {} styles renamed",
            ordinal,
            resolved.renames.len()
        );

        // Master pages keep their names but follow renamed common styles
        let renames_in_masters = master_renames(&resolved.renames, &master_automatic_styles);
        for (target, section) in [
            (&mut accumulator.master_automatic_styles, master_automatic_styles),
            (&mut accumulator.master_styles, master_styles),
        ] {
            for mut node in section {
                if let XmlNode::Element(element) = &mut node {
                    step.references_rewritten += rewrite_references(element, &renames_in_masters);
                }
                target.push(node);
            }
        }
        step.font_faces_added = accumulator.add_font_faces(font_face_decls);
        accumulator.scripts.extend(scripts);
        accumulator.settings.extend(settings);

        // Only between two non-empty bodies, never as the first body node
        if self.page_breaks && !accumulator.body.is_empty() && !body.is_empty() {
            let marker = self.page_break_marker(accumulator);
            accumulator.body.push(marker);
            step.page_break = true;
        }

        for mut node in body {
            if let XmlNode::Element(element) = &mut node {
                step.references_rewritten += rewrite_references(element, &resolved.renames);
            }
            accumulator.body.push(node);
            step.body_nodes += 1;
        }
        tracing::debug!(
            "Document {}: {} body nodes appended, {} style references rewritten",
            ordinal,
            step.body_nodes,
            step.references_rewritten
        );

        step.pictures = pictures.len();
        for (path, data) in pictures {
            if accumulator.pictures.insert(path.clone(), data).is_some() {
                tracing::debug!("Picture {} replaced by document {}", path, ordinal);
            }
        }

        step.renames = resolved.renames;
        Ok(step)
    }

    /// An empty paragraph that starts a new page
    fn page_break_marker(&mut self, accumulator: &mut OdfDocument) -> XmlNode {
        let style = self.ensure_page_break_style(accumulator);
        let name = accumulator.name(TEXT, P);
        let attr = accumulator.name(TEXT, STYLE_NAME);
        Element::new(name).with_attribute(attr, style).into()
    }

    /// Name of a page-break paragraph style in the accumulator, adding one if needed
    fn ensure_page_break_style(&mut self, accumulator: &mut OdfDocument) -> String {
        if let Some(name) = &self.page_break_style {
            if accumulator.find_style(name).is_some() {
                return name.clone();
            }
        }

        let mut name = PAGE_BREAK_STYLE.to_string();
        let mut suffix = 1;
        loop {
            match accumulator.find_style(&name).map(is_page_break_style) {
                Some(true) => break,
                Some(false) => {
                    name = format!("{}{}", PAGE_BREAK_STYLE, suffix);
                    suffix += 1;
                }
                None => {
                    let style = page_break_style(accumulator, &name);
                    accumulator.automatic_styles.push(style.into());
                    tracing::debug!("Added page-break style {}", name);
                    break;
                }
            }
        }

        self.page_break_style = Some(name.clone());
        name
    }
}

/// Renames that apply inside `styles.xml` master sections.
///
/// Automatic styles of `styles.xml` are not renamed and shadow identically
/// named content styles for references made from master pages.
fn master_renames(renames: &RenameMap, master_automatic_styles: &[XmlNode]) -> RenameMap {
    let shadowed: BTreeSet<&str> = master_automatic_styles
        .iter()
        .filter_map(XmlNode::as_element)
        .filter_map(style_name)
        .collect();
    let mut master = RenameMap::new();
    for (original, renamed) in renames.iter() {
        if !shadowed.contains(original) {
            master.insert(original, renamed);
        }
    }
    master
}

fn page_break_style(accumulator: &mut OdfDocument, name: &str) -> Element {
    let properties = Element::new(accumulator.name(STYLE, PARAGRAPH_PROPERTIES))
        .with_attribute(accumulator.name(FO, BREAK_BEFORE), "page");
    Element::new(accumulator.name(STYLE, STYLE_ELEM))
        .with_attribute(accumulator.name(STYLE, NAME), name)
        .with_attribute(accumulator.name(STYLE, FAMILY), "paragraph")
        .with_child(properties)
}

fn is_page_break_style(style: &Element) -> bool {
    style.attribute_ns(STYLE, FAMILY) == Some("paragraph")
        && style
            .find_child(STYLE, PARAGRAPH_PROPERTIES)
            .and_then(|properties| properties.attribute_ns(FO, BREAK_BEFORE))
            == Some("page")
}
