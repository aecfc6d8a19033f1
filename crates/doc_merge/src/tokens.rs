//! Token substitution
//!
//! Placeholder tokens such as `%DATETIME%` are replaced in the flat text of
//! every paragraph of the merged document. A paragraph whose text contains a
//! token is rebuilt from the replaced text, keeping its element name and
//! attributes, so the paragraph style is preserved while run-level
//! formatting inside it is dropped.

use crate::error::{MergeError, Result};
use aho_corasick::{AhoCorasick, MatchKind};
use chrono::{DateTime, Utc};
use doc_model::names::attributes::C;
use doc_model::names::elements::{ANNOTATION, FRAME, H, LINE_BREAK, NOTE, P, S, TAB};
use doc_model::names::namespaces::{DRAW, OFFICE, TEXT};
use doc_model::{Element, NamespaceMap, OdfDocument, XmlName, XmlNode};
use std::collections::BTreeMap;

/// Replaced with the generation time
pub const DATETIME_TOKEN: &str = "%DATETIME%";
/// Replaced with the source-control revision
pub const REVISION_TOKEN: &str = "%LAST_GIT_COMMIT%";
/// chrono format of the `%DATETIME%` value
pub const DATETIME_FORMAT: &str = "%Y.%m.%d %H:%M";

/// Longest run of spaces a single `text:s` element expands to
pub const MAX_SPACE_RUN: usize = 1024;

/// Format a timestamp the way `%DATETIME%` is rendered
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.format(DATETIME_FORMAT).to_string()
}

/// Token to replacement value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSet {
    tokens: BTreeMap<String, String>,
}

impl TokenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// `%DATETIME%` and `%LAST_GIT_COMMIT%`
    pub fn standard(now: DateTime<Utc>, revision: &str) -> Self {
        let mut tokens = BTreeMap::new();
        tokens.insert(DATETIME_TOKEN.to_string(), format_timestamp(now));
        tokens.insert(REVISION_TOKEN.to_string(), revision.to_string());
        Self { tokens }
    }

    /// Add or replace a token. Empty tokens are rejected.
    pub fn insert(&mut self, token: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let token = token.into();
        if token.is_empty() {
            return Err(MergeError::InvalidToken("token must not be empty".to_string()));
        }
        self.tokens.insert(token, value.into());
        Ok(())
    }

    pub fn with(mut self, token: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        self.insert(token, value)?;
        Ok(self)
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.tokens.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tokens
            .iter()
            .map(|(token, value)| (token.as_str(), value.as_str()))
    }
}

/// Counts of one substitution pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubstitutionReport {
    pub paragraphs_scanned: usize,
    pub paragraphs_replaced: usize,
}

/// A compiled token set
#[derive(Debug, Clone)]
pub struct TokenSubstitution {
    matcher: Option<AhoCorasick>,
    values: Vec<String>,
}

impl TokenSubstitution {
    pub fn new(tokens: &TokenSet) -> Result<Self> {
        if tokens.is_empty() {
            return Ok(Self {
                matcher: None,
                values: Vec::new(),
            });
        }

        let patterns: Vec<&str> = tokens.iter().map(|(token, _)| token).collect();
        let matcher = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(&patterns)
            .map_err(|e| MergeError::InvalidToken(e.to_string()))?;
        let values = tokens.iter().map(|(_, value)| value.to_string()).collect();

        Ok(Self {
            matcher: Some(matcher),
            values,
        })
    }

    /// Replace every token in `text`, or `None` if it contains none
    pub fn replace(&self, text: &str) -> Option<String> {
        let matcher = self.matcher.as_ref()?;
        if !matcher.is_match(text) {
            return None;
        }
        Some(matcher.replace_all(text, &self.values))
    }

    /// Substitute tokens in every paragraph of the document body
    pub fn apply(&self, document: &mut OdfDocument) -> SubstitutionReport {
        let mut visitor = ParagraphVisitor {
            substitution: self,
            namespaces: &mut document.namespaces,
            names: None,
            report: SubstitutionReport::default(),
        };
        visitor.visit(&mut document.body);

        let report = visitor.report;
        tracing::debug!(
            "Token substitution: {} of {} paragraphs replaced",
            report.paragraphs_replaced,
            report.paragraphs_scanned
        );
        report
    }
}

/// Substitute `tokens` in every paragraph of `document`
pub fn substitute(document: &mut OdfDocument, tokens: &TokenSet) -> Result<SubstitutionReport> {
    Ok(TokenSubstitution::new(tokens)?.apply(document))
}

/// Flat text of a paragraph, see [`flatten`]
pub fn paragraph_text(paragraph: &Element) -> String {
    let mut text = String::new();
    flatten(&paragraph.children, &mut text);
    text
}

/// Names of the inline elements written when re-encoding text
struct TextNames {
    space: XmlName,
    count: XmlName,
    tab: XmlName,
    line_break: XmlName,
}

impl TextNames {
    fn new(namespaces: &mut NamespaceMap) -> Self {
        Self {
            space: namespaces.name(TEXT, S),
            count: namespaces.name(TEXT, C),
            tab: namespaces.name(TEXT, TAB),
            line_break: namespaces.name(TEXT, LINE_BREAK),
        }
    }
}

struct ParagraphVisitor<'a> {
    substitution: &'a TokenSubstitution,
    namespaces: &'a mut NamespaceMap,
    names: Option<TextNames>,
    report: SubstitutionReport,
}

impl ParagraphVisitor<'_> {
    fn visit(&mut self, nodes: &mut [XmlNode]) {
        for node in nodes {
            let XmlNode::Element(element) = node else {
                continue;
            };
            // Paragraphs nested in notes or frames are visited on their own
            self.visit(&mut element.children);
            if is_paragraph(element) {
                self.report.paragraphs_scanned += 1;
                if self.substitute(element) {
                    self.report.paragraphs_replaced += 1;
                }
            }
        }
    }

    fn substitute(&mut self, paragraph: &mut Element) -> bool {
        let Some(replaced) = self.substitution.replace(&paragraph_text(paragraph)) else {
            return false;
        };

        let mut embedded = Vec::new();
        take_embedded(std::mem::take(&mut paragraph.children), &mut embedded);

        let namespaces = &mut *self.namespaces;
        let names = self.names.get_or_insert_with(|| TextNames::new(namespaces));
        paragraph.children = encode_text(&replaced, names);
        paragraph.children.extend(embedded);
        true
    }
}

fn is_paragraph(element: &Element) -> bool {
    element.is(TEXT, P) || element.is(TEXT, H)
}

/// Elements whose content does not belong to the surrounding paragraph's text
fn is_embedded(element: &Element) -> bool {
    is_paragraph(element)
        || element.is(TEXT, NOTE)
        || element.is(OFFICE, ANNOTATION)
        || element.is(DRAW, FRAME)
}

fn flatten(nodes: &[XmlNode], text: &mut String) {
    for node in nodes {
        match node {
            XmlNode::Text(content) => text.push_str(content),
            XmlNode::Element(element) if is_embedded(element) => {}
            XmlNode::Element(element) if element.is(TEXT, S) => {
                text.extend(std::iter::repeat(' ').take(space_count(element)));
            }
            XmlNode::Element(element) if element.is(TEXT, TAB) => text.push('\t'),
            XmlNode::Element(element) if element.is(TEXT, LINE_BREAK) => text.push('\n'),
            XmlNode::Element(element) => flatten(&element.children, text),
        }
    }
}

/// Spaces a `text:s` stands for, at most [`MAX_SPACE_RUN`]
fn space_count(element: &Element) -> usize {
    let count = element
        .attribute_ns(TEXT, C)
        .and_then(|c| c.parse::<usize>().ok())
        .unwrap_or(1);
    if count > MAX_SPACE_RUN {
        tracing::warn!(
            "Space run of {} clamped to {} characters",
            count,
            MAX_SPACE_RUN
        );
        return MAX_SPACE_RUN;
    }
    count
}

/// Move embedded elements out of a paragraph's content, in document order
fn take_embedded(nodes: Vec<XmlNode>, out: &mut Vec<XmlNode>) {
    for node in nodes {
        if let XmlNode::Element(element) = node {
            if is_embedded(&element) {
                out.push(XmlNode::Element(element));
            } else {
                take_embedded(element.children, out);
            }
        }
    }
}

/// Encode plain text as ODF paragraph content
fn encode_text(text: &str, names: &TextNames) -> Vec<XmlNode> {
    let mut nodes = Vec::new();
    let mut run = String::new();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\t' => {
                flush_run(&mut run, &mut nodes);
                nodes.push(Element::new(names.tab.clone()).into());
            }
            '\n' => {
                flush_run(&mut run, &mut nodes);
                nodes.push(Element::new(names.line_break.clone()).into());
            }
            ' ' => {
                let mut extra = 0;
                while chars.next_if_eq(&' ').is_some() {
                    extra += 1;
                }
                // One literal space, the rest as text:s
                run.push(' ');
                if extra > 0 {
                    flush_run(&mut run, &mut nodes);
                    let mut space = Element::new(names.space.clone());
                    if extra > 1 {
                        space.set_attribute(names.count.clone(), extra.to_string());
                    }
                    nodes.push(space.into());
                }
            }
            _ => run.push(ch),
        }
    }
    flush_run(&mut run, &mut nodes);
    nodes
}

fn flush_run(run: &mut String, nodes: &mut Vec<XmlNode>) {
    if !run.is_empty() {
        nodes.push(XmlNode::Text(std::mem::take(run)));
    }
}
