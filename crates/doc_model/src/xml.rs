//! Owned, namespace-resolved XML tree
//!
//! Parts of an ODF package are held as plain element trees. Every element and
//! attribute name remembers the namespace URI it was resolved to at parse time
//! together with the prefix it was written with, so that nodes can be moved
//! between documents and re-prefixed without losing their meaning.

use std::collections::BTreeMap;
use std::fmt;

/// A namespace-qualified XML name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct XmlName {
    /// Resolved namespace URI, `None` for unqualified names
    pub namespace: Option<String>,
    /// Prefix used when serializing, `None` for unprefixed names
    pub prefix: Option<String>,
    /// Local part of the name
    pub local: String,
}

impl XmlName {
    /// Create a name bound to a namespace
    pub fn new(namespace: &str, prefix: &str, local: &str) -> Self {
        Self {
            namespace: Some(namespace.to_string()),
            prefix: if prefix.is_empty() {
                None
            } else {
                Some(prefix.to_string())
            },
            local: local.to_string(),
        }
    }

    /// Create a name without a namespace
    pub fn unqualified(local: &str) -> Self {
        Self {
            namespace: None,
            prefix: None,
            local: local.to_string(),
        }
    }

    /// Check namespace and local name
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.local == local && self.namespace.as_deref() == Some(namespace)
    }

    /// The name as written in markup (`prefix:local`)
    pub fn qualified(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.local),
            None => self.local.clone(),
        }
    }
}

impl fmt::Display for XmlName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified())
    }
}

/// An attribute with an unescaped value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: XmlName,
    pub value: String,
}

impl Attribute {
    pub fn new(name: XmlName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// A node in an element's child list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(Element),
    /// Unescaped character data
    Text(String),
}

impl XmlNode {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        }
    }

    /// True for text nodes consisting only of XML whitespace
    pub fn is_whitespace(&self) -> bool {
        match self {
            XmlNode::Text(text) => text.chars().all(|c| matches!(c, ' ' | '\t' | '\r' | '\n')),
            XmlNode::Element(_) => false,
        }
    }
}

impl From<Element> for XmlNode {
    fn from(element: Element) -> Self {
        XmlNode::Element(element)
    }
}

/// An XML element with ordered attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: XmlName,
    pub attributes: Vec<Attribute>,
    pub children: Vec<XmlNode>,
}

impl Element {
    /// Create an element with no attributes or children
    pub fn new(name: XmlName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, name: XmlName, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder-style child append
    pub fn with_child(mut self, child: impl Into<XmlNode>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Check namespace and local name
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.name.is(namespace, local)
    }

    /// Get an attribute value by local name, in any namespace
    pub fn attribute(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name.local == local)
            .map(|attr| attr.value.as_str())
    }

    /// Get an attribute value by namespace and local name
    pub fn attribute_ns(&self, namespace: &str, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name.is(namespace, local))
            .map(|attr| attr.value.as_str())
    }

    /// Set an attribute, replacing any existing one with the same namespace and local name
    pub fn set_attribute(&mut self, name: XmlName, value: impl Into<String>) {
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|attr| attr.name.namespace == name.namespace && attr.name.local == name.local)
        {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute::new(name, value)),
        }
    }

    /// Append a child node, coalescing adjacent text
    pub fn push(&mut self, node: XmlNode) {
        if let XmlNode::Text(text) = &node {
            if let Some(XmlNode::Text(last)) = self.children.last_mut() {
                last.push_str(text);
                return;
            }
        }
        self.children.push(node);
    }

    /// Iterate over child elements, skipping text
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    /// Find the first child element with the given name
    pub fn find_child(&self, namespace: &str, local: &str) -> Option<&Element> {
        self.child_elements().find(|child| child.is(namespace, local))
    }

    /// Concatenated character data of this element and all descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// Visit this element and every descendant element, depth first, parents before children
    pub fn visit_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut Element),
    {
        f(self);
        for child in &mut self.children {
            if let XmlNode::Element(element) = child {
                element.visit_mut(f);
            }
        }
    }

    /// Visit this element and every descendant element immutably
    pub fn visit<F>(&self, f: &mut F)
    where
        F: FnMut(&Element),
    {
        f(self);
        for child in self.child_elements() {
            child.visit(f);
        }
    }

    /// Re-prefix every element and attribute name bound to a namespace in `prefixes`
    ///
    /// `prefixes` maps namespace URI to the prefix that must be used for it.
    pub fn remap_prefixes(&mut self, prefixes: &BTreeMap<String, String>) {
        self.visit_mut(&mut |element| {
            remap_name(&mut element.name, prefixes);
            for attr in &mut element.attributes {
                remap_name(&mut attr.name, prefixes);
            }
        });
    }
}

fn remap_name(name: &mut XmlName, prefixes: &BTreeMap<String, String>) {
    if let Some(prefix) = name.namespace.as_ref().and_then(|ns| prefixes.get(ns)) {
        name.prefix = Some(prefix.clone());
    }
}

fn collect_text(nodes: &[XmlNode], out: &mut String) {
    for node in nodes {
        match node {
            XmlNode::Text(text) => out.push_str(text),
            XmlNode::Element(element) => collect_text(&element.children, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::namespaces::{STYLE, TEXT};

    fn paragraph(style: &str, text: &str) -> Element {
        Element::new(XmlName::new(TEXT, "text", "p"))
            .with_attribute(XmlName::new(TEXT, "text", "style-name"), style)
            .with_child(XmlNode::Text(text.to_string()))
    }

    #[test]
    fn test_qualified_name() {
        let name = XmlName::new(TEXT, "text", "p");
        assert_eq!(name.qualified(), "text:p");
        assert!(name.is(TEXT, "p"));
        assert!(!name.is(STYLE, "p"));
        assert_eq!(XmlName::unqualified("id").qualified(), "id");
    }

    #[test]
    fn test_attribute_lookup() {
        let p = paragraph("P1", "Hello");
        assert_eq!(p.attribute("style-name"), Some("P1"));
        assert_eq!(p.attribute_ns(TEXT, "style-name"), Some("P1"));
        assert_eq!(p.attribute_ns(STYLE, "style-name"), None);
    }

    #[test]
    fn test_set_attribute_replaces() {
        let mut p = paragraph("P1", "Hello");
        p.set_attribute(XmlName::new(TEXT, "text", "style-name"), "P2");
        assert_eq!(p.attributes.len(), 1);
        assert_eq!(p.attribute("style-name"), Some("P2"));
    }

    #[test]
    fn test_push_coalesces_text() {
        let mut p = Element::new(XmlName::new(TEXT, "text", "p"));
        p.push(XmlNode::Text("Hello ".into()));
        p.push(XmlNode::Text("world".into()));
        assert_eq!(p.children.len(), 1);
        assert_eq!(p.text_content(), "Hello world");
    }

    #[test]
    fn test_text_content_nested() {
        let span = Element::new(XmlName::new(TEXT, "text", "span"))
            .with_child(XmlNode::Text("bold".into()));
        let p = paragraph("P1", "Some ").with_child(span);
        assert_eq!(p.text_content(), "Some bold");
    }

    #[test]
    fn test_remap_prefixes() {
        let mut p = paragraph("P1", "Hello");
        let mut prefixes = BTreeMap::new();
        prefixes.insert(TEXT.to_string(), "t".to_string());
        p.remap_prefixes(&prefixes);
        assert_eq!(p.name.qualified(), "t:p");
        assert_eq!(p.attributes[0].name.qualified(), "t:style-name");
    }

    #[test]
    fn test_whitespace_detection() {
        assert!(XmlNode::Text(" \n\t".into()).is_whitespace());
        assert!(!XmlNode::Text(" a ".into()).is_whitespace());
    }
}
