//! Namespace declarations of an ODF document

use crate::names::{standard_prefix, STANDARD_PREFIXES};
use crate::xml::XmlName;
use std::collections::BTreeMap;

/// Prefix to namespace URI bindings declared by a document
///
/// The empty prefix stands for the default namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceMap {
    bindings: BTreeMap<String, String>,
}

impl NamespaceMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// The conventional ODF text document bindings
    pub fn odf_defaults() -> Self {
        let mut map = Self::new();
        for (prefix, uri) in STANDARD_PREFIXES {
            map.bindings.insert(prefix.to_string(), uri.to_string());
        }
        map
    }

    /// Bind a prefix. Returns false, leaving the map untouched, when the prefix
    /// is already bound to a different URI.
    pub fn bind(&mut self, prefix: &str, uri: &str) -> bool {
        match self.bindings.get(prefix) {
            Some(existing) => existing == uri,
            None => {
                self.bindings.insert(prefix.to_string(), uri.to_string());
                true
            }
        }
    }

    /// Namespace URI bound to a prefix
    pub fn uri(&self, prefix: &str) -> Option<&str> {
        self.bindings.get(prefix).map(String::as_str)
    }

    /// First prefix bound to a namespace URI
    pub fn prefix_for(&self, uri: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(_, bound)| bound.as_str() == uri)
            .map(|(prefix, _)| prefix.as_str())
    }

    /// Prefix for `uri`, binding the conventional (or a fresh) prefix if none exists yet
    pub fn ensure(&mut self, uri: &str) -> String {
        if let Some(prefix) = self.prefix_for(uri) {
            return prefix.to_string();
        }
        let prefix = match standard_prefix(uri) {
            Some(standard) if !self.bindings.contains_key(standard) => standard.to_string(),
            _ => self.fresh_prefix(),
        };
        self.bindings.insert(prefix.clone(), uri.to_string());
        prefix
    }

    /// Build a name in `uri`, binding a prefix for it if needed
    pub fn name(&mut self, uri: &str, local: &str) -> XmlName {
        let prefix = self.ensure(uri);
        XmlName::new(uri, &prefix, local)
    }

    /// Merge another document's bindings into this one.
    ///
    /// Returns, for each namespace URI of `other` that must be written with a
    /// different prefix than `other` used, the prefix to use from now on.
    /// Nodes moved from `other` must be re-prefixed with the returned map.
    pub fn adopt(&mut self, other: &NamespaceMap) -> BTreeMap<String, String> {
        let mut remap = BTreeMap::new();
        for (prefix, uri) in &other.bindings {
            if self.uri(prefix) == Some(uri.as_str()) {
                continue;
            }
            if let Some(existing) = self.prefix_for(uri) {
                remap.insert(uri.clone(), existing.to_string());
                continue;
            }
            if self.bind(prefix, uri) {
                continue;
            }
            let fresh = self.fresh_prefix();
            tracing::warn!(
                "Namespace prefix '{}' already bound, re-binding {} as '{}'",
                prefix,
                uri,
                fresh
            );
            self.bindings.insert(fresh.clone(), uri.clone());
            remap.insert(uri.clone(), fresh);
        }
        remap
    }

    /// Iterate over `(prefix, uri)` bindings in prefix order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings
            .iter()
            .map(|(prefix, uri)| (prefix.as_str(), uri.as_str()))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn fresh_prefix(&self) -> String {
        (0..)
            .map(|n| format!("ns{}", n))
            .find(|candidate| !self.bindings.contains_key(candidate))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::namespaces::{LOEXT, OFFICE, TEXT};

    #[test]
    fn test_defaults_contain_office_and_text() {
        let map = NamespaceMap::odf_defaults();
        assert_eq!(map.uri("office"), Some(OFFICE));
        assert_eq!(map.prefix_for(TEXT), Some("text"));
    }

    #[test]
    fn test_bind_conflict_is_rejected() {
        let mut map = NamespaceMap::new();
        assert!(map.bind("text", TEXT));
        assert!(map.bind("text", TEXT));
        assert!(!map.bind("text", OFFICE));
        assert_eq!(map.uri("text"), Some(TEXT));
    }

    #[test]
    fn test_ensure_uses_standard_prefix() {
        let mut map = NamespaceMap::new();
        assert_eq!(map.ensure(TEXT), "text");
        assert_eq!(map.ensure(TEXT), "text");
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_ensure_falls_back_to_fresh_prefix() {
        let mut map = NamespaceMap::new();
        map.bind("text", "urn:example:other");
        assert_eq!(map.ensure(TEXT), "ns0");
    }

    #[test]
    fn test_adopt_new_namespace() {
        let mut acc = NamespaceMap::new();
        acc.bind("office", OFFICE);
        let mut incoming = NamespaceMap::new();
        incoming.bind("office", OFFICE);
        incoming.bind("loext", LOEXT);

        let remap = acc.adopt(&incoming);
        assert!(remap.is_empty());
        assert_eq!(acc.uri("loext"), Some(LOEXT));
    }

    #[test]
    fn test_adopt_known_uri_under_other_prefix() {
        let mut acc = NamespaceMap::new();
        acc.bind("text", TEXT);
        let mut incoming = NamespaceMap::new();
        incoming.bind("t", TEXT);

        let remap = acc.adopt(&incoming);
        assert_eq!(remap.get(TEXT).map(String::as_str), Some("text"));
        assert_eq!(acc.uri("t"), None);
    }

    #[test]
    fn test_adopt_prefix_clash() {
        let mut acc = NamespaceMap::new();
        acc.bind("x", "urn:example:one");
        let mut incoming = NamespaceMap::new();
        incoming.bind("x", "urn:example:two");

        let remap = acc.adopt(&incoming);
        assert_eq!(remap.get("urn:example:two").map(String::as_str), Some("ns0"));
        assert_eq!(acc.uri("ns0"), Some("urn:example:two"));
        assert_eq!(acc.uri("x"), Some("urn:example:one"));
    }
}
