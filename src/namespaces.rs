//! XML namespace handling
//!
//! This module provides qualified names (QNames) that remember the prefix
//! they were written with, and scoped prefix-to-URI mappings used while
//! reading and writing element trees.

use crate::error::{Error, Result};
use indexmap::IndexMap;

/// XML Namespace URI
pub type NamespaceUri = String;

/// Namespace prefix
pub type Prefix = String;

/// The reserved `xml` prefix namespace
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Qualified name: namespace, local name and the prefix used to write it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace URI (None for no namespace)
    pub namespace: Option<NamespaceUri>,
    /// Local name
    pub local_name: String,
    /// Prefix (None for unprefixed names)
    pub prefix: Option<Prefix>,
}

impl QName {
    /// Create a QName without a namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
            prefix: None,
        }
    }

    /// Create a prefixed QName in a namespace
    pub fn prefixed(
        prefix: impl Into<String>,
        namespace: impl Into<String>,
        local_name: impl Into<String>,
    ) -> Self {
        let prefix = prefix.into();
        Self {
            namespace: Some(namespace.into()),
            local_name: local_name.into(),
            prefix: if prefix.is_empty() { None } else { Some(prefix) },
        }
    }

    /// True if the name has this namespace and local name
    pub fn matches(&self, namespace: &str, local_name: &str) -> bool {
        self.local_name == local_name && self.namespace.as_deref() == Some(namespace)
    }

    /// The name as written in a document, e.g. `ddms:title`
    pub fn prefixed_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.local_name),
            None => self.local_name.clone(),
        }
    }

    /// The name in Clark notation, e.g. `{urn:us:gov:ic:ism}classification`
    pub fn clark(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{{{}}}{}", ns, self.local_name),
            None => self.local_name.clone(),
        }
    }
}

/// Namespace context for resolving prefixes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceContext {
    /// Mapping from prefix to namespace URI, in declaration order
    prefixes: IndexMap<Prefix, NamespaceUri>,
    /// Default namespace (no prefix)
    default_namespace: Option<NamespaceUri>,
}

impl NamespaceContext {
    /// Create a new empty namespace context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a namespace prefix mapping
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Set the default namespace
    pub fn set_default_namespace(&mut self, namespace: impl Into<String>) {
        self.default_namespace = Some(namespace.into());
    }

    /// Get the namespace for a prefix
    pub fn get_namespace(&self, prefix: &str) -> Option<&str> {
        if prefix == "xml" {
            return Some(XML_NAMESPACE);
        }
        self.prefixes.get(prefix).map(|s| s.as_str())
    }

    /// Get the default namespace
    pub fn get_default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// Iterate over the prefixed declarations
    pub fn iter(&self) -> impl Iterator<Item = (&Prefix, &NamespaceUri)> {
        self.prefixes.iter()
    }

    /// True if nothing is declared
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty() && self.default_namespace.is_none()
    }

    /// A child scope: this context overlaid with `declarations`
    pub fn scoped(&self, declarations: &NamespaceContext) -> NamespaceContext {
        let mut scope = self.clone();
        for (prefix, uri) in declarations.iter() {
            scope.add_prefix(prefix.clone(), uri.clone());
        }
        if let Some(default) = declarations.get_default_namespace() {
            scope.set_default_namespace(default);
        }
        scope
    }

    /// Resolve an element name; unprefixed names take the default namespace
    pub fn resolve_element(&self, prefixed_name: &str) -> Result<QName> {
        self.resolve(prefixed_name, true)
    }

    /// Resolve an attribute name; unprefixed names have no namespace
    pub fn resolve_attribute(&self, prefixed_name: &str) -> Result<QName> {
        self.resolve(prefixed_name, false)
    }

    fn resolve(&self, prefixed_name: &str, use_default: bool) -> Result<QName> {
        if let Some((prefix, local)) = prefixed_name.split_once(':') {
            let namespace = self
                .get_namespace(prefix)
                .ok_or_else(|| Error::Xml(format!("Unknown prefix: {}", prefix)))?;
            Ok(QName::prefixed(prefix, namespace, local))
        } else {
            Ok(QName {
                namespace: if use_default {
                    self.default_namespace.clone()
                } else {
                    None
                },
                local_name: prefixed_name.to_string(),
                prefix: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qname_forms() {
        let qname = QName::prefixed("ddms", "urn:us:mil:ces:metadata:ddms:5", "title");
        assert_eq!(qname.prefixed_name(), "ddms:title");
        assert_eq!(qname.clark(), "{urn:us:mil:ces:metadata:ddms:5}title");
        assert!(qname.matches("urn:us:mil:ces:metadata:ddms:5", "title"));

        let qname_local = QName::local("element");
        assert_eq!(qname_local.prefixed_name(), "element");
        assert_eq!(qname_local.clark(), "element");
    }

    #[test]
    fn test_scoped_resolution() {
        let mut root = NamespaceContext::new();
        root.add_prefix("ddms", "urn:us:mil:ces:metadata:ddms:4");
        let mut inner = NamespaceContext::new();
        inner.set_default_namespace("urn:example");
        let scope = root.scoped(&inner);

        let element = scope.resolve_element("name").unwrap();
        assert_eq!(element.namespace.as_deref(), Some("urn:example"));
        let attribute = scope.resolve_attribute("name").unwrap();
        assert_eq!(attribute.namespace, None);
        let prefixed = scope.resolve_attribute("ddms:qualifier").unwrap();
        assert_eq!(
            prefixed.namespace.as_deref(),
            Some("urn:us:mil:ces:metadata:ddms:4")
        );
    }

    #[test]
    fn test_unknown_prefix_fails() {
        let ctx = NamespaceContext::new();
        assert!(ctx.resolve_element("ISM:classification").is_err());
        assert_eq!(ctx.get_namespace("xml"), Some(XML_NAMESPACE));
    }
}
