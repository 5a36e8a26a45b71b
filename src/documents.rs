//! XML element trees
//!
//! Components are backed by an owned [`Element`] tree. This module reads such
//! trees from XML text and writes them back, declaring each namespace prefix
//! on the element where it is first used.

use crate::error::{Error, Result};
use crate::namespaces::{NamespaceContext, QName};
use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// An attribute on an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute qualified name
    pub qname: QName,
    /// Attribute value
    pub value: String,
}

impl Attribute {
    /// Create a new attribute
    pub fn new(qname: QName, value: impl Into<String>) -> Self {
        Self {
            qname,
            value: value.into(),
        }
    }
}

/// XML Element in the document tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Element qualified name
    pub qname: QName,
    /// Element attributes, in document order
    pub attributes: Vec<Attribute>,
    /// Text content (if any)
    pub text: Option<String>,
    /// Child elements
    pub children: Vec<Element>,
    /// Namespace declarations written on this element
    pub namespaces: NamespaceContext,
}

impl Element {
    /// Create a new element
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
            namespaces: NamespaceContext::new(),
        }
    }

    /// Get the local name of the element
    pub fn local_name(&self) -> &str {
        &self.qname.local_name
    }

    /// Get the namespace of the element
    pub fn namespace(&self) -> Option<&str> {
        self.qname.namespace.as_deref()
    }

    /// Get the prefix of the element
    pub fn prefix(&self) -> Option<&str> {
        self.qname.prefix.as_deref()
    }

    /// The element name as written, e.g. `ddms:title`
    pub fn qualified_name(&self) -> String {
        self.qname.prefixed_name()
    }

    /// Text content, or the empty string
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Set text content
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    /// Get an attribute value by namespace and local name
    pub fn attribute(&self, namespace: Option<&str>, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.qname.local_name == local_name && a.qname.namespace.as_deref() == namespace)
            .map(|a| a.value.as_str())
    }

    /// Get an attribute value in a namespace, or the empty string
    pub fn attribute_value(&self, namespace: &str, local_name: &str) -> &str {
        self.attribute(Some(namespace), local_name).unwrap_or("")
    }

    /// True if an attribute with this namespace and local name exists
    pub fn has_attribute(&self, namespace: Option<&str>, local_name: &str) -> bool {
        self.attribute(namespace, local_name).is_some()
    }

    /// Add an attribute, replacing any existing one with the same name
    pub fn set_attribute(&mut self, qname: QName, value: impl Into<String>) {
        let value = value.into();
        if let Some(existing) = self.attributes.iter_mut().find(|a| {
            a.qname.local_name == qname.local_name && a.qname.namespace == qname.namespace
        }) {
            existing.value = value;
        } else {
            self.attributes.push(Attribute::new(qname, value));
        }
    }

    /// Add a child element
    pub fn add_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Child elements with this namespace and local name
    pub fn children_named<'a>(
        &'a self,
        namespace: &'a str,
        local_name: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.children
            .iter()
            .filter(move |e| e.qname.matches(namespace, local_name))
    }

    /// First child element with this namespace and local name
    pub fn first_child(&self, namespace: &str, local_name: &str) -> Option<&Element> {
        self.children
            .iter()
            .find(|e| e.qname.matches(namespace, local_name))
    }

    /// Text values of every child with this namespace and local name
    pub fn child_values(&self, namespace: &str, local_name: &str) -> Vec<String> {
        self.children_named(namespace, local_name)
            .map(|e| e.text().to_string())
            .collect()
    }

    /// Serialize this element and its descendants to XML
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        write_element(self, &NamespaceContext::new(), &mut out);
        out
    }
}

fn declare(
    prefix: Option<&str>,
    namespace: &str,
    scope: &mut NamespaceContext,
    declarations: &mut Vec<(Option<String>, String)>,
) {
    let bound = match prefix {
        Some("xml") => return,
        Some(p) => scope.get_namespace(p),
        None => scope.get_default_namespace(),
    };
    if bound == Some(namespace) {
        return;
    }
    match prefix {
        Some(p) => scope.add_prefix(p, namespace),
        None => scope.set_default_namespace(namespace),
    }
    declarations.push((prefix.map(str::to_string), namespace.to_string()));
}

fn write_element(element: &Element, parent_scope: &NamespaceContext, out: &mut String) {
    let mut scope = parent_scope.clone();
    let mut declarations: Vec<(Option<String>, String)> = Vec::new();

    if let Some(ns) = element.namespace() {
        declare(element.prefix(), ns, &mut scope, &mut declarations);
    }
    for (prefix, uri) in element.namespaces.iter() {
        declare(Some(prefix), uri, &mut scope, &mut declarations);
    }
    if let Some(default) = element.namespaces.get_default_namespace() {
        declare(None, default, &mut scope, &mut declarations);
    }
    for attribute in &element.attributes {
        if let (Some(prefix), Some(ns)) = (attribute.qname.prefix.as_deref(), attribute.qname.namespace.as_deref()) {
            declare(Some(prefix), ns, &mut scope, &mut declarations);
        }
    }

    out.push('<');
    out.push_str(&element.qualified_name());
    for (prefix, uri) in &declarations {
        match prefix {
            Some(p) => out.push_str(&format!(" xmlns:{}=\"{}\"", p, escape(uri.as_str()))),
            None => out.push_str(&format!(" xmlns=\"{}\"", escape(uri.as_str()))),
        }
    }
    for attribute in &element.attributes {
        out.push_str(&format!(
            " {}=\"{}\"",
            attribute.qname.prefixed_name(),
            escape(attribute.value.as_str())
        ));
    }

    let text = element.text.as_deref().unwrap_or("");
    if text.is_empty() && element.children.is_empty() {
        out.push_str(" />");
        return;
    }
    out.push('>');
    out.push_str(&partial_escape(text));
    for child in &element.children {
        write_element(child, &scope, out);
    }
    out.push_str("</");
    out.push_str(&element.qualified_name());
    out.push('>');
}

/// XML Document representation
#[derive(Debug, Default)]
pub struct Document {
    /// Root element of the document
    pub root: Option<Element>,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an XML document from a string
    pub fn from_string(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut doc = Document::new();
        let mut element_stack: Vec<(Element, NamespaceContext)> = Vec::new();
        let root_scope = NamespaceContext::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let scope = element_stack.last().map(|(_, s)| s).unwrap_or(&root_scope);
                    let (element, inner_scope) = Self::parse_element(&e, scope)?;
                    element_stack.push((element, inner_scope));
                }
                Ok(Event::End(_)) => {
                    if let Some((current, _)) = element_stack.pop() {
                        if let Some((parent, _)) = element_stack.last_mut() {
                            parent.add_child(current);
                        } else {
                            doc.root = Some(current);
                        }
                    }
                }
                Ok(Event::Empty(e)) => {
                    let scope = element_stack.last().map(|(_, s)| s).unwrap_or(&root_scope);
                    let (element, _) = Self::parse_element(&e, scope)?;
                    if let Some((parent, _)) = element_stack.last_mut() {
                        parent.add_child(element);
                    } else {
                        doc.root = Some(element);
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some((current, _)) = element_stack.last_mut() {
                        let text = e
                            .unescape()
                            .map_err(|e| Error::Xml(format!("Failed to unescape text: {}", e)))?;
                        Self::append_text(current, &text);
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some((current, _)) = element_stack.last_mut() {
                        let bytes = e.into_inner();
                        let text = std::str::from_utf8(&bytes)
                            .map_err(|e| Error::Xml(format!("Invalid CDATA content: {}", e)))?;
                        Self::append_text(current, text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!(
                        "Error parsing XML at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {} // Ignore comments, processing instructions and the prolog
            }
        }

        if !element_stack.is_empty() {
            return Err(Error::Xml("Unexpected end of document".to_string()));
        }
        Ok(doc)
    }

    fn append_text(element: &mut Element, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        match element.text.as_mut() {
            Some(existing) => existing.push_str(text),
            None => element.set_text(text),
        }
    }

    /// Parse element from a start tag, returning the element and its scope
    fn parse_element(
        start: &BytesStart,
        parent_scope: &NamespaceContext,
    ) -> Result<(Element, NamespaceContext)> {
        let name_bytes = start.name();
        let name = std::str::from_utf8(name_bytes.as_ref())
            .map_err(|e| Error::Xml(format!("Invalid element name: {}", e)))?
            .to_string();

        let mut declarations = NamespaceContext::new();
        let mut raw_attributes: Vec<(String, String)> = Vec::new();

        for attr_result in start.attributes() {
            let attr = attr_result
                .map_err(|e| Error::Xml(format!("Failed to parse attribute: {}", e)))?;

            let attr_name = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| Error::Xml(format!("Invalid attribute name: {}", e)))?
                .to_string();

            let attr_value = attr
                .unescape_value()
                .map_err(|e| Error::Xml(format!("Failed to unescape attribute value: {}", e)))?
                .to_string();

            if attr_name == "xmlns" {
                declarations.set_default_namespace(&attr_value);
            } else if let Some(prefix) = attr_name.strip_prefix("xmlns:") {
                declarations.add_prefix(prefix, &attr_value);
            } else {
                raw_attributes.push((attr_name, attr_value));
            }
        }

        let scope = parent_scope.scoped(&declarations);
        let mut element = Element::new(scope.resolve_element(&name)?);
        element.namespaces = declarations;
        for (attr_name, attr_value) in raw_attributes {
            let qname = scope.resolve_attribute(&attr_name)?;
            element.attributes.push(Attribute::new(qname, attr_value));
        }

        Ok((element, scope))
    }

    /// Take the root element, failing on an empty document
    pub fn into_root(self) -> Result<Element> {
        self.root
            .ok_or_else(|| Error::Xml("XML document has no root element".to_string()))
    }
}

/// Parse XML text straight to its root element
pub fn parse_element(xml: &str) -> Result<Element> {
    Document::from_string(xml)?.into_root()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DDMS: &str = "urn:us:mil:ces:metadata:ddms:5";

    #[test]
    fn test_parse_simple_xml() {
        let xml = r#"<root><child>text</child></root>"#;
        let root = parse_element(xml).unwrap();

        assert_eq!(root.local_name(), "root");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].local_name(), "child");
        assert_eq!(root.children[0].text.as_deref(), Some("text"));
    }

    #[test]
    fn test_parse_resolves_namespaces() {
        let xml = r#"<ddms:title xmlns:ddms="urn:us:mil:ces:metadata:ddms:5" xmlns:ISM="urn:us:gov:ic:ism" ISM:classification="U">A Title</ddms:title>"#;
        let root = parse_element(xml).unwrap();

        assert_eq!(root.namespace(), Some(DDMS));
        assert_eq!(root.qualified_name(), "ddms:title");
        assert_eq!(root.attribute(Some("urn:us:gov:ic:ism"), "classification"), Some("U"));
        assert_eq!(root.namespaces.get_namespace("ISM"), Some("urn:us:gov:ic:ism"));
    }

    #[test]
    fn test_unprefixed_attributes_have_no_namespace() {
        let xml = r#"<root xmlns="http://example.com" attr1="value1"/>"#;
        let root = parse_element(xml).unwrap();

        assert_eq!(root.namespace(), Some("http://example.com"));
        assert_eq!(root.attribute(None, "attr1"), Some("value1"));
    }

    #[test]
    fn test_unknown_prefix_is_an_error() {
        assert!(parse_element("<ddms:title>x</ddms:title>").is_err());
    }

    #[test]
    fn test_serialize_declares_prefix_once() {
        let mut parent = Element::new(QName::prefixed("ddms", DDMS, "subjectCoverage"));
        let mut child = Element::new(QName::prefixed("ddms", DDMS, "keyword"));
        child.set_attribute(QName::prefixed("ddms", DDMS, "value"), "a & b");
        parent.add_child(child);

        assert_eq!(
            parent.to_xml(),
            r#"<ddms:subjectCoverage xmlns:ddms="urn:us:mil:ces:metadata:ddms:5"><ddms:keyword ddms:value="a &amp; b" /></ddms:subjectCoverage>"#
        );
    }

    #[test]
    fn test_round_trip_preserves_tree() {
        let xml = r#"<ddms:name xmlns:ddms="urn:us:mil:ces:metadata:ddms:5">Fred &lt;Smith&gt;</ddms:name>"#;
        let root = parse_element(xml).unwrap();
        assert_eq!(root.text(), "Fred <Smith>");
        let again = parse_element(&root.to_xml()).unwrap();
        assert_eq!(root, again);
    }

    #[test]
    fn test_child_lookup() {
        let xml = r#"<d:a xmlns:d="urn:x"><d:b>1</d:b><d:c/><d:b>2</d:b></d:a>"#;
        let root = parse_element(xml).unwrap();
        assert_eq!(root.child_values("urn:x", "b"), vec!["1", "2"]);
        assert!(root.first_child("urn:x", "c").is_some());
        assert_eq!(root.children_named("urn:x", "b").count(), 2);
    }

    #[test]
    fn test_first_child_outlives_lookup_names() {
        let xml = r#"<d:a xmlns:d="urn:x"><d:b>1</d:b><d:b>2</d:b></d:a>"#;
        let root = parse_element(xml).unwrap();
        let found = {
            let namespace = String::from("urn:x");
            root.first_child(&namespace, "b")
        };
        assert_eq!(found.map(Element::text), Some("1"));
        assert!(root.first_child("urn:y", "b").is_none());
    }
}
