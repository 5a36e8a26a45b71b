//! Element construction and validation helpers shared by all components

use super::Component;
use crate::config;
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::namespaces::QName;
use crate::versions::{SchemaKind, Version};

/// A fresh element in a sub-schema namespace, using the configured prefix
pub fn schema_element(version: Version, kind: SchemaKind, local_name: &str) -> Result<Element> {
    let namespace = version.namespace_for(kind)?;
    Ok(Element::new(QName::prefixed(
        config::prefix_for(kind),
        namespace,
        local_name,
    )))
}

/// A fresh element in the DDMS namespace
pub fn ddms_element(version: Version, local_name: &str) -> Element {
    Element::new(QName::prefixed(
        config::prefix_for(SchemaKind::Ddms),
        version.ddms_namespace(),
        local_name,
    ))
}

/// A fresh DDMS element holding text
pub fn ddms_text_element(version: Version, local_name: &str, text: &str) -> Element {
    let mut element = ddms_element(version, local_name);
    if !text.is_empty() {
        element.set_text(text);
    }
    element
}

/// Set an attribute in a sub-schema namespace, skipping empty values
pub fn set_schema_attribute(
    element: &mut Element,
    version: Version,
    kind: SchemaKind,
    local_name: &str,
    value: &str,
) -> Result<()> {
    if value.is_empty() {
        return Ok(());
    }
    let namespace = version.namespace_for(kind)?;
    element.set_attribute(
        QName::prefixed(config::prefix_for(kind), namespace, local_name),
        value,
    );
    Ok(())
}

/// Set a DDMS attribute, skipping empty values
pub fn set_ddms_attribute(element: &mut Element, version: Version, local_name: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    element.set_attribute(
        QName::prefixed(
            config::prefix_for(SchemaKind::Ddms),
            version.ddms_namespace(),
            local_name,
        ),
        value,
    );
}

/// Append a DDMS child holding text, skipping empty values
pub fn add_ddms_text_child(element: &mut Element, version: Version, local_name: &str, text: &str) {
    if !text.is_empty() {
        element.add_child(ddms_text_element(version, local_name, text));
    }
}

/// The value of an attribute in the element's own namespace
pub fn own_attribute<'a>(element: &'a Element, local_name: &str) -> &'a str {
    let namespace = element.namespace().unwrap_or("");
    element.attribute_value(namespace, local_name)
}

/// Text of the first child in the element's own namespace
pub fn child_text(element: &Element, local_name: &str) -> String {
    let namespace = element.namespace().unwrap_or("");
    element
        .first_child(namespace, local_name)
        .map(|c| c.text().to_string())
        .unwrap_or_default()
}

/// The inner element that wrapped content before DDMS 4.0.1, such as
/// `ddms:Subject` inside `ddms:subjectCoverage`. `None` from 4.0.1 on.
pub fn legacy_wrapper<'a>(element: &'a Element, version: Version, local_name: &str) -> Option<&'a Element> {
    if version.is_at_least(Version::V4_0_1) {
        return None;
    }
    element.first_child(element.namespace().unwrap_or(""), local_name)
}

/// The element holding the content: the legacy wrapper when the version
/// uses one, otherwise the element itself. `None` if a needed wrapper is
/// missing.
pub fn content_element<'a>(element: &'a Element, version: Version, wrapper: &str) -> Option<&'a Element> {
    if version.is_at_least(Version::V4_0_1) {
        Some(element)
    } else {
        legacy_wrapper(element, version, wrapper)
    }
}

/// Append children directly, or inside a fresh legacy wrapper before 4.0.1
pub fn add_wrapped(element: &mut Element, version: Version, wrapper: &str, children: Vec<Element>) {
    if version.is_at_least(Version::V4_0_1) {
        element.children.extend(children);
    } else {
        let mut inner = ddms_element(version, wrapper);
        inner.children.extend(children);
        element.add_child(inner);
    }
}

/// Prepend the wrapper's name to a nested failure when content sat inside one
pub fn locate_in_wrapper(err: Error, content: &Element, wrapper: &str) -> Error {
    if content.local_name() == wrapper {
        err.locate(&content.qualified_name())
    } else {
        err
    }
}

/// Split a space-delimited xs:list
pub fn split_list(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

/// Join values into an xs:list
pub fn xs_list(values: &[String]) -> String {
    values.join(" ")
}

/// Require a non-empty value
pub fn require_value(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::invalid(format!("{} is required.", name)))
    } else {
        Ok(())
    }
}

/// Require a child count within `low..=high`
pub fn require_count(name: &str, count: usize, low: usize, high: usize) -> Result<()> {
    if (low..=high).contains(&count) {
        return Ok(());
    }
    let plural = if high == 1 { "" } else { "s" };
    let message = if low == high {
        format!("Exactly {} {} element{} must exist.", high, name, plural)
    } else if low == 0 {
        format!("No more than {} {} element{} can exist.", high, name, plural)
    } else if high == usize::MAX {
        format!(
            "At least {} {} element{} must exist.",
            low,
            name,
            if low == 1 { "" } else { "s" }
        )
    } else {
        format!(
            "The number of {} elements must be between {} and {}.",
            name, low, high
        )
    };
    Err(Error::invalid(message))
}

/// Count children of the element in its own namespace, then require a range
pub fn require_child_count(element: &Element, local_name: &str, low: usize, high: usize) -> Result<()> {
    let namespace = element.namespace().unwrap_or("");
    let count = element.children_named(namespace, local_name).count();
    let prefixed = match element.prefix() {
        Some(p) => format!("{}:{}", p, local_name),
        None => local_name.to_string(),
    };
    require_count(&prefixed, count, low, high)
}

/// Require a minimum version for an element or attribute
pub fn require_version(version: Version, minimum: Version, subject: &str) -> Result<()> {
    if version.is_at_least(minimum) {
        Ok(())
    } else {
        Err(Error::invalid(format!(
            "The {} cannot be used until DDMS {} or later.",
            subject, minimum
        )))
    }
}

/// Require that a nested component was built for the same version as its parent
pub fn require_compatible<C: Component + ?Sized>(parent: Version, child: &C) -> Result<()> {
    if child.version() != parent {
        return Err(Error::invalid(format!(
            "A child component, {}, is using a different version of DDMS from its parent.",
            child.qualified_name()
        )));
    }
    Ok(())
}

/// Require that the element is in the DDMS namespace of the version
pub fn require_ddms_namespace(element: &Element, version: Version) -> Result<()> {
    if element.namespace() != Some(version.ddms_namespace()) {
        return Err(Error::invalid(format!(
            "Unexpected namespace URI and local name encountered: {}",
            element.qname.clark()
        )));
    }
    Ok(())
}

/// Require a specific element name in the version's DDMS namespace
pub fn require_ddms_element(element: &Element, version: Version, local_name: &str) -> Result<()> {
    require_ddms_namespace(element, version)?;
    if element.local_name() != local_name {
        return Err(Error::invalid(format!(
            "Unexpected namespace URI and local name encountered: {}",
            element.qname.clark()
        )));
    }
    Ok(())
}

/// Require a specific element name in a sub-schema namespace
pub fn require_schema_element(
    element: &Element,
    version: Version,
    kind: SchemaKind,
    local_name: &str,
) -> Result<()> {
    let namespace = version.namespace_for(kind)?;
    if !element.qname.matches(namespace, local_name) {
        return Err(Error::invalid(format!(
            "Unexpected namespace URI and local name encountered: {}",
            element.qname.clark()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_count_messages() {
        let exact = require_count("ddms:title", 0, 1, 1).unwrap_err();
        assert_eq!(exact.message(), Some("Exactly 1 ddms:title element must exist."));
        let most = require_count("ddms:dates", 2, 0, 1).unwrap_err();
        assert_eq!(most.message(), Some("No more than 1 ddms:dates element can exist."));
        let least = require_count("ddms:identifier", 0, 1, usize::MAX).unwrap_err();
        assert_eq!(least.message(), Some("At least 1 ddms:identifier element must exist."));
        assert!(require_count("gml:pos", 3, 2, 3).is_ok());
    }

    #[test]
    fn test_require_value() {
        let err = require_value("qualifier attribute", " ").unwrap_err();
        assert_eq!(err.message(), Some("qualifier attribute is required."));
    }

    #[test]
    fn test_require_version() {
        let err = require_version(Version::V3_1, Version::V4_1, "ddms:nonStateActor element").unwrap_err();
        assert_eq!(
            err.message(),
            Some("The ddms:nonStateActor element cannot be used until DDMS 4.1 or later.")
        );
    }

    #[test]
    fn test_ddms_element_uses_version_namespace() {
        let element = ddms_text_element(Version::V3_0, "title", "T");
        assert_eq!(element.namespace(), Some("http://metadata.dod.mil/mdr/ns/DDMS/3.0/"));
        assert_eq!(element.qualified_name(), "ddms:title");
        assert_eq!(split_list(" a  b "), vec!["a", "b"]);
    }
}
