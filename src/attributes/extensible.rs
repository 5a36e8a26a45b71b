//! Extensible attributes
//!
//! Attributes in a foreign namespace that DDMS passes through without
//! interpretation. Some foreign-looking names are reserved because a schema
//! defines them on the same element, such as the ISM markings on a resource;
//! those are never treated as extensible.

use crate::attributes::security;
use crate::components::output;
use crate::documents::{Attribute, Element};
use crate::error::{Error, Result};
use crate::versions::{SchemaKind, Version};

/// ISM attribute names defined on the resource itself
const RESOURCE_ISM_NAMES: [&str; 9] = [
    "resourceElement",
    "createDate",
    "DESVersion",
    "noticeType",
    "noticeReason",
    "noticeDate",
    "unregisteredNoticeType",
    "externalNotice",
    "excludeFromRollup",
];

/// True if the attribute name is reserved by a schema in this version
pub fn is_reserved(version: Version, namespace: &str, local_name: &str) -> bool {
    if namespace == version.ism_namespace() {
        return security::attribute_names().any(|n| n == local_name)
            || RESOURCE_ISM_NAMES.contains(&local_name);
    }
    if let Ok(ntk) = version.namespace_for(SchemaKind::Ntk) {
        if namespace == ntk && local_name == "DESVersion" {
            return true;
        }
    }
    false
}

/// Foreign-namespace attributes on one element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtensibleAttributes {
    version: Version,
    attributes: Vec<Attribute>,
}

impl ExtensibleAttributes {
    /// Collect every non-reserved attribute outside the DDMS namespace
    pub fn from_element(element: &Element, version: Version) -> Result<Self> {
        let ddms = version.ddms_namespace();
        let attributes = element
            .attributes
            .iter()
            .filter(|a| match a.qname.namespace.as_deref() {
                Some(ns) => {
                    ns != ddms
                        && ns != crate::namespaces::XML_NAMESPACE
                        && !is_reserved(version, ns, &a.qname.local_name)
                }
                None => false,
            })
            .cloned()
            .collect();
        Ok(Self {
            version,
            attributes,
        })
    }

    /// Build from raw attributes
    pub fn new(version: Version, attributes: Vec<Attribute>) -> Result<Self> {
        for attribute in &attributes {
            match attribute.qname.namespace.as_deref() {
                Some(ns) if ns == version.ddms_namespace() => {
                    return Err(Error::invalid(
                        "Extensible attributes cannot be in the DDMS namespace.",
                    ))
                }
                None => {
                    return Err(Error::invalid(
                        "Extensible attributes must be in a namespace.",
                    ))
                }
                _ => {}
            }
        }
        Ok(Self {
            version,
            attributes,
        })
    }

    /// An empty attribute group
    pub fn empty(version: Version) -> Self {
        Self {
            version,
            attributes: Vec::new(),
        }
    }

    /// True if no attribute is set
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// The attributes, in document order
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Write these attributes onto a freshly built element.
    ///
    /// Fails if an attribute is reserved in this version or already present.
    pub fn add_to(&self, element: &mut Element, version: Version) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        if version != self.version {
            return Err(Error::invalid(
                "These extensible attributes cannot decorate a DDMS component with a different DDMS version.",
            ));
        }
        for attribute in &self.attributes {
            let namespace = attribute.qname.namespace.as_deref().unwrap_or("");
            let local_name = attribute.qname.local_name.as_str();
            if is_reserved(version, namespace, local_name) {
                return Err(Error::invalid(format!(
                    "The extensible attribute with the name, {}, is reserved by the schema.",
                    attribute.qname.prefixed_name()
                )));
            }
            if element.has_attribute(Some(namespace), local_name) {
                return Err(Error::invalid(format!(
                    "The extensible attribute with the name, {} conflicts with a pre-existing attribute on the element.",
                    attribute.qname.prefixed_name()
                )));
            }
            element.attributes.push(attribute.clone());
        }
        Ok(())
    }

    /// Render each attribute as `prefix + local name`
    pub fn output(&self, html: bool, prefix: &str) -> String {
        self.attributes
            .iter()
            .map(|a| output::line(html, &format!("{}{}", prefix, a.qname.local_name), &a.value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::helpers::ddms_element;
    use crate::namespaces::QName;

    fn foreign(local: &str, value: &str) -> Attribute {
        Attribute::new(QName::prefixed("opt", "http://example.com/ns", local), value)
    }

    #[test]
    fn test_reserved_names_are_skipped_on_parse() {
        let element = crate::documents::parse_element(
            r#"<ddms:resource xmlns:ddms="urn:us:mil:ces:metadata:ddms:5" xmlns:ISM="urn:us:gov:ic:ism" xmlns:opt="http://example.com/ns" ISM:classification="U" ISM:DESVersion="9" opt:relevance="95" />"#,
        )
        .unwrap();
        let attrs = ExtensibleAttributes::from_element(&element, Version::V5_0).unwrap();
        assert_eq!(attrs.attributes().len(), 1);
        assert_eq!(attrs.output(false, "extensible."), "extensible.relevance: 95\n");
    }

    #[test]
    fn test_add_to_rejects_collisions() {
        let attrs = ExtensibleAttributes::new(Version::V5_0, vec![foreign("relevance", "95")]).unwrap();
        let mut element = ddms_element(Version::V5_0, "keyword");
        element.set_attribute(QName::prefixed("opt", "http://example.com/ns", "relevance"), "1");
        let err = attrs.add_to(&mut element, Version::V5_0).unwrap_err();
        assert!(err.message().unwrap().contains("conflicts with a pre-existing attribute"));
    }

    #[test]
    fn test_add_to_rejects_reserved() {
        let reserved = Attribute::new(QName::prefixed("ISM", "urn:us:gov:ic:ism", "classification"), "U");
        let attrs = ExtensibleAttributes::new(Version::V3_0, vec![reserved]).unwrap();
        let mut element = ddms_element(Version::V3_0, "Resource");
        assert!(attrs.add_to(&mut element, Version::V3_0).is_err());
    }

    #[test]
    fn test_ddms_namespace_is_not_extensible() {
        let attr = Attribute::new(
            QName::prefixed("ddms", "urn:us:mil:ces:metadata:ddms:5", "x"),
            "1",
        );
        assert!(ExtensibleAttributes::new(Version::V5_0, vec![attr]).is_err());
    }
}
