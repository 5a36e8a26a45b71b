//! Extensible elements: any element outside the DDMS namespaces
//!
//! The content is carried through untouched. It takes part in XML output but
//! renders nothing in the HTML and text views.

use crate::components::{Base, Builder, Component};
use crate::documents::{parse_element, Element};
use crate::error::{Error, Result};
use crate::versions::Version;

/// A foreign-namespace element attached to a resource
#[derive(Debug, Clone)]
pub struct ExtensibleElement {
    base: Base,
}

impl ExtensibleElement {
    /// Wrap a parsed element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let component = Self {
            base: Base::new(element, version),
        };
        component.validate().map_err(|e| e.locate(&qname))?;
        Ok(component)
    }

    /// Parse XML text into an extensible element
    pub fn from_xml(version: Version, xml: &str) -> Result<Self> {
        Self::from_element(parse_element(xml)?, version)
    }

    fn validate(&self) -> Result<()> {
        match self.element().namespace() {
            Some(namespace) if Version::is_supported_ddms_namespace(namespace) => Err(Error::invalid(
                "Extensible elements cannot be defined in the DDMS namespace.",
            )),
            _ => Ok(()),
        }
    }
}

impl Component for ExtensibleElement {
    fn base(&self) -> &Base {
        &self.base
    }

    fn output(&self, _html: bool, _prefix: &str, _suffix: &str) -> String {
        String::new()
    }
}

/// Equal when the serialized elements match
impl PartialEq for ExtensibleElement {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base && self.to_xml() == other.to_xml()
    }
}

/// Staging form of [`ExtensibleElement`], holding raw XML
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtensibleElementBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// The element as XML text
    pub xml: String,
}

impl Builder for ExtensibleElementBuilder {
    type Target = ExtensibleElement;

    fn is_empty(&self) -> bool {
        self.xml.trim().is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<ExtensibleElement> {
        ExtensibleElement::from_xml(version, &self.xml)
    }
}

impl From<&ExtensibleElement> for ExtensibleElementBuilder {
    fn from(component: &ExtensibleElement) -> Self {
        Self {
            version: Some(component.version()),
            xml: component.to_xml(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EXTENSION: &str = "<ddmsence:extension xmlns:ddmsence=\"http://ddmsence.urizone.net/\">This is an extensible element.</ddmsence:extension>";

    #[test]
    fn test_foreign_element_is_kept() {
        let element = ExtensibleElement::from_xml(Version::V5_0, EXTENSION).unwrap();
        assert_eq!(element.to_xml(), EXTENSION);
        assert_eq!(element.to_text(), "");
        assert_eq!(element.name(), "extension");
    }

    #[test]
    fn test_ddms_namespace_rejected() {
        let xml = format!("<ddms:title xmlns:ddms=\"{}\">x</ddms:title>", Version::V3_1.ddms_namespace());
        let err = ExtensibleElement::from_xml(Version::V5_0, &xml).unwrap_err();
        assert_eq!(err.message(), Some("Extensible elements cannot be defined in the DDMS namespace."));
        assert_eq!(err.locator(), Some("/ddms:title"));
    }

    #[test]
    fn test_builder() {
        let mut builder = ExtensibleElementBuilder::default();
        assert!(builder.commit().unwrap().is_none());
        builder.xml = EXTENSION.to_string();
        let built = builder.commit_as(Version::V4_1).unwrap().unwrap();
        assert_eq!(ExtensibleElementBuilder::from(&built).commit().unwrap().unwrap(), built);
    }
}
