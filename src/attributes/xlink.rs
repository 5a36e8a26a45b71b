//! XLink attributes

use crate::components::helpers::set_schema_attribute;
use crate::components::output;
use crate::datatypes::validate_uri;
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::names::validate_ncname;
use crate::versions::{SchemaKind, Version};

const TYPES: [&str; 3] = ["locator", "simple", "resource"];
const SHOW_TYPES: [&str; 5] = ["new", "replace", "embed", "other", "none"];
const ACTUATE_TYPES: [&str; 4] = ["onLoad", "onRequest", "other", "none"];

/// Linking attributes in the XLink namespace
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XLinkAttributes {
    link_type: String,
    href: String,
    role: String,
    title: String,
    label: String,
    arcrole: String,
    show: String,
    actuate: String,
}

impl XLinkAttributes {
    /// Read the XLink attributes of an element
    pub fn from_element(element: &Element, version: Version) -> Result<Self> {
        let ns = version.xlink_namespace();
        let get = |name: &str| element.attribute_value(ns, name).to_string();
        let attributes = Self {
            link_type: get("type"),
            href: get("href"),
            role: get("role"),
            title: get("title"),
            label: get("label"),
            arcrole: get("arcrole"),
            show: get("show"),
            actuate: get("actuate"),
        };
        attributes.validate(version)?;
        Ok(attributes)
    }

    /// Attributes for a `locator` link
    pub fn locator(version: Version, href: &str, role: &str, title: &str, label: &str) -> Result<Self> {
        let attributes = Self {
            link_type: "locator".to_string(),
            href: href.to_string(),
            role: role.to_string(),
            title: title.to_string(),
            label: label.to_string(),
            ..Self::default()
        };
        attributes.validate(version)?;
        Ok(attributes)
    }

    /// Attributes for a `simple` link
    pub fn simple(
        version: Version,
        href: &str,
        role: &str,
        title: &str,
        arcrole: &str,
        show: &str,
        actuate: &str,
    ) -> Result<Self> {
        let attributes = Self {
            link_type: "simple".to_string(),
            href: href.to_string(),
            role: role.to_string(),
            title: title.to_string(),
            arcrole: arcrole.to_string(),
            show: show.to_string(),
            actuate: actuate.to_string(),
            ..Self::default()
        };
        attributes.validate(version)?;
        Ok(attributes)
    }

    /// Attributes for a `resource` link, which names a local resource and has no href
    pub fn resource(version: Version, role: &str, title: &str, label: &str) -> Result<Self> {
        let attributes = Self {
            link_type: "resource".to_string(),
            role: role.to_string(),
            title: title.to_string(),
            label: label.to_string(),
            ..Self::default()
        };
        attributes.validate(version)?;
        Ok(attributes)
    }

    fn validate(&self, version: Version) -> Result<()> {
        if !self.link_type.is_empty() && !TYPES.contains(&self.link_type.as_str()) {
            return Err(Error::invalid(format!(
                "The type attribute must be one of {}",
                TYPES.join(", ")
            )));
        }
        if !self.href.is_empty() {
            validate_uri(&self.href)?;
        }
        if version.is_at_least(Version::V4_0_1) {
            if !self.role.is_empty() {
                validate_uri(&self.role)?;
            }
            if !self.label.is_empty() {
                validate_ncname(&self.label)?;
            }
        }
        if !self.arcrole.is_empty() {
            validate_uri(&self.arcrole)?;
        }
        if !self.show.is_empty() && !SHOW_TYPES.contains(&self.show.as_str()) {
            return Err(Error::invalid(format!(
                "The show attribute must be one of {}",
                SHOW_TYPES.join(", ")
            )));
        }
        if !self.actuate.is_empty() && !ACTUATE_TYPES.contains(&self.actuate.as_str()) {
            return Err(Error::invalid(format!(
                "The actuate attribute must be one of {}",
                ACTUATE_TYPES.join(", ")
            )));
        }
        Ok(())
    }

    /// True if no attribute is set
    pub fn is_empty(&self) -> bool {
        self.link_type.is_empty()
            && self.href.is_empty()
            && self.role.is_empty()
            && self.title.is_empty()
            && self.label.is_empty()
            && self.arcrole.is_empty()
            && self.show.is_empty()
            && self.actuate.is_empty()
    }

    /// The link type
    pub fn link_type(&self) -> &str {
        &self.link_type
    }

    /// The href URI
    pub fn href(&self) -> &str {
        &self.href
    }

    /// The role
    pub fn role(&self) -> &str {
        &self.role
    }

    /// The title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The arcrole
    pub fn arcrole(&self) -> &str {
        &self.arcrole
    }

    /// The show behavior
    pub fn show(&self) -> &str {
        &self.show
    }

    /// The actuate behavior
    pub fn actuate(&self) -> &str {
        &self.actuate
    }

    fn pairs(&self) -> [(&'static str, &str); 8] {
        [
            ("type", self.link_type.as_str()),
            ("href", self.href.as_str()),
            ("role", self.role.as_str()),
            ("title", self.title.as_str()),
            ("label", self.label.as_str()),
            ("arcrole", self.arcrole.as_str()),
            ("show", self.show.as_str()),
            ("actuate", self.actuate.as_str()),
        ]
    }

    /// Write these attributes onto a freshly built element
    pub fn add_to(&self, element: &mut Element, version: Version) -> Result<()> {
        for (name, value) in self.pairs() {
            set_schema_attribute(element, version, SchemaKind::Xlink, name, value)?;
        }
        Ok(())
    }

    /// Render each set attribute as `prefix + name`
    pub fn output(&self, html: bool, prefix: &str) -> String {
        self.pairs()
            .iter()
            .map(|(name, value)| output::line(html, &format!("{}{}", prefix, name), value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_output() {
        let link = XLinkAttributes::locator(Version::V5_0, "http://en.wikipedia.org/wiki/Tank", "tank", "Tank Page", "tank").unwrap();
        assert_eq!(
            link.output(false, "link."),
            "link.type: locator\nlink.href: http://en.wikipedia.org/wiki/Tank\nlink.role: tank\nlink.title: Tank Page\nlink.label: tank\n"
        );
    }

    #[test]
    fn test_resource_output() {
        let link = XLinkAttributes::resource(Version::V4_1, "tank", "Tank Page", "tank").unwrap();
        assert_eq!(
            link.output(false, "revisionRecall."),
            "revisionRecall.type: resource\nrevisionRecall.role: tank\nrevisionRecall.title: Tank Page\nrevisionRecall.label: tank\n"
        );
        assert!(link.href().is_empty());
    }

    #[test]
    fn test_invalid_show() {
        let err = XLinkAttributes::simple(Version::V5_0, "http://x", "", "", "", "sideways", "").unwrap_err();
        assert!(err.message().unwrap().starts_with("The show attribute must be one of"));
    }

    #[test]
    fn test_label_must_be_ncname_from_4_0_1() {
        assert!(XLinkAttributes::locator(Version::V4_1, "http://x", "", "", "1bad").is_err());
        assert!(XLinkAttributes::locator(Version::V3_1, "http://x", "", "", "1bad").is_ok());
    }
}
