//! Format and extent of the resource

use crate::components::helpers::{
    add_wrapped, child_text, content_element, ddms_element, ddms_text_element, locate_in_wrapper,
    own_attribute, require_child_count, require_compatible, require_ddms_element, require_value,
    set_ddms_attribute,
};
use crate::components::{output, Base, Builder, Component};
use crate::datatypes::validate_uri;
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::versions::Version;
use std::sync::Arc;

/// Before 4.0.1 the format fields sit inside a `ddms:Media` wrapper
const MEDIA: &str = "Media";

/// The size or duration of the resource
#[derive(Debug, Clone, PartialEq)]
pub struct Extent {
    base: Base,
    qualifier: String,
    value: String,
}

impl Extent {
    /// Parse a `ddms:extent` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        Self {
            qualifier: own_attribute(&element, "qualifier").to_string(),
            value: own_attribute(&element, "value").to_string(),
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from a qualifier URI and a value
    pub fn new(version: Version, qualifier: &str, value: &str) -> Result<Self> {
        let mut element = ddms_element(version, "extent");
        set_ddms_attribute(&mut element, version, "qualifier", qualifier);
        set_ddms_attribute(&mut element, version, "value", value);
        Self::from_element(element, version)
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        if !self.qualifier.is_empty() && self.value.is_empty() {
            self.base
                .warn("A qualifier has been set without an accompanying value attribute.");
        }
        if self.qualifier.is_empty() && self.value.is_empty() {
            self.base.warn("A completely empty ddms:extent element was found.");
        }
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        require_ddms_element(self.element(), self.version(), "extent")?;
        if !self.value.is_empty() {
            require_value("qualifier attribute", &self.qualifier)?;
        }
        if !self.qualifier.is_empty() {
            validate_uri(&self.qualifier)?;
        }
        Ok(())
    }

    /// The qualifier URI
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    /// The extent value
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Component for Extent {
    fn base(&self) -> &Base {
        &self.base
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let prefix = format!("{}.", output::build_prefix(prefix, self.name(), suffix));
        let mut text = output::line(html, &format!("{}qualifier", prefix), &self.qualifier);
        text.push_str(&output::line(html, &format!("{}value", prefix), &self.value));
        text
    }
}

/// Staging form of [`Extent`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtentBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Qualifier URI
    pub qualifier: String,
    /// Value
    pub value: String,
}

impl Builder for ExtentBuilder {
    type Target = Extent;

    fn is_empty(&self) -> bool {
        self.qualifier.trim().is_empty() && self.value.trim().is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<Extent> {
        Extent::new(version, &self.qualifier, &self.value)
    }
}

impl From<&Extent> for ExtentBuilder {
    fn from(extent: &Extent) -> Self {
        Self {
            version: Some(extent.version()),
            qualifier: extent.qualifier.clone(),
            value: extent.value.clone(),
        }
    }
}

/// The physical or digital manifestation of the resource
#[derive(Debug, Clone, PartialEq)]
pub struct Format {
    base: Base,
    mime_type: String,
    extent: Option<Arc<Extent>>,
    medium: String,
}

impl Format {
    /// Parse a `ddms:format` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let media = content_element(&element, version, MEDIA)
            .cloned()
            .unwrap_or_else(|| element.clone());
        let namespace = media.namespace().unwrap_or("").to_string();
        let extent = match media.first_child(&namespace, "extent") {
            Some(e) => Some(Arc::new(
                Extent::from_element(e.clone(), version)
                    .map_err(|err| locate_in_wrapper(err, &media, MEDIA).locate(&qname))?,
            )),
            None => None,
        };
        Self {
            mime_type: child_text(&media, "mimeType"),
            medium: child_text(&media, "medium"),
            extent,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from a MIME type, an optional extent and a medium
    pub fn new(version: Version, mime_type: &str, extent: Option<Arc<Extent>>, medium: &str) -> Result<Self> {
        let mut element = ddms_element(version, "format");
        let mut children = Vec::new();
        if !mime_type.is_empty() {
            children.push(ddms_text_element(version, "mimeType", mime_type));
        }
        if let Some(extent) = &extent {
            children.push(extent.element().clone());
        }
        if !medium.is_empty() {
            children.push(ddms_text_element(version, "medium", medium));
        }
        add_wrapped(&mut element, version, MEDIA, children);
        Self {
            mime_type: mime_type.to_string(),
            extent,
            medium: medium.to_string(),
            base: Base::new(element, version),
        }
        .validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        let media = content_element(self.element(), self.version(), MEDIA).unwrap_or(self.element());
        let namespace = media.namespace().unwrap_or("");
        if self.medium.is_empty() && media.children_named(namespace, "medium").count() == 1 {
            self.base.warn("A ddms:medium element was found with no value.");
        }
        if let Some(extent) = self.extent.clone() {
            self.base.absorb(&*extent);
        }
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let version = self.version();
        require_ddms_element(self.element(), version, "format")?;
        let media = content_element(self.element(), version, MEDIA)
            .ok_or_else(|| Error::invalid("Media element is required."))?;
        require_value("mimeType", &self.mime_type)?;
        require_child_count(media, "mimeType", 1, 1)?;
        require_child_count(media, "extent", 0, 1)?;
        require_child_count(media, "medium", 0, 1)?;
        if let Some(extent) = &self.extent {
            require_compatible(version, &**extent)?;
        }
        Ok(())
    }

    /// The MIME type
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// The extent, if any
    pub fn extent(&self) -> Option<&Arc<Extent>> {
        self.extent.as_ref()
    }

    /// The medium
    pub fn medium(&self) -> &str {
        &self.medium
    }
}

impl Component for Format {
    fn base(&self) -> &Base {
        &self.base
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let prefix = format!("{}.", output::build_prefix(prefix, self.name(), suffix));
        let mut text = output::line(html, &format!("{}mimeType", prefix), &self.mime_type);
        text.push_str(&output::optional(html, &prefix, self.extent.as_ref()));
        text.push_str(&output::line(html, &format!("{}medium", prefix), &self.medium));
        text
    }
}

/// Staging form of [`Format`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormatBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// MIME type
    pub mime_type: String,
    /// Extent
    pub extent: ExtentBuilder,
    /// Medium
    pub medium: String,
}

impl Builder for FormatBuilder {
    type Target = Format;

    fn is_empty(&self) -> bool {
        self.mime_type.trim().is_empty() && self.medium.trim().is_empty() && self.extent.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<Format> {
        let extent = self.extent.commit_as(version)?.map(Arc::new);
        Format::new(version, &self.mime_type, extent, &self.medium)
    }
}

impl From<&Format> for FormatBuilder {
    fn from(format: &Format) -> Self {
        Self {
            version: Some(format.version()),
            mime_type: format.mime_type.clone(),
            extent: format.extent.as_deref().map(ExtentBuilder::from).unwrap_or_default(),
            medium: format.medium.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::parse_element;
    use pretty_assertions::assert_eq;

    fn extent(version: Version) -> Arc<Extent> {
        Arc::new(Extent::new(version, "sizeBytes", "75000").unwrap())
    }

    #[test]
    fn test_output() {
        let format = Format::new(Version::V5_0, "text/xml", Some(extent(Version::V5_0)), "digital").unwrap();
        assert_eq!(
            format.to_text(),
            "format.mimeType: text/xml\nformat.extent.qualifier: sizeBytes\nformat.extent.value: 75000\nformat.medium: digital\n"
        );
    }

    #[test]
    fn test_media_wrapper_before_4_0_1() {
        let format = Format::new(Version::V3_1, "text/xml", None, "").unwrap();
        assert!(format.to_xml().contains("<ddms:Media>"));
        let parsed = Format::from_element(parse_element(&format.to_xml()).unwrap(), Version::V3_1).unwrap();
        assert_eq!(parsed.mime_type(), "text/xml");
        let modern = Format::new(Version::V4_1, "text/xml", None, "").unwrap();
        assert!(!modern.to_xml().contains("Media"));
    }

    #[test]
    fn test_mime_type_required() {
        let err = Format::new(Version::V5_0, "", None, "digital").unwrap_err();
        assert_eq!(err.message(), Some("mimeType is required."));
        assert_eq!(err.locator(), Some("/ddms:format"));
    }

    #[test]
    fn test_extent_version_must_match() {
        let err = Format::new(Version::V5_0, "text/xml", Some(extent(Version::V3_0)), "").unwrap_err();
        assert!(err.message().unwrap().contains("different version of DDMS"));
    }

    #[test]
    fn test_extent_warnings_are_absorbed() {
        let empty = Arc::new(Extent::new(Version::V5_0, "", "").unwrap());
        let format = Format::new(Version::V5_0, "text/xml", Some(empty), "").unwrap();
        assert_eq!(format.warnings()[0].text, "A completely empty ddms:extent element was found.");
        assert_eq!(format.warnings()[0].locator, "/ddms:format/ddms:extent");
    }

    #[test]
    fn test_extent_requires_qualifier_with_value() {
        let err = Extent::new(Version::V5_0, "", "75000").unwrap_err();
        assert_eq!(err.message(), Some("qualifier attribute is required."));
    }
}
