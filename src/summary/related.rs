//! Related resources and the links that locate them

use crate::attributes::{SecurityAttributes, SecurityAttributesBuilder, XLinkAttributes};
use crate::components::helpers::{
    ddms_element, legacy_wrapper, own_attribute, require_compatible, require_ddms_element, require_value,
    set_ddms_attribute,
};
use crate::components::{output, Base, Builder, BuilderList, Component};
use crate::datatypes::validate_uri;
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::versions::Version;
use std::sync::Arc;

const FIXED_TYPE: &str = "locator";
const OLD_INNER_NAME: &str = "RelatedResource";

/// Legal relationship directions
pub const DIRECTIONS: [&str; 3] = ["inbound", "outbound", "bidirectional"];

/// The outer element name of a related resource for a version
pub fn related_resource_name(version: Version) -> &'static str {
    if version.is_at_least(Version::V4_0_1) {
        "relatedResource"
    } else {
        "relatedResources"
    }
}

/// Require a known relationship direction
pub fn validate_direction(direction: &str) -> Result<()> {
    require_value("relationship direction", direction)?;
    if !DIRECTIONS.contains(&direction) {
        return Err(Error::invalid(format!(
            "The direction attribute must be one of {}",
            DIRECTIONS.join(", ")
        )));
    }
    Ok(())
}

/// `ddms:link`, an XLink locator
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    base: Base,
    xlink_attributes: XLinkAttributes,
    security_attributes: SecurityAttributes,
}

impl Link {
    /// Parse a `ddms:link` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let xlink_attributes = XLinkAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        let security_attributes =
            SecurityAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        Self {
            xlink_attributes,
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from locator attributes and optional security attributes
    pub fn new(
        version: Version,
        xlink_attributes: XLinkAttributes,
        security_attributes: SecurityAttributes,
    ) -> Result<Self> {
        let mut element = ddms_element(version, "link");
        let qname = element.qualified_name();
        xlink_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&qname))?;
        security_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&qname))?;
        Self {
            xlink_attributes,
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        let attribute_warnings = self.security_attributes.warnings().to_vec();
        self.base.absorb_attributes(&attribute_warnings);
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        require_ddms_element(self.element(), self.version(), "link")?;
        require_value("type attribute", self.xlink_attributes.link_type())?;
        require_value("href attribute", self.xlink_attributes.href())?;
        if self.xlink_attributes.link_type() != FIXED_TYPE {
            return Err(Error::invalid(format!(
                "The type attribute must have a fixed value of \"{}\".",
                FIXED_TYPE
            )));
        }
        Ok(())
    }

    /// The XLink attributes
    pub fn xlink_attributes(&self) -> &XLinkAttributes {
        &self.xlink_attributes
    }
}

impl Component for Link {
    fn base(&self) -> &Base {
        &self.base
    }

    fn security_attributes(&self) -> Option<&SecurityAttributes> {
        Some(&self.security_attributes)
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let prefix = format!("{}.", output::build_prefix(prefix, self.name(), suffix));
        let mut text = self.xlink_attributes.output(html, &prefix);
        text.push_str(&self.security_attributes.output(html, &prefix));
        text
    }
}

/// Staging form of [`Link`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Target URI
    pub href: String,
    /// Role URI
    pub role: String,
    /// Title
    pub title: String,
    /// Label
    pub label: String,
    /// Security attributes
    pub security_attributes: SecurityAttributesBuilder,
}

impl Builder for LinkBuilder {
    type Target = Link;

    fn is_empty(&self) -> bool {
        [&self.href, &self.role, &self.title, &self.label]
            .iter()
            .all(|v| v.trim().is_empty())
            && self.security_attributes.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<Link> {
        let xlink = XLinkAttributes::locator(version, &self.href, &self.role, &self.title, &self.label)?;
        Link::new(version, xlink, self.security_attributes.commit_as(version)?)
    }
}

impl From<&Link> for LinkBuilder {
    fn from(link: &Link) -> Self {
        let xlink = &link.xlink_attributes;
        Self {
            version: Some(link.version()),
            href: xlink.href().to_string(),
            role: xlink.role().to_string(),
            title: xlink.title().to_string(),
            label: xlink.label().to_string(),
            security_attributes: SecurityAttributesBuilder::from(&link.security_attributes),
        }
    }
}

/// A resource related to this one, reached through one or more links
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedResource {
    base: Base,
    relationship: String,
    direction: String,
    qualifier: String,
    value: String,
    links: Vec<Arc<Link>>,
    security_attributes: SecurityAttributes,
}

impl RelatedResource {
    /// Parse a `ddms:relatedResource`, or a `ddms:relatedResources` before 4.0.1
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let (qualifier, value, links) = match Self::inner(&element, version) {
            Some(inner) => {
                let namespace = inner.namespace().unwrap_or("");
                let links = inner
                    .children_named(namespace, "link")
                    .map(|child| {
                        Link::from_element(child.clone(), version).map(Arc::new).map_err(|e| {
                            if inner.local_name() == OLD_INNER_NAME {
                                e.locate(&inner.qualified_name())
                            } else {
                                e
                            }
                        })
                    })
                    .collect::<Result<Vec<_>>>()
                    .map_err(|e| e.locate(&qname))?;
                (
                    own_attribute(inner, "qualifier").to_string(),
                    own_attribute(inner, "value").to_string(),
                    links,
                )
            }
            None => (String::new(), String::new(), Vec::new()),
        };
        let security_attributes =
            SecurityAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        Self {
            relationship: own_attribute(&element, "relationship").to_string(),
            direction: own_attribute(&element, "direction").to_string(),
            qualifier,
            value,
            links,
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from links, the relationship and the related resource's identifier
    pub fn new(
        version: Version,
        links: Vec<Arc<Link>>,
        relationship: &str,
        direction: &str,
        qualifier: &str,
        value: &str,
        security_attributes: SecurityAttributes,
    ) -> Result<Self> {
        let modern = version.is_at_least(Version::V4_0_1);
        let outer = || {
            let mut outer = ddms_element(version, related_resource_name(version));
            set_ddms_attribute(&mut outer, version, "relationship", relationship);
            set_ddms_attribute(&mut outer, version, "direction", direction);
            outer
        };
        let mut inner = if modern { outer() } else { ddms_element(version, OLD_INNER_NAME) };
        set_ddms_attribute(&mut inner, version, "qualifier", qualifier);
        set_ddms_attribute(&mut inner, version, "value", value);
        for link in &links {
            inner.add_child(link.element().clone());
        }
        let mut element = if modern {
            inner
        } else {
            let mut element = outer();
            element.add_child(inner);
            element
        };
        let qname = element.qualified_name();
        security_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&qname))?;
        Self {
            relationship: relationship.to_string(),
            direction: direction.to_string(),
            qualifier: qualifier.to_string(),
            value: value.to_string(),
            links,
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    fn inner(element: &Element, version: Version) -> Option<&Element> {
        if version.is_at_least(Version::V4_0_1) {
            Some(element)
        } else {
            legacy_wrapper(element, version, OLD_INNER_NAME)
        }
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        if !self.version().is_at_least(Version::V4_0_1) {
            let namespace = self.namespace().to_string();
            if self.element().children_named(&namespace, OLD_INNER_NAME).count() > 1 {
                self.base.warn(
                    "A ddms:RelatedResources element contains more than 1 ddms:relatedResource. \
To ensure consistency between versions of DDMS, each ddms:RelatedResources element should contain only 1 \
ddms:RelatedResource. Only the first child is processed.",
                );
            }
        }
        for link in self.links.clone() {
            self.base.absorb(&*link);
        }
        let attribute_warnings = self.security_attributes.warnings().to_vec();
        self.base.absorb_attributes(&attribute_warnings);
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let version = self.version();
        require_ddms_element(self.element(), version, related_resource_name(version))?;
        require_value("relationship attribute", &self.relationship)?;
        validate_uri(&self.relationship)?;
        if !self.direction.is_empty() {
            validate_direction(&self.direction)?;
        }
        require_value("qualifier attribute", &self.qualifier)?;
        require_value("value attribute", &self.value)?;
        validate_uri(&self.qualifier)?;
        if self.links.is_empty() {
            return Err(Error::invalid("At least 1 link must exist."));
        }
        for link in &self.links {
            require_compatible(version, &**link)?;
            if !link.security_attributes.is_empty() {
                return Err(Error::invalid(
                    "Security attributes cannot be applied to links in a related resource.",
                ));
            }
        }
        Ok(())
    }

    /// URI naming the relationship
    pub fn relationship(&self) -> &str {
        &self.relationship
    }

    /// `inbound`, `outbound` or `bidirectional`, when set
    pub fn direction(&self) -> &str {
        &self.direction
    }

    /// Identifier scheme of the related resource
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    /// Identifier of the related resource
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Links to the related resource
    pub fn links(&self) -> &[Arc<Link>] {
        &self.links
    }
}

impl Component for RelatedResource {
    fn base(&self) -> &Base {
        &self.base
    }

    fn security_attributes(&self) -> Option<&SecurityAttributes> {
        Some(&self.security_attributes)
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let mut prefix = format!("{}.", output::build_prefix(prefix, self.name(), suffix));
        if !self.version().is_at_least(Version::V4_0_1) {
            prefix.push_str(OLD_INNER_NAME);
            prefix.push('.');
        }
        let mut text = output::line(html, &format!("{}relationship", prefix), &self.relationship);
        text.push_str(&output::line(html, &format!("{}direction", prefix), &self.direction));
        text.push_str(&output::line(html, &format!("{}qualifier", prefix), &self.qualifier));
        text.push_str(&output::line(html, &format!("{}value", prefix), &self.value));
        text.push_str(&output::components(html, &prefix, &self.links));
        text.push_str(&self.security_attributes.output(html, &prefix));
        text
    }
}

/// Staging form of [`RelatedResource`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelatedResourceBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Relationship URI
    pub relationship: String,
    /// Direction
    pub direction: String,
    /// Identifier scheme
    pub qualifier: String,
    /// Identifier
    pub value: String,
    /// Links
    pub links: BuilderList<LinkBuilder>,
    /// Security attributes
    pub security_attributes: SecurityAttributesBuilder,
}

impl Builder for RelatedResourceBuilder {
    type Target = RelatedResource;

    fn is_empty(&self) -> bool {
        [&self.relationship, &self.direction, &self.qualifier, &self.value]
            .iter()
            .all(|v| v.trim().is_empty())
            && self.links.is_empty()
            && self.security_attributes.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<RelatedResource> {
        RelatedResource::new(
            version,
            self.links.commit_all(version)?,
            &self.relationship,
            &self.direction,
            &self.qualifier,
            &self.value,
            self.security_attributes.commit_as(version)?,
        )
    }
}

impl From<&RelatedResource> for RelatedResourceBuilder {
    fn from(resource: &RelatedResource) -> Self {
        Self {
            version: Some(resource.version()),
            relationship: resource.relationship.clone(),
            direction: resource.direction.clone(),
            qualifier: resource.qualifier.clone(),
            value: resource.value.clone(),
            links: resource
                .links
                .iter()
                .map(|l| LinkBuilder::from(&**l))
                .collect::<Vec<_>>()
                .into(),
            security_attributes: SecurityAttributesBuilder::from(&resource.security_attributes),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::documents::parse_element;
    use pretty_assertions::assert_eq;

    pub(crate) fn link(version: Version) -> Arc<Link> {
        let xlink = XLinkAttributes::locator(version, "http://en.wikipedia.org/wiki/Tank", "tank", "Tank Page", "tank")
            .unwrap();
        Arc::new(Link::new(version, xlink, SecurityAttributes::empty(version)).unwrap())
    }

    pub(crate) fn related(version: Version) -> RelatedResource {
        RelatedResource::new(
            version,
            vec![link(version)],
            "http://purl.org/dc/terms/references",
            "outbound",
            "http://purl.org/dc/terms/URI",
            "http://en.wikipedia.org/wiki/Tank",
            SecurityAttributes::classified(version, "U", &["USA"]).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_link_output() {
        let link = link(Version::V5_0);
        assert_eq!(
            link.to_text(),
            "link.type: locator\nlink.href: http://en.wikipedia.org/wiki/Tank\nlink.role: tank\n\
link.title: Tank Page\nlink.label: tank\n"
        );
    }

    #[test]
    fn test_link_requires_locator_type() {
        let v = Version::V5_0;
        let xlink = XLinkAttributes::simple(v, "http://x", "", "", "", "", "").unwrap();
        let err = Link::new(v, xlink, SecurityAttributes::empty(v)).unwrap_err();
        assert_eq!(err.message(), Some("The type attribute must have a fixed value of \"locator\"."));
        assert_eq!(err.locator(), Some("/ddms:link"));
    }

    #[test]
    fn test_related_resource_round_trip() {
        for version in Version::ALL {
            let resource = related(version);
            let parsed = RelatedResource::from_element(parse_element(&resource.to_xml()).unwrap(), version).unwrap();
            assert_eq!(parsed, resource);
        }
    }

    #[test]
    fn test_legacy_wrapper_output() {
        let resource = related(Version::V3_0);
        assert!(resource.to_xml().contains("<ddms:RelatedResource "));
        assert!(resource
            .to_text()
            .starts_with("relatedResources.RelatedResource.relationship: http://purl.org/dc/terms/references\n"));
        let current = related(Version::V5_0);
        assert!(current.to_text().contains("relatedResource.link.href: http://en.wikipedia.org/wiki/Tank\n"));
    }

    #[test]
    fn test_direction_and_links() {
        let v = Version::V5_0;
        let err = RelatedResource::new(
            v,
            vec![link(v)],
            "http://purl.org/dc/terms/references",
            "sideways",
            "http://purl.org/dc/terms/URI",
            "x",
            SecurityAttributes::empty(v),
        )
        .unwrap_err();
        assert_eq!(
            err.message(),
            Some("The direction attribute must be one of inbound, outbound, bidirectional")
        );
        let err = RelatedResource::new(
            v,
            vec![],
            "http://purl.org/dc/terms/references",
            "",
            "http://purl.org/dc/terms/URI",
            "x",
            SecurityAttributes::empty(v),
        )
        .unwrap_err();
        assert_eq!(err.message(), Some("At least 1 link must exist."));
    }

    #[test]
    fn test_links_cannot_carry_security() {
        let v = Version::V5_0;
        let xlink = XLinkAttributes::locator(v, "http://x", "", "", "").unwrap();
        let marked = Arc::new(Link::new(v, xlink, SecurityAttributes::classified(v, "U", &["USA"]).unwrap()).unwrap());
        let err = RelatedResource::new(
            v,
            vec![marked],
            "http://purl.org/dc/terms/references",
            "",
            "http://purl.org/dc/terms/URI",
            "x",
            SecurityAttributes::empty(v),
        )
        .unwrap_err();
        assert_eq!(err.message(), Some("Security attributes cannot be applied to links in a related resource."));
    }

    #[test]
    fn test_builder() {
        let resource = related(Version::V4_1);
        let builder = RelatedResourceBuilder::from(&resource);
        assert_eq!(builder.commit().unwrap().unwrap(), resource);

        let mut builder = RelatedResourceBuilder::default();
        assert!(builder.is_empty());
        builder.links.ensure_len(2);
        assert!(builder.is_empty());
    }
}
