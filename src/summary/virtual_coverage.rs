//! Virtual coverage: a network address the resource is associated with

use crate::attributes::{SecurityAttributes, SecurityAttributesBuilder};
use crate::components::helpers::{ddms_element, own_attribute, require_ddms_element, require_value, set_ddms_attribute};
use crate::components::{output, Base, Builder, Component};
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::versions::Version;

/// `ddms:virtualCoverage`
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualCoverage {
    base: Base,
    address: String,
    protocol: String,
    security_attributes: SecurityAttributes,
}

impl VirtualCoverage {
    /// Parse a `ddms:virtualCoverage` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let security_attributes =
            SecurityAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        Self {
            address: own_attribute(&element, "address").to_string(),
            protocol: own_attribute(&element, "protocol").to_string(),
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from an address, its protocol and security attributes
    pub fn new(version: Version, address: &str, protocol: &str, security_attributes: SecurityAttributes) -> Result<Self> {
        let mut element = ddms_element(version, "virtualCoverage");
        let qname = element.qualified_name();
        set_ddms_attribute(&mut element, version, "address", address);
        set_ddms_attribute(&mut element, version, "protocol", protocol);
        security_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&qname))?;
        Self {
            address: address.to_string(),
            protocol: protocol.to_string(),
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        if self.address.is_empty() && self.protocol.is_empty() {
            self.base.warn("A completely empty ddms:virtualCoverage element was found.");
        }
        let attribute_warnings = self.security_attributes.warnings().to_vec();
        self.base.absorb_attributes(&attribute_warnings);
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        require_ddms_element(self.element(), self.version(), "virtualCoverage")?;
        if !self.address.is_empty() {
            require_value("protocol", &self.protocol)?;
        }
        if !self.security_attributes.is_empty() && !self.version().is_at_least(Version::V3_0) {
            return Err(Error::invalid(
                "Security attributes cannot be applied to this component until DDMS 3.0 or later.",
            ));
        }
        Ok(())
    }

    /// The network address
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The address protocol, e.g. `IP`
    pub fn protocol(&self) -> &str {
        &self.protocol
    }
}

impl Component for VirtualCoverage {
    fn base(&self) -> &Base {
        &self.base
    }

    fn security_attributes(&self) -> Option<&SecurityAttributes> {
        Some(&self.security_attributes)
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let prefix = format!("{}.", output::build_prefix(prefix, self.name(), suffix));
        let mut text = output::line(html, &format!("{}address", prefix), &self.address);
        text.push_str(&output::line(html, &format!("{}protocol", prefix), &self.protocol));
        text.push_str(&self.security_attributes.output(html, &prefix));
        text
    }
}

/// Staging form of [`VirtualCoverage`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VirtualCoverageBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Network address
    pub address: String,
    /// Protocol
    pub protocol: String,
    /// Security attributes
    pub security_attributes: SecurityAttributesBuilder,
}

impl Builder for VirtualCoverageBuilder {
    type Target = VirtualCoverage;

    fn is_empty(&self) -> bool {
        self.address.trim().is_empty() && self.protocol.trim().is_empty() && self.security_attributes.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<VirtualCoverage> {
        VirtualCoverage::new(
            version,
            &self.address,
            &self.protocol,
            self.security_attributes.commit_as(version)?,
        )
    }
}

impl From<&VirtualCoverage> for VirtualCoverageBuilder {
    fn from(coverage: &VirtualCoverage) -> Self {
        Self {
            version: Some(coverage.version()),
            address: coverage.address.clone(),
            protocol: coverage.protocol.clone(),
            security_attributes: SecurityAttributesBuilder::from(&coverage.security_attributes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output() {
        let v = Version::V5_0;
        let coverage = VirtualCoverage::new(v, "123.456.789.0123", "IP", SecurityAttributes::empty(v)).unwrap();
        assert_eq!(
            coverage.to_text(),
            "virtualCoverage.address: 123.456.789.0123\nvirtualCoverage.protocol: IP\n"
        );
        assert_eq!(
            coverage.to_xml(),
            r#"<ddms:virtualCoverage xmlns:ddms="urn:us:mil:ces:metadata:ddms:5" ddms:address="123.456.789.0123" ddms:protocol="IP" />"#
        );
    }

    #[test]
    fn test_address_requires_protocol() {
        let v = Version::V5_0;
        let err = VirtualCoverage::new(v, "123.456.789.0123", "", SecurityAttributes::empty(v)).unwrap_err();
        assert_eq!(err.message(), Some("protocol is required."));
        assert_eq!(err.locator(), Some("/ddms:virtualCoverage"));
    }

    #[test]
    fn test_empty_warns() {
        let v = Version::V3_0;
        let coverage = VirtualCoverage::new(v, "", "", SecurityAttributes::empty(v)).unwrap();
        assert_eq!(coverage.warnings()[0].text, "A completely empty ddms:virtualCoverage element was found.");
        assert!(VirtualCoverageBuilder::default().commit().unwrap().is_none());
    }

    #[test]
    fn test_security_gated_at_3_0() {
        let v = Version::V2_0;
        let err = VirtualCoverage::new(v, "", "", SecurityAttributes::classified(v, "U", &["USA"]).unwrap())
            .unwrap_err();
        assert_eq!(
            err.message(),
            Some("Security attributes cannot be applied to this component until DDMS 3.0 or later.")
        );
    }
}
