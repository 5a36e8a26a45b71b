//! Geographic identifiers and the qualified codes they carry

use crate::components::helpers::{
    ddms_element, ddms_text_element, own_attribute, require_child_count, require_compatible,
    require_ddms_element, require_value, require_version, set_ddms_attribute,
};
use crate::components::{output, Base, Builder, Component};
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::versions::Version;
use std::sync::Arc;

/// Generates a component made of a required `qualifier` and `value` pair
macro_rules! qualified_code {
    ($(#[$meta:meta])* $name:ident, $builder:ident, $local:literal, $minimum:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            base: Base,
            qualifier: String,
            value: String,
        }

        impl $name {
            #[doc = concat!("Parse a `ddms:", $local, "` element")]
            pub fn from_element(element: Element, version: Version) -> Result<Self> {
                Self {
                    qualifier: own_attribute(&element, "qualifier").to_string(),
                    value: own_attribute(&element, "value").to_string(),
                    base: Base::new(element, version),
                }
                .validated()
            }

            /// Build from a qualifier and a value
            pub fn new(version: Version, qualifier: &str, value: &str) -> Result<Self> {
                let mut element = ddms_element(version, $local);
                set_ddms_attribute(&mut element, version, "qualifier", qualifier);
                set_ddms_attribute(&mut element, version, "value", value);
                Self::from_element(element, version)
            }

            fn validated(self) -> Result<Self> {
                self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
                Ok(self)
            }

            fn validate(&self) -> Result<()> {
                require_ddms_element(self.element(), self.version(), $local)?;
                require_value("qualifier attribute", &self.qualifier)?;
                require_value("value attribute", &self.value)?;
                require_version(self.version(), $minimum, concat!("ddms:", $local, " element"))
            }

            /// The code scheme
            pub fn qualifier(&self) -> &str {
                &self.qualifier
            }

            /// The code
            pub fn value(&self) -> &str {
                &self.value
            }
        }

        impl Component for $name {
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

        #[doc = concat!("Staging form of [`", stringify!($name), "`]")]
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $builder {
            /// Version to build against
            pub version: Option<Version>,
            /// Code scheme
            pub qualifier: String,
            /// Code
            pub value: String,
        }

        impl Builder for $builder {
            type Target = $name;

            fn is_empty(&self) -> bool {
                self.qualifier.trim().is_empty() && self.value.trim().is_empty()
            }

            fn version(&self) -> Option<Version> {
                self.version
            }

            fn build(&self, version: Version) -> Result<$name> {
                $name::new(version, &self.qualifier, &self.value)
            }
        }

        impl From<&$name> for $builder {
            fn from(code: &$name) -> Self {
                Self {
                    version: Some(code.version()),
                    qualifier: code.qualifier.clone(),
                    value: code.value.clone(),
                }
            }
        }
    };
}

qualified_code!(
    /// A country code drawn from a named scheme such as ISO-3166
    CountryCode,
    CountryCodeBuilder,
    "countryCode",
    Version::V2_0
);

qualified_code!(
    /// A country subdivision code. DDMS 4.0.1 or later.
    SubDivisionCode,
    SubDivisionCodeBuilder,
    "subDivisionCode",
    Version::V4_0_1
);

/// A facility identified by its basic encyclopedia number
#[derive(Debug, Clone, PartialEq)]
pub struct FacilityIdentifier {
    base: Base,
    be_number: String,
    osuffix: String,
}

impl FacilityIdentifier {
    /// Parse a `ddms:facilityIdentifier` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        Self {
            be_number: own_attribute(&element, "beNumber").to_string(),
            osuffix: own_attribute(&element, "osuffix").to_string(),
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from a BE number and an O-suffix
    pub fn new(version: Version, be_number: &str, osuffix: &str) -> Result<Self> {
        let mut element = ddms_element(version, "facilityIdentifier");
        set_ddms_attribute(&mut element, version, "beNumber", be_number);
        set_ddms_attribute(&mut element, version, "osuffix", osuffix);
        Self::from_element(element, version)
    }

    fn validated(self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        require_ddms_element(self.element(), self.version(), "facilityIdentifier")?;
        require_value("beNumber attribute", &self.be_number)?;
        require_value("osuffix attribute", &self.osuffix)
    }

    /// Basic encyclopedia number
    pub fn be_number(&self) -> &str {
        &self.be_number
    }

    /// O-suffix
    pub fn osuffix(&self) -> &str {
        &self.osuffix
    }
}

impl Component for FacilityIdentifier {
    fn base(&self) -> &Base {
        &self.base
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let prefix = format!("{}.", output::build_prefix(prefix, self.name(), suffix));
        let mut text = output::line(html, &format!("{}beNumber", prefix), &self.be_number);
        text.push_str(&output::line(html, &format!("{}osuffix", prefix), &self.osuffix));
        text
    }
}

/// Staging form of [`FacilityIdentifier`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacilityIdentifierBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// BE number
    pub be_number: String,
    /// O-suffix
    pub osuffix: String,
}

impl Builder for FacilityIdentifierBuilder {
    type Target = FacilityIdentifier;

    fn is_empty(&self) -> bool {
        self.be_number.trim().is_empty() && self.osuffix.trim().is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<FacilityIdentifier> {
        FacilityIdentifier::new(version, &self.be_number, &self.osuffix)
    }
}

impl From<&FacilityIdentifier> for FacilityIdentifierBuilder {
    fn from(facility: &FacilityIdentifier) -> Self {
        Self {
            version: Some(facility.version()),
            be_number: facility.be_number.clone(),
            osuffix: facility.osuffix.clone(),
        }
    }
}

fn parse_optional<T>(
    element: &Element,
    local_name: &str,
    parse: impl Fn(Element) -> Result<T>,
) -> Result<Option<Arc<T>>> {
    let namespace = element.namespace().unwrap_or("");
    element
        .first_child(namespace, local_name)
        .map(|child| parse(child.clone()).map(Arc::new))
        .transpose()
}

/// Place names, regions and codes locating the resource
#[derive(Debug, Clone, PartialEq)]
pub struct GeographicIdentifier {
    base: Base,
    names: Vec<String>,
    regions: Vec<String>,
    country_code: Option<Arc<CountryCode>>,
    sub_division_code: Option<Arc<SubDivisionCode>>,
    facility_identifier: Option<Arc<FacilityIdentifier>>,
}

impl GeographicIdentifier {
    /// Parse a `ddms:geographicIdentifier` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let namespace = element.namespace().unwrap_or("").to_string();
        let country_code = parse_optional(&element, "countryCode", |e| CountryCode::from_element(e, version))
            .map_err(|e| e.locate(&qname))?;
        let sub_division_code =
            parse_optional(&element, "subDivisionCode", |e| SubDivisionCode::from_element(e, version))
                .map_err(|e| e.locate(&qname))?;
        let facility_identifier =
            parse_optional(&element, "facilityIdentifier", |e| FacilityIdentifier::from_element(e, version))
                .map_err(|e| e.locate(&qname))?;
        Self {
            names: element.child_values(&namespace, "name"),
            regions: element.child_values(&namespace, "region"),
            country_code,
            sub_division_code,
            facility_identifier,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from names, regions and codes
    pub fn new(
        version: Version,
        names: Vec<String>,
        regions: Vec<String>,
        country_code: Option<Arc<CountryCode>>,
        sub_division_code: Option<Arc<SubDivisionCode>>,
        facility_identifier: Option<Arc<FacilityIdentifier>>,
    ) -> Result<Self> {
        let mut element = ddms_element(version, "geographicIdentifier");
        for name in &names {
            element.add_child(ddms_text_element(version, "name", name));
        }
        for region in &regions {
            element.add_child(ddms_text_element(version, "region", region));
        }
        if let Some(code) = &country_code {
            element.add_child(code.element().clone());
        }
        if let Some(code) = &sub_division_code {
            element.add_child(code.element().clone());
        }
        if let Some(facility) = &facility_identifier {
            element.add_child(facility.element().clone());
        }
        Self {
            names,
            regions,
            country_code,
            sub_division_code,
            facility_identifier,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// A geographic identifier holding only a facility
    pub fn for_facility(version: Version, facility_identifier: Arc<FacilityIdentifier>) -> Result<Self> {
        Self::new(version, Vec::new(), Vec::new(), None, None, Some(facility_identifier))
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        for child in self.children() {
            self.base.absorb(&*child);
        }
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let version = self.version();
        let element = self.element();
        require_ddms_element(element, version, "geographicIdentifier")?;
        if self.names.is_empty()
            && self.regions.is_empty()
            && self.country_code.is_none()
            && self.sub_division_code.is_none()
            && self.facility_identifier.is_none()
        {
            return Err(Error::invalid(
                "At least 1 of name, region, countryCode, subDivisionCode, or facilityIdentifier must exist.",
            ));
        }
        require_child_count(element, "countryCode", 0, 1)?;
        require_child_count(element, "subDivisionCode", 0, 1)?;
        require_child_count(element, "facilityIdentifier", 0, 1)?;
        if self.has_facility_identifier()
            && (!self.names.is_empty()
                || !self.regions.is_empty()
                || self.country_code.is_some()
                || self.sub_division_code.is_some())
        {
            return Err(Error::invalid(
                "facilityIdentifier cannot be used in tandem with other components.",
            ));
        }
        for child in self.children() {
            require_compatible(version, &*child)?;
        }
        Ok(())
    }

    fn children(&self) -> Vec<Arc<dyn Component>> {
        let mut children: Vec<Arc<dyn Component>> = Vec::new();
        if let Some(code) = &self.country_code {
            children.push(code.clone());
        }
        if let Some(code) = &self.sub_division_code {
            children.push(code.clone());
        }
        if let Some(facility) = &self.facility_identifier {
            children.push(facility.clone());
        }
        children
    }

    /// Place names
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Region names
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    /// The country code
    pub fn country_code(&self) -> Option<&Arc<CountryCode>> {
        self.country_code.as_ref()
    }

    /// The subdivision code
    pub fn sub_division_code(&self) -> Option<&Arc<SubDivisionCode>> {
        self.sub_division_code.as_ref()
    }

    /// The facility identifier
    pub fn facility_identifier(&self) -> Option<&Arc<FacilityIdentifier>> {
        self.facility_identifier.as_ref()
    }

    /// True when this identifier names a facility
    pub fn has_facility_identifier(&self) -> bool {
        self.facility_identifier.is_some()
    }
}

impl Component for GeographicIdentifier {
    fn base(&self) -> &Base {
        &self.base
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let prefix = format!("{}.", output::build_prefix(prefix, self.name(), suffix));
        let mut text = output::lines(html, &format!("{}name", prefix), &self.names);
        text.push_str(&output::lines(html, &format!("{}region", prefix), &self.regions));
        text.push_str(&output::optional(html, &prefix, self.country_code.as_ref()));
        text.push_str(&output::optional(html, &prefix, self.sub_division_code.as_ref()));
        text.push_str(&output::optional(html, &prefix, self.facility_identifier.as_ref()));
        text
    }
}

/// Staging form of [`GeographicIdentifier`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeographicIdentifierBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Place names
    pub names: Vec<String>,
    /// Region names
    pub regions: Vec<String>,
    /// Country code
    pub country_code: CountryCodeBuilder,
    /// Subdivision code
    pub sub_division_code: SubDivisionCodeBuilder,
    /// Facility identifier
    pub facility_identifier: FacilityIdentifierBuilder,
}

impl Builder for GeographicIdentifierBuilder {
    type Target = GeographicIdentifier;

    fn is_empty(&self) -> bool {
        self.names.iter().all(|n| n.trim().is_empty())
            && self.regions.iter().all(|r| r.trim().is_empty())
            && self.country_code.is_empty()
            && self.sub_division_code.is_empty()
            && self.facility_identifier.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<GeographicIdentifier> {
        let non_empty = |values: &[String]| values.iter().filter(|v| !v.trim().is_empty()).cloned().collect();
        GeographicIdentifier::new(
            version,
            non_empty(&self.names),
            non_empty(&self.regions),
            self.country_code.commit_as(version)?.map(Arc::new),
            self.sub_division_code.commit_as(version)?.map(Arc::new),
            self.facility_identifier.commit_as(version)?.map(Arc::new),
        )
    }
}

impl From<&GeographicIdentifier> for GeographicIdentifierBuilder {
    fn from(identifier: &GeographicIdentifier) -> Self {
        Self {
            version: Some(identifier.version()),
            names: identifier.names.clone(),
            regions: identifier.regions.clone(),
            country_code: identifier.country_code.as_deref().map(CountryCodeBuilder::from).unwrap_or_default(),
            sub_division_code: identifier
                .sub_division_code
                .as_deref()
                .map(SubDivisionCodeBuilder::from)
                .unwrap_or_default(),
            facility_identifier: identifier
                .facility_identifier
                .as_deref()
                .map(FacilityIdentifierBuilder::from)
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::parse_element;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_country_code_output() {
        let code = CountryCode::new(Version::V5_0, "ISO-3166", "USA").unwrap();
        assert_eq!(code.to_text(), "countryCode.qualifier: ISO-3166\ncountryCode.value: USA\n");
        assert_eq!(
            code.to_xml(),
            r#"<ddms:countryCode xmlns:ddms="urn:us:mil:ces:metadata:ddms:5" ddms:qualifier="ISO-3166" ddms:value="USA" />"#
        );
    }

    #[test]
    fn test_country_code_requires_value() {
        let err = CountryCode::new(Version::V3_1, "ISO-3166", "").unwrap_err();
        assert_eq!(err.message(), Some("value attribute is required."));
        assert_eq!(err.locator(), Some("/ddms:countryCode"));
    }

    #[test]
    fn test_sub_division_code_gated() {
        let err = SubDivisionCode::new(Version::V3_1, "ISO-3166", "USA-CA").unwrap_err();
        assert_eq!(
            err.message(),
            Some("The ddms:subDivisionCode element cannot be used until DDMS 4.0.1 or later.")
        );
    }

    #[test]
    fn test_facility_cannot_mix() {
        let v = Version::V5_0;
        let facility = Arc::new(FacilityIdentifier::new(v, "1234DD56789", "DD123").unwrap());
        let err = GeographicIdentifier::new(v, vec!["Thule".to_string()], vec![], None, None, Some(facility.clone()))
            .unwrap_err();
        assert_eq!(err.message(), Some("facilityIdentifier cannot be used in tandem with other components."));
        let alone = GeographicIdentifier::for_facility(v, facility).unwrap();
        assert_eq!(
            alone.to_text(),
            "geographicIdentifier.facilityIdentifier.beNumber: 1234DD56789\n\
geographicIdentifier.facilityIdentifier.osuffix: DD123\n"
        );
    }

    #[test]
    fn test_requires_content() {
        let err = GeographicIdentifier::new(Version::V5_0, vec![], vec![], None, None, None).unwrap_err();
        assert_eq!(
            err.message(),
            Some("At least 1 of name, region, countryCode, subDivisionCode, or facilityIdentifier must exist.")
        );
    }

    #[test]
    fn test_nested_error_located() {
        let xml = r#"<ddms:geographicIdentifier xmlns:ddms="urn:us:mil:ces:metadata:ddms:5"><ddms:countryCode ddms:qualifier="ISO-3166" /></ddms:geographicIdentifier>"#;
        let err = GeographicIdentifier::from_element(parse_element(xml).unwrap(), Version::V5_0).unwrap_err();
        assert_eq!(err.locator(), Some("/ddms:geographicIdentifier/ddms:countryCode"));
    }

    #[test]
    fn test_builder_round_trip() {
        let v = Version::V4_1;
        let identifier = GeographicIdentifier::new(
            v,
            vec!["The White House".to_string()],
            vec!["Mid-Atlantic".to_string()],
            Some(Arc::new(CountryCode::new(v, "ISO-3166", "USA").unwrap())),
            None,
            None,
        )
        .unwrap();
        let builder = GeographicIdentifierBuilder::from(&identifier);
        assert_eq!(builder.commit().unwrap().unwrap(), identifier);
        assert_eq!(
            identifier.to_text(),
            "geographicIdentifier.name: The White House\ngeographicIdentifier.region: Mid-Atlantic\n\
geographicIdentifier.countryCode.qualifier: ISO-3166\ngeographicIdentifier.countryCode.value: USA\n"
        );
    }
}
