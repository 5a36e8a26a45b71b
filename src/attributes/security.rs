//! ISM security attributes
//!
//! The attribute group is table driven: each ISM attribute has a shape (free
//! text, token list, single token, date, boolean), an optional controlled
//! vocabulary and the range of DDMS versions that allow it.

use crate::components::builders::resolve_version;
use crate::components::helpers::{require_value, split_list};
use crate::components::output;
use crate::config;
use crate::datatypes::{is_xs_date, parse_boolean};
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::messages::ValidationMessage;
use crate::namespaces::QName;
use crate::versions::{SchemaKind, Version};
use crate::vocabulary::{self, validate_enumeration};
use indexmap::IndexMap;

/// How an ISM attribute value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Text,
    Token,
    TokenList,
    Date,
    Boolean,
}

struct Definition {
    name: &'static str,
    shape: Shape,
    vocabulary: Option<&'static str>,
    since: Version,
    until: Option<Version>,
}

const fn def(
    name: &'static str,
    shape: Shape,
    vocabulary: Option<&'static str>,
    since: Version,
    until: Option<Version>,
) -> Definition {
    Definition {
        name,
        shape,
        vocabulary,
        since,
        until,
    }
}

use Shape::*;
use Version::*;

const DEFINITIONS: [Definition; 24] = [
    def("atomicEnergyMarkings", TokenList, Some(vocabulary::ATOMIC_ENERGY_MARKINGS), V3_1, None),
    def("classification", Token, Some(vocabulary::CLASSIFICATION_ALL), V2_0, None),
    def("classificationReason", Text, None, V2_0, None),
    def("classifiedBy", Text, None, V2_0, None),
    def("compilationReason", Text, None, V3_0, None),
    def("compliesWith", TokenList, Some(vocabulary::COMPLIES_WITH), V3_1, None),
    def("dateOfExemptedSource", Date, None, V2_0, Some(V3_0)),
    def("declassDate", Date, None, V2_0, None),
    def("declassEvent", Text, None, V2_0, None),
    def("declassException", Token, Some(vocabulary::DECLASS_EXCEPTION), V2_0, None),
    def("declassManualReview", Boolean, None, V2_0, Some(V2_0)),
    def("derivativelyClassifiedBy", Text, None, V2_0, None),
    def("derivedFrom", Text, None, V2_0, None),
    def("displayOnlyTo", TokenList, Some(vocabulary::REL_TO), V3_1, None),
    def("disseminationControls", TokenList, Some(vocabulary::DISSEM), V2_0, None),
    def("FGIsourceOpen", TokenList, Some(vocabulary::FGI_OPEN), V2_0, None),
    def("FGIsourceProtected", TokenList, Some(vocabulary::FGI_PROTECTED), V2_0, None),
    def("nonICmarkings", TokenList, Some(vocabulary::NON_IC), V2_0, None),
    def("nonUSControls", TokenList, Some(vocabulary::NON_US_CONTROLS), V3_1, None),
    def("ownerProducer", TokenList, Some(vocabulary::OWNER_PRODUCER), V2_0, None),
    def("releasableTo", TokenList, Some(vocabulary::REL_TO), V2_0, None),
    def("SARIdentifier", TokenList, Some(vocabulary::SAR), V2_0, None),
    def("SCIcontrols", TokenList, Some(vocabulary::SCI_CONTROLS), V2_0, None),
    def("typeOfExemptedSource", Token, Some(vocabulary::SOURCE_MARKED), V2_0, Some(V3_0)),
];

/// Local names of every ISM security attribute, in output order
pub fn attribute_names() -> impl Iterator<Item = &'static str> {
    DEFINITIONS.iter().map(|d| d.name)
}

fn definition(name: &str) -> Option<&'static Definition> {
    DEFINITIONS.iter().find(|d| d.name == name)
}

/// The ISM security attributes decorating one element
#[derive(Debug, Clone, Default)]
pub struct SecurityAttributes {
    version: Version,
    values: IndexMap<String, String>,
    warnings: Vec<ValidationMessage>,
}

impl SecurityAttributes {
    /// Read the ISM attributes of an element
    pub fn from_element(element: &Element, version: Version) -> Result<Self> {
        let namespace = version.ism_namespace();
        let mut values = IndexMap::new();
        for def in DEFINITIONS.iter() {
            if let Some(value) = element.attribute(Some(namespace), def.name) {
                values.insert(def.name.to_string(), value.to_string());
            }
        }
        Self::validated(version, values)
    }

    /// Build from attribute values keyed by ISM local name.
    ///
    /// Names outside the ISM security attribute set are an illegal argument.
    pub fn new<K, V>(version: Version, values: impl IntoIterator<Item = (K, V)>) -> Result<Self>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut collected = IndexMap::new();
        for (name, value) in values {
            let name = name.into();
            if definition(&name).is_none() {
                return Err(Error::IllegalArgument(format!(
                    "{} is not a security attribute.",
                    name
                )));
            }
            let value = value.into();
            if !value.is_empty() {
                collected.insert(name, value);
            }
        }
        Self::validated(version, collected)
    }

    /// Shorthand for the common classification plus ownerProducer pair
    pub fn classified(version: Version, classification: &str, owner_producers: &[&str]) -> Result<Self> {
        Self::new(
            version,
            [
                ("classification", classification.to_string()),
                ("ownerProducer", owner_producers.join(" ")),
            ],
        )
    }

    /// An empty attribute group
    pub fn empty(version: Version) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    fn validated(version: Version, values: IndexMap<String, String>) -> Result<Self> {
        let mut attributes = Self {
            version,
            values,
            warnings: Vec::new(),
        };
        attributes.validate()?;
        Ok(attributes)
    }

    fn validate(&mut self) -> Result<()> {
        let version = self.version;
        for def in DEFINITIONS.iter() {
            let Some(value) = self.values.get(def.name) else {
                continue;
            };
            if !version.is_at_least(def.since) {
                return Err(Error::invalid(format!(
                    "The {} attribute cannot be used until DDMS {} or later.",
                    def.name, def.since
                )));
            }
            if let Some(until) = def.until {
                if version > until {
                    return Err(Error::invalid(if until == V2_0 {
                        format!("The {} attribute can only be used in DDMS 2.0.", def.name)
                    } else {
                        format!(
                            "The {} attribute cannot be used after DDMS {}.",
                            def.name, until
                        )
                    }));
                }
            }
            match def.shape {
                Date if !is_xs_date(value) => {
                    return Err(Error::invalid(format!(
                        "The {} must be in the xs:date format (YYYY-MM-DD).",
                        def.name
                    )));
                }
                Boolean if parse_boolean(value).is_none() => {
                    return Err(Error::invalid(format!(
                        "The {} attribute must be a boolean.",
                        def.name
                    )));
                }
                _ => {}
            }
            if let Some(key) = def.vocabulary {
                // 2.0 allowed token lists where later versions allow one token
                let tokens = if def.shape == TokenList || version == V2_0 {
                    split_list(value)
                } else {
                    vec![value.clone()]
                };
                for token in tokens {
                    if let Some(warning) = validate_enumeration(key, &token, version)? {
                        self.warnings.push(warning);
                    }
                }
            }
        }
        Ok(())
    }

    /// The DDMS version these attributes were validated against
    pub fn version(&self) -> Version {
        self.version
    }

    /// True if no attribute is set
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw value of an attribute by ISM local name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// The classification marking, or the empty string
    pub fn classification(&self) -> &str {
        self.get("classification").unwrap_or("")
    }

    /// The ownerProducer tokens
    pub fn owner_producers(&self) -> Vec<String> {
        self.get("ownerProducer").map(split_list).unwrap_or_default()
    }

    /// Every set attribute as (local name, value), in output order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        DEFINITIONS
            .iter()
            .filter_map(move |d| self.get(d.name).map(|v| (d.name, v)))
    }

    /// Warnings raised by lenient vocabulary checks
    pub fn warnings(&self) -> &[ValidationMessage] {
        &self.warnings
    }

    /// Require a classification and at least one ownerProducer
    pub fn require_classification(&self) -> Result<()> {
        require_value("classification", self.classification())?;
        if self.owner_producers().is_empty() {
            return Err(Error::invalid("At least 1 ownerProducer must be set."));
        }
        Ok(())
    }

    /// Write these attributes onto a freshly built element
    pub fn add_to(&self, element: &mut Element, version: Version) -> Result<()> {
        if version != self.version {
            return Err(Error::invalid(
                "These security attributes cannot decorate a DDMS component with a different DDMS version.",
            ));
        }
        let namespace = version.ism_namespace();
        let prefix = config::prefix_for(SchemaKind::Ism);
        for (name, value) in self.iter() {
            element.set_attribute(QName::prefixed(prefix.as_str(), namespace, name), value);
        }
        Ok(())
    }

    /// Render each set attribute as `prefix + name`
    pub fn output(&self, html: bool, prefix: &str) -> String {
        self.iter()
            .map(|(name, value)| output::line(html, &format!("{}{}", prefix, name), value))
            .collect()
    }
}

impl PartialEq for SecurityAttributes {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

/// Mutable staging form of [`SecurityAttributes`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecurityAttributesBuilder {
    /// Version to build against, the ambient default when unset
    pub version: Option<Version>,
    /// Attribute values keyed by ISM local name
    pub values: IndexMap<String, String>,
}

impl SecurityAttributesBuilder {
    /// Set one attribute
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    /// True when no attribute has a value
    pub fn is_empty(&self) -> bool {
        self.values.values().all(|v| v.trim().is_empty())
    }

    /// Build the attribute group, empty when nothing is set
    pub fn commit(&self) -> Result<SecurityAttributes> {
        self.commit_as(resolve_version(self.version))
    }

    /// Build against a version chosen by an enclosing builder
    pub fn commit_as(&self, version: Version) -> Result<SecurityAttributes> {
        SecurityAttributes::new(version, self.values.clone())
    }
}

impl From<&SecurityAttributes> for SecurityAttributesBuilder {
    fn from(attributes: &SecurityAttributes) -> Self {
        Self {
            version: Some(attributes.version),
            values: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::parse_element;

    #[test]
    fn test_parse_and_output() {
        let element = parse_element(
            r#"<ddms:title xmlns:ddms="urn:us:mil:ces:metadata:ddms:5" xmlns:ISM="urn:us:gov:ic:ism" ISM:ownerProducer="USA AUS" ISM:classification="U">T</ddms:title>"#,
        )
        .unwrap();
        let attrs = SecurityAttributes::from_element(&element, Version::V5_0).unwrap();
        assert_eq!(attrs.classification(), "U");
        assert_eq!(attrs.owner_producers(), vec!["USA", "AUS"]);
        assert_eq!(
            attrs.output(false, "title."),
            "title.classification: U\ntitle.ownerProducer: USA AUS\n"
        );
    }

    #[test]
    fn test_invalid_token() {
        let err = SecurityAttributes::classified(Version::V5_0, "Z", &["USA"]).unwrap_err();
        assert!(err.message().unwrap().starts_with("Z is not a valid enumeration token"));
    }

    #[test]
    fn test_version_gates() {
        let err = SecurityAttributes::new(Version::V2_0, [("compilationReason", "x")]).unwrap_err();
        assert_eq!(
            err.message(),
            Some("The compilationReason attribute cannot be used until DDMS 3.0 or later.")
        );
        let err = SecurityAttributes::new(Version::V3_0, [("declassManualReview", "true")]).unwrap_err();
        assert_eq!(
            err.message(),
            Some("The declassManualReview attribute can only be used in DDMS 2.0.")
        );
        assert!(SecurityAttributes::new(Version::V2_0, [("declassManualReview", "true")]).is_ok());
    }

    #[test]
    fn test_declass_date_format() {
        let err = SecurityAttributes::new(Version::V3_1, [("declassDate", "2005-10")]).unwrap_err();
        assert_eq!(
            err.message(),
            Some("The declassDate must be in the xs:date format (YYYY-MM-DD).")
        );
    }

    #[test]
    fn test_require_classification() {
        let attrs = SecurityAttributes::new(Version::V5_0, [("classification", "U")]).unwrap();
        let err = attrs.require_classification().unwrap_err();
        assert_eq!(err.message(), Some("At least 1 ownerProducer must be set."));
        let empty = SecurityAttributes::empty(Version::V5_0);
        assert_eq!(
            empty.require_classification().unwrap_err().message(),
            Some("classification is required.")
        );
    }

    #[test]
    fn test_add_to_checks_version() {
        let attrs = SecurityAttributes::classified(Version::V3_1, "U", &["USA"]).unwrap();
        let mut element = crate::components::helpers::ddms_element(Version::V5_0, "title");
        let err = attrs.add_to(&mut element, Version::V5_0).unwrap_err();
        assert!(err.message().unwrap().contains("different DDMS version"));
    }

    #[test]
    fn test_unknown_name_is_illegal_argument() {
        let err = SecurityAttributes::new(Version::V5_0, [("noticeType", "x")]).unwrap_err();
        assert!(matches!(err, Error::IllegalArgument(_)));
    }

    #[test]
    fn test_builder_round_trip() {
        let attrs = SecurityAttributes::classified(Version::V4_1, "S", &["USA"]).unwrap();
        let builder = SecurityAttributesBuilder::from(&attrs);
        assert!(!builder.is_empty());
        assert_eq!(builder.commit().unwrap(), attrs);
        assert!(SecurityAttributesBuilder::default().is_empty());
    }
}
