//! Simple resource elements: identifiers, titles, descriptions, languages,
//! rights, sources and types

use crate::attributes::{SecurityAttributes, SecurityAttributesBuilder};
use crate::components::helpers::{
    ddms_element, own_attribute, require_ddms_element, require_value, set_ddms_attribute,
};
use crate::components::{output, Base, Builder, Component};
use crate::datatypes::{parse_boolean, validate_uri};
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::versions::Version;

/// A unique identifier for the resource
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    base: Base,
    qualifier: String,
    value: String,
}

impl Identifier {
    /// Parse a `ddms:identifier` element
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
        let mut element = ddms_element(version, "identifier");
        set_ddms_attribute(&mut element, version, "qualifier", qualifier);
        set_ddms_attribute(&mut element, version, "value", value);
        Self::from_element(element, version)
    }

    fn validated(self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        require_ddms_element(self.element(), self.version(), "identifier")?;
        require_value("qualifier attribute", &self.qualifier)?;
        require_value("value attribute", &self.value)?;
        validate_uri(&self.qualifier)
    }

    /// The qualifier URI
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    /// The identifier value
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Component for Identifier {
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

/// Staging form of [`Identifier`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentifierBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Qualifier URI
    pub qualifier: String,
    /// Identifier value
    pub value: String,
}

impl Builder for IdentifierBuilder {
    type Target = Identifier;

    fn is_empty(&self) -> bool {
        self.qualifier.trim().is_empty() && self.value.trim().is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<Identifier> {
        Identifier::new(version, &self.qualifier, &self.value)
    }
}

impl From<&Identifier> for IdentifierBuilder {
    fn from(identifier: &Identifier) -> Self {
        Self {
            version: Some(identifier.version()),
            qualifier: identifier.qualifier.clone(),
            value: identifier.value.clone(),
        }
    }
}

/// The elements that hold a single text value plus security markings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleStringKind {
    /// `ddms:title`, text required
    Title,
    /// `ddms:subtitle`
    Subtitle,
    /// `ddms:description`
    Description,
}

impl SimpleStringKind {
    /// Element local name
    pub fn local_name(&self) -> &'static str {
        match self {
            SimpleStringKind::Title => "title",
            SimpleStringKind::Subtitle => "subtitle",
            SimpleStringKind::Description => "description",
        }
    }

    fn from_local_name(name: &str) -> Option<Self> {
        match name {
            "title" => Some(SimpleStringKind::Title),
            "subtitle" => Some(SimpleStringKind::Subtitle),
            "description" => Some(SimpleStringKind::Description),
            _ => None,
        }
    }
}

/// A title, subtitle or description
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleString {
    base: Base,
    kind: SimpleStringKind,
    value: String,
    security_attributes: SecurityAttributes,
}

impl SimpleString {
    /// Parse a `ddms:title`, `ddms:subtitle` or `ddms:description` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let kind = SimpleStringKind::from_local_name(element.local_name()).ok_or_else(|| {
            Error::invalid(format!(
                "Unexpected namespace URI and local name encountered: {}",
                element.qname.clark()
            ))
            .locate(&qname)
        })?;
        let security_attributes =
            SecurityAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        Self {
            kind,
            value: element.text().to_string(),
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from a value and security attributes
    pub fn new(
        version: Version,
        kind: SimpleStringKind,
        value: &str,
        security_attributes: SecurityAttributes,
    ) -> Result<Self> {
        let mut element = ddms_element(version, kind.local_name());
        if !value.is_empty() {
            element.set_text(value);
        }
        security_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&element.qualified_name()))?;
        Self {
            kind,
            value: value.to_string(),
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build a title
    pub fn title(version: Version, value: &str, security_attributes: SecurityAttributes) -> Result<Self> {
        Self::new(version, SimpleStringKind::Title, value, security_attributes)
    }

    /// Build a subtitle
    pub fn subtitle(version: Version, value: &str, security_attributes: SecurityAttributes) -> Result<Self> {
        Self::new(version, SimpleStringKind::Subtitle, value, security_attributes)
    }

    /// Build a description
    pub fn description(version: Version, value: &str, security_attributes: SecurityAttributes) -> Result<Self> {
        Self::new(version, SimpleStringKind::Description, value, security_attributes)
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        if self.kind != SimpleStringKind::Title && self.value.is_empty() {
            let name = self.kind.local_name();
            self.base.warn(format!(
                "A ddms:{} element was found with no {} value.",
                name, name
            ));
        }
        let attribute_warnings = self.security_attributes.warnings().to_vec();
        self.base.absorb_attributes(&attribute_warnings);
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        require_ddms_element(self.element(), self.version(), self.kind.local_name())?;
        if self.kind == SimpleStringKind::Title {
            require_value("title value", &self.value)?;
        }
        if self.version().is_at_least(Version::V3_0) {
            self.security_attributes.require_classification()?;
        }
        Ok(())
    }

    /// Which element this is
    pub fn kind(&self) -> SimpleStringKind {
        self.kind
    }

    /// The text value
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Component for SimpleString {
    fn base(&self) -> &Base {
        &self.base
    }

    fn security_attributes(&self) -> Option<&SecurityAttributes> {
        Some(&self.security_attributes)
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let name = output::build_prefix(prefix, self.name(), suffix);
        let mut text = output::line(html, &name, &self.value);
        text.push_str(&self.security_attributes.output(html, &format!("{}.", name)));
        text
    }
}

/// Staging form of [`SimpleString`]
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleStringBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Which element to build
    pub kind: SimpleStringKind,
    /// Text value
    pub value: String,
    /// Security attributes
    pub security_attributes: SecurityAttributesBuilder,
}

impl SimpleStringBuilder {
    /// An empty builder for one kind
    pub fn new(kind: SimpleStringKind) -> Self {
        Self {
            version: None,
            kind,
            value: String::new(),
            security_attributes: SecurityAttributesBuilder::default(),
        }
    }
}

impl Default for SimpleStringBuilder {
    fn default() -> Self {
        Self::new(SimpleStringKind::Title)
    }
}

impl Builder for SimpleStringBuilder {
    type Target = SimpleString;

    fn is_empty(&self) -> bool {
        self.value.trim().is_empty() && self.security_attributes.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<SimpleString> {
        let attributes = self.security_attributes.commit_as(version)?;
        SimpleString::new(version, self.kind, &self.value, attributes)
    }
}

impl From<&SimpleString> for SimpleStringBuilder {
    fn from(component: &SimpleString) -> Self {
        Self {
            version: Some(component.version()),
            kind: component.kind,
            value: component.value.clone(),
            security_attributes: SecurityAttributesBuilder::from(&component.security_attributes),
        }
    }
}

/// The language of the resource
#[derive(Debug, Clone, PartialEq)]
pub struct Language {
    base: Base,
    qualifier: String,
    value: String,
}

impl Language {
    /// Parse a `ddms:language` element
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
        let mut element = ddms_element(version, "language");
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
            self.base.warn("Neither a qualifier nor a value was set on this language.");
        }
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        require_ddms_element(self.element(), self.version(), "language")?;
        if !self.value.is_empty() {
            require_value("qualifier attribute", &self.qualifier)?;
        }
        Ok(())
    }

    /// The qualifier
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    /// The language value
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Component for Language {
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

/// Staging form of [`Language`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LanguageBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Qualifier
    pub qualifier: String,
    /// Language value
    pub value: String,
}

impl Builder for LanguageBuilder {
    type Target = Language;

    fn is_empty(&self) -> bool {
        self.qualifier.trim().is_empty() && self.value.trim().is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<Language> {
        Language::new(version, &self.qualifier, &self.value)
    }
}

impl From<&Language> for LanguageBuilder {
    fn from(language: &Language) -> Self {
        Self {
            version: Some(language.version()),
            qualifier: language.qualifier.clone(),
            value: language.value.clone(),
        }
    }
}

/// Rights flags of the resource
#[derive(Debug, Clone, PartialEq)]
pub struct Rights {
    base: Base,
    privacy_act: bool,
    intellectual_property: bool,
    copyright: bool,
}

impl Rights {
    /// Parse a `ddms:rights` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let flag = |name: &str| -> Result<bool> {
            let raw = own_attribute(&element, name);
            if raw.is_empty() {
                return Ok(false);
            }
            parse_boolean(raw).ok_or_else(|| {
                Error::invalid(format!("The {} attribute must be a boolean.", name)).locate(&qname)
            })
        };
        let privacy_act = flag("privacyAct")?;
        let intellectual_property = flag("intellectualProperty")?;
        let copyright = flag("copyright")?;
        let rights = Self {
            privacy_act,
            intellectual_property,
            copyright,
            base: Base::new(element, version),
        };
        require_ddms_element(rights.element(), version, "rights").map_err(|e| e.locate(&qname))?;
        Ok(rights)
    }

    /// Build from the three flags
    pub fn new(version: Version, privacy_act: bool, intellectual_property: bool, copyright: bool) -> Result<Self> {
        let mut element = ddms_element(version, "rights");
        set_ddms_attribute(&mut element, version, "privacyAct", &privacy_act.to_string());
        set_ddms_attribute(&mut element, version, "intellectualProperty", &intellectual_property.to_string());
        set_ddms_attribute(&mut element, version, "copyright", &copyright.to_string());
        Self::from_element(element, version)
    }

    /// The privacyAct flag
    pub fn privacy_act(&self) -> bool {
        self.privacy_act
    }

    /// The intellectualProperty flag
    pub fn intellectual_property(&self) -> bool {
        self.intellectual_property
    }

    /// The copyright flag
    pub fn copyright(&self) -> bool {
        self.copyright
    }
}

impl Component for Rights {
    fn base(&self) -> &Base {
        &self.base
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let prefix = format!("{}.", output::build_prefix(prefix, self.name(), suffix));
        [
            ("privacyAct", self.privacy_act),
            ("intellectualProperty", self.intellectual_property),
            ("copyright", self.copyright),
        ]
        .iter()
        .map(|(name, flag)| output::line_always(html, &format!("{}{}", prefix, name), &flag.to_string()))
        .collect()
    }
}

/// Staging form of [`Rights`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RightsBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// privacyAct flag
    pub privacy_act: bool,
    /// intellectualProperty flag
    pub intellectual_property: bool,
    /// copyright flag
    pub copyright: bool,
}

impl Builder for RightsBuilder {
    type Target = Rights;

    fn is_empty(&self) -> bool {
        !self.privacy_act && !self.intellectual_property && !self.copyright
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<Rights> {
        Rights::new(version, self.privacy_act, self.intellectual_property, self.copyright)
    }
}

impl From<&Rights> for RightsBuilder {
    fn from(rights: &Rights) -> Self {
        Self {
            version: Some(rights.version()),
            privacy_act: rights.privacy_act,
            intellectual_property: rights.intellectual_property,
            copyright: rights.copyright,
        }
    }
}

/// A source the resource was derived from
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    base: Base,
    qualifier: String,
    value: String,
    schema_qualifier: String,
    schema_href: String,
    security_attributes: SecurityAttributes,
}

impl Source {
    /// Parse a `ddms:source` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let security_attributes =
            SecurityAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        Self {
            qualifier: own_attribute(&element, "qualifier").to_string(),
            value: own_attribute(&element, "value").to_string(),
            schema_qualifier: own_attribute(&element, "schemaQualifier").to_string(),
            schema_href: own_attribute(&element, "schemaHref").to_string(),
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from raw values
    pub fn new(
        version: Version,
        qualifier: &str,
        value: &str,
        schema_qualifier: &str,
        schema_href: &str,
        security_attributes: SecurityAttributes,
    ) -> Result<Self> {
        let mut element = ddms_element(version, "source");
        set_ddms_attribute(&mut element, version, "qualifier", qualifier);
        set_ddms_attribute(&mut element, version, "value", value);
        set_ddms_attribute(&mut element, version, "schemaQualifier", schema_qualifier);
        set_ddms_attribute(&mut element, version, "schemaHref", schema_href);
        security_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&element.qualified_name()))?;
        Self::from_element(element, version)
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        if self.qualifier.is_empty()
            && self.value.is_empty()
            && self.schema_qualifier.is_empty()
            && self.schema_href.is_empty()
        {
            self.base.warn("A completely empty ddms:source element was found.");
        }
        let attribute_warnings = self.security_attributes.warnings().to_vec();
        self.base.absorb_attributes(&attribute_warnings);
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        require_ddms_element(self.element(), self.version(), "source")?;
        if !self.schema_href.is_empty() {
            validate_uri(&self.schema_href)?;
        }
        if !self.version().is_at_least(Version::V3_0) && !self.security_attributes.is_empty() {
            return Err(Error::invalid(
                "Security attributes cannot be applied to this component until DDMS 3.0 or later.",
            ));
        }
        Ok(())
    }

    /// The qualifier
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    /// The value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The schemaQualifier
    pub fn schema_qualifier(&self) -> &str {
        &self.schema_qualifier
    }

    /// The schemaHref URI
    pub fn schema_href(&self) -> &str {
        &self.schema_href
    }
}

impl Component for Source {
    fn base(&self) -> &Base {
        &self.base
    }

    fn security_attributes(&self) -> Option<&SecurityAttributes> {
        Some(&self.security_attributes)
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let prefix = format!("{}.", output::build_prefix(prefix, self.name(), suffix));
        let mut text = String::new();
        for (name, value) in [
            ("qualifier", &self.qualifier),
            ("value", &self.value),
            ("schemaQualifier", &self.schema_qualifier),
            ("schemaHref", &self.schema_href),
        ] {
            text.push_str(&output::line(html, &format!("{}{}", prefix, name), value));
        }
        text.push_str(&self.security_attributes.output(html, &prefix));
        text
    }
}

/// Staging form of [`Source`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Qualifier
    pub qualifier: String,
    /// Value
    pub value: String,
    /// schemaQualifier
    pub schema_qualifier: String,
    /// schemaHref
    pub schema_href: String,
    /// Security attributes
    pub security_attributes: SecurityAttributesBuilder,
}

impl Builder for SourceBuilder {
    type Target = Source;

    fn is_empty(&self) -> bool {
        self.qualifier.trim().is_empty()
            && self.value.trim().is_empty()
            && self.schema_qualifier.trim().is_empty()
            && self.schema_href.trim().is_empty()
            && self.security_attributes.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<Source> {
        Source::new(
            version,
            &self.qualifier,
            &self.value,
            &self.schema_qualifier,
            &self.schema_href,
            self.security_attributes.commit_as(version)?,
        )
    }
}

impl From<&Source> for SourceBuilder {
    fn from(source: &Source) -> Self {
        Self {
            version: Some(source.version()),
            qualifier: source.qualifier.clone(),
            value: source.value.clone(),
            schema_qualifier: source.schema_qualifier.clone(),
            schema_href: source.schema_href.clone(),
            security_attributes: SecurityAttributesBuilder::from(&source.security_attributes),
        }
    }
}

/// The type of the resource
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    base: Base,
    qualifier: String,
    value: String,
    description: String,
    security_attributes: SecurityAttributes,
}

impl Type {
    /// Parse a `ddms:type` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let security_attributes =
            SecurityAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        Self {
            qualifier: own_attribute(&element, "qualifier").to_string(),
            value: own_attribute(&element, "value").to_string(),
            description: element.text().to_string(),
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from raw values. The description text requires DDMS 4.1.
    pub fn new(
        version: Version,
        description: &str,
        qualifier: &str,
        value: &str,
        security_attributes: SecurityAttributes,
    ) -> Result<Self> {
        let mut element = ddms_element(version, "type");
        if !description.is_empty() {
            element.set_text(description);
        }
        set_ddms_attribute(&mut element, version, "qualifier", qualifier);
        set_ddms_attribute(&mut element, version, "value", value);
        security_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&element.qualified_name()))?;
        Self::from_element(element, version)
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        if !self.qualifier.is_empty() && self.value.is_empty() {
            self.base
                .warn("A qualifier has been set without an accompanying value attribute.");
        }
        if self.qualifier.is_empty() && self.value.is_empty() && self.description.is_empty() {
            self.base.warn("Neither a qualifier nor a value was set on this type.");
        }
        let attribute_warnings = self.security_attributes.warnings().to_vec();
        self.base.absorb_attributes(&attribute_warnings);
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        require_ddms_element(self.element(), self.version(), "type")?;
        if !self.value.is_empty() {
            require_value("qualifier attribute", &self.qualifier)?;
        }
        if !self.version().is_at_least(Version::V4_1) {
            if !self.description.is_empty() {
                return Err(Error::invalid(
                    "This component cannot contain description text until DDMS 4.1 or later.",
                ));
            }
            if !self.security_attributes.is_empty() {
                return Err(Error::invalid(
                    "Security attributes cannot be applied to this component until DDMS 4.1 or later.",
                ));
            }
        }
        Ok(())
    }

    /// The qualifier
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    /// The value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The description text
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl Component for Type {
    fn base(&self) -> &Base {
        &self.base
    }

    fn security_attributes(&self) -> Option<&SecurityAttributes> {
        Some(&self.security_attributes)
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let name = output::build_prefix(prefix, self.name(), suffix);
        let prefix = format!("{}.", name);
        let mut text = output::line(html, &format!("{}description", prefix), &self.description);
        text.push_str(&output::line(html, &format!("{}qualifier", prefix), &self.qualifier));
        text.push_str(&output::line(html, &format!("{}value", prefix), &self.value));
        text.push_str(&self.security_attributes.output(html, &prefix));
        text
    }
}

/// Staging form of [`Type`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Description text
    pub description: String,
    /// Qualifier
    pub qualifier: String,
    /// Value
    pub value: String,
    /// Security attributes
    pub security_attributes: SecurityAttributesBuilder,
}

impl Builder for TypeBuilder {
    type Target = Type;

    fn is_empty(&self) -> bool {
        self.description.trim().is_empty()
            && self.qualifier.trim().is_empty()
            && self.value.trim().is_empty()
            && self.security_attributes.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<Type> {
        let attributes = self.security_attributes.commit_as(version)?;
        Type::new(version, &self.description, &self.qualifier, &self.value, attributes)
    }
}

impl From<&Type> for TypeBuilder {
    fn from(ty: &Type) -> Self {
        Self {
            version: Some(ty.version()),
            description: ty.description.clone(),
            qualifier: ty.qualifier.clone(),
            value: ty.value.clone(),
            security_attributes: SecurityAttributesBuilder::from(&ty.security_attributes),
        }
    }
}
