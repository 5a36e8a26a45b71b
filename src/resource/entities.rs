//! Entities that produce, request or receive a resource

use crate::attributes::{SecurityAttributes, SecurityAttributesBuilder};
use crate::components::helpers::{
    add_ddms_text_child, child_text, ddms_element, ddms_text_element, own_attribute,
    require_child_count, require_compatible, require_ddms_element, require_value,
    require_version, set_ddms_attribute,
};
use crate::components::{output, Base, Builder, BuilderList, Component};
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::versions::Version;
use std::sync::Arc;

/// Element name of an entity type in a version. From 4.0.1 the names are
/// lowercase.
pub fn entity_name(version: Version, lowercase: &'static str) -> String {
    if version.is_at_least(Version::V4_0_1) {
        lowercase.to_string()
    } else {
        let mut chars = lowercase.chars();
        chars
            .next()
            .map(|first| first.to_uppercase().chain(chars).collect())
            .unwrap_or_default()
    }
}

/// Whether a DDMS element is one of the entity kinds a role can hold
pub fn is_entity_element(element: &Element, version: Version) -> bool {
    element.namespace() == Some(version.ddms_namespace())
        && ["organization", "person", "service", "unknown"]
            .iter()
            .any(|kind| element.local_name() == entity_name(version, kind))
}

/// Names, phone numbers and email addresses shared by every entity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactInfo {
    /// Names, at least one of which is non-empty
    pub names: Vec<String>,
    /// Phone numbers
    pub phones: Vec<String>,
    /// Email addresses
    pub emails: Vec<String>,
}

impl ContactInfo {
    fn read(element: &Element) -> Self {
        let namespace = element.namespace().unwrap_or("");
        Self {
            names: element.child_values(namespace, "name"),
            phones: element.child_values(namespace, "phone"),
            emails: element.child_values(namespace, "email"),
        }
    }

    fn write_names(&self, element: &mut Element, version: Version) {
        for name in &self.names {
            element.add_child(ddms_text_element(version, "name", name));
        }
    }

    fn write_contacts(&self, element: &mut Element, version: Version) {
        for phone in &self.phones {
            element.add_child(ddms_text_element(version, "phone", phone));
        }
        for email in &self.emails {
            element.add_child(ddms_text_element(version, "email", email));
        }
    }

    fn validate(&self) -> Result<()> {
        if self.names.is_empty() {
            return Err(Error::invalid("At least 1 name element must exist."));
        }
        if self.names.iter().all(|n| n.trim().is_empty()) {
            return Err(Error::invalid("At least 1 name element must have a non-empty value."));
        }
        Ok(())
    }

    fn warn(&self, base: &mut Base) {
        if self.phones.iter().any(String::is_empty) {
            base.warn("A ddms:phone element was found with no value.");
        }
        if self.emails.iter().any(String::is_empty) {
            base.warn("A ddms:email element was found with no value.");
        }
    }

    fn is_empty(&self) -> bool {
        [&self.names, &self.phones, &self.emails]
            .iter()
            .all(|values| values.iter().all(|v| v.trim().is_empty()))
    }
}

fn clean(values: &[String]) -> Vec<String> {
    values.iter().filter(|v| !v.trim().is_empty()).cloned().collect()
}

/// A unit within an organization. DDMS 4.0.1 or later.
#[derive(Debug, Clone, PartialEq)]
pub struct SubOrganization {
    base: Base,
    value: String,
    security_attributes: SecurityAttributes,
}

impl SubOrganization {
    /// Parse a `ddms:subOrganization` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let security_attributes =
            SecurityAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        Self {
            value: element.text().to_string(),
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from a name and security attributes
    pub fn new(version: Version, value: &str, security_attributes: SecurityAttributes) -> Result<Self> {
        let mut element = ddms_text_element(version, "subOrganization", value);
        security_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&element.qualified_name()))?;
        Self {
            value: value.to_string(),
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
        require_ddms_element(self.element(), self.version(), "subOrganization")?;
        require_value("subOrganization value", &self.value)?;
        require_version(self.version(), Version::V4_0_1, "ddms:subOrganization element")
    }

    /// The sub-organization name
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Component for SubOrganization {
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

/// Staging form of [`SubOrganization`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubOrganizationBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Name
    pub value: String,
    /// Security attributes
    pub security_attributes: SecurityAttributesBuilder,
}

impl Builder for SubOrganizationBuilder {
    type Target = SubOrganization;

    fn is_empty(&self) -> bool {
        self.value.trim().is_empty() && self.security_attributes.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<SubOrganization> {
        SubOrganization::new(version, &self.value, self.security_attributes.commit_as(version)?)
    }
}

impl From<&SubOrganization> for SubOrganizationBuilder {
    fn from(sub: &SubOrganization) -> Self {
        Self {
            version: Some(sub.version()),
            value: sub.value.clone(),
            security_attributes: SecurityAttributesBuilder::from(&sub.security_attributes),
        }
    }
}

/// An organization
#[derive(Debug, Clone, PartialEq)]
pub struct Organization {
    base: Base,
    contact: ContactInfo,
    sub_organizations: Vec<Arc<SubOrganization>>,
    acronym: String,
}

impl Organization {
    /// Parse an organization element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let namespace = element.namespace().unwrap_or("").to_string();
        let sub_organizations = element
            .children_named(&namespace, "subOrganization")
            .map(|e| SubOrganization::from_element(e.clone(), version).map(Arc::new))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.locate(&qname))?;
        Self {
            contact: ContactInfo::read(&element),
            acronym: own_attribute(&element, "acronym").to_string(),
            sub_organizations,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from contact details, sub-organizations and an acronym
    pub fn new(
        version: Version,
        contact: ContactInfo,
        sub_organizations: Vec<Arc<SubOrganization>>,
        acronym: &str,
    ) -> Result<Self> {
        let mut element = ddms_element(version, &entity_name(version, "organization"));
        set_ddms_attribute(&mut element, version, "acronym", acronym);
        contact.write_names(&mut element, version);
        contact.write_contacts(&mut element, version);
        for sub in &sub_organizations {
            element.add_child(sub.element().clone());
        }
        Self {
            contact,
            sub_organizations,
            acronym: acronym.to_string(),
            base: Base::new(element, version),
        }
        .validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        if self.version().is_at_least(Version::V4_0_1)
            && self.acronym.is_empty()
            && self.element().has_attribute(self.element().namespace(), "acronym")
        {
            self.base.warn("A ddms:acronym attribute was found with no value.");
        }
        let contact = self.contact.clone();
        contact.warn(&mut self.base);
        for sub in self.sub_organizations.clone() {
            self.base.absorb(&*sub);
        }
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let version = self.version();
        require_ddms_element(self.element(), version, &entity_name(version, "organization"))?;
        self.contact.validate()?;
        for sub in &self.sub_organizations {
            require_compatible(version, &**sub)?;
        }
        if !version.is_at_least(Version::V4_0_1) && !self.acronym.is_empty() {
            return Err(Error::invalid(
                "An organization cannot have an acronym until DDMS 4.0.1 or later.",
            ));
        }
        Ok(())
    }

    /// Contact details
    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    /// Names
    pub fn names(&self) -> &[String] {
        &self.contact.names
    }

    /// Sub-organizations
    pub fn sub_organizations(&self) -> &[Arc<SubOrganization>] {
        &self.sub_organizations
    }

    /// Acronym
    pub fn acronym(&self) -> &str {
        &self.acronym
    }
}

impl Component for Organization {
    fn base(&self) -> &Base {
        &self.base
    }

    // Entities render flat under the prefix of the role that holds them
    fn output(&self, html: bool, prefix: &str, _suffix: &str) -> String {
        let mut text = output::line(html, &format!("{}entityType", prefix), self.name());
        text.push_str(&output::lines(html, &format!("{}name", prefix), &self.contact.names));
        text.push_str(&output::lines(html, &format!("{}phone", prefix), &self.contact.phones));
        text.push_str(&output::lines(html, &format!("{}email", prefix), &self.contact.emails));
        text.push_str(&output::components(html, prefix, &self.sub_organizations));
        text.push_str(&output::line(html, &format!("{}acronym", prefix), &self.acronym));
        text
    }
}

/// Staging form of [`Organization`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrganizationBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Names, phones and emails
    pub contact: ContactInfo,
    /// Sub-organizations
    pub sub_organizations: BuilderList<SubOrganizationBuilder>,
    /// Acronym
    pub acronym: String,
}

impl Builder for OrganizationBuilder {
    type Target = Organization;

    fn is_empty(&self) -> bool {
        self.contact.is_empty() && self.sub_organizations.is_empty() && self.acronym.trim().is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<Organization> {
        let contact = ContactInfo {
            names: clean(&self.contact.names),
            phones: clean(&self.contact.phones),
            emails: clean(&self.contact.emails),
        };
        Organization::new(version, contact, self.sub_organizations.commit_all(version)?, &self.acronym)
    }
}

impl From<&Organization> for OrganizationBuilder {
    fn from(organization: &Organization) -> Self {
        Self {
            version: Some(organization.version()),
            contact: organization.contact.clone(),
            sub_organizations: organization
                .sub_organizations
                .iter()
                .map(|s| SubOrganizationBuilder::from(&**s))
                .collect::<Vec<_>>()
                .into(),
            acronym: organization.acronym.clone(),
        }
    }
}

/// A person
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    base: Base,
    contact: ContactInfo,
    surname: String,
    user_id: String,
    affiliation: String,
}

impl Person {
    /// Parse a person element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        Self {
            contact: ContactInfo::read(&element),
            surname: child_text(&element, "surname"),
            user_id: child_text(&element, "userID"),
            affiliation: child_text(&element, "affiliation"),
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from contact details, a surname, a user ID and an affiliation
    pub fn new(
        version: Version,
        contact: ContactInfo,
        surname: &str,
        user_id: &str,
        affiliation: &str,
    ) -> Result<Self> {
        let mut element = ddms_element(version, &entity_name(version, "person"));
        contact.write_names(&mut element, version);
        add_ddms_text_child(&mut element, version, "surname", surname);
        add_ddms_text_child(&mut element, version, "userID", user_id);
        add_ddms_text_child(&mut element, version, "affiliation", affiliation);
        contact.write_contacts(&mut element, version);
        Self {
            contact,
            surname: surname.to_string(),
            user_id: user_id.to_string(),
            affiliation: affiliation.to_string(),
            base: Base::new(element, version),
        }
        .validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        let namespace = self.namespace().to_string();
        let present = |name: &str| self.element().children_named(&namespace, name).count() == 1;
        let empty_user_id = self.user_id.is_empty() && present("userID");
        let empty_affiliation = self.affiliation.is_empty() && present("affiliation");
        if empty_user_id {
            self.base.warn("A ddms:userID element was found with no value.");
        }
        if empty_affiliation {
            self.base.warn("A ddms:affiliation element was found with no value.");
        }
        let contact = self.contact.clone();
        contact.warn(&mut self.base);
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let version = self.version();
        let element = self.element();
        require_ddms_element(element, version, &entity_name(version, "person"))?;
        self.contact.validate()?;
        require_value("surname", &self.surname)?;
        require_child_count(element, "surname", 1, 1)?;
        require_child_count(element, "userID", 0, 1)?;
        require_child_count(element, "affiliation", 0, 1)?;
        Ok(())
    }

    /// Contact details
    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    /// Names
    pub fn names(&self) -> &[String] {
        &self.contact.names
    }

    /// Surname
    pub fn surname(&self) -> &str {
        &self.surname
    }

    /// User ID
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Affiliation
    pub fn affiliation(&self) -> &str {
        &self.affiliation
    }
}

impl Component for Person {
    fn base(&self) -> &Base {
        &self.base
    }

    fn output(&self, html: bool, prefix: &str, _suffix: &str) -> String {
        let mut text = output::line(html, &format!("{}entityType", prefix), self.name());
        text.push_str(&output::lines(html, &format!("{}name", prefix), &self.contact.names));
        text.push_str(&output::line(html, &format!("{}surname", prefix), &self.surname));
        text.push_str(&output::line(html, &format!("{}userID", prefix), &self.user_id));
        text.push_str(&output::line(html, &format!("{}affiliation", prefix), &self.affiliation));
        text.push_str(&output::lines(html, &format!("{}phone", prefix), &self.contact.phones));
        text.push_str(&output::lines(html, &format!("{}email", prefix), &self.contact.emails));
        text
    }
}

/// Staging form of [`Person`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Names, phones and emails
    pub contact: ContactInfo,
    /// Surname
    pub surname: String,
    /// User ID
    pub user_id: String,
    /// Affiliation
    pub affiliation: String,
}

impl Builder for PersonBuilder {
    type Target = Person;

    fn is_empty(&self) -> bool {
        self.contact.is_empty()
            && self.surname.trim().is_empty()
            && self.user_id.trim().is_empty()
            && self.affiliation.trim().is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<Person> {
        let contact = ContactInfo {
            names: clean(&self.contact.names),
            phones: clean(&self.contact.phones),
            emails: clean(&self.contact.emails),
        };
        Person::new(version, contact, &self.surname, &self.user_id, &self.affiliation)
    }
}

impl From<&Person> for PersonBuilder {
    fn from(person: &Person) -> Self {
        Self {
            version: Some(person.version()),
            contact: person.contact.clone(),
            surname: person.surname.clone(),
            user_id: person.user_id.clone(),
            affiliation: person.affiliation.clone(),
        }
    }
}

/// Entities that carry nothing beyond contact details
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedEntityKind {
    /// A web service
    Service,
    /// An unknown entity, DDMS 4.0.1 or later
    Unknown,
}

impl NamedEntityKind {
    fn lowercase(&self) -> &'static str {
        match self {
            NamedEntityKind::Service => "service",
            NamedEntityKind::Unknown => "unknown",
        }
    }
}

/// A service or an unknown entity
#[derive(Debug, Clone, PartialEq)]
pub struct NamedEntity {
    base: Base,
    kind: NamedEntityKind,
    contact: ContactInfo,
}

impl NamedEntity {
    /// Parse a service or unknown element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let kind = if element.local_name().eq_ignore_ascii_case("unknown") {
            NamedEntityKind::Unknown
        } else {
            NamedEntityKind::Service
        };
        Self {
            kind,
            contact: ContactInfo::read(&element),
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from contact details
    pub fn new(version: Version, kind: NamedEntityKind, contact: ContactInfo) -> Result<Self> {
        let mut element = ddms_element(version, &entity_name(version, kind.lowercase()));
        contact.write_names(&mut element, version);
        contact.write_contacts(&mut element, version);
        Self {
            kind,
            contact,
            base: Base::new(element, version),
        }
        .validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        let contact = self.contact.clone();
        contact.warn(&mut self.base);
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let version = self.version();
        let name = entity_name(version, self.kind.lowercase());
        require_ddms_element(self.element(), version, &name)?;
        if self.kind == NamedEntityKind::Unknown {
            require_version(version, Version::V4_0_1, "ddms:unknown element")?;
        }
        self.contact.validate()
    }

    /// Service or unknown
    pub fn kind(&self) -> NamedEntityKind {
        self.kind
    }

    /// Contact details
    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    /// Names
    pub fn names(&self) -> &[String] {
        &self.contact.names
    }
}

impl Component for NamedEntity {
    fn base(&self) -> &Base {
        &self.base
    }

    fn output(&self, html: bool, prefix: &str, _suffix: &str) -> String {
        let mut text = output::line(html, &format!("{}entityType", prefix), self.name());
        text.push_str(&output::lines(html, &format!("{}name", prefix), &self.contact.names));
        text.push_str(&output::lines(html, &format!("{}phone", prefix), &self.contact.phones));
        text.push_str(&output::lines(html, &format!("{}email", prefix), &self.contact.emails));
        text
    }
}

/// Staging form of [`NamedEntity`]
#[derive(Debug, Clone, PartialEq)]
pub struct NamedEntityBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Service or unknown
    pub kind: NamedEntityKind,
    /// Names, phones and emails
    pub contact: ContactInfo,
}

impl NamedEntityBuilder {
    /// An empty builder for one kind
    pub fn new(kind: NamedEntityKind) -> Self {
        Self {
            version: None,
            kind,
            contact: ContactInfo::default(),
        }
    }
}

impl Default for NamedEntityBuilder {
    fn default() -> Self {
        Self::new(NamedEntityKind::Service)
    }
}

impl Builder for NamedEntityBuilder {
    type Target = NamedEntity;

    fn is_empty(&self) -> bool {
        self.contact.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<NamedEntity> {
        let contact = ContactInfo {
            names: clean(&self.contact.names),
            phones: clean(&self.contact.phones),
            emails: clean(&self.contact.emails),
        };
        NamedEntity::new(version, self.kind, contact)
    }
}

impl From<&NamedEntity> for NamedEntityBuilder {
    fn from(entity: &NamedEntity) -> Self {
        Self {
            version: Some(entity.version()),
            kind: entity.kind,
            contact: entity.contact.clone(),
        }
    }
}
