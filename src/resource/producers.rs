//! Producer roles: creator, contributor, publisher and point of contact

use super::entities::{
    entity_name, is_entity_element, NamedEntity, NamedEntityBuilder, NamedEntityKind, Organization, OrganizationBuilder,
    Person, PersonBuilder,
};
use crate::attributes::{SecurityAttributes, SecurityAttributesBuilder};
use crate::components::helpers::{
    ddms_element, require_compatible, require_ddms_namespace, split_list, xs_list,
};
use crate::components::{output, Base, Builder, Component};
use crate::config;
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::namespaces::QName;
use crate::versions::{SchemaKind, Version};
use crate::vocabulary::{self, validate_enumeration};
use std::sync::Arc;
use tracing::warn;

/// The entity behind a producer role
#[derive(Debug, Clone, PartialEq)]
pub enum ProducerEntity {
    /// An organization
    Organization(Arc<Organization>),
    /// A person
    Person(Arc<Person>),
    /// A service
    Service(Arc<NamedEntity>),
    /// An unknown entity
    Unknown(Arc<NamedEntity>),
}

impl ProducerEntity {
    /// Parse whichever entity the element names
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let name = element.local_name().to_string();
        if name == entity_name(version, "organization") {
            Organization::from_element(element, version).map(|o| ProducerEntity::Organization(Arc::new(o)))
        } else if name == entity_name(version, "person") {
            Person::from_element(element, version).map(|p| ProducerEntity::Person(Arc::new(p)))
        } else if name == entity_name(version, "service") || name == entity_name(version, "unknown") {
            NamedEntity::from_element(element, version).map(|e| Self::from(Arc::new(e)))
        } else {
            Err(Error::invalid(format!(
                "Unexpected namespace URI and local name encountered: {}",
                element.qname.clark()
            )))
        }
    }

    /// The entity as a component
    pub fn component(&self) -> &dyn Component {
        match self {
            ProducerEntity::Organization(o) => &**o,
            ProducerEntity::Person(p) => &**p,
            ProducerEntity::Service(s) | ProducerEntity::Unknown(s) => &**s,
        }
    }

    /// The names of the entity
    pub fn names(&self) -> &[String] {
        match self {
            ProducerEntity::Organization(o) => o.names(),
            ProducerEntity::Person(p) => p.names(),
            ProducerEntity::Service(s) | ProducerEntity::Unknown(s) => s.names(),
        }
    }
}

impl From<Arc<NamedEntity>> for ProducerEntity {
    fn from(entity: Arc<NamedEntity>) -> Self {
        match entity.kind() {
            NamedEntityKind::Service => ProducerEntity::Service(entity),
            NamedEntityKind::Unknown => ProducerEntity::Unknown(entity),
        }
    }
}

/// Which role a producer plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerRoleKind {
    /// `ddms:creator`
    Creator,
    /// `ddms:contributor`
    Contributor,
    /// `ddms:publisher`
    Publisher,
    /// `ddms:pointOfContact`
    PointOfContact,
}

impl ProducerRoleKind {
    /// Every role, in resource order
    pub const ALL: [ProducerRoleKind; 4] = [
        ProducerRoleKind::Creator,
        ProducerRoleKind::Publisher,
        ProducerRoleKind::Contributor,
        ProducerRoleKind::PointOfContact,
    ];

    /// Element local name
    pub fn local_name(&self) -> &'static str {
        match self {
            ProducerRoleKind::Creator => "creator",
            ProducerRoleKind::Contributor => "contributor",
            ProducerRoleKind::Publisher => "publisher",
            ProducerRoleKind::PointOfContact => "pointOfContact",
        }
    }

    /// The role with this local name
    pub fn from_local_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.local_name() == name)
    }
}

/// A producer of the resource, in one role.
///
/// Point-of-contact types are written as `ddms:POCType` in DDMS 4.0.1 and as
/// the vocabulary-checked `ISM:pocType` from 4.1.
#[derive(Debug, Clone, PartialEq)]
pub struct ProducerRole {
    base: Base,
    kind: ProducerRoleKind,
    entity: Option<ProducerEntity>,
    poc_types: Vec<String>,
    security_attributes: SecurityAttributes,
}

fn poc_type_qname(version: Version) -> Option<QName> {
    if version.is_at_least(Version::V4_1) {
        Some(QName::prefixed(
            config::prefix_for(SchemaKind::Ism),
            version.ism_namespace(),
            "pocType",
        ))
    } else if version.is_at_least(Version::V4_0_1) {
        Some(QName::prefixed(
            config::prefix_for(SchemaKind::Ddms),
            version.ddms_namespace(),
            "POCType",
        ))
    } else {
        None
    }
}

fn read_poc_types(element: &Element, version: Version) -> Vec<String> {
    let raw = if version.is_at_least(Version::V4_1) {
        element.attribute(Some(version.ism_namespace()), "pocType")
    } else {
        element.attribute(Some(version.ddms_namespace()), "POCType")
    };
    raw.map(split_list).unwrap_or_default()
}

impl ProducerRole {
    /// Parse a producer role element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let kind = ProducerRoleKind::from_local_name(element.local_name()).ok_or_else(|| {
            Error::invalid(format!(
                "Unexpected namespace URI and local name encountered: {}",
                element.qname.clark()
            ))
            .locate(&qname)
        })?;
        let entity = match element.children.first() {
            Some(child) if is_entity_element(child, version) => {
                Some(ProducerEntity::from_element(child.clone(), version).map_err(|e| e.locate(&qname))?)
            }
            Some(child) => {
                warn!(element = %qname, child = %child.qname.clark(), "skipping unrecognized producer entity");
                None
            }
            None => None,
        };
        let security_attributes =
            SecurityAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        Self {
            kind,
            entity,
            poc_types: read_poc_types(&element, version),
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from an entity, point-of-contact types and security attributes
    pub fn new(
        version: Version,
        kind: ProducerRoleKind,
        entity: ProducerEntity,
        poc_types: &[String],
        security_attributes: SecurityAttributes,
    ) -> Result<Self> {
        let mut element = ddms_element(version, kind.local_name());
        let qname = element.qualified_name();
        element.add_child(entity.component().element().clone());
        if !poc_types.is_empty() {
            let name = poc_type_qname(version).ok_or_else(|| {
                Error::invalid("This component cannot have a POCType until DDMS 4.0.1 or later.").locate(&qname)
            })?;
            element.set_attribute(name, xs_list(poc_types));
        }
        security_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&qname))?;
        Self {
            kind,
            entity: Some(entity),
            poc_types: poc_types.to_vec(),
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    fn validated(mut self) -> Result<Self> {
        let warnings = self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        for warning in warnings {
            self.base.warn(warning);
        }
        if let Some(entity) = self.entity.clone() {
            self.base.absorb(entity.component());
        }
        let attribute_warnings = self.security_attributes.warnings().to_vec();
        self.base.absorb_attributes(&attribute_warnings);
        Ok(self)
    }

    fn validate(&self) -> Result<Vec<String>> {
        let version = self.version();
        require_ddms_namespace(self.element(), version)?;
        let entity = self
            .entity
            .as_ref()
            .ok_or_else(|| Error::invalid("producer entity is required."))?;
        require_compatible(version, entity.component())?;
        let mut warnings = Vec::new();
        if !self.poc_types.is_empty() {
            if !version.is_at_least(Version::V4_0_1) {
                return Err(Error::invalid(
                    "This component cannot have a POCType until DDMS 4.0.1 or later.",
                ));
            }
            if version.is_at_least(Version::V4_1) {
                for poc_type in &self.poc_types {
                    if let Some(warning) = validate_enumeration(vocabulary::POC_TYPE, poc_type, version)? {
                        warnings.push(warning.text);
                    }
                }
            }
        }
        Ok(warnings)
    }

    /// Which role this is
    pub fn kind(&self) -> ProducerRoleKind {
        self.kind
    }

    /// The producing entity
    pub fn entity(&self) -> Option<&ProducerEntity> {
        self.entity.as_ref()
    }

    /// Point-of-contact types
    pub fn poc_types(&self) -> &[String] {
        &self.poc_types
    }
}

impl Component for ProducerRole {
    fn base(&self) -> &Base {
        &self.base
    }

    fn security_attributes(&self) -> Option<&SecurityAttributes> {
        Some(&self.security_attributes)
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let prefix = format!("{}.", output::build_prefix(prefix, self.name(), suffix));
        let mut text = self
            .entity
            .as_ref()
            .map(|e| e.component().output(html, &prefix, ""))
            .unwrap_or_default();
        text.push_str(&output::line(html, &format!("{}pocType", prefix), &xs_list(&self.poc_types)));
        text.push_str(&self.security_attributes.output(html, &prefix));
        text
    }
}

/// Which entity a role builder commits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntityType {
    /// Organization
    #[default]
    Organization,
    /// Person
    Person,
    /// Service
    Service,
    /// Unknown
    Unknown,
}

/// Staging form of [`ProducerRole`]. Only the entity selected by
/// `entity_type` is committed.
#[derive(Debug, Clone, PartialEq)]
pub struct ProducerRoleBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Role
    pub kind: ProducerRoleKind,
    /// Entity to commit
    pub entity_type: EntityType,
    /// Organization entity
    pub organization: OrganizationBuilder,
    /// Person entity
    pub person: PersonBuilder,
    /// Service or unknown entity
    pub named: NamedEntityBuilder,
    /// Point-of-contact types
    pub poc_types: Vec<String>,
    /// Security attributes
    pub security_attributes: SecurityAttributesBuilder,
}

impl ProducerRoleBuilder {
    /// An empty builder for one role
    pub fn new(kind: ProducerRoleKind) -> Self {
        Self {
            version: None,
            kind,
            entity_type: EntityType::default(),
            organization: OrganizationBuilder::default(),
            person: PersonBuilder::default(),
            named: NamedEntityBuilder::default(),
            poc_types: Vec::new(),
            security_attributes: SecurityAttributesBuilder::default(),
        }
    }

    fn commit_entity(&self, version: Version) -> Result<Option<ProducerEntity>> {
        Ok(match self.entity_type {
            EntityType::Organization => self
                .organization
                .commit_as(version)?
                .map(|o| ProducerEntity::Organization(Arc::new(o))),
            EntityType::Person => self
                .person
                .commit_as(version)?
                .map(|p| ProducerEntity::Person(Arc::new(p))),
            EntityType::Service | EntityType::Unknown => {
                let mut named = self.named.clone();
                named.kind = if self.entity_type == EntityType::Service {
                    NamedEntityKind::Service
                } else {
                    NamedEntityKind::Unknown
                };
                named.commit_as(version)?.map(|e| ProducerEntity::from(Arc::new(e)))
            }
        })
    }
}

impl Default for ProducerRoleBuilder {
    fn default() -> Self {
        Self::new(ProducerRoleKind::Creator)
    }
}

impl Builder for ProducerRoleBuilder {
    type Target = ProducerRole;

    fn is_empty(&self) -> bool {
        let entity_empty = match self.entity_type {
            EntityType::Organization => self.organization.is_empty(),
            EntityType::Person => self.person.is_empty(),
            EntityType::Service | EntityType::Unknown => self.named.is_empty(),
        };
        entity_empty
            && self.poc_types.iter().all(|p| p.trim().is_empty())
            && self.security_attributes.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<ProducerRole> {
        let entity = self.commit_entity(version)?.ok_or_else(|| {
            Error::invalid("producer entity is required.").locate(&format!(
                "{}:{}",
                config::prefix_for(SchemaKind::Ddms),
                self.kind.local_name()
            ))
        })?;
        let poc_types: Vec<String> = self.poc_types.iter().filter(|p| !p.trim().is_empty()).cloned().collect();
        ProducerRole::new(
            version,
            self.kind,
            entity,
            &poc_types,
            self.security_attributes.commit_as(version)?,
        )
    }
}

impl From<&ProducerRole> for ProducerRoleBuilder {
    fn from(role: &ProducerRole) -> Self {
        let mut builder = Self::new(role.kind);
        builder.version = Some(role.version());
        match &role.entity {
            Some(ProducerEntity::Organization(o)) => {
                builder.entity_type = EntityType::Organization;
                builder.organization = OrganizationBuilder::from(&**o);
            }
            Some(ProducerEntity::Person(p)) => {
                builder.entity_type = EntityType::Person;
                builder.person = PersonBuilder::from(&**p);
            }
            Some(ProducerEntity::Service(s)) => {
                builder.entity_type = EntityType::Service;
                builder.named = NamedEntityBuilder::from(&**s);
            }
            Some(ProducerEntity::Unknown(u)) => {
                builder.entity_type = EntityType::Unknown;
                builder.named = NamedEntityBuilder::from(&**u);
            }
            None => {}
        }
        builder.poc_types = role.poc_types.clone();
        builder.security_attributes = SecurityAttributesBuilder::from(&role.security_attributes);
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::parse_element;
    use crate::resource::entities::tests::contact;
    use pretty_assertions::assert_eq;

    fn organization(version: Version) -> ProducerEntity {
        ProducerEntity::Organization(Arc::new(
            Organization::new(version, contact(&["DISA"]), vec![], "").unwrap(),
        ))
    }

    #[test]
    fn test_creator_output() {
        let attrs = SecurityAttributes::classified(Version::V5_0, "U", &["USA"]).unwrap();
        let creator = ProducerRole::new(Version::V5_0, ProducerRoleKind::Creator, organization(Version::V5_0), &[], attrs).unwrap();
        assert_eq!(
            creator.to_text(),
            "creator.entityType: organization\ncreator.name: DISA\ncreator.phone: 703-882-1000\ncreator.email: ddms@fgm.com\ncreator.classification: U\ncreator.ownerProducer: USA\n"
        );
    }

    #[test]
    fn test_round_trip_with_poc_type() {
        let role = ProducerRole::new(
            Version::V4_1,
            ProducerRoleKind::PointOfContact,
            organization(Version::V4_1),
            &["DoD-Dist-B".to_string()],
            SecurityAttributes::empty(Version::V4_1),
        )
        .unwrap();
        assert!(role.to_xml().contains("ISM:pocType=\"DoD-Dist-B\""));
        let parsed = ProducerRole::from_element(parse_element(&role.to_xml()).unwrap(), Version::V4_1).unwrap();
        assert_eq!(parsed, role);
        assert_eq!(parsed.poc_types(), ["DoD-Dist-B".to_string()]);
    }

    #[test]
    fn test_poc_type_gated() {
        let err = ProducerRole::new(
            Version::V3_1,
            ProducerRoleKind::PointOfContact,
            organization(Version::V3_1),
            &["DoD-Dist-B".to_string()],
            SecurityAttributes::empty(Version::V3_1),
        )
        .unwrap_err();
        assert_eq!(
            err.message(),
            Some("This component cannot have a POCType until DDMS 4.0.1 or later.")
        );
    }

    #[test]
    fn test_entity_version_must_match() {
        let err = ProducerRole::new(
            Version::V5_0,
            ProducerRoleKind::Publisher,
            organization(Version::V4_1),
            &[],
            SecurityAttributes::empty(Version::V5_0),
        )
        .unwrap_err();
        assert!(err.message().unwrap().contains("different version of DDMS"));
    }

    #[test]
    fn test_missing_entity() {
        let element = parse_element(r#"<ddms:creator xmlns:ddms="urn:us:mil:ces:metadata:ddms:5" />"#).unwrap();
        let err = ProducerRole::from_element(element, Version::V5_0).unwrap_err();
        assert_eq!(err.message(), Some("producer entity is required."));
        assert_eq!(err.locator(), Some("/ddms:creator"));
    }

    #[test]
    fn test_unrecognized_entity_is_skipped() {
        let element = parse_element(
            r#"<ddms:creator xmlns:ddms="urn:us:mil:ces:metadata:ddms:5"><ddms:robot><ddms:name>R2</ddms:name></ddms:robot></ddms:creator>"#,
        )
        .unwrap();
        let err = ProducerRole::from_element(element, Version::V5_0).unwrap_err();
        assert_eq!(err.message(), Some("producer entity is required."));
    }

    #[test]
    fn test_nested_error_locator() {
        let element = parse_element(
            r#"<ddms:creator xmlns:ddms="urn:us:mil:ces:metadata:ddms:5"><ddms:person><ddms:name>Brian</ddms:name></ddms:person></ddms:creator>"#,
        )
        .unwrap();
        let err = ProducerRole::from_element(element, Version::V5_0).unwrap_err();
        assert_eq!(err.message(), Some("surname is required."));
        assert_eq!(err.locator(), Some("/ddms:creator/ddms:person"));
    }

    #[test]
    fn test_builder_commits_selected_entity() {
        let mut builder = ProducerRoleBuilder::new(ProducerRoleKind::Contributor);
        builder.version = Some(Version::V5_0);
        builder.organization.contact.names = vec!["ignored".to_string()];
        builder.entity_type = EntityType::Service;
        builder.named.contact.names = vec!["Service Name".to_string()];
        let role = builder.commit().unwrap().unwrap();
        assert!(matches!(role.entity(), Some(ProducerEntity::Service(_))));
        let round_trip = ProducerRoleBuilder::from(&role);
        assert_eq!(round_trip.entity_type, EntityType::Service);
        assert_eq!(round_trip.named.contact.names, vec!["Service Name".to_string()]);
    }
}
