//! Tasking roles: requester and addressee

use super::entities::{entity_name, is_entity_element, Organization, OrganizationBuilder, Person, PersonBuilder};
use super::producers::EntityType;
use crate::attributes::{SecurityAttributes, SecurityAttributesBuilder};
use crate::components::helpers::{ddms_element, require_compatible, require_ddms_namespace, require_version};
use crate::components::{output, Base, Builder, Component};
use crate::config;
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::versions::{SchemaKind, Version};
use std::sync::Arc;
use tracing::warn;

/// The entity behind a tasking role
#[derive(Debug, Clone, PartialEq)]
pub enum TaskingEntity {
    /// An organization
    Organization(Arc<Organization>),
    /// A person
    Person(Arc<Person>),
}

impl TaskingEntity {
    /// Parse an organization or person element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let name = element.local_name().to_string();
        if name == entity_name(version, "organization") {
            Organization::from_element(element, version).map(|o| TaskingEntity::Organization(Arc::new(o)))
        } else if name == entity_name(version, "person") {
            Person::from_element(element, version).map(|p| TaskingEntity::Person(Arc::new(p)))
        } else {
            Err(Error::invalid("The entity must be a person or an organization."))
        }
    }

    /// The entity as a component
    pub fn component(&self) -> &dyn Component {
        match self {
            TaskingEntity::Organization(o) => &**o,
            TaskingEntity::Person(p) => &**p,
        }
    }
}

/// Which tasking role this is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskingRoleKind {
    /// `ddms:requesterInfo`
    RequesterInfo,
    /// `ddms:addressee`
    Addressee,
}

impl TaskingRoleKind {
    /// Element local name
    pub fn local_name(&self) -> &'static str {
        match self {
            TaskingRoleKind::RequesterInfo => "requesterInfo",
            TaskingRoleKind::Addressee => "addressee",
        }
    }

    fn from_local_name(name: &str) -> Option<Self> {
        match name {
            "requesterInfo" => Some(TaskingRoleKind::RequesterInfo),
            "addressee" => Some(TaskingRoleKind::Addressee),
            _ => None,
        }
    }
}

/// Someone who requested or receives a tasking. DDMS 4.0.1 or later;
/// classification is required.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskingRole {
    base: Base,
    kind: TaskingRoleKind,
    entity: Option<TaskingEntity>,
    security_attributes: SecurityAttributes,
}

impl TaskingRole {
    /// Parse a `ddms:requesterInfo` or `ddms:addressee` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let kind = TaskingRoleKind::from_local_name(element.local_name()).ok_or_else(|| {
            Error::invalid(format!(
                "Unexpected namespace URI and local name encountered: {}",
                element.qname.clark()
            ))
            .locate(&qname)
        })?;
        let entity = match element.children.first() {
            Some(child) if is_entity_element(child, version) => {
                Some(TaskingEntity::from_element(child.clone(), version).map_err(|e| e.locate(&qname))?)
            }
            Some(child) => {
                warn!(element = %qname, child = %child.qname.clark(), "skipping unrecognized tasking entity");
                None
            }
            None => None,
        };
        let security_attributes =
            SecurityAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        Self {
            kind,
            entity,
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from an entity and security attributes
    pub fn new(
        version: Version,
        kind: TaskingRoleKind,
        entity: TaskingEntity,
        security_attributes: SecurityAttributes,
    ) -> Result<Self> {
        let mut element = ddms_element(version, kind.local_name());
        let qname = element.qualified_name();
        element.add_child(entity.component().element().clone());
        security_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&qname))?;
        Self {
            kind,
            entity: Some(entity),
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        if let Some(entity) = self.entity.clone() {
            self.base.absorb(entity.component());
        }
        let attribute_warnings = self.security_attributes.warnings().to_vec();
        self.base.absorb_attributes(&attribute_warnings);
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let version = self.version();
        require_ddms_namespace(self.element(), version)?;
        let entity = self
            .entity
            .as_ref()
            .ok_or_else(|| Error::invalid("entity is required."))?;
        require_compatible(version, entity.component())?;
        self.security_attributes.require_classification()?;
        require_version(version, Version::V4_0_1, &format!("ddms:{} element", self.kind.local_name()))
    }

    /// Which role this is
    pub fn kind(&self) -> TaskingRoleKind {
        self.kind
    }

    /// The entity
    pub fn entity(&self) -> Option<&TaskingEntity> {
        self.entity.as_ref()
    }
}

impl Component for TaskingRole {
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
        text.push_str(&self.security_attributes.output(html, &prefix));
        text
    }
}

/// Staging form of [`TaskingRole`]
#[derive(Debug, Clone, PartialEq)]
pub struct TaskingRoleBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Role
    pub kind: TaskingRoleKind,
    /// Organization or person; other entity types are rejected
    pub entity_type: EntityType,
    /// Organization entity
    pub organization: OrganizationBuilder,
    /// Person entity
    pub person: PersonBuilder,
    /// Security attributes
    pub security_attributes: SecurityAttributesBuilder,
}

impl TaskingRoleBuilder {
    /// An empty builder for one role
    pub fn new(kind: TaskingRoleKind) -> Self {
        Self {
            version: None,
            kind,
            entity_type: EntityType::Organization,
            organization: OrganizationBuilder::default(),
            person: PersonBuilder::default(),
            security_attributes: SecurityAttributesBuilder::default(),
        }
    }
}

impl Default for TaskingRoleBuilder {
    fn default() -> Self {
        Self::new(TaskingRoleKind::RequesterInfo)
    }
}

impl Builder for TaskingRoleBuilder {
    type Target = TaskingRole;

    fn is_empty(&self) -> bool {
        self.organization.is_empty() && self.person.is_empty() && self.security_attributes.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<TaskingRole> {
        let locator = format!("{}:{}", config::prefix_for(SchemaKind::Ddms), self.kind.local_name());
        let entity = match self.entity_type {
            EntityType::Organization => self
                .organization
                .commit_as(version)?
                .map(|o| TaskingEntity::Organization(Arc::new(o))),
            EntityType::Person => self.person.commit_as(version)?.map(|p| TaskingEntity::Person(Arc::new(p))),
            EntityType::Service | EntityType::Unknown => {
                return Err(Error::invalid("The entity must be a person or an organization.").locate(&locator))
            }
        }
        .ok_or_else(|| Error::invalid("entity is required.").locate(&locator))?;
        TaskingRole::new(version, self.kind, entity, self.security_attributes.commit_as(version)?)
    }
}

impl From<&TaskingRole> for TaskingRoleBuilder {
    fn from(role: &TaskingRole) -> Self {
        let mut builder = Self::new(role.kind);
        builder.version = Some(role.version());
        match &role.entity {
            Some(TaskingEntity::Organization(o)) => {
                builder.entity_type = EntityType::Organization;
                builder.organization = OrganizationBuilder::from(&**o);
            }
            Some(TaskingEntity::Person(p)) => {
                builder.entity_type = EntityType::Person;
                builder.person = PersonBuilder::from(&**p);
            }
            None => {}
        }
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

    fn classified(version: Version) -> SecurityAttributes {
        SecurityAttributes::classified(version, "U", &["USA"]).unwrap()
    }

    fn person(version: Version) -> TaskingEntity {
        TaskingEntity::Person(Arc::new(Person::new(version, contact(&["Brian"]), "Uri", "", "").unwrap()))
    }

    #[test]
    fn test_requester_output() {
        let role = TaskingRole::new(Version::V5_0, TaskingRoleKind::RequesterInfo, person(Version::V5_0), classified(Version::V5_0)).unwrap();
        let text = role.to_text();
        assert!(text.starts_with("requesterInfo.entityType: person\nrequesterInfo.name: Brian\nrequesterInfo.surname: Uri\n"));
        assert!(text.ends_with("requesterInfo.classification: U\nrequesterInfo.ownerProducer: USA\n"));
    }

    #[test]
    fn test_requires_4_0_1() {
        let err = TaskingRole::new(Version::V3_1, TaskingRoleKind::Addressee, person(Version::V3_1), classified(Version::V3_1)).unwrap_err();
        assert_eq!(
            err.message(),
            Some("The ddms:addressee element cannot be used until DDMS 4.0.1 or later.")
        );
    }

    #[test]
    fn test_requires_classification() {
        let err = TaskingRole::new(
            Version::V5_0,
            TaskingRoleKind::Addressee,
            person(Version::V5_0),
            SecurityAttributes::empty(Version::V5_0),
        )
        .unwrap_err();
        assert_eq!(err.message(), Some("classification is required."));
    }

    #[test]
    fn test_service_rejected() {
        let element = parse_element(
            r#"<ddms:addressee xmlns:ddms="urn:us:mil:ces:metadata:ddms:5" xmlns:ISM="urn:us:gov:ic:ism" ISM:classification="U" ISM:ownerProducer="USA"><ddms:service><ddms:name>s</ddms:name></ddms:service></ddms:addressee>"#,
        )
        .unwrap();
        let err = TaskingRole::from_element(element, Version::V5_0).unwrap_err();
        assert_eq!(err.message(), Some("The entity must be a person or an organization."));
        assert_eq!(err.locator(), Some("/ddms:addressee"));
    }

    #[test]
    fn test_builder_round_trip() {
        let role = TaskingRole::new(Version::V5_0, TaskingRoleKind::Addressee, person(Version::V5_0), classified(Version::V5_0)).unwrap();
        let rebuilt = TaskingRoleBuilder::from(&role).commit().unwrap().unwrap();
        assert_eq!(rebuilt, role);
    }
}
