//! Need-to-know access markings (DDMS 4.0.1 and later)
//!
//! `ntk:Access` lists the individuals, groups and profiles allowed to see a
//! resource. Each entry names a system and one or more values, and every
//! element carries its own ISM classification.

use crate::attributes::{SecurityAttributes, SecurityAttributesBuilder};
use crate::components::helpers::{require_compatible, require_schema_element, require_version, schema_element, set_schema_attribute};
use crate::components::{output, Base, Builder, BuilderList, Component};
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::names::validate_nmtoken;
use crate::versions::{SchemaKind, Version};
use std::sync::Arc;

fn ntk_namespace(version: Version, local_name: &str) -> Result<&'static str> {
    require_version(version, Version::V4_0_1, &format!("ntk:{} element", local_name))?;
    version.namespace_for(SchemaKind::Ntk)
}

/// The single-valued NTK elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NtkStringKind {
    /// `ntk:AccessSystemName`, an NMTOKEN
    SystemName,
    /// `ntk:AccessIndividualValue`
    IndividualValue,
    /// `ntk:AccessGroupValue`
    GroupValue,
    /// `ntk:AccessProfileValue`, which also names its vocabulary
    ProfileValue,
}

impl NtkStringKind {
    /// Element local name
    pub fn local_name(&self) -> &'static str {
        match self {
            NtkStringKind::SystemName => "AccessSystemName",
            NtkStringKind::IndividualValue => "AccessIndividualValue",
            NtkStringKind::GroupValue => "AccessGroupValue",
            NtkStringKind::ProfileValue => "AccessProfileValue",
        }
    }

    fn output_name(&self) -> &'static str {
        match self {
            NtkStringKind::SystemName => "systemName",
            NtkStringKind::IndividualValue => "individualValue",
            NtkStringKind::GroupValue => "groupValue",
            NtkStringKind::ProfileValue => "profileValue",
        }
    }

    fn from_local_name(name: &str) -> Option<Self> {
        [
            NtkStringKind::SystemName,
            NtkStringKind::IndividualValue,
            NtkStringKind::GroupValue,
            NtkStringKind::ProfileValue,
        ]
        .into_iter()
        .find(|kind| kind.local_name() == name)
    }
}

/// A system name or an individual, group or profile value
#[derive(Debug, Clone, PartialEq)]
pub struct NtkString {
    base: Base,
    kind: NtkStringKind,
    value: String,
    id: String,
    id_reference: String,
    qualifier: String,
    vocabulary: String,
    security_attributes: SecurityAttributes,
}

impl NtkString {
    /// Parse one of the NTK string elements
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let kind = NtkStringKind::from_local_name(element.local_name()).ok_or_else(|| {
            Error::invalid(format!(
                "Unexpected namespace URI and local name encountered: {}",
                element.qname.clark()
            ))
            .locate(&qname)
        })?;
        let namespace = ntk_namespace(version, kind.local_name()).map_err(|e| e.locate(&qname))?;
        let get = |name: &str| element.attribute_value(namespace, name).to_string();
        let (id, id_reference, qualifier, vocabulary) = (get("id"), get("IDReference"), get("qualifier"), get("vocabulary"));
        let security_attributes =
            SecurityAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        Self {
            kind,
            value: element.text().to_string(),
            id,
            id_reference,
            qualifier,
            vocabulary,
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from a value, its identifying attributes and security attributes.
    ///
    /// `vocabulary` is only meaningful for [`NtkStringKind::ProfileValue`].
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        version: Version,
        kind: NtkStringKind,
        value: &str,
        vocabulary: &str,
        id: &str,
        id_reference: &str,
        qualifier: &str,
        security_attributes: SecurityAttributes,
    ) -> Result<Self> {
        let qname = format!("{}:{}", crate::config::prefix_for(SchemaKind::Ntk), kind.local_name());
        ntk_namespace(version, kind.local_name()).map_err(|e| e.locate(&qname))?;
        let mut element = schema_element(version, SchemaKind::Ntk, kind.local_name())?;
        if !value.is_empty() {
            element.set_text(value);
        }
        for (name, attribute) in [
            ("id", id),
            ("IDReference", id_reference),
            ("qualifier", qualifier),
            ("vocabulary", vocabulary),
        ] {
            set_schema_attribute(&mut element, version, SchemaKind::Ntk, name, attribute)?;
        }
        security_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&qname))?;
        Self {
            kind,
            value: value.to_string(),
            id: id.to_string(),
            id_reference: id_reference.to_string(),
            qualifier: qualifier.to_string(),
            vocabulary: vocabulary.to_string(),
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// A system name with only security attributes
    pub fn system_name(version: Version, value: &str, security_attributes: SecurityAttributes) -> Result<Self> {
        Self::new(version, NtkStringKind::SystemName, value, "", "", "", "", security_attributes)
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        if self.kind != NtkStringKind::SystemName && self.value.is_empty() {
            self.base
                .warn(format!("A ntk:{} element was found with no value.", self.kind.local_name()));
        }
        let attribute_warnings = self.security_attributes.warnings().to_vec();
        self.base.absorb_attributes(&attribute_warnings);
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        require_schema_element(self.element(), self.version(), SchemaKind::Ntk, self.kind.local_name())?;
        if self.kind == NtkStringKind::SystemName {
            validate_nmtoken(&self.value)?;
        }
        if self.kind == NtkStringKind::ProfileValue {
            validate_nmtoken(&self.vocabulary)?;
        } else if !self.vocabulary.is_empty() {
            return Err(Error::invalid(
                "The vocabulary attribute can only be used on an ntk:AccessProfileValue element.",
            ));
        }
        self.security_attributes.require_classification()
    }

    /// Which element this is
    pub fn kind(&self) -> NtkStringKind {
        self.kind
    }

    /// The text value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// `ntk:vocabulary`, on profile values
    pub fn vocabulary(&self) -> &str {
        &self.vocabulary
    }

    /// `ntk:id`
    pub fn id(&self) -> &str {
        &self.id
    }

    /// `ntk:IDReference`
    pub fn id_reference(&self) -> &str {
        &self.id_reference
    }

    /// `ntk:qualifier`
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }
}

impl Component for NtkString {
    fn base(&self) -> &Base {
        &self.base
    }

    fn security_attributes(&self) -> Option<&SecurityAttributes> {
        Some(&self.security_attributes)
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let name = output::build_prefix(prefix, self.kind.output_name(), suffix);
        let mut text = output::line(html, &name, &self.value);
        text.push_str(&output::line(html, &format!("{}.vocabulary", name), &self.vocabulary));
        text.push_str(&output::line(html, &format!("{}.id", name), &self.id));
        text.push_str(&output::line(html, &format!("{}.idReference", name), &self.id_reference));
        text.push_str(&output::line(html, &format!("{}.qualifier", name), &self.qualifier));
        text.push_str(&self.security_attributes.output(html, &format!("{}.", name)));
        text
    }
}

/// Staging form of [`NtkString`]
#[derive(Debug, Clone, PartialEq)]
pub struct NtkStringBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Which element to build
    pub kind: NtkStringKind,
    /// Text value
    pub value: String,
    /// Vocabulary, for profile values
    pub vocabulary: String,
    /// `ntk:id`
    pub id: String,
    /// `ntk:IDReference`
    pub id_reference: String,
    /// `ntk:qualifier`
    pub qualifier: String,
    /// Security attributes
    pub security_attributes: SecurityAttributesBuilder,
}

impl NtkStringBuilder {
    /// An empty builder for one kind
    pub fn new(kind: NtkStringKind) -> Self {
        Self {
            version: None,
            kind,
            value: String::new(),
            vocabulary: String::new(),
            id: String::new(),
            id_reference: String::new(),
            qualifier: String::new(),
            security_attributes: SecurityAttributesBuilder::default(),
        }
    }

    fn build_as(&self, version: Version, kind: NtkStringKind) -> Result<NtkString> {
        NtkString::new(
            version,
            kind,
            &self.value,
            &self.vocabulary,
            &self.id,
            &self.id_reference,
            &self.qualifier,
            self.security_attributes.commit_as(version)?,
        )
    }
}

impl Default for NtkStringBuilder {
    fn default() -> Self {
        Self::new(NtkStringKind::SystemName)
    }
}

impl Builder for NtkStringBuilder {
    type Target = NtkString;

    fn is_empty(&self) -> bool {
        [&self.value, &self.vocabulary, &self.id, &self.id_reference, &self.qualifier]
            .iter()
            .all(|v| v.trim().is_empty())
            && self.security_attributes.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<NtkString> {
        self.build_as(version, self.kind)
    }
}

impl From<&NtkString> for NtkStringBuilder {
    fn from(component: &NtkString) -> Self {
        Self {
            version: Some(component.version()),
            kind: component.kind,
            value: component.value.clone(),
            vocabulary: component.vocabulary.clone(),
            id: component.id.clone(),
            id_reference: component.id_reference.clone(),
            qualifier: component.qualifier.clone(),
            security_attributes: SecurityAttributesBuilder::from(&component.security_attributes),
        }
    }
}

/// The entries of an access list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessEntityKind {
    /// `ntk:AccessIndividual`
    Individual,
    /// `ntk:AccessGroup`
    Group,
    /// `ntk:AccessProfile`
    Profile,
}

impl AccessEntityKind {
    /// Element local name
    pub fn local_name(&self) -> &'static str {
        match self {
            AccessEntityKind::Individual => "AccessIndividual",
            AccessEntityKind::Group => "AccessGroup",
            AccessEntityKind::Profile => "AccessProfile",
        }
    }

    /// The kind of value the entry holds
    pub fn value_kind(&self) -> NtkStringKind {
        match self {
            AccessEntityKind::Individual => NtkStringKind::IndividualValue,
            AccessEntityKind::Group => NtkStringKind::GroupValue,
            AccessEntityKind::Profile => NtkStringKind::ProfileValue,
        }
    }

    fn output_name(&self) -> &'static str {
        match self {
            AccessEntityKind::Individual => "individual",
            AccessEntityKind::Group => "group",
            AccessEntityKind::Profile => "profile",
        }
    }

    fn from_local_name(name: &str) -> Option<Self> {
        [AccessEntityKind::Individual, AccessEntityKind::Group, AccessEntityKind::Profile]
            .into_iter()
            .find(|kind| kind.local_name() == name)
    }
}

/// An individual, group or profile: a system name and its values
#[derive(Debug, Clone, PartialEq)]
pub struct AccessEntity {
    base: Base,
    kind: AccessEntityKind,
    system_name: Option<Arc<NtkString>>,
    values: Vec<Arc<NtkString>>,
    security_attributes: SecurityAttributes,
}

impl AccessEntity {
    /// Parse an `ntk:AccessIndividual`, `ntk:AccessGroup` or `ntk:AccessProfile`
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let kind = AccessEntityKind::from_local_name(element.local_name()).ok_or_else(|| {
            Error::invalid(format!(
                "Unexpected namespace URI and local name encountered: {}",
                element.qname.clark()
            ))
            .locate(&qname)
        })?;
        let namespace = ntk_namespace(version, kind.local_name()).map_err(|e| e.locate(&qname))?;
        let system_name = element
            .first_child(namespace, NtkStringKind::SystemName.local_name())
            .map(|child| NtkString::from_element(child.clone(), version).map(Arc::new))
            .transpose()
            .map_err(|e| e.locate(&qname))?;
        let values = element
            .children_named(namespace, kind.value_kind().local_name())
            .map(|child| NtkString::from_element(child.clone(), version).map(Arc::new))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.locate(&qname))?;
        let security_attributes =
            SecurityAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        Self {
            kind,
            system_name,
            values,
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from a system name and values
    pub fn new(
        version: Version,
        kind: AccessEntityKind,
        system_name: Option<Arc<NtkString>>,
        values: Vec<Arc<NtkString>>,
        security_attributes: SecurityAttributes,
    ) -> Result<Self> {
        let qname = format!("{}:{}", crate::config::prefix_for(SchemaKind::Ntk), kind.local_name());
        ntk_namespace(version, kind.local_name()).map_err(|e| e.locate(&qname))?;
        let mut element = schema_element(version, SchemaKind::Ntk, kind.local_name())?;
        if let Some(name) = &system_name {
            element.add_child(name.element().clone());
        }
        for value in &values {
            element.add_child(value.element().clone());
        }
        security_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&qname))?;
        Self {
            kind,
            system_name,
            values,
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        if let Some(name) = self.system_name.clone() {
            self.base.absorb(&*name);
        }
        for value in self.values.clone() {
            self.base.absorb(&*value);
        }
        let attribute_warnings = self.security_attributes.warnings().to_vec();
        self.base.absorb_attributes(&attribute_warnings);
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let version = self.version();
        require_schema_element(self.element(), version, SchemaKind::Ntk, self.kind.local_name())?;
        let system_name = self
            .system_name
            .as_ref()
            .ok_or_else(|| Error::invalid("systemName is required."))?;
        if system_name.kind() != NtkStringKind::SystemName {
            return Err(Error::invalid("The system name must be an ntk:AccessSystemName element."));
        }
        require_compatible(version, &**system_name)?;
        if self.values.is_empty() {
            return Err(Error::invalid(format!(
                "At least one {} value is required.",
                self.kind.output_name()
            )));
        }
        for value in &self.values {
            if value.kind() != self.kind.value_kind() {
                return Err(Error::invalid(format!(
                    "An ntk:{} element can only hold ntk:{} values.",
                    self.kind.local_name(),
                    self.kind.value_kind().local_name()
                )));
            }
            require_compatible(version, &**value)?;
        }
        self.security_attributes.require_classification()
    }

    /// Which entry this is
    pub fn kind(&self) -> AccessEntityKind {
        self.kind
    }

    /// The system name
    pub fn system_name(&self) -> Option<&Arc<NtkString>> {
        self.system_name.as_ref()
    }

    /// The values
    pub fn values(&self) -> &[Arc<NtkString>] {
        &self.values
    }
}

impl Component for AccessEntity {
    fn base(&self) -> &Base {
        &self.base
    }

    fn security_attributes(&self) -> Option<&SecurityAttributes> {
        Some(&self.security_attributes)
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let prefix = format!("{}.", output::build_prefix(prefix, self.kind.output_name(), suffix));
        let mut text = output::optional(html, &prefix, self.system_name.as_ref());
        text.push_str(&output::components(html, &prefix, &self.values));
        text.push_str(&self.security_attributes.output(html, &prefix));
        text
    }
}

/// Staging form of [`AccessEntity`]
#[derive(Debug, Clone, PartialEq)]
pub struct AccessEntityBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Which entry to build
    pub kind: AccessEntityKind,
    /// System name
    pub system_name: NtkStringBuilder,
    /// Values; their kind follows the entry's kind
    pub values: BuilderList<NtkStringBuilder>,
    /// Security attributes
    pub security_attributes: SecurityAttributesBuilder,
}

impl AccessEntityBuilder {
    /// An empty builder for one kind
    pub fn new(kind: AccessEntityKind) -> Self {
        Self {
            version: None,
            kind,
            system_name: NtkStringBuilder::default(),
            values: BuilderList::new(),
            security_attributes: SecurityAttributesBuilder::default(),
        }
    }

    fn build_as(&self, version: Version, kind: AccessEntityKind) -> Result<AccessEntity> {
        let system_name = if self.system_name.is_empty() {
            None
        } else {
            Some(Arc::new(self.system_name.build_as(version, NtkStringKind::SystemName)?))
        };
        let values = self
            .values
            .iter()
            .filter(|b| !b.is_empty())
            .map(|b| b.build_as(version, kind.value_kind()).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;
        AccessEntity::new(version, kind, system_name, values, self.security_attributes.commit_as(version)?)
    }
}

impl Default for AccessEntityBuilder {
    fn default() -> Self {
        Self::new(AccessEntityKind::Individual)
    }
}

impl Builder for AccessEntityBuilder {
    type Target = AccessEntity;

    fn is_empty(&self) -> bool {
        self.system_name.is_empty() && self.values.is_empty() && self.security_attributes.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<AccessEntity> {
        self.build_as(version, self.kind)
    }
}

impl From<&AccessEntity> for AccessEntityBuilder {
    fn from(entity: &AccessEntity) -> Self {
        Self {
            version: Some(entity.version()),
            kind: entity.kind,
            system_name: entity
                .system_name
                .as_deref()
                .map(NtkStringBuilder::from)
                .unwrap_or_default(),
            values: entity
                .values
                .iter()
                .map(|v| NtkStringBuilder::from(&**v))
                .collect::<Vec<_>>()
                .into(),
            security_attributes: SecurityAttributesBuilder::from(&entity.security_attributes),
        }
    }
}

/// `ntk:AccessProfileList`
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileList {
    base: Base,
    profiles: Vec<Arc<AccessEntity>>,
    security_attributes: SecurityAttributes,
}

const PROFILE_LIST: &str = "AccessProfileList";

impl ProfileList {
    /// Parse an `ntk:AccessProfileList` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let namespace = ntk_namespace(version, PROFILE_LIST).map_err(|e| e.locate(&qname))?;
        let profiles = element
            .children_named(namespace, AccessEntityKind::Profile.local_name())
            .map(|child| AccessEntity::from_element(child.clone(), version).map(Arc::new))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.locate(&qname))?;
        let security_attributes =
            SecurityAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        Self {
            profiles,
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from profiles
    pub fn new(version: Version, profiles: Vec<Arc<AccessEntity>>, security_attributes: SecurityAttributes) -> Result<Self> {
        let qname = format!("{}:{}", crate::config::prefix_for(SchemaKind::Ntk), PROFILE_LIST);
        ntk_namespace(version, PROFILE_LIST).map_err(|e| e.locate(&qname))?;
        let mut element = schema_element(version, SchemaKind::Ntk, PROFILE_LIST)?;
        for profile in &profiles {
            element.add_child(profile.element().clone());
        }
        security_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&qname))?;
        Self {
            profiles,
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        for profile in self.profiles.clone() {
            self.base.absorb(&*profile);
        }
        let attribute_warnings = self.security_attributes.warnings().to_vec();
        self.base.absorb_attributes(&attribute_warnings);
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        require_schema_element(self.element(), self.version(), SchemaKind::Ntk, PROFILE_LIST)?;
        if self.profiles.is_empty() {
            return Err(Error::invalid("At least one profile is required."));
        }
        for profile in &self.profiles {
            if profile.kind() != AccessEntityKind::Profile {
                return Err(Error::invalid("An ntk:AccessProfileList can only hold ntk:AccessProfile elements."));
            }
            require_compatible(self.version(), &**profile)?;
        }
        self.security_attributes.require_classification()
    }

    /// The profiles
    pub fn profiles(&self) -> &[Arc<AccessEntity>] {
        &self.profiles
    }
}

impl Component for ProfileList {
    fn base(&self) -> &Base {
        &self.base
    }

    fn security_attributes(&self) -> Option<&SecurityAttributes> {
        Some(&self.security_attributes)
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let prefix = format!("{}.", output::build_prefix(prefix, "profileList", suffix));
        let mut text = output::components(html, &prefix, &self.profiles);
        text.push_str(&self.security_attributes.output(html, &prefix));
        text
    }
}

/// Staging form of [`ProfileList`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileListBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Profiles
    pub profiles: BuilderList<AccessEntityBuilder>,
    /// Security attributes
    pub security_attributes: SecurityAttributesBuilder,
}

impl Builder for ProfileListBuilder {
    type Target = ProfileList;

    fn is_empty(&self) -> bool {
        self.profiles.is_empty() && self.security_attributes.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<ProfileList> {
        let profiles = build_entities(&self.profiles, version, AccessEntityKind::Profile)?;
        ProfileList::new(version, profiles, self.security_attributes.commit_as(version)?)
    }
}

impl From<&ProfileList> for ProfileListBuilder {
    fn from(list: &ProfileList) -> Self {
        Self {
            version: Some(list.version()),
            profiles: entity_builders(&list.profiles),
            security_attributes: SecurityAttributesBuilder::from(&list.security_attributes),
        }
    }
}

fn build_entities(
    builders: &BuilderList<AccessEntityBuilder>,
    version: Version,
    kind: AccessEntityKind,
) -> Result<Vec<Arc<AccessEntity>>> {
    builders
        .iter()
        .filter(|b| !b.is_empty())
        .map(|b| b.build_as(version, kind).map(Arc::new))
        .collect()
}

fn entity_builders(entities: &[Arc<AccessEntity>]) -> BuilderList<AccessEntityBuilder> {
    entities
        .iter()
        .map(|e| AccessEntityBuilder::from(&**e))
        .collect::<Vec<_>>()
        .into()
}

const ACCESS: &str = "Access";
const INDIVIDUAL_LIST: &str = "AccessIndividualList";
const GROUP_LIST: &str = "AccessGroupList";

/// `ntk:Access`, the need-to-know list of a security element
#[derive(Debug, Clone, PartialEq)]
pub struct Access {
    base: Base,
    individuals: Vec<Arc<AccessEntity>>,
    groups: Vec<Arc<AccessEntity>>,
    profile_list: Option<Arc<ProfileList>>,
    security_attributes: SecurityAttributes,
}

impl Access {
    /// Parse an `ntk:Access` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let namespace = ntk_namespace(version, ACCESS).map_err(|e| e.locate(&qname))?;
        let entries = |list: &str| -> Result<Vec<Arc<AccessEntity>>> {
            match element.first_child(namespace, list) {
                Some(list) => list
                    .children
                    .iter()
                    .map(|child| {
                        AccessEntity::from_element(child.clone(), version)
                            .map(Arc::new)
                            .map_err(|e| e.locate(&list.qualified_name()))
                    })
                    .collect(),
                None => Ok(Vec::new()),
            }
        };
        let individuals = entries(INDIVIDUAL_LIST).map_err(|e| e.locate(&qname))?;
        let groups = entries(GROUP_LIST).map_err(|e| e.locate(&qname))?;
        let profile_list = element
            .first_child(namespace, PROFILE_LIST)
            .map(|child| ProfileList::from_element(child.clone(), version).map(Arc::new))
            .transpose()
            .map_err(|e| e.locate(&qname))?;
        let security_attributes =
            SecurityAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        Self {
            individuals,
            groups,
            profile_list,
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from individuals, groups and a profile list
    pub fn new(
        version: Version,
        individuals: Vec<Arc<AccessEntity>>,
        groups: Vec<Arc<AccessEntity>>,
        profile_list: Option<Arc<ProfileList>>,
        security_attributes: SecurityAttributes,
    ) -> Result<Self> {
        let qname = format!("{}:{}", crate::config::prefix_for(SchemaKind::Ntk), ACCESS);
        ntk_namespace(version, ACCESS).map_err(|e| e.locate(&qname))?;
        let mut element = schema_element(version, SchemaKind::Ntk, ACCESS)?;
        for (list_name, entries) in [(INDIVIDUAL_LIST, &individuals), (GROUP_LIST, &groups)] {
            if !entries.is_empty() {
                let mut list = schema_element(version, SchemaKind::Ntk, list_name)?;
                for entry in entries {
                    list.add_child(entry.element().clone());
                }
                element.add_child(list);
            }
        }
        if let Some(profiles) = &profile_list {
            element.add_child(profiles.element().clone());
        }
        security_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&qname))?;
        Self {
            individuals,
            groups,
            profile_list,
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        if self.individuals.is_empty() && self.groups.is_empty() && self.profile_list.is_none() {
            self.base
                .warn("An ntk:Access element was found with no individual, group, or profile information.");
        }
        let children: Vec<Arc<dyn Component>> = self
            .individuals
            .iter()
            .chain(self.groups.iter())
            .map(|e| e.clone() as Arc<dyn Component>)
            .chain(self.profile_list.iter().map(|p| p.clone() as Arc<dyn Component>))
            .collect();
        for child in children {
            self.base.absorb(&*child);
        }
        let attribute_warnings = self.security_attributes.warnings().to_vec();
        self.base.absorb_attributes(&attribute_warnings);
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let version = self.version();
        require_schema_element(self.element(), version, SchemaKind::Ntk, ACCESS)?;
        for (kind, entries) in [
            (AccessEntityKind::Individual, &self.individuals),
            (AccessEntityKind::Group, &self.groups),
        ] {
            for entry in entries.iter() {
                if entry.kind() != kind {
                    return Err(Error::invalid(format!(
                        "Only ntk:{} elements can be listed here.",
                        kind.local_name()
                    )));
                }
                require_compatible(version, &**entry)?;
            }
        }
        if let Some(profiles) = &self.profile_list {
            require_compatible(version, &**profiles)?;
        }
        self.security_attributes.require_classification()
    }

    /// Individuals with access
    pub fn individuals(&self) -> &[Arc<AccessEntity>] {
        &self.individuals
    }

    /// Groups with access
    pub fn groups(&self) -> &[Arc<AccessEntity>] {
        &self.groups
    }

    /// Profiles with access
    pub fn profile_list(&self) -> Option<&Arc<ProfileList>> {
        self.profile_list.as_ref()
    }
}

impl Component for Access {
    fn base(&self) -> &Base {
        &self.base
    }

    fn security_attributes(&self) -> Option<&SecurityAttributes> {
        Some(&self.security_attributes)
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let prefix = format!("{}.", output::build_prefix(prefix, "access", suffix));
        let mut text = output::components(html, &format!("{}individualList.", prefix), &self.individuals);
        text.push_str(&output::components(html, &format!("{}groupList.", prefix), &self.groups));
        text.push_str(&output::optional(html, &prefix, self.profile_list.as_ref()));
        text.push_str(&self.security_attributes.output(html, &prefix));
        text
    }
}

/// Staging form of [`Access`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccessBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Individuals
    pub individuals: BuilderList<AccessEntityBuilder>,
    /// Groups
    pub groups: BuilderList<AccessEntityBuilder>,
    /// Profile list
    pub profile_list: ProfileListBuilder,
    /// Security attributes
    pub security_attributes: SecurityAttributesBuilder,
}

impl Builder for AccessBuilder {
    type Target = Access;

    fn is_empty(&self) -> bool {
        self.individuals.is_empty()
            && self.groups.is_empty()
            && self.profile_list.is_empty()
            && self.security_attributes.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<Access> {
        Access::new(
            version,
            build_entities(&self.individuals, version, AccessEntityKind::Individual)?,
            build_entities(&self.groups, version, AccessEntityKind::Group)?,
            self.profile_list.commit_as(version)?.map(Arc::new),
            self.security_attributes.commit_as(version)?,
        )
    }
}

impl From<&Access> for AccessBuilder {
    fn from(access: &Access) -> Self {
        Self {
            version: Some(access.version()),
            individuals: entity_builders(&access.individuals),
            groups: entity_builders(&access.groups),
            profile_list: access
                .profile_list
                .as_deref()
                .map(ProfileListBuilder::from)
                .unwrap_or_default(),
            security_attributes: SecurityAttributesBuilder::from(&access.security_attributes),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::documents::parse_element;
    use pretty_assertions::assert_eq;

    fn unclassified(version: Version) -> SecurityAttributes {
        SecurityAttributes::classified(version, "U", &["USA"]).unwrap()
    }

    fn value(version: Version, kind: NtkStringKind, text: &str, vocabulary: &str) -> Arc<NtkString> {
        Arc::new(NtkString::new(version, kind, text, vocabulary, "", "", "", unclassified(version)).unwrap())
    }

    fn entity(version: Version, kind: AccessEntityKind, text: &str) -> Arc<AccessEntity> {
        let vocabulary = if kind == AccessEntityKind::Profile { "vocabulary" } else { "" };
        Arc::new(
            AccessEntity::new(
                version,
                kind,
                Some(Arc::new(NtkString::system_name(version, "MDR", unclassified(version)).unwrap())),
                vec![value(version, kind.value_kind(), text, vocabulary)],
                unclassified(version),
            )
            .unwrap(),
        )
    }

    pub(crate) fn access(version: Version) -> Access {
        let profiles = ProfileList::new(
            version,
            vec![entity(version, AccessEntityKind::Profile, "profile")],
            unclassified(version),
        )
        .unwrap();
        Access::new(
            version,
            vec![entity(version, AccessEntityKind::Individual, "user_2321889:Doe_John_H")],
            vec![entity(version, AccessEntityKind::Group, "WISE/RODCA")],
            Some(Arc::new(profiles)),
            unclassified(version),
        )
        .unwrap()
    }

    #[test]
    fn test_access_output() {
        let access = access(Version::V4_1);
        let text = access.to_text();
        assert!(text.starts_with(
            "access.individualList.individual.systemName: MDR\n\
access.individualList.individual.systemName.classification: U\n"
        ));
        assert!(text.contains("access.individualList.individual.individualValue: user_2321889:Doe_John_H\n"));
        assert!(text.contains("access.groupList.group.groupValue: WISE/RODCA\n"));
        assert!(text.contains("access.profileList.profile.profileValue.vocabulary: vocabulary\n"));
        assert!(text.ends_with("access.classification: U\naccess.ownerProducer: USA\n"));
    }

    #[test]
    fn test_round_trip() {
        let access = access(Version::V5_0);
        let xml = access.to_xml();
        assert!(xml.starts_with("<ntk:Access xmlns:ntk=\"urn:us:gov:ic:ntk\""));
        let parsed = Access::from_element(parse_element(&xml).unwrap(), Version::V5_0).unwrap();
        assert_eq!(parsed, access);
        assert_eq!(AccessBuilder::from(&access).commit().unwrap().unwrap(), access);
    }

    #[test]
    fn test_gated_before_4_0_1() {
        let err = NtkString::system_name(Version::V3_1, "MDR", unclassified(Version::V3_1)).unwrap_err();
        assert_eq!(
            err.message(),
            Some("The ntk:AccessSystemName element cannot be used until DDMS 4.0.1 or later.")
        );
        assert_eq!(err.locator(), Some("/ntk:AccessSystemName"));
    }

    #[test]
    fn test_entity_rules() {
        let v = Version::V4_1;
        let err = AccessEntity::new(v, AccessEntityKind::Group, None, vec![], unclassified(v)).unwrap_err();
        assert_eq!(err.message(), Some("systemName is required."));
        let name = Arc::new(NtkString::system_name(v, "MDR", unclassified(v)).unwrap());
        let err = AccessEntity::new(v, AccessEntityKind::Group, Some(name), vec![], unclassified(v)).unwrap_err();
        assert_eq!(err.message(), Some("At least one group value is required."));
        let err = NtkString::system_name(v, "two words", unclassified(v)).unwrap_err();
        assert_eq!(err.message(), Some("\"two words\" is not a valid NMTOKEN."));
    }

    #[test]
    fn test_empty_access_warns() {
        let v = Version::V4_1;
        let access = Access::new(v, vec![], vec![], None, unclassified(v)).unwrap();
        assert_eq!(
            access.warnings()[0].text,
            "An ntk:Access element was found with no individual, group, or profile information."
        );
    }

    #[test]
    fn test_builder_forces_value_kind() {
        let v = Version::V4_1;
        let mut builder = AccessEntityBuilder::new(AccessEntityKind::Individual);
        builder.system_name.value = "MDR".to_string();
        builder.system_name.security_attributes.set("classification", "U").set("ownerProducer", "USA");
        builder.values.ensure_len(1);
        let slot = builder.values.get_mut(0).unwrap();
        slot.value = "Doe".to_string();
        slot.security_attributes.set("classification", "U").set("ownerProducer", "USA");
        builder.security_attributes.set("classification", "U").set("ownerProducer", "USA");
        let entity = builder.commit_as(v).unwrap().unwrap();
        assert_eq!(entity.values()[0].kind(), NtkStringKind::IndividualValue);
    }
}
