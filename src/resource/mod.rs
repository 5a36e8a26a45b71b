//! The resource aggregate and the resource-level components it holds
//!
//! A [`Resource`] is the root of every DDMS record. It keeps its top-level
//! components in one canonical order regardless of the order they were
//! supplied in, and that order drives XML, HTML and text output alike.

pub mod dates;
pub mod entities;
pub mod format;
pub mod management;
pub mod producers;
pub mod strings;
pub mod tasking;

pub use dates::{ApproximableDate, ApproximableDateBuilder, Dates, DatesBuilder};
pub use entities::{
    ContactInfo, NamedEntity, NamedEntityBuilder, NamedEntityKind, Organization, OrganizationBuilder, Person,
    PersonBuilder, SubOrganization, SubOrganizationBuilder,
};
pub use format::{Extent, ExtentBuilder, Format, FormatBuilder};
pub use management::{
    ManagedString, ManagedStringBuilder, ManagedStringKind, ProcessingInfo, ProcessingInfoBuilder, RecordKeeper,
    RecordKeeperBuilder, RecordsManagementInfo, RecordsManagementInfoBuilder, ResourceManagement,
    ResourceManagementBuilder, RevisionRecall, RevisionRecallBuilder, TaskId, TaskIdBuilder, TaskingInfo,
    TaskingInfoBuilder,
};
pub use producers::{EntityType, ProducerEntity, ProducerRole, ProducerRoleBuilder, ProducerRoleKind};
pub use strings::{
    Identifier, IdentifierBuilder, Language, LanguageBuilder, Rights, RightsBuilder, SimpleString,
    SimpleStringBuilder, SimpleStringKind, Source, SourceBuilder, Type, TypeBuilder,
};
pub use tasking::{TaskingEntity, TaskingRole, TaskingRoleBuilder, TaskingRoleKind};

use crate::attributes::{ExtensibleAttributes, NoticeAttributes, SecurityAttributes, SecurityAttributesBuilder};
use crate::components::helpers::{
    ddms_element, require_child_count, require_compatible, require_ddms_element,
    set_schema_attribute,
};
use crate::components::{output, Base, Builder, BuilderList, Component};
use crate::datatypes::{is_xs_date, parse_boolean};
use crate::documents::{Attribute, Element};
use crate::error::{Error, Result};
use crate::extensible::{ExtensibleElement, ExtensibleElementBuilder};
use crate::messages::ValidationMessage;
use crate::schematron::{self, SchematronEngine};
use crate::security::{Security, SecurityBuilder};
use crate::summary::related::related_resource_name;
use crate::summary::{
    GeospatialCoverage, GeospatialCoverageBuilder, RelatedResource, RelatedResourceBuilder, SubjectCoverage,
    SubjectCoverageBuilder, TemporalCoverage, TemporalCoverageBuilder, VirtualCoverage, VirtualCoverageBuilder,
};
use crate::versions::{SchemaKind, Version};
use crate::vocabulary::{classification_index, marking_system};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Name of the generator reported in HTML and text output
pub const GENERATOR: &str = concat!("ddms-rs ", env!("CARGO_PKG_VERSION"));

const RESOURCE_ELEMENT: &str = "resourceElement";
const CREATE_DATE: &str = "createDate";
const DES_VERSION: &str = "DESVersion";

/// `resource` from DDMS 4.0.1, `Resource` before
pub fn resource_name(version: Version) -> &'static str {
    if version.is_at_least(Version::V4_0_1) {
        "resource"
    } else {
        "Resource"
    }
}

/// A component that can sit directly under a resource.
///
/// The set is closed: anything outside the DDMS namespace is carried as an
/// [`ExtensibleElement`].
#[derive(Debug, Clone, PartialEq)]
pub enum TopLevelComponent {
    /// `ddms:identifier`
    Identifier(Arc<Identifier>),
    /// `ddms:title`, `ddms:subtitle` or `ddms:description`
    SimpleString(Arc<SimpleString>),
    /// `ddms:language`
    Language(Arc<Language>),
    /// `ddms:dates`
    Dates(Arc<Dates>),
    /// `ddms:rights`
    Rights(Arc<Rights>),
    /// `ddms:source`
    Source(Arc<Source>),
    /// `ddms:type`
    Type(Arc<Type>),
    /// A creator, publisher, contributor or point of contact
    Producer(Arc<ProducerRole>),
    /// `ddms:format`
    Format(Arc<Format>),
    /// `ddms:subjectCoverage`
    SubjectCoverage(Arc<SubjectCoverage>),
    /// `ddms:virtualCoverage`
    VirtualCoverage(Arc<VirtualCoverage>),
    /// `ddms:temporalCoverage`
    TemporalCoverage(Arc<TemporalCoverage>),
    /// `ddms:geospatialCoverage`
    GeospatialCoverage(Arc<GeospatialCoverage>),
    /// `ddms:relatedResource` (or `ddms:relatedResources` before 4.0.1)
    RelatedResource(Arc<RelatedResource>),
    /// `ddms:resourceManagement`, DDMS 4.0.1 or later
    ResourceManagement(Arc<ResourceManagement>),
    /// `ddms:security`
    Security(Arc<Security>),
    /// Anything outside the DDMS namespace
    Extensible(Arc<ExtensibleElement>),
}

macro_rules! top_level_from {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for TopLevelComponent {
                fn from(component: $ty) -> Self {
                    TopLevelComponent::$variant(Arc::new(component))
                }
            }

            impl From<Arc<$ty>> for TopLevelComponent {
                fn from(component: Arc<$ty>) -> Self {
                    TopLevelComponent::$variant(component)
                }
            }
        )*
    };
}

top_level_from! {
    Identifier => Identifier,
    SimpleString => SimpleString,
    Language => Language,
    Dates => Dates,
    Rights => Rights,
    Source => Source,
    Type => Type,
    Producer => ProducerRole,
    Format => Format,
    SubjectCoverage => SubjectCoverage,
    VirtualCoverage => VirtualCoverage,
    TemporalCoverage => TemporalCoverage,
    GeospatialCoverage => GeospatialCoverage,
    RelatedResource => RelatedResource,
    ResourceManagement => ResourceManagement,
    Security => Security,
    Extensible => ExtensibleElement,
}

impl TopLevelComponent {
    /// Dispatch a child of a resource element to its component type
    pub fn from_element(element: &Element, version: Version) -> Result<Self> {
        if element.namespace() != Some(version.ddms_namespace()) {
            return ExtensibleElement::from_element(element.clone(), version).map(Self::from);
        }
        let element = element.clone();
        let name = element.local_name().to_string();
        match name.as_str() {
            "identifier" => Identifier::from_element(element, version).map(Self::from),
            "title" | "subtitle" | "description" => SimpleString::from_element(element, version).map(Self::from),
            "language" => Language::from_element(element, version).map(Self::from),
            "dates" => Dates::from_element(element, version).map(Self::from),
            "rights" => Rights::from_element(element, version).map(Self::from),
            "source" => Source::from_element(element, version).map(Self::from),
            "type" => Type::from_element(element, version).map(Self::from),
            "format" => Format::from_element(element, version).map(Self::from),
            "subjectCoverage" => SubjectCoverage::from_element(element, version).map(Self::from),
            "virtualCoverage" => VirtualCoverage::from_element(element, version).map(Self::from),
            "temporalCoverage" => TemporalCoverage::from_element(element, version).map(Self::from),
            "geospatialCoverage" => GeospatialCoverage::from_element(element, version).map(Self::from),
            "resourceManagement" if version.is_at_least(Version::V4_0_1) => {
                ResourceManagement::from_element(element, version).map(Self::from)
            }
            "security" => Security::from_element(element, version).map(Self::from),
            other if other == related_resource_name(version) => {
                RelatedResource::from_element(element, version).map(Self::from)
            }
            other if ProducerRoleKind::from_local_name(other).is_some() => {
                ProducerRole::from_element(element, version).map(Self::from)
            }
            _ => Err(Error::invalid(format!(
                "{} is not a valid top-level component in a {}.",
                element.qualified_name(),
                resource_name(version)
            ))),
        }
    }

    /// The wrapped component
    pub fn component(&self) -> &dyn Component {
        match self {
            TopLevelComponent::Identifier(c) => &**c,
            TopLevelComponent::SimpleString(c) => &**c,
            TopLevelComponent::Language(c) => &**c,
            TopLevelComponent::Dates(c) => &**c,
            TopLevelComponent::Rights(c) => &**c,
            TopLevelComponent::Source(c) => &**c,
            TopLevelComponent::Type(c) => &**c,
            TopLevelComponent::Producer(c) => &**c,
            TopLevelComponent::Format(c) => &**c,
            TopLevelComponent::SubjectCoverage(c) => &**c,
            TopLevelComponent::VirtualCoverage(c) => &**c,
            TopLevelComponent::TemporalCoverage(c) => &**c,
            TopLevelComponent::GeospatialCoverage(c) => &**c,
            TopLevelComponent::RelatedResource(c) => &**c,
            TopLevelComponent::ResourceManagement(c) => &**c,
            TopLevelComponent::Security(c) => &**c,
            TopLevelComponent::Extensible(c) => &**c,
        }
    }

    /// Position in the canonical resource order
    pub fn rank(&self) -> usize {
        match self {
            TopLevelComponent::Identifier(_) => 0,
            TopLevelComponent::SimpleString(s) => match s.kind() {
                SimpleStringKind::Title => 1,
                SimpleStringKind::Subtitle => 2,
                SimpleStringKind::Description => 3,
            },
            TopLevelComponent::Language(_) => 4,
            TopLevelComponent::Dates(_) => 5,
            TopLevelComponent::Rights(_) => 6,
            TopLevelComponent::Source(_) => 7,
            TopLevelComponent::Type(_) => 8,
            TopLevelComponent::Producer(p) => match p.kind() {
                ProducerRoleKind::Creator => 9,
                ProducerRoleKind::Publisher => 10,
                ProducerRoleKind::Contributor => 11,
                ProducerRoleKind::PointOfContact => 12,
            },
            TopLevelComponent::Format(_) => 13,
            TopLevelComponent::SubjectCoverage(_) => 14,
            TopLevelComponent::VirtualCoverage(_) => 15,
            TopLevelComponent::TemporalCoverage(_) => 16,
            TopLevelComponent::GeospatialCoverage(_) => 17,
            TopLevelComponent::RelatedResource(_) => 18,
            TopLevelComponent::ResourceManagement(_) => 19,
            TopLevelComponent::Security(_) => 20,
            TopLevelComponent::Extensible(_) => 21,
        }
    }
}

/// Sort top-level components into canonical order, keeping the relative
/// order of components of the same kind.
pub fn populate_ordered_list(mut components: Vec<TopLevelComponent>) -> Vec<TopLevelComponent> {
    components.sort_by_key(TopLevelComponent::rank);
    components
}

/// The resource-level attributes that sit beside the security markings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceMarkings {
    /// `ISM:resourceElement`, required from DDMS 3.0
    pub resource_element: Option<bool>,
    /// `ISM:createDate` as an xs:date, required from DDMS 3.0
    pub create_date: String,
    /// `ISM:DESVersion`, required from DDMS 3.0
    pub ism_des_version: Option<i64>,
    /// `ntk:DESVersion`, required from DDMS 4.0.1
    pub ntk_des_version: Option<i64>,
}

impl ResourceMarkings {
    /// The markings a valid resource carries in `version`, with the given create date
    pub fn for_version(version: Version, create_date: &str) -> Self {
        if !version.is_at_least(Version::V3_0) {
            return Self::default();
        }
        let (ism, ntk) = fixed_des_versions(version);
        Self {
            resource_element: Some(true),
            create_date: create_date.to_string(),
            ism_des_version: Some(ism.unwrap_or(match version {
                Version::V3_0 => 2,
                _ => 5,
            })),
            ntk_des_version: ntk,
        }
    }
}

/// The DES versions a version pins, as `(ISM, ntk)`
pub fn fixed_des_versions(version: Version) -> (Option<i64>, Option<i64>) {
    match version {
        Version::V2_0 | Version::V3_0 => (None, None),
        Version::V3_1 => (Some(5), None),
        Version::V4_0_1 => (None, Some(5)),
        Version::V4_1 | Version::V5_0 => (Some(9), Some(7)),
    }
}

/// The root of a DDMS record
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    base: Base,
    components: Vec<TopLevelComponent>,
    markings: ResourceMarkings,
    security_attributes: SecurityAttributes,
    notice_attributes: NoticeAttributes,
    extensible_attributes: ExtensibleAttributes,
}

impl Resource {
    /// Parse a resource element, dispatching each child in document order
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        debug!(version = %version, "parsing {}", qname);
        let ism = version.ism_namespace();
        let des_version = |namespace: &str| -> Result<Option<i64>> {
            element
                .attribute(Some(namespace), DES_VERSION)
                .map(|value| {
                    value.trim().parse::<i64>().map_err(|_| {
                        Error::invalid(format!("The DESVersion must be an integer: {}", value))
                    })
                })
                .transpose()
        };
        let ism_des_version = des_version(ism).map_err(|e| e.locate(&qname))?;
        let ntk_des_version = match version.namespace_for(SchemaKind::Ntk) {
            Ok(ntk) => des_version(ntk).map_err(|e| e.locate(&qname))?,
            Err(_) => None,
        };
        let resource_element = match element.attribute(Some(ism), RESOURCE_ELEMENT) {
            Some(value) => Some(parse_boolean(value).ok_or_else(|| {
                Error::invalid("The resourceElement attribute must be a boolean.").locate(&qname)
            })?),
            None => None,
        };
        let markings = ResourceMarkings {
            resource_element,
            create_date: element.attribute_value(ism, CREATE_DATE).to_string(),
            ism_des_version,
            ntk_des_version,
        };

        let mut components = Vec::with_capacity(element.children.len());
        for child in &element.children {
            components.push(TopLevelComponent::from_element(child, version).map_err(|e| e.locate(&qname))?);
        }
        let security_attributes =
            SecurityAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        let notice_attributes = NoticeAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        let extensible_attributes =
            ExtensibleAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        Self {
            components: populate_ordered_list(components),
            markings,
            security_attributes,
            notice_attributes,
            extensible_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Parse XML text holding a resource. The version is taken from the
    /// namespace of the root element.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let element = crate::documents::parse_element(xml)?;
        let version = Version::for_namespace(element.namespace().unwrap_or(""))?;
        Self::from_element(element, version)
    }

    /// Build from top-level components in any order plus the resource attributes
    pub fn new(
        version: Version,
        components: Vec<TopLevelComponent>,
        markings: ResourceMarkings,
        security_attributes: SecurityAttributes,
        notice_attributes: NoticeAttributes,
        extensible_attributes: ExtensibleAttributes,
    ) -> Result<Self> {
        let mut element = ddms_element(version, resource_name(version));
        let qname = element.qualified_name();
        let located = |e: Error| e.locate(&qname);
        if let Some(flag) = markings.resource_element {
            set_schema_attribute(&mut element, version, SchemaKind::Ism, RESOURCE_ELEMENT, &flag.to_string())
                .map_err(located)?;
        }
        set_schema_attribute(&mut element, version, SchemaKind::Ism, CREATE_DATE, &markings.create_date)
            .map_err(located)?;
        if let Some(des) = markings.ism_des_version {
            set_schema_attribute(&mut element, version, SchemaKind::Ism, DES_VERSION, &des.to_string())
                .map_err(located)?;
        }
        if let Some(des) = markings.ntk_des_version {
            set_schema_attribute(&mut element, version, SchemaKind::Ntk, DES_VERSION, &des.to_string())
                .map_err(located)?;
        }
        security_attributes.add_to(&mut element, version).map_err(located)?;
        notice_attributes.add_to(&mut element, version).map_err(located)?;
        extensible_attributes.add_to(&mut element, version).map_err(located)?;

        let components = populate_ordered_list(components);
        for component in &components {
            element.add_child(component.component().element().clone());
        }
        Self {
            components,
            markings,
            security_attributes,
            notice_attributes,
            extensible_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        if self.security_attributes.is_empty() {
            self.base.warn(format!(
                "Security rollup validation is being skipped, because no classification exists on the {} itself.",
                self.qualified_name()
            ));
        }
        for component in &self.components {
            self.base.absorb(component.component());
        }
        let mut attribute_warnings = self.security_attributes.warnings().to_vec();
        attribute_warnings.extend_from_slice(self.notice_attributes.warnings());
        self.base.absorb_attributes(&attribute_warnings);
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let version = self.version();
        let element = self.element();
        require_ddms_element(element, version, resource_name(version))?;

        if version.is_at_least(Version::V3_0) {
            if self.markings.resource_element.is_none() {
                return Err(Error::invalid("resourceElement is required."));
            }
            if self.markings.create_date.is_empty() {
                return Err(Error::invalid("createDate is required."));
            }
            if !is_xs_date(&self.markings.create_date) {
                return Err(Error::invalid("The createDate must be in the xs:date format (YYYY-MM-DD)."));
            }
            let ism_des = self
                .markings
                .ism_des_version
                .ok_or_else(|| Error::invalid("DESVersion is required."))?;
            let (fixed_ism, fixed_ntk) = fixed_des_versions(version);
            if let Some(fixed) = fixed_ism {
                if ism_des != fixed {
                    return Err(Error::invalid(format!(
                        "The ISM:DESVersion must be {} in DDMS {} resources.",
                        fixed, version
                    )));
                }
            }
            if version.is_at_least(Version::V4_0_1) {
                let ntk_des = self
                    .markings
                    .ntk_des_version
                    .ok_or_else(|| Error::invalid("ntk:DESVersion is required."))?;
                if let Some(fixed) = fixed_ntk {
                    if ntk_des != fixed {
                        return Err(Error::invalid(format!(
                            "The ntk:DESVersion must be {} in DDMS {} resources.",
                            fixed, version
                        )));
                    }
                }
            }
            self.security_attributes.require_classification()?;
        }

        if self.identifiers().is_empty() {
            return Err(Error::invalid("At least 1 identifier is required."));
        }
        if self.titles().is_empty() {
            return Err(Error::invalid("At least 1 title is required."));
        }
        if self.producers().next().is_none() {
            return Err(Error::invalid(
                "At least 1 producer (creator, contributor, publisher, or pointOfContact) is required.",
            ));
        }
        for name in ["description", "dates", "rights", "format", "resourceManagement"] {
            require_child_count(element, name, 0, 1)?;
        }
        if version.is_at_least(Version::V4_0_1) {
            require_child_count(element, "subjectCoverage", 1, usize::MAX)?;
        } else {
            require_child_count(element, "subjectCoverage", 1, 1)?;
        }
        require_child_count(element, "security", 1, 1)?;

        let extensible_count = self.extensible_elements().count();
        if version == Version::V2_0 && extensible_count > 1 {
            return Err(Error::invalid("Only 1 extensible element is allowed in DDMS 2.0."));
        }
        if !self.security_attributes.is_empty() {
            self.validate_rollup()?;
        }
        for component in &self.components {
            if let TopLevelComponent::Extensible(_) = component {
                continue;
            }
            require_compatible(version, component.component())?;
        }
        Ok(())
    }

    /// A nested classification can be no more restrictive than the
    /// resource's, and must come from the same marking system.
    fn validate_rollup(&self) -> Result<()> {
        let parent = self.security_attributes.classification();
        let parent_index = classification_index(parent);
        for component in &self.components {
            if let TopLevelComponent::Security(_) = component {
                continue;
            }
            let child = match component.component().security_attributes() {
                Some(attributes) if !attributes.classification().is_empty() => attributes.classification(),
                _ => continue,
            };
            if let (Some(a), Some(b)) = (marking_system(parent), marking_system(child)) {
                if a != b {
                    return Err(Error::invalid(
                        "The security classification of a nested component is using a different marking system than the parent resource.",
                    ));
                }
            }
            let child_index = classification_index(child);
            if parent_index >= 0 && child_index > parent_index {
                return Err(Error::invalid(
                    "The security classification of a nested component is more restrictive than the classification of the resource.",
                ));
            }
        }
        Ok(())
    }

    /// Run an external Schematron pass over this resource.
    ///
    /// The resource is already valid; the messages returned never change that.
    pub fn validate_with_schematron(
        &self,
        engine: &dyn SchematronEngine,
        rules: &Path,
    ) -> Result<Vec<ValidationMessage>> {
        debug!(rules = %rules.display(), "running schematron rules");
        let report = engine.transform(rules, &self.to_xml())?;
        schematron::parse_svrl(&report)
    }

    /// Every top-level component, in canonical order
    pub fn top_level_components(&self) -> &[TopLevelComponent] {
        &self.components
    }

    /// The resource-level attributes
    pub fn markings(&self) -> &ResourceMarkings {
        &self.markings
    }

    /// `ISM:resourceElement`
    pub fn resource_element(&self) -> Option<bool> {
        self.markings.resource_element
    }

    /// `ISM:createDate`
    pub fn create_date(&self) -> &str {
        &self.markings.create_date
    }

    /// `ISM:DESVersion`
    pub fn ism_des_version(&self) -> Option<i64> {
        self.markings.ism_des_version
    }

    /// `ntk:DESVersion`
    pub fn ntk_des_version(&self) -> Option<i64> {
        self.markings.ntk_des_version
    }

    /// Notice attributes on the resource
    pub fn notice_attributes(&self) -> &NoticeAttributes {
        &self.notice_attributes
    }

    /// Foreign attributes on the resource
    pub fn extensible_attributes(&self) -> &ExtensibleAttributes {
        &self.extensible_attributes
    }

    /// The identifiers
    pub fn identifiers(&self) -> Vec<&Arc<Identifier>> {
        self.components
            .iter()
            .filter_map(|c| match c {
                TopLevelComponent::Identifier(i) => Some(i),
                _ => None,
            })
            .collect()
    }

    fn simple_strings(&self, kind: SimpleStringKind) -> Vec<&Arc<SimpleString>> {
        self.components
            .iter()
            .filter_map(|c| match c {
                TopLevelComponent::SimpleString(s) if s.kind() == kind => Some(s),
                _ => None,
            })
            .collect()
    }

    /// The titles
    pub fn titles(&self) -> Vec<&Arc<SimpleString>> {
        self.simple_strings(SimpleStringKind::Title)
    }

    /// The subtitles
    pub fn subtitles(&self) -> Vec<&Arc<SimpleString>> {
        self.simple_strings(SimpleStringKind::Subtitle)
    }

    /// The description, if any
    pub fn description(&self) -> Option<&Arc<SimpleString>> {
        self.simple_strings(SimpleStringKind::Description).into_iter().next()
    }

    /// Every producer, in canonical order
    pub fn producers(&self) -> impl Iterator<Item = &Arc<ProducerRole>> {
        self.components.iter().filter_map(|c| match c {
            TopLevelComponent::Producer(p) => Some(p),
            _ => None,
        })
    }

    /// Producers in one role
    pub fn producers_of(&self, kind: ProducerRoleKind) -> Vec<&Arc<ProducerRole>> {
        self.producers().filter(|p| p.kind() == kind).collect()
    }

    /// The subject coverages
    pub fn subject_coverages(&self) -> Vec<&Arc<SubjectCoverage>> {
        self.components
            .iter()
            .filter_map(|c| match c {
                TopLevelComponent::SubjectCoverage(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    /// The resource management element, DDMS 4.0.1 or later
    pub fn resource_management(&self) -> Option<&Arc<ResourceManagement>> {
        self.components.iter().find_map(|c| match c {
            TopLevelComponent::ResourceManagement(m) => Some(m),
            _ => None,
        })
    }

    /// The security element
    pub fn security(&self) -> Option<&Arc<Security>> {
        self.components.iter().find_map(|c| match c {
            TopLevelComponent::Security(s) => Some(s),
            _ => None,
        })
    }

    /// The extensible elements
    pub fn extensible_elements(&self) -> impl Iterator<Item = &Arc<ExtensibleElement>> {
        self.components.iter().filter_map(|c| match c {
            TopLevelComponent::Extensible(e) => Some(e),
            _ => None,
        })
    }
}

impl Component for Resource {
    fn base(&self) -> &Base {
        &self.base
    }

    fn security_attributes(&self) -> Option<&SecurityAttributes> {
        Some(&self.security_attributes)
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let prefix = output::build_prefix(prefix, "", suffix);
        let name = |local: &str| format!("{}{}", prefix, local);
        let mut text = String::new();
        if let Some(flag) = self.markings.resource_element {
            text.push_str(&output::line_always(html, &name(RESOURCE_ELEMENT), &flag.to_string()));
        }
        text.push_str(&output::line(html, &name(CREATE_DATE), &self.markings.create_date));
        if let Some(des) = self.markings.ism_des_version {
            text.push_str(&output::line_always(html, &name("ism.DESVersion"), &des.to_string()));
        }
        if let Some(des) = self.markings.ntk_des_version {
            text.push_str(&output::line_always(html, &name("ntk.DESVersion"), &des.to_string()));
        }
        text.push_str(&self.security_attributes.output(html, &prefix));
        text.push_str(&self.notice_attributes.output(html, &prefix));
        text.push_str(&self.extensible_attributes.output(html, &prefix));

        for (i, component) in self.components.iter().enumerate() {
            let component = component.component();
            let same: Vec<usize> = self
                .components
                .iter()
                .enumerate()
                .filter(|(_, c)| c.component().qualified_name() == component.qualified_name())
                .map(|(j, _)| j)
                .collect();
            let position = same.iter().position(|j| *j == i).unwrap_or(0);
            text.push_str(&component.output(html, &prefix, &output::index_suffix(position, same.len())));
        }

        let has_extensible = self.extensible_elements().next().is_some();
        text.push_str(&output::line_always(html, &name("extensible.layer"), &has_extensible.to_string()));
        text.push_str(&output::line_always(html, &name("ddms.generator"), GENERATOR));
        text.push_str(&output::line_always(html, &name("ddms.version"), &self.version().to_string()));
        text
    }
}

/// Staging form of [`Resource`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Identifiers
    pub identifiers: BuilderList<IdentifierBuilder>,
    /// Titles
    pub titles: BuilderList<SimpleStringBuilder>,
    /// Subtitles
    pub subtitles: BuilderList<SimpleStringBuilder>,
    /// Description
    pub description: SimpleStringBuilder,
    /// Languages
    pub languages: BuilderList<LanguageBuilder>,
    /// Dates
    pub dates: DatesBuilder,
    /// Rights
    pub rights: RightsBuilder,
    /// Sources
    pub sources: BuilderList<SourceBuilder>,
    /// Types
    pub types: BuilderList<TypeBuilder>,
    /// Creators
    pub creators: BuilderList<ProducerRoleBuilder>,
    /// Publishers
    pub publishers: BuilderList<ProducerRoleBuilder>,
    /// Contributors
    pub contributors: BuilderList<ProducerRoleBuilder>,
    /// Points of contact
    pub points_of_contact: BuilderList<ProducerRoleBuilder>,
    /// Format
    pub format: FormatBuilder,
    /// Subject coverages
    pub subject_coverages: BuilderList<SubjectCoverageBuilder>,
    /// Virtual coverages
    pub virtual_coverages: BuilderList<VirtualCoverageBuilder>,
    /// Temporal coverages
    pub temporal_coverages: BuilderList<TemporalCoverageBuilder>,
    /// Geospatial coverages
    pub geospatial_coverages: BuilderList<GeospatialCoverageBuilder>,
    /// Related resources
    pub related_resources: BuilderList<RelatedResourceBuilder>,
    /// Resource management
    pub resource_management: ResourceManagementBuilder,
    /// Security
    pub security: SecurityBuilder,
    /// Extensible elements
    pub extensible_elements: BuilderList<ExtensibleElementBuilder>,
    /// `ISM:resourceElement`, `ISM:createDate` and the DES versions
    pub markings: ResourceMarkings,
    /// Security attributes
    pub security_attributes: SecurityAttributesBuilder,
    /// `ISM:noticeType`
    pub notice_type: String,
    /// `ISM:noticeReason`
    pub notice_reason: String,
    /// `ISM:noticeDate`
    pub notice_date: String,
    /// `ISM:unregisteredNoticeType`
    pub unregistered_notice_type: String,
    /// `ISM:externalNotice`
    pub external_notice: Option<bool>,
    /// Foreign attributes
    pub extensible_attributes: Vec<Attribute>,
}

/// Commit a list after forcing a field that the parent decides, such as the
/// kind of a title or a producer role.
pub(crate) fn commit_with<B>(list: &BuilderList<B>, version: Version, adjust: impl Fn(&mut B)) -> Result<Vec<Arc<B::Target>>>
where
    B: Builder + Default + Clone,
{
    list.iter()
        .filter(|b| !b.is_empty())
        .map(|b| {
            let mut b = b.clone();
            adjust(&mut b);
            b.build(version).map(Arc::new)
        })
        .collect()
}

fn into_top_level<T>(items: Vec<Arc<T>>) -> impl Iterator<Item = TopLevelComponent>
where
    TopLevelComponent: From<Arc<T>>,
{
    items.into_iter().map(TopLevelComponent::from)
}

impl ResourceBuilder {
    fn notice_is_empty(&self) -> bool {
        [&self.notice_type, &self.notice_reason, &self.notice_date, &self.unregistered_notice_type]
            .iter()
            .all(|v| v.is_empty())
            && self.external_notice.is_none()
    }
}

impl Builder for ResourceBuilder {
    type Target = Resource;

    fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
            && self.titles.is_empty()
            && self.subtitles.is_empty()
            && self.description.is_empty()
            && self.languages.is_empty()
            && self.dates.is_empty()
            && self.rights.is_empty()
            && self.sources.is_empty()
            && self.types.is_empty()
            && self.creators.is_empty()
            && self.publishers.is_empty()
            && self.contributors.is_empty()
            && self.points_of_contact.is_empty()
            && self.format.is_empty()
            && self.subject_coverages.is_empty()
            && self.virtual_coverages.is_empty()
            && self.temporal_coverages.is_empty()
            && self.geospatial_coverages.is_empty()
            && self.related_resources.is_empty()
            && self.resource_management.is_empty()
            && self.security.is_empty()
            && self.extensible_elements.is_empty()
            && self.markings == ResourceMarkings::default()
            && self.security_attributes.is_empty()
            && self.notice_is_empty()
            && self.extensible_attributes.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<Resource> {
        let mut components: Vec<TopLevelComponent> = Vec::new();
        components.extend(into_top_level(self.identifiers.commit_all(version)?));
        for (list, kind) in [
            (&self.titles, SimpleStringKind::Title),
            (&self.subtitles, SimpleStringKind::Subtitle),
        ] {
            components.extend(into_top_level(commit_with(list, version, |b| b.kind = kind)?));
        }
        let mut description = self.description.clone();
        description.kind = SimpleStringKind::Description;
        components.extend(description.commit_as(version)?.map(TopLevelComponent::from));
        components.extend(into_top_level(self.languages.commit_all(version)?));
        components.extend(self.dates.commit_as(version)?.map(TopLevelComponent::from));
        components.extend(self.rights.commit_as(version)?.map(TopLevelComponent::from));
        components.extend(into_top_level(self.sources.commit_all(version)?));
        components.extend(into_top_level(self.types.commit_all(version)?));
        for (list, kind) in [
            (&self.creators, ProducerRoleKind::Creator),
            (&self.publishers, ProducerRoleKind::Publisher),
            (&self.contributors, ProducerRoleKind::Contributor),
            (&self.points_of_contact, ProducerRoleKind::PointOfContact),
        ] {
            components.extend(into_top_level(commit_with(list, version, |b| b.kind = kind)?));
        }
        components.extend(self.format.commit_as(version)?.map(TopLevelComponent::from));
        components.extend(into_top_level(self.subject_coverages.commit_all(version)?));
        components.extend(into_top_level(self.virtual_coverages.commit_all(version)?));
        components.extend(into_top_level(self.temporal_coverages.commit_all(version)?));
        components.extend(into_top_level(self.geospatial_coverages.commit_all(version)?));
        components.extend(into_top_level(self.related_resources.commit_all(version)?));
        components.extend(self.resource_management.commit_as(version)?.map(TopLevelComponent::from));
        components.extend(self.security.commit_as(version)?.map(TopLevelComponent::from));
        components.extend(into_top_level(self.extensible_elements.commit_all(version)?));

        let notice_attributes = if self.notice_is_empty() {
            NoticeAttributes::empty(version)
        } else {
            NoticeAttributes::new(
                version,
                &self.notice_type,
                &self.notice_reason,
                &self.notice_date,
                &self.unregistered_notice_type,
                self.external_notice,
            )?
        };
        let extensible_attributes = if self.extensible_attributes.is_empty() {
            ExtensibleAttributes::empty(version)
        } else {
            ExtensibleAttributes::new(version, self.extensible_attributes.clone())?
        };
        Resource::new(
            version,
            components,
            self.markings.clone(),
            self.security_attributes.commit_as(version)?,
            notice_attributes,
            extensible_attributes,
        )
    }
}

impl From<&Resource> for ResourceBuilder {
    fn from(resource: &Resource) -> Self {
        let mut builder = ResourceBuilder {
            version: Some(resource.version()),
            markings: resource.markings.clone(),
            security_attributes: SecurityAttributesBuilder::from(&resource.security_attributes),
            notice_type: resource.notice_attributes.notice_type().to_string(),
            notice_reason: resource.notice_attributes.notice_reason().to_string(),
            notice_date: resource.notice_attributes.notice_date().to_string(),
            unregistered_notice_type: resource.notice_attributes.unregistered_notice_type().to_string(),
            external_notice: resource.notice_attributes.external_notice(),
            extensible_attributes: resource.extensible_attributes.attributes().to_vec(),
            ..Default::default()
        };
        for component in &resource.components {
            match component {
                TopLevelComponent::Identifier(c) => builder.identifiers.push((&**c).into()),
                TopLevelComponent::SimpleString(c) => match c.kind() {
                    SimpleStringKind::Title => builder.titles.push((&**c).into()),
                    SimpleStringKind::Subtitle => builder.subtitles.push((&**c).into()),
                    SimpleStringKind::Description => builder.description = (&**c).into(),
                },
                TopLevelComponent::Language(c) => builder.languages.push((&**c).into()),
                TopLevelComponent::Dates(c) => builder.dates = (&**c).into(),
                TopLevelComponent::Rights(c) => builder.rights = (&**c).into(),
                TopLevelComponent::Source(c) => builder.sources.push((&**c).into()),
                TopLevelComponent::Type(c) => builder.types.push((&**c).into()),
                TopLevelComponent::Producer(c) => {
                    let list = match c.kind() {
                        ProducerRoleKind::Creator => &mut builder.creators,
                        ProducerRoleKind::Publisher => &mut builder.publishers,
                        ProducerRoleKind::Contributor => &mut builder.contributors,
                        ProducerRoleKind::PointOfContact => &mut builder.points_of_contact,
                    };
                    list.push((&**c).into());
                }
                TopLevelComponent::Format(c) => builder.format = (&**c).into(),
                TopLevelComponent::SubjectCoverage(c) => builder.subject_coverages.push((&**c).into()),
                TopLevelComponent::VirtualCoverage(c) => builder.virtual_coverages.push((&**c).into()),
                TopLevelComponent::TemporalCoverage(c) => builder.temporal_coverages.push((&**c).into()),
                TopLevelComponent::GeospatialCoverage(c) => builder.geospatial_coverages.push((&**c).into()),
                TopLevelComponent::RelatedResource(c) => builder.related_resources.push((&**c).into()),
                TopLevelComponent::ResourceManagement(c) => builder.resource_management = (&**c).into(),
                TopLevelComponent::Security(c) => builder.security = (&**c).into(),
                TopLevelComponent::Extensible(c) => builder.extensible_elements.push((&**c).into()),
            }
        }
        builder
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::documents::parse_element;
    use crate::resource::entities::tests::contact;
    use crate::summary::Keyword;
    use pretty_assertions::assert_eq;

    pub(crate) fn classified(version: Version, classification: &str) -> SecurityAttributes {
        SecurityAttributes::classified(version, classification, &["USA"]).unwrap()
    }

    pub(crate) fn components(version: Version, classification: &str) -> Vec<TopLevelComponent> {
        let keyword = Keyword::new(version, "DDMSence", SecurityAttributes::empty(version), ExtensibleAttributes::empty(version)).unwrap();
        let subject = SubjectCoverage::new(
            version,
            vec![Arc::new(keyword)],
            vec![],
            vec![],
            vec![],
            if version.is_at_least(Version::V3_0) {
                classified(version, "U")
            } else {
                SecurityAttributes::empty(version)
            },
        )
        .unwrap();
        let organization = Organization::new(version, contact(&["DISA"]), vec![], "").unwrap();
        let creator = ProducerRole::new(
            version,
            ProducerRoleKind::Creator,
            ProducerEntity::Organization(Arc::new(organization)),
            &[],
            classified(version, "U"),
        )
        .unwrap();
        vec![
            Security::new(version, None, None, classified(version, classification)).unwrap().into(),
            subject.into(),
            creator.into(),
            SimpleString::title(version, "DDMSence", classified(version, classification)).unwrap().into(),
            Identifier::new(version, "URI", "urn:buri:ddmsence:testIdentifier").unwrap().into(),
        ]
    }

    pub(crate) fn resource(version: Version) -> Resource {
        Resource::new(
            version,
            components(version, "U"),
            ResourceMarkings::for_version(version, "2010-01-21"),
            if version.is_at_least(Version::V3_0) {
                classified(version, "U")
            } else {
                SecurityAttributes::empty(version)
            },
            NoticeAttributes::empty(version),
            ExtensibleAttributes::empty(version),
        )
        .unwrap()
    }

    #[test]
    fn test_canonical_order() {
        let resource = resource(Version::V5_0);
        let names: Vec<String> = resource
            .top_level_components()
            .iter()
            .map(|c| c.component().name().to_string())
            .collect();
        assert_eq!(names, ["identifier", "title", "creator", "subjectCoverage", "security"]);
    }

    #[test]
    fn test_round_trip_all_versions() {
        for version in Version::ALL {
            let built = resource(version);
            let parsed = Resource::from_element(parse_element(&built.to_xml()).unwrap(), version).unwrap();
            assert_eq!(parsed, built);
            assert_eq!(parsed.to_text(), built.to_text());
            assert_eq!(ResourceBuilder::from(&built).commit().unwrap().unwrap(), built);
        }
    }

    #[test]
    fn test_output_trailer() {
        let text = resource(Version::V3_1).to_text();
        assert!(text.starts_with("resourceElement: true\ncreateDate: 2010-01-21\nism.DESVersion: 5\nclassification: U\n"));
        assert!(text.contains("identifier.qualifier: URI\n"));
        assert!(text.ends_with(&format!(
            "extensible.layer: false\nddms.generator: {}\nddms.version: 3.1\n",
            GENERATOR
        )));
    }

    #[test]
    fn test_rollup() {
        let v = Version::V5_0;
        let err = Resource::new(
            v,
            components(v, "TS"),
            ResourceMarkings::for_version(v, "2010-01-21"),
            classified(v, "S"),
            NoticeAttributes::empty(v),
            ExtensibleAttributes::empty(v),
        )
        .unwrap_err();
        assert!(err.message().unwrap().contains("is more restrictive than"));
        assert_eq!(err.locator(), Some("/ddms:resource"));

        assert!(Resource::new(
            v,
            components(v, "U"),
            ResourceMarkings::for_version(v, "2010-01-21"),
            classified(v, "S"),
            NoticeAttributes::empty(v),
            ExtensibleAttributes::empty(v),
        )
        .is_ok());
    }

    #[test]
    fn test_required_markings() {
        let v = Version::V4_1;
        let mut markings = ResourceMarkings::for_version(v, "2010-01-21");
        markings.ntk_des_version = Some(5);
        let err = Resource::new(
            v,
            components(v, "U"),
            markings,
            classified(v, "U"),
            NoticeAttributes::empty(v),
            ExtensibleAttributes::empty(v),
        )
        .unwrap_err();
        assert_eq!(err.message(), Some("The ntk:DESVersion must be 7 in DDMS 4.1 resources."));

        let err = Resource::new(
            v,
            components(v, "U"),
            ResourceMarkings::for_version(v, "2010"),
            classified(v, "U"),
            NoticeAttributes::empty(v),
            ExtensibleAttributes::empty(v),
        )
        .unwrap_err();
        assert_eq!(err.message(), Some("The createDate must be in the xs:date format (YYYY-MM-DD)."));
    }

    #[test]
    fn test_counts() {
        let v = Version::V3_1;
        let mut parts = components(v, "U");
        parts.retain(|c| !matches!(c, TopLevelComponent::Identifier(_)));
        let err = Resource::new(
            v,
            parts,
            ResourceMarkings::for_version(v, "2010-01-21"),
            classified(v, "U"),
            NoticeAttributes::empty(v),
            ExtensibleAttributes::empty(v),
        )
        .unwrap_err();
        assert_eq!(err.message(), Some("At least 1 identifier is required."));

        let mut parts = components(v, "U");
        parts.push(components(v, "U").remove(1));
        let err = Resource::new(
            v,
            parts,
            ResourceMarkings::for_version(v, "2010-01-21"),
            classified(v, "U"),
            NoticeAttributes::empty(v),
            ExtensibleAttributes::empty(v),
        )
        .unwrap_err();
        assert_eq!(err.message(), Some("Exactly 1 ddms:subjectCoverage element must exist."));
    }

    #[test]
    fn test_rollup_skipped_warning() {
        let resource = resource(Version::V2_0);
        assert_eq!(
            resource.warnings()[0].text,
            "Security rollup validation is being skipped, because no classification exists on the ddms:Resource itself."
        );
    }

    #[test]
    fn test_unknown_ddms_child() {
        let v = Version::V5_0;
        let mut element = resource(v).element().clone();
        element.add_child(crate::components::helpers::ddms_element(v, "unknownThing"));
        let err = Resource::from_element(element, v).unwrap_err();
        assert_eq!(
            err.message(),
            Some("ddms:unknownThing is not a valid top-level component in a resource.")
        );
    }

    #[test]
    fn test_mixed_versions_rejected() {
        let mut parts = components(Version::V5_0, "U");
        parts[4] = Identifier::new(Version::V4_1, "URI", "urn:x").unwrap().into();
        let err = Resource::new(
            Version::V5_0,
            parts,
            ResourceMarkings::for_version(Version::V5_0, "2010-01-21"),
            classified(Version::V5_0, "U"),
            NoticeAttributes::empty(Version::V5_0),
            ExtensibleAttributes::empty(Version::V5_0),
        )
        .unwrap_err();
        assert!(err.message().unwrap().contains("different version of DDMS"));
    }

    #[test]
    fn test_resource_management_slot() {
        let v = Version::V5_0;
        let mut parts = components(v, "U");
        parts.insert(0, management::tests::resource_management(v).into());
        let resource = Resource::new(
            v,
            parts,
            ResourceMarkings::for_version(v, "2010-01-21"),
            classified(v, "U"),
            NoticeAttributes::empty(v),
            ExtensibleAttributes::empty(v),
        )
        .unwrap();
        let names: Vec<String> = resource
            .top_level_components()
            .iter()
            .map(|c| c.component().name().to_string())
            .collect();
        assert_eq!(
            names,
            ["identifier", "title", "creator", "subjectCoverage", "resourceManagement", "security"]
        );
        assert!(resource.resource_management().is_some());
        assert!(resource
            .to_text()
            .contains("resourceManagement.processingInfo.dateProcessed: 2011-08-19
"));

        let parsed = Resource::from_element(parse_element(&resource.to_xml()).unwrap(), v).unwrap();
        assert_eq!(parsed, resource);
        assert_eq!(ResourceBuilder::from(&resource).commit().unwrap().unwrap(), resource);
    }

    #[test]
    fn test_resource_management_unknown_before_4_0_1() {
        let v = Version::V3_1;
        let mut element = resource(v).element().clone();
        element.add_child(crate::components::helpers::ddms_element(v, "resourceManagement"));
        let err = Resource::from_element(element, v).unwrap_err();
        assert_eq!(
            err.message(),
            Some("ddms:resourceManagement is not a valid top-level component in a Resource.")
        );
    }

    struct CannedEngine;

    impl SchematronEngine for CannedEngine {
        fn transform(&self, _rules: &Path, xml: &str) -> Result<String> {
            assert!(xml.contains("ddms:resource"));
            Ok(r#"<svrl:schematron-output xmlns:svrl="http://purl.oclc.org/dsdl/svrl"><svrl:failed-assert location="/*:resource[1]"><svrl:text>No.</svrl:text></svrl:failed-assert></svrl:schematron-output>"#.to_string())
        }
    }

    #[test]
    fn test_schematron_messages() {
        let messages = resource(Version::V5_0)
            .validate_with_schematron(&CannedEngine, Path::new("rules.sch"))
            .unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "No.");
    }
}
