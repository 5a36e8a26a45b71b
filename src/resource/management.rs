//! Resource management: tasking, processing history, revision recalls and
//! records management.
//!
//! Everything here is DDMS 4.0.1 or later and hangs off a single
//! `ddms:resourceManagement` element near the end of a resource.

use super::entities::{entity_name, Organization, OrganizationBuilder};
use super::strings::{SimpleString, SimpleStringBuilder, SimpleStringKind};
use super::tasking::{TaskingRole, TaskingRoleBuilder, TaskingRoleKind};
use super::commit_with;
use crate::attributes::{SecurityAttributes, SecurityAttributesBuilder, XLinkAttributes};
use crate::components::helpers::{
    add_ddms_text_child, child_text, ddms_element, ddms_text_element, own_attribute, require_child_count,
    require_compatible, require_ddms_element, require_value, require_version, set_ddms_attribute,
    set_schema_attribute,
};
use crate::components::{output, Base, Builder, BuilderList, Component};
use crate::datatypes::{parse_boolean, validate_ddms_date};
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::namespaces::QName;
use crate::summary::{Link, LinkBuilder};
use crate::versions::{SchemaKind, Version};
use crate::vocabulary::validate_network;
use std::sync::Arc;

const NETWORK: &str = "network";
const OTHER_NETWORK: &str = "otherNetwork";

/// Legal values of `ddms:revisionType`
pub const REVISION_TYPES: [&str; 4] = [
    "ADMINISTRATIVE RECALL",
    "ADMINISTRATIVE REVISION",
    "SUBSTANTIVE RECALL",
    "SUBSTANTIVE REVISION",
];

fn set_unqualified_attribute(element: &mut Element, local_name: &str, value: &str) {
    if !value.is_empty() {
        element.set_attribute(QName::local(local_name), value);
    }
}

fn unqualified_attribute(element: &Element, local_name: &str) -> String {
    element.attribute(None, local_name).unwrap_or("").to_string()
}

fn require_fixed_type(xlink: &XLinkAttributes, fixed: &str) -> Result<()> {
    if !xlink.link_type().is_empty() && xlink.link_type() != fixed {
        return Err(Error::invalid(format!(
            "The type attribute must have a fixed value of \"{}\".",
            fixed
        )));
    }
    Ok(())
}

/// The elements holding a single text value plus security markings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManagedStringKind {
    /// `ddms:applicationSoftware`
    #[default]
    ApplicationSoftware,
    /// `ddms:details`, inside a revision recall
    Details,
}

impl ManagedStringKind {
    /// Element local name
    pub fn local_name(&self) -> &'static str {
        match self {
            ManagedStringKind::ApplicationSoftware => "applicationSoftware",
            ManagedStringKind::Details => "details",
        }
    }

    fn from_local_name(name: &str) -> Option<Self> {
        match name {
            "applicationSoftware" => Some(ManagedStringKind::ApplicationSoftware),
            "details" => Some(ManagedStringKind::Details),
            _ => None,
        }
    }
}

/// Application software or the details of a revision recall
#[derive(Debug, Clone, PartialEq)]
pub struct ManagedString {
    base: Base,
    kind: ManagedStringKind,
    value: String,
    security_attributes: SecurityAttributes,
}

impl ManagedString {
    /// Parse a `ddms:applicationSoftware` or `ddms:details` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let kind = ManagedStringKind::from_local_name(element.local_name()).ok_or_else(|| {
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
        kind: ManagedStringKind,
        value: &str,
        security_attributes: SecurityAttributes,
    ) -> Result<Self> {
        let mut element = ddms_text_element(version, kind.local_name(), value);
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

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        let warn_empty = match self.kind {
            ManagedStringKind::ApplicationSoftware => !self.version().is_at_least(Version::V5_0),
            ManagedStringKind::Details => true,
        };
        if warn_empty && self.value.is_empty() {
            self.base.warn(format!(
                "A ddms:{} element was found with no value.",
                self.kind.local_name()
            ));
        }
        let attribute_warnings = self.security_attributes.warnings().to_vec();
        self.base.absorb_attributes(&attribute_warnings);
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let name = self.kind.local_name();
        require_ddms_element(self.element(), self.version(), name)?;
        self.security_attributes.require_classification()?;
        require_version(self.version(), Version::V4_0_1, &format!("ddms:{} element", name))
    }

    /// Which element this is
    pub fn kind(&self) -> ManagedStringKind {
        self.kind
    }

    /// The text value
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Component for ManagedString {
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

/// Staging form of [`ManagedString`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManagedStringBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Which element to build
    pub kind: ManagedStringKind,
    /// Text value
    pub value: String,
    /// Security attributes
    pub security_attributes: SecurityAttributesBuilder,
}

impl Builder for ManagedStringBuilder {
    type Target = ManagedString;

    fn is_empty(&self) -> bool {
        self.value.trim().is_empty() && self.security_attributes.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<ManagedString> {
        ManagedString::new(version, self.kind, &self.value, self.security_attributes.commit_as(version)?)
    }
}

impl From<&ManagedString> for ManagedStringBuilder {
    fn from(component: &ManagedString) -> Self {
        Self {
            version: Some(component.version()),
            kind: component.kind,
            value: component.value.clone(),
            security_attributes: SecurityAttributesBuilder::from(&component.security_attributes),
        }
    }
}

/// `ddms:taskID`, the identifier of a task in some tasking system
#[derive(Debug, Clone, PartialEq)]
pub struct TaskId {
    base: Base,
    value: String,
    tasking_system: String,
    network: String,
    other_network: String,
    xlink_attributes: XLinkAttributes,
}

/// `virt:network` from DDMS 5.0, unqualified before
fn task_network(element: &Element, version: Version) -> String {
    let namespace = version.namespace_for(SchemaKind::Virt).ok();
    element.attribute(namespace, NETWORK).unwrap_or("").to_string()
}

impl TaskId {
    /// Parse a `ddms:taskID` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let xlink_attributes = XLinkAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        Self {
            value: element.text().to_string(),
            tasking_system: own_attribute(&element, "taskingSystem").to_string(),
            network: task_network(&element, version),
            other_network: unqualified_attribute(&element, OTHER_NETWORK),
            xlink_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from a value, its tasking system, networks and simple-link attributes
    pub fn new(
        version: Version,
        value: &str,
        tasking_system: &str,
        network: &str,
        other_network: &str,
        xlink_attributes: XLinkAttributes,
    ) -> Result<Self> {
        let mut element = ddms_text_element(version, "taskID", value);
        let qname = element.qualified_name();
        set_ddms_attribute(&mut element, version, "taskingSystem", tasking_system);
        if version.is_at_least(Version::V5_0) {
            set_schema_attribute(&mut element, version, SchemaKind::Virt, NETWORK, network)
                .map_err(|e| e.locate(&qname))?;
        } else {
            set_unqualified_attribute(&mut element, NETWORK, network);
        }
        set_unqualified_attribute(&mut element, OTHER_NETWORK, other_network);
        xlink_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&qname))?;
        Self::from_element(element, version)
    }

    fn validated(self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let version = self.version();
        require_ddms_element(self.element(), version, "taskID")?;
        require_value("value", &self.value)?;
        require_fixed_type(&self.xlink_attributes, "simple")?;
        if !self.network.is_empty() {
            validate_network(&self.network)?;
        }
        if version.is_at_least(Version::V5_0) && !self.other_network.is_empty() {
            return Err(Error::invalid("The otherNetwork attribute cannot be used after DDMS 4.1."));
        }
        require_version(version, Version::V4_0_1, "ddms:taskID element")
    }

    /// The task identifier
    pub fn value(&self) -> &str {
        &self.value
    }

    /// `ddms:taskingSystem`
    pub fn tasking_system(&self) -> &str {
        &self.tasking_system
    }

    /// The network
    pub fn network(&self) -> &str {
        &self.network
    }

    /// A network outside the common list, before DDMS 5.0
    pub fn other_network(&self) -> &str {
        &self.other_network
    }

    /// The simple-link attributes
    pub fn xlink_attributes(&self) -> &XLinkAttributes {
        &self.xlink_attributes
    }
}

impl Component for TaskId {
    fn base(&self) -> &Base {
        &self.base
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let name = output::build_prefix(prefix, self.name(), suffix);
        let mut text = output::line(html, &name, &self.value);
        text.push_str(&output::line(html, &format!("{}.taskingSystem", name), &self.tasking_system));
        text.push_str(&output::line(html, &format!("{}.{}", name, NETWORK), &self.network));
        text.push_str(&output::line(html, &format!("{}.{}", name, OTHER_NETWORK), &self.other_network));
        text.push_str(&self.xlink_attributes.output(html, &format!("{}.", name)));
        text
    }
}

/// Staging form of [`TaskId`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskIdBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Task identifier
    pub value: String,
    /// `ddms:taskingSystem`
    pub tasking_system: String,
    /// Network
    pub network: String,
    /// Other network
    pub other_network: String,
    /// Link target
    pub href: String,
    /// Link role
    pub role: String,
    /// Link title
    pub title: String,
    /// Link arcrole
    pub arcrole: String,
    /// Link show behavior
    pub show: String,
    /// Link actuate behavior
    pub actuate: String,
}

impl TaskIdBuilder {
    fn link_is_empty(&self) -> bool {
        [&self.href, &self.role, &self.title, &self.arcrole, &self.show, &self.actuate]
            .iter()
            .all(|v| v.trim().is_empty())
    }
}

impl Builder for TaskIdBuilder {
    type Target = TaskId;

    fn is_empty(&self) -> bool {
        [&self.value, &self.tasking_system, &self.network, &self.other_network]
            .iter()
            .all(|v| v.trim().is_empty())
            && self.link_is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<TaskId> {
        let xlink = if self.link_is_empty() {
            XLinkAttributes::default()
        } else {
            XLinkAttributes::simple(version, &self.href, &self.role, &self.title, &self.arcrole, &self.show, &self.actuate)?
        };
        TaskId::new(version, &self.value, &self.tasking_system, &self.network, &self.other_network, xlink)
    }
}

impl From<&TaskId> for TaskIdBuilder {
    fn from(task: &TaskId) -> Self {
        let xlink = &task.xlink_attributes;
        Self {
            version: Some(task.version()),
            value: task.value.clone(),
            tasking_system: task.tasking_system.clone(),
            network: task.network.clone(),
            other_network: task.other_network.clone(),
            href: xlink.href().to_string(),
            role: xlink.role().to_string(),
            title: xlink.title().to_string(),
            arcrole: xlink.arcrole().to_string(),
            show: xlink.show().to_string(),
            actuate: xlink.actuate().to_string(),
        }
    }
}

/// `ddms:taskingInfo`: who asked for a task, who receives it, and its ID.
/// Classification is required.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskingInfo {
    base: Base,
    requester_infos: Vec<Arc<TaskingRole>>,
    addressees: Vec<Arc<TaskingRole>>,
    description: Option<Arc<SimpleString>>,
    task_id: Option<Arc<TaskId>>,
    security_attributes: SecurityAttributes,
}

impl TaskingInfo {
    /// Parse a `ddms:taskingInfo` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let namespace = version.ddms_namespace();
        let roles = |kind: TaskingRoleKind| -> Result<Vec<Arc<TaskingRole>>> {
            element
                .children_named(namespace, kind.local_name())
                .map(|c| TaskingRole::from_element(c.clone(), version).map(Arc::new))
                .collect()
        };
        let requester_infos = roles(TaskingRoleKind::RequesterInfo).map_err(|e| e.locate(&qname))?;
        let addressees = roles(TaskingRoleKind::Addressee).map_err(|e| e.locate(&qname))?;
        let description = element
            .first_child(namespace, SimpleStringKind::Description.local_name())
            .map(|c| SimpleString::from_element(c.clone(), version).map(Arc::new))
            .transpose()
            .map_err(|e| e.locate(&qname))?;
        let task_id = element
            .first_child(namespace, "taskID")
            .map(|c| TaskId::from_element(c.clone(), version).map(Arc::new))
            .transpose()
            .map_err(|e| e.locate(&qname))?;
        let security_attributes =
            SecurityAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        Self {
            requester_infos,
            addressees,
            description,
            task_id,
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from its roles, an optional description and the task ID
    pub fn new(
        version: Version,
        requester_infos: Vec<Arc<TaskingRole>>,
        addressees: Vec<Arc<TaskingRole>>,
        description: Option<Arc<SimpleString>>,
        task_id: Arc<TaskId>,
        security_attributes: SecurityAttributes,
    ) -> Result<Self> {
        let mut element = ddms_element(version, "taskingInfo");
        for role in requester_infos.iter().chain(addressees.iter()) {
            element.add_child(role.element().clone());
        }
        if let Some(description) = &description {
            element.add_child(description.element().clone());
        }
        element.add_child(task_id.element().clone());
        security_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&element.qualified_name()))?;
        Self {
            requester_infos,
            addressees,
            description,
            task_id: Some(task_id),
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        for role in self.requester_infos.clone().iter().chain(self.addressees.clone().iter()) {
            self.base.absorb(&**role);
        }
        if let Some(description) = self.description.clone() {
            self.base.absorb(&*description);
        }
        if let Some(task_id) = self.task_id.clone() {
            self.base.absorb(&*task_id);
        }
        let attribute_warnings = self.security_attributes.warnings().to_vec();
        self.base.absorb_attributes(&attribute_warnings);
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let version = self.version();
        let element = self.element();
        require_ddms_element(element, version, "taskingInfo")?;
        require_child_count(element, "description", 0, 1)?;
        require_child_count(element, "taskID", 1, 1)?;
        for role in self.requester_infos.iter().chain(self.addressees.iter()) {
            require_compatible(version, &**role)?;
        }
        if let Some(description) = &self.description {
            require_compatible(version, &**description)?;
        }
        if let Some(task_id) = &self.task_id {
            require_compatible(version, &**task_id)?;
        }
        self.security_attributes.require_classification()?;
        require_version(version, Version::V4_0_1, "ddms:taskingInfo element")
    }

    /// The requesters
    pub fn requester_infos(&self) -> &[Arc<TaskingRole>] {
        &self.requester_infos
    }

    /// The addressees
    pub fn addressees(&self) -> &[Arc<TaskingRole>] {
        &self.addressees
    }

    /// The description, if any
    pub fn description(&self) -> Option<&Arc<SimpleString>> {
        self.description.as_ref()
    }

    /// The task ID
    pub fn task_id(&self) -> Option<&Arc<TaskId>> {
        self.task_id.as_ref()
    }
}

impl Component for TaskingInfo {
    fn base(&self) -> &Base {
        &self.base
    }

    fn security_attributes(&self) -> Option<&SecurityAttributes> {
        Some(&self.security_attributes)
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let prefix = format!("{}.", output::build_prefix(prefix, self.name(), suffix));
        let mut text = output::components(html, &prefix, &self.requester_infos);
        text.push_str(&output::components(html, &prefix, &self.addressees));
        text.push_str(&output::optional(html, &prefix, self.description.as_ref()));
        text.push_str(&output::optional(html, &prefix, self.task_id.as_ref()));
        text.push_str(&self.security_attributes.output(html, &prefix));
        text
    }
}

/// Staging form of [`TaskingInfo`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskingInfoBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Requesters
    pub requester_infos: BuilderList<TaskingRoleBuilder>,
    /// Addressees
    pub addressees: BuilderList<TaskingRoleBuilder>,
    /// Description
    pub description: SimpleStringBuilder,
    /// Task ID
    pub task_id: TaskIdBuilder,
    /// Security attributes
    pub security_attributes: SecurityAttributesBuilder,
}

impl Builder for TaskingInfoBuilder {
    type Target = TaskingInfo;

    fn is_empty(&self) -> bool {
        self.requester_infos.is_empty()
            && self.addressees.is_empty()
            && self.description.is_empty()
            && self.task_id.is_empty()
            && self.security_attributes.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<TaskingInfo> {
        let requester_infos = commit_with(&self.requester_infos, version, |b| b.kind = TaskingRoleKind::RequesterInfo)?;
        let addressees = commit_with(&self.addressees, version, |b| b.kind = TaskingRoleKind::Addressee)?;
        let mut description = self.description.clone();
        description.kind = SimpleStringKind::Description;
        let task_id = self.task_id.commit_as(version)?.ok_or_else(|| {
            Error::invalid("Exactly 1 ddms:taskID element must exist.").locate("ddms:taskingInfo")
        })?;
        TaskingInfo::new(
            version,
            requester_infos,
            addressees,
            description.commit_as(version)?.map(Arc::new),
            Arc::new(task_id),
            self.security_attributes.commit_as(version)?,
        )
    }
}

impl From<&TaskingInfo> for TaskingInfoBuilder {
    fn from(info: &TaskingInfo) -> Self {
        Self {
            version: Some(info.version()),
            requester_infos: info.requester_infos.iter().map(|r| TaskingRoleBuilder::from(&**r)).collect::<Vec<_>>().into(),
            addressees: info.addressees.iter().map(|r| TaskingRoleBuilder::from(&**r)).collect::<Vec<_>>().into(),
            description: info
                .description
                .as_ref()
                .map(|d| SimpleStringBuilder::from(&**d))
                .unwrap_or_else(|| SimpleStringBuilder::new(SimpleStringKind::Description)),
            task_id: info.task_id.as_ref().map(|t| TaskIdBuilder::from(&**t)).unwrap_or_default(),
            security_attributes: SecurityAttributesBuilder::from(&info.security_attributes),
        }
    }
}

/// `ddms:processingInfo`: one step in the processing history of a resource
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingInfo {
    base: Base,
    value: String,
    date_processed: String,
    security_attributes: SecurityAttributes,
}

impl ProcessingInfo {
    /// Parse a `ddms:processingInfo` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let security_attributes =
            SecurityAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        Self {
            value: element.text().to_string(),
            date_processed: own_attribute(&element, "dateProcessed").to_string(),
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from a description of the step and the date it happened
    pub fn new(
        version: Version,
        value: &str,
        date_processed: &str,
        security_attributes: SecurityAttributes,
    ) -> Result<Self> {
        let mut element = ddms_text_element(version, "processingInfo", value);
        let qname = element.qualified_name();
        set_ddms_attribute(&mut element, version, "dateProcessed", date_processed);
        security_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&qname))?;
        Self {
            value: value.to_string(),
            date_processed: date_processed.to_string(),
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        if self.value.is_empty() {
            self.base.warn("A ddms:processingInfo element was found with no value.");
        }
        let attribute_warnings = self.security_attributes.warnings().to_vec();
        self.base.absorb_attributes(&attribute_warnings);
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        require_ddms_element(self.element(), self.version(), "processingInfo")?;
        require_value("dateProcessed", &self.date_processed)?;
        validate_ddms_date(&self.date_processed)?;
        self.security_attributes.require_classification()?;
        require_version(self.version(), Version::V4_0_1, "ddms:processingInfo element")
    }

    /// What was done
    pub fn value(&self) -> &str {
        &self.value
    }

    /// `ddms:dateProcessed`
    pub fn date_processed(&self) -> &str {
        &self.date_processed
    }
}

impl Component for ProcessingInfo {
    fn base(&self) -> &Base {
        &self.base
    }

    fn security_attributes(&self) -> Option<&SecurityAttributes> {
        Some(&self.security_attributes)
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let name = output::build_prefix(prefix, self.name(), suffix);
        let mut text = output::line(html, &name, &self.value);
        text.push_str(&output::line(html, &format!("{}.dateProcessed", name), &self.date_processed));
        text.push_str(&self.security_attributes.output(html, &format!("{}.", name)));
        text
    }
}

/// Staging form of [`ProcessingInfo`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessingInfoBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// What was done
    pub value: String,
    /// When it was done
    pub date_processed: String,
    /// Security attributes
    pub security_attributes: SecurityAttributesBuilder,
}

impl Builder for ProcessingInfoBuilder {
    type Target = ProcessingInfo;

    fn is_empty(&self) -> bool {
        self.value.trim().is_empty() && self.date_processed.trim().is_empty() && self.security_attributes.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<ProcessingInfo> {
        ProcessingInfo::new(version, &self.value, &self.date_processed, self.security_attributes.commit_as(version)?)
    }
}

impl From<&ProcessingInfo> for ProcessingInfoBuilder {
    fn from(info: &ProcessingInfo) -> Self {
        Self {
            version: Some(info.version()),
            value: info.value.clone(),
            date_processed: info.date_processed.clone(),
            security_attributes: SecurityAttributesBuilder::from(&info.security_attributes),
        }
    }
}

/// `ddms:revisionRecall`: notice that a resource was revised or recalled.
///
/// The reason is given either as text or as nested links and details, never
/// both.
#[derive(Debug, Clone, PartialEq)]
pub struct RevisionRecall {
    base: Base,
    value: String,
    revision_id: Option<i64>,
    revision_type: String,
    network: String,
    other_network: String,
    links: Vec<Arc<Link>>,
    details: Vec<Arc<ManagedString>>,
    xlink_attributes: XLinkAttributes,
    security_attributes: SecurityAttributes,
}

impl RevisionRecall {
    /// Parse a `ddms:revisionRecall` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let located = |e: Error| e.locate(&qname);
        let namespace = version.ddms_namespace();
        let links = element
            .children_named(namespace, "link")
            .map(|c| Link::from_element(c.clone(), version).map(Arc::new))
            .collect::<Result<Vec<_>>>()
            .map_err(located)?;
        let details = element
            .children_named(namespace, ManagedStringKind::Details.local_name())
            .map(|c| ManagedString::from_element(c.clone(), version).map(Arc::new))
            .collect::<Result<Vec<_>>>()
            .map_err(located)?;
        let revision_id = match element.attribute(Some(namespace), "revisionID") {
            Some(value) => Some(value.trim().parse::<i64>().map_err(|_| {
                located(Error::invalid(format!("The revisionID must be an integer: {}", value)))
            })?),
            None => None,
        };
        let xlink_attributes = XLinkAttributes::from_element(&element, version).map_err(located)?;
        let security_attributes = SecurityAttributes::from_element(&element, version).map_err(located)?;
        Self {
            value: element.text().to_string(),
            revision_id,
            revision_type: own_attribute(&element, "revisionType").to_string(),
            network: unqualified_attribute(&element, NETWORK),
            other_network: unqualified_attribute(&element, OTHER_NETWORK),
            links,
            details,
            xlink_attributes,
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build a recall whose reason is plain text
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        version: Version,
        value: &str,
        revision_id: i64,
        revision_type: &str,
        network: &str,
        other_network: &str,
        xlink_attributes: XLinkAttributes,
        security_attributes: SecurityAttributes,
    ) -> Result<Self> {
        Self::assemble(
            version,
            value,
            Vec::new(),
            Vec::new(),
            revision_id,
            revision_type,
            network,
            other_network,
            xlink_attributes,
            security_attributes,
        )
    }

    /// Build a recall whose reason is a set of links and details
    #[allow(clippy::too_many_arguments)]
    pub fn with_nested(
        version: Version,
        links: Vec<Arc<Link>>,
        details: Vec<Arc<ManagedString>>,
        revision_id: i64,
        revision_type: &str,
        network: &str,
        other_network: &str,
        xlink_attributes: XLinkAttributes,
        security_attributes: SecurityAttributes,
    ) -> Result<Self> {
        Self::assemble(
            version,
            "",
            links,
            details,
            revision_id,
            revision_type,
            network,
            other_network,
            xlink_attributes,
            security_attributes,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        version: Version,
        value: &str,
        links: Vec<Arc<Link>>,
        details: Vec<Arc<ManagedString>>,
        revision_id: i64,
        revision_type: &str,
        network: &str,
        other_network: &str,
        xlink_attributes: XLinkAttributes,
        security_attributes: SecurityAttributes,
    ) -> Result<Self> {
        let mut element = ddms_text_element(version, "revisionRecall", value);
        let qname = element.qualified_name();
        for link in &links {
            element.add_child(link.element().clone());
        }
        for detail in &details {
            element.add_child(detail.element().clone());
        }
        set_ddms_attribute(&mut element, version, "revisionID", &revision_id.to_string());
        set_ddms_attribute(&mut element, version, "revisionType", revision_type);
        set_unqualified_attribute(&mut element, NETWORK, network);
        set_unqualified_attribute(&mut element, OTHER_NETWORK, other_network);
        xlink_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&qname))?;
        security_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&qname))?;
        Self {
            value: value.to_string(),
            revision_id: Some(revision_id),
            revision_type: revision_type.to_string(),
            network: network.to_string(),
            other_network: other_network.to_string(),
            links,
            details,
            xlink_attributes,
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        for link in self.links.clone() {
            self.base.absorb(&*link);
        }
        for detail in self.details.clone() {
            self.base.absorb(&*detail);
        }
        let attribute_warnings = self.security_attributes.warnings().to_vec();
        self.base.absorb_attributes(&attribute_warnings);
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let version = self.version();
        require_ddms_element(self.element(), version, "revisionRecall")?;
        if !self.value.trim().is_empty() && self.has_nested_elements() {
            return Err(Error::invalid(
                "A ddms:revisionRecall element cannot have both child text and nested elements.",
            ));
        }
        for link in &self.links {
            require_compatible(version, &**link)?;
            link.security_attributes()
                .map_or(Ok(()), SecurityAttributes::require_classification)?;
        }
        for detail in &self.details {
            require_compatible(version, &**detail)?;
        }
        if self.revision_id.is_none() {
            return Err(Error::invalid("revision ID is required."));
        }
        if !REVISION_TYPES.contains(&self.revision_type.as_str()) {
            return Err(Error::invalid(format!(
                "The revisionType attribute must be one of {}",
                REVISION_TYPES.join(", ")
            )));
        }
        require_fixed_type(&self.xlink_attributes, "resource")?;
        if !self.network.is_empty() {
            validate_network(&self.network)?;
        }
        self.security_attributes.require_classification()?;
        require_version(version, Version::V4_0_1, "ddms:revisionRecall element")
    }

    /// True when the reason is given as links and details rather than text
    pub fn has_nested_elements(&self) -> bool {
        !self.links.is_empty() || !self.details.is_empty()
    }

    /// The reason, when given as text
    pub fn value(&self) -> &str {
        &self.value
    }

    /// `ddms:revisionID`
    pub fn revision_id(&self) -> Option<i64> {
        self.revision_id
    }

    /// `ddms:revisionType`
    pub fn revision_type(&self) -> &str {
        &self.revision_type
    }

    /// The network
    pub fn network(&self) -> &str {
        &self.network
    }

    /// A network outside the common list
    pub fn other_network(&self) -> &str {
        &self.other_network
    }

    /// Nested links
    pub fn links(&self) -> &[Arc<Link>] {
        &self.links
    }

    /// Nested details
    pub fn details(&self) -> &[Arc<ManagedString>] {
        &self.details
    }

    /// The resource-link attributes
    pub fn xlink_attributes(&self) -> &XLinkAttributes {
        &self.xlink_attributes
    }
}

impl Component for RevisionRecall {
    fn base(&self) -> &Base {
        &self.base
    }

    fn security_attributes(&self) -> Option<&SecurityAttributes> {
        Some(&self.security_attributes)
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let name = output::build_prefix(prefix, self.name(), suffix);
        let prefix = format!("{}.", name);
        let mut text = String::new();
        if !self.has_nested_elements() {
            text.push_str(&output::line(html, &name, &self.value));
        }
        if let Some(id) = self.revision_id {
            text.push_str(&output::line(html, &format!("{}revisionID", prefix), &id.to_string()));
        }
        text.push_str(&output::line(html, &format!("{}revisionType", prefix), &self.revision_type));
        text.push_str(&output::line(html, &format!("{}{}", prefix, NETWORK), &self.network));
        text.push_str(&output::line(html, &format!("{}{}", prefix, OTHER_NETWORK), &self.other_network));
        text.push_str(&output::components(html, &prefix, &self.links));
        text.push_str(&output::components(html, &prefix, &self.details));
        text.push_str(&self.xlink_attributes.output(html, &prefix));
        text.push_str(&self.security_attributes.output(html, &prefix));
        text
    }
}

/// Staging form of [`RevisionRecall`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RevisionRecallBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Reason as text; ignored when links or details are set
    pub value: String,
    /// `ddms:revisionID`
    pub revision_id: Option<i64>,
    /// `ddms:revisionType`
    pub revision_type: String,
    /// Network
    pub network: String,
    /// Other network
    pub other_network: String,
    /// Nested links
    pub links: BuilderList<LinkBuilder>,
    /// Nested details
    pub details: BuilderList<ManagedStringBuilder>,
    /// Link role
    pub role: String,
    /// Link title
    pub title: String,
    /// Link label
    pub label: String,
    /// Security attributes
    pub security_attributes: SecurityAttributesBuilder,
}

impl RevisionRecallBuilder {
    fn link_is_empty(&self) -> bool {
        [&self.role, &self.title, &self.label].iter().all(|v| v.trim().is_empty())
    }
}

impl Builder for RevisionRecallBuilder {
    type Target = RevisionRecall;

    fn is_empty(&self) -> bool {
        [&self.value, &self.revision_type, &self.network, &self.other_network]
            .iter()
            .all(|v| v.trim().is_empty())
            && self.revision_id.is_none()
            && self.links.is_empty()
            && self.details.is_empty()
            && self.link_is_empty()
            && self.security_attributes.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<RevisionRecall> {
        let revision_id = self
            .revision_id
            .ok_or_else(|| Error::invalid("revision ID is required.").locate("ddms:revisionRecall"))?;
        let xlink = if self.link_is_empty() {
            XLinkAttributes::default()
        } else {
            XLinkAttributes::resource(version, &self.role, &self.title, &self.label)?
        };
        let security_attributes = self.security_attributes.commit_as(version)?;
        let links = self.links.commit_all(version)?;
        let details = commit_with(&self.details, version, |b| b.kind = ManagedStringKind::Details)?;
        if links.is_empty() && details.is_empty() {
            RevisionRecall::new(
                version,
                &self.value,
                revision_id,
                &self.revision_type,
                &self.network,
                &self.other_network,
                xlink,
                security_attributes,
            )
        } else {
            RevisionRecall::with_nested(
                version,
                links,
                details,
                revision_id,
                &self.revision_type,
                &self.network,
                &self.other_network,
                xlink,
                security_attributes,
            )
        }
    }
}

impl From<&RevisionRecall> for RevisionRecallBuilder {
    fn from(recall: &RevisionRecall) -> Self {
        let xlink = &recall.xlink_attributes;
        Self {
            version: Some(recall.version()),
            value: recall.value.clone(),
            revision_id: recall.revision_id,
            revision_type: recall.revision_type.clone(),
            network: recall.network.clone(),
            other_network: recall.other_network.clone(),
            links: recall.links.iter().map(|l| LinkBuilder::from(&**l)).collect::<Vec<_>>().into(),
            details: recall.details.iter().map(|d| ManagedStringBuilder::from(&**d)).collect::<Vec<_>>().into(),
            role: xlink.role().to_string(),
            title: xlink.title().to_string(),
            label: xlink.label().to_string(),
            security_attributes: SecurityAttributesBuilder::from(&recall.security_attributes),
        }
    }
}

/// `ddms:recordKeeper`: the organization responsible for a record
#[derive(Debug, Clone, PartialEq)]
pub struct RecordKeeper {
    base: Base,
    record_keeper_id: String,
    organization: Option<Arc<Organization>>,
}

impl RecordKeeper {
    /// Parse a `ddms:recordKeeper` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let organization = element
            .first_child(version.ddms_namespace(), &entity_name(version, "organization"))
            .map(|c| Organization::from_element(c.clone(), version).map(Arc::new))
            .transpose()
            .map_err(|e| e.locate(&qname))?;
        Self {
            record_keeper_id: child_text(&element, "recordKeeperID"),
            organization,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from an ID and the keeping organization
    pub fn new(version: Version, record_keeper_id: &str, organization: Arc<Organization>) -> Result<Self> {
        let mut element = ddms_element(version, "recordKeeper");
        add_ddms_text_child(&mut element, version, "recordKeeperID", record_keeper_id);
        element.add_child(organization.element().clone());
        Self {
            record_keeper_id: record_keeper_id.to_string(),
            organization: Some(organization),
            base: Base::new(element, version),
        }
        .validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        if let Some(organization) = self.organization.clone() {
            self.base.absorb(&*organization);
        }
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let version = self.version();
        require_ddms_element(self.element(), version, "recordKeeper")?;
        require_value("record keeper ID", &self.record_keeper_id)?;
        let organization = self
            .organization
            .as_ref()
            .ok_or_else(|| Error::invalid("organization is required."))?;
        require_compatible(version, &**organization)?;
        require_version(version, Version::V4_0_1, "ddms:recordKeeper element")
    }

    /// `ddms:recordKeeperID`
    pub fn record_keeper_id(&self) -> &str {
        &self.record_keeper_id
    }

    /// The keeping organization
    pub fn organization(&self) -> Option<&Arc<Organization>> {
        self.organization.as_ref()
    }
}

impl Component for RecordKeeper {
    fn base(&self) -> &Base {
        &self.base
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let prefix = format!("{}.", output::build_prefix(prefix, self.name(), suffix));
        let mut text = output::line(html, &format!("{}recordKeeperID", prefix), &self.record_keeper_id);
        text.push_str(&output::optional(html, &prefix, self.organization.as_ref()));
        text
    }
}

/// Staging form of [`RecordKeeper`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordKeeperBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// `ddms:recordKeeperID`
    pub record_keeper_id: String,
    /// Keeping organization
    pub organization: OrganizationBuilder,
}

impl Builder for RecordKeeperBuilder {
    type Target = RecordKeeper;

    fn is_empty(&self) -> bool {
        self.record_keeper_id.trim().is_empty() && self.organization.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<RecordKeeper> {
        let organization = self
            .organization
            .commit_as(version)?
            .ok_or_else(|| Error::invalid("organization is required.").locate("ddms:recordKeeper"))?;
        RecordKeeper::new(version, &self.record_keeper_id, Arc::new(organization))
    }
}

impl From<&RecordKeeper> for RecordKeeperBuilder {
    fn from(keeper: &RecordKeeper) -> Self {
        Self {
            version: Some(keeper.version()),
            record_keeper_id: keeper.record_keeper_id.clone(),
            organization: keeper
                .organization
                .as_ref()
                .map(|o| OrganizationBuilder::from(&**o))
                .unwrap_or_default(),
        }
    }
}

/// `ddms:recordsManagementInfo`
#[derive(Debug, Clone, PartialEq)]
pub struct RecordsManagementInfo {
    base: Base,
    record_keeper: Option<Arc<RecordKeeper>>,
    application_software: Option<Arc<ManagedString>>,
    vital_record_indicator: bool,
}

impl RecordsManagementInfo {
    /// Parse a `ddms:recordsManagementInfo` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let namespace = version.ddms_namespace();
        let record_keeper = element
            .first_child(namespace, "recordKeeper")
            .map(|c| RecordKeeper::from_element(c.clone(), version).map(Arc::new))
            .transpose()
            .map_err(|e| e.locate(&qname))?;
        let application_software = element
            .first_child(namespace, ManagedStringKind::ApplicationSoftware.local_name())
            .map(|c| ManagedString::from_element(c.clone(), version).map(Arc::new))
            .transpose()
            .map_err(|e| e.locate(&qname))?;
        let vital_record_indicator = match element.attribute(Some(namespace), "vitalRecordIndicator") {
            Some(value) => parse_boolean(value).ok_or_else(|| {
                Error::invalid("The vitalRecordIndicator attribute must be a boolean.").locate(&qname)
            })?,
            None => false,
        };
        Self {
            record_keeper,
            application_software,
            vital_record_indicator,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from its optional parts and the vital record flag
    pub fn new(
        version: Version,
        record_keeper: Option<Arc<RecordKeeper>>,
        application_software: Option<Arc<ManagedString>>,
        vital_record_indicator: bool,
    ) -> Result<Self> {
        let mut element = ddms_element(version, "recordsManagementInfo");
        if let Some(keeper) = &record_keeper {
            element.add_child(keeper.element().clone());
        }
        if let Some(software) = &application_software {
            element.add_child(software.element().clone());
        }
        set_ddms_attribute(&mut element, version, "vitalRecordIndicator", &vital_record_indicator.to_string());
        Self {
            record_keeper,
            application_software,
            vital_record_indicator,
            base: Base::new(element, version),
        }
        .validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        if let Some(keeper) = self.record_keeper.clone() {
            self.base.absorb(&*keeper);
        }
        if let Some(software) = self.application_software.clone() {
            self.base.absorb(&*software);
        }
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let version = self.version();
        let element = self.element();
        require_ddms_element(element, version, "recordsManagementInfo")?;
        require_child_count(element, "recordKeeper", 0, 1)?;
        require_child_count(element, "applicationSoftware", 0, 1)?;
        if let Some(keeper) = &self.record_keeper {
            require_compatible(version, &**keeper)?;
        }
        if let Some(software) = &self.application_software {
            if software.kind() != ManagedStringKind::ApplicationSoftware {
                return Err(Error::invalid("The software must be a ddms:applicationSoftware element."));
            }
            require_compatible(version, &**software)?;
        }
        require_version(version, Version::V4_0_1, "ddms:recordsManagementInfo element")
    }

    /// The record keeper, if any
    pub fn record_keeper(&self) -> Option<&Arc<RecordKeeper>> {
        self.record_keeper.as_ref()
    }

    /// The application software, if any
    pub fn application_software(&self) -> Option<&Arc<ManagedString>> {
        self.application_software.as_ref()
    }

    /// `ddms:vitalRecordIndicator`, false when absent
    pub fn vital_record_indicator(&self) -> bool {
        self.vital_record_indicator
    }
}

impl Component for RecordsManagementInfo {
    fn base(&self) -> &Base {
        &self.base
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let prefix = format!("{}.", output::build_prefix(prefix, self.name(), suffix));
        let mut text = output::optional(html, &prefix, self.record_keeper.as_ref());
        text.push_str(&output::optional(html, &prefix, self.application_software.as_ref()));
        text.push_str(&output::line_always(
            html,
            &format!("{}vitalRecordIndicator", prefix),
            &self.vital_record_indicator.to_string(),
        ));
        text
    }
}

/// Staging form of [`RecordsManagementInfo`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordsManagementInfoBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Record keeper
    pub record_keeper: RecordKeeperBuilder,
    /// Application software
    pub application_software: ManagedStringBuilder,
    /// `ddms:vitalRecordIndicator`
    pub vital_record_indicator: bool,
}

impl Builder for RecordsManagementInfoBuilder {
    type Target = RecordsManagementInfo;

    fn is_empty(&self) -> bool {
        self.record_keeper.is_empty() && self.application_software.is_empty() && !self.vital_record_indicator
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<RecordsManagementInfo> {
        let mut software = self.application_software.clone();
        software.kind = ManagedStringKind::ApplicationSoftware;
        RecordsManagementInfo::new(
            version,
            self.record_keeper.commit_as(version)?.map(Arc::new),
            software.commit_as(version)?.map(Arc::new),
            self.vital_record_indicator,
        )
    }
}

impl From<&RecordsManagementInfo> for RecordsManagementInfoBuilder {
    fn from(info: &RecordsManagementInfo) -> Self {
        Self {
            version: Some(info.version()),
            record_keeper: info
                .record_keeper
                .as_ref()
                .map(|k| RecordKeeperBuilder::from(&**k))
                .unwrap_or_default(),
            application_software: info
                .application_software
                .as_ref()
                .map(|s| ManagedStringBuilder::from(&**s))
                .unwrap_or_default(),
            vital_record_indicator: info.vital_record_indicator,
        }
    }
}

/// `ddms:resourceManagement`, the management history of a resource
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceManagement {
    base: Base,
    records_management_info: Option<Arc<RecordsManagementInfo>>,
    revision_recall: Option<Arc<RevisionRecall>>,
    tasking_infos: Vec<Arc<TaskingInfo>>,
    processing_infos: Vec<Arc<ProcessingInfo>>,
    security_attributes: SecurityAttributes,
}

impl ResourceManagement {
    /// Parse a `ddms:resourceManagement` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let located = |e: Error| e.locate(&qname);
        let namespace = version.ddms_namespace();
        let records_management_info = element
            .first_child(namespace, "recordsManagementInfo")
            .map(|c| RecordsManagementInfo::from_element(c.clone(), version).map(Arc::new))
            .transpose()
            .map_err(located)?;
        let revision_recall = element
            .first_child(namespace, "revisionRecall")
            .map(|c| RevisionRecall::from_element(c.clone(), version).map(Arc::new))
            .transpose()
            .map_err(located)?;
        let tasking_infos = element
            .children_named(namespace, "taskingInfo")
            .map(|c| TaskingInfo::from_element(c.clone(), version).map(Arc::new))
            .collect::<Result<Vec<_>>>()
            .map_err(located)?;
        let processing_infos = element
            .children_named(namespace, "processingInfo")
            .map(|c| ProcessingInfo::from_element(c.clone(), version).map(Arc::new))
            .collect::<Result<Vec<_>>>()
            .map_err(located)?;
        let security_attributes = SecurityAttributes::from_element(&element, version).map_err(located)?;
        Self {
            records_management_info,
            revision_recall,
            tasking_infos,
            processing_infos,
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from its parts, all optional
    pub fn new(
        version: Version,
        records_management_info: Option<Arc<RecordsManagementInfo>>,
        revision_recall: Option<Arc<RevisionRecall>>,
        tasking_infos: Vec<Arc<TaskingInfo>>,
        processing_infos: Vec<Arc<ProcessingInfo>>,
        security_attributes: SecurityAttributes,
    ) -> Result<Self> {
        let mut element = ddms_element(version, "resourceManagement");
        if let Some(info) = &records_management_info {
            element.add_child(info.element().clone());
        }
        if let Some(recall) = &revision_recall {
            element.add_child(recall.element().clone());
        }
        for info in &tasking_infos {
            element.add_child(info.element().clone());
        }
        for info in &processing_infos {
            element.add_child(info.element().clone());
        }
        security_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&element.qualified_name()))?;
        Self {
            records_management_info,
            revision_recall,
            tasking_infos,
            processing_infos,
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        let Self {
            base,
            records_management_info,
            revision_recall,
            tasking_infos,
            processing_infos,
            security_attributes,
        } = &mut self;
        if let Some(info) = records_management_info.as_ref() {
            base.absorb(&**info);
        }
        if let Some(recall) = revision_recall.as_ref() {
            base.absorb(&**recall);
        }
        for info in tasking_infos.iter() {
            base.absorb(&**info);
        }
        for info in processing_infos.iter() {
            base.absorb(&**info);
        }
        base.absorb_attributes(security_attributes.warnings());
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let version = self.version();
        let element = self.element();
        require_ddms_element(element, version, "resourceManagement")?;
        require_child_count(element, "recordsManagementInfo", 0, 1)?;
        require_child_count(element, "revisionRecall", 0, 1)?;
        for child in self.children() {
            require_compatible(version, child)?;
        }
        require_version(version, Version::V4_0_1, "ddms:resourceManagement element")
    }

    fn children(&self) -> impl Iterator<Item = &dyn Component> {
        let records = self.records_management_info.iter().map(|c| &**c as &dyn Component);
        let recall = self.revision_recall.iter().map(|c| &**c as &dyn Component);
        let tasking = self.tasking_infos.iter().map(|c| &**c as &dyn Component);
        let processing = self.processing_infos.iter().map(|c| &**c as &dyn Component);
        records.chain(recall).chain(tasking).chain(processing)
    }

    /// Records management information, if any
    pub fn records_management_info(&self) -> Option<&Arc<RecordsManagementInfo>> {
        self.records_management_info.as_ref()
    }

    /// The revision recall, if any
    pub fn revision_recall(&self) -> Option<&Arc<RevisionRecall>> {
        self.revision_recall.as_ref()
    }

    /// Tasking information
    pub fn tasking_infos(&self) -> &[Arc<TaskingInfo>] {
        &self.tasking_infos
    }

    /// Processing history
    pub fn processing_infos(&self) -> &[Arc<ProcessingInfo>] {
        &self.processing_infos
    }
}

impl Component for ResourceManagement {
    fn base(&self) -> &Base {
        &self.base
    }

    fn security_attributes(&self) -> Option<&SecurityAttributes> {
        Some(&self.security_attributes)
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let prefix = format!("{}.", output::build_prefix(prefix, self.name(), suffix));
        let mut text = output::optional(html, &prefix, self.records_management_info.as_ref());
        text.push_str(&output::optional(html, &prefix, self.revision_recall.as_ref()));
        text.push_str(&output::components(html, &prefix, &self.tasking_infos));
        text.push_str(&output::components(html, &prefix, &self.processing_infos));
        text.push_str(&self.security_attributes.output(html, &prefix));
        text
    }
}

/// Staging form of [`ResourceManagement`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceManagementBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Records management information
    pub records_management_info: RecordsManagementInfoBuilder,
    /// Revision recall
    pub revision_recall: RevisionRecallBuilder,
    /// Tasking information
    pub tasking_infos: BuilderList<TaskingInfoBuilder>,
    /// Processing history
    pub processing_infos: BuilderList<ProcessingInfoBuilder>,
    /// Security attributes
    pub security_attributes: SecurityAttributesBuilder,
}

impl Builder for ResourceManagementBuilder {
    type Target = ResourceManagement;

    fn is_empty(&self) -> bool {
        self.records_management_info.is_empty()
            && self.revision_recall.is_empty()
            && self.tasking_infos.is_empty()
            && self.processing_infos.is_empty()
            && self.security_attributes.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<ResourceManagement> {
        ResourceManagement::new(
            version,
            self.records_management_info.commit_as(version)?.map(Arc::new),
            self.revision_recall.commit_as(version)?.map(Arc::new),
            self.tasking_infos.commit_all(version)?,
            self.processing_infos.commit_all(version)?,
            self.security_attributes.commit_as(version)?,
        )
    }
}

impl From<&ResourceManagement> for ResourceManagementBuilder {
    fn from(management: &ResourceManagement) -> Self {
        Self {
            version: Some(management.version()),
            records_management_info: management
                .records_management_info
                .as_ref()
                .map(|i| RecordsManagementInfoBuilder::from(&**i))
                .unwrap_or_default(),
            revision_recall: management
                .revision_recall
                .as_ref()
                .map(|r| RevisionRecallBuilder::from(&**r))
                .unwrap_or_default(),
            tasking_infos: management
                .tasking_infos
                .iter()
                .map(|t| TaskingInfoBuilder::from(&**t))
                .collect::<Vec<_>>()
                .into(),
            processing_infos: management
                .processing_infos
                .iter()
                .map(|p| ProcessingInfoBuilder::from(&**p))
                .collect::<Vec<_>>()
                .into(),
            security_attributes: SecurityAttributesBuilder::from(&management.security_attributes),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::documents::parse_element;
    use crate::resource::entities::tests::contact;
    use crate::resource::entities::Person;
    use crate::resource::tasking::TaskingEntity;
    use pretty_assertions::assert_eq;

    const TANK: &str = "http://en.wikipedia.org/wiki/Tank";

    fn classified(version: Version) -> SecurityAttributes {
        SecurityAttributes::classified(version, "U", &["USA"]).unwrap()
    }

    fn organization(version: Version) -> Arc<Organization> {
        Arc::new(Organization::new(version, contact(&["DISA"]), vec![], "").unwrap())
    }

    fn task_id(version: Version) -> TaskId {
        let link = XLinkAttributes::simple(version, TANK, "tank", "Tank Page", "", "new", "onLoad").unwrap();
        TaskId::new(version, "Task #12345", "MDR", "NIPRNet", "", link).unwrap()
    }

    fn tasking_info(version: Version) -> TaskingInfo {
        let person = Person::new(version, contact(&["Brian"]), "Uri", "", "").unwrap();
        let requester = TaskingRole::new(
            version,
            TaskingRoleKind::RequesterInfo,
            TaskingEntity::Person(Arc::new(person)),
            classified(version),
        )
        .unwrap();
        TaskingInfo::new(version, vec![Arc::new(requester)], vec![], None, Arc::new(task_id(version)), classified(version))
            .unwrap()
    }

    fn revision_recall(version: Version) -> RevisionRecall {
        let link = XLinkAttributes::resource(version, "tank", "Tank Page", "tank").unwrap();
        RevisionRecall::new(
            version,
            "Description of Recall",
            1,
            "ADMINISTRATIVE RECALL",
            "NIPRNet",
            "PBS",
            link,
            classified(version),
        )
        .unwrap()
    }

    fn records_management_info(version: Version) -> RecordsManagementInfo {
        let keeper = RecordKeeper::new(version, "#289-99202.9", organization(version)).unwrap();
        let software = ManagedString::new(
            version,
            ManagedStringKind::ApplicationSoftware,
            "IRM Generator 2L-9",
            classified(version),
        )
        .unwrap();
        RecordsManagementInfo::new(version, Some(Arc::new(keeper)), Some(Arc::new(software)), true).unwrap()
    }

    fn processing_info(version: Version) -> ProcessingInfo {
        ProcessingInfo::new(
            version,
            "XSLT Transformation to convert DDMS 2.0 to DDMS 3.1.",
            "2011-08-19",
            classified(version),
        )
        .unwrap()
    }

    pub(crate) fn resource_management(version: Version) -> ResourceManagement {
        ResourceManagement::new(
            version,
            Some(Arc::new(records_management_info(version))),
            Some(Arc::new(revision_recall(version))),
            vec![Arc::new(tasking_info(version))],
            vec![Arc::new(processing_info(version))],
            classified(version),
        )
        .unwrap()
    }

    #[test]
    fn test_task_id_output() {
        assert_eq!(
            task_id(Version::V5_0).to_text(),
            "taskID: Task #12345\ntaskID.taskingSystem: MDR\ntaskID.network: NIPRNet\ntaskID.type: simple\n\
             taskID.href: http://en.wikipedia.org/wiki/Tank\ntaskID.role: tank\ntaskID.title: Tank Page\n\
             taskID.show: new\ntaskID.actuate: onLoad\n"
        );
    }

    #[test]
    fn test_task_id_network_namespace() {
        let current = task_id(Version::V5_0);
        assert!(current.to_xml().contains("virt:network=\"NIPRNet\""));
        let parsed = TaskId::from_element(parse_element(&current.to_xml()).unwrap(), Version::V5_0).unwrap();
        assert_eq!(parsed, current);
        assert_eq!(parsed.network(), "NIPRNet");

        let older = task_id(Version::V4_1);
        assert!(older.to_xml().contains(" network=\"NIPRNet\""));
        let parsed = TaskId::from_element(parse_element(&older.to_xml()).unwrap(), Version::V4_1).unwrap();
        assert_eq!(parsed.network(), "NIPRNet");
    }

    #[test]
    fn test_task_id_rules() {
        let v = Version::V5_0;
        let err = TaskId::new(v, "Task", "", "", "PBS", XLinkAttributes::default()).unwrap_err();
        assert_eq!(err.message(), Some("The otherNetwork attribute cannot be used after DDMS 4.1."));
        assert!(TaskId::new(Version::V4_1, "Task", "", "", "PBS", XLinkAttributes::default()).is_ok());

        let err = TaskId::new(v, "Task", "", "Internet", "", XLinkAttributes::default()).unwrap_err();
        assert!(err.message().unwrap().starts_with("The network attribute must be one of"));

        let locator = XLinkAttributes::locator(v, TANK, "", "", "").unwrap();
        let err = TaskId::new(v, "Task", "", "", "", locator).unwrap_err();
        assert_eq!(err.message(), Some("The type attribute must have a fixed value of \"simple\"."));

        let err = TaskId::new(v, "", "", "", "", XLinkAttributes::default()).unwrap_err();
        assert_eq!(err.message(), Some("value is required."));
        assert_eq!(err.locator(), Some("/ddms:taskID"));
    }

    #[test]
    fn test_tasking_info_output() {
        let text = tasking_info(Version::V4_1).to_text();
        assert!(text.starts_with("taskingInfo.requesterInfo.entityType: person\ntaskingInfo.requesterInfo.name: Brian\n"));
        assert!(text.contains("taskingInfo.taskID: Task #12345\ntaskingInfo.taskID.taskingSystem: MDR\n"));
        assert!(text.ends_with("taskingInfo.classification: U\ntaskingInfo.ownerProducer: USA\n"));
    }

    #[test]
    fn test_tasking_info_requires_task_id() {
        let element = parse_element(
            r#"<ddms:taskingInfo xmlns:ddms="urn:us:mil:ces:metadata:ddms:5" xmlns:ISM="urn:us:gov:ic:ism" ISM:classification="U" ISM:ownerProducer="USA"/>"#,
        )
        .unwrap();
        let err = TaskingInfo::from_element(element, Version::V5_0).unwrap_err();
        assert_eq!(err.message(), Some("Exactly 1 ddms:taskID element must exist."));
        assert_eq!(err.locator(), Some("/ddms:taskingInfo"));

        let err = TaskingInfoBuilder::default().commit_as(Version::V5_0);
        assert!(matches!(err, Ok(None)));
    }

    #[test]
    fn test_processing_info() {
        let info = processing_info(Version::V4_1);
        assert_eq!(
            info.to_text(),
            "processingInfo: XSLT Transformation to convert DDMS 2.0 to DDMS 3.1.\n\
             processingInfo.dateProcessed: 2011-08-19\nprocessingInfo.classification: U\nprocessingInfo.ownerProducer: USA\n"
        );
        assert!(info.warnings().is_empty());

        let err = ProcessingInfo::new(Version::V4_1, "x", "19 Aug 2011", classified(Version::V4_1)).unwrap_err();
        assert!(err.message().unwrap().starts_with("The date datatype must be one of"));
        let err = ProcessingInfo::new(Version::V4_1, "x", "", classified(Version::V4_1)).unwrap_err();
        assert_eq!(err.message(), Some("dateProcessed is required."));

        let empty = ProcessingInfo::new(Version::V4_1, "", "2011", classified(Version::V4_1)).unwrap();
        assert_eq!(empty.warnings()[0].text, "A ddms:processingInfo element was found with no value.");
        assert_eq!(empty.warnings()[0].locator, "/ddms:processingInfo");
    }

    #[test]
    fn test_revision_recall_output() {
        assert_eq!(
            revision_recall(Version::V5_0).to_text(),
            "revisionRecall: Description of Recall\nrevisionRecall.revisionID: 1\n\
             revisionRecall.revisionType: ADMINISTRATIVE RECALL\nrevisionRecall.network: NIPRNet\n\
             revisionRecall.otherNetwork: PBS\nrevisionRecall.type: resource\nrevisionRecall.role: tank\n\
             revisionRecall.title: Tank Page\nrevisionRecall.label: tank\nrevisionRecall.classification: U\n\
             revisionRecall.ownerProducer: USA\n"
        );
    }

    #[test]
    fn test_revision_recall_nested() {
        let v = Version::V5_0;
        let link = Link::new(v, XLinkAttributes::locator(v, TANK, "tank", "Tank Page", "tank").unwrap(), classified(v))
            .unwrap();
        let details = ManagedString::new(v, ManagedStringKind::Details, "Details", classified(v)).unwrap();
        let recall = RevisionRecall::with_nested(
            v,
            vec![Arc::new(link)],
            vec![Arc::new(details)],
            2,
            "SUBSTANTIVE REVISION",
            "",
            "",
            XLinkAttributes::default(),
            classified(v),
        )
        .unwrap();
        let text = recall.to_text();
        assert!(text.starts_with("revisionRecall.revisionID: 2\n"));
        assert!(text.contains("revisionRecall.link.type: locator\n"));
        assert!(text.contains("revisionRecall.details: Details\nrevisionRecall.details.classification: U\n"));
        let parsed = RevisionRecall::from_element(parse_element(&recall.to_xml()).unwrap(), v).unwrap();
        assert_eq!(parsed, recall);

        let unclassified = Link::new(
            v,
            XLinkAttributes::locator(v, TANK, "", "", "").unwrap(),
            SecurityAttributes::empty(v),
        )
        .unwrap();
        let err = RevisionRecall::with_nested(
            v,
            vec![Arc::new(unclassified)],
            vec![],
            2,
            "SUBSTANTIVE REVISION",
            "",
            "",
            XLinkAttributes::default(),
            classified(v),
        )
        .unwrap_err();
        assert_eq!(err.message(), Some("classification is required."));
    }

    #[test]
    fn test_revision_recall_rules() {
        let v = Version::V4_1;
        let element = parse_element(
            r#"<ddms:revisionRecall xmlns:ddms="urn:us:mil:ces:metadata:ddms:4" xmlns:ISM="urn:us:gov:ic:ism" ddms:revisionID="1" ddms:revisionType="ADMINISTRATIVE RECALL" ISM:classification="U" ISM:ownerProducer="USA">Text<ddms:details ISM:classification="U" ISM:ownerProducer="USA">Details</ddms:details></ddms:revisionRecall>"#,
        )
        .unwrap();
        let err = RevisionRecall::from_element(element, v).unwrap_err();
        assert_eq!(
            err.message(),
            Some("A ddms:revisionRecall element cannot have both child text and nested elements.")
        );

        let err = RevisionRecall::new(v, "x", 1, "RECALL", "", "", XLinkAttributes::default(), classified(v)).unwrap_err();
        assert!(err.message().unwrap().starts_with("The revisionType attribute must be one of"));

        let simple = XLinkAttributes::simple(v, TANK, "", "", "", "", "").unwrap();
        let err = RevisionRecall::new(v, "x", 1, "ADMINISTRATIVE RECALL", "", "", simple, classified(v)).unwrap_err();
        assert_eq!(err.message(), Some("The type attribute must have a fixed value of \"resource\"."));

        let builder = RevisionRecallBuilder {
            value: "x".to_string(),
            revision_type: "ADMINISTRATIVE RECALL".to_string(),
            ..Default::default()
        };
        let err = builder.commit_as(v).unwrap_err();
        assert_eq!(err.message(), Some("revision ID is required."));
    }

    #[test]
    fn test_records_management_info() {
        let text = records_management_info(Version::V4_1).to_text();
        assert!(text.starts_with(
            "recordsManagementInfo.recordKeeper.recordKeeperID: #289-99202.9\n\
             recordsManagementInfo.recordKeeper.entityType: organization\nrecordsManagementInfo.recordKeeper.name: DISA\n"
        ));
        assert!(text.contains("recordsManagementInfo.applicationSoftware: IRM Generator 2L-9\n"));
        assert!(text.ends_with("recordsManagementInfo.vitalRecordIndicator: true\n"));

        let element = parse_element(r#"<ddms:recordsManagementInfo xmlns:ddms="urn:us:mil:ces:metadata:ddms:5"/>"#).unwrap();
        let info = RecordsManagementInfo::from_element(element, Version::V5_0).unwrap();
        assert!(!info.vital_record_indicator());
        assert_eq!(info.to_text(), "recordsManagementInfo.vitalRecordIndicator: false\n");
    }

    #[test]
    fn test_record_keeper_requires_organization() {
        let element = parse_element(
            r##"<ddms:recordKeeper xmlns:ddms="urn:us:mil:ces:metadata:ddms:5"><ddms:recordKeeperID>#1</ddms:recordKeeperID></ddms:recordKeeper>"##,
        )
        .unwrap();
        let err = RecordKeeper::from_element(element, Version::V5_0).unwrap_err();
        assert_eq!(err.message(), Some("organization is required."));

        let err = RecordKeeper::new(Version::V5_0, "", organization(Version::V5_0)).unwrap_err();
        assert_eq!(err.message(), Some("record keeper ID is required."));
    }

    #[test]
    fn test_application_software_warning() {
        let old = ManagedString::new(
            Version::V4_1,
            ManagedStringKind::ApplicationSoftware,
            "",
            classified(Version::V4_1),
        )
        .unwrap();
        assert_eq!(old.warnings()[0].text, "A ddms:applicationSoftware element was found with no value.");
        let current = ManagedString::new(
            Version::V5_0,
            ManagedStringKind::ApplicationSoftware,
            "",
            classified(Version::V5_0),
        )
        .unwrap();
        assert!(current.warnings().is_empty());
    }

    #[test]
    fn test_resource_management_order() {
        let text = resource_management(Version::V5_0).to_text();
        let position = |needle: &str| text.find(needle).unwrap();
        assert!(position("resourceManagement.recordsManagementInfo.") < position("resourceManagement.revisionRecall"));
        assert!(position("resourceManagement.revisionRecall") < position("resourceManagement.taskingInfo."));
        assert!(position("resourceManagement.taskingInfo.") < position("resourceManagement.processingInfo"));
        assert!(text.contains("resourceManagement.processingInfo.dateProcessed: 2011-08-19\n"));
        assert!(text.ends_with("resourceManagement.classification: U\nresourceManagement.ownerProducer: USA\n"));
    }

    #[test]
    fn test_resource_management_round_trip() {
        for version in [Version::V4_0_1, Version::V4_1, Version::V5_0] {
            let built = resource_management(version);
            let parsed = ResourceManagement::from_element(parse_element(&built.to_xml()).unwrap(), version).unwrap();
            assert_eq!(parsed, built);
            assert_eq!(parsed.to_text(), built.to_text());
            let rebuilt = ResourceManagementBuilder::from(&built).commit().unwrap().unwrap();
            assert_eq!(rebuilt, built);
        }
    }

    #[test]
    fn test_resource_management_rules() {
        let err = ResourceManagement::new(Version::V3_1, None, None, vec![], vec![], SecurityAttributes::empty(Version::V3_1))
            .unwrap_err();
        assert_eq!(
            err.message(),
            Some("The ddms:resourceManagement element cannot be used until DDMS 4.0.1 or later.")
        );

        let v = Version::V5_0;
        let mut element = resource_management(v).element().clone();
        element.add_child(revision_recall(v).element().clone());
        let err = ResourceManagement::from_element(element, v).unwrap_err();
        assert_eq!(err.message(), Some("No more than 1 ddms:revisionRecall element can exist."));

        assert!(matches!(ResourceManagementBuilder::default().commit_as(v), Ok(None)));
    }
}
