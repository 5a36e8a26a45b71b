//! Subject coverage: keywords, categories, production metrics and
//! non-state actors

use crate::attributes::{ExtensibleAttributes, SecurityAttributes, SecurityAttributesBuilder};
use crate::components::helpers::{
    add_wrapped, content_element, ddms_element, locate_in_wrapper, own_attribute, require_compatible,
    require_ddms_element, require_value, require_version, set_ddms_attribute,
};
use crate::components::{output, Base, Builder, BuilderList, Component};
use crate::datatypes::validate_uri;
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::versions::Version;
use std::collections::HashSet;
use std::sync::Arc;

/// Before 4.0.1 keywords and categories sit inside `ddms:Subject`
const SUBJECT: &str = "Subject";

fn require_security_since(version: Version, minimum: Version, attributes: &SecurityAttributes) -> Result<()> {
    if !attributes.is_empty() && !version.is_at_least(minimum) {
        return Err(Error::invalid(format!(
            "Security attributes cannot be applied to this component until DDMS {} or later.",
            minimum
        )));
    }
    Ok(())
}

fn require_extensible_since_3_0(version: Version, name: &str, attributes: &ExtensibleAttributes) -> Result<()> {
    if !attributes.is_empty() && !version.is_at_least(Version::V3_0) {
        return Err(Error::invalid(format!(
            "xs:anyAttribute cannot be applied to ddms:{} until DDMS 3.0 or later.",
            name
        )));
    }
    Ok(())
}

/// A free-text subject keyword
#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    base: Base,
    value: String,
    security_attributes: SecurityAttributes,
    extensible_attributes: ExtensibleAttributes,
}

impl Keyword {
    /// Parse a `ddms:keyword` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let security_attributes =
            SecurityAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        let extensible_attributes =
            ExtensibleAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        Self {
            value: own_attribute(&element, "value").to_string(),
            security_attributes,
            extensible_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from a value and attribute groups
    pub fn new(
        version: Version,
        value: &str,
        security_attributes: SecurityAttributes,
        extensible_attributes: ExtensibleAttributes,
    ) -> Result<Self> {
        let mut element = ddms_element(version, "keyword");
        let qname = element.qualified_name();
        set_ddms_attribute(&mut element, version, "value", value);
        security_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&qname))?;
        extensible_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&qname))?;
        Self {
            value: value.to_string(),
            security_attributes,
            extensible_attributes,
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
        let version = self.version();
        require_ddms_element(self.element(), version, "keyword")?;
        require_value("value attribute", &self.value)?;
        require_security_since(version, Version::V4_0_1, &self.security_attributes)?;
        require_extensible_since_3_0(version, "keyword", &self.extensible_attributes)
    }

    /// The keyword text
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Foreign attributes on the keyword
    pub fn extensible_attributes(&self) -> &ExtensibleAttributes {
        &self.extensible_attributes
    }
}

impl Component for Keyword {
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
        text.push_str(&self.extensible_attributes.output(html, &format!("{}.", name)));
        text
    }
}

/// Staging form of [`Keyword`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Keyword text
    pub value: String,
    /// Security attributes
    pub security_attributes: SecurityAttributesBuilder,
}

impl Builder for KeywordBuilder {
    type Target = Keyword;

    fn is_empty(&self) -> bool {
        self.value.trim().is_empty() && self.security_attributes.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<Keyword> {
        Keyword::new(
            version,
            &self.value,
            self.security_attributes.commit_as(version)?,
            ExtensibleAttributes::empty(version),
        )
    }
}

impl From<&Keyword> for KeywordBuilder {
    fn from(keyword: &Keyword) -> Self {
        Self {
            version: Some(keyword.version()),
            value: keyword.value.clone(),
            security_attributes: SecurityAttributesBuilder::from(&keyword.security_attributes),
        }
    }
}

/// A subject drawn from a categorization scheme
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    base: Base,
    qualifier: String,
    code: String,
    label: String,
    security_attributes: SecurityAttributes,
    extensible_attributes: ExtensibleAttributes,
}

impl Category {
    /// Parse a `ddms:category` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let security_attributes =
            SecurityAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        let extensible_attributes =
            ExtensibleAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        Self {
            qualifier: own_attribute(&element, "qualifier").to_string(),
            code: own_attribute(&element, "code").to_string(),
            label: own_attribute(&element, "label").to_string(),
            security_attributes,
            extensible_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from a qualifier, code, label and attribute groups
    pub fn new(
        version: Version,
        qualifier: &str,
        code: &str,
        label: &str,
        security_attributes: SecurityAttributes,
        extensible_attributes: ExtensibleAttributes,
    ) -> Result<Self> {
        let mut element = ddms_element(version, "category");
        let qname = element.qualified_name();
        set_ddms_attribute(&mut element, version, "qualifier", qualifier);
        set_ddms_attribute(&mut element, version, "code", code);
        set_ddms_attribute(&mut element, version, "label", label);
        security_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&qname))?;
        extensible_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&qname))?;
        Self {
            qualifier: qualifier.to_string(),
            code: code.to_string(),
            label: label.to_string(),
            security_attributes,
            extensible_attributes,
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
        let version = self.version();
        require_ddms_element(self.element(), version, "category")?;
        require_value("label attribute", &self.label)?;
        if !self.qualifier.is_empty() {
            validate_uri(&self.qualifier)?;
        }
        require_security_since(version, Version::V4_0_1, &self.security_attributes)?;
        require_extensible_since_3_0(version, "category", &self.extensible_attributes)
    }

    /// The scheme URI
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    /// The code within the scheme
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The human-readable label
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Component for Category {
    fn base(&self) -> &Base {
        &self.base
    }

    fn security_attributes(&self) -> Option<&SecurityAttributes> {
        Some(&self.security_attributes)
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let prefix = format!("{}.", output::build_prefix(prefix, self.name(), suffix));
        let mut text = output::line(html, &format!("{}qualifier", prefix), &self.qualifier);
        text.push_str(&output::line(html, &format!("{}code", prefix), &self.code));
        text.push_str(&output::line(html, &format!("{}label", prefix), &self.label));
        text.push_str(&self.security_attributes.output(html, &prefix));
        text.push_str(&self.extensible_attributes.output(html, &prefix));
        text
    }
}

/// Staging form of [`Category`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Scheme URI
    pub qualifier: String,
    /// Code
    pub code: String,
    /// Label
    pub label: String,
    /// Security attributes
    pub security_attributes: SecurityAttributesBuilder,
}

impl Builder for CategoryBuilder {
    type Target = Category;

    fn is_empty(&self) -> bool {
        self.qualifier.trim().is_empty()
            && self.code.trim().is_empty()
            && self.label.trim().is_empty()
            && self.security_attributes.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<Category> {
        Category::new(
            version,
            &self.qualifier,
            &self.code,
            &self.label,
            self.security_attributes.commit_as(version)?,
            ExtensibleAttributes::empty(version),
        )
    }
}

impl From<&Category> for CategoryBuilder {
    fn from(category: &Category) -> Self {
        Self {
            version: Some(category.version()),
            qualifier: category.qualifier.clone(),
            code: category.code.clone(),
            label: category.label.clone(),
            security_attributes: SecurityAttributesBuilder::from(&category.security_attributes),
        }
    }
}

/// A production metric: the subject and coverage a product was tasked for.
/// DDMS 4.0.1 or later.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionMetric {
    base: Base,
    subject: String,
    coverage: String,
    security_attributes: SecurityAttributes,
}

impl ProductionMetric {
    /// Parse a `ddms:productionMetric` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let security_attributes =
            SecurityAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        Self {
            subject: own_attribute(&element, "subject").to_string(),
            coverage: own_attribute(&element, "coverage").to_string(),
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from a subject, a coverage and security attributes
    pub fn new(
        version: Version,
        subject: &str,
        coverage: &str,
        security_attributes: SecurityAttributes,
    ) -> Result<Self> {
        let mut element = ddms_element(version, "productionMetric");
        let qname = element.qualified_name();
        set_ddms_attribute(&mut element, version, "subject", subject);
        set_ddms_attribute(&mut element, version, "coverage", coverage);
        security_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&qname))?;
        Self {
            subject: subject.to_string(),
            coverage: coverage.to_string(),
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
        require_ddms_element(self.element(), self.version(), "productionMetric")?;
        require_value("subject attribute", &self.subject)?;
        require_value("coverage attribute", &self.coverage)?;
        require_version(self.version(), Version::V4_0_1, "ddms:productionMetric element")
    }

    /// The metric subject
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The metric coverage
    pub fn coverage(&self) -> &str {
        &self.coverage
    }
}

impl Component for ProductionMetric {
    fn base(&self) -> &Base {
        &self.base
    }

    fn security_attributes(&self) -> Option<&SecurityAttributes> {
        Some(&self.security_attributes)
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let prefix = format!("{}.", output::build_prefix(prefix, self.name(), suffix));
        let mut text = output::line(html, &format!("{}subject", prefix), &self.subject);
        text.push_str(&output::line(html, &format!("{}coverage", prefix), &self.coverage));
        text.push_str(&self.security_attributes.output(html, &prefix));
        text
    }
}

/// Staging form of [`ProductionMetric`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductionMetricBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Subject
    pub subject: String,
    /// Coverage
    pub coverage: String,
    /// Security attributes
    pub security_attributes: SecurityAttributesBuilder,
}

impl Builder for ProductionMetricBuilder {
    type Target = ProductionMetric;

    fn is_empty(&self) -> bool {
        self.subject.trim().is_empty() && self.coverage.trim().is_empty() && self.security_attributes.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<ProductionMetric> {
        ProductionMetric::new(
            version,
            &self.subject,
            &self.coverage,
            self.security_attributes.commit_as(version)?,
        )
    }
}

impl From<&ProductionMetric> for ProductionMetricBuilder {
    fn from(metric: &ProductionMetric) -> Self {
        Self {
            version: Some(metric.version()),
            subject: metric.subject.clone(),
            coverage: metric.coverage.clone(),
            security_attributes: SecurityAttributesBuilder::from(&metric.security_attributes),
        }
    }
}

/// A non-state actor the resource is about. DDMS 4.1 or later.
#[derive(Debug, Clone, PartialEq)]
pub struct NonStateActor {
    base: Base,
    value: String,
    order: Option<i64>,
    qualifier: String,
    security_attributes: SecurityAttributes,
}

impl NonStateActor {
    /// Parse a `ddms:nonStateActor` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let order = parse_order(own_attribute(&element, "order")).map_err(|e| e.locate(&qname))?;
        let security_attributes =
            SecurityAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        Self {
            value: element.text().to_string(),
            order,
            qualifier: own_attribute(&element, "qualifier").to_string(),
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from a value, an optional order, a qualifier and security attributes
    pub fn new(
        version: Version,
        value: &str,
        order: Option<i64>,
        qualifier: &str,
        security_attributes: SecurityAttributes,
    ) -> Result<Self> {
        let mut element = ddms_element(version, "nonStateActor");
        let qname = element.qualified_name();
        if !value.is_empty() {
            element.set_text(value);
        }
        let order_text = order.map(|o| o.to_string()).unwrap_or_default();
        set_ddms_attribute(&mut element, version, "order", &order_text);
        set_ddms_attribute(&mut element, version, "qualifier", qualifier);
        security_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&qname))?;
        Self {
            value: value.to_string(),
            order,
            qualifier: qualifier.to_string(),
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        if self.value.is_empty() {
            self.base.warn("A ddms:nonStateActor element was found with no value.");
        }
        let attribute_warnings = self.security_attributes.warnings().to_vec();
        self.base.absorb_attributes(&attribute_warnings);
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        require_ddms_element(self.element(), self.version(), "nonStateActor")?;
        if !self.qualifier.is_empty() {
            validate_uri(&self.qualifier)?;
        }
        require_version(self.version(), Version::V4_1, "ddms:nonStateActor element")
    }

    /// The actor name
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The relative order among actors
    pub fn order(&self) -> Option<i64> {
        self.order
    }

    /// The vocabulary URI
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }
}

fn parse_order(value: &str) -> Result<Option<i64>> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .trim()
        .parse::<i64>()
        .map(Some)
        .map_err(|_| Error::invalid("The order attribute must be an integer."))
}

impl Component for NonStateActor {
    fn base(&self) -> &Base {
        &self.base
    }

    fn security_attributes(&self) -> Option<&SecurityAttributes> {
        Some(&self.security_attributes)
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let prefix = format!("{}.", output::build_prefix(prefix, self.name(), suffix));
        let order = self.order.map(|o| o.to_string()).unwrap_or_default();
        let mut text = output::line(html, &format!("{}value", prefix), &self.value);
        text.push_str(&output::line(html, &format!("{}order", prefix), &order));
        text.push_str(&output::line(html, &format!("{}qualifier", prefix), &self.qualifier));
        text.push_str(&self.security_attributes.output(html, &prefix));
        text
    }
}

/// Staging form of [`NonStateActor`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NonStateActorBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Actor name
    pub value: String,
    /// Relative order
    pub order: Option<i64>,
    /// Vocabulary URI
    pub qualifier: String,
    /// Security attributes
    pub security_attributes: SecurityAttributesBuilder,
}

impl Builder for NonStateActorBuilder {
    type Target = NonStateActor;

    fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
            && self.order.is_none()
            && self.qualifier.trim().is_empty()
            && self.security_attributes.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<NonStateActor> {
        NonStateActor::new(
            version,
            &self.value,
            self.order,
            &self.qualifier,
            self.security_attributes.commit_as(version)?,
        )
    }
}

impl From<&NonStateActor> for NonStateActorBuilder {
    fn from(actor: &NonStateActor) -> Self {
        Self {
            version: Some(actor.version()),
            value: actor.value.clone(),
            order: actor.order,
            qualifier: actor.qualifier.clone(),
            security_attributes: SecurityAttributesBuilder::from(&actor.security_attributes),
        }
    }
}

/// What the resource is about
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectCoverage {
    base: Base,
    keywords: Vec<Arc<Keyword>>,
    categories: Vec<Arc<Category>>,
    production_metrics: Vec<Arc<ProductionMetric>>,
    non_state_actors: Vec<Arc<NonStateActor>>,
    security_attributes: SecurityAttributes,
}

fn parse_all<T>(
    content: &Element,
    local_name: &str,
    parse: impl Fn(Element) -> Result<T>,
) -> Result<Vec<Arc<T>>> {
    let namespace = content.namespace().unwrap_or("");
    content
        .children_named(namespace, local_name)
        .map(|child| {
            parse(child.clone())
                .map(Arc::new)
                .map_err(|e| locate_in_wrapper(e, content, SUBJECT))
        })
        .collect()
}

impl SubjectCoverage {
    /// Parse a `ddms:subjectCoverage` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let content = content_element(&element, version, SUBJECT)
            .cloned()
            .unwrap_or_else(|| element.clone());
        let keywords = parse_all(&content, "keyword", |e| Keyword::from_element(e, version))
            .map_err(|e| e.locate(&qname))?;
        let categories = parse_all(&content, "category", |e| Category::from_element(e, version))
            .map_err(|e| e.locate(&qname))?;
        let production_metrics =
            parse_all(&content, "productionMetric", |e| ProductionMetric::from_element(e, version))
                .map_err(|e| e.locate(&qname))?;
        let non_state_actors =
            parse_all(&content, "nonStateActor", |e| NonStateActor::from_element(e, version))
                .map_err(|e| e.locate(&qname))?;
        let security_attributes =
            SecurityAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        Self {
            keywords,
            categories,
            production_metrics,
            non_state_actors,
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from nested components and security attributes
    pub fn new(
        version: Version,
        keywords: Vec<Arc<Keyword>>,
        categories: Vec<Arc<Category>>,
        production_metrics: Vec<Arc<ProductionMetric>>,
        non_state_actors: Vec<Arc<NonStateActor>>,
        security_attributes: SecurityAttributes,
    ) -> Result<Self> {
        let mut element = ddms_element(version, "subjectCoverage");
        let qname = element.qualified_name();
        let children = keywords
            .iter()
            .map(|k| k.element().clone())
            .chain(categories.iter().map(|c| c.element().clone()))
            .chain(production_metrics.iter().map(|m| m.element().clone()))
            .chain(non_state_actors.iter().map(|a| a.element().clone()))
            .collect();
        add_wrapped(&mut element, version, SUBJECT, children);
        security_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&qname))?;
        Self {
            keywords,
            categories,
            production_metrics,
            non_state_actors,
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        if has_duplicates(&self.keywords) {
            self.base.warn("1 or more keywords have the same value.");
        }
        if has_duplicates(&self.categories) {
            self.base.warn("1 or more categories have the same value.");
        }
        if has_duplicates(&self.production_metrics) {
            self.base.warn("1 or more productionMetrics have the same value.");
        }
        let children: Vec<Arc<dyn Component>> = self.children();
        for child in &children {
            self.base.absorb(&**child);
        }
        let attribute_warnings = self.security_attributes.warnings().to_vec();
        self.base.absorb_attributes(&attribute_warnings);
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let version = self.version();
        require_ddms_element(self.element(), version, "subjectCoverage")?;
        content_element(self.element(), version, SUBJECT)
            .ok_or_else(|| Error::invalid("Subject element is required."))?;
        if self.keywords.len() + self.categories.len() < 1 {
            return Err(Error::invalid("At least 1 keyword or category must exist."));
        }
        for child in self.children() {
            require_compatible(version, &*child)?;
        }
        require_security_since(version, Version::V3_0, &self.security_attributes)
    }

    fn children(&self) -> Vec<Arc<dyn Component>> {
        let mut children: Vec<Arc<dyn Component>> = Vec::new();
        children.extend(self.keywords.iter().map(|k| k.clone() as Arc<dyn Component>));
        children.extend(self.categories.iter().map(|c| c.clone() as Arc<dyn Component>));
        children.extend(self.production_metrics.iter().map(|m| m.clone() as Arc<dyn Component>));
        children.extend(self.non_state_actors.iter().map(|a| a.clone() as Arc<dyn Component>));
        children
    }

    /// The keywords
    pub fn keywords(&self) -> &[Arc<Keyword>] {
        &self.keywords
    }

    /// The categories
    pub fn categories(&self) -> &[Arc<Category>] {
        &self.categories
    }

    /// The production metrics
    pub fn production_metrics(&self) -> &[Arc<ProductionMetric>] {
        &self.production_metrics
    }

    /// The non-state actors
    pub fn non_state_actors(&self) -> &[Arc<NonStateActor>] {
        &self.non_state_actors
    }
}

fn has_duplicates<T: Component>(items: &[Arc<T>]) -> bool {
    let unique: HashSet<String> = items.iter().map(|i| i.to_xml()).collect();
    unique.len() != items.len()
}

impl Component for SubjectCoverage {
    fn base(&self) -> &Base {
        &self.base
    }

    fn security_attributes(&self) -> Option<&SecurityAttributes> {
        Some(&self.security_attributes)
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let mut prefix = format!("{}.", output::build_prefix(prefix, self.name(), suffix));
        if !self.version().is_at_least(Version::V4_0_1) {
            prefix.push_str(SUBJECT);
            prefix.push('.');
        }
        let mut text = output::components(html, &prefix, &self.keywords);
        text.push_str(&output::components(html, &prefix, &self.categories));
        text.push_str(&output::components(html, &prefix, &self.production_metrics));
        text.push_str(&output::components(html, &prefix, &self.non_state_actors));
        text.push_str(&self.security_attributes.output(html, &prefix));
        text
    }
}

/// Staging form of [`SubjectCoverage`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubjectCoverageBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Keywords
    pub keywords: BuilderList<KeywordBuilder>,
    /// Categories
    pub categories: BuilderList<CategoryBuilder>,
    /// Production metrics
    pub production_metrics: BuilderList<ProductionMetricBuilder>,
    /// Non-state actors
    pub non_state_actors: BuilderList<NonStateActorBuilder>,
    /// Security attributes
    pub security_attributes: SecurityAttributesBuilder,
}

impl Builder for SubjectCoverageBuilder {
    type Target = SubjectCoverage;

    fn is_empty(&self) -> bool {
        self.keywords.is_empty()
            && self.categories.is_empty()
            && self.production_metrics.is_empty()
            && self.non_state_actors.is_empty()
            && self.security_attributes.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<SubjectCoverage> {
        SubjectCoverage::new(
            version,
            self.keywords.commit_all(version)?,
            self.categories.commit_all(version)?,
            self.production_metrics.commit_all(version)?,
            self.non_state_actors.commit_all(version)?,
            self.security_attributes.commit_as(version)?,
        )
    }
}

impl From<&SubjectCoverage> for SubjectCoverageBuilder {
    fn from(coverage: &SubjectCoverage) -> Self {
        Self {
            version: Some(coverage.version()),
            keywords: coverage.keywords.iter().map(|k| KeywordBuilder::from(&**k)).collect::<Vec<_>>().into(),
            categories: coverage.categories.iter().map(|c| CategoryBuilder::from(&**c)).collect::<Vec<_>>().into(),
            production_metrics: coverage
                .production_metrics
                .iter()
                .map(|m| ProductionMetricBuilder::from(&**m))
                .collect::<Vec<_>>()
                .into(),
            non_state_actors: coverage
                .non_state_actors
                .iter()
                .map(|a| NonStateActorBuilder::from(&**a))
                .collect::<Vec<_>>()
                .into(),
            security_attributes: SecurityAttributesBuilder::from(&coverage.security_attributes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::parse_element;
    use pretty_assertions::assert_eq;

    fn keyword(version: Version, value: &str) -> Arc<Keyword> {
        Arc::new(
            Keyword::new(
                version,
                value,
                SecurityAttributes::empty(version),
                ExtensibleAttributes::empty(version),
            )
            .unwrap(),
        )
    }

    fn category(version: Version) -> Arc<Category> {
        Arc::new(
            Category::new(
                version,
                "urn:buri:ddmsence:categories",
                "DDMS",
                "DDMS",
                SecurityAttributes::empty(version),
                ExtensibleAttributes::empty(version),
            )
            .unwrap(),
        )
    }

    fn coverage(version: Version, keywords: Vec<Arc<Keyword>>) -> Result<SubjectCoverage> {
        SubjectCoverage::new(
            version,
            keywords,
            vec![category(version)],
            vec![],
            vec![],
            SecurityAttributes::empty(version),
        )
    }

    #[test]
    fn test_output_indexes_repeated_keywords() {
        let v = Version::V5_0;
        let subject = coverage(v, vec![keyword(v, "DDMSence"), keyword(v, "Uri")]).unwrap();
        assert_eq!(
            subject.to_text(),
            "subjectCoverage.keyword[1]: DDMSence\nsubjectCoverage.keyword[2]: Uri\n\
subjectCoverage.category.qualifier: urn:buri:ddmsence:categories\n\
subjectCoverage.category.code: DDMS\nsubjectCoverage.category.label: DDMS\n"
        );
    }

    #[test]
    fn test_subject_wrapper_before_4_0_1() {
        let v = Version::V3_1;
        let subject = coverage(v, vec![keyword(v, "DDMSence")]).unwrap();
        assert!(subject.to_xml().contains("<ddms:Subject>"));
        assert!(subject.to_text().starts_with("subjectCoverage.Subject.keyword: DDMSence\n"));
        let parsed = SubjectCoverage::from_element(parse_element(&subject.to_xml()).unwrap(), v).unwrap();
        assert_eq!(parsed, subject);
    }

    #[test]
    fn test_requires_keyword_or_category() {
        let v = Version::V5_0;
        let err = SubjectCoverage::new(v, vec![], vec![], vec![], vec![], SecurityAttributes::empty(v)).unwrap_err();
        assert_eq!(err.message(), Some("At least 1 keyword or category must exist."));
        assert_eq!(err.locator(), Some("/ddms:subjectCoverage"));
    }

    #[test]
    fn test_duplicate_keywords_warn() {
        let v = Version::V5_0;
        let subject = coverage(v, vec![keyword(v, "same"), keyword(v, "same")]).unwrap();
        assert_eq!(subject.warnings().len(), 1);
        assert_eq!(subject.warnings()[0].text, "1 or more keywords have the same value.");
    }

    #[test]
    fn test_keyword_security_gated() {
        let v = Version::V3_1;
        let err = Keyword::new(
            v,
            "x",
            SecurityAttributes::classified(v, "U", &["USA"]).unwrap(),
            ExtensibleAttributes::empty(v),
        )
        .unwrap_err();
        assert_eq!(
            err.message(),
            Some("Security attributes cannot be applied to this component until DDMS 4.0.1 or later.")
        );
    }

    #[test]
    fn test_non_state_actor_gated_and_warned() {
        let err = NonStateActor::new(Version::V4_0_1, "Laotian Monks", Some(1), "", SecurityAttributes::empty(Version::V4_0_1))
            .unwrap_err();
        assert_eq!(
            err.message(),
            Some("The ddms:nonStateActor element cannot be used until DDMS 4.1 or later.")
        );
        let empty = NonStateActor::new(Version::V4_1, "", None, "", SecurityAttributes::empty(Version::V4_1)).unwrap();
        assert_eq!(empty.warnings()[0].text, "A ddms:nonStateActor element was found with no value.");
        let actor = NonStateActor::new(Version::V5_0, "Laotian Monks", Some(1), "", SecurityAttributes::empty(Version::V5_0))
            .unwrap();
        assert_eq!(actor.to_text(), "nonStateActor.value: Laotian Monks\nnonStateActor.order: 1\n");
    }

    #[test]
    fn test_production_metric_requires_subject() {
        let v = Version::V5_0;
        let err = ProductionMetric::new(v, "", "AFG", SecurityAttributes::empty(v)).unwrap_err();
        assert_eq!(err.message(), Some("subject attribute is required."));
        let bad = parse_element(
            r#"<ddms:subjectCoverage xmlns:ddms="urn:us:mil:ces:metadata:ddms:5"><ddms:keyword ddms:value="x" /><ddms:productionMetric ddms:coverage="AFG" /></ddms:subjectCoverage>"#,
        )
        .unwrap();
        let err = SubjectCoverage::from_element(bad, v).unwrap_err();
        assert_eq!(err.locator(), Some("/ddms:subjectCoverage/ddms:productionMetric"));
    }

    #[test]
    fn test_builder_round_trip() {
        let v = Version::V5_0;
        let subject = coverage(v, vec![keyword(v, "DDMSence")]).unwrap();
        let mut builder = SubjectCoverageBuilder::from(&subject);
        assert_eq!(builder.commit().unwrap().unwrap(), subject);
        builder.keywords.ensure_len(3);
        assert_eq!(builder.keywords.len(), 3);
        assert_eq!(builder.commit().unwrap().unwrap().keywords().len(), 1);
        assert!(SubjectCoverageBuilder::default().commit().unwrap().is_none());
    }
}
