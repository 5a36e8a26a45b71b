//! Notices: `ddms:noticeList`, `ISM:Notice` and `ISM:NoticeText`

use crate::attributes::{NoticeAttributes, SecurityAttributes, SecurityAttributesBuilder};
use crate::components::helpers::{
    ddms_element, require_compatible, require_ddms_element, require_schema_element, require_version,
    schema_element, set_schema_attribute, split_list, xs_list,
};
use crate::components::{output, Base, Builder, BuilderList, Component};
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::versions::{SchemaKind, Version};
use crate::vocabulary::{self, validate_enumeration};
use std::sync::Arc;

/// The text of a notice, optionally tagged with point-of-contact types
#[derive(Debug, Clone, PartialEq)]
pub struct NoticeText {
    base: Base,
    value: String,
    poc_types: Vec<String>,
    security_attributes: SecurityAttributes,
}

impl NoticeText {
    /// Parse an `ISM:NoticeText` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let security_attributes =
            SecurityAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        let poc_types = split_list(element.attribute_value(version.ism_namespace(), "pocType"));
        Self {
            value: element.text().to_string(),
            poc_types,
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from text, point-of-contact types and security attributes
    pub fn new(
        version: Version,
        value: &str,
        poc_types: Vec<String>,
        security_attributes: SecurityAttributes,
    ) -> Result<Self> {
        let mut element = schema_element(version, SchemaKind::Ism, "NoticeText")?;
        let qname = element.qualified_name();
        if !value.is_empty() {
            element.set_text(value);
        }
        security_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&qname))?;
        set_schema_attribute(&mut element, version, SchemaKind::Ism, "pocType", &xs_list(&poc_types))?;
        Self {
            value: value.to_string(),
            poc_types,
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
        if self.value.is_empty() {
            self.base.warn("An ISM:NoticeText element was found with no value.");
        }
        let attribute_warnings = self.security_attributes.warnings().to_vec();
        self.base.absorb_attributes(&attribute_warnings);
        Ok(self)
    }

    fn validate(&self) -> Result<Vec<String>> {
        let version = self.version();
        require_schema_element(self.element(), version, SchemaKind::Ism, "NoticeText")?;
        require_version(version, Version::V4_0_1, "ISM:NoticeText element")?;
        self.security_attributes.require_classification()?;
        let mut warnings = Vec::new();
        for poc_type in &self.poc_types {
            if let Some(warning) = validate_enumeration(vocabulary::POC_TYPE, poc_type, version)? {
                warnings.push(warning.text);
            }
        }
        Ok(warnings)
    }

    /// The notice text
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Point-of-contact types
    pub fn poc_types(&self) -> &[String] {
        &self.poc_types
    }
}

impl Component for NoticeText {
    fn base(&self) -> &Base {
        &self.base
    }

    fn security_attributes(&self) -> Option<&SecurityAttributes> {
        Some(&self.security_attributes)
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let name = output::build_prefix(prefix, "noticeText", suffix);
        let mut text = output::line_always(html, &name, &self.value);
        text.push_str(&output::line(html, &format!("{}.pocType", name), &xs_list(&self.poc_types)));
        text.push_str(&self.security_attributes.output(html, &format!("{}.", name)));
        text
    }
}

/// Staging form of [`NoticeText`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoticeTextBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Text
    pub value: String,
    /// Point-of-contact types
    pub poc_types: Vec<String>,
    /// Security attributes
    pub security_attributes: SecurityAttributesBuilder,
}

impl Builder for NoticeTextBuilder {
    type Target = NoticeText;

    fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
            && self.poc_types.iter().all(|p| p.trim().is_empty())
            && self.security_attributes.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<NoticeText> {
        let poc_types = self.poc_types.iter().filter(|p| !p.trim().is_empty()).cloned().collect();
        NoticeText::new(version, &self.value, poc_types, self.security_attributes.commit_as(version)?)
    }
}

impl From<&NoticeText> for NoticeTextBuilder {
    fn from(text: &NoticeText) -> Self {
        Self {
            version: Some(text.version()),
            value: text.value.clone(),
            poc_types: text.poc_types.clone(),
            security_attributes: SecurityAttributesBuilder::from(&text.security_attributes),
        }
    }
}

/// One notice made of one or more notice texts
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    base: Base,
    notice_texts: Vec<Arc<NoticeText>>,
    security_attributes: SecurityAttributes,
    notice_attributes: NoticeAttributes,
}

impl Notice {
    /// Parse an `ISM:Notice` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let notice_texts = element
            .children_named(version.ism_namespace(), "NoticeText")
            .map(|child| NoticeText::from_element(child.clone(), version).map(Arc::new))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.locate(&qname))?;
        let security_attributes =
            SecurityAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        let notice_attributes = NoticeAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        Self {
            notice_texts,
            security_attributes,
            notice_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from notice texts and attribute groups
    pub fn new(
        version: Version,
        notice_texts: Vec<Arc<NoticeText>>,
        security_attributes: SecurityAttributes,
        notice_attributes: NoticeAttributes,
    ) -> Result<Self> {
        let mut element = schema_element(version, SchemaKind::Ism, "Notice")?;
        let qname = element.qualified_name();
        for text in &notice_texts {
            element.add_child(text.element().clone());
        }
        security_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&qname))?;
        notice_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&qname))?;
        Self {
            notice_texts,
            security_attributes,
            notice_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        for text in self.notice_texts.clone() {
            self.base.absorb(&*text);
        }
        let mut attribute_warnings = self.security_attributes.warnings().to_vec();
        attribute_warnings.extend_from_slice(self.notice_attributes.warnings());
        self.base.absorb_attributes(&attribute_warnings);
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let version = self.version();
        require_schema_element(self.element(), version, SchemaKind::Ism, "Notice")?;
        if self.notice_texts.is_empty() {
            return Err(Error::invalid(
                "At least one ISM:NoticeText must exist within an ISM:Notice element.",
            ));
        }
        require_version(version, Version::V4_0_1, "ISM:Notice element")?;
        self.security_attributes.require_classification()?;
        for text in &self.notice_texts {
            require_compatible(version, &**text)?;
        }
        Ok(())
    }

    /// The notice texts
    pub fn notice_texts(&self) -> &[Arc<NoticeText>] {
        &self.notice_texts
    }

    /// The notice attributes
    pub fn notice_attributes(&self) -> &NoticeAttributes {
        &self.notice_attributes
    }
}

impl Component for Notice {
    fn base(&self) -> &Base {
        &self.base
    }

    fn security_attributes(&self) -> Option<&SecurityAttributes> {
        Some(&self.security_attributes)
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let prefix = format!("{}.", output::build_prefix(prefix, "notice", suffix));
        let mut text = output::components(html, &prefix, &self.notice_texts);
        text.push_str(&self.security_attributes.output(html, &prefix));
        text.push_str(&self.notice_attributes.output(html, &prefix));
        text
    }
}

/// Staging form of [`Notice`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoticeBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Notice texts
    pub notice_texts: BuilderList<NoticeTextBuilder>,
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
}

impl Builder for NoticeBuilder {
    type Target = Notice;

    fn is_empty(&self) -> bool {
        self.notice_texts.is_empty()
            && self.security_attributes.is_empty()
            && [
                &self.notice_type,
                &self.notice_reason,
                &self.notice_date,
                &self.unregistered_notice_type,
            ]
            .iter()
            .all(|v| v.trim().is_empty())
            && self.external_notice.is_none()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<Notice> {
        let notice_attributes = NoticeAttributes::new(
            version,
            &self.notice_type,
            &self.notice_reason,
            &self.notice_date,
            &self.unregistered_notice_type,
            self.external_notice,
        )?;
        Notice::new(
            version,
            self.notice_texts.commit_all(version)?,
            self.security_attributes.commit_as(version)?,
            notice_attributes,
        )
    }
}

impl From<&Notice> for NoticeBuilder {
    fn from(notice: &Notice) -> Self {
        let attributes = &notice.notice_attributes;
        Self {
            version: Some(notice.version()),
            notice_texts: notice
                .notice_texts
                .iter()
                .map(|t| NoticeTextBuilder::from(&**t))
                .collect::<Vec<_>>()
                .into(),
            security_attributes: SecurityAttributesBuilder::from(&notice.security_attributes),
            notice_type: attributes.notice_type().to_string(),
            notice_reason: attributes.notice_reason().to_string(),
            notice_date: attributes.notice_date().to_string(),
            unregistered_notice_type: attributes.unregistered_notice_type().to_string(),
            external_notice: attributes.external_notice(),
        }
    }
}

/// `ddms:noticeList`, the notices attached to a security element
#[derive(Debug, Clone, PartialEq)]
pub struct NoticeList {
    base: Base,
    notices: Vec<Arc<Notice>>,
    security_attributes: SecurityAttributes,
}

impl NoticeList {
    /// Parse a `ddms:noticeList` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let notices = element
            .children_named(version.ism_namespace(), "Notice")
            .map(|child| Notice::from_element(child.clone(), version).map(Arc::new))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.locate(&qname))?;
        let security_attributes =
            SecurityAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        Self {
            notices,
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from notices and security attributes
    pub fn new(version: Version, notices: Vec<Arc<Notice>>, security_attributes: SecurityAttributes) -> Result<Self> {
        let mut element = ddms_element(version, "noticeList");
        let qname = element.qualified_name();
        for notice in &notices {
            element.add_child(notice.element().clone());
        }
        security_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&qname))?;
        Self {
            notices,
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        for notice in self.notices.clone() {
            self.base.absorb(&*notice);
        }
        let attribute_warnings = self.security_attributes.warnings().to_vec();
        self.base.absorb_attributes(&attribute_warnings);
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let version = self.version();
        require_ddms_element(self.element(), version, "noticeList")?;
        if self.notices.is_empty() {
            return Err(Error::invalid(
                "At least one ISM:Notice must exist within a ddms:noticeList element.",
            ));
        }
        self.security_attributes.require_classification()?;
        require_version(version, Version::V4_0_1, "ddms:noticeList element")?;
        for notice in &self.notices {
            require_compatible(version, &**notice)?;
        }
        Ok(())
    }

    /// The notices
    pub fn notices(&self) -> &[Arc<Notice>] {
        &self.notices
    }
}

impl Component for NoticeList {
    fn base(&self) -> &Base {
        &self.base
    }

    fn security_attributes(&self) -> Option<&SecurityAttributes> {
        Some(&self.security_attributes)
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let prefix = format!("{}.", output::build_prefix(prefix, self.name(), suffix));
        let mut text = output::components(html, &prefix, &self.notices);
        text.push_str(&self.security_attributes.output(html, &prefix));
        text
    }
}

/// Staging form of [`NoticeList`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoticeListBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Notices
    pub notices: BuilderList<NoticeBuilder>,
    /// Security attributes
    pub security_attributes: SecurityAttributesBuilder,
}

impl Builder for NoticeListBuilder {
    type Target = NoticeList;

    fn is_empty(&self) -> bool {
        self.notices.is_empty() && self.security_attributes.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<NoticeList> {
        NoticeList::new(
            version,
            self.notices.commit_all(version)?,
            self.security_attributes.commit_as(version)?,
        )
    }
}

impl From<&NoticeList> for NoticeListBuilder {
    fn from(list: &NoticeList) -> Self {
        Self {
            version: Some(list.version()),
            notices: list
                .notices
                .iter()
                .map(|n| NoticeBuilder::from(&**n))
                .collect::<Vec<_>>()
                .into(),
            security_attributes: SecurityAttributesBuilder::from(&list.security_attributes),
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

    pub(crate) fn notice_list(version: Version) -> NoticeList {
        let text = NoticeText::new(version, "noticeText", vec!["DoD-Dist-B".to_string()], unclassified(version))
            .unwrap();
        let notice_attributes = NoticeAttributes::new(version, "DoD-Dist-B", "noticeReason", "2011-09-15", "", None)
            .unwrap();
        let notice = Notice::new(version, vec![Arc::new(text)], unclassified(version), notice_attributes).unwrap();
        NoticeList::new(version, vec![Arc::new(notice)], unclassified(version)).unwrap()
    }

    #[test]
    fn test_notice_list_output() {
        let list = notice_list(Version::V4_1);
        assert_eq!(
            list.to_text(),
            "noticeList.notice.noticeText: noticeText\n\
noticeList.notice.noticeText.pocType: DoD-Dist-B\n\
noticeList.notice.noticeText.classification: U\n\
noticeList.notice.noticeText.ownerProducer: USA\n\
noticeList.notice.classification: U\n\
noticeList.notice.ownerProducer: USA\n\
noticeList.notice.noticeType: DoD-Dist-B\n\
noticeList.notice.noticeReason: noticeReason\n\
noticeList.notice.noticeDate: 2011-09-15\n\
noticeList.classification: U\n\
noticeList.ownerProducer: USA\n"
        );
    }

    #[test]
    fn test_round_trip() {
        let list = notice_list(Version::V5_0);
        let parsed = NoticeList::from_element(parse_element(&list.to_xml()).unwrap(), Version::V5_0).unwrap();
        assert_eq!(parsed, list);
        assert_eq!(NoticeListBuilder::from(&list).commit().unwrap().unwrap(), list);
    }

    #[test]
    fn test_notice_requires_text() {
        let v = Version::V4_1;
        let err = Notice::new(v, vec![], unclassified(v), NoticeAttributes::empty(v)).unwrap_err();
        assert_eq!(
            err.message(),
            Some("At least one ISM:NoticeText must exist within an ISM:Notice element.")
        );
        assert_eq!(err.locator(), Some("/ISM:Notice"));
    }

    #[test]
    fn test_notice_text_gated_and_warned() {
        let err = NoticeText::new(Version::V3_1, "text", vec![], unclassified(Version::V3_1)).unwrap_err();
        assert_eq!(
            err.message(),
            Some("The ISM:NoticeText element cannot be used until DDMS 4.0.1 or later.")
        );
        let empty = NoticeText::new(Version::V4_1, "", vec![], unclassified(Version::V4_1)).unwrap();
        assert_eq!(empty.warnings()[0].text, "An ISM:NoticeText element was found with no value.");
    }

    #[test]
    fn test_notice_list_requires_classification() {
        let v = Version::V4_1;
        let list = notice_list(v);
        let err = NoticeList::new(v, list.notices().to_vec(), SecurityAttributes::empty(v)).unwrap_err();
        assert_eq!(err.message(), Some("classification is required."));
    }
}
