//! The `ddms:security` element and the notices and need-to-know markings it holds

pub mod notice;
pub mod ntk;

pub use notice::{Notice, NoticeBuilder, NoticeList, NoticeListBuilder, NoticeText, NoticeTextBuilder};
pub use ntk::{
    Access, AccessBuilder, AccessEntity, AccessEntityBuilder, AccessEntityKind, NtkString, NtkStringBuilder,
    NtkStringKind, ProfileList, ProfileListBuilder,
};

use crate::attributes::{SecurityAttributes, SecurityAttributesBuilder};
use crate::components::helpers::{ddms_element, require_child_count, require_compatible, require_ddms_element, set_schema_attribute};
use crate::components::{output, Base, Builder, Component};
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::versions::{SchemaKind, Version};
use std::sync::Arc;

const EXCLUDE_FROM_ROLLUP: &str = "excludeFromRollup";
const FIXED_ROLLUP: &str = "true";

/// The security markings of the whole resource
#[derive(Debug, Clone, PartialEq)]
pub struct Security {
    base: Base,
    exclude_from_rollup: Option<bool>,
    notice_list: Option<Arc<NoticeList>>,
    access: Option<Arc<Access>>,
    security_attributes: SecurityAttributes,
}

impl Security {
    /// Parse a `ddms:security` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let notice_list = element
            .first_child(version.ddms_namespace(), "noticeList")
            .map(|child| NoticeList::from_element(child.clone(), version).map(Arc::new))
            .transpose()
            .map_err(|e| e.locate(&qname))?;
        let access = match version.namespace_for(SchemaKind::Ntk) {
            Ok(namespace) => element
                .first_child(namespace, "Access")
                .map(|child| Access::from_element(child.clone(), version).map(Arc::new))
                .transpose()
                .map_err(|e| e.locate(&qname))?,
            Err(_) => None,
        };
        let exclude_from_rollup = element
            .attribute(Some(version.ism_namespace()), EXCLUDE_FROM_ROLLUP)
            .map(|value| value == FIXED_ROLLUP);
        let security_attributes =
            SecurityAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        Self {
            exclude_from_rollup,
            notice_list,
            access,
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from an optional notice list, optional access markings and
    /// security attributes. `ISM:excludeFromRollup="true"` is added from DDMS 3.0.
    pub fn new(
        version: Version,
        notice_list: Option<Arc<NoticeList>>,
        access: Option<Arc<Access>>,
        security_attributes: SecurityAttributes,
    ) -> Result<Self> {
        let mut element = ddms_element(version, "security");
        let qname = element.qualified_name();
        let exclude_from_rollup = if version.is_at_least(Version::V3_0) {
            set_schema_attribute(&mut element, version, SchemaKind::Ism, EXCLUDE_FROM_ROLLUP, FIXED_ROLLUP)?;
            Some(true)
        } else {
            None
        };
        if let Some(list) = &notice_list {
            element.add_child(list.element().clone());
        }
        if let Some(access) = &access {
            element.add_child(access.element().clone());
        }
        security_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&qname))?;
        Self {
            exclude_from_rollup,
            notice_list,
            access,
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        if let Some(list) = self.notice_list.clone() {
            self.base.absorb(&*list);
        }
        if let Some(access) = self.access.clone() {
            self.base.absorb(&*access);
        }
        let attribute_warnings = self.security_attributes.warnings().to_vec();
        self.base.absorb_attributes(&attribute_warnings);
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let version = self.version();
        require_ddms_element(self.element(), version, "security")?;
        require_child_count(self.element(), "noticeList", 0, 1)?;
        if let Ok(namespace) = version.namespace_for(SchemaKind::Ntk) {
            if self.element().children_named(namespace, "Access").count() > 1 {
                return Err(Error::invalid("No more than 1 ntk:Access element can exist."));
            }
        }
        if version.is_at_least(Version::V3_0) {
            match self.exclude_from_rollup {
                None => return Err(Error::invalid("The excludeFromRollup attribute is required.")),
                Some(false) => {
                    return Err(Error::invalid(format!(
                        "The excludeFromRollup attribute must have a fixed value of \"{}\".",
                        FIXED_ROLLUP
                    )))
                }
                Some(true) => {}
            }
        } else if self.exclude_from_rollup.is_some() {
            return Err(Error::invalid(
                "The excludeFromRollup attribute cannot be used until DDMS 3.0 or later.",
            ));
        }
        if let Some(list) = &self.notice_list {
            require_compatible(version, &**list)?;
        }
        if let Some(access) = &self.access {
            require_compatible(version, &**access)?;
        }
        self.security_attributes.require_classification()
    }

    /// `ISM:excludeFromRollup`, absent before DDMS 3.0
    pub fn exclude_from_rollup(&self) -> Option<bool> {
        self.exclude_from_rollup
    }

    /// The notice list, if any
    pub fn notice_list(&self) -> Option<&Arc<NoticeList>> {
        self.notice_list.as_ref()
    }

    /// The need-to-know markings, if any
    pub fn access(&self) -> Option<&Arc<Access>> {
        self.access.as_ref()
    }
}

impl Component for Security {
    fn base(&self) -> &Base {
        &self.base
    }

    fn security_attributes(&self) -> Option<&SecurityAttributes> {
        Some(&self.security_attributes)
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let prefix = format!("{}.", output::build_prefix(prefix, self.name(), suffix));
        let mut text = String::new();
        if let Some(exclude) = self.exclude_from_rollup {
            text.push_str(&output::line_always(
                html,
                &format!("{}{}", prefix, EXCLUDE_FROM_ROLLUP),
                &exclude.to_string(),
            ));
        }
        text.push_str(&output::optional(html, &prefix, self.notice_list.as_ref()));
        text.push_str(&output::optional(html, &prefix, self.access.as_ref()));
        text.push_str(&self.security_attributes.output(html, &prefix));
        text
    }
}

/// Staging form of [`Security`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecurityBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Notice list
    pub notice_list: NoticeListBuilder,
    /// Need-to-know markings
    pub access: AccessBuilder,
    /// Security attributes
    pub security_attributes: SecurityAttributesBuilder,
}

impl Builder for SecurityBuilder {
    type Target = Security;

    fn is_empty(&self) -> bool {
        self.notice_list.is_empty() && self.access.is_empty() && self.security_attributes.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<Security> {
        Security::new(
            version,
            self.notice_list.commit_as(version)?.map(Arc::new),
            self.access.commit_as(version)?.map(Arc::new),
            self.security_attributes.commit_as(version)?,
        )
    }
}

impl From<&Security> for SecurityBuilder {
    fn from(security: &Security) -> Self {
        Self {
            version: Some(security.version()),
            notice_list: security
                .notice_list
                .as_deref()
                .map(NoticeListBuilder::from)
                .unwrap_or_default(),
            access: security.access.as_deref().map(AccessBuilder::from).unwrap_or_default(),
            security_attributes: SecurityAttributesBuilder::from(&security.security_attributes),
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

    pub(crate) fn security(version: Version) -> Security {
        Security::new(version, None, None, unclassified(version)).unwrap()
    }

    #[test]
    fn test_security_output() {
        assert_eq!(
            security(Version::V3_1).to_text(),
            "security.excludeFromRollup: true\nsecurity.classification: U\nsecurity.ownerProducer: USA\n"
        );
        assert_eq!(
            security(Version::V2_0).to_text(),
            "security.classification: U\nsecurity.ownerProducer: USA\n"
        );
    }

    #[test]
    fn test_round_trip_all_versions() {
        for version in Version::ALL {
            let built = security(version);
            let parsed = Security::from_element(parse_element(&built.to_xml()).unwrap(), version).unwrap();
            assert_eq!(parsed, built);
            assert!(parsed.warnings().is_empty());
        }
    }

    #[test]
    fn test_notices_and_access() {
        let v = Version::V5_0;
        let list = Arc::new(notice::tests::notice_list(v));
        let access = Arc::new(ntk::tests::access(v));
        let built = Security::new(v, Some(list), Some(access), unclassified(v)).unwrap();
        let parsed = Security::from_element(parse_element(&built.to_xml()).unwrap(), v).unwrap();
        assert_eq!(parsed, built);
        assert!(parsed.to_text().contains("security.noticeList.notice.noticeText: noticeText\n"));
        assert!(parsed.to_text().contains("security.access.groupList.group.groupValue: WISE/RODCA\n"));
        assert_eq!(SecurityBuilder::from(&built).commit().unwrap().unwrap(), built);
    }

    #[test]
    fn test_exclude_from_rollup_rules() {
        let v = Version::V3_1;
        let missing = format!(
            "<ddms:security xmlns:ddms=\"{}\" xmlns:ISM=\"{}\" ISM:classification=\"U\" ISM:ownerProducer=\"USA\" />",
            v.ddms_namespace(),
            v.ism_namespace()
        );
        let err = Security::from_element(parse_element(&missing).unwrap(), v).unwrap_err();
        assert_eq!(err.message(), Some("The excludeFromRollup attribute is required."));
        assert_eq!(err.locator(), Some("/ddms:security"));

        let wrong = missing.replace("ISM:classification", "ISM:excludeFromRollup=\"false\" ISM:classification");
        let err = Security::from_element(parse_element(&wrong).unwrap(), v).unwrap_err();
        assert_eq!(
            err.message(),
            Some("The excludeFromRollup attribute must have a fixed value of \"true\".")
        );

        let old = Version::V2_0;
        let early = format!(
            "<ddms:security xmlns:ddms=\"{}\" xmlns:ISM=\"{}\" ISM:excludeFromRollup=\"true\" ISM:classification=\"U\" ISM:ownerProducer=\"USA\" />",
            old.ddms_namespace(),
            old.ism_namespace()
        );
        let err = Security::from_element(parse_element(&early).unwrap(), old).unwrap_err();
        assert_eq!(
            err.message(),
            Some("The excludeFromRollup attribute cannot be used until DDMS 3.0 or later.")
        );
    }

    #[test]
    fn test_classification_required() {
        let err = Security::new(Version::V5_0, None, None, SecurityAttributes::empty(Version::V5_0)).unwrap_err();
        assert_eq!(err.message(), Some("classification is required."));
    }

    #[test]
    fn test_empty_builder() {
        let builder = SecurityBuilder::default();
        assert!(builder.is_empty());
        assert!(builder.commit().unwrap().is_none());
    }
}
