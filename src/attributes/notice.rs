//! ISM notice attributes (DDMS 4.0.1 and later)

use crate::components::helpers::set_schema_attribute;
use crate::components::output;
use crate::datatypes::{is_xs_date, parse_boolean};
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::messages::ValidationMessage;
use crate::versions::{SchemaKind, Version};
use crate::vocabulary::{self, validate_enumeration};

const MAX_LENGTH: usize = 2048;

/// Notice markings that may decorate a resource or a notice
#[derive(Debug, Clone, Default)]
pub struct NoticeAttributes {
    version: Version,
    notice_type: String,
    notice_reason: String,
    notice_date: String,
    unregistered_notice_type: String,
    external_notice: Option<bool>,
    warnings: Vec<ValidationMessage>,
}

impl NoticeAttributes {
    /// Read the notice attributes of an element
    pub fn from_element(element: &Element, version: Version) -> Result<Self> {
        let ns = version.ism_namespace();
        let external = element.attribute(Some(ns), "externalNotice");
        let external_notice = match external {
            Some(value) => Some(parse_boolean(value).ok_or_else(|| {
                Error::invalid("The externalNotice attribute must be a boolean.")
            })?),
            None => None,
        };
        Self::new(
            version,
            element.attribute_value(ns, "noticeType"),
            element.attribute_value(ns, "noticeReason"),
            element.attribute_value(ns, "noticeDate"),
            element.attribute_value(ns, "unregisteredNoticeType"),
            external_notice,
        )
    }

    /// Build from raw values
    pub fn new(
        version: Version,
        notice_type: &str,
        notice_reason: &str,
        notice_date: &str,
        unregistered_notice_type: &str,
        external_notice: Option<bool>,
    ) -> Result<Self> {
        let mut attributes = Self {
            version,
            notice_type: notice_type.to_string(),
            notice_reason: notice_reason.to_string(),
            notice_date: notice_date.to_string(),
            unregistered_notice_type: unregistered_notice_type.to_string(),
            external_notice,
            warnings: Vec::new(),
        };
        attributes.validate()?;
        Ok(attributes)
    }

    /// An empty attribute group
    pub fn empty(version: Version) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    fn validate(&mut self) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        if !self.version.is_at_least(Version::V4_0_1) {
            return Err(Error::invalid(
                "Notice attributes cannot be used until DDMS 4.0.1 or later.",
            ));
        }
        if !self.notice_type.is_empty() {
            if let Some(warning) =
                validate_enumeration(vocabulary::NOTICE, &self.notice_type, self.version)?
            {
                self.warnings.push(warning);
            }
        }
        if self.notice_reason.chars().count() > MAX_LENGTH {
            return Err(Error::invalid(format!(
                "The noticeReason attribute must be shorter than {} characters.",
                MAX_LENGTH
            )));
        }
        if self.unregistered_notice_type.chars().count() > MAX_LENGTH {
            return Err(Error::invalid(format!(
                "The unregisteredNoticeType attribute must be shorter than {} characters.",
                MAX_LENGTH
            )));
        }
        if !self.notice_date.is_empty() && !is_xs_date(&self.notice_date) {
            return Err(Error::invalid(
                "The noticeDate attribute must be in the xs:date format (YYYY-MM-DD).",
            ));
        }
        if self.external_notice.is_some() && !self.version.is_at_least(Version::V5_0) {
            return Err(Error::invalid(
                "The externalNotice attribute cannot be used until DDMS 5.0 or later.",
            ));
        }
        Ok(())
    }

    /// True if no attribute is set
    pub fn is_empty(&self) -> bool {
        self.notice_type.is_empty()
            && self.notice_reason.is_empty()
            && self.notice_date.is_empty()
            && self.unregistered_notice_type.is_empty()
            && self.external_notice.is_none()
    }

    /// The noticeType token
    pub fn notice_type(&self) -> &str {
        &self.notice_type
    }

    /// The noticeReason
    pub fn notice_reason(&self) -> &str {
        &self.notice_reason
    }

    /// The noticeDate
    pub fn notice_date(&self) -> &str {
        &self.notice_date
    }

    /// The unregisteredNoticeType
    pub fn unregistered_notice_type(&self) -> &str {
        &self.unregistered_notice_type
    }

    /// The externalNotice flag
    pub fn external_notice(&self) -> Option<bool> {
        self.external_notice
    }

    /// Warnings raised by lenient vocabulary checks
    pub fn warnings(&self) -> &[ValidationMessage] {
        &self.warnings
    }

    /// Write these attributes onto a freshly built element
    pub fn add_to(&self, element: &mut Element, version: Version) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        if version != self.version {
            return Err(Error::invalid(
                "These notice attributes cannot decorate a DDMS component with a different DDMS version.",
            ));
        }
        let external = self.external_notice.map(|b| b.to_string()).unwrap_or_default();
        for (name, value) in [
            ("noticeType", self.notice_type.as_str()),
            ("noticeReason", self.notice_reason.as_str()),
            ("noticeDate", self.notice_date.as_str()),
            ("unregisteredNoticeType", self.unregistered_notice_type.as_str()),
            ("externalNotice", external.as_str()),
        ] {
            set_schema_attribute(element, version, SchemaKind::Ism, name, value)?;
        }
        Ok(())
    }

    /// Render each set attribute as `prefix + name`
    pub fn output(&self, html: bool, prefix: &str) -> String {
        let mut text = String::new();
        text.push_str(&output::line(html, &format!("{}noticeType", prefix), &self.notice_type));
        text.push_str(&output::line(html, &format!("{}noticeReason", prefix), &self.notice_reason));
        text.push_str(&output::line(html, &format!("{}noticeDate", prefix), &self.notice_date));
        text.push_str(&output::line(
            html,
            &format!("{}unregisteredNoticeType", prefix),
            &self.unregistered_notice_type,
        ));
        if let Some(external) = self.external_notice {
            text.push_str(&output::line(html, &format!("{}externalNotice", prefix), &external.to_string()));
        }
        text
    }
}

impl PartialEq for NoticeAttributes {
    fn eq(&self, other: &Self) -> bool {
        self.notice_type == other.notice_type
            && self.notice_reason == other.notice_reason
            && self.notice_date == other.notice_date
            && self.unregistered_notice_type == other.unregistered_notice_type
            && self.external_notice == other.external_notice
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gated_before_4_0_1() {
        let err = NoticeAttributes::new(Version::V3_1, "DoD-Dist-B", "", "", "", None).unwrap_err();
        assert_eq!(
            err.message(),
            Some("Notice attributes cannot be used until DDMS 4.0.1 or later.")
        );
        assert!(NoticeAttributes::new(Version::V3_1, "", "", "", "", None).is_ok());
    }

    #[test]
    fn test_notice_date_must_be_date() {
        let err = NoticeAttributes::new(Version::V4_1, "", "", "2011-09", "", None).unwrap_err();
        assert!(err.message().unwrap().contains("xs:date"));
    }

    #[test]
    fn test_external_notice_from_5_0() {
        assert!(NoticeAttributes::new(Version::V4_1, "", "", "", "", Some(true)).is_err());
        let attrs = NoticeAttributes::new(Version::V5_0, "DoD-Dist-B", "reason", "2011-09-15", "", Some(false)).unwrap();
        assert_eq!(
            attrs.output(false, "notice."),
            "notice.noticeType: DoD-Dist-B\nnotice.noticeReason: reason\nnotice.noticeDate: 2011-09-15\nnotice.externalNotice: false\n"
        );
    }
}
