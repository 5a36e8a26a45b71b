//! Schematron pass over an already valid resource
//!
//! The rules are run by an external engine that turns a rules file and an XML
//! document into an SVRL report. Only the report is interpreted here: every
//! `svrl:failed-assert` becomes an error message and every
//! `svrl:successful-report` becomes a warning.

use crate::error::{Error, Result};
use crate::messages::ValidationMessage;
use std::path::Path;

/// Namespace of SVRL reports
pub const SVRL_NAMESPACE: &str = "http://purl.oclc.org/dsdl/svrl";

/// Runs Schematron rules against a document
pub trait SchematronEngine {
    /// Apply the rules in `rules` to `xml`, returning the SVRL report
    fn transform(&self, rules: &Path, xml: &str) -> Result<String>;
}

/// Map an SVRL report to validation messages, in document order
pub fn parse_svrl(report: &str) -> Result<Vec<ValidationMessage>> {
    let doc = roxmltree::Document::parse(report)
        .map_err(|e| Error::Xml(format!("Invalid SVRL report: {}", e)))?;

    let messages = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().namespace() == Some(SVRL_NAMESPACE))
        .filter_map(|node| {
            let text = node
                .children()
                .find(|c| c.is_element() && c.tag_name().name() == "text")
                .and_then(|t| t.text())
                .unwrap_or("")
                .trim()
                .to_string();
            let location = node.attribute("location").unwrap_or("").to_string();
            match node.tag_name().name() {
                "failed-assert" => Some(ValidationMessage::error(text, location)),
                "successful-report" => Some(ValidationMessage::warning(text, location)),
                _ => None,
            }
        })
        .collect();
    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::MessageKind;
    use pretty_assertions::assert_eq;

    const REPORT: &str = r#"<svrl:schematron-output xmlns:svrl="http://purl.oclc.org/dsdl/svrl">
  <svrl:active-pattern id="pattern" />
  <svrl:fired-rule context="//ddms:resource" />
  <svrl:failed-assert test="count(ddms:title) = 2" location="/*:resource[1]">
    <svrl:text>Members of the Uri family cannot publish anything.</svrl:text>
  </svrl:failed-assert>
  <svrl:successful-report test="true()" location="/*:resource[1]/*:title[1]">
    <svrl:text>Reviewed.</svrl:text>
  </svrl:successful-report>
</svrl:schematron-output>"#;

    #[test]
    fn test_failed_asserts_and_reports() {
        let messages = parse_svrl(REPORT).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].kind, MessageKind::Error);
        assert_eq!(messages[0].text, "Members of the Uri family cannot publish anything.");
        assert_eq!(messages[0].locator, "/*:resource[1]");
        assert_eq!(messages[1].kind, MessageKind::Warning);
        assert_eq!(messages[1].locator, "/*:resource[1]/*:title[1]");
    }

    #[test]
    fn test_malformed_report() {
        assert!(matches!(parse_svrl("<svrl:"), Err(Error::Xml(_))));
    }
}
