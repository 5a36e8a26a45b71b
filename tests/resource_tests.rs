//! Resource integration tests
//!
//! Records are staged through the public builders, committed, written to
//! XML and read back.

use ddms::attributes::SecurityAttributesBuilder;
use ddms::components::BuilderList;
use ddms::documents::parse_element;
use ddms::extensible::ExtensibleElementBuilder;
use ddms::resource::{
    IdentifierBuilder, ProcessingInfoBuilder, ProducerRoleBuilder, ProducerRoleKind, ResourceMarkings,
    SimpleStringBuilder, SimpleStringKind,
};
use ddms::schematron::SchematronEngine;
use ddms::summary::{KeywordBuilder, SubjectCoverageBuilder};
use ddms::{Builder, Component, MessageKind, Resource, ResourceBuilder, Result, Version};
use pretty_assertions::assert_eq;
use std::path::Path;

const EXTENSION: &str =
    "<ddmsence:extension xmlns:ddmsence=\"http://ddmsence.urizone.net/\">This is an extensible element.</ddmsence:extension>";

fn classified(classification: &str) -> SecurityAttributesBuilder {
    let mut builder = SecurityAttributesBuilder::default();
    builder.set("classification", classification).set("ownerProducer", "USA");
    builder
}

fn builder(version: Version) -> ResourceBuilder {
    let mut builder = ResourceBuilder {
        version: Some(version),
        markings: ResourceMarkings::for_version(version, "2010-01-21"),
        security_attributes: classified("U"),
        ..Default::default()
    };
    builder.identifiers.push(IdentifierBuilder {
        qualifier: "URI".to_string(),
        value: "urn:buri:ddmsence:testIdentifier".to_string(),
        ..Default::default()
    });

    let mut title = SimpleStringBuilder::new(SimpleStringKind::Title);
    title.value = "DDMSence".to_string();
    title.security_attributes = classified("U");
    builder.titles.push(title);

    let mut creator = ProducerRoleBuilder::new(ProducerRoleKind::Creator);
    creator.organization.contact.names = vec!["DISA".to_string()];
    creator.security_attributes = classified("U");
    builder.creators.push(creator);

    let mut subject = SubjectCoverageBuilder::default();
    if version.is_at_least(Version::V3_0) {
        subject.security_attributes = classified("U");
    }
    subject.keywords.push(KeywordBuilder {
        value: "DDMSence".to_string(),
        ..Default::default()
    });
    builder.subject_coverages.push(subject);

    builder.security.security_attributes = classified("U");
    builder
}

fn commit(builder: &ResourceBuilder) -> Resource {
    builder.commit().unwrap().unwrap()
}

#[test]
fn test_every_version_round_trips() {
    for version in Version::ALL {
        let built = commit(&builder(version));
        let xml = built.to_xml();
        let parsed = Resource::from_element(parse_element(&xml).unwrap(), version).unwrap();
        assert_eq!(parsed, built, "DDMS {}", version);
        assert_eq!(parsed.to_html(), built.to_html());
    }
}

#[test]
fn test_version_detected_from_namespace() {
    for version in [Version::V2_0, Version::V3_1, Version::V5_0] {
        let xml = commit(&builder(version)).to_xml();
        assert_eq!(Resource::from_xml(&xml).unwrap().version(), version);
    }
}

#[test]
fn test_components_reordered() {
    let built = commit(&builder(Version::V5_0));
    let mut reversed = built.top_level_components().to_vec();
    reversed.reverse();
    let rebuilt = Resource::new(
        Version::V5_0,
        reversed,
        built.markings().clone(),
        built.security_attributes().cloned().unwrap(),
        built.notice_attributes().clone(),
        built.extensible_attributes().clone(),
    )
    .unwrap();
    assert_eq!(rebuilt, built);
    assert_eq!(rebuilt.to_xml(), built.to_xml());
}

#[test]
fn test_text_output() {
    let text = commit(&builder(Version::V5_0)).to_text();
    assert!(text.starts_with("resourceElement: true\ncreateDate: 2010-01-21\nism.DESVersion: 9\nntk.DESVersion: 7\n"));
    assert!(text.contains("identifier.qualifier: URI\nidentifier.value: urn:buri:ddmsence:testIdentifier\n"));
    assert!(text.contains("title: DDMSence\ntitle.classification: U\ntitle.ownerProducer: USA\n"));
    assert!(text.contains("extensible.layer: false\n"));
    assert!(text.ends_with("ddms.version: 5.0\n"));
}

#[test]
fn test_html_output() {
    let html = commit(&builder(Version::V3_1)).to_html();
    assert!(html.contains("<meta name=\"title\" content=\"DDMSence\" />\n"));
    assert!(html.contains("<meta name=\"ddms.version\" content=\"3.1\" />\n"));
}

#[test]
fn test_repeated_components_are_indexed() {
    let mut builder = builder(Version::V4_1);
    let mut second = SimpleStringBuilder::new(SimpleStringKind::Title);
    second.value = "Second".to_string();
    second.security_attributes = classified("U");
    builder.titles.push(second);
    let text = commit(&builder).to_text();
    assert!(text.contains("title[1]: DDMSence\n"));
    assert!(text.contains("title[2]: Second\n"));
}

#[test]
fn test_missing_title() {
    let mut builder = builder(Version::V5_0);
    builder.titles = BuilderList::default();
    let err = builder.commit().unwrap_err();
    assert_eq!(err.message(), Some("At least 1 title is required."));
    assert_eq!(err.locator(), Some("/ddms:resource"));
}

#[test]
fn test_nested_error_is_located() {
    let mut builder = builder(Version::V5_0);
    if let Some(title) = builder.titles.get_mut(0) {
        title.security_attributes = SecurityAttributesBuilder::default();
    }
    let err = builder.commit().unwrap_err();
    assert_eq!(err.message(), Some("classification is required."));
    assert_eq!(err.locator(), Some("/ddms:title"));
}

#[test]
fn test_classification_rollup() {
    let mut builder = builder(Version::V5_0);
    builder.security_attributes = classified("S");
    builder.security.security_attributes = classified("S");
    assert!(builder.commit().is_ok());

    if let Some(title) = builder.titles.get_mut(0) {
        title.security_attributes = classified("TS");
    }
    let err = builder.commit().unwrap_err();
    assert_eq!(
        err.message(),
        Some("The security classification of a nested component is more restrictive than the classification of the resource.")
    );
}

#[test]
fn test_rollup_skipped_without_classification() {
    let mut builder = builder(Version::V2_0);
    builder.security_attributes = SecurityAttributesBuilder::default();
    let resource = commit(&builder);
    let warning = &resource.warnings()[0];
    assert_eq!(warning.kind, MessageKind::Warning);
    assert_eq!(
        warning.text,
        "Security rollup validation is being skipped, because no classification exists on the ddms:Resource itself."
    );
}

#[test]
fn test_extensible_layer() {
    let mut builder = builder(Version::V5_0);
    builder.extensible_elements.push(ExtensibleElementBuilder {
        xml: EXTENSION.to_string(),
        ..Default::default()
    });
    let resource = commit(&builder);
    assert!(resource.to_text().contains("extensible.layer: true\n"));
    assert!(resource.to_xml().contains("This is an extensible element."));

    let mut old = self::builder(Version::V2_0);
    for _ in 0..2 {
        old.extensible_elements.push(ExtensibleElementBuilder {
            xml: EXTENSION.to_string(),
            ..Default::default()
        });
    }
    let err = old.commit().unwrap_err();
    assert_eq!(err.message(), Some("Only 1 extensible element is allowed in DDMS 2.0."));
}

#[test]
fn test_builder_from_resource() {
    let built = commit(&builder(Version::V4_0_1));
    let rebuilt = ResourceBuilder::from(&built);
    assert!(!rebuilt.is_empty());
    assert_eq!(commit(&rebuilt), built);
    assert!(ResourceBuilder::default().is_empty());
    assert!(ResourceBuilder::default().commit().unwrap().is_none());
}

#[test]
fn test_resource_management_through_builders() {
    let mut staged = builder(Version::V4_1);
    staged.resource_management.processing_infos.push(ProcessingInfoBuilder {
        value: "XSLT Transformation to convert DDMS 2.0 to DDMS 3.1.".to_string(),
        date_processed: "2011-08-19".to_string(),
        security_attributes: classified("U"),
        ..Default::default()
    });
    let built = commit(&staged);
    let management = built.resource_management().unwrap();
    assert_eq!(management.processing_infos()[0].date_processed(), "2011-08-19");
    let text = built.to_text();
    assert!(text.contains("resourceManagement.processingInfo: XSLT Transformation to convert DDMS 2.0 to DDMS 3.1.\n"));
    assert!(text.find("resourceManagement").unwrap() < text.find("security.").unwrap());

    let parsed = Resource::from_element(parse_element(&built.to_xml()).unwrap(), Version::V4_1).unwrap();
    assert_eq!(parsed, built);

    let mut incomplete = builder(Version::V4_1);
    incomplete.resource_management.tasking_infos.ensure_len(1);
    if let Some(info) = incomplete.resource_management.tasking_infos.get_mut(0) {
        info.security_attributes = classified("U");
    }
    let err = incomplete.commit().unwrap_err();
    assert_eq!(err.message(), Some("Exactly 1 ddms:taskID element must exist."));
}

#[test]
fn test_resource_management_needs_4_0_1() {
    let mut staged = builder(Version::V3_1);
    staged.resource_management.processing_infos.push(ProcessingInfoBuilder {
        value: "Converted".to_string(),
        date_processed: "2011".to_string(),
        security_attributes: classified("U"),
        ..Default::default()
    });
    let err = staged.commit().unwrap_err();
    assert_eq!(
        err.message(),
        Some("The ddms:processingInfo element cannot be used until DDMS 4.0.1 or later.")
    );
}

struct Reporter;

impl SchematronEngine for Reporter {
    fn transform(&self, _rules: &Path, _xml: &str) -> Result<String> {
        Ok(r#"<svrl:schematron-output xmlns:svrl="http://purl.oclc.org/dsdl/svrl">
  <svrl:successful-report location="/*:resource[1]/*:title[1]"><svrl:text>A title exists.</svrl:text></svrl:successful-report>
</svrl:schematron-output>"#
            .to_string())
    }
}

#[test]
fn test_schematron_report() {
    let resource = commit(&builder(Version::V5_0));
    let messages = resource.validate_with_schematron(&Reporter, Path::new("rules.sch")).unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].kind, MessageKind::Warning);
    assert_eq!(messages[0].locator, "/*:resource[1]/*:title[1]");
}
