//! CLI integration tests
//!
//! These tests run the built binary against records written to a temporary
//! directory.

#![cfg(feature = "cli")]

use ddms::attributes::{ExtensibleAttributes, NoticeAttributes, SecurityAttributes};
use ddms::resource::{
    ContactInfo, Identifier, Organization, ProducerEntity, ProducerRole, ProducerRoleKind, ResourceMarkings,
    SimpleString,
};
use ddms::security::Security;
use ddms::summary::{Keyword, SubjectCoverage};
use ddms::{Component, Resource, Version};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::Arc;
use tempfile::TempDir;

fn ddms_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_ddms"))
}

fn run(args: &[&str]) -> Output {
    Command::new(ddms_bin())
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn unclassified(version: Version) -> SecurityAttributes {
    SecurityAttributes::classified(version, "U", &["USA"]).unwrap()
}

fn resource(version: Version) -> Resource {
    let keyword = Keyword::new(version, "DDMSence", SecurityAttributes::empty(version), ExtensibleAttributes::empty(version)).unwrap();
    let contact = ContactInfo {
        names: vec!["DISA".to_string()],
        ..Default::default()
    };
    let organization = Organization::new(version, contact, vec![], "").unwrap();
    Resource::new(
        version,
        vec![
            Identifier::new(version, "URI", "urn:buri:ddmsence:testIdentifier").unwrap().into(),
            SimpleString::title(version, "DDMSence", unclassified(version)).unwrap().into(),
            ProducerRole::new(
                version,
                ProducerRoleKind::Creator,
                ProducerEntity::Organization(Arc::new(organization)),
                &[],
                unclassified(version),
            )
            .unwrap()
            .into(),
            SubjectCoverage::new(version, vec![Arc::new(keyword)], vec![], vec![], vec![], unclassified(version))
                .unwrap()
                .into(),
            Security::new(version, None, None, unclassified(version)).unwrap().into(),
        ],
        ResourceMarkings::for_version(version, "2010-01-21"),
        unclassified(version),
        NoticeAttributes::empty(version),
        ExtensibleAttributes::empty(version),
    )
    .unwrap()
}

fn write_record(dir: &Path, name: &str, xml: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, xml).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_cli_validate_valid_record() {
    let dir = TempDir::new().unwrap();
    let file = write_record(dir.path(), "record.xml", &resource(Version::V5_0).to_xml());

    let output = run(&["validate", &file]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "validate should succeed");
    assert!(stdout.contains("is a valid DDMS 5.0 resource."), "should report the version");
}

#[test]
fn test_cli_validate_json_output() {
    let dir = TempDir::new().unwrap();
    let file = write_record(dir.path(), "record.xml", &resource(Version::V3_1).to_xml());

    let output = run(&["validate", "--json", &file]);
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("output should be JSON");
    assert_eq!(report["valid"], true);
    assert_eq!(report["version"], "3.1");
    assert!(report["messages"].is_array());
}

#[test]
fn test_cli_validate_invalid_record() {
    let dir = TempDir::new().unwrap();
    let xml = resource(Version::V5_0)
        .to_xml()
        .replace("urn:buri:ddmsence:testIdentifier", "");
    let file = write_record(dir.path(), "broken.xml", &xml);

    let output = run(&["validate", &file]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "validate should fail");
    assert!(stderr.contains("Error:"), "should print the error");
}

#[test]
fn test_cli_validate_missing_file() {
    let output = run(&["validate", "no/such/record.xml"]);
    assert!(!output.status.success());
}

#[test]
fn test_cli_render_text() {
    let dir = TempDir::new().unwrap();
    let file = write_record(dir.path(), "record.xml", &resource(Version::V4_1).to_xml());

    let output = run(&["render", "--format", "text", &file]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("title: DDMSence\n"));
    assert!(stdout.contains("ddms.version: 4.1\n"));
}

#[test]
fn test_cli_render_html_to_file() {
    let dir = TempDir::new().unwrap();
    let file = write_record(dir.path(), "record.xml", &resource(Version::V5_0).to_xml());
    let target = dir.path().join("record.html");

    let output = run(&["render", "-f", "html", "-o", target.to_str().unwrap(), &file]);
    assert!(output.status.success());

    let html = fs::read_to_string(&target).unwrap();
    assert!(html.contains("<meta name=\"title\" content=\"DDMSence\" />"));
}

#[test]
fn test_cli_render_xml_reparses() {
    let dir = TempDir::new().unwrap();
    let original = resource(Version::V5_0);
    let file = write_record(dir.path(), "record.xml", &original.to_xml());

    let output = run(&["render", "--format", "xml", &file]);
    assert!(output.status.success());

    let rendered = String::from_utf8_lossy(&output.stdout);
    assert_eq!(Resource::from_xml(&rendered).unwrap(), original);
}

#[test]
fn test_cli_versions() {
    let output = run(&["versions"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert_eq!(stdout.lines().count(), Version::ALL.len());
    assert!(stdout.contains("urn:us:mil:ces:metadata:ddms:5"));
}

#[test]
fn test_cli_config_sets_default_version() {
    let dir = TempDir::new().unwrap();
    let config = write_record(dir.path(), "ddms.toml", "default_version = \"3.1\"\n");

    let output = run(&["--config", &config, "versions"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    let current: Vec<&str> = stdout.lines().filter(|line| line.starts_with('*')).collect();
    assert_eq!(current.len(), 1);
    assert!(current[0].contains("3.1"));
}

#[test]
fn test_cli_bad_config() {
    let dir = TempDir::new().unwrap();
    let config = write_record(dir.path(), "ddms.toml", "default_version = \"9.9\"\n");

    let output = run(&["--config", &config, "versions"]);
    assert!(!output.status.success());
}
