//! Controlled vocabularies for ISM attribute values
//!
//! Each vocabulary is a Controlled Value Enumeration (CVE) file holding plain
//! tokens and regular-expression patterns:
//!
//! ```xml
//! <cve:CVE xmlns:cve="urn:us:gov:ic:cve">
//!   <cve:Enumeration>
//!     <cve:Term><cve:Value>U</cve:Value></cve:Term>
//!     <cve:Term><cve:Value regularExpression="true">SI-G-[A-Z]{4}</cve:Value></cve:Term>
//!   </cve:Enumeration>
//! </cve:CVE>
//! ```
//!
//! Each DDMS version validates against the CVE files of its own ISM release.
//! The default tables are embedded in the crate. Setting
//! `vocabulary_location` in the configuration replaces them with
//! `<dir>/<version>/<key>.xml` files. Tables are loaded once and shared
//! read-only.

use crate::config;
use crate::error::{Error, Result};
use crate::messages::ValidationMessage;
use crate::versions::Version;
use indexmap::{IndexMap, IndexSet};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

/// The CVE namespace
pub const CVE_NAMESPACE: &str = "urn:us:gov:ic:cve";

/// All classification markings, US and NATO
pub const CLASSIFICATION_ALL: &str = "CVEnumISMClassificationAll";
/// Owner/producer country and organization codes
pub const OWNER_PRODUCER: &str = "CVEnumISMOwnerProducer";
/// Releasable-to codes
pub const REL_TO: &str = "CVEnumISMRelTo";
/// SCI control systems
pub const SCI_CONTROLS: &str = "CVEnumISMSCIControls";
/// Dissemination controls
pub const DISSEM: &str = "CVEnumISMDissem";
/// Non-IC markings
pub const NON_IC: &str = "CVEnumISMNonIC";
/// Special access program identifiers
pub const SAR: &str = "CVEnumISMSAR";
/// Notice types
pub const NOTICE: &str = "CVEnumISMNotice";
/// Declassification exemptions
pub const DECLASS_EXCEPTION: &str = "CVEnumISM25X";
/// Atomic energy markings
pub const ATOMIC_ENERGY_MARKINGS: &str = "CVEnumISMAtomicEnergyMarkings";
/// Non-US controls
pub const NON_US_CONTROLS: &str = "CVEnumISMNonUSControls";
/// Open foreign government information sources
pub const FGI_OPEN: &str = "CVEnumISMFGIOpen";
/// Protected foreign government information sources
pub const FGI_PROTECTED: &str = "CVEnumISMFGIProtected";
/// Rule sets a document complies with
pub const COMPLIES_WITH: &str = "CVEnumISMCompliesWith";
/// Point-of-contact types
pub const POC_TYPE: &str = "CVEnumISMPocType";
/// Exempted source markings
pub const SOURCE_MARKED: &str = "CVEnumISMSourceMarked";

macro_rules! embedded {
    ($dir:literal: $($key:literal,)+) => {
        &[$(($key, include_str!(concat!("../resources/cve/", $dir, "/", $key, ".xml")))),+]
    };
}

/// Embedded CVE files per version. Each version only ships the vocabularies
/// its ISM release defines.
const EMBEDDED: [(Version, &[(&str, &str)]); 6] = [
    (
        Version::V2_0,
        embedded!("2.0":
            "CVEnumISM25X", "CVEnumISMClassificationAll", "CVEnumISMDissem", "CVEnumISMFGIOpen",
            "CVEnumISMFGIProtected", "CVEnumISMNonIC", "CVEnumISMOwnerProducer", "CVEnumISMRelTo",
            "CVEnumISMSAR", "CVEnumISMSCIControls",
            "CVEnumISMSourceMarked",
        ),
    ),
    (
        Version::V3_0,
        embedded!("3.0":
            "CVEnumISM25X", "CVEnumISMClassificationAll", "CVEnumISMDissem", "CVEnumISMFGIOpen",
            "CVEnumISMFGIProtected", "CVEnumISMNonIC", "CVEnumISMOwnerProducer", "CVEnumISMRelTo",
            "CVEnumISMSAR", "CVEnumISMSCIControls",
            "CVEnumISMSourceMarked",
        ),
    ),
    (
        Version::V3_1,
        embedded!("3.1":
            "CVEnumISM25X", "CVEnumISMClassificationAll", "CVEnumISMDissem", "CVEnumISMFGIOpen",
            "CVEnumISMFGIProtected", "CVEnumISMNonIC", "CVEnumISMOwnerProducer", "CVEnumISMRelTo",
            "CVEnumISMSAR", "CVEnumISMSCIControls",
            "CVEnumISMAtomicEnergyMarkings", "CVEnumISMCompliesWith", "CVEnumISMNonUSControls",
        ),
    ),
    (
        Version::V4_0_1,
        embedded!("4.0.1":
            "CVEnumISM25X", "CVEnumISMClassificationAll", "CVEnumISMDissem", "CVEnumISMFGIOpen",
            "CVEnumISMFGIProtected", "CVEnumISMNonIC", "CVEnumISMOwnerProducer", "CVEnumISMRelTo",
            "CVEnumISMSAR", "CVEnumISMSCIControls",
            "CVEnumISMAtomicEnergyMarkings", "CVEnumISMCompliesWith", "CVEnumISMNonUSControls",
            "CVEnumISMNotice", "CVEnumISMPocType",
        ),
    ),
    (
        Version::V4_1,
        embedded!("4.1":
            "CVEnumISM25X", "CVEnumISMClassificationAll", "CVEnumISMDissem", "CVEnumISMFGIOpen",
            "CVEnumISMFGIProtected", "CVEnumISMNonIC", "CVEnumISMOwnerProducer", "CVEnumISMRelTo",
            "CVEnumISMSAR", "CVEnumISMSCIControls",
            "CVEnumISMAtomicEnergyMarkings", "CVEnumISMCompliesWith", "CVEnumISMNonUSControls",
            "CVEnumISMNotice", "CVEnumISMPocType",
        ),
    ),
    (
        Version::V5_0,
        embedded!("5.0":
            "CVEnumISM25X", "CVEnumISMClassificationAll", "CVEnumISMDissem", "CVEnumISMFGIOpen",
            "CVEnumISMFGIProtected", "CVEnumISMNonIC", "CVEnumISMOwnerProducer", "CVEnumISMRelTo",
            "CVEnumISMSAR", "CVEnumISMSCIControls",
            "CVEnumISMAtomicEnergyMarkings", "CVEnumISMCompliesWith", "CVEnumISMNonUSControls",
            "CVEnumISMNotice", "CVEnumISMPocType",
        ),
    ),
];

fn embedded_for(version: Version) -> &'static [(&'static str, &'static str)] {
    EMBEDDED
        .iter()
        .find(|(v, _)| *v == version)
        .map(|(_, files)| *files)
        .unwrap_or(&[])
}

/// US classification markings, least restrictive first
pub const US_CLASSIFICATIONS: [&str; 4] = ["U", "C", "S", "TS"];

/// NATO classification markings, least restrictive first
pub const NATO_CLASSIFICATIONS: [&str; 11] = [
    "NU", "R", "NR", "NC", "NCA", "NS", "NSAT", "CTS", "CTS-B", "CTS-BALK", "CTSA",
];

/// Classifications that are valid but require manual review
const REVIEW_CLASSIFICATIONS: [&str; 3] = ["CTS-B", "CTS-BALK", "R"];

/// Networks a task ID or revision recall can name
pub const NETWORKS: [&str; 7] = ["NIPRNet", "SIPRNet", "JWICS", "ADSN", "StoneGhost", "LOCE", "CRONOS"];

/// The marking system a classification belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkingSystem {
    /// US markings
    Us,
    /// NATO markings
    Nato,
}

/// One vocabulary: exact tokens plus anchored patterns
#[derive(Debug, Clone, Default)]
pub struct VocabularyTable {
    tokens: IndexSet<String>,
    patterns: Vec<Regex>,
}

impl VocabularyTable {
    /// Parse a CVE document
    pub fn parse(xml: &str) -> Result<Self> {
        let doc = roxmltree::Document::parse(xml)
            .map_err(|e| Error::Configuration(format!("Invalid vocabulary file: {}", e)))?;

        let mut table = Self::default();
        for value in doc
            .descendants()
            .filter(|n| n.is_element() && n.tag_name().name() == "Value")
            .filter(|n| n.tag_name().namespace() == Some(CVE_NAMESPACE))
        {
            let text = value.text().unwrap_or("").trim();
            if text.is_empty() {
                continue;
            }
            if value.attribute("regularExpression") == Some("true") {
                let pattern = Regex::new(&format!("^(?:{})$", text)).map_err(|e| {
                    Error::Configuration(format!("Invalid vocabulary pattern '{}': {}", text, e))
                })?;
                table.patterns.push(pattern);
            } else {
                table.tokens.insert(text.to_string());
            }
        }
        Ok(table)
    }

    /// True if the candidate is a token or matches a pattern
    pub fn contains(&self, candidate: &str) -> bool {
        self.tokens.contains(candidate) || self.patterns.iter().any(|p| p.is_match(candidate))
    }
}

/// A loaded set of vocabulary tables keyed by version and CVE name
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    tables: IndexMap<(Version, String), VocabularyTable>,
}

impl Vocabulary {
    /// The tables embedded in the crate
    pub fn embedded() -> Result<Self> {
        let mut tables = IndexMap::new();
        for version in Version::ALL {
            for (key, xml) in embedded_for(version) {
                tables.insert((version, key.to_string()), VocabularyTable::parse(xml)?);
            }
        }
        debug!(tables = tables.len(), "loaded embedded controlled vocabularies");
        Ok(Self { tables })
    }

    /// Load every known table from `<dir>/<version>/<key>.xml`
    pub fn from_directory(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut tables = IndexMap::new();
        for version in Version::ALL {
            for (key, _) in embedded_for(version) {
                let path = dir.join(version.as_str()).join(format!("{}.xml", key));
                let content = fs::read_to_string(&path).map_err(|e| {
                    warn!(path = %path.display(), "vocabulary file could not be read");
                    Error::Configuration(format!(
                        "Could not load controlled vocabularies: {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                tables.insert((version, key.to_string()), VocabularyTable::parse(&content)?);
            }
        }
        debug!(location = %dir.display(), tables = tables.len(), "loaded controlled vocabularies");
        Ok(Self { tables })
    }

    fn table(&self, key: &str, version: Version) -> Result<&VocabularyTable> {
        self.tables.get(&(version, key.to_string())).ok_or_else(|| {
            Error::IllegalArgument(format!(
                "No controlled vocabulary could be found for this key: {}",
                key
            ))
        })
    }

    /// The exact tokens of a vocabulary in a version
    pub fn tokens_for(&self, key: &str, version: Version) -> Result<Vec<String>> {
        Ok(self.table(key, version)?.tokens.iter().cloned().collect())
    }

    /// The patterns of a vocabulary in a version
    pub fn patterns_for(&self, key: &str, version: Version) -> Result<Vec<&Regex>> {
        Ok(self.table(key, version)?.patterns.iter().collect())
    }

    /// True if the candidate is a token of, or matches a pattern in, the vocabulary
    pub fn contains(&self, key: &str, candidate: &str, version: Version) -> Result<bool> {
        Ok(self.table(key, version)?.contains(candidate))
    }
}

type Cache = RwLock<Option<Arc<Vocabulary>>>;

static SHARED: Lazy<Cache> = Lazy::new(|| RwLock::new(None));

fn cached(cache: &Cache, load: impl FnOnce() -> Result<Vocabulary>) -> Result<Arc<Vocabulary>> {
    if let Some(vocabulary) = cache.read().unwrap_or_else(PoisonError::into_inner).as_ref() {
        return Ok(Arc::clone(vocabulary));
    }
    let loaded = Arc::new(load()?);
    *cache.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&loaded));
    Ok(loaded)
}

/// The process-wide vocabulary, loaded on first use from the configured location
pub fn shared() -> Result<Arc<Vocabulary>> {
    cached(&SHARED, || match config::current().vocabulary_location.as_ref() {
        Some(dir) => Vocabulary::from_directory(dir),
        None => Vocabulary::embedded(),
    })
}

/// Drop the cached tables so the next lookup reloads them
pub fn reset() {
    *SHARED.write().unwrap_or_else(PoisonError::into_inner) = None;
}

/// Membership query against the shared vocabulary
pub fn enum_contains(key: &str, candidate: &str, version: Version) -> Result<bool> {
    shared()?.contains(key, candidate, version)
}

/// Check a token against a vocabulary.
///
/// A mismatch is an error, or a warning when `validation_as_errors` is off in
/// the installed configuration.
pub fn validate_enumeration(
    key: &str,
    value: &str,
    version: Version,
) -> Result<Option<ValidationMessage>> {
    if enum_contains(key, value, version)? {
        return Ok(None);
    }
    let message = format!(
        "{} is not a valid enumeration token for this attribute, as specified in {}.",
        value, key
    );
    if config::current().validation_as_errors {
        Err(Error::invalid(message))
    } else {
        Ok(Some(ValidationMessage::warning(message, "")))
    }
}

/// Require one of the common network names
pub fn validate_network(network: &str) -> Result<()> {
    if NETWORKS.contains(&network) {
        Ok(())
    } else {
        Err(Error::invalid(format!(
            "The network attribute must be one of {}",
            NETWORKS.join(", ")
        )))
    }
}

/// The marking system of a classification token
pub fn marking_system(token: &str) -> Option<MarkingSystem> {
    if US_CLASSIFICATIONS.contains(&token) {
        Some(MarkingSystem::Us)
    } else if NATO_CLASSIFICATIONS.contains(&token) {
        Some(MarkingSystem::Nato)
    } else {
        None
    }
}

/// True if the classification is valid but must be reviewed by hand
pub fn needs_review(token: &str) -> bool {
    REVIEW_CLASSIFICATIONS.contains(&token)
}

/// Position of a classification within its marking system, or -1 when the
/// token is unknown or needs review.
pub fn classification_index(token: &str) -> i32 {
    if needs_review(token) {
        return -1;
    }
    US_CLASSIFICATIONS
        .iter()
        .position(|c| *c == token)
        .or_else(|| NATO_CLASSIFICATIONS.iter().position(|c| *c == token))
        .map(|i| i as i32)
        .unwrap_or(-1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_tables_load() {
        let vocabulary = Vocabulary::embedded().unwrap();
        assert!(vocabulary.contains(CLASSIFICATION_ALL, "TS", Version::V5_0).unwrap());
        assert!(vocabulary.contains(OWNER_PRODUCER, "USA", Version::V5_0).unwrap());
        assert!(!vocabulary.contains(OWNER_PRODUCER, "XYZ", Version::V5_0).unwrap());
    }

    #[test]
    fn test_patterns_match_whole_value() {
        let vocabulary = Vocabulary::embedded().unwrap();
        assert!(vocabulary.contains(SCI_CONTROLS, "SI-G-ABCD", Version::V3_1).unwrap());
        assert!(!vocabulary.contains(SCI_CONTROLS, "SI-G-ABCDE", Version::V3_1).unwrap());
        assert!(!vocabulary.patterns_for(SCI_CONTROLS, Version::V3_1).unwrap().is_empty());
    }

    #[test]
    fn test_old_classifications_only_in_2_0() {
        let vocabulary = Vocabulary::embedded().unwrap();
        assert!(vocabulary.contains(CLASSIFICATION_ALL, "NS-S", Version::V2_0).unwrap());
        assert!(!vocabulary.contains(CLASSIFICATION_ALL, "NS-S", Version::V3_0).unwrap());
        let tokens = vocabulary.tokens_for(CLASSIFICATION_ALL, Version::V3_0).unwrap();
        assert!(!tokens.contains(&"NS-A".to_string()));
    }

    #[test]
    fn test_networks() {
        assert!(validate_network("SIPRNet").is_ok());
        let err = validate_network("Internet").unwrap_err();
        assert!(err.message().unwrap().starts_with("The network attribute must be one of NIPRNet"));
    }

    #[test]
    fn test_tables_differ_by_version() {
        let vocabulary = Vocabulary::embedded().unwrap();
        assert!(!vocabulary.contains(DISSEM, "DISPLAYONLY", Version::V2_0).unwrap());
        assert!(vocabulary.contains(DISSEM, "DISPLAYONLY", Version::V3_1).unwrap());
        assert!(!vocabulary.contains(COMPLIES_WITH, "USDOD", Version::V3_1).unwrap());
        assert!(vocabulary.contains(COMPLIES_WITH, "USDOD", Version::V4_1).unwrap());
        assert!(vocabulary.tokens_for(SOURCE_MARKED, Version::V3_0).is_ok());
        assert!(matches!(
            vocabulary.tokens_for(SOURCE_MARKED, Version::V3_1),
            Err(Error::IllegalArgument(_))
        ));
        assert!(vocabulary.patterns_for(NOTICE, Version::V3_1).is_err());
        assert!(vocabulary.patterns_for(ATOMIC_ENERGY_MARKINGS, Version::V2_0).is_err());
        assert_eq!(vocabulary.patterns_for(ATOMIC_ENERGY_MARKINGS, Version::V5_0).unwrap().len(), 2);
    }

    #[test]
    fn test_poisoned_cache_keeps_loaded_tables() {
        let cache: Cache = RwLock::new(None);
        let first = cached(&cache, Vocabulary::embedded).unwrap();
        let _ = std::panic::catch_unwind(|| {
            let _guard = cache.write().unwrap();
            panic!("poison");
        });
        assert!(cache.is_poisoned());
        let again = cached(&cache, || panic!("tables should not reload")).unwrap();
        assert!(Arc::ptr_eq(&first, &again));
    }

    #[test]
    fn test_unknown_key_is_illegal_argument() {
        let vocabulary = Vocabulary::embedded().unwrap();
        let err = vocabulary.tokens_for("CVEnumISMUnknown", Version::V5_0).unwrap_err();
        assert!(matches!(err, Error::IllegalArgument(_)));
        assert!(err
            .to_string()
            .contains("No controlled vocabulary could be found for this key: CVEnumISMUnknown"));
    }

    #[test]
    fn test_classification_ordering() {
        assert!(classification_index("TS") > classification_index("S"));
        assert!(classification_index("C") > classification_index("U"));
        assert!(classification_index("CTSA") > classification_index("NU"));
        assert_eq!(classification_index("CTS-B"), -1);
        assert_eq!(classification_index("R"), -1);
        assert_eq!(classification_index("XX"), -1);
        assert!(needs_review("CTS-BALK"));
        assert!(!needs_review("TS"));
        assert_eq!(marking_system("NC"), Some(MarkingSystem::Nato));
    }

    #[test]
    fn test_directory_override() {
        let dir = tempfile::tempdir().unwrap();
        for version in Version::ALL {
            let version_dir = dir.path().join(version.as_str());
            fs::create_dir_all(&version_dir).unwrap();
            for (key, xml) in embedded_for(version) {
                let mut file = fs::File::create(version_dir.join(format!("{}.xml", key))).unwrap();
                let content = if *key == OWNER_PRODUCER && version == Version::V5_0 {
                    r#"<cve:CVE xmlns:cve="urn:us:gov:ic:cve"><cve:Enumeration><cve:Term><cve:Value>ZZZ</cve:Value></cve:Term></cve:Enumeration></cve:CVE>"#
                } else {
                    xml
                };
                file.write_all(content.as_bytes()).unwrap();
            }
        }
        let vocabulary = Vocabulary::from_directory(dir.path()).unwrap();
        assert!(vocabulary.contains(OWNER_PRODUCER, "ZZZ", Version::V5_0).unwrap());
        assert!(!vocabulary.contains(OWNER_PRODUCER, "USA", Version::V5_0).unwrap());
        assert!(vocabulary.contains(OWNER_PRODUCER, "USA", Version::V4_1).unwrap());
    }

    #[test]
    fn test_validate_enumeration_message() {
        let err = validate_enumeration(OWNER_PRODUCER, "ABC", Version::V5_0).unwrap_err();
        assert_eq!(
            err.message(),
            Some("ABC is not a valid enumeration token for this attribute, as specified in CVEnumISMOwnerProducer.")
        );
        assert!(validate_enumeration(OWNER_PRODUCER, "USA", Version::V5_0).unwrap().is_none());
    }

    #[test]
    fn test_missing_directory_is_configuration_error() {
        let err = Vocabulary::from_directory("/nonexistent/ddms/cve").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("Could not load controlled vocabularies"));
    }
}
