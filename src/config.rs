//! Library configuration
//!
//! Namespace prefixes, the default DDMS version, the controlled vocabulary
//! location and the vocabulary strictness flag. Configuration is read from
//! TOML (or JSON) and installed process-wide with [`install`].
//!
//! ```toml
//! default_version = "4.1"
//! validation_as_errors = true
//! vocabulary_location = "/etc/ddms/cve"
//!
//! [prefixes]
//! ddms = "ddms"
//! ism = "ISM"
//! ```

use crate::error::{Error, Result};
use crate::versions::{self, SchemaKind};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Prefixes written on newly built elements and attributes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Prefixes {
    /// DDMS prefix
    pub ddms: String,
    /// ISM prefix
    pub ism: String,
    /// NTK prefix
    pub ntk: String,
    /// GML prefix
    pub gml: String,
    /// XLink prefix
    pub xlink: String,
    /// Virtual network prefix
    pub virt: String,
}

impl Default for Prefixes {
    fn default() -> Self {
        Self {
            ddms: "ddms".to_string(),
            ism: "ISM".to_string(),
            ntk: "ntk".to_string(),
            gml: "gml".to_string(),
            xlink: "xlink".to_string(),
            virt: "virt".to_string(),
        }
    }
}

impl Prefixes {
    /// The prefix for a sub-schema
    pub fn for_kind(&self, kind: SchemaKind) -> &str {
        match kind {
            SchemaKind::Ddms => &self.ddms,
            SchemaKind::Ism => &self.ism,
            SchemaKind::Ntk => &self.ntk,
            SchemaKind::Gml => &self.gml,
            SchemaKind::Xlink => &self.xlink,
            SchemaKind::Virt => &self.virt,
        }
    }
}

/// Main library configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Namespace prefixes
    pub prefixes: Prefixes,
    /// Version token applied to the ambient version selector on install
    pub default_version: String,
    /// Directory holding `<version>/<key>.xml` vocabulary files; embedded tables when unset
    pub vocabulary_location: Option<PathBuf>,
    /// When false, controlled vocabulary mismatches are warnings instead of errors
    pub validation_as_errors: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefixes: Prefixes::default(),
            default_version: versions::Version::LATEST.as_str().to_string(),
            vocabulary_location: None,
            validation_as_errors: true,
        }
    }
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::Configuration(format!("Invalid configuration: {}", e)))
    }

    /// Load configuration from a file (TOML, or JSON by extension)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!(
                "Failed to read configuration '{}': {}",
                path.display(),
                e
            ))
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| Error::Configuration(format!("Invalid configuration: {}", e))),
            _ => Self::from_toml_str(&content),
        }
    }

    /// Check the configuration without installing it
    pub fn validate(&self) -> Result<()> {
        versions::Version::from_str(&self.default_version)?;
        let prefixes = &self.prefixes;
        for prefix in [
            &prefixes.ddms,
            &prefixes.ism,
            &prefixes.ntk,
            &prefixes.gml,
            &prefixes.xlink,
            &prefixes.virt,
        ] {
            if !crate::names::is_valid_ncname(prefix) {
                return Err(Error::Configuration(format!(
                    "\"{}\" is not a usable namespace prefix.",
                    prefix
                )));
            }
        }
        Ok(())
    }
}

static CURRENT: Lazy<RwLock<Arc<Config>>> = Lazy::new(|| RwLock::new(Arc::new(Config::default())));

/// The installed configuration
pub fn current() -> Arc<Config> {
    match CURRENT.read() {
        Ok(guard) => Arc::clone(&guard),
        Err(poisoned) => Arc::clone(&poisoned.into_inner()),
    }
}

/// Install a configuration process-wide.
///
/// Applies `default_version` to the ambient version selector and drops any
/// cached vocabulary tables so the next lookup honors `vocabulary_location`.
pub fn install(config: Config) -> Result<()> {
    config.validate()?;
    versions::set_current_version(&config.default_version)?;
    let config = Arc::new(config);
    match CURRENT.write() {
        Ok(mut guard) => *guard = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
    crate::vocabulary::reset();
    Ok(())
}

/// Shorthand for the configured prefix of a sub-schema
pub fn prefix_for(kind: SchemaKind) -> String {
    current().prefixes.for_kind(kind).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.prefixes.ism, "ISM");
        assert_eq!(config.default_version, "5.0");
        assert!(config.validation_as_errors);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            default_version = "3.1"

            [prefixes]
            ism = "icism"
            "#,
        )
        .unwrap();
        assert_eq!(config.default_version, "3.1");
        assert_eq!(config.prefixes.ism, "icism");
        assert_eq!(config.prefixes.ddms, "ddms");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "validation_as_errors = false").unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert!(!config.validation_as_errors);
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml_str("invalid toml [[[").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_validate_rejects_unknown_version() {
        let config = Config {
            default_version: "1.4".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
