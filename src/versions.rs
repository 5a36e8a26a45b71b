//! DDMS version registry
//!
//! Every supported DDMS release is a [`Version`] value. A version knows the
//! namespace URI of each sub-schema it uses, and versions are totally ordered
//! so validation rules can be gated with [`Version::is_at_least`].
//!
//! Components receive their version explicitly. The process-wide ambient
//! selector ([`current_version`] / [`set_current_version`]) only supplies the
//! default used by builders that were not given a version; it is guarded by a
//! lock, but callers interleaving builds for different versions on several
//! threads should pass versions explicitly instead of relying on it.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use std::fmt;
use std::sync::RwLock;
use tracing::debug;

/// A supported DDMS release
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Version {
    /// DDMS 2.0
    V2_0,
    /// DDMS 3.0
    V3_0,
    /// DDMS 3.1
    V3_1,
    /// DDMS 4.0.1
    V4_0_1,
    /// DDMS 4.1
    V4_1,
    /// DDMS 5.0
    V5_0,
}

/// The sub-schemas whose namespace varies by version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    /// The DDMS schema itself
    Ddms,
    /// Information Security Marking (ISM) attributes
    Ism,
    /// Need-To-Know (NTK) access markings
    Ntk,
    /// Geography Markup Language
    Gml,
    /// XML Linking Language
    Xlink,
    /// Virtual network markings
    Virt,
}

impl SchemaKind {
    /// Get the kind as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaKind::Ddms => "ddms",
            SchemaKind::Ism => "ism",
            SchemaKind::Ntk => "ntk",
            SchemaKind::Gml => "gml",
            SchemaKind::Xlink => "xlink",
            SchemaKind::Virt => "virt",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

impl Version {
    /// All supported versions, oldest first
    pub const ALL: [Version; 6] = [
        Version::V2_0,
        Version::V3_0,
        Version::V3_1,
        Version::V4_0_1,
        Version::V4_1,
        Version::V5_0,
    ];

    /// The newest supported version
    pub const LATEST: Version = Version::V5_0;

    /// Parse a version token. "4.0" is accepted as an alias of "4.0.1".
    pub fn from_str(token: &str) -> Result<Self> {
        match token.trim() {
            "2.0" => Ok(Version::V2_0),
            "3.0" => Ok(Version::V3_0),
            "3.1" => Ok(Version::V3_1),
            "4.0" | "4.0.1" => Ok(Version::V4_0_1),
            "4.1" => Ok(Version::V4_1),
            "5.0" => Ok(Version::V5_0),
            other => Err(Error::UnsupportedVersion(format!(
                "DDMS Version {} is not yet supported.",
                other
            ))),
        }
    }

    /// Get the version token
    pub fn as_str(&self) -> &'static str {
        match self {
            Version::V2_0 => "2.0",
            Version::V3_0 => "3.0",
            Version::V3_1 => "3.1",
            Version::V4_0_1 => "4.0.1",
            Version::V4_1 => "4.1",
            Version::V5_0 => "5.0",
        }
    }

    /// True if this version is the same as or newer than `other`
    pub fn is_at_least(&self, other: Version) -> bool {
        *self >= other
    }

    /// The namespace URI of a sub-schema in this version
    pub fn namespace_for(&self, kind: SchemaKind) -> Result<&'static str> {
        let namespace = match kind {
            SchemaKind::Ddms => self.ddms_namespace(),
            SchemaKind::Ism => self.ism_namespace(),
            SchemaKind::Ntk => {
                if !self.is_at_least(Version::V4_0_1) {
                    return Err(Error::UnsupportedVersion(format!(
                        "The ntk namespace is not defined in DDMS {}.",
                        self
                    )));
                }
                "urn:us:gov:ic:ntk"
            }
            SchemaKind::Gml => self.gml_namespace(),
            SchemaKind::Xlink => XLINK_NAMESPACE,
            SchemaKind::Virt => {
                if !self.is_at_least(Version::V5_0) {
                    return Err(Error::UnsupportedVersion(format!(
                        "The virt namespace is not defined in DDMS {}.",
                        self
                    )));
                }
                "urn:us:gov:ic:virt"
            }
        };
        Ok(namespace)
    }

    /// The DDMS namespace URI of this version
    pub fn ddms_namespace(&self) -> &'static str {
        match self {
            Version::V2_0 => "http://metadata.dod.mil/mdr/ns/DDMS/2.0/",
            Version::V3_0 => "http://metadata.dod.mil/mdr/ns/DDMS/3.0/",
            Version::V3_1 => "http://metadata.dod.mil/mdr/ns/DDMS/3.1/",
            Version::V4_0_1 | Version::V4_1 => "urn:us:mil:ces:metadata:ddms:4",
            Version::V5_0 => "urn:us:mil:ces:metadata:ddms:5",
        }
    }

    /// The ISM namespace URI of this version
    pub fn ism_namespace(&self) -> &'static str {
        if *self == Version::V2_0 {
            "urn:us:gov:ic:ism:v2"
        } else {
            "urn:us:gov:ic:ism"
        }
    }

    /// The GML namespace URI of this version
    pub fn gml_namespace(&self) -> &'static str {
        if *self == Version::V2_0 {
            "http://www.opengis.net/gml"
        } else {
            "http://www.opengis.net/gml/3.2"
        }
    }

    /// The XLink namespace URI, identical in every version
    pub fn xlink_namespace(&self) -> &'static str {
        XLINK_NAMESPACE
    }

    /// Location of the DDMS schema for this version
    pub fn schema_location(&self) -> String {
        let dir = match self {
            Version::V4_0_1 => "4.0.1",
            other => other.as_str(),
        };
        format!("/schemas/{}/DDMS/DDMS-v{}.xsd", dir, dir.replace('.', "_"))
    }

    /// Map a DDMS namespace URI back to a version.
    ///
    /// 4.0.1 and 4.1 share a namespace; the ambient version wins when it is
    /// one of them, otherwise the newer one is returned.
    pub fn for_namespace(namespace: &str) -> Result<Self> {
        let current = current_version();
        if current.ddms_namespace() == namespace {
            return Ok(current);
        }
        Version::ALL
            .iter()
            .rev()
            .find(|v| v.ddms_namespace() == namespace)
            .copied()
            .ok_or_else(|| {
                Error::UnsupportedVersion(format!(
                    "Unsupported DDMS namespace: {}",
                    namespace
                ))
            })
    }

    /// True if the namespace is the DDMS namespace of any supported version
    pub fn is_supported_ddms_namespace(namespace: &str) -> bool {
        Version::ALL.iter().any(|v| v.ddms_namespace() == namespace)
    }
}

impl Default for Version {
    fn default() -> Self {
        Version::LATEST
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

static CURRENT_VERSION: Lazy<RwLock<Version>> = Lazy::new(|| RwLock::new(Version::LATEST));

/// The ambient default version
pub fn current_version() -> Version {
    match CURRENT_VERSION.read() {
        Ok(guard) => *guard,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

/// Change the ambient default version
pub fn set_current_version(token: &str) -> Result<Version> {
    let version = Version::from_str(token)?;
    match CURRENT_VERSION.write() {
        Ok(mut guard) => *guard = version,
        Err(poisoned) => *poisoned.into_inner() = version,
    }
    debug!(version = %version, "ambient DDMS version changed");
    Ok(version)
}

/// Free-function form of [`Version::namespace_for`] taking a token
pub fn namespace_for(token: &str, kind: SchemaKind) -> Result<&'static str> {
    Version::from_str(token)?.namespace_for(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tokens_and_alias() {
        assert_eq!(Version::from_str("2.0").unwrap(), Version::V2_0);
        assert_eq!(Version::from_str("4.0").unwrap(), Version::V4_0_1);
        assert_eq!(Version::from_str("4.0.1").unwrap().as_str(), "4.0.1");
        assert!(matches!(
            Version::from_str("1.4"),
            Err(Error::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn test_is_at_least() {
        assert!(Version::V4_1.is_at_least(Version::V4_0_1));
        assert!(Version::V3_0.is_at_least(Version::V3_0));
        assert!(!Version::V2_0.is_at_least(Version::V3_0));
    }

    #[test]
    fn test_namespaces() {
        assert_eq!(
            namespace_for("2.0", SchemaKind::Ism).unwrap(),
            "urn:us:gov:ic:ism:v2"
        );
        assert_eq!(
            namespace_for("3.1", SchemaKind::Gml).unwrap(),
            "http://www.opengis.net/gml/3.2"
        );
        assert_eq!(
            namespace_for("5.0", SchemaKind::Ddms).unwrap(),
            "urn:us:mil:ces:metadata:ddms:5"
        );
        assert!(namespace_for("3.1", SchemaKind::Ntk).is_err());
        assert_eq!(
            namespace_for("4.1", SchemaKind::Ntk).unwrap(),
            "urn:us:gov:ic:ntk"
        );
        assert!(namespace_for("4.1", SchemaKind::Virt).is_err());
        assert_eq!(
            namespace_for("5.0", SchemaKind::Virt).unwrap(),
            "urn:us:gov:ic:virt"
        );
    }

    #[test]
    fn test_for_namespace() {
        assert_eq!(
            Version::for_namespace("http://metadata.dod.mil/mdr/ns/DDMS/3.0/").unwrap(),
            Version::V3_0
        );
        assert!(Version::for_namespace("urn:example").is_err());
        let shared = Version::for_namespace("urn:us:mil:ces:metadata:ddms:4").unwrap();
        assert!(shared == Version::V4_0_1 || shared == Version::V4_1);
    }

    #[test]
    fn test_schema_location() {
        assert_eq!(
            Version::V4_0_1.schema_location(),
            "/schemas/4.0.1/DDMS/DDMS-v4_0_1.xsd"
        );
    }
}
