//! Error types for ddms-rs
//!
//! This module defines all error types used throughout the library. Data
//! problems surface as [`Error::InvalidComponent`] carrying a locator path;
//! every other variant describes a programming or environment problem and
//! never carries a locator.

use std::fmt;
use thiserror::Error;

/// Result type alias using the ddms Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ddms operations
#[derive(Error, Debug)]
pub enum Error {
    /// A component failed validation
    #[error("invalid component: {0}")]
    InvalidComponent(#[from] ValidationError),

    /// An unknown DDMS version token, or a schema not defined for a version
    #[error("unsupported version: {0}")]
    UnsupportedVersion(String),

    /// A programming error, such as asking for an unknown vocabulary
    #[error("illegal argument: {0}")]
    IllegalArgument(String),

    /// Configuration or resource table problem
    #[error("configuration error: {0}")]
    Configuration(String),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for an [`Error::InvalidComponent`] without a locator
    pub fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidComponent(ValidationError::new(message))
    }

    /// Prepend a qualified name to the locator of a validation failure.
    ///
    /// Other variants pass through unchanged.
    pub fn locate(self, qualified_name: &str) -> Self {
        match self {
            Error::InvalidComponent(err) => Error::InvalidComponent(err.prepend_locator(qualified_name)),
            other => other,
        }
    }

    /// The validation message, when this is a validation failure
    pub fn message(&self) -> Option<&str> {
        match self {
            Error::InvalidComponent(err) => Some(&err.message),
            _ => None,
        }
    }

    /// The locator path, when this is a located validation failure
    pub fn locator(&self) -> Option<&str> {
        match self {
            Error::InvalidComponent(err) => err.locator.as_deref(),
            _ => None,
        }
    }
}

/// DDMS component validation error with context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Error message
    pub message: String,
    /// XPath-like path to the component that failed validation
    pub locator: Option<String>,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locator: None,
        }
    }

    /// Set the locator path
    pub fn with_locator(mut self, locator: impl Into<String>) -> Self {
        self.locator = Some(locator.into());
        self
    }

    /// Prepend `/qualified_name` to the locator path
    pub fn prepend_locator(mut self, qualified_name: &str) -> Self {
        if qualified_name.is_empty() {
            return self;
        }
        let tail = self.locator.take().unwrap_or_default();
        self.locator = Some(format!("/{}{}", qualified_name, tail));
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref locator) = self.locator {
            write!(f, "\n\nPath: {}", locator)?;
        }

        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("qualifier attribute is required.")
            .with_locator("/ddms:countryCode");

        let msg = format!("{}", err);
        assert!(msg.contains("qualifier attribute is required."));
        assert!(msg.contains("Path: /ddms:countryCode"));
    }

    #[test]
    fn test_locate_builds_breadcrumb_from_leaf_to_root() {
        let err = Error::invalid("A longitude value must be between -180 and 180 degrees: 200.0")
            .locate("ddms:boundingBox")
            .locate("ddms:geospatialCoverage")
            .locate("ddms:resource");

        assert_eq!(
            err.locator(),
            Some("/ddms:resource/ddms:geospatialCoverage/ddms:boundingBox")
        );
    }

    #[test]
    fn test_locate_ignores_other_variants() {
        let err = Error::UnsupportedVersion("1.4".to_string()).locate("ddms:resource");
        assert!(matches!(err, Error::UnsupportedVersion(_)));
        assert!(err.locator().is_none());
    }

    #[test]
    fn test_error_conversion() {
        let val_err = ValidationError::new("test");
        let err: Error = val_err.into();
        assert!(matches!(err, Error::InvalidComponent(_)));
        assert_eq!(err.message(), Some("test"));
    }
}
