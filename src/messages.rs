//! Validation messages
//!
//! A [`ValidationMessage`] is an advisory record produced while validating:
//! components accumulate warnings, and the Schematron pass reports both
//! warnings and errors in the same shape.

use serde::Serialize;
use std::fmt;

/// Severity of a validation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Advisory only
    Warning,
    /// A rule was broken
    Error,
}

impl MessageKind {
    /// Get the kind as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Warning => "warning",
            MessageKind::Error => "error",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable validation message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ValidationMessage {
    /// Severity
    pub kind: MessageKind,
    /// Human-readable text
    pub text: String,
    /// XPath-like location, empty when the message concerns the component itself
    pub locator: String,
}

impl ValidationMessage {
    /// Create a warning
    pub fn warning(text: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Warning,
            text: text.into(),
            locator: locator.into(),
        }
    }

    /// Create an error
    pub fn error(text: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Error,
            text: text.into(),
            locator: locator.into(),
        }
    }

    /// A copy of this message with `/qualified_name` prepended to the locator
    pub fn located_under(&self, qualified_name: &str) -> Self {
        Self {
            kind: self.kind,
            text: self.text.clone(),
            locator: format!("/{}{}", qualified_name, self.locator),
        }
    }
}

impl fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.text)?;
        if !self.locator.is_empty() {
            write!(f, " ({})", self.locator)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_located_under() {
        let msg = ValidationMessage::warning("A completely empty ddms:dates element was found.", "");
        let nested = msg.located_under("ddms:dates").located_under("ddms:resource");
        assert_eq!(nested.locator, "/ddms:resource/ddms:dates");
        assert_eq!(nested.kind, MessageKind::Warning);
    }

    #[test]
    fn test_display() {
        let msg = ValidationMessage::error("bad", "/ddms:resource");
        assert_eq!(msg.to_string(), "[error] bad (/ddms:resource)");
    }
}
