//! Component infrastructure
//!
//! Every DDMS element is modelled as an immutable component backed by one
//! [`Element`]. A component is created in one of two ways, from a parsed
//! element or from typed field values, and in both cases it is validated
//! before the constructor returns. There is no partially built component: a
//! constructor either hands back a valid value or an error whose locator names
//! the path to the failing element.
//!
//! Nested components are held behind [`Arc`](std::sync::Arc), so one built
//! instance may be shared by several parents. Parents check that a shared
//! child was built for the same DDMS version.

pub mod builders;
pub mod helpers;
pub mod output;

pub use builders::{Builder, BuilderList};

use crate::attributes::SecurityAttributes;
use crate::documents::Element;
use crate::messages::ValidationMessage;
use crate::versions::Version;
use std::fmt;

/// Contract shared by every element-backed DDMS value
pub trait Component: fmt::Debug + Send + Sync {
    /// Shared state: backing element, version and warnings
    fn base(&self) -> &Base;

    /// Render HTML meta tags or text lines.
    ///
    /// `prefix` is the dotted path of the parent and `suffix` is appended to
    /// this component's own name, normally an index like `[2]`.
    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String;

    /// Security attributes carried by this component, if it can carry any
    fn security_attributes(&self) -> Option<&SecurityAttributes> {
        None
    }

    /// The backing element
    fn element(&self) -> &Element {
        &self.base().element
    }

    /// The DDMS version this component was validated against
    fn version(&self) -> Version {
        self.base().version
    }

    /// Local name of the element
    fn name(&self) -> &str {
        self.element().local_name()
    }

    /// Namespace URI of the element
    fn namespace(&self) -> &str {
        self.element().namespace().unwrap_or("")
    }

    /// Namespace prefix of the element
    fn prefix(&self) -> &str {
        self.element().prefix().unwrap_or("")
    }

    /// The element name as written, e.g. `ddms:title`
    fn qualified_name(&self) -> String {
        self.element().qualified_name()
    }

    /// Warnings found while validating this component and its children
    fn warnings(&self) -> &[ValidationMessage] {
        &self.base().warnings
    }

    /// Serialize the backing element
    fn to_xml(&self) -> String {
        self.element().to_xml()
    }

    /// HTML meta tags, one per field
    fn to_html(&self) -> String {
        self.output(true, "", "")
    }

    /// Text lines, one per field
    fn to_text(&self) -> String {
        self.output(false, "", "")
    }
}

/// State common to all components.
///
/// Two bases are equal when their elements have the same namespace and local
/// name; the component's own fields carry the rest of its logical value.
#[derive(Debug, Clone)]
pub struct Base {
    element: Element,
    version: Version,
    warnings: Vec<ValidationMessage>,
}

impl Base {
    /// Wrap a backing element
    pub fn new(element: Element, version: Version) -> Self {
        Self {
            element,
            version,
            warnings: Vec::new(),
        }
    }

    /// The backing element
    pub fn element(&self) -> &Element {
        &self.element
    }

    /// The DDMS version
    pub fn version(&self) -> Version {
        self.version
    }

    /// The element name as written
    pub fn qualified_name(&self) -> String {
        self.element.qualified_name()
    }

    /// Record a warning about this element
    pub fn warn(&mut self, text: impl Into<String>) {
        let locator = format!("/{}", self.qualified_name());
        self.warnings.push(ValidationMessage::warning(text, locator));
    }

    /// Absorb the warnings of a nested component
    pub fn absorb<C: Component + ?Sized>(&mut self, child: &C) {
        let qualified_name = self.qualified_name();
        self.warnings.extend(
            child
                .warnings()
                .iter()
                .map(|w| w.located_under(&qualified_name)),
        );
    }

    /// Absorb warnings from an attribute group decorating this element
    pub fn absorb_attributes(&mut self, warnings: &[ValidationMessage]) {
        let qualified_name = self.qualified_name();
        self.warnings
            .extend(warnings.iter().map(|w| w.located_under(&qualified_name)));
    }
}

impl PartialEq for Base {
    fn eq(&self, other: &Self) -> bool {
        self.element.namespace() == other.element.namespace()
            && self.element.local_name() == other.element.local_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::QName;

    #[test]
    fn test_base_equality_ignores_content() {
        let mut a = Element::new(QName::prefixed("ddms", "urn:x", "title"));
        a.set_text("one");
        let mut b = Element::new(QName::prefixed("d", "urn:x", "title"));
        b.set_text("two");
        assert_eq!(Base::new(a, Version::V5_0), Base::new(b, Version::V5_0));
    }

    #[test]
    fn test_warn_locates_at_element() {
        let mut base = Base::new(
            Element::new(QName::prefixed("ddms", "urn:x", "dates")),
            Version::V5_0,
        );
        base.warn("A completely empty ddms:dates element was found.");
        assert_eq!(base.warnings[0].locator, "/ddms:dates");
    }
}
