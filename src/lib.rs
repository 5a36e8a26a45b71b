//! # ddms-rs
//!
//! Parsing, validation and rendering of DDMS metadata records across DDMS
//! 2.0, 3.0, 3.1, 4.0.1, 4.1 and 5.0.
//!
//! Every component is immutable and valid once constructed. A component is
//! built either from a parsed XML element or from its typed parts, and both
//! paths run the same validation. Non-fatal findings are kept as warnings
//! on the component and rolled up to its parents.
//!
//! ## Example
//!
//! ```rust,ignore
//! use ddms::{Component, Resource};
//!
//! let resource = Resource::from_xml(&std::fs::read_to_string("record.xml")?)?;
//! for warning in resource.warnings() {
//!     println!("{}: {}", warning.locator, warning.text);
//! }
//! println!("{}", resource.to_text());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod config;
pub mod versions;

// XML plumbing
pub mod names;
pub mod namespaces;
pub mod documents;
pub mod datatypes;

// Component model
pub mod messages;
pub mod vocabulary;
pub mod components;
pub mod attributes;

// Components
pub mod extensible;
pub mod resource;
pub mod security;
pub mod summary;

// External rule pass
pub mod schematron;

pub use components::{Builder, Component};
pub use error::{Error, Result};
pub use messages::{MessageKind, ValidationMessage};
pub use resource::{Resource, ResourceBuilder};
pub use versions::Version;

/// Version of the ddms-rs library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
