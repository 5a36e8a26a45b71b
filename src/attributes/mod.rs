//! Attribute groups
//!
//! Reusable attribute bundles that decorate many component types. Each group
//! validates on construction and is written onto a freshly built element with
//! `add_to`, which refuses to decorate an element of another DDMS version.

pub mod extensible;
pub mod notice;
pub mod security;
pub mod srs;
pub mod xlink;

pub use extensible::ExtensibleAttributes;
pub use notice::NoticeAttributes;
pub use security::{SecurityAttributes, SecurityAttributesBuilder};
pub use srs::SrsAttributes;
pub use xlink::XLinkAttributes;
