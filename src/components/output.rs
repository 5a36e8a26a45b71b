//! HTML and text rendering helpers
//!
//! Both renderers produce one entry per leaf field, named by a dotted path:
//!
//! ```text
//! <meta name="geospatialCoverage.boundingBox.westBL" content="12.3" />
//! geospatialCoverage.boundingBox.westBL: 12.3
//! ```

use super::Component;
use quick_xml::escape::escape;
use std::sync::Arc;

/// `prefix + name + suffix`
pub fn build_prefix(prefix: &str, name: &str, suffix: &str) -> String {
    format!("{}{}{}", prefix, name, suffix)
}

/// One-based index suffix, only used when more than one value exists
pub fn index_suffix(index: usize, total: usize) -> String {
    if total > 1 {
        format!("[{}]", index + 1)
    } else {
        String::new()
    }
}

/// One entry, or nothing when the content is empty
pub fn line(html: bool, name: &str, content: &str) -> String {
    if content.is_empty() {
        String::new()
    } else {
        line_always(html, name, content)
    }
}

/// One entry, even when the content is empty
pub fn line_always(html: bool, name: &str, content: &str) -> String {
    if html {
        format!("<meta name=\"{}\" content=\"{}\" />\n", name, escape(content))
    } else {
        format!("{}: {}\n", name, content)
    }
}

/// One entry per value, indexed when there are several
pub fn lines(html: bool, name: &str, values: &[String]) -> String {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| line(html, &format!("{}{}", name, index_suffix(i, values.len())), v))
        .collect()
}

/// Render a list of nested components, indexed when there are several
pub fn components<C: Component + ?Sized>(html: bool, prefix: &str, items: &[Arc<C>]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, c)| c.output(html, prefix, &index_suffix(i, items.len())))
        .collect()
}

/// Render an optional nested component
pub fn optional<C: Component + ?Sized>(html: bool, prefix: &str, item: Option<&Arc<C>>) -> String {
    item.map(|c| c.output(html, prefix, "")).unwrap_or_default()
}
