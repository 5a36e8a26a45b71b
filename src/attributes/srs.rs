//! GML spatial reference system attributes

use crate::components::helpers::{split_list, xs_list};
use crate::components::output;
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::names::validate_ncname_list;
use crate::namespaces::QName;
use crate::datatypes::validate_uri;
use crate::versions::Version;

/// srsName, srsDimension, axisLabels and uomLabels
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SrsAttributes {
    srs_name: String,
    srs_dimension: Option<u32>,
    axis_labels: Vec<String>,
    uom_labels: Vec<String>,
}

impl SrsAttributes {
    /// Read the unqualified SRS attributes of a GML element
    pub fn from_element(element: &Element) -> Result<Self> {
        let dimension = match element.attribute(None, "srsDimension") {
            Some(value) => Some(
                value
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| Error::invalid("The srsDimension must be a positive integer."))?,
            ),
            None => None,
        };
        Self::new(
            element.attribute(None, "srsName").unwrap_or(""),
            dimension,
            &split_list(element.attribute(None, "axisLabels").unwrap_or("")),
            &split_list(element.attribute(None, "uomLabels").unwrap_or("")),
        )
    }

    /// Build from raw values
    pub fn new(
        srs_name: &str,
        srs_dimension: Option<i64>,
        axis_labels: &[String],
        uom_labels: &[String],
    ) -> Result<Self> {
        let srs_dimension = match srs_dimension {
            Some(d) if d <= 0 || d > i64::from(u32::MAX) => {
                return Err(Error::invalid("The srsDimension must be a positive integer."))
            }
            Some(d) => Some(d as u32),
            None => None,
        };
        let attributes = Self {
            srs_name: srs_name.to_string(),
            srs_dimension,
            axis_labels: axis_labels.to_vec(),
            uom_labels: uom_labels.to_vec(),
        };
        attributes.validate()?;
        Ok(attributes)
    }

    fn validate(&self) -> Result<()> {
        if !self.srs_name.is_empty() {
            validate_uri(&self.srs_name)?;
        }
        if !self.axis_labels.is_empty() && self.srs_name.is_empty() {
            return Err(Error::invalid(
                "The axisLabels attribute can only be used in tandem with an srsName.",
            ));
        }
        if !self.uom_labels.is_empty() && self.axis_labels.is_empty() {
            return Err(Error::invalid(
                "The uomLabels attribute can only be used in tandem with axisLabels.",
            ));
        }
        validate_ncname_list(&xs_list(&self.axis_labels))?;
        validate_ncname_list(&xs_list(&self.uom_labels))?;
        Ok(())
    }

    /// True if no attribute is set
    pub fn is_empty(&self) -> bool {
        self.srs_name.is_empty()
            && self.srs_dimension.is_none()
            && self.axis_labels.is_empty()
            && self.uom_labels.is_empty()
    }

    /// The srsName URI
    pub fn srs_name(&self) -> &str {
        &self.srs_name
    }

    /// The srsDimension
    pub fn srs_dimension(&self) -> Option<u32> {
        self.srs_dimension
    }

    /// The axisLabels
    pub fn axis_labels(&self) -> &[String] {
        &self.axis_labels
    }

    /// The uomLabels
    pub fn uom_labels(&self) -> &[String] {
        &self.uom_labels
    }

    /// Write these attributes onto a freshly built element
    pub fn add_to(&self, element: &mut Element, _version: Version) {
        let dimension = self.srs_dimension.map(|d| d.to_string()).unwrap_or_default();
        for (name, value) in [
            ("srsName", self.srs_name.clone()),
            ("srsDimension", dimension),
            ("axisLabels", xs_list(&self.axis_labels)),
            ("uomLabels", xs_list(&self.uom_labels)),
        ] {
            if !value.is_empty() {
                element.set_attribute(QName::local(name), value);
            }
        }
    }

    /// Render each set attribute as `prefix + name`
    pub fn output(&self, html: bool, prefix: &str) -> String {
        let dimension = self.srs_dimension.map(|d| d.to_string()).unwrap_or_default();
        let mut text = String::new();
        text.push_str(&output::line(html, &format!("{}srsName", prefix), &self.srs_name));
        text.push_str(&output::line(html, &format!("{}srsDimension", prefix), &dimension));
        text.push_str(&output::line(html, &format!("{}axisLabels", prefix), &xs_list(&self.axis_labels)));
        text.push_str(&output::line(html, &format!("{}uomLabels", prefix), &xs_list(&self.uom_labels)));
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_dimension_must_be_positive() {
        let err = SrsAttributes::new("http://www.opengis.net/def/crs/EPSG/0/4326", Some(0), &[], &[]).unwrap_err();
        assert_eq!(err.message(), Some("The srsDimension must be a positive integer."));
    }

    #[test]
    fn test_label_dependencies() {
        assert!(SrsAttributes::new("", None, &labels(&["A"]), &[]).is_err());
        assert!(SrsAttributes::new("http://x", None, &[], &labels(&["M"])).is_err());
        let ok = SrsAttributes::new("http://x", Some(10), &labels(&["A", "B"]), &labels(&["M", "N"])).unwrap();
        assert_eq!(ok.output(false, "pos."), "pos.srsName: http://x\npos.srsDimension: 10\npos.axisLabels: A B\npos.uomLabels: M N\n");
    }

    #[test]
    fn test_labels_are_ncnames() {
        let err = SrsAttributes::new("http://x", None, &labels(&["1A"]), &[]).unwrap_err();
        assert_eq!(err.message(), Some("\"1A\" is not a valid NCName."));
    }
}
