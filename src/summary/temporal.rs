//! Temporal coverage

use crate::attributes::{SecurityAttributes, SecurityAttributesBuilder};
use crate::components::helpers::{
    add_wrapped, content_element, ddms_element, ddms_text_element, locate_in_wrapper, require_compatible,
    require_count, require_ddms_element,
};
use crate::components::{output, Base, Builder, Component};
use crate::datatypes::{is_after, validate_ddms_date};
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::resource::dates::{ApproximableDate, ApproximableDateBuilder};
use crate::versions::Version;
use std::sync::Arc;

const TIME_PERIOD: &str = "TimePeriod";

/// Substituted for a missing period name, start or end
pub const DEFAULT_VALUE: &str = "Unknown";

/// Tokens accepted in place of a date
pub const EXTENDED_DATE_TYPES: [&str; 2] = ["Not Applicable", "Unknown"];

/// Require a DDMS date, or one of [`EXTENDED_DATE_TYPES`]
pub fn validate_extended_date(value: &str) -> Result<()> {
    if EXTENDED_DATE_TYPES.contains(&value) {
        return Ok(());
    }
    validate_ddms_date(value).map(|_| ()).map_err(|_| {
        Error::invalid(format!(
            "If no date is specified, the value must be one of {}",
            EXTENDED_DATE_TYPES.join(", ")
        ))
    })
}

/// One end of a time period
#[derive(Debug, Clone, PartialEq)]
pub enum TimeBound {
    /// `ddms:start` or `ddms:end`: a date or an extended token
    Exact(String),
    /// `ddms:approximableStart` or `ddms:approximableEnd`, DDMS 4.1 or later
    Approximate(Arc<ApproximableDate>),
}

impl TimeBound {
    /// The exact value, or an empty string for an approximate bound
    pub fn exact(&self) -> &str {
        match self {
            TimeBound::Exact(value) => value,
            TimeBound::Approximate(_) => "",
        }
    }

    fn to_element(&self, version: Version, local_name: &str) -> Element {
        match self {
            TimeBound::Exact(value) => ddms_text_element(version, local_name, value),
            TimeBound::Approximate(date) => date.element().clone(),
        }
    }

    fn output(&self, html: bool, prefix: &str, local_name: &str) -> String {
        match self {
            TimeBound::Exact(value) => output::line_always(html, &format!("{}{}", prefix, local_name), value),
            TimeBound::Approximate(date) => date.output(html, prefix, ""),
        }
    }
}

fn read_bound(content: &Element, version: Version, exact: &str, approximate: &str) -> Result<Option<TimeBound>> {
    let namespace = content.namespace().unwrap_or("");
    if let Some(child) = content.first_child(namespace, exact) {
        return Ok(Some(TimeBound::Exact(child.text().to_string())));
    }
    match content.first_child(namespace, approximate) {
        Some(child) => Ok(Some(TimeBound::Approximate(Arc::new(ApproximableDate::from_element(
            child.clone(),
            version,
        )?)))),
        None => Ok(None),
    }
}

/// The time span the resource covers
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalCoverage {
    base: Base,
    time_period_name: Option<String>,
    start: Option<TimeBound>,
    end: Option<TimeBound>,
    security_attributes: SecurityAttributes,
}

impl TemporalCoverage {
    /// Parse a `ddms:temporalCoverage` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let (time_period_name, start, end) = match content_element(&element, version, TIME_PERIOD) {
            Some(content) => {
                let namespace = content.namespace().unwrap_or("");
                let name = content.first_child(namespace, "name").map(|n| n.text().to_string());
                let start = read_bound(content, version, "start", "approximableStart")
                    .map_err(|e| locate_in_wrapper(e, content, TIME_PERIOD).locate(&qname))?;
                let end = read_bound(content, version, "end", "approximableEnd")
                    .map_err(|e| locate_in_wrapper(e, content, TIME_PERIOD).locate(&qname))?;
                (name, start, end)
            }
            None => (None, None, None),
        };
        let security_attributes =
            SecurityAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        Self {
            time_period_name,
            start,
            end,
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from a period name and two bounds.
    ///
    /// An empty exact bound defaults to `Unknown`.
    pub fn new(
        version: Version,
        time_period_name: &str,
        start: TimeBound,
        end: TimeBound,
        security_attributes: SecurityAttributes,
    ) -> Result<Self> {
        let default_empty = |bound: TimeBound| match bound {
            TimeBound::Exact(value) if value.trim().is_empty() => TimeBound::Exact(DEFAULT_VALUE.to_string()),
            other => other,
        };
        let start = default_empty(start);
        let end = default_empty(end);
        let mut element = ddms_element(version, "temporalCoverage");
        let qname = element.qualified_name();
        let mut children = Vec::new();
        if !time_period_name.is_empty() {
            children.push(ddms_text_element(version, "name", time_period_name));
        }
        children.push(start.to_element(version, "start"));
        children.push(end.to_element(version, "end"));
        add_wrapped(&mut element, version, TIME_PERIOD, children);
        security_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&qname))?;
        let time_period_name = Some(time_period_name.to_string()).filter(|n| !n.is_empty());
        Self {
            time_period_name,
            start: Some(start),
            end: Some(end),
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from plain date strings
    pub fn from_dates(
        version: Version,
        time_period_name: &str,
        start: &str,
        end: &str,
        security_attributes: SecurityAttributes,
    ) -> Result<Self> {
        Self::new(
            version,
            time_period_name,
            TimeBound::Exact(start.to_string()),
            TimeBound::Exact(end.to_string()),
            security_attributes,
        )
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        if matches!(self.time_period_name.as_deref(), Some("")) {
            self.base.warn(format!(
                "A ddms:name element was found with no value. Defaulting to \"{}\".",
                DEFAULT_VALUE
            ));
        }
        let approximate: Vec<Arc<ApproximableDate>> = [&self.start, &self.end]
            .into_iter()
            .flatten()
            .filter_map(|bound| match bound {
                TimeBound::Approximate(date) => Some(date.clone()),
                TimeBound::Exact(_) => None,
            })
            .collect();
        for date in &approximate {
            self.base.absorb(&**date);
        }
        let attribute_warnings = self.security_attributes.warnings().to_vec();
        self.base.absorb_attributes(&attribute_warnings);
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let version = self.version();
        require_ddms_element(self.element(), version, "temporalCoverage")?;
        let content = content_element(self.element(), version, TIME_PERIOD)
            .ok_or_else(|| Error::invalid(format!("{} element is required.", TIME_PERIOD)))?;
        self.validate_content(content)
            .map_err(|e| locate_in_wrapper(e, content, TIME_PERIOD))?;
        if !self.security_attributes.is_empty() && !version.is_at_least(Version::V3_0) {
            return Err(Error::invalid(
                "Security attributes cannot be applied to this component until DDMS 3.0 or later.",
            ));
        }
        Ok(())
    }

    fn validate_content(&self, content: &Element) -> Result<()> {
        let version = self.version();
        let namespace = content.namespace().unwrap_or("");
        let count = |local: &str| content.children_named(namespace, local).count();
        require_count("ddms:name", count("name"), 0, 1)?;
        if version.is_at_least(Version::V4_1) {
            require_count("start or approximableStart", count("start") + count("approximableStart"), 1, 1)?;
            require_count("end or approximableEnd", count("end") + count("approximableEnd"), 1, 1)?;
        } else {
            require_count("ddms:start", count("start"), 1, 1)?;
            require_count("ddms:end", count("end"), 1, 1)?;
        }
        for bound in [&self.start, &self.end].into_iter().flatten() {
            match bound {
                TimeBound::Exact(value) => validate_extended_date(value)?,
                TimeBound::Approximate(date) => require_compatible(version, &**date)?,
            }
        }
        if is_after(self.start_string(), self.end_string()) {
            return Err(Error::invalid("The start date is after the end date."));
        }
        Ok(())
    }

    /// The period name, `Unknown` when the name element is present but empty
    pub fn time_period_name(&self) -> &str {
        match self.time_period_name.as_deref() {
            Some("") => DEFAULT_VALUE,
            Some(name) => name,
            None => "",
        }
    }

    /// The start bound
    pub fn start(&self) -> Option<&TimeBound> {
        self.start.as_ref()
    }

    /// The end bound
    pub fn end(&self) -> Option<&TimeBound> {
        self.end.as_ref()
    }

    /// The exact start value, empty when approximate
    pub fn start_string(&self) -> &str {
        self.start.as_ref().map(TimeBound::exact).unwrap_or("")
    }

    /// The exact end value, empty when approximate
    pub fn end_string(&self) -> &str {
        self.end.as_ref().map(TimeBound::exact).unwrap_or("")
    }
}

impl Component for TemporalCoverage {
    fn base(&self) -> &Base {
        &self.base
    }

    fn security_attributes(&self) -> Option<&SecurityAttributes> {
        Some(&self.security_attributes)
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let mut prefix = format!("{}.", output::build_prefix(prefix, self.name(), suffix));
        if !self.version().is_at_least(Version::V4_0_1) {
            prefix.push_str(TIME_PERIOD);
            prefix.push('.');
        }
        let mut text = output::line(html, &format!("{}name", prefix), self.time_period_name());
        if let Some(start) = &self.start {
            text.push_str(&start.output(html, &prefix, "start"));
        }
        if let Some(end) = &self.end {
            text.push_str(&end.output(html, &prefix, "end"));
        }
        text.push_str(&self.security_attributes.output(html, &prefix));
        text
    }
}

/// Staging form of [`TemporalCoverage`]
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalCoverageBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Period name
    pub time_period_name: String,
    /// Exact start
    pub start_string: String,
    /// Exact end
    pub end_string: String,
    /// Approximate start, used when the exact start is blank
    pub approximable_start: ApproximableDateBuilder,
    /// Approximate end, used when the exact end is blank
    pub approximable_end: ApproximableDateBuilder,
    /// Security attributes
    pub security_attributes: SecurityAttributesBuilder,
}

impl Default for TemporalCoverageBuilder {
    fn default() -> Self {
        Self {
            version: None,
            time_period_name: String::new(),
            start_string: String::new(),
            end_string: String::new(),
            approximable_start: ApproximableDateBuilder::named("approximableStart"),
            approximable_end: ApproximableDateBuilder::named("approximableEnd"),
            security_attributes: SecurityAttributesBuilder::default(),
        }
    }
}

impl TemporalCoverageBuilder {
    fn bound(&self, exact: &str, approximate: &ApproximableDateBuilder, version: Version) -> Result<TimeBound> {
        if exact.trim().is_empty() {
            if let Some(date) = approximate.commit_as(version)? {
                return Ok(TimeBound::Approximate(Arc::new(date)));
            }
        }
        Ok(TimeBound::Exact(exact.to_string()))
    }
}

impl Builder for TemporalCoverageBuilder {
    type Target = TemporalCoverage;

    fn is_empty(&self) -> bool {
        self.time_period_name.trim().is_empty()
            && self.start_string.trim().is_empty()
            && self.end_string.trim().is_empty()
            && self.approximable_start.is_empty()
            && self.approximable_end.is_empty()
            && self.security_attributes.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<TemporalCoverage> {
        TemporalCoverage::new(
            version,
            &self.time_period_name,
            self.bound(&self.start_string, &self.approximable_start, version)?,
            self.bound(&self.end_string, &self.approximable_end, version)?,
            self.security_attributes.commit_as(version)?,
        )
    }
}

impl From<&TemporalCoverage> for TemporalCoverageBuilder {
    fn from(coverage: &TemporalCoverage) -> Self {
        let mut builder = Self {
            version: Some(coverage.version()),
            time_period_name: coverage.time_period_name.clone().unwrap_or_default(),
            security_attributes: SecurityAttributesBuilder::from(&coverage.security_attributes),
            ..Self::default()
        };
        match &coverage.start {
            Some(TimeBound::Exact(value)) => builder.start_string = value.clone(),
            Some(TimeBound::Approximate(date)) => builder.approximable_start = ApproximableDateBuilder::from(&**date),
            None => {}
        }
        match &coverage.end {
            Some(TimeBound::Exact(value)) => builder.end_string = value.clone(),
            Some(TimeBound::Approximate(date)) => builder.approximable_end = ApproximableDateBuilder::from(&**date),
            None => {}
        }
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::parse_element;
    use pretty_assertions::assert_eq;

    fn security(version: Version) -> SecurityAttributes {
        SecurityAttributes::classified(version, "U", &["USA"]).unwrap()
    }

    #[test]
    fn test_time_period_wrapper_before_4_0_1() {
        let v = Version::V3_0;
        let coverage =
            TemporalCoverage::from_dates(v, "Test Name", "1979-09-15", "Not Applicable", security(v)).unwrap();
        assert!(coverage.to_xml().contains("<ddms:TimePeriod>"));
        assert_eq!(
            coverage.to_text(),
            "temporalCoverage.TimePeriod.name: Test Name\n\
temporalCoverage.TimePeriod.start: 1979-09-15\n\
temporalCoverage.TimePeriod.end: Not Applicable\n\
temporalCoverage.TimePeriod.classification: U\n\
temporalCoverage.TimePeriod.ownerProducer: USA\n"
        );
        let parsed = TemporalCoverage::from_element(parse_element(&coverage.to_xml()).unwrap(), v).unwrap();
        assert_eq!(parsed, coverage);
    }

    #[test]
    fn test_empty_bounds_default_to_unknown() {
        let v = Version::V5_0;
        let coverage = TemporalCoverage::from_dates(v, "", "", "", SecurityAttributes::empty(v)).unwrap();
        assert_eq!(coverage.start_string(), "Unknown");
        assert_eq!(coverage.to_text(), "temporalCoverage.start: Unknown\ntemporalCoverage.end: Unknown\n");
    }

    #[test]
    fn test_rejects_bad_dates() {
        let v = Version::V5_0;
        let err = TemporalCoverage::from_dates(v, "", "someday", "Unknown", SecurityAttributes::empty(v))
            .unwrap_err();
        assert_eq!(
            err.message(),
            Some("If no date is specified, the value must be one of Not Applicable, Unknown")
        );
        let err = TemporalCoverage::from_dates(v, "", "2010", "2005", SecurityAttributes::empty(v)).unwrap_err();
        assert_eq!(err.message(), Some("The start date is after the end date."));
        assert_eq!(err.locator(), Some("/ddms:temporalCoverage"));
    }

    #[test]
    fn test_security_gated_at_3_0() {
        let err = TemporalCoverage::from_dates(Version::V2_0, "", "2005", "2010", security(Version::V2_0))
            .unwrap_err();
        assert_eq!(
            err.message(),
            Some("Security attributes cannot be applied to this component until DDMS 3.0 or later.")
        );
    }

    #[test]
    fn test_empty_name_warns() {
        let xml = r#"<ddms:temporalCoverage xmlns:ddms="urn:us:mil:ces:metadata:ddms:5"><ddms:name /><ddms:start>2005</ddms:start><ddms:end>2010</ddms:end></ddms:temporalCoverage>"#;
        let coverage = TemporalCoverage::from_element(parse_element(xml).unwrap(), Version::V5_0).unwrap();
        assert_eq!(coverage.time_period_name(), "Unknown");
        assert_eq!(
            coverage.warnings()[0].text,
            "A ddms:name element was found with no value. Defaulting to \"Unknown\"."
        );
    }

    #[test]
    fn test_approximable_start_from_4_1() {
        let v = Version::V4_1;
        let start =
            ApproximableDate::new(v, "approximableStart", "", "2010", "circa", "2009", "2011").unwrap();
        let coverage = TemporalCoverage::new(
            v,
            "",
            TimeBound::Approximate(Arc::new(start)),
            TimeBound::Exact("2012".to_string()),
            SecurityAttributes::empty(v),
        )
        .unwrap();
        assert!(coverage.to_text().starts_with("temporalCoverage.approximableStart.approximableDate: 2010\n"));
        let builder = TemporalCoverageBuilder::from(&coverage);
        assert_eq!(builder.commit().unwrap().unwrap(), coverage);
    }

    #[test]
    fn test_missing_time_period() {
        let xml = r#"<ddms:temporalCoverage xmlns:ddms="http://metadata.dod.mil/mdr/ns/DDMS/3.1/" />"#;
        let err = TemporalCoverage::from_element(parse_element(xml).unwrap(), Version::V3_1).unwrap_err();
        assert_eq!(err.message(), Some("TimePeriod element is required."));
    }
}
