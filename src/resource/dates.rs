//! Resource dates and approximable dates

use crate::components::helpers::{
    add_ddms_text_child, child_text, ddms_element, ddms_text_element, own_attribute,
    require_compatible, require_ddms_element, require_version, set_ddms_attribute,
};
use crate::components::{output, Base, Builder, BuilderList, Component};
use crate::datatypes::{is_after, validate_ddms_date};
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::versions::Version;
use std::sync::Arc;

const APPROXIMATIONS: [&str; 8] = [
    "1st qtr", "2nd qtr", "3rd qtr", "4th qtr", "circa", "early", "mid", "late",
];

const APPROXIMABLE_NAMES: [&str; 3] = ["acquiredOn", "approximableStart", "approximableEnd"];

/// Require a legal approximation token
pub fn validate_approximation(approximation: &str) -> Result<()> {
    if !APPROXIMATIONS.contains(&approximation) {
        return Err(Error::invalid(format!(
            "The approximation must be one of {}",
            APPROXIMATIONS.join(", ")
        )));
    }
    Ok(())
}

/// A date that may be fuzzy, bounded by a searchable window.
///
/// Backs `ddms:acquiredOn` as well as `ddms:approximableStart` and
/// `ddms:approximableEnd` inside a time period. DDMS 4.1 or later.
#[derive(Debug, Clone, PartialEq)]
pub struct ApproximableDate {
    base: Base,
    description: Option<String>,
    approximable_date: String,
    approximation: String,
    searchable_start: String,
    searchable_end: String,
}

impl ApproximableDate {
    /// Parse an approximable date element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let namespace = element.namespace().unwrap_or("").to_string();
        let description = element
            .first_child(&namespace, "description")
            .map(|e| e.text().to_string());
        let (approximable_date, approximation) = match element.first_child(&namespace, "approximableDate") {
            Some(date) => (date.text().to_string(), own_attribute(date, "approximation").to_string()),
            None => (String::new(), String::new()),
        };
        let (searchable_start, searchable_end) = match element.first_child(&namespace, "searchableDate") {
            Some(window) => (child_text(window, "start"), child_text(window, "end")),
            None => (String::new(), String::new()),
        };
        Self {
            description,
            approximable_date,
            approximation,
            searchable_start,
            searchable_end,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from raw values. `name` is one of acquiredOn, approximableStart
    /// or approximableEnd.
    pub fn new(
        version: Version,
        name: &str,
        description: &str,
        approximable_date: &str,
        approximation: &str,
        searchable_start: &str,
        searchable_end: &str,
    ) -> Result<Self> {
        let mut element = ddms_element(version, name);
        add_ddms_text_child(&mut element, version, "description", description);
        if !approximable_date.is_empty() || !approximation.is_empty() {
            let mut date = ddms_text_element(version, "approximableDate", approximable_date);
            set_ddms_attribute(&mut date, version, "approximation", approximation);
            element.add_child(date);
        }
        if !searchable_start.is_empty() || !searchable_end.is_empty() {
            let mut window = ddms_element(version, "searchableDate");
            window.add_child(ddms_text_element(version, "start", searchable_start));
            window.add_child(ddms_text_element(version, "end", searchable_end));
            element.add_child(window);
        }
        Self::from_element(element, version)
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        if self.description.as_deref().unwrap_or("").is_empty()
            && self.approximable_date.is_empty()
            && self.approximation.is_empty()
        {
            let qname = self.qualified_name();
            self.base.warn(format!("A completely empty {} element was found.", qname));
        }
        if matches!(self.description.as_deref(), Some("")) {
            self.base.warn("A completely empty ddms:description element was found.");
        }
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let name = self.name();
        if !APPROXIMABLE_NAMES.contains(&name) {
            return Err(Error::invalid(format!(
                "The element name must be one of {}",
                APPROXIMABLE_NAMES.join(", ")
            )));
        }
        require_ddms_element(self.element(), self.version(), name)?;
        require_version(self.version(), Version::V4_1, &format!("ddms:{} element", name))?;
        if !self.approximable_date.is_empty() {
            validate_ddms_date(&self.approximable_date)?;
        }
        if !self.approximation.is_empty() {
            validate_approximation(&self.approximation)?;
        }
        if !self.searchable_start.is_empty() {
            validate_ddms_date(&self.searchable_start)?;
        }
        if !self.searchable_end.is_empty() {
            validate_ddms_date(&self.searchable_end)?;
        }
        if is_after(&self.searchable_start, &self.searchable_end) {
            return Err(Error::invalid("The start date is after the end date."));
        }
        Ok(())
    }

    /// The description, when the child exists
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    /// The fuzzy date value
    pub fn approximable_date(&self) -> &str {
        &self.approximable_date
    }

    /// The approximation token
    pub fn approximation(&self) -> &str {
        &self.approximation
    }

    /// Lower bound of the searchable window
    pub fn searchable_start(&self) -> &str {
        &self.searchable_start
    }

    /// Upper bound of the searchable window
    pub fn searchable_end(&self) -> &str {
        &self.searchable_end
    }
}

impl Component for ApproximableDate {
    fn base(&self) -> &Base {
        &self.base
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let prefix = format!("{}.", output::build_prefix(prefix, self.name(), suffix));
        let mut text = output::line(html, &format!("{}description", prefix), self.description());
        text.push_str(&output::line(html, &format!("{}approximableDate", prefix), &self.approximable_date));
        text.push_str(&output::line(
            html,
            &format!("{}approximableDate.approximation", prefix),
            &self.approximation,
        ));
        text.push_str(&output::line(html, &format!("{}searchableDate.start", prefix), &self.searchable_start));
        text.push_str(&output::line(html, &format!("{}searchableDate.end", prefix), &self.searchable_end));
        text
    }
}

/// Staging form of [`ApproximableDate`]
#[derive(Debug, Clone, PartialEq)]
pub struct ApproximableDateBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Element local name
    pub name: String,
    /// Description
    pub description: String,
    /// Fuzzy date
    pub approximable_date: String,
    /// Approximation token
    pub approximation: String,
    /// Window start
    pub searchable_start: String,
    /// Window end
    pub searchable_end: String,
}

impl ApproximableDateBuilder {
    /// An empty builder for the named element
    pub fn named(name: &str) -> Self {
        Self {
            version: None,
            name: name.to_string(),
            description: String::new(),
            approximable_date: String::new(),
            approximation: String::new(),
            searchable_start: String::new(),
            searchable_end: String::new(),
        }
    }
}

impl Default for ApproximableDateBuilder {
    fn default() -> Self {
        Self::named("acquiredOn")
    }
}

impl Builder for ApproximableDateBuilder {
    type Target = ApproximableDate;

    fn is_empty(&self) -> bool {
        [
            &self.description,
            &self.approximable_date,
            &self.approximation,
            &self.searchable_start,
            &self.searchable_end,
        ]
        .iter()
        .all(|v| v.trim().is_empty())
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<ApproximableDate> {
        ApproximableDate::new(
            version,
            &self.name,
            &self.description,
            &self.approximable_date,
            &self.approximation,
            &self.searchable_start,
            &self.searchable_end,
        )
    }
}

impl From<&ApproximableDate> for ApproximableDateBuilder {
    fn from(date: &ApproximableDate) -> Self {
        Self {
            version: Some(date.version()),
            name: date.name().to_string(),
            description: date.description().to_string(),
            approximable_date: date.approximable_date.clone(),
            approximation: date.approximation.clone(),
            searchable_start: date.searchable_start.clone(),
            searchable_end: date.searchable_end.clone(),
        }
    }
}

/// The date attributes of `ddms:dates`, in output order, with the version each
/// first appears in
const DATE_ATTRIBUTES: [(&str, Version); 6] = [
    ("created", Version::V2_0),
    ("posted", Version::V2_0),
    ("validTil", Version::V2_0),
    ("infoCutOff", Version::V2_0),
    ("approvedOn", Version::V3_1),
    ("receivedOn", Version::V4_0_1),
];

/// Dates associated with the resource
#[derive(Debug, Clone, PartialEq)]
pub struct Dates {
    base: Base,
    acquired_ons: Vec<Arc<ApproximableDate>>,
    values: [String; 6],
}

impl Dates {
    /// Parse a `ddms:dates` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let namespace = element.namespace().unwrap_or("").to_string();
        let acquired_ons = element
            .children_named(&namespace, "acquiredOn")
            .map(|e| ApproximableDate::from_element(e.clone(), version).map(Arc::new))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.locate(&qname))?;
        let values = DATE_ATTRIBUTES.map(|(name, _)| own_attribute(&element, name).to_string());
        Self {
            acquired_ons,
            values,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from acquisition dates plus created, posted, validTil,
    /// infoCutOff, approvedOn and receivedOn, in that order
    pub fn new(version: Version, acquired_ons: Vec<Arc<ApproximableDate>>, values: [&str; 6]) -> Result<Self> {
        let mut element = ddms_element(version, "dates");
        for ((name, _), value) in DATE_ATTRIBUTES.iter().zip(values.iter()) {
            set_ddms_attribute(&mut element, version, name, value);
        }
        for acquired_on in &acquired_ons {
            element.add_child(acquired_on.element().clone());
        }
        Self {
            acquired_ons,
            values: values.map(str::to_string),
            base: Base::new(element, version),
        }
        .validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        if self.values.iter().all(String::is_empty) && self.acquired_ons.is_empty() {
            self.base.warn("A completely empty ddms:dates element was found.");
        }
        for acquired_on in self.acquired_ons.clone() {
            self.base.absorb(&*acquired_on);
        }
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let version = self.version();
        require_ddms_element(self.element(), version, "dates")?;
        for acquired_on in &self.acquired_ons {
            require_compatible(version, &**acquired_on)?;
        }
        for ((name, since), value) in DATE_ATTRIBUTES.iter().zip(self.values.iter()) {
            if value.is_empty() {
                continue;
            }
            validate_ddms_date(value)?;
            if !version.is_at_least(*since) {
                let article = if name.starts_with(['a', 'i']) { "an" } else { "a" };
                return Err(Error::invalid(format!(
                    "This component cannot have {} {} date until DDMS {} or later.",
                    article, name, since
                )));
            }
        }
        if !self.acquired_ons.is_empty() && !version.is_at_least(Version::V4_1) {
            return Err(Error::invalid(
                "This component cannot have an acquiredOn date until DDMS 4.1 or later.",
            ));
        }
        Ok(())
    }

    fn value(&self, name: &str) -> &str {
        DATE_ATTRIBUTES
            .iter()
            .position(|(n, _)| *n == name)
            .map(|i| self.values[i].as_str())
            .unwrap_or("")
    }

    /// Acquisition dates
    pub fn acquired_ons(&self) -> &[Arc<ApproximableDate>] {
        &self.acquired_ons
    }

    /// Creation date
    pub fn created(&self) -> &str {
        self.value("created")
    }

    /// Posting date
    pub fn posted(&self) -> &str {
        self.value("posted")
    }

    /// Expiration date
    pub fn valid_til(&self) -> &str {
        self.value("validTil")
    }

    /// Information cut-off date
    pub fn info_cut_off(&self) -> &str {
        self.value("infoCutOff")
    }

    /// Approval date
    pub fn approved_on(&self) -> &str {
        self.value("approvedOn")
    }

    /// Receipt date
    pub fn received_on(&self) -> &str {
        self.value("receivedOn")
    }
}

impl Component for Dates {
    fn base(&self) -> &Base {
        &self.base
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let prefix = format!("{}.", output::build_prefix(prefix, self.name(), suffix));
        let mut text = output::components(html, &prefix, &self.acquired_ons);
        for ((name, _), value) in DATE_ATTRIBUTES.iter().zip(self.values.iter()) {
            text.push_str(&output::line(html, &format!("{}{}", prefix, name), value));
        }
        text
    }
}

/// Staging form of [`Dates`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatesBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Acquisition dates
    pub acquired_ons: BuilderList<ApproximableDateBuilder>,
    /// created
    pub created: String,
    /// posted
    pub posted: String,
    /// validTil
    pub valid_til: String,
    /// infoCutOff
    pub info_cut_off: String,
    /// approvedOn
    pub approved_on: String,
    /// receivedOn
    pub received_on: String,
}

impl DatesBuilder {
    fn values(&self) -> [&str; 6] {
        [
            &self.created,
            &self.posted,
            &self.valid_til,
            &self.info_cut_off,
            &self.approved_on,
            &self.received_on,
        ]
        .map(String::as_str)
    }
}

impl Builder for DatesBuilder {
    type Target = Dates;

    fn is_empty(&self) -> bool {
        self.acquired_ons.is_empty() && self.values().iter().all(|v| v.trim().is_empty())
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<Dates> {
        Dates::new(version, self.acquired_ons.commit_all(version)?, self.values())
    }
}

impl From<&Dates> for DatesBuilder {
    fn from(dates: &Dates) -> Self {
        Self {
            version: Some(dates.version()),
            acquired_ons: dates
                .acquired_ons
                .iter()
                .map(|d| ApproximableDateBuilder::from(&**d))
                .collect::<Vec<_>>()
                .into(),
            created: dates.created().to_string(),
            posted: dates.posted().to_string(),
            valid_til: dates.valid_til().to_string(),
            info_cut_off: dates.info_cut_off().to_string(),
            approved_on: dates.approved_on().to_string(),
            received_on: dates.received_on().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::parse_element;
    use pretty_assertions::assert_eq;

    fn acquired_on() -> ApproximableDate {
        ApproximableDate::new(Version::V4_1, "acquiredOn", "Season", "2012", "circa", "2011-12", "2012-02").unwrap()
    }

    #[test]
    fn test_approximable_output() {
        assert_eq!(
            acquired_on().to_text(),
            "acquiredOn.description: Season\nacquiredOn.approximableDate: 2012\nacquiredOn.approximableDate.approximation: circa\nacquiredOn.searchableDate.start: 2011-12\nacquiredOn.searchableDate.end: 2012-02\n"
        );
    }

    #[test]
    fn test_approximable_requires_4_1() {
        let err = ApproximableDate::new(Version::V4_0_1, "acquiredOn", "", "2012", "", "", "").unwrap_err();
        assert_eq!(
            err.message(),
            Some("The ddms:acquiredOn element cannot be used until DDMS 4.1 or later.")
        );
        assert_eq!(err.locator(), Some("/ddms:acquiredOn"));
    }

    #[test]
    fn test_approximable_window_order() {
        let err = ApproximableDate::new(Version::V4_1, "acquiredOn", "", "", "", "2013", "2012").unwrap_err();
        assert_eq!(err.message(), Some("The start date is after the end date."));
        assert!(ApproximableDate::new(Version::V4_1, "acquiredOn", "", "2012", "sometime", "", "").is_err());
    }

    #[test]
    fn test_approximable_round_trip() {
        let date = acquired_on();
        let parsed = ApproximableDate::from_element(parse_element(&date.to_xml()).unwrap(), Version::V4_1).unwrap();
        assert_eq!(parsed, date);
    }

    #[test]
    fn test_dates_version_gates() {
        let err = Dates::new(Version::V3_0, vec![], ["", "", "", "", "2003-02-15", ""]).unwrap_err();
        assert_eq!(
            err.message(),
            Some("This component cannot have an approvedOn date until DDMS 3.1 or later.")
        );
        let err = Dates::new(Version::V3_1, vec![], ["", "", "", "", "", "2003-02-15"]).unwrap_err();
        assert_eq!(
            err.message(),
            Some("This component cannot have a receivedOn date until DDMS 4.0.1 or later.")
        );
    }

    #[test]
    fn test_dates_output_puts_acquired_first() {
        let dates = Dates::new(
            Version::V4_1,
            vec![Arc::new(acquired_on())],
            ["2003", "", "", "", "", ""],
        )
        .unwrap();
        let text = dates.to_text();
        assert!(text.starts_with("dates.acquiredOn.description: Season\n"));
        assert!(text.ends_with("dates.created: 2003\n"));
    }

    #[test]
    fn test_empty_dates_warns() {
        let dates = Dates::new(Version::V5_0, vec![], [""; 6]).unwrap();
        assert_eq!(dates.warnings()[0].text, "A completely empty ddms:dates element was found.");
    }

    #[test]
    fn test_builder_uses_parent_version() {
        let mut builder = DatesBuilder {
            version: Some(Version::V4_1),
            ..DatesBuilder::default()
        };
        builder.acquired_ons.ensure_len(1);
        builder.acquired_ons.get_mut(0).unwrap().approximable_date = "2012".to_string();
        let dates = builder.commit().unwrap().unwrap();
        assert_eq!(dates.acquired_ons()[0].version(), Version::V4_1);
    }
}
