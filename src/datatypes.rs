//! XML Schema datatype helpers
//!
//! Lexical checks for the handful of built-in types DDMS relies on (the date
//! union, xs:date, xs:boolean, xs:anyURI, xs:double), plus the conversions
//! used when comparing dates and printing numbers.

use crate::error::{Error, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static DATE_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(-?\d{4,})-(\d{2})-(\d{2})T(\d{2}):(\d{2})(?::(\d{2})(\.\d+)?)?(Z|[+-]\d{2}:\d{2})?$").unwrap()
});
static DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-?\d{4,})-(\d{2})-(\d{2})(Z|[+-]\d{2}:\d{2})?$").unwrap());
static GYEAR_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-?\d{4,})-(\d{2})(Z|[+-]\d{2}:\d{2})?$").unwrap());
static GYEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(-?\d{4,})(Z|[+-]\d{2}:\d{2})?$").unwrap());

/// The lexical forms a DDMS date may take
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateKind {
    /// xs:dateTime
    DateTime,
    /// xs:date
    Date,
    /// xs:gYearMonth
    GYearMonth,
    /// xs:gYear
    GYear,
}

impl DateKind {
    /// Get the kind as its schema type name
    pub fn as_str(&self) -> &'static str {
        match self {
            DateKind::DateTime => "xs:dateTime",
            DateKind::Date => "xs:date",
            DateKind::GYearMonth => "xs:gYearMonth",
            DateKind::GYear => "xs:gYear",
        }
    }
}

impl fmt::Display for DateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify a date string, returning None when it is not a DDMS date
pub fn date_kind(value: &str) -> Option<DateKind> {
    let value = value.trim();
    let kind = if DATE_TIME.is_match(value) {
        Some(DateKind::DateTime)
    } else if DATE.is_match(value) {
        Some(DateKind::Date)
    } else if GYEAR_MONTH.is_match(value) {
        Some(DateKind::GYearMonth)
    } else if GYEAR.is_match(value) {
        Some(DateKind::GYear)
    } else {
        None
    };
    kind.filter(|_| earliest_instant(value).is_some())
}

/// Require a value in the DDMS date union
pub fn validate_ddms_date(value: &str) -> Result<DateKind> {
    date_kind(value).ok_or_else(|| {
        Error::invalid(format!(
            "The date datatype must be one of xs:dateTime, xs:date, xs:gYearMonth, or xs:gYear: {}",
            value
        ))
    })
}

/// True if the value is an xs:date
pub fn is_xs_date(value: &str) -> bool {
    date_kind(value) == Some(DateKind::Date)
}

fn capture_u32(caps: &regex::Captures<'_>, index: usize, default: u32) -> Option<u32> {
    match caps.get(index) {
        Some(m) => m.as_str().parse().ok(),
        None => Some(default),
    }
}

fn zone_offset(zone: &str) -> Option<FixedOffset> {
    if zone == "Z" {
        return FixedOffset::east_opt(0);
    }
    let sign = if zone.starts_with('-') { -1 } else { 1 };
    let (hours, minutes) = zone.get(1..)?.split_once(':')?;
    let seconds = hours.parse::<i32>().ok()? * 3600 + minutes.parse::<i32>().ok()? * 60;
    FixedOffset::east_opt(sign * seconds)
}

/// The earliest instant a date value denotes, in UTC when a zone is given.
///
/// `2005` is 2005-01-01T00:00:00 and `2005-06` is 2005-06-01T00:00:00.
/// Values without a zone are compared as if they were UTC.
pub fn earliest_instant(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    let (caps, zone_group) = if let Some(caps) = DATE_TIME.captures(value) {
        (caps, 8)
    } else if let Some(caps) = DATE.captures(value) {
        (caps, 4)
    } else if let Some(caps) = GYEAR_MONTH.captures(value) {
        (caps, 3)
    } else if let Some(caps) = GYEAR.captures(value) {
        (caps, 2)
    } else {
        return None;
    };
    let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
    let (month, day, hour, minute, second) = match zone_group {
        8 => (
            capture_u32(&caps, 2, 1)?,
            capture_u32(&caps, 3, 1)?,
            capture_u32(&caps, 4, 0)?,
            capture_u32(&caps, 5, 0)?,
            capture_u32(&caps, 6, 0)?,
        ),
        4 => (capture_u32(&caps, 2, 1)?, capture_u32(&caps, 3, 1)?, 0, 0, 0),
        3 => (capture_u32(&caps, 2, 1)?, 1, 0, 0, 0),
        _ => (1, 1, 0, 0, 0),
    };
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_opt(hour, minute, second)?;
    let local = NaiveDateTime::new(date, time);
    match caps.get(zone_group) {
        Some(zone) => {
            let offset = zone_offset(zone.as_str())?;
            let instant: DateTime<FixedOffset> = offset.from_local_datetime(&local).single()?;
            Some(instant.naive_utc())
        }
        None => Some(local),
    }
}

/// True if `start` denotes an instant after `end`. Unparseable values never compare.
pub fn is_after(start: &str, end: &str) -> bool {
    match (earliest_instant(start), earliest_instant(end)) {
        (Some(s), Some(e)) => s > e,
        _ => false,
    }
}

/// Parse an xs:boolean
pub fn parse_boolean(value: &str) -> Option<bool> {
    match value.trim() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Parse an xs:double
pub fn parse_double(value: &str) -> Option<f64> {
    let value = value.trim();
    match value {
        "INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        _ => value.parse::<f64>().ok(),
    }
}

/// Print a double the way the rendered output expects: integral values keep
/// one decimal place (`10.0`), everything else uses the shortest form.
pub fn format_double(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Require a syntactically valid URI reference
pub fn validate_uri(value: &str) -> Result<()> {
    let illegal = value
        .chars()
        .find(|c| c.is_whitespace() || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '\\' | '^' | '`'));
    if let Some(c) = illegal {
        return Err(Error::invalid(format!(
            "Invalid URI (Illegal character '{}'): {}",
            c, value
        )));
    }
    match url::Url::parse(value) {
        Ok(_) | Err(url::ParseError::RelativeUrlWithoutBase) => Ok(()),
        Err(e) => Err(Error::invalid(format!("Invalid URI ({}): {}", e, value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_kinds() {
        assert_eq!(date_kind("2003-02-15T12:30:00Z"), Some(DateKind::DateTime));
        assert_eq!(date_kind("2003-02-15"), Some(DateKind::Date));
        assert_eq!(date_kind("2003-02"), Some(DateKind::GYearMonth));
        assert_eq!(date_kind("2003"), Some(DateKind::GYear));
        assert_eq!(date_kind("2003-13-01"), None);
        assert_eq!(date_kind("Not Applicable"), None);
    }

    #[test]
    fn test_validate_ddms_date_message() {
        let err = validate_ddms_date("baboon").unwrap_err();
        assert!(err.message().unwrap().starts_with("The date datatype must be one of"));
    }

    #[test]
    fn test_is_after() {
        assert!(is_after("2005", "2004-12-31"));
        assert!(!is_after("2004-06", "2004-06-30"));
        assert!(!is_after("2004-06-01", "Unknown"));
    }

    #[test]
    fn test_is_after_normalizes_zones() {
        assert!(!is_after("2010-01-01T12:00:00Z", "2010-01-01T10:00:00-05:00"));
        assert!(is_after("2010-01-01T16:00:00Z", "2010-01-01T10:00:00-05:00"));
        assert!(is_after("2010-01-02+00:00", "2010-01-02+10:00"));
        assert_eq!(
            earliest_instant("2010-01-01T10:00:00-05:00").map(|t| t.to_string()),
            Some("2010-01-01 15:00:00".to_string())
        );
    }

    #[test]
    fn test_format_double() {
        assert_eq!(format_double(10.0), "10.0");
        assert_eq!(format_double(-180.0), "-180.0");
        assert_eq!(format_double(32.1), "32.1");
    }

    #[test]
    fn test_parse_boolean() {
        assert_eq!(parse_boolean("true"), Some(true));
        assert_eq!(parse_boolean("0"), Some(false));
        assert_eq!(parse_boolean("yes"), None);
    }

    #[test]
    fn test_validate_uri() {
        assert!(validate_uri("http://metadata.dod.mil/mdr/ns/DDMS/3.0/").is_ok());
        assert!(validate_uri("URI").is_ok());
        assert!(validate_uri("http://www.example.com/a b").is_err());
    }
}
