//! XML name validation
//!
//! NCName and NMTOKEN checks used for `gml:id`, SRS axis labels and NTK
//! system names.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static NCNAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}\u{F8}-\u{2FF}\u{370}-\u{37D}\u{37F}-\u{1FFF}][A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}\u{F8}-\u{2FF}\u{370}-\u{37D}\u{37F}-\u{1FFF}\-\.0-9\u{B7}\u{300}-\u{36F}]*$")
        .expect("NCName pattern is valid")
});

static NMTOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z_a-z:\u{C0}-\u{D6}\u{D8}-\u{F6}\u{F8}-\u{2FF}\u{370}-\u{37D}\u{37F}-\u{1FFF}\-\.0-9\u{B7}\u{300}-\u{36F}]+$")
        .expect("NMTOKEN pattern is valid")
});

/// Check if a string is a valid NCName (non-colonized name)
pub fn is_valid_ncname(name: &str) -> bool {
    NCNAME.is_match(name)
}

/// Validate an NCName, failing with a component validation error
pub fn validate_ncname(name: &str) -> Result<()> {
    if is_valid_ncname(name) {
        Ok(())
    } else {
        Err(Error::invalid(format!("\"{}\" is not a valid NCName.", name)))
    }
}

/// Validate every entry of a space-delimited NCName list
pub fn validate_ncname_list(names: &str) -> Result<()> {
    names.split_whitespace().try_for_each(validate_ncname)
}

/// Validate an NMTOKEN
pub fn validate_nmtoken(token: &str) -> Result<()> {
    if NMTOKEN.is_match(token) {
        Ok(())
    } else {
        Err(Error::invalid(format!("\"{}\" is not a valid NMTOKEN.", token)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_ncname() {
        assert!(is_valid_ncname("IDPolygon"));
        assert!(is_valid_ncname("my-element"));
        assert!(is_valid_ncname("_x.1"));

        assert!(!is_valid_ncname(""));
        assert!(!is_valid_ncname("1TEST"));
        assert!(!is_valid_ncname("prefix:element"));
        assert!(!is_valid_ncname("has space"));
    }

    #[test]
    fn test_validate_ncname_message() {
        let err = validate_ncname("1TEST").unwrap_err();
        assert_eq!(err.message(), Some("\"1TEST\" is not a valid NCName."));
        assert!(validate_ncname_list("X Y Z").is_ok());
        assert!(validate_ncname_list("X 1Y").is_err());
    }

    #[test]
    fn test_validate_nmtoken() {
        assert!(validate_nmtoken("MDR").is_ok());
        assert!(validate_nmtoken("1.2:x").is_ok());
        let err = validate_nmtoken("two words").unwrap_err();
        assert_eq!(err.message(), Some("\"two words\" is not a valid NMTOKEN."));
        assert!(validate_nmtoken("").is_err());
    }
}
