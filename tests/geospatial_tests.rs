//! Property tests for coordinate validation
//!
//! Bounds and positions accept exactly the closed latitude and longitude
//! ranges and keep their values through XML.

use ddms::attributes::SrsAttributes;
use ddms::documents::parse_element;
use ddms::summary::{BoundingBox, Position};
use ddms::{Component, Version};
use proptest::prelude::*;

fn srs() -> SrsAttributes {
    SrsAttributes::new("", None, &[], &[]).unwrap()
}

fn any_version() -> impl Strategy<Value = Version> {
    prop::sample::select(Version::ALL.to_vec())
}

proptest! {
    #[test]
    fn bounding_box_accepts_valid_ranges(
        version in any_version(),
        west in -180.0f64..=180.0,
        east in -180.0f64..=180.0,
        south in -90.0f64..=90.0,
        north in -90.0f64..=90.0,
    ) {
        let built = BoundingBox::new(version, west, east, south, north).unwrap();
        let parsed = BoundingBox::from_element(parse_element(&built.to_xml()).unwrap(), version).unwrap();
        prop_assert_eq!(parsed.west_bl(), Some(west));
        prop_assert_eq!(parsed.east_bl(), Some(east));
        prop_assert_eq!(parsed.south_bl(), Some(south));
        prop_assert_eq!(parsed.north_bl(), Some(north));
    }

    #[test]
    fn bounding_box_rejects_wide_longitudes(
        west in prop_oneof![-1.0e6f64..-180.0001, 180.0001f64..1.0e6],
    ) {
        let err = BoundingBox::new(Version::V5_0, west, 0.0, 0.0, 0.0).unwrap_err();
        prop_assert!(err.message().unwrap().starts_with("A longitude value must be between -180 and 180 degrees"));
        prop_assert_eq!(err.locator(), Some("/ddms:boundingBox"));
    }

    #[test]
    fn position_rejects_wide_latitudes(
        latitude in prop_oneof![-1.0e6f64..-90.0001, 90.0001f64..1.0e6],
        longitude in -180.0f64..=180.0,
    ) {
        let err = Position::new(Version::V5_0, &[latitude, longitude], srs()).unwrap_err();
        prop_assert!(err.message().unwrap().starts_with("A latitude value must be between -90 and 90 degrees"));
    }

    #[test]
    fn position_keeps_coordinates(
        latitude in -90.0f64..=90.0,
        longitude in -180.0f64..=180.0,
        height in prop::option::of(-1.0e4f64..1.0e4),
    ) {
        let mut coordinates = vec![latitude, longitude];
        coordinates.extend(height);
        let built = Position::new(Version::V4_1, &coordinates, srs()).unwrap();
        let parsed = Position::from_element(parse_element(&built.to_xml()).unwrap(), Version::V4_1).unwrap();
        prop_assert_eq!(parsed.coordinates(), coordinates.as_slice());
    }
}

#[test]
fn test_position_needs_two_or_three_coordinates() {
    let err = Position::new(Version::V5_0, &[1.0], srs()).unwrap_err();
    assert_eq!(err.message(), Some("A position must be represented by either 2 or 3 coordinates."));
    assert!(Position::new(Version::V5_0, &[1.0, 2.0, 3.0, 4.0], srs()).is_err());
}
