//! Geospatial coverage and its extents

use super::geographic::{CountryCode, CountryCodeBuilder, GeographicIdentifier, GeographicIdentifierBuilder};
use super::gml::{require_latitude, require_longitude, BoundingGeometry, BoundingGeometryBuilder};
use crate::attributes::{SecurityAttributes, SecurityAttributesBuilder};
use crate::components::helpers::{
    add_wrapped, content_element, ddms_element, ddms_text_element, locate_in_wrapper, own_attribute,
    require_child_count, require_compatible, require_ddms_element, require_value, set_ddms_attribute,
};
use crate::components::{output, Base, Builder, Component};
use crate::datatypes::{format_double, parse_double};
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::versions::Version;
use std::sync::Arc;

const GEOSPATIAL_EXTENT: &str = "GeospatialExtent";

/// Legal `ddms:precedence` values
pub const PRECEDENCE_VALUES: [&str; 2] = ["Primary", "Secondary"];

/// Legal units of measure on a vertical extent
pub const LENGTH_MEASURE_TYPES: [&str; 7] =
    ["Meter", "Kilometer", "Foot", "StatuteMile", "NauticalMile", "Fathom", "Inch"];

/// Legal vertical datums
pub const VERTICAL_DATUM_TYPES: [&str; 3] = ["MSL", "AGL", "HAE"];

/// The element name before 4.0.1 capitalized the first letter
fn versioned_name(version: Version, lower: &str) -> String {
    if version.is_at_least(Version::V4_0_1) {
        lower.to_string()
    } else {
        let mut chars = lower.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

fn child_double(element: &Element, local_name: &str) -> Result<Option<f64>> {
    let namespace = element.namespace().unwrap_or("");
    match element.first_child(namespace, local_name) {
        None => Ok(None),
        Some(child) if child.text().trim().is_empty() => Ok(None),
        Some(child) => parse_double(child.text())
            .map(Some)
            .ok_or_else(|| Error::invalid(format!("The {} value is not a valid double.", local_name))),
    }
}

/// A bounding box in degrees
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    base: Base,
    west_bl: Option<f64>,
    east_bl: Option<f64>,
    south_bl: Option<f64>,
    north_bl: Option<f64>,
}

const BOUNDS: [&str; 4] = ["westBL", "eastBL", "southBL", "northBL"];

impl BoundingBox {
    /// Parse a `ddms:boundingBox` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let mut values = [None; 4];
        for (slot, bound) in values.iter_mut().zip(BOUNDS) {
            *slot = child_double(&element, &versioned_name(version, bound)).map_err(|e| e.locate(&qname))?;
        }
        let [west_bl, east_bl, south_bl, north_bl] = values;
        Self {
            west_bl,
            east_bl,
            south_bl,
            north_bl,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from the four bounds
    pub fn new(version: Version, west_bl: f64, east_bl: f64, south_bl: f64, north_bl: f64) -> Result<Self> {
        let mut element = ddms_element(version, "boundingBox");
        for (bound, value) in BOUNDS.iter().zip([west_bl, east_bl, south_bl, north_bl]) {
            element.add_child(ddms_text_element(version, &versioned_name(version, bound), &format_double(value)));
        }
        Self {
            west_bl: Some(west_bl),
            east_bl: Some(east_bl),
            south_bl: Some(south_bl),
            north_bl: Some(north_bl),
            base: Base::new(element, version),
        }
        .validated()
    }

    fn validated(self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        require_ddms_element(self.element(), self.version(), "boundingBox")?;
        let west = self.west_bl.ok_or_else(|| Error::invalid("westbound longitude is required."))?;
        let east = self.east_bl.ok_or_else(|| Error::invalid("eastbound longitude is required."))?;
        let south = self.south_bl.ok_or_else(|| Error::invalid("southbound latitude is required."))?;
        let north = self.north_bl.ok_or_else(|| Error::invalid("northbound latitude is required."))?;
        require_longitude(west)?;
        require_longitude(east)?;
        require_latitude(south)?;
        require_latitude(north)
    }

    /// Westbound longitude
    pub fn west_bl(&self) -> Option<f64> {
        self.west_bl
    }

    /// Eastbound longitude
    pub fn east_bl(&self) -> Option<f64> {
        self.east_bl
    }

    /// Southbound latitude
    pub fn south_bl(&self) -> Option<f64> {
        self.south_bl
    }

    /// Northbound latitude
    pub fn north_bl(&self) -> Option<f64> {
        self.north_bl
    }
}

impl Component for BoundingBox {
    fn base(&self) -> &Base {
        &self.base
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let prefix = format!("{}.", output::build_prefix(prefix, self.name(), suffix));
        BOUNDS
            .iter()
            .zip([self.west_bl, self.east_bl, self.south_bl, self.north_bl])
            .map(|(bound, value)| {
                let value = value.map(format_double).unwrap_or_default();
                output::line(html, &format!("{}{}", prefix, bound), &value)
            })
            .collect()
    }
}

/// Staging form of [`BoundingBox`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundingBoxBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Westbound longitude
    pub west_bl: Option<f64>,
    /// Eastbound longitude
    pub east_bl: Option<f64>,
    /// Southbound latitude
    pub south_bl: Option<f64>,
    /// Northbound latitude
    pub north_bl: Option<f64>,
}

impl Builder for BoundingBoxBuilder {
    type Target = BoundingBox;

    fn is_empty(&self) -> bool {
        self.west_bl.is_none() && self.east_bl.is_none() && self.south_bl.is_none() && self.north_bl.is_none()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<BoundingBox> {
        let mut element = ddms_element(version, "boundingBox");
        for (bound, value) in BOUNDS.iter().zip([self.west_bl, self.east_bl, self.south_bl, self.north_bl]) {
            if let Some(value) = value {
                element.add_child(ddms_text_element(version, &versioned_name(version, bound), &format_double(value)));
            }
        }
        BoundingBox::from_element(element, version)
    }
}

impl From<&BoundingBox> for BoundingBoxBuilder {
    fn from(bounding_box: &BoundingBox) -> Self {
        Self {
            version: Some(bounding_box.version()),
            west_bl: bounding_box.west_bl,
            east_bl: bounding_box.east_bl,
            south_bl: bounding_box.south_bl,
            north_bl: bounding_box.north_bl,
        }
    }
}

/// A postal address
#[derive(Debug, Clone, PartialEq)]
pub struct PostalAddress {
    base: Base,
    streets: Vec<String>,
    city: String,
    state: String,
    province: String,
    postal_code: String,
    country_code: Option<Arc<CountryCode>>,
}

impl PostalAddress {
    /// Parse a `ddms:postalAddress` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let namespace = element.namespace().unwrap_or("").to_string();
        let text = |local: &str| {
            element
                .first_child(&namespace, local)
                .map(|c| c.text().to_string())
                .unwrap_or_default()
        };
        let country_code = element
            .first_child(&namespace, "countryCode")
            .map(|c| CountryCode::from_element(c.clone(), version).map(Arc::new))
            .transpose()
            .map_err(|e| e.locate(&qname))?;
        Self {
            streets: element.child_values(&namespace, "street"),
            city: text("city"),
            state: text("state"),
            province: text("province"),
            postal_code: text("postalCode"),
            country_code,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from address parts. At most one of `state` and `province` may be set.
    pub fn new(
        version: Version,
        streets: Vec<String>,
        city: &str,
        state: &str,
        province: &str,
        postal_code: &str,
        country_code: Option<Arc<CountryCode>>,
    ) -> Result<Self> {
        let mut element = ddms_element(version, "postalAddress");
        for street in &streets {
            element.add_child(ddms_text_element(version, "street", street));
        }
        for (local, value) in [("city", city), ("state", state), ("province", province), ("postalCode", postal_code)] {
            if !value.is_empty() {
                element.add_child(ddms_text_element(version, local, value));
            }
        }
        if let Some(code) = &country_code {
            element.add_child(code.element().clone());
        }
        Self {
            streets,
            city: city.to_string(),
            state: state.to_string(),
            province: province.to_string(),
            postal_code: postal_code.to_string(),
            country_code,
            base: Base::new(element, version),
        }
        .validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        if self.streets.is_empty()
            && self.city.is_empty()
            && self.state.is_empty()
            && self.province.is_empty()
            && self.postal_code.is_empty()
            && self.country_code.is_none()
        {
            self.base.warn("A completely empty ddms:postalAddress element was found.");
        }
        if let Some(code) = self.country_code.clone() {
            self.base.absorb(&*code);
        }
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let element = self.element();
        require_ddms_element(element, self.version(), "postalAddress")?;
        if !self.state.is_empty() && !self.province.is_empty() {
            return Err(Error::invalid("Only 1 of state or province can be used."));
        }
        require_child_count(element, "street", 0, 6)?;
        for local in ["city", "state", "province", "postalCode", "countryCode"] {
            require_child_count(element, local, 0, 1)?;
        }
        if let Some(code) = &self.country_code {
            require_compatible(self.version(), &**code)?;
        }
        Ok(())
    }

    /// Street lines
    pub fn streets(&self) -> &[String] {
        &self.streets
    }

    /// City
    pub fn city(&self) -> &str {
        &self.city
    }

    /// State
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Province
    pub fn province(&self) -> &str {
        &self.province
    }

    /// Postal code
    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }

    /// Country code
    pub fn country_code(&self) -> Option<&Arc<CountryCode>> {
        self.country_code.as_ref()
    }
}

impl Component for PostalAddress {
    fn base(&self) -> &Base {
        &self.base
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let prefix = format!("{}.", output::build_prefix(prefix, self.name(), suffix));
        let mut text = output::lines(html, &format!("{}street", prefix), &self.streets);
        text.push_str(&output::line(html, &format!("{}city", prefix), &self.city));
        text.push_str(&output::line(html, &format!("{}state", prefix), &self.state));
        text.push_str(&output::line(html, &format!("{}province", prefix), &self.province));
        text.push_str(&output::line(html, &format!("{}postalCode", prefix), &self.postal_code));
        text.push_str(&output::optional(html, &prefix, self.country_code.as_ref()));
        text
    }
}

/// Staging form of [`PostalAddress`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostalAddressBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Street lines
    pub streets: Vec<String>,
    /// City
    pub city: String,
    /// State
    pub state: String,
    /// Province
    pub province: String,
    /// Postal code
    pub postal_code: String,
    /// Country code
    pub country_code: CountryCodeBuilder,
}

impl Builder for PostalAddressBuilder {
    type Target = PostalAddress;

    fn is_empty(&self) -> bool {
        self.streets.iter().all(|s| s.trim().is_empty())
            && [&self.city, &self.state, &self.province, &self.postal_code]
                .iter()
                .all(|v| v.trim().is_empty())
            && self.country_code.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<PostalAddress> {
        PostalAddress::new(
            version,
            self.streets.iter().filter(|s| !s.trim().is_empty()).cloned().collect(),
            &self.city,
            &self.state,
            &self.province,
            &self.postal_code,
            self.country_code.commit_as(version)?.map(Arc::new),
        )
    }
}

impl From<&PostalAddress> for PostalAddressBuilder {
    fn from(address: &PostalAddress) -> Self {
        Self {
            version: Some(address.version()),
            streets: address.streets.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            province: address.province.clone(),
            postal_code: address.postal_code.clone(),
            country_code: address.country_code.as_deref().map(CountryCodeBuilder::from).unwrap_or_default(),
        }
    }
}

/// A vertical span with its unit and datum
#[derive(Debug, Clone, PartialEq)]
pub struct VerticalExtent {
    base: Base,
    min_vertical_extent: Option<f64>,
    max_vertical_extent: Option<f64>,
    unit_of_measure: String,
    datum: String,
}

impl VerticalExtent {
    /// Parse a `ddms:verticalExtent` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let min_vertical_extent = child_double(&element, &versioned_name(version, "minVerticalExtent"))
            .map_err(|e| e.locate(&qname))?;
        let max_vertical_extent = child_double(&element, &versioned_name(version, "maxVerticalExtent"))
            .map_err(|e| e.locate(&qname))?;
        Self {
            min_vertical_extent,
            max_vertical_extent,
            unit_of_measure: own_attribute(&element, "unitOfMeasure").to_string(),
            datum: own_attribute(&element, "datum").to_string(),
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from the bounds, a unit of measure and a datum
    pub fn new(version: Version, min: f64, max: f64, unit_of_measure: &str, datum: &str) -> Result<Self> {
        let mut element = ddms_element(version, "verticalExtent");
        set_ddms_attribute(&mut element, version, "unitOfMeasure", unit_of_measure);
        set_ddms_attribute(&mut element, version, "datum", datum);
        for (local, value) in [("minVerticalExtent", min), ("maxVerticalExtent", max)] {
            element.add_child(ddms_text_element(version, &versioned_name(version, local), &format_double(value)));
        }
        Self {
            min_vertical_extent: Some(min),
            max_vertical_extent: Some(max),
            unit_of_measure: unit_of_measure.to_string(),
            datum: datum.to_string(),
            base: Base::new(element, version),
        }
        .validated()
    }

    fn validated(self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let version = self.version();
        require_ddms_element(self.element(), version, "verticalExtent")?;
        let min = self
            .min_vertical_extent
            .ok_or_else(|| Error::invalid("minVerticalExtent is required."))?;
        let max = self
            .max_vertical_extent
            .ok_or_else(|| Error::invalid("maxVerticalExtent is required."))?;
        require_value("unitOfMeasure", &self.unit_of_measure)?;
        require_value("datum", &self.datum)?;
        if !LENGTH_MEASURE_TYPES.contains(&self.unit_of_measure.as_str()) {
            return Err(Error::invalid(format!(
                "The length measure type must be one of {}",
                LENGTH_MEASURE_TYPES.join(", ")
            )));
        }
        if !VERTICAL_DATUM_TYPES.contains(&self.datum.as_str()) {
            return Err(Error::invalid(format!(
                "The vertical datum type must be one of {}",
                VERTICAL_DATUM_TYPES.join(", ")
            )));
        }
        let namespace = self.namespace();
        for local in ["minVerticalExtent", "maxVerticalExtent"] {
            if let Some(extent) = self.element().first_child(namespace, &versioned_name(version, local)) {
                self.validate_inherited(extent)?;
            }
        }
        if max < min {
            return Err(Error::invalid("Minimum vertical extent must be less than maximum vertical extent."));
        }
        Ok(())
    }

    fn validate_inherited(&self, extent: &Element) -> Result<()> {
        for (attribute, expected) in [("unitOfMeasure", &self.unit_of_measure), ("datum", &self.datum)] {
            let value = own_attribute(extent, attribute);
            if !value.is_empty() && value != expected {
                return Err(Error::invalid(format!(
                    "The {} on the {} element must match the {} on the enclosing verticalExtent element.",
                    attribute,
                    extent.local_name(),
                    attribute
                )));
            }
        }
        Ok(())
    }

    /// Lower bound
    pub fn min_vertical_extent(&self) -> Option<f64> {
        self.min_vertical_extent
    }

    /// Upper bound
    pub fn max_vertical_extent(&self) -> Option<f64> {
        self.max_vertical_extent
    }

    /// Unit of measure
    pub fn unit_of_measure(&self) -> &str {
        &self.unit_of_measure
    }

    /// Vertical datum
    pub fn datum(&self) -> &str {
        &self.datum
    }
}

impl Component for VerticalExtent {
    fn base(&self) -> &Base {
        &self.base
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let prefix = format!("{}.", output::build_prefix(prefix, self.name(), suffix));
        let min = self.min_vertical_extent.map(format_double).unwrap_or_default();
        let max = self.max_vertical_extent.map(format_double).unwrap_or_default();
        let mut text = output::line(html, &format!("{}unitOfMeasure", prefix), &self.unit_of_measure);
        text.push_str(&output::line(html, &format!("{}datum", prefix), &self.datum));
        text.push_str(&output::line(html, &format!("{}minimum", prefix), &min));
        text.push_str(&output::line(html, &format!("{}maximum", prefix), &max));
        text
    }
}

/// Staging form of [`VerticalExtent`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerticalExtentBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Lower bound
    pub min_vertical_extent: Option<f64>,
    /// Upper bound
    pub max_vertical_extent: Option<f64>,
    /// Unit of measure
    pub unit_of_measure: String,
    /// Vertical datum
    pub datum: String,
}

impl Builder for VerticalExtentBuilder {
    type Target = VerticalExtent;

    fn is_empty(&self) -> bool {
        self.min_vertical_extent.is_none()
            && self.max_vertical_extent.is_none()
            && self.unit_of_measure.trim().is_empty()
            && self.datum.trim().is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<VerticalExtent> {
        let mut element = ddms_element(version, "verticalExtent");
        set_ddms_attribute(&mut element, version, "unitOfMeasure", &self.unit_of_measure);
        set_ddms_attribute(&mut element, version, "datum", &self.datum);
        for (local, value) in [
            ("minVerticalExtent", self.min_vertical_extent),
            ("maxVerticalExtent", self.max_vertical_extent),
        ] {
            if let Some(value) = value {
                element.add_child(ddms_text_element(version, &versioned_name(version, local), &format_double(value)));
            }
        }
        VerticalExtent::from_element(element, version)
    }
}

impl From<&VerticalExtent> for VerticalExtentBuilder {
    fn from(extent: &VerticalExtent) -> Self {
        Self {
            version: Some(extent.version()),
            min_vertical_extent: extent.min_vertical_extent,
            max_vertical_extent: extent.max_vertical_extent,
            unit_of_measure: extent.unit_of_measure.clone(),
            datum: extent.datum.clone(),
        }
    }
}

/// The extents a geospatial coverage may hold, at most one of each
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeospatialExtents {
    /// Named places and codes
    pub geographic_identifier: Option<Arc<GeographicIdentifier>>,
    /// A bounding box
    pub bounding_box: Option<Arc<BoundingBox>>,
    /// GML geometry
    pub bounding_geometry: Option<Arc<BoundingGeometry>>,
    /// A postal address
    pub postal_address: Option<Arc<PostalAddress>>,
    /// A vertical extent
    pub vertical_extent: Option<Arc<VerticalExtent>>,
}

impl GeospatialExtents {
    fn children(&self) -> Vec<Arc<dyn Component>> {
        let mut children: Vec<Arc<dyn Component>> = Vec::new();
        if let Some(c) = &self.geographic_identifier {
            children.push(c.clone());
        }
        if let Some(c) = &self.bounding_box {
            children.push(c.clone());
        }
        if let Some(c) = &self.bounding_geometry {
            children.push(c.clone());
        }
        if let Some(c) = &self.postal_address {
            children.push(c.clone());
        }
        if let Some(c) = &self.vertical_extent {
            children.push(c.clone());
        }
        children
    }
}

fn parse_extent<T>(
    content: &Element,
    local_name: &str,
    parse: impl Fn(Element) -> Result<T>,
) -> Result<Option<Arc<T>>> {
    let namespace = content.namespace().unwrap_or("");
    content
        .first_child(namespace, local_name)
        .map(|child| {
            parse(child.clone())
                .map(Arc::new)
                .map_err(|e| locate_in_wrapper(e, content, GEOSPATIAL_EXTENT))
        })
        .transpose()
}

/// Where the resource applies on the ground
#[derive(Debug, Clone, PartialEq)]
pub struct GeospatialCoverage {
    base: Base,
    extents: GeospatialExtents,
    precedence: String,
    order: Option<i64>,
    security_attributes: SecurityAttributes,
}

impl GeospatialCoverage {
    /// Parse a `ddms:geospatialCoverage` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let extents = match content_element(&element, version, GEOSPATIAL_EXTENT) {
            Some(content) => PendingExtents {
                geographic_identifier: parse_extent(content, "geographicIdentifier", |e| {
                    GeographicIdentifier::from_element(e, version)
                }),
                bounding_box: parse_extent(content, "boundingBox", |e| BoundingBox::from_element(e, version)),
                bounding_geometry: parse_extent(content, "boundingGeometry", |e| {
                    BoundingGeometry::from_element(e, version)
                }),
                postal_address: parse_extent(content, "postalAddress", |e| PostalAddress::from_element(e, version)),
                vertical_extent: parse_extent(content, "verticalExtent", |e| {
                    VerticalExtent::from_element(e, version)
                }),
            }
            .transposed()
            .map_err(|e| e.locate(&qname))?,
            None => GeospatialExtents::default(),
        };
        let order_text = own_attribute(&element, "order");
        let order = if order_text.is_empty() {
            None
        } else {
            Some(
                order_text
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| Error::invalid("The order attribute must be an integer.").locate(&qname))?,
            )
        };
        let security_attributes =
            SecurityAttributes::from_element(&element, version).map_err(|e| e.locate(&qname))?;
        Self {
            extents,
            precedence: own_attribute(&element, "precedence").to_string(),
            order,
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from extents, precedence, order and security attributes
    pub fn new(
        version: Version,
        extents: GeospatialExtents,
        precedence: &str,
        order: Option<i64>,
        security_attributes: SecurityAttributes,
    ) -> Result<Self> {
        let mut element = ddms_element(version, "geospatialCoverage");
        let qname = element.qualified_name();
        let children = extents.children().iter().map(|c| c.element().clone()).collect();
        add_wrapped(&mut element, version, GEOSPATIAL_EXTENT, children);
        set_ddms_attribute(&mut element, version, "precedence", precedence);
        let order_text = order.map(|o| o.to_string()).unwrap_or_default();
        set_ddms_attribute(&mut element, version, "order", &order_text);
        security_attributes
            .add_to(&mut element, version)
            .map_err(|e| e.locate(&qname))?;
        Self {
            extents,
            precedence: precedence.to_string(),
            order,
            security_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        for child in self.extents.children() {
            self.base.absorb(&*child);
        }
        let attribute_warnings = self.security_attributes.warnings().to_vec();
        self.base.absorb_attributes(&attribute_warnings);
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let version = self.version();
        require_ddms_element(self.element(), version, "geospatialCoverage")?;
        let content = content_element(self.element(), version, GEOSPATIAL_EXTENT)
            .ok_or_else(|| Error::invalid(format!("{} element is required.", GEOSPATIAL_EXTENT)))?;
        for local in [
            "geographicIdentifier",
            "boundingBox",
            "boundingGeometry",
            "postalAddress",
            "verticalExtent",
        ] {
            require_child_count(content, local, 0, 1).map_err(|e| locate_in_wrapper(e, content, GEOSPATIAL_EXTENT))?;
        }
        let children = self.extents.children();
        if children.is_empty() {
            return Err(Error::invalid(
                "At least 1 of geographicIdentifier, boundingBox, boundingGeometry, postalAddress, or verticalExtent must be used.",
            ));
        }
        if self.has_facility_identifier() && children.len() > 1 {
            return Err(Error::invalid(
                "A geographicIdentifier containing a facilityIdentifier cannot be used in tandem with any other coverage elements.",
            ));
        }
        for child in &children {
            require_compatible(version, &**child)?;
        }
        if !version.is_at_least(Version::V4_0_1) {
            if !self.precedence.is_empty() {
                return Err(Error::invalid(
                    "The ddms:precedence attribute cannot be used until DDMS 4.0.1 or later.",
                ));
            }
            if self.order.is_some() {
                return Err(Error::invalid("The ddms:order attribute cannot be used until DDMS 4.0.1 or later."));
            }
        }
        if !version.is_at_least(Version::V3_0) && !self.security_attributes.is_empty() {
            return Err(Error::invalid(
                "Security attributes cannot be applied to this component until DDMS 3.0 or later.",
            ));
        }
        if !self.precedence.is_empty() {
            if !PRECEDENCE_VALUES.contains(&self.precedence.as_str()) {
                return Err(Error::invalid(format!(
                    "The ddms:precedence attribute must have a value from: [{}]",
                    PRECEDENCE_VALUES.join(", ")
                )));
            }
            let has_country_code = self
                .extents
                .geographic_identifier
                .as_ref()
                .map_or(false, |g| g.country_code().is_some());
            if !has_country_code {
                return Err(Error::invalid(
                    "The ddms:precedence attribute should only be applied to a geospatialCoverage containing a country code.",
                ));
            }
        }
        Ok(())
    }

    /// The extents
    pub fn extents(&self) -> &GeospatialExtents {
        &self.extents
    }

    /// The geographic identifier
    pub fn geographic_identifier(&self) -> Option<&Arc<GeographicIdentifier>> {
        self.extents.geographic_identifier.as_ref()
    }

    /// The bounding box
    pub fn bounding_box(&self) -> Option<&Arc<BoundingBox>> {
        self.extents.bounding_box.as_ref()
    }

    /// The bounding geometry
    pub fn bounding_geometry(&self) -> Option<&Arc<BoundingGeometry>> {
        self.extents.bounding_geometry.as_ref()
    }

    /// The postal address
    pub fn postal_address(&self) -> Option<&Arc<PostalAddress>> {
        self.extents.postal_address.as_ref()
    }

    /// The vertical extent
    pub fn vertical_extent(&self) -> Option<&Arc<VerticalExtent>> {
        self.extents.vertical_extent.as_ref()
    }

    /// `Primary` or `Secondary`, when set
    pub fn precedence(&self) -> &str {
        &self.precedence
    }

    /// Relative order among coverages
    pub fn order(&self) -> Option<i64> {
        self.order
    }

    /// True when the geographic identifier names a facility
    pub fn has_facility_identifier(&self) -> bool {
        self.extents
            .geographic_identifier
            .as_ref()
            .map_or(false, |g| g.has_facility_identifier())
    }
}

/// Parse results for each extent, before any failure is surfaced
struct PendingExtents {
    geographic_identifier: Result<Option<Arc<GeographicIdentifier>>>,
    bounding_box: Result<Option<Arc<BoundingBox>>>,
    bounding_geometry: Result<Option<Arc<BoundingGeometry>>>,
    postal_address: Result<Option<Arc<PostalAddress>>>,
    vertical_extent: Result<Option<Arc<VerticalExtent>>>,
}

impl PendingExtents {
    fn transposed(self) -> Result<GeospatialExtents> {
        Ok(GeospatialExtents {
            geographic_identifier: self.geographic_identifier?,
            bounding_box: self.bounding_box?,
            bounding_geometry: self.bounding_geometry?,
            postal_address: self.postal_address?,
            vertical_extent: self.vertical_extent?,
        })
    }
}

impl Component for GeospatialCoverage {
    fn base(&self) -> &Base {
        &self.base
    }

    fn security_attributes(&self) -> Option<&SecurityAttributes> {
        Some(&self.security_attributes)
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let mut prefix = format!("{}.", output::build_prefix(prefix, self.name(), suffix));
        if !self.version().is_at_least(Version::V4_0_1) {
            prefix.push_str(GEOSPATIAL_EXTENT);
            prefix.push('.');
        }
        let mut text: String = self
            .extents
            .children()
            .iter()
            .map(|c| c.output(html, &prefix, ""))
            .collect();
        text.push_str(&output::line(html, &format!("{}precedence", prefix), &self.precedence));
        let order = self.order.map(|o| o.to_string()).unwrap_or_default();
        text.push_str(&output::line(html, &format!("{}order", prefix), &order));
        text.push_str(&self.security_attributes.output(html, &prefix));
        text
    }
}

/// Staging form of [`GeospatialCoverage`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeospatialCoverageBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Geographic identifier
    pub geographic_identifier: GeographicIdentifierBuilder,
    /// Bounding box
    pub bounding_box: BoundingBoxBuilder,
    /// Bounding geometry
    pub bounding_geometry: BoundingGeometryBuilder,
    /// Postal address
    pub postal_address: PostalAddressBuilder,
    /// Vertical extent
    pub vertical_extent: VerticalExtentBuilder,
    /// Precedence
    pub precedence: String,
    /// Order
    pub order: Option<i64>,
    /// Security attributes
    pub security_attributes: SecurityAttributesBuilder,
}

impl Builder for GeospatialCoverageBuilder {
    type Target = GeospatialCoverage;

    fn is_empty(&self) -> bool {
        self.geographic_identifier.is_empty()
            && self.bounding_box.is_empty()
            && self.bounding_geometry.is_empty()
            && self.postal_address.is_empty()
            && self.vertical_extent.is_empty()
            && self.precedence.trim().is_empty()
            && self.order.is_none()
            && self.security_attributes.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<GeospatialCoverage> {
        let extents = GeospatialExtents {
            geographic_identifier: self.geographic_identifier.commit_as(version)?.map(Arc::new),
            bounding_box: self.bounding_box.commit_as(version)?.map(Arc::new),
            bounding_geometry: self.bounding_geometry.commit_as(version)?.map(Arc::new),
            postal_address: self.postal_address.commit_as(version)?.map(Arc::new),
            vertical_extent: self.vertical_extent.commit_as(version)?.map(Arc::new),
        };
        GeospatialCoverage::new(
            version,
            extents,
            &self.precedence,
            self.order,
            self.security_attributes.commit_as(version)?,
        )
    }
}

impl From<&GeospatialCoverage> for GeospatialCoverageBuilder {
    fn from(coverage: &GeospatialCoverage) -> Self {
        let extents = &coverage.extents;
        Self {
            version: Some(coverage.version()),
            geographic_identifier: extents
                .geographic_identifier
                .as_deref()
                .map(GeographicIdentifierBuilder::from)
                .unwrap_or_default(),
            bounding_box: extents.bounding_box.as_deref().map(BoundingBoxBuilder::from).unwrap_or_default(),
            bounding_geometry: extents
                .bounding_geometry
                .as_deref()
                .map(BoundingGeometryBuilder::from)
                .unwrap_or_default(),
            postal_address: extents
                .postal_address
                .as_deref()
                .map(PostalAddressBuilder::from)
                .unwrap_or_default(),
            vertical_extent: extents
                .vertical_extent
                .as_deref()
                .map(VerticalExtentBuilder::from)
                .unwrap_or_default(),
            precedence: coverage.precedence.clone(),
            order: coverage.order,
            security_attributes: SecurityAttributesBuilder::from(&coverage.security_attributes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::parse_element;
    use pretty_assertions::assert_eq;

    fn country_identifier(version: Version) -> Arc<GeographicIdentifier> {
        Arc::new(
            GeographicIdentifier::new(
                version,
                vec![],
                vec![],
                Some(Arc::new(CountryCode::new(version, "urn:us:gov:ic:cvenum:irm:coverage:iso3166:trigraph:v1", "LAO").unwrap())),
                None,
                None,
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_bounding_box_names_follow_version() {
        let old = BoundingBox::new(Version::V3_1, 1.1, 2.2, 3.3, 4.4).unwrap();
        assert!(old.to_xml().contains("<ddms:WestBL>1.1</ddms:WestBL>"));
        let new = BoundingBox::new(Version::V5_0, 1.1, 2.2, 3.3, 4.4).unwrap();
        assert!(new.to_xml().contains("<ddms:westBL>1.1</ddms:westBL>"));
        assert_eq!(
            new.to_text(),
            "boundingBox.westBL: 1.1\nboundingBox.eastBL: 2.2\nboundingBox.southBL: 3.3\nboundingBox.northBL: 4.4\n"
        );
        let parsed = BoundingBox::from_element(parse_element(&old.to_xml()).unwrap(), Version::V3_1).unwrap();
        assert_eq!(parsed, old);
    }

    #[test]
    fn test_bounding_box_ranges() {
        let err = BoundingBox::new(Version::V5_0, -181.0, 2.2, 3.3, 4.4).unwrap_err();
        assert_eq!(err.message(), Some("A longitude value must be between -180 and 180 degrees: -181.0"));
        let err = BoundingBoxBuilder {
            west_bl: Some(1.0),
            ..Default::default()
        }
        .commit_as(Version::V5_0)
        .unwrap_err();
        assert_eq!(err.message(), Some("eastbound longitude is required."));
    }

    #[test]
    fn test_postal_address_state_or_province() {
        let v = Version::V5_0;
        let err = PostalAddress::new(v, vec![], "Ashburn", "VA", "Ontario", "", None).unwrap_err();
        assert_eq!(err.message(), Some("Only 1 of state or province can be used."));
        let empty = PostalAddress::new(v, vec![], "", "", "", "", None).unwrap();
        assert_eq!(empty.warnings()[0].text, "A completely empty ddms:postalAddress element was found.");
    }

    #[test]
    fn test_vertical_extent_rules() {
        let v = Version::V5_0;
        let extent = VerticalExtent::new(v, 0.0, 100.0, "Meter", "AGL").unwrap();
        assert_eq!(
            extent.to_text(),
            "verticalExtent.unitOfMeasure: Meter\nverticalExtent.datum: AGL\n\
verticalExtent.minimum: 0.0\nverticalExtent.maximum: 100.0\n"
        );
        let err = VerticalExtent::new(v, 100.0, 0.0, "Meter", "AGL").unwrap_err();
        assert_eq!(err.message(), Some("Minimum vertical extent must be less than maximum vertical extent."));
        let err = VerticalExtent::new(v, 0.0, 1.0, "Furlong", "AGL").unwrap_err();
        assert!(err.message().unwrap().starts_with("The length measure type must be one of Meter"));
        let xml = r#"<ddms:verticalExtent xmlns:ddms="urn:us:mil:ces:metadata:ddms:5" ddms:unitOfMeasure="Meter" ddms:datum="AGL"><ddms:minVerticalExtent ddms:datum="MSL">0</ddms:minVerticalExtent><ddms:maxVerticalExtent>1</ddms:maxVerticalExtent></ddms:verticalExtent>"#;
        let err = VerticalExtent::from_element(parse_element(xml).unwrap(), v).unwrap_err();
        assert_eq!(
            err.message(),
            Some("The datum on the minVerticalExtent element must match the datum on the enclosing verticalExtent element.")
        );
    }

    #[test]
    fn test_coverage_wrapper_and_output() {
        let v = Version::V3_1;
        let extents = GeospatialExtents {
            bounding_box: Some(Arc::new(BoundingBox::new(v, 1.1, 2.2, 3.3, 4.4).unwrap())),
            ..Default::default()
        };
        let coverage = GeospatialCoverage::new(v, extents, "", None, SecurityAttributes::empty(v)).unwrap();
        assert!(coverage.to_xml().contains("<ddms:GeospatialExtent>"));
        assert!(coverage
            .to_text()
            .starts_with("geospatialCoverage.GeospatialExtent.boundingBox.westBL: 1.1\n"));
        let parsed = GeospatialCoverage::from_element(parse_element(&coverage.to_xml()).unwrap(), v).unwrap();
        assert_eq!(parsed, coverage);
    }

    #[test]
    fn test_precedence_rules() {
        let v = Version::V5_0;
        let extents = GeospatialExtents {
            geographic_identifier: Some(country_identifier(v)),
            ..Default::default()
        };
        let coverage = GeospatialCoverage::new(v, extents.clone(), "Primary", Some(1), SecurityAttributes::empty(v)).unwrap();
        assert!(coverage.to_text().ends_with("geospatialCoverage.precedence: Primary\ngeospatialCoverage.order: 1\n"));
        let err = GeospatialCoverage::new(v, extents, "Tertiary", None, SecurityAttributes::empty(v)).unwrap_err();
        assert_eq!(
            err.message(),
            Some("The ddms:precedence attribute must have a value from: [Primary, Secondary]")
        );
        let boxed = GeospatialExtents {
            bounding_box: Some(Arc::new(BoundingBox::new(v, 1.1, 2.2, 3.3, 4.4).unwrap())),
            ..Default::default()
        };
        let err = GeospatialCoverage::new(v, boxed, "Primary", None, SecurityAttributes::empty(v)).unwrap_err();
        assert_eq!(
            err.message(),
            Some("The ddms:precedence attribute should only be applied to a geospatialCoverage containing a country code.")
        );
    }

    #[test]
    fn test_facility_stands_alone() {
        let v = Version::V5_0;
        let facility = Arc::new(super::super::geographic::FacilityIdentifier::new(v, "1234DD56789", "DD123").unwrap());
        let extents = GeospatialExtents {
            geographic_identifier: Some(Arc::new(GeographicIdentifier::for_facility(v, facility).unwrap())),
            bounding_box: Some(Arc::new(BoundingBox::new(v, 1.1, 2.2, 3.3, 4.4).unwrap())),
            ..Default::default()
        };
        let err = GeospatialCoverage::new(v, extents, "", None, SecurityAttributes::empty(v)).unwrap_err();
        assert_eq!(err.locator(), Some("/ddms:geospatialCoverage"));
        let err = GeospatialCoverage::new(v, GeospatialExtents::default(), "", None, SecurityAttributes::empty(v))
            .unwrap_err();
        assert!(err.message().unwrap().starts_with("At least 1 of geographicIdentifier"));
    }

    #[test]
    fn test_builder_round_trip() {
        let v = Version::V4_1;
        let extents = GeospatialExtents {
            geographic_identifier: Some(country_identifier(v)),
            ..Default::default()
        };
        let coverage = GeospatialCoverage::new(v, extents, "Secondary", Some(2), SecurityAttributes::empty(v)).unwrap();
        let builder = GeospatialCoverageBuilder::from(&coverage);
        assert_eq!(builder.commit().unwrap().unwrap(), coverage);
        assert!(GeospatialCoverageBuilder::default().commit().unwrap().is_none());
    }
}
