//! GML geometry: positions, points, polygons and the bounding geometry
//! that groups them

use crate::attributes::SrsAttributes;
use crate::components::helpers::{
    ddms_element, require_compatible, require_ddms_element, require_schema_element, require_value,
    schema_element, set_schema_attribute, split_list,
};
use crate::components::{output, Base, Builder, BuilderList, Component};
use crate::datatypes::{format_double, parse_double};
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::names::validate_ncname;
use crate::versions::{SchemaKind, Version};
use std::sync::Arc;

/// Require a latitude within -90..=90
pub fn require_latitude(value: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&value) {
        return Err(Error::invalid(format!(
            "A latitude value must be between -90 and 90 degrees: {}",
            format_double(value)
        )));
    }
    Ok(())
}

/// Require a longitude within -180..=180
pub fn require_longitude(value: f64) -> Result<()> {
    if !(-180.0..=180.0).contains(&value) {
        return Err(Error::invalid(format!(
            "A longitude value must be between -180 and 180 degrees: {}",
            format_double(value)
        )));
    }
    Ok(())
}

fn gml_id(element: &Element, version: Version) -> Result<String> {
    let namespace = version.namespace_for(SchemaKind::Gml)?;
    Ok(element.attribute_value(namespace, "id").to_string())
}

/// A `gml:pos` coordinate tuple: latitude, longitude and an optional height
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    base: Base,
    coordinates: Vec<f64>,
    srs_attributes: SrsAttributes,
}

impl Position {
    /// Parse a `gml:pos` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let coordinates = split_list(element.text())
            .iter()
            .map(|c| {
                parse_double(c).ok_or_else(|| Error::invalid(format!("The coordinate {} is not a valid double.", c)))
            })
            .collect::<Result<Vec<f64>>>()
            .map_err(|e| e.locate(&qname))?;
        let srs_attributes = SrsAttributes::from_element(&element).map_err(|e| e.locate(&qname))?;
        Self {
            coordinates,
            srs_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from coordinates and SRS attributes
    pub fn new(version: Version, coordinates: &[f64], srs_attributes: SrsAttributes) -> Result<Self> {
        let mut element = schema_element(version, SchemaKind::Gml, "pos")?;
        element.set_text(coordinates_list(coordinates));
        srs_attributes.add_to(&mut element, version);
        Self {
            coordinates: coordinates.to_vec(),
            srs_attributes,
            base: Base::new(element, version),
        }
        .validated()
    }

    fn validated(self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        require_schema_element(self.element(), self.version(), SchemaKind::Gml, "pos")?;
        if !(2..=3).contains(&self.coordinates.len()) {
            return Err(Error::invalid("A position must be represented by either 2 or 3 coordinates."));
        }
        require_latitude(self.coordinates[0])?;
        require_longitude(self.coordinates[1])
    }

    /// The coordinates, latitude first
    pub fn coordinates(&self) -> &[f64] {
        &self.coordinates
    }

    /// The coordinates as an xs:list
    pub fn coordinates_as_list(&self) -> String {
        coordinates_list(&self.coordinates)
    }

    /// SRS attributes on the position
    pub fn srs_attributes(&self) -> &SrsAttributes {
        &self.srs_attributes
    }
}

fn coordinates_list(coordinates: &[f64]) -> String {
    coordinates.iter().map(|c| format_double(*c)).collect::<Vec<_>>().join(" ")
}

impl Component for Position {
    fn base(&self) -> &Base {
        &self.base
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let name = output::build_prefix(prefix, self.name(), suffix);
        let mut text = output::line(html, &name, &self.coordinates_as_list());
        text.push_str(&self.srs_attributes.output(html, &format!("{}.", name)));
        text
    }
}

/// Staging form of [`Position`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Coordinates, latitude first
    pub coordinates: Vec<Option<f64>>,
    /// SRS attributes
    pub srs_attributes: SrsAttributes,
}

impl Builder for PositionBuilder {
    type Target = Position;

    fn is_empty(&self) -> bool {
        self.coordinates.iter().all(Option::is_none) && self.srs_attributes.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<Position> {
        let coordinates: Vec<f64> = self.coordinates.iter().flatten().copied().collect();
        Position::new(version, &coordinates, self.srs_attributes.clone())
    }
}

impl From<&Position> for PositionBuilder {
    fn from(position: &Position) -> Self {
        Self {
            version: Some(position.version()),
            coordinates: position.coordinates.iter().copied().map(Some).collect(),
            srs_attributes: position.srs_attributes.clone(),
        }
    }
}

/// A `gml:Point`
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    base: Base,
    id: String,
    srs_attributes: SrsAttributes,
    position: Option<Arc<Position>>,
}

impl Point {
    /// Parse a `gml:Point` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let namespace = element.namespace().unwrap_or("").to_string();
        let position = element
            .first_child(&namespace, "pos")
            .map(|pos| Position::from_element(pos.clone(), version).map(Arc::new))
            .transpose()
            .map_err(|e| e.locate(&qname))?;
        let srs_attributes = SrsAttributes::from_element(&element).map_err(|e| e.locate(&qname))?;
        Self {
            id: gml_id(&element, version)?,
            srs_attributes,
            position,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from a position, SRS attributes and a `gml:id`
    pub fn new(version: Version, position: Arc<Position>, srs_attributes: SrsAttributes, id: &str) -> Result<Self> {
        let mut element = schema_element(version, SchemaKind::Gml, "Point")?;
        srs_attributes.add_to(&mut element, version);
        set_schema_attribute(&mut element, version, SchemaKind::Gml, "id", id)?;
        element.add_child(position.element().clone());
        Self {
            id: id.to_string(),
            srs_attributes,
            position: Some(position),
            base: Base::new(element, version),
        }
        .validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        if let Some(position) = self.position.clone() {
            self.base.absorb(&*position);
        }
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        require_schema_element(self.element(), self.version(), SchemaKind::Gml, "Point")?;
        require_value("srsName", self.srs_attributes.srs_name())?;
        require_value("id", &self.id)?;
        validate_ncname(&self.id)?;
        let position = self.position.as_ref().ok_or_else(|| Error::invalid("position is required."))?;
        require_compatible(self.version(), &**position)?;
        let srs_name = position.srs_attributes().srs_name();
        if !srs_name.is_empty() && srs_name != self.srs_attributes.srs_name() {
            return Err(Error::invalid("The srsName of the position must match the srsName of the Point."));
        }
        Ok(())
    }

    /// The `gml:id`
    pub fn id(&self) -> &str {
        &self.id
    }

    /// SRS attributes on the point
    pub fn srs_attributes(&self) -> &SrsAttributes {
        &self.srs_attributes
    }

    /// The position
    pub fn position(&self) -> Option<&Arc<Position>> {
        self.position.as_ref()
    }
}

impl Component for Point {
    fn base(&self) -> &Base {
        &self.base
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let prefix = format!("{}.", output::build_prefix(prefix, self.name(), suffix));
        let mut text = output::line_always(html, &format!("{}id", prefix), &self.id);
        text.push_str(&self.srs_attributes.output(html, &prefix));
        text.push_str(&output::optional(html, &prefix, self.position.as_ref()));
        text
    }
}

/// Staging form of [`Point`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// The `gml:id`
    pub id: String,
    /// SRS attributes
    pub srs_attributes: SrsAttributes,
    /// The position
    pub position: PositionBuilder,
}

impl Builder for PointBuilder {
    type Target = Point;

    fn is_empty(&self) -> bool {
        self.id.trim().is_empty()
            && self.srs_attributes.is_empty()
            && self.position.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<Point> {
        let position = self
            .position
            .commit_as(version)?
            .ok_or_else(|| Error::invalid("position is required.").locate("gml:Point"))?;
        Point::new(version, Arc::new(position), self.srs_attributes.clone(), &self.id)
    }
}

impl From<&Point> for PointBuilder {
    fn from(point: &Point) -> Self {
        Self {
            version: Some(point.version()),
            id: point.id.clone(),
            srs_attributes: point.srs_attributes.clone(),
            position: point.position.as_deref().map(PositionBuilder::from).unwrap_or_default(),
        }
    }
}

/// A `gml:Polygon`: a closed ring of at least four positions
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    base: Base,
    id: String,
    srs_attributes: SrsAttributes,
    positions: Vec<Arc<Position>>,
}

impl Polygon {
    /// Parse a `gml:Polygon` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let namespace = element.namespace().unwrap_or("").to_string();
        let mut positions = Vec::new();
        if let Some(exterior) = element.first_child(&namespace, "exterior") {
            if let Some(ring) = exterior.first_child(&namespace, "LinearRing") {
                for pos in ring.children_named(&namespace, "pos") {
                    let position = Position::from_element(pos.clone(), version).map_err(|e| {
                        e.locate(&ring.qualified_name())
                            .locate(&exterior.qualified_name())
                            .locate(&qname)
                    })?;
                    positions.push(Arc::new(position));
                }
            }
        }
        let srs_attributes = SrsAttributes::from_element(&element).map_err(|e| e.locate(&qname))?;
        Self {
            id: gml_id(&element, version)?,
            srs_attributes,
            positions,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from the ring positions, SRS attributes and a `gml:id`
    pub fn new(
        version: Version,
        positions: Vec<Arc<Position>>,
        srs_attributes: SrsAttributes,
        id: &str,
    ) -> Result<Self> {
        let mut element = schema_element(version, SchemaKind::Gml, "Polygon")?;
        srs_attributes.add_to(&mut element, version);
        set_schema_attribute(&mut element, version, SchemaKind::Gml, "id", id)?;
        let mut ring = schema_element(version, SchemaKind::Gml, "LinearRing")?;
        for position in &positions {
            ring.add_child(position.element().clone());
        }
        let mut exterior = schema_element(version, SchemaKind::Gml, "exterior")?;
        exterior.add_child(ring);
        element.add_child(exterior);
        Self {
            id: id.to_string(),
            srs_attributes,
            positions,
            base: Base::new(element, version),
        }
        .validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        for position in self.positions.clone() {
            self.base.absorb(&*position);
        }
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let element = self.element();
        require_schema_element(element, self.version(), SchemaKind::Gml, "Polygon")?;
        require_value("srsName", self.srs_attributes.srs_name())?;
        require_value("id", &self.id)?;
        validate_ncname(&self.id)?;
        let namespace = element.namespace().unwrap_or("");
        let exterior = element
            .first_child(namespace, "exterior")
            .ok_or_else(|| Error::invalid("exterior element is required."))?;
        exterior
            .first_child(namespace, "LinearRing")
            .ok_or_else(|| Error::invalid("LinearRing element is required."))?;
        for position in &self.positions {
            require_compatible(self.version(), &**position)?;
            let srs_name = position.srs_attributes().srs_name();
            if !srs_name.is_empty() && srs_name != self.srs_attributes.srs_name() {
                return Err(Error::invalid(
                    "The srsName of each position must match the srsName of the Polygon.",
                ));
            }
        }
        if self.positions.len() < 4 {
            return Err(Error::invalid("At least 4 positions are required for a valid Polygon."));
        }
        let first = &self.positions[0];
        let last = &self.positions[self.positions.len() - 1];
        if first.coordinates() != last.coordinates() || first.srs_attributes() != last.srs_attributes() {
            return Err(Error::invalid("The first and last position in the Polygon must be the same."));
        }
        Ok(())
    }

    /// The `gml:id`
    pub fn id(&self) -> &str {
        &self.id
    }

    /// SRS attributes on the polygon
    pub fn srs_attributes(&self) -> &SrsAttributes {
        &self.srs_attributes
    }

    /// The ring positions, first and last equal
    pub fn positions(&self) -> &[Arc<Position>] {
        &self.positions
    }
}

impl Component for Polygon {
    fn base(&self) -> &Base {
        &self.base
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let prefix = format!("{}.", output::build_prefix(prefix, self.name(), suffix));
        let mut text = output::line_always(html, &format!("{}id", prefix), &self.id);
        text.push_str(&self.srs_attributes.output(html, &prefix));
        text.push_str(&output::components(html, &prefix, &self.positions));
        text
    }
}

/// Staging form of [`Polygon`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// The `gml:id`
    pub id: String,
    /// SRS attributes
    pub srs_attributes: SrsAttributes,
    /// Ring positions
    pub positions: BuilderList<PositionBuilder>,
}

impl Builder for PolygonBuilder {
    type Target = Polygon;

    fn is_empty(&self) -> bool {
        self.id.trim().is_empty()
            && self.srs_attributes.is_empty()
            && self.positions.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<Polygon> {
        Polygon::new(
            version,
            self.positions.commit_all(version)?,
            self.srs_attributes.clone(),
            &self.id,
        )
    }
}

impl From<&Polygon> for PolygonBuilder {
    fn from(polygon: &Polygon) -> Self {
        Self {
            version: Some(polygon.version()),
            id: polygon.id.clone(),
            srs_attributes: polygon.srs_attributes.clone(),
            positions: polygon
                .positions
                .iter()
                .map(|p| PositionBuilder::from(&**p))
                .collect::<Vec<_>>()
                .into(),
        }
    }
}

/// `ddms:boundingGeometry`: polygons and points
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingGeometry {
    base: Base,
    polygons: Vec<Arc<Polygon>>,
    points: Vec<Arc<Point>>,
}

impl BoundingGeometry {
    /// Parse a `ddms:boundingGeometry` element
    pub fn from_element(element: Element, version: Version) -> Result<Self> {
        let qname = element.qualified_name();
        let gml = version.namespace_for(SchemaKind::Gml)?;
        let polygons = element
            .children_named(gml, "Polygon")
            .map(|e| Polygon::from_element(e.clone(), version).map(Arc::new))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.locate(&qname))?;
        let points = element
            .children_named(gml, "Point")
            .map(|e| Point::from_element(e.clone(), version).map(Arc::new))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.locate(&qname))?;
        Self {
            polygons,
            points,
            base: Base::new(element, version),
        }
        .validated()
    }

    /// Build from polygons and points
    pub fn new(version: Version, polygons: Vec<Arc<Polygon>>, points: Vec<Arc<Point>>) -> Result<Self> {
        let mut element = ddms_element(version, "boundingGeometry");
        for polygon in &polygons {
            element.add_child(polygon.element().clone());
        }
        for point in &points {
            element.add_child(point.element().clone());
        }
        Self {
            polygons,
            points,
            base: Base::new(element, version),
        }
        .validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.validate().map_err(|e| e.locate(&self.qualified_name()))?;
        for polygon in self.polygons.clone() {
            self.base.absorb(&*polygon);
        }
        for point in self.points.clone() {
            self.base.absorb(&*point);
        }
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        require_ddms_element(self.element(), self.version(), "boundingGeometry")?;
        if self.polygons.is_empty() && self.points.is_empty() {
            return Err(Error::invalid("At least 1 of Polygon or Point must be used."));
        }
        for polygon in &self.polygons {
            require_compatible(self.version(), &**polygon)?;
        }
        for point in &self.points {
            require_compatible(self.version(), &**point)?;
        }
        Ok(())
    }

    /// The polygons
    pub fn polygons(&self) -> &[Arc<Polygon>] {
        &self.polygons
    }

    /// The points
    pub fn points(&self) -> &[Arc<Point>] {
        &self.points
    }
}

impl Component for BoundingGeometry {
    fn base(&self) -> &Base {
        &self.base
    }

    fn output(&self, html: bool, prefix: &str, suffix: &str) -> String {
        let prefix = format!("{}.", output::build_prefix(prefix, self.name(), suffix));
        let mut text = output::components(html, &prefix, &self.polygons);
        text.push_str(&output::components(html, &prefix, &self.points));
        text
    }
}

/// Staging form of [`BoundingGeometry`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundingGeometryBuilder {
    /// Version to build against
    pub version: Option<Version>,
    /// Polygons
    pub polygons: BuilderList<PolygonBuilder>,
    /// Points
    pub points: BuilderList<PointBuilder>,
}

impl Builder for BoundingGeometryBuilder {
    type Target = BoundingGeometry;

    fn is_empty(&self) -> bool {
        self.polygons.is_empty() && self.points.is_empty()
    }

    fn version(&self) -> Option<Version> {
        self.version
    }

    fn build(&self, version: Version) -> Result<BoundingGeometry> {
        BoundingGeometry::new(version, self.polygons.commit_all(version)?, self.points.commit_all(version)?)
    }
}

impl From<&BoundingGeometry> for BoundingGeometryBuilder {
    fn from(geometry: &BoundingGeometry) -> Self {
        Self {
            version: Some(geometry.version()),
            polygons: geometry.polygons.iter().map(|p| PolygonBuilder::from(&**p)).collect::<Vec<_>>().into(),
            points: geometry.points.iter().map(|p| PointBuilder::from(&**p)).collect::<Vec<_>>().into(),
        }
    }
}
