//! Summary content: what the resource is about, and when and where it applies

pub mod geographic;
pub mod geospatial;
pub mod gml;
pub mod related;
pub mod subject;
pub mod temporal;
pub mod virtual_coverage;

pub use geographic::{
    CountryCode, CountryCodeBuilder, FacilityIdentifier, FacilityIdentifierBuilder, GeographicIdentifier,
    GeographicIdentifierBuilder, SubDivisionCode, SubDivisionCodeBuilder,
};
pub use geospatial::{
    BoundingBox, BoundingBoxBuilder, GeospatialCoverage, GeospatialCoverageBuilder, GeospatialExtents, PostalAddress,
    PostalAddressBuilder, VerticalExtent, VerticalExtentBuilder,
};
pub use gml::{
    BoundingGeometry, BoundingGeometryBuilder, Point, PointBuilder, Polygon, PolygonBuilder, Position,
    PositionBuilder,
};
pub use related::{Link, LinkBuilder, RelatedResource, RelatedResourceBuilder};
pub use subject::{
    Category, CategoryBuilder, Keyword, KeywordBuilder, NonStateActor, NonStateActorBuilder, ProductionMetric,
    ProductionMetricBuilder, SubjectCoverage, SubjectCoverageBuilder,
};
pub use temporal::{TemporalCoverage, TemporalCoverageBuilder, TimeBound};
pub use virtual_coverage::{VirtualCoverage, VirtualCoverageBuilder};
