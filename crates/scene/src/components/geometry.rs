use foundation::math::{GeoCoord, great_circle_midpoint, line_centroid};

/// Geographic geometry on the sphere. Rings are closed (first == last) when
/// they come from a decoder, but nothing here relies on it.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoGeometry {
    /// The whole globe.
    Sphere,
    Point(GeoCoord),
    MultiPoint(Vec<GeoCoord>),
    LineString(Vec<GeoCoord>),
    MultiLineString(Vec<Vec<GeoCoord>>),
    Polygon(Vec<Vec<GeoCoord>>),
    MultiPolygon(Vec<Vec<Vec<GeoCoord>>>),
}

impl GeoGeometry {
    pub fn is_empty(&self) -> bool {
        match self {
            GeoGeometry::Sphere | GeoGeometry::Point(_) => false,
            GeoGeometry::MultiPoint(points) | GeoGeometry::LineString(points) => points.is_empty(),
            GeoGeometry::MultiLineString(lines) | GeoGeometry::Polygon(lines) => {
                lines.iter().all(|l| l.is_empty())
            }
            GeoGeometry::MultiPolygon(polygons) => {
                polygons.iter().flatten().all(|ring| ring.is_empty())
            }
        }
    }

    /// Representative point used to center the globe on the geometry.
    ///
    /// Polygons use their exterior rings weighted by arc length, lines their
    /// edges. `None` for the sphere and for empty geometry.
    pub fn centroid(&self) -> Option<GeoCoord> {
        match self {
            GeoGeometry::Sphere => None,
            GeoGeometry::Point(p) => Some(*p),
            GeoGeometry::MultiPoint(points) => {
                let mut sum = foundation::math::Vec3::default();
                for p in points {
                    sum = sum + p.to_unit();
                }
                GeoCoord::from_unit(sum)
            }
            GeoGeometry::LineString(line) => line_centroid([line.as_slice()]),
            GeoGeometry::MultiLineString(lines) => line_centroid(lines.iter().map(Vec::as_slice)),
            GeoGeometry::Polygon(rings) => line_centroid(rings.first().map(Vec::as_slice)),
            GeoGeometry::MultiPolygon(polygons) => {
                line_centroid(polygons.iter().filter_map(|p| p.first()).map(Vec::as_slice))
            }
        }
    }
}

/// A named country (or other region) from the world boundary data.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionFeature {
    pub id: Option<String>,
    pub name: String,
    pub geometry: GeoGeometry,
}

impl RegionFeature {
    pub fn new(id: Option<String>, name: impl Into<String>, geometry: GeoGeometry) -> Self {
        Self {
            id,
            name: name.into(),
            geometry,
        }
    }
}

/// Region features loaded once per session. Index order is draw order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionSet {
    features: Vec<RegionFeature>,
}

impl RegionSet {
    pub fn new(features: Vec<RegionFeature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RegionFeature> {
        self.features.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegionFeature> {
        self.features.iter()
    }

    pub fn find_by_name(&self, name: &str) -> Option<&RegionFeature> {
        self.features.iter().find(|f| f.name == name)
    }
}

/// Origin and destination of a flight.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RouteSegment {
    pub origin: GeoCoord,
    pub destination: GeoCoord,
}

impl RouteSegment {
    pub fn new(origin: GeoCoord, destination: GeoCoord) -> Self {
        Self {
            origin,
            destination,
        }
    }

    /// The great-circle arc between the endpoints.
    pub fn geometry(&self) -> GeoGeometry {
        GeoGeometry::LineString(vec![self.origin, self.destination])
    }

    pub fn midpoint(&self) -> GeoCoord {
        great_circle_midpoint(self.origin, self.destination)
    }
}
