//! World boundary decoding.
//!
//! Accepts the TopoJSON topology published by `world-atlas` (countries under
//! `objects.countries`, quantized delta-encoded arcs) as well as a plain
//! GeoJSON `FeatureCollection`, and produces the globe's [`RegionSet`].

use foundation::math::GeoCoord;
use scene::components::{GeoGeometry, RegionFeature, RegionSet};
use serde_json::{Map, Value};

/// Object decoded from a topology unless told otherwise.
pub const COUNTRIES_OBJECT: &str = "countries";

/// Name given to a region without a name or id.
pub const UNKNOWN_REGION: &str = "Unknown";

#[derive(Debug)]
pub enum BoundaryError {
    Json(String),
    UnsupportedDocument,
    MissingObject(String),
    ArcIndexOutOfRange { index: i64 },
    InvalidGeometry { feature: usize, reason: String },
}

impl std::fmt::Display for BoundaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundaryError::Json(e) => write!(f, "boundary JSON parse error: {e}"),
            BoundaryError::UnsupportedDocument => {
                write!(f, "expected a TopoJSON Topology or GeoJSON FeatureCollection")
            }
            BoundaryError::MissingObject(name) => write!(f, "topology has no object '{name}'"),
            BoundaryError::ArcIndexOutOfRange { index } => {
                write!(f, "arc index {index} out of range")
            }
            BoundaryError::InvalidGeometry { feature, reason } => {
                write!(f, "invalid geometry in feature {feature}: {reason}")
            }
        }
    }
}

impl std::error::Error for BoundaryError {}

/// Decodes either supported document kind.
pub fn decode_regions(payload: &str) -> Result<RegionSet, BoundaryError> {
    let value: Value =
        serde_json::from_str(payload).map_err(|e| BoundaryError::Json(e.to_string()))?;
    match value.get("type").and_then(Value::as_str) {
        Some("Topology") => decode_topology(&value, COUNTRIES_OBJECT),
        Some("FeatureCollection") => decode_feature_collection(&value),
        _ => Err(BoundaryError::UnsupportedDocument),
    }
}

#[derive(Debug, Clone, Copy)]
struct Transform {
    scale: [f64; 2],
    translate: [f64; 2],
}

impl Transform {
    fn parse(value: Option<&Value>) -> Option<Self> {
        let obj = value?.as_object()?;
        Some(Self {
            scale: pair(obj.get("scale")?)?,
            translate: pair(obj.get("translate")?)?,
        })
    }

    fn apply(&self, q: [f64; 2]) -> [f64; 2] {
        [
            q[0] * self.scale[0] + self.translate[0],
            q[1] * self.scale[1] + self.translate[1],
        ]
    }
}

fn pair(value: &Value) -> Option<[f64; 2]> {
    let arr = value.as_array()?;
    Some([arr.first()?.as_f64()?, arr.get(1)?.as_f64()?])
}

struct Topology {
    arcs: Vec<Vec<[f64; 2]>>,
    transform: Option<Transform>,
}

impl Topology {
    fn parse(root: &Map<String, Value>) -> Result<Self, BoundaryError> {
        let transform = Transform::parse(root.get("transform"));
        let raw = root
            .get("arcs")
            .and_then(Value::as_array)
            .ok_or(BoundaryError::UnsupportedDocument)?;

        let mut arcs = Vec::with_capacity(raw.len());
        for (i, arc) in raw.iter().enumerate() {
            let positions = arc.as_array().ok_or_else(|| BoundaryError::InvalidGeometry {
                feature: i,
                reason: "arc must be an array of positions".into(),
            })?;
            let mut points = Vec::with_capacity(positions.len());
            let (mut x, mut y) = (0.0, 0.0);
            for p in positions {
                let q = pair(p).ok_or_else(|| BoundaryError::InvalidGeometry {
                    feature: i,
                    reason: "arc position must be [x, y]".into(),
                })?;
                let decoded = match transform {
                    Some(t) => {
                        // Quantized arcs store deltas from the previous position.
                        x += q[0];
                        y += q[1];
                        t.apply([x, y])
                    }
                    None => q,
                };
                points.push(decoded);
            }
            arcs.push(points);
        }
        Ok(Self { arcs, transform })
    }

    /// Appends arc `index` to `out`, reversed when the index is negative.
    /// Shared endpoints between consecutive arcs are emitted once.
    fn push_arc(&self, index: i64, out: &mut Vec<[f64; 2]>) -> Result<(), BoundaryError> {
        let (slot, reversed) = if index < 0 { (!index, true) } else { (index, false) };
        let arc = usize::try_from(slot)
            .ok()
            .and_then(|i| self.arcs.get(i))
            .ok_or(BoundaryError::ArcIndexOutOfRange { index })?;
        if !out.is_empty() {
            out.pop();
        }
        if reversed {
            out.extend(arc.iter().rev().copied());
        } else {
            out.extend(arc.iter().copied());
        }
        Ok(())
    }

    fn line(&self, indices: &Value, feature: usize) -> Result<Vec<GeoCoord>, BoundaryError> {
        let indices = indices
            .as_array()
            .ok_or_else(|| invalid(feature, "arc list must be an array"))?;
        let mut points = Vec::new();
        for i in indices {
            let i = i
                .as_i64()
                .ok_or_else(|| invalid(feature, "arc index must be an integer"))?;
            self.push_arc(i, &mut points)?;
        }
        points
            .into_iter()
            .map(|p| to_coord(p, feature))
            .collect()
    }

    fn lines(&self, value: &Value, feature: usize) -> Result<Vec<Vec<GeoCoord>>, BoundaryError> {
        value
            .as_array()
            .ok_or_else(|| invalid(feature, "expected an array of arc lists"))?
            .iter()
            .map(|l| self.line(l, feature))
            .collect()
    }

    fn position(&self, value: &Value, feature: usize) -> Result<GeoCoord, BoundaryError> {
        let q = pair(value).ok_or_else(|| invalid(feature, "position must be [x, y]"))?;
        let p = match self.transform {
            Some(t) => t.apply(q),
            None => q,
        };
        to_coord(p, feature)
    }

    fn geometry(&self, obj: &Map<String, Value>, feature: usize) -> Result<Option<GeoGeometry>, BoundaryError> {
        let ty = match obj.get("type") {
            Some(Value::String(s)) => s.as_str(),
            Some(Value::Null) | None => return Ok(None),
            Some(_) => return Err(invalid(feature, "geometry type must be a string")),
        };
        let arcs = obj.get("arcs");
        let coordinates = obj.get("coordinates");

        let geometry = match ty {
            "Point" => GeoGeometry::Point(self.position(require(coordinates, feature, "coordinates")?, feature)?),
            "MultiPoint" => GeoGeometry::MultiPoint(
                require(coordinates, feature, "coordinates")?
                    .as_array()
                    .ok_or_else(|| invalid(feature, "MultiPoint coordinates must be an array"))?
                    .iter()
                    .map(|p| self.position(p, feature))
                    .collect::<Result<_, _>>()?,
            ),
            "LineString" => GeoGeometry::LineString(self.line(require(arcs, feature, "arcs")?, feature)?),
            "MultiLineString" => GeoGeometry::MultiLineString(self.lines(require(arcs, feature, "arcs")?, feature)?),
            "Polygon" => GeoGeometry::Polygon(self.lines(require(arcs, feature, "arcs")?, feature)?),
            "MultiPolygon" => GeoGeometry::MultiPolygon(
                require(arcs, feature, "arcs")?
                    .as_array()
                    .ok_or_else(|| invalid(feature, "MultiPolygon arcs must be an array"))?
                    .iter()
                    .map(|poly| self.lines(poly, feature))
                    .collect::<Result<_, _>>()?,
            ),
            other => return Err(invalid(feature, &format!("unsupported geometry type: {other}"))),
        };
        Ok(Some(geometry))
    }
}

fn require<'v>(value: Option<&'v Value>, feature: usize, what: &str) -> Result<&'v Value, BoundaryError> {
    value.ok_or_else(|| invalid(feature, &format!("missing {what}")))
}

fn invalid(feature: usize, reason: &str) -> BoundaryError {
    BoundaryError::InvalidGeometry {
        feature,
        reason: reason.to_string(),
    }
}

fn to_coord(p: [f64; 2], feature: usize) -> Result<GeoCoord, BoundaryError> {
    let c = GeoCoord::new(p[1], p[0]);
    if c.is_valid() {
        Ok(c)
    } else {
        Err(invalid(feature, &format!("position [{}, {}] out of range", p[0], p[1])))
    }
}

fn feature_id(obj: &Map<String, Value>) -> Option<String> {
    match obj.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn feature_name(obj: &Map<String, Value>, id: Option<&str>) -> String {
    obj.get("properties")
        .and_then(|p| p.get("name"))
        .and_then(Value::as_str)
        .or(id)
        .unwrap_or(UNKNOWN_REGION)
        .to_string()
}

/// Decodes the named object of a TopoJSON topology. Null geometries are
/// skipped.
pub fn decode_topology(value: &Value, object: &str) -> Result<RegionSet, BoundaryError> {
    let root = value.as_object().ok_or(BoundaryError::UnsupportedDocument)?;
    if root.get("type").and_then(Value::as_str) != Some("Topology") {
        return Err(BoundaryError::UnsupportedDocument);
    }
    let topology = Topology::parse(root)?;
    let target = root
        .get("objects")
        .and_then(|o| o.get(object))
        .and_then(Value::as_object)
        .ok_or_else(|| BoundaryError::MissingObject(object.to_string()))?;

    let members: Vec<&Map<String, Value>> = match target.get("type").and_then(Value::as_str) {
        Some("GeometryCollection") => target
            .get("geometries")
            .and_then(Value::as_array)
            .map(|g| g.iter().filter_map(Value::as_object).collect())
            .unwrap_or_default(),
        _ => vec![target],
    };

    let mut features = Vec::with_capacity(members.len());
    for (index, obj) in members.into_iter().enumerate() {
        let Some(geometry) = topology.geometry(obj, index)? else {
            continue;
        };
        let id = feature_id(obj);
        let name = feature_name(obj, id.as_deref());
        features.push(RegionFeature::new(id, name, geometry));
    }
    tracing::debug!(object, features = features.len(), arcs = topology.arcs.len(), "decoded topology");
    Ok(RegionSet::new(features))
}

/// Decodes a GeoJSON `FeatureCollection`. Features without geometry are
/// skipped.
pub fn decode_feature_collection(value: &Value) -> Result<RegionSet, BoundaryError> {
    let root = value.as_object().ok_or(BoundaryError::UnsupportedDocument)?;
    if root.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
        return Err(BoundaryError::UnsupportedDocument);
    }
    let raw = root
        .get("features")
        .and_then(Value::as_array)
        .ok_or(BoundaryError::UnsupportedDocument)?;

    let mut features = Vec::with_capacity(raw.len());
    for (index, feat) in raw.iter().enumerate() {
        let obj = feat
            .as_object()
            .ok_or_else(|| invalid(index, "feature must be an object"))?;
        let geometry = match obj.get("geometry") {
            Some(Value::Null) | None => continue,
            Some(g) => parse_geojson_geometry(g).map_err(|reason| BoundaryError::InvalidGeometry {
                feature: index,
                reason,
            })?,
        };
        let id = feature_id(obj);
        let name = feature_name(obj, id.as_deref());
        features.push(RegionFeature::new(id, name, geometry));
    }
    Ok(RegionSet::new(features))
}

fn parse_geojson_geometry(value: &Value) -> Result<GeoGeometry, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;
    let coords = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates".to_string())?;

    match ty {
        "Point" => Ok(GeoGeometry::Point(parse_position(coords)?)),
        "MultiPoint" => Ok(GeoGeometry::MultiPoint(parse_positions(coords)?)),
        "LineString" => Ok(GeoGeometry::LineString(parse_positions(coords)?)),
        "MultiLineString" => Ok(GeoGeometry::MultiLineString(parse_rings(coords)?)),
        "Polygon" => Ok(GeoGeometry::Polygon(parse_rings(coords)?)),
        "MultiPolygon" => {
            let polys = coords
                .as_array()
                .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?;
            let mut out = Vec::with_capacity(polys.len());
            for poly in polys {
                out.push(parse_rings(poly)?);
            }
            Ok(GeoGeometry::MultiPolygon(out))
        }
        other => Err(format!("unsupported geometry type: {other}")),
    }
}

fn parse_position(coords: &Value) -> Result<GeoCoord, String> {
    let [lng, lat] = pair(coords).ok_or("position must be [lon, lat]".to_string())?;
    let c = GeoCoord::new(lat, lng);
    if !c.is_valid() {
        return Err(format!("position [{lng}, {lat}] out of range"));
    }
    Ok(c)
}

fn parse_positions(coords: &Value) -> Result<Vec<GeoCoord>, String> {
    coords
        .as_array()
        .ok_or("coordinates must be an array".to_string())?
        .iter()
        .map(parse_position)
        .collect()
}

fn parse_rings(coords: &Value) -> Result<Vec<Vec<GeoCoord>>, String> {
    coords
        .as_array()
        .ok_or("coordinates must be an array of rings".to_string())?
        .iter()
        .map(parse_positions)
        .collect()
}
