//! The flight record returned by the model, validated at the boundary.
//!
//! Raw JSON is first deserialized into permissive mirror structs, then
//! checked and converted into [`FlightRecord`]. A record that passes is
//! complete: coordinates are valid, the stop count is a whole number, and
//! every tagged value is one of the known variants. Missing free-text fields
//! become empty strings.

use foundation::math::GeoCoord;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::extract::{ExtractError, extract_json};

#[derive(Debug, Clone, PartialEq)]
pub enum RecordError {
    /// The JSON does not have the expected shape.
    Shape(String),
    MissingField(&'static str),
    InvalidCoordinate { field: String },
    InvalidStops(f64),
    UnknownVariant { field: String, value: String },
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordError::Shape(e) => write!(f, "flight record has unexpected shape: {e}"),
            RecordError::MissingField(name) => write!(f, "flight record is missing '{name}'"),
            RecordError::InvalidCoordinate { field } => write!(f, "invalid coordinates in '{field}'"),
            RecordError::InvalidStops(v) => write!(f, "stop count {v} is not a non-negative integer"),
            RecordError::UnknownVariant { field, value } => {
                write!(f, "unknown value '{value}' for '{field}'")
            }
        }
    }
}

impl std::error::Error for RecordError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizationKind {
    Cheaper,
    Faster,
    Alternative,
}

impl OptimizationKind {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "cheaper" => Some(Self::Cheaper),
            "faster" => Some(Self::Faster),
            "alternative" => Some(Self::Alternative),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Optimization {
    pub kind: OptimizationKind,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DestinationInsights {
    pub currency: String,
    pub language: String,
    pub plug_type: String,
    pub timezone: String,
    pub best_season: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostOfLiving {
    pub meal_price: String,
    pub hostel_price: String,
    pub beer_price: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoverGuide {
    pub has_layover: bool,
    pub airport: String,
    pub is_worth_exiting: bool,
    pub suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpotCategory {
    Nature,
    Urban,
    Food,
}

impl SpotCategory {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "nature" => Some(Self::Nature),
            "urban" => Some(Self::Urban),
            "food" => Some(Self::Food),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SpotCategory::Nature => "nature",
            SpotCategory::Urban => "urban",
            SpotCategory::Food => "food",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VibeSpot {
    pub name: String,
    pub description: String,
    pub category: SpotCategory,
    pub coordinates: Option<GeoCoord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlightRecord {
    pub origin: String,
    pub destination: String,
    pub origin_code: String,
    pub destination_code: String,
    pub origin_coords: GeoCoord,
    pub destination_coords: GeoCoord,
    /// Price range for all passengers, with currency symbol.
    pub average_price: String,
    pub currency: String,
    pub duration: String,
    pub distance: String,
    pub airlines: Vec<String>,
    pub summary: String,
    pub optimizations: Vec<Optimization>,
    pub stops: u32,
    pub layover: Option<String>,
    pub destination_insights: Option<DestinationInsights>,
    pub cost_of_living: Option<CostOfLiving>,
    pub layover_guide: Option<LayoverGuide>,
    pub vibe_spots: Vec<VibeSpot>,
}

/// A web page the model cited while answering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

#[derive(Debug, Deserialize)]
struct RawCoords {
    lat: Option<f64>,
    lng: Option<f64>,
}

/// Reads an explicit `null` the same as a missing key.
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(d).map(Option::unwrap_or_default)
}

#[derive(Debug, Deserialize)]
struct RawOptimization {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawInsights {
    #[serde(deserialize_with = "null_as_default")]
    currency: String,
    #[serde(deserialize_with = "null_as_default")]
    language: String,
    #[serde(deserialize_with = "null_as_default")]
    plug_type: String,
    #[serde(deserialize_with = "null_as_default")]
    timezone: String,
    #[serde(deserialize_with = "null_as_default")]
    best_season: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawCostOfLiving {
    #[serde(deserialize_with = "null_as_default")]
    meal_price: String,
    #[serde(deserialize_with = "null_as_default")]
    hostel_price: String,
    #[serde(deserialize_with = "null_as_default")]
    beer_price: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawLayoverGuide {
    #[serde(deserialize_with = "null_as_default")]
    has_layover: bool,
    #[serde(deserialize_with = "null_as_default")]
    airport: String,
    #[serde(deserialize_with = "null_as_default")]
    is_worth_exiting: bool,
    #[serde(deserialize_with = "null_as_default")]
    suggestion: String,
}

#[derive(Debug, Deserialize)]
struct RawVibeSpot {
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    description: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    coordinates: Option<RawCoords>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawFlight {
    origin: Option<String>,
    destination: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    origin_code: String,
    #[serde(deserialize_with = "null_as_default")]
    destination_code: String,
    origin_coords: Option<RawCoords>,
    destination_coords: Option<RawCoords>,
    #[serde(deserialize_with = "null_as_default")]
    average_price: String,
    #[serde(deserialize_with = "null_as_default")]
    currency: String,
    #[serde(deserialize_with = "null_as_default")]
    duration: String,
    #[serde(deserialize_with = "null_as_default")]
    distance: String,
    #[serde(deserialize_with = "null_as_default")]
    airlines: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    summary: String,
    #[serde(deserialize_with = "null_as_default")]
    optimizations: Vec<RawOptimization>,
    stops: Option<f64>,
    layover: Option<String>,
    destination_insights: Option<RawInsights>,
    cost_of_living: Option<RawCostOfLiving>,
    layover_guide: Option<RawLayoverGuide>,
    #[serde(deserialize_with = "null_as_default")]
    vibe_spots: Vec<RawVibeSpot>,
}

fn coords(raw: Option<RawCoords>, field: &str) -> Result<GeoCoord, RecordError> {
    let invalid = || RecordError::InvalidCoordinate {
        field: field.to_string(),
    };
    let raw = raw.ok_or_else(invalid)?;
    let c = GeoCoord::new(raw.lat.ok_or_else(invalid)?, raw.lng.ok_or_else(invalid)?);
    if c.is_valid() { Ok(c) } else { Err(invalid()) }
}

fn stop_count(raw: Option<f64>) -> Result<u32, RecordError> {
    let v = raw.ok_or(RecordError::MissingField("stops"))?;
    if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= f64::from(u32::MAX) {
        Ok(v as u32)
    } else {
        Err(RecordError::InvalidStops(v))
    }
}

fn variant<T>(raw: Option<String>, field: String, parse: fn(&str) -> Option<T>) -> Result<T, RecordError> {
    let value = raw.unwrap_or_default();
    parse(&value).ok_or(RecordError::UnknownVariant { field, value })
}

impl FlightRecord {
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        if !value.is_object() {
            return Err(RecordError::Shape("expected a JSON object".into()));
        }
        let raw: RawFlight =
            serde_json::from_value(value).map_err(|e| RecordError::Shape(e.to_string()))?;

        let optimizations = raw
            .optimizations
            .into_iter()
            .enumerate()
            .map(|(i, o)| {
                Ok(Optimization {
                    kind: variant(o.kind, format!("optimizations[{i}].type"), OptimizationKind::parse)?,
                    title: o.title,
                    description: o.description,
                })
            })
            .collect::<Result<Vec<_>, RecordError>>()?;

        let vibe_spots = raw
            .vibe_spots
            .into_iter()
            .enumerate()
            .map(|(i, s)| {
                let coordinates = match s.coordinates {
                    Some(c) => Some(coords(Some(c), &format!("vibeSpots[{i}].coordinates"))?),
                    None => None,
                };
                Ok(VibeSpot {
                    category: variant(s.kind, format!("vibeSpots[{i}].type"), SpotCategory::parse)?,
                    name: s.name,
                    description: s.description,
                    coordinates,
                })
            })
            .collect::<Result<Vec<_>, RecordError>>()?;

        Ok(Self {
            origin: raw.origin.ok_or(RecordError::MissingField("origin"))?,
            destination: raw.destination.ok_or(RecordError::MissingField("destination"))?,
            origin_code: raw.origin_code,
            destination_code: raw.destination_code,
            origin_coords: coords(raw.origin_coords, "originCoords")?,
            destination_coords: coords(raw.destination_coords, "destinationCoords")?,
            average_price: raw.average_price,
            currency: raw.currency,
            duration: raw.duration,
            distance: raw.distance,
            airlines: raw.airlines,
            summary: raw.summary,
            optimizations,
            stops: stop_count(raw.stops)?,
            layover: raw.layover.filter(|l| !l.trim().is_empty()),
            destination_insights: raw.destination_insights.map(|d| DestinationInsights {
                currency: d.currency,
                language: d.language,
                plug_type: d.plug_type,
                timezone: d.timezone,
                best_season: d.best_season,
            }),
            cost_of_living: raw.cost_of_living.map(|c| CostOfLiving {
                meal_price: c.meal_price,
                hostel_price: c.hostel_price,
                beer_price: c.beer_price,
            }),
            layover_guide: raw.layover_guide.map(|g| LayoverGuide {
                has_layover: g.has_layover,
                airport: g.airport,
                is_worth_exiting: g.is_worth_exiting,
                suggestion: g.suggestion,
            }),
            vibe_spots,
        })
    }

    /// Extracts and validates a record from raw model text.
    pub fn from_model_text(text: &str) -> Result<Self, ParseFlightError> {
        let value = extract_json(text).map_err(ParseFlightError::Extract)?;
        Self::from_value(value).map_err(ParseFlightError::Record)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseFlightError {
    Extract(ExtractError),
    Record(RecordError),
}

impl std::fmt::Display for ParseFlightError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseFlightError::Extract(e) => write!(f, "{e}"),
            ParseFlightError::Record(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ParseFlightError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseFlightError::Extract(e) => Some(e),
            ParseFlightError::Record(e) => Some(e),
        }
    }
}
