use serde::{Deserialize, Serialize};

/// GeoJSON position, `[lon, lat]`.
pub type Position = [f64; 2];

/// Point object used outside GeoJSON payloads. Note the field order differs
/// from `Position`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    pub fn is_valid(self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

impl From<Position> for LngLat {
    fn from([lng, lat]: Position) -> Self {
        Self { lng, lat }
    }
}

impl From<LngLat> for Position {
    fn from(point: LngLat) -> Self {
        [point.lng, point.lat]
    }
}

/// The subset of GeoJSON geometries the backend emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    LineString(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
}

impl Geometry {
    /// Number of constituent lines.
    pub fn line_count(&self) -> usize {
        match self {
            Self::LineString(_) => 1,
            Self::MultiLineString(lines) => lines.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Way,
    Relation,
}

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Way => "way",
            Self::Relation => "relation",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTrail {
    pub name: String,
    pub geometry: Geometry,
    pub start: LngLat,
    pub end: LngLat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HikeSpot {
    /// `way/<n>` or `relation/<n>`
    pub id: String,
    pub name: String,
    pub center: LngLat,
    pub kind: ElementKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HikesResponse {
    pub spots: Vec<HikeSpot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteResponse {
    pub route: Geometry,
    pub distance_m: f64,
    pub duration_s: f64,
}

/// A cell of the weather table: formatted dates in the header row, readings
/// (or `null`) everywhere else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TableCell {
    Date(String),
    Value(Option<f64>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub label: String,
    pub values: Vec<TableCell>,
    pub unit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherResponse {
    pub start_date: String,
    pub end_date: String,
    pub table: Vec<TableRow>,
    pub raw: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatedReading {
    pub date: String,
    pub value: Option<f64>,
}

/// One parameter's readings for a page of dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterTable {
    pub key: String,
    pub label: String,
    pub unit: String,
    pub rows: Vec<DatedReading>,
}

/// `total` counts dates across all pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedTables {
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub tables: Vec<ParameterTable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journey {
    pub start: String,
    pub end: String,
    pub latitude: [f64; 2],
    pub longitude: [f64; 2],
    pub date: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}
