//! Overpass API element model and the queries the backend issues.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::Deserialize;
use shared::{ElementKind, Position};

use crate::upstream::{UpstreamClient, UpstreamError};

pub type Tags = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn position(self) -> Position {
        [self.lon, self.lat]
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Way {
    pub id: u64,
    #[serde(default)]
    pub geometry: Vec<LatLon>,
    #[serde(default)]
    pub tags: Tags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Node,
    Way,
    Relation,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Member {
    #[serde(rename = "type")]
    pub kind: MemberKind,
    #[serde(rename = "ref")]
    pub id: u64,
    #[serde(default)]
    pub role: String,
    /// Only ways carry inline geometry; node members expose `lat`/`lon` instead.
    #[serde(default)]
    pub geometry: Vec<LatLon>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Relation {
    pub id: u64,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverpassElement {
    Way(Way),
    Relation(Relation),
}

impl OverpassElement {
    pub fn osm_ref(&self) -> OsmRef {
        match self {
            Self::Way(way) => OsmRef::way(way.id),
            Self::Relation(relation) => OsmRef::relation(relation.id),
        }
    }

    pub fn tags(&self) -> &Tags {
        match self {
            Self::Way(way) => &way.tags,
            Self::Relation(relation) => &relation.tags,
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RawElement {
    Way(Way),
    Relation(Relation),
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<RawElement>,
}

/// Parses an Overpass JSON body, keeping ways and relations in response order.
pub fn parse_elements(body: &[u8]) -> Result<Vec<OverpassElement>, serde_json::Error> {
    let response: OverpassResponse = serde_json::from_slice(body)?;
    Ok(response
        .elements
        .into_iter()
        .filter_map(|raw| match raw {
            RawElement::Way(way) => Some(OverpassElement::Way(way)),
            RawElement::Relation(relation) => Some(OverpassElement::Relation(relation)),
            RawElement::Other => None,
        })
        .collect())
}

/// `(kind, id)` identity of an element, written `way/<n>` or `relation/<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OsmRef {
    pub kind: ElementKind,
    pub id: u64,
}

impl OsmRef {
    pub fn way(id: u64) -> Self {
        Self {
            kind: ElementKind::Way,
            id,
        }
    }

    pub fn relation(id: u64) -> Self {
        Self {
            kind: ElementKind::Relation,
            id,
        }
    }
}

impl fmt::Display for OsmRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseRefError {
    #[error("id must be way/123 or relation/456")]
    Malformed,
    #[error("kind must be way or relation")]
    UnknownKind,
}

impl FromStr for OsmRef {
    type Err = ParseRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s.split_once('/').ok_or(ParseRefError::Malformed)?;
        let id: u64 = id.trim().parse().map_err(|_| ParseRefError::Malformed)?;
        match kind.trim() {
            "way" => Ok(Self::way(id)),
            "relation" => Ok(Self::relation(id)),
            "" => Err(ParseRefError::Malformed),
            _ => Err(ParseRefError::UnknownKind),
        }
    }
}

/// Hiking relations, hiking ways and named paths/footways within `radius_m`.
pub fn hikes_query(lat: f64, lng: f64, radius_m: u32) -> String {
    format!(
        r#"[out:json][timeout:30];
(
  relation["route"="hiking"](around:{radius_m},{lat},{lng});
  way["route"="hiking"](around:{radius_m},{lat},{lng});
  way["highway"~"path|footway"]["name"](around:{radius_m},{lat},{lng});
);
out geom tags;"#
    )
}

pub fn element_query(osm_ref: OsmRef) -> String {
    format!(
        "[out:json][timeout:25]; {}({}); out geom tags;",
        osm_ref.kind, osm_ref.id
    )
}

/// Runs an Overpass QL query against the configured interpreter.
pub async fn fetch_elements(
    client: &UpstreamClient,
    query: &str,
) -> Result<Vec<OverpassElement>, UpstreamError> {
    let url = &client.config().overpass_url;
    let body = client.post_form(url, &[("data", query)]).await?;
    let elements = parse_elements(&body).map_err(UpstreamError::Decode)?;
    tracing::debug!("overpass returned {} usable elements", elements.len());
    Ok(elements)
}
