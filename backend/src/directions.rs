use std::{fmt, str::FromStr};

use serde::Deserialize;
use shared::{Geometry, LngLat, RouteResponse};

use crate::upstream::{UpstreamClient, UpstreamError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    #[default]
    Driving,
    DrivingTraffic,
    Walking,
    Cycling,
}

impl Profile {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::DrivingTraffic => "driving-traffic",
            Self::Walking => "walking",
            Self::Cycling => "cycling",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "driving" => Ok(Self::Driving),
            "driving-traffic" => Ok(Self::DrivingTraffic),
            "walking" => Ok(Self::Walking),
            "cycling" => Ok(Self::Cycling),
            other => Err(format!("unsupported profile {other:?}")),
        }
    }
}

/// Parses the `"lng,lat"` form used by the route query string.
pub fn parse_lng_lat(raw: &str) -> Option<LngLat> {
    let (lng, lat) = raw.split_once(',')?;
    let point = LngLat::new(lng.trim().parse().ok()?, lat.trim().parse().ok()?);
    point.is_valid().then_some(point)
}

#[derive(Debug, Deserialize)]
pub struct DirectionsResponse {
    #[serde(default)]
    pub routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
pub struct DirectionsRoute {
    pub geometry: Geometry,
    pub distance: f64,
    pub duration: f64,
}

/// Keeps the first route alternative; `None` when Mapbox found nothing.
pub fn first_route(response: DirectionsResponse) -> Option<RouteResponse> {
    response
        .routes
        .into_iter()
        .next()
        .map(|route| RouteResponse {
            route: route.geometry,
            distance_m: route.distance,
            duration_s: route.duration,
        })
}

pub async fn fetch_route(
    client: &UpstreamClient,
    start: LngLat,
    end: LngLat,
    profile: Profile,
) -> Result<DirectionsResponse, UpstreamError> {
    let config = client.config();
    let token = config
        .directions_token()
        .ok_or(UpstreamError::Config("Mapbox directions token is not configured"))?;
    let url = format!(
        "{}/directions/v5/mapbox/{}/{},{};{},{}",
        config.mapbox_api_url.trim_end_matches('/'),
        profile,
        start.lng,
        start.lat,
        end.lng,
        end.lat
    );

    client
        .get_json(
            url,
            &[
                ("geometries", "geojson"),
                ("overview", "full"),
                ("alternatives", "false"),
                ("steps", "false"),
                ("access_token", token),
            ],
        )
        .await
}
