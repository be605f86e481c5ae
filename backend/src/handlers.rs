use axum::{
    Json,
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
    http::header,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use shared::{HikesResponse, NormalizedTrail, PagedTables, RouteResponse, WeatherResponse};

use crate::AppState;
use crate::directions::{self, Profile, parse_lng_lat};
use crate::error::AppError;
use crate::journeys::JourneyRequest;
use crate::nasa::{self, PointWeatherRequest};
use crate::normalize::{TrailError, normalize};
use crate::overpass::{self, OsmRef};
use crate::spots::reduce_spots;

pub const DEFAULT_HIKE_RADIUS_M: u32 = 12_000;

pub async fn root_handler() -> &'static str {
    "Backend running. Front-end not served here."
}

pub async fn health_handler() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

/// Public Mapbox token for the browser map.
pub async fn token_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "token": state.upstream.config().public_token() }))
}

#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub profile: Option<String>,
}

/// GET /route?start=lng,lat&end=lng,lat&profile=driving
pub async fn route_handler(
    State(state): State<AppState>,
    Query(query): Query<RouteQuery>,
) -> Result<Json<RouteResponse>, AppError> {
    let (start, end) = match (
        query.start.as_deref().and_then(parse_lng_lat),
        query.end.as_deref().and_then(parse_lng_lat),
    ) {
        (Some(start), Some(end)) => (start, end),
        _ => {
            return Err(AppError::bad_request(
                "start and end are required as \"lng,lat\"",
            ))
        }
    };
    let profile = match query.profile.as_deref() {
        None | Some("") => Profile::default(),
        Some(raw) => raw.parse().map_err(AppError::BadRequest)?,
    };

    tracing::info!("route request ({profile}): {start:?} -> {end:?}");
    let response = directions::fetch_route(&state.upstream, start, end, profile).await?;
    let route = directions::first_route(response).ok_or(AppError::NoRoute)?;
    tracing::debug!(
        "route found: {:.0} m, {:.0} s",
        route.distance_m,
        route.duration_s
    );

    Ok(Json(route))
}

#[derive(Debug, Deserialize)]
pub struct HikesQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius: Option<u32>,
}

/// GET /hikes?lat&lng&radius
pub async fn hikes_handler(
    State(state): State<AppState>,
    query: Result<Query<HikesQuery>, QueryRejection>,
) -> Result<Json<HikesResponse>, AppError> {
    let Query(query) = query?;
    let (lat, lng) = match (query.lat, query.lng) {
        (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => (lat, lng),
        _ => return Err(AppError::bad_request("lat and lng required")),
    };
    let radius = query.radius.unwrap_or(DEFAULT_HIKE_RADIUS_M);
    if radius == 0 {
        return Err(AppError::bad_request("radius must be positive"));
    }

    tracing::info!("hikes request around ({lat}, {lng}) radius={radius}m");
    let elements =
        overpass::fetch_elements(&state.upstream, &overpass::hikes_query(lat, lng, radius)).await?;
    let spots = reduce_spots(&elements);
    tracing::info!(
        "hikes: {} spots from {} elements",
        spots.len(),
        elements.len()
    );

    Ok(Json(HikesResponse { spots }))
}

#[derive(Debug, Deserialize)]
pub struct TrailQuery {
    pub id: Option<String>,
}

/// GET /trail?id=way/<n>|relation/<n>
pub async fn trail_handler(
    State(state): State<AppState>,
    Query(query): Query<TrailQuery>,
) -> Result<Json<NormalizedTrail>, AppError> {
    let osm_ref: OsmRef = query.id.as_deref().unwrap_or_default().parse()?;

    tracing::info!("trail request for {osm_ref}");
    let elements =
        overpass::fetch_elements(&state.upstream, &overpass::element_query(osm_ref)).await?;
    let element = elements.first().ok_or(TrailError::NotFound(osm_ref))?;
    let trail = normalize(element)?;
    tracing::debug!(
        "trail {osm_ref} \"{}\" with {} line(s)",
        trail.name,
        trail.geometry.line_count()
    );

    Ok(Json(trail))
}

#[derive(Debug, Deserialize)]
pub struct NasaQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub model: Option<String>,
    pub scenario: Option<String>,
}

impl NasaQuery {
    fn into_request(self) -> Result<PointWeatherRequest, AppError> {
        let invalid = || AppError::bad_request("lat,lng,start=YYYY-MM-DD,end=YYYY-MM-DD required");

        let lat = self.lat.filter(|v| v.is_finite()).ok_or_else(invalid)?;
        let lng = self.lng.filter(|v| v.is_finite()).ok_or_else(invalid)?;
        let start = self.start.as_deref().and_then(nasa::parse_date).ok_or_else(invalid)?;
        let end = self.end.as_deref().and_then(nasa::parse_date).ok_or_else(invalid)?;
        if end < start {
            return Err(AppError::bad_request("end must not be before start"));
        }

        Ok(PointWeatherRequest {
            lat,
            lng,
            start,
            end,
            model: self
                .model
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| nasa::DEFAULT_MODEL.to_string()),
            scenario: self
                .scenario
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| nasa::DEFAULT_SCENARIO.to_string()),
        })
    }
}

/// GET /nasa?lat&lng&start=YYYY-MM-DD&end=YYYY-MM-DD
pub async fn nasa_handler(
    State(state): State<AppState>,
    query: Result<Query<NasaQuery>, QueryRejection>,
) -> Result<Json<WeatherResponse>, AppError> {
    let Query(query) = query?;
    let req = query.into_request()?;

    tracing::info!(
        "NASA POWER request {}..{} at ({}, {})",
        req.start,
        req.end,
        req.lat,
        req.lng
    );
    let raw = nasa::fetch_point_weather(&state.upstream, &req).await?;
    let table = nasa::weather_table(&nasa::parameter_series(&raw));

    Ok(Json(WeatherResponse {
        start_date: req.start.format("%Y-%m-%d").to_string(),
        end_date: req.end.format("%Y-%m-%d").to_string(),
        table,
        raw,
    }))
}

#[derive(Debug, Deserialize)]
pub struct Paging {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// GET /nasa/tables?lat&lng&start&end&page&page_size
pub async fn nasa_tables_handler(
    State(state): State<AppState>,
    query: Result<Query<NasaQuery>, QueryRejection>,
    paging: Result<Query<Paging>, QueryRejection>,
) -> Result<Json<PagedTables>, AppError> {
    let Query(query) = query?;
    let Query(paging) = paging?;
    let page = paging.page.unwrap_or(1);
    let page_size = paging.page_size.unwrap_or(nasa::DEFAULT_PAGE_SIZE);
    if page == 0 || page_size == 0 {
        return Err(AppError::bad_request("page and page_size must be positive"));
    }
    let req = query.into_request()?;

    tracing::info!(
        "NASA POWER tables {}..{} at ({}, {}) page {page} x {page_size}",
        req.start,
        req.end,
        req.lat,
        req.lng
    );
    let raw = nasa::fetch_point_weather(&state.upstream, &req).await?;
    let tables = nasa::paged_tables(&nasa::parameter_series(&raw), page, page_size);
    tracing::debug!("{} dates in total", tables.total);

    Ok(Json(tables))
}

/// POST /journeys
pub async fn save_journey_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let request: JourneyRequest = serde_json::from_slice(&body).map_err(|err| {
        tracing::debug!("invalid journey payload: {err}");
        AppError::bad_request("Expected {start, end, latitude[2], longitude[2], date?}")
    })?;
    let journey = request.into_journey();

    state.journeys.append(&journey)?;
    tracing::info!("saved journey {} -> {}", journey.start, journey.end);

    Ok(Json(json!({ "ok": true })))
}

/// GET /journeys
pub async fn list_journeys_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let body = state.journeys.read_raw()?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body))
}
