pub mod config;
pub mod directions;
pub mod error;
pub mod handlers;
pub mod journeys;
pub mod nasa;
pub mod normalize;
pub mod overpass;
pub mod spots;
pub mod upstream;

use std::sync::Arc;

use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::journeys::JourneyLog;
use crate::upstream::UpstreamClient;

#[derive(Debug, Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamClient>,
    pub journeys: Arc<JourneyLog>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root_handler))
        .route("/health", get(handlers::health_handler))
        .route("/token", get(handlers::token_handler))
        .route("/route", get(handlers::route_handler))
        .route("/hikes", get(handlers::hikes_handler))
        .route("/trail", get(handlers::trail_handler))
        .route("/nasa", get(handlers::nasa_handler))
        .route("/nasa/tables", get(handlers::nasa_tables_handler))
        .route(
            "/journeys",
            post(handlers::save_journey_handler).get(handlers::list_journeys_handler),
        )
        .with_state(state)
}

/// CORS for the listed origins, or any origin when the list is empty.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin {origin:?}");
                None
            }
        })
        .collect();

    let allow_origin = if allowed_origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
