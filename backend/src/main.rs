use std::{net::SocketAddr, sync::Arc};

use backend::{
    AppState, config::ServerConfig, cors_layer, create_router, journeys::JourneyLog,
    upstream::UpstreamClient,
};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backend=debug,horuscast=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::parse();

    let journeys = JourneyLog::open(&config.data_dir)?;
    tracing::info!("journey log at {}", journeys.path().display());

    if config.upstream.directions_token().is_none() {
        tracing::warn!("no Mapbox token configured; /route will fail");
    }
    let upstream = UpstreamClient::new(config.upstream.clone())?;

    let state = AppState {
        upstream: Arc::new(upstream),
        journeys: Arc::new(journeys),
    };
    let app = create_router(state).layer(cors_layer(&config.allowed_origins));

    let addr = SocketAddr::new(config.bind_addr, config.port);
    tracing::info!("starting backend on http://{addr}");
    tracing::info!("API endpoints:");
    tracing::info!("  GET  /route?start=lng,lat&end=lng,lat&profile - Mapbox directions");
    tracing::info!("  GET  /hikes?lat&lng&radius - hiking spots around a point");
    tracing::info!("  GET  /trail?id=way/<n>|relation/<n> - trail geometry");
    tracing::info!("  GET  /nasa?lat&lng&start&end - NASA POWER daily table");
    tracing::info!("  GET  /nasa/tables?...&page&page_size - paged tables per parameter");
    tracing::info!("  POST /journeys, GET /journeys - journey log");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
