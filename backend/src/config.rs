use std::{net::IpAddr, path::PathBuf, time::Duration};

use clap::{Args, Parser};

pub const DEFAULT_MAPBOX_API_URL: &str = "https://api.mapbox.com";
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
pub const DEFAULT_NASA_POWER_URL: &str = "https://power.larc.nasa.gov";

#[derive(Debug, Clone, Parser)]
#[command(
    author,
    version,
    about = "Map backend proxying Mapbox Directions, Overpass and NASA POWER"
)]
pub struct ServerConfig {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 4000)]
    pub port: u16,

    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
    pub bind_addr: IpAddr,

    /// Directory holding journeys.json
    #[arg(long, env = "DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Comma separated list of origins allowed by CORS; empty allows any origin
    #[arg(long, env = "ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Vec<String>,

    #[command(flatten)]
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Args)]
pub struct UpstreamConfig {
    /// Public Mapbox token handed to the browser via /token
    #[arg(long, env = "MAPBOX_PUBLIC_TOKEN")]
    pub mapbox_public_token: Option<String>,

    /// Token used for Directions requests (falls back to the public token)
    #[arg(long, env = "MAPBOX_DIRECTIONS_TOKEN")]
    pub mapbox_directions_token: Option<String>,

    #[arg(long, env = "MAPBOX_API_URL", default_value = DEFAULT_MAPBOX_API_URL)]
    pub mapbox_api_url: String,

    /// Full Overpass interpreter endpoint
    #[arg(long, env = "OVERPASS_URL", default_value = DEFAULT_OVERPASS_URL)]
    pub overpass_url: String,

    #[arg(long, env = "NASA_POWER_URL", default_value = DEFAULT_NASA_POWER_URL)]
    pub nasa_power_url: String,

    /// Timeout applied to every upstream request, in seconds
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn public_token(&self) -> &str {
        self.mapbox_public_token.as_deref().unwrap_or_default()
    }

    pub fn directions_token(&self) -> Option<&str> {
        self.mapbox_directions_token
            .as_deref()
            .or(self.mapbox_public_token.as_deref())
            .filter(|token| !token.is_empty())
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            mapbox_public_token: None,
            mapbox_directions_token: None,
            mapbox_api_url: DEFAULT_MAPBOX_API_URL.to_string(),
            overpass_url: DEFAULT_OVERPASS_URL.to_string(),
            nasa_power_url: DEFAULT_NASA_POWER_URL.to_string(),
            timeout_secs: 30,
        }
    }
}
