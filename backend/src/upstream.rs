use reqwest::{Client, IntoUrl};
use serde::de::DeserializeOwned;

use crate::config::UpstreamConfig;

const USER_AGENT: &str = concat!("horuscast/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed upstream response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("{0}")]
    Config(&'static str),
}

/// HTTP client shared by every upstream API, with the configured timeout.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: Client,
    config: UpstreamConfig,
}

impl UpstreamClient {
    pub fn new(config: UpstreamConfig) -> Result<Self, UpstreamError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    /// GET `url` with `query` and decode the JSON body.
    pub async fn get_json<T, Q>(&self, url: impl IntoUrl, query: &Q) -> Result<T, UpstreamError>
    where
        T: DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await?
            .error_for_status()?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(UpstreamError::Decode)
    }

    /// POST an urlencoded form and return the raw body.
    pub async fn post_form<F>(&self, url: impl IntoUrl, form: &F) -> Result<Vec<u8>, UpstreamError>
    where
        F: serde::Serialize + ?Sized,
    {
        let response = self
            .http
            .post(url)
            .form(form)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}
