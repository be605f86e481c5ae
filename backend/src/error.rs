use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use shared::ApiError;
use thiserror::Error;

use crate::journeys::JournalError;
use crate::normalize::TrailError;
use crate::overpass::ParseRefError;
use crate::upstream::UpstreamError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("invalid query: {0}")]
    Query(#[from] QueryRejection),
    #[error(transparent)]
    InvalidId(#[from] ParseRefError),
    #[error(transparent)]
    Trail(#[from] TrailError),
    #[error("no route")]
    NoRoute,
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error(transparent)]
    Journal(#[from] JournalError),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Query(_) | Self::InvalidId(_) => StatusCode::BAD_REQUEST,
            Self::Trail(_) => StatusCode::NOT_FOUND,
            Self::NoRoute => StatusCode::BAD_GATEWAY,
            Self::Upstream(UpstreamError::Config(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Journal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {self}");
        } else {
            tracing::debug!("request rejected: {self}");
        }

        (
            status,
            Json(ApiError {
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}
