use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;

use crate::{capture::DeviceError, dao::StoreError, songs::AcquireError};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No feed is configured for the requested player.
    #[error("unknown player feed {0}")]
    UnknownFeed(u32),
    /// The camera could not be opened or driven.
    #[error("camera unavailable")]
    Camera(#[from] DeviceError),
    /// Acquiring a song failed somewhere along the pipeline.
    #[error("song acquisition failed")]
    Acquisition(#[from] AcquireError),
    /// A JSON store could not be persisted.
    #[error("store failure")]
    Store(#[from] StoreError),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// An upstream dependency failed on our behalf.
    #[error("bad gateway: {0}")]
    BadGateway(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::UnknownFeed(player) => {
                AppError::NotFound(format!("no feed for player {player}"))
            }
            ServiceError::Camera(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Acquisition(AcquireError::EmptyKey) => {
                AppError::BadRequest(AcquireError::EmptyKey.to_string())
            }
            ServiceError::Acquisition(source) => AppError::BadGateway(source.to_string()),
            ServiceError::Store(source) => AppError::Internal(source.to_string()),
            ServiceError::NotFound(message) => AppError::NotFound(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
