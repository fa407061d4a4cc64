use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::datasource::DataSourceError;
use crate::domain::BlockHeight;
use crate::worker::WorkerError;

/// Failures of the position manager core.
///
/// Validation and lifecycle errors are raised before any transaction request
/// is built and are never swallowed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DcaError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error(
        "not yet due: next execution at block {next_execution_height}, current block {current_height}"
    )]
    NotYetDue {
        next_execution_height: BlockHeight,
        current_height: BlockHeight,
    },
    #[error("custody collaborator is not connected")]
    NotConnected,
    #[error("remote unavailable: {0}")]
    RemoteUnavailable(String),
    #[error("position not found: {0}")]
    NotFound(String),
}

impl From<DataSourceError> for DcaError {
    fn from(err: DataSourceError) -> Self {
        match err {
            DataSourceError::NotConnected => DcaError::NotConnected,
            other => DcaError::RemoteUnavailable(other.to_string()),
        }
    }
}

impl From<WorkerError> for DcaError {
    fn from(err: WorkerError) -> Self {
        match err {
            WorkerError::DataSource(e) => e.into(),
            other => DcaError::RemoteUnavailable(other.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Service unavailable: {0}")]
    Unavailable(String),
    #[error("Bad gateway: {0}")]
    BadGateway(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<DcaError> for AppError {
    fn from(err: DcaError) -> Self {
        let msg = err.to_string();
        match err {
            DcaError::InvalidArgument(_) => AppError::BadRequest(msg),
            DcaError::InvalidState(_) | DcaError::NotYetDue { .. } => AppError::Conflict(msg),
            DcaError::NotConnected => AppError::Unavailable(msg),
            DcaError::RemoteUnavailable(_) => AppError::BadGateway(msg),
            DcaError::NotFound(_) => AppError::NotFound(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
