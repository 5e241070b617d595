//! Error types for the exchange-rate fetcher
//!
//! Provides unified error handling using thiserror.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tokio::task::JoinError;

// == Fetch Error Enum ==
/// Failure of one fetch-and-parse run.
///
/// Cloneable so that a single failure can be handed to every caller waiting
/// on the same request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Upstream answered with a non-success status; holds the raw body
    #[error("{0}")]
    Remote(String),

    /// Request did not complete within the configured timeout
    #[error("Request timed out after {} ms", .0.as_millis())]
    Timeout(Duration),

    /// Response body exceeded the configured size cap
    #[error("Response exceeds maximum size of {limit} bytes")]
    TooLarge { limit: usize },

    /// Connection, protocol or body read failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Body is not well-formed XML
    #[error("Malformed XML: {0}")]
    Xml(String),

    /// Parsed record could not be encoded
    #[error("Serialization error: {0}")]
    Serialize(String),
}

impl FetchError {
    /// Returns true for timeouts, size-cap violations and connection failures.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            FetchError::Timeout(_) | FetchError::TooLarge { .. } | FetchError::Transport(_)
        )
    }
}

impl From<JoinError> for FetchError {
    fn from(err: JoinError) -> Self {
        FetchError::Transport(format!("fetch task failed: {err}"))
    }
}

// == Error Enum ==
/// Unified error type for the crate surface.
#[derive(Error, Debug)]
pub enum Error {
    /// Fetching or parsing upstream data failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Invalid query parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Cached payload could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Fetch(FetchError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            Error::Fetch(FetchError::Serialize(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Fetch(_) => StatusCode::BAD_GATEWAY,
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::Decode(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, Error>;
