//! API error types and responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use keyset_core::KeyError;
use keyset_firewall::FirewallError;
use serde::Serialize;
use thiserror::Error;

use crate::storage::StorageError;

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Storage failure: {0}")]
    StoreFailure(String),

    #[error("Key generation failed: {0}")]
    GenerationFailure(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// API error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UnknownAlgorithm(_) | ApiError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            ApiError::StoreFailure(_) | ApiError::GenerationFailure(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::UnknownAlgorithm(_) => "UNKNOWN_ALGORITHM",
            ApiError::MalformedInput(_) => "MALFORMED_INPUT",
            ApiError::StoreFailure(_) => "STORE_FAILURE",
            ApiError::GenerationFailure(_) => "GENERATION_FAILURE",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (message, details) = match self {
            ApiError::UnknownAlgorithm(alg) => (
                format!("Generator {} unknown", alg),
                Some(serde_json::json!({ "algorithm": alg })),
            ),
            ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::MalformedInput(msg)
            | ApiError::StoreFailure(msg)
            | ApiError::GenerationFailure(msg)
            | ApiError::Internal(msg) => (msg, None),
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<FirewallError> for ApiError {
    fn from(err: FirewallError) -> Self {
        match err {
            FirewallError::Unauthorized(_) => ApiError::Unauthorized(err.to_string()),
            FirewallError::InsufficientScope(_) | FirewallError::Forbidden(_) => {
                ApiError::Forbidden(err.to_string())
            }
            FirewallError::Engine(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(msg) => ApiError::NotFound(msg),
            StorageError::Backend(_) => ApiError::StoreFailure(err.to_string()),
        }
    }
}

impl From<KeyError> for ApiError {
    fn from(err: KeyError) -> Self {
        match err {
            KeyError::UnknownAlgorithm(alg) => ApiError::UnknownAlgorithm(alg),
            KeyError::MalformedKey(_) | KeyError::MalformedKeySet(_) => {
                ApiError::MalformedInput(err.to_string())
            }
            KeyError::GenerationFailed(_) => ApiError::GenerationFailure(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::MalformedInput(format!("Invalid request body: {}", err))
    }
}
