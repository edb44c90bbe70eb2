//! Error handling
//!
//! Every failure in the client is scoped to the operation that triggered it.
//! All of them render through one JSON surface carrying an explicit error
//! kind (`code`), so write failures are never silently swallowed.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Mapping-service failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    #[error("no geocoding match for '{0}'")]
    NoMatch(String),

    #[error("no route found between the given locations")]
    NoRoute,

    #[error("invalid route distance: {0}")]
    InvalidDistance(f64),

    #[error("mapping request failed: {0}")]
    Request(String),
}

/// Main application errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Session state is still loading")]
    SessionLoading,

    #[error("Data service error: {0}")]
    DataService(String),

    #[error("Mutation failed: {0}")]
    Mutation(String),

    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid input: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error body returned by every view
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    code: String,
}

impl AppError {
    /// Stable error kind, shown to the user alongside the message
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Auth(_) => "AUTH_FAILED",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::SessionLoading => "SESSION_LOADING",
            AppError::DataService(_) => "DATA_SERVICE_ERROR",
            AppError::Mutation(_) => "MUTATION_FAILED",
            AppError::Mapping(MappingError::NoMatch(_)) => "GEOCODING_NO_MATCH",
            AppError::Mapping(_) => "MAPPING_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Auth(_) | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::SessionLoading => StatusCode::SERVICE_UNAVAILABLE,
            AppError::DataService(_) | AppError::Mutation(_) => StatusCode::BAD_GATEWAY,
            AppError::Mapping(MappingError::Request(_)) => StatusCode::BAD_GATEWAY,
            AppError::Mapping(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            AppError::Auth(_) => "Authentication Error",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Forbidden(_) => "Forbidden",
            AppError::SessionLoading => "Loading",
            AppError::DataService(_) => "Data Service Error",
            AppError::Mutation(_) => "Mutation Error",
            AppError::Mapping(_) => "Mapping Error",
            AppError::Validation(_) => "Validation Error",
            AppError::BadRequest(_) => "Bad Request",
            AppError::NotFound(_) => "Not Found",
            AppError::Conflict(_) => "Conflict",
            AppError::Config(_) => "Configuration Error",
            AppError::Internal(_) => "Internal Error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            log::error!("❌ {}", self);
        } else {
            log::warn!("⚠️ {}", self);
        }

        let details = match &self {
            AppError::Validation(e) => Some(json!(e)),
            _ => None,
        };

        let body = ErrorResponse {
            error: self.title().to_string(),
            message: self.to_string(),
            details,
            code: self.code().to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::DataService(e.to_string())
    }
}

/// Typed result for fallible operations
pub type AppResult<T> = Result<T, AppError>;

/// Helper for missing resources
pub fn not_found_error(resource: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Helper for forbidden operations
pub fn forbidden_error(operation: &str, reason: &str) -> AppError {
    AppError::Forbidden(format!("Cannot {}: {}", operation, reason))
}

/// Helper for malformed input
pub fn bad_request_error(message: &str) -> AppError {
    AppError::BadRequest(message.to_string())
}
