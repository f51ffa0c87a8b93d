// HTTP API Error Types
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use crate::database::repository::StoreError;
use crate::database::DatabaseError;
use crate::hasher::HasherError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    // 400 Bad Request
    InvalidIdentifier(String),
    MissingRequiredField(String),
    DuplicateName(String),
    InvalidField(String),
    InvalidJson(String),

    // 404 Not Found
    NotFound,

    // 413 Payload Too Large
    PayloadTooLarge,

    // 408 Request Timeout
    RequestTimeout,

    // 500 Internal Server Error
    StoreFailure,

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingRequiredField(_) => StatusCode::BAD_REQUEST,
            ApiError::DuplicateName(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidField(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::StoreFailure => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> String {
        match self {
            ApiError::InvalidIdentifier(field) => format!("The `{}` is not valid", field),
            ApiError::MissingRequiredField(field) => format!("Missing `{}` in request body", field),
            ApiError::DuplicateName(subject) => format!("The {} already exists", subject),
            ApiError::InvalidField(msg) => msg.clone(),
            ApiError::InvalidJson(msg) => msg.clone(),
            ApiError::NotFound => "Not Found".to_string(),
            ApiError::PayloadTooLarge => "Request body is too large".to_string(),
            ApiError::RequestTimeout => "Request timed out".to_string(),
            ApiError::StoreFailure => "Internal Server Error".to_string(),
            ApiError::ServiceUnavailable(msg) => msg.clone(),
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::InvalidIdentifier(_) => "INVALID_IDENTIFIER",
            ApiError::MissingRequiredField(_) => "MISSING_REQUIRED_FIELD",
            ApiError::DuplicateName(_) => "DUPLICATE_NAME",
            ApiError::InvalidField(_) => "INVALID_FIELD",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::NotFound => "NOT_FOUND",
            ApiError::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ApiError::RequestTimeout => "REQUEST_TIMEOUT",
            ApiError::StoreFailure => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn invalid_id(field: impl Into<String>) -> Self {
        ApiError::InvalidIdentifier(field.into())
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        ApiError::MissingRequiredField(field.into())
    }

    /// `subject` is what collided, e.g. "folder name" or "username"
    pub fn duplicate(subject: impl Into<String>) -> Self {
        ApiError::DuplicateName(subject.into())
    }

    pub fn invalid_field(message: impl Into<String>) -> Self {
        ApiError::InvalidField(message.into())
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        // Never expose store details to clients
        tracing::error!("Store error: {}", err);
        ApiError::StoreFailure
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        tracing::error!("Database error: {}", err);
        ApiError::service_unavailable("Database temporarily unavailable")
    }
}

impl From<HasherError> for ApiError {
    fn from(err: HasherError) -> Self {
        tracing::error!("Password hasher error: {}", err);
        ApiError::StoreFailure
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::PayloadTooLarge;
        }
        ApiError::invalid_json(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!("Rejected query string: {}", rejection.body_text());
        ApiError::invalid_field(rejection.body_text())
    }
}

// The only path parameter is `:id`
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("Rejected path: {}", rejection.body_text());
        ApiError::invalid_id("id")
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
