// Error handling module for the catalog surface
// Provides centralized error types and HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, warn};

/// Error type for catalog handlers
///
/// Each variant maps to a specific HTTP status code and error response format.
/// Booking and review subsystems carry their own error enums; this covers the
/// chef/menu/slot surface.
#[derive(Debug)]
pub enum ApiError {
    /// Validation errors from request validation
    /// Maps to HTTP 400 Bad Request
    ValidationError(validator::ValidationErrors),

    /// Resource not found by ID
    /// Maps to HTTP 404 Not Found
    NotFound { resource: String, id: String },

    /// Write against an entity the caller does not own
    /// Maps to HTTP 403 Forbidden
    Forbidden { message: String },

    /// Contended or capacity-violating write (e.g. deleting a slot that
    /// still holds reservations)
    /// Maps to HTTP 409 Conflict
    Conflict { message: String },

    /// Datastore acquisition timed out; retryable by the caller
    /// Maps to HTTP 503 Service Unavailable
    Unavailable,

    /// Database operation errors
    /// Maps to HTTP 500; sensitive details are filtered from client responses
    DatabaseError(sqlx::Error),
}

/// Consistent error response structure
///
/// Provides both a machine-readable `error_code` and a human-readable
/// `message`; `retryable` tells the caller whether a fresh attempt can
/// succeed without changing the request.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error_code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub retryable: bool,
    /// ISO 8601 timestamp of when the error occurred
    pub timestamp: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = self.to_error_response();
        (status, Json(error_response)).into_response()
    }
}

impl ApiError {
    fn to_error_response(&self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::ValidationError(errors) => {
                debug!("Validation error: {:?}", errors);

                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error_code: "VALIDATION_ERROR".to_string(),
                        message: "Request validation failed".to_string(),
                        details: Some(
                            serde_json::to_value(errors).unwrap_or(serde_json::json!({})),
                        ),
                        retryable: false,
                        timestamp: Utc::now().to_rfc3339(),
                    },
                )
            }
            ApiError::NotFound { resource, id } => {
                debug!("Resource not found: {} with id {}", resource, id);

                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse {
                        error_code: "NOT_FOUND".to_string(),
                        message: format!("{} with id {} not found", resource, id),
                        details: None,
                        retryable: false,
                        timestamp: Utc::now().to_rfc3339(),
                    },
                )
            }
            ApiError::Forbidden { message } => {
                warn!("Forbidden catalog write: {}", message);

                (
                    StatusCode::FORBIDDEN,
                    ErrorResponse {
                        error_code: "FORBIDDEN".to_string(),
                        message: message.clone(),
                        details: None,
                        retryable: false,
                        timestamp: Utc::now().to_rfc3339(),
                    },
                )
            }
            ApiError::Conflict { message } => {
                warn!("Conflict error: {}", message);

                (
                    StatusCode::CONFLICT,
                    ErrorResponse {
                        error_code: "CONFLICT".to_string(),
                        message: message.clone(),
                        details: None,
                        retryable: true,
                        timestamp: Utc::now().to_rfc3339(),
                    },
                )
            }
            ApiError::Unavailable => {
                warn!("Datastore acquisition timed out");

                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorResponse {
                        error_code: "UNAVAILABLE".to_string(),
                        message: "Datastore temporarily unavailable, retry the request"
                            .to_string(),
                        details: None,
                        retryable: true,
                        timestamp: Utc::now().to_rfc3339(),
                    },
                )
            }
            ApiError::DatabaseError(db_error) => {
                // Log the full database error internally; clients get a
                // generic message with no sensitive detail.
                error!("Database error: {:?}", db_error);

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error_code: "DATABASE_ERROR".to_string(),
                        message: "A database error occurred".to_string(),
                        details: None,
                        retryable: false,
                        timestamp: Utc::now().to_rfc3339(),
                    },
                )
            }
        }
    }

    /// Build a single-field validation error with a dynamic message
    ///
    /// For cross-field checks the derive macro cannot express, like
    /// `min_guests <= max_guests`.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        let mut error = validator::ValidationError::new(field);
        error.message = Some(std::borrow::Cow::Owned(message.into()));

        let mut errors = validator::ValidationErrors::new();
        errors.add(field, error);
        ApiError::ValidationError(errors)
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convert sqlx errors to ApiError
///
/// Pool acquisition timeouts become the retryable `Unavailable` variant;
/// everything else is an internal database error.
impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::PoolTimedOut => ApiError::Unavailable,
            other => ApiError::DatabaseError(other),
        }
    }
}

/// Convert validator errors to ApiError
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::NotFound {
                resource: "ChefProfile".to_string(),
                id: "7".to_string()
            }
            .status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Forbidden {
                message: "not the owner".to_string()
            }
            .status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Conflict {
                message: "slot has reservations".to_string()
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(ApiError::Unavailable.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_pool_timeout_maps_to_unavailable() {
        let err: ApiError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, ApiError::Unavailable));
    }

    #[test]
    fn test_validation_helper_carries_message() {
        let err = ApiError::validation("min_guests", "min_guests cannot exceed max_guests");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        match err {
            ApiError::ValidationError(errors) => {
                assert!(errors.field_errors().contains_key("min_guests"));
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }
}
