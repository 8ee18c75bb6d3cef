use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error types for booking operations
///
/// `SlotFull`, `Conflict` and `Unavailable` are retryable with a fresh read;
/// everything else requires the caller to change the request.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Datastore temporarily unavailable")]
    Unavailable,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Invalid guest count: {0}")]
    InvalidGuestCount(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Availability slot is fully booked")]
    SlotFull,

    #[error("Concurrent modification detected: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<sqlx::Error> for BookingError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => BookingError::Unavailable,
            other => BookingError::DatabaseError(other.to_string()),
        }
    }
}

impl BookingError {
    /// True when a fresh read and retry may succeed without changing
    /// the request
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BookingError::SlotFull | BookingError::Conflict(_) | BookingError::Unavailable
        )
    }

    fn error_code(&self) -> &'static str {
        match self {
            BookingError::DatabaseError(_) => "DATABASE_ERROR",
            BookingError::Unavailable => "UNAVAILABLE",
            BookingError::NotFound(_) => "NOT_FOUND",
            BookingError::InvalidGuestCount(_) => "INVALID_GUEST_COUNT",
            BookingError::InvalidDuration(_) => "INVALID_DURATION",
            BookingError::SlotFull => "SLOT_FULL",
            BookingError::Conflict(_) => "CONFLICT",
            BookingError::Forbidden(_) => "FORBIDDEN",
            BookingError::InvalidTransition(_) => "INVALID_TRANSITION",
            BookingError::ValidationError(_) => "VALIDATION_ERROR",
        }
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let status = match &self {
            BookingError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            BookingError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            BookingError::NotFound(_) => StatusCode::NOT_FOUND,
            BookingError::InvalidGuestCount(_) | BookingError::InvalidDuration(_) => {
                StatusCode::BAD_REQUEST
            }
            BookingError::SlotFull | BookingError::Conflict(_) => StatusCode::CONFLICT,
            BookingError::Forbidden(_) => StatusCode::FORBIDDEN,
            BookingError::InvalidTransition(_) => StatusCode::UNPROCESSABLE_ENTITY,
            BookingError::ValidationError(_) => StatusCode::BAD_REQUEST,
        };

        let message = match &self {
            // No internal detail leaks to clients.
            BookingError::DatabaseError(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error_code": self.error_code(),
            "error": message,
            "retryable": self.is_retryable(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(BookingError::SlotFull.is_retryable());
        assert!(BookingError::Conflict("status changed".to_string()).is_retryable());
        assert!(BookingError::Unavailable.is_retryable());
        assert!(!BookingError::NotFound("Booking").is_retryable());
        assert!(!BookingError::Forbidden("not the chef".to_string()).is_retryable());
        assert!(!BookingError::InvalidTransition("completed is terminal".to_string())
            .is_retryable());
    }

    #[test]
    fn test_pool_timeout_maps_to_unavailable() {
        let err: BookingError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, BookingError::Unavailable));
    }

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = [
            BookingError::Unavailable,
            BookingError::NotFound("Booking"),
            BookingError::InvalidGuestCount("too many".to_string()),
            BookingError::InvalidDuration("end before start".to_string()),
            BookingError::SlotFull,
            BookingError::Conflict("version".to_string()),
            BookingError::Forbidden("nope".to_string()),
            BookingError::InvalidTransition("terminal".to_string()),
            BookingError::ValidationError("bad".to_string()),
        ];

        let mut codes: Vec<_> = errors.iter().map(|e| e.error_code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }
}
