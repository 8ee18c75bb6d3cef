use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error types for review operations
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Datastore temporarily unavailable")]
    Unavailable,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("This booking has already been reviewed")]
    DuplicateReview,

    #[error("Only completed bookings can be reviewed")]
    BookingNotCompleted,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<sqlx::Error> for ReviewError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::PoolTimedOut => return ReviewError::Unavailable,
            sqlx::Error::Database(db_err) => {
                // Unique constraint on (booking_id, client_id); the database
                // is the last line of defense against duplicate submissions.
                if db_err.code().as_deref() == Some("23505") {
                    return ReviewError::DuplicateReview;
                }
            }
            _ => {}
        }
        ReviewError::DatabaseError(err.to_string())
    }
}

impl ReviewError {
    fn error_code(&self) -> &'static str {
        match self {
            ReviewError::DatabaseError(_) => "DATABASE_ERROR",
            ReviewError::Unavailable => "UNAVAILABLE",
            ReviewError::NotFound(_) => "NOT_FOUND",
            ReviewError::DuplicateReview => "DUPLICATE_REVIEW",
            ReviewError::BookingNotCompleted => "BOOKING_NOT_COMPLETED",
            ReviewError::Forbidden(_) => "FORBIDDEN",
            ReviewError::ValidationError(_) => "VALIDATION_ERROR",
        }
    }
}

impl IntoResponse for ReviewError {
    fn into_response(self) -> Response {
        let status = match &self {
            ReviewError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ReviewError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ReviewError::NotFound(_) => StatusCode::NOT_FOUND,
            ReviewError::DuplicateReview => StatusCode::CONFLICT,
            ReviewError::BookingNotCompleted => StatusCode::UNPROCESSABLE_ENTITY,
            ReviewError::Forbidden(_) => StatusCode::FORBIDDEN,
            ReviewError::ValidationError(_) => StatusCode::BAD_REQUEST,
        };

        let message = match &self {
            ReviewError::DatabaseError(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error_code": self.error_code(),
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_maps_to_unavailable() {
        let err: ReviewError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, ReviewError::Unavailable));
    }

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = [
            ReviewError::Unavailable,
            ReviewError::NotFound("Review"),
            ReviewError::DuplicateReview,
            ReviewError::BookingNotCompleted,
            ReviewError::Forbidden("not the chef".to_string()),
            ReviewError::ValidationError("bad".to_string()),
        ];

        let mut codes: Vec<_> = errors.iter().map(|e| e.error_code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }
}
