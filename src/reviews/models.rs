use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A review left by a client after a completed booking
///
/// Only the overall `rating` feeds the chef's aggregate; the sub-scores are
/// display-only detail.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: i32,
    pub booking_id: Uuid,
    pub chef_id: i32,
    pub client_id: i32,
    pub rating: i16,
    pub food_quality: i16,
    pub professionalism: i16,
    pub cleanliness: i16,
    pub communication: i16,
    pub value_for_money: i16,
    pub comment: Option<String>,
    pub chef_response: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request DTO for submitting a review; the target booking comes from the
/// request path
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitReviewRequest {
    /// The reviewer; must be the client on the booking
    pub client_id: i32,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i16,
    #[validate(range(min = 1, max = 5, message = "Food quality must be between 1 and 5"))]
    pub food_quality: i16,
    #[validate(range(min = 1, max = 5, message = "Professionalism must be between 1 and 5"))]
    pub professionalism: i16,
    #[validate(range(min = 1, max = 5, message = "Cleanliness must be between 1 and 5"))]
    pub cleanliness: i16,
    #[validate(range(min = 1, max = 5, message = "Communication must be between 1 and 5"))]
    pub communication: i16,
    #[validate(range(min = 1, max = 5, message = "Value for money must be between 1 and 5"))]
    pub value_for_money: i16,
    #[validate(length(max = 2000, message = "Comment must not exceed 2000 characters"))]
    pub comment: Option<String>,
}

/// Request DTO for a chef's public response to a review
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChefResponseRequest {
    /// The responding chef; must be the chef named on the review
    pub chef_id: i32,
    #[validate(length(min = 1, max = 2000, message = "Response must be 1 to 2000 characters"))]
    pub response: String,
}
