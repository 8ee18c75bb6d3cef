// HTTP handlers for review endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use uuid::Uuid;

use crate::reviews::{ChefResponseRequest, Review, ReviewError, SubmitReviewRequest};

/// Handler for POST /api/bookings/{booking_id}/reviews
/// Submits a review for a completed booking
pub async fn submit_review_handler(
    State(state): State<crate::AppState>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<SubmitReviewRequest>,
) -> Result<(StatusCode, Json<Review>), ReviewError> {
    let review = state
        .reviews_service
        .submit_review(booking_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// Handler for GET /api/chefs/{chef_id}/reviews
/// Lists all reviews for a chef
pub async fn list_chef_reviews_handler(
    State(state): State<crate::AppState>,
    Path(chef_id): Path<i32>,
) -> Result<Json<Vec<Review>>, ReviewError> {
    let reviews = state.reviews_service.list_for_chef(chef_id).await?;
    Ok(Json(reviews))
}

/// Handler for PATCH /api/reviews/{review_id}/response
/// Records the chef's public response to a review
pub async fn respond_to_review_handler(
    State(state): State<crate::AppState>,
    Path(review_id): Path<i32>,
    Json(request): Json<ChefResponseRequest>,
) -> Result<Json<Review>, ReviewError> {
    let review = state
        .reviews_service
        .respond_to_review(review_id, request)
        .await?;
    Ok(Json(review))
}
