use uuid::Uuid;
use validator::Validate;

use crate::bookings::BookingStatus;
use crate::reviews::rating_aggregator::RatingAggregator;
use crate::reviews::repository::ReviewsRepository;
use crate::reviews::{ChefResponseRequest, Review, ReviewError, SubmitReviewRequest};

/// Service for review business logic
#[derive(Clone)]
pub struct ReviewsService {
    repository: ReviewsRepository,
}

impl ReviewsService {
    pub fn new(repository: ReviewsRepository) -> Self {
        Self { repository }
    }

    /// Submit a review for a completed booking
    ///
    /// The insert and the chef's rating recomputation commit atomically, so
    /// the aggregate never drifts from the review rows. A duplicate
    /// submission is caught early by a lookup and, under a race, by the
    /// unique constraint on (booking_id, client_id).
    pub async fn submit_review(
        &self,
        booking_id: Uuid,
        request: SubmitReviewRequest,
    ) -> Result<Review, ReviewError> {
        request
            .validate()
            .map_err(|e| ReviewError::ValidationError(e.to_string()))?;

        let booking = self
            .repository
            .find_booking_by_id(booking_id)
            .await?
            .ok_or(ReviewError::NotFound("Booking"))?;

        if request.client_id != booking.client_id {
            return Err(ReviewError::Forbidden(
                "Only the booking's client may review it".to_string(),
            ));
        }
        if booking.status != BookingStatus::Completed {
            return Err(ReviewError::BookingNotCompleted);
        }

        if self
            .repository
            .find_by_booking_and_client(booking_id, request.client_id)
            .await?
            .is_some()
        {
            return Err(ReviewError::DuplicateReview);
        }

        let mut tx = self.repository.begin().await?;
        let review =
            ReviewsRepository::insert(&mut tx, booking_id, booking.chef_id, &request).await?;
        let (average, count) = RatingAggregator::recalculate(&mut tx, booking.chef_id).await?;
        tx.commit().await?;

        tracing::info!(
            review_id = review.id,
            chef_id = booking.chef_id,
            rating = review.rating,
            new_average = ?average,
            total_reviews = count,
            "Review submitted"
        );
        Ok(review)
    }

    /// Record the chef's public response to a review
    ///
    /// A response may be set once and later replaced by the same chef.
    pub async fn respond_to_review(
        &self,
        review_id: i32,
        request: ChefResponseRequest,
    ) -> Result<Review, ReviewError> {
        request
            .validate()
            .map_err(|e| ReviewError::ValidationError(e.to_string()))?;

        let review = self
            .repository
            .find_by_id(review_id)
            .await?
            .ok_or(ReviewError::NotFound("Review"))?;

        if review.chef_id != request.chef_id {
            return Err(ReviewError::Forbidden(
                "Only the reviewed chef may respond".to_string(),
            ));
        }

        self.repository
            .set_chef_response(review_id, &request.response)
            .await?
            .ok_or(ReviewError::NotFound("Review"))
    }

    /// List all reviews for a chef, newest first
    pub async fn list_for_chef(&self, chef_id: i32) -> Result<Vec<Review>, ReviewError> {
        self.repository.find_by_chef(chef_id).await
    }
}
