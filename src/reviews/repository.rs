use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::bookings::Booking;
use crate::reviews::{Review, ReviewError, SubmitReviewRequest};

/// Repository for database operations on reviews
#[derive(Clone)]
pub struct ReviewsRepository {
    pool: PgPool,
}

impl ReviewsRepository {
    /// Create a new ReviewsRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Start a transaction on the underlying pool
    pub async fn begin(&self) -> Result<sqlx::Transaction<'static, sqlx::Postgres>, ReviewError> {
        Ok(self.pool.begin().await?)
    }

    /// Insert a review row
    ///
    /// Takes a connection so the insert composes with the rating
    /// recomputation in the caller's transaction. The unique constraint on
    /// (booking_id, client_id) surfaces as `DuplicateReview`.
    pub async fn insert(
        conn: &mut PgConnection,
        booking_id: Uuid,
        chef_id: i32,
        request: &SubmitReviewRequest,
    ) -> Result<Review, ReviewError> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (
                booking_id, chef_id, client_id,
                rating, food_quality, professionalism,
                cleanliness, communication, value_for_money, comment
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(booking_id)
        .bind(chef_id)
        .bind(request.client_id)
        .bind(request.rating)
        .bind(request.food_quality)
        .bind(request.professionalism)
        .bind(request.cleanliness)
        .bind(request.communication)
        .bind(request.value_for_money)
        .bind(&request.comment)
        .fetch_one(conn)
        .await?;

        Ok(review)
    }

    /// Find a review by ID
    pub async fn find_by_id(&self, id: i32) -> Result<Option<Review>, ReviewError> {
        let review = sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(review)
    }

    /// Find a review by booking and reviewer (for duplicate detection)
    pub async fn find_by_booking_and_client(
        &self,
        booking_id: Uuid,
        client_id: i32,
    ) -> Result<Option<Review>, ReviewError> {
        let review = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE booking_id = $1 AND client_id = $2",
        )
        .bind(booking_id)
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(review)
    }

    /// Find all reviews for a chef, newest first
    pub async fn find_by_chef(&self, chef_id: i32) -> Result<Vec<Review>, ReviewError> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE chef_id = $1 ORDER BY created_at DESC, id ASC",
        )
        .bind(chef_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    /// Record the chef's public response to a review
    pub async fn set_chef_response(
        &self,
        review_id: i32,
        response: &str,
    ) -> Result<Option<Review>, ReviewError> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            UPDATE reviews
            SET chef_response = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(review_id)
        .bind(response)
        .fetch_optional(&self.pool)
        .await?;

        Ok(review)
    }

    /// Fetch the booking a review targets
    pub async fn find_booking_by_id(
        &self,
        booking_id: Uuid,
    ) -> Result<Option<Booking>, ReviewError> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(booking)
    }
}
