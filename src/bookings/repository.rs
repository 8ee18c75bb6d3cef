use chrono::{NaiveDate, NaiveTime};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::bookings::error::BookingError;
use crate::bookings::pricing::PricingBreakdown;
use crate::bookings::{Booking, BookingStatus, PaymentStatus};
use crate::models::{ChefProfile, Menu};

/// Row data for a booking about to be inserted
///
/// The breakdown is the pricing calculator's output, captured verbatim.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub client_id: i32,
    pub chef_id: i32,
    pub menu_id: Option<i32>,
    pub slot_id: Option<i32>,
    pub event_date: NaiveDate,
    pub event_time: NaiveTime,
    pub duration_hours: i32,
    pub guest_count: i32,
    pub location_address: String,
    pub service_type: String,
    pub breakdown: PricingBreakdown,
}

/// Repository for chef and menu lookups needed when pricing a booking
#[derive(Clone)]
pub struct ChefLookupRepository {
    pool: PgPool,
}

impl ChefLookupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a chef profile by ID
    pub async fn find_chef_by_id(&self, chef_id: i32) -> Result<Option<ChefProfile>, BookingError> {
        let chef = sqlx::query_as::<_, ChefProfile>("SELECT * FROM chef_profiles WHERE id = $1")
            .bind(chef_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(chef)
    }

    /// Find a menu by ID
    pub async fn find_menu_by_id(&self, menu_id: i32) -> Result<Option<Menu>, BookingError> {
        let menu = sqlx::query_as::<_, Menu>("SELECT * FROM menus WHERE id = $1")
            .bind(menu_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(menu)
    }
}

/// Repository for booking persistence
#[derive(Clone)]
pub struct BookingsRepository {
    pool: PgPool,
}

impl BookingsRepository {
    /// Create a new BookingsRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Start a transaction on the underlying pool
    pub async fn begin(&self) -> Result<sqlx::Transaction<'static, sqlx::Postgres>, BookingError> {
        Ok(self.pool.begin().await?)
    }

    /// Insert a booking row
    ///
    /// Takes a connection rather than the pool so the insert composes with
    /// the slot reservation in the caller's transaction.
    pub async fn insert(
        conn: &mut PgConnection,
        new: &NewBooking,
    ) -> Result<Booking, BookingError> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (
                client_id, chef_id, menu_id, slot_id,
                event_date, event_time, duration_hours, guest_count,
                location_address, service_type,
                base_price, travel_fee, setup_fee, cleanup_fee,
                service_fee, platform_fee, total_price
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15, $16, $17)
            RETURNING *
            "#,
        )
        .bind(new.client_id)
        .bind(new.chef_id)
        .bind(new.menu_id)
        .bind(new.slot_id)
        .bind(new.event_date)
        .bind(new.event_time)
        .bind(new.duration_hours)
        .bind(new.guest_count)
        .bind(&new.location_address)
        .bind(&new.service_type)
        .bind(new.breakdown.base)
        .bind(new.breakdown.travel_fee)
        .bind(new.breakdown.setup_fee)
        .bind(new.breakdown.cleanup_fee)
        .bind(new.breakdown.service_fee)
        .bind(new.breakdown.platform_fee)
        .bind(new.breakdown.total)
        .fetch_one(conn)
        .await?;

        Ok(booking)
    }

    /// Find a booking by ID
    pub async fn find_by_id(&self, booking_id: Uuid) -> Result<Option<Booking>, BookingError> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(booking)
    }

    /// Find all bookings placed by a client, newest first
    pub async fn find_by_client(&self, client_id: i32) -> Result<Vec<Booking>, BookingError> {
        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE client_id = $1 ORDER BY created_at DESC, id ASC",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    /// Find all bookings addressed to a chef, newest first
    pub async fn find_by_chef(&self, chef_id: i32) -> Result<Vec<Booking>, BookingError> {
        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE chef_id = $1 ORDER BY created_at DESC, id ASC",
        )
        .bind(chef_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    /// Apply a status transition as a single guarded UPDATE
    ///
    /// The row is matched on both ID and the status the caller decided
    /// against, and the lifecycle timestamp for the new status is stamped in
    /// the same statement. `None` means the status changed underneath the
    /// caller; the service turns that into a conflict.
    pub async fn transition(
        conn: &mut PgConnection,
        booking_id: Uuid,
        expected: BookingStatus,
        to: BookingStatus,
        reason: Option<&str>,
    ) -> Result<Option<Booking>, BookingError> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET status = $3,
                cancellation_reason = COALESCE($4, cancellation_reason),
                confirmed_at = CASE WHEN $3 = 'confirmed' THEN NOW() ELSE confirmed_at END,
                completed_at = CASE WHEN $3 = 'completed' THEN NOW() ELSE completed_at END,
                cancelled_at = CASE WHEN $3 = 'cancelled' THEN NOW() ELSE cancelled_at END,
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(booking_id)
        .bind(expected)
        .bind(to)
        .bind(reason)
        .fetch_optional(conn)
        .await?;

        Ok(booking)
    }

    /// Record the payment state reported by the external processor
    ///
    /// Guarded on the payment status the caller decided against, mirroring
    /// `transition`; `None` means a concurrent payment update won.
    pub async fn update_payment(
        &self,
        booking_id: Uuid,
        expected: PaymentStatus,
        payment_status: PaymentStatus,
        payment_reference: Option<&str>,
    ) -> Result<Option<Booking>, BookingError> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET payment_status = $3,
                payment_reference = COALESCE($4, payment_reference),
                updated_at = NOW()
            WHERE id = $1 AND payment_status = $2
            RETURNING *
            "#,
        )
        .bind(booking_id)
        .bind(expected)
        .bind(payment_status)
        .bind(payment_reference)
        .fetch_optional(&self.pool)
        .await?;

        Ok(booking)
    }
}
