// HTTP handlers for booking endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::bookings::pricing::PricingBreakdown;
use crate::bookings::{
    Booking, BookingError, CreateBookingRequest, QuoteRequest, RecordPaymentRequest,
    TransitionRequest,
};

/// Query parameters for listing bookings
///
/// Exactly one of `client_id` or `chef_id` selects whose bookings to list.
#[derive(Debug, Deserialize)]
pub struct BookingListQuery {
    pub client_id: Option<i32>,
    pub chef_id: Option<i32>,
}

/// Handler for POST /api/quotes
/// Computes an itemized price quote without creating anything
pub async fn quote_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<PricingBreakdown>, BookingError> {
    let breakdown = state.bookings_service.quote(request).await?;
    Ok(Json(breakdown))
}

/// Handler for POST /api/bookings
/// Creates a booking, reserving slot capacity when a slot is named
pub async fn create_booking_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), BookingError> {
    let booking = state.bookings_service.create_booking(request).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// Handler for GET /api/bookings/{booking_id}
pub async fn get_booking_handler(
    State(state): State<crate::AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>, BookingError> {
    let booking = state.bookings_service.get_booking(booking_id).await?;
    Ok(Json(booking))
}

/// Handler for GET /api/bookings
/// Lists bookings for a client or for a chef
pub async fn list_bookings_handler(
    State(state): State<crate::AppState>,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<Vec<Booking>>, BookingError> {
    let bookings = match (query.client_id, query.chef_id) {
        (Some(client_id), None) => state.bookings_service.list_for_client(client_id).await?,
        (None, Some(chef_id)) => state.bookings_service.list_for_chef(chef_id).await?,
        _ => {
            return Err(BookingError::ValidationError(
                "Provide exactly one of client_id or chef_id".to_string(),
            ))
        }
    };

    Ok(Json(bookings))
}

/// Handler for POST /api/bookings/{booking_id}/transition
/// Applies a lifecycle action (confirm, decline, complete, cancel)
pub async fn transition_booking_handler(
    State(state): State<crate::AppState>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<Booking>, BookingError> {
    let booking = state.bookings_service.transition(booking_id, request).await?;
    Ok(Json(booking))
}

/// Handler for PATCH /api/bookings/{booking_id}/payment
/// Records the payment state reported by the external processor
pub async fn record_payment_handler(
    State(state): State<crate::AppState>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<Json<Booking>, BookingError> {
    let booking = state
        .bookings_service
        .record_payment(booking_id, request)
        .await?;
    Ok(Json(booking))
}
