use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Booking status enum representing the lifecycle of a booking
///
/// `Completed` and `Cancelled` are terminal; no transition leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// True for states that admit no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }
}

impl Default for BookingStatus {
    fn default() -> Self {
        BookingStatus::Pending
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment status, an independent sub-state of the booking
///
/// Payment capture itself is an external collaborator; the engine records
/// the state and an opaque processor reference only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Role of the actor requesting a transition, as established by the session
/// layer outside this engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    Client,
    Chef,
    System,
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ActorRole::Client => "client",
            ActorRole::Chef => "chef",
            ActorRole::System => "system",
        };
        write!(f, "{}", s)
    }
}

/// Lifecycle actions an actor can request on a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingAction {
    Confirm,
    Decline,
    Complete,
    Cancel,
}

impl std::fmt::Display for BookingAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BookingAction::Confirm => "confirm",
            BookingAction::Decline => "decline",
            BookingAction::Complete => "complete",
            BookingAction::Cancel => "cancel",
        };
        write!(f, "{}", s)
    }
}

/// Domain model representing a booking row
///
/// The cost breakdown columns are captured once at creation from the pricing
/// calculator and never recomputed, so later fee-schedule changes cannot
/// alter historical bookings.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
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
    pub base_price: Decimal,
    pub travel_fee: Decimal,
    pub setup_fee: Decimal,
    pub cleanup_fee: Decimal,
    pub service_fee: Decimal,
    pub platform_fee: Decimal,
    pub total_price: Decimal,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub payment_reference: Option<String>,
    pub cancellation_reason: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for requesting a price quote
///
/// Exactly one of `guest_count` (per-person pricing) or the
/// `start_time`/`end_time` pair (hourly pricing) must be supplied.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct QuoteRequest {
    pub chef_id: i32,
    #[validate(range(min = 1, message = "Guest count must be at least 1"))]
    pub guest_count: Option<i32>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub menu_id: Option<i32>,
    #[serde(default = "default_service_type")]
    #[validate(custom = "crate::validation::validate_service_type")]
    pub service_type: String,
}

pub(crate) fn default_service_type() -> String {
    "cooking_only".to_string()
}

/// Request DTO for creating a booking
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub client_id: i32,
    pub chef_id: i32,
    pub menu_id: Option<i32>,
    /// Declared availability slot to reserve; ad hoc bookings omit it and
    /// receive no capacity enforcement
    pub slot_id: Option<i32>,
    /// Version of the slot as read by the client, for optimistic concurrency
    pub slot_version: Option<i32>,
    pub event_date: NaiveDate,
    pub event_time: NaiveTime,
    #[validate(range(min = 1, max = 12, message = "Duration must be between 1 and 12 hours"))]
    #[serde(default = "default_duration_hours")]
    pub duration_hours: i32,
    #[validate(range(min = 1, message = "Guest count must be at least 1"))]
    pub guest_count: i32,
    #[validate(length(min = 1, message = "Location address is required"))]
    pub location_address: String,
    #[serde(default = "default_service_type")]
    #[validate(custom = "crate::validation::validate_service_type")]
    pub service_type: String,
}

fn default_duration_hours() -> i32 {
    3
}

/// Request DTO for a lifecycle transition
#[derive(Debug, Clone, Deserialize)]
pub struct TransitionRequest {
    pub actor_id: i32,
    pub actor_role: ActorRole,
    pub action: BookingAction,
    /// Recorded on cancellation/decline
    pub reason: Option<String>,
}

/// Request DTO for recording payment state reported by the processor
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordPaymentRequest {
    pub payment_status: PaymentStatus,
    #[validate(length(max = 200, message = "Payment reference must not exceed 200 characters"))]
    pub payment_reference: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!BookingStatus::Pending.is_terminal());
        assert!(!BookingStatus::Confirmed.is_terminal());
        assert!(BookingStatus::Completed.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(BookingStatus::Pending).unwrap(),
            serde_json::json!("pending")
        );
        assert_eq!(
            serde_json::to_value(PaymentStatus::Refunded).unwrap(),
            serde_json::json!("refunded")
        );
    }

    #[test]
    fn test_transition_request_deserializes() {
        let json = serde_json::json!({
            "actor_id": 7,
            "actor_role": "chef",
            "action": "confirm"
        });

        let request: TransitionRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.actor_role, ActorRole::Chef);
        assert_eq!(request.action, BookingAction::Confirm);
        assert!(request.reason.is_none());
    }

    #[test]
    fn test_create_booking_request_defaults() {
        let json = serde_json::json!({
            "client_id": 5,
            "chef_id": 1,
            "event_date": "2026-09-12",
            "event_time": "18:00:00",
            "guest_count": 8,
            "location_address": "123 Main St"
        });

        let request: CreateBookingRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.duration_hours, 3);
        assert_eq!(request.service_type, "cooking_only");
        assert!(request.slot_id.is_none());
    }
}
