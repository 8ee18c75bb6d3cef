use chrono::{Duration, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::bookings::error::BookingError;
use crate::bookings::ledger::AvailabilityLedger;
use crate::bookings::pricing::{
    PricingBreakdown, PricingCalculator, PricingInputs, Quantity, DEFAULT_PLATFORM_FEE_RATE,
    DEFAULT_SERVICE_FEE_RATE,
};
use crate::bookings::repository::{BookingsRepository, ChefLookupRepository, NewBooking};
use crate::bookings::status_machine::StatusMachine;
use crate::bookings::{
    ActorRole, Booking, BookingAction, CreateBookingRequest, PaymentStatus, QuoteRequest,
    RecordPaymentRequest, TransitionRequest,
};
use crate::models::ChefProfile;

pub const SERVICE_TYPE_TEACHING: &str = "cooking_and_teaching";

/// Service for booking business logic
///
/// Ties together the pricing calculator, the availability ledger and the
/// status machine; every multi-row mutation runs in one transaction.
#[derive(Clone)]
pub struct BookingsService {
    bookings: BookingsRepository,
    chefs: ChefLookupRepository,
}

impl BookingsService {
    pub fn new(bookings: BookingsRepository, chefs: ChefLookupRepository) -> Self {
        Self { bookings, chefs }
    }

    /// Produce an itemized quote without touching any booking state
    pub async fn quote(&self, request: QuoteRequest) -> Result<PricingBreakdown, BookingError> {
        request
            .validate()
            .map_err(|e| BookingError::ValidationError(e.to_string()))?;

        let chef = self
            .chefs
            .find_chef_by_id(request.chef_id)
            .await?
            .ok_or(BookingError::NotFound("Chef"))?;

        let quantity = Self::resolve_quantity(
            request.guest_count,
            request.start_time.zip(request.end_time),
            request.start_time.is_some() || request.end_time.is_some(),
        )?;

        if let Quantity::Guests(guests) = quantity {
            Self::check_guest_bounds(&chef, guests)?;
        }

        let unit_price = self
            .resolve_unit_price(&chef, request.menu_id, &request.service_type)
            .await?;

        PricingCalculator::quote(&Self::pricing_inputs(&chef, unit_price, quantity))
    }

    /// Create a booking: reserve slot capacity and insert the row in one
    /// transaction
    ///
    /// A lost slot reservation rolls the whole operation back, so a booking
    /// row never exists without its capacity unit.
    pub async fn create_booking(
        &self,
        request: CreateBookingRequest,
    ) -> Result<Booking, BookingError> {
        request
            .validate()
            .map_err(|e| BookingError::ValidationError(e.to_string()))?;

        let chef = self
            .chefs
            .find_chef_by_id(request.chef_id)
            .await?
            .ok_or(BookingError::NotFound("Chef"))?;

        if !chef.is_available {
            return Err(BookingError::ValidationError(
                "Chef is not accepting bookings".to_string(),
            ));
        }

        Self::check_guest_bounds(&chef, request.guest_count)?;

        let unit_price = self
            .resolve_unit_price(&chef, request.menu_id, &request.service_type)
            .await?;
        let breakdown = PricingCalculator::quote(&Self::pricing_inputs(
            &chef,
            unit_price,
            Quantity::Guests(request.guest_count),
        ))?;

        let mut tx = self.bookings.begin().await?;

        if let Some(slot_id) = request.slot_id {
            let expected_version = request.slot_version.ok_or_else(|| {
                BookingError::ValidationError(
                    "slot_version is required when booking a slot".to_string(),
                )
            })?;

            let slot = AvailabilityLedger::reserve(&mut tx, slot_id, expected_version).await?;

            if slot.chef_id != chef.id {
                return Err(BookingError::ValidationError(
                    "Slot does not belong to the requested chef".to_string(),
                ));
            }
            if slot.slot_date != request.event_date
                || request.event_time < slot.start_time
                || request.event_time >= slot.end_time
            {
                return Err(BookingError::ValidationError(
                    "Event does not fall within the availability slot".to_string(),
                ));
            }
        }

        let new = NewBooking {
            client_id: request.client_id,
            chef_id: request.chef_id,
            menu_id: request.menu_id,
            slot_id: request.slot_id,
            event_date: request.event_date,
            event_time: request.event_time,
            duration_hours: request.duration_hours,
            guest_count: request.guest_count,
            location_address: request.location_address.clone(),
            service_type: request.service_type.clone(),
            breakdown,
        };

        let booking = BookingsRepository::insert(&mut tx, &new).await?;
        tx.commit().await?;

        tracing::info!(
            booking_id = %booking.id,
            chef_id = booking.chef_id,
            total = %booking.total_price,
            "Created booking"
        );
        Ok(booking)
    }

    /// Apply a lifecycle action to a booking
    ///
    /// Permission and ownership are checked first, then the transition runs
    /// as a guarded UPDATE; the race loser gets a conflict rather than a
    /// double-applied transition. Slot capacity released by a decline or
    /// cancellation returns in the same transaction.
    pub async fn transition(
        &self,
        booking_id: Uuid,
        request: TransitionRequest,
    ) -> Result<Booking, BookingError> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(BookingError::NotFound("Booking"))?;

        let to = StatusMachine::apply(booking.status, request.action, request.actor_role)?;
        Self::check_ownership(&booking, request.actor_id, request.actor_role)?;

        if request.action == BookingAction::Complete {
            Self::check_event_has_ended(&booking)?;
        }
        if request.action == BookingAction::Cancel {
            Self::check_event_not_started(&booking)?;
        }

        let mut tx = self.bookings.begin().await?;

        let updated = BookingsRepository::transition(
            &mut tx,
            booking_id,
            booking.status,
            to,
            request.reason.as_deref(),
        )
        .await?
        .ok_or_else(|| {
            BookingError::Conflict(format!(
                "Booking {} is no longer {}, re-read and retry",
                booking_id, booking.status
            ))
        })?;

        if StatusMachine::releases_slot(request.action) {
            if let Some(slot_id) = booking.slot_id {
                AvailabilityLedger::release(&mut tx, slot_id).await?;
            }
        }

        tx.commit().await?;

        tracing::info!(
            booking_id = %booking_id,
            from = %booking.status,
            to = %updated.status,
            actor_role = %request.actor_role,
            "Booking transitioned"
        );
        Ok(updated)
    }

    /// Record the payment state reported by the external processor
    ///
    /// Payment moves pending → paid → refunded only; the same guarded-UPDATE
    /// pattern as status transitions protects against duplicate reports.
    pub async fn record_payment(
        &self,
        booking_id: Uuid,
        request: RecordPaymentRequest,
    ) -> Result<Booking, BookingError> {
        request
            .validate()
            .map_err(|e| BookingError::ValidationError(e.to_string()))?;

        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(BookingError::NotFound("Booking"))?;

        let valid = matches!(
            (booking.payment_status, request.payment_status),
            (PaymentStatus::Pending, PaymentStatus::Paid)
                | (PaymentStatus::Paid, PaymentStatus::Refunded)
        );
        if !valid {
            return Err(BookingError::InvalidTransition(format!(
                "Invalid payment transition from {} to {}",
                booking.payment_status, request.payment_status
            )));
        }

        self.bookings
            .update_payment(
                booking_id,
                booking.payment_status,
                request.payment_status,
                request.payment_reference.as_deref(),
            )
            .await?
            .ok_or_else(|| {
                BookingError::Conflict(format!(
                    "Payment state of booking {} changed concurrently",
                    booking_id
                ))
            })
    }

    /// Fetch a single booking
    pub async fn get_booking(&self, booking_id: Uuid) -> Result<Booking, BookingError> {
        self.bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(BookingError::NotFound("Booking"))
    }

    /// List a client's bookings, newest first
    pub async fn list_for_client(&self, client_id: i32) -> Result<Vec<Booking>, BookingError> {
        self.bookings.find_by_client(client_id).await
    }

    /// List a chef's incoming bookings, newest first
    pub async fn list_for_chef(&self, chef_id: i32) -> Result<Vec<Booking>, BookingError> {
        self.bookings.find_by_chef(chef_id).await
    }

    /// Resolve the per-unit price: menu override over the chef's base price,
    /// plus the teaching surcharge when the booking includes lessons
    async fn resolve_unit_price(
        &self,
        chef: &ChefProfile,
        menu_id: Option<i32>,
        service_type: &str,
    ) -> Result<Decimal, BookingError> {
        let mut unit_price = chef.base_price_per_person;

        if let Some(menu_id) = menu_id {
            let menu = self
                .chefs
                .find_menu_by_id(menu_id)
                .await?
                .ok_or(BookingError::NotFound("Menu"))?;
            if menu.chef_id != chef.id {
                return Err(BookingError::ValidationError(
                    "Menu does not belong to the requested chef".to_string(),
                ));
            }
            if let Some(menu_price) = menu.price_per_person {
                unit_price = menu_price;
            }
        }

        if service_type == SERVICE_TYPE_TEACHING {
            if !chef.offers_teaching {
                return Err(BookingError::ValidationError(
                    "Chef does not offer cooking lessons".to_string(),
                ));
            }
            unit_price += chef.teaching_price_per_person.unwrap_or(Decimal::ZERO);
        }

        Ok(unit_price)
    }

    fn pricing_inputs(chef: &ChefProfile, unit_price: Decimal, quantity: Quantity) -> PricingInputs {
        PricingInputs {
            unit_price,
            quantity,
            travel_fee: chef.travel_fee,
            setup_fee: chef.setup_fee,
            cleanup_fee: chef.cleanup_fee,
            service_fee_rate: DEFAULT_SERVICE_FEE_RATE,
            platform_fee_rate: DEFAULT_PLATFORM_FEE_RATE,
        }
    }

    /// Exactly one of the head count or the time range must be supplied
    fn resolve_quantity(
        guest_count: Option<i32>,
        range: Option<(chrono::NaiveTime, chrono::NaiveTime)>,
        any_time_given: bool,
    ) -> Result<Quantity, BookingError> {
        match (guest_count, range) {
            (Some(_), _) if any_time_given => Err(BookingError::ValidationError(
                "Provide either guest_count or a time range, not both".to_string(),
            )),
            (Some(guests), None) => Ok(Quantity::Guests(guests)),
            (None, Some((start, end))) => Ok(Quantity::Hours { start, end }),
            _ => Err(BookingError::ValidationError(
                "Provide guest_count, or both start_time and end_time".to_string(),
            )),
        }
    }

    fn check_guest_bounds(chef: &ChefProfile, guests: i32) -> Result<(), BookingError> {
        if guests < chef.min_guests || guests > chef.max_guests {
            return Err(BookingError::InvalidGuestCount(format!(
                "Chef accepts between {} and {} guests, got {}",
                chef.min_guests, chef.max_guests, guests
            )));
        }
        Ok(())
    }

    /// Chef actions must come from the booked chef, client actions from the
    /// booking's client; the system actor is trusted by construction
    fn check_ownership(
        booking: &Booking,
        actor_id: i32,
        role: ActorRole,
    ) -> Result<(), BookingError> {
        let owned = match role {
            ActorRole::Chef => actor_id == booking.chef_id,
            ActorRole::Client => actor_id == booking.client_id,
            ActorRole::System => true,
        };
        if !owned {
            return Err(BookingError::Forbidden(
                "Actor is not a party to this booking".to_string(),
            ));
        }
        Ok(())
    }

    /// Cancellation is only open before the event; once it has started the
    /// booking must run to completion (or be declined while still pending)
    fn check_event_not_started(booking: &Booking) -> Result<(), BookingError> {
        let event_start = NaiveDateTime::new(booking.event_date, booking.event_time);
        if Utc::now().naive_utc() >= event_start {
            return Err(BookingError::InvalidTransition(format!(
                "Booking cannot be cancelled once the event has started at {}",
                event_start
            )));
        }
        Ok(())
    }

    /// Completion is only meaningful once the event window has passed
    fn check_event_has_ended(booking: &Booking) -> Result<(), BookingError> {
        let event_end = NaiveDateTime::new(booking.event_date, booking.event_time)
            + Duration::hours(i64::from(booking.duration_hours));
        if Utc::now().naive_utc() < event_end {
            return Err(BookingError::InvalidTransition(format!(
                "Booking cannot be completed before the event ends at {}",
                event_end
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal_macros::dec;

    fn sample_chef() -> ChefProfile {
        ChefProfile {
            id: 1,
            user_id: 42,
            bio: None,
            cuisine_types: Some("Persian".to_string()),
            service_areas: Some("Vancouver".to_string()),
            base_price_per_person: dec!(40.00),
            teaching_price_per_person: Some(dec!(15.00)),
            travel_fee: dec!(0),
            setup_fee: dec!(20.00),
            cleanup_fee: dec!(10.00),
            min_guests: 2,
            max_guests: 20,
            is_available: true,
            offers_teaching: true,
            rating: None,
            total_reviews: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_booking(status: crate::bookings::BookingStatus) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            client_id: 5,
            chef_id: 1,
            menu_id: None,
            slot_id: None,
            event_date: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
            event_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            duration_hours: 3,
            guest_count: 8,
            location_address: "123 Main St".to_string(),
            service_type: "cooking_only".to_string(),
            base_price: dec!(320.00),
            travel_fee: dec!(0),
            setup_fee: dec!(20.00),
            cleanup_fee: dec!(10.00),
            service_fee: dec!(32.00),
            platform_fee: dec!(48.00),
            total_price: dec!(430.00),
            status,
            payment_status: PaymentStatus::Pending,
            payment_reference: None,
            cancellation_reason: None,
            confirmed_at: None,
            completed_at: None,
            cancelled_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_guest_bounds_enforced() {
        let chef = sample_chef();
        assert!(BookingsService::check_guest_bounds(&chef, 2).is_ok());
        assert!(BookingsService::check_guest_bounds(&chef, 20).is_ok());
        assert!(matches!(
            BookingsService::check_guest_bounds(&chef, 1),
            Err(BookingError::InvalidGuestCount(_))
        ));
        assert!(matches!(
            BookingsService::check_guest_bounds(&chef, 21),
            Err(BookingError::InvalidGuestCount(_))
        ));
    }

    #[test]
    fn test_quantity_requires_exactly_one_mode() {
        let start = NaiveTime::from_hms_opt(18, 0, 0).unwrap();
        let end = NaiveTime::from_hms_opt(21, 0, 0).unwrap();

        assert!(matches!(
            BookingsService::resolve_quantity(Some(8), Some((start, end)), true),
            Err(BookingError::ValidationError(_))
        ));
        assert!(matches!(
            BookingsService::resolve_quantity(None, None, false),
            Err(BookingError::ValidationError(_))
        ));
        assert_eq!(
            BookingsService::resolve_quantity(Some(8), None, false).unwrap(),
            Quantity::Guests(8)
        );
        assert_eq!(
            BookingsService::resolve_quantity(None, Some((start, end)), true).unwrap(),
            Quantity::Hours { start, end }
        );
    }

    #[test]
    fn test_only_one_time_bound_is_rejected() {
        // start_time without end_time: zip() yields no range.
        assert!(matches!(
            BookingsService::resolve_quantity(None, None, true),
            Err(BookingError::ValidationError(_))
        ));
    }

    #[test]
    fn test_ownership_checks() {
        let booking = sample_booking(crate::bookings::BookingStatus::Pending);

        assert!(BookingsService::check_ownership(&booking, 1, ActorRole::Chef).is_ok());
        assert!(BookingsService::check_ownership(&booking, 5, ActorRole::Client).is_ok());
        assert!(BookingsService::check_ownership(&booking, 99, ActorRole::System).is_ok());
        assert!(matches!(
            BookingsService::check_ownership(&booking, 2, ActorRole::Chef),
            Err(BookingError::Forbidden(_))
        ));
        assert!(matches!(
            BookingsService::check_ownership(&booking, 1, ActorRole::Client),
            Err(BookingError::Forbidden(_))
        ));
    }

    #[test]
    fn test_cancel_blocked_after_event_start() {
        let mut booking = sample_booking(crate::bookings::BookingStatus::Confirmed);
        booking.event_date = (Utc::now() - Duration::days(2)).date_naive();

        assert!(matches!(
            BookingsService::check_event_not_started(&booking),
            Err(BookingError::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_cancel_allowed_before_event_start() {
        let mut booking = sample_booking(crate::bookings::BookingStatus::Confirmed);
        booking.event_date = (Utc::now() + Duration::days(30)).date_naive();

        assert!(BookingsService::check_event_not_started(&booking).is_ok());
    }

    #[test]
    fn test_complete_blocked_before_event_end() {
        let mut booking = sample_booking(crate::bookings::BookingStatus::Confirmed);
        booking.event_date = (Utc::now() + Duration::days(30)).date_naive();

        assert!(matches!(
            BookingsService::check_event_has_ended(&booking),
            Err(BookingError::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_complete_allowed_after_event_end() {
        let mut booking = sample_booking(crate::bookings::BookingStatus::Confirmed);
        booking.event_date = (Utc::now() - Duration::days(2)).date_naive();

        assert!(BookingsService::check_event_has_ended(&booking).is_ok());
    }
}
