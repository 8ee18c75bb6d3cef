use chrono::NaiveTime;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::bookings::BookingError;

/// Default service fee rate (10%)
pub const DEFAULT_SERVICE_FEE_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Default platform fee rate (15%)
pub const DEFAULT_PLATFORM_FEE_RATE: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

/// Billable quantity: either a head count or an elapsed time range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    /// Per-person pricing
    Guests(i32),
    /// Hourly pricing over a time range; elapsed hours are computed from the
    /// range truncated to minute precision
    Hours { start: NaiveTime, end: NaiveTime },
}

/// Inputs to a price quote
#[derive(Debug, Clone)]
pub struct PricingInputs {
    pub unit_price: Decimal,
    pub quantity: Quantity,
    pub travel_fee: Decimal,
    pub setup_fee: Decimal,
    pub cleanup_fee: Decimal,
    pub service_fee_rate: Decimal,
    pub platform_fee_rate: Decimal,
}

/// Itemized cost breakdown
///
/// Each line item is independently rounded to 2 decimal places before the
/// total is summed, so `total` is always reproducible from the displayed
/// components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricingBreakdown {
    pub base: Decimal,
    pub travel_fee: Decimal,
    pub setup_fee: Decimal,
    pub cleanup_fee: Decimal,
    pub service_fee: Decimal,
    pub platform_fee: Decimal,
    pub total: Decimal,
}

/// Pure pricing calculator; no side effects, no I/O
pub struct PricingCalculator;

impl PricingCalculator {
    /// Compute an itemized cost breakdown from catalog data and booking
    /// parameters
    ///
    /// All monetary arithmetic is fixed-point `Decimal`; every component is
    /// rounded to 2 decimals with banker's rounding before summing.
    pub fn quote(inputs: &PricingInputs) -> Result<PricingBreakdown, BookingError> {
        let quantity = Self::billable_quantity(inputs.quantity)?;

        let base = Self::round(inputs.unit_price * quantity);
        let travel_fee = Self::round(inputs.travel_fee);
        let setup_fee = Self::round(inputs.setup_fee);
        let cleanup_fee = Self::round(inputs.cleanup_fee);
        let service_fee = Self::round(base * inputs.service_fee_rate);
        let platform_fee = Self::round(base * inputs.platform_fee_rate);

        let total = base + travel_fee + setup_fee + cleanup_fee + service_fee + platform_fee;

        Ok(PricingBreakdown {
            base,
            travel_fee,
            setup_fee,
            cleanup_fee,
            service_fee,
            platform_fee,
            total,
        })
    }

    /// Resolve the billable quantity to a decimal multiplier
    ///
    /// Hourly ranges are truncated to minute precision; an empty or inverted
    /// range is rejected rather than clamped.
    fn billable_quantity(quantity: Quantity) -> Result<Decimal, BookingError> {
        match quantity {
            Quantity::Guests(guests) => {
                if guests < 1 {
                    return Err(BookingError::InvalidGuestCount(format!(
                        "Guest count must be at least 1, got {}",
                        guests
                    )));
                }
                Ok(Decimal::from(guests))
            }
            Quantity::Hours { start, end } => {
                if end <= start {
                    return Err(BookingError::InvalidDuration(format!(
                        "End time {} must be after start time {}",
                        end, start
                    )));
                }
                let minutes = (end - start).num_minutes();
                Ok(Decimal::from(minutes) / Decimal::from(60))
            }
        }
    }

    /// Round to 2 decimal places using banker's rounding
    fn round(value: Decimal) -> Decimal {
        value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn per_person_inputs(unit_price: Decimal, guests: i32) -> PricingInputs {
        PricingInputs {
            unit_price,
            quantity: Quantity::Guests(guests),
            travel_fee: dec!(0),
            setup_fee: dec!(0),
            cleanup_fee: dec!(0),
            service_fee_rate: DEFAULT_SERVICE_FEE_RATE,
            platform_fee_rate: DEFAULT_PLATFORM_FEE_RATE,
        }
    }

    #[test]
    fn test_default_rates() {
        assert_eq!(DEFAULT_SERVICE_FEE_RATE, dec!(0.10));
        assert_eq!(DEFAULT_PLATFORM_FEE_RATE, dec!(0.15));
    }

    #[test]
    fn test_reference_scenario() {
        // 40.00/person, 20 guests, setup 20, cleanup 10, no travel.
        let inputs = PricingInputs {
            unit_price: dec!(40.00),
            quantity: Quantity::Guests(20),
            travel_fee: dec!(0),
            setup_fee: dec!(20),
            cleanup_fee: dec!(10),
            service_fee_rate: dec!(0.10),
            platform_fee_rate: dec!(0.15),
        };

        let breakdown = PricingCalculator::quote(&inputs).unwrap();
        assert_eq!(breakdown.base, dec!(800.00));
        assert_eq!(breakdown.service_fee, dec!(80.00));
        assert_eq!(breakdown.platform_fee, dec!(120.00));
        assert_eq!(breakdown.total, dec!(1030.00));
    }

    #[test]
    fn test_total_equals_sum_of_components() {
        let inputs = PricingInputs {
            unit_price: dec!(33.33),
            quantity: Quantity::Guests(7),
            travel_fee: dec!(12.49),
            setup_fee: dec!(5.55),
            cleanup_fee: dec!(7.77),
            service_fee_rate: dec!(0.10),
            platform_fee_rate: dec!(0.15),
        };

        let b = PricingCalculator::quote(&inputs).unwrap();
        assert_eq!(
            b.total,
            b.base + b.travel_fee + b.setup_fee + b.cleanup_fee + b.service_fee + b.platform_fee
        );
    }

    #[test]
    fn test_bankers_rounding_on_fee_components() {
        // base = 1.25, 10% = 0.125, a midpoint, rounds to the even 0.12;
        // 15% = 0.1875 is not a midpoint and rounds up to 0.19.
        let inputs = per_person_inputs(dec!(1.25), 1);
        let b = PricingCalculator::quote(&inputs).unwrap();

        assert_eq!(b.service_fee, dec!(0.12));
        assert_eq!(b.platform_fee, dec!(0.19));
    }

    #[test]
    fn test_hourly_quantity_truncates_to_minutes() {
        let inputs = PricingInputs {
            unit_price: dec!(60.00),
            quantity: Quantity::Hours {
                start: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
                end: NaiveTime::from_hms_opt(20, 30, 59).unwrap(),
            },
            travel_fee: dec!(0),
            setup_fee: dec!(0),
            cleanup_fee: dec!(0),
            service_fee_rate: dec!(0),
            platform_fee_rate: dec!(0),
        };

        // 2h30m59s truncates to 150 minutes = 2.5 hours.
        let b = PricingCalculator::quote(&inputs).unwrap();
        assert_eq!(b.base, dec!(150.00));
        assert_eq!(b.total, dec!(150.00));
    }

    #[test]
    fn test_empty_range_is_invalid_duration() {
        let start = NaiveTime::from_hms_opt(18, 0, 0).unwrap();
        let inputs = PricingInputs {
            unit_price: dec!(60.00),
            quantity: Quantity::Hours { start, end: start },
            travel_fee: dec!(0),
            setup_fee: dec!(0),
            cleanup_fee: dec!(0),
            service_fee_rate: dec!(0.10),
            platform_fee_rate: dec!(0.15),
        };

        assert!(matches!(
            PricingCalculator::quote(&inputs),
            Err(BookingError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_inverted_range_is_invalid_duration() {
        let inputs = PricingInputs {
            unit_price: dec!(60.00),
            quantity: Quantity::Hours {
                start: NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
                end: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            },
            travel_fee: dec!(0),
            setup_fee: dec!(0),
            cleanup_fee: dec!(0),
            service_fee_rate: dec!(0.10),
            platform_fee_rate: dec!(0.15),
        };

        assert!(matches!(
            PricingCalculator::quote(&inputs),
            Err(BookingError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_zero_guest_count_rejected() {
        let inputs = per_person_inputs(dec!(40.00), 0);
        assert!(matches!(
            PricingCalculator::quote(&inputs),
            Err(BookingError::InvalidGuestCount(_))
        ));
    }

    #[test]
    fn test_degenerate_fee_model() {
        // The simpler fee model from older profiles is the zero setup/cleanup
        // degenerate case.
        let inputs = PricingInputs {
            unit_price: dec!(50.00),
            quantity: Quantity::Guests(4),
            travel_fee: dec!(25.00),
            setup_fee: dec!(0),
            cleanup_fee: dec!(0),
            service_fee_rate: dec!(0.10),
            platform_fee_rate: dec!(0.15),
        };

        let b = PricingCalculator::quote(&inputs).unwrap();
        assert_eq!(b.base, dec!(200.00));
        assert_eq!(b.total, dec!(275.00));
    }
}
