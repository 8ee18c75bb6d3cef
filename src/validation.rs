// Validation utilities module
// Provides custom validation functions for domain-specific rules

use rust_decimal::Decimal;
use validator::ValidationError;

/// Validates that a service type is one of the accepted values
/// Valid values: "cooking_only", "cooking_and_teaching"
pub fn validate_service_type(service_type: &str) -> Result<(), ValidationError> {
    let valid_types = ["cooking_only", "cooking_and_teaching"];
    if valid_types.contains(&service_type) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_service_type"))
    }
}

/// Validates that a monetary amount is not negative
pub fn validate_non_negative_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount < Decimal::ZERO {
        Err(ValidationError::new("amount_must_not_be_negative"))
    } else {
        Ok(())
    }
}

/// Validates that a per-person price is strictly positive
pub fn validate_positive_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price <= Decimal::ZERO {
        Err(ValidationError::new("price_must_be_positive"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_service_type_valid() {
        assert!(validate_service_type("cooking_only").is_ok());
        assert!(validate_service_type("cooking_and_teaching").is_ok());
    }

    #[test]
    fn test_service_type_invalid() {
        assert!(validate_service_type("delivery").is_err());
        assert!(validate_service_type("").is_err());
    }

    #[test]
    fn test_non_negative_amount() {
        assert!(validate_non_negative_amount(&dec!(0)).is_ok());
        assert!(validate_non_negative_amount(&dec!(12.50)).is_ok());
        assert!(validate_non_negative_amount(&dec!(-0.01)).is_err());
    }

    #[test]
    fn test_positive_price() {
        assert!(validate_positive_price(&dec!(40.00)).is_ok());
        assert!(validate_positive_price(&dec!(0)).is_err());
        assert!(validate_positive_price(&dec!(-5)).is_err());
    }
}
