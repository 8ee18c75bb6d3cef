use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// A chef's public marketplace profile
///
/// `rating` and `total_reviews` are derived columns, written only by the
/// rating aggregator; they are never accepted from client input.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ChefProfile {
    #[schema(example = 1)]
    pub id: i32,
    /// Owning user account
    #[schema(example = 42)]
    pub user_id: i32,
    pub bio: Option<String>,
    /// Comma-separated cuisine labels ("Persian, Italian")
    #[schema(example = "Persian, Italian")]
    pub cuisine_types: Option<String>,
    /// Comma-separated service areas
    #[schema(example = "Vancouver, Burnaby")]
    pub service_areas: Option<String>,
    #[schema(value_type = f64, example = 40.00)]
    pub base_price_per_person: Decimal,
    /// Per-person surcharge for cooking lessons
    #[schema(value_type = Option<f64>, example = 15.00)]
    pub teaching_price_per_person: Option<Decimal>,
    #[schema(value_type = f64, example = 25.00)]
    pub travel_fee: Decimal,
    #[schema(value_type = f64, example = 20.00)]
    pub setup_fee: Decimal,
    #[schema(value_type = f64, example = 10.00)]
    pub cleanup_fee: Decimal,
    #[schema(example = 2)]
    pub min_guests: i32,
    #[schema(example = 20)]
    pub max_guests: i32,
    /// Soft-disable flag; unavailable chefs are excluded from browse results
    pub is_available: bool,
    pub offers_teaching: bool,
    /// Mean of all review `rating` scores, 2 decimal places; None until reviewed
    #[schema(value_type = Option<f64>, example = 4.75)]
    pub rating: Option<Decimal>,
    pub total_reviews: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A menu a chef offers; its price (when set) overrides the chef's base price
/// per person during quoting
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Menu {
    pub id: i32,
    pub chef_id: i32,
    #[schema(example = "Persian Feast")]
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = Option<f64>, example = 55.00)]
    pub price_per_person: Option<Decimal>,
    pub course_count: i32,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

/// A declared availability window with bounded booking capacity
///
/// `current_bookings` and `version` are owned by the availability ledger;
/// no other code path writes them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AvailabilitySlot {
    pub id: i32,
    pub chef_id: i32,
    #[schema(value_type = String, example = "2026-09-12")]
    pub slot_date: NaiveDate,
    #[schema(value_type = String, example = "17:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "22:00:00")]
    pub end_time: NaiveTime,
    pub max_bookings: i32,
    pub current_bookings: i32,
    /// Optimistic concurrency token
    pub version: i32,
}

/// Request body for creating a chef profile
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateChefProfile {
    pub user_id: i32,
    pub bio: Option<String>,
    pub cuisine_types: Option<String>,
    pub service_areas: Option<String>,
    #[validate(custom = "crate::validation::validate_positive_price")]
    #[schema(value_type = f64, example = 40.00)]
    pub base_price_per_person: Decimal,
    #[schema(value_type = Option<f64>)]
    pub teaching_price_per_person: Option<Decimal>,
    #[validate(custom = "crate::validation::validate_non_negative_amount")]
    #[schema(value_type = f64, default = 0)]
    pub travel_fee: Decimal,
    #[validate(custom = "crate::validation::validate_non_negative_amount")]
    #[schema(value_type = f64, default = 0)]
    pub setup_fee: Decimal,
    #[validate(custom = "crate::validation::validate_non_negative_amount")]
    #[schema(value_type = f64, default = 0)]
    pub cleanup_fee: Decimal,
    #[validate(range(min = 1, max = 10, message = "Minimum guests must be between 1 and 10"))]
    pub min_guests: i32,
    #[validate(range(min = 2, max = 50, message = "Maximum guests must be between 2 and 50"))]
    pub max_guests: i32,
    #[serde(default)]
    pub offers_teaching: bool,
}

/// Request body for editing a chef profile
///
/// All fields optional to support partial updates. Derived rating fields are
/// deliberately absent.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateChefProfile {
    /// The caller's identity as established by the session layer; must own
    /// the profile
    pub acting_user_id: i32,
    pub bio: Option<String>,
    pub cuisine_types: Option<String>,
    pub service_areas: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub base_price_per_person: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub teaching_price_per_person: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub travel_fee: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub setup_fee: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub cleanup_fee: Option<Decimal>,
    #[validate(range(min = 1, max = 10))]
    pub min_guests: Option<i32>,
    #[validate(range(min = 2, max = 50))]
    pub max_guests: Option<i32>,
    pub is_available: Option<bool>,
    pub offers_teaching: Option<bool>,
}

/// Request body for creating or replacing a menu
///
/// `acting_user_id` is the caller's identity as established by the session
/// layer; the catalog rejects writes against a chef profile the caller does
/// not own.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpsertMenu {
    pub acting_user_id: i32,
    /// Present for replace, absent for create
    pub menu_id: Option<i32>,
    #[validate(length(min = 1, max = 100, message = "Menu name must be 1-100 characters"))]
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub price_per_person: Option<Decimal>,
    #[validate(range(min = 1, max = 12))]
    #[serde(default = "default_course_count")]
    pub course_count: i32,
    #[serde(default)]
    pub is_featured: bool,
}

fn default_course_count() -> i32 {
    3
}

/// Request body for creating or replacing an availability slot
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpsertAvailabilitySlot {
    pub acting_user_id: i32,
    /// Present for replace, absent for create
    pub slot_id: Option<i32>,
    #[schema(value_type = String, example = "2026-09-12")]
    pub slot_date: NaiveDate,
    #[schema(value_type = String, example = "17:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "22:00:00")]
    pub end_time: NaiveTime,
    #[validate(range(min = 1, max = 20, message = "Capacity must be between 1 and 20"))]
    pub max_bookings: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_chef_profile_serializes_decimal_fields() {
        let profile = ChefProfile {
            id: 1,
            user_id: 42,
            bio: None,
            cuisine_types: Some("Persian".to_string()),
            service_areas: None,
            base_price_per_person: dec!(40.00),
            teaching_price_per_person: None,
            travel_fee: dec!(0),
            setup_fee: dec!(20),
            cleanup_fee: dec!(10),
            min_guests: 2,
            max_guests: 20,
            is_available: true,
            offers_teaching: false,
            rating: Some(dec!(4.75)),
            total_reviews: 12,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["base_price_per_person"], "40.00");
        assert_eq!(json["rating"], "4.75");
        assert_eq!(json["total_reviews"], 12);
    }

    #[test]
    fn test_create_chef_profile_validates_guest_bounds() {
        let request = CreateChefProfile {
            user_id: 1,
            bio: None,
            cuisine_types: None,
            service_areas: None,
            base_price_per_person: dec!(40),
            teaching_price_per_person: None,
            travel_fee: dec!(0),
            setup_fee: dec!(0),
            cleanup_fee: dec!(0),
            min_guests: 0,
            max_guests: 20,
            offers_teaching: false,
        };

        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_chef_profile_rejects_negative_fee() {
        let request = CreateChefProfile {
            user_id: 1,
            bio: None,
            cuisine_types: None,
            service_areas: None,
            base_price_per_person: dec!(40),
            teaching_price_per_person: None,
            travel_fee: dec!(-1),
            setup_fee: dec!(0),
            cleanup_fee: dec!(0),
            min_guests: 2,
            max_guests: 20,
            offers_teaching: false,
        };

        assert!(request.validate().is_err());
    }

    #[test]
    fn test_upsert_slot_deserializes_time_fields() {
        let json = serde_json::json!({
            "acting_user_id": 1,
            "slot_date": "2026-09-12",
            "start_time": "17:00:00",
            "end_time": "22:00:00",
            "max_bookings": 2
        });

        let request: UpsertAvailabilitySlot = serde_json::from_value(json).unwrap();
        assert_eq!(request.max_bookings, 2);
        assert!(request.start_time < request.end_time);
        assert!(request.slot_id.is_none());
    }
}
