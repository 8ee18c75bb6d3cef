use serde::Deserialize;

/// SQL query builder for the chef browse endpoint
///
/// Builds a single parameterized query with filters, sorting, and pagination.
/// Every query is constrained to available chefs, and every ordering carries
/// `id ASC` as a deterministic tiebreak so paginated results never shuffle
/// rows between pages when the primary sort key ties.
pub struct ChefQueryBuilder {
    base_query: String,
    where_clauses: Vec<String>,
    params: Vec<String>,
    order_clause: Option<String>,
    limit: u32,
    offset: u64,
}

impl ChefQueryBuilder {
    pub fn new() -> Self {
        Self {
            base_query: "SELECT * FROM chef_profiles".to_string(),
            where_clauses: vec!["is_available = TRUE".to_string()],
            params: Vec::new(),
            order_clause: None,
            limit: 10,
            offset: 0,
        }
    }

    /// Adds a cuisine filter matching against the chef's cuisine labels
    /// (case-insensitive substring match)
    pub fn add_cuisine_filter(&mut self, cuisine: &str) {
        let param_index = self.params.len() + 1;
        self.where_clauses
            .push(format!("cuisine_types ILIKE ${}", param_index));
        self.params.push(format!("%{}%", cuisine));
    }

    /// Adds a location filter matching against the chef's service areas
    /// (case-insensitive substring match)
    pub fn add_location_filter(&mut self, location: &str) {
        let param_index = self.params.len() + 1;
        self.where_clauses
            .push(format!("service_areas ILIKE ${}", param_index));
        self.params.push(format!("%{}%", location));
    }

    /// Adds per-person price range filters (min and/or max, inclusive)
    pub fn add_price_range(&mut self, min: Option<String>, max: Option<String>) {
        if let Some(min_price) = min {
            let param_index = self.params.len() + 1;
            self.where_clauses.push(format!(
                "base_price_per_person >= ${}::numeric",
                param_index
            ));
            self.params.push(min_price);
        }

        if let Some(max_price) = max {
            let param_index = self.params.len() + 1;
            self.where_clauses.push(format!(
                "base_price_per_person <= ${}::numeric",
                param_index
            ));
            self.params.push(max_price);
        }
    }

    /// Adds a minimum aggregate rating filter
    pub fn add_min_rating(&mut self, min_rating: String) {
        let param_index = self.params.len() + 1;
        self.where_clauses
            .push(format!("rating >= ${}::numeric", param_index));
        self.params.push(min_rating);
    }

    /// Restricts results to chefs offering cooking lessons
    pub fn add_offers_teaching(&mut self, offers_teaching: bool) {
        self.where_clauses
            .push(format!("offers_teaching = {}", offers_teaching));
    }

    /// Sets the sort order for the query
    pub fn set_sort(&mut self, sort: SortKey) {
        let clause = match sort {
            // NULLS LAST keeps unrated chefs behind rated ones.
            SortKey::Rating => "rating DESC NULLS LAST",
            SortKey::PriceLow => "base_price_per_person ASC",
            SortKey::PriceHigh => "base_price_per_person DESC",
            SortKey::Newest => "created_at DESC",
        };

        self.order_clause = Some(clause.to_string());
    }

    /// Sets pagination parameters (page is 1-indexed)
    ///
    /// The offset is widened to u64 so a pathological page number cannot
    /// overflow; the product of two u32 values always fits.
    pub fn set_pagination(&mut self, page: u32, limit: u32) {
        self.limit = limit;
        self.offset = u64::from(page.saturating_sub(1)) * u64::from(limit);
    }

    /// Builds the final SQL query string with all parameters
    pub fn build(&self) -> (String, Vec<String>) {
        let mut query = self.base_query.clone();

        query.push_str(" WHERE ");
        query.push_str(&self.where_clauses.join(" AND "));

        // Primary sort key defaults to rating; id ASC is always appended.
        let order = self
            .order_clause
            .clone()
            .unwrap_or_else(|| "rating DESC NULLS LAST".to_string());
        query.push_str(&format!(" ORDER BY {}, id ASC", order));

        // LIMIT/OFFSET are validated integers, inlined rather than bound.
        query.push_str(&format!(" LIMIT {}", self.limit));
        query.push_str(&format!(" OFFSET {}", self.offset));

        (query, self.params.clone())
    }
}

impl Default for ChefQueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Query parameters accepted by GET /api/chefs
///
/// All fields are optional; unsupplied filters are no-ops, not exclusions.
#[derive(Debug, Deserialize)]
pub struct ChefQueryParams {
    /// Cuisine label filter (case-insensitive substring)
    pub cuisine: Option<String>,
    /// Service-area filter (case-insensitive substring)
    pub location: Option<String>,
    /// Minimum per-person price (inclusive)
    pub price_min: Option<String>,
    /// Maximum per-person price (inclusive)
    pub price_max: Option<String>,
    /// Minimum aggregate rating
    pub rating_min: Option<String>,
    /// Restrict to chefs offering cooking lessons
    pub offers_teaching: Option<bool>,
    /// Sort key: "rating", "price_low", "price_high", or "newest"
    pub sort: Option<String>,
    /// Page number (1-indexed, defaults to 1)
    pub page: Option<u32>,
    /// Items per page (defaults to 10, capped at 50)
    pub limit: Option<u32>,
}

/// Sort key options for chef browsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Rating,
    PriceLow,
    PriceHigh,
    Newest,
}

/// Validated and normalized chef query parameters
#[derive(Debug)]
pub struct ValidatedChefQuery {
    pub cuisine: Option<String>,
    pub location: Option<String>,
    pub price_min: Option<String>,
    pub price_max: Option<String>,
    pub rating_min: Option<String>,
    pub offers_teaching: Option<bool>,
    pub sort: SortKey,
    pub page: u32,
    pub limit: u32,
}

/// Validation error type for query parameters
#[derive(Debug)]
pub struct QueryValidationError {
    pub message: String,
}

impl std::fmt::Display for QueryValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for QueryValidationError {}

/// Query parameter validator for the chef browse endpoint
pub struct ChefQueryValidator;

impl ChefQueryValidator {
    /// Validates and normalizes query parameters
    pub fn validate(params: ChefQueryParams) -> Result<ValidatedChefQuery, QueryValidationError> {
        let cuisine = Self::normalize_string(params.cuisine);
        let location = Self::normalize_string(params.location);

        let price_min = Self::validate_decimal(params.price_min, "price_min")?;
        let price_max = Self::validate_decimal(params.price_max, "price_max")?;

        if let (Some(min), Some(max)) = (price_min, price_max) {
            if min > max {
                return Err(QueryValidationError {
                    message: "price_min cannot be greater than price_max".to_string(),
                });
            }
        }

        let rating_min = Self::validate_decimal(params.rating_min, "rating_min")?;
        if let Some(r) = rating_min {
            if r > rust_decimal::Decimal::from(5) {
                return Err(QueryValidationError {
                    message: "rating_min must be between 0 and 5".to_string(),
                });
            }
        }

        let sort = match params.sort.as_deref() {
            None | Some("rating") => SortKey::Rating,
            Some("price_low") => SortKey::PriceLow,
            Some("price_high") => SortKey::PriceHigh,
            Some("newest") => SortKey::Newest,
            Some(other) => {
                return Err(QueryValidationError {
                    message: format!(
                        "Invalid sort key '{}'. Must be 'rating', 'price_low', 'price_high' or 'newest'",
                        other
                    ),
                })
            }
        };

        let page = params.page.unwrap_or(1);
        if page == 0 {
            return Err(QueryValidationError {
                message: "page must be a positive number (greater than 0)".to_string(),
            });
        }

        let limit = params.limit.unwrap_or(10);
        if limit == 0 || limit > 50 {
            return Err(QueryValidationError {
                message: "limit must be between 1 and 50".to_string(),
            });
        }

        Ok(ValidatedChefQuery {
            cuisine,
            location,
            price_min: price_min.map(|d| d.to_string()),
            price_max: price_max.map(|d| d.to_string()),
            rating_min: rating_min.map(|d| d.to_string()),
            offers_teaching: params.offers_teaching,
            sort,
            page,
            limit,
        })
    }

    /// Normalizes string parameters by trimming whitespace
    /// Returns None if the string is empty or whitespace-only
    fn normalize_string(s: Option<String>) -> Option<String> {
        s.and_then(|s| {
            let trimmed = s.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        })
    }

    /// Validates an optional decimal parameter
    fn validate_decimal(
        value: Option<String>,
        param_name: &str,
    ) -> Result<Option<rust_decimal::Decimal>, QueryValidationError> {
        match Self::normalize_string(value) {
            None => Ok(None),
            Some(raw) => match raw.parse::<rust_decimal::Decimal>() {
                Ok(parsed) if parsed >= rust_decimal::Decimal::ZERO => Ok(Some(parsed)),
                Ok(_) => Err(QueryValidationError {
                    message: format!("{} must not be negative", param_name),
                }),
                Err(_) => Err(QueryValidationError {
                    message: format!("{} must be a valid decimal number", param_name),
                }),
            },
        }
    }
}
