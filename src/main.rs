mod bookings;
mod db;
mod error;
mod models;
mod query;
mod reviews;
mod validation;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use validator::Validate;

use bookings::{BookingsRepository, BookingsService, ChefLookupRepository};
use error::ApiError;
use models::{
    AvailabilitySlot, ChefProfile, CreateChefProfile, Menu, UpdateChefProfile, UpsertAvailabilitySlot,
    UpsertMenu,
};
use query::{ChefQueryBuilder, ChefQueryParams, ChefQueryValidator};
use reviews::{ReviewsRepository, ReviewsService};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        create_chef,
        get_chef_by_id,
        update_chef,
        upsert_menu,
        upsert_slot,
        delete_slot,
    ),
    components(
        schemas(
            ChefProfile,
            CreateChefProfile,
            UpdateChefProfile,
            Menu,
            UpsertMenu,
            AvailabilitySlot,
            UpsertAvailabilitySlot
        )
    ),
    tags(
        (name = "chefs", description = "Chef catalog management endpoints")
    ),
    info(
        title = "Home Chef Booking API",
        version = "1.0.0",
        description = "Booking and pricing engine for a home-chef marketplace",
        contact(
            name = "API Support",
            email = "support@homechefapi.com"
        )
    )
)]
struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub bookings_service: BookingsService,
    pub reviews_service: ReviewsService,
}

/// Load a chef profile and verify the acting user owns it
async fn require_chef_owned_by(
    pool: &PgPool,
    chef_id: i32,
    acting_user_id: i32,
) -> Result<ChefProfile, ApiError> {
    let chef = sqlx::query_as::<_, ChefProfile>("SELECT * FROM chef_profiles WHERE id = $1")
        .bind(chef_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "Chef".to_string(),
            id: chef_id.to_string(),
        })?;

    if chef.user_id != acting_user_id {
        return Err(ApiError::Forbidden {
            message: "Acting user does not own this chef profile".to_string(),
        });
    }
    Ok(chef)
}

/// Handler for POST /api/chefs
/// Creates a chef profile for a user account
#[utoipa::path(
    post,
    path = "/api/chefs",
    request_body = CreateChefProfile,
    responses(
        (status = 201, description = "Chef profile created successfully", body = ChefProfile),
        (status = 400, description = "Invalid input data"),
        (status = 409, description = "User already has a chef profile"),
        (status = 500, description = "Internal server error")
    ),
    tag = "chefs"
)]
async fn create_chef(
    State(state): State<AppState>,
    Json(payload): Json<CreateChefProfile>,
) -> Result<(StatusCode, Json<ChefProfile>), ApiError> {
    tracing::debug!("Creating chef profile for user {}", payload.user_id);

    payload.validate()?;
    if payload.min_guests > payload.max_guests {
        return Err(ApiError::validation(
            "min_guests",
            "min_guests cannot exceed max_guests",
        ));
    }

    if db::chef_profile_exists_for_user(&state.db, payload.user_id).await? {
        tracing::warn!(
            "Attempt to create second chef profile for user {}",
            payload.user_id
        );
        return Err(ApiError::Conflict {
            message: format!("User {} already has a chef profile", payload.user_id),
        });
    }

    let chef = sqlx::query_as::<_, ChefProfile>(
        r#"
        INSERT INTO chef_profiles (
            user_id, bio, cuisine_types, service_areas,
            base_price_per_person, teaching_price_per_person,
            travel_fee, setup_fee, cleanup_fee,
            min_guests, max_guests, offers_teaching
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(payload.user_id)
    .bind(&payload.bio)
    .bind(&payload.cuisine_types)
    .bind(&payload.service_areas)
    .bind(payload.base_price_per_person)
    .bind(payload.teaching_price_per_person)
    .bind(payload.travel_fee)
    .bind(payload.setup_fee)
    .bind(payload.cleanup_fee)
    .bind(payload.min_guests)
    .bind(payload.max_guests)
    .bind(payload.offers_teaching)
    .fetch_one(&state.db)
    .await?;

    tracing::info!("Created chef profile with id: {}", chef.id);
    Ok((StatusCode::CREATED, Json(chef)))
}

/// Handler for GET /api/chefs
/// Browses available chefs with filtering, sorting, and pagination
async fn browse_chefs(
    Query(params): Query<ChefQueryParams>,
    State(state): State<AppState>,
) -> Result<Json<Vec<ChefProfile>>, ApiError> {
    tracing::debug!("Browsing chefs with query parameters: {:?}", params);

    let validated = ChefQueryValidator::validate(params)
        .map_err(|e| ApiError::validation("query", e.to_string()))?;

    let mut builder = ChefQueryBuilder::new();
    if let Some(cuisine) = validated.cuisine {
        builder.add_cuisine_filter(&cuisine);
    }
    if let Some(location) = validated.location {
        builder.add_location_filter(&location);
    }
    builder.add_price_range(validated.price_min, validated.price_max);
    if let Some(rating_min) = validated.rating_min {
        builder.add_min_rating(rating_min);
    }
    if let Some(offers_teaching) = validated.offers_teaching {
        builder.add_offers_teaching(offers_teaching);
    }
    builder.set_sort(validated.sort);
    builder.set_pagination(validated.page, validated.limit);

    let (query_str, params) = builder.build();

    let mut query = sqlx::query_as::<_, ChefProfile>(&query_str);
    for param in params {
        query = query.bind(param);
    }

    let chefs = query.fetch_all(&state.db).await?;

    tracing::debug!("Query returned {} chefs", chefs.len());
    Ok(Json(chefs))
}

/// Handler for GET /api/chefs/:id
#[utoipa::path(
    get,
    path = "/api/chefs/{id}",
    params(
        ("id" = i32, Path, description = "Chef profile ID")
    ),
    responses(
        (status = 200, description = "Chef found", body = ChefProfile),
        (status = 404, description = "Chef not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "chefs"
)]
async fn get_chef_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ChefProfile>, ApiError> {
    let chef = sqlx::query_as::<_, ChefProfile>("SELECT * FROM chef_profiles WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "Chef".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(chef))
}

/// Handler for PUT /api/chefs/:id
/// Partially updates a chef profile; derived rating fields are not writable
#[utoipa::path(
    put,
    path = "/api/chefs/{id}",
    params(
        ("id" = i32, Path, description = "Chef profile ID")
    ),
    request_body = UpdateChefProfile,
    responses(
        (status = 200, description = "Chef profile updated", body = ChefProfile),
        (status = 400, description = "Invalid input data"),
        (status = 403, description = "Acting user does not own this profile"),
        (status = 404, description = "Chef not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "chefs"
)]
async fn update_chef(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateChefProfile>,
) -> Result<Json<ChefProfile>, ApiError> {
    tracing::debug!("Updating chef profile {}", id);

    payload.validate()?;

    let existing = require_chef_owned_by(&state.db, id, payload.acting_user_id).await?;

    let min_guests = payload.min_guests.unwrap_or(existing.min_guests);
    let max_guests = payload.max_guests.unwrap_or(existing.max_guests);
    if min_guests > max_guests {
        return Err(ApiError::validation(
            "min_guests",
            "min_guests cannot exceed max_guests",
        ));
    }

    let updated = sqlx::query_as::<_, ChefProfile>(
        r#"
        UPDATE chef_profiles
        SET bio = $1,
            cuisine_types = $2,
            service_areas = $3,
            base_price_per_person = $4,
            teaching_price_per_person = $5,
            travel_fee = $6,
            setup_fee = $7,
            cleanup_fee = $8,
            min_guests = $9,
            max_guests = $10,
            is_available = $11,
            offers_teaching = $12,
            updated_at = NOW()
        WHERE id = $13
        RETURNING *
        "#,
    )
    .bind(payload.bio.or(existing.bio))
    .bind(payload.cuisine_types.or(existing.cuisine_types))
    .bind(payload.service_areas.or(existing.service_areas))
    .bind(payload.base_price_per_person.unwrap_or(existing.base_price_per_person))
    .bind(payload.teaching_price_per_person.or(existing.teaching_price_per_person))
    .bind(payload.travel_fee.unwrap_or(existing.travel_fee))
    .bind(payload.setup_fee.unwrap_or(existing.setup_fee))
    .bind(payload.cleanup_fee.unwrap_or(existing.cleanup_fee))
    .bind(min_guests)
    .bind(max_guests)
    .bind(payload.is_available.unwrap_or(existing.is_available))
    .bind(payload.offers_teaching.unwrap_or(existing.offers_teaching))
    .bind(id)
    .fetch_one(&state.db)
    .await?;

    tracing::info!("Updated chef profile {}", id);
    Ok(Json(updated))
}

/// Handler for PUT /api/chefs/:id/menus
/// Creates a menu, or replaces one when `menu_id` is supplied
#[utoipa::path(
    put,
    path = "/api/chefs/{id}/menus",
    params(
        ("id" = i32, Path, description = "Chef profile ID")
    ),
    request_body = UpsertMenu,
    responses(
        (status = 200, description = "Menu created or replaced", body = Menu),
        (status = 400, description = "Invalid input data"),
        (status = 403, description = "Acting user does not own this profile"),
        (status = 404, description = "Chef or menu not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "chefs"
)]
async fn upsert_menu(
    State(state): State<AppState>,
    Path(chef_id): Path<i32>,
    Json(payload): Json<UpsertMenu>,
) -> Result<Json<Menu>, ApiError> {
    payload.validate()?;
    require_chef_owned_by(&state.db, chef_id, payload.acting_user_id).await?;

    let menu = match payload.menu_id {
        Some(menu_id) => sqlx::query_as::<_, Menu>(
            r#"
            UPDATE menus
            SET name = $1, description = $2, price_per_person = $3,
                course_count = $4, is_featured = $5
            WHERE id = $6 AND chef_id = $7
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(payload.price_per_person)
        .bind(payload.course_count)
        .bind(payload.is_featured)
        .bind(menu_id)
        .bind(chef_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "Menu".to_string(),
            id: menu_id.to_string(),
        })?,
        None => {
            sqlx::query_as::<_, Menu>(
                r#"
                INSERT INTO menus (chef_id, name, description, price_per_person, course_count, is_featured)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
                "#,
            )
            .bind(chef_id)
            .bind(&payload.name)
            .bind(&payload.description)
            .bind(payload.price_per_person)
            .bind(payload.course_count)
            .bind(payload.is_featured)
            .fetch_one(&state.db)
            .await?
        }
    };

    tracing::info!("Upserted menu {} for chef {}", menu.id, chef_id);
    Ok(Json(menu))
}

/// Handler for GET /api/chefs/:id/menus
async fn list_chef_menus(
    State(state): State<AppState>,
    Path(chef_id): Path<i32>,
) -> Result<Json<Vec<Menu>>, ApiError> {
    if !db::chef_exists(&state.db, chef_id).await? {
        return Err(ApiError::NotFound {
            resource: "Chef".to_string(),
            id: chef_id.to_string(),
        });
    }

    let menus =
        sqlx::query_as::<_, Menu>("SELECT * FROM menus WHERE chef_id = $1 ORDER BY id ASC")
            .bind(chef_id)
            .fetch_all(&state.db)
            .await?;

    Ok(Json(menus))
}

/// Handler for PUT /api/chefs/:id/slots
/// Creates an availability slot, or replaces one when `slot_id` is supplied
///
/// Replacing never lowers capacity below the count already reserved.
#[utoipa::path(
    put,
    path = "/api/chefs/{id}/slots",
    params(
        ("id" = i32, Path, description = "Chef profile ID")
    ),
    request_body = UpsertAvailabilitySlot,
    responses(
        (status = 200, description = "Slot created or replaced", body = AvailabilitySlot),
        (status = 400, description = "Invalid input data"),
        (status = 403, description = "Acting user does not own this profile"),
        (status = 404, description = "Chef or slot not found"),
        (status = 409, description = "Capacity below current reservations"),
        (status = 500, description = "Internal server error")
    ),
    tag = "chefs"
)]
async fn upsert_slot(
    State(state): State<AppState>,
    Path(chef_id): Path<i32>,
    Json(payload): Json<UpsertAvailabilitySlot>,
) -> Result<Json<AvailabilitySlot>, ApiError> {
    payload.validate()?;
    if payload.start_time >= payload.end_time {
        return Err(ApiError::validation(
            "start_time",
            "start_time must be before end_time",
        ));
    }

    require_chef_owned_by(&state.db, chef_id, payload.acting_user_id).await?;

    let slot = match payload.slot_id {
        Some(slot_id) => {
            let updated = sqlx::query_as::<_, AvailabilitySlot>(
                r#"
                UPDATE availability_slots
                SET slot_date = $1, start_time = $2, end_time = $3,
                    max_bookings = $4, version = version + 1
                WHERE id = $5 AND chef_id = $6 AND current_bookings <= $4
                RETURNING *
                "#,
            )
            .bind(payload.slot_date)
            .bind(payload.start_time)
            .bind(payload.end_time)
            .bind(payload.max_bookings)
            .bind(slot_id)
            .bind(chef_id)
            .fetch_optional(&state.db)
            .await?;

            match updated {
                Some(slot) => slot,
                None => {
                    let exists: Option<bool> = sqlx::query_scalar(
                        "SELECT EXISTS(SELECT 1 FROM availability_slots WHERE id = $1 AND chef_id = $2)",
                    )
                    .bind(slot_id)
                    .bind(chef_id)
                    .fetch_one(&state.db)
                    .await?;

                    if exists.unwrap_or(false) {
                        return Err(ApiError::Conflict {
                            message: format!(
                                "Slot {} holds more reservations than the requested capacity",
                                slot_id
                            ),
                        });
                    }
                    return Err(ApiError::NotFound {
                        resource: "Availability slot".to_string(),
                        id: slot_id.to_string(),
                    });
                }
            }
        }
        None => {
            sqlx::query_as::<_, AvailabilitySlot>(
                r#"
                INSERT INTO availability_slots (chef_id, slot_date, start_time, end_time, max_bookings)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
                "#,
            )
            .bind(chef_id)
            .bind(payload.slot_date)
            .bind(payload.start_time)
            .bind(payload.end_time)
            .bind(payload.max_bookings)
            .fetch_one(&state.db)
            .await?
        }
    };

    tracing::info!("Upserted availability slot {} for chef {}", slot.id, chef_id);
    Ok(Json(slot))
}

/// Handler for GET /api/chefs/:id/slots
/// Lists a chef's slots; clients read the `version` here for booking
async fn list_chef_slots(
    State(state): State<AppState>,
    Path(chef_id): Path<i32>,
) -> Result<Json<Vec<AvailabilitySlot>>, ApiError> {
    if !db::chef_exists(&state.db, chef_id).await? {
        return Err(ApiError::NotFound {
            resource: "Chef".to_string(),
            id: chef_id.to_string(),
        });
    }

    let slots = sqlx::query_as::<_, AvailabilitySlot>(
        "SELECT * FROM availability_slots WHERE chef_id = $1 ORDER BY slot_date ASC, start_time ASC, id ASC",
    )
    .bind(chef_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(slots))
}

/// Query parameters identifying the acting user on a slot deletion
#[derive(Debug, serde::Deserialize)]
struct DeleteSlotQuery {
    acting_user_id: i32,
}

/// Handler for DELETE /api/slots/:id
/// Deletes an availability slot that holds no reservations
#[utoipa::path(
    delete,
    path = "/api/slots/{id}",
    params(
        ("id" = i32, Path, description = "Availability slot ID"),
        ("acting_user_id" = i32, Query, description = "Acting user, must own the chef profile")
    ),
    responses(
        (status = 204, description = "Slot deleted"),
        (status = 403, description = "Acting user does not own this profile"),
        (status = 404, description = "Slot not found"),
        (status = 409, description = "Slot still holds reservations"),
        (status = 500, description = "Internal server error")
    ),
    tag = "chefs"
)]
async fn delete_slot(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(params): Query<DeleteSlotQuery>,
) -> Result<StatusCode, ApiError> {
    let slot = sqlx::query_as::<_, AvailabilitySlot>(
        "SELECT * FROM availability_slots WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::NotFound {
        resource: "Availability slot".to_string(),
        id: id.to_string(),
    })?;

    require_chef_owned_by(&state.db, slot.chef_id, params.acting_user_id).await?;

    // Guarded delete; a reservation landing between the read and the delete
    // leaves the row in place.
    let result = sqlx::query("DELETE FROM availability_slots WHERE id = $1 AND current_bookings = 0")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::Conflict {
            message: format!("Slot {} still holds reservations", id),
        });
    }

    tracing::info!("Deleted availability slot {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS middleware
fn create_router(db: PgPool) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    let bookings_service = BookingsService::new(
        BookingsRepository::new(db.clone()),
        ChefLookupRepository::new(db.clone()),
    );
    let reviews_service = ReviewsService::new(ReviewsRepository::new(db.clone()));

    let state = AppState {
        db,
        bookings_service,
        reviews_service,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Chef catalog
        .route("/api/chefs", post(create_chef))
        .route("/api/chefs", get(browse_chefs))
        .route("/api/chefs/:id", get(get_chef_by_id))
        .route("/api/chefs/:id", put(update_chef))
        .route("/api/chefs/:id/menus", put(upsert_menu))
        .route("/api/chefs/:id/menus", get(list_chef_menus))
        .route("/api/chefs/:id/slots", put(upsert_slot))
        .route("/api/chefs/:id/slots", get(list_chef_slots))
        .route("/api/slots/:id", delete(delete_slot))
        // Quotes and bookings
        .route("/api/quotes", post(bookings::quote_handler))
        .route("/api/bookings", post(bookings::create_booking_handler))
        .route("/api/bookings", get(bookings::list_bookings_handler))
        .route("/api/bookings/:id", get(bookings::get_booking_handler))
        .route(
            "/api/bookings/:id/transition",
            post(bookings::transition_booking_handler),
        )
        .route(
            "/api/bookings/:id/payment",
            patch(bookings::record_payment_handler),
        )
        // Reviews
        .route(
            "/api/bookings/:id/reviews",
            post(reviews::submit_review_handler),
        )
        .route(
            "/api/chefs/:id/reviews",
            get(reviews::list_chef_reviews_handler),
        )
        .route(
            "/api/reviews/:id/response",
            patch(reviews::respond_to_review_handler),
        )
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Home Chef Booking API - Starting...");

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());

    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&database_url)
        .await
        .expect("Failed to create database pool");

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    let app = create_router(db_pool);

    let addr = format!("{}:{}", host, port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Home Chef Booking API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await.expect("Server error");
}

#[cfg(test)]
mod tests;
