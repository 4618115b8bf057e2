//! Handlers for the `/restaurants` resource.
//!
//! Every route is scoped to the authenticated owner. Rows owned by someone
//! else are reported as missing rather than forbidden.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use mineruca_core::error::CoreError;
use mineruca_core::pipeline::{derive_visible, distinct_genres, sidebar_tree, PrefectureGroup};
use mineruca_core::prefecture::split_address;
use mineruca_core::restaurant::{NewRestaurant, Restaurant, RestaurantPatch};
use mineruca_core::types::DbId;
use mineruca_db::repositories::RestaurantRepo;
use mineruca_db::DbPool;
use mineruca_events::{event_types, DomainEvent};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::ListParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/restaurants
///
/// The caller's favorites, filtered and sorted per the query string.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<Vec<Restaurant>>>> {
    let sort = params.sort()?;
    let mode = params.view_mode()?;
    let restaurants = load_restaurants(&state.pool, auth.user_id).await?;
    let visible = derive_visible(&restaurants, &params.filters(), &sort, mode);
    Ok(Json(DataResponse { data: visible }))
}

/// POST /api/v1/restaurants
///
/// Save a favorite. Blank prefecture/city are derived from the address when
/// it starts with a prefecture name.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(mut input): Json<NewRestaurant>,
) -> AppResult<(StatusCode, Json<DataResponse<Restaurant>>)> {
    fill_location(&mut input);
    input.validate()?;

    let row = RestaurantRepo::create(&state.pool, auth.user_id, &input).await?;
    let restaurant = row.into_domain();

    tracing::info!(
        restaurant_id = restaurant.id,
        user_id = auth.user_id,
        "Restaurant saved"
    );
    state.event_bus.publish(
        DomainEvent::new(event_types::RESTAURANT_CREATED)
            .with_actor(auth.user_id)
            .with_entity("restaurant", restaurant.id),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: restaurant })))
}

/// GET /api/v1/restaurants/sidebar
pub async fn sidebar(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<PrefectureGroup>>>> {
    let restaurants = load_restaurants(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: sidebar_tree(&restaurants),
    }))
}

/// GET /api/v1/restaurants/genres
pub async fn genres(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<String>>>> {
    let restaurants = load_restaurants(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: distinct_genres(&restaurants),
    }))
}

/// GET /api/v1/restaurants/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Restaurant>>> {
    let restaurant = find_owned(&state.pool, id, auth.user_id).await?;
    Ok(Json(DataResponse { data: restaurant }))
}

/// PATCH /api/v1/restaurants/{id}
///
/// Partial update of the user-editable fields.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(patch): Json<RestaurantPatch>,
) -> AppResult<Json<DataResponse<Restaurant>>> {
    if patch.is_empty() {
        return Err(AppError::BadRequest("No fields to update".into()));
    }
    patch.validate()?;

    let restaurant = apply_patch(&state, auth.user_id, id, &patch).await?;
    Ok(Json(DataResponse { data: restaurant }))
}

/// DELETE /api/v1/restaurants/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !RestaurantRepo::delete(&state.pool, id, auth.user_id).await? {
        return Err(not_found(id));
    }

    state.event_bus.publish(
        DomainEvent::new(event_types::RESTAURANT_DELETED)
            .with_actor(auth.user_id)
            .with_entity("restaurant", id),
    );

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/restaurants/{id}/geocode
///
/// Resolve the stored address and persist the coordinates.
pub async fn geocode(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Restaurant>>> {
    // 1. Load the row (ownership check).
    let restaurant = find_owned(&state.pool, id, auth.user_id).await?;

    // 2. Ask the geocoder.
    let coordinates = state
        .geocoder
        .geocode(&restaurant.address)
        .await?
        .ok_or_else(|| AppError::NotFound("No coordinates found for this address".into()))?;

    // 3. Store them as a coordinate-only patch.
    let patch = RestaurantPatch {
        coordinates: Some(coordinates),
        ..Default::default()
    };
    let restaurant = apply_patch(&state, auth.user_id, id, &patch).await?;
    Ok(Json(DataResponse { data: restaurant }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A user's favorites in source order (newest first).
pub(crate) async fn load_restaurants(
    pool: &DbPool,
    user_id: DbId,
) -> Result<Vec<Restaurant>, sqlx::Error> {
    let rows = RestaurantRepo::list_for_user(pool, user_id).await?;
    Ok(rows.into_iter().map(|r| r.into_domain()).collect())
}

/// Load a restaurant owned by `user_id`, or 404.
pub(crate) async fn find_owned(pool: &DbPool, id: DbId, user_id: DbId) -> AppResult<Restaurant> {
    RestaurantRepo::find_by_id(pool, id)
        .await?
        .filter(|row| row.user_id == user_id)
        .map(|row| row.into_domain())
        .ok_or_else(|| not_found(id))
}

async fn apply_patch(
    state: &AppState,
    user_id: DbId,
    id: DbId,
    patch: &RestaurantPatch,
) -> AppResult<Restaurant> {
    let row = RestaurantRepo::update(&state.pool, id, user_id, patch)
        .await?
        .ok_or_else(|| not_found(id))?;

    state.event_bus.publish(
        DomainEvent::new(event_types::RESTAURANT_UPDATED)
            .with_actor(user_id)
            .with_entity("restaurant", id)
            .with_payload(serde_json::json!({
                "coordinates_only": patch.is_coordinate_only(),
            })),
    );

    Ok(row.into_domain())
}

fn fill_location(input: &mut NewRestaurant) {
    if !input.prefecture.trim().is_empty() && !input.city.trim().is_empty() {
        return;
    }
    let (prefecture, city) = split_address(&input.address);
    if input.prefecture.trim().is_empty() {
        if let Some(prefecture) = prefecture {
            input.prefecture = prefecture;
        }
    }
    if input.city.trim().is_empty() {
        if let Some(city) = city {
            input.city = city;
        }
    }
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Restaurant",
        id,
    })
}
