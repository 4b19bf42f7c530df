use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{DeletedResponse, ListQuery, RestaurantPage};
use super::query::ListSpec;
use super::repo_types::{NewRestaurant, Restaurant, RestaurantPatch};
use super::services;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/restaurants", get(list_restaurants).post(create_restaurant))
        .route(
            "/restaurants/:id",
            get(get_restaurant)
                .patch(update_restaurant)
                .delete(delete_restaurant),
        )
}

#[instrument(skip(state, query))]
pub async fn list_restaurants(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<RestaurantPage>> {
    let Query(query) = query?;
    let spec = ListSpec::from_query(&query);
    let page = services::list_restaurants(state.restaurants.as_ref(), &spec)
        .await
        .map_err(ApiError::Listing)?;
    info!(
        total = page.total,
        page = page.page,
        limit = page.limit,
        returned = page.items.len(),
        "restaurants listed"
    );
    Ok(Json(page))
}

#[instrument(skip(state))]
pub async fn get_restaurant(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Restaurant>> {
    let Path(id) = path?;
    let id = parse_id(&id)?;
    let item = services::get_active(state.restaurants.as_ref(), id).await?;
    Ok(Json(item))
}

#[instrument(skip(state, payload))]
pub async fn create_restaurant(
    State(state): State<AppState>,
    payload: Result<Json<NewRestaurant>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Restaurant>)> {
    let Json(new) = payload?;
    let item = services::create(state.restaurants.as_ref(), new).await?;
    info!(id = %item.id, name = %item.name, "restaurant created");
    Ok((StatusCode::CREATED, Json(item)))
}

#[instrument(skip(state, payload))]
pub async fn update_restaurant(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<RestaurantPatch>, JsonRejection>,
) -> ApiResult<Json<Restaurant>> {
    let Path(id) = path?;
    let id = parse_id(&id)?;
    let Json(patch) = payload?;
    let item = services::update(state.restaurants.as_ref(), id, patch).await?;
    info!(%id, "restaurant updated");
    Ok(Json(item))
}

#[instrument(skip(state))]
pub async fn delete_restaurant(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<DeletedResponse>> {
    let Path(id) = path?;
    let id = parse_id(&id)?;
    let item = services::soft_delete(state.restaurants.as_ref(), id).await?;
    info!(%id, "restaurant soft-deleted");
    Ok(Json(DeletedResponse {
        message: "Deleted",
        item,
    }))
}

/// A malformed id cannot name any restaurant.
fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound("Not found"))
}
