use uuid::Uuid;

use super::dto::RestaurantPage;
use super::query::{total_pages, ListSpec, Pagination};
use super::repo::RestaurantStore;
use super::repo_types::{NewRestaurant, Restaurant, RestaurantPatch};
use crate::error::{ApiError, ApiResult};

/// Count and page fetch run concurrently and independently; the total may
/// be stale relative to the page under concurrent writes.
pub async fn list_restaurants(
    store: &dyn RestaurantStore,
    spec: &ListSpec,
) -> anyhow::Result<RestaurantPage> {
    let Pagination { page, limit, skip } = spec.pagination;
    let (total, items) = tokio::try_join!(
        store.count(&spec.filter),
        store.find(&spec.filter, spec.sort, skip, limit),
    )?;
    Ok(RestaurantPage {
        page,
        limit,
        total,
        total_pages: total_pages(total, limit),
        items,
    })
}

/// Direct lookup; soft-deleted rows read as absent.
pub async fn get_active(store: &dyn RestaurantStore, id: Uuid) -> ApiResult<Restaurant> {
    match store.get(id).await? {
        Some(r) if r.is_active => Ok(r),
        _ => Err(ApiError::NotFound("Not found")),
    }
}

pub async fn create(store: &dyn RestaurantStore, mut new: NewRestaurant) -> ApiResult<Restaurant> {
    new.name = required("name", &new.name)?;
    new.city = required("city", &new.city)?;
    check_ranges(new.price, new.price_level, Some(new.rating))?;
    Ok(store.create(new).await?)
}

pub async fn update(
    store: &dyn RestaurantStore,
    id: Uuid,
    mut patch: RestaurantPatch,
) -> ApiResult<Restaurant> {
    if let Some(name) = &patch.name {
        patch.name = Some(required("name", name)?);
    }
    if let Some(city) = &patch.city {
        patch.city = Some(required("city", city)?);
    }
    check_ranges(patch.price, patch.price_level, patch.rating)?;
    store
        .update(id, patch)
        .await?
        .ok_or(ApiError::NotFound("Not found"))
}

pub async fn soft_delete(store: &dyn RestaurantStore, id: Uuid) -> ApiResult<Restaurant> {
    store
        .soft_delete(id)
        .await?
        .ok_or(ApiError::NotFound("Not found"))
}

fn required(field: &str, value: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn check_ranges(price: Option<f64>, price_level: Option<i32>, rating: Option<f64>) -> ApiResult<()> {
    if let Some(p) = price {
        if !p.is_finite() || p < 0.0 {
            return Err(ApiError::Validation("price must be a non-negative number".into()));
        }
    }
    if let Some(level) = price_level {
        if !(1..=4).contains(&level) {
            return Err(ApiError::Validation("price_level must be between 1 and 4".into()));
        }
    }
    if let Some(r) = rating {
        if !(0.0..=5.0).contains(&r) {
            return Err(ApiError::Validation("rating must be between 0 and 5".into()));
        }
    }
    Ok(())
}
