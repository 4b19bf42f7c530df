use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{RecommendationQuery, RecommendationResponse};
use super::services;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/recommendations", get(get_recommendations))
}

#[instrument(skip(state, query))]
pub async fn get_recommendations(
    State(state): State<AppState>,
    query: Result<Query<RecommendationQuery>, QueryRejection>,
) -> ApiResult<Json<RecommendationResponse>> {
    let Query(query) = query?;
    let raw = query
        .user_id
        .filter(|v| !v.is_empty())
        .ok_or(ApiError::MissingParam("userId"))?;
    let user_id = Uuid::parse_str(raw.trim()).map_err(|_| {
        warn!(user_id = %raw, "malformed userId");
        ApiError::InvalidParam("userId is invalid".into())
    })?;

    let user = state
        .users
        .get(user_id)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    let recommendations = services::recommend(state.restaurants.as_ref(), &user.preferences).await?;
    info!(%user_id, count = recommendations.len(), "recommendations served");

    Ok(Json(RecommendationResponse {
        user: user.email,
        recommendations,
    }))
}
