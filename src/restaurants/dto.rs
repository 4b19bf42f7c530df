use serde::{Deserialize, Serialize};

use super::repo_types::Restaurant;

/// Raw `GET /restaurants` query string. Unknown keys are dropped by serde.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub cuisine: Option<String>, // "mexican,thai"
    pub city: Option<String>,
    pub price_min: Option<String>,
    pub price_max: Option<String>,
    pub rating_gte: Option<String>,
    pub open_now: Option<String>, // only "true" filters
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Paginated envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantPage {
    pub page: i64,
    pub limit: i64,
    pub total: u64,
    pub total_pages: u64,
    pub items: Vec<Restaurant>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: &'static str,
    pub item: Restaurant,
}
