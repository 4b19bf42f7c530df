use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Restaurant record as stored and as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    pub address: Option<String>,
    pub cuisine: Vec<String>,
    pub price: Option<f64>,
    #[serde(rename = "price_level")]
    pub price_level: Option<i32>,
    pub rating: f64,
    pub tags: Vec<String>,
    pub open_now: bool,
    pub is_active: bool, // soft-delete flag
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Fields accepted when inserting a restaurant.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRestaurant {
    pub name: String,
    pub city: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub cuisine: Vec<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default, rename = "price_level")]
    pub price_level: Option<i32>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub open_now: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantPatch {
    pub name: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub cuisine: Option<Vec<String>>,
    pub price: Option<f64>,
    #[serde(rename = "price_level")]
    pub price_level: Option<i32>,
    pub rating: Option<f64>,
    pub tags: Option<Vec<String>>,
    pub open_now: Option<bool>,
    pub is_active: Option<bool>,
}

impl RestaurantPatch {
    /// Applies the patch in place, used by the in-memory store.
    pub fn apply(self, r: &mut Restaurant) {
        if let Some(v) = self.name {
            r.name = v;
        }
        if let Some(v) = self.city {
            r.city = v;
        }
        if let Some(v) = self.address {
            r.address = Some(v);
        }
        if let Some(v) = self.cuisine {
            r.cuisine = v;
        }
        if let Some(v) = self.price {
            r.price = Some(v);
        }
        if let Some(v) = self.price_level {
            r.price_level = Some(v);
        }
        if let Some(v) = self.rating {
            r.rating = v;
        }
        if let Some(v) = self.tags {
            r.tags = v;
        }
        if let Some(v) = self.open_now {
            r.open_now = v;
        }
        if let Some(v) = self.is_active {
            r.is_active = v;
        }
    }
}
