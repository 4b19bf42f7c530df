use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub cuisines: Vec<String>,
    #[serde(default)]
    pub cities: Vec<String>,
    #[serde(default)]
    pub price_range: PriceRange,
}

/// A user; `favorites` may point at restaurants that no longer exist.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub preferences: Preferences,
    pub favorites: Vec<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub favorites: Vec<Uuid>,
}

/// Flat `users` row; preferences are spread over columns.
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub preferred_cuisines: Vec<String>,
    pub preferred_cities: Vec<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub favorites: Vec<Uuid>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        Self {
            id: r.id,
            email: r.email,
            name: r.name,
            preferences: Preferences {
                cuisines: r.preferred_cuisines,
                cities: r.preferred_cities,
                price_range: PriceRange {
                    min: r.price_min,
                    max: r.price_max,
                },
            },
            favorites: r.favorites,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[cfg(test)]
mod user_tests {
    use super::*;

    #[test]
    fn row_spreads_into_preferences() {
        let now = OffsetDateTime::now_utc();
        let user = User::from(UserRow {
            id: Uuid::new_v4(),
            email: "demo@tattler.com".into(),
            name: "Demo".into(),
            preferred_cuisines: vec!["mexican".into()],
            preferred_cities: vec!["Monterrey".into()],
            price_min: None,
            price_max: Some(3.0),
            favorites: vec![],
            created_at: now,
            updated_at: now,
        });
        assert_eq!(user.preferences.cities, vec!["Monterrey".to_string()]);
        assert_eq!(user.preferences.price_range.max, Some(3.0));

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["preferences"]["priceRange"]["max"], 3.0);
        assert_eq!(json["email"], "demo@tattler.com");
    }
}
