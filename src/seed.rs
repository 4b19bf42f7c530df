use tracing::info;

use crate::restaurants::repo_types::NewRestaurant;
use crate::state::AppState;
use crate::users::repo_types::{NewUser, Preferences, PriceRange, User};

pub fn restaurants() -> Vec<NewRestaurant> {
    vec![
        restaurant("Taquería La Silla", &["mexican"], 1, 4.5, &["tacos", "casual"]),
        restaurant("Parrilla Norteña", &["bbq", "steak"], 3, 4.7, &["grill"]),
        restaurant("Ramen Mty", &["japanese"], 2, 4.2, &["noodles"]),
    ]
}

pub fn demo_user() -> NewUser {
    NewUser {
        email: "demo@tattler.com".into(),
        name: "Demo".into(),
        preferences: Preferences {
            cuisines: vec!["mexican".into(), "bbq".into()],
            cities: vec!["Monterrey".into()],
            price_range: PriceRange {
                min: None,
                max: Some(3.0),
            },
        },
        favorites: vec![],
    }
}

fn restaurant(name: &str, cuisine: &[&str], price_level: i32, rating: f64, tags: &[&str]) -> NewRestaurant {
    NewRestaurant {
        name: name.into(),
        city: "Monterrey".into(),
        cuisine: cuisine.iter().map(|s| s.to_string()).collect(),
        price_level: Some(price_level),
        rating,
        tags: tags.iter().map(|s| s.to_string()).collect(),
        is_active: true,
        ..Default::default()
    }
}

/// Wipes both collections and loads the demo dataset.
pub async fn run(state: &AppState) -> anyhow::Result<User> {
    state.restaurants.clear().await?;
    state.users.clear().await?;

    for r in restaurants() {
        state.restaurants.create(r).await?;
    }
    let user = state.users.create(demo_user()).await?;

    info!(user_id = %user.id, email = %user.email, "seed done");
    Ok(user)
}
