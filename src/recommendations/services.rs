use crate::restaurants::query::{Match, RestaurantFilter, SortField, SortSpec};
use crate::restaurants::repo::RestaurantStore;
use crate::restaurants::repo_types::Restaurant;
use crate::users::repo_types::Preferences;

pub const TOP_N: i64 = 10;

/// Projects stored preferences onto the list filter. Plain attribute
/// matching: no weighting, no signal from other users.
pub fn filter_for(prefs: &Preferences) -> RestaurantFilter {
    RestaurantFilter {
        cuisine: any_of(&prefs.cuisines),
        city: any_of(&prefs.cities),
        // an unset or zero ceiling means no ceiling
        price_level_max: prefs.price_range.max.filter(|max| *max != 0.0),
        ..Default::default()
    }
}

fn any_of(values: &[String]) -> Option<Match> {
    if values.is_empty() {
        None
    } else {
        Some(Match::AnyOf(values.to_vec()))
    }
}

/// Best rated active restaurants matching the preferences, at most [`TOP_N`].
pub async fn recommend(
    store: &dyn RestaurantStore,
    prefs: &Preferences,
) -> anyhow::Result<Vec<Restaurant>> {
    store
        .find(&filter_for(prefs), SortSpec::desc(SortField::Rating), 0, TOP_N)
        .await
}

#[cfg(test)]
mod recommendation_tests {
    use super::*;
    use crate::restaurants::memory::MemoryRestaurantStore;
    use crate::restaurants::repo_types::NewRestaurant;
    use crate::seed;
    use crate::users::repo_types::PriceRange;

    fn new(name: &str, city: &str, cuisine: &str, level: i32, rating: f64) -> NewRestaurant {
        NewRestaurant {
            name: name.into(),
            city: city.into(),
            cuisine: vec![cuisine.into()],
            price_level: Some(level),
            rating,
            is_active: true,
            ..Default::default()
        }
    }

    #[test]
    fn empty_preferences_add_no_predicates() {
        assert_eq!(filter_for(&Preferences::default()), RestaurantFilter::default());
    }

    #[test]
    fn preferences_become_membership_and_ceiling() {
        let f = filter_for(&seed::demo_user().preferences);
        assert_eq!(
            f.cuisine,
            Some(Match::AnyOf(vec!["mexican".into(), "bbq".into()]))
        );
        assert_eq!(f.city, Some(Match::AnyOf(vec!["Monterrey".into()])));
        assert_eq!(f.price_level_max, Some(3.0));
        assert_eq!(f.text, None);
        assert_eq!(f.rating_gte, None);
    }

    #[test]
    fn zero_price_ceiling_is_ignored() {
        let prefs = Preferences {
            price_range: PriceRange {
                min: Some(1.0),
                max: Some(0.0),
            },
            ..Default::default()
        };
        assert_eq!(filter_for(&prefs).price_level_max, None);
    }

    #[tokio::test]
    async fn demo_user_gets_matching_restaurants_best_first() {
        let store = MemoryRestaurantStore::new();
        for r in seed::restaurants() {
            store.create(r).await.unwrap();
        }
        let names: Vec<_> = recommend(&store, &seed::demo_user().preferences)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["Parrilla Norteña", "Taquería La Silla"]);
    }

    #[tokio::test]
    async fn empty_preferences_return_top_ten_active_by_rating() {
        let store = MemoryRestaurantStore::new();
        for i in 0..12 {
            let r = new(&format!("R{i:02}"), "Puebla", "mexican", 2, f64::from(i) * 0.4);
            store.create(r).await.unwrap();
        }
        let mut hidden = new("Hidden", "Puebla", "mexican", 2, 5.0);
        hidden.is_active = false;
        store.create(hidden).await.unwrap();

        let items = recommend(&store, &Preferences::default()).await.unwrap();
        assert_eq!(items.len(), 10);
        assert_eq!(items[0].name, "R11");
        assert_eq!(items[9].name, "R02");
        assert!(items.windows(2).all(|w| w[0].rating >= w[1].rating));
        assert!(items.iter().all(|r| r.is_active));
    }

    #[tokio::test]
    async fn price_ceiling_applies_to_price_level() {
        let store = MemoryRestaurantStore::new();
        store.create(new("Cheap", "Monterrey", "bbq", 1, 3.0)).await.unwrap();
        store.create(new("Fancy", "Monterrey", "bbq", 4, 4.9)).await.unwrap();

        let prefs = Preferences {
            price_range: PriceRange {
                min: None,
                max: Some(2.0),
            },
            ..Default::default()
        };
        let items = recommend(&store, &prefs).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Cheap");
    }
}
