use std::cmp::Ordering;
use std::sync::RwLock;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::query::{search_words, RestaurantFilter, SortDirection, SortField, SortSpec};
use super::repo::RestaurantStore;
use super::repo_types::{NewRestaurant, Restaurant, RestaurantPatch};

/// Process-local restaurant collection with the same query semantics as
/// the PostgreSQL store.
#[derive(Default)]
pub struct MemoryRestaurantStore {
    rows: RwLock<Vec<Restaurant>>,
}

impl MemoryRestaurantStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> anyhow::Result<std::sync::RwLockReadGuard<'_, Vec<Restaurant>>> {
        self.rows
            .read()
            .map_err(|_| anyhow::anyhow!("restaurant store lock poisoned"))
    }

    fn write(&self) -> anyhow::Result<std::sync::RwLockWriteGuard<'_, Vec<Restaurant>>> {
        self.rows
            .write()
            .map_err(|_| anyhow::anyhow!("restaurant store lock poisoned"))
    }
}

#[async_trait]
impl RestaurantStore for MemoryRestaurantStore {
    async fn count(&self, filter: &RestaurantFilter) -> anyhow::Result<u64> {
        let rows = self.read()?;
        Ok(rows.iter().filter(|r| matches(filter, r)).count() as u64)
    }

    async fn find(
        &self,
        filter: &RestaurantFilter,
        sort: SortSpec,
        skip: i64,
        limit: i64,
    ) -> anyhow::Result<Vec<Restaurant>> {
        let rows = self.read()?;
        let mut hits: Vec<Restaurant> = rows.iter().filter(|r| matches(filter, r)).cloned().collect();
        hits.sort_by(|a, b| compare(sort, a, b));
        Ok(hits
            .into_iter()
            .skip(skip.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Restaurant>> {
        Ok(self.read()?.iter().find(|r| r.id == id).cloned())
    }

    async fn create(&self, new: NewRestaurant) -> anyhow::Result<Restaurant> {
        let now = OffsetDateTime::now_utc();
        let row = Restaurant {
            id: Uuid::new_v4(),
            name: new.name,
            city: new.city,
            address: new.address,
            cuisine: new.cuisine,
            price: new.price,
            price_level: new.price_level,
            rating: new.rating,
            tags: new.tags,
            open_now: new.open_now,
            is_active: new.is_active,
            created_at: now,
            updated_at: now,
        };
        self.write()?.push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: Uuid, patch: RestaurantPatch) -> anyhow::Result<Option<Restaurant>> {
        let mut rows = self.write()?;
        let Some(row) = rows.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        patch.apply(row);
        row.updated_at = OffsetDateTime::now_utc();
        Ok(Some(row.clone()))
    }

    async fn soft_delete(&self, id: Uuid) -> anyhow::Result<Option<Restaurant>> {
        let mut rows = self.write()?;
        let Some(row) = rows.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        row.is_active = false;
        row.updated_at = OffsetDateTime::now_utc();
        Ok(Some(row.clone()))
    }

    async fn clear(&self) -> anyhow::Result<()> {
        self.write()?.clear();
        Ok(())
    }
}

fn matches(f: &RestaurantFilter, r: &Restaurant) -> bool {
    if !r.is_active {
        return false;
    }
    if f.text.is_some() && !matches_text(&f.text_terms(), r) {
        return false;
    }
    if let Some(m) = &f.city {
        if !m.accepts(&r.city) {
            return false;
        }
    }
    if let Some(m) = &f.cuisine {
        if !m.accepts_any(&r.cuisine) {
            return false;
        }
    }
    if let Some(range) = f.price {
        match r.price {
            Some(p) if range.contains(p) => {}
            _ => return false,
        }
    }
    if let Some(max) = f.price_level_max {
        match r.price_level {
            Some(level) if f64::from(level) <= max => {}
            _ => return false,
        }
    }
    if let Some(min) = f.rating_gte {
        if r.rating < min {
            return false;
        }
    }
    if let Some(open) = f.open_now {
        if r.open_now != open {
            return false;
        }
    }
    true
}

/// Any term equal to any word of name, tags or cuisine.
fn matches_text(terms: &[String], r: &Restaurant) -> bool {
    std::iter::once(r.name.as_str())
        .chain(r.tags.iter().map(String::as_str))
        .chain(r.cuisine.iter().map(String::as_str))
        .flat_map(search_words)
        .any(|w| terms.contains(&w))
}

fn compare(sort: SortSpec, a: &Restaurant, b: &Restaurant) -> Ordering {
    let ord = match sort.field {
        SortField::Rating => a.rating.total_cmp(&b.rating),
        // None < Some, matching NULLS FIRST ascending / NULLS LAST descending
        SortField::Price => match (a.price, b.price) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (x, y) => x.is_some().cmp(&y.is_some()),
        },
        SortField::Name => a.name.cmp(&b.name),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
    };
    let ord = match sort.direction {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
    };
    ord.then_with(|| a.id.cmp(&b.id))
}
