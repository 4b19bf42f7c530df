use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::query::{Match, RestaurantFilter, SortDirection, SortSpec};
use super::repo_types::{NewRestaurant, Restaurant, RestaurantPatch};

/// Restaurant persistence. List reads (`count`, `find`) only ever see active
/// rows; `get`, `update` and `soft_delete` address a row by id regardless.
#[async_trait]
pub trait RestaurantStore: Send + Sync {
    async fn count(&self, filter: &RestaurantFilter) -> anyhow::Result<u64>;
    async fn find(
        &self,
        filter: &RestaurantFilter,
        sort: SortSpec,
        skip: i64,
        limit: i64,
    ) -> anyhow::Result<Vec<Restaurant>>;
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Restaurant>>;
    async fn create(&self, new: NewRestaurant) -> anyhow::Result<Restaurant>;
    async fn update(&self, id: Uuid, patch: RestaurantPatch) -> anyhow::Result<Option<Restaurant>>;
    async fn soft_delete(&self, id: Uuid) -> anyhow::Result<Option<Restaurant>>;
    async fn clear(&self) -> anyhow::Result<()>;
}

const COLUMNS: &str = "id, name, city, address, cuisine, price, price_level, rating, tags, \
                       open_now, is_active, created_at, updated_at";

/// Same expression as the GIN index in the migrations.
const SEARCH_DOCUMENT: &str = "restaurant_search_document(name, tags, cuisine)";

#[derive(Clone)]
pub struct PgRestaurantStore {
    db: PgPool,
}

impl PgRestaurantStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RestaurantStore for PgRestaurantStore {
    async fn count(&self, filter: &RestaurantFilter) -> anyhow::Result<u64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM restaurants");
        push_where(&mut qb, filter);
        let total: i64 = qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.db)
            .await
            .context("count restaurants")?;
        Ok(total.max(0) as u64)
    }

    async fn find(
        &self,
        filter: &RestaurantFilter,
        sort: SortSpec,
        skip: i64,
        limit: i64,
    ) -> anyhow::Result<Vec<Restaurant>> {
        let mut qb = select_query(filter, sort, skip, limit);
        let rows = qb
            .build_query_as::<Restaurant>()
            .fetch_all(&self.db)
            .await
            .context("find restaurants")?;
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Restaurant>> {
        let row = sqlx::query_as::<_, Restaurant>(&format!(
            "SELECT {COLUMNS} FROM restaurants WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("get restaurant")?;
        Ok(row)
    }

    async fn create(&self, new: NewRestaurant) -> anyhow::Result<Restaurant> {
        let row = sqlx::query_as::<_, Restaurant>(&format!(
            r#"
            INSERT INTO restaurants
                (name, city, address, cuisine, price, price_level, rating, tags, open_now, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(new.name)
        .bind(new.city)
        .bind(new.address)
        .bind(new.cuisine)
        .bind(new.price)
        .bind(new.price_level)
        .bind(new.rating)
        .bind(new.tags)
        .bind(new.open_now)
        .bind(new.is_active)
        .fetch_one(&self.db)
        .await
        .context("insert restaurant")?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, patch: RestaurantPatch) -> anyhow::Result<Option<Restaurant>> {
        let row = sqlx::query_as::<_, Restaurant>(&format!(
            r#"
            UPDATE restaurants SET
                name        = COALESCE($2, name),
                city        = COALESCE($3, city),
                address     = COALESCE($4, address),
                cuisine     = COALESCE($5, cuisine),
                price       = COALESCE($6, price),
                price_level = COALESCE($7, price_level),
                rating      = COALESCE($8, rating),
                tags        = COALESCE($9, tags),
                open_now    = COALESCE($10, open_now),
                is_active   = COALESCE($11, is_active),
                updated_at  = now()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.name)
        .bind(patch.city)
        .bind(patch.address)
        .bind(patch.cuisine)
        .bind(patch.price)
        .bind(patch.price_level)
        .bind(patch.rating)
        .bind(patch.tags)
        .bind(patch.open_now)
        .bind(patch.is_active)
        .fetch_optional(&self.db)
        .await
        .context("update restaurant")?;
        Ok(row)
    }

    async fn soft_delete(&self, id: Uuid) -> anyhow::Result<Option<Restaurant>> {
        let row = sqlx::query_as::<_, Restaurant>(&format!(
            "UPDATE restaurants SET is_active = FALSE, updated_at = now() \
             WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("soft delete restaurant")?;
        Ok(row)
    }

    async fn clear(&self) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM restaurants")
            .execute(&self.db)
            .await
            .context("clear restaurants")?;
        Ok(())
    }
}

fn select_query(
    filter: &RestaurantFilter,
    sort: SortSpec,
    skip: i64,
    limit: i64,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM restaurants"));
    push_where(&mut qb, filter);
    push_order(&mut qb, sort);
    qb.push(" OFFSET ").push_bind(skip);
    qb.push(" LIMIT ").push_bind(limit);
    qb
}

fn push_where(qb: &mut QueryBuilder<'_, Postgres>, f: &RestaurantFilter) {
    qb.push(" WHERE is_active = TRUE");

    // a search with no words left after tokenizing matches nothing
    if f.text.is_some() {
        qb.push(" AND EXISTS (SELECT 1 FROM unnest(")
            .push_bind(f.text_terms())
            .push("::text[]) AS term WHERE ")
            .push(SEARCH_DOCUMENT)
            .push(" @@ plainto_tsquery('simple', term))");
    }

    if let Some(m) = &f.city {
        match m {
            Match::Exact(v) => qb.push(" AND city = ").push_bind(v.clone()),
            Match::AnyOf(vs) => qb.push(" AND city = ANY(").push_bind(vs.clone()).push(")"),
        };
    }

    if let Some(m) = &f.cuisine {
        match m {
            Match::Exact(v) => qb.push(" AND ").push_bind(v.clone()).push(" = ANY(cuisine)"),
            Match::AnyOf(vs) => qb.push(" AND cuisine && ").push_bind(vs.clone()).push("::text[]"),
        };
    }

    if let Some(range) = f.price {
        if let Some(min) = range.min {
            qb.push(" AND price >= ").push_bind(min);
        }
        if let Some(max) = range.max {
            qb.push(" AND price <= ").push_bind(max);
        }
    }

    if let Some(max) = f.price_level_max {
        qb.push(" AND price_level <= ").push_bind(max);
    }

    if let Some(min) = f.rating_gte {
        qb.push(" AND rating >= ").push_bind(min);
    }

    if let Some(open) = f.open_now {
        qb.push(" AND open_now = ").push_bind(open);
    }
}

/// Missing values sort lowest: first ascending, last descending.
fn push_order(qb: &mut QueryBuilder<'_, Postgres>, sort: SortSpec) {
    let nulls = match sort.direction {
        SortDirection::Asc => "NULLS FIRST",
        SortDirection::Desc => "NULLS LAST",
    };
    qb.push(format!(
        " ORDER BY {} {} {}, id ASC",
        sort.field.column(),
        sort.direction.sql(),
        nulls
    ));
}
