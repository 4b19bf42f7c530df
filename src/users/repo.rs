use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewUser, User, UserRow};

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn create(&self, new: NewUser) -> anyhow::Result<User>;
    async fn clear(&self) -> anyhow::Result<()>;
}

const COLUMNS: &str = "id, email, name, preferred_cuisines, preferred_cities, price_min, \
                       price_max, favorites, created_at, updated_at";

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("get user")?;
        Ok(row.map(User::from))
    }

    async fn create(&self, new: NewUser) -> anyhow::Result<User> {
        let prefs = new.preferences;
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users
                (email, name, preferred_cuisines, preferred_cities, price_min, price_max, favorites)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(new.email)
        .bind(new.name)
        .bind(prefs.cuisines)
        .bind(prefs.cities)
        .bind(prefs.price_range.min)
        .bind(prefs.price_range.max)
        .bind(new.favorites)
        .fetch_one(&self.db)
        .await
        .context("insert user")?;
        Ok(row.into())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM users")
            .execute(&self.db)
            .await
            .context("clear users")?;
        Ok(())
    }
}
