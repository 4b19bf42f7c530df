use std::sync::RwLock;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::UserStore;
use super::repo_types::{NewUser, User};

#[derive(Default)]
pub struct MemoryUserStore {
    rows: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let rows = self
            .rows
            .read()
            .map_err(|_| anyhow::anyhow!("user store lock poisoned"))?;
        Ok(rows.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, new: NewUser) -> anyhow::Result<User> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| anyhow::anyhow!("user store lock poisoned"))?;
        // mirrors the unique index on users.email
        anyhow::ensure!(
            rows.iter().all(|u| u.email != new.email),
            "email {} already registered",
            new.email
        );
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            email: new.email,
            name: new.name,
            preferences: new.preferences,
            favorites: new.favorites,
            created_at: now,
            updated_at: now,
        };
        rows.push(user.clone());
        Ok(user)
    }

    async fn clear(&self) -> anyhow::Result<()> {
        self.rows
            .write()
            .map_err(|_| anyhow::anyhow!("user store lock poisoned"))?
            .clear();
        Ok(())
    }
}
