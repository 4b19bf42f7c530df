//! Fixtures shared by the unit and router tests.

use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;
use http_body_util::BodyExt;
use uuid::Uuid;

use crate::restaurants::query::{RestaurantFilter, SortSpec};
use crate::restaurants::repo::RestaurantStore;
use crate::restaurants::repo_types::{NewRestaurant, Restaurant, RestaurantPatch};
use crate::state::AppState;
use crate::users::memory::MemoryUserStore;
use crate::users::repo_types::User;
use crate::seed;

/// Restaurant store whose reads fail the way a dropped connection would.
pub struct BrokenStore;

#[async_trait]
impl RestaurantStore for BrokenStore {
    async fn count(&self, _f: &RestaurantFilter) -> anyhow::Result<u64> {
        Ok(7)
    }
    async fn find(
        &self,
        _f: &RestaurantFilter,
        _s: SortSpec,
        _skip: i64,
        _limit: i64,
    ) -> anyhow::Result<Vec<Restaurant>> {
        anyhow::bail!("connection reset")
    }
    async fn get(&self, _id: Uuid) -> anyhow::Result<Option<Restaurant>> {
        anyhow::bail!("connection reset")
    }
    async fn create(&self, _n: NewRestaurant) -> anyhow::Result<Restaurant> {
        anyhow::bail!("connection reset")
    }
    async fn update(&self, _id: Uuid, _p: RestaurantPatch) -> anyhow::Result<Option<Restaurant>> {
        anyhow::bail!("connection reset")
    }
    async fn soft_delete(&self, _id: Uuid) -> anyhow::Result<Option<Restaurant>> {
        anyhow::bail!("connection reset")
    }
    async fn clear(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// In-memory state loaded with the demo dataset, plus the demo user.
pub async fn seeded_state() -> (AppState, User) {
    let state = AppState::in_memory();
    let user = seed::run(&state).await.expect("seed");
    (state, user)
}

pub fn broken_state() -> AppState {
    AppState::from_parts(
        Arc::new(BrokenStore),
        Arc::new(MemoryUserStore::new()),
    )
}

pub async fn body_json(res: Response) -> serde_json::Value {
    let bytes = res.into_body().collect().await.expect("body").to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}
