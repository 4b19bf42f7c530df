use std::sync::Arc;

use tracing::info;

use crate::config::{AppConfig, StoreBackend};
use crate::restaurants::{
    memory::MemoryRestaurantStore,
    repo::{PgRestaurantStore, RestaurantStore},
};
use crate::users::{
    memory::MemoryUserStore,
    repo::{PgUserStore, UserStore},
};
use crate::{db, seed};

/// Shared handles; the stores are the only state that outlives a request.
#[derive(Clone)]
pub struct AppState {
    pub restaurants: Arc<dyn RestaurantStore>,
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let state = match config.backend {
            StoreBackend::Postgres => {
                let pool = db::connect(config).await?;
                db::migrate(&pool).await?;
                info!(max_connections = config.max_connections, "postgres store ready");
                Self::from_parts(
                    Arc::new(PgRestaurantStore::new(pool.clone())),
                    Arc::new(PgUserStore::new(pool)),
                )
            }
            StoreBackend::Memory => {
                info!("in-memory store ready");
                Self::in_memory()
            }
        };

        if config.seed_on_start || config.backend == StoreBackend::Memory {
            seed::run(&state).await?;
        }
        Ok(state)
    }

    pub fn from_parts(restaurants: Arc<dyn RestaurantStore>, users: Arc<dyn UserStore>) -> Self {
        Self { restaurants, users }
    }

    /// Empty process-local stores.
    pub fn in_memory() -> Self {
        Self::from_parts(
            Arc::new(MemoryRestaurantStore::new()),
            Arc::new(MemoryUserStore::new()),
        )
    }
}
