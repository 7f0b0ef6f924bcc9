use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::store::{PgUserStore, UserStore};
use crate::auth::token::TokenIssuer;
use crate::config::Config;
use crate::groceries::store::{GroceryStore, PgGroceryStore};
use crate::meals::store::{MealStore, PgMealStore};
use crate::memory::MemoryStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub meals: Arc<dyn MealStore>,
    pub groceries: Arc<dyn GroceryStore>,
    pub users: Arc<dyn UserStore>,
    pub tokens: TokenIssuer,
    pub config: Config,
}

impl AppState {
    pub fn with_postgres(pool: PgPool, config: Config) -> Self {
        Self {
            meals: Arc::new(PgMealStore::new(pool.clone())),
            groceries: Arc::new(PgGroceryStore::new(pool.clone())),
            users: Arc::new(PgUserStore::new(pool)),
            tokens: TokenIssuer::new(&config.jwt_secret, config.token_ttl_hours),
            config,
        }
    }

    /// All three stores share one in-memory backend.
    pub fn in_memory(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            meals: store.clone(),
            groceries: store.clone(),
            users: store,
            tokens: TokenIssuer::new(&config.jwt_secret, config.token_ttl_hours),
            config,
        }
    }
}
