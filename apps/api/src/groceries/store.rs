use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::grocery::{GroceryItem, GroceryList, GroceryListRow};

/// Persistence for grocery lists.
///
/// Carried in `AppState` as `Arc<dyn GroceryStore>`.
#[async_trait]
pub trait GroceryStore: Send + Sync {
    /// The user's list, if one was ever written.
    async fn latest_for_user(&self, user_id: &str) -> Result<Option<GroceryList>, AppError>;

    /// Appends `items` to the user's list, creating it on first write.
    /// Must be atomic per user: concurrent appends never create a second list.
    async fn append_items(
        &self,
        user_id: &str,
        items: &[GroceryItem],
    ) -> Result<GroceryList, AppError>;
}

pub struct PgGroceryStore {
    pool: PgPool,
}

impl PgGroceryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroceryStore for PgGroceryStore {
    async fn latest_for_user(&self, user_id: &str) -> Result<Option<GroceryList>, AppError> {
        let row: Option<GroceryListRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, items, created_at, updated_at
            FROM grocery_lists
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(GroceryList::from))
    }

    async fn append_items(
        &self,
        user_id: &str,
        items: &[GroceryItem],
    ) -> Result<GroceryList, AppError> {
        // JSONB concatenation keeps existing items first, new ones after.
        let row: GroceryListRow = sqlx::query_as(
            r#"
            INSERT INTO grocery_lists (id, user_id, items)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE
            SET items = grocery_lists.items || EXCLUDED.items,
                updated_at = now()
            RETURNING id, user_id, items, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(Json(items))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }
}
