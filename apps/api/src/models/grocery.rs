use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroceryItem {
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

/// A user's grocery list as returned over the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroceryList {
    pub id: Uuid,
    pub user_id: String,
    pub items: Vec<GroceryItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct GroceryListRow {
    pub id: Uuid,
    pub user_id: String,
    pub items: Json<Vec<GroceryItem>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GroceryListRow> for GroceryList {
    fn from(row: GroceryListRow) -> Self {
        GroceryList {
            id: row.id,
            user_id: row.user_id,
            items: row.items.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
