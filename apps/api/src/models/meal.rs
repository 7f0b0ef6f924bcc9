use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The four meal slots of a day. A missing slot is stored as null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealRecord {
    #[serde(default)]
    pub breakfast: Option<String>,
    #[serde(default)]
    pub lunch: Option<String>,
    #[serde(default)]
    pub dinner: Option<String>,
    #[serde(default)]
    pub snack: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    pub user_id: String,
    pub meals: MealRecord,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct MealEntryRow {
    pub id: Uuid,
    pub user_id: String,
    pub entry_date: NaiveDate,
    pub breakfast: Option<String>,
    pub lunch: Option<String>,
    pub dinner: Option<String>,
    pub snack: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MealEntryRow> for MealEntry {
    fn from(row: MealEntryRow) -> Self {
        MealEntry {
            id: row.id,
            date: row.entry_date,
            user_id: row.user_id,
            meals: MealRecord {
                breakfast: row.breakfast,
                lunch: row.lunch,
                dinner: row.dinner,
                snack: row.snack,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
