use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::meal::{MealEntry, MealEntryRow, MealRecord};

/// Result of a create-or-overwrite save.
#[derive(Debug, Clone)]
pub struct MealUpsert {
    pub entry: MealEntry,
    /// `true` when no entry existed for the (user, date) pair before this save.
    pub created: bool,
}

/// Persistence for meal entries.
///
/// Carried in `AppState` as `Arc<dyn MealStore>`.
#[async_trait]
pub trait MealStore: Send + Sync {
    async fn find(&self, user_id: &str, date: NaiveDate) -> Result<Option<MealEntry>, AppError>;

    /// Every distinct date with an entry for the user, ascending.
    async fn dates_for_user(&self, user_id: &str) -> Result<Vec<NaiveDate>, AppError>;

    /// Replaces the whole meal record for (user, date), creating the entry if absent.
    /// Must be atomic per (user, date).
    async fn upsert(
        &self,
        user_id: &str,
        date: NaiveDate,
        meals: &MealRecord,
    ) -> Result<MealUpsert, AppError>;
}

pub struct PgMealStore {
    pool: PgPool,
}

impl PgMealStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct MealUpsertRow {
    #[sqlx(flatten)]
    entry: MealEntryRow,
    inserted: bool,
}

#[async_trait]
impl MealStore for PgMealStore {
    async fn find(&self, user_id: &str, date: NaiveDate) -> Result<Option<MealEntry>, AppError> {
        let row: Option<MealEntryRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, entry_date, breakfast, lunch, dinner, snack, created_at, updated_at
            FROM meal_entries
            WHERE user_id = $1 AND entry_date = $2
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(MealEntry::from))
    }

    async fn dates_for_user(&self, user_id: &str) -> Result<Vec<NaiveDate>, AppError> {
        Ok(sqlx::query_scalar(
            "SELECT entry_date FROM meal_entries WHERE user_id = $1 ORDER BY entry_date ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn upsert(
        &self,
        user_id: &str,
        date: NaiveDate,
        meals: &MealRecord,
    ) -> Result<MealUpsert, AppError> {
        // xmax is zero only for a freshly inserted tuple.
        let row: MealUpsertRow = sqlx::query_as(
            r#"
            INSERT INTO meal_entries (id, user_id, entry_date, breakfast, lunch, dinner, snack)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id, entry_date) DO UPDATE
            SET breakfast = EXCLUDED.breakfast,
                lunch = EXCLUDED.lunch,
                dinner = EXCLUDED.dinner,
                snack = EXCLUDED.snack,
                updated_at = now()
            RETURNING id, user_id, entry_date, breakfast, lunch, dinner, snack,
                      created_at, updated_at, (xmax = 0) AS inserted
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(date)
        .bind(meals.breakfast.as_deref())
        .bind(meals.lunch.as_deref())
        .bind(meals.dinner.as_deref())
        .bind(meals.snack.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(MealUpsert {
            entry: row.entry.into(),
            created: row.inserted,
        })
    }
}
