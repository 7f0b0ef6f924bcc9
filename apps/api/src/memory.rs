//! In-process storage backend.
//!
//! Used when no `DATABASE_URL` is configured and by the router tests. All
//! writes take the single write lock, so every create-or-update is atomic.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::store::UserStore;
use crate::errors::AppError;
use crate::groceries::store::GroceryStore;
use crate::meals::store::{MealStore, MealUpsert};
use crate::models::grocery::{GroceryItem, GroceryList};
use crate::models::meal::{MealEntry, MealRecord};
use crate::models::user::{NewUser, User};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    groceries: HashMap<String, GroceryList>,
    meals: HashMap<(String, NaiveDate), MealEntry>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GroceryStore for MemoryStore {
    async fn latest_for_user(&self, user_id: &str) -> Result<Option<GroceryList>, AppError> {
        Ok(self.tables.read().await.groceries.get(user_id).cloned())
    }

    async fn append_items(
        &self,
        user_id: &str,
        items: &[GroceryItem],
    ) -> Result<GroceryList, AppError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let list = tables
            .groceries
            .entry(user_id.to_string())
            .or_insert_with(|| GroceryList {
                id: Uuid::new_v4(),
                user_id: user_id.to_string(),
                items: Vec::new(),
                created_at: now,
                updated_at: now,
            });
        list.items.extend_from_slice(items);
        list.updated_at = now;
        Ok(list.clone())
    }
}

#[async_trait]
impl MealStore for MemoryStore {
    async fn find(&self, user_id: &str, date: NaiveDate) -> Result<Option<MealEntry>, AppError> {
        Ok(self
            .tables
            .read()
            .await
            .meals
            .get(&(user_id.to_string(), date))
            .cloned())
    }

    async fn dates_for_user(&self, user_id: &str) -> Result<Vec<NaiveDate>, AppError> {
        let tables = self.tables.read().await;
        let mut dates: Vec<NaiveDate> = tables
            .meals
            .keys()
            .filter(|(owner, _)| owner == user_id)
            .map(|(_, date)| *date)
            .collect();
        dates.sort_unstable();
        Ok(dates)
    }

    async fn upsert(
        &self,
        user_id: &str,
        date: NaiveDate,
        meals: &MealRecord,
    ) -> Result<MealUpsert, AppError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let key = (user_id.to_string(), date);

        if let Some(entry) = tables.meals.get_mut(&key) {
            entry.meals = meals.clone();
            entry.updated_at = now;
            return Ok(MealUpsert {
                entry: entry.clone(),
                created: false,
            });
        }

        let entry = MealEntry {
            id: Uuid::new_v4(),
            date,
            user_id: user_id.to_string(),
            meals: meals.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.meals.insert(key, entry.clone());
        Ok(MealUpsert {
            entry,
            created: true,
        })
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .iter()
            .any(|u| u.name == new_user.name || u.email == new_user.email)
        {
            return Err(AppError::Conflict(
                "An account with this name or email already exists".to_string(),
            ));
        }

        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        let email = login.to_lowercase();
        Ok(tables
            .users
            .iter()
            .find(|u| u.email == email)
            .or_else(|| tables.users.iter().find(|u| u.name == login))
            .cloned())
    }
}
