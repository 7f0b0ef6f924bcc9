//! Grocery lists: one list per user, new items appended in submission order.

pub mod handlers;
pub mod store;

use serde::Deserialize;

use crate::errors::AppError;
use crate::models::grocery::GroceryItem;

/// An item as submitted by a client, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct GroceryItemInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: Option<i32>,
}

/// Validates a submitted batch and turns it into storable items.
///
/// The batch must be non-empty; every item needs a non-blank name and a
/// quantity of at least one (absent quantity means one). Duplicates are kept.
pub fn validate_items(items: Option<Vec<GroceryItemInput>>) -> Result<Vec<GroceryItem>, AppError> {
    let items = match items {
        Some(items) if !items.is_empty() => items,
        _ => {
            return Err(AppError::Validation(
                "Items must be a non-empty array".to_string(),
            ))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            let name = item
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .ok_or_else(|| AppError::Validation(format!("Item {idx} is missing a name")))?;
            let quantity = item.quantity.unwrap_or(1);
            if quantity < 1 {
                return Err(AppError::Validation(format!(
                    "Item '{name}' must have a quantity of at least 1"
                )));
            }
            Ok(GroceryItem {
                name: name.to_string(),
                quantity,
            })
        })
        .collect()
}
