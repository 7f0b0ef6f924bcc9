use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::auth::session::Session;
use crate::errors::AppError;
use crate::groceries::{validate_items, GroceryItemInput};
use crate::models::grocery::GroceryList;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddGroceriesRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<GroceryItemInput>>,
}

/// GET /api/groceries/:userId
/// Returns `[]` or a one-element array holding the user's list.
pub async fn handle_get_groceries(
    State(state): State<AppState>,
    session: Session,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<GroceryList>>, AppError> {
    let user_id = session.resolve_user(Some(&user_id))?;
    let list = state.groceries.latest_for_user(&user_id).await?;
    debug!(
        "Fetched grocery list for user {user_id}: {} item(s)",
        list.as_ref().map_or(0, |l| l.items.len())
    );
    Ok(Json(list.into_iter().collect()))
}

/// POST /api/groceries
pub async fn handle_add_groceries(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<AddGroceriesRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<GroceryList>), AppError> {
    let Json(req) = payload?;
    let user_id = session.resolve_user(req.user_id.as_deref())?;
    let items = validate_items(req.items)?;

    let list = state.groceries.append_items(&user_id, &items).await?;
    info!(
        "Appended {} item(s) to grocery list {} for user {user_id} (now {})",
        items.len(),
        list.id,
        list.items.len()
    );

    Ok((StatusCode::CREATED, Json(list)))
}
