use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::auth::session::Session;
use crate::errors::AppError;
use crate::meals::{parse_date_key, DATE_FORMAT};
use crate::models::meal::{MealEntry, MealRecord};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdQuery {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveMealsRequest {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub meals: Option<MealRecord>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// GET /api/meals/dates?userId=
pub async fn handle_meal_dates(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<String>>, AppError> {
    let user_id = session.resolve_user(params.user_id.as_deref())?;
    let dates = state.meals.dates_for_user(&user_id).await?;
    debug!("Fetched {} meal date(s) for user {user_id}", dates.len());
    Ok(Json(
        dates
            .iter()
            .map(|d| d.format(DATE_FORMAT).to_string())
            .collect(),
    ))
}

/// GET /api/meals/:date?userId=
pub async fn handle_get_meals(
    State(state): State<AppState>,
    session: Session,
    Path(date): Path<String>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<MealEntry>, AppError> {
    let user_id = session.resolve_user(params.user_id.as_deref())?;
    let date = parse_date_key(&date)?;
    let entry = state
        .meals
        .find(&user_id, date)
        .await?
        .ok_or_else(|| AppError::NotFound("No meals found for this date".to_string()))?;
    Ok(Json(entry))
}

/// POST /api/meals
/// 201 when the day had no entry yet, 200 when an existing entry was overwritten.
pub async fn handle_save_meals(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<SaveMealsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MealEntry>), AppError> {
    let Json(req) = payload?;
    let user_id = session.resolve_user(req.user_id.as_deref())?;
    let date = req
        .date
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Date is required".to_string()))
        .and_then(parse_date_key)?;
    let meals = req.meals.unwrap_or_default();

    let saved = state.meals.upsert(&user_id, date, &meals).await?;
    let status = if saved.created {
        info!("Created meal entry {} for user {user_id} on {date}", saved.entry.id);
        StatusCode::CREATED
    } else {
        info!("Overwrote meal entry {} for user {user_id} on {date}", saved.entry.id);
        StatusCode::OK
    };

    Ok((status, Json(saved.entry)))
}
