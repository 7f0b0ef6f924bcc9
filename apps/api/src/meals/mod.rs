//! Meal planner: one entry per user and calendar day, overwritten wholesale on save.

pub mod handlers;
pub mod store;

use chrono::NaiveDate;

use crate::errors::AppError;

/// Format of the calendar key used in paths, bodies and responses.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a `YYYY-MM-DD` calendar key.
pub fn parse_date_key(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        AppError::Validation(format!("Invalid date '{raw}', expected YYYY-MM-DD"))
    })
}
