//! Per-request caller identity.
//!
//! A bearer token, when present, is the source of truth for who the caller is.
//! Without one the request falls back to the plain `userId` it carries, unless
//! the service runs with `REQUIRE_AUTH=true`.

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::auth::token::Claims;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct Session(pub Option<Claims>);

impl Session {
    /// Resolves the owner key for a meal/grocery request.
    pub fn resolve_user(&self, supplied: Option<&str>) -> Result<String, AppError> {
        let supplied = supplied.map(str::trim).filter(|s| !s.is_empty());
        match (&self.0, supplied) {
            (Some(claims), Some(requested)) if requested != claims.name => Err(
                AppError::Forbidden(format!("Token does not grant access to user '{requested}'")),
            ),
            (Some(claims), _) => Ok(claims.name.clone()),
            (None, Some(requested)) => Ok(requested.to_string()),
            (None, None) => Err(AppError::Validation("User name is required".to_string())),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            if state.config.require_auth {
                return Err(AppError::Unauthorized("Authentication required".to_string()));
            }
            return Ok(Session(None));
        };

        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or_else(|| AppError::Unauthorized("Malformed Authorization header".to_string()))?;

        Ok(Session(Some(state.tokens.verify(token)?)))
    }
}
