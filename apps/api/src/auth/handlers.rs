use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::errors::AppError;
use crate::models::user::NewUser;
use crate::state::AppState;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address or display name.
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub name: String,
}

fn validate_registration(req: &RegisterRequest) -> Result<(String, String), AppError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    let email = req.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok((name.to_string(), email))
}

/// Argon2 is CPU-bound; keep it off the async workers.
async fn run_blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Blocking task failed: {e}")))?
        .map_err(AppError::Internal)
}

/// POST /api/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let Json(req) = payload?;
    let (name, email) = validate_registration(&req)?;

    let password = req.password;
    let password_hash = run_blocking(move || hash_password(&password)).await?;

    let user = state
        .users
        .create(NewUser {
            name,
            email,
            password_hash,
        })
        .await?;
    let token = state.tokens.issue(&user)?;
    info!("Registered user {} ({})", user.name, user.id);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            token,
        }),
    ))
}

/// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(req) = payload?;
    let login = req.email.trim();
    if login.is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let invalid = || AppError::Unauthorized("Invalid credentials".to_string());
    let Some(user) = state.users.find_by_login(login).await? else {
        warn!("Login attempt for unknown account '{login}'");
        return Err(invalid());
    };

    let hash = user.password_hash.clone();
    let password = req.password;
    if !run_blocking(move || verify_password(&hash, &password)).await? {
        warn!("Failed login for user {}", user.id);
        return Err(invalid());
    }

    let token = state.tokens.issue(&user)?;
    info!("User {} logged in", user.name);
    Ok(Json(LoginResponse {
        token,
        name: user.name,
    }))
}
